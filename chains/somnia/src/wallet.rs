use crate::utils::format::short_address;
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::Address;
use core_logic::{ProxyConfig, WalletCredential, WalletManager};
use tracing::warn;

/// One loaded wallet: its position, key and the proxy on the same line index.
///
/// Built once at startup and treated as immutable afterwards.
#[derive(Debug, Clone)]
pub struct WalletRecord {
    pub index: usize,
    pub credential: WalletCredential,
    pub proxy: Option<ProxyConfig>,
    /// `None` when the key could not be parsed.
    pub address: Option<Address>,
}

impl WalletRecord {
    pub fn new(index: usize, credential: WalletCredential, proxy: Option<ProxyConfig>) -> Self {
        let address = credential
            .expose()
            .parse::<PrivateKeySigner>()
            .map(|signer| signer.address())
            .ok();
        Self {
            index,
            credential,
            proxy,
            address,
        }
    }

    /// Short address for log lines, or the 1-based slot when the key is broken.
    pub fn label(&self) -> String {
        match self.address {
            Some(addr) => short_address(&addr),
            None => format!("#{}", self.index + 1),
        }
    }
}

/// Pairs wallet `i` with proxy slot `i`. Wallets whose slot is empty or past the
/// end of the proxy list run direct.
pub fn build_records(
    wallets: &WalletManager,
    proxies: &[Option<ProxyConfig>],
) -> Vec<WalletRecord> {
    wallets
        .credentials()
        .iter()
        .enumerate()
        .map(|(index, credential)| {
            let proxy = proxies.get(index).cloned().flatten();
            let record = WalletRecord::new(index, credential.clone(), proxy);
            if record.address.is_none() {
                warn!("Wallet {} has an unusable private key", index + 1);
            }
            record
        })
        .collect()
}
