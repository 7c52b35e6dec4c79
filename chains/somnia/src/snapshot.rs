use crate::client::ChainClient;
use crate::config::SomniaConfig;
use crate::presenter::Presenter;
use crate::utils::format::{format_amount, short_address};
use crate::wallet::WalletRecord;
use anyhow::Result;
use core_logic::config::short_proxy;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub symbol: String,
    pub amount: String,
}

/// Display data for the wallet currently shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSnapshot {
    pub index: usize,
    pub total: usize,
    pub address: String,
    pub native_symbol: String,
    pub native_balance: String,
    pub tokens: Vec<TokenBalance>,
    pub proxy: String,
    pub network: String,
}

impl WalletSnapshot {
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Wallet {}/{}: {}", self.index + 1, self.total, self.address),
            format!("  {:<6} {}", self.native_symbol, self.native_balance),
        ];
        for token in &self.tokens {
            lines.push(format!("  {:<6} {}", token.symbol, token.amount));
        }
        lines.push(format!("  Proxy   {}", self.proxy));
        lines.push(format!("  Network {}", self.network));
        lines
    }
}

/// Latest snapshot plus the code that reads one from chain.
pub struct SnapshotStore {
    config: Arc<SomniaConfig>,
    total: usize,
    presenter: Arc<dyn Presenter>,
    current: RwLock<Option<WalletSnapshot>>,
}

impl SnapshotStore {
    pub fn new(config: Arc<SomniaConfig>, total: usize, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            config,
            total,
            presenter,
            current: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<WalletSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub async fn read(
        &self,
        client: &dyn ChainClient,
        wallet: &WalletRecord,
    ) -> Result<WalletSnapshot> {
        let native = client.native_balance().await?;
        let ping = client.token_balance(self.config.ping_token).await?;
        let pong = client.token_balance(self.config.pong_token).await?;

        Ok(WalletSnapshot {
            index: wallet.index,
            total: self.total,
            address: short_address(&client.address()),
            native_symbol: self.config.native_symbol.clone(),
            native_balance: format_amount(native),
            tokens: vec![
                TokenBalance {
                    symbol: "PING".to_string(),
                    amount: format_amount(ping),
                },
                TokenBalance {
                    symbol: "PONG".to_string(),
                    amount: format_amount(pong),
                },
            ],
            proxy: short_proxy(wallet.proxy.as_ref()),
            network: self.config.network_name.clone(),
        })
    }

    /// Reads, stores and publishes. Failures are logged and otherwise ignored.
    pub async fn refresh(&self, client: &dyn ChainClient, wallet: &WalletRecord) {
        match self.read(client, wallet).await {
            Ok(snapshot) => {
                self.presenter.set_wallet_snapshot(&snapshot);
                *self
                    .current
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(snapshot);
            }
            Err(e) => self
                .presenter
                .append_log(&format!("Cannot fetch wallet data: {:#}", e)),
        }
    }
}
