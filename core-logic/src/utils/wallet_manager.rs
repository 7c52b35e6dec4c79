use super::lines::read_lines;
use crate::error::WalletError;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A private key in canonical `0x`-prefixed hex form.
///
/// The key is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct WalletCredential {
    key: String,
}

impl WalletCredential {
    /// Normalizes a raw key line: trims whitespace and enforces the `0x` prefix.
    /// No other validation happens here, see [`WalletCredential::validate`].
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let key = if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            format!("0x{}", &trimmed[2..])
        } else {
            format!("0x{}", trimmed)
        };
        Self { key }
    }

    pub fn expose(&self) -> &str {
        &self.key
    }

    /// Checks the key is exactly 32 bytes of hex.
    pub fn validate(&self) -> Result<(), WalletError> {
        let hex = &self.key[2..];
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(WalletError::InvalidKeyFormat);
        }
        if hex.len() != 64 {
            return Err(WalletError::InvalidKeyLength { length: hex.len() });
        }
        Ok(())
    }
}

impl fmt::Debug for WalletCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletCredential")
            .field("key", &"***REDACTED***")
            .finish()
    }
}

/// Ordered list of wallet credentials loaded from a line-delimited file.
///
/// Identity is positional: index `i` is the wallet's stable reference and pairs
/// it with the proxy at the same index.
pub struct WalletManager {
    credentials: Vec<WalletCredential>,
}

impl WalletManager {
    pub const WALLET_FILE: &'static str = "wallet.txt";

    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let credentials: Vec<WalletCredential> = read_lines(path)
            .iter()
            .map(|line| WalletCredential::new(line))
            .collect();

        for (index, credential) in credentials.iter().enumerate() {
            if let Err(e) = credential.validate() {
                // Kept in place so later wallets keep their proxy pairing.
                warn!("Wallet {} in {} is malformed: {}", index + 1, path.display(), e);
            }
        }

        info!("Loaded {} wallets from {}", credentials.len(), path.display());
        Self { credentials }
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            credentials: keys
                .into_iter()
                .map(|k| WalletCredential::new(k.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&WalletCredential, WalletError> {
        self.credentials.get(index).ok_or(WalletError::NotFound {
            index,
            total: self.credentials.len(),
        })
    }

    pub fn credentials(&self) -> &[WalletCredential] {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn test_prefix_is_enforced() {
        assert_eq!(WalletCredential::new(KEY).expose(), format!("0x{}", KEY));
        assert_eq!(
            WalletCredential::new(&format!("  0x{}\r", KEY)).expose(),
            format!("0x{}", KEY)
        );
    }

    #[test]
    fn test_validate_rejects_non_hex_and_short_keys() {
        assert!(WalletCredential::new(KEY).validate().is_ok());
        assert!(matches!(
            WalletCredential::new("0xzz").validate(),
            Err(WalletError::InvalidKeyFormat)
        ));
        assert!(matches!(
            WalletCredential::new("abcd").validate(),
            Err(WalletError::InvalidKeyLength { length: 4 })
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let rendered = format!("{:?}", WalletCredential::new(KEY));
        assert!(!rendered.contains(KEY));
    }

    #[test]
    fn test_get_out_of_range() {
        let manager = WalletManager::from_keys([KEY]);
        assert!(manager.get(0).is_ok());
        assert!(matches!(
            manager.get(1),
            Err(WalletError::NotFound { index: 1, total: 1 })
        ));
    }
}
