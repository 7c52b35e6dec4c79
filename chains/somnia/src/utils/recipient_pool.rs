use alloy_primitives::Address;
use core_logic::{read_lines, ConfigError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;
use tracing::{info, warn};

/// Recipient addresses for random native sends, read once per batch.
#[derive(Debug, Clone)]
pub struct RecipientPool {
    addresses: Vec<Address>,
}

impl RecipientPool {
    /// Invalid lines are dropped with a warning. An empty result is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let addresses: Vec<Address> = read_lines(path)
            .iter()
            .filter_map(|line| match line.parse::<Address>() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    warn!("Skipping invalid recipient address: {}", line);
                    None
                }
            })
            .collect();

        if addresses.is_empty() {
            return Err(ConfigError::EmptyRecipients {
                path: path.display().to_string(),
            });
        }

        info!("Loaded {} recipients from {}", addresses.len(), path.display());
        Ok(Self { addresses })
    }

    pub fn from_addresses(addresses: Vec<Address>) -> Result<Self, ConfigError> {
        if addresses.is_empty() {
            return Err(ConfigError::EmptyRecipients {
                path: "<memory>".to_string(),
            });
        }
        Ok(Self { addresses })
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Uniform pick, independent between calls.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Address {
        // non-empty by construction
        *self.addresses.choose(rng).unwrap_or(&self.addresses[0])
    }
}
