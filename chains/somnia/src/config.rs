use alloy_primitives::utils::{format_ether, parse_ether};
use alloy_primitives::{address, Address, U256};
use anyhow::{Context, Result};
use core_logic::{ConfigError, ProxyManager, WalletManager};
use rand::Rng;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Inclusive millisecond range a randomized pause is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SomniaConfig {
    pub rpc_url: String,
    pub network_name: String,
    pub native_symbol: String,
    pub ping_token: Address,
    pub pong_token: Address,
    pub swap_router: Address,
    pub swap_fee_tier: u32,
    /// Decimal amount of native coin a wallet needs before swapping or sending.
    pub min_native_balance: String,
    pub swap_amount_min: u64,
    pub swap_amount_max: u64,
    /// Decimal bounds of one send to a random recipient. Sends to a chosen
    /// address are not bounded.
    pub send_random_min: String,
    pub send_random_max: String,
    pub swap_delay_ms: DelayRange,
    pub send_delay_ms: DelayRange,
    pub faucet_step_delay_ms: u64,
    pub claim_settle_delay_ms: u64,
    pub wallet_file: String,
    pub proxy_file: String,
    pub recipient_file: String,
}

impl Default for SomniaConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://dream-rpc.somnia.network".to_string(),
            network_name: "SOMNIA TESTNET".to_string(),
            native_symbol: "STT".to_string(),
            ping_token: address!("33E7fAB0a8a5da1A923180989bD617c9c2D1C493"),
            pong_token: address!("9beaA0016c22B646Ac311Ab171270B0ECf23098F"),
            swap_router: address!("6aac14f090a35eea150705f72d90e4cdc4a49b2c"),
            swap_fee_tier: 500,
            min_native_balance: "0.01".to_string(),
            swap_amount_min: 50,
            swap_amount_max: 200,
            send_random_min: "0.0001".to_string(),
            send_random_max: "0.01".to_string(),
            swap_delay_ms: DelayRange::new(20_000, 50_000),
            send_delay_ms: DelayRange::new(5_000, 10_000),
            faucet_step_delay_ms: 2_000,
            claim_settle_delay_ms: 5_000,
            wallet_file: WalletManager::WALLET_FILE.to_string(),
            proxy_file: ProxyManager::PROXY_FILE.to_string(),
            recipient_file: "randomaddress.txt".to_string(),
        }
    }
}

impl SomniaConfig {
    /// Reads the TOML file, falling back to defaults when it does not exist,
    /// then applies environment overrides and validates the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str::<SomniaConfig>(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            warn!("{} not found, using built-in defaults", path.display());
            SomniaConfig::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// `RPC_URL`, `PING_TOKEN_ADDRESS`, `PONG_TOKEN_ADDRESS`, `NETWORK_NAME`
    /// and `SWAP_CONTRACT_ADDRESS` win over the file when set.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("RPC_URL") {
            self.rpc_url = url;
        }
        if let Ok(name) = std::env::var("NETWORK_NAME") {
            self.network_name = name;
        }
        if let Some(addr) = env_address("PING_TOKEN_ADDRESS")? {
            self.ping_token = addr;
        }
        if let Some(addr) = env_address("PONG_TOKEN_ADDRESS")? {
            self.pong_token = addr;
        }
        if let Some(addr) = env_address("SWAP_CONTRACT_ADDRESS")? {
            self.swap_router = addr;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "rpc_url".to_string(),
                reason: format!("'{}' is not an http(s) url", self.rpc_url),
            });
        }
        if self.ping_token == self.pong_token {
            return Err(ConfigError::InvalidValue {
                field: "pong_token".to_string(),
                reason: "must differ from ping_token".to_string(),
            });
        }
        if self.swap_fee_tier >= 1 << 24 {
            return Err(ConfigError::InvalidValue {
                field: "swap_fee_tier".to_string(),
                reason: format!("{} does not fit in uint24", self.swap_fee_tier),
            });
        }
        if parse_ether(&self.min_native_balance).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "min_native_balance".to_string(),
                reason: format!("'{}' is not a decimal amount", self.min_native_balance),
            });
        }
        if self.swap_amount_min == 0 || self.swap_amount_min > self.swap_amount_max {
            return Err(ConfigError::InvalidValue {
                field: "swap_amount_min".to_string(),
                reason: format!(
                    "range {}..={} is empty",
                    self.swap_amount_min, self.swap_amount_max
                ),
            });
        }
        let mut send_bounds = [U256::ZERO; 2];
        for (slot, (field, raw)) in send_bounds.iter_mut().zip([
            ("send_random_min", &self.send_random_min),
            ("send_random_max", &self.send_random_max),
        ]) {
            *slot = parse_ether(raw).map_err(|_| ConfigError::InvalidValue {
                field: field.to_string(),
                reason: format!("'{}' is not a decimal amount", raw),
            })?;
        }
        if send_bounds[0].is_zero() || send_bounds[0] > send_bounds[1] {
            return Err(ConfigError::InvalidValue {
                field: "send_random_min".to_string(),
                reason: format!(
                    "range {}..={} is empty",
                    self.send_random_min, self.send_random_max
                ),
            });
        }
        for (field, range) in [
            ("swap_delay_ms", self.swap_delay_ms),
            ("send_delay_ms", self.send_delay_ms),
        ] {
            if range.min_ms > range.max_ms {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("min_ms {} > max_ms {}", range.min_ms, range.max_ms),
                });
            }
        }
        Ok(())
    }

    /// Balance gate in wei.
    pub fn min_balance_wei(&self) -> U256 {
        parse_ether(&self.min_native_balance).unwrap_or(U256::from(10_000_000_000_000_000u64))
    }

    /// Rejects a random-send amount outside `send_random_min..=send_random_max`.
    pub fn check_random_send(&self, amount: U256) -> Result<(), ConfigError> {
        let min = parse_ether(&self.send_random_min).unwrap_or(U256::ZERO);
        let max = parse_ether(&self.send_random_max).unwrap_or(U256::ZERO);
        if amount < min || amount > max {
            return Err(ConfigError::InvalidValue {
                field: "amount".to_string(),
                reason: format!(
                    "{} {} is outside {}..={}",
                    format_ether(amount),
                    self.native_symbol,
                    self.send_random_min,
                    self.send_random_max
                ),
            });
        }
        Ok(())
    }

    pub fn faucet_step_delay(&self) -> Duration {
        Duration::from_millis(self.faucet_step_delay_ms)
    }

    pub fn claim_settle_delay(&self) -> Duration {
        Duration::from_millis(self.claim_settle_delay_ms)
    }
}

fn env_address(key: &str) -> Result<Option<Address>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<Address>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field: key.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
