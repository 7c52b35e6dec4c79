#![allow(dead_code)]

use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, TxHash, U256};
use anyhow::{bail, Result};
use async_trait::async_trait;
use core_logic::WalletManager;
use somnia_bot::{
    build_records, ChainClient, ChainTx, ClientFactory, DelayRange, Presenter, SomniaConfig,
    TaskFamily, WalletRecord, WalletSnapshot,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const KEY_A: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";
pub const KEY_B: &str = "0x0000000000000000000000000000000000000000000000000000000000000002";

pub fn ether(amount: &str) -> U256 {
    parse_ether(amount).unwrap()
}

/// Defaults with every pause shrunk to a few milliseconds.
pub fn fast_config() -> SomniaConfig {
    SomniaConfig {
        swap_delay_ms: DelayRange::new(5, 10),
        send_delay_ms: DelayRange::new(5, 10),
        faucet_step_delay_ms: 1,
        claim_settle_delay_ms: 1,
        ..SomniaConfig::default()
    }
}

pub fn records(keys: &[&str]) -> Vec<WalletRecord> {
    build_records(&WalletManager::from_keys(keys), &[])
}

#[derive(Default)]
struct WalletState {
    native: U256,
    minted: HashSet<Address>,
}

type ConfirmHook = Box<dyn Fn(usize) + Send + Sync>;

/// In-memory chain shared by every client the mock factory hands out.
#[derive(Default)]
pub struct MockChain {
    wallets: Mutex<HashMap<Address, WalletState>>,
    submitted: Mutex<Vec<(Address, ChainTx)>>,
    confirmations: AtomicUsize,
    connects: AtomicUsize,
    pub fail_approve: AtomicBool,
    pub revert_swaps: AtomicBool,
    pub revert_transfers: AtomicBool,
    failing_mints: Mutex<HashSet<Address>>,
    confirm_delay: Mutex<Duration>,
    on_confirm: Mutex<Option<ConfirmHook>>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fund(&self, address: Address, native: U256) {
        self.wallets
            .lock()
            .unwrap()
            .entry(address)
            .or_default()
            .native = native;
    }

    pub fn mark_minted(&self, address: Address, token: Address) {
        self.wallets
            .lock()
            .unwrap()
            .entry(address)
            .or_default()
            .minted
            .insert(token);
    }

    /// Every mint of `token` is rejected at submission.
    pub fn fail_mint(&self, token: Address) {
        self.failing_mints.lock().unwrap().insert(token);
    }

    pub fn set_confirm_delay(&self, delay: Duration) {
        *self.confirm_delay.lock().unwrap() = delay;
    }

    /// Called with the running confirmation count after each receipt.
    pub fn on_confirm(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.on_confirm.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn submitted(&self) -> Vec<(Address, ChainTx)> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    fn tx_at(&self, hash: TxHash) -> Option<ChainTx> {
        let index = U256::from_be_bytes(hash.0).to::<usize>();
        self.submitted
            .lock()
            .unwrap()
            .get(index)
            .map(|(_, tx)| tx.clone())
    }
}

pub struct MockClient {
    chain: Arc<MockChain>,
    address: Address,
}

#[async_trait]
impl ChainClient for MockClient {
    fn address(&self) -> Address {
        self.address
    }

    async fn native_balance(&self) -> Result<U256> {
        Ok(self
            .chain
            .wallets
            .lock()
            .unwrap()
            .get(&self.address)
            .map(|w| w.native)
            .unwrap_or_default())
    }

    async fn token_balance(&self, _token: Address) -> Result<U256> {
        Ok(U256::ZERO)
    }

    async fn has_minted(&self, token: Address) -> Result<bool> {
        Ok(self
            .chain
            .wallets
            .lock()
            .unwrap()
            .get(&self.address)
            .map(|w| w.minted.contains(&token))
            .unwrap_or(false))
    }

    async fn submit(&self, tx: ChainTx) -> Result<TxHash> {
        if matches!(tx, ChainTx::Approve { .. }) && self.chain.fail_approve.load(Ordering::SeqCst)
        {
            bail!("insufficient funds for gas");
        }
        if let ChainTx::Mint { token } = &tx {
            if self.chain.failing_mints.lock().unwrap().contains(token) {
                bail!("execution reverted: mint paused");
            }
            self.chain.mark_minted(self.address, *token);
        }
        let mut submitted = self.chain.submitted.lock().unwrap();
        let hash = TxHash::from(U256::from(submitted.len()).to_be_bytes::<32>());
        submitted.push((self.address, tx));
        Ok(hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<()> {
        let delay = *self.chain.confirm_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let count = self.chain.confirmations.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(hook) = self.chain.on_confirm.lock().unwrap().as_ref() {
            hook(count);
        }

        match self.chain.tx_at(tx_hash) {
            Some(ChainTx::Swap { .. }) if self.chain.revert_swaps.load(Ordering::SeqCst) => {
                bail!("Transaction {:?} reverted", tx_hash)
            }
            Some(ChainTx::Transfer { .. }) if self.chain.revert_transfers.load(Ordering::SeqCst) => {
                bail!("Transaction {:?} reverted", tx_hash)
            }
            _ => Ok(()),
        }
    }
}

pub struct MockFactory {
    pub chain: Arc<MockChain>,
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn connect(&self, wallet: &WalletRecord) -> Result<Arc<dyn ChainClient>> {
        self.chain.connects.fetch_add(1, Ordering::SeqCst);
        let Some(address) = wallet.address else {
            bail!("Failed to parse private key");
        };
        Ok(Arc::new(MockClient {
            chain: self.chain.clone(),
            address,
        }))
    }
}

#[derive(Default)]
pub struct RecordingPresenter {
    logs: Mutex<Vec<String>>,
    menu: Mutex<Vec<(TaskFamily, bool)>>,
    snapshots: Mutex<Vec<WalletSnapshot>>,
}

impl RecordingPresenter {
    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap().clone()
    }

    pub fn menu_states(&self) -> Vec<(TaskFamily, bool)> {
        self.menu.lock().unwrap().clone()
    }

    pub fn snapshots(&self) -> Vec<WalletSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn append_log(&self, message: &str) {
        self.logs.lock().unwrap().push(message.to_string());
    }

    fn set_wallet_snapshot(&self, snapshot: &WalletSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }

    fn set_menu_state(&self, family: TaskFamily, running: bool) {
        self.menu.lock().unwrap().push((family, running));
    }
}
