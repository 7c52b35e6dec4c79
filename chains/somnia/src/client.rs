//! Somnia Client - chain access behind a narrow trait
//!
//! Executors never touch alloy directly. They talk to a [`ChainClient`], which
//! the production [`SomniaClient`] implements on top of an alloy provider with
//! a proxy-aware reqwest transport and a retrying RPC client.
//!
//! A client is bound to exactly one wallet and one proxy. The orchestrator asks
//! a [`ClientFactory`] for a fresh client per wallet segment of a batch.

use crate::contracts::{IFaucetToken, ISwapRouter};
use crate::wallet::WalletRecord;
use alloy::providers::{PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::client::ClientBuilder;
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::Http;
use alloy::transports::layers::RetryBackoffLayer;
use alloy_primitives::aliases::{U160, U24};
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use core_logic::{NetworkError, ProxyConfig};
use reqwest::{Client, Proxy};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// `exactInputSingle` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
}

/// A state-changing call a task can submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainTx {
    /// Faucet `mint()` on a PING/PONG token.
    Mint { token: Address },
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Swap { router: Address, params: SwapParams },
    /// Plain native-coin transfer.
    Transfer { to: Address, value: U256 },
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    fn address(&self) -> Address;

    async fn native_balance(&self) -> Result<U256>;

    async fn token_balance(&self, token: Address) -> Result<U256>;

    /// Whether this wallet already took the token's faucet allocation.
    async fn has_minted(&self, token: Address) -> Result<bool>;

    /// Signs and broadcasts; returns as soon as the node accepted the tx.
    async fn submit(&self, tx: ChainTx) -> Result<TxHash>;

    /// Blocks until the tx is mined. A reverted receipt is an error.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<()>;
}

#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, wallet: &WalletRecord) -> Result<Arc<dyn ChainClient>>;
}

/// Alloy-backed client for one wallet.
#[derive(Clone)]
pub struct SomniaClient {
    provider: Arc<dyn Provider + Send + Sync>,
    signer: PrivateKeySigner,
}

impl SomniaClient {
    pub fn new(rpc_url: &str, private_key: &str, proxy: Option<&ProxyConfig>) -> Result<Self> {
        let signer: PrivateKeySigner =
            private_key.parse().context("Failed to parse private key")?;

        let rpc_url = rpc_url
            .parse::<Url>()
            .map_err(|_| NetworkError::InvalidRpcUrl {
                url: rpc_url.to_string(),
            })?;

        let reqwest_client = build_http_client(proxy)?;
        let http_transport = Http::with_client(reqwest_client, rpc_url);

        let client = ClientBuilder::default()
            .layer(RetryBackoffLayer::new(5, 100, 2000))
            .transport(http_transport, false);

        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(
            ProviderBuilder::new()
                .wallet(signer.clone())
                .connect_client(client),
        );

        Ok(Self {
            provider,
            signer,
        })
    }

    async fn view_call(&self, to: Address, data: Vec<u8>) -> Result<alloy_primitives::Bytes> {
        let tx = TransactionRequest::default()
            .to(to)
            .input(TransactionInput::from(data));
        Ok(self.provider.call(tx).await?)
    }

    fn build_request(&self, tx: ChainTx) -> TransactionRequest {
        let base = TransactionRequest::default().from(self.signer.address());
        match tx {
            ChainTx::Mint { token } => base
                .to(token)
                .input(TransactionInput::from(IFaucetToken::mintCall {}.abi_encode())),
            ChainTx::Approve {
                token,
                spender,
                amount,
            } => base.to(token).input(TransactionInput::from(
                IFaucetToken::approveCall { spender, amount }.abi_encode(),
            )),
            ChainTx::Swap { router, params } => {
                let call = ISwapRouter::exactInputSingleCall {
                    params: ISwapRouter::ExactInputSingleParams {
                        tokenIn: params.token_in,
                        tokenOut: params.token_out,
                        fee: U24::from(params.fee),
                        recipient: params.recipient,
                        amountIn: params.amount_in,
                        amountOutMinimum: params.amount_out_minimum,
                        sqrtPriceLimitX96: U160::ZERO,
                    },
                };
                base.to(router)
                    .input(TransactionInput::from(call.abi_encode()))
            }
            ChainTx::Transfer { to, value } => base.to(to).value(value),
        }
    }
}

fn build_http_client(proxy: Option<&ProxyConfig>) -> Result<Client> {
    let mut client_builder = Client::builder();

    if let Some(proxy_config) = proxy {
        let proxy = Proxy::all(&proxy_config.url).map_err(|e| NetworkError::InvalidProxy {
            proxy: proxy_config.short(),
            reason: e.to_string(),
        })?;

        let proxy = match (&proxy_config.username, &proxy_config.password) {
            (Some(username), Some(password)) => proxy.basic_auth(username, password),
            _ => proxy,
        };
        client_builder = client_builder.proxy(proxy);
    }

    client_builder
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build reqwest client")
}

#[async_trait]
impl ChainClient for SomniaClient {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn native_balance(&self) -> Result<U256> {
        self.provider
            .get_balance(self.address())
            .await
            .context("Failed to fetch native balance")
    }

    async fn token_balance(&self, token: Address) -> Result<U256> {
        let data = IFaucetToken::balanceOfCall {
            owner: self.address(),
        }
        .abi_encode();
        let raw = self
            .view_call(token, data)
            .await
            .context("Failed to fetch token balance")?;
        IFaucetToken::balanceOfCall::abi_decode_returns(&raw)
            .context("Failed to decode token balance")
    }

    async fn has_minted(&self, token: Address) -> Result<bool> {
        let data = IFaucetToken::isMinterCall {
            account: self.address(),
        }
        .abi_encode();
        let raw = self
            .view_call(token, data)
            .await
            .context("Failed to query minter status")?;
        IFaucetToken::isMinterCall::abi_decode_returns(&raw)
            .context("Failed to decode minter status")
    }

    async fn submit(&self, tx: ChainTx) -> Result<TxHash> {
        let request = self.build_request(tx);
        let pending = self
            .provider
            .send_transaction(request)
            .await
            .context("Failed to send transaction")?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<()> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .context("Failed to get receipt")?;

        if !receipt.status() {
            bail!("Transaction {:?} reverted", tx_hash);
        }
        Ok(())
    }
}

/// Builds [`SomniaClient`]s against one RPC endpoint.
pub struct SomniaClientFactory {
    rpc_url: String,
}

impl SomniaClientFactory {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
        }
    }
}

#[async_trait]
impl ClientFactory for SomniaClientFactory {
    async fn connect(&self, wallet: &WalletRecord) -> Result<Arc<dyn ChainClient>> {
        let client = SomniaClient::new(
            &self.rpc_url,
            wallet.credential.expose(),
            wallet.proxy.as_ref(),
        )
        .with_context(|| format!("Cannot connect wallet {}", wallet.index + 1))?;
        Ok(Arc::new(client))
    }
}
