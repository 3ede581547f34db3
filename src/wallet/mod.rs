//! Wallet connection and native-currency payments.

mod rpc;
pub mod units;

pub use rpc::JsonRpcWallet;

use crate::shared::names::player_label;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{Arc, Mutex as StdMutex};

/// Base mainnet.
pub const CHAIN_ID: &str = "0x2105";
pub const PAYMENT_RECIPIENT: &str = "0xC6DA0c478C7CCeac8354B2BFF141680823c730fF";
/// Plain value transfer.
pub const TRANSFER_GAS: &str = "0x5208";

pub const CODE_USER_REJECTED: i64 = 4001;
pub const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;
pub const CODE_REQUEST_PENDING: i64 = -32002;
pub const CODE_INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("no wallet provider configured")]
    Unavailable,

    #[error("wallet returned no accounts")]
    NoAccounts,

    #[error("wallet error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("wallet transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed wallet response: {0}")]
    Malformed(String),
}

impl WalletError {
    pub fn code(&self) -> Option<i64> {
        match self {
            WalletError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn payment_failure(&self) -> PaymentFailure {
        match self {
            WalletError::Rpc { code, .. } if *code == CODE_USER_REJECTED => {
                PaymentFailure::UserRejected
            }
            WalletError::Rpc { code, message } if *code == CODE_INTERNAL_ERROR => {
                PaymentFailure::NetworkError(message.clone())
            }
            WalletError::Transport(error) => PaymentFailure::NetworkError(error.to_string()),
            other => PaymentFailure::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentFailure {
    #[error("transaction rejected by user")]
    UserRejected,

    #[error("insufficient funds or network error: {0}")]
    NetworkError(String),

    #[error("payment failed: {0}")]
    Unknown(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("no wallet detected")]
    Unavailable,

    #[error("no accounts found, unlock the wallet")]
    NoAccounts,

    #[error("connection rejected")]
    Declined,

    #[error("connection request already pending")]
    Pending,

    #[error("switch to the Base network to continue")]
    WrongNetwork,

    #[error("failed to add the Base network: {0}")]
    ChainNotAdded(WalletError),

    #[error("failed to connect wallet: {0}")]
    Failed(WalletError),
}

impl From<WalletError> for ConnectError {
    fn from(error: WalletError) -> Self {
        match error {
            WalletError::Unavailable => ConnectError::Unavailable,
            WalletError::NoAccounts => ConnectError::NoAccounts,
            WalletError::Rpc { code, .. } if code == CODE_USER_REJECTED => ConnectError::Declined,
            WalletError::Rpc { code, .. } if code == CODE_REQUEST_PENDING => ConnectError::Pending,
            other => ConnectError::Failed(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TipError {
    #[error("connect a wallet first")]
    NotConnected,

    #[error("invalid tip amount {0}")]
    InvalidAmount(Decimal),

    #[error(transparent)]
    Failed(PaymentFailure),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainParams {
    pub chain_id: &'static str,
    pub chain_name: &'static str,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<&'static str>,
    pub block_explorer_urls: Vec<&'static str>,
}

pub fn base_chain() -> ChainParams {
    ChainParams {
        chain_id: CHAIN_ID,
        chain_name: "Base",
        native_currency: NativeCurrency {
            name: "ETH",
            symbol: "ETH",
            decimals: 18,
        },
        rpc_urls: vec!["https://mainnet.base.org"],
        block_explorer_urls: vec!["https://basescan.org"],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError>;

    async fn add_chain(&self, params: &ChainParams) -> Result<(), WalletError>;

    /// Returns the transaction hash.
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, WalletError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletSession {
    pub address: String,
}

/// Holds the provider and the session it produced. The session lives until
/// the process exits; there is no disconnect.
pub struct WalletLink {
    provider: Option<Arc<dyn WalletProvider>>,
    session: StdMutex<Option<WalletSession>>,
}

impl WalletLink {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            session: StdMutex::new(None),
        }
    }

    pub fn session(&self) -> Option<WalletSession> {
        self.session.lock().unwrap().clone()
    }

    pub fn player_label(&self) -> String {
        let session = self.session();
        player_label(session.as_ref().map(|session| session.address.as_str()))
    }

    fn provider(&self) -> Result<&Arc<dyn WalletProvider>, WalletError> {
        self.provider.as_ref().ok_or(WalletError::Unavailable)
    }

    pub async fn connect(&self) -> Result<WalletSession, ConnectError> {
        let provider = self.provider()?;
        let accounts = provider.request_accounts().await?;
        let address = accounts
            .into_iter()
            .find(|account| !account.trim().is_empty())
            .ok_or(ConnectError::NoAccounts)?;

        if let Err(error) = provider.switch_chain(CHAIN_ID).await {
            match error.code() {
                Some(CODE_UNRECOGNIZED_CHAIN) => {
                    provider
                        .add_chain(&base_chain())
                        .await
                        .map_err(ConnectError::ChainNotAdded)?;
                }
                Some(CODE_USER_REJECTED) => return Err(ConnectError::WrongNetwork),
                _ => return Err(ConnectError::Failed(error)),
            }
        }

        let session = WalletSession { address };
        *self.session.lock().unwrap() = Some(session.clone());
        tracing::info!(address = %session.address, "wallet connected");
        Ok(session)
    }

    /// Sends `amount` of native currency to the payment recipient.
    pub async fn pay(
        &self,
        session: &WalletSession,
        amount_wei: u128,
        gas: Option<&str>,
    ) -> Result<String, WalletError> {
        let request = TransactionRequest {
            from: session.address.clone(),
            to: PAYMENT_RECIPIENT.to_string(),
            value: units::hex_quantity(amount_wei),
            gas: gas.map(str::to_string),
        };
        let tx_hash = self.provider()?.send_transaction(&request).await?;
        tracing::info!(%tx_hash, value = %request.value, "payment sent");
        Ok(tx_hash)
    }

    pub async fn tip(&self, amount: Decimal) -> Result<String, TipError> {
        let session = self.session().ok_or(TipError::NotConnected)?;
        let amount_wei = units::to_wei(amount)
            .filter(|wei| *wei > 0)
            .ok_or(TipError::InvalidAmount(amount))?;
        self.pay(&session, amount_wei, None).await.map_err(|error| {
            tracing::warn!(%error, "tip failed");
            TipError::Failed(error.payment_failure())
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub const ADDRESS: &str = "0x1234567890abcdef1234567890abcdef12345678";

    /// Scripted provider. Queued errors are returned first, in order, per call kind.
    #[derive(Default)]
    pub struct FakeWallet {
        pub accounts: Vec<String>,
        pub switch_errors: StdMutex<VecDeque<WalletError>>,
        pub add_errors: StdMutex<VecDeque<WalletError>>,
        pub send_errors: StdMutex<VecDeque<WalletError>>,
        pub switch_calls: AtomicUsize,
        pub add_calls: AtomicUsize,
        pub sent: StdMutex<Vec<TransactionRequest>>,
    }

    impl FakeWallet {
        pub fn with_account() -> Self {
            Self {
                accounts: vec![ADDRESS.to_string()],
                ..Self::default()
            }
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    pub fn rpc_error(code: i64) -> WalletError {
        WalletError::Rpc {
            code,
            message: format!("code {code}"),
        }
    }

    #[async_trait]
    impl WalletProvider for FakeWallet {
        async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
            Ok(self.accounts.clone())
        }

        async fn switch_chain(&self, _chain_id: &str) -> Result<(), WalletError> {
            self.switch_calls.fetch_add(1, Ordering::SeqCst);
            match self.switch_errors.lock().unwrap().pop_front() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }

        async fn add_chain(&self, _params: &ChainParams) -> Result<(), WalletError> {
            self.add_calls.fetch_add(1, Ordering::SeqCst);
            match self.add_errors.lock().unwrap().pop_front() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }

        async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, WalletError> {
            if let Some(error) = self.send_errors.lock().unwrap().pop_front() {
                return Err(error);
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push(request.clone());
            Ok(format!("0xhash{}", sent.len()))
        }
    }

    pub async fn connected_link(wallet: Arc<FakeWallet>) -> WalletLink {
        let link = WalletLink::new(Some(wallet));
        link.connect().await.expect("connect");
        link
    }
}
