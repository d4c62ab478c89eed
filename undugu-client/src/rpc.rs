use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use undugu_types::error::ClientError;
use undugu_types::event::{EventKind, LedgerEvent};
use undugu_types::primitives::{Address, Amount};

use crate::ledger::{EventHub, LedgerClient, TxError, TxReceipt};

/// Default RPC request timeout in seconds.
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Outcome of a gateway-submitted transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SendOutcome {
    success: bool,
    transaction_hash: Option<String>,
    block_hash: Option<String>,
    /// Wallet-level rejection code, when the wallet declined to sign.
    code: Option<i64>,
    /// Revert reason or transport diagnostic on failure.
    reason: Option<String>,
}

/// JSON-RPC ledger client talking to the platform gateway.
///
/// The gateway owns contract ABI encoding and wallet session state; this
/// client forwards logical method names and JSON parameters. Events pushed
/// by the gateway are fed into [`EventHub`] via [`RpcLedgerClient::publish_event`].
pub struct RpcLedgerClient {
    client: HttpClient,
    account: Option<Address>,
    events: EventHub,
}

impl RpcLedgerClient {
    /// Connect to the gateway. `account` is the active signing account, if
    /// a wallet session exists.
    pub fn new(url: &str, account: Option<Address>) -> Result<Self, ClientError> {
        Self::with_timeout(url, account, DEFAULT_RPC_TIMEOUT_SECS)
    }

    pub fn with_timeout(
        url: &str,
        account: Option<Address>,
        timeout_secs: u64,
    ) -> Result<Self, ClientError> {
        let client = HttpClientBuilder::default()
            .request_timeout(std::time::Duration::from_secs(timeout_secs))
            .build(url)
            .map_err(|e| ClientError::Rpc {
                reason: format!("failed to connect: {}", e),
            })?;
        Ok(Self {
            client,
            account,
            events: EventHub::default(),
        })
    }

    /// Wrap an RPC failure with a better connection error message.
    fn map_rpc_error(e: &jsonrpsee::core::ClientError) -> ClientError {
        let msg = e.to_string();
        if msg.contains("connection")
            || msg.contains("Connection")
            || msg.contains("refused")
            || msg.contains("SendRequest")
            || msg.contains("send request")
        {
            ClientError::Rpc {
                reason: "could not connect to the gateway".to_string(),
            }
        } else {
            ClientError::Rpc { reason: msg }
        }
    }

    /// Feed a gateway-pushed contract event to subscribers.
    pub fn publish_event(&self, event: LedgerEvent) -> usize {
        self.events.publish(event)
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
        from: Option<&str>,
    ) -> Result<serde_json::Value, ClientError> {
        let result: serde_json::Value = self
            .client
            .request("undugu_call", rpc_params![method, params, from])
            .await
            .map_err(|e| Self::map_rpc_error(&e))?;
        Ok(result)
    }

    async fn send(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
        from: &str,
        value: Option<Amount>,
    ) -> Result<TxReceipt, TxError> {
        // Native value travels as a decimal string; the wire must never
        // carry amounts as floating point.
        let value = value.map(|v| v.to_string());
        let outcome: SendOutcome = self
            .client
            .request("undugu_send", rpc_params![method, params, from, value])
            .await
            .map_err(|e| TxError::reverted(Self::map_rpc_error(&e).to_string()))?;
        if outcome.success {
            Ok(TxReceipt {
                transaction_hash: outcome.transaction_hash.unwrap_or_default(),
                block_hash: outcome.block_hash.unwrap_or_default(),
            })
        } else {
            Err(TxError {
                code: outcome.code,
                message: outcome.reason.unwrap_or_else(|| "transaction failed".to_string()),
            })
        }
    }

    fn active_account(&self) -> Option<Address> {
        self.account.clone()
    }

    async fn balance_of(&self, account: &str) -> Result<Amount, ClientError> {
        let balance: String = self
            .client
            .request("undugu_balance", rpc_params![account])
            .await
            .map_err(|e| Self::map_rpc_error(&e))?;
        balance.parse().map_err(|_| ClientError::Serialization {
            reason: format!("gateway returned unparsable balance '{}'", balance),
        })
    }

    fn subscribe(&self, kind: EventKind) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe(kind)
    }
}
