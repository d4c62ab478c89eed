//! Test doubles for the external seams: a scriptable ledger and a
//! recording notifier. Used by this crate's own tests; exported so
//! downstream consumers can drive the aggregation layer without a chain.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use undugu_types::error::ClientError;
use undugu_types::event::{EventKind, LedgerEvent};
use undugu_types::primitives::{Address, Amount};

use crate::ledger::{EventHub, LedgerClient, TxError, TxReceipt};
use crate::notify::Notifier;

type CallResponder = Box<dyn Fn(&[Value]) -> Result<Value, ClientError> + Send + Sync>;

/// A state-changing transaction as the mock received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTx {
    pub method: String,
    pub params: Vec<Value>,
    pub from: Address,
    pub value: Option<Amount>,
}

/// Scriptable in-memory ledger.
///
/// Read methods are answered by registered responder closures; sends
/// succeed with a canned receipt unless a failure is scripted for the
/// method. Every send is recorded for assertion.
pub struct MockLedger {
    account: Option<Address>,
    balance: Mutex<Amount>,
    calls: Mutex<HashMap<String, CallResponder>>,
    send_failures: Mutex<HashMap<String, TxError>>,
    sent: Mutex<Vec<SentTx>>,
    events: EventHub,
}

impl MockLedger {
    pub fn new(account: Option<Address>) -> Self {
        Self {
            account,
            balance: Mutex::new(Amount::MAX),
            calls: Mutex::new(HashMap::new()),
            send_failures: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            events: EventHub::default(),
        }
    }

    pub fn set_balance(&self, balance: Amount) {
        *self.balance.lock().unwrap() = balance;
    }

    /// Script a read method. The responder sees the call parameters.
    pub fn on_call<F>(&self, method: &str, responder: F)
    where
        F: Fn(&[Value]) -> Result<Value, ClientError> + Send + Sync + 'static,
    {
        self.calls
            .lock()
            .unwrap()
            .insert(method.to_string(), Box::new(responder));
    }

    /// Script a fixed read result.
    pub fn on_call_value(&self, method: &str, value: Value) {
        self.on_call(method, move |_| Ok(value.clone()));
    }

    /// Script the next (and every) send of `method` to fail.
    pub fn fail_send(&self, method: &str, error: TxError) {
        self.send_failures
            .lock()
            .unwrap()
            .insert(method.to_string(), error);
    }

    /// Everything sent so far.
    pub fn sent(&self) -> Vec<SentTx> {
        self.sent.lock().unwrap().clone()
    }

    /// Push a contract event to subscribers.
    pub fn publish_event(&self, event: LedgerEvent) -> usize {
        self.events.publish(event)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn call(
        &self,
        method: &str,
        params: Vec<Value>,
        _from: Option<&str>,
    ) -> Result<Value, ClientError> {
        let calls = self.calls.lock().unwrap();
        match calls.get(method) {
            Some(responder) => responder(&params),
            None => Err(ClientError::Rpc {
                reason: format!("no responder scripted for '{method}'"),
            }),
        }
    }

    async fn send(
        &self,
        method: &str,
        params: Vec<Value>,
        from: &str,
        value: Option<Amount>,
    ) -> Result<TxReceipt, TxError> {
        self.sent.lock().unwrap().push(SentTx {
            method: method.to_string(),
            params,
            from: from.to_string(),
            value,
        });
        if let Some(err) = self.send_failures.lock().unwrap().get(method) {
            return Err(err.clone());
        }
        Ok(TxReceipt {
            transaction_hash: format!("0xtx-{method}"),
            block_hash: "0xblock".to_string(),
        })
    }

    fn active_account(&self) -> Option<Address> {
        self.account.clone()
    }

    async fn balance_of(&self, _account: &str) -> Result<Amount, ClientError> {
        Ok(*self.balance.lock().unwrap())
    }

    fn subscribe(&self, kind: EventKind) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe(kind)
    }
}

/// Notifier that records every message for assertion.
#[derive(Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}
