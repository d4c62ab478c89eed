use thiserror::Error;

/// All error kinds surfaced by the client.
///
/// Every kind except transport/serialization internals maps to a fixed,
/// non-technical notification message via [`ClientError::user_message`].
/// Single-record failures during a join are not represented here: they are
/// recovered locally (the record is dropped with a logged diagnostic).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("no wallet connected")]
    NoWalletConnected,

    #[error("transaction rejected by user")]
    UserRejected,

    #[error("insufficient funds for transaction")]
    InsufficientFunds,

    /// The action is invalid given the campaign's current lifecycle state,
    /// e.g. withdrawing from an active campaign or cancelling a funded one.
    #[error("contract state conflict: {reason}")]
    ContractStateConflict { reason: String },

    /// Non-admin attempting an admin action, or a duplicate/missing admin.
    #[error("permission denied: {reason}")]
    PermissionDenied { reason: String },

    /// The metadata-store fetch failed during a refresh. Previously cached
    /// values are left untouched.
    #[error("aggregation failed: {reason}")]
    AggregationFailed { reason: String },

    /// Uncategorized ledger revert; carries the raw message for diagnostics.
    #[error("transaction failed: {message}")]
    TransactionFailed { message: String },

    #[error("rpc error: {reason}")]
    Rpc { reason: String },

    #[error("cache error: {reason}")]
    Cache { reason: String },

    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },
}

impl ClientError {
    /// Fixed user-facing notification text per kind.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NoWalletConnected => {
                "No wallet connected. Connect a wallet and try again.".to_string()
            }
            ClientError::UserRejected => "Transaction rejected by user".to_string(),
            ClientError::InsufficientFunds => "Insufficient funds for transaction".to_string(),
            ClientError::ContractStateConflict { reason } => reason.clone(),
            ClientError::PermissionDenied { reason } => reason.clone(),
            ClientError::AggregationFailed { .. } => "Failed to load campaigns".to_string(),
            ClientError::TransactionFailed { .. } => "Transaction failed".to_string(),
            ClientError::Rpc { .. } => "Could not reach the network".to_string(),
            ClientError::Cache { .. }
            | ClientError::Serialization { .. }
            | ClientError::InvalidAmount { .. } => "Something went wrong".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_reason() {
        let err = ClientError::ContractStateConflict {
            reason: "Campaign already exists".to_string(),
        };
        assert!(err.to_string().contains("Campaign already exists"));
    }

    #[test]
    fn test_user_message_is_fixed_for_generic_failures() {
        let err = ClientError::TransactionFailed {
            message: "revert 0xdeadbeef".to_string(),
        };
        // Raw diagnostics never leak into the notification channel.
        assert_eq!(err.user_message(), "Transaction failed");
    }
}
