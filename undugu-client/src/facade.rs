//! Typed read/write operations over the donation contract, with a closed
//! error-translation table from revert reasons and wallet rejection codes
//! to the stable [`ClientError`] taxonomy.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use tracing::{debug, info, warn};

use undugu_types::campaign::{
    CampaignRecord, CreateCampaignArgs, DonationRecord, DonorRecord, WithdrawalRecord,
};
use undugu_types::error::ClientError;
use undugu_types::primitives::{Address, Amount, CampaignId};
use undugu_types::units;

use crate::ledger::{LedgerClient, TxError, TxReceipt, USER_REJECTED_CODE};
use crate::normalize;
use crate::notify::Notifier;

/// Full detail for one campaign: the record, the donor count, and the donor
/// list in ledger order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignDetail {
    pub campaign: CampaignRecord,
    pub donor_count: u64,
    pub donors: Vec<DonorRecord>,
}

/// Revert-reason substrings that mean a non-admin (or duplicate/missing
/// admin) tried an admin action.
const PERMISSION_REVERTS: &[&str] = &[
    "Only Admins Can Perform This Action",
    "This Address Is Already An Admin",
    "This Address Is Not An Admin",
];

/// Revert-reason substrings that mean the action is invalid for the
/// campaign's current lifecycle state.
const STATE_CONFLICT_REVERTS: &[&str] = &[
    "This Campaign Has Already Been Completed",
    "This Campaign Has Already Raised Funds! Refund First Then Cancel",
    "This Campaign Is Successful Cannot be Cancelled",
    "You Can't Withdraw Funds from an Active Campaign",
    "Amount Cannot be Zero Or Exceed The Raised Amount",
    "Donation Amount Cannot be Zero",
    "The Amount And Value Don't Match",
    "Campaign already exists",
    "Insufficient contract balance",
    "Transfer failed",
    "Refund Was Unsuccessful",
];

/// Classify a raw transaction failure.
///
/// A wallet-level user-rejection code wins over any message text; then the
/// substring tables; anything unrecognized falls through to
/// `TransactionFailed` carrying the raw message.
pub fn classify_tx_error(err: &TxError) -> ClientError {
    if err.code == Some(USER_REJECTED_CODE) {
        return ClientError::UserRejected;
    }
    if err.message.to_lowercase().contains("insufficient funds") {
        return ClientError::InsufficientFunds;
    }
    for reason in PERMISSION_REVERTS {
        if err.message.contains(reason) {
            return ClientError::PermissionDenied {
                reason: (*reason).to_string(),
            };
        }
    }
    for reason in STATE_CONFLICT_REVERTS {
        if err.message.contains(reason) {
            return ClientError::ContractStateConflict {
                reason: (*reason).to_string(),
            };
        }
    }
    ClientError::TransactionFailed {
        message: err.message.clone(),
    }
}

/// Typed query/transaction surface over the donation contract.
pub struct DonationService {
    ledger: Arc<dyn LedgerClient>,
    notifier: Arc<dyn Notifier>,
}

impl DonationService {
    pub fn new(ledger: Arc<dyn LedgerClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self { ledger, notifier }
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    /// The connected signing account, or `NoWalletConnected`.
    pub fn require_account(&self) -> Result<Address, ClientError> {
        self.ledger
            .active_account()
            .ok_or(ClientError::NoWalletConnected)
    }

    /// Surface an error to the notification channel and return it typed.
    fn report(&self, err: ClientError) -> ClientError {
        self.notifier.error(&err.user_message());
        err
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    /// Campaigns owned by the given account.
    pub async fn list_campaigns_owned_by(
        &self,
        account: &str,
    ) -> Result<Vec<CampaignRecord>, ClientError> {
        let raw = self
            .ledger
            .call("viewCampaigns", Vec::new(), Some(account))
            .await?;
        Ok(normalize::normalize_campaign_list(&raw))
    }

    /// Detail, donor count, and donor list for one campaign.
    pub async fn campaign_detail(
        &self,
        id: CampaignId,
        address: &str,
    ) -> Result<CampaignDetail, ClientError> {
        let raw = self
            .ledger
            .call("getCampaignDetails", vec![json!(id), json!(address)], None)
            .await?;
        let campaign = normalize::field(&raw, "details", 0)
            .map(normalize::normalize_campaign)
            .unwrap_or_else(|| normalize::normalize_campaign(&serde_json::Value::Null));
        let donor_count = normalize::read_u64(&raw, "number", 1);
        let donors = normalize::read_array(&raw, "donors", 2)
            .iter()
            .map(normalize::normalize_donor)
            .collect();
        Ok(CampaignDetail {
            campaign,
            donor_count,
            donors,
        })
    }

    /// Whether `admin` is an active admin of the campaign contract.
    pub async fn is_admin(&self, admin: &str, campaign_address: &str) -> Result<bool, ClientError> {
        let raw = self
            .ledger
            .call("admins", vec![json!(campaign_address), json!(admin)], None)
            .await?;
        Ok(match raw {
            serde_json::Value::Bool(b) => b,
            serde_json::Value::String(s) => s.eq_ignore_ascii_case("true"),
            _ => false,
        })
    }

    /// The withdrawal log and admin candidate list of a campaign contract.
    pub async fn withdrawals_and_admins(
        &self,
        campaign_address: &str,
    ) -> Result<(Vec<WithdrawalRecord>, Vec<Address>), ClientError> {
        let raw = self
            .ledger
            .call("viewWithdrawals", vec![json!(campaign_address)], None)
            .await?;
        Ok(normalize::normalize_withdrawals_and_admins(&raw))
    }

    /// Just the withdrawal log.
    pub async fn list_withdrawals_of(
        &self,
        campaign_address: &str,
    ) -> Result<Vec<WithdrawalRecord>, ClientError> {
        Ok(self.withdrawals_and_admins(campaign_address).await?.0)
    }

    /// Active admins of a campaign contract. Candidates come from the
    /// ledger's withdrawal log; each is checked concurrently and inactive
    /// ones are filtered out. A failed status check drops that candidate
    /// with a diagnostic rather than failing the list.
    pub async fn list_admins_of(
        &self,
        campaign_address: &str,
    ) -> Result<Vec<Address>, ClientError> {
        let (_, candidates) = self.withdrawals_and_admins(campaign_address).await?;
        let checks = candidates.iter().map(|candidate| async move {
            match self.is_admin(candidate, campaign_address).await {
                Ok(active) => (candidate.clone(), active),
                Err(err) => {
                    warn!(admin = %candidate, %err, "admin status check failed, dropping candidate");
                    (candidate.clone(), false)
                }
            }
        });
        Ok(join_all(checks)
            .await
            .into_iter()
            .filter_map(|(address, active)| active.then_some(address))
            .collect())
    }

    /// The caller's own donations.
    pub async fn list_donations(&self, account: &str) -> Result<Vec<DonationRecord>, ClientError> {
        let raw = self
            .ledger
            .call("viewDonations", Vec::new(), Some(account))
            .await?;
        match &raw {
            serde_json::Value::Array(items) => {
                Ok(items.iter().map(normalize::normalize_donation).collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    // ─── Writes ──────────────────────────────────────────────────────────

    async fn submit(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
        value: Option<Amount>,
    ) -> Result<TxReceipt, ClientError> {
        let account = self
            .require_account()
            .map_err(|err| self.report(err))?;
        debug!(%method, %account, "submitting transaction");
        match self.ledger.send(method, params, &account, value).await {
            Ok(receipt) => {
                info!(%method, tx = %receipt.transaction_hash, "transaction mined");
                Ok(receipt)
            }
            Err(raw) => Err(self.report(classify_tx_error(&raw))),
        }
    }

    /// Create a campaign. The display-unit target is converted to minor
    /// units here; duration is in days.
    pub async fn create_campaign(
        &self,
        args: &CreateCampaignArgs,
    ) -> Result<TxReceipt, ClientError> {
        let target_wei = units::to_wei(&args.target).map_err(|err| self.report(err))?;
        self.submit(
            "createCampaign",
            vec![
                json!(args.title),
                json!(args.description),
                json!(target_wei.to_string()),
                json!(args.duration_days),
            ],
            None,
        )
        .await
    }

    pub async fn add_admin(&self, admin: &str) -> Result<TxReceipt, ClientError> {
        self.submit("addCampaignAdmin", vec![json!(admin)], None)
            .await
    }

    pub async fn remove_admin(&self, admin: &str) -> Result<TxReceipt, ClientError> {
        self.submit("removeCampaignAdmin", vec![json!(admin)], None)
            .await
    }

    pub async fn cancel_campaign(
        &self,
        id: CampaignId,
        address: &str,
    ) -> Result<TxReceipt, ClientError> {
        self.submit("cancelCampaign", vec![json!(id), json!(address)], None)
            .await
    }

    pub async fn refund_donors(
        &self,
        id: CampaignId,
        address: &str,
    ) -> Result<TxReceipt, ClientError> {
        self.submit("refundDonors", vec![json!(id), json!(address)], None)
            .await
    }

    /// Donate to a campaign. The transaction value equals the donation
    /// amount; the caller's balance is pre-checked so an obviously
    /// unfundable donation fails before reaching the wallet.
    pub async fn donate(
        &self,
        address: &str,
        id: CampaignId,
        amount_wei: Amount,
    ) -> Result<TxReceipt, ClientError> {
        let account = self
            .require_account()
            .map_err(|err| self.report(err))?;
        let balance = self.ledger.balance_of(&account).await?;
        if balance < amount_wei {
            return Err(self.report(ClientError::InsufficientFunds));
        }
        self.submit(
            "donateToCampaign",
            vec![json!(address), json!(id), json!(amount_wei.to_string())],
            Some(amount_wei),
        )
        .await
    }

    /// Withdraw raised funds to a recipient. The campaign must already be
    /// completed; that is pre-checked against the ledger so the conflict
    /// surfaces without spending gas.
    pub async fn withdraw(
        &self,
        id: CampaignId,
        address: &str,
        amount_wei: Amount,
        recipient: &str,
    ) -> Result<TxReceipt, ClientError> {
        let detail = self.campaign_detail(id, address).await?;
        if !detail.campaign.is_completed {
            return Err(self.report(ClientError::ContractStateConflict {
                reason: "You Can't Withdraw Funds from an Active Campaign".to_string(),
            }));
        }
        self.submit(
            "withdrawFunds",
            vec![
                json!(id),
                json!(address),
                json!(amount_wei.to_string()),
                json!(recipient),
            ],
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_insufficient_funds_substring() {
        let err = TxError::reverted("execution reverted: Insufficient Funds for gas * price");
        assert_eq!(classify_tx_error(&err), ClientError::InsufficientFunds);
    }

    #[test]
    fn test_classify_user_rejection_wins_over_substrings() {
        let err = TxError {
            code: Some(USER_REJECTED_CODE),
            message: "insufficient funds".to_string(),
        };
        assert_eq!(classify_tx_error(&err), ClientError::UserRejected);
    }

    #[test]
    fn test_classify_permission_denied() {
        let err = TxError::reverted("revert: Only Admins Can Perform This Action!");
        assert!(matches!(
            classify_tx_error(&err),
            ClientError::PermissionDenied { .. }
        ));
    }

    #[test]
    fn test_classify_state_conflicts() {
        for reason in STATE_CONFLICT_REVERTS {
            let err = TxError::reverted(format!("execution reverted: {reason}!"));
            assert!(
                matches!(
                    classify_tx_error(&err),
                    ClientError::ContractStateConflict { .. }
                ),
                "{reason} should classify as a state conflict"
            );
        }
    }

    #[test]
    fn test_classify_unknown_falls_through_with_raw_message() {
        let err = TxError::reverted("revert: 0xdeadbeef");
        match classify_tx_error(&err) {
            ClientError::TransactionFailed { message } => {
                assert!(message.contains("0xdeadbeef"))
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }
}
