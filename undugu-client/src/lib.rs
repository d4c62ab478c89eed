//! Campaign view aggregation and cache reconciliation for the Undugu
//! donation platform.
//!
//! The ledger is authoritative for financial state; the off-chain metadata
//! store supplies presentation metadata (images). This crate normalizes
//! loosely-typed ledger call results into strict records, fans out parallel
//! queries across both sources, merges the owned and administered
//! perspectives into one deduplicated view set, keeps a short-lived cache
//! of those views, and invalidates it on ledger events.
//!
//! Everything outside that — wallet plumbing, signing, toast presentation,
//! rendering — sits behind the [`ledger::LedgerClient`],
//! [`metadata::MetadataStore`] and [`notify::Notifier`] seams.

pub mod cache;
pub mod config;
pub mod events;
pub mod facade;
pub mod join;
pub mod ledger;
pub mod metadata;
pub mod normalize;
pub mod notify;
pub mod rpc;
pub mod testing;
pub mod views;

pub use undugu_types::campaign::{
    CampaignRecord, CreateCampaignArgs, DonationRecord, DonorRecord, MetadataRecord, StatusFilter,
    ViewRecord, WithdrawalRecord,
};
pub use undugu_types::error::ClientError;
pub use undugu_types::event::{EventKind, LedgerEvent};
