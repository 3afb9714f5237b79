//! Trade Equalizer
//!
//! Forward-selection search that grows a two-team trade proposal, one player
//! or draft pick at a time, until a valuation oracle says the counterparty
//! accepts it, then stabilizes the result so that running the search again
//! changes nothing.
//!
//! - `trade`: data model, candidate collection and the search engine
//! - `scenario`: JSON league scenarios and a reference ledger oracle
//! - `cli`: command definitions and the application facade

pub mod cli;
pub mod error;
pub mod scenario;
pub mod trade;
pub mod types;

// Re-export commonly used types
pub use error::{EqualizerError, Result};
pub use trade::{
    Asset, AssetStore, CandidateCollector, Eligibility, EqualizationEngine, FirstAssetFilter,
    NegotiationContext, Party, ScoredAsset, TradeProposal, TradeSide, ValuationOracle,
    ValuationRequest,
};
pub use types::{DraftPickId, PlayerId, SessionKey, TeamId};
