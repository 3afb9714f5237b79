//! Trade equalization: candidate collection and forward selection

pub mod collector;
pub mod engine;
pub mod oracle;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use collector::CandidateCollector;
pub use engine::{select_concession, EqualizationEngine};
pub use oracle::{ValuationOracle, ValuationRequest};
pub use store::{
    AssetRecord, AssetStore, DraftPickRecord, Eligibility, PlayerRecord, RecordFlags, Tradability,
};
pub use types::{
    Asset, FirstAssetFilter, NegotiationContext, Party, ScoredAsset, TradeProposal, TradeSide,
};
