//! Scenario files and the reference ledger oracle

pub mod ledger;
pub mod snapshot;

pub use ledger::{LedgerOracle, LedgerSettings};
pub use snapshot::{LeagueSnapshot, RosterPick, RosterPlayer, Scenario};
