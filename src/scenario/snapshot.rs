//! League scenario file: rosters, the opening offer and oracle settings

use crate::error::{EqualizerError, Result};
use crate::trade::{AssetStore, DraftPickRecord, PlayerRecord, TradeProposal, TradeSide};
use crate::types::{DraftPickId, PlayerId, TeamId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::ledger::{LedgerOracle, LedgerSettings};

/// Player entry with its ledger value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterPlayer {
    #[serde(flatten)]
    pub record: PlayerRecord,
    pub value: f64,
}

/// Draft pick entry with its ledger value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterPick {
    #[serde(flatten)]
    pub record: DraftPickRecord,
    pub value: f64,
}

/// In-memory league: every player and pick, keyed by owning team
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    #[serde(default)]
    pub players: Vec<RosterPlayer>,
    #[serde(default)]
    pub draft_picks: Vec<RosterPick>,
}

impl LeagueSnapshot {
    pub fn player(&self, id: PlayerId) -> Option<&RosterPlayer> {
        self.players.iter().find(|p| p.record.id == id)
    }

    pub fn pick(&self, id: DraftPickId) -> Option<&RosterPick> {
        self.draft_picks.iter().find(|dp| dp.record.id == id)
    }

    /// Ledger oracle valuing assets as listed here
    pub fn ledger(&self, settings: &LedgerSettings) -> LedgerOracle {
        let players = self
            .players
            .iter()
            .map(|p| (p.record.id, p.value))
            .collect::<HashMap<_, _>>();
        let picks = self
            .draft_picks
            .iter()
            .map(|dp| (dp.record.id, dp.value))
            .collect::<HashMap<_, _>>();
        LedgerOracle::new(players, picks).with_settings(settings.clone())
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for player in &self.players {
            if !seen.insert(player.record.id) {
                return Err(EqualizerError::InvalidConfig(format!(
                    "duplicate {}",
                    player.record.id
                )));
            }
            if !player.value.is_finite() {
                return Err(EqualizerError::InvalidConfig(format!(
                    "{} has non-finite value",
                    player.record.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for pick in &self.draft_picks {
            if !seen.insert(pick.record.id) {
                return Err(EqualizerError::InvalidConfig(format!(
                    "duplicate {}",
                    pick.record.id
                )));
            }
            if !pick.value.is_finite() {
                return Err(EqualizerError::InvalidConfig(format!(
                    "{} has non-finite value",
                    pick.record.id
                )));
            }
        }

        Ok(())
    }

    /// Every asset a side mentions must exist and belong to that side's team
    fn check_side(&self, side: &TradeSide) -> Result<()> {
        for id in side.players.iter().chain(&side.excluded_players) {
            let owner = self
                .player(*id)
                .ok_or_else(|| EqualizerError::InvalidConfig(format!("unknown {}", id)))?
                .record
                .team;
            if owner != side.team {
                return Err(EqualizerError::InvalidConfig(format!(
                    "{} belongs to {}, not {}",
                    id, owner, side.team
                )));
            }
        }

        for id in side.picks.iter().chain(&side.excluded_picks) {
            let owner = self
                .pick(*id)
                .ok_or_else(|| EqualizerError::InvalidConfig(format!("unknown {}", id)))?
                .record
                .team;
            if owner != side.team {
                return Err(EqualizerError::InvalidConfig(format!(
                    "{} belongs to {}, not {}",
                    id, owner, side.team
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl AssetStore for LeagueSnapshot {
    async fn players_owned_by(&self, team: TeamId) -> Result<Vec<PlayerRecord>> {
        Ok(self
            .players
            .iter()
            .filter(|p| p.record.team == team)
            .map(|p| p.record.clone())
            .collect())
    }

    async fn picks_owned_by(&self, team: TeamId) -> Result<Vec<DraftPickRecord>> {
        Ok(self
            .draft_picks
            .iter()
            .filter(|dp| dp.record.team == team)
            .map(|dp| dp.record.clone())
            .collect())
    }
}

/// A complete scenario as read from disk
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub league: LeagueSnapshot,
    pub offer: TradeProposal,
    #[serde(default)]
    pub valuation: LedgerSettings,
}

impl Scenario {
    /// Load and validate a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse and validate a scenario from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        self.league.validate()?;
        self.offer.validate()?;
        self.league.check_side(&self.offer.requester)?;
        self.league.check_side(&self.offer.counterparty)?;

        let LedgerSettings { premium, jitter } = self.valuation;
        if !premium.is_finite() || premium <= -1.0 {
            return Err(EqualizerError::InvalidConfig(format!(
                "premium must be greater than -1, got {}",
                premium
            )));
        }
        if !jitter.is_finite() || jitter < 0.0 {
            return Err(EqualizerError::InvalidConfig(format!(
                "jitter must be non-negative, got {}",
                jitter
            )));
        }

        Ok(())
    }
}
