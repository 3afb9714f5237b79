//! Asset store and eligibility seams

use crate::error::Result;
use crate::types::{DraftPickId, PlayerId, TeamId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Player as seen by the candidate collector
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub team: TeamId,
    #[serde(default)]
    pub name: String,
    /// Position code, e.g. `PG` or `C`
    pub position: String,
    /// Set when the player cannot currently be traded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untradable_reason: Option<String>,
}

/// Draft pick as seen by the candidate collector
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DraftPickRecord {
    pub id: DraftPickId,
    pub team: TeamId,
    pub season: u16,
    pub round: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untradable_reason: Option<String>,
}

/// Read-only access to the assets a team owns
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn players_owned_by(&self, team: TeamId) -> Result<Vec<PlayerRecord>>;

    async fn picks_owned_by(&self, team: TeamId) -> Result<Vec<DraftPickRecord>>;
}

/// Borrowed view of a stored asset, handed to the eligibility rule
#[derive(Clone, Copy, Debug)]
pub enum AssetRecord<'a> {
    Player(&'a PlayerRecord),
    DraftPick(&'a DraftPickRecord),
}

impl AssetRecord<'_> {
    fn untradable_reason(&self) -> Option<&str> {
        match self {
            AssetRecord::Player(p) => p.untradable_reason.as_deref(),
            AssetRecord::DraftPick(dp) => dp.untradable_reason.as_deref(),
        }
    }
}

/// Whether an asset may be negotiated
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tradability {
    Tradable,
    Untradable { reason: String },
}

/// Eligibility predicate over stored assets
pub trait Eligibility: Send + Sync {
    fn tradability(&self, record: AssetRecord<'_>) -> Tradability;
}

/// Eligibility taken from the `untradable_reason` flag carried by each record
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordFlags;

impl Eligibility for RecordFlags {
    fn tradability(&self, record: AssetRecord<'_>) -> Tradability {
        match record.untradable_reason() {
            Some(reason) => Tradability::Untradable {
                reason: reason.to_string(),
            },
            None => Tradability::Tradable,
        }
    }
}
