//! Trade proposal data model

use crate::error::{EqualizerError, Result};
use crate::types::{DraftPickId, PlayerId, SessionKey, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which side of the proposal a party or asset belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Party {
    /// The side asking for the deal to be made to work
    Requester,
    /// The side whose acceptance is being sought
    Counterparty,
}

/// A single asset that can move in a trade.
///
/// Identity is the id and owning side. The derived ordering (kind, owner, id)
/// is the total order used to break ties between equally scored candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Asset {
    Player { owner: Party, id: PlayerId },
    DraftPick { owner: Party, id: DraftPickId },
}

impl Asset {
    pub fn owner(&self) -> Party {
        match self {
            Asset::Player { owner, .. } | Asset::DraftPick { owner, .. } => *owner,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = match self.owner() {
            Party::Requester => "requester",
            Party::Counterparty => "counterparty",
        };
        match self {
            Asset::Player { id, .. } => write!(f, "{} ({})", id, owner),
            Asset::DraftPick { id, .. } => write!(f, "{} ({})", id, owner),
        }
    }
}

/// One party's half of a proposal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeSide {
    pub team: TeamId,
    /// Players this side gives up, in the order they were added
    #[serde(default)]
    pub players: Vec<PlayerId>,
    /// Draft picks this side gives up, in the order they were added
    #[serde(default)]
    pub picks: Vec<DraftPickId>,
    /// Players that must never be added
    #[serde(default)]
    pub excluded_players: BTreeSet<PlayerId>,
    /// Draft picks that must never be added
    #[serde(default)]
    pub excluded_picks: BTreeSet<DraftPickId>,
}

impl TradeSide {
    /// Empty side for a team
    pub fn new(team: TeamId) -> Self {
        Self {
            team,
            players: Vec::new(),
            picks: Vec::new(),
            excluded_players: BTreeSet::new(),
            excluded_picks: BTreeSet::new(),
        }
    }

    pub fn with_players(mut self, players: impl IntoIterator<Item = PlayerId>) -> Self {
        self.players.extend(players);
        self
    }

    pub fn with_picks(mut self, picks: impl IntoIterator<Item = DraftPickId>) -> Self {
        self.picks.extend(picks);
        self
    }

    pub fn excluding_players(mut self, players: impl IntoIterator<Item = PlayerId>) -> Self {
        self.excluded_players.extend(players);
        self
    }

    pub fn excluding_picks(mut self, picks: impl IntoIterator<Item = DraftPickId>) -> Self {
        self.excluded_picks.extend(picks);
        self
    }

    /// Player is already included or ruled out
    pub fn has_settled_player(&self, id: PlayerId) -> bool {
        self.players.contains(&id) || self.excluded_players.contains(&id)
    }

    /// Draft pick is already included or ruled out
    pub fn has_settled_pick(&self, id: DraftPickId) -> bool {
        self.picks.contains(&id) || self.excluded_picks.contains(&id)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for id in &self.players {
            if !seen.insert(*id) {
                return Err(EqualizerError::InvalidProposal(format!(
                    "{} included twice by {}",
                    id, self.team
                )));
            }
            if self.excluded_players.contains(id) {
                return Err(EqualizerError::InvalidProposal(format!(
                    "{} both included and excluded by {}",
                    id, self.team
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for id in &self.picks {
            if !seen.insert(*id) {
                return Err(EqualizerError::InvalidProposal(format!(
                    "{} included twice by {}",
                    id, self.team
                )));
            }
            if self.excluded_picks.contains(id) {
                return Err(EqualizerError::InvalidProposal(format!(
                    "{} both included and excluded by {}",
                    id, self.team
                )));
            }
        }

        Ok(())
    }
}

/// A complete two-sided trade proposal.
///
/// Proposals are values: adding an asset produces a new proposal and leaves
/// the original untouched, so rolling back a round is just keeping the old one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub requester: TradeSide,
    pub counterparty: TradeSide,
}

impl TradeProposal {
    pub fn new(requester: TradeSide, counterparty: TradeSide) -> Self {
        Self {
            requester,
            counterparty,
        }
    }

    pub fn side(&self, party: Party) -> &TradeSide {
        match party {
            Party::Requester => &self.requester,
            Party::Counterparty => &self.counterparty,
        }
    }

    fn side_mut(&mut self, party: Party) -> &mut TradeSide {
        match party {
            Party::Requester => &mut self.requester,
            Party::Counterparty => &mut self.counterparty,
        }
    }

    /// New proposal with `asset` added to its owner's included set
    pub fn with_asset(&self, asset: &Asset) -> Self {
        let mut next = self.clone();
        let side = next.side_mut(asset.owner());
        match *asset {
            Asset::Player { id, .. } => side.players.push(id),
            Asset::DraftPick { id, .. } => side.picks.push(id),
        }
        next
    }

    /// Whether the asset is currently part of the deal
    pub fn includes(&self, asset: &Asset) -> bool {
        let side = self.side(asset.owner());
        match asset {
            Asset::Player { id, .. } => side.players.contains(id),
            Asset::DraftPick { id, .. } => side.picks.contains(id),
        }
    }

    /// Every included asset, requester first, players before picks
    pub fn included_assets(&self) -> Vec<Asset> {
        let mut assets = Vec::with_capacity(self.asset_count());
        for party in [Party::Requester, Party::Counterparty] {
            let side = self.side(party);
            assets.extend(side.players.iter().map(|&id| Asset::Player { owner: party, id }));
            assets.extend(side.picks.iter().map(|&id| Asset::DraftPick { owner: party, id }));
        }
        assets
    }

    /// Number of included assets across both sides
    pub fn asset_count(&self) -> usize {
        self.requester.players.len()
            + self.requester.picks.len()
            + self.counterparty.players.len()
            + self.counterparty.picks.len()
    }

    /// Assets included here that `base` does not include
    pub fn added_since(&self, base: &TradeProposal) -> Vec<Asset> {
        self.included_assets()
            .into_iter()
            .filter(|asset| !base.includes(asset))
            .collect()
    }

    /// Check the data model invariants
    pub fn validate(&self) -> Result<()> {
        if self.requester.team == self.counterparty.team {
            return Err(EqualizerError::InvalidProposal(format!(
                "{} cannot trade with itself",
                self.requester.team
            )));
        }

        self.requester.validate()?;
        self.counterparty.validate()?;

        if let Some(id) = self
            .requester
            .players
            .iter()
            .find(|id| self.counterparty.players.contains(id))
        {
            return Err(EqualizerError::InvalidProposal(format!(
                "{} included on both sides",
                id
            )));
        }

        if let Some(id) = self
            .requester
            .picks
            .iter()
            .find(|id| self.counterparty.picks.contains(id))
        {
            return Err(EqualizerError::InvalidProposal(format!(
                "{} included on both sides",
                id
            )));
        }

        Ok(())
    }
}

/// A candidate asset with the counterparty's dv for the proposal that adds it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredAsset {
    pub asset: Asset,
    pub dv: f64,
}

/// Position restriction for the very first asset added ("I am looking for X")
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstAssetFilter {
    pub positions: BTreeSet<String>,
    /// Match any position code containing a requested code (`G` matches `PG`, `SG`)
    #[serde(default)]
    pub composite: bool,
}

impl FirstAssetFilter {
    pub fn positions<I, S>(positions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            positions: positions.into_iter().map(Into::into).collect(),
            composite: false,
        }
    }

    pub fn composite(mut self, composite: bool) -> Self {
        self.composite = composite;
        self
    }

    /// An empty filter restricts nothing
    pub fn is_active(&self) -> bool {
        !self.positions.is_empty()
    }

    pub fn matches(&self, position: &str) -> bool {
        if self.composite {
            self.positions.iter().any(|wanted| position.contains(wanted.as_str()))
        } else {
            self.positions.contains(position)
        }
    }
}

/// Parameters of one top-level equalization
#[derive(Clone, Debug, PartialEq)]
pub struct NegotiationContext {
    /// Never add assets from the requester's side
    pub hold_requester_constant: bool,
    /// Restriction applied to the first asset added only
    pub first_asset_filter: Option<FirstAssetFilter>,
    /// Cap on assets added; `None` is unbounded
    pub max_assets_to_add: Option<usize>,
    pub session_key: SessionKey,
}

impl NegotiationContext {
    /// Unbounded context with a freshly drawn session key
    pub fn new(hold_requester_constant: bool) -> Self {
        Self {
            hold_requester_constant,
            first_asset_filter: None,
            max_assets_to_add: None,
            session_key: SessionKey::random(),
        }
    }

    pub fn with_first_asset_filter(mut self, filter: FirstAssetFilter) -> Self {
        self.first_asset_filter = Some(filter).filter(FirstAssetFilter::is_active);
        self
    }

    pub fn with_max_assets(mut self, max_assets_to_add: usize) -> Self {
        self.max_assets_to_add = Some(max_assets_to_add);
        self
    }

    pub fn with_session_key(mut self, session_key: SessionKey) -> Self {
        self.session_key = session_key;
        self
    }

    /// No further asset may be added after `added` additions
    pub fn budget_exhausted(&self, added: usize) -> bool {
        self.max_assets_to_add.is_some_and(|max| added >= max)
    }

    /// Budget left after `added` additions; `None` stays unbounded
    pub fn remaining_after(&self, added: usize) -> Option<usize> {
        self.max_assets_to_add.map(|max| max.saturating_sub(added))
    }

    /// Context for the stabilization pass: same hold flag and key, reduced
    /// budget, no first-asset restriction
    pub fn stabilization(&self, remaining: Option<usize>) -> Self {
        Self {
            hold_requester_constant: self.hold_requester_constant,
            first_asset_filter: None,
            max_assets_to_add: remaining,
            session_key: self.session_key,
        }
    }
}
