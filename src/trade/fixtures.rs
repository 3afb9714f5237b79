//! Shared test fixtures for the trade module

use crate::error::Result;
use crate::types::{DraftPickId, PlayerId, SessionKey, TeamId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::oracle::{ValuationOracle, ValuationRequest};
use super::store::{AssetStore, DraftPickRecord, PlayerRecord};
use super::types::{TradeProposal, TradeSide};

pub(crate) const REQUESTER: TeamId = TeamId(1);
pub(crate) const COUNTERPARTY: TeamId = TeamId(2);

/// Asset store backed by plain vectors
#[derive(Default)]
pub(crate) struct InMemoryStore {
    players: Vec<PlayerRecord>,
    picks: Vec<DraftPickRecord>,
}

impl InMemoryStore {
    pub(crate) fn player(mut self, id: u32, team: TeamId, position: &str) -> Self {
        self.players.push(PlayerRecord {
            id: PlayerId(id),
            team,
            name: format!("Player {}", id),
            position: position.to_string(),
            untradable_reason: None,
        });
        self
    }

    pub(crate) fn untradable_player(mut self, id: u32, team: TeamId, position: &str) -> Self {
        self = self.player(id, team, position);
        if let Some(last) = self.players.last_mut() {
            last.untradable_reason = Some("Recently signed".to_string());
        }
        self
    }

    pub(crate) fn pick(mut self, id: u32, team: TeamId) -> Self {
        self.picks.push(DraftPickRecord {
            id: DraftPickId(id),
            team,
            season: 2027,
            round: 1,
            untradable_reason: None,
        });
        self
    }

    pub(crate) fn untradable_pick(mut self, id: u32, team: TeamId) -> Self {
        self = self.pick(id, team);
        if let Some(last) = self.picks.last_mut() {
            last.untradable_reason = Some("Protected".to_string());
        }
        self
    }
}

#[async_trait]
impl AssetStore for InMemoryStore {
    async fn players_owned_by(&self, team: TeamId) -> Result<Vec<PlayerRecord>> {
        Ok(self.players.iter().filter(|p| p.team == team).cloned().collect())
    }

    async fn picks_owned_by(&self, team: TeamId) -> Result<Vec<DraftPickRecord>> {
        Ok(self.picks.iter().filter(|dp| dp.team == team).cloned().collect())
    }
}

/// Requester: players 1 (PG), 2 (C), pick 100.
/// Counterparty: players 20 (PG), 21 (SF), 22 (C), 23 (SG, untradable),
/// picks 200, 201 (untradable).
pub(crate) fn league() -> InMemoryStore {
    InMemoryStore::default()
        .player(1, REQUESTER, "PG")
        .player(2, REQUESTER, "C")
        .pick(100, REQUESTER)
        .player(20, COUNTERPARTY, "PG")
        .player(21, COUNTERPARTY, "SF")
        .player(22, COUNTERPARTY, "C")
        .untradable_player(23, COUNTERPARTY, "SG")
        .pick(200, COUNTERPARTY)
        .untradable_pick(201, COUNTERPARTY)
}

/// Empty proposal between the two fixture teams
pub(crate) fn proposal_between() -> TradeProposal {
    TradeProposal::new(TradeSide::new(REQUESTER), TradeSide::new(COUNTERPARTY))
}

type Script = dyn Fn(&ValuationRequest<'_>) -> f64 + Send + Sync;

/// Oracle driven by a closure, recording every call it receives
pub(crate) struct ScriptedOracle {
    script: Box<Script>,
    calls: AtomicUsize,
    keys: Mutex<Vec<SessionKey>>,
}

impl ScriptedOracle {
    pub(crate) fn new(script: impl Fn(&ValuationRequest<'_>) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn keys(&self) -> Vec<SessionKey> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ValuationOracle for ScriptedOracle {
    async fn value_change(&self, request: ValuationRequest<'_>) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().push(request.session_key);
        Ok((self.script)(&request))
    }
}

/// Player is included on either side of the request
pub(crate) fn has_player(request: &ValuationRequest<'_>, id: u32) -> bool {
    let id = PlayerId(id);
    request.requester_players.contains(&id) || request.counterparty_players.contains(&id)
}

/// Draft pick is included on either side of the request
pub(crate) fn has_pick(request: &ValuationRequest<'_>, id: u32) -> bool {
    let id = DraftPickId(id);
    request.requester_picks.contains(&id) || request.counterparty_picks.contains(&id)
}
