//! Valuation oracle seam

use crate::error::Result;
use crate::types::{DraftPickId, PlayerId, SessionKey, TeamId};
use async_trait::async_trait;

use super::types::TradeProposal;

/// Arguments of one valuation: the assets each side would give up, judged
/// from the perspective team's point of view
#[derive(Clone, Copy, Debug)]
pub struct ValuationRequest<'a> {
    pub perspective: TeamId,
    pub requester: TeamId,
    pub requester_players: &'a [PlayerId],
    pub counterparty_players: &'a [PlayerId],
    pub requester_picks: &'a [DraftPickId],
    pub counterparty_picks: &'a [DraftPickId],
    pub session_key: SessionKey,
}

impl<'a> ValuationRequest<'a> {
    /// Valuation of `proposal` from the counterparty's perspective
    pub fn for_counterparty(proposal: &'a TradeProposal, session_key: SessionKey) -> Self {
        Self {
            perspective: proposal.counterparty.team,
            requester: proposal.requester.team,
            requester_players: &proposal.requester.players,
            counterparty_players: &proposal.counterparty.players,
            requester_picks: &proposal.requester.picks,
            counterparty_picks: &proposal.counterparty.picks,
            session_key,
        }
    }
}

/// Scores a hypothetical trade for one team.
///
/// Positive values favor `request.perspective`. Implementations must be pure
/// for a fixed session key: identical requests return identical values.
#[async_trait]
pub trait ValuationOracle: Send + Sync {
    async fn value_change(&self, request: ValuationRequest<'_>) -> Result<f64>;
}
