//! Forward-selection engine: grows a proposal one asset at a time until the
//! counterparty accepts it, then stabilizes the result

use crate::error::{EqualizerError, Result};
use crate::types::SessionKey;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::collector::CandidateCollector;
use super::oracle::{ValuationOracle, ValuationRequest};
use super::store::{AssetStore, Eligibility};
use super::types::{Asset, NegotiationContext, ScoredAsset, TradeProposal};

/// Objective of a single pass, fixed by the sign of its starting dv
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    /// Counterparty does not accept yet: grow the deal until it does
    Court,
    /// Counterparty already accepts: pull value back toward the requester
    Reclaim,
}

impl Direction {
    fn from_dv(dv: f64) -> Self {
        if dv > 0.0 {
            Direction::Reclaim
        } else {
            Direction::Court
        }
    }

    /// Expected sign of `prev_dv - dv` for an addition that helps the objective
    fn sign(self) -> i8 {
        match self {
            Direction::Court => -1,
            Direction::Reclaim => 1,
        }
    }
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// How a pass ended
#[derive(Debug)]
enum PassOutcome {
    Settled(Option<TradeProposal>),
    /// Acceptance reached with budget to spare: continue from `proposal`
    Stabilize {
        proposal: TradeProposal,
        remaining: Option<usize>,
    },
}

/// Keep `proposal` only if the counterparty accepts it
fn settle(proposal: TradeProposal, dv: f64) -> PassOutcome {
    PassOutcome::Settled((dv > 0.0).then_some(proposal))
}

/// Pick the next concession from candidates sorted by dv, best first.
///
/// Prefers the smallest strictly positive dv; without one, falls back to the
/// largest dv so the search still moves forward.
pub fn select_concession(scored: &[ScoredAsset]) -> Option<&ScoredAsset> {
    scored
        .iter()
        .rev()
        .find(|candidate| candidate.dv > 0.0)
        .or_else(|| scored.first())
}

/// Trade equalization engine
pub struct EqualizationEngine {
    oracle: Arc<dyn ValuationOracle>,
    store: Arc<dyn AssetStore>,
    eligibility: Arc<dyn Eligibility>,
}

impl EqualizationEngine {
    /// Create new engine over the given collaborators
    pub fn new(
        oracle: Arc<dyn ValuationOracle>,
        store: Arc<dyn AssetStore>,
        eligibility: Arc<dyn Eligibility>,
    ) -> Self {
        Self {
            oracle,
            store,
            eligibility,
        }
    }

    /// Counterparty's dv for `proposal`
    pub async fn value_of(&self, proposal: &TradeProposal, session_key: SessionKey) -> Result<f64> {
        let request = ValuationRequest::for_counterparty(proposal, session_key);
        let dv = self.oracle.value_change(request).await?;
        if !dv.is_finite() {
            return Err(EqualizerError::Oracle(format!(
                "non-finite value {} for proposal with {} assets",
                dv,
                proposal.asset_count()
            )));
        }
        Ok(dv)
    }

    /// Candidate pool for the next addition
    pub async fn collect_candidates(
        &self,
        proposal: &TradeProposal,
        ctx: &NegotiationContext,
        first_round: bool,
    ) -> Result<BTreeSet<Asset>> {
        CandidateCollector::new(self.store.as_ref(), self.eligibility.as_ref())
            .collect(proposal, ctx, first_round)
            .await
    }

    /// Score every candidate by the dv of the proposal that adds it.
    ///
    /// Evaluations run concurrently; the result is sorted by dv descending,
    /// ties ordered by asset.
    pub async fn score_candidates(
        &self,
        proposal: &TradeProposal,
        candidates: &BTreeSet<Asset>,
        session_key: SessionKey,
    ) -> Result<Vec<ScoredAsset>> {
        let evaluations = candidates.iter().map(|asset| async move {
            let hypothetical = proposal.with_asset(asset);
            let dv = self.value_of(&hypothetical, session_key).await?;
            Ok::<_, EqualizerError>(ScoredAsset { asset: *asset, dv })
        });

        let mut scored = join_all(evaluations)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        scored.sort_by(|a, b| b.dv.total_cmp(&a.dv).then_with(|| a.asset.cmp(&b.asset)));
        Ok(scored)
    }

    /// Add the single best concession to `proposal`, or `None` when no
    /// candidate is left
    pub async fn try_add_one_asset(
        &self,
        proposal: &TradeProposal,
        ctx: &NegotiationContext,
        first_round: bool,
    ) -> Result<Option<TradeProposal>> {
        Ok(self
            .add_best_candidate(proposal, ctx, first_round)
            .await?
            .map(|(next, _)| next))
    }

    async fn add_best_candidate(
        &self,
        proposal: &TradeProposal,
        ctx: &NegotiationContext,
        first_round: bool,
    ) -> Result<Option<(TradeProposal, ScoredAsset)>> {
        let candidates = self.collect_candidates(proposal, ctx, first_round).await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let scored = self
            .score_candidates(proposal, &candidates, ctx.session_key)
            .await?;
        let Some(chosen) = select_concession(&scored).copied() else {
            return Ok(None);
        };

        debug!(
            "Chose {} (dv {:.3}) from {} candidates",
            chosen.asset,
            chosen.dv,
            scored.len()
        );

        Ok(Some((proposal.with_asset(&chosen.asset), chosen)))
    }

    /// Grow `proposal` until the counterparty accepts it.
    ///
    /// Returns `Ok(None)` when no acceptable deal exists within the context's
    /// budget. Once acceptance is reached with budget left, a stabilization pass
    /// continues from the accepted deal so that equalizing the result again
    /// yields the result itself.
    pub async fn equalize(
        &self,
        proposal: &TradeProposal,
        ctx: &NegotiationContext,
    ) -> Result<Option<TradeProposal>> {
        if let Err(e) = proposal.validate() {
            warn!("Rejecting proposal: {}", e);
            return Err(e);
        }

        let mut ctx = ctx.clone();
        let mut baseline = proposal.clone();
        loop {
            match self.run_pass(baseline, &ctx).await? {
                PassOutcome::Settled(result) => {
                    match &result {
                        Some(deal) => info!(
                            "Deal found with {} assets added (session {})",
                            deal.added_since(proposal).len(),
                            ctx.session_key
                        ),
                        None => info!("No acceptable deal found (session {})", ctx.session_key),
                    }
                    return Ok(result);
                }
                PassOutcome::Stabilize {
                    proposal: accepted,
                    remaining,
                } => {
                    info!(
                        "Counterparty accepts; stabilizing with remaining budget {:?}",
                        remaining
                    );
                    ctx = ctx.stabilization(remaining);
                    baseline = accepted;
                }
            }
        }
    }

    async fn run_pass(
        &self,
        start: TradeProposal,
        ctx: &NegotiationContext,
    ) -> Result<PassOutcome> {
        let start_dv = self.value_of(&start, ctx.session_key).await?;
        let direction = Direction::from_dv(start_dv);
        debug!("Starting {:?} pass at dv {:.3}", direction, start_dv);

        let mut added = 0usize;
        let mut prev = start;
        let mut prev_dv = start_dv;

        loop {
            if ctx.budget_exhausted(added) {
                return Ok(settle(prev, prev_dv));
            }

            let Some((next, chosen)) = self.add_best_candidate(&prev, ctx, added == 0).await?
            else {
                debug!("Candidate pool exhausted after {} additions", added);
                return Ok(settle(prev, prev_dv));
            };
            added += 1;
            let dv = chosen.dv;

            if sign(prev_dv - dv) != direction.sign() {
                debug!(
                    "Adding {} moved dv {:.3} -> {:.3} against the objective; rolling back",
                    chosen.asset, prev_dv, dv
                );
                return Ok(settle(prev, prev_dv));
            }

            match direction {
                Direction::Court if dv > 0.0 => {
                    let remaining = ctx.remaining_after(added);
                    if remaining.map_or(true, |left| left > 0) {
                        return Ok(PassOutcome::Stabilize {
                            proposal: next,
                            remaining,
                        });
                    }
                    return Ok(PassOutcome::Settled(Some(next)));
                }
                Direction::Reclaim if dv < 0.0 && prev_dv > 0.0 => {
                    debug!("Adding {} lost acceptance; rolling back", chosen.asset);
                    return Ok(PassOutcome::Settled(Some(prev)));
                }
                _ => {}
            }

            if ctx.budget_exhausted(added) {
                return Ok(settle(next, dv));
            }

            prev = next;
            prev_dv = dv;
        }
    }
}
