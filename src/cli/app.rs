//! Trade equalizer application wiring a scenario to the engine

use crate::error::Result;
use crate::scenario::Scenario;
use crate::trade::{
    Asset, EqualizationEngine, NegotiationContext, RecordFlags, ScoredAsset, TradeProposal,
};
use crate::types::SessionKey;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Assets added to the opening offer, with descriptions for display
#[derive(Clone, Debug, Serialize)]
pub struct AddedAsset {
    pub asset: Asset,
    pub description: String,
}

/// Accepted deal found by the engine
#[derive(Clone, Debug, Serialize)]
pub struct AcceptedDeal {
    pub proposal: TradeProposal,
    pub added: Vec<AddedAsset>,
    pub dv: f64,
}

/// Outcome of one equalization run
#[derive(Clone, Debug, Serialize)]
pub struct EqualizationReport {
    pub session_key: String,
    pub opening_dv: f64,
    pub deal: Option<AcceptedDeal>,
}

impl fmt::Display for EqualizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session key: {}", self.session_key)?;
        writeln!(f, "Opening dv:  {:.3}", self.opening_dv)?;
        match &self.deal {
            None => write!(f, "No acceptable deal found"),
            Some(deal) if deal.added.is_empty() => {
                write!(f, "Offer already works as is (dv {:.3})", deal.dv)
            }
            Some(deal) => {
                writeln!(f, "Deal works with dv {:.3} after adding:", deal.dv)?;
                for (i, added) in deal.added.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "  + {}", added.description)?;
                }
                Ok(())
            }
        }
    }
}

/// Main trade equalizer application
pub struct EqualizerApp {
    scenario: Scenario,
    engine: EqualizationEngine,
}

impl EqualizerApp {
    /// Create an application over a validated scenario
    pub fn new(scenario: Scenario) -> Self {
        let oracle = Arc::new(scenario.league.ledger(&scenario.valuation));
        let store = Arc::new(scenario.league.clone());
        let engine = EqualizationEngine::new(oracle, store, Arc::new(RecordFlags));

        Self { scenario, engine }
    }

    /// Load a scenario file and build the application
    pub fn load(path: &Path) -> Result<Self> {
        let scenario = Scenario::load(path)?;
        tracing::debug!(
            "Loaded scenario with {} players and {} draft picks",
            scenario.league.players.len(),
            scenario.league.draft_picks.len()
        );
        Ok(Self::new(scenario))
    }

    pub fn offer(&self) -> &TradeProposal {
        &self.scenario.offer
    }

    /// Counterparty's dv for the opening offer
    pub async fn offer_value(&self, session_key: SessionKey) -> Result<f64> {
        self.engine.value_of(&self.scenario.offer, session_key).await
    }

    /// Run the search on the opening offer
    pub async fn equalize(&self, ctx: &NegotiationContext) -> Result<EqualizationReport> {
        let opening_dv = self.offer_value(ctx.session_key).await?;
        let result = self.engine.equalize(&self.scenario.offer, ctx).await?;

        let deal = match result {
            Some(proposal) => {
                let dv = self.engine.value_of(&proposal, ctx.session_key).await?;
                let added = proposal
                    .added_since(&self.scenario.offer)
                    .into_iter()
                    .map(|asset| AddedAsset {
                        description: self.describe(&asset),
                        asset,
                    })
                    .collect();
                Some(AcceptedDeal {
                    proposal,
                    added,
                    dv,
                })
            }
            None => None,
        };

        Ok(EqualizationReport {
            session_key: ctx.session_key.to_hex(),
            opening_dv,
            deal,
        })
    }

    /// Score the first-round candidate pool for the opening offer
    pub async fn candidates(&self, ctx: &NegotiationContext) -> Result<Vec<ScoredAsset>> {
        let offer = &self.scenario.offer;
        let pool = self.engine.collect_candidates(offer, ctx, true).await?;
        self.engine
            .score_candidates(offer, &pool, ctx.session_key)
            .await
    }

    /// Human-readable description of an asset in this scenario
    pub fn describe(&self, asset: &Asset) -> String {
        let league = &self.scenario.league;
        match *asset {
            Asset::Player { id, .. } => match league.player(id) {
                Some(p) if !p.record.name.is_empty() => format!(
                    "{} {} ({}, {})",
                    p.record.position, p.record.name, id, p.record.team
                ),
                Some(p) => format!("{} {} ({})", p.record.position, id, p.record.team),
                None => asset.to_string(),
            },
            Asset::DraftPick { id, .. } => match league.pick(id) {
                Some(dp) => format!(
                    "{} round {} pick ({}, {})",
                    dp.record.season, dp.record.round, id, dp.record.team
                ),
                None => asset.to_string(),
            },
        }
    }
}
