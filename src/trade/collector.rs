//! Candidate collection: every asset that could legally be added next

use crate::error::Result;
use std::collections::BTreeSet;
use tracing::trace;

use super::store::{AssetRecord, AssetStore, Eligibility, Tradability};
use super::types::{Asset, FirstAssetFilter, NegotiationContext, Party, TradeProposal};

/// Enumerates candidate assets for the next round of the search
pub struct CandidateCollector<'a> {
    store: &'a dyn AssetStore,
    eligibility: &'a dyn Eligibility,
}

impl<'a> CandidateCollector<'a> {
    pub fn new(store: &'a dyn AssetStore, eligibility: &'a dyn Eligibility) -> Self {
        Self { store, eligibility }
    }

    /// Collect the candidate pool for `proposal`.
    ///
    /// On the first round an active first-asset filter narrows counterparty
    /// players to the requested positions and suppresses draft picks on both
    /// sides. An empty result means no further addition is possible.
    pub async fn collect(
        &self,
        proposal: &TradeProposal,
        ctx: &NegotiationContext,
        first_round: bool,
    ) -> Result<BTreeSet<Asset>> {
        let restriction = if first_round {
            ctx.first_asset_filter
                .as_ref()
                .filter(|filter| filter.is_active())
        } else {
            None
        };

        let parties: &[Party] = if ctx.hold_requester_constant {
            &[Party::Counterparty]
        } else {
            &[Party::Requester, Party::Counterparty]
        };

        let mut candidates = BTreeSet::new();
        for &party in parties {
            self.collect_players(proposal, party, restriction, &mut candidates)
                .await?;
            if restriction.is_none() {
                self.collect_picks(proposal, party, &mut candidates).await?;
            }
        }

        Ok(candidates)
    }

    async fn collect_players(
        &self,
        proposal: &TradeProposal,
        party: Party,
        restriction: Option<&FirstAssetFilter>,
        candidates: &mut BTreeSet<Asset>,
    ) -> Result<()> {
        let side = proposal.side(party);
        for player in self.store.players_owned_by(side.team).await? {
            if side.has_settled_player(player.id) {
                continue;
            }
            if !self.admit(AssetRecord::Player(&player)) {
                continue;
            }
            // The requester's players are never position-restricted
            if party == Party::Counterparty {
                if let Some(filter) = restriction {
                    if !filter.matches(&player.position) {
                        continue;
                    }
                }
            }

            candidates.insert(Asset::Player {
                owner: party,
                id: player.id,
            });
        }
        Ok(())
    }

    async fn collect_picks(
        &self,
        proposal: &TradeProposal,
        party: Party,
        candidates: &mut BTreeSet<Asset>,
    ) -> Result<()> {
        let side = proposal.side(party);
        for pick in self.store.picks_owned_by(side.team).await? {
            if side.has_settled_pick(pick.id) || !self.admit(AssetRecord::DraftPick(&pick)) {
                continue;
            }

            candidates.insert(Asset::DraftPick {
                owner: party,
                id: pick.id,
            });
        }
        Ok(())
    }

    fn admit(&self, record: AssetRecord<'_>) -> bool {
        match self.eligibility.tradability(record) {
            Tradability::Tradable => true,
            Tradability::Untradable { reason } => {
                trace!("Skipping {:?}: {}", record, reason);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trade::fixtures::{league, proposal_between, REQUESTER, COUNTERPARTY};
    use crate::trade::store::RecordFlags;
    use crate::trade::types::{FirstAssetFilter, TradeSide};
    use crate::types::{DraftPickId, PlayerId};

    fn owners(candidates: &BTreeSet<Asset>) -> BTreeSet<Party> {
        candidates.iter().map(Asset::owner).collect()
    }

    #[tokio::test]
    async fn test_collects_both_sides() {
        let store = league();
        let collector = CandidateCollector::new(&store, &RecordFlags);
        let ctx = NegotiationContext::new(false);

        let candidates = collector
            .collect(&proposal_between(), &ctx, true)
            .await
            .unwrap();

        assert_eq!(
            owners(&candidates),
            BTreeSet::from([Party::Requester, Party::Counterparty])
        );
        assert!(candidates.contains(&Asset::DraftPick {
            owner: Party::Requester,
            id: DraftPickId(100),
        }));
    }

    #[tokio::test]
    async fn test_hold_requester_constant() {
        let store = league();
        let collector = CandidateCollector::new(&store, &RecordFlags);
        let ctx = NegotiationContext::new(true);

        let candidates = collector
            .collect(&proposal_between(), &ctx, true)
            .await
            .unwrap();

        assert!(!candidates.is_empty());
        assert_eq!(owners(&candidates), BTreeSet::from([Party::Counterparty]));
    }

    #[tokio::test]
    async fn test_skips_included_excluded_and_untradable() {
        let store = league();
        let collector = CandidateCollector::new(&store, &RecordFlags);
        let ctx = NegotiationContext::new(false);

        let proposal = TradeProposal::new(
            TradeSide::new(REQUESTER)
                .with_players([PlayerId(1)])
                .excluding_picks([DraftPickId(100)]),
            TradeSide::new(COUNTERPARTY).excluding_players([PlayerId(21)]),
        );

        let candidates = collector.collect(&proposal, &ctx, false).await.unwrap();

        // Included
        assert!(!candidates.contains(&Asset::Player {
            owner: Party::Requester,
            id: PlayerId(1),
        }));
        // Excluded
        assert!(!candidates.contains(&Asset::DraftPick {
            owner: Party::Requester,
            id: DraftPickId(100),
        }));
        assert!(!candidates.contains(&Asset::Player {
            owner: Party::Counterparty,
            id: PlayerId(21),
        }));
        // Flagged untradable in the fixture league
        assert!(!candidates.contains(&Asset::Player {
            owner: Party::Counterparty,
            id: PlayerId(23),
        }));
        assert!(!candidates.contains(&Asset::DraftPick {
            owner: Party::Counterparty,
            id: DraftPickId(201),
        }));
    }

    #[tokio::test]
    async fn test_first_round_filter() {
        let store = league();
        let collector = CandidateCollector::new(&store, &RecordFlags);
        let ctx = NegotiationContext::new(false)
            .with_first_asset_filter(FirstAssetFilter::positions(["C"]));

        let first = collector
            .collect(&proposal_between(), &ctx, true)
            .await
            .unwrap();

        // Counterparty players restricted to centers, requester players untouched,
        // no picks from either side
        assert!(first.contains(&Asset::Player {
            owner: Party::Counterparty,
            id: PlayerId(22),
        }));
        assert!(!first.contains(&Asset::Player {
            owner: Party::Counterparty,
            id: PlayerId(20),
        }));
        assert!(first.contains(&Asset::Player {
            owner: Party::Requester,
            id: PlayerId(2),
        }));
        assert!(first
            .iter()
            .all(|asset| !matches!(asset, Asset::DraftPick { .. })));

        let later = collector
            .collect(&proposal_between(), &ctx, false)
            .await
            .unwrap();
        assert!(later.contains(&Asset::Player {
            owner: Party::Counterparty,
            id: PlayerId(20),
        }));
        assert!(later
            .iter()
            .any(|asset| matches!(asset, Asset::DraftPick { .. })));
    }

    #[tokio::test]
    async fn test_composite_filter() {
        let store = league();
        let collector = CandidateCollector::new(&store, &RecordFlags);
        let ctx = NegotiationContext::new(true)
            .with_first_asset_filter(FirstAssetFilter::positions(["G"]).composite(true));

        let candidates = collector
            .collect(&proposal_between(), &ctx, true)
            .await
            .unwrap();

        assert_eq!(
            candidates,
            BTreeSet::from([Asset::Player {
                owner: Party::Counterparty,
                id: PlayerId(20),
            }])
        );
    }

    #[tokio::test]
    async fn test_empty_pool() {
        let store = league();
        let collector = CandidateCollector::new(&store, &RecordFlags);
        let ctx = NegotiationContext::new(true);

        let proposal = TradeProposal::new(
            TradeSide::new(REQUESTER),
            TradeSide::new(crate::types::TeamId(99)),
        );

        let candidates = collector.collect(&proposal, &ctx, true).await.unwrap();
        assert!(candidates.is_empty());
    }
}
