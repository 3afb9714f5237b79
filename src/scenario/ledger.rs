//! Ledger valuation oracle: sums per-asset values, with optional keyed jitter

use crate::error::{EqualizerError, Result};
use crate::trade::{ValuationOracle, ValuationRequest};
use crate::types::{DraftPickId, PlayerId};
use async_trait::async_trait;
use blake2::{Blake2b512, Digest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tuning for the ledger oracle
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Extra weight the perspective team puts on what it gives up
    #[serde(default)]
    pub premium: f64,
    /// Amplitude of the keyed noise added to every valuation
    #[serde(default)]
    pub jitter: f64,
}

/// Values a trade as value received minus value given (with premium).
///
/// The jitter term is a pure function of the session key and the set of
/// assets, so repeated requests under one key agree.
#[derive(Clone, Debug)]
pub struct LedgerOracle {
    player_values: HashMap<PlayerId, f64>,
    pick_values: HashMap<DraftPickId, f64>,
    settings: LedgerSettings,
}

impl LedgerOracle {
    pub fn new(
        player_values: HashMap<PlayerId, f64>,
        pick_values: HashMap<DraftPickId, f64>,
    ) -> Self {
        Self {
            player_values,
            pick_values,
            settings: LedgerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: LedgerSettings) -> Self {
        self.settings = settings;
        self
    }

    fn players_total(&self, ids: &[PlayerId]) -> Result<f64> {
        ids.iter().try_fold(0.0, |total, id| {
            self.player_values
                .get(id)
                .map(|value| total + value)
                .ok_or_else(|| EqualizerError::Oracle(format!("no valuation for {}", id)))
        })
    }

    fn picks_total(&self, ids: &[DraftPickId]) -> Result<f64> {
        ids.iter().try_fold(0.0, |total, id| {
            self.pick_values
                .get(id)
                .map(|value| total + value)
                .ok_or_else(|| EqualizerError::Oracle(format!("no valuation for {}", id)))
        })
    }
}

/// Deterministic noise in [-1, 1] for a request
fn keyed_noise(request: &ValuationRequest<'_>) -> f64 {
    let mut hasher = Blake2b512::new();
    hasher.update(request.session_key.to_bytes());
    hasher.update(request.perspective.0.to_be_bytes());

    // Order of addition must not matter
    let sections: [(&[u8], Vec<u32>); 4] = [
        (b"rp", sorted(request.requester_players.iter().map(|id| id.0))),
        (b"cp", sorted(request.counterparty_players.iter().map(|id| id.0))),
        (b"rd", sorted(request.requester_picks.iter().map(|id| id.0))),
        (b"cd", sorted(request.counterparty_picks.iter().map(|id| id.0))),
    ];
    for (tag, ids) in sections {
        hasher.update(tag);
        for id in ids {
            hasher.update(id.to_be_bytes());
        }
    }

    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let unit = u64::from_be_bytes(head) as f64 / u64::MAX as f64;
    unit * 2.0 - 1.0
}

fn sorted(ids: impl Iterator<Item = u32>) -> Vec<u32> {
    let mut ids: Vec<u32> = ids.collect();
    ids.sort_unstable();
    ids
}

#[async_trait]
impl ValuationOracle for LedgerOracle {
    async fn value_change(&self, request: ValuationRequest<'_>) -> Result<f64> {
        let from_requester = self.players_total(request.requester_players)?
            + self.picks_total(request.requester_picks)?;
        let from_counterparty = self.players_total(request.counterparty_players)?
            + self.picks_total(request.counterparty_picks)?;

        let (received, given) = if request.perspective == request.requester {
            (from_counterparty, from_requester)
        } else {
            (from_requester, from_counterparty)
        };

        let mut dv = received - given * (1.0 + self.settings.premium);
        if self.settings.jitter > 0.0 {
            dv += self.settings.jitter * keyed_noise(&request);
        }
        Ok(dv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SessionKey, TeamId};

    fn oracle() -> LedgerOracle {
        LedgerOracle::new(
            HashMap::from([(PlayerId(1), 10.0), (PlayerId(2), 4.0), (PlayerId(3), 6.0)]),
            HashMap::from([(DraftPickId(9), 2.0)]),
        )
    }

    fn request<'a>(
        perspective: TeamId,
        requester_players: &'a [PlayerId],
        counterparty_players: &'a [PlayerId],
        counterparty_picks: &'a [DraftPickId],
        session_key: SessionKey,
    ) -> ValuationRequest<'a> {
        ValuationRequest {
            perspective,
            requester: TeamId(1),
            requester_players,
            counterparty_players,
            requester_picks: &[],
            counterparty_picks,
            session_key,
        }
    }

    #[tokio::test]
    async fn test_received_minus_given() {
        let dv = oracle()
            .value_change(request(
                TeamId(2),
                &[PlayerId(1)],
                &[PlayerId(2)],
                &[DraftPickId(9)],
                SessionKey(1),
            ))
            .await
            .unwrap();

        assert_eq!(dv, 10.0 - 6.0);
    }

    #[tokio::test]
    async fn test_requester_perspective_flips() {
        let dv = oracle()
            .value_change(request(
                TeamId(1),
                &[PlayerId(1)],
                &[PlayerId(2)],
                &[],
                SessionKey(1),
            ))
            .await
            .unwrap();

        assert_eq!(dv, 4.0 - 10.0);
    }

    #[tokio::test]
    async fn test_premium_weighs_what_is_given() {
        let oracle = oracle().with_settings(LedgerSettings {
            premium: 0.5,
            jitter: 0.0,
        });
        let dv = oracle
            .value_change(request(
                TeamId(2),
                &[PlayerId(1)],
                &[PlayerId(2)],
                &[],
                SessionKey(1),
            ))
            .await
            .unwrap();

        assert_eq!(dv, 10.0 - 6.0);
    }

    #[tokio::test]
    async fn test_jitter_is_keyed_and_order_independent() {
        let oracle = oracle().with_settings(LedgerSettings {
            premium: 0.0,
            jitter: 1.0,
        });

        let a = oracle
            .value_change(request(
                TeamId(2),
                &[PlayerId(1), PlayerId(3)],
                &[],
                &[],
                SessionKey(42),
            ))
            .await
            .unwrap();
        let b = oracle
            .value_change(request(
                TeamId(2),
                &[PlayerId(3), PlayerId(1)],
                &[],
                &[],
                SessionKey(42),
            ))
            .await
            .unwrap();
        let c = oracle
            .value_change(request(
                TeamId(2),
                &[PlayerId(1), PlayerId(3)],
                &[],
                &[],
                SessionKey(43),
            ))
            .await
            .unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!((a - 16.0).abs() <= 1.0);
        assert!((c - 16.0).abs() <= 1.0);
    }

    #[tokio::test]
    async fn test_unknown_asset() {
        let result = oracle()
            .value_change(request(
                TeamId(2),
                &[PlayerId(77)],
                &[],
                &[],
                SessionKey(1),
            ))
            .await;

        assert!(matches!(result, Err(EqualizerError::Oracle(_))));
    }
}
