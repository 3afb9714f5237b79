//! CLI command definitions

use crate::error::Result;
use crate::trade::{FirstAssetFilter, NegotiationContext};
use crate::types::SessionKey;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "trade-equalizer")]
#[command(about = "Trade equalizer - find the smallest concession that makes a trade work", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grow the scenario's offer until the counterparty accepts it
    Equalize {
        /// Scenario file (JSON)
        scenario: PathBuf,

        #[command(flatten)]
        context: ContextArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score the candidate pool for the next addition without choosing one
    Candidates {
        /// Scenario file (JSON)
        scenario: PathBuf,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Show the counterparty's valuation of the offer as it stands
    Value {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Session key (16 hex digits); random if omitted
        #[arg(short = 'k', long)]
        session_key: Option<String>,
    },
}

/// Knobs of a negotiation context
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Only add assets from the counterparty's side
    #[arg(long)]
    pub hold_requester: bool,

    /// Positions the first added player must play (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub looking_for: Vec<String>,

    /// Match positions containing a requested code (G matches PG and SG)
    #[arg(long)]
    pub composite_positions: bool,

    /// Maximum number of assets to add
    #[arg(short, long)]
    pub max_assets: Option<usize>,

    /// Session key (16 hex digits); random if omitted
    #[arg(short = 'k', long)]
    pub session_key: Option<String>,
}

impl ContextArgs {
    /// Build the negotiation context these arguments describe
    pub fn to_context(&self) -> Result<NegotiationContext> {
        let mut ctx = NegotiationContext::new(self.hold_requester).with_first_asset_filter(
            FirstAssetFilter::positions(self.looking_for.iter().map(|p| p.trim().to_uppercase()))
                .composite(self.composite_positions),
        );
        if let Some(max) = self.max_assets {
            ctx = ctx.with_max_assets(max);
        }
        if let Some(key) = parse_session_key(self.session_key.as_deref())? {
            ctx = ctx.with_session_key(key);
        }
        Ok(ctx)
    }
}

/// Parse an optional hex session key
pub fn parse_session_key(key: Option<&str>) -> Result<Option<SessionKey>> {
    key.map(|hex| SessionKey::from_hex(hex.trim()).map_err(Into::into))
        .transpose()
}
