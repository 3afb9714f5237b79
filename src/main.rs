//! Trade equalizer CLI binary

use anyhow::Context;
use clap::Parser;
use trade_equalizer::cli::{parse_session_key, Cli, Commands, EqualizerApp};
use trade_equalizer::SessionKey;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Equalize {
            scenario,
            context,
            json,
        } => {
            let app = EqualizerApp::load(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            let ctx = context.to_context().context("invalid negotiation options")?;

            tracing::info!(
                "Equalizing offer with {} assets (session {})",
                app.offer().asset_count(),
                ctx.session_key
            );

            let report = app.equalize(&ctx).await.context("equalization failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
        }

        Commands::Candidates { scenario, context } => {
            let app = EqualizerApp::load(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            let ctx = context.to_context().context("invalid negotiation options")?;

            let scored = app.candidates(&ctx).await.context("scoring candidates failed")?;
            if scored.is_empty() {
                println!("No candidates available");
            }
            for candidate in scored {
                println!("{:>10.3}  {}", candidate.dv, app.describe(&candidate.asset));
            }
        }

        Commands::Value {
            scenario,
            session_key,
        } => {
            let app = EqualizerApp::load(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            let key = parse_session_key(session_key.as_deref())
                .context("invalid session key")?
                .unwrap_or_else(SessionKey::random);

            let dv = app.offer_value(key).await?;
            println!("Session key: {}", key);
            println!("Counterparty dv: {:.3}", dv);
        }
    }

    Ok(())
}
