//! Seeds the loan CRM database with synthetic data.
//!
//! Run with:
//! ```
//! SEED_OPPORTUNITIES=10000 cargo run -p crm-seed --bin seed
//! ```
//!
//! See [`SeedConfig`] for the recognised environment variables.

use crm_seed::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!("Seeding aborted: {err}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = SeedConfig::load()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let scenario = ScenarioBuilder::from_config(&config);
    tracing::info!(
        "Planned run: {} opportunities, {} partners, {} cases",
        scenario.opportunity_count(),
        scenario.partner_count(),
        scenario.case_count()
    );

    let result = if config.dry_run {
        tracing::info!("Dry run: writing to an in-memory store");
        let store = MemoryStore::new();
        scenario.build(&store, &mut rng).await?
    } else {
        tracing::info!("Connecting to database at {}", config.target());
        let store = PgStore::connect(&config).await?;
        tracing::info!("Connected to database");

        if config.create_schema {
            store.ensure_schema().await?;
        }
        if config.clear_before_seed {
            store.clear_all().await?;
        }

        scenario.build(&store, &mut rng).await?
    };

    // Summary output
    tracing::info!("Seed completed!");
    tracing::info!("  Business partners: {}", result.partners.len());
    tracing::info!("  Opportunities: {}", result.opportunities.len());
    tracing::info!(
        "  Opportunity-partner links: {} ({} co-borrowers)",
        result.links.len(),
        result.co_borrower_count()
    );
    tracing::info!("  Cases: {}", result.cases.len());
    if let Some(metrics) = &result.metrics {
        tracing::info!(
            "  Generation: {} ms, seeding: {} ms",
            metrics.generation_time_ms,
            metrics.seeding_time_ms
        );
    }

    Ok(())
}
