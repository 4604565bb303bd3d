//! adserve — rotating ad placement engine.
//!
//! Demo host: seeds an in-memory store, fills placements from a group, and
//! optionally persists counters through the Redis sink.

use adserve_core::config::AppConfig;
use adserve_delivery::{ineligibility_reason, SelectionPolicy};
use adserve_ledger::{CounterLedger, RedisCounterSink};
use adserve_serving::AdServer;
use adserve_store::AdStore;
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "adserve")]
#[command(about = "Rotating ad placement engine")]
#[command(version)]
struct Cli {
    /// Group handle to serve placements from
    #[arg(long, default_value = "sidebar")]
    group: String,

    /// Number of placements to fill
    #[arg(long, default_value_t = 5)]
    count: usize,

    /// Prefer this ad id (falls back to random when ineligible)
    #[arg(long)]
    ad_id: Option<Uuid>,

    /// Simulate a click on each filled placement
    #[arg(long, default_value_t = false)]
    click: bool,

    /// Persist counters to Redis (overrides config)
    #[arg(long, env = "ADSERVE__REDIS__ENABLED")]
    redis: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adserve=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(redis) = cli.redis {
        config.redis.enabled = redis;
    }

    info!(
        node_id = %config.node_id,
        group = %cli.group,
        redis = config.redis.enabled,
        "adserve starting up"
    );

    let store = Arc::new(AdStore::new());
    store.seed_demo_data()?;

    let ledger = Arc::new(CounterLedger::new());

    // Hydrate persisted totals before any placement is filled, so budget
    // checks see the real counts from previous runs.
    let sink = if config.redis.enabled {
        let sink = Arc::new(RedisCounterSink::new(&config.redis).await?);
        let ad_ids: Vec<Uuid> = store.list_ads().iter().map(|ad| ad.id).collect();
        sink.hydrate(&ledger, &ad_ids).await?;
        Some(sink)
    } else {
        None
    };

    let server = AdServer::new(store.clone(), ledger.clone(), config.serving.clone());

    let count = cli.count.min(config.serving.max_placements);
    let policy = match cli.ad_id {
        Some(id) => SelectionPolicy::ExplicitId(id),
        None => SelectionPolicy::UniformRandom,
    };

    for slot in 0..count {
        match server.serve_group(&cli.group, policy, Utc::now()) {
            Ok(Some(placement)) => {
                info!(
                    slot = slot,
                    ad_id = %placement.ad_id,
                    target_url = %placement.target_url,
                    payload = %placement.payload,
                    "Placement filled"
                );
                if cli.click {
                    if let Some(url) = server.click_through(placement.ad_id) {
                        info!(slot = slot, redirect = %url, "Click recorded");
                    }
                }
            }
            Ok(None) => info!(slot = slot, "No eligible ad, rendering empty slot"),
            Err(e) => {
                error!(slot = slot, error = %e, "Placement failed");
                return Err(e.into());
            }
        }
    }

    if let Some(sink) = sink {
        let flushed = sink.flush(&ledger).await?;
        info!(ads = flushed, "Counters persisted to Redis");
    }

    for mut ad in store.list_ads() {
        if let Some(snap) = ledger.totals(&ad.id) {
            ad.total_views = snap.total_views;
            ad.total_clicks = snap.total_clicks;
        }
        info!(
            ad_id = %ad.id,
            views = ad.total_views,
            clicks = ad.total_clicks,
            ineligible = ?ineligibility_reason(&ad, Utc::now()),
            "Final ad state"
        );
    }

    Ok(())
}
