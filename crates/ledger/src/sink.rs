//! Redis persistence sink for counter deltas.
//!
//! The ledger stays authoritative in-process; this sink periodically pushes
//! unflushed increments with `INCRBY`, which keeps the persisted totals
//! monotonic even when several nodes write the same keys.

use crate::counters::CounterLedger;
use adserve_core::config::RedisConfig;
use adserve_core::AdId;
use redis::AsyncCommands;
use tracing::{debug, info};

/// Async Redis client for counter persistence.
pub struct RedisCounterSink {
    client: redis::Client,
}

fn views_key(ad_id: &AdId) -> String {
    format!("ad:{ad_id}:views")
}

fn clicks_key(ad_id: &AdId) -> String {
    format!("ad:{ad_id}:clicks")
}

impl RedisCounterSink {
    /// Connect to Redis and verify connectivity.
    pub async fn new(config: &RedisConfig) -> anyhow::Result<Self> {
        info!(url = %config.url, "Connecting to Redis");

        let client = redis::Client::open(config.url.as_str())?;

        let mut conn = client.get_multiplexed_async_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!(response = %pong, "Redis connection established");

        Ok(Self { client })
    }

    /// Seed the ledger with persisted totals for the given ads.
    pub async fn hydrate(&self, ledger: &CounterLedger, ad_ids: &[AdId]) -> anyhow::Result<()> {
        if ad_ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let mut keys = Vec::with_capacity(ad_ids.len() * 2);
        for id in ad_ids {
            keys.push(views_key(id));
            keys.push(clicks_key(id));
        }
        let values: Vec<Option<u64>> = conn.mget(&keys).await?;

        for (i, id) in ad_ids.iter().enumerate() {
            let views = values.get(i * 2).copied().flatten().unwrap_or(0);
            let clicks = values.get(i * 2 + 1).copied().flatten().unwrap_or(0);
            ledger.track(*id, views, clicks);
        }

        info!(ads = ad_ids.len(), "Counter ledger hydrated from Redis");
        Ok(())
    }

    /// Push all unflushed increments. Returns the number of ads flushed.
    ///
    /// Errors propagate to the caller. Live totals stay correct in-process
    /// either way; a failed flush loses only the persistence of the drained
    /// deltas, so callers must surface the error rather than swallow it.
    pub async fn flush(&self, ledger: &CounterLedger) -> anyhow::Result<usize> {
        let deltas = ledger.drain_deltas();
        if deltas.is_empty() {
            return Ok(0);
        }

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut pipe = redis::pipe();
        for delta in &deltas {
            if delta.views > 0 {
                pipe.incr(views_key(&delta.ad_id), delta.views).ignore();
            }
            if delta.clicks > 0 {
                pipe.incr(clicks_key(&delta.ad_id), delta.clicks).ignore();
            }
        }
        pipe.query_async::<_, ()>(&mut conn).await?;

        metrics::counter!("ads.counter_flushes").increment(1);
        debug!(ads = deltas.len(), "Counter deltas flushed to Redis");
        Ok(deltas.len())
    }
}
