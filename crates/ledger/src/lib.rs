//! Counter ledger — loss-free impression/click counting under concurrent
//! renders, with an optional Redis persistence sink.

pub mod counters;
pub mod sink;

pub use counters::{CounterLedger, CounterSnapshot};
pub use sink::RedisCounterSink;
