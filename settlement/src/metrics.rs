//! Settlement metrics

use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

lazy_static::lazy_static! {
    /// Settlement cycles started
    pub static ref SETTLEMENT_CYCLES_TOTAL: IntCounter = register_int_counter!(
        "settlement_cycles_total",
        "Settlement cycles started"
    )
    .unwrap();

    /// Pipeline outcomes per transaction
    pub static ref SETTLEMENT_TRANSACTIONS_TOTAL: CounterVec = register_counter_vec!(
        "settlement_transactions_total",
        "Transaction pipeline outcomes",
        &["outcome"]
    )
    .unwrap();

    /// Outbound dispatch latency
    pub static ref DISPATCH_DURATION: Histogram = register_histogram!(
        "settlement_dispatch_duration_seconds",
        "Outbound settlement call duration"
    )
    .unwrap();
}
