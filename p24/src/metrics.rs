//! Client metrics

use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

lazy_static::lazy_static! {
    pub static ref P24_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "p24_requests_total",
        "Total merchant API calls",
        &["endpoint", "outcome"]
    )
    .unwrap();

    pub static ref P24_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "p24_request_duration_seconds",
        "Merchant API call duration (transport round trip)",
        &["endpoint"]
    )
    .unwrap();
}
