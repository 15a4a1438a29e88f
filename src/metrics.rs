use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref CHECK_TOTAL: Counter =
        register_counter!("rategate_checks_total", "Total rate limit checks").unwrap();
    pub static ref ALLOWED_TOTAL: Counter =
        register_counter!("rategate_allowed_total", "Requests admitted by the limiter").unwrap();
    pub static ref BLOCKED_TOTAL: Counter =
        register_counter!("rategate_blocked_total", "Requests rejected by the limiter").unwrap();
    pub static ref CHECK_LATENCY: Histogram = register_histogram!(
        "rategate_check_latency_seconds",
        "Rate limit check latency in seconds"
    )
    .unwrap();
    pub static ref TRACKER_COUNT: Gauge =
        register_gauge!("rategate_trackers", "Current number of tracked keys").unwrap();
}
