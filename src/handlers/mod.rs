mod health;
mod metrics;
mod upstream;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use upstream::{login_handler, password_reset_handler, ping_handler, status_handler};
