mod health;
mod metrics;
mod resume;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use resume::resume_handler;
