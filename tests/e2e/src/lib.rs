//! Shared fixtures for TYTX end-to-end tests
//!
//! Every scenario builds its own isolated registry; nothing here touches
//! the process-wide default, so tests cannot observe each other's
//! registrations.

use serde_json::json;
use tytx_codec::{EnvelopeCodec, TytxRegistry};

/// Fresh envelope codec over an isolated registry
pub fn isolated_codec() -> EnvelopeCodec {
    EnvelopeCodec::new(TytxRegistry::new())
}

/// Install tracing for a test run when TYTX_E2E_LOG is set
pub fn init_tracing() {
    if std::env::var("TYTX_E2E_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "debug".into()),
            )
            .try_init();
    }
}

/// Envelope text registering an order-line schema globally
pub fn order_line_envelope(data: &str) -> String {
    format!(
        "XTYTX://{}",
        json!({
            "gstruct": {
                "order_line": {"sku": "T", "qty": "L", "price": "N"}
            },
            "lstruct": {},
            "data": data
        })
    )
}
