//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//!
//! - **Levels** come from `RUST_LOG` and default to `info`
//! - **Compact format** for development, shows spans inline
//!   (e.g. `recommend{user=user_1}`)
//! - **JSON format** for log shippers, one object per line
//!
//! Module paths are hidden (`with_target(false)`); the actor logs carry an
//! `entity_type` field instead.
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: startup, shutdown and final store size
//! - **Writes**: create, update, actions and deletes with the product id
//! - **Pricing**: handler failures at `warn`, guarded-field violations at `error`
//! - **Publication**: failed publishes at `warn`
//!
//! ```bash
//! RUST_LOG=debug cargo run
//! CATALOG_LOG_FORMAT=json RUST_LOG=info cargo run
//! ```
//!
//! With `RUST_LOG=info` a stock change reads:
//!
//! ```text
//! INFO Action ok entity_type="Product" id=product_1
//! INFO Recommended strategy=best-deals count=2
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Installs the global subscriber. Later calls are no-ops, so tests may call
/// this freely.
pub fn setup_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false); // Don't show module paths - we use entity_type instead

    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
