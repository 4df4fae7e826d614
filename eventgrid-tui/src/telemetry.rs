//! Log file setup.
//!
//! The terminal belongs to the UI, so logs go to `log_path` only.

use crate::config::{LogFormat, TuiConfig};
use crate::error::TuiError;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(config: &TuiConfig) -> Result<(), TuiError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.log_filter())
            .map_err(|e| TuiError::Logging(format!("invalid log_filter: {}", e)))?,
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false);
    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.log_format {
        LogFormat::Text => registry.with(layer).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    };
    result.map_err(|e| TuiError::Logging(e.to_string()))?;

    tracing::info!(
        api_base_url = %config.api_base_url,
        log_path = %config.log_path.display(),
        "Logging initialized"
    );
    Ok(())
}
