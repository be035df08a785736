//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Ticketflow client.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::{Result, TicketflowError};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file appender when dropped, so the caller
/// must keep it alive for the lifetime of the program.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| TicketflowError::Config(format!("Invalid log filter: {}", e)))?;

    let (file_layer, guard) = match &config.file_path {
        Some(path) => {
            let file_appender = tracing_appender::rolling::daily(path, "ticketflow.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| TicketflowError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: &str, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log a checkout step change
pub fn log_checkout_transition(event_id: &str, from: &str, to: &str) {
    info!(
        event_id = event_id,
        from = from,
        to = to,
        "Checkout step changed"
    );
}

/// Log a refund request submission
pub fn log_refund_request(order_id: &str, ticket_count: usize, dropped: usize) {
    if dropped > 0 {
        warn!(
            order_id = order_id,
            ticket_count = ticket_count,
            dropped = dropped,
            "Refund request submitted with unresolved selections dropped"
        );
    } else {
        info!(
            order_id = order_id,
            ticket_count = ticket_count,
            "Refund request submitted"
        );
    }
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}

/// Log API call timings
pub fn log_api_call(method: &str, path: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            method = method,
            path = path,
            duration_ms = duration_ms,
            "API call completed"
        );
    } else {
        warn!(
            method = method,
            path = path,
            duration_ms = duration_ms,
            "API call failed"
        );
    }
}
