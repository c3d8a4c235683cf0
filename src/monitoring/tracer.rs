/*!
 * Structured Tracing
 * Subscriber setup and per-step spans using the tracing crate
 */

use crate::core::types::Step;
use std::time::Instant;
use tracing::{debug, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Steps slower than this are reported as warnings
const SLOW_STEP_MS: u128 = 50;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SIM_TRACE_JSON: Enable JSON output (default: false)
///
/// `log` records from the heap are bridged into the same subscriber.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }
}

/// Span covering one simulation step
pub struct StepSpan {
    span: Span,
    start: Instant,
    step: Step,
}

impl StepSpan {
    pub fn new(step: Step) -> Self {
        let span = span!(
            Level::DEBUG,
            "step",
            step = step,
            allocations = tracing::field::Empty,
            releases = tracing::field::Empty,
            compactions = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            step,
        }
    }

    pub fn record_counts(&self, allocations: usize, releases: usize, compactions: usize) {
        self.span.record("allocations", allocations);
        self.span.record("releases", releases);
        self.span.record("compactions", compactions);
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for StepSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration.as_millis() > SLOW_STEP_MS {
            warn!(
                step = self.step,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow step detected"
            );
        } else {
            debug!(
                step = self.step,
                duration_us = duration.as_micros() as u64,
                "step completed"
            );
        }
    }
}

/// Helper to create a step span
#[inline]
pub fn span_step(step: Step) -> StepSpan {
    StepSpan::new(step)
}
