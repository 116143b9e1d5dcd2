//! Observability: process-wide compile counters and snapshot reporting.
//! Counters are advisory only; they never influence compilation, and the
//! compiler itself never logs.

use crate::error::ErrorClass;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

static COMPILES: AtomicU64 = AtomicU64::new(0);
static UNSUPPORTED_ERRORS: AtomicU64 = AtomicU64::new(0);
static VALIDATION_ERRORS: AtomicU64 = AtomicU64::new(0);
static SCHEMA_ERRORS: AtomicU64 = AtomicU64::new(0);

pub(crate) fn record_compile() {
    COMPILES.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_error(class: ErrorClass) {
    let counter = match class {
        ErrorClass::Unsupported => &UNSUPPORTED_ERRORS,
        ErrorClass::Validation => &VALIDATION_ERRORS,
        ErrorClass::Schema => &SCHEMA_ERRORS,
    };
    counter.fetch_add(1, Ordering::Relaxed);
}

///
/// MetricsSnapshot
///
/// Point-in-time view of the compile counters.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub compiles: u64,
    pub unsupported_errors: u64,
    pub validation_errors: u64,
    pub schema_errors: u64,
}

#[must_use]
pub fn metrics_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        compiles: COMPILES.load(Ordering::Relaxed),
        unsupported_errors: UNSUPPORTED_ERRORS.load(Ordering::Relaxed),
        validation_errors: VALIDATION_ERRORS.load(Ordering::Relaxed),
        schema_errors: SCHEMA_ERRORS.load(Ordering::Relaxed),
    }
}

/// Reset all counters to zero.
pub fn metrics_reset() {
    COMPILES.store(0, Ordering::Relaxed);
    UNSUPPORTED_ERRORS.store(0, Ordering::Relaxed);
    VALIDATION_ERRORS.store(0, Ordering::Relaxed);
    SCHEMA_ERRORS.store(0, Ordering::Relaxed);
}
