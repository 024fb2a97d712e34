//! Per-stage cost accounting
//!
//! Costs are points charged against a user's balance. Every stage that does
//! new work charges at least one point; a stage served from cache is free.

/// Seconds of audio covered by one recognition or synthesis point
const SECONDS_PER_POINT: u64 = 15;

/// Characters of recognized text covered by one translation point
const CHARS_PER_POINT: u64 = 100;

/// Cost of recognizing `duration_secs` of audio
#[must_use]
pub const fn recognition(duration_secs: u64) -> u64 {
    at_least_one(duration_secs.div_ceil(SECONDS_PER_POINT))
}

/// Cost of translating `text` on a cache miss
///
/// Counted in characters, not bytes.
#[must_use]
pub fn translation(text: &str) -> u64 {
    let chars = u64::try_from(text.chars().count()).unwrap_or(u64::MAX);
    at_least_one(chars.div_ceil(CHARS_PER_POINT))
}

/// Cost of synthesizing speech on a cache miss
///
/// Priced by the input audio duration, as a proxy for provider billing.
#[must_use]
pub const fn synthesis(duration_secs: u64) -> u64 {
    at_least_one(duration_secs.div_ceil(SECONDS_PER_POINT))
}

const fn at_least_one(points: u64) -> u64 {
    if points < 1 { 1 } else { points }
}

/// Running total for one pipeline invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostLedger {
    total: u64,
}

impl CostLedger {
    /// Create an empty ledger
    #[must_use]
    pub const fn new() -> Self {
        Self { total: 0 }
    }

    /// Add points for a stage that ran
    pub const fn add(&mut self, points: u64) {
        self.total = self.total.saturating_add(points);
    }

    /// Total points accumulated so far
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }
}
