//! Engine configuration.

/// Settings for a [`Schema`](crate::Schema).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Restrict calculate, link and accumulate evaluations to the rows changed
    /// since their last run. When off, every dirty evaluation rescans (or
    /// re-folds) all live rows; results are the same either way.
    pub incremental: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { incremental: true }
    }
}

impl EngineConfig {
    /// Creates the default configuration (incremental on).
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that always recomputes from scratch.
    pub fn full_rescan() -> Self {
        Self { incremental: false }
    }

    pub fn with_incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }
}
