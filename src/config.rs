//! Analyzer configuration.

/// Limits on dependency chain enumeration.
///
/// Chain enumeration is exponential on graphs with many diamonds. Fused
/// workloads are small and sparse, so both limits default to unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Longest chain, in stages, that the search will extend to.
    /// Longer paths are pruned.
    pub max_chain_len: Option<usize>,
    /// Most chains a single `find_chains` query may return before it fails
    /// with `ChainLimitExceeded`.
    pub max_chains: Option<usize>,
}

impl AnalyzerConfig {
    pub fn with_max_chain_len(mut self, len: usize) -> Self {
        self.max_chain_len = Some(len);
        self
    }

    pub fn with_max_chains(mut self, count: usize) -> Self {
        self.max_chains = Some(count);
        self
    }
}
