use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for query batching against the engine.
///
/// The size cutoffs are cost proxies only; none of them changes the shape of
/// the output, just how many round trips are needed to produce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Projects whose total AST size is below this are fetched in one query
    pub small_project_ast_size: usize,

    /// Classes above this AST size get their instructions fetched later
    pub class_inline_ast_size: usize,

    /// Classes whose methods' AST size is above this get their instructions fetched later
    pub method_inline_ast_size: usize,

    /// Deferred classes with fewer method lines than this use a single
    /// instruction query; larger ones are fetched method by method
    pub class_instruction_lines: usize,

    /// Connection policy for reaching the engine
    pub retry: RetryPolicy,
}

/// Bounded exponential backoff used while waiting for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,

    #[serde(with = "crate::metrics::duration_millis")]
    pub initial_delay: Duration,

    #[serde(with = "crate::metrics::duration_millis")]
    pub max_delay: Duration,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            small_project_ast_size: 300_000,
            class_inline_ast_size: 20_000,
            method_inline_ast_size: 15_000,
            class_instruction_lines: 500,
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based), doubling up to `max_delay`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl ExtractConfig {
    pub fn with_small_project_ast_size(mut self, size: usize) -> Self {
        self.small_project_ast_size = size;
        self
    }

    pub fn with_inline_limits(mut self, class_ast_size: usize, method_ast_size: usize) -> Self {
        self.class_inline_ast_size = class_ast_size;
        self.method_inline_ast_size = method_ast_size;
        self
    }

    pub fn with_class_instruction_lines(mut self, lines: usize) -> Self {
        self.class_instruction_lines = lines;
        self
    }
}
