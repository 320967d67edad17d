use serde::{Deserialize, Serialize};

use super::defaults;

/// Answer synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Reasoning budget requested when extended thinking is on.
    pub thinking_budget_tokens: u32,
    /// Each context is truncated to this many characters in the prompt.
    pub max_context_chars: usize,
    /// Validated corrections appended to the prompt.
    pub correction_hints: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_tokens: defaults::DEFAULT_SYNTHESIS_MAX_TOKENS,
            temperature: defaults::DEFAULT_SYNTHESIS_TEMPERATURE,
            thinking_budget_tokens: defaults::DEFAULT_THINKING_BUDGET_TOKENS,
            max_context_chars: defaults::DEFAULT_MAX_CONTEXT_CHARS,
            correction_hints: defaults::DEFAULT_CORRECTION_HINTS,
        }
    }
}
