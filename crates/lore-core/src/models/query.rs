use serde::{Deserialize, Serialize};

use crate::domain::QueryMode;

/// Flags controlling what a synthesized answer returns to the caller.
///
/// These never change what is computed, only what is echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisOptions {
    /// Request a visible reasoning trace from the oracle.
    pub extended_thinking: bool,
    /// Echo the raw contexts used in the answer.
    pub include_contexts: bool,
    /// Echo the reasoning trace in the answer.
    pub include_thinking: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            extended_thinking: true,
            include_contexts: false,
            include_thinking: false,
        }
    }
}

/// A single user question. Created per request, discarded after the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    #[serde(default)]
    pub mode: QueryMode,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Application whose knowledge bases should be searched.
    #[serde(default)]
    pub application: Option<String>,
    #[serde(default)]
    pub options: SynthesisOptions,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: QueryMode::Smart,
            tenant_id: None,
            session_id: None,
            application: None,
            options: SynthesisOptions::default(),
        }
    }

    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }

    pub fn with_options(mut self, options: SynthesisOptions) -> Self {
        self.options = options;
        self
    }
}
