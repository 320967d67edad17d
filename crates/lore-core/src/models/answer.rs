use serde::{Deserialize, Serialize};

use super::degradation::Degradation;
use crate::domain::Domain;

/// Supplementary information from a secondary domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedNote {
    pub domain: Domain,
    pub excerpt: String,
}

/// The synthesized answer for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub thinking: Option<String>,
    pub contexts: Option<Vec<String>>,
    /// Domains whose pipelines contributed, primary first.
    pub source_domains: Vec<Domain>,
    pub related: Vec<RelatedNote>,
    pub degradations: Vec<Degradation>,
}

impl Answer {
    pub fn new(text: impl Into<String>, domain: Domain) -> Self {
        Self {
            text: text.into(),
            thinking: None,
            contexts: None,
            source_domains: vec![domain],
            related: Vec::new(),
            degradations: Vec::new(),
        }
    }

    pub fn primary_domain(&self) -> Option<Domain> {
        self.source_domains.first().copied()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    pub fn to_response(&self) -> QueryResponse {
        QueryResponse::from(self)
    }
}

/// Wire response for the online path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub answer: String,
    pub thinking: Option<String>,
    pub contexts: Option<Vec<String>>,
    pub source_domains: Vec<String>,
}

impl From<&Answer> for QueryResponse {
    fn from(answer: &Answer) -> Self {
        let mut text = answer.text.clone();
        if !answer.related.is_empty() {
            text.push_str("\n\n**Related Information:**\n");
            for note in &answer.related {
                text.push_str(&format!("\n*From {}:* {}", note.domain.label(), note.excerpt));
            }
        }
        Self {
            answer: text,
            thinking: answer.thinking.clone(),
            contexts: answer.contexts.clone(),
            source_domains: answer
                .source_domains
                .iter()
                .map(|d| d.as_str().to_string())
                .collect(),
        }
    }
}
