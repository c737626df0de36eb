//! Request and response envelopes for the generateContent-style surface.

use serde::{Deserialize, Serialize};

/// The smallest text-bearing unit within a content entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A role-tagged group of parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentRequest {
    #[serde(default)]
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// First non-empty text in document order: contents outer, parts inner,
    /// short-circuiting on the first match.
    pub fn first_prompt(&self) -> Option<&str> {
        self.contents
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .find(|text| !text.is_empty())
    }
}

/// One generated response option; this service always produces exactly one.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub content: Content,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentResponse {
    pub model: String,
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Build the single-candidate envelope around the agent's reply.
    pub fn single(model: String, text: String) -> Self {
        Self {
            model,
            candidates: vec![Candidate {
                content: Content {
                    role: None,
                    parts: vec![Part { text: Some(text) }],
                },
            }],
        }
    }
}
