//! # Topics
//! Closed set of topic identifiers that partition the article cache.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the fixed topics served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Military,
    Science,
    Politics,
    Religion,
    Media,
}

impl Topic {
    /// Every topic, in refresh order.
    pub const ALL: [Topic; 5] = [
        Topic::Military,
        Topic::Science,
        Topic::Politics,
        Topic::Religion,
        Topic::Media,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Military => "military",
            Topic::Science => "science",
            Topic::Politics => "politics",
            Topic::Religion => "religion",
            Topic::Media => "media",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a client names a topic outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid topic: {0}")]
pub struct InvalidTopic(pub String);

impl FromStr for Topic {
    type Err = InvalidTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Topic::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| InvalidTopic(s.to_string()))
    }
}
