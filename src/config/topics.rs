// src/config/topics.rs
//! Topic → search query profile mapping, loaded from TOML with a built-in seed.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::topic::Topic;

pub const DEFAULT_TOPICS_CONFIG_PATH: &str = "config/topics.toml";
pub const ENV_TOPICS_CONFIG_PATH: &str = "TOPICS_CONFIG_PATH";

/// What the search provider is asked for a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryProfile {
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Provider category token (e.g. "science"); used when `keywords` is empty.
    #[serde(default)]
    pub category: Option<String>,
}

impl QueryProfile {
    pub fn keywords<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: items.into_iter().map(Into::into).collect(),
            category: None,
        }
    }

    fn cleaned(self) -> Self {
        let mut seen = std::collections::HashSet::new();
        let keywords = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && seen.insert(k.to_ascii_lowercase()))
            .collect();
        let category = self
            .category
            .map(|c| c.trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty());
        Self { keywords, category }
    }

    fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.category.is_none()
    }
}

static EMPTY_PROFILE: Lazy<QueryProfile> = Lazy::new(QueryProfile::default);

#[derive(Debug, Clone)]
pub struct TopicCatalog {
    profiles: HashMap<Topic, QueryProfile>,
}

#[derive(Deserialize)]
struct TomlRoot {
    #[serde(default)]
    topics: HashMap<String, QueryProfile>,
}

impl TopicCatalog {
    pub fn profile(&self, topic: Topic) -> &QueryProfile {
        self.profiles.get(&topic).unwrap_or(&EMPTY_PROFILE)
    }

    /// Parse TOML of the form `[topics.<id>] keywords = [...]` / `category = "..."`.
    /// Topics not named in the file keep their built-in profile.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let root: TomlRoot = toml::from_str(s).context("parsing topics toml")?;
        let mut catalog = Self::default_seed();
        for (name, profile) in root.topics {
            let topic: Topic = name.parse().map_err(|e| anyhow!("topics config: {e}"))?;
            let profile = profile.cleaned();
            if profile.is_empty() {
                bail!("topics config: `{topic}` has neither keywords nor category");
            }
            catalog.profiles.insert(topic, profile);
        }
        Ok(catalog)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading topics config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// 1) $TOPICS_CONFIG_PATH (must exist)
    /// 2) config/topics.toml
    /// 3) built-in seed
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_TOPICS_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_TOPICS_CONFIG_PATH} points to non-existent path");
            }
            return Self::load_from(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_TOPICS_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default_seed())
    }

    /// Built-in keyword sets for every topic.
    pub fn default_seed() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            Topic::Military,
            QueryProfile::keywords([
                "war",
                "covert operations",
                "cold war",
                "meetings between world leaders",
                "international skirmishes",
                "confrontations",
                "new laws",
                "martial law",
                "military threats",
                "intelligence operations",
                "expansion of power",
                "threats",
                "military industrial complex",
            ]),
        );
        profiles.insert(
            Topic::Science,
            QueryProfile::keywords([
                "human body discoveries",
                "anthropology",
                "climate",
                "nature",
                "celestial",
                "vaccinations",
                "human-technology fusion",
                "psychology",
                "mind",
                "consciousness",
                "psychedelics",
                "technological advancements",
                "quantum science",
                "strange phenomena",
                "simulation theory",
            ]),
        );
        profiles.insert(
            Topic::Politics,
            QueryProfile::keywords([
                "regime changes",
                "new laws",
                "protests",
                "civil unrest",
                "social changes",
                "community activism",
                "police brutality",
                "police state",
                "strict governance",
                "government failures",
                "secret societies",
                "world meetings",
                "new leaders",
                "guerilla warfare",
                "psyops",
                "covert operations",
                "finance world ties",
                "political ties",
            ]),
        );
        profiles.insert(
            Topic::Religion,
            QueryProfile::keywords([
                "spirituality",
                "new age",
                "institutional religions",
                "vatican",
                "christianity",
                "islam",
                "judaism",
                "religious fighting",
                "religious extremists",
                "prophecy",
                "religious leaders",
                "religion and politics",
                "aliens",
                "demons",
                "spiritual attacks",
                "antichrist",
                "middle east crisis",
                "secret societies",
                "crop circles",
                "strange phenomena",
            ]),
        );
        profiles.insert(
            Topic::Media,
            QueryProfile::keywords([
                "hollywood",
                "celebrities",
                "influencers",
                "content creators",
                "legacy media",
                "scandals",
                "occult symbolism",
                "occult parties",
                "sex rings",
                "human trafficking",
                "jeffrey epstein",
                "satanic symbolism",
                "satanic rituals",
                "predictive programming",
                "significant events",
            ]),
        );
        Self { profiles }
    }
}
