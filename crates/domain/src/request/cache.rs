//! Cache hints passed through to the hosting data cache.
//!
//! Tags and the revalidate window have no meaning inside pokefetch: they are
//! carried on each request so a caching layer in front of the adapters can
//! read them.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How long a cached response stays fresh.
///
/// Serialised as a number of seconds, or `false` when caching is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revalidate {
    /// Revalidate after the given number of seconds.
    Seconds(u64),
    /// Never serve this response from the cache.
    Disabled,
}

impl Serialize for Revalidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Seconds(secs) => serializer.serialize_u64(*secs),
            Self::Disabled => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for Revalidate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Seconds(u64),
            Flag(bool),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => Ok(Self::Seconds(secs)),
            Raw::Flag(false) => Ok(Self::Disabled),
            Raw::Flag(true) => Err(D::Error::custom(
                "revalidate must be a number of seconds or false",
            )),
        }
    }
}

/// Opaque cache tags and revalidate window for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheHints {
    /// Cache tags used for targeted invalidation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Revalidate window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revalidate: Option<Revalidate>,
}

impl CacheHints {
    /// Creates hints with the given tags and no revalidate window.
    #[must_use]
    pub fn tagged<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            revalidate: None,
        }
    }

    /// Sets the revalidate window.
    #[must_use]
    pub const fn with_revalidate(mut self, revalidate: Revalidate) -> Self {
        self.revalidate = Some(revalidate);
        self
    }

    /// Returns true if no hint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.revalidate.is_none()
    }

    /// Merges caller hints on top of these defaults.
    ///
    /// Tags are the union of both lists (defaults first, no duplicates); the
    /// caller's revalidate window wins when present.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        let mut tags = self.tags.clone();
        for tag in &overrides.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        Self {
            tags,
            revalidate: overrides.revalidate.or(self.revalidate),
        }
    }
}
