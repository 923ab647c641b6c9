//! Hierarchical unique ids of the form `[engine:e]/[class:C]/[method:m]`.

use crate::errors::UniqueIdError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[([^:\[\]/]+):([^\[\]]*)\]").expect("valid segment regex"))
}

/// One `[kind:value]` segment of a unique id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Segment kind, e.g. `engine`, `class`, `method`.
    pub kind: String,
    /// Segment value.
    pub value: String,
}

impl Segment {
    /// Creates a segment.
    #[must_use]
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.kind, self.value)
    }
}

/// The unique id of a test or container.
///
/// Every id starts with the engine segment; children append one segment to
/// their parent's id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniqueId {
    segments: Vec<Segment>,
}

impl UniqueId {
    /// Kind of the first segment.
    pub const ENGINE_KIND: &'static str = "engine";

    /// Creates the id of an engine root.
    #[must_use]
    pub fn for_engine(engine_id: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::new(Self::ENGINE_KIND, engine_id)],
        }
    }

    /// Returns a new id with one more segment.
    #[must_use]
    pub fn append(&self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::new(kind, value));
        Self { segments }
    }

    /// Returns all segments, root first.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the last segment.
    #[must_use]
    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Returns the engine id if the first segment is an engine segment.
    #[must_use]
    pub fn engine_id(&self) -> Option<&str> {
        self.segments
            .first()
            .filter(|s| s.kind == Self::ENGINE_KIND)
            .map(|s| s.value.as_str())
    }

    /// Returns the id of the enclosing container, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        (self.segments.len() > 1).then(|| Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Returns true if `self` is `other` or one of its ancestors.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.segments.starts_with(&self.segments)
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for UniqueId {
    type Err = UniqueIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(UniqueIdError::new(s, "unique id must not be blank"));
        }

        let mut segments = Vec::new();
        let mut expected_start = 0;
        for captures in segment_pattern().captures_iter(s) {
            let (Some(whole), Some(kind), Some(value)) = (captures.get(0), captures.get(1), captures.get(2)) else {
                continue;
            };
            if whole.start() != expected_start {
                return Err(UniqueIdError::new(
                    s,
                    format!("unexpected text at offset {expected_start}"),
                ));
            }
            segments.push(Segment::new(kind.as_str(), value.as_str()));
            expected_start = whole.end() + 1;
            if whole.end() < s.len() && !s[whole.end()..].starts_with('/') {
                return Err(UniqueIdError::new(
                    s,
                    format!("expected '/' at offset {}", whole.end()),
                ));
            }
        }

        if segments.is_empty() || expected_start != s.len() + 1 {
            return Err(UniqueIdError::new(s, "expected '[kind:value]' segments separated by '/'"));
        }

        Ok(Self { segments })
    }
}
