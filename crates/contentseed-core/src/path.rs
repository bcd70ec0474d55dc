//! Slash-delimited content paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// Hierarchical identifier of a content node, e.g. `/my-corporation/about`.
///
/// Stored as its segments; `/` is the root and has no segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentPath {
    segments: Vec<String>,
}

impl ContentPath {
    /// The root path `/`.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a path such as `/large-tree/large-tree-node-1`.
    ///
    /// A single trailing slash is tolerated. Empty segments are rejected.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(PathError::NotAbsolute {
                path: raw.to_string(),
            });
        };

        let rest = rest.strip_suffix('/').unwrap_or(rest);
        if rest.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            validate_segment(segment).map_err(|reason| PathError::InvalidSegment {
                path: raw.to_string(),
                reason,
            })?;
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// Check if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment of the path, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent path, `None` for the root.
    pub fn parent(&self) -> Option<ContentPath> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Append a single segment.
    pub fn join(&self, segment: &str) -> Result<ContentPath, PathError> {
        validate_segment(segment).map_err(|reason| PathError::InvalidSegment {
            path: format!("{self}/{segment}"),
            reason,
        })?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Number of segments (0 for the root).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Check if `self` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &ContentPath) -> bool {
        self.segments.len() > ancestor.segments.len()
            && self.segments.starts_with(&ancestor.segments)
    }

    /// Iterate over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

fn validate_segment(segment: &str) -> Result<(), &'static str> {
    if segment.is_empty() {
        return Err("empty segment");
    }
    if segment.contains('/') {
        return Err("segment contains '/'");
    }
    if segment == "." || segment == ".." {
        return Err("relative segment");
    }
    Ok(())
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ContentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentPath> for String {
    fn from(path: ContentPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let path = ContentPath::parse("/large-tree/large-tree-node-1").unwrap();
        assert_eq!(path.depth(), 2);
        assert_eq!(path.name(), Some("large-tree-node-1"));
        assert_eq!(path.to_string(), "/large-tree/large-tree-node-1");
    }

    #[test]
    fn test_root() {
        let root = ContentPath::parse("/").unwrap();
        assert!(root.is_root());
        assert_eq!(root, ContentPath::root());
        assert_eq!(root.to_string(), "/");
        assert!(root.parent().is_none());
        assert!(root.name().is_none());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            ContentPath::parse("relative/path"),
            Err(PathError::NotAbsolute { .. })
        ));
        assert!(matches!(
            ContentPath::parse("/a//b"),
            Err(PathError::InvalidSegment { .. })
        ));
        assert!(ContentPath::root().join("..").is_err());
    }

    #[test]
    fn test_parent_and_descendant() {
        let child = ContentPath::parse("/my-corporation/about/team").unwrap();
        let site = ContentPath::parse("/my-corporation").unwrap();
        assert_eq!(child.parent().unwrap().parent().unwrap(), site);
        assert!(child.is_descendant_of(&site));
        assert!(child.is_descendant_of(&ContentPath::root()));
        assert!(!site.is_descendant_of(&site));
    }

    #[test]
    fn test_trailing_slash_tolerated() {
        let path = ContentPath::parse("/large-tree/").unwrap();
        assert_eq!(path.to_string(), "/large-tree");
    }
}
