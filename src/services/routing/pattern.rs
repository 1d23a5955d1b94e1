//! Segment based path patterns used by the route table.
//!
//! - `literal` matches exactly (case-sensitive)
//! - `{name}` matches one segment and captures it
//! - `*` matches one segment
//! - `**` matches the rest of the path (zero or more segments), last position only
use std::fmt;

use crate::services::routing::RouteRuleError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Any,
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Captured `{name}` values, in pattern order.
pub type Captures = Vec<(String, String)>;

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, RouteRuleError> {
        let invalid = |reason: &'static str| RouteRuleError::InvalidPattern {
            pattern: raw.to_string(),
            reason,
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let parts: Vec<&str> = split(raw).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = match *part {
                "**" if i + 1 == parts.len() => Segment::Rest,
                "**" => return Err(invalid("'**' is only allowed as the last segment")),
                "*" => Segment::Any,
                p if p.starts_with('{') && p.ends_with('}') => {
                    let name = &p[1..p.len() - 1];
                    if name.is_empty() {
                        return Err(invalid("empty placeholder name"));
                    }
                    if segments
                        .iter()
                        .any(|s| matches!(s, Segment::Param(n) if n == name))
                    {
                        return Err(invalid("duplicate placeholder name"));
                    }
                    Segment::Param(name.to_string())
                }
                p if p.contains(['{', '}', '*']) => {
                    return Err(invalid("wildcards must span a whole segment"));
                }
                p => Segment::Literal(p.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// `/**`
    pub fn any() -> Self {
        Self {
            raw: "/**".to_string(),
            segments: vec![Segment::Rest],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Param(n) if n == name))
    }

    pub fn matches(&self, path: &str) -> Option<Captures> {
        let mut parts = split(path);
        let mut captures = Captures::new();

        for segment in &self.segments {
            match segment {
                Segment::Rest => return Some(captures),
                Segment::Literal(literal) => {
                    if parts.next()? != literal {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    captures.push((name.clone(), parts.next()?.to_string()));
                }
                Segment::Any => {
                    parts.next()?;
                }
            }
        }

        if parts.next().is_some() {
            None
        } else {
            Some(captures)
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
