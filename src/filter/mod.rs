//! Pattern filters over dependency edges
//!
//! Patterns follow `namespace[:name[:type[:version]]]`. Each segment is
//! compared exactly, except that `*` matches anything and a leading or
//! trailing `*` matches by suffix or prefix. Missing trailing segments match
//! anything, so `org.x` matches every component in the `org.x` namespace.
//!
//! Filters compose:
//!
//! ```text
//! inclusion.or(exclusion)      accepted by either side
//! a.and(b)                     accepted by both sides
//! a.and_not(b)                 accepted by a and rejected by b
//! ```
//!
//! The boundary resolvers use `inclusion.or(exclusion)` so that everything
//! matched by an exclusion pattern is dropped unless an inclusion pattern
//! explicitly brings it back.

use std::fmt;

use crate::domain::{COORDINATES_SEPARATOR, Dependency, Scope};
use crate::error::{Result, invalid_pattern};

const WILDCARD: &str = "*";
const MAX_SEGMENTS: usize = 4;

/// Predicate deciding whether a resolved node belongs to a boundary
pub trait DependencyFilter: fmt::Debug + Send + Sync {
    fn accept(&self, dependency: &Dependency) -> bool;

    /// Accept when either filter accepts
    fn or<F>(self, other: F) -> OrFilter
    where
        Self: Sized + 'static,
        F: DependencyFilter + 'static,
    {
        OrFilter::new(vec![Box::new(self), Box::new(other)])
    }

    /// Accept when both filters accept
    fn and<F>(self, other: F) -> AndFilter
    where
        Self: Sized + 'static,
        F: DependencyFilter + 'static,
    {
        AndFilter::new(vec![Box::new(self), Box::new(other)])
    }

    /// Accept when this filter accepts and `other` rejects
    fn and_not<F>(self, other: F) -> AndNotFilter
    where
        Self: Sized + 'static,
        F: DependencyFilter + 'static,
    {
        AndNotFilter {
            accepted: Box::new(self),
            rejected: Box::new(other),
        }
    }
}

/// One parsed `namespace[:name[:type[:version]]]` pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPattern {
    raw: String,
    segments: Vec<String>,
}

impl ArtifactPattern {
    /// Parse a pattern string
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` when there are no segments, more than four,
    /// or an empty one.
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(invalid_pattern(pattern, "pattern is empty"));
        }

        let segments: Vec<String> = trimmed
            .split(COORDINATES_SEPARATOR)
            .map(|segment| segment.trim().to_string())
            .collect();

        if segments.len() > MAX_SEGMENTS {
            return Err(invalid_pattern(
                pattern,
                format!(
                    "expected at most {MAX_SEGMENTS} segments, found {}",
                    segments.len()
                ),
            ));
        }
        if segments.iter().any(String::is_empty) {
            return Err(invalid_pattern(pattern, "empty segment"));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, dependency: &Dependency) -> bool {
        let coordinate = &dependency.coordinate;
        let tokens = [
            coordinate.namespace.as_str(),
            coordinate.name.as_str(),
            coordinate.archive_type.as_str(),
            coordinate.version.as_deref().unwrap_or_default(),
        ];
        self.segments
            .iter()
            .zip(tokens)
            .all(|(pattern, token)| segment_matches(pattern, token))
    }
}

impl fmt::Display for ArtifactPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn segment_matches(pattern: &str, token: &str) -> bool {
    if pattern == WILDCARD {
        return true;
    }
    match (pattern.strip_prefix(WILDCARD), pattern.strip_suffix(WILDCARD)) {
        (Some(rest), _) if rest.ends_with(WILDCARD) => {
            token.contains(rest.trim_end_matches(WILDCARD))
        }
        (Some(suffix), _) => token.ends_with(suffix),
        (None, Some(prefix)) => token.starts_with(prefix),
        (None, None) => token == pattern,
    }
}

fn parse_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<ArtifactPattern>> {
    patterns
        .iter()
        .map(|pattern| ArtifactPattern::parse(pattern.as_ref()))
        .collect()
}

/// Accepts nodes matched by at least one pattern; empty list accepts nothing
#[derive(Debug, Clone, Default)]
pub struct PatternInclusionFilter {
    patterns: Vec<ArtifactPattern>,
}

impl PatternInclusionFilter {
    /// # Errors
    ///
    /// Returns `InvalidPattern` for the first malformed pattern.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        Ok(Self {
            patterns: parse_patterns(patterns)?,
        })
    }

    pub fn patterns(&self) -> &[ArtifactPattern] {
        &self.patterns
    }
}

impl DependencyFilter for PatternInclusionFilter {
    fn accept(&self, dependency: &Dependency) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches(dependency))
    }
}

/// Accepts nodes matched by none of the patterns
#[derive(Debug, Clone, Default)]
pub struct PatternExclusionFilter {
    patterns: Vec<ArtifactPattern>,
}

impl PatternExclusionFilter {
    /// # Errors
    ///
    /// Returns `InvalidPattern` for the first malformed pattern.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        Ok(Self {
            patterns: parse_patterns(patterns)?,
        })
    }

    pub fn patterns(&self) -> &[ArtifactPattern] {
        &self.patterns
    }
}

impl DependencyFilter for PatternExclusionFilter {
    fn accept(&self, dependency: &Dependency) -> bool {
        !self
            .patterns
            .iter()
            .any(|pattern| pattern.matches(dependency))
    }
}

/// Accepts nodes declared under one of the given scopes
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    scopes: Vec<Scope>,
}

impl ScopeFilter {
    pub fn new(scopes: impl IntoIterator<Item = Scope>) -> Self {
        Self {
            scopes: scopes.into_iter().collect(),
        }
    }

    pub fn compile() -> Self {
        Self::new([Scope::Compile])
    }
}

impl DependencyFilter for ScopeFilter {
    fn accept(&self, dependency: &Dependency) -> bool {
        self.scopes.contains(&dependency.scope)
    }
}

#[derive(Debug)]
pub struct OrFilter {
    filters: Vec<Box<dyn DependencyFilter>>,
}

impl OrFilter {
    pub fn new(filters: Vec<Box<dyn DependencyFilter>>) -> Self {
        Self { filters }
    }
}

impl DependencyFilter for OrFilter {
    fn accept(&self, dependency: &Dependency) -> bool {
        self.filters.iter().any(|filter| filter.accept(dependency))
    }
}

#[derive(Debug)]
pub struct AndFilter {
    filters: Vec<Box<dyn DependencyFilter>>,
}

impl AndFilter {
    pub fn new(filters: Vec<Box<dyn DependencyFilter>>) -> Self {
        Self { filters }
    }
}

impl DependencyFilter for AndFilter {
    fn accept(&self, dependency: &Dependency) -> bool {
        self.filters.iter().all(|filter| filter.accept(dependency))
    }
}

#[derive(Debug)]
pub struct AndNotFilter {
    accepted: Box<dyn DependencyFilter>,
    rejected: Box<dyn DependencyFilter>,
}

impl DependencyFilter for AndNotFilter {
    fn accept(&self, dependency: &Dependency) -> bool {
        self.accepted.accept(dependency) && !self.rejected.accept(dependency)
    }
}

/// Build the "excluded unless explicitly included" boundary filter
///
/// # Errors
///
/// Returns `InvalidPattern` for the first malformed pattern on either list.
pub fn boundary_filter<I: AsRef<str>, E: AsRef<str>>(
    inclusions: &[I],
    exclusions: &[E],
) -> Result<OrFilter> {
    Ok(PatternInclusionFilter::new(inclusions)?.or(PatternExclusionFilter::new(exclusions)?))
}
