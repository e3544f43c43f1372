use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of package link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Regular require dependency
    #[serde(rename = "requires")]
    Require,
    /// Package provides this virtual package
    #[serde(rename = "provides")]
    Provide,
    /// Conflicts with this package
    #[serde(rename = "conflicts")]
    Conflict,
    /// Replaces this package
    #[serde(rename = "replaces")]
    Replace,
}

impl LinkType {
    /// Returns the verb used when describing a link of this type
    pub fn description(&self) -> &'static str {
        match self {
            LinkType::Require => "requires",
            LinkType::Provide => "provides",
            LinkType::Conflict => "conflicts",
            LinkType::Replace => "replaces",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Represents a link between two packages
///
/// A link connects a source package to a target package name with a version
/// constraint. Requirement links are also the diagnostic payload of
/// `PackageRequire` rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Source package name (lowercase)
    pub source: String,
    /// Target package name (lowercase)
    pub target: String,
    /// Version constraint string (e.g., "^1.0", ">=2.0,<3.0")
    pub constraint: String,
    /// Pretty constraint string for display (same as constraint in most cases)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty_constraint: Option<String>,
    /// Type of link (require, conflict, etc.)
    #[serde(rename = "type")]
    pub link_type: LinkType,
}

impl Link {
    /// Creates a new link between two packages
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        constraint: impl Into<String>,
        link_type: LinkType,
    ) -> Self {
        let source = source.into().to_lowercase();
        let target = target.into().to_lowercase();
        let constraint = constraint.into();

        Self {
            source,
            target,
            pretty_constraint: Some(constraint.clone()),
            constraint,
            link_type,
        }
    }

    /// Returns the constraint string to use for display
    pub fn pretty_constraint(&self) -> &str {
        self.pretty_constraint.as_deref().unwrap_or(&self.constraint)
    }

    /// Returns the constraint to hand to provider lookups, `None` meaning any version
    pub fn lookup_constraint(&self) -> Option<&str> {
        match self.constraint.trim() {
            "" | "*" => None,
            _ => Some(self.constraint.as_str()),
        }
    }

    /// Renders the link from the point of view of a concrete source package,
    /// e.g. `vendor/a 1.0.0 requires vendor/b ^1.0`
    pub fn pretty_string(&self, source_pretty: &str) -> String {
        format!(
            "{} {} {} {}",
            source_pretty,
            self.link_type.description(),
            self.target,
            self.pretty_constraint()
        )
    }

    /// Returns a human-readable description of this link
    pub fn description(&self) -> String {
        format!(
            "{} {} {} ({})",
            self.source,
            self.link_type.description(),
            self.target,
            self.pretty_constraint()
        )
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}
