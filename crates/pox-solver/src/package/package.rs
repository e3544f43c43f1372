use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Link, LinkType};

/// Package stability levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    /// Development version
    Dev,
    /// Alpha release
    Alpha,
    /// Beta release
    Beta,
    /// Release candidate
    #[serde(rename = "RC", alias = "rc")]
    RC,
    /// Stable release
    #[default]
    Stable,
}

impl Stability {
    /// Returns the stability priority (lower is more stable)
    pub fn priority(&self) -> u8 {
        match self {
            Stability::Stable => 0,
            Stability::RC => 5,
            Stability::Beta => 10,
            Stability::Alpha => 15,
            Stability::Dev => 20,
        }
    }

    /// Parses stability from a version string
    pub fn from_version(version: &str) -> Self {
        let lower = version.to_lowercase();
        if lower.starts_with("dev-") || lower.ends_with("-dev") {
            Stability::Dev
        } else if lower.contains("alpha") {
            Stability::Alpha
        } else if lower.contains("beta") {
            Stability::Beta
        } else if lower.contains("rc") {
            Stability::RC
        } else {
            Stability::Stable
        }
    }

    /// Returns true if a package of this stability is acceptable under `minimum`
    pub fn satisfies(&self, minimum: Stability) -> bool {
        self.priority() <= minimum.priority()
    }
}

impl std::str::FromStr for Stability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Stability::Dev),
            "alpha" => Ok(Stability::Alpha),
            "beta" => Ok(Stability::Beta),
            "rc" => Ok(Stability::RC),
            "stable" | "" => Ok(Stability::Stable),
            other => Err(format!("unknown stability \"{}\"", other)),
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stability::Dev => write!(f, "dev"),
            Stability::Alpha => write!(f, "alpha"),
            Stability::Beta => write!(f, "beta"),
            Stability::RC => write!(f, "RC"),
            Stability::Stable => write!(f, "stable"),
        }
    }
}

/// A concrete package version as seen by the resolver.
///
/// Only the metadata relevant to rule generation is kept: identity
/// (name/version) and the four link maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name (lowercase, vendor/package format)
    pub name: String,

    /// Pretty name (original case)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pretty_name: Option<String>,

    /// Version
    pub version: String,

    /// Pretty version (human-readable)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pretty_version: Option<String>,

    /// Package stability, derived from the version when absent
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stability: Option<Stability>,

    /// Required dependencies
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub require: IndexMap<String, String>,

    /// Conflicting packages
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub conflict: IndexMap<String, String>,

    /// Provided virtual packages
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub provide: IndexMap<String, String>,

    /// Replaced packages
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub replace: IndexMap<String, String>,
}

impl Package {
    /// Creates a new package with the given name and version
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let version = version.into();
        let stability = Stability::from_version(&version);

        Self {
            name: name.to_lowercase(),
            pretty_name: Some(name),
            version: version.clone(),
            pretty_version: Some(version),
            stability: Some(stability),
            require: IndexMap::new(),
            conflict: IndexMap::new(),
            provide: IndexMap::new(),
            replace: IndexMap::new(),
        }
    }

    /// Lowercases the name and link targets of a deserialized package
    pub fn normalized(mut self) -> Self {
        if self.pretty_name.is_none() {
            self.pretty_name = Some(self.name.clone());
        }
        self.name = self.name.to_lowercase();
        if self.stability.is_none() {
            self.stability = Some(Stability::from_version(&self.version));
        }
        for map in [
            &mut self.require,
            &mut self.conflict,
            &mut self.provide,
            &mut self.replace,
        ] {
            let lowered: IndexMap<String, String> = map
                .drain(..)
                .map(|(target, constraint)| (target.to_lowercase(), constraint))
                .collect();
            *map = lowered;
        }
        self
    }

    /// Returns the pretty name (falls back to name)
    pub fn pretty_name(&self) -> &str {
        self.pretty_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns the pretty version (falls back to version)
    pub fn pretty_version(&self) -> &str {
        self.pretty_version.as_deref().unwrap_or(&self.version)
    }

    /// Returns the package stability
    pub fn stability(&self) -> Stability {
        self.stability.unwrap_or_default()
    }

    /// Returns true if this is a development version
    pub fn is_dev(&self) -> bool {
        self.stability() == Stability::Dev
    }

    /// Returns the unique name (name-version)
    pub fn unique_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Returns a pretty string representation
    pub fn pretty_string(&self) -> String {
        format!("{} {}", self.pretty_name(), self.pretty_version())
    }

    /// Returns every name this package can be found under: its own name
    /// followed by provided and replaced names
    pub fn get_names(&self) -> Vec<String> {
        names_of(&self.name, &self.provide, &self.replace)
    }

    /// Returns the require links
    pub fn requires(&self) -> Vec<Link> {
        to_links(&self.name, &self.version, &self.require, LinkType::Require)
    }

    /// Returns the conflict links
    pub fn conflicts(&self) -> Vec<Link> {
        to_links(&self.name, &self.version, &self.conflict, LinkType::Conflict)
    }

    /// Returns the provide links
    pub fn provides(&self) -> Vec<Link> {
        to_links(&self.name, &self.version, &self.provide, LinkType::Provide)
    }

    /// Returns the replace links
    pub fn replaces(&self) -> Vec<Link> {
        to_links(&self.name, &self.version, &self.replace, LinkType::Replace)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unique_name())
    }
}

pub(super) fn names_of(
    name: &str,
    provide: &IndexMap<String, String>,
    replace: &IndexMap<String, String>,
) -> Vec<String> {
    let mut names = vec![name.to_lowercase()];

    for target in provide.keys().chain(replace.keys()) {
        let target = target.to_lowercase();
        if !names.contains(&target) {
            names.push(target);
        }
    }

    names
}

/// Builds links from a dependency map, resolving `self.version` against
/// the source version
pub(super) fn to_links(
    source: &str,
    source_version: &str,
    map: &IndexMap<String, String>,
    link_type: LinkType,
) -> Vec<Link> {
    map.iter()
        .map(|(target, constraint)| {
            let constraint = resolve_self_version(constraint, source_version);
            Link::new(source, target, constraint, link_type)
        })
        .collect()
}

pub(super) fn resolve_self_version(constraint: &str, version: &str) -> String {
    if constraint == "self.version" {
        format!("={}", version)
    } else {
        constraint.to_string()
    }
}
