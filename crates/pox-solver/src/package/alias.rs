use indexmap::IndexMap;
use std::sync::Arc;

use super::package::{names_of, resolve_self_version, to_links};
use super::{Link, LinkType, Package, Stability};

/// Represents a version alias for a package
///
/// An alias package wraps another package and presents a different version,
/// while delegating identity to the aliased package. This is used for branch
/// aliases (`dev-main` as `1.0.x-dev`) and root aliases (`dev-main as 1.0.0`).
///
/// `self.version` constraints in the aliased package's links are rewritten to
/// the alias version so that the alias satisfies its own sibling packages.
#[derive(Debug, Clone)]
pub struct AliasPackage {
    alias_of: Arc<Package>,
    version: String,
    pretty_version: String,
    stability: Stability,
    is_root_package_alias: bool,
    require: IndexMap<String, String>,
    conflict: IndexMap<String, String>,
    provide: IndexMap<String, String>,
    replace: IndexMap<String, String>,
}

impl AliasPackage {
    /// Creates a new alias package
    ///
    /// # Arguments
    /// * `alias_of` - The package this is an alias of
    /// * `version` - The normalized alias version
    /// * `pretty_version` - The pretty version for display
    pub fn new(alias_of: Arc<Package>, version: String, pretty_version: String) -> Self {
        let stability = Stability::from_version(&version);

        let require = replace_self_version(&alias_of.require, &version);
        let conflict = replace_self_version(&alias_of.conflict, &version);
        let provide = replace_self_version(&alias_of.provide, &version);
        let replace = replace_self_version(&alias_of.replace, &version);

        Self {
            alias_of,
            version,
            pretty_version,
            stability,
            is_root_package_alias: false,
            require,
            conflict,
            provide,
            replace,
        }
    }

    /// Returns the package this is an alias of
    pub fn alias_of(&self) -> &Package {
        &self.alias_of
    }

    /// Returns the aliased package as an Arc
    pub fn alias_of_arc(&self) -> Arc<Package> {
        Arc::clone(&self.alias_of)
    }

    /// Returns the alias version (normalized)
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the pretty alias version
    pub fn pretty_version(&self) -> &str {
        &self.pretty_version
    }

    /// Returns the stability of the alias
    pub fn stability(&self) -> Stability {
        self.stability
    }

    /// Sets whether this alias was created from root package requirements
    pub fn set_root_package_alias(&mut self, value: bool) {
        self.is_root_package_alias = value;
    }

    /// Returns true if this alias was created from root package requirements
    pub fn is_root_package_alias(&self) -> bool {
        self.is_root_package_alias
    }

    /// Returns the package name
    pub fn name(&self) -> &str {
        &self.alias_of.name
    }

    /// Returns the pretty package name
    pub fn pretty_name(&self) -> &str {
        self.alias_of.pretty_name()
    }

    /// Returns a pretty string representation
    pub fn pretty_string(&self) -> String {
        format!("{} {}", self.pretty_name(), self.pretty_version())
    }

    /// Returns the unique name (name-version)
    pub fn unique_name(&self) -> String {
        format!("{}-{}", self.name(), self.version)
    }

    /// Returns every name this alias can be found under
    pub fn get_names(&self) -> Vec<String> {
        names_of(self.name(), &self.provide, &self.replace)
    }

    pub fn require(&self) -> &IndexMap<String, String> {
        &self.require
    }

    pub fn conflict(&self) -> &IndexMap<String, String> {
        &self.conflict
    }

    pub fn provide(&self) -> &IndexMap<String, String> {
        &self.provide
    }

    pub fn replace(&self) -> &IndexMap<String, String> {
        &self.replace
    }

    pub fn requires(&self) -> Vec<Link> {
        to_links(self.name(), &self.version, &self.require, LinkType::Require)
    }

    pub fn conflicts(&self) -> Vec<Link> {
        to_links(self.name(), &self.version, &self.conflict, LinkType::Conflict)
    }

    pub fn provides(&self) -> Vec<Link> {
        to_links(self.name(), &self.version, &self.provide, LinkType::Provide)
    }

    pub fn replaces(&self) -> Vec<Link> {
        to_links(self.name(), &self.version, &self.replace, LinkType::Replace)
    }
}

impl std::fmt::Display for AliasPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (alias of {})", self.unique_name(), self.alias_of.version)
    }
}

fn replace_self_version(deps: &IndexMap<String, String>, version: &str) -> IndexMap<String, String> {
    deps.iter()
        .map(|(target, constraint)| (target.clone(), resolve_self_version(constraint, version)))
        .collect()
}
