use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::constraint::VersionConstraint;
use super::rule::Literal;
use crate::package::{AliasPackage, Link, Package, Stability};

/// A package id in the pool. Ids are positive and double as SAT variables.
pub type PackageId = i32;

/// Package ids the solver may consider during a run
pub type Whitelist = HashSet<PackageId>;

/// Installed packages keyed by pool id, in installation order
pub type InstalledMap = IndexMap<PackageId, PoolEntry>;

/// Represents an entry in the pool - either a regular package or an alias
#[derive(Debug, Clone)]
pub enum PoolEntry {
    /// A regular package
    Package(Arc<Package>),
    /// An alias of another package
    Alias(Arc<AliasPackage>),
}

impl PoolEntry {
    /// Returns the package name
    pub fn name(&self) -> &str {
        match self {
            PoolEntry::Package(p) => &p.name,
            PoolEntry::Alias(a) => a.name(),
        }
    }

    /// Returns the pretty package name
    pub fn pretty_name(&self) -> &str {
        match self {
            PoolEntry::Package(p) => p.pretty_name(),
            PoolEntry::Alias(a) => a.pretty_name(),
        }
    }

    /// Returns the version string
    pub fn version(&self) -> &str {
        match self {
            PoolEntry::Package(p) => &p.version,
            PoolEntry::Alias(a) => a.version(),
        }
    }

    /// Returns the pretty version string
    pub fn pretty_version(&self) -> &str {
        match self {
            PoolEntry::Package(p) => p.pretty_version(),
            PoolEntry::Alias(a) => a.pretty_version(),
        }
    }

    pub fn stability(&self) -> Stability {
        match self {
            PoolEntry::Package(p) => p.stability(),
            PoolEntry::Alias(a) => a.stability(),
        }
    }

    /// Returns `name version` for display
    pub fn pretty_string(&self) -> String {
        match self {
            PoolEntry::Package(p) => p.pretty_string(),
            PoolEntry::Alias(a) => a.pretty_string(),
        }
    }

    /// Returns true if this is an alias package
    pub fn is_alias(&self) -> bool {
        matches!(self, PoolEntry::Alias(_))
    }

    /// Returns the alias package if this is an alias
    pub fn as_alias(&self) -> Option<&Arc<AliasPackage>> {
        match self {
            PoolEntry::Alias(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the regular package if this is not an alias
    pub fn as_package(&self) -> Option<&Arc<Package>> {
        match self {
            PoolEntry::Package(p) => Some(p),
            _ => None,
        }
    }

    /// Own name followed by provided and replaced names
    pub fn get_names(&self) -> Vec<String> {
        match self {
            PoolEntry::Package(p) => p.get_names(),
            PoolEntry::Alias(a) => a.get_names(),
        }
    }

    pub fn requires(&self) -> Vec<Link> {
        match self {
            PoolEntry::Package(p) => p.requires(),
            PoolEntry::Alias(a) => a.requires(),
        }
    }

    pub fn conflicts(&self) -> Vec<Link> {
        match self {
            PoolEntry::Package(p) => p.conflicts(),
            PoolEntry::Alias(a) => a.conflicts(),
        }
    }

    pub fn replaces(&self) -> Vec<Link> {
        match self {
            PoolEntry::Package(p) => p.replaces(),
            PoolEntry::Alias(a) => a.replaces(),
        }
    }

    pub fn provide(&self) -> &IndexMap<String, String> {
        match self {
            PoolEntry::Package(p) => &p.provide,
            PoolEntry::Alias(a) => a.provide(),
        }
    }

    pub fn replace(&self) -> &IndexMap<String, String> {
        match self {
            PoolEntry::Package(p) => &p.replace,
            PoolEntry::Alias(a) => a.replace(),
        }
    }
}

/// Result of matching a pool entry against a name and constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Neither the name nor a provided/replaced name matches
    None,
    /// The entry's own name and version match
    Match,
    /// The entry provides the name with a matching constraint
    Provide,
    /// The entry replaces the name with a matching constraint
    Replace,
}

/// Options for a provider lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProvideQuery {
    /// Only return packages whose own name matches (no providers/replacers)
    pub must_match_name: bool,
    /// Ignore the whitelist and minimum-stability filtering
    pub bypass_filters: bool,
}

impl ProvideQuery {
    /// Regular lookup honouring all filters
    pub const FILTERED: ProvideQuery = ProvideQuery {
        must_match_name: false,
        bypass_filters: false,
    };

    /// Lookup that sees every package in the pool
    pub const UNFILTERED: ProvideQuery = ProvideQuery {
        must_match_name: false,
        bypass_filters: true,
    };
}

/// The pool as seen by rule generation.
///
/// Rule generation only depends on this interface; storage and constraint
/// matching belong to the implementation.
pub trait PoolInterface {
    /// Get an entry by its id
    fn entry(&self, id: PackageId) -> Option<&PoolEntry>;

    /// Id of the package an alias points to, `None` for regular packages
    fn alias_of(&self, id: PackageId) -> Option<PackageId>;

    /// Find all packages matching a name and optional constraint
    fn what_provides(&self, name: &str, constraint: Option<&str>, query: ProvideQuery) -> Vec<PackageId>;

    /// Match a single candidate against a name and optional constraint
    fn match_entry(
        &self,
        id: PackageId,
        name: &str,
        constraint: Option<&str>,
        bypass_filters: bool,
    ) -> MatchResult;

    /// Restrict subsequent filtered lookups to the given ids
    fn set_whitelist(&mut self, whitelist: Whitelist);

    /// The active whitelist, if one has been installed
    fn whitelist(&self) -> Option<&Whitelist>;

    /// Get the entry a literal refers to
    fn literal_to_entry(&self, literal: Literal) -> Option<&PoolEntry> {
        self.entry(literal.abs())
    }

    /// Render a literal as a human readable decision, e.g. `install foo 1.0.0`
    fn literal_to_pretty_string(&self, literal: Literal, installed: &InstalledMap) -> String {
        let id = literal.abs();
        let package = self
            .entry(id)
            .map(|e| e.pretty_string())
            .unwrap_or_else(|| format!("#{}", id));

        let prefix = match (installed.contains_key(&id), literal > 0) {
            (true, true) => "keep",
            (true, false) => "remove",
            (false, true) => "install",
            (false, false) => "don't install",
        };

        format!("{} {}", prefix, package)
    }
}

/// In-memory pool of all available packages.
///
/// Each package version (and each alias) gets a unique id, starting at 1,
/// that is used as a literal in SAT clauses. Stability and whitelist filters
/// are applied at lookup time so diagnostics can still see filtered packages.
pub struct Pool {
    /// All entries, id `n` lives at index `n - 1`
    entries: Vec<PoolEntry>,

    /// Package ids indexed by name (lowercase)
    packages_by_name: HashMap<String, Vec<PackageId>>,

    /// Package ids indexed by provided or replaced name (lowercase)
    providers: HashMap<String, Vec<PackageId>>,

    /// Maps alias package ids to their base package ids
    alias_map: HashMap<PackageId, PackageId>,

    /// Minimum stability for packages (default: Stable)
    minimum_stability: Stability,

    /// Per-package stability overrides (package name -> stability)
    stability_flags: HashMap<String, Stability>,

    /// Installed by the rule generator before rules are built
    whitelist: Option<Whitelist>,

    /// Installed package ids, exempt from stability filtering
    installed: HashSet<PackageId>,

    /// Cached parsed constraints, `None` when the constraint failed to parse
    parsed_constraints: RefCell<HashMap<String, Option<VersionConstraint>>>,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("entries", &self.entries)
            .field("packages_by_name", &self.packages_by_name)
            .field("providers", &self.providers)
            .field("alias_map", &self.alias_map)
            .field("minimum_stability", &self.minimum_stability)
            .field("stability_flags", &self.stability_flags)
            .field("whitelist", &self.whitelist)
            .field("installed", &self.installed)
            .finish()
    }
}

impl Pool {
    /// Create a new empty pool with default stability (Stable)
    pub fn new() -> Self {
        Self::with_minimum_stability(Stability::Stable)
    }

    /// Create a new pool with the specified minimum stability
    pub fn with_minimum_stability(minimum_stability: Stability) -> Self {
        Self {
            entries: Vec::new(),
            packages_by_name: HashMap::new(),
            providers: HashMap::new(),
            alias_map: HashMap::new(),
            minimum_stability,
            stability_flags: HashMap::new(),
            whitelist: None,
            installed: HashSet::new(),
            parsed_constraints: RefCell::new(HashMap::new()),
        }
    }

    /// Create a pool builder for fluent construction
    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    /// Set the minimum stability for packages
    pub fn set_minimum_stability(&mut self, stability: Stability) {
        self.minimum_stability = stability;
    }

    /// Get the minimum stability
    pub fn minimum_stability(&self) -> Stability {
        self.minimum_stability
    }

    /// Add a stability flag for a specific package
    pub fn add_stability_flag(&mut self, package_name: &str, stability: Stability) {
        self.stability_flags.insert(package_name.to_lowercase(), stability);
    }

    /// Add a package to the pool, returning its id
    pub fn add_package(&mut self, package: Package) -> PackageId {
        self.add_package_arc(Arc::new(package))
    }

    /// Add an existing package (Arc) to the pool, returning its id
    pub fn add_package_arc(&mut self, package: Arc<Package>) -> PackageId {
        self.insert_entry(PoolEntry::Package(package))
    }

    /// Add an alias for a package already in the pool
    ///
    /// Returns `None` if the base package id is unknown or is itself an alias.
    pub fn add_alias(
        &mut self,
        base_id: PackageId,
        alias_version: &str,
        pretty_version: &str,
        is_root_package_alias: bool,
    ) -> Option<PackageId> {
        let base = self.entry(base_id)?.as_package()?.clone();

        let mut alias = AliasPackage::new(base, alias_version.to_string(), pretty_version.to_string());
        alias.set_root_package_alias(is_root_package_alias);

        let id = self.insert_entry(PoolEntry::Alias(Arc::new(alias)));
        self.alias_map.insert(id, base_id);
        Some(id)
    }

    /// Add a fully constructed alias package, linking it to its base by name and version
    pub fn add_alias_package(&mut self, alias: AliasPackage) -> PackageId {
        let base_id = self.find_package_id(alias.name(), &alias.alias_of().version);
        let id = self.insert_entry(PoolEntry::Alias(Arc::new(alias)));

        if let Some(base_id) = base_id {
            self.alias_map.insert(id, base_id);
        }

        id
    }

    fn insert_entry(&mut self, entry: PoolEntry) -> PackageId {
        let id = self.entries.len() as PackageId + 1;

        self.packages_by_name
            .entry(entry.name().to_lowercase())
            .or_default()
            .push(id);

        for provided in entry.provide().keys().chain(entry.replace().keys()) {
            let ids = self.providers.entry(provided.to_lowercase()).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        self.entries.push(entry);
        id
    }

    /// Find a non-alias package id by name and version
    pub fn find_package_id(&self, name: &str, version: &str) -> Option<PackageId> {
        self.packages_by_name
            .get(&name.to_lowercase())?
            .iter()
            .copied()
            .find(|&id| {
                self.entry(id)
                    .map(|e| !e.is_alias() && e.version() == version)
                    .unwrap_or(false)
            })
    }

    /// Get all package ids with a given name
    pub fn packages_by_name(&self, name: &str) -> Vec<PackageId> {
        self.packages_by_name
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Get all alias ids pointing at a package
    pub fn get_aliases(&self, base_id: PackageId) -> Vec<PackageId> {
        let mut aliases: Vec<PackageId> = self
            .alias_map
            .iter()
            .filter(|(_, &base)| base == base_id)
            .map(|(&alias_id, _)| alias_id)
            .collect();
        aliases.sort_unstable();
        aliases
    }

    /// Build an installed map from pool ids, skipping unknown ids.
    ///
    /// The ids are marked installed, so stability filtering no longer hides them.
    pub fn installed_map(&mut self, ids: impl IntoIterator<Item = PackageId>) -> InstalledMap {
        let installed: InstalledMap = ids
            .into_iter()
            .filter_map(|id| self.entry(id).map(|e| (id, e.clone())))
            .collect();
        self.installed.extend(installed.keys().copied());
        installed
    }

    /// Check if a package was marked installed
    pub fn is_installed(&self, id: PackageId) -> bool {
        self.installed.contains(&id)
    }

    /// Get the total number of entries (packages and aliases)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get all package ids
    pub fn all_package_ids(&self) -> impl Iterator<Item = PackageId> + '_ {
        1..=self.entries.len() as PackageId
    }

    /// Convert a literal to its package id (absolute value)
    pub fn literal_to_id(literal: Literal) -> PackageId {
        literal.abs()
    }

    /// Check if a literal represents "install" (positive)
    pub fn literal_is_positive(literal: Literal) -> bool {
        literal > 0
    }

    /// Create a literal for a package
    pub fn id_to_literal(id: PackageId, install: bool) -> Literal {
        if install {
            id
        } else {
            -id
        }
    }

    /// Check if a package passes the whitelist and stability filters
    pub fn is_allowed(&self, id: PackageId) -> bool {
        if let Some(whitelist) = &self.whitelist {
            if !whitelist.contains(&id) {
                return false;
            }
        }

        let Some(entry) = self.entry(id) else {
            return false;
        };

        if self.installed.contains(&id) {
            return true;
        }

        let minimum = self
            .stability_flags
            .get(entry.name())
            .copied()
            .unwrap_or(self.minimum_stability);

        entry.stability().satisfies(minimum)
    }

    fn parsed_constraint(&self, constraint: &str) -> Option<VersionConstraint> {
        if let Some(cached) = self.parsed_constraints.borrow().get(constraint) {
            return cached.clone();
        }

        let parsed = match VersionConstraint::parse(constraint) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                // Unparseable constraints accept every version
                log::warn!("{}, treating it as matching any version", e);
                None
            }
        };

        self.parsed_constraints
            .borrow_mut()
            .insert(constraint.to_string(), parsed.clone());
        parsed
    }

    fn version_matches(&self, constraint: Option<&str>, version: &str) -> bool {
        match constraint.and_then(|c| self.parsed_constraint(c)) {
            Some(parsed) => parsed.matches_version(version),
            None => true,
        }
    }

    fn provided_matches(&self, constraint: Option<&str>, provided: &str, own_version: &str) -> bool {
        let Some(required) = constraint.and_then(|c| self.parsed_constraint(c)) else {
            return true;
        };

        let provided = if provided == "self.version" {
            format!("={}", own_version)
        } else {
            provided.to_string()
        };

        match self.parsed_constraint(&provided) {
            Some(provided) => required.intersects(&provided),
            None => true,
        }
    }
}

fn find_link_constraint<'a>(links: &'a IndexMap<String, String>, name: &str) -> Option<&'a String> {
    links
        .iter()
        .find(|(target, _)| target.eq_ignore_ascii_case(name))
        .map(|(_, constraint)| constraint)
}

impl PoolInterface for Pool {
    fn entry(&self, id: PackageId) -> Option<&PoolEntry> {
        if id > 0 {
            self.entries.get(id as usize - 1)
        } else {
            None
        }
    }

    fn alias_of(&self, id: PackageId) -> Option<PackageId> {
        self.alias_map.get(&id).copied()
    }

    /// Find all packages that provide a given name (including the name itself)
    ///
    /// This includes direct matches (packages with the exact name), and unless
    /// `must_match_name` is set, packages that `provide` or `replace` the name.
    fn what_provides(&self, name: &str, constraint: Option<&str>, query: ProvideQuery) -> Vec<PackageId> {
        let name_lower = name.to_lowercase();

        let mut candidates: IndexSet<PackageId> = IndexSet::new();
        if let Some(ids) = self.packages_by_name.get(&name_lower) {
            candidates.extend(ids.iter().copied());
        }
        if !query.must_match_name {
            if let Some(ids) = self.providers.get(&name_lower) {
                candidates.extend(ids.iter().copied());
            }
        }

        candidates
            .into_iter()
            .filter(|&id| {
                match self.match_entry(id, &name_lower, constraint, query.bypass_filters) {
                    MatchResult::Match => true,
                    MatchResult::Provide | MatchResult::Replace => !query.must_match_name,
                    MatchResult::None => false,
                }
            })
            .collect()
    }

    fn match_entry(
        &self,
        id: PackageId,
        name: &str,
        constraint: Option<&str>,
        bypass_filters: bool,
    ) -> MatchResult {
        let Some(entry) = self.entry(id) else {
            return MatchResult::None;
        };

        if !bypass_filters && !self.is_allowed(id) {
            return MatchResult::None;
        }

        if entry.name().eq_ignore_ascii_case(name) {
            return if self.version_matches(constraint, entry.version()) {
                MatchResult::Match
            } else {
                MatchResult::None
            };
        }

        if let Some(provided) = find_link_constraint(entry.provide(), name) {
            return if self.provided_matches(constraint, provided, entry.version()) {
                MatchResult::Provide
            } else {
                MatchResult::None
            };
        }

        if let Some(replaced) = find_link_constraint(entry.replace(), name) {
            return if self.provided_matches(constraint, replaced, entry.version()) {
                MatchResult::Replace
            } else {
                MatchResult::None
            };
        }

        MatchResult::None
    }

    fn set_whitelist(&mut self, whitelist: Whitelist) {
        self.whitelist = Some(whitelist);
    }

    fn whitelist(&self) -> Option<&Whitelist> {
        self.whitelist.as_ref()
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a Pool with packages from multiple sources
pub struct PoolBuilder {
    pool: Pool,
}

impl PoolBuilder {
    /// Create a new pool builder
    pub fn new() -> Self {
        Self { pool: Pool::new() }
    }

    /// Set the minimum stability for the pool
    pub fn minimum_stability(mut self, stability: Stability) -> Self {
        self.pool.set_minimum_stability(stability);
        self
    }

    /// Add a stability flag for a specific package
    pub fn stability_flag(mut self, package_name: &str, stability: Stability) -> Self {
        self.pool.add_stability_flag(package_name, stability);
        self
    }

    /// Add a package to the pool
    pub fn add_package(mut self, package: Package) -> Self {
        self.pool.add_package(package);
        self
    }

    /// Add multiple packages
    pub fn add_packages(mut self, packages: impl IntoIterator<Item = Package>) -> Self {
        for package in packages {
            self.pool.add_package(package);
        }
        self
    }

    /// Build the pool
    pub fn build(self) -> Pool {
        self.pool
    }
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
