use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use indexmap::IndexSet;

use super::pool::{InstalledMap, MatchResult, PackageId, PoolInterface, ProvideQuery, Whitelist};
use super::reason::{Reason, ReasonData, RuleType};
use super::request::{Job, JobCommand};
use super::rule::Rule;
use super::rule_set::RuleSet;
use crate::util::PlatformMatcher;

/// Generates SAT rules from a dependency graph.
///
/// This converts the dependency relationships into SAT clauses:
/// - Install jobs: at least one provider must be installed
/// - Uninstall jobs: no provider may be installed
/// - Package requirements: if A is installed, then B|C|D must be installed
/// - Conflicts: A and B cannot both be installed
/// - Same-name: only one version of a package can be installed
/// - Obsoletes: a package and the packages it replaces cannot both be installed
/// - Alias rules: if an alias is installed, its base package must be installed
///
/// Before generating any rule the generator installs a whitelist into the
/// pool, bounding lookups to packages reachable from the installed set and
/// the jobs.
pub struct RuleGenerator<'a, P: PoolInterface + ?Sized> {
    pool: &'a mut P,
    platform: PlatformMatcher,
    rules: RuleSet,
    whitelist: Whitelist,
    /// Packages we've already processed, in processing order
    added_map: IndexSet<PackageId>,
    /// Processed packages grouped by every name they expose
    added_packages_by_name: HashMap<String, Vec<PackageId>>,
}

impl<'a, P: PoolInterface + ?Sized> RuleGenerator<'a, P> {
    /// Create a new rule generator
    pub fn new(pool: &'a mut P) -> Self {
        Self {
            pool,
            platform: PlatformMatcher::default(),
            rules: RuleSet::new(),
            whitelist: Whitelist::new(),
            added_map: IndexSet::new(),
            added_packages_by_name: HashMap::new(),
        }
    }

    /// Use a custom matcher for platform package names
    pub fn with_platform_matcher(mut self, platform: PlatformMatcher) -> Self {
        self.platform = platform;
        self
    }

    /// Whitelist computed by the last run
    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Generate all rules for the given jobs and installed packages
    pub fn get_rules_for(
        &mut self,
        jobs: &[Job],
        installed: &InstalledMap,
        ignore_platform_reqs: bool,
    ) -> RuleSet {
        let start = Instant::now();
        self.rules = RuleSet::new();

        self.whitelist = Whitelist::new();
        for &id in installed.keys() {
            self.whitelist_from_package(id);
        }
        self.whitelist_from_jobs(jobs);
        log::debug!("Whitelisted {} packages", self.whitelist.len());

        self.pool.set_whitelist(self.whitelist.clone());

        self.added_map.clear();
        self.added_packages_by_name.clear();

        for &id in installed.keys() {
            self.add_rules_for_package(id, ignore_platform_reqs);
        }
        log::debug!(
            "After installed package rules: {} rules, {} packages",
            self.rules.len(),
            self.added_map.len()
        );

        self.add_rules_for_jobs(jobs, installed, ignore_platform_reqs);
        log::debug!("After job rules: {} rules, {} packages", self.rules.len(), self.added_map.len());

        self.add_conflict_rules(installed, ignore_platform_reqs);
        log::debug!("After conflict rules: {} rules", self.rules.len());

        log::info!(
            "Rule generation: {} rules for {} packages ({} whitelisted) in {:?}",
            self.rules.len(),
            self.added_map.len(),
            self.whitelist.len(),
            start.elapsed()
        );

        self.added_map.clear();
        self.added_packages_by_name.clear();

        std::mem::take(&mut self.rules)
    }

    /// Mark everything reachable from a package through its requirements
    fn whitelist_from_package(&mut self, package_id: PackageId) {
        let mut queue = VecDeque::from([package_id]);

        while let Some(id) = queue.pop_front() {
            if !self.whitelist.insert(id) {
                continue;
            }

            let Some(entry) = self.pool.entry(id) else {
                continue;
            };

            for link in entry.requires() {
                queue.extend(self.pool.what_provides(
                    &link.target,
                    link.lookup_constraint(),
                    ProvideQuery::UNFILTERED,
                ));
            }

            if let Some(base_id) = self.pool.alias_of(id) {
                let same_name = self.pool.what_provides(entry.name(), None, ProvideQuery::UNFILTERED);
                if same_name.contains(&base_id) {
                    queue.push_back(base_id);
                }
            }
        }
    }

    fn whitelist_from_jobs(&mut self, jobs: &[Job]) {
        for job in jobs {
            if job.command != JobCommand::Install {
                continue;
            }

            let providers =
                self.pool
                    .what_provides(&job.package_name, job.lookup_constraint(), ProvideQuery::UNFILTERED);
            for id in providers {
                self.whitelist_from_package(id);
            }
        }
    }

    /// Add requirement, same-name and alias rules for a package and
    /// everything its requirements pull in
    fn add_rules_for_package(&mut self, package_id: PackageId, ignore_platform_reqs: bool) {
        let mut queue = VecDeque::from([package_id]);

        while let Some(id) = queue.pop_front() {
            if !self.added_map.insert(id) {
                continue;
            }

            let Some(entry) = self.pool.entry(id).cloned() else {
                continue;
            };

            for name in entry.get_names() {
                self.added_packages_by_name.entry(name).or_default().push(id);
            }

            for link in entry.requires() {
                if ignore_platform_reqs && self.platform.is_platform(&link.target) {
                    log::trace!("Skipping platform requirement {} of {}", link.target, entry.pretty_string());
                    continue;
                }

                let providers = self
                    .pool
                    .what_provides(&link.target, link.lookup_constraint(), ProvideQuery::FILTERED);
                let rule = Self::create_require_rule(
                    id,
                    &providers,
                    Reason::PackageRequire,
                    ReasonData::Link(link),
                );
                self.rules.add(rule, RuleType::Package);

                queue.extend(providers);
            }

            let alias_base = self.pool.alias_of(id);
            for candidate in self.pool.what_provides(entry.name(), None, ProvideQuery::FILTERED) {
                if candidate == id {
                    continue;
                }

                if alias_base == Some(candidate) {
                    let rule = Self::create_require_rule(
                        id,
                        &[candidate],
                        Reason::PackageAlias,
                        ReasonData::Package(id),
                    );
                    self.rules.add(rule, RuleType::Package);
                } else if !self.obsolete_impossible_for_alias(id, candidate) {
                    let same_name = self
                        .pool
                        .entry(candidate)
                        .map(|c| c.name() == entry.name())
                        .unwrap_or(false);
                    let reason = if same_name {
                        Reason::PackageSameName
                    } else {
                        Reason::PackageImplicitObsoletes
                    };

                    let rule = Self::create_rule_2_literals(id, candidate, reason, ReasonData::Package(id));
                    self.rules.add(rule, RuleType::Package);
                }
            }
        }
    }

    fn add_rules_for_jobs(&mut self, jobs: &[Job], installed: &InstalledMap, ignore_platform_reqs: bool) {
        for job in jobs {
            match job.command {
                JobCommand::Install => {
                    if !job.fixed && ignore_platform_reqs && self.platform.is_platform(&job.package_name) {
                        log::trace!("Skipping platform job {}", job);
                        continue;
                    }

                    let providers =
                        self.pool
                            .what_provides(&job.package_name, job.lookup_constraint(), ProvideQuery::FILTERED);
                    if providers.is_empty() {
                        log::trace!("No providers for job {}", job);
                        continue;
                    }

                    for &id in &providers {
                        if !installed.contains_key(&id) {
                            self.add_rules_for_package(id, ignore_platform_reqs);
                        }
                    }

                    let rule = Self::create_install_one_of_rule(&providers, Reason::JobInstall, job);
                    self.rules.add(rule, RuleType::Job);
                }
                JobCommand::Uninstall => {
                    let providers =
                        self.pool
                            .what_provides(&job.package_name, job.lookup_constraint(), ProvideQuery::FILTERED);
                    for id in providers {
                        let rule = Self::create_uninstall_rule(id, Reason::JobUninstall, job);
                        self.rules.add(rule, RuleType::Job);
                    }
                }
                JobCommand::Update => {
                    log::trace!("Job {} produces no rules", job);
                }
            }
        }
    }

    /// Add conflict and replace rules between processed packages
    fn add_conflict_rules(&mut self, installed: &InstalledMap, ignore_platform_reqs: bool) {
        let mut conflict_count = 0usize;
        let mut obsolete_count = 0usize;

        let added: Vec<PackageId> = self.added_map.iter().copied().collect();
        for id in added {
            let Some(entry) = self.pool.entry(id).cloned() else {
                continue;
            };

            for link in entry.conflicts() {
                let Some(candidates) = self.added_packages_by_name.get(&link.target).cloned() else {
                    continue;
                };
                if ignore_platform_reqs && self.platform.is_platform(&link.target) {
                    continue;
                }

                for candidate in candidates {
                    let matched = self
                        .pool
                        .match_entry(candidate, &link.target, link.lookup_constraint(), true);
                    if matches!(matched, MatchResult::Match | MatchResult::Replace) {
                        let rule = Self::create_rule_2_literals(
                            id,
                            candidate,
                            Reason::PackageConflict,
                            ReasonData::Link(link.clone()),
                        );
                        if self.rules.add(rule, RuleType::Package).is_some() {
                            conflict_count += 1;
                        }
                    }
                }
            }

            let reason = if installed.contains_key(&id) {
                Reason::InstalledPackageObsoletes
            } else {
                Reason::PackageObsoletes
            };

            for link in entry.replaces() {
                let Some(candidates) = self.added_packages_by_name.get(&link.target).cloned() else {
                    continue;
                };

                for candidate in candidates {
                    if candidate == id || self.obsolete_impossible_for_alias(id, candidate) {
                        continue;
                    }

                    let rule = Self::create_rule_2_literals(id, candidate, reason, ReasonData::Link(link.clone()));
                    if self.rules.add(rule, RuleType::Package).is_some() {
                        obsolete_count += 1;
                    }
                }
            }
        }

        log::debug!(
            "add_conflict_rules: {} conflict rules, {} obsolete rules added",
            conflict_count,
            obsolete_count
        );
    }

    /// Either package is an alias of the other, or both alias the same package
    fn obsolete_impossible_for_alias(&self, package: PackageId, provider: PackageId) -> bool {
        let package_base = self.pool.alias_of(package);
        let provider_base = self.pool.alias_of(provider);

        package_base == Some(provider)
            || provider_base == Some(package)
            || (package_base.is_some() && package_base == provider_base)
    }

    /// `(-source | provider1 | provider2 | ...)`, or `None` if the source provides itself
    pub fn create_require_rule(
        source: PackageId,
        providers: &[PackageId],
        reason: Reason,
        reason_data: ReasonData,
    ) -> Option<Rule> {
        if providers.contains(&source) {
            return None;
        }

        let mut literals = Vec::with_capacity(providers.len() + 1);
        literals.push(-source);
        literals.extend_from_slice(providers);

        Some(Rule::new(literals, reason, reason_data))
    }

    /// `(provider1 | provider2 | ...)`; an empty provider list yields an unsatisfiable rule
    pub fn create_install_one_of_rule(providers: &[PackageId], reason: Reason, job: &Job) -> Rule {
        Rule::new(
            providers.to_vec(),
            reason,
            ReasonData::PackageName(job.package_name.clone()),
        )
        .with_job(job.clone())
    }

    /// `(-package)`
    pub fn create_uninstall_rule(package: PackageId, reason: Reason, job: &Job) -> Rule {
        Rule::new(
            vec![-package],
            reason,
            ReasonData::PackageName(job.package_name.clone()),
        )
        .with_job(job.clone())
    }

    /// `(-issuer | -provider)`, or `None` if both are the same package
    pub fn create_rule_2_literals(
        issuer: PackageId,
        provider: PackageId,
        reason: Reason,
        reason_data: ReasonData,
    ) -> Option<Rule> {
        if issuer == provider {
            return None;
        }

        Some(Rule::new(vec![-issuer, -provider], reason, reason_data))
    }
}
