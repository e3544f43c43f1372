use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use super::pool::{InstalledMap, PackageId, PoolInterface, ProvideQuery};
use super::reason::{Reason, ReasonData, RuleType};
use super::request::Job;
use crate::error::{Result, SolverError};

/// A literal in SAT terms - positive means "install", negative means "don't install"
pub type Literal = i32;

/// A SAT rule (clause) representing a dependency constraint.
///
/// Rules are disjunctions (OR) of literals. A rule is satisfied when
/// at least one of its literals is true. Literals are kept sorted so two
/// rules over the same literals compare equal whatever their reason.
///
/// # Examples
///
/// - `[A]` - Package A must be installed (assertion)
/// - `[-A]` - Package A must not be installed
/// - `[-A, B, C]` - If A is installed, then B or C must be installed
/// - `[-A, -B]` - A and B cannot both be installed (conflict)
#[derive(Clone)]
pub struct Rule {
    /// The literals in this rule, sorted ascending
    literals: Vec<Literal>,
    /// Why this rule exists
    reason: Reason,
    /// Diagnostic payload matching the reason
    reason_data: ReasonData,
    /// Job the rule was generated for
    job: Option<Job>,
    /// Set once, when the rule is added to a RuleSet
    rule_type: Option<RuleType>,
    /// Rule ID (assigned by RuleSet)
    id: u32,
    /// Whether this rule is disabled
    disabled: bool,
}

impl Rule {
    /// Create a new rule with the given literals
    pub fn new(mut literals: Vec<Literal>, reason: Reason, reason_data: ReasonData) -> Self {
        literals.sort_unstable();

        Self {
            literals,
            reason,
            reason_data,
            job: None,
            rule_type: None,
            id: 0,
            disabled: false,
        }
    }

    /// Attach the job this rule was generated for
    pub fn with_job(mut self, job: Job) -> Self {
        self.job = Some(job);
        self
    }

    /// Get the literals
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }

    pub fn reason_data(&self) -> &ReasonData {
        &self.reason_data
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    /// The bucket this rule was stored in, `None` until added to a RuleSet
    pub fn rule_type(&self) -> Option<RuleType> {
        self.rule_type
    }

    pub(super) fn set_rule_type(&mut self, rule_type: RuleType) {
        debug_assert!(self.rule_type.is_none(), "rule type can only be set once");
        self.rule_type = Some(rule_type);
    }

    /// Get the rule ID
    pub fn id(&self) -> u32 {
        self.id
    }

    pub(super) fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    /// Check if this is an assertion (single literal)
    pub fn is_assertion(&self) -> bool {
        self.literals.len() == 1
    }

    /// Enable this rule
    pub fn enable(&mut self) {
        self.disabled = false;
    }

    /// Disable this rule
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Check if this rule is disabled
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Check if two rules have the same literals
    pub fn equals(&self, other: &Rule) -> bool {
        self.literals == other.literals
    }

    /// Get a hash of this rule's literals for deduplication
    pub fn literal_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        self.literals.hash(&mut hasher);
        hasher.finish()
    }

    /// Name of the package this rule asks for, if it is a job install or requirement rule
    pub fn required_package_name(&self) -> Option<&str> {
        match (self.reason, &self.reason_data) {
            (Reason::JobInstall, ReasonData::PackageName(name)) => Some(name),
            (Reason::PackageRequire, ReasonData::Link(link)) => Some(&link.target),
            _ => None,
        }
    }

    /// Render the rule as a human readable sentence.
    ///
    /// Fails only if a requirement rule does not carry its link, which
    /// cannot happen for rules built by the generator.
    pub fn pretty_string<P: PoolInterface + ?Sized>(
        &self,
        pool: &P,
        installed: &InstalledMap,
    ) -> Result<String> {
        let rule_text = self
            .literals
            .iter()
            .map(|&literal| pool.literal_to_pretty_string(literal, installed))
            .collect::<Vec<_>>()
            .join("|");

        let text = match self.reason {
            Reason::InternalAllowUpdate
            | Reason::PackageObsoletes
            | Reason::InstalledPackageObsoletes
            | Reason::PackageImplicitObsoletes
            | Reason::PackageAlias => rule_text,

            Reason::Learned => format!("Conclusion: {}", rule_text),

            Reason::JobInstall => format!("Install command rule ({})", rule_text),

            Reason::JobUninstall => format!("Uninstall command rule ({})", rule_text),

            Reason::PackageConflict => match self.literals.as_slice() {
                [first, second, ..] => format!(
                    "{} conflicts with {}.",
                    entry_pretty_string(pool, first.abs()),
                    format_packages_unique(pool, &[second.abs()])
                ),
                _ => rule_text,
            },

            Reason::PackageSameName => {
                let ids: Vec<PackageId> = self.literals.iter().map(|l| l.abs()).collect();
                format!("Can only install one of: {}.", format_packages_unique(pool, &ids))
            }

            Reason::PackageRequire => {
                let link = self.reason_data.as_link().ok_or_else(|| {
                    SolverError::InvariantViolation(format!(
                        "requirement rule {} carries no link payload",
                        self
                    ))
                })?;

                // The negated source sorts first, the providers follow
                let (source, providers) = match self.literals.split_first() {
                    Some((source, providers)) => (source.abs(), providers),
                    None => {
                        return Err(SolverError::InvariantViolation(
                            "requirement rule without literals".to_string(),
                        ))
                    }
                };

                let source_pretty = pool
                    .entry(source)
                    .map(|e| e.pretty_string())
                    .unwrap_or_else(|| link.source.clone());
                let mut text = link.pretty_string(&source_pretty);

                if !providers.is_empty() {
                    let ids: Vec<PackageId> = providers.iter().map(|l| l.abs()).collect();
                    text.push_str(&format!(" -> satisfiable by {}.", format_packages_unique(pool, &ids)));
                } else {
                    let all = pool.what_provides(&link.target, link.lookup_constraint(), ProvideQuery::UNFILTERED);
                    if all.is_empty() {
                        text.push_str(" -> no matching package found.");
                    } else {
                        text.push_str(&format!(
                            " -> satisfiable by {} but these conflict with your requirements or minimum-stability.",
                            format_packages_unique(pool, &all)
                        ));
                    }
                }

                text
            }
        };

        Ok(text)
    }
}

fn entry_pretty_string<P: PoolInterface + ?Sized>(pool: &P, id: PackageId) -> String {
    pool.entry(id)
        .map(|e| e.pretty_string())
        .unwrap_or_else(|| format!("#{}", id))
}

/// Group packages by name, listing every distinct version once.
///
/// `foo 1.0, foo 2.0, bar 1.0` renders as `foo[1.0, 2.0], bar[1.0]`.
pub fn format_packages_unique<P: PoolInterface + ?Sized>(pool: &P, ids: &[PackageId]) -> String {
    let mut grouped: IndexMap<String, (String, IndexMap<String, String>)> = IndexMap::new();

    for &id in ids {
        let Some(entry) = pool.entry(id) else {
            continue;
        };

        let (_, versions) = grouped
            .entry(entry.name().to_string())
            .or_insert_with(|| (entry.pretty_name().to_string(), IndexMap::new()));
        versions
            .entry(entry.version().to_string())
            .or_insert_with(|| entry.pretty_version().to_string());
    }

    grouped
        .values()
        .map(|(pretty_name, versions)| {
            let versions: Vec<&str> = versions.values().map(String::as_str).collect();
            format!("{}[{}]", pretty_name, versions.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({:?}, {:?})", self.reason, self.literals)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literals: Vec<String> = self.literals.iter().map(|l| l.to_string()).collect();

        if self.disabled {
            write!(f, "disabled({})", literals.join("|"))
        } else {
            write!(f, "({})", literals.join("|"))
        }
    }
}
