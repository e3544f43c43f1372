use std::fmt;
use std::str::FromStr;

use super::pool::PackageId;
use crate::error::SolverError;
use crate::package::Link;

/// Why a rule exists.
///
/// Each rule carries exactly one reason; it drives diagnostics and solver
/// heuristics, never the clause shape itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    /// User asked for one of the providers of a name to be installed
    JobInstall,
    /// User asked for every provider of a name to be removed
    JobUninstall,
    /// If the package is installed, one of its requirement's providers must be
    PackageRequire,
    /// Two packages declare a conflict
    PackageConflict,
    /// A package replaces another name, so both cannot be installed
    PackageObsoletes,
    /// Same as `PackageObsoletes`, issued by an already installed package
    InstalledPackageObsoletes,
    /// Two packages expose the same name through provide/replace
    PackageImplicitObsoletes,
    /// Two versions of the same package name
    PackageSameName,
    /// An alias requires the package it aliases
    PackageAlias,
    /// Derived by the solver during conflict analysis
    Learned,
    /// Internal update rule added by the solver
    InternalAllowUpdate,
}

impl Reason {
    pub const ALL: [Reason; 11] = [
        Reason::JobInstall,
        Reason::JobUninstall,
        Reason::PackageRequire,
        Reason::PackageConflict,
        Reason::PackageObsoletes,
        Reason::InstalledPackageObsoletes,
        Reason::PackageImplicitObsoletes,
        Reason::PackageSameName,
        Reason::PackageAlias,
        Reason::Learned,
        Reason::InternalAllowUpdate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Reason::JobInstall => "job-install",
            Reason::JobUninstall => "job-uninstall",
            Reason::PackageRequire => "package-require",
            Reason::PackageConflict => "package-conflict",
            Reason::PackageObsoletes => "package-obsoletes",
            Reason::InstalledPackageObsoletes => "installed-package-obsoletes",
            Reason::PackageImplicitObsoletes => "package-implicit-obsoletes",
            Reason::PackageSameName => "package-same-name",
            Reason::PackageAlias => "package-alias",
            Reason::Learned => "learned",
            Reason::InternalAllowUpdate => "internal-allow-update",
        }
    }

    /// Check if the reason stems from a user job
    pub fn is_job(&self) -> bool {
        matches!(self, Reason::JobInstall | Reason::JobUninstall)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which phase a rule belongs to.
///
/// Declaration order is the iteration order of a [`RuleSet`](super::RuleSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleType {
    /// Derived purely from package metadata
    Package,
    /// Derived from a user request
    Job,
    /// Synthesized by the solver during conflict analysis
    Learned,
}

impl RuleType {
    pub const ALL: [RuleType; 3] = [RuleType::Package, RuleType::Job, RuleType::Learned];

    /// Label used when rendering a rule set
    pub fn name(&self) -> &'static str {
        match self {
            RuleType::Package => "PACKAGE",
            RuleType::Job => "JOB",
            RuleType::Learned => "LEARNED",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for RuleType {
    type Error = SolverError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        RuleType::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| SolverError::InvalidRuleType(value.to_string()))
    }
}

impl FromStr for RuleType {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleType::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SolverError::InvalidRuleType(s.to_string()))
    }
}

/// Diagnostic payload attached to a rule.
///
/// Only used to explain rules to humans; the solver never looks at it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReasonData {
    #[default]
    None,
    /// Requirement, conflict or replace link the rule was derived from
    Link(Link),
    /// Package name targeted by a job
    PackageName(String),
    /// Package that issued the rule
    Package(PackageId),
}

impl ReasonData {
    pub fn as_link(&self) -> Option<&Link> {
        match self {
            ReasonData::Link(link) => Some(link),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::LinkType;

    #[test]
    fn test_rule_type_order() {
        assert!(RuleType::Package < RuleType::Job);
        assert!(RuleType::Job < RuleType::Learned);
        assert_eq!(RuleType::Learned.index(), 2);
    }

    #[test]
    fn test_rule_type_try_from() {
        assert_eq!(RuleType::try_from(0).unwrap(), RuleType::Package);
        assert_eq!(RuleType::try_from(1).unwrap(), RuleType::Job);
        assert!(matches!(
            RuleType::try_from(7),
            Err(SolverError::InvalidRuleType(_))
        ));
    }

    #[test]
    fn test_reason_data_default() {
        assert_eq!(ReasonData::default(), ReasonData::None);
        assert!(ReasonData::default().as_link().is_none());
    }

    #[test]
    fn test_rule_type_from_str() {
        assert_eq!("job".parse::<RuleType>().unwrap(), RuleType::Job);
        assert_eq!("LEARNED".parse::<RuleType>().unwrap(), RuleType::Learned);
        assert!("system".parse::<RuleType>().is_err());
    }

    #[test]
    fn test_reason_names_are_unique() {
        let mut names: Vec<_> = Reason::ALL.iter().map(|r| r.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Reason::ALL.len());
        assert!(Reason::JobUninstall.is_job());
        assert!(!Reason::PackageRequire.is_job());
    }

    #[test]
    fn test_reason_data_as_link() {
        let link = Link::new("a", "b", "^1.0", LinkType::Require);
        assert_eq!(ReasonData::Link(link.clone()).as_link(), Some(&link));
        assert_eq!(ReasonData::PackageName("b".into()).as_link(), None);
    }
}
