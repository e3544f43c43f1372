//! Rule compilation for the SAT-based dependency resolver.
//!
//! This module turns package metadata and user jobs into boolean clauses
//! over signed package ids. The backtracking solver that consumes the
//! clauses lives elsewhere; this is the part that decides *which* clauses
//! it sees.
//!
//! # Architecture
//!
//! - [`PoolInterface`]: what rule generation needs from the package pool
//! - [`Pool`]: in-memory pool with lookup by name/constraint
//! - [`Request`]: the install/uninstall/update jobs of one run
//! - [`Rule`]: one clause, tagged with a [`Reason`]
//! - [`RuleSet`]: rules partitioned by [`RuleType`], deduplicated by literals
//! - [`RuleGenerator`]: builds the whitelist and the rule set
//!
//! # Algorithm Overview
//!
//! 1. **Whitelist**: everything reachable from installed packages and install
//!    jobs through requirements is installed into the pool
//! 2. **Installed packages**: requirement, same-name and alias rules
//! 3. **Jobs**: install-one-of and uninstall rules, pulling in the
//!    requirements of every candidate
//! 4. **Conflicts**: conflict and replace rules between processed packages
//!
//! # Example
//!
//! ```
//! use pox_solver::package::Package;
//! use pox_solver::solver::{InstalledMap, Pool, Request, RuleGenerator};
//!
//! let mut pool = Pool::new();
//! let mut a = Package::new("vendor/a", "1.0.0");
//! a.require.insert("vendor/b".to_string(), "^1.0".to_string());
//! pool.add_package(a);
//! pool.add_package(Package::new("vendor/b", "1.2.0"));
//!
//! let mut request = Request::new();
//! request.install("vendor/a", None);
//!
//! let mut generator = RuleGenerator::new(&mut pool);
//! let rules = generator.get_rules_for(request.jobs(), &InstalledMap::new(), false);
//! assert_eq!(rules.len(), 2);
//! ```

mod constraint;
mod pool;
mod reason;
mod request;
mod rule;
mod rule_generator;
mod rule_set;

#[cfg(test)]
mod tests;

pub use constraint::{parse_version, VersionConstraint};
pub use pool::{
    InstalledMap, MatchResult, PackageId, Pool, PoolBuilder, PoolEntry, PoolInterface, ProvideQuery,
    Whitelist,
};
pub use reason::{Reason, ReasonData, RuleType};
pub use request::{Job, JobCommand, Request};
pub use rule::{format_packages_unique, Literal, Rule};
pub use rule_generator::RuleGenerator;
pub use rule_set::{RuleSet, RuleSetStats};
