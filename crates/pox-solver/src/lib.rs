pub mod config;
pub mod error;
pub mod package;
pub mod scenario;
pub mod solver;
pub mod util;

pub use config::ResolverConfig;
pub use error::{Result, SolverError};
pub use package::{AliasPackage, Link, LinkType, Package, Stability};
pub use scenario::{LoadedScenario, Scenario};
pub use solver::{
    InstalledMap, Job, JobCommand, Literal, MatchResult, PackageId, Pool, PoolEntry,
    PoolInterface, ProvideQuery, Reason, ReasonData, Request, Rule, RuleGenerator, RuleSet,
    RuleType, Whitelist,
};
pub use util::is_platform_package;
