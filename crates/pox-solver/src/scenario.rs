//! JSON scenarios: a pool, an installed set and the jobs of one run.
//!
//! ```json
//! {
//!     "config": { "minimum-stability": "dev" },
//!     "packages": [
//!         { "name": "vendor/a", "version": "1.0.0", "require": { "vendor/b": "^1.0" } },
//!         { "name": "vendor/b", "version": "dev-main" }
//!     ],
//!     "aliases": [ { "package": "vendor/b", "version": "dev-main", "alias": "1.0.0" } ],
//!     "installed": [ { "name": "vendor/b", "version": "dev-main" } ],
//!     "jobs": [ { "command": "install", "name": "vendor/a" } ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ResolverConfig;
use crate::error::{Result, SolverError};
use crate::package::Package;
use crate::solver::{InstalledMap, Job, JobCommand, PackageId, Pool, PoolInterface, Request};

/// Alias declaration: `package` at `version` is also available as `alias`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioAlias {
    pub package: String,
    pub version: String,
    pub alias: String,
}

/// Reference to a package version in the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioJob {
    pub command: JobCommand,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(default)]
    pub fixed: bool,
}

impl ScenarioJob {
    fn to_job(&self) -> Job {
        let constraint = self.constraint.as_deref();
        let mut job = match self.command {
            JobCommand::Install => Job::install(&self.name, constraint),
            JobCommand::Uninstall => Job::uninstall(&self.name, constraint),
            JobCommand::Update => Job::update(&self.name, constraint),
        };
        job.fixed = self.fixed;
        job
    }
}

/// A resolution scenario as read from disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: ResolverConfig,
    pub packages: Vec<Package>,
    pub aliases: Vec<ScenarioAlias>,
    pub installed: Vec<PackageRef>,
    pub jobs: Vec<ScenarioJob>,
}

/// Everything needed to run rule generation for a scenario
#[derive(Debug)]
pub struct LoadedScenario {
    pub config: ResolverConfig,
    pub pool: Pool,
    pub installed: InstalledMap,
    pub request: Request,
}

impl FromStr for Scenario {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(s)?;
        scenario.config.validate()?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Read a scenario file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading scenario from {}", path.display());
        fs::read_to_string(path)?.parse()
    }

    /// Build the pool, installed map and request
    pub fn build(&self) -> Result<LoadedScenario> {
        let mut pool = Pool::new();
        self.config.configure_pool(&mut pool);

        for package in &self.packages {
            pool.add_package(package.clone().normalized());
        }

        for alias in &self.aliases {
            let base = pool
                .find_package_id(&alias.package, &alias.version)
                .ok_or_else(|| unknown(&alias.package, &alias.version))?;
            pool.add_alias(base, &alias.alias, &alias.alias, false)
                .ok_or_else(|| unknown(&alias.package, &alias.version))?;
        }

        let mut installed_ids = Vec::with_capacity(self.installed.len());
        for reference in &self.installed {
            let id = find_entry(&pool, &reference.name, &reference.version)
                .ok_or_else(|| unknown(&reference.name, &reference.version))?;
            installed_ids.push(id);
        }
        let installed = pool.installed_map(installed_ids);

        let mut request = Request::new();
        for job in &self.jobs {
            request.add_job(job.to_job());
        }

        log::debug!(
            "Scenario: {} pool entries, {} installed, {} jobs",
            pool.len(),
            installed.len(),
            request.jobs().len()
        );

        Ok(LoadedScenario {
            config: self.config.clone(),
            pool,
            installed,
            request,
        })
    }
}

/// Find a package or alias by name and version
fn find_entry(pool: &Pool, name: &str, version: &str) -> Option<PackageId> {
    pool.find_package_id(name, version).or_else(|| {
        pool.packages_by_name(name)
            .into_iter()
            .find(|&id| pool.entry(id).map(|e| e.version() == version).unwrap_or(false))
    })
}

fn unknown(name: &str, version: &str) -> SolverError {
    SolverError::UnknownPackage {
        name: name.to_string(),
        version: version.to_string(),
    }
}
