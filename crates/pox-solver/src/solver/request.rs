use std::fmt;

use serde::{Deserialize, Serialize};

/// What a job asks the solver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobCommand {
    Install,
    Uninstall,
    /// Carried for the solver, produces no rules
    Update,
}

impl fmt::Display for JobCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobCommand::Install => "install",
            JobCommand::Uninstall => "uninstall",
            JobCommand::Update => "update",
        })
    }
}

/// A single user intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub command: JobCommand,
    /// Target package name (lowercase)
    pub package_name: String,
    /// Version constraint, `None` meaning any version
    pub constraint: Option<String>,
    /// The package may not be swapped for another provider (platform or root packages)
    pub fixed: bool,
}

impl Job {
    fn new(command: JobCommand, name: impl Into<String>, constraint: Option<&str>) -> Self {
        Self {
            command,
            package_name: name.into().to_lowercase(),
            constraint: constraint.map(str::to_string),
            fixed: false,
        }
    }

    pub fn install(name: impl Into<String>, constraint: Option<&str>) -> Self {
        Self::new(JobCommand::Install, name, constraint)
    }

    pub fn uninstall(name: impl Into<String>, constraint: Option<&str>) -> Self {
        Self::new(JobCommand::Uninstall, name, constraint)
    }

    pub fn update(name: impl Into<String>, constraint: Option<&str>) -> Self {
        Self::new(JobCommand::Update, name, constraint)
    }

    /// An install job that pins the package in place
    pub fn fixed(name: impl Into<String>, constraint: Option<&str>) -> Self {
        Self {
            fixed: true,
            ..Self::new(JobCommand::Install, name, constraint)
        }
    }

    /// Constraint to hand to provider lookups
    pub fn lookup_constraint(&self) -> Option<&str> {
        match self.constraint.as_deref().map(str::trim) {
            None | Some("") | Some("*") => None,
            Some(_) => self.constraint.as_deref(),
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command, self.package_name)?;
        if let Some(constraint) = &self.constraint {
            write!(f, " {}", constraint)?;
        }
        if self.fixed {
            f.write_str(" (fixed)")?;
        }
        Ok(())
    }
}

/// A request collects the jobs of one resolution run, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Request {
    jobs: Vec<Job>,
}

impl Request {
    /// Create a new empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for one provider of `name` to be installed
    pub fn install(&mut self, name: impl Into<String>, constraint: Option<&str>) -> &mut Self {
        self.jobs.push(Job::install(name, constraint));
        self
    }

    /// Ask for every provider of `name` to be removed
    pub fn uninstall(&mut self, name: impl Into<String>, constraint: Option<&str>) -> &mut Self {
        self.jobs.push(Job::uninstall(name, constraint));
        self
    }

    /// Allow `name` to be updated
    pub fn update(&mut self, name: impl Into<String>, constraint: Option<&str>) -> &mut Self {
        self.jobs.push(Job::update(name, constraint));
        self
    }

    /// Install `name` and keep it fixed (e.g., platform packages)
    pub fn fix(&mut self, name: impl Into<String>, constraint: Option<&str>) -> &mut Self {
        self.jobs.push(Job::fixed(name, constraint));
        self
    }

    /// Add an already constructed job
    pub fn add_job(&mut self, job: Job) -> &mut Self {
        self.jobs.push(job);
        self
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
