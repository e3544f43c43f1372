//! Version constraint adapter used by the in-memory [`Pool`](super::Pool).
//!
//! Constraint matching is not the concern of rule generation; the pool only
//! needs a predictable black box. Composer-style constraint strings are
//! translated onto [`semver::VersionReq`]:
//!
//! - `*` or an empty string matches everything
//! - `||` (or `|`) separates alternatives
//! - `,` or whitespace joins comparators within an alternative
//! - a bare version (`1.0.0`, `==1.0`) is an exact match
//! - `~1.2` keeps Composer's meaning (`>=1.2.0, <2.0.0`)
//! - `!=1.0` and `<>1.0` exclude a single version
//! - `@stability` flags are ignored
//! - non-semver versions such as `dev-main` only match themselves

use semver::{Comparator, Op, Version, VersionReq};

use crate::error::{Result, SolverError};

#[derive(Debug, Clone, PartialEq)]
enum Alternative {
    Any,
    Exact(String),
    Req { req: VersionReq, excluded: Vec<Version> },
}

/// A parsed version constraint
#[derive(Debug, Clone, PartialEq)]
pub struct VersionConstraint {
    alternatives: Vec<Alternative>,
}

impl VersionConstraint {
    /// Parse a Composer-style constraint string
    pub fn parse(constraint: &str) -> Result<Self> {
        let alternatives = constraint
            .split('|')
            .map(str::trim)
            .filter(|part| !part.is_empty() || !constraint.contains('|'))
            .map(parse_alternative)
            .collect::<Result<Vec<_>>>()?;

        if alternatives.is_empty() {
            return Err(SolverError::InvalidConstraint(constraint.to_string()));
        }

        Ok(Self { alternatives })
    }

    /// Constraint matching every version
    pub fn any() -> Self {
        Self {
            alternatives: vec![Alternative::Any],
        }
    }

    /// Check if a concrete version satisfies this constraint
    pub fn matches_version(&self, version: &str) -> bool {
        let parsed = parse_version(version);
        self.alternatives.iter().any(|alternative| match alternative {
            Alternative::Any => true,
            Alternative::Exact(exact) => exact.eq_ignore_ascii_case(strip_exact_operator(version)),
            Alternative::Req { req, excluded } => parsed
                .as_ref()
                .is_some_and(|v| req.matches(v) && !excluded.contains(v)),
        })
    }

    /// Approximate intersection test against another constraint.
    ///
    /// Provided and replaced versions are themselves constraints. Two
    /// constraints are considered to intersect when either one accepts one of
    /// the boundary versions of the other.
    pub fn intersects(&self, other: &VersionConstraint) -> bool {
        if self.is_any() || other.is_any() {
            return true;
        }

        other.boundary_versions().iter().any(|v| self.matches_version(v))
            || self.boundary_versions().iter().any(|v| other.matches_version(v))
    }

    /// True when this constraint accepts every version
    pub fn is_any(&self) -> bool {
        self.alternatives.iter().any(|a| matches!(a, Alternative::Any))
    }

    fn boundary_versions(&self) -> Vec<String> {
        let mut versions = Vec::new();
        for alternative in &self.alternatives {
            match alternative {
                Alternative::Any => {}
                Alternative::Exact(exact) => versions.push(exact.clone()),
                Alternative::Req { req, excluded } => {
                    versions.extend(req.comparators.iter().map(comparator_version));
                    versions.extend(excluded.iter().map(Version::to_string));
                }
            }
        }
        versions
    }
}

fn comparator_version(comparator: &Comparator) -> String {
    let mut version = format!(
        "{}.{}.{}",
        comparator.major,
        comparator.minor.unwrap_or(0),
        comparator.patch.unwrap_or(0)
    );
    if !comparator.pre.is_empty() {
        version.push('-');
        version.push_str(comparator.pre.as_str());
    }
    version
}

fn strip_exact_operator(value: &str) -> &str {
    value.trim().trim_start_matches('=').trim()
}

fn strip_stability_flag(value: &str) -> &str {
    match value.find('@') {
        Some(pos) => value[..pos].trim(),
        None => value.trim(),
    }
}

fn parse_alternative(part: &str) -> Result<Alternative> {
    let part = strip_stability_flag(part);
    if part.is_empty() || part == "*" {
        return Ok(Alternative::Any);
    }

    let exact = strip_exact_operator(part);
    if is_branch_version(exact) {
        return Ok(Alternative::Exact(exact.to_string()));
    }

    let mut comparators = Vec::new();
    let mut excluded = Vec::new();
    for token in part.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        // semver has no inequality operator, excluded versions are checked separately
        if let Some(version) = token.strip_prefix("!=").or_else(|| token.strip_prefix("<>")) {
            let version = parse_version(version).ok_or_else(|| SolverError::InvalidConstraint(token.to_string()))?;
            excluded.push(version);
            continue;
        }

        comparators.push(translate_comparator(token)?);
    }

    let req = if comparators.is_empty() {
        VersionReq::STAR
    } else {
        VersionReq::parse(&comparators.join(", "))
            .map_err(|e| SolverError::InvalidConstraint(format!("{}: {}", part, e)))?
    };

    // semver has no wildcard-free way to say "any" so keep it explicit
    if excluded.is_empty() && req.comparators.iter().all(|c| c.op == Op::Wildcard && c.minor.is_none()) {
        return Ok(Alternative::Any);
    }

    Ok(Alternative::Req { req, excluded })
}

fn translate_comparator(token: &str) -> Result<String> {
    let split = token
        .find(|c: char| c.is_ascii_digit() || c == 'v' || c == '*')
        .ok_or_else(|| SolverError::InvalidConstraint(token.to_string()))?;
    let (op, version) = token.split_at(split);

    match op {
        "" | "=" | "==" => {
            if version.contains('*') || version.contains(".x") {
                Ok(version.replace(".x", ".*"))
            } else {
                Ok(format!("={}", normalize_version(version)))
            }
        }
        "~" => {
            let parts: Vec<&str> = version.trim_start_matches('v').split('.').collect();
            if parts.len() <= 2 {
                let major: u64 = parts[0]
                    .parse()
                    .map_err(|_| SolverError::InvalidConstraint(token.to_string()))?;
                Ok(format!(">={}, <{}.0.0", normalize_version(version), major + 1))
            } else {
                Ok(format!("~{}", normalize_version(version)))
            }
        }
        ">" | ">=" | "<" | "<=" | "^" => Ok(format!("{}{}", op, normalize_version(version))),
        _ => Err(SolverError::InvalidConstraint(token.to_string())),
    }
}

/// Branch-like versions that never take part in range comparison
fn is_branch_version(version: &str) -> bool {
    let lower = version.to_lowercase();
    lower.starts_with("dev-") || lower.ends_with("-dev") || !lower.chars().any(|c| c.is_ascii_digit())
}

/// Pads a Composer version to three numeric components, dropping a fourth
fn normalize_version(version: &str) -> String {
    let version = version.trim().trim_start_matches('v');
    let (numeric, pre) = match version.find('-') {
        Some(pos) => (&version[..pos], Some(&version[pos + 1..])),
        None => (version, None),
    };

    let mut parts: Vec<&str> = numeric.split('.').take(3).collect();
    while parts.len() < 3 {
        parts.push("0");
    }

    let mut normalized = parts.join(".");
    if let Some(pre) = pre {
        normalized.push('-');
        normalized.push_str(pre);
    }
    normalized
}

/// Parse a package version into a semver version, `None` for branch versions
pub fn parse_version(version: &str) -> Option<Version> {
    let version = strip_exact_operator(version);
    if is_branch_version(version) {
        return None;
    }
    Version::parse(&normalize_version(version)).ok()
}
