//! Utility functions for rule generation.

use lazy_static::lazy_static;
use regex::Regex;

/// Pattern matching the names of platform packages.
pub const PLATFORM_PACKAGE_PATTERN: &str =
    r"(?i)^(?:php(?:-64bit|-ipv6|-zts|-debug)?|hhvm|(?:ext|lib)-[a-z0-9](?:[_.-]?[a-z0-9]+)*|composer(?:-(?:plugin|runtime)-api)?)$";

lazy_static! {
    static ref PLATFORM_PACKAGE_REGEX: Regex =
        Regex::new(PLATFORM_PACKAGE_PATTERN).expect("platform package pattern is valid");
}

/// Check if a package name represents a platform package.
///
/// Platform packages are virtual packages that represent the PHP runtime
/// and its extensions. They include:
/// - `php` - The PHP interpreter itself
/// - `php-64bit`, `php-ipv6`, `php-zts`, `php-debug` - PHP capability packages
/// - `hhvm`
/// - `ext-*` - PHP extensions (e.g., `ext-json`, `ext-mbstring`)
/// - `lib-*` - System libraries (e.g., `lib-libxml`)
/// - `composer`, `composer-runtime-api`, `composer-plugin-api` - Composer packages
///
/// # Examples
///
/// ```
/// use pox_solver::util::is_platform_package;
///
/// assert!(is_platform_package("php"));
/// assert!(is_platform_package("ext-json"));
/// assert!(is_platform_package("lib-libxml"));
/// assert!(is_platform_package("composer-runtime-api"));
///
/// assert!(!is_platform_package("phpunit/phpunit"));
/// assert!(!is_platform_package("symfony/console"));
/// ```
pub fn is_platform_package(name: &str) -> bool {
    PLATFORM_PACKAGE_REGEX.is_match(name)
}

/// Matches package names against the platform pattern, or a custom override.
#[derive(Debug, Clone)]
pub struct PlatformMatcher {
    custom: Option<Regex>,
}

impl PlatformMatcher {
    /// Matcher using the built-in platform pattern
    pub fn new() -> Self {
        Self { custom: None }
    }

    /// Matcher using a caller supplied pattern
    pub fn with_pattern(pattern: Regex) -> Self {
        Self { custom: Some(pattern) }
    }

    pub fn is_platform(&self, name: &str) -> bool {
        match &self.custom {
            Some(regex) => regex.is_match(name),
            None => is_platform_package(name),
        }
    }
}

impl Default for PlatformMatcher {
    fn default() -> Self {
        Self::new()
    }
}
