//! Rule generation scenarios.
//!
//! Each test builds a small pool, runs the generator and inspects the
//! resulting clauses, their reasons and their diagnostic text.

use super::*;
use crate::package::{Package, Stability};
use crate::util::PlatformMatcher;

/// Helper to create a package with a given name and version
fn pkg(name: &str, version: &str) -> Package {
    Package::new(name, version)
}

/// Helper to create a package with requirements
fn pkg_with_requires(name: &str, version: &str, requires: Vec<(&str, &str)>) -> Package {
    let mut p = Package::new(name, version);
    for (dep_name, constraint) in requires {
        p.require.insert(dep_name.to_string(), constraint.to_string());
    }
    p
}

/// Helper to create a package with conflicts
fn pkg_with_conflicts(name: &str, version: &str, conflicts: Vec<(&str, &str)>) -> Package {
    let mut p = Package::new(name, version);
    for (conflict_name, constraint) in conflicts {
        p.conflict.insert(conflict_name.to_string(), constraint.to_string());
    }
    p
}

/// Helper to create a package with replaces
fn pkg_with_replaces(name: &str, version: &str, replaces: Vec<(&str, &str)>) -> Package {
    let mut p = Package::new(name, version);
    for (replace_name, constraint) in replaces {
        p.replace.insert(replace_name.to_string(), constraint.to_string());
    }
    p
}

/// Helper to create a package with provides
fn pkg_with_provides(name: &str, version: &str, provides: Vec<(&str, &str)>) -> Package {
    let mut p = Package::new(name, version);
    for (provide_name, constraint) in provides {
        p.provide.insert(provide_name.to_string(), constraint.to_string());
    }
    p
}

fn generate(pool: &mut Pool, request: &Request, installed: &InstalledMap, ignore_platform_reqs: bool) -> RuleSet {
    RuleGenerator::new(pool).get_rules_for(request.jobs(), installed, ignore_platform_reqs)
}

/// Rules as (reason, literals) pairs in iteration order
fn summarize(rules: &RuleSet) -> Vec<(Reason, Vec<Literal>)> {
    rules.iter().map(|r| (r.reason(), r.literals().to_vec())).collect()
}

fn rules_with_reason(rules: &RuleSet, reason: Reason) -> Vec<Vec<Literal>> {
    rules
        .iter()
        .filter(|r| r.reason() == reason)
        .map(|r| r.literals().to_vec())
        .collect()
}

fn pretty_lines(rules: &RuleSet, pool: &Pool, installed: &InstalledMap) -> Vec<String> {
    rules
        .iter()
        .map(|r| r.pretty_string(pool, installed).unwrap())
        .collect()
}

#[test]
fn test_install_single_package() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg("a", "1.0.0"));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(summarize(&rules), vec![(Reason::JobInstall, vec![a])]);
    let rule = rules.get(0).unwrap();
    assert_eq!(rule.rule_type(), Some(RuleType::Job));
    assert_eq!(rule.job().map(|j| j.package_name.as_str()), Some("a"));
    assert_eq!(rule.required_package_name(), Some("a"));
}

#[test]
fn test_duplicate_jobs_produce_one_rule() {
    let mut pool = Pool::new();
    pool.add_package(pkg("a", "1.0.0"));

    let mut request = Request::new();
    request.install("a", None).install("a", Some("^1.0"));

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules.len(), 1);
    assert_eq!(rules.count_by_type(RuleType::Job), 1);
}

#[test]
fn test_generated_literals_are_sorted() {
    let mut pool = Pool::new();
    pool.add_package(pkg_with_requires("a", "1.0.0", vec![("c", "*")]));
    pool.add_package(pkg("c", "2.0.0"));
    pool.add_package(pkg("c", "1.0.0"));
    pool.add_package(pkg_with_conflicts("b", "1.0.0", vec![("a", "*")]));

    let mut request = Request::new();
    request.install("b", None).install("a", None).install("c", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert!(!rules.is_empty());
    for rule in rules.iter() {
        assert!(rule.literals().windows(2).all(|w| w[0] <= w[1]), "{} is not sorted", rule);
    }
}

#[test]
fn test_install_job_without_providers_adds_nothing() {
    let mut pool = Pool::new();
    pool.add_package(pkg("a", "1.0.0"));

    let mut request = Request::new();
    request.install("missing", None).install("a", Some("^2.0"));

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert!(rules.is_empty());
}

#[test]
fn test_update_job_adds_nothing() {
    let mut pool = Pool::new();
    pool.add_package(pkg("a", "1.0.0"));

    let mut request = Request::new();
    request.update("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert!(rules.is_empty());
}

#[test]
fn test_require_rule_lists_all_providers() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "^1.0")]));
    let b1 = pool.add_package(pkg("b", "1.0.0"));
    let b2 = pool.add_package(pkg("b", "1.1.0"));
    pool.add_package(pkg("b", "2.0.0"));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules_with_reason(&rules, Reason::PackageRequire), vec![vec![-a, b1, b2]]);
    assert_eq!(rules_with_reason(&rules, Reason::PackageSameName), vec![vec![-b2, -b1]]);
    assert_eq!(rules_with_reason(&rules, Reason::JobInstall), vec![vec![a]]);
    assert_eq!(rules.len(), 3);
}

#[test]
fn test_same_name_exclusivity() {
    let mut pool = Pool::new();
    let foo1 = pool.add_package(pkg("foo", "1.0"));
    let foo2 = pool.add_package(pkg("foo", "2.0"));

    let mut request = Request::new();
    request.install("foo", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(
        summarize(&rules),
        vec![
            (Reason::PackageSameName, vec![-foo2, -foo1]),
            (Reason::JobInstall, vec![foo1, foo2]),
        ]
    );

    let lines = pretty_lines(&rules, &pool, &InstalledMap::new());
    assert_eq!(lines[0], "Can only install one of: foo[1.0, 2.0].");
    assert_eq!(lines[1], "Install command rule (install foo 1.0|install foo 2.0)");
}

#[test]
fn test_mutual_requirements_terminate() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "*")]));
    let b = pool.add_package(pkg_with_requires("b", "1.0.0", vec![("a", "*")]));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(
        summarize(&rules),
        vec![
            (Reason::PackageRequire, vec![-a, b]),
            (Reason::PackageRequire, vec![-b, a]),
            (Reason::JobInstall, vec![a]),
        ]
    );
}

#[test]
fn test_self_requirement_is_tautology() {
    let mut pool = Pool::new();
    let mut a = pkg_with_requires("a", "1.0.0", vec![("virtual/a", "*")]);
    a.provide.insert("virtual/a".to_string(), "1.0.0".to_string());
    let a = pool.add_package(a);

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(summarize(&rules), vec![(Reason::JobInstall, vec![a])]);
}

#[test]
fn test_uninstall_job_with_two_installed_providers() {
    let mut pool = Pool::new();
    let x1 = pool.add_package(pkg("x", "1.0.0"));
    let x2 = pool.add_package(pkg("x", "2.0.0"));
    let installed = pool.installed_map([x1, x2]);

    let mut request = Request::new();
    request.uninstall("x", None);

    let rules = generate(&mut pool, &request, &installed, false);

    let job_rules: Vec<(Reason, Vec<Literal>)> = rules
        .iter_for(&[RuleType::Job])
        .map(|r| (r.reason(), r.literals().to_vec()))
        .collect();
    assert_eq!(
        job_rules,
        vec![(Reason::JobUninstall, vec![-x1]), (Reason::JobUninstall, vec![-x2])]
    );
    assert!(rules.iter_for(&[RuleType::Job]).all(|r| r.is_assertion()));

    let lines: Vec<String> = rules
        .iter_for(&[RuleType::Job])
        .map(|r| r.pretty_string(&pool, &installed).unwrap())
        .collect();
    assert_eq!(lines, vec!["Uninstall command rule (remove x 1.0.0)", "Uninstall command rule (remove x 2.0.0)"]);
}

#[test]
fn test_installed_package_rules_come_first() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "*")]));
    let b = pool.add_package(pkg("b", "1.0.0"));
    let c = pool.add_package(pkg_with_requires("c", "1.0.0", vec![("b", "*")]));
    let installed = pool.installed_map([a]);

    let mut request = Request::new();
    request.install("c", None);

    let rules = generate(&mut pool, &request, &installed, false);

    assert_eq!(
        summarize(&rules),
        vec![
            (Reason::PackageRequire, vec![-a, b]),
            (Reason::PackageRequire, vec![-c, b]),
            (Reason::JobInstall, vec![c]),
        ]
    );
}

#[test]
fn test_whitelist_contains_requirement_closure() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "*")]));
    let b = pool.add_package(pkg_with_requires("b", "1.0.0", vec![("c", "*")]));
    let c = pool.add_package(pkg("c", "1.0.0"));
    let d = pool.add_package(pkg("d", "1.0.0"));
    let e = pool.add_package(pkg("e", "1.0.0"));
    let installed = pool.installed_map([a]);

    let mut request = Request::new();
    request.install("e", None).uninstall("d", None);

    let whitelist = {
        let mut generator = RuleGenerator::new(&mut pool);
        generator.get_rules_for(request.jobs(), &installed, false);
        generator.whitelist().clone()
    };

    let expected: Whitelist = [a, b, c, e].into_iter().collect();
    assert_eq!(whitelist, expected);
    assert!(!whitelist.contains(&d));

    // The pool keeps the whitelist for the rest of the run
    assert_eq!(pool.whitelist(), Some(&expected));
    assert!(pool.what_provides("d", None, ProvideQuery::FILTERED).is_empty());
    assert_eq!(pool.what_provides("d", None, ProvideQuery::UNFILTERED), vec![d]);
}

#[test]
fn test_uninstall_of_non_whitelisted_package_adds_nothing() {
    let mut pool = Pool::new();
    pool.add_package(pkg("d", "1.0.0"));

    let mut request = Request::new();
    request.uninstall("d", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert!(rules.is_empty());
}

#[test]
fn test_whitelist_follows_providers() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("psr/log-implementation", "^1.0")]));
    let logger = pool.add_package(pkg_with_provides("monolog", "2.0.0", vec![("psr/log-implementation", "1.0.0")]));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules_with_reason(&rules, Reason::PackageRequire), vec![vec![-a, logger]]);
    let lines = pretty_lines(&rules, &pool, &InstalledMap::new());
    assert_eq!(lines[0], "a 1.0.0 requires psr/log-implementation ^1.0 -> satisfiable by monolog[2.0.0].");
}

#[test]
fn test_alias_requires_its_base() {
    let mut pool = Pool::with_minimum_stability(Stability::Dev);
    let base = pool.add_package(pkg("foo", "dev-main"));
    let alias = pool.add_alias(base, "1.0.0", "1.0.0", false).unwrap();

    let mut request = Request::new();
    request.install("foo", Some("^1.0"));

    let mut generator = RuleGenerator::new(&mut pool);
    let rules = generator.get_rules_for(request.jobs(), &InstalledMap::new(), false);
    assert!(generator.whitelist().contains(&base));
    assert!(generator.whitelist().contains(&alias));

    assert_eq!(
        summarize(&rules),
        vec![
            (Reason::PackageAlias, vec![-alias, base]),
            (Reason::JobInstall, vec![alias]),
        ]
    );
}

#[test]
fn test_alias_and_base_never_obsolete_each_other() {
    let mut pool = Pool::with_minimum_stability(Stability::Dev);
    let base = pool.add_package(pkg("foo", "dev-main"));
    let alias1 = pool.add_alias(base, "1.0.0", "1.0.0", false).unwrap();
    let alias2 = pool.add_alias(base, "2.0.0", "2.0.0", false).unwrap();

    let mut request = Request::new();
    request.install("foo", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert!(rules_with_reason(&rules, Reason::PackageSameName).is_empty());
    assert_eq!(
        rules_with_reason(&rules, Reason::PackageAlias),
        vec![vec![-alias1, base], vec![-alias2, base]]
    );
    assert_eq!(rules_with_reason(&rules, Reason::JobInstall), vec![vec![base, alias1, alias2]]);
}

#[test]
fn test_conflict_rule() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_conflicts("a", "1.0.0", vec![("b", "^1.0")]));
    let b = pool.add_package(pkg("b", "1.0.0"));

    let mut request = Request::new();
    request.install("a", None).install("b", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules_with_reason(&rules, Reason::PackageConflict), vec![vec![-b, -a]]);

    let conflict = rules
        .iter()
        .find(|r| r.reason() == Reason::PackageConflict)
        .unwrap();
    assert_eq!(
        conflict.pretty_string(&pool, &InstalledMap::new()).unwrap(),
        "b 1.0.0 conflicts with a[1.0.0]."
    );
}

#[test]
fn test_conflict_outside_constraint_is_ignored() {
    let mut pool = Pool::new();
    pool.add_package(pkg_with_conflicts("a", "1.0.0", vec![("b", "^2.0")]));
    pool.add_package(pkg("b", "1.0.0"));

    let mut request = Request::new();
    request.install("a", None).install("b", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert!(rules_with_reason(&rules, Reason::PackageConflict).is_empty());
    assert_eq!(rules.len(), 2);
}

#[test]
fn test_conflict_with_unvisited_package_is_ignored() {
    let mut pool = Pool::new();
    pool.add_package(pkg_with_conflicts("a", "1.0.0", vec![("b", "*")]));
    pool.add_package(pkg("b", "1.0.0"));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules.len(), 1);
}

#[test]
fn test_replaced_name_gives_implicit_obsoletes() {
    let mut pool = Pool::new();
    let replacer = pool.add_package(pkg_with_replaces("new", "1.0.0", vec![("old", "1.0.0")]));
    let old = pool.add_package(pkg("old", "1.0.0"));
    let installed = pool.installed_map([old]);

    let mut request = Request::new();
    request.install("new", None);

    let rules = generate(&mut pool, &request, &installed, false);

    assert_eq!(
        summarize(&rules),
        vec![
            (Reason::PackageImplicitObsoletes, vec![-old, -replacer]),
            (Reason::JobInstall, vec![replacer]),
        ]
    );
    let lines = pretty_lines(&rules, &pool, &installed);
    assert_eq!(lines[0], "remove old 1.0.0|don't install new 1.0.0");
}

#[test]
fn test_replace_of_provided_name_obsoletes() {
    let mut pool = Pool::new();
    let x = pool.add_package(pkg_with_provides("x", "1.0.0", vec![("virtual/impl", "1.0.0")]));
    let y = pool.add_package(pkg_with_replaces("y", "1.0.0", vec![("virtual/impl", "1.0.0")]));

    let mut request = Request::new();
    request.install("x", None).install("y", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules_with_reason(&rules, Reason::PackageObsoletes), vec![vec![-y, -x]]);
    assert!(rules_with_reason(&rules, Reason::InstalledPackageObsoletes).is_empty());
}

#[test]
fn test_installed_replacer_obsoletes() {
    let mut pool = Pool::new();
    let x = pool.add_package(pkg_with_provides("x", "1.0.0", vec![("virtual/impl", "1.0.0")]));
    let y = pool.add_package(pkg_with_replaces("y", "1.0.0", vec![("virtual/impl", "1.0.0")]));
    let installed = pool.installed_map([y]);

    let mut request = Request::new();
    request.install("x", None).install("y", None);

    let rules = generate(&mut pool, &request, &installed, false);

    assert_eq!(rules_with_reason(&rules, Reason::InstalledPackageObsoletes), vec![vec![-y, -x]]);
    assert!(rules_with_reason(&rules, Reason::PackageObsoletes).is_empty());
}

#[test]
fn test_ignore_platform_requirements() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("php", ">=8.0"), ("ext-json", "*")]));
    let php = pool.add_package(pkg("php", "8.2.0"));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);
    assert_eq!(
        rules_with_reason(&rules, Reason::PackageRequire),
        vec![vec![-a, php], vec![-a]]
    );

    let rules = generate(&mut pool, &request, &InstalledMap::new(), true);
    assert_eq!(summarize(&rules), vec![(Reason::JobInstall, vec![a])]);
}

#[test]
fn test_ignore_platform_skips_unfixed_platform_jobs() {
    let mut pool = Pool::new();
    let php = pool.add_package(pkg("php", "8.2.0"));

    let mut request = Request::new();
    request.install("php", None);
    assert!(generate(&mut pool, &request, &InstalledMap::new(), true).is_empty());
    assert_eq!(generate(&mut pool, &request, &InstalledMap::new(), false).len(), 1);

    let mut request = Request::new();
    request.fix("php", Some("8.2.0"));
    let rules = generate(&mut pool, &request, &InstalledMap::new(), true);
    assert_eq!(summarize(&rules), vec![(Reason::JobInstall, vec![php])]);
}

#[test]
fn test_custom_platform_matcher() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("runtime/core", "*")]));
    pool.add_package(pkg("runtime/core", "1.0.0"));

    let mut request = Request::new();
    request.install("a", None);

    let matcher = PlatformMatcher::with_pattern(regex::Regex::new("^runtime/").unwrap());
    let rules = RuleGenerator::new(&mut pool)
        .with_platform_matcher(matcher)
        .get_rules_for(request.jobs(), &InstalledMap::new(), true);

    assert_eq!(summarize(&rules), vec![(Reason::JobInstall, vec![a])]);
}

#[test]
fn test_unsatisfiable_requirement_message() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "^1.0")]));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules_with_reason(&rules, Reason::PackageRequire), vec![vec![-a]]);
    let lines = pretty_lines(&rules, &pool, &InstalledMap::new());
    assert_eq!(lines[0], "a 1.0.0 requires b ^1.0 -> no matching package found.");
}

#[test]
fn test_filtered_providers_message() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "*")]));
    pool.add_package(pkg("b", "1.1.0-beta1"));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules_with_reason(&rules, Reason::PackageRequire), vec![vec![-a]]);
    let lines = pretty_lines(&rules, &pool, &InstalledMap::new());
    assert_eq!(
        lines[0],
        "a 1.0.0 requires b * -> satisfiable by b[1.1.0-beta1] but these conflict with your requirements or minimum-stability."
    );
}

#[test]
fn test_stability_flag_allows_unstable_provider() {
    let mut pool = Pool::new();
    pool.add_stability_flag("b", Stability::Beta);
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "*")]));
    let b = pool.add_package(pkg("b", "1.1.0-beta1"));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules_with_reason(&rules, Reason::PackageRequire), vec![vec![-a, b]]);
}

#[test]
fn test_pretty_string_is_idempotent() {
    let mut pool = Pool::new();
    pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "^1.0")]));
    pool.add_package(pkg("b", "1.0.0"));
    pool.add_package(pkg("b", "1.5.0"));
    let c = pool.add_package(pkg_with_conflicts("c", "1.0.0", vec![("b", "1.5.0")]));
    let installed = pool.installed_map([c]);

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &installed, false);

    let first = rules.pretty_string(&pool, &installed).unwrap();
    let second = rules.pretty_string(&pool, &installed).unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with("PACKAGE: "));
    assert!(first.contains("c 1.0.0 conflicts with b[1.5.0]."));
    assert!(first.contains("JOB    : Install command rule (install a 1.0.0)"));
}

#[test]
fn test_rule_set_pretty_string_propagates_invariant_violation() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg("a", "1.0.0"));

    let mut rules = RuleSet::new();
    rules.add(Rule::new(vec![-a], Reason::PackageRequire, ReasonData::None), RuleType::Package);

    let err = rules.pretty_string(&pool, &InstalledMap::new()).unwrap_err();
    assert!(matches!(err, crate::SolverError::InvariantViolation(_)));
}

#[test]
fn test_generator_can_run_twice() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg("a", "1.0.0"));
    let b = pool.add_package(pkg("b", "1.0.0"));

    let mut generator = RuleGenerator::new(&mut pool);

    let mut request = Request::new();
    request.install("a", None);
    let first = generator.get_rules_for(request.jobs(), &InstalledMap::new(), false);
    assert_eq!(summarize(&first), vec![(Reason::JobInstall, vec![a])]);

    let mut request = Request::new();
    request.install("b", None);
    let second = generator.get_rules_for(request.jobs(), &InstalledMap::new(), false);
    assert_eq!(summarize(&second), vec![(Reason::JobInstall, vec![b])]);
    assert!(!generator.whitelist().contains(&a));
}

#[test]
fn test_rule_ids_are_dense() {
    let mut pool = Pool::new();
    pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "*")]));
    pool.add_package(pkg("b", "1.0.0"));
    pool.add_package(pkg("b", "2.0.0"));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    let mut ids: Vec<u32> = rules.iter().map(|r| r.id()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..rules.len() as u32).collect::<Vec<_>>());
    for id in ids {
        assert_eq!(rules.get(id).unwrap().id(), id);
    }
}

#[test]
fn test_uninstall_installed_dev_package_under_stable() {
    let mut pool = Pool::new();
    let x_dev = pool.add_package(pkg("x", "dev-main"));
    let _x1 = pool.add_package(pkg("x", "1.0.0"));
    let installed = pool.installed_map([x_dev]);

    let mut request = Request::new();
    request.uninstall("x", None);

    let rules = generate(&mut pool, &request, &installed, false);

    assert_eq!(summarize(&rules), vec![(Reason::JobUninstall, vec![-x_dev])]);
}

#[test]
fn test_requirement_on_installed_dev_package() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "dev-main")]));
    let b = pool.add_package(pkg("b", "dev-main"));
    let installed = pool.installed_map([b]);

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &installed, false);

    assert_eq!(
        summarize(&rules),
        vec![
            (Reason::PackageRequire, vec![-a, b]),
            (Reason::JobInstall, vec![a]),
        ]
    );
}

#[test]
fn test_self_version_requirement() {
    let mut pool = Pool::new();
    let a = pool.add_package(pkg_with_requires("a", "1.0.0", vec![("b", "self.version")]));
    let b1 = pool.add_package(pkg("b", "1.0.0"));
    let _b2 = pool.add_package(pkg("b", "2.0.0"));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(
        summarize(&rules),
        vec![
            (Reason::PackageRequire, vec![-a, b1]),
            (Reason::JobInstall, vec![a]),
        ]
    );
    let lines = pretty_lines(&rules, &pool, &InstalledMap::new());
    assert_eq!(lines[0], "a 1.0.0 requires b =1.0.0 -> satisfiable by b[1.0.0].");
}

#[test]
fn test_self_version_conflict() {
    let mut pool = Pool::new();
    let mut a = pkg_with_requires("a", "2.0.0", vec![("b", "*")]);
    a.conflict.insert("b".to_string(), "self.version".to_string());
    let a = pool.add_package(a);
    let b1 = pool.add_package(pkg("b", "1.0.0"));
    let b2 = pool.add_package(pkg("b", "2.0.0"));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules_with_reason(&rules, Reason::PackageRequire), vec![vec![-a, b1, b2]]);
    assert_eq!(rules_with_reason(&rules, Reason::PackageConflict), vec![vec![-b2, -a]]);
}

#[test]
fn test_not_equal_conflict_excludes_one_version() {
    let mut pool = Pool::new();
    let mut a = pkg_with_requires("a", "1.0.0", vec![("b", "*")]);
    a.conflict.insert("b".to_string(), "!=1.0".to_string());
    let a = pool.add_package(a);
    let _b1 = pool.add_package(pkg("b", "1.0.0"));
    let b2 = pool.add_package(pkg("b", "2.0.0"));

    let mut request = Request::new();
    request.install("a", None);

    let rules = generate(&mut pool, &request, &InstalledMap::new(), false);

    assert_eq!(rules_with_reason(&rules, Reason::PackageConflict), vec![vec![-b2, -a]]);
}
