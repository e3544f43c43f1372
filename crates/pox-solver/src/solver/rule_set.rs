use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use super::pool::{InstalledMap, PoolInterface};
use super::reason::{Reason, RuleType};
use super::rule::{Literal, Rule};
use crate::error::Result;

/// Collection of SAT rules organized by type.
///
/// The RuleSet manages rules with:
/// - Deduplication based on literal content
/// - Iteration in rule type order, then insertion order
/// - Sequential ID assignment starting at 0
#[derive(Debug, Default)]
pub struct RuleSet {
    /// All rules indexed by ID
    rules: Vec<Rule>,

    /// Rule ids per type, indexed by `RuleType::index`
    rules_by_type: [Vec<u32>; 3],

    /// Literal hash to rule ids for deduplication
    rule_hashes: HashMap<u64, Vec<u32>>,
}

impl RuleSet {
    /// Create a new empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule to the set under the given type, returning its ID.
    ///
    /// Returns `None` if there is no rule or an equal rule is already stored;
    /// the stored rule keeps its original reason.
    pub fn add(&mut self, rule: impl Into<Option<Rule>>, rule_type: RuleType) -> Option<u32> {
        let mut rule = rule.into()?;

        let hash = rule.literal_hash();
        if let Some(ids) = self.rule_hashes.get(&hash) {
            if ids.iter().any(|&id| self.rules[id as usize].equals(&rule)) {
                return None;
            }
        }

        let id = self.rules.len() as u32;
        rule.set_id(id);
        rule.set_rule_type(rule_type);

        self.rules_by_type[rule_type.index()].push(id);
        self.rule_hashes.entry(hash).or_default().push(id);
        self.rules.push(rule);

        Some(id)
    }

    /// Get a rule by ID
    pub fn get(&self, id: u32) -> Option<&Rule> {
        self.rules.get(id as usize)
    }

    /// Get a mutable reference to a rule by ID
    pub fn get_mut(&mut self, id: u32) -> Option<&mut Rule> {
        self.rules.get_mut(id as usize)
    }

    /// Get the total number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the rule set is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules, by type then insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.iter_for(&RuleType::ALL)
    }

    /// Rules of the given types, by type then insertion order
    pub fn iter_for<'a>(&'a self, types: &'a [RuleType]) -> impl Iterator<Item = &'a Rule> + 'a {
        RuleType::ALL
            .into_iter()
            .filter(move |t| types.contains(t))
            .flat_map(move |t| self.ids_of_type(t))
    }

    /// Rules of every type except the given ones
    pub fn iter_without<'a>(&'a self, types: &'a [RuleType]) -> impl Iterator<Item = &'a Rule> + 'a {
        RuleType::ALL
            .into_iter()
            .filter(move |t| !types.contains(t))
            .flat_map(move |t| self.ids_of_type(t))
    }

    fn ids_of_type(&self, rule_type: RuleType) -> impl Iterator<Item = &Rule> + '_ {
        self.rules_by_type[rule_type.index()]
            .iter()
            .map(move |&id| &self.rules[id as usize])
    }

    /// Rule types in iteration order
    pub fn types(&self) -> [RuleType; 3] {
        RuleType::ALL
    }

    /// Count rules by type
    pub fn count_by_type(&self, rule_type: RuleType) -> usize {
        self.rules_by_type[rule_type.index()].len()
    }

    /// Get assertion rules (single literal rules)
    pub fn assertions(&self) -> impl Iterator<Item = &Rule> {
        self.iter().filter(|r| r.is_assertion())
    }

    /// Find rules containing a specific literal
    pub fn rules_containing(&self, literal: Literal) -> Vec<&Rule> {
        self.iter()
            .filter(|r| r.literals().contains(&literal))
            .collect()
    }

    /// Disable a rule
    pub fn disable(&mut self, id: u32) {
        if let Some(rule) = self.get_mut(id) {
            rule.disable();
        }
    }

    /// Enable a rule
    pub fn enable(&mut self, id: u32) {
        if let Some(rule) = self.get_mut(id) {
            rule.enable();
        }
    }

    /// Get statistics about the rule set
    pub fn stats(&self) -> RuleSetStats {
        let mut stats = RuleSetStats {
            total: self.rules.len(),
            by_type: RuleType::ALL.iter().map(|&t| (t, self.count_by_type(t))).collect(),
            by_reason: Reason::ALL.iter().map(|&r| (r, 0)).collect(),
            ..RuleSetStats::default()
        };

        for rule in &self.rules {
            *stats.by_reason.entry(rule.reason()).or_default() += 1;

            if rule.is_assertion() {
                stats.assertions += 1;
            }
            if rule.is_disabled() {
                stats.disabled += 1;
            }
        }

        stats
    }

    /// Render every rule type as a labeled block of human readable rules
    pub fn pretty_string<P: PoolInterface + ?Sized>(
        &self,
        pool: &P,
        installed: &InstalledMap,
    ) -> Result<String> {
        let mut blocks = Vec::new();

        for rule_type in RuleType::ALL {
            let lines = self
                .ids_of_type(rule_type)
                .map(|rule| rule.pretty_string(pool, installed))
                .collect::<Result<Vec<_>>>()?;
            blocks.push(render_block(rule_type, &lines));
        }

        Ok(blocks.concat())
    }
}

/// Width of the widest rule type label
fn label_width() -> usize {
    RuleType::ALL.iter().map(|t| t.name().len()).max().unwrap_or(0)
}

fn render_block(rule_type: RuleType, lines: &[String]) -> String {
    let width = label_width();
    let mut out = format!("{:<width$}: ", rule_type.name(), width = width);

    if lines.is_empty() {
        out.push('\n');
    }
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push_str(&" ".repeat(width + 2));
        }
        out.push_str(line);
        out.push('\n');
    }

    out
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule_type in RuleType::ALL {
            let lines: Vec<String> = self.ids_of_type(rule_type).map(|r| r.to_string()).collect();
            f.write_str(&render_block(rule_type, &lines))?;
        }
        Ok(())
    }
}

/// Statistics about a rule set
#[derive(Debug, Default)]
pub struct RuleSetStats {
    pub total: usize,
    pub assertions: usize,
    pub disabled: usize,
    pub by_type: IndexMap<RuleType, usize>,
    pub by_reason: IndexMap<Reason, usize>,
}

impl RuleSetStats {
    pub fn of_reason(&self, reason: Reason) -> usize {
        self.by_reason.get(&reason).copied().unwrap_or(0)
    }

    pub fn of_type(&self, rule_type: RuleType) -> usize {
        self.by_type.get(&rule_type).copied().unwrap_or(0)
    }
}
