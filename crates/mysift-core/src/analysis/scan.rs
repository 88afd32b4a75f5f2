//! Generic single-pass line scanner feeding keyed counters.
//!
//! A scan walks lines once, tracking a "current context" (e.g. the database
//! selected by `USE`) and running every [`Rule`] of every [`RuleSet`] on
//! each line. Each rule set fills its own [`CountGrid`], with the context
//! as the row and the rule's category as the column.

use crate::analysis::ordered::CountGrid;

/// Classifies a line into a category, or `None` when it does not apply.
pub type Rule = for<'a> fn(&'a str) -> Option<&'a str>;

/// Extracts a new context name from a line that switches context.
pub type ContextRule = for<'a> fn(&'a str) -> Option<&'a str>;

/// Rules that feed one grid.
pub struct RuleSet {
    /// Columns registered up front, in this order, before any discovery.
    pub columns: &'static [&'static str],
    pub rules: &'static [Rule],
}

/// Scan `lines` once and return one grid per rule set, in the same order.
///
/// Lines before the first context switch count under the empty context.
pub fn scan<'l, I>(lines: I, context: ContextRule, sets: &[RuleSet]) -> Vec<CountGrid>
where
    I: IntoIterator<Item = &'l str>,
{
    let mut grids: Vec<CountGrid> = sets
        .iter()
        .map(|set| CountGrid::with_columns(set.columns))
        .collect();
    let mut current = String::new();

    for line in lines {
        if let Some(name) = context(line) {
            current = name.to_string();
            for grid in &mut grids {
                grid.add_row(&current);
            }
            continue;
        }
        for (set, grid) in sets.iter().zip(grids.iter_mut()) {
            for rule in set.rules {
                if let Some(category) = rule(line) {
                    grid.increment(&current, category);
                }
            }
        }
    }

    grids
}
