//! Variable reference counting.

use std::collections::BTreeSet;

use regex::Regex;

use super::calls::word_bounded;
use super::facts::{UsageEntry, UsageMap, VariableDef};

/// Count references to each variable, per line.
///
/// A line that declares the name with `const`/`let`/`var` is skipped
/// entirely for that name, which also hides a shadowing redeclaration on
/// the same line. Names that are never referenced are absent.
pub fn find_variable_usages(content: &str, variables: &[VariableDef]) -> UsageMap {
    let names: BTreeSet<&str> = variables.iter().map(|v| v.name.as_str()).collect();
    let lines: Vec<&str> = content.split('\n').collect();
    let mut usages = UsageMap::new();

    for name in names {
        let bounded = word_bounded(name);
        let (Ok(reference), Ok(declaration)) = (
            Regex::new(&bounded),
            Regex::new(&format!(r"\b(?:const|let|var)\s+{}", bounded)),
        ) else {
            continue;
        };

        let mut entry = UsageEntry::default();
        for (idx, line) in lines.iter().enumerate() {
            if declaration.is_match(line) {
                continue;
            }
            let count = reference.find_iter(line).count();
            if count > 0 {
                entry.total += count;
                entry.lines.push(idx + 1);
            }
        }
        if entry.total > 0 {
            usages.insert(name.to_string(), entry);
        }
    }

    usages
}

/// Fill `total_usages`/`usage_lines` of every variable from `usages`.
pub fn apply_usages(vars: &mut [VariableDef], usages: &UsageMap) {
    for var in vars.iter_mut() {
        let entry = usages.get(&var.name);
        var.total_usages = Some(entry.map_or(0, |e| e.total));
        var.usage_lines = Some(entry.map(|e| e.lines.clone()).unwrap_or_default());
    }
}
