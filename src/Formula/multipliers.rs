//! # Bracket multiplier resolver
//!
//! Finds every bracket group of a formula and the cumulative multiplier it carries.
//! In `K4[Fe(CN)6]3` the square group has multiplier 3 and the round group inside it
//! 6 * 3 = 18; an element takes the multiplier of the innermost group that contains it.
//!
//! Scanning uses an explicit stack of spans instead of recursion so deeply nested input
//! cannot exhaust the call stack; the nesting depth is still capped by configuration.
use crate::Formula::lexicon::{
    DigitRun, closing_delimiter, is_delimiter, is_left_delimiter, is_right_delimiter,
};
use crate::errors::{ChemError, ChemResult};
use log::debug;

/// One resolved bracket group: positions of its brackets (inclusive) and the product of
/// its own multiplier with the multipliers of all enclosing groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketGroup {
    pub left: usize,
    pub right: usize,
    pub multiplier: u64,
    /// 1 for a top-level group
    pub depth: usize,
}

impl BracketGroup {
    pub fn contains(&self, position: usize) -> bool {
        self.left <= position && position <= self.right
    }
}

// a region still to be scanned for groups
struct Span {
    start: usize,
    end: usize,
    base: u64,
    depth: usize,
}

/// Position of the bracket closing the one at `left`, searching up to `end`.
/// On failure returns the position to report.
fn matching_delimiter(chars: &[char], left: usize, end: usize) -> Result<usize, usize> {
    let mut expected: Vec<char> = Vec::new();
    match closing_delimiter(chars[left]) {
        Some(closer) => expected.push(closer),
        None => return Err(left),
    }
    for j in left + 1..end {
        let c = chars[j];
        if let Some(closer) = closing_delimiter(c) {
            expected.push(closer);
        } else if is_right_delimiter(c) {
            match expected.pop() {
                Some(closer) if closer == c => {
                    if expected.is_empty() {
                        return Ok(j);
                    }
                }
                // wrong kind of bracket
                _ => return Err(j),
            }
        }
    }
    Err(left)
}

/// Resolves all bracket groups of `formula`.
///
/// Groups after a nested group go back to the multiplier of the enclosing group; only the
/// contents of a group inherit its multiplier.
pub fn resolve_groups(formula: &str, max_depth: usize) -> ChemResult<Vec<BracketGroup>> {
    let chars: Vec<char> = formula.chars().collect();
    let mut groups = Vec::new();
    let mut stack = vec![Span {
        start: 0,
        end: chars.len(),
        base: 1,
        depth: 0,
    }];

    while let Some(span) = stack.pop() {
        let mut i = span.start;
        while i < span.end {
            let c = chars[i];
            if is_right_delimiter(c) {
                return Err(ChemError::MismatchedDelimiters {
                    formula: formula.to_string(),
                    position: i,
                });
            }
            if !is_left_delimiter(c) {
                i += 1;
                continue;
            }
            let right = matching_delimiter(&chars, i, span.end).map_err(|position| {
                ChemError::MismatchedDelimiters {
                    formula: formula.to_string(),
                    position,
                }
            })?;
            let depth = span.depth + 1;
            if depth > max_depth {
                return Err(ChemError::NestingTooDeep {
                    formula: formula.to_string(),
                    depth,
                    limit: max_depth,
                });
            }
            let run = DigitRun::read(&chars, right + 1).ok_or_else(|| ChemError::TooManyAtoms {
                formula: formula.to_string(),
                limit: u64::MAX as usize,
            })?;
            let multiplier =
                span.base
                    .checked_mul(run.size())
                    .ok_or_else(|| ChemError::TooManyAtoms {
                        formula: formula.to_string(),
                        limit: u64::MAX as usize,
                    })?;
            debug!(
                "group {}..={} of '{}': multiplier {} (own {}, inherited {})",
                i,
                right,
                formula,
                multiplier,
                run.size(),
                span.base
            );
            groups.push(BracketGroup {
                left: i,
                right,
                multiplier,
                depth,
            });
            if chars[i + 1..right].iter().any(|&c| is_delimiter(c)) {
                stack.push(Span {
                    start: i + 1,
                    end: right,
                    base: multiplier,
                    depth,
                });
            }
            // digits after the bracket belong to the group, never to an element
            i = run.end;
        }
    }
    groups.sort_by_key(|g| (g.depth, g.left));
    Ok(groups)
}

/// Multiplier in effect at `position`: that of the innermost group containing it, or 1.
pub fn multiplier_at(groups: &[BracketGroup], position: usize) -> u64 {
    groups
        .iter()
        .filter(|g| g.contains(position))
        .max_by_key(|g| g.depth)
        .map(|g| g.multiplier)
        .unwrap_or(1)
}

/// Multiplier of every character position of a formula of `len` characters.
pub fn multipliers_per_position(groups: &[BracketGroup], len: usize) -> Vec<u64> {
    let mut multipliers = vec![1; len];
    // groups are ordered outermost first, inner groups overwrite
    for group in groups {
        for m in multipliers
            .iter_mut()
            .take(group.right + 1)
            .skip(group.left)
        {
            *m = group.multiplier;
        }
    }
    multipliers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_brackets() {
        let groups = resolve_groups("H2O", 32).unwrap();
        assert!(groups.is_empty());
        assert_eq!(multipliers_per_position(&groups, 3), vec![1, 1, 1]);
    }

    #[test]
    fn test_single_group() {
        // M g ( O H ) 2
        let groups = resolve_groups("Mg(OH)2", 32).unwrap();
        assert_eq!(
            groups,
            vec![BracketGroup {
                left: 2,
                right: 5,
                multiplier: 2,
                depth: 1
            }]
        );
        assert_eq!(multiplier_at(&groups, 0), 1);
        assert_eq!(multiplier_at(&groups, 3), 2);
        assert_eq!(multiplier_at(&groups, 6), 1);
    }

    #[test]
    fn test_nested_groups_compose() {
        // K 4 [ F e ( C N ) 6 ] 3
        // 0 1 2 3 4 5 6 7 8 9 10 11
        let groups = resolve_groups("K4[Fe(CN)6]3", 32).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!((groups[0].left, groups[0].right, groups[0].multiplier), (2, 10, 3));
        assert_eq!((groups[1].left, groups[1].right, groups[1].multiplier), (5, 8, 18));
        let per_position = multipliers_per_position(&groups, 12);
        assert_eq!(per_position[0], 1);
        assert_eq!(per_position[3], 3);
        assert_eq!(per_position[6], 18);
        assert_eq!(per_position[11], 1);
    }

    #[test]
    fn test_siblings_do_not_inherit() {
        // ( O H ) 2 ( S O 4 ) 3
        // 0 1 2 3 4 5 6 7 8 9 10
        let groups = resolve_groups("(OH)2(SO4)3", 32).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].multiplier, 2);
        assert_eq!(groups[1].multiplier, 3);
        assert_eq!(multiplier_at(&groups, 7), 3);
    }

    #[test]
    fn test_sibling_after_nested_group() {
        // [A(B)2]3(C)5 style nesting with a trailing sibling: Ca3[Fe(CN)6]2(OH)3
        let groups = resolve_groups("Ca3[Fe(CN)6]2(OH)3", 32).unwrap();
        let multipliers: Vec<u64> = groups.iter().map(|g| g.multiplier).collect();
        assert_eq!(multipliers, vec![2, 3, 12]);
    }

    #[test]
    fn test_group_directly_inside_group() {
        let groups = resolve_groups("[(OH)]2", 32).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(multiplier_at(&groups, 2), 2);
    }

    #[test]
    fn test_mismatched_delimiters() {
        let err = resolve_groups("Na(OH", 32).unwrap_err();
        assert!(matches!(
            err,
            ChemError::MismatchedDelimiters { position: 2, .. }
        ));
        // kinds must pair up
        assert!(matches!(
            resolve_groups("Na(OH]", 32),
            Err(ChemError::MismatchedDelimiters { position: 5, .. })
        ));
        assert!(matches!(
            resolve_groups("NaOH)", 32),
            Err(ChemError::MismatchedDelimiters { position: 4, .. })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}H{}", "(".repeat(5), ")".repeat(5));
        assert!(resolve_groups(&deep, 5).is_ok());
        assert!(matches!(
            resolve_groups(&deep, 4),
            Err(ChemError::NestingTooDeep { depth: 5, limit: 4, .. })
        ));
    }
}
