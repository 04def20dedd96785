//! Static lexicon of the formula grammar: bracket pairs, digit runs and longest-first
//! element symbol matching.
use crate::Formula::element_data::{ElementRecord, PeriodicTable};

pub const LEFT_DELIMITERS: [char; 3] = ['[', '(', '{'];
pub const RIGHT_DELIMITERS: [char; 3] = [']', ')', '}'];

pub fn is_left_delimiter(c: char) -> bool {
    LEFT_DELIMITERS.contains(&c)
}

pub fn is_right_delimiter(c: char) -> bool {
    RIGHT_DELIMITERS.contains(&c)
}

pub fn is_delimiter(c: char) -> bool {
    is_left_delimiter(c) || is_right_delimiter(c)
}

/// The closing bracket paired with an opening one
pub fn closing_delimiter(left: char) -> Option<char> {
    LEFT_DELIMITERS
        .iter()
        .position(|&d| d == left)
        .map(|i| RIGHT_DELIMITERS[i])
}

/// A run of decimal digits inside a formula, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitRun {
    pub start: usize,
    pub end: usize,
    /// `None` when no digits were present
    pub value: Option<u64>,
}

impl DigitRun {
    /// Reads the digits starting at `start`. Returns `None` if the number does not fit in u64.
    pub fn read(chars: &[char], start: usize) -> Option<Self> {
        let mut end = start;
        let mut value: u64 = 0;
        while end < chars.len() {
            let Some(digit) = chars[end].to_digit(10) else {
                break;
            };
            value = value.checked_mul(10)?.checked_add(digit as u64)?;
            end += 1;
        }
        Some(Self {
            start,
            end,
            value: if end > start { Some(value) } else { None },
        })
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Numeric size, 1 when no digits were present
    pub fn size(&self) -> u64 {
        self.value.unwrap_or(1)
    }
}

/// Longest-first element match at `index`: a two-letter symbol wins over a one-letter
/// symbol that is its prefix ("Co" before "C").
pub fn match_element<'a>(
    table: &'a PeriodicTable,
    chars: &[char],
    index: usize,
) -> Option<&'a ElementRecord> {
    for len in (1..=table.max_symbol_len()).rev() {
        if index + len > chars.len() {
            continue;
        }
        let candidate: String = chars[index..index + len].iter().collect();
        if let Some(record) = table.record(&candidate) {
            return Some(record);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(closing_delimiter('('), Some(')'));
        assert_eq!(closing_delimiter('['), Some(']'));
        assert_eq!(closing_delimiter('{'), Some('}'));
        assert_eq!(closing_delimiter(')'), None);
        assert!(is_delimiter('}'));
        assert!(!is_delimiter('H'));
    }

    #[test]
    fn test_digit_run() {
        let c = chars("H12O");
        let run = DigitRun::read(&c, 1).unwrap();
        assert_eq!((run.start, run.end, run.value), (1, 3, Some(12)));
        let run = DigitRun::read(&c, 3).unwrap();
        assert!(run.is_empty());
        assert_eq!(run.size(), 1);
        let huge = chars("H99999999999999999999999");
        assert!(DigitRun::read(&huge, 1).is_none());
    }

    #[test]
    fn test_longest_match_first() {
        let table = PeriodicTable::builtin();
        let c = chars("CoCO");
        assert_eq!(match_element(&table, &c, 0).unwrap().symbol, "Co");
        assert_eq!(match_element(&table, &c, 2).unwrap().symbol, "C");
        assert_eq!(match_element(&table, &c, 3).unwrap().symbol, "O");
        // lowercase tail of an unknown symbol is not an element by itself
        let c = chars("Xq");
        assert!(match_element(&table, &c, 0).is_none());
        assert!(match_element(&table, &c, 1).is_none());
    }
}
