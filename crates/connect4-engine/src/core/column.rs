use std::str::FromStr;

use super::COLS;

/// A board column, 1-based as players see it.
///
/// A `Column` value is always in `1..=COLS`; whether the column still has room is a
/// question for the [`Board`](super::Board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("{_0}")]
pub struct Column(u8);

impl Column {
    /// All columns, left to right.
    pub const ALL: [Column; COLS] = [
        Column(1),
        Column(2),
        Column(3),
        Column(4),
        Column(5),
        Column(6),
        Column(7),
    ];

    /// Center-out ordering tried by the search. Central columns take part in more
    /// lines, so trying them first tightens the alpha-beta window earlier.
    pub const SEARCH_ORDER: [Column; COLS] = [
        Column(4),
        Column(5),
        Column(3),
        Column(6),
        Column(2),
        Column(7),
        Column(1),
    ];

    /// Returns the column with the given 1-based number, or `None` if out of range.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn new(number: usize) -> Option<Self> {
        if number >= 1 && number <= COLS {
            Some(Self(number as u8))
        } else {
            None
        }
    }

    /// 1-based column number.
    #[must_use]
    pub const fn number(self) -> usize {
        self.0 as usize
    }

    /// 0-based column index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseColumnError {
    #[display("not a column number: {input:?}")]
    NotANumber { input: String },
    #[display("column {number} is outside 1..={}", COLS)]
    OutOfRange { number: usize },
}

impl FromStr for Column {
    type Err = ParseColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .parse::<usize>()
            .map_err(|_| ParseColumnError::NotANumber {
                input: trimmed.to_owned(),
            })?;
        Column::new(number).ok_or(ParseColumnError::OutOfRange { number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bounds() {
        assert_eq!(Column::new(0), None);
        assert_eq!(Column::new(1).map(Column::index), Some(0));
        assert_eq!(Column::new(7).map(Column::number), Some(7));
        assert_eq!(Column::new(8), None);
    }

    #[test]
    fn test_search_order_is_permutation() {
        let mut sorted = Column::SEARCH_ORDER;
        sorted.sort();
        assert_eq!(sorted, Column::ALL);
        assert_eq!(Column::SEARCH_ORDER[0].number(), 4);
    }

    #[test]
    fn test_parse() {
        assert_eq!(" 3 ".parse::<Column>(), Ok(Column(3)));
        assert!(matches!(
            "x".parse::<Column>(),
            Err(ParseColumnError::NotANumber { .. })
        ));
        assert_eq!(
            "9".parse::<Column>(),
            Err(ParseColumnError::OutOfRange { number: 9 })
        );
        assert!("-1".parse::<Column>().is_err());
    }
}
