/// Identity of one of the two sides.
///
/// The numeric id (1 or 2) and the glyph are what the console layer shows; the
/// engine itself only compares identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum PlayerId {
    #[display("player1")]
    One,
    #[display("player2")]
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// Display glyph used when rendering tokens.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            PlayerId::One => '\u{1F535}',
            PlayerId::Two => '\u{1F534}',
        }
    }
}

/// A token on the board: its owner and where it sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    owner: PlayerId,
    row: u8,
    col: u8,
}

impl Token {
    #[expect(clippy::cast_possible_truncation)]
    pub(crate) const fn new(owner: PlayerId, row: usize, col: usize) -> Self {
        Self {
            owner,
            row: row as u8,
            col: col as u8,
        }
    }

    #[must_use]
    pub const fn owner(self) -> PlayerId {
        self.owner
    }

    #[must_use]
    pub const fn glyph(self) -> char {
        self.owner.glyph()
    }

    /// Zero-based row, 0 is the bottom row.
    #[must_use]
    pub const fn row(self) -> usize {
        self.row as usize
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn col(self) -> usize {
        self.col as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involution() {
        for player in PlayerId::ALL {
            assert_ne!(player, player.opponent());
            assert_eq!(player, player.opponent().opponent());
        }
    }

    #[test]
    fn test_numeric_ids() {
        assert_eq!(PlayerId::One.id(), 1);
        assert_eq!(PlayerId::Two.id(), 2);
        assert_ne!(PlayerId::One.glyph(), PlayerId::Two.glyph());
    }
}
