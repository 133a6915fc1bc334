use std::cmp::Ordering;

/// The ordered ranks dealt to one participant. Ranks are 1 (ace) through 10,
/// with ten-value cards collapsed to 10.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<u8>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(4),
        }
    }

    pub fn push(&mut self, rank: u8) {
        self.cards.push(rank);
    }

    pub fn cards(&self) -> &[u8] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Sum of the hand with every ace counted as 1.
    pub fn raw_sum(&self) -> u8 {
        self.cards.iter().sum()
    }

    /// Whether an ace can be counted as 11 without busting.
    pub fn usable_ace(&self) -> bool {
        self.cards.contains(&1) && self.raw_sum() + 10 <= 21
    }

    /// Hand total with the soft-ace adjustment. The empty hand totals 0.
    pub fn total(&self) -> u8 {
        if self.usable_ace() {
            self.raw_sum() + 10
        } else {
            self.raw_sum()
        }
    }

    pub fn is_bust(&self) -> bool {
        self.total() > 21
    }

    /// Total value for settlement purposes: 0 when bust.
    pub fn score(&self) -> u8 {
        if self.is_bust() {
            0
        } else {
            self.total()
        }
    }

    /// A two-card ace-and-ten hand, in either order.
    pub fn is_natural(&self) -> bool {
        matches!(self.cards.as_slice(), [1, 10] | [10, 1])
    }

    /// A starting pair of equal rank, the precondition for splitting.
    pub fn is_pair(&self) -> bool {
        matches!(self.cards.as_slice(), [a, b] if a == b)
    }

    /// Removes and returns the second card. Used when splitting a pair.
    pub fn take_second(&mut self) -> u8 {
        self.cards.remove(1)
    }
}

/// Three-way comparison of two settlement scores, as a reward: +1.0 when the
/// first wins, -1.0 when it loses, 0.0 on a push.
pub fn cmp_scores(a: u8, b: u8) -> f64 {
    match a.cmp(&b) {
        Ordering::Greater => 1.0,
        Ordering::Equal => 0.0,
        Ordering::Less => -1.0,
    }
}
