/// The per-rank weight of the Halves counting system.
pub fn weight(rank: u8) -> f64 {
    match rank {
        1 => -1.0,
        2 => 0.5,
        3 => 1.0,
        4 => 1.0,
        5 => 1.5,
        6 => 1.0,
        7 => 0.5,
        8 => 0.0,
        9 => -0.5,
        10 => -1.0,
        _ => panic!("Invalid blackjack rank!"),
    }
}

/// Running Halves count over the cards revealed since the last reshuffle.
///
/// Only publicly visible cards feed the count: the dealer's hole card is
/// observed once, at the moment the round resolves for all player hands.
#[derive(Debug, Clone, Default)]
pub struct HalvesCount {
    running: f64,
}

impl HalvesCount {
    pub fn new() -> HalvesCount {
        HalvesCount { running: 0.0 }
    }

    /// Folds one revealed card into the running count.
    pub fn observe(&mut self, rank: u8) {
        self.running += weight(rank);
    }

    /// Zeroes the count. Called when the shoe is rebuilt.
    pub fn reset(&mut self) {
        self.running = 0.0;
    }

    pub fn running(&self) -> f64 {
        self.running
    }

    /// The running count normalized by remaining decks, rounded up, with a
    /// minimum divisor of one deck.
    pub fn true_count(&self, cards_left: usize) -> f64 {
        let decks_left = (cards_left + 51) / 52;
        self.running / decks_left.max(1) as f64
    }
}
