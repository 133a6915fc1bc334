use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::counting::HalvesCount;
use crate::hand::Hand;

/// One quarter of a deck in blackjack values: ten, jack, queen and king all
/// collapse to 10.
const QUARTER_DECK: [u8; 13] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];

/// The hands still on the table while a draw is serviced. A reshuffle must
/// keep these cards out of the rebuilt shoe and restore the count of the
/// ones already revealed.
#[derive(Debug, Clone, Copy)]
pub struct LiveRound<'a> {
    pub player_hands: &'a [&'a Hand],
    pub dealer: &'a Hand,
    /// Whether the dealer's hole card has already been revealed and counted.
    pub hole_counted: bool,
}

/// A finite multi-deck shoe. Cards deplete as they are drawn and the shoe is
/// rebuilt to its full composition once it falls below the reshuffle
/// threshold.
#[derive(Debug, Clone)]
pub struct Shoe {
    num_decks: u8,
    reshuffle_threshold: usize,
    cards: Vec<u8>,
}

impl Shoe {
    /// Creates a freshly shuffled shoe of `4 × num_decks` cards per rank.
    pub fn fresh(num_decks: u8, reshuffle_threshold: usize, rng: &mut impl Rng) -> Shoe {
        let mut shoe = Shoe {
            num_decks,
            reshuffle_threshold,
            cards: Vec::new(),
        };
        shoe.rebuild(rng);
        shoe
    }

    /// Restores the full composition and shuffles. The caller is responsible
    /// for resetting the running count alongside.
    pub fn rebuild(&mut self, rng: &mut impl Rng) {
        self.cards.clear();
        self.cards.reserve(self.num_decks as usize * 52);
        for _ in 0..self.num_decks as usize * 4 {
            self.cards.extend_from_slice(&QUARTER_DECK);
        }
        self.cards.shuffle(rng);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// True once the next draw will trigger a reshuffle.
    pub fn needs_shuffle(&self) -> bool {
        self.cards.len() < self.reshuffle_threshold
    }

    /// Draws one card, uniformly at random over the remaining contents.
    ///
    /// If the shoe has fallen below the reshuffle threshold it is rebuilt
    /// first: full composition, count reset to zero, then every card held by
    /// the live hands is removed from the fresh shoe, and the weight of each
    /// such card that has been revealed (all player cards, all dealer cards
    /// except an unrevealed hole card) is credited back to the count. The
    /// reshuffle is count-neutral: cards the player has seen stay seen.
    pub fn draw(&mut self, rng: &mut impl Rng, count: &mut HalvesCount, live: LiveRound<'_>) -> u8 {
        if self.needs_shuffle() {
            debug!(
                "reshuffling with {} cards left (threshold {})",
                self.cards.len(),
                self.reshuffle_threshold
            );
            self.rebuild(rng);
            count.reset();
            for hand in live.player_hands {
                for &card in hand.cards() {
                    self.remove_rank(card);
                    count.observe(card);
                }
            }
            for (i, &card) in live.dealer.cards().iter().enumerate() {
                self.remove_rank(card);
                // The hole card is the dealer's second card; it only rejoins
                // the count once it has been revealed.
                if i != 1 || live.hole_counted {
                    count.observe(card);
                }
            }
        }
        self.cards
            .pop()
            .expect("the reshuffle threshold keeps the shoe non-empty")
    }

    /// Rebuilds the shoe and pins the next draws: `firsts[0]` is dealt
    /// first, and so on. The rest of the shoe stays shuffled. Panics if the
    /// full composition cannot supply the given cards.
    pub fn shuffle_with_firsts(&mut self, firsts: &[u8], rng: &mut impl Rng) {
        self.rebuild(rng);
        for &rank in firsts {
            self.remove_rank(rank);
        }
        // Draws pop from the back, so the pinned cards go there in reverse.
        self.cards.extend(firsts.iter().rev());
    }

    fn remove_rank(&mut self, rank: u8) {
        let pos = self
            .cards
            .iter()
            .position(|&c| c == rank)
            .expect("live cards always fit in a rebuilt shoe");
        self.cards.remove(pos);
    }
}
