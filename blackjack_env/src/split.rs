use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use strum::IntoEnumIterator;

use blackjack_env_macros::open_round;

use crate::counting::HalvesCount;
use crate::hand::{cmp_scores, Hand};
use crate::shoe::{LiveRound, Shoe};
use crate::{Action, EnvError, Rule, Step};

/// Where one player hand stands in its own little state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandStatus {
    Active,
    Stood,
    Doubled,
    /// Busted on a hit; the reward is fixed at -1 on the spot.
    Bust,
    /// Busted on the forced double card; the reward is fixed at -2.
    DoubledBust,
}

impl HandStatus {
    fn is_terminal(self) -> bool {
        self != HandStatus::Active
    }

    fn is_bust(self) -> bool {
        matches!(self, HandStatus::Bust | HandStatus::DoubledBust)
    }
}

/// One player hand together with its status and pending reward.
#[derive(Debug, Clone)]
struct Seat {
    hand: Hand,
    status: HandStatus,
    reward: f64,
}

impl Seat {
    fn new() -> Seat {
        Seat {
            hand: Hand::new(),
            status: HandStatus::Active,
            reward: 0.0,
        }
    }

    fn done(&self) -> bool {
        self.status.is_terminal()
    }

    /// Wager multiplier applied at settlement. Each hand scales only by its
    /// own multiplier, regardless of what the other hand did.
    fn multiplier(&self) -> f64 {
        match self.status {
            HandStatus::Doubled | HandStatus::DoubledBust => 2.0,
            _ => 1.0,
        }
    }
}

/// What the player sees in the split variant. `right_total` is 0 while no
/// split has happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitObservation {
    pub left_total: u8,
    pub left_usable_ace: bool,
    pub right_total: u8,
    pub right_usable_ace: bool,
    pub dealer_up: u8,
    pub split_possible: bool,
    pub true_count: f64,
}

/// The split variant: up to two player hands against one dealer hand,
/// actions stand (0), hit (1), double (2) and a one-shot split (3).
///
/// The left hand is resolved to completion before the right hand begins;
/// the dealer plays once, after both hands are done.
pub struct BlackjackSplitEnv {
    rule: Rule,
    rng: StdRng,
    shoe: Shoe,
    count: HalvesCount,
    left: Seat,
    /// Present only once a split has happened.
    right: Option<Seat>,
    dealer: Hand,
    split_possible: bool,
    hole_counted: bool,
}

impl BlackjackSplitEnv {
    pub fn new(rule: Rule) -> Result<BlackjackSplitEnv, EnvError> {
        Self::from_rng(rule, StdRng::from_entropy())
    }

    pub fn with_seed(rule: Rule, seed: u64) -> Result<BlackjackSplitEnv, EnvError> {
        Self::from_rng(rule, StdRng::seed_from_u64(seed))
    }

    fn from_rng(rule: Rule, mut rng: StdRng) -> Result<BlackjackSplitEnv, EnvError> {
        rule.validate()?;
        let shoe = Shoe::fresh(rule.num_decks, rule.reshuffle_threshold, &mut rng);
        let mut left = Seat::new();
        // No round is open until the first reset.
        left.status = HandStatus::Stood;
        Ok(BlackjackSplitEnv {
            rule,
            rng,
            shoe,
            count: HalvesCount::new(),
            left,
            right: None,
            dealer: Hand::new(),
            split_possible: false,
            hole_counted: false,
        })
    }

    pub fn round_over(&self) -> bool {
        self.done_left() && self.done_right()
    }

    pub fn done_left(&self) -> bool {
        self.left.done()
    }

    /// True when no split has happened, mirroring "nothing left to play".
    pub fn done_right(&self) -> bool {
        self.right.as_ref().map_or(true, Seat::done)
    }

    /// Starts a new round. A split becomes available exactly when the two
    /// starting player cards are a pair.
    pub fn reset(&mut self) -> SplitObservation {
        if self.shoe.needs_shuffle() {
            self.shoe.rebuild(&mut self.rng);
            self.count.reset();
        }
        self.left = Seat::new();
        self.right = None;
        self.dealer.clear();
        self.hole_counted = false;

        let up = self.draw();
        self.dealer.push(up);
        self.count.observe(up);
        let hole = self.draw();
        self.dealer.push(hole);

        for _ in 0..2 {
            let card = self.draw();
            self.left.hand.push(card);
            self.count.observe(card);
        }
        self.split_possible = self.left.hand.is_pair();
        self.observation()
    }

    /// Advances the round by one action. Stand, hit and double target the
    /// first hand that is still playing, left before right.
    #[open_round]
    pub fn step(&mut self, action: Action) -> Result<Step<SplitObservation>, EnvError> {
        match action {
            Action::Split => self.play_split()?,
            Action::Hit => self.play_hit(),
            Action::Stand => self.play_stand(),
            Action::Double => self.play_double(),
        }
        Ok(self.packaged())
    }

    /// The action codes `step` accepts in the current state. Split is
    /// offered only before any other action has been taken on a pair.
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.round_over() {
            return Vec::new();
        }
        Action::iter()
            .filter(|&a| a != Action::Split || self.split_possible)
            .collect()
    }

    pub fn observation(&self) -> SplitObservation {
        let (right_total, right_usable_ace) = match &self.right {
            Some(seat) => (seat.hand.total(), seat.hand.usable_ace()),
            None => (0, false),
        };
        SplitObservation {
            left_total: self.left.hand.total(),
            left_usable_ace: self.left.hand.usable_ace(),
            right_total,
            right_usable_ace,
            dealer_up: self.dealer.cards().first().copied().unwrap_or(0),
            split_possible: self.split_possible,
            true_count: self.count.true_count(self.shoe.len()),
        }
    }

    pub fn count(&self) -> &HalvesCount {
        &self.count
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    /// Moves the second card of the left hand into a fresh right hand and
    /// deals one new card to each. One-shot: never offered again.
    fn play_split(&mut self) -> Result<(), EnvError> {
        if !self.split_possible {
            return Err(EnvError::SplitUnavailable);
        }
        self.split_possible = false;

        let moved = self.left.hand.take_second();
        let mut right = Seat::new();
        right.hand.push(moved);
        // The right seat must exist before the draws so a reshuffle sees its
        // card as live.
        self.right = Some(right);

        let card = self.draw();
        self.count.observe(card);
        self.left.hand.push(card);
        debug!("split: left draws {}", card);

        let card = self.draw();
        self.count.observe(card);
        if let Some(seat) = &mut self.right {
            seat.hand.push(card);
        }
        debug!("split: right draws {}", card);
        Ok(())
    }

    fn play_hit(&mut self) {
        self.split_possible = false;
        let card = self.draw();
        self.count.observe(card);
        let seat = self.active_seat_mut();
        seat.hand.push(card);
        if seat.hand.is_bust() {
            seat.status = HandStatus::Bust;
            seat.reward = -1.0;
        }
        self.resolve_if_settled();
    }

    fn play_stand(&mut self) {
        self.split_possible = false;
        self.active_seat_mut().status = HandStatus::Stood;
        self.resolve_if_settled();
    }

    fn play_double(&mut self) {
        self.split_possible = false;
        let card = self.draw();
        self.count.observe(card);
        let seat = self.active_seat_mut();
        seat.hand.push(card);
        if seat.hand.is_bust() {
            seat.status = HandStatus::DoubledBust;
            seat.reward = -2.0;
        } else {
            seat.status = HandStatus::Doubled;
        }
        self.resolve_if_settled();
    }

    /// Once every hand in play has left `Active`, reveal the hole card, play
    /// the dealer out if at least one hand survived, and settle the
    /// survivors. Bust rewards were fixed at bust time and stay untouched.
    fn resolve_if_settled(&mut self) {
        if !self.round_over() {
            return;
        }
        self.reveal_hole();

        let any_alive = !self.left.status.is_bust()
            || self.right.as_ref().is_some_and(|s| !s.status.is_bust());
        if any_alive {
            self.dealer_playout();
        }

        let dealer_score = self.dealer.score();
        let natural_rule = self.rule.natural;
        Self::settle(&mut self.left, dealer_score, natural_rule);
        if let Some(seat) = &mut self.right {
            Self::settle(seat, dealer_score, natural_rule);
        }
    }

    fn settle(seat: &mut Seat, dealer_score: u8, natural_rule: bool) {
        if seat.status.is_bust() {
            return;
        }
        let mut reward = seat.multiplier() * cmp_scores(seat.hand.score(), dealer_score);
        if natural_rule
            && seat.status == HandStatus::Stood
            && seat.hand.is_natural()
            && reward == 1.0
        {
            reward = 1.5;
        }
        seat.reward = reward;
    }

    fn active_seat_mut(&mut self) -> &mut Seat {
        if !self.left.done() {
            &mut self.left
        } else {
            self.right
                .as_mut()
                .expect("an active seat exists while the round is open")
        }
    }

    fn packaged(&self) -> Step<SplitObservation> {
        let reward = self.left.reward + self.right.as_ref().map_or(0.0, |s| s.reward);
        Step {
            observation: self.observation(),
            reward,
            done: self.round_over(),
        }
    }

    fn draw(&mut self) -> u8 {
        let mut players: Vec<&Hand> = Vec::with_capacity(2);
        players.push(&self.left.hand);
        if let Some(seat) = &self.right {
            players.push(&seat.hand);
        }
        let live = LiveRound {
            player_hands: &players,
            dealer: &self.dealer,
            hole_counted: self.hole_counted,
        };
        self.shoe.draw(&mut self.rng, &mut self.count, live)
    }

    fn reveal_hole(&mut self) {
        if !self.hole_counted {
            let hole = self.dealer.cards()[1];
            self.count.observe(hole);
            self.hole_counted = true;
            debug!("dealer reveals hole card {}", hole);
        }
    }

    fn dealer_playout(&mut self) {
        while self.dealer.total() < 17 {
            let card = self.draw();
            self.dealer.push(card);
            self.count.observe(card);
            debug!("dealer draws {}, total {}", card, self.dealer.total());
        }
    }
}
