use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use strum::IntoEnumIterator;

use blackjack_env_macros::open_round;

use crate::counting::HalvesCount;
use crate::hand::{cmp_scores, Hand};
use crate::shoe::{LiveRound, Shoe};
use crate::{Action, EnvError, Rule, Step};

/// What the player is allowed to see after each transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub player_total: u8,
    /// The dealer's single shown card rank; the hole card stays hidden.
    pub dealer_up: u8,
    pub usable_ace: bool,
    /// Running Halves count normalized by remaining decks.
    pub true_count: f64,
}

/// The single-hand environment: one player hand against the dealer, actions
/// stand (0), hit (1) and double (2).
///
/// A round is opened with `reset` and advanced with `step` until `done`.
pub struct BlackjackEnv {
    rule: Rule,
    rng: StdRng,
    shoe: Shoe,
    count: HalvesCount,
    player: Hand,
    dealer: Hand,
    done: bool,
    hole_counted: bool,
}

impl BlackjackEnv {
    pub fn new(rule: Rule) -> Result<BlackjackEnv, EnvError> {
        Self::from_rng(rule, StdRng::from_entropy())
    }

    /// A seeded environment replays the same draw sequence for the same
    /// action sequence.
    pub fn with_seed(rule: Rule, seed: u64) -> Result<BlackjackEnv, EnvError> {
        Self::from_rng(rule, StdRng::seed_from_u64(seed))
    }

    fn from_rng(rule: Rule, mut rng: StdRng) -> Result<BlackjackEnv, EnvError> {
        rule.validate()?;
        let shoe = Shoe::fresh(rule.num_decks, rule.reshuffle_threshold, &mut rng);
        Ok(BlackjackEnv {
            rule,
            rng,
            shoe,
            count: HalvesCount::new(),
            player: Hand::new(),
            dealer: Hand::new(),
            // No round is open until the first reset.
            done: true,
            hole_counted: false,
        })
    }

    pub fn round_over(&self) -> bool {
        self.done
    }

    /// Starts a new round: two dealer cards (up-card counted, hole card
    /// hidden), then two player cards (both counted).
    pub fn reset(&mut self) -> Observation {
        if self.shoe.needs_shuffle() {
            self.shoe.rebuild(&mut self.rng);
            self.count.reset();
        }
        self.player.clear();
        self.dealer.clear();
        self.done = false;
        self.hole_counted = false;

        let up = self.draw();
        self.dealer.push(up);
        self.count.observe(up);
        let hole = self.draw();
        self.dealer.push(hole);

        for _ in 0..2 {
            let card = self.draw();
            self.player.push(card);
            self.count.observe(card);
        }
        self.observation()
    }

    /// Advances the round by one action.
    #[open_round]
    pub fn step(&mut self, action: Action) -> Result<Step<Observation>, EnvError> {
        match action {
            Action::Hit => {
                let card = self.draw();
                self.player.push(card);
                self.count.observe(card);
                debug!("player hits {}, total {}", card, self.player.total());
                let reward = if self.player.is_bust() {
                    self.done = true;
                    self.reveal_hole();
                    -1.0
                } else {
                    0.0
                };
                Ok(self.packaged(reward))
            }
            Action::Stand => {
                self.done = true;
                self.reveal_hole();
                self.dealer_playout();
                let mut reward = cmp_scores(self.player.score(), self.dealer.score());
                if self.rule.natural && self.player.is_natural() && reward == 1.0 {
                    reward = 1.5;
                }
                Ok(self.packaged(reward))
            }
            Action::Double => {
                // One forced card, then the hand is over either way.
                let card = self.draw();
                self.player.push(card);
                self.count.observe(card);
                debug!("player doubles into {}, total {}", card, self.player.total());
                self.done = true;
                self.reveal_hole();
                let reward = if self.player.is_bust() {
                    -2.0
                } else {
                    self.dealer_playout();
                    2.0 * cmp_scores(self.player.score(), self.dealer.score())
                };
                Ok(self.packaged(reward))
            }
            Action::Split => Err(EnvError::InvalidAction(Action::Split as u8)),
        }
    }

    /// The action codes `step` accepts in the current state.
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.done {
            return Vec::new();
        }
        Action::iter().filter(|&a| a != Action::Split).collect()
    }

    pub fn observation(&self) -> Observation {
        Observation {
            player_total: self.player.total(),
            dealer_up: self.dealer.cards().first().copied().unwrap_or(0),
            usable_ace: self.player.usable_ace(),
            true_count: self.count.true_count(self.shoe.len()),
        }
    }

    pub fn count(&self) -> &HalvesCount {
        &self.count
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    fn packaged(&self, reward: f64) -> Step<Observation> {
        Step {
            observation: self.observation(),
            reward,
            done: self.done,
        }
    }

    fn draw(&mut self) -> u8 {
        let players = [&self.player];
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

    /// Fixed dealer policy: hit below 17, stand at 17 or more.
    fn dealer_playout(&mut self) {
        while self.dealer.total() < 17 {
            let card = self.draw();
            self.dealer.push(card);
            self.count.observe(card);
            debug!("dealer draws {}, total {}", card, self.dealer.total());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_firsts(rule: Rule, firsts: &[u8]) -> BlackjackEnv {
        let mut env = BlackjackEnv::with_seed(rule, 7).unwrap();
        env.shoe.shuffle_with_firsts(firsts, &mut env.rng);
        env
    }

    #[test]
    fn reset_deals_dealer_then_player() {
        let mut env = env_with_firsts(Rule::default(), &[6, 10, 10, 9]);
        let obs = env.reset();
        assert_eq!(env.dealer.cards(), &[6, 10]);
        assert_eq!(env.player.cards(), &[10, 9]);
        assert_eq!(obs.player_total, 19);
        assert_eq!(obs.dealer_up, 6);
        assert!(!obs.usable_ace);
        assert!(!env.round_over());
    }

    #[test]
    fn reset_counts_only_the_revealed_cards() {
        let mut env = env_with_firsts(Rule::default(), &[6, 10, 10, 9]);
        env.reset();
        // up-card 6, player 10 and 9; hole card 10 stays hidden
        let expected = crate::weight(6) + crate::weight(10) + crate::weight(9);
        assert!((env.count.running() - expected).abs() < 1e-9);
    }

    #[test]
    fn natural_stand_pays_one_and_a_half() {
        let rule = Rule {
            natural: true,
            ..Rule::default()
        };
        // dealer [6, 10] = 16 hits into a 10 and busts; player holds a natural
        let mut env = env_with_firsts(rule, &[6, 10, 10, 1, 10]);
        let obs = env.reset();
        assert_eq!(obs.player_total, 21);
        assert!(obs.usable_ace);

        let step = env.step(Action::Stand).unwrap();
        assert_eq!(step.reward, 1.5);
        assert!(step.done);
    }

    #[test]
    fn natural_pays_even_money_when_flag_is_off() {
        let mut env = env_with_firsts(Rule::default(), &[6, 10, 10, 1, 10]);
        env.reset();
        let step = env.step(Action::Stand).unwrap();
        assert_eq!(step.reward, 1.0);
    }

    #[test]
    fn dealer_outdraws_a_standing_nineteen() {
        // dealer [10, 4] = 14 draws the pinned 6 for 20 against player 19
        let mut env = env_with_firsts(Rule::default(), &[10, 4, 10, 9, 6]);
        env.reset();
        let step = env.step(Action::Stand).unwrap();
        assert_eq!(env.dealer.cards(), &[10, 4, 6]);
        assert_eq!(step.reward, -1.0);
        assert!(step.done);
    }

    #[test]
    fn double_draws_exactly_one_card_and_ends_the_round() {
        // dealer [10, 10] stands pat on 20; player [5, 6] doubles into a 2
        let mut env = env_with_firsts(Rule::default(), &[10, 10, 5, 6, 2]);
        env.reset();
        let step = env.step(Action::Double).unwrap();
        // 13 is below 17 and the round still ends: no further hits
        assert_eq!(env.player.cards(), &[5, 6, 2]);
        assert_eq!(step.observation.player_total, 13);
        assert!(step.done);
        assert_eq!(step.reward, -2.0);
    }

    #[test]
    fn double_bust_loses_two() {
        // player [10, 9] doubles into a 10 and busts; dealer never plays
        let mut env = env_with_firsts(Rule::default(), &[10, 10, 10, 9, 10]);
        env.reset();
        let step = env.step(Action::Double).unwrap();
        assert!(env.player.is_bust());
        assert_eq!(step.reward, -2.0);
        assert_eq!(env.dealer.len(), 2);
    }

    #[test]
    fn hit_bust_reveals_the_hole_card_once() {
        // player [10, 9] hits a 5 for 24
        let mut env = env_with_firsts(Rule::default(), &[10, 10, 10, 9, 5]);
        env.reset();
        let step = env.step(Action::Hit).unwrap();
        assert_eq!(step.reward, -1.0);
        assert!(step.done);
        // up 10, player 10+9, hit 5, hole 10 — counted exactly once
        let expected = crate::weight(10) * 3.0 + crate::weight(9) + crate::weight(5);
        assert!((env.count.running() - expected).abs() < 1e-9);
    }

    #[test]
    fn hit_below_bust_keeps_the_round_open() {
        // player [5, 6] hits a 2
        let mut env = env_with_firsts(Rule::default(), &[10, 10, 5, 6, 2]);
        env.reset();
        let step = env.step(Action::Hit).unwrap();
        assert_eq!(step.reward, 0.0);
        assert!(!step.done);
        assert_eq!(step.observation.player_total, 13);
        assert!(!env.hole_counted);
    }

    #[test]
    fn split_is_not_a_legal_action_here() {
        let mut env = env_with_firsts(Rule::default(), &[10, 10, 8, 8]);
        env.reset();
        assert_eq!(
            env.step(Action::Split),
            Err(EnvError::InvalidAction(Action::Split as u8))
        );
        assert_eq!(
            env.legal_actions(),
            vec![Action::Stand, Action::Hit, Action::Double]
        );
    }

    #[test]
    fn stepping_a_finished_round_is_rejected() {
        let mut env = env_with_firsts(Rule::default(), &[10, 10, 10, 9, 10]);
        env.reset();
        env.step(Action::Stand).unwrap();
        assert_eq!(env.step(Action::Hit), Err(EnvError::RoundOver));
        assert!(env.legal_actions().is_empty());
    }

    #[test]
    fn stepping_before_the_first_reset_is_rejected() {
        let mut env = BlackjackEnv::with_seed(Rule::default(), 7).unwrap();
        assert_eq!(env.step(Action::Hit), Err(EnvError::RoundOver));
    }

    #[test]
    fn identical_seeds_replay_identical_trajectories() {
        let rule = Rule {
            num_decks: 2,
            ..Rule::default()
        };
        let mut a = BlackjackEnv::with_seed(rule, 42).unwrap();
        let mut b = BlackjackEnv::with_seed(rule, 42).unwrap();
        for _ in 0..200 {
            let obs_a = a.reset();
            let obs_b = b.reset();
            assert_eq!(obs_a, obs_b);
            loop {
                let action = if a.observation().player_total < 17 {
                    Action::Hit
                } else {
                    Action::Stand
                };
                let step_a = a.step(action).unwrap();
                let step_b = b.step(action).unwrap();
                assert_eq!(step_a, step_b);
                if step_a.done {
                    break;
                }
            }
        }
    }

    #[test]
    fn observation_normalizes_the_count_by_remaining_decks() {
        let mut env = env_with_firsts(Rule::default(), &[6, 10, 10, 9]);
        env.reset();
        let obs = env.observation();
        let expected = env.count.running() / 6.0; // 308 cards left, 6 decks
        assert!((obs.true_count - expected).abs() < 1e-9);
    }
}
