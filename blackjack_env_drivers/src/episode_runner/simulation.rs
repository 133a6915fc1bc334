use std::println;

use self::private::Tally;
use blackjack_env::{Action, BlackjackEnv, BlackjackSplitEnv, EnvError, Rule};
use blackjack_env_drivers::ConfigEpisodeRunner;
use log::info;

mod private {
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Tally {
        episodes: u64,
        wins: u64,
        pushes: u64,
        losses: u64,
        total_reward: f64,
    }

    impl Tally {
        pub fn record(&mut self, reward: f64) {
            self.episodes += 1;
            self.total_reward += reward;
            if reward > 0.0 {
                self.wins += 1;
            } else if reward < 0.0 {
                self.losses += 1;
            } else {
                self.pushes += 1;
            }
        }

        pub fn get_episodes(&self) -> u64 {
            self.episodes
        }

        pub fn get_wins(&self) -> u64 {
            self.wins
        }

        pub fn get_pushes(&self) -> u64 {
            self.pushes
        }

        pub fn get_losses(&self) -> u64 {
            self.losses
        }

        pub fn get_total_reward(&self) -> f64 {
            self.total_reward
        }

        pub fn get_mean_reward(&self) -> f64 {
            self.total_reward / self.episodes as f64
        }
    }
}

/// Plays the single-hand environment with a fixed hit-below-17 policy.
pub fn run_single(rule: Rule, config: &ConfigEpisodeRunner) -> Result<(), EnvError> {
    let mut env = match config.seed {
        Some(seed) => BlackjackEnv::with_seed(rule, seed)?,
        None => BlackjackEnv::new(rule)?,
    };

    let mut tally = Tally::default();
    for episode in 0..config.episodes {
        let mut obs = env.reset();
        let reward = loop {
            let action = if obs.player_total < 17 {
                Action::Hit
            } else {
                Action::Stand
            };
            let step = env.step(action)?;
            if step.done {
                break step.reward;
            }
            obs = step.observation;
        };
        info!("episode {} finished with reward {}", episode, reward);
        tally.record(reward);
    }

    print_summary("single", &tally);
    Ok(())
}

/// Plays the split environment: always split a pair, then hit below 17 on
/// whichever hand is in play.
pub fn run_split(rule: Rule, config: &ConfigEpisodeRunner) -> Result<(), EnvError> {
    let mut env = match config.seed {
        Some(seed) => BlackjackSplitEnv::with_seed(rule, seed)?,
        None => BlackjackSplitEnv::new(rule)?,
    };

    let mut tally = Tally::default();
    for episode in 0..config.episodes {
        let mut obs = env.reset();
        let reward = loop {
            let action = if env.legal_actions().contains(&Action::Split) {
                Action::Split
            } else {
                let total = if !env.done_left() {
                    obs.left_total
                } else {
                    obs.right_total
                };
                if total < 17 {
                    Action::Hit
                } else {
                    Action::Stand
                }
            };
            let step = env.step(action)?;
            if step.done {
                break step.reward;
            }
            obs = step.observation;
        };
        info!("episode {} finished with reward {}", episode, reward);
        tally.record(reward);
    }

    print_summary("split", &tally);
    Ok(())
}

fn print_summary(variant: &str, tally: &Tally) {
    println!("Variant: {}", variant);
    println!("Episodes: {}", tally.get_episodes());
    println!(
        "Wins: {}. Pushes: {}. Losses: {}.",
        tally.get_wins(),
        tally.get_pushes(),
        tally.get_losses(),
    );
    println!(
        "Total reward: {:.1}. Mean reward: {:.4}.",
        tally.get_total_reward(),
        tally.get_mean_reward(),
    );
}
