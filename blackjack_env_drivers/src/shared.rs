use blackjack_env;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rule: ConfigRule,
    pub episode_runner: ConfigEpisodeRunner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRule {
    pub num_decks: u8,
    pub reshuffle_threshold: usize,
    pub natural: bool,
}

impl From<ConfigRule> for blackjack_env::Rule {
    fn from(config_rule: ConfigRule) -> blackjack_env::Rule {
        blackjack_env::Rule {
            num_decks: config_rule.num_decks,
            reshuffle_threshold: config_rule.reshuffle_threshold,
            natural: config_rule.natural,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEpisodeRunner {
    pub variant: String,
    pub episodes: u64,
    pub seed: Option<u64>,
}

impl ConfigEpisodeRunner {
    pub fn variant(&self) -> Result<blackjack_env::Variant, serde::de::value::Error> {
        self.variant.parse()
    }
}

/// Reads the content of a given config file and parses it to a Config.
///
/// Panics if any error occurs.
pub fn parse_config_from_file(filename: &str) -> Config {
    let file_content = fs::read_to_string(filename).unwrap();
    serde_yaml::from_str(&file_content).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_typical_config() -> Config {
        Config {
            rule: ConfigRule {
                num_decks: 6,
                reshuffle_threshold: 15,
                natural: true,
            },
            episode_runner: ConfigEpisodeRunner {
                variant: String::from("Single"),
                episodes: 1000,
                seed: Some(42),
            },
        }
    }

    #[test]
    fn can_convert_rule() {
        let config = get_typical_config();
        let converted_rule: blackjack_env::Rule = config.rule.into();
        assert_eq!(converted_rule.num_decks, 6);
        assert_eq!(converted_rule.reshuffle_threshold, 15);
        assert!(converted_rule.natural);
    }

    #[test]
    fn can_parse_variant() {
        let mut config = get_typical_config();
        assert_eq!(
            config.episode_runner.variant().unwrap(),
            blackjack_env::Variant::Single
        );
        config.episode_runner.variant = String::from("Split");
        assert_eq!(
            config.episode_runner.variant().unwrap(),
            blackjack_env::Variant::Split
        );
    }

    #[test]
    fn should_return_error_for_unknown_variant() {
        let mut config = get_typical_config();
        config.episode_runner.variant = String::from("Not a variant");
        assert!(config.episode_runner.variant().is_err());
    }

    #[test]
    fn can_parse_yaml_config() {
        let yaml = "\
rule:
  num_decks: 2
  reshuffle_threshold: 20
  natural: false
episode_runner:
  variant: Split
  episodes: 500
  seed: 7
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rule.num_decks, 2);
        assert_eq!(config.episode_runner.episodes, 500);
        assert_eq!(config.episode_runner.seed, Some(7));
        assert_eq!(
            config.episode_runner.variant().unwrap(),
            blackjack_env::Variant::Split
        );
    }
}
