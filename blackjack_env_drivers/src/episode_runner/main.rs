use blackjack_env_drivers::parse_config_from_file;
use clap::Parser;

mod simulation;

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack_env.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,
}

fn main() {
    env_logger::init();

    let mut args = CommandLineArgs::parse();
    if args.config == DEFAULT_CONFIG_PATH {
        let home_dir = home::home_dir().expect("Cannot find home directory");
        let config_file_path = home_dir.join(".blackjack_env.yml");
        if !config_file_path.exists() {
            panic!("Config file not exists");
        }
        if config_file_path.is_dir() {
            panic!("This should be a path rather than a directory");
        }
        args.config = String::from(config_file_path.to_str().unwrap());
    }
    let args = args;

    let config = parse_config_from_file(&args.config);
    let rule: blackjack_env::Rule = config.rule.into();
    let variant = config
        .episode_runner
        .variant()
        .expect("Unknown environment variant");

    let result = match variant {
        blackjack_env::Variant::Single => simulation::run_single(rule, &config.episode_runner),
        blackjack_env::Variant::Split => simulation::run_split(rule, &config.episode_runner),
    };
    result.expect("Simulation failed");
}
