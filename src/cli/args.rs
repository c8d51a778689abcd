use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;

#[derive(Parser)]
#[command(name = "breathe")]
#[command(about = "Guided breathing exercises in your terminal")]
#[command(long_about = "breathe - guided breathing exercises in your terminal

Runs timed breathing patterns such as Bhramari, box breathing and 4-7-8,
announcing each phase and counting down the seconds. Sessions are recorded
so you can look back at your practice.

QUICK START:
  breathe list                  Show available exercises
  breathe run box --cycles 4    Four rounds of box breathing
  breathe run --pattern 4-7-8   Ad-hoc pattern
  breathe tui                   Interactive screen

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  breathe <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available exercises
    ///
    /// Shows built-in exercises and any defined in your config file, with
    /// their timing pattern and cycle length.
    ///
    /// # Examples
    ///
    ///   breathe list
    ///   breathe ls -o json
    #[command(alias = "ls")]
    List,

    /// Show the phases of an exercise
    ///
    /// # Examples
    ///
    ///   breathe show bhramari
    ///   breathe show box
    Show {
        /// Exercise slug or alias
        exercise: String,
    },

    /// Run an exercise in the terminal
    ///
    /// Announces each phase and counts down the seconds until the requested
    /// number of cycles is done. Press Ctrl-C to stop early.
    ///
    /// # Examples
    ///
    ///   breathe run                       Default exercise from config
    ///   breathe run relaxing --cycles 4
    ///   breathe run --pattern 4-4-4-4
    ///   breathe run --pattern "inhale:4, hum:6" --mute
    #[command(alias = "r")]
    Run(RunArgs),

    /// Open the interactive practice screen
    ///
    /// Keys: space start/pause, s toggle sound, j/k select exercise, q quit.
    Tui {
        /// Exercise to select initially
        exercise: Option<String>,
    },

    /// Show practice history
    ///
    /// # Examples
    ///
    ///   breathe history
    ///   breathe history --limit 50
    ///   breathe history stats
    #[command(alias = "h")]
    History(HistoryArgs),

    /// Manage the config file
    Config(ConfigArgs),

    /// Generate shell completions
    ///
    /// Example: breathe completions zsh > ~/.zfunc/_breathe
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,

        /// Show installation instructions
        #[arg(long, short = 'i')]
        install: bool,
    },
}

/// Arguments for `breathe run`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Exercise slug or alias (defaults to the configured exercise)
    #[arg(conflicts_with = "pattern")]
    pub exercise: Option<String>,

    /// Ad-hoc pattern such as "4-7-8" or "inhale:4, hold:7, exhale:8"
    #[arg(long, short = 'p')]
    pub pattern: Option<String>,

    /// Number of full cycles (defaults to the configured count)
    #[arg(long, short = 'c', value_parser = clap::value_parser!(u64).range(1..))]
    pub cycles: Option<u64>,

    /// Start without ambient sound
    #[arg(long, short = 'm')]
    pub mute: bool,
}

/// Arguments for `breathe history`.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Maximum number of sessions to show
    #[arg(long, short = 'n', default_value = "10")]
    pub limit: usize,

    #[command(subcommand)]
    pub command: Option<HistoryCommands>,
}

/// History subcommands.
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// Lifetime totals
    Stats,

    /// Delete a recorded session
    Delete {
        /// Session ID
        id: i64,
    },
}

/// Arguments for `breathe config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_list_command() {
        let cli = Cli::try_parse_from(["breathe", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List));
        assert!(matches!(cli.output, OutputFormat::Pretty));
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.log_format, LogFormat::Human);
    }

    #[test]
    fn test_cli_list_alias() {
        let cli = Cli::try_parse_from(["breathe", "ls"]).unwrap();
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_cli_output_format_json() {
        let cli = Cli::try_parse_from(["breathe", "--output", "json", "list"]).unwrap();
        assert!(matches!(cli.output, OutputFormat::Json));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["breathe", "list", "-o", "json", "-vv", "--log-format", "json"])
                .unwrap();
        assert!(matches!(cli.output, OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_cli_show_command() {
        let cli = Cli::try_parse_from(["breathe", "show", "box"]).unwrap();
        if let Commands::Show { exercise } = cli.command {
            assert_eq!(exercise, "box");
        } else {
            panic!("Expected Show command");
        }
    }

    #[test]
    fn test_cli_run_defaults() {
        let cli = Cli::try_parse_from(["breathe", "run"]).unwrap();
        if let Commands::Run(args) = cli.command {
            assert!(args.exercise.is_none());
            assert!(args.pattern.is_none());
            assert!(args.cycles.is_none());
            assert!(!args.mute);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_run_with_options() {
        let cli =
            Cli::try_parse_from(["breathe", "run", "relaxing", "--cycles", "4", "--mute"]).unwrap();
        if let Commands::Run(args) = cli.command {
            assert_eq!(args.exercise.as_deref(), Some("relaxing"));
            assert_eq!(args.cycles, Some(4));
            assert!(args.mute);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_run_pattern() {
        let cli = Cli::try_parse_from(["breathe", "r", "-p", "4-7-8"]).unwrap();
        if let Commands::Run(args) = cli.command {
            assert_eq!(args.pattern.as_deref(), Some("4-7-8"));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_run_exercise_conflicts_with_pattern() {
        assert!(Cli::try_parse_from(["breathe", "run", "box", "--pattern", "4-4"]).is_err());
    }

    #[test]
    fn test_cli_run_zero_cycles_rejected() {
        assert!(Cli::try_parse_from(["breathe", "run", "--cycles", "0"]).is_err());
    }

    #[test]
    fn test_cli_tui() {
        let cli = Cli::try_parse_from(["breathe", "tui", "bee"]).unwrap();
        if let Commands::Tui { exercise } = cli.command {
            assert_eq!(exercise.as_deref(), Some("bee"));
        } else {
            panic!("Expected Tui command");
        }
    }

    #[test]
    fn test_cli_history() {
        let cli = Cli::try_parse_from(["breathe", "history", "--limit", "3"]).unwrap();
        if let Commands::History(args) = cli.command {
            assert_eq!(args.limit, 3);
            assert!(args.command.is_none());
        } else {
            panic!("Expected History command");
        }

        let cli = Cli::try_parse_from(["breathe", "history", "stats"]).unwrap();
        if let Commands::History(args) = cli.command {
            assert!(matches!(args.command, Some(HistoryCommands::Stats)));
        } else {
            panic!("Expected History command");
        }
    }

    #[test]
    fn test_cli_config_init_force() {
        let cli = Cli::try_parse_from(["breathe", "config", "init", "--force"]).unwrap();
        if let Commands::Config(args) = cli.command {
            assert!(matches!(args.command, ConfigCommands::Init { force: true }));
        } else {
            panic!("Expected Config command");
        }
    }

    #[test]
    fn test_cli_completions() {
        let cli = Cli::try_parse_from(["breathe", "completions", "zsh"]).unwrap();
        if let Commands::Completions { shell, install } = cli.command {
            assert_eq!(shell, "zsh");
            assert!(!install);
        } else {
            panic!("Expected Completions command");
        }
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["breathe"]).is_err());
    }
}
