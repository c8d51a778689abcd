use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use breathe::cli::args::{Cli, Commands};
use breathe::cli::commands;
use breathe::config::Config;
use breathe::features::practice::PracticeStorage;
use breathe::logging::init_logging;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = match Config::load() {
        Ok(config) => config,
        // Still allow repairing or locating a broken config file
        Err(e) if matches!(cli.command, Commands::Config(_) | Commands::Completions { .. }) => {
            eprintln!("{}: {e}", "warning".yellow().bold());
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };
    config.general.color.apply();
    init_logging(cli.log_format, cli.verbose, config.general.color);

    let format = cli.output;

    let output = match cli.command {
        Commands::List => commands::list(&config, format)?,
        Commands::Show { exercise } => commands::show(&config, &exercise, format)?,
        Commands::Run(args) => commands::run(&args, &config, format)?,
        Commands::Tui { exercise } => {
            let catalog = commands::catalog(&config);
            let storage = if config.practice.record_history {
                Some(PracticeStorage::new()?)
            } else {
                None
            };
            let app = breathe::tui::App::new(
                &catalog,
                Some(
                    exercise
                        .as_deref()
                        .unwrap_or(&config.practice.default_exercise),
                ),
                config.practice.sound_enabled,
                storage,
            )?;
            breathe::tui::run(app)?;
            String::new()
        }
        Commands::History(args) => commands::history(&args, format)?,
        Commands::Config(args) => commands::config(&args.command, &config, format)?,
        Commands::Completions { shell, install } => commands::completions(&shell, install)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
