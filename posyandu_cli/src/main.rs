use clap::{Parser, Subcommand};
use posyandu_core::*;
use std::io;
use std::path::PathBuf;

mod shell;

use shell::Shell;

#[derive(Parser)]
#[command(name = "posyandu")]
#[command(about = "Posyandu child growth monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override export directory
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Do not open the printable report after exporting it
    #[arg(long, global = true)]
    no_open: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (default)
    Shell,

    /// Classify one measurement without starting a session
    Classify {
        /// Age in months
        #[arg(long)]
        age: i64,

        /// Height in cm
        #[arg(long)]
        height: f64,

        /// Weight in kg
        #[arg(long)]
        weight: f64,

        /// Gender (male, female)
        #[arg(long, default_value = "male")]
        gender: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    posyandu_core::logging::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = cli.export_dir {
        config.export.output_dir = dir;
    }
    if cli.no_open {
        config.export.open_report = false;
    }

    match cli.command {
        Some(Commands::Classify {
            age,
            height,
            weight,
            gender,
        }) => cmd_classify(age, height, weight, &gender),
        Some(Commands::Shell) | None => cmd_shell(&config),
    }
}

fn cmd_classify(age: i64, height: f64, weight: f64, gender: &str) -> Result<()> {
    let gender: Gender = gender.parse()?;
    let result = classify(weight, height, age, gender);
    println!("{}", shell::format_classification(&result));
    Ok(())
}

fn cmd_shell(config: &Config) -> Result<()> {
    let app = Posyandu::with_config(config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(app, config.export.clone(), stdin.lock(), stdout.lock());
    shell.run()
}
