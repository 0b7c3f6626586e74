//! celc - contract expression compiler front end

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{check, parse, resolve};

#[derive(Parser)]
#[command(name = "celc")]
#[command(about = "Contract expression compiler", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an expression and print its tree
    Parse {
        /// Contract expression
        expression: String,

        /// Line of the expression in its host file
        #[arg(long)]
        line: Option<u32>,

        /// Column of the expression in its host file
        #[arg(long, requires = "line", default_value = "0")]
        column: u32,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile an expression and resolve its literal and exception types
    Check {
        /// Contract expression
        expression: String,

        /// Class directory, searched before configured ones
        #[arg(long = "classpath", short = 'c')]
        classpath: Vec<PathBuf>,
    },

    /// Resolve a class by binary name and print its hierarchy
    Resolve {
        /// Binary class name, e.g. java.lang.String or [[I
        name: String,

        /// Class directory, searched before configured ones
        #[arg(long = "classpath", short = 'c')]
        classpath: Vec<PathBuf>,
    },
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug);

    let config = config::load_config(cli.config)?;

    let output = match cli.command {
        Commands::Parse {
            expression,
            line,
            column,
            json,
        } => {
            let options = parse::ParseOptions { line, column, json };
            parse::render(&expression, &options, &config)?
        }
        Commands::Check {
            expression,
            classpath,
        } => check::render(&expression, &classpath, &config)?,
        Commands::Resolve { name, classpath } => resolve::render(&name, &classpath, &config)?,
    };
    println!("{output}");
    Ok(())
}
