//! dotscript CLI - read a script run's saved environment on the build host.

mod env;
mod get;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dotscript")]
#[command(about = "Read the session artifact left by a dotscript run")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the saved environment as KEY=VALUE properties
    Env {
        /// Path to the artifact (jenkinsExecution.json)
        artifact: PathBuf,

        /// Write the properties to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a single saved value
    Get {
        /// Path to the artifact (jenkinsExecution.json)
        artifact: PathBuf,

        /// Key to look up
        key: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Attach recovery hints to dotscript-core errors
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<dotscript_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Env { artifact, output } => {
            env::execute(&artifact, output.as_deref()).map_err(format_error)?;
        }

        Commands::Get { artifact, key } => {
            get::execute(&artifact, &key).map_err(format_error)?;
        }
    }

    Ok(())
}
