//! Depscreen - Main Entry Point
//!
//! ChatGPT dependency screening: train on survey data, assess responses.

use clap::Parser;
use depscreen::cli::{
    cmd_assess, cmd_info, cmd_interactive, cmd_predict, cmd_train, Cli, Commands,
    DEFAULT_MODEL_PATH,
};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "depscreen=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Train {
            data,
            output,
            test_split,
            seed,
            trees,
            max_depth,
            tune,
            cv_folds,
        }) => {
            cmd_train(&data, &output, test_split, seed, trees, max_depth, tune, cv_folds)?;
        }
        Some(Commands::Assess { model, record, chart }) => {
            cmd_assess(&model, &record.to_record()?, chart)?;
        }
        Some(Commands::Predict { model, data, output }) => {
            cmd_predict(&model, &data, output.as_deref())?;
        }
        Some(Commands::Info { data }) => {
            cmd_info(&data)?;
        }
        None => {
            // Default: interactive assessment (matches the survey app behavior)
            cmd_interactive(Path::new(DEFAULT_MODEL_PATH))?;
        }
    }

    Ok(())
}
