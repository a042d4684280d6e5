use clap::{Parser, Subcommand};

mod commands;

/// Standardize payee names in transaction exports.
#[derive(Debug, Parser)]
#[command(name = "payscrub", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rewrite the payee column of a transaction file using a rule file.
    Process(commands::ProcessArgs),
    /// Interactively derive new rules from a file's unmapped payee values.
    Derive(commands::DeriveArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse().command {
        Command::Process(args) => commands::process(args),
        Command::Derive(args) => commands::derive(args),
    }
}
