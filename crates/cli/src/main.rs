mod args;
mod commands;
mod render;

use anyhow::Context;
use clap::Parser;

use farrowline_breeding::{BreedingCycle, Matrix};
use farrowline_core::{Clock, SystemClock};
use farrowline_infra::{Config, Herd, JsonFileStore};

use crate::args::{Args, Command};
use crate::commands::Output;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env().context("reading configuration")?;
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }
    farrowline_observability::init(config.log_format);

    let pinned = args.today;
    if let Some(today) = pinned {
        tracing::debug!(%today, "evaluating as of pinned date");
    }
    let clock = move || pinned.unwrap_or_else(|| SystemClock.today());

    let mut herd: Herd<JsonFileStore<BreedingCycle>, JsonFileStore<Matrix>> = Herd::open(
        JsonFileStore::new(config.cycles_path()),
        JsonFileStore::new(config.matrices_path()),
        clock,
    )
    .with_context(|| format!("opening data in {}", config.data_dir().display()))?;

    let out = Output { json: args.json };
    match args.command {
        Command::Cycle(command) => commands::cycle(&mut herd, command, out),
        Command::Event(command) => commands::event(&mut herd, command, out),
        Command::Farrow(command) => commands::farrow(&mut herd, command, out),
        Command::Gestation => commands::gestation(&herd, out),
        Command::Queue => commands::queue(&herd, out),
        Command::Report(report) => commands::report(&herd, report, out),
        Command::History(history) => commands::history(&herd, history, out),
        Command::Matrix(command) => commands::matrix(&mut herd, command, out),
        Command::Export { path } => commands::export(&herd, &path, out),
        Command::Import { path } => commands::import(&mut herd, &path, out),
    }
}
