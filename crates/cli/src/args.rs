//! Command-line arguments for `farrowline`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use farrowline_breeding::{CycleStatus, EventKind, MatrixStatus, Pregnancy};

#[derive(Parser, Debug)]
#[command(name = "farrowline", version, about = "Swine breeding cycle and gestation tracker")]
pub struct Args {
    /// Directory holding cycles.json and matrices.json (overrides FARROWLINE_DATA_DIR).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Evaluate statuses as of this date (YYYY-MM-DD) instead of the system date.
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register, edit and inspect breeding cycles.
    #[command(subcommand)]
    Cycle(CycleCommand),

    /// Update scheduled management events of a cycle.
    #[command(subcommand)]
    Event(EventCommand),

    /// Record or amend a farrowing outcome.
    #[command(subcommand)]
    Farrow(FarrowCommand),

    /// Gestating cycles with progress and event status.
    Gestation,

    /// Expected farrowings, soonest first.
    Queue,

    /// Herd performance report.
    Report(ReportArgs),

    /// Every cycle of one animal.
    History(HistoryArgs),

    /// Matrix (sow) registry.
    #[command(subcommand)]
    Matrix(MatrixCommand),

    /// Write all cycles to a CSV file.
    Export { path: PathBuf },

    /// Append cycles from a CSV file.
    Import { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PregnancyArg {
    Confirmed,
    NotConfirmed,
}

impl From<PregnancyArg> for Pregnancy {
    fn from(value: PregnancyArg) -> Self {
        match value {
            PregnancyArg::Confirmed => Pregnancy::Confirmed,
            PregnancyArg::NotConfirmed => Pregnancy::NotConfirmed,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct NewCycle {
    /// Animal (matrix) number.
    #[arg(long)]
    pub animal: u32,
    /// First insemination date.
    #[arg(long)]
    pub first: NaiveDate,
    /// Last insemination date.
    #[arg(long)]
    pub last: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    pub batch: String,
    /// Number of doses.
    #[arg(long)]
    pub doses: Option<u32>,
    /// Sire (boar) identifier.
    #[arg(long)]
    pub sire: Option<String>,
    /// Return-to-heat date; derived from the first insemination when not pregnant.
    #[arg(long)]
    pub return_to_heat: Option<NaiveDate>,
    #[arg(long, value_enum, default_value = "confirmed")]
    pub pregnancy: PregnancyArg,
}

/// Fields left out keep their current value.
#[derive(clap::Args, Debug, Default)]
pub struct CycleChanges {
    #[arg(long)]
    pub animal: Option<u32>,
    #[arg(long)]
    pub first: Option<NaiveDate>,
    #[arg(long)]
    pub last: Option<NaiveDate>,
    /// Remove the last insemination date.
    #[arg(long, conflicts_with = "last")]
    pub clear_last: bool,
    #[arg(long)]
    pub batch: Option<String>,
    #[arg(long)]
    pub doses: Option<u32>,
    /// Remove the dose count.
    #[arg(long, conflicts_with = "doses")]
    pub clear_doses: bool,
    #[arg(long)]
    pub sire: Option<String>,
    #[arg(long)]
    pub return_to_heat: Option<NaiveDate>,
    /// Remove the return-to-heat date; a not-pregnant cycle falls back to the derived one.
    #[arg(long, conflicts_with = "return_to_heat")]
    pub clear_return_to_heat: bool,
    #[arg(long, value_enum)]
    pub pregnancy: Option<PregnancyArg>,
}

#[derive(clap::Args, Debug, Default)]
pub struct ListArgs {
    /// Animal number contains this text.
    #[arg(long)]
    pub animal: Option<String>,
    /// Sire contains this text (case-insensitive).
    #[arg(long)]
    pub sire: Option<String>,
    /// LACTATING, EMPTY, PREGNANT or NOT_PREGNANT.
    #[arg(long)]
    pub status: Option<CycleStatus>,
    /// Month (1-12) of the first insemination.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub first_month: Option<u32>,
    /// Month (1-12) of the last insemination.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub last_month: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum CycleCommand {
    /// Register a new cycle.
    Add(NewCycle),
    /// Change the details of a cycle.
    Edit {
        /// Cycle id (or a unique prefix).
        id: String,
        #[command(flatten)]
        changes: CycleChanges,
    },
    /// List cycles, newest registration first.
    List(ListArgs),
    Show {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Delete every cycle.
    Clear {
        /// Required confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    /// Mark an event done (today unless --on is given).
    Complete {
        id: String,
        /// coli1, coli2, deworming or transfer.
        kind: EventKind,
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Mark a done event as pending again.
    Reopen { id: String, kind: EventKind },
    /// Correct the completion date of a done event.
    Date {
        id: String,
        kind: EventKind,
        date: NaiveDate,
    },
    /// Replace the notes of an event.
    Note {
        id: String,
        kind: EventKind,
        text: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct Litter {
    /// Actual farrowing date.
    #[arg(long)]
    pub date: NaiveDate,
    #[arg(long)]
    pub alive: u32,
    #[arg(long, default_value_t = 0)]
    pub stillborn: u32,
    #[arg(long, default_value_t = 0)]
    pub mummified: u32,
    /// Average piglet weight in kg.
    #[arg(long)]
    pub weight: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum FarrowCommand {
    Record {
        id: String,
        #[command(flatten)]
        litter: Litter,
    },
    Amend {
        id: String,
        #[command(flatten)]
        litter: Litter,
    },
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    #[arg(long)]
    pub year: Option<i32>,
    /// Month (1-12) of farrowing.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
    #[arg(long)]
    pub animal: Option<u32>,
    /// Size of the top-by-total-piglets list.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    pub animal: u32,
    /// Only cycles inseminated in this year.
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(clap::Args, Debug, Default)]
pub struct MatrixFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub breed: Option<String>,
    #[arg(long)]
    pub weight: Option<f64>,
    #[arg(long)]
    pub sire: Option<String>,
    #[arg(long)]
    pub dam: Option<String>,
    #[arg(long)]
    pub born: Option<NaiveDate>,
    /// Date the animal entered the herd.
    #[arg(long)]
    pub entered: Option<NaiveDate>,
    /// active, inactive or culled.
    #[arg(long)]
    pub status: Option<MatrixStatus>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum MatrixCommand {
    Add {
        number: u32,
        #[command(flatten)]
        fields: MatrixFields,
    },
    Edit {
        number: u32,
        /// Renumber the matrix.
        #[arg(long)]
        new_number: Option<u32>,
        #[command(flatten)]
        fields: MatrixFields,
    },
    List,
    Remove {
        number: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_cycle_add_with_globals() {
        let args = Args::try_parse_from([
            "farrowline",
            "--today",
            "2024-03-01",
            "cycle",
            "add",
            "--animal",
            "12",
            "--first",
            "2024-01-01",
            "--pregnancy",
            "not-confirmed",
        ])
        .unwrap();
        assert_eq!(args.today, NaiveDate::from_ymd_opt(2024, 3, 1));
        match args.command {
            Command::Cycle(CycleCommand::Add(new)) => {
                assert_eq!(new.animal, 12);
                assert_eq!(new.pregnancy, PregnancyArg::NotConfirmed);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn clear_flags_conflict_with_their_setters() {
        let args = Args::try_parse_from([
            "farrowline", "cycle", "edit", "0190", "--clear-last", "--clear-doses", "--clear-return-to-heat",
        ])
        .unwrap();
        match args.command {
            Command::Cycle(CycleCommand::Edit { changes, .. }) => {
                assert!(changes.clear_last && changes.clear_doses && changes.clear_return_to_heat);
                assert_eq!(changes.last, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(
            Args::try_parse_from(["farrowline", "cycle", "edit", "0190", "--doses", "2", "--clear-doses"]).is_err()
        );
        assert!(
            Args::try_parse_from(["farrowline", "cycle", "edit", "0190", "--last", "2024-01-02", "--clear-last"])
                .is_err()
        );
    }

    #[test]
    fn parses_event_kind_and_status() {
        let args = Args::try_parse_from(["farrowline", "event", "complete", "0190", "transfer"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Event(EventCommand::Complete { kind: EventKind::Transfer, on: None, .. })
        ));

        let args = Args::try_parse_from(["farrowline", "cycle", "list", "--status", "lactating"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Cycle(CycleCommand::List(ListArgs { status: Some(CycleStatus::Lactating), .. }))
        ));

        assert!(Args::try_parse_from(["farrowline", "report", "--month", "13"]).is_err());
    }
}
