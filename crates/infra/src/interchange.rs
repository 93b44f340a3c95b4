//! Bulk CSV interchange of breeding cycles.
//!
//! Fixed 20-column layout with Portuguese headers, `DD/MM/YYYY` dates, `-` for
//! absent values and `SIM`/`NÃO` flags. The format is lossy: event completion
//! dates are not exported, so an imported completed event is dated on its
//! expected date. The piglet total column is written for readers but ignored
//! on import, since it is always derived from the three counts.

use std::fs::File;
use std::io;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use farrowline_breeding::{
    BreedingCycle, CompleteEvent, CycleCommand, CycleDetails, EventKind, FarrowingOutcome,
    Pregnancy, RecordFarrowing, RegisterCycle,
};
use farrowline_core::calendar::{format_br_date, parse_br_date};
use farrowline_core::{Aggregate, CycleId, DomainError};

pub const HEADERS: [&str; 20] = [
    "Lote",
    "Nº Matriz",
    "1º Dia Inseminação",
    "Último Dia Inseminação",
    "Parto Previsto",
    "Gestante",
    "Parto Registrado",
    "1ª Coli Prevista",
    "1ª Coli Realizada",
    "2ª Coli Prevista",
    "2ª Coli Realizada",
    "Vermifugação Prevista",
    "Vermifugação Realizada",
    "Transferência Prevista",
    "Transferência Realizada",
    "Data Real Parto",
    "Nascidos Vivos",
    "Natimortos",
    "Mumificados",
    "Total Leitões",
];

const YES: &str = "SIM";
const NO: &str = "NÃO";
const ABSENT: &str = "-";

const COL_BATCH: usize = 0;
const COL_ANIMAL: usize = 1;
const COL_FIRST: usize = 2;
const COL_LAST: usize = 3;
const COL_PREGNANT: usize = 5;
const COL_FARROWED: usize = 6;
const COL_ACTUAL: usize = 15;
const COL_BORN_ALIVE: usize = 16;
const COL_STILLBORN: usize = 17;
const COL_MUMMIFIED: usize = 18;

/// Column holding the completion flag of each event kind (the expected date sits one to the left).
fn completion_column(kind: EventKind) -> usize {
    match kind {
        EventKind::FirstAntibiotic => 8,
        EventKind::SecondAntibiotic => 10,
        EventKind::Deworming => 12,
        EventKind::Transfer => 14,
    }
}

#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A row that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the file (the header is line 1).
    pub line: u64,
    pub reason: String,
}

impl core::fmt::Display for RowError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

#[derive(Debug)]
pub struct ImportReport {
    pub cycles: Vec<BreedingCycle>,
    pub rejected: Vec<RowError>,
}

fn flag(value: bool) -> &'static str {
    if value { YES } else { NO }
}

fn count(value: Option<u32>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |n| n.to_string())
}

fn export_row(cycle: &BreedingCycle) -> Vec<String> {
    let schedule = cycle.management_schedule();
    let outcome = cycle.farrowing_outcome();
    let confirmed = cycle.pregnancy().is_confirmed();

    let mut row = vec![
        cycle.batch_label().to_string(),
        cycle.animal_number().to_string(),
        format_br_date(Some(cycle.first_insemination_date())),
        format_br_date(cycle.last_insemination_date()),
        format_br_date(confirmed.then(|| cycle.expected_farrowing_date())),
        flag(confirmed).to_string(),
        flag(outcome.is_some()).to_string(),
    ];
    for kind in EventKind::ALL {
        let event = schedule.map(|s| s.get(kind));
        row.push(format_br_date(event.map(|e| e.expected_date())));
        row.push(flag(event.is_some_and(|e| e.is_completed())).to_string());
    }
    row.push(format_br_date(outcome.map(|o| o.actual_date)));
    row.push(count(outcome.map(|o| o.born_alive)));
    row.push(count(outcome.map(|o| o.stillborn)));
    row.push(count(outcome.map(|o| o.mummified)));
    row.push(count(outcome.map(|o| o.total_piglets())));
    row
}

/// Write `cycles` as CSV, header first.
pub fn export_cycles<W: io::Write>(cycles: &[BreedingCycle], writer: W) -> Result<(), InterchangeError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADERS)?;
    for cycle in cycles {
        csv_writer.write_record(export_row(cycle))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_to_path(cycles: &[BreedingCycle], path: &Path) -> Result<(), InterchangeError> {
    export_cycles(cycles, File::create(path)?)?;
    tracing::info!(path = %path.display(), count = cycles.len(), "exported cycles");
    Ok(())
}

/// Parse CSV rows into new cycles (fresh ids, `registered_at` for all).
///
/// Bad rows are collected in [`ImportReport::rejected`]; the remaining rows
/// are still imported. Only unreadable input fails the whole import.
pub fn import_cycles<R: io::Read>(
    mut reader: R,
    registered_at: DateTime<Utc>,
) -> Result<ImportReport, InterchangeError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    let lines = LineIndex::new(&input);
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_slice());

    let mut report = ImportReport {
        cycles: Vec::new(),
        rejected: Vec::new(),
    };
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| lines.line_of(p.byte()));
        if record.iter().all(str::is_empty) {
            continue;
        }
        match import_row(&record, registered_at) {
            Ok(cycle) => report.cycles.push(cycle),
            Err(reason) => {
                tracing::warn!(line, reason = %reason, "rejected import row");
                report.rejected.push(RowError { line, reason });
            }
        }
    }
    Ok(report)
}

/// Byte offsets of every newline, for mapping a record start to its
/// physical line. The csv reader's own line counter skips blank lines.
struct LineIndex(Vec<u64>);

impl LineIndex {
    fn new(input: &[u8]) -> Self {
        Self(
            input
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == b'\n')
                .map(|(i, _)| i as u64)
                .collect(),
        )
    }

    /// 1-based line holding `byte`.
    fn line_of(&self, byte: u64) -> u64 {
        self.0.partition_point(|&nl| nl < byte) as u64 + 1
    }
}

pub fn import_from_path(path: &Path, registered_at: DateTime<Utc>) -> Result<ImportReport, InterchangeError> {
    import_cycles(File::open(path)?, registered_at)
}

fn column<'r>(record: &'r csv::StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("")
}

fn is_absent(value: &str) -> bool {
    value.is_empty() || value == ABSENT
}

fn is_yes(value: &str) -> bool {
    value.eq_ignore_ascii_case(YES)
}

fn parse_pregnancy(value: &str) -> Result<Pregnancy, String> {
    if is_yes(value) {
        return Ok(Pregnancy::Confirmed);
    }
    match value.to_uppercase().as_str() {
        "NÃO" | "NAO" => Ok(Pregnancy::NotConfirmed),
        other => Err(format!("invalid pregnancy flag '{other}' (expected SIM or NÃO)")),
    }
}

fn parse_date(record: &csv::StringRecord, index: usize) -> Result<Option<NaiveDate>, String> {
    parse_br_date(column(record, index))
        .map_err(|e| format!("{}: {}", HEADERS[index], reason(e)))
}

fn parse_count(record: &csv::StringRecord, index: usize) -> Result<u32, String> {
    let raw = column(record, index);
    if is_absent(raw) {
        return Ok(0);
    }
    raw.parse::<u32>()
        .map_err(|_| format!("{}: invalid count '{raw}'", HEADERS[index]))
}

fn reason(error: DomainError) -> String {
    match error {
        DomainError::Validation(msg)
        | DomainError::InvariantViolation(msg)
        | DomainError::InvalidId(msg)
        | DomainError::Conflict(msg) => msg,
        DomainError::NotFound => "not found".to_string(),
    }
}

fn import_row(record: &csv::StringRecord, registered_at: DateTime<Utc>) -> Result<BreedingCycle, String> {
    let raw_animal = column(record, COL_ANIMAL);
    let animal_number = raw_animal
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| format!("invalid animal number '{raw_animal}'"))?;
    let first = parse_date(record, COL_FIRST)?
        .ok_or_else(|| "missing first insemination date".to_string())?;
    let pregnancy = parse_pregnancy(column(record, COL_PREGNANT))?;

    let mut details = CycleDetails::new(animal_number, first, pregnancy);
    details.batch_label = column(record, COL_BATCH).to_string();
    details.last_insemination_date = parse_date(record, COL_LAST)?;

    let cycle_id = CycleId::new();
    let mut cycle = BreedingCycle::empty(cycle_id);
    cycle
        .execute(&CycleCommand::RegisterCycle(RegisterCycle {
            cycle_id,
            details,
            registered_at,
        }))
        .map_err(reason)?;

    let completed: Vec<(EventKind, NaiveDate)> = cycle
        .management_schedule()
        .map(|schedule| {
            schedule
                .iter()
                .filter(|event| is_yes(column(record, completion_column(event.kind()))))
                .map(|event| (event.kind(), event.expected_date()))
                .collect()
        })
        .unwrap_or_default();
    for (kind, expected_date) in completed {
        cycle
            .execute(&CycleCommand::CompleteEvent(CompleteEvent {
                cycle_id,
                kind,
                completed_on: expected_date,
            }))
            .map_err(reason)?;
    }

    if is_yes(column(record, COL_FARROWED)) {
        if let Some(actual_date) = parse_date(record, COL_ACTUAL)? {
            let outcome = FarrowingOutcome::new(
                actual_date,
                parse_count(record, COL_BORN_ALIVE)?,
                parse_count(record, COL_STILLBORN)?,
                parse_count(record, COL_MUMMIFIED)?,
            );
            cycle
                .execute(&CycleCommand::RecordFarrowing(RecordFarrowing {
                    cycle_id,
                    outcome,
                    recorded_on: actual_date,
                }))
                .map_err(reason)?;
        }
    }

    Ok(cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn csv_with(rows: &[&str]) -> String {
        let mut text = HEADERS.join(",");
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn imports_pregnant_row_with_flags_and_birth() {
        let text = csv_with(&[
            "L1,12,01/01/2024,03/01/2024,24/04/2024,SIM,SIM,20/03/2024,SIM,09/04/2024,NÃO,09/04/2024,SIM,16/04/2024,NÃO,25/04/2024,11,1,2,99",
        ]);
        let report = import_cycles(text.as_bytes(), now()).unwrap();
        assert!(report.rejected.is_empty());
        let cycle = &report.cycles[0];

        assert_eq!(cycle.batch_label(), "L1");
        assert_eq!(cycle.animal_number(), 12);
        assert_eq!(cycle.last_insemination_date(), Some(date(2024, 1, 3)));
        assert_eq!(cycle.registered_at(), now());

        let schedule = cycle.management_schedule().unwrap();
        let coli1 = schedule.get(EventKind::FirstAntibiotic);
        assert!(coli1.is_completed());
        assert_eq!(coli1.completion_date(), Some(date(2024, 3, 20)));
        assert!(!schedule.get(EventKind::SecondAntibiotic).is_completed());
        assert!(schedule.get(EventKind::Deworming).is_completed());

        let outcome = cycle.farrowing_outcome().unwrap();
        assert_eq!(outcome.actual_date, date(2024, 4, 25));
        // The exported total column is ignored.
        assert_eq!(outcome.total_piglets(), 14);
    }

    #[test]
    fn not_pregnant_row_gets_return_to_heat_date() {
        let text = csv_with(&["L2,8,01/02/2024,-,-,NÃO,NÃO,-,NÃO,-,NÃO,-,NÃO,-,NÃO,-,-,-,-,-"]);
        let report = import_cycles(text.as_bytes(), now()).unwrap();
        let cycle = &report.cycles[0];
        assert!(cycle.management_schedule().is_none());
        assert_eq!(cycle.return_to_heat_date(), Some(date(2024, 2, 22)));
        assert_eq!(cycle.last_insemination_date(), None);
    }

    #[test]
    fn bad_rows_are_reported_and_good_rows_kept() {
        let text = csv_with(&[
            "L1,abc,01/01/2024,-,-,SIM,NÃO,-,NÃO,-,NÃO,-,NÃO,-,NÃO,-,-,-,-,-",
            "L1,5,-,-,-,SIM,NÃO,-,NÃO,-,NÃO,-,NÃO,-,NÃO,-,-,-,-,-",
            "L1,6,01/01/2024,-,-,TALVEZ,NÃO,-,NÃO,-,NÃO,-,NÃO,-,NÃO,-,-,-,-,-",
            "L1,7,01/01/2024,-,-,SIM,NÃO,-,NÃO,-,NÃO,-,NÃO,-,NÃO,-,-,-,-,-",
            "",
            "L1,9,31/02/2024,-,-,SIM,NÃO,-,NÃO,-,NÃO,-,NÃO,-,NÃO,-,-,-,-,-",
        ]);
        let report = import_cycles(text.as_bytes(), now()).unwrap();
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].animal_number(), 7);

        let lines: Vec<u64> = report.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 7]);
        assert!(report.rejected[0].reason.contains("animal number"));
        assert!(report.rejected[1].reason.contains("first insemination"));
        assert!(report.rejected[2].reason.contains("pregnancy flag"));
    }

    #[test]
    fn line_numbers_count_every_blank_and_crlf_line() {
        let good = "L1,7,01/01/2024,-,-,SIM,NÃO,-,NÃO,-,NÃO,-,NÃO,-,NÃO,-,-,-,-,-";
        let bad = "L1,x,01/01/2024,-,-,SIM,NÃO,-,NÃO,-,NÃO,-,NÃO,-,NÃO,-,-,-,-,-";
        let text = format!("{}\r\n\r\n{good}\r\n\r\n\r\n{bad}\r\n{bad}\r\n", HEADERS.join(","));

        let report = import_cycles(text.as_bytes(), now()).unwrap();
        assert_eq!(report.cycles.len(), 1);
        let lines: Vec<u64> = report.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![6, 7]);
    }

    #[test]
    fn oversized_piglet_counts_are_rejected_before_export() {
        let text = csv_with(&[
            "L1,3,01/01/2024,-,-,SIM,SIM,-,NÃO,-,NÃO,-,NÃO,-,NÃO,25/04/2024,4294967295,1,0,-",
            "L1,4,01/01/2024,-,-,SIM,SIM,-,NÃO,-,NÃO,-,NÃO,-,NÃO,25/04/2024,100,0,0,-",
            "L1,5,01/01/2024,-,-,SIM,SIM,-,NÃO,-,NÃO,-,NÃO,-,NÃO,25/04/2024,12,1,0,-",
        ]);
        let report = import_cycles(text.as_bytes(), now()).unwrap();

        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].animal_number(), 5);
        let lines: Vec<u64> = report.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3]);
        assert!(report.rejected.iter().all(|r| r.reason.contains("born alive")));

        let mut out = Vec::new();
        export_cycles(&report.cycles, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains(",12,1,0,13"));
    }

    #[test]
    fn farrowing_on_not_pregnant_row_is_rejected() {
        let text = csv_with(&["L1,4,01/01/2024,-,-,NÃO,SIM,-,NÃO,-,NÃO,-,NÃO,-,NÃO,25/04/2024,10,0,0,10"]);
        let report = import_cycles(text.as_bytes(), now()).unwrap();
        assert!(report.cycles.is_empty());
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn export_writes_fixed_layout() {
        let text = csv_with(&[
            "L1,12,01/01/2024,-,24/04/2024,SIM,SIM,20/03/2024,SIM,09/04/2024,NÃO,09/04/2024,NÃO,16/04/2024,NÃO,25/04/2024,11,1,2,14",
        ]);
        let report = import_cycles(text.as_bytes(), now()).unwrap();

        let mut out = Vec::new();
        export_cycles(&report.cycles, &mut out).unwrap();
        let written = String::from_utf8(out).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next().unwrap(), HEADERS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "L1,12,01/01/2024,-,24/04/2024,SIM,SIM,20/03/2024,SIM,09/04/2024,NÃO,09/04/2024,NÃO,16/04/2024,NÃO,25/04/2024,11,1,2,14"
        );
    }

    #[test]
    fn export_then_import_preserves_records() {
        let text = csv_with(&[
            "A,3,05/02/2024,07/02/2024,30/05/2024,SIM,NÃO,24/04/2024,SIM,14/05/2024,SIM,14/05/2024,NÃO,21/05/2024,NÃO,-,-,-,-,-",
            "B,4,10/01/2024,-,-,NÃO,NÃO,-,NÃO,-,NÃO,-,NÃO,-,NÃO,-,-,-,-,-",
        ]);
        let first = import_cycles(text.as_bytes(), now()).unwrap();

        let mut out = Vec::new();
        export_cycles(&first.cycles, &mut out).unwrap();
        let second = import_cycles(out.as_slice(), now()).unwrap();

        assert!(second.rejected.is_empty());
        for (a, b) in first.cycles.iter().zip(&second.cycles) {
            assert_eq!(a.details(), b.details());
            assert_eq!(a.management_schedule(), b.management_schedule());
            assert_eq!(a.farrowing_outcome(), b.farrowing_outcome());
        }
    }
}
