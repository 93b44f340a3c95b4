//! Subcommand handlers.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Serialize;

use farrowline_breeding::{
    BreedingCycle, CycleDetails, CycleView, FarrowingOutcome, Matrix, MatrixProfile,
};
use farrowline_core::{CycleId, Entity};
use farrowline_infra::{Herd, RecordStore, interchange};
use farrowline_reports::{CycleQuery, ReportFilter, distinct_animals, distinct_years};

use crate::args::{
    CycleChanges, CycleCommand, EventCommand, FarrowCommand, HistoryArgs, ListArgs, Litter,
    MatrixCommand, MatrixFields, NewCycle, ReportArgs,
};
use crate::render;

/// Output mode chosen by `--json`.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit<T: Serialize>(self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }

    fn done(self, message: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "ok": true, "message": message }));
        } else {
            println!("{message}");
        }
    }
}

#[derive(Serialize)]
struct CycleRecord<'a> {
    cycle: &'a BreedingCycle,
    view: CycleView,
}

/// Resolve a full cycle id or a unique prefix of one.
pub fn resolve_cycle<CS, MS>(herd: &Herd<CS, MS>, input: &str) -> Result<CycleId>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    if let Ok(id) = input.parse::<CycleId>() {
        return Ok(id);
    }
    let needle = input.trim().to_ascii_lowercase();
    if needle.is_empty() {
        bail!("cycle id is required");
    }
    let mut matches = herd
        .cycles()
        .iter()
        .map(BreedingCycle::id_typed)
        .filter(|id| id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => bail!("no cycle matches '{input}'"),
        (Some(_), Some(_)) => bail!("'{input}' matches more than one cycle; use more characters"),
    }
}

fn new_details(new: NewCycle) -> CycleDetails {
    let mut details = CycleDetails::new(new.animal, new.first, new.pregnancy.into());
    details.batch_label = new.batch;
    details.last_insemination_date = new.last;
    details.dose_count = new.doses;
    details.sire_id = new.sire;
    details.return_to_heat_date = new.return_to_heat;
    details
}

fn merge_details(mut details: CycleDetails, changes: CycleChanges) -> CycleDetails {
    if let Some(animal) = changes.animal {
        details.animal_number = animal;
    }
    if let Some(first) = changes.first {
        details.first_insemination_date = first;
    }
    if changes.last.is_some() || changes.clear_last {
        details.last_insemination_date = changes.last;
    }
    if let Some(batch) = changes.batch {
        details.batch_label = batch;
    }
    if changes.doses.is_some() || changes.clear_doses {
        details.dose_count = changes.doses;
    }
    if let Some(sire) = changes.sire {
        details.sire_id = (!sire.trim().is_empty()).then_some(sire);
    }
    if changes.return_to_heat.is_some() || changes.clear_return_to_heat {
        details.return_to_heat_date = changes.return_to_heat;
    }
    if let Some(pregnancy) = changes.pregnancy {
        details.pregnancy = pregnancy.into();
    }
    details
}

fn merge_profile(mut profile: MatrixProfile, fields: MatrixFields) -> MatrixProfile {
    if let Some(name) = fields.name {
        profile.name = name;
    }
    if let Some(breed) = fields.breed {
        profile.breed = breed;
    }
    if fields.weight.is_some() {
        profile.weight_kg = fields.weight;
    }
    if let Some(sire) = fields.sire {
        profile.sire = sire;
    }
    if let Some(dam) = fields.dam {
        profile.dam = dam;
    }
    if fields.born.is_some() {
        profile.birth_date = fields.born;
    }
    if fields.entered.is_some() {
        profile.entry_date = fields.entered;
    }
    if let Some(status) = fields.status {
        profile.status = status;
    }
    if let Some(notes) = fields.notes {
        profile.notes = notes;
    }
    profile
}

fn outcome(litter: Litter) -> FarrowingOutcome {
    let outcome = FarrowingOutcome::new(litter.date, litter.alive, litter.stillborn, litter.mummified);
    match litter.weight {
        Some(kg) => outcome.with_average_weight(kg),
        None => outcome,
    }
}

fn show_cycle<CS, MS>(herd: &Herd<CS, MS>, id: CycleId, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    let cycle = herd.cycle(id)?;
    let view = herd.view(id)?;
    let matrix = herd.matrix_for(cycle);
    let text = render::cycle_detail(cycle, &view, matrix);
    out.emit(&CycleRecord { cycle, view }, || text)
}

pub fn cycle<CS, MS>(herd: &mut Herd<CS, MS>, command: CycleCommand, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    match command {
        CycleCommand::Add(new) => {
            let id = herd.register_cycle(new_details(new))?;
            show_cycle(herd, id, out)
        }
        CycleCommand::Edit { id, changes } => {
            let id = resolve_cycle(herd, &id)?;
            let details = merge_details(herd.cycle(id)?.details().clone(), changes);
            if !herd.amend_details(id, details)? {
                tracing::info!(cycle_id = %id, "no changes");
            }
            show_cycle(herd, id, out)
        }
        CycleCommand::List(list) => list_cycles(herd, list, out),
        CycleCommand::Show { id } => {
            let id = resolve_cycle(herd, &id)?;
            show_cycle(herd, id, out)
        }
        CycleCommand::Delete { id } => {
            let id = resolve_cycle(herd, &id)?;
            herd.delete_cycle(id)?;
            out.done(&format!("deleted cycle {id}"));
            Ok(())
        }
        CycleCommand::Clear { yes } => {
            if !yes {
                bail!("refusing to delete every cycle without --yes");
            }
            let removed = herd.clear_cycles()?;
            out.done(&format!("removed {removed} cycles"));
            Ok(())
        }
    }
}

fn list_cycles<CS, MS>(herd: &Herd<CS, MS>, list: ListArgs, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    let query = CycleQuery {
        animal: list.animal,
        sire: list.sire,
        status: list.status,
        first_insemination_month: list.first_month,
        last_insemination_month: list.last_month,
    };
    let today = herd.today();
    let records: Vec<CycleRecord<'_>> = herd
        .query(&query)
        .into_iter()
        .map(|cycle| CycleRecord {
            cycle,
            view: CycleView::at(cycle, today),
        })
        .collect();

    out.emit(&records, || {
        let mut text = render::cycle_header();
        text.push('\n');
        for record in &records {
            text.push_str(&render::cycle_row(record.cycle, &record.view));
            text.push('\n');
        }
        text
    })
}

pub fn event<CS, MS>(herd: &mut Herd<CS, MS>, command: EventCommand, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    let id = match command {
        EventCommand::Complete { id, kind, on } => {
            let id = resolve_cycle(herd, &id)?;
            herd.complete_event(id, kind, on)?;
            id
        }
        EventCommand::Reopen { id, kind } => {
            let id = resolve_cycle(herd, &id)?;
            herd.reopen_event(id, kind)?;
            id
        }
        EventCommand::Date { id, kind, date } => {
            let id = resolve_cycle(herd, &id)?;
            herd.set_event_completion_date(id, kind, date)?;
            id
        }
        EventCommand::Note { id, kind, text } => {
            let id = resolve_cycle(herd, &id)?;
            herd.set_event_notes(id, kind, text)?;
            id
        }
    };
    show_cycle(herd, id, out)
}

pub fn farrow<CS, MS>(herd: &mut Herd<CS, MS>, command: FarrowCommand, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    let id = match command {
        FarrowCommand::Record { id, litter } => {
            let id = resolve_cycle(herd, &id)?;
            herd.record_farrowing(id, outcome(litter))?;
            id
        }
        FarrowCommand::Amend { id, litter } => {
            let id = resolve_cycle(herd, &id)?;
            herd.amend_farrowing(id, outcome(litter))?;
            id
        }
    };
    show_cycle(herd, id, out)
}

pub fn gestation<CS, MS>(herd: &Herd<CS, MS>, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    let board = herd.gestation_board();
    out.emit(&board, || render::gestation_board(&board))
}

pub fn queue<CS, MS>(herd: &Herd<CS, MS>, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    let queue = herd.farrowing_queue();
    out.emit(&queue, || render::farrowing_queue(&queue))
}

pub fn report<CS, MS>(herd: &Herd<CS, MS>, args: ReportArgs, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    let filter = ReportFilter {
        year: args.year,
        month: args.month,
        animal_number: args.animal,
    };
    let report = herd.report(filter);
    out.emit(&report, || render::herd_report(&report, args.top))
}

pub fn history<CS, MS>(herd: &Herd<CS, MS>, args: HistoryArgs, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    let history = herd.history(args.animal, args.year);
    out.emit(&history, || {
        let mut text = render::history(&history);
        if history.entries.is_empty() {
            let years = distinct_years(herd.cycles());
            let animals = distinct_animals(herd.cycles());
            text.push_str(&render::no_history_hint(&years, &animals));
        }
        text
    })
}

pub fn matrix<CS, MS>(herd: &mut Herd<CS, MS>, command: MatrixCommand, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    match command {
        MatrixCommand::Add { number, fields } => {
            herd.add_matrix(merge_profile(MatrixProfile::new(number), fields))?;
            let matrix = herd.matrix(number)?;
            out.emit(matrix, || format!("{}\n", render::matrix_row(matrix, herd.today())))
        }
        MatrixCommand::Edit {
            number,
            new_number,
            fields,
        } => {
            let current = herd.matrix(number)?;
            let id = *current.id();
            let mut profile = merge_profile(current.profile().clone(), fields);
            if let Some(new_number) = new_number {
                profile.number = new_number;
            }
            let number = profile.number;
            herd.update_matrix(id, profile)?;
            let matrix = herd.matrix(number)?;
            out.emit(matrix, || format!("{}\n", render::matrix_row(matrix, herd.today())))
        }
        MatrixCommand::List => {
            let today = herd.today();
            out.emit(&herd.matrices(), || {
                let mut text = render::matrix_header();
                text.push('\n');
                for matrix in herd.matrices() {
                    text.push_str(&render::matrix_row(matrix, today));
                    text.push('\n');
                }
                text
            })
        }
        MatrixCommand::Remove { number } => {
            let id = *herd.matrix(number)?.id();
            herd.remove_matrix(id)?;
            out.done(&format!("removed matrix #{number}"));
            Ok(())
        }
    }
}

pub fn export<CS, MS>(herd: &Herd<CS, MS>, path: &std::path::Path, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    interchange::export_to_path(herd.cycles(), path)
        .with_context(|| format!("exporting to {}", path.display()))?;
    out.done(&format!("exported {} cycles to {}", herd.cycles().len(), path.display()));
    Ok(())
}

pub fn import<CS, MS>(herd: &mut Herd<CS, MS>, path: &std::path::Path, out: Output) -> Result<()>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    let report = interchange::import_from_path(path, Utc::now())
        .with_context(|| format!("importing {}", path.display()))?;
    for rejected in &report.rejected {
        eprintln!("skipped {rejected}");
    }
    let rejected = report.rejected.len();
    let added = herd.import_cycles(report.cycles)?;
    out.done(&format!("imported {added} cycles, skipped {rejected} rows"));
    Ok(())
}
