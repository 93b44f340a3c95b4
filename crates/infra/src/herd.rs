//! Herd service: the application-level owner of the record collections.
//!
//! ```text
//! Command
//!   ↓
//! 1. Locate the cycle in the loaded collection (or start an empty one for registration)
//!   ↓
//! 2. Decide: `handle` produces events without mutating anything
//!   ↓
//! 3. Apply the events to a copy of the cycle
//!   ↓
//! 4. Save the candidate collection; only on success does it replace the current one
//! ```
//!
//! A failed save leaves the in-memory collection at its last known good state,
//! so what the service reports always matches what was last persisted.

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use farrowline_breeding::{
    AmendDetails, AmendFarrowing, BreedingCycle, CompleteEvent, CycleCommand, CycleDetails,
    CycleEvent, CycleView, EventKind, FarrowingOutcome, Matrix, MatrixProfile, RecordFarrowing,
    RegisterCycle, ReopenEvent, SetEventCompletionDate, SetEventNotes,
};
use farrowline_core::{
    Aggregate, Clock, CycleId, DomainError, Entity, MatrixId, find_by_id, position_of,
};
use farrowline_reports::{
    AnimalHistory, CycleQuery, GestationEntry, HerdReport, QueueEntry, ReportFilter,
    farrowing_queue, gestation_board,
};

use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum HerdError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("cycle {0} not found")]
    CycleNotFound(CycleId),

    #[error("matrix {0} not found")]
    MatrixNotFound(String),

    #[error("matrix number {0} is already registered")]
    DuplicateMatrixNumber(u32),

    /// Persisting failed; the previous state was kept.
    #[error("failed to save {collection}: {source}")]
    Store {
        collection: &'static str,
        #[source]
        source: StoreError,
    },
}

pub struct Herd<CS, MS> {
    cycles: Vec<BreedingCycle>,
    matrices: Vec<Matrix>,
    cycle_store: CS,
    matrix_store: MS,
    clock: Box<dyn Clock>,
}

impl<CS, MS> core::fmt::Debug for Herd<CS, MS> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Herd")
            .field("cycles", &self.cycles.len())
            .field("matrices", &self.matrices.len())
            .finish_non_exhaustive()
    }
}

fn newest_first(cycles: &mut [BreedingCycle]) {
    cycles.sort_by(|a, b| b.registered_at().cmp(&a.registered_at()));
}

fn by_number(matrices: &mut [Matrix]) {
    matrices.sort_by_key(Matrix::number);
}

impl<CS, MS> Herd<CS, MS>
where
    CS: RecordStore<BreedingCycle>,
    MS: RecordStore<Matrix>,
{
    /// Load both collections from their stores.
    pub fn open(cycle_store: CS, matrix_store: MS, clock: impl Clock + 'static) -> Result<Self, HerdError> {
        let load = |collection: &'static str, e: StoreError| HerdError::Store {
            collection,
            source: e,
        };
        let mut cycles = cycle_store.load().map_err(|e| load("cycles", e))?;
        let mut matrices = matrix_store.load().map_err(|e| load("matrices", e))?;
        newest_first(&mut cycles);
        by_number(&mut matrices);
        tracing::debug!(cycles = cycles.len(), matrices = matrices.len(), "herd loaded");

        Ok(Self {
            cycles,
            matrices,
            cycle_store,
            matrix_store,
            clock: Box::new(clock),
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Newest registration first.
    pub fn cycles(&self) -> &[BreedingCycle] {
        &self.cycles
    }

    pub fn cycle(&self, id: CycleId) -> Result<&BreedingCycle, HerdError> {
        self.cycles
            .iter()
            .find(|c| c.id_typed() == id)
            .ok_or(HerdError::CycleNotFound(id))
    }

    pub fn view(&self, id: CycleId) -> Result<CycleView, HerdError> {
        Ok(CycleView::now(self.cycle(id)?, self.clock.as_ref()))
    }

    /// Decide, apply and persist one command.
    ///
    /// Returns the applied events; an empty list means nothing changed and
    /// nothing was written.
    pub fn dispatch(&mut self, command: CycleCommand) -> Result<Vec<CycleEvent>, HerdError> {
        let cycle_id = command.cycle_id();
        let position = self.cycles.iter().position(|c| c.id_typed() == cycle_id);

        let mut cycle = match (position, &command) {
            (Some(i), _) => self.cycles[i].clone(),
            (None, CycleCommand::RegisterCycle(_)) => BreedingCycle::empty(cycle_id),
            (None, _) => return Err(HerdError::CycleNotFound(cycle_id)),
        };

        let events = cycle.execute(&command)?;
        if events.is_empty() {
            return Ok(events);
        }

        let mut next = self.cycles.clone();
        match position {
            Some(i) => next[i] = cycle,
            None => next.insert(0, cycle),
        }
        newest_first(&mut next);
        self.commit_cycles(next)?;

        for event in &events {
            tracing::info!(cycle_id = %cycle_id, event_type = event.event_type(), "cycle updated");
        }
        Ok(events)
    }

    pub fn register_cycle(&mut self, details: CycleDetails) -> Result<CycleId, HerdError> {
        let cycle_id = CycleId::new();
        self.dispatch(CycleCommand::RegisterCycle(RegisterCycle {
            cycle_id,
            details,
            registered_at: Utc::now(),
        }))?;
        Ok(cycle_id)
    }

    pub fn amend_details(&mut self, cycle_id: CycleId, details: CycleDetails) -> Result<bool, HerdError> {
        let events = self.dispatch(CycleCommand::AmendDetails(AmendDetails { cycle_id, details }))?;
        Ok(!events.is_empty())
    }

    /// Mark an event done, on `completed_on` or today.
    pub fn complete_event(
        &mut self,
        cycle_id: CycleId,
        kind: EventKind,
        completed_on: Option<NaiveDate>,
    ) -> Result<(), HerdError> {
        let completed_on = completed_on.unwrap_or_else(|| self.today());
        self.dispatch(CycleCommand::CompleteEvent(CompleteEvent {
            cycle_id,
            kind,
            completed_on,
        }))?;
        Ok(())
    }

    pub fn reopen_event(&mut self, cycle_id: CycleId, kind: EventKind) -> Result<(), HerdError> {
        self.dispatch(CycleCommand::ReopenEvent(ReopenEvent { cycle_id, kind }))?;
        Ok(())
    }

    pub fn set_event_completion_date(
        &mut self,
        cycle_id: CycleId,
        kind: EventKind,
        completed_on: NaiveDate,
    ) -> Result<(), HerdError> {
        self.dispatch(CycleCommand::SetEventCompletionDate(SetEventCompletionDate {
            cycle_id,
            kind,
            completed_on,
        }))?;
        Ok(())
    }

    pub fn set_event_notes(
        &mut self,
        cycle_id: CycleId,
        kind: EventKind,
        notes: impl Into<String>,
    ) -> Result<(), HerdError> {
        self.dispatch(CycleCommand::SetEventNotes(SetEventNotes {
            cycle_id,
            kind,
            notes: notes.into(),
        }))?;
        Ok(())
    }

    pub fn record_farrowing(&mut self, cycle_id: CycleId, outcome: FarrowingOutcome) -> Result<(), HerdError> {
        let recorded_on = self.today();
        self.dispatch(CycleCommand::RecordFarrowing(RecordFarrowing {
            cycle_id,
            outcome,
            recorded_on,
        }))?;
        Ok(())
    }

    pub fn amend_farrowing(&mut self, cycle_id: CycleId, outcome: FarrowingOutcome) -> Result<(), HerdError> {
        let recorded_on = self.today();
        self.dispatch(CycleCommand::AmendFarrowing(AmendFarrowing {
            cycle_id,
            outcome,
            recorded_on,
        }))?;
        Ok(())
    }

    /// Hard removal.
    pub fn delete_cycle(&mut self, cycle_id: CycleId) -> Result<(), HerdError> {
        self.cycle(cycle_id)?;
        let next: Vec<BreedingCycle> = self
            .cycles
            .iter()
            .filter(|c| c.id_typed() != cycle_id)
            .cloned()
            .collect();
        self.commit_cycles(next)?;
        tracing::info!(cycle_id = %cycle_id, "cycle deleted");
        Ok(())
    }

    /// Remove every cycle; returns how many were removed.
    pub fn clear_cycles(&mut self) -> Result<usize, HerdError> {
        let removed = self.cycles.len();
        self.commit_cycles(Vec::new())?;
        tracing::info!(removed, "all cycles cleared");
        Ok(removed)
    }

    /// Append already-built cycles (bulk import) in one save.
    pub fn import_cycles(&mut self, imported: Vec<BreedingCycle>) -> Result<usize, HerdError> {
        let count = imported.len();
        if count == 0 {
            return Ok(0);
        }
        let mut next = self.cycles.clone();
        next.extend(imported);
        newest_first(&mut next);
        self.commit_cycles(next)?;
        tracing::info!(count, "cycles imported");
        Ok(count)
    }

    fn commit_cycles(&mut self, next: Vec<BreedingCycle>) -> Result<(), HerdError> {
        if let Err(source) = self.cycle_store.save(&next) {
            tracing::warn!(error = %source, "saving cycles failed; keeping last known good state");
            return Err(HerdError::Store {
                collection: "cycles",
                source,
            });
        }
        self.cycles = next;
        Ok(())
    }

    /// Ascending by number.
    pub fn matrices(&self) -> &[Matrix] {
        &self.matrices
    }

    pub fn matrix(&self, number: u32) -> Result<&Matrix, HerdError> {
        self.matrices
            .iter()
            .find(|m| m.number() == number)
            .ok_or_else(|| HerdError::MatrixNotFound(format!("#{number}")))
    }

    /// Registry record of the animal a cycle belongs to, if registered.
    pub fn matrix_for(&self, cycle: &BreedingCycle) -> Option<&Matrix> {
        self.matrices
            .iter()
            .find(|m| m.number() == cycle.animal_number())
    }

    pub fn add_matrix(&mut self, profile: MatrixProfile) -> Result<MatrixId, HerdError> {
        if self.matrices.iter().any(|m| m.number() == profile.number) {
            return Err(HerdError::DuplicateMatrixNumber(profile.number));
        }
        let matrix = Matrix::register(MatrixId::new(), profile)?;
        let id = *matrix.id();

        let mut next = self.matrices.clone();
        next.push(matrix);
        self.commit_matrices(next)?;
        tracing::info!(matrix_id = %id, "matrix registered");
        Ok(id)
    }

    pub fn update_matrix(&mut self, id: MatrixId, profile: MatrixProfile) -> Result<(), HerdError> {
        if self
            .matrices
            .iter()
            .any(|m| m.number() == profile.number && *m.id() != id)
        {
            return Err(HerdError::DuplicateMatrixNumber(profile.number));
        }
        let index = position_of(&self.matrices, id)
            .ok_or_else(|| HerdError::MatrixNotFound(id.to_string()))?;
        let mut next = self.matrices.clone();
        next[index].update(profile)?;
        self.commit_matrices(next)?;
        tracing::info!(matrix_id = %id, "matrix updated");
        Ok(())
    }

    pub fn remove_matrix(&mut self, id: MatrixId) -> Result<(), HerdError> {
        if find_by_id(&self.matrices, id).is_none() {
            return Err(HerdError::MatrixNotFound(id.to_string()));
        }
        let next: Vec<Matrix> = self
            .matrices
            .iter()
            .filter(|m| *m.id() != id)
            .cloned()
            .collect();
        self.commit_matrices(next)?;
        tracing::info!(matrix_id = %id, "matrix removed");
        Ok(())
    }

    fn commit_matrices(&mut self, mut next: Vec<Matrix>) -> Result<(), HerdError> {
        by_number(&mut next);
        if let Err(source) = self.matrix_store.save(&next) {
            tracing::warn!(error = %source, "saving matrices failed; keeping last known good state");
            return Err(HerdError::Store {
                collection: "matrices",
                source,
            });
        }
        self.matrices = next;
        Ok(())
    }

    pub fn report(&self, filter: ReportFilter) -> HerdReport {
        HerdReport::build(&self.cycles, filter)
    }

    pub fn history(&self, animal_number: u32, year: Option<i32>) -> AnimalHistory {
        AnimalHistory::build(&self.cycles, animal_number, year, self.today())
    }

    pub fn query(&self, query: &CycleQuery) -> Vec<&BreedingCycle> {
        query.apply(&self.cycles, self.today())
    }

    pub fn gestation_board(&self) -> Vec<GestationEntry> {
        gestation_board(&self.cycles, self.today())
    }

    pub fn farrowing_queue(&self) -> Vec<QueueEntry> {
        farrowing_queue(&self.cycles, self.today())
    }
}
