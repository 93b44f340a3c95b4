use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use farrowline_core::{Aggregate, AggregateRoot, CycleId, DomainError};

use crate::outcome::FarrowingOutcome;
use crate::schedule::{
    EventKind, ManagementSchedule, expected_farrowing_date, expected_return_to_heat_date,
};

/// Pregnancy confirmation recorded when the cycle is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pregnancy {
    Confirmed,
    NotConfirmed,
}

impl Pregnancy {
    pub fn is_confirmed(self) -> bool {
        self == Pregnancy::Confirmed
    }
}

impl From<bool> for Pregnancy {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Pregnancy::Confirmed
        } else {
            Pregnancy::NotConfirmed
        }
    }
}

/// User-editable attributes of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleDetails {
    pub animal_number: u32,
    /// Free-text grouping tag; empty means no batch.
    pub batch_label: String,
    pub first_insemination_date: NaiveDate,
    pub last_insemination_date: Option<NaiveDate>,
    pub dose_count: Option<u32>,
    pub sire_id: Option<String>,
    pub return_to_heat_date: Option<NaiveDate>,
    pub pregnancy: Pregnancy,
}

impl CycleDetails {
    pub fn new(animal_number: u32, first_insemination_date: NaiveDate, pregnancy: Pregnancy) -> Self {
        Self {
            animal_number,
            batch_label: String::new(),
            first_insemination_date,
            last_insemination_date: None,
            dose_count: None,
            sire_id: None,
            return_to_heat_date: None,
            pregnancy,
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.animal_number == 0 {
            return Err(DomainError::validation("animal number is required"));
        }
        if let Some(last) = self.last_insemination_date {
            if last < self.first_insemination_date {
                return Err(DomainError::validation(
                    "last insemination date cannot precede the first",
                ));
            }
        }
        Ok(())
    }

    /// Trimmed copy; a not-confirmed cycle without a return-to-heat date gets the derived one.
    fn normalized(&self) -> Self {
        let mut details = self.clone();
        details.batch_label = details.batch_label.trim().to_string();
        details.sire_id = details
            .sire_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if !details.pregnancy.is_confirmed() && details.return_to_heat_date.is_none() {
            details.return_to_heat_date =
                Some(expected_return_to_heat_date(details.first_insemination_date));
        }
        details
    }
}

/// Aggregate root: BreedingCycle (one insemination attempt for one animal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingCycle {
    id: CycleId,
    details: CycleDetails,
    registered_at: DateTime<Utc>,
    management_schedule: Option<ManagementSchedule>,
    farrowing_outcome: Option<FarrowingOutcome>,
    version: u64,
    #[serde(skip_serializing, default = "persisted")]
    created: bool,
}

/// Anything read back from storage was registered before it was written.
fn persisted() -> bool {
    true
}

impl BreedingCycle {
    /// Create an empty, not-yet-registered instance; `RegisterCycle` fills it in.
    pub fn empty(id: CycleId) -> Self {
        Self {
            id,
            details: CycleDetails::new(0, NaiveDate::MIN, Pregnancy::NotConfirmed),
            registered_at: DateTime::<Utc>::MIN_UTC,
            management_schedule: None,
            farrowing_outcome: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> CycleId {
        self.id
    }

    pub fn is_registered(&self) -> bool {
        self.created
    }

    pub fn details(&self) -> &CycleDetails {
        &self.details
    }

    pub fn animal_number(&self) -> u32 {
        self.details.animal_number
    }

    pub fn batch_label(&self) -> &str {
        &self.details.batch_label
    }

    pub fn first_insemination_date(&self) -> NaiveDate {
        self.details.first_insemination_date
    }

    pub fn last_insemination_date(&self) -> Option<NaiveDate> {
        self.details.last_insemination_date
    }

    pub fn dose_count(&self) -> Option<u32> {
        self.details.dose_count
    }

    pub fn sire_id(&self) -> Option<&str> {
        self.details.sire_id.as_deref()
    }

    pub fn return_to_heat_date(&self) -> Option<NaiveDate> {
        self.details.return_to_heat_date
    }

    pub fn pregnancy(&self) -> Pregnancy {
        self.details.pregnancy
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn management_schedule(&self) -> Option<&ManagementSchedule> {
        self.management_schedule.as_ref()
    }

    pub fn farrowing_outcome(&self) -> Option<&FarrowingOutcome> {
        self.farrowing_outcome.as_ref()
    }

    /// Follows the current first insemination date (unlike the management schedule).
    pub fn expected_farrowing_date(&self) -> NaiveDate {
        expected_farrowing_date(self.details.first_insemination_date)
    }

    pub fn expected_return_to_heat_date(&self) -> NaiveDate {
        expected_return_to_heat_date(self.details.first_insemination_date)
    }

    /// Confirmed pregnancy with no farrowing recorded yet.
    pub fn is_gestating(&self) -> bool {
        self.details.pregnancy.is_confirmed() && self.farrowing_outcome.is_none()
    }
}

impl AggregateRoot for BreedingCycle {
    type Id = CycleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterCycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCycle {
    pub cycle_id: CycleId,
    pub details: CycleDetails,
    pub registered_at: DateTime<Utc>,
}

/// Command: AmendDetails.
///
/// Never shifts an existing management schedule, even when the first
/// insemination date changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendDetails {
    pub cycle_id: CycleId,
    pub details: CycleDetails,
}

/// Command: CompleteEvent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteEvent {
    pub cycle_id: CycleId,
    pub kind: EventKind,
    pub completed_on: NaiveDate,
}

/// Command: ReopenEvent (clears the completion flag and date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReopenEvent {
    pub cycle_id: CycleId,
    pub kind: EventKind,
}

/// Command: SetEventCompletionDate (corrects the date of an already completed event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEventCompletionDate {
    pub cycle_id: CycleId,
    pub kind: EventKind,
    pub completed_on: NaiveDate,
}

/// Command: SetEventNotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEventNotes {
    pub cycle_id: CycleId,
    pub kind: EventKind,
    pub notes: String,
}

/// Command: RecordFarrowing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFarrowing {
    pub cycle_id: CycleId,
    pub outcome: FarrowingOutcome,
    /// Date the entry is made; the birth cannot be after it.
    pub recorded_on: NaiveDate,
}

/// Command: AmendFarrowing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmendFarrowing {
    pub cycle_id: CycleId,
    pub outcome: FarrowingOutcome,
    pub recorded_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CycleCommand {
    RegisterCycle(RegisterCycle),
    AmendDetails(AmendDetails),
    CompleteEvent(CompleteEvent),
    ReopenEvent(ReopenEvent),
    SetEventCompletionDate(SetEventCompletionDate),
    SetEventNotes(SetEventNotes),
    RecordFarrowing(RecordFarrowing),
    AmendFarrowing(AmendFarrowing),
}

impl CycleCommand {
    pub fn cycle_id(&self) -> CycleId {
        match self {
            CycleCommand::RegisterCycle(c) => c.cycle_id,
            CycleCommand::AmendDetails(c) => c.cycle_id,
            CycleCommand::CompleteEvent(c) => c.cycle_id,
            CycleCommand::ReopenEvent(c) => c.cycle_id,
            CycleCommand::SetEventCompletionDate(c) => c.cycle_id,
            CycleCommand::SetEventNotes(c) => c.cycle_id,
            CycleCommand::RecordFarrowing(c) => c.cycle_id,
            CycleCommand::AmendFarrowing(c) => c.cycle_id,
        }
    }
}

/// What an amendment does to the management schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleChange {
    Keep,
    /// Pregnancy confirmed after registration: the schedule is generated now.
    Generate(ManagementSchedule),
    /// Pregnancy withdrawn: the schedule no longer applies.
    Remove,
}

/// Event: CycleRegistered (carries the schedule generated at registration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRegistered {
    pub cycle_id: CycleId,
    pub details: CycleDetails,
    pub registered_at: DateTime<Utc>,
    pub management_schedule: Option<ManagementSchedule>,
}

/// Event: DetailsAmended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsAmended {
    pub cycle_id: CycleId,
    pub details: CycleDetails,
    pub schedule: ScheduleChange,
}

/// Event: EventCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCompleted {
    pub cycle_id: CycleId,
    pub kind: EventKind,
    pub completed_on: NaiveDate,
}

/// Event: EventReopened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReopened {
    pub cycle_id: CycleId,
    pub kind: EventKind,
}

/// Event: EventCompletionDateChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCompletionDateChanged {
    pub cycle_id: CycleId,
    pub kind: EventKind,
    pub completed_on: NaiveDate,
}

/// Event: EventNotesChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNotesChanged {
    pub cycle_id: CycleId,
    pub kind: EventKind,
    pub notes: String,
}

/// Event: FarrowingRecorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarrowingRecorded {
    pub cycle_id: CycleId,
    pub outcome: FarrowingOutcome,
}

/// Event: FarrowingAmended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarrowingAmended {
    pub cycle_id: CycleId,
    pub outcome: FarrowingOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CycleEvent {
    CycleRegistered(CycleRegistered),
    DetailsAmended(DetailsAmended),
    EventCompleted(EventCompleted),
    EventReopened(EventReopened),
    EventCompletionDateChanged(EventCompletionDateChanged),
    EventNotesChanged(EventNotesChanged),
    FarrowingRecorded(FarrowingRecorded),
    FarrowingAmended(FarrowingAmended),
}

impl CycleEvent {
    /// Stable event name, used in logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            CycleEvent::CycleRegistered(_) => "breeding.cycle.registered",
            CycleEvent::DetailsAmended(_) => "breeding.cycle.details_amended",
            CycleEvent::EventCompleted(_) => "breeding.cycle.event_completed",
            CycleEvent::EventReopened(_) => "breeding.cycle.event_reopened",
            CycleEvent::EventCompletionDateChanged(_) => "breeding.cycle.event_completion_date_changed",
            CycleEvent::EventNotesChanged(_) => "breeding.cycle.event_notes_changed",
            CycleEvent::FarrowingRecorded(_) => "breeding.cycle.farrowing_recorded",
            CycleEvent::FarrowingAmended(_) => "breeding.cycle.farrowing_amended",
        }
    }
}

impl Aggregate for BreedingCycle {
    type Command = CycleCommand;
    type Event = CycleEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CycleEvent::CycleRegistered(e) => {
                self.id = e.cycle_id;
                self.details = e.details.clone();
                self.registered_at = e.registered_at;
                self.management_schedule = e.management_schedule.clone();
                self.farrowing_outcome = None;
                self.created = true;
            }
            CycleEvent::DetailsAmended(e) => {
                self.details = e.details.clone();
                match &e.schedule {
                    ScheduleChange::Keep => {}
                    ScheduleChange::Generate(schedule) => {
                        self.management_schedule = Some(schedule.clone());
                    }
                    ScheduleChange::Remove => self.management_schedule = None,
                }
            }
            CycleEvent::EventCompleted(e) => {
                if let Some(schedule) = self.management_schedule.as_mut() {
                    schedule.get_mut(e.kind).mark_completed(e.completed_on);
                }
            }
            CycleEvent::EventReopened(e) => {
                if let Some(schedule) = self.management_schedule.as_mut() {
                    schedule.get_mut(e.kind).reopen();
                }
            }
            CycleEvent::EventCompletionDateChanged(e) => {
                if let Some(schedule) = self.management_schedule.as_mut() {
                    schedule.get_mut(e.kind).set_completion_date(e.completed_on);
                }
            }
            CycleEvent::EventNotesChanged(e) => {
                if let Some(schedule) = self.management_schedule.as_mut() {
                    schedule.get_mut(e.kind).set_notes(e.notes.clone());
                }
            }
            CycleEvent::FarrowingRecorded(FarrowingRecorded { outcome, .. })
            | CycleEvent::FarrowingAmended(FarrowingAmended { outcome, .. }) => {
                self.farrowing_outcome = Some(outcome.clone());
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CycleCommand::RegisterCycle(cmd) => self.handle_register(cmd),
            CycleCommand::AmendDetails(cmd) => self.handle_amend(cmd),
            CycleCommand::CompleteEvent(cmd) => self.handle_complete(cmd),
            CycleCommand::ReopenEvent(cmd) => self.handle_reopen(cmd),
            CycleCommand::SetEventCompletionDate(cmd) => self.handle_completion_date(cmd),
            CycleCommand::SetEventNotes(cmd) => self.handle_notes(cmd),
            CycleCommand::RecordFarrowing(cmd) => self.handle_record_farrowing(cmd),
            CycleCommand::AmendFarrowing(cmd) => self.handle_amend_farrowing(cmd),
        }
    }
}

impl BreedingCycle {
    fn ensure_registered(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn ensure_cycle_id(&self, cycle_id: CycleId) -> Result<(), DomainError> {
        if self.id != cycle_id {
            return Err(DomainError::invariant("cycle_id mismatch"));
        }
        Ok(())
    }

    fn ensure_schedule(&self, kind: EventKind) -> Result<&ManagementSchedule, DomainError> {
        self.management_schedule.as_ref().ok_or_else(|| {
            DomainError::invariant(format!(
                "cycle has no management schedule (cannot update '{}')",
                kind.code()
            ))
        })
    }

    fn validate_outcome(
        &self,
        outcome: &FarrowingOutcome,
        recorded_on: NaiveDate,
    ) -> Result<(), DomainError> {
        outcome.validate()?;
        if outcome.actual_date > recorded_on {
            return Err(DomainError::validation("farrowing date cannot be in the future"));
        }
        if outcome.actual_date < self.details.first_insemination_date {
            return Err(DomainError::validation(
                "farrowing date cannot precede the first insemination",
            ));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterCycle) -> Result<Vec<CycleEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("cycle already registered"));
        }
        self.ensure_cycle_id(cmd.cycle_id)?;
        cmd.details.validate()?;

        let details = cmd.details.normalized();
        let management_schedule = details
            .pregnancy
            .is_confirmed()
            .then(|| ManagementSchedule::generate(details.first_insemination_date));

        Ok(vec![CycleEvent::CycleRegistered(CycleRegistered {
            cycle_id: cmd.cycle_id,
            details,
            registered_at: cmd.registered_at,
            management_schedule,
        })])
    }

    fn handle_amend(&self, cmd: &AmendDetails) -> Result<Vec<CycleEvent>, DomainError> {
        self.ensure_registered()?;
        self.ensure_cycle_id(cmd.cycle_id)?;
        cmd.details.validate()?;

        let details = cmd.details.normalized();
        if !details.pregnancy.is_confirmed() && self.farrowing_outcome.is_some() {
            return Err(DomainError::invariant(
                "a cycle with a recorded farrowing must stay confirmed pregnant",
            ));
        }

        let schedule = match (details.pregnancy.is_confirmed(), &self.management_schedule) {
            (true, Some(_)) => ScheduleChange::Keep,
            (true, None) => ScheduleChange::Generate(ManagementSchedule::generate(
                details.first_insemination_date,
            )),
            (false, Some(_)) => ScheduleChange::Remove,
            (false, None) => ScheduleChange::Keep,
        };

        if details == self.details && schedule == ScheduleChange::Keep {
            return Ok(vec![]);
        }

        Ok(vec![CycleEvent::DetailsAmended(DetailsAmended {
            cycle_id: cmd.cycle_id,
            details,
            schedule,
        })])
    }

    fn handle_complete(&self, cmd: &CompleteEvent) -> Result<Vec<CycleEvent>, DomainError> {
        self.ensure_registered()?;
        self.ensure_cycle_id(cmd.cycle_id)?;
        let event = self.ensure_schedule(cmd.kind)?.get(cmd.kind);
        if event.is_completed() {
            return Err(DomainError::conflict(format!(
                "'{}' is already completed",
                cmd.kind.code()
            )));
        }
        Ok(vec![CycleEvent::EventCompleted(EventCompleted {
            cycle_id: cmd.cycle_id,
            kind: cmd.kind,
            completed_on: cmd.completed_on,
        })])
    }

    fn handle_reopen(&self, cmd: &ReopenEvent) -> Result<Vec<CycleEvent>, DomainError> {
        self.ensure_registered()?;
        self.ensure_cycle_id(cmd.cycle_id)?;
        let event = self.ensure_schedule(cmd.kind)?.get(cmd.kind);
        if !event.is_completed() {
            return Ok(vec![]);
        }
        Ok(vec![CycleEvent::EventReopened(EventReopened {
            cycle_id: cmd.cycle_id,
            kind: cmd.kind,
        })])
    }

    fn handle_completion_date(
        &self,
        cmd: &SetEventCompletionDate,
    ) -> Result<Vec<CycleEvent>, DomainError> {
        self.ensure_registered()?;
        self.ensure_cycle_id(cmd.cycle_id)?;
        let event = self.ensure_schedule(cmd.kind)?.get(cmd.kind);
        if !event.is_completed() {
            return Err(DomainError::invariant(format!(
                "'{}' is not completed; complete it before setting its date",
                cmd.kind.code()
            )));
        }
        Ok(vec![CycleEvent::EventCompletionDateChanged(
            EventCompletionDateChanged {
                cycle_id: cmd.cycle_id,
                kind: cmd.kind,
                completed_on: cmd.completed_on,
            },
        )])
    }

    fn handle_notes(&self, cmd: &SetEventNotes) -> Result<Vec<CycleEvent>, DomainError> {
        self.ensure_registered()?;
        self.ensure_cycle_id(cmd.cycle_id)?;
        self.ensure_schedule(cmd.kind)?;
        Ok(vec![CycleEvent::EventNotesChanged(EventNotesChanged {
            cycle_id: cmd.cycle_id,
            kind: cmd.kind,
            notes: cmd.notes.clone(),
        })])
    }

    fn handle_record_farrowing(
        &self,
        cmd: &RecordFarrowing,
    ) -> Result<Vec<CycleEvent>, DomainError> {
        self.ensure_registered()?;
        self.ensure_cycle_id(cmd.cycle_id)?;
        if self.farrowing_outcome.is_some() {
            return Err(DomainError::conflict(
                "farrowing already recorded; amend the existing outcome instead",
            ));
        }
        if !self.details.pregnancy.is_confirmed() {
            return Err(DomainError::invariant(
                "farrowing can only be recorded for a confirmed pregnancy",
            ));
        }
        self.validate_outcome(&cmd.outcome, cmd.recorded_on)?;

        Ok(vec![CycleEvent::FarrowingRecorded(FarrowingRecorded {
            cycle_id: cmd.cycle_id,
            outcome: cmd.outcome.clone(),
        })])
    }

    fn handle_amend_farrowing(
        &self,
        cmd: &AmendFarrowing,
    ) -> Result<Vec<CycleEvent>, DomainError> {
        self.ensure_registered()?;
        self.ensure_cycle_id(cmd.cycle_id)?;
        if self.farrowing_outcome.is_none() {
            return Err(DomainError::invariant("no farrowing recorded for this cycle"));
        }
        self.validate_outcome(&cmd.outcome, cmd.recorded_on)?;

        Ok(vec![CycleEvent::FarrowingAmended(FarrowingAmended {
            cycle_id: cmd.cycle_id,
            outcome: cmd.outcome.clone(),
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_cycle_id() -> CycleId {
        CycleId::new()
    }

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn register(id: CycleId, details: CycleDetails) -> BreedingCycle {
        let mut cycle = BreedingCycle::empty(id);
        cycle
            .execute(&CycleCommand::RegisterCycle(RegisterCycle {
                cycle_id: id,
                details,
                registered_at: test_time(),
            }))
            .unwrap();
        cycle
    }

    fn pregnant_cycle() -> BreedingCycle {
        register(
            test_cycle_id(),
            CycleDetails::new(42, date(2024, 1, 1), Pregnancy::Confirmed),
        )
    }

    #[test]
    fn register_confirmed_generates_schedule_atomically() {
        let id = test_cycle_id();
        let cycle = BreedingCycle::empty(id);
        let events = cycle
            .handle(&CycleCommand::RegisterCycle(RegisterCycle {
                cycle_id: id,
                details: CycleDetails::new(42, date(2024, 1, 1), Pregnancy::Confirmed),
                registered_at: test_time(),
            }))
            .unwrap();

        assert_eq!(events.len(), 1);
        match &events[0] {
            CycleEvent::CycleRegistered(e) => {
                let schedule = e.management_schedule.as_ref().expect("schedule generated");
                assert_eq!(schedule.iter().count(), 4);
                assert_eq!(
                    schedule.get(EventKind::FirstAntibiotic).expected_date(),
                    date(2024, 3, 20)
                );
            }
            other => panic!("Expected CycleRegistered, got {other:?}"),
        }
        // handle() must not mutate.
        assert!(!cycle.is_registered());
        assert_eq!(cycle.version(), 0);
    }

    #[test]
    fn register_not_confirmed_has_no_schedule_and_derives_return_to_heat() {
        let cycle = register(
            test_cycle_id(),
            CycleDetails::new(7, date(2024, 1, 1), Pregnancy::NotConfirmed),
        );
        assert!(cycle.management_schedule().is_none());
        assert_eq!(cycle.return_to_heat_date(), Some(date(2024, 1, 22)));
        assert!(!cycle.is_gestating());
    }

    #[test]
    fn manual_return_to_heat_date_is_kept() {
        let mut details = CycleDetails::new(7, date(2024, 1, 1), Pregnancy::NotConfirmed);
        details.return_to_heat_date = Some(date(2024, 1, 20));
        let cycle = register(test_cycle_id(), details);
        assert_eq!(cycle.return_to_heat_date(), Some(date(2024, 1, 20)));
    }

    #[test]
    fn register_rejects_missing_animal_number() {
        let id = test_cycle_id();
        let err = BreedingCycle::empty(id)
            .handle(&CycleCommand::RegisterCycle(RegisterCycle {
                cycle_id: id,
                details: CycleDetails::new(0, date(2024, 1, 1), Pregnancy::Confirmed),
                registered_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn register_rejects_last_insemination_before_first() {
        let id = test_cycle_id();
        let mut details = CycleDetails::new(5, date(2024, 1, 10), Pregnancy::Confirmed);
        details.last_insemination_date = Some(date(2024, 1, 9));
        let err = BreedingCycle::empty(id)
            .handle(&CycleCommand::RegisterCycle(RegisterCycle {
                cycle_id: id,
                details,
                registered_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn register_rejects_duplicate_creation() {
        let cycle = pregnant_cycle();
        let err = cycle
            .handle(&CycleCommand::RegisterCycle(RegisterCycle {
                cycle_id: cycle.id_typed(),
                details: cycle.details().clone(),
                registered_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn amending_insemination_date_does_not_shift_schedule() {
        let mut cycle = pregnant_cycle();
        let before = cycle.management_schedule().cloned();

        let mut details = cycle.details().clone();
        details.first_insemination_date = date(2024, 1, 5);
        cycle
            .execute(&CycleCommand::AmendDetails(AmendDetails {
                cycle_id: cycle.id_typed(),
                details,
            }))
            .unwrap();

        assert_eq!(cycle.first_insemination_date(), date(2024, 1, 5));
        assert_eq!(cycle.management_schedule().cloned(), before);
        // The farrowing estimate follows the edited date.
        assert_eq!(cycle.expected_farrowing_date(), date(2024, 4, 28));
    }

    #[test]
    fn confirming_later_generates_schedule_from_current_date() {
        let mut cycle = register(
            test_cycle_id(),
            CycleDetails::new(9, date(2024, 2, 1), Pregnancy::NotConfirmed),
        );
        let mut details = cycle.details().clone();
        details.pregnancy = Pregnancy::Confirmed;
        cycle
            .execute(&CycleCommand::AmendDetails(AmendDetails {
                cycle_id: cycle.id_typed(),
                details,
            }))
            .unwrap();

        let schedule = cycle.management_schedule().expect("schedule generated on confirmation");
        assert_eq!(
            schedule.get(EventKind::Transfer).expected_date(),
            date(2024, 5, 17)
        );
    }

    #[test]
    fn withdrawing_pregnancy_removes_schedule() {
        let mut cycle = pregnant_cycle();
        let mut details = cycle.details().clone();
        details.pregnancy = Pregnancy::NotConfirmed;
        cycle
            .execute(&CycleCommand::AmendDetails(AmendDetails {
                cycle_id: cycle.id_typed(),
                details,
            }))
            .unwrap();
        assert!(cycle.management_schedule().is_none());
        assert_eq!(cycle.return_to_heat_date(), Some(date(2024, 1, 22)));
    }

    #[test]
    fn unchanged_amendment_emits_nothing() {
        let cycle = pregnant_cycle();
        let events = cycle
            .handle(&CycleCommand::AmendDetails(AmendDetails {
                cycle_id: cycle.id_typed(),
                details: cycle.details().clone(),
            }))
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn amend_rejects_unregistered_cycle() {
        let id = test_cycle_id();
        let err = BreedingCycle::empty(id)
            .handle(&CycleCommand::AmendDetails(AmendDetails {
                cycle_id: id,
                details: CycleDetails::new(1, date(2024, 1, 1), Pregnancy::Confirmed),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn complete_then_correct_date_then_reopen() {
        let mut cycle = pregnant_cycle();
        let id = cycle.id_typed();

        cycle
            .execute(&CycleCommand::CompleteEvent(CompleteEvent {
                cycle_id: id,
                kind: EventKind::Deworming,
                completed_on: date(2024, 4, 10),
            }))
            .unwrap();
        let event = cycle.management_schedule().unwrap().get(EventKind::Deworming);
        assert!(event.is_completed());
        assert_eq!(event.completion_date(), Some(date(2024, 4, 10)));
        // Expected date is immutable.
        assert_eq!(event.expected_date(), date(2024, 4, 9));

        cycle
            .execute(&CycleCommand::SetEventCompletionDate(SetEventCompletionDate {
                cycle_id: id,
                kind: EventKind::Deworming,
                completed_on: date(2024, 4, 8),
            }))
            .unwrap();
        assert_eq!(
            cycle
                .management_schedule()
                .unwrap()
                .get(EventKind::Deworming)
                .completion_date(),
            Some(date(2024, 4, 8))
        );

        cycle
            .execute(&CycleCommand::ReopenEvent(ReopenEvent {
                cycle_id: id,
                kind: EventKind::Deworming,
            }))
            .unwrap();
        let event = cycle.management_schedule().unwrap().get(EventKind::Deworming);
        assert!(!event.is_completed());
        assert_eq!(event.completion_date(), None);
    }

    #[test]
    fn completion_date_requires_completed_event() {
        let cycle = pregnant_cycle();
        let err = cycle
            .handle(&CycleCommand::SetEventCompletionDate(SetEventCompletionDate {
                cycle_id: cycle.id_typed(),
                kind: EventKind::Transfer,
                completed_on: date(2024, 4, 17),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn event_updates_need_a_schedule() {
        let cycle = register(
            test_cycle_id(),
            CycleDetails::new(3, date(2024, 1, 1), Pregnancy::NotConfirmed),
        );
        let err = cycle
            .handle(&CycleCommand::SetEventNotes(SetEventNotes {
                cycle_id: cycle.id_typed(),
                kind: EventKind::FirstAntibiotic,
                notes: "late".to_string(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn notes_are_stored() {
        let mut cycle = pregnant_cycle();
        cycle
            .execute(&CycleCommand::SetEventNotes(SetEventNotes {
                cycle_id: cycle.id_typed(),
                kind: EventKind::FirstAntibiotic,
                notes: "batch 2 vaccine".to_string(),
            }))
            .unwrap();
        assert_eq!(
            cycle
                .management_schedule()
                .unwrap()
                .get(EventKind::FirstAntibiotic)
                .notes(),
            "batch 2 vaccine"
        );
    }

    #[test]
    fn farrowing_is_recorded_once_then_amended() {
        let mut cycle = pregnant_cycle();
        let id = cycle.id_typed();
        let outcome = FarrowingOutcome::new(date(2024, 4, 23), 11, 1, 0);

        cycle
            .execute(&CycleCommand::RecordFarrowing(RecordFarrowing {
                cycle_id: id,
                outcome: outcome.clone(),
                recorded_on: date(2024, 4, 24),
            }))
            .unwrap();
        assert_eq!(cycle.farrowing_outcome().map(|o| o.total_piglets()), Some(12));
        assert!(!cycle.is_gestating());

        let err = cycle
            .handle(&CycleCommand::RecordFarrowing(RecordFarrowing {
                cycle_id: id,
                outcome: outcome.clone(),
                recorded_on: date(2024, 4, 24),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let amended = FarrowingOutcome::new(date(2024, 4, 23), 12, 1, 0);
        cycle
            .execute(&CycleCommand::AmendFarrowing(AmendFarrowing {
                cycle_id: id,
                outcome: amended,
                recorded_on: date(2024, 4, 25),
            }))
            .unwrap();
        assert_eq!(cycle.farrowing_outcome().map(|o| o.born_alive), Some(12));
        assert_eq!(cycle.farrowing_outcome().map(|o| o.total_piglets()), Some(13));
    }

    #[test]
    fn farrowing_in_the_future_is_rejected() {
        let cycle = pregnant_cycle();
        let err = cycle
            .handle(&CycleCommand::RecordFarrowing(RecordFarrowing {
                cycle_id: cycle.id_typed(),
                outcome: FarrowingOutcome::new(date(2024, 4, 30), 10, 0, 0),
                recorded_on: date(2024, 4, 24),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn farrowing_requires_confirmed_pregnancy() {
        let cycle = register(
            test_cycle_id(),
            CycleDetails::new(3, date(2024, 1, 1), Pregnancy::NotConfirmed),
        );
        let err = cycle
            .handle(&CycleCommand::RecordFarrowing(RecordFarrowing {
                cycle_id: cycle.id_typed(),
                outcome: FarrowingOutcome::new(date(2024, 4, 24), 10, 0, 0),
                recorded_on: date(2024, 4, 24),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn amend_farrowing_requires_existing_outcome() {
        let cycle = pregnant_cycle();
        let err = cycle
            .handle(&CycleCommand::AmendFarrowing(AmendFarrowing {
                cycle_id: cycle.id_typed(),
                outcome: FarrowingOutcome::new(date(2024, 4, 24), 10, 0, 0),
                recorded_on: date(2024, 4, 24),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn version_increments_on_apply() {
        let mut cycle = pregnant_cycle();
        assert_eq!(cycle.version(), 1);
        cycle
            .execute(&CycleCommand::CompleteEvent(CompleteEvent {
                cycle_id: cycle.id_typed(),
                kind: EventKind::Transfer,
                completed_on: date(2024, 4, 16),
            }))
            .unwrap();
        assert_eq!(cycle.version(), 2);
    }

    #[test]
    fn snapshot_round_trips_through_json_as_registered() {
        let cycle = pregnant_cycle();
        let json = serde_json::to_string(&cycle).unwrap();
        assert!(!json.contains("\"created\""));
        let back: BreedingCycle = serde_json::from_str(&json).unwrap();
        assert!(back.is_registered());
        assert_eq!(back, cycle);
    }
}
