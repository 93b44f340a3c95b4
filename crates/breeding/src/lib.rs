//! Breeding domain module: the reproductive timeline engine.
//!
//! This crate contains the business rules for breeding cycles (insemination,
//! gestation schedule, farrowing) and the matrix registry, implemented purely
//! as deterministic domain logic (no IO, no storage, no system clock reads
//! outside an injected [`farrowline_core::Clock`]).

pub mod cycle;
pub mod matrix;
pub mod outcome;
pub mod schedule;
pub mod status;

pub use cycle::{
    AmendDetails, AmendFarrowing, BreedingCycle, CompleteEvent, CycleCommand, CycleDetails,
    CycleEvent, CycleRegistered, DetailsAmended, EventCompleted, EventCompletionDateChanged,
    EventNotesChanged, EventReopened, FarrowingAmended, FarrowingRecorded, Pregnancy,
    RecordFarrowing, RegisterCycle, ReopenEvent, ScheduleChange, SetEventCompletionDate,
    SetEventNotes,
};
pub use matrix::{AnimalAge, Matrix, MatrixProfile, MatrixStatus};
pub use outcome::{FarrowingOutcome, MAX_PIGLETS_PER_COUNT};
pub use schedule::{
    EventKind, GESTATION_LENGTH_DAYS, ManagementEvent, ManagementSchedule, MilestonePlan,
    RETURN_TO_HEAT_DAYS,
};
pub use status::{
    CycleStatus, CycleView, EventStatus, EventView, GestationProgress, StatusTone, Urgency,
    classify, gestation_progress,
};
