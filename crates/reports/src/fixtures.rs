//! Cycle builders shared by the report tests.

use chrono::{NaiveDate, TimeZone, Utc};

use farrowline_breeding::{
    BreedingCycle, CycleCommand, CycleDetails, FarrowingOutcome, Pregnancy, RecordFarrowing,
    RegisterCycle,
};
use farrowline_core::{Aggregate, CycleId};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn registered(animal: u32, first: NaiveDate, pregnancy: Pregnancy) -> BreedingCycle {
    let mut details = CycleDetails::new(animal, first, pregnancy);
    details.sire_id = Some(format!("Duroc-{animal}"));
    with_details(details)
}

pub fn with_details(details: CycleDetails) -> BreedingCycle {
    let id = CycleId::new();
    let mut cycle = BreedingCycle::empty(id);
    cycle
        .execute(&CycleCommand::RegisterCycle(RegisterCycle {
            cycle_id: id,
            details,
            registered_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }))
        .unwrap();
    cycle
}

pub fn farrowed(
    animal: u32,
    first: NaiveDate,
    actual: NaiveDate,
    born_alive: u32,
    stillborn: u32,
    mummified: u32,
) -> BreedingCycle {
    let mut cycle = registered(animal, first, Pregnancy::Confirmed);
    let cycle_id = cycle.id_typed();
    cycle
        .execute(&CycleCommand::RecordFarrowing(RecordFarrowing {
            cycle_id,
            outcome: FarrowingOutcome::new(actual, born_alive, stillborn, mummified),
            recorded_on: actual,
        }))
        .unwrap();
    cycle
}
