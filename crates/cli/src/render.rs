//! Text rendering of cycles, boards and reports.

use std::fmt::Write as _;

use chrono::NaiveDate;

use farrowline_breeding::{BreedingCycle, CycleView, Matrix, MatrixStatus};
use farrowline_core::calendar::format_br_date;
use farrowline_reports::{AnimalHistory, GestationEntry, HerdReport, QueueEntry};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn date(d: NaiveDate) -> String {
    format_br_date(Some(d))
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

pub fn cycle_header() -> String {
    format!(
        "{:<36}  {:>6}  {:<8}  {:<10}  {:<10}  {}",
        "ID", "ANIMAL", "BATCH", "FIRST", "DUE", "STATUS"
    )
}

pub fn cycle_row(cycle: &BreedingCycle, view: &CycleView) -> String {
    let due = if cycle.pregnancy().is_confirmed() {
        date(cycle.expected_farrowing_date())
    } else {
        "-".to_string()
    };
    format!(
        "{:<36}  {:>6}  {:<8}  {:<10}  {:<10}  {}",
        cycle.id_typed(),
        cycle.animal_number(),
        or_dash(cycle.batch_label()),
        date(cycle.first_insemination_date()),
        due,
        view.status
    )
}

pub fn cycle_detail(cycle: &BreedingCycle, view: &CycleView, matrix: Option<&Matrix>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cycle {}", cycle.id_typed());
    let _ = write!(out, "  Animal           #{}", cycle.animal_number());
    if let Some(matrix) = matrix {
        let _ = write!(out, " {}", or_dash(matrix.name()));
        if let Some(age) = matrix.age_on(view.today) {
            let _ = write!(out, " ({age})");
        }
    }
    out.push('\n');
    let _ = writeln!(out, "  Batch            {}", or_dash(cycle.batch_label()));
    let _ = writeln!(out, "  Status           {}", view.status);
    let _ = writeln!(out, "  First insem.     {}", date(cycle.first_insemination_date()));
    let _ = writeln!(out, "  Last insem.      {}", format_br_date(cycle.last_insemination_date()));
    if let Some(doses) = cycle.dose_count() {
        let _ = writeln!(out, "  Doses            {doses}");
    }
    let _ = writeln!(out, "  Sire             {}", cycle.sire_id().unwrap_or("-"));

    if cycle.pregnancy().is_confirmed() {
        let _ = writeln!(out, "  Expected birth   {}", date(cycle.expected_farrowing_date()));
    } else {
        let _ = writeln!(out, "  Return to heat   {}", format_br_date(cycle.return_to_heat_date()));
        if cycle.return_to_heat_date() != Some(view.expected_return_to_heat_date) {
            let _ = writeln!(out, "  Expected heat    {}", date(view.expected_return_to_heat_date));
        }
    }

    if let Some(progress) = &view.progress {
        let _ = writeln!(
            out,
            "  Gestation        day {}, {} days to farrowing ({})",
            progress.gestation_day,
            progress.days_until_farrowing,
            progress.urgency.label()
        );
    }

    if !view.events.is_empty() {
        let _ = writeln!(out, "  Management events");
        for event in &view.events {
            let _ = write!(
                out,
                "    {:<28} day {:>3}  {}  {}",
                event.label,
                event.gestation_day,
                date(event.expected_date),
                event.status
            );
            if !event.notes.is_empty() {
                let _ = write!(out, "  [{}]", event.notes);
            }
            out.push('\n');
        }
    }

    if let Some(outcome) = cycle.farrowing_outcome() {
        let _ = writeln!(
            out,
            "  Farrowing        {}: {} alive, {} stillborn, {} mummified ({} total)",
            date(outcome.actual_date),
            outcome.born_alive,
            outcome.stillborn,
            outcome.mummified,
            outcome.total_piglets()
        );
        if let Some(weight) = outcome.average_weight {
            let _ = writeln!(out, "  Average weight   {weight:.2} kg");
        }
    }
    out
}

pub fn gestation_board(entries: &[GestationEntry]) -> String {
    let mut out = String::new();
    if entries.is_empty() {
        out.push_str("No gestating cycles.\n");
        return out;
    }
    for entry in entries {
        let _ = writeln!(
            out,
            "#{:<6} {:<8} day {:>3}  due {} ({} days, {})",
            entry.animal_number,
            or_dash(&entry.batch_label),
            entry.progress.gestation_day,
            date(entry.progress.expected_farrowing_date),
            entry.progress.days_until_farrowing,
            entry.progress.urgency.label()
        );
        for event in &entry.view.events {
            let _ = writeln!(out, "    {:<28} {}", event.label, event.status);
        }
    }
    out
}

pub fn farrowing_queue(queue: &[QueueEntry]) -> String {
    let mut out = String::new();
    if queue.is_empty() {
        out.push_str("No farrowings expected.\n");
        return out;
    }
    let _ = writeln!(out, "{:>6}  {:<8}  {:<10}  {:>5}  {}", "ANIMAL", "BATCH", "DUE", "DAYS", "FLAG");
    for entry in queue {
        let _ = writeln!(
            out,
            "{:>6}  {:<8}  {:<10}  {:>5}  {}",
            entry.animal_number,
            or_dash(&entry.batch_label),
            date(entry.expected_farrowing_date),
            entry.days_until_farrowing,
            entry.flag.label()
        );
    }
    out
}

pub fn herd_report(report: &HerdReport, top: usize) -> String {
    let mut out = String::new();
    let totals = &report.totals;
    let _ = writeln!(
        out,
        "Cycles {}  Births {}  Farrowing rate {:.1}%",
        totals.cycles,
        totals.births,
        totals.farrowing_rate()
    );
    let _ = writeln!(
        out,
        "Born alive {}  Losses {}  Total piglets {}  Avg born alive {:.2}",
        totals.born_alive,
        totals.losses(),
        totals.total_piglets(),
        totals.average_born_alive()
    );

    let _ = writeln!(out, "\nRanking (born alive)");
    let _ = writeln!(
        out,
        "{:>4}  {:>6}  {:>6}  {:>6}  {:>6}  {:>7}  {}",
        "#", "ANIMAL", "CYCLES", "BIRTHS", "ALIVE", "AVG", "TIER"
    );
    for (rank, animal) in report.animals.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:>6}  {:>6}  {:>6}  {:>6}  {:>7.2}  {}",
            rank + 1,
            animal.animal_number,
            animal.tally.cycles,
            animal.tally.births,
            animal.tally.born_alive,
            animal.tally.average_born_alive(),
            animal.tier()
        );
    }

    let _ = writeln!(out, "\nTop {top} by total piglets");
    for animal in report.top_by_total_piglets(top) {
        let _ = writeln!(out, "  #{:<6} {}", animal.animal_number, animal.tally.total_piglets());
    }

    let _ = writeln!(out, "\nBorn alive per month");
    for (month, count) in MONTHS.iter().zip(report.monthly_born_alive) {
        let _ = writeln!(out, "  {month}  {count:>5}");
    }
    out
}

pub fn history(history: &AnimalHistory) -> String {
    let mut out = String::new();
    let summary = &history.summary;
    let _ = writeln!(out, "Animal #{}", history.animal_number);
    let _ = writeln!(
        out,
        "Cycles {}  Births {}  Farrowing rate {:.1}%  Born alive {} (avg {:.2})  Losses {}",
        summary.cycles,
        summary.births,
        summary.farrowing_rate(),
        summary.born_alive,
        summary.average_born_alive(),
        summary.losses()
    );
    for entry in &history.entries {
        let birth = match &entry.outcome {
            Some(o) => format!(
                "born {}: {} alive, {} lost",
                date(o.actual_date),
                o.born_alive,
                o.stillborn + o.mummified
            ),
            None => format!("due {}", date(entry.expected_farrowing_date)),
        };
        let _ = writeln!(
            out,
            "  {}  {:<8}  {:<12}  {}",
            date(entry.first_insemination_date),
            or_dash(&entry.batch_label),
            entry.status.label(),
            birth
        );
    }
    out
}

pub fn matrix_header() -> String {
    format!(
        "{:>6}  {:<16}  {:<12}  {:<8}  {:<8}  {}",
        "NUMBER", "NAME", "BREED", "AGE", "STATUS", "SIRE x DAM"
    )
}

pub fn matrix_row(matrix: &Matrix, today: NaiveDate) -> String {
    let profile = matrix.profile();
    let age = matrix
        .age_on(today)
        .map_or_else(|| "-".to_string(), |a| a.to_string());
    let status = match profile.status {
        MatrixStatus::Active => "active",
        MatrixStatus::Inactive => "inactive",
        MatrixStatus::Culled => "culled",
    };
    format!(
        "{:>6}  {:<16}  {:<12}  {:<8}  {:<8}  {} x {}",
        profile.number,
        or_dash(&profile.name),
        or_dash(&profile.breed),
        age,
        status,
        or_dash(&profile.sire),
        or_dash(&profile.dam)
    )
}

pub fn no_history_hint(years: &[i32], animals: &[u32]) -> String {
    let join = |items: Vec<String>| if items.is_empty() { "-".to_string() } else { items.join(", ") };
    format!(
        "No cycles found.\n  Animals with records: {}\n  Insemination years: {}\n",
        join(animals.iter().map(|n| format!("#{n}")).collect()),
        join(years.iter().map(i32::to_string).collect())
    )
}
