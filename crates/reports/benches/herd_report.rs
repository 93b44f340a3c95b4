use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{NaiveDate, TimeZone, Utc};
use farrowline_breeding::{
    BreedingCycle, CycleCommand, CycleDetails, FarrowingOutcome, Pregnancy, RecordFarrowing,
    RegisterCycle,
};
use farrowline_core::{Aggregate, CycleId, add_days};
use farrowline_reports::{HerdReport, ReportFilter, farrowing_queue};

/// A herd of `size` cycles spread over 200 animals; two in three have farrowed.
fn herd(size: usize) -> Vec<BreedingCycle> {
    let base = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    (0..size)
        .map(|i| {
            let id = CycleId::new();
            let first = add_days(base, (i % 700) as i64);
            let mut cycle = BreedingCycle::empty(id);
            cycle
                .execute(&CycleCommand::RegisterCycle(RegisterCycle {
                    cycle_id: id,
                    details: CycleDetails::new((i % 200) as u32 + 1, first, Pregnancy::Confirmed),
                    registered_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                }))
                .unwrap();
            if i % 3 != 0 {
                let actual = add_days(first, 114);
                cycle
                    .execute(&CycleCommand::RecordFarrowing(RecordFarrowing {
                        cycle_id: id,
                        outcome: FarrowingOutcome::new(actual, (i % 15) as u32, 1, 0),
                        recorded_on: actual,
                    }))
                    .unwrap();
            }
            cycle
        })
        .collect()
}

fn bench_herd_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("herd_report");
    for size in [100usize, 1_000, 10_000] {
        let cycles = herd(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("unfiltered", size), &cycles, |b, cycles| {
            b.iter(|| HerdReport::build(black_box(cycles), ReportFilter::default()))
        });
        group.bench_with_input(BenchmarkId::new("year_2023", size), &cycles, |b, cycles| {
            b.iter(|| HerdReport::build(black_box(cycles), ReportFilter::for_year(2023)))
        });
    }
    group.finish();
}

fn bench_farrowing_queue(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let cycles = herd(10_000);
    c.bench_function("farrowing_queue/10000", |b| {
        b.iter(|| farrowing_queue(black_box(&cycles), today))
    });
}

criterion_group!(benches, bench_herd_report, bench_farrowing_queue);
criterion_main!(benches);
