//! Performance benchmarks for cronrun
//!
//! Run with: cargo bench

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use cronrun::{CronExpression, ScheduleGenerator};

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse simple", |b| {
        b.iter(|| CronExpression::parse("*/5 * * * *").unwrap());
    });

    c.bench_function("parse busy", |b| {
        b.iter(|| CronExpression::parse("0 22 4/3 2,3,1-5 1-5").unwrap());
    });
}

fn bench_next_trigger(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2022, 12, 23, 19, 0, 0).unwrap();

    let minutely = ScheduleGenerator::new("*/1 * * * *", start).unwrap();
    c.bench_function("next_after minutely", |b| {
        b.iter(|| minutely.next_after(start).unwrap());
    });

    // Worst realistic case: the search walks months of minutes
    let yearly = ScheduleGenerator::new("5 0 * 8 *", start).unwrap();
    c.bench_function("next_after eight-month gap", |b| {
        b.iter(|| yearly.next_after(start).unwrap());
    });
}

criterion_group!(benches, bench_parse, bench_next_trigger);
criterion_main!(benches);
