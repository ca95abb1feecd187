//! Throughput of the display sanitizer and PII scrubber.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sinkguard::security::pii::scrub_text;
use sinkguard::security::sanitizer::{escape_for_display, escape_html};
use sinkguard::{Classification, ClassifiedValue};

const CLEAN: &str = "Prefers contact by email in the mornings; portfolio review due in March";
const HOSTILE: &str = "<script>alert('x')</script><img src=x onerror=\"steal()\"> &amp; more";
const NOTE: &str = "user u1 loaded from database; password = Abcdefg123 (CC: 4111111111111111)";

fn bench_escape(c: &mut Criterion) {
    c.bench_function("escape_html clean", |b| b.iter(|| escape_html(black_box(CLEAN))));
    c.bench_function("escape_html hostile", |b| b.iter(|| escape_html(black_box(HOSTILE))));

    let value = ClassifiedValue::new(HOSTILE.to_string(), Classification::PersonallyIdentifiable);
    c.bench_function("escape_for_display hostile", |b| {
        b.iter(|| escape_for_display(black_box(&value)))
    });
}

fn bench_scrub(c: &mut Criterion) {
    c.bench_function("scrub_text note", |b| b.iter(|| scrub_text(black_box(NOTE))));
    c.bench_function("scrub_text clean", |b| b.iter(|| scrub_text(black_box(CLEAN))));
}

criterion_group!(benches, bench_escape, bench_scrub);
criterion_main!(benches);
