//! Criterion benchmarks for context_event_logger

use context_event_logger::core::{serializer, Blacklist, FieldValue, Fields};
use context_event_logger::fields;
use context_event_logger::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;

/// Adapter that accepts everything and keeps nothing
struct NullAdapter;

impl Adapter for NullAdapter {
    fn log(&self, _context: &str, data: &Fields, _raw: &RawEvent) -> Result<()> {
        black_box(data);
        Ok(())
    }
}

fn quiet_session() -> Session {
    let session = Session::new();
    session.update_config(|config| config.auto_timestamp = false);
    session
}

fn sample_event() -> Fields {
    fields! {
        "message" => "request handled",
        "status" => 200,
        "user" => fields! { "id" => 42, "roles" => vec![FieldValue::from("admin")] },
    }
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_log_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_event");
    group.throughput(Throughput::Elements(1));

    group.bench_function("no_adapters", |b| {
        let session = quiet_session();
        let logger = session.create_logger("app");
        b.iter(|| logger.log_event(black_box(sample_event()), None));
    });

    group.bench_function("one_adapter", |b| {
        let session = quiet_session();
        session.register_adapter(Arc::new(NullAdapter), None);
        let logger = session.create_logger("app");
        b.iter(|| logger.log_event(black_box(sample_event()), None));
    });

    group.bench_function("nested_context_three_levels", |b| {
        let session = quiet_session();
        session.register_adapter(Arc::new(NullAdapter), None);
        let app = session.create_logger("app");
        app.set(&fields! { "app" => "bench" });
        let dialog = session.create_child("dialog", &app);
        dialog.set(&fields! { "dialog" => "settings" });
        let page = session.create_child("page", &dialog);
        b.iter(|| page.log_event(black_box(sample_event()), Some(LogLevel::Info)));
    });

    group.bench_function("with_timestamp_and_blacklist", |b| {
        let session = Session::new();
        session.set_blacklist(["user"]);
        session.register_adapter(Arc::new(NullAdapter), None);
        let logger = session.create_logger("app");
        b.iter(|| logger.log_event(black_box(sample_event()), None));
    });

    group.finish();
}

// ============================================================================
// Serializer and Blacklist Benchmarks
// ============================================================================

fn bench_serializer(c: &mut Criterion) {
    let value = FieldValue::Object(sample_event());
    c.bench_function("serializer_to_str", |b| {
        b.iter(|| serializer::to_str(black_box(&value)));
    });
}

fn bench_blacklist(c: &mut Criterion) {
    let blacklist = Blacklist::from_keys(["password", "token", "user"]);
    let event = sample_event();
    c.bench_function("blacklist_filter_fields", |b| {
        b.iter(|| blacklist.filter_fields(black_box(&event)));
    });
}

criterion_group!(benches, bench_log_event, bench_serializer, bench_blacklist);
criterion_main!(benches);
