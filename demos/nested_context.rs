//! Nested context demo: app -> dialog -> page
//!
//! Run with `cargo run --example nested_context`.

use context_event_logger::appenders::ConsoleAdapter;
use context_event_logger::core::{FieldValue, Session};
use context_event_logger::{event, fields, info, LogLevel};
use std::sync::Arc;

fn main() {
    let session = Session::new();
    session.register_adapter(Arc::new(ConsoleAdapter::new()), None);
    session.set_blacklist(["password"]);
    session.set_global(&fields! { "release" => "1.0.0" });

    let app = session.create_logger("app");
    app.set(&fields! { "app" => "demo", "user" => "bob" });

    let dialog = session.create_child("dialog", &app);
    dialog.set(&fields! { "dialog" => "login" });

    let page = session.create_child("page", &dialog);
    page.set(&fields! { "page" => 1 });

    info!(app, "application started");
    page.log("page shown", &[FieldValue::from("after"), FieldValue::from(120), FieldValue::from("ms")]);
    event!(dialog, { "message" => "credentials entered", "password" => "hunter2" });
    event!(page, LogLevel::Error, { "message" => "login failed", "attempt" => 3 });

    let metrics = session.metrics();
    println!(
        "\nlogged: {}, delivered: {}, failures: {}",
        metrics.events_logged(),
        metrics.events_delivered(),
        metrics.adapter_failures()
    );
}
