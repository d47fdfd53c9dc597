use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anamnesis_observability::init_tracing_with_filter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

/// Counts debug events emitted from this crate.
struct DebugCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for DebugCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() == Level::DEBUG && meta.target().starts_with("anamnesis_observability") {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn existing_global_subscriber_is_kept_and_reported() {
    let seen = Arc::new(AtomicUsize::new(0));
    tracing_subscriber::registry()
        .with(DebugCounter(Arc::clone(&seen)))
        .try_init()
        .unwrap();

    init_tracing_with_filter("info");
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    // Later calls do nothing.
    init_tracing_with_filter("warn");
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
