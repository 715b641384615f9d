// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for engine integration tests.

#![allow(
    dead_code,
    reason = "Each test binary uses a different subset of the helpers."
)]

use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kurbo::Size;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use understory_parts::{Collection, Engine, InstanceId, ThemeFile};
use understory_scene::MemoryScene;

/// Wraps collections into a shared theme file.
pub(crate) fn file(collections: impl IntoIterator<Item = Collection>) -> Rc<ThemeFile> {
    let mut file = ThemeFile::new();
    for collection in collections {
        file.add_collection(collection).unwrap();
    }
    Rc::new(file)
}

/// Instantiates the only collection of `collection` at `size`.
pub(crate) fn single(collection: Collection, size: Size) -> (Engine<MemoryScene>, InstanceId) {
    let group = collection.name.clone();
    let mut engine = Engine::new(MemoryScene::new());
    let id = engine.add_instance(file([collection]), &group).unwrap();
    engine.resize(id, size);
    (engine, id)
}

/// Counts warnings emitted while it is installed.
#[derive(Clone, Debug, Default)]
pub(crate) struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }
}
