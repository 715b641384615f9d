// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signal dispatch, queuing and reentrancy.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::Size;
use understory_parts::{
    CallbackId, CollectionBuilder, Engine, InstanceId, PartBuilder, PartKind, SignalCallback,
};
use understory_scene::MemoryScene;

type Log = Rc<RefCell<Vec<String>>>;

fn setup() -> (Engine<MemoryScene>, InstanceId) {
    common::single(
        CollectionBuilder::new("button")
            .part(PartBuilder::new("bg", PartKind::Rectangle))
            .build()
            .unwrap(),
        Size::new(10.0, 10.0),
    )
}

fn logger(log: &Log) -> SignalCallback<MemoryScene> {
    let sink = log.clone();
    Box::new(
        move |_: &mut Engine<MemoryScene>, _: InstanceId, emission: &str, source: &str| {
            sink.borrow_mut().push(format!("{emission}@{source}"));
        },
    )
}

#[test]
fn emission_and_source_are_matched_by_glob() {
    let (mut engine, id) = setup();
    let log = Log::default();
    engine.signal_callback_add(id, "mouse,*", "bg*", logger(&log));

    engine.signal_emit(id, "mouse,down,1", "bg");
    engine.signal_emit(id, "mouse,up,1", "bg.shadow");
    engine.signal_emit(id, "key,down", "bg");
    engine.signal_emit(id, "mouse,in", "label");
    assert_eq!(
        log.borrow().as_slice(),
        ["mouse,down,1@bg", "mouse,up,1@bg.shadow"]
    );
}

#[test]
fn signals_from_callbacks_are_queued_in_order() {
    let (mut engine, id) = setup();
    let log = Log::default();
    engine.signal_callback_add(
        id,
        "start",
        "*",
        Box::new(
            |engine: &mut Engine<MemoryScene>, id: InstanceId, _: &str, _: &str| {
                engine.signal_emit(id, "second", "relay");
                engine.signal_emit(id, "third", "relay");
            },
        ),
    );
    engine.signal_callback_add(id, "*", "*", logger(&log));

    engine.signal_emit(id, "start", "test");
    assert_eq!(
        log.borrow().as_slice(),
        ["start@test", "second@relay", "third@relay"]
    );
    assert_eq!(engine.block_depth(id), 0);
}

#[test]
fn deleted_callbacks_are_not_called() {
    let (mut engine, id) = setup();
    let log = Log::default();
    let cb = engine.signal_callback_add(id, "*", "*", logger(&log)).unwrap();
    assert!(engine.signal_callback_del(id, cb));
    assert!(!engine.signal_callback_del(id, cb));
    engine.signal_emit(id, "ping", "test");
    assert!(log.borrow().is_empty());
}

#[test]
fn callback_may_delete_another_mid_dispatch() {
    let (mut engine, id) = setup();
    let log = Log::default();
    let victim: Rc<Cell<Option<CallbackId>>> = Rc::default();
    let target = victim.clone();
    let deleted = Rc::new(Cell::new(false));
    let result = deleted.clone();
    engine.signal_callback_add(
        id,
        "*",
        "*",
        Box::new(
            move |engine: &mut Engine<MemoryScene>, id: InstanceId, _: &str, _: &str| {
                if let Some(cb) = target.take() {
                    result.set(engine.signal_callback_del(id, cb));
                }
            },
        ),
    );
    victim.set(engine.signal_callback_add(id, "*", "*", logger(&log)));

    engine.signal_emit(id, "ping", "test");
    assert!(deleted.get());
    assert!(log.borrow().is_empty());

    engine.signal_emit(id, "ping", "test");
    assert!(log.borrow().is_empty());
}

#[test]
fn callback_may_delete_itself() {
    let (mut engine, id) = setup();
    let me: Rc<Cell<Option<CallbackId>>> = Rc::default();
    let own = me.clone();
    let calls = Rc::new(Cell::new(0));
    let count = calls.clone();
    me.set(engine.signal_callback_add(
        id,
        "*",
        "*",
        Box::new(
            move |engine: &mut Engine<MemoryScene>, id: InstanceId, _: &str, _: &str| {
                count.set(count.get() + 1);
                if let Some(cb) = own.get() {
                    engine.signal_callback_del(id, cb);
                }
            },
        ),
    ));

    engine.signal_emit(id, "ping", "test");
    engine.signal_emit(id, "ping", "test");
    assert_eq!(calls.get(), 1);
}

#[test]
fn removing_the_instance_aborts_dispatch() {
    let (mut engine, id) = setup();
    let log = Log::default();
    engine.signal_callback_add(
        id,
        "close",
        "*",
        Box::new(
            |engine: &mut Engine<MemoryScene>, id: InstanceId, _: &str, _: &str| {
                engine.signal_emit(id, "closing", "self");
                engine.remove_instance(id);
                // Already treated as gone.
                assert!(!engine.is_alive(id));
            },
        ),
    );
    engine.signal_callback_add(id, "*", "*", logger(&log));

    engine.signal_emit(id, "close", "test");
    assert!(log.borrow().is_empty());
    assert!(!engine.is_alive(id));
    assert!(engine.scene().is_empty());
}

#[test]
fn block_violation_skips_remaining_handlers() {
    let (mut engine, id) = setup();
    let log = Log::default();
    engine.signal_callback_add(
        id,
        "stop",
        "*",
        Box::new(
            |engine: &mut Engine<MemoryScene>, id: InstanceId, _: &str, _: &str| {
                engine.block_violate(id);
            },
        ),
    );
    engine.signal_callback_add(id, "*", "*", logger(&log));

    engine.signal_emit(id, "stop", "test");
    assert!(log.borrow().is_empty());
    assert!(engine.is_alive(id));
    assert!(!engine.is_block_broken(id));
    assert_eq!(engine.block_depth(id), 0);

    engine.signal_emit(id, "go", "test");
    assert_eq!(log.borrow().as_slice(), ["go@test"]);
}

#[test]
fn stale_instance_has_no_signals() {
    let (mut engine, id) = setup();
    engine.remove_instance(id);
    let log = Log::default();
    assert_eq!(engine.signal_callback_add(id, "*", "*", logger(&log)), None);
    engine.signal_emit(id, "ping", "test");
    assert!(log.borrow().is_empty());
}
