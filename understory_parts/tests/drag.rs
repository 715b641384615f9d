// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dragable values, increments and pointer grabs.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Rect, Size, Vec2};
use understory_parts::{
    CollectionBuilder, DescriptionBuilder, DragAxis, DragDir, Engine, InstanceId, PartBuilder,
    PartKind,
};
use understory_scene::MemoryScene;

type Log = Rc<RefCell<Vec<(String, String)>>>;

fn slider() -> (Engine<MemoryScene>, InstanceId, Log) {
    let knob = |name: &str, x, y| {
        PartBuilder::new(name, PartKind::Rectangle)
            .dragable(x, y)
            .confine("trough")
            .description(DescriptionBuilder::new("default", 0.0).min(10.0, 10.0))
    };
    let (mut engine, id) = common::single(
        CollectionBuilder::new("slider")
            .part(PartBuilder::new("trough", PartKind::Rectangle))
            .part(knob("hknob", DragAxis::Forward, DragAxis::Fixed))
            .part(knob("vknob", DragAxis::Fixed, DragAxis::Reversed))
            .part(knob("free", DragAxis::Forward, DragAxis::Forward))
            .part(PartBuilder::new("label", PartKind::Text))
            .build()
            .unwrap(),
        Size::new(110.0, 110.0),
    );
    engine.part_drag_size_set(id, "hknob", 0.0, 1.0);
    engine.part_drag_size_set(id, "vknob", 1.0, 0.0);

    let log: Log = Rc::default();
    let sink = log.clone();
    engine.signal_callback_add(
        id,
        "drag,*",
        "*",
        Box::new(
            move |_: &mut Engine<MemoryScene>, _: InstanceId, emission: &str, source: &str| {
                sink.borrow_mut()
                    .push((emission.to_string(), source.to_string()));
            },
        ),
    );
    (engine, id, log)
}

#[test]
fn direction_classification() {
    let (engine, id, _) = slider();
    assert_eq!(engine.part_drag_dir_get(id, "hknob"), DragDir::X);
    assert_eq!(engine.part_drag_dir_get(id, "vknob"), DragDir::Y);
    assert_eq!(engine.part_drag_dir_get(id, "free"), DragDir::X | DragDir::Y);
    assert_eq!(engine.part_drag_dir_get(id, "label"), DragDir::empty());
    assert_eq!(engine.part_drag_dir_get(id, "missing"), DragDir::empty());
}

#[test]
fn value_positions_knob_inside_confinement() {
    let (mut engine, id, log) = slider();
    assert_eq!(engine.part_geometry(id, "hknob"), Rect::new(0.0, 0.0, 10.0, 110.0));

    engine.part_drag_value_set(id, "hknob", 0.5, 0.0);
    assert_eq!(engine.part_drag_value_get(id, "hknob"), Vec2::new(0.5, 0.0));
    assert_eq!(engine.part_geometry(id, "hknob"), Rect::new(50.0, 0.0, 60.0, 110.0));
    assert_eq!(
        log.borrow().as_slice(),
        &[("drag,set".to_string(), "hknob".to_string())]
    );

    // Same value again: nothing happens.
    engine.part_drag_value_set(id, "hknob", 0.5, 0.0);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn values_are_clamped() {
    let (mut engine, id, _) = slider();
    engine.part_drag_value_set(id, "free", 1.5, -0.5);
    assert_eq!(engine.part_drag_value_get(id, "free"), Vec2::new(1.0, 0.0));
}

#[test]
fn reversed_axis_stores_mirrored_value() {
    let (mut engine, id, _) = slider();
    assert_eq!(engine.part_geometry(id, "vknob"), Rect::new(0.0, 0.0, 110.0, 10.0));

    engine.part_drag_value_set(id, "vknob", 0.0, 0.25);
    assert_eq!(engine.part_drag_value_get(id, "vknob"), Vec2::new(0.0, 0.25));
    // Stored as 0.75, which is what places the knob.
    assert_eq!(engine.part_geometry(id, "vknob"), Rect::new(0.0, 75.0, 110.0, 85.0));

    for v in [0.0, 0.5, 1.0] {
        engine.part_drag_value_set(id, "hknob", v, 0.0);
        assert_eq!(engine.part_drag_value_get(id, "hknob").x, v);
        engine.part_drag_value_set(id, "vknob", 0.0, v);
        assert_eq!(engine.part_drag_value_get(id, "vknob").y, v);
    }
}

#[test]
fn pointer_grab_blocks_api_changes() {
    let (mut engine, id, log) = slider();
    engine.part_drag_step_set(id, "hknob", 0.25, 0.0);

    engine.part_drag_press(id, "hknob");
    engine.part_drag_value_set(id, "hknob", 0.5, 0.0);
    engine.part_drag_step(id, "hknob", 1.0, 0.0);
    assert_eq!(engine.part_drag_value_get(id, "hknob"), Vec2::ZERO);
    assert!(log.borrow().is_empty());

    engine.part_drag_release(id, "hknob");
    engine.part_drag_value_set(id, "hknob", 0.5, 0.0);
    assert_eq!(engine.part_drag_value_get(id, "hknob"), Vec2::new(0.5, 0.0));
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn step_and_page_move_by_increments() {
    let (mut engine, id, log) = slider();
    engine.part_drag_step_set(id, "hknob", 0.25, 0.0);
    engine.part_drag_page_set(id, "hknob", 0.5, 0.0);
    assert_eq!(engine.part_drag_step_get(id, "hknob"), Vec2::new(0.25, 0.0));
    assert_eq!(engine.part_drag_page_get(id, "hknob"), Vec2::new(0.5, 0.0));

    engine.part_drag_step(id, "hknob", 1.0, 0.0);
    assert_eq!(engine.part_drag_value_get(id, "hknob"), Vec2::new(0.25, 0.0));
    engine.part_drag_page(id, "hknob", 1.0, 0.0);
    assert_eq!(engine.part_drag_value_get(id, "hknob"), Vec2::new(0.75, 0.0));
    engine.part_drag_page(id, "hknob", 1.0, 0.0);
    assert_eq!(engine.part_drag_value_get(id, "hknob"), Vec2::new(1.0, 0.0));

    // Already at the end: no change, no notification.
    engine.part_drag_step(id, "hknob", 1.0, 0.0);
    let emissions: Vec<String> = log.borrow().iter().map(|(e, _)| e.clone()).collect();
    assert_eq!(emissions, ["drag,step", "drag,page", "drag,page"]);
}

#[test]
fn reversed_axis_steps_in_user_direction() {
    let (mut engine, id, _) = slider();
    engine.part_drag_step_set(id, "vknob", 0.0, 0.25);
    engine.part_drag_value_set(id, "vknob", 0.0, 0.0);
    engine.part_drag_step(id, "vknob", 0.0, 1.0);
    assert_eq!(engine.part_drag_value_get(id, "vknob"), Vec2::new(0.0, 0.25));
}

#[test]
fn size_step_and_page_setters_clamp() {
    let (mut engine, id, _) = slider();
    engine.part_drag_size_set(id, "free", 2.0, -1.0);
    engine.part_drag_step_set(id, "free", -1.0, 3.0);
    engine.part_drag_page_set(id, "free", 0.5, 9.0);
    assert_eq!(engine.part_drag_size_get(id, "free"), Vec2::new(1.0, 0.0));
    assert_eq!(engine.part_drag_step_get(id, "free"), Vec2::new(0.0, 1.0));
    assert_eq!(engine.part_drag_page_get(id, "free"), Vec2::new(0.5, 1.0));
}

#[test]
fn size_follows_confinement() {
    let (mut engine, id, _) = slider();
    engine.part_drag_size_set(id, "hknob", 0.5, 1.0);
    assert_eq!(engine.part_geometry(id, "hknob"), Rect::new(0.0, 0.0, 55.0, 110.0));
    engine.part_drag_value_set(id, "hknob", 1.0, 0.0);
    assert_eq!(engine.part_geometry(id, "hknob"), Rect::new(55.0, 0.0, 110.0, 110.0));
}

#[test]
fn non_dragable_parts_report_sentinels() {
    let (mut engine, id, log) = slider();
    engine.part_drag_value_set(id, "label", 0.5, 0.5);
    engine.part_drag_size_set(id, "label", 0.5, 0.5);
    engine.part_drag_step_set(id, "label", 0.5, 0.5);
    engine.part_drag_page_set(id, "label", 0.5, 0.5);
    assert_eq!(engine.part_drag_value_get(id, "label"), Vec2::ZERO);
    assert_eq!(engine.part_drag_size_get(id, "label"), Vec2::ZERO);
    assert_eq!(engine.part_drag_step_get(id, "label"), Vec2::ZERO);
    assert_eq!(engine.part_drag_page_get(id, "label"), Vec2::ZERO);
    assert_eq!(engine.part_drag_value_get(id, "missing"), Vec2::ZERO);
    assert!(log.borrow().is_empty());
}
