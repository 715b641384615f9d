// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color and text classes flowing from the registry into instances.

mod common;

use std::collections::BTreeSet;
use std::rc::Rc;

use kurbo::Size;
use understory_classes::{ClassScope, ColorClass, Rgba};
use understory_parts::{
    Collection, CollectionBuilder, DescriptionBuilder, Engine, InstanceId, PartBuilder, PartKind,
    ThemeFile,
};
use understory_scene::MemoryScene;

const RED: [i32; 4] = [255, 0, 0, 255];
const BLUE: [i32; 4] = [0, 0, 255, 255];
const NONE: [i32; 4] = [0, 0, 0, 0];

fn card(name: &str) -> Collection {
    CollectionBuilder::new(name)
        .part(
            PartBuilder::new("accent", PartKind::Rectangle).description(
                DescriptionBuilder::new("default", 0.0).color_class("accent"),
            ),
        )
        .part(
            PartBuilder::new("title", PartKind::Text).description(
                DescriptionBuilder::new("default", 0.0)
                    .text("hi")
                    .text_class("title")
                    .font("Sans", 10),
            ),
        )
        .build()
        .unwrap()
}

fn setup() -> (Engine<MemoryScene>, InstanceId) {
    common::single(card("card"), Size::new(40.0, 20.0))
}

fn accent_color(engine: &Engine<MemoryScene>, id: InstanceId) -> Option<Rgba> {
    let obj = engine.part_object(id, "accent")?;
    engine.scene().color(obj)
}

#[test]
fn process_class_recolors_members() {
    let (mut engine, id) = setup();
    assert_eq!(accent_color(&engine, id), Some(Rgba::WHITE));

    engine.color_class_set("accent", [255, 0, 0, 128], NONE, NONE);
    assert_eq!(accent_color(&engine, id), Some(Rgba::new(255, 0, 0, 128)));

    engine.color_class_del("accent");
    assert_eq!(accent_color(&engine, id), Some(Rgba::WHITE));
}

#[test]
fn channels_are_clamped() {
    let (mut engine, _) = setup();
    engine.color_class_set("accent", [300, -5, 128, 255], [256, 0, 0, 0], [-1, 0, 0, 1000]);
    let class = engine.color_class_get("accent").unwrap();
    assert_eq!(class.object, Rgba::new(255, 0, 128, 255));
    assert_eq!(class.outline, Rgba::new(255, 0, 0, 0));
    assert_eq!(class.shadow, Rgba::new(0, 0, 0, 255));
}

#[test]
fn unchanged_values_notify_nobody() {
    let (mut engine, id) = setup();
    let start = engine.recalc_count(id);

    engine.color_class_set("accent", RED, NONE, NONE);
    assert_eq!(engine.recalc_count(id), start + 1);
    engine.color_class_set("accent", RED, NONE, NONE);
    assert_eq!(engine.recalc_count(id), start + 1);

    // A brand-new all-zero class compares equal to its zeroed default.
    engine.color_class_set("unused", NONE, NONE, NONE);
    engine.color_class_set("accent2", NONE, NONE, NONE);
    assert_eq!(engine.recalc_count(id), start + 1);
}

#[test]
fn deleting_unknown_class_is_a_no_op() {
    let (mut engine, id) = setup();
    let start = engine.recalc_count(id);
    engine.color_class_del("nope");
    engine.text_class_del("nope");
    engine.object_color_class_del(id, "nope");
    assert_eq!(engine.recalc_count(id), start);
}

#[test]
fn list_reports_classes_with_members_once() {
    let (mut engine, a) = setup();
    let b = engine
        .add_instance(common::file([card("other")]), "other")
        .unwrap();

    let names: Vec<&str> = engine.color_class_list().collect();
    assert_eq!(names, ["accent"]);
    let names: Vec<&str> = engine.text_class_list().collect();
    assert_eq!(names, ["title"]);

    engine.remove_instance(a);
    assert_eq!(engine.color_class_list().count(), 1);
    engine.remove_instance(b);
    assert_eq!(engine.color_class_list().count(), 0);
}

#[test]
fn instance_scope_shadows_process_scope() {
    let (mut engine, id) = setup();
    engine.color_class_set("accent", RED, NONE, NONE);

    engine.object_color_class_set(id, "accent", [0, 255, 0, 255], NONE, NONE);
    engine.object_color_class_set(id, "accent", BLUE, NONE, NONE);
    let (scope, class) = engine.color_class_resolve(id, "accent").unwrap();
    assert_eq!(scope, ClassScope::Instance);
    assert_eq!(class.object, Rgba::new(0, 0, 255, 255));
    assert_eq!(accent_color(&engine, id), Some(Rgba::new(0, 0, 255, 255)));

    // Later process-level writes stay hidden behind the instance entry.
    engine.color_class_set("accent", [10, 20, 30, 255], NONE, NONE);
    assert_eq!(accent_color(&engine, id), Some(Rgba::new(0, 0, 255, 255)));

    engine.object_color_class_del(id, "accent");
    let (scope, _) = engine.color_class_resolve(id, "accent").unwrap();
    assert_eq!(scope, ClassScope::Process);
    assert_eq!(accent_color(&engine, id), Some(Rgba::new(10, 20, 30, 255)));
}

#[test]
fn file_scope_is_the_last_resort() {
    let mut file = ThemeFile::new();
    file.classes
        .colors
        .set(ColorClass::from_channels("accent", [0, 128, 0, 255], NONE, NONE));
    file.add_collection(card("card")).unwrap();
    let mut engine = Engine::new(MemoryScene::new());
    let id = engine.add_instance(Rc::new(file), "card").unwrap();

    let (scope, _) = engine.color_class_resolve(id, "accent").unwrap();
    assert_eq!(scope, ClassScope::File);
    assert_eq!(accent_color(&engine, id), Some(Rgba::new(0, 128, 0, 255)));

    engine.color_class_set("accent", RED, NONE, NONE);
    let (scope, _) = engine.color_class_resolve(id, "accent").unwrap();
    assert_eq!(scope, ClassScope::Process);
}

#[test]
fn text_classes_restyle_text_parts() {
    let (mut engine, id) = setup();
    let title = engine.part_object(id, "title").unwrap();
    assert_eq!(engine.scene().text_style(title), Some((Some("Sans"), 10)));
    assert_eq!(engine.scene().text(title), Some("hi"));

    engine.text_class_set("title", Some("Serif"), 20);
    assert_eq!(engine.scene().text_style(title), Some((Some("Serif"), 20)));

    // Only a positive size overrides; a missing font keeps the description's.
    engine.object_text_class_set(id, "title", None, 30);
    assert_eq!(engine.scene().text_style(title), Some((Some("Sans"), 30)));

    engine.fontset_append_set(Some("Fallback"));
    assert_eq!(engine.fontset_append_get(), Some("Fallback"));
    assert_eq!(
        engine.scene().text_style(title),
        Some((Some("Sans,Fallback"), 30))
    );

    engine.object_text_class_del(id, "title");
    assert_eq!(
        engine.scene().text_style(title),
        Some((Some("Serif,Fallback"), 20))
    );
}

#[test]
fn clear_releases_everything() {
    let (mut engine, id) = setup();
    engine.color_class_set("accent", RED, NONE, NONE);
    engine.clear();
    assert!(!engine.is_alive(id));
    assert!(engine.scene().is_empty());
    assert!(engine.color_class_get("accent").is_none());
    let names: BTreeSet<&str> = engine.color_class_list().collect();
    assert!(names.is_empty());
}
