// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Size;
use understory_parts::{
    Collection, CollectionBuilder, DescriptionBuilder, Engine, InstanceId, PartBuilder, PartKind,
    ThemeFile,
};
use understory_scene::MemoryScene;

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_usize(&mut self, upper_exclusive: usize) -> usize {
        if upper_exclusive == 0 {
            return 0;
        }
        (self.next_u32() as usize) % upper_exclusive
    }

    fn gen_offset(&mut self) -> f64 {
        f64::from(self.next_u32() % 9) - 4.0
    }
}

/// Builds a collection of `n` parts, each anchored to a random earlier part.
///
/// Every fourth part is a label that grows to its text and every part has a
/// second state so benches can flip between them.
fn build_collection(n: usize, seed: u64) -> Collection {
    let mut rng = Lcg::new(seed);
    let mut builder =
        CollectionBuilder::new("bench").part(PartBuilder::new("p0", PartKind::Rectangle));
    for i in 1..n {
        let to = format!("p{}", rng.gen_range_usize(i));
        let (kind, text) = if i % 4 == 0 {
            (PartKind::Text, true)
        } else {
            (PartKind::Rectangle, false)
        };
        let mut default = DescriptionBuilder::new("default", 0.0)
            .rel1_to(&to)
            .rel2_to(&to)
            .rel1((0.0, 0.0), (rng.gen_offset(), rng.gen_offset()))
            .rel2((1.0, 1.0), (rng.gen_offset(), rng.gen_offset()))
            .min(f64::from(rng.next_u32() % 16), 0.0)
            .color_class("bench");
        if text {
            default = default.text("label text").font("Sans", 10).text_min(true, true);
        }
        let active = DescriptionBuilder::new("active", 0.0)
            .rel1_to(&to)
            .rel2_to(&to)
            .rel1((0.25, 0.25), (0.0, 0.0))
            .rel2((0.75, 0.75), (0.0, 0.0));
        builder = builder.part(
            PartBuilder::new(&format!("p{i}"), kind)
                .description(default)
                .description(active),
        );
    }
    builder.build().expect("generated collections are valid")
}

fn build_file(n: usize, seed: u64) -> Rc<ThemeFile> {
    let mut file = ThemeFile::new();
    file.add_collection(build_collection(n, seed))
        .expect("single collection");
    Rc::new(file)
}

fn build_engine(
    file: &Rc<ThemeFile>,
    instances: usize,
) -> (Engine<MemoryScene>, Vec<InstanceId>) {
    let mut engine = Engine::new(MemoryScene::new());
    let ids = (0..instances)
        .map(|_| {
            let id = engine
                .add_instance(file.clone(), "bench")
                .expect("collection exists");
            engine.resize(id, Size::new(400.0, 300.0));
            id
        })
        .collect();
    (engine, ids)
}

fn bench_recalc(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_parts");
    group.sample_size(50);

    for &n in &[16_usize, 128, 1_024] {
        let file = build_file(n, 0x9A27_0000_0000_0001);

        group.bench_function(format!("add_instance(n={n})"), |b| {
            b.iter_batched(
                || Engine::new(MemoryScene::new()),
                |mut engine| {
                    let id = engine.add_instance(file.clone(), "bench");
                    black_box((engine, id));
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("resize(n={n})"), |b| {
            let (mut engine, ids) = build_engine(&file, 1);
            let mut wide = false;
            b.iter(|| {
                wide = !wide;
                let w = if wide { 640.0 } else { 400.0 };
                engine.resize(ids[0], Size::new(w, 300.0));
                black_box(engine.part_geometry(ids[0], "p1"));
            });
        });

        group.bench_function(format!("frozen_state_flip(n={n})"), |b| {
            let (mut engine, ids) = build_engine(&file, 1);
            let id = ids[0];
            let names: Vec<String> = (1..n).map(|i| format!("p{i}")).collect();
            let mut active = false;
            b.iter(|| {
                active = !active;
                let state = if active { "active" } else { "default" };
                engine.freeze(id);
                for name in &names {
                    engine.part_state_set(id, name, state, 0.0);
                }
                engine.thaw(id);
                black_box(engine.recalc_count(id));
            });
        });

        group.bench_function(format!("size_min_calc(n={n})"), |b| {
            let (mut engine, ids) = build_engine(&file, 1);
            b.iter(|| black_box(engine.size_min_calc(ids[0])));
        });
    }

    for &instances in &[8_usize, 64] {
        let file = build_file(32, 0x9A27_0000_0000_0002);
        group.bench_function(format!("color_class_fan_out(instances={instances})"), |b| {
            let (mut engine, _) = build_engine(&file, instances);
            let mut red = false;
            b.iter(|| {
                red = !red;
                let r = if red { 255 } else { 0 };
                engine.color_class_set("bench", [r, 0, 0, 255], [0; 4], [0; 4]);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_recalc);
criterion_main!(benches);
