// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Part geometry recalculation and the minimum-size solver.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;
use tracing::{trace, warn};
use understory_classes::{ClassCx, Rgba};
use understory_scene::{ObjectId, ObjectKind, Scene};

use crate::engine::{Engine, InstanceId};
use crate::part::{RealPart, SwallowLimits, TextStyle};
use crate::swallow::AspectMode;
use crate::theme::{Anchor, Collection, PartKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Pending,
    Active,
    Done,
}

/// Resolved values of one description.
#[derive(Copy, Clone, Debug)]
struct Params {
    rect: Rect,
    req: Rect,
    color: Rgba,
    visible: bool,
}

impl Params {
    fn mix(self, other: Self, pos: f64) -> Self {
        Self {
            rect: mix_rect(self.rect, other.rect, pos),
            req: mix_rect(self.req, other.req, pos),
            color: Rgba::new(
                mix_channel(self.color.r, other.color.r, pos),
                mix_channel(self.color.g, other.color.g, pos),
                mix_channel(self.color.b, other.color.b, pos),
                mix_channel(self.color.a, other.color.a, pos),
            ),
            visible: if pos < 0.5 {
                self.visible
            } else {
                other.visible
            },
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn snap(origin: Point, size: Size) -> Rect {
    Rect::from_origin_size(origin.round(), size.round())
}

fn mix_rect(a: Rect, b: Rect, t: f64) -> Rect {
    snap(
        Point::new(lerp(a.x0, b.x0, t), lerp(a.y0, b.y0, t)),
        Size::new(
            lerp(a.width(), b.width(), t),
            lerp(a.height(), b.height(), t),
        ),
    )
}

fn mix_channel(a: u8, b: u8, t: f64) -> u8 {
    let v = lerp(f64::from(a), f64::from(b), t) + 0.5;
    #[expect(
        clippy::cast_possible_truncation,
        reason = "interpolation between two channels stays within 0..=255"
    )]
    let channel = v as u8;
    channel
}

/// Working rectangle of one part while its description is resolved.
#[derive(Copy, Clone, Debug)]
struct Frame {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Frame {
    /// Resizes one axis, keeping the point at `align` fixed.
    fn set_w(&mut self, w: f64, align: f64) {
        self.x += (self.w - w) * align;
        self.w = w;
    }

    fn set_h(&mut self, h: f64, align: f64) {
        self.y += (self.h - h) * align;
        self.h = h;
    }

    fn apply_aspect(&mut self, limits: &SwallowLimits, align: Vec2) {
        let ratio = limits.aspect_size;
        if ratio.width <= 0.0 || ratio.height <= 0.0 {
            return;
        }
        let ratio = ratio.width / ratio.height;
        let wide = self.w > self.h * ratio;
        let (w, h) = match limits.aspect {
            AspectMode::None => return,
            AspectMode::Horizontal => (self.w, self.w / ratio),
            AspectMode::Vertical => (self.h * ratio, self.h),
            AspectMode::Neither if wide => (self.h * ratio, self.h),
            AspectMode::Neither => (self.w, self.w / ratio),
            AspectMode::Both if wide => (self.w, self.w / ratio),
            AspectMode::Both => (self.h * ratio, self.h),
        };
        self.set_w(w, align.x);
        self.set_h(h, align.y);
    }
}

struct Walk<'a, S> {
    scene: &'a mut S,
    cx: ClassCx<'a, InstanceId>,
    collection: &'a Collection,
    parts: &'a mut [RealPart],
    marks: Vec<Mark>,
    container: Rect,
    origin: Vec2,
    present: bool,
    /// Swallowed layout roots and where they were placed.
    layouts: Vec<(ObjectId, Rect)>,
}

impl<S: Scene> Walk<'_, S> {
    fn run(&mut self) {
        for i in 0..self.parts.len() {
            self.calc(i);
        }
    }

    fn calc(&mut self, i: usize) {
        let collection = self.collection;
        let template = &collection.parts[i];
        match self.marks[i] {
            Mark::Done => return,
            Mark::Active => {
                warn!(
                    collection = %collection.name,
                    part = %template.name,
                    "part references form a cycle; keeping previous geometry"
                );
                return;
            }
            Mark::Pending => {}
        }
        self.marks[i] = Mark::Active;

        let (desc1, desc2, pos) = {
            let rp = &self.parts[i];
            (rp.desc1, rp.desc2, rp.pos)
        };
        let deps = template
            .dependencies(desc1)
            .chain(desc2.into_iter().flat_map(|d| template.dependencies(d)));
        for dep in deps {
            self.calc(dep);
        }

        let first = self.params(i, desc1);
        let (params, chosen) = match desc2 {
            Some(d2) => {
                let second = self.params(i, d2);
                (first.mix(second, pos), if pos >= 0.5 { d2 } else { desc1 })
            }
            None => (first, desc1),
        };

        let rp = &mut self.parts[i];
        rp.geometry = params.rect;
        rp.req = params.req;
        rp.chosen = chosen;
        rp.color = params.color;
        rp.visible = params.visible;
        if self.present {
            self.push(i);
        }
        self.marks[i] = Mark::Done;
    }

    fn anchor(&self, anchor: &Anchor) -> Point {
        let base_x = anchor.to_x.map_or(self.container, |j| self.parts[j].geometry);
        let base_y = anchor.to_y.map_or(self.container, |j| self.parts[j].geometry);
        Point::new(
            base_x.x0 + anchor.relative.x * base_x.width() + anchor.offset.x,
            base_y.y0 + anchor.relative.y * base_y.height() + anchor.offset.y,
        )
    }

    fn params(&mut self, i: usize, d: usize) -> Params {
        let collection = self.collection;
        let template = &collection.parts[i];
        let desc = &template.descriptions[d];

        let p1 = self.anchor(&desc.rel1);
        let p2 = self.anchor(&desc.rel2);
        let mut f = Frame {
            x: p1.x,
            y: p1.y,
            w: (p2.x - p1.x).max(0.0),
            h: (p2.y - p1.y).max(0.0),
        };
        let req = snap(Point::new(f.x, f.y), Size::new(f.w, f.h));

        if template.kind.is_text() && (desc.text.min_x || desc.text.min_y) {
            let style = self.text_style(i, d);
            let text = self.parts[i].text.as_deref().unwrap_or(&desc.text.text);
            let wrap = (template.kind == PartKind::Textblock && !desc.text.min_x && f.w > 0.0)
                .then_some(f.w);
            let extent = self
                .scene
                .measure_text(text, style.font.as_deref(), style.size, wrap);
            if desc.text.min_x && extent.width > f.w {
                f.set_w(extent.width, desc.align.x);
            }
            if desc.text.min_y && extent.height > f.h {
                f.set_h(extent.height, desc.align.y);
            }
        }

        let limits = self.parts[i]
            .swallow
            .map(|sw| sw.limits)
            .unwrap_or_default();
        f.apply_aspect(&limits, desc.align);

        let max_w = desc.max.width.min(limits.max.width);
        let max_h = desc.max.height.min(limits.max.height);
        if f.w > max_w {
            f.set_w(max_w, desc.align.x);
        }
        if f.h > max_h {
            f.set_h(max_h, desc.align.y);
        }
        let min_w = desc.min.width.max(limits.min.width);
        let min_h = desc.min.height.max(limits.min.height);
        if f.w < min_w {
            f.set_w(min_w, desc.align.x);
        }
        if f.h < min_h {
            f.set_h(min_h, desc.align.y);
        }

        let dragable = template.dragable;
        if dragable.x.is_dragable() || dragable.y.is_dragable() {
            let drag = self.parts[i].drag;
            let (range, confined) = match dragable.confine {
                Some(c) => (self.parts[c].geometry, true),
                None => (self.container, false),
            };
            if dragable.x.is_dragable() {
                if confined {
                    f.w = (drag.size.x * range.width()).max(min_w);
                }
                f.x = range.x0 + drag.value.x * (range.width() - f.w);
            }
            if dragable.y.is_dragable() {
                if confined {
                    f.h = (drag.size.y * range.height()).max(min_h);
                }
                f.y = range.y0 + drag.value.y * (range.height() - f.h);
            }
        }

        let color = match desc
            .color_class
            .as_deref()
            .and_then(|name| self.cx.color_class(name))
        {
            Some((_, class)) => desc.color.multiply(class.object),
            None => desc.color,
        };

        Params {
            rect: snap(Point::new(f.x, f.y), Size::new(f.w, f.h)),
            req,
            color,
            visible: desc.visible,
        }
    }

    /// Resolves font and size for a text part, caching per description.
    fn text_style(&mut self, i: usize, d: usize) -> TextStyle {
        if let Some((cached, style)) = &self.parts[i].text_style
            && *cached == d
        {
            return style.clone();
        }
        let collection = self.collection;
        let text = &collection.parts[i].descriptions[d].text;
        let mut font = text.font.clone();
        let mut size = text.size;
        if let Some((_, class)) = text
            .text_class
            .as_deref()
            .and_then(|name| self.cx.text_class(name))
        {
            if let Some(f) = class.font() {
                font = Some(f.to_string());
            }
            if class.size() > 0 {
                size = class.size();
            }
        }
        if let Some(append) = self.cx.fontset_append() {
            font = Some(match font {
                Some(f) if !f.is_empty() => format!("{f},{append}"),
                _ => append.to_string(),
            });
        }
        let style = TextStyle { font, size };
        self.parts[i].text_style = Some((d, style.clone()));
        style
    }

    /// Pushes a resolved part to its scene objects.
    fn push(&mut self, i: usize) {
        let collection = self.collection;
        let template = &collection.parts[i];
        let chosen = self.parts[i].chosen;
        let style = template
            .kind
            .is_text()
            .then(|| self.text_style(i, chosen));

        let rp = &self.parts[i];
        let world = rp.geometry + self.origin;
        self.scene.move_to(rp.object, world.origin());
        self.scene.resize(rp.object, world.size());
        self.scene
            .set_visible(rp.object, rp.visible && template.kind != PartKind::Swallow);
        self.scene.set_color(rp.object, rp.color);
        if let Some(style) = style {
            let text = rp
                .text
                .as_deref()
                .unwrap_or(&template.descriptions[chosen].text.text);
            self.scene
                .set_text(rp.object, text, style.font.as_deref(), style.size);
        }
        if let Some(sw) = rp.swallow {
            self.scene.move_to(sw.object, world.origin());
            self.scene.resize(sw.object, world.size());
            self.scene.set_visible(sw.object, rp.visible);
            if self.scene.kind(sw.object) == Some(ObjectKind::Layout) {
                self.layouts.push((sw.object, world));
            }
        }
    }
}

impl<S: Scene> Engine<S> {
    /// Recalculates a dirty instance, or marks it pending while frozen.
    pub(crate) fn recalc(&mut self, id: InstanceId) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        if !inst.dirty || inst.recalculating {
            return;
        }
        if inst.freeze > 0 {
            inst.recalc_pending = true;
            return;
        }
        inst.recalculating = true;

        // Swallowed layouts report their current limits on every pass.
        let refresh: SmallVec<[(usize, SwallowLimits); 2]> = match self.instance(id) {
            Some(inst) => inst
                .parts
                .iter()
                .enumerate()
                .filter_map(|(i, p)| {
                    let sw = p.swallow?;
                    (self.scene.kind(sw.object) == Some(ObjectKind::Layout))
                        .then(|| (i, self.swallow_limits(sw.object)))
                })
                .collect(),
            None => return,
        };

        let Some((scene, registry, inst)) = self.split_mut(id) else {
            return;
        };
        for (i, limits) in refresh {
            if let Some(sw) = &mut inst.parts[i].swallow {
                sw.limits = limits;
            }
        }
        let file = Rc::clone(&inst.file);
        let push = !inst.calc_only;
        let mut walk = Walk {
            scene: &mut *scene,
            cx: ClassCx::new(&inst.classes, registry, &file.classes),
            collection: file.collection_at(inst.collection),
            marks: vec![Mark::Pending; inst.parts.len()],
            parts: &mut inst.parts,
            container: Rect::from_origin_size(Point::ORIGIN, inst.size),
            origin: inst.origin.to_vec2(),
            present: push,
            layouts: Vec::new(),
        };
        walk.run();
        let layouts = walk.layouts;
        if push {
            for obj in [inst.root, inst.clipper] {
                scene.move_to(obj, inst.origin);
                scene.resize(obj, inst.size);
            }
        }
        inst.recalc_count += 1;
        inst.dirty = false;
        inst.recalc_pending = false;
        inst.recalculating = false;
        trace!(?id, pass = inst.recalc_count, "recalculated");

        for (obj, rect) in layouts {
            if let Some(child) = self.instance_of_root(obj) {
                self.place(child, rect);
            }
        }
    }

    /// Computes the smallest size at which no part is squeezed below what it
    /// asked for.
    ///
    /// Starting from zero, the instance is grown by the largest shortfall of
    /// any part until every part fits. Axes a part's description pins as
    /// fixed do not count. When the size passes
    /// [`EngineConfig::min_size_ceiling`](crate::EngineConfig::min_size_ceiling)
    /// the offending part is logged and the search is retried once, keeping
    /// the largest shortfall across passes; a second overflow stops the search
    /// with the size reached so far. Either way a size is returned and the
    /// instance is laid out again at its previous size.
    ///
    /// Returns [`Size::ZERO`] for a stale handle.
    pub fn size_min_calc(&mut self, id: InstanceId) -> Size {
        let Some(inst) = self.instance_mut(id) else {
            return Size::ZERO;
        };
        let saved = inst.size;
        inst.calc_only = true;
        let ceiling = self.config.min_size_ceiling;

        let mut reset_max = true;
        let mut size = Size::ZERO;
        let mut grow = Size::ZERO;
        loop {
            let Some(inst) = self.instance_mut(id) else {
                return Size::ZERO;
            };
            inst.size = size;
            self.calc_force(id);
            let Some(inst) = self.instance(id) else {
                return Size::ZERO;
            };
            if reset_max {
                grow = Size::ZERO;
            }

            let collection = inst.collection();
            let mut fits = true;
            let mut culprit = None;
            for (i, (template, rp)) in collection.parts.iter().zip(&inst.parts).enumerate() {
                let Some(desc) = template.descriptions.get(rp.chosen) else {
                    continue;
                };
                let mut grew_w = false;
                if !desc.fixed_w {
                    let slack = rp.geometry.width() - rp.req.width();
                    if slack > grow.width {
                        grow.width = slack;
                        grew_w = true;
                        fits = false;
                        culprit = Some(i);
                    }
                }
                let wraps = template.kind == PartKind::Textblock && !desc.text.min_x && grew_w;
                if !desc.fixed_h && !wraps {
                    let slack = rp.geometry.height() - rp.req.height();
                    if slack > grow.height {
                        grow.height = slack;
                        fits = false;
                        culprit = Some(i);
                    }
                }
            }
            if fits {
                break;
            }
            size.width += grow.width;
            size.height += grow.height;

            if size.width > ceiling || size.height > ceiling {
                let part = culprit.map_or("", |i| collection.parts[i].name.as_str());
                warn!(
                    collection = %collection.name,
                    %part,
                    width = size.width,
                    height = size.height,
                    "minimum size diverges; part keeps growing without fixed flags"
                );
                if !reset_max {
                    break;
                }
                reset_max = false;
                size = Size::ZERO;
                grow = Size::ZERO;
            }
        }

        if let Some(inst) = self.instance_mut(id) {
            inst.size = saved;
            inst.calc_only = false;
        }
        self.calc_force(id);
        size
    }
}
