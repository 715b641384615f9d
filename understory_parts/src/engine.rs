// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: instance storage, class overrides, freeze and block control,
//! and part introspection.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Point, Rect, Size};
use tracing::{debug, trace};
use understory_classes::{
    ClassCx, ClassNames, ClassRegistry, ClassScope, ClassSet, ColorClass, TextClass,
};
use understory_scene::{ObjectId, ObjectKind, ObserverId, Scene};

use crate::part::RealPart;
use crate::signal::Signals;
use crate::theme::{Collection, PartKind, ThemeFile};

/// Identifier for a layout instance.
///
/// A generational `(slot, generation)` handle. Once an instance is removed
/// every engine call with its handle returns the documented sentinel value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct InstanceId(u32, u32);

impl InstanceId {
    const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Observer identity used when watching swallowed objects.
    pub(crate) fn observer(self) -> ObserverId {
        ObserverId::new((u64::from(self.0) << 32) | u64::from(self.1))
    }

    pub(crate) fn from_observer(observer: ObserverId) -> Self {
        let raw = observer.get();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "splitting a u64 built from two u32 halves"
        )]
        let id = Self((raw >> 32) as u32, raw as u32);
        id
    }
}

/// Numeric policy of an [`Engine`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Size, per axis, past which the minimum-size solver gives up growing.
    pub min_size_ceiling: f64,
    /// Maximum size reported for axes a collection leaves unbounded.
    pub unbounded_max: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_size_ceiling: 4000.0,
            unbounded_max: 100_000.0,
        }
    }
}

/// Callback fired after a part's text actually changed.
pub type TextChangeCallback = Box<dyn FnMut(InstanceId, &str)>;

pub(crate) struct Instance<S> {
    pub(crate) file: Rc<ThemeFile>,
    pub(crate) collection: usize,
    pub(crate) root: ObjectId,
    pub(crate) clipper: ObjectId,
    pub(crate) parts: Vec<RealPart>,
    pub(crate) classes: ClassSet,
    pub(crate) origin: Point,
    pub(crate) size: Size,
    pub(crate) dirty: bool,
    pub(crate) recalc_pending: bool,
    pub(crate) calc_only: bool,
    pub(crate) recalculating: bool,
    pub(crate) freeze: u32,
    pub(crate) block: u32,
    pub(crate) block_break: bool,
    pub(crate) refs: u32,
    pub(crate) delete_me: bool,
    pub(crate) recalc_count: u64,
    pub(crate) text_change: Option<TextChangeCallback>,
    pub(crate) signals: Signals<S>,
}

impl<S> Instance<S> {
    pub(crate) fn collection(&self) -> &Collection {
        self.file.collection_at(self.collection)
    }

    pub(crate) fn part_index(&self, name: &str) -> Option<usize> {
        self.collection().part_index(name)
    }

    fn invalidate_text_styles(&mut self) {
        for part in &mut self.parts {
            part.text_style = None;
        }
    }
}

struct InstanceSlot<S> {
    generation: u32,
    instance: Option<Instance<S>>,
}

/// The layout engine.
///
/// `Engine` owns the scene, the process-scoped class registry and every
/// layout instance created from theme data. All operations take an
/// [`InstanceId`]; a stale handle, a deleted instance or an unknown part name
/// never fails loudly. Setters do nothing and getters return a sentinel:
/// [`Rect::ZERO`], `None`, `""`, `0`, or an empty flag set.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
///
/// use kurbo::{Rect, Size};
/// use understory_parts::{
///     CollectionBuilder, DescriptionBuilder, Engine, PartBuilder, PartKind, ThemeFile,
/// };
/// use understory_scene::MemoryScene;
///
/// let mut file = ThemeFile::new();
/// file.add_collection(
///     CollectionBuilder::new("panel")
///         .part(PartBuilder::new("bg", PartKind::Rectangle))
///         .part(
///             PartBuilder::new("inset", PartKind::Rectangle).description(
///                 DescriptionBuilder::new("default", 0.0)
///                     .rel1((0.0, 0.0), (10.0, 10.0))
///                     .rel2((1.0, 1.0), (-10.0, -10.0)),
///             ),
///         )
///         .build()
///         .unwrap(),
/// )
/// .unwrap();
///
/// let mut engine = Engine::new(MemoryScene::new());
/// let panel = engine.add_instance(Rc::new(file), "panel").unwrap();
/// engine.resize(panel, Size::new(100.0, 60.0));
/// assert_eq!(engine.part_geometry(panel, "inset"), Rect::new(10.0, 10.0, 90.0, 50.0));
/// assert_eq!(engine.part_geometry(panel, "missing"), Rect::ZERO);
/// ```
pub struct Engine<S> {
    pub(crate) scene: S,
    pub(crate) classes: ClassRegistry<InstanceId>,
    slots: Vec<InstanceSlot<S>>,
    free: Vec<u32>,
    pub(crate) roots: HashMap<ObjectId, InstanceId>,
    pub(crate) swallow_owners: HashMap<ObjectId, InstanceId>,
    pub(crate) config: EngineConfig,
}

impl<S: fmt::Debug> fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self
            .slots
            .iter()
            .filter(|s| s.instance.as_ref().is_some_and(|i| !i.delete_me))
            .count();
        f.debug_struct("Engine")
            .field("scene", &self.scene)
            .field("classes", &self.classes)
            .field("instances", &live)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: Scene> Engine<S> {
    /// Creates an engine driving `scene` with the default policy.
    #[must_use]
    pub fn new(scene: S) -> Self {
        Self::with_config(scene, EngineConfig::default())
    }

    /// Creates an engine with an explicit policy.
    #[must_use]
    pub fn with_config(scene: S, config: EngineConfig) -> Self {
        Self {
            scene,
            classes: ClassRegistry::new(),
            slots: Vec::new(),
            free: Vec::new(),
            roots: HashMap::new(),
            swallow_owners: HashMap::new(),
            config,
        }
    }

    /// Returns the scene.
    #[must_use]
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Returns the scene mutably.
    ///
    /// Destroy objects through [`Engine::destroy_object`] rather than the
    /// scene so instances swallowing them are told.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Returns the engine policy.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the process-scoped class registry.
    #[must_use]
    pub fn classes(&self) -> &ClassRegistry<InstanceId> {
        &self.classes
    }

    // -------------------------------------------------------------------------
    // Instance storage
    // -------------------------------------------------------------------------

    /// Looks up an instance, including one whose deletion is deferred.
    pub(crate) fn slot(&self, id: InstanceId) -> Option<&Instance<S>> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.instance.as_ref()
    }

    pub(crate) fn slot_mut(&mut self, id: InstanceId) -> Option<&mut Instance<S>> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.instance.as_mut()
    }

    /// Borrows the scene, the registry and a live instance at once.
    pub(crate) fn split_mut(
        &mut self,
        id: InstanceId,
    ) -> Option<(&mut S, &ClassRegistry<InstanceId>, &mut Instance<S>)> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        let inst = slot.instance.as_mut().filter(|i| !i.delete_me)?;
        Some((&mut self.scene, &self.classes, inst))
    }

    /// Looks up a live instance.
    pub(crate) fn instance(&self, id: InstanceId) -> Option<&Instance<S>> {
        self.slot(id).filter(|i| !i.delete_me)
    }

    pub(crate) fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Instance<S>> {
        self.slot_mut(id).filter(|i| !i.delete_me)
    }

    /// Looks up a live instance and one of its parts by name.
    pub(crate) fn part(&self, id: InstanceId, part: &str) -> Option<(&Instance<S>, usize)> {
        let inst = self.instance(id)?;
        let idx = inst.part_index(part)?;
        Some((inst, idx))
    }

    pub(crate) fn part_mut(
        &mut self,
        id: InstanceId,
        part: &str,
    ) -> Option<(&mut Instance<S>, usize)> {
        let inst = self.instance_mut(id)?;
        let idx = inst.part_index(part)?;
        Some((inst, idx))
    }

    fn live_ids(&self) -> Vec<InstanceId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.instance.as_ref().is_some_and(|i| !i.delete_me))
            .map(|(idx, s)| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "slot indices are allocated as u32"
                )]
                let slot = idx as u32;
                InstanceId(slot, s.generation)
            })
            .collect()
    }

    /// Returns `true` if `id` refers to a live instance.
    #[must_use]
    pub fn is_alive(&self, id: InstanceId) -> bool {
        self.instance(id).is_some()
    }

    /// Returns the instance whose root object is `obj`.
    #[must_use]
    pub fn instance_of_root(&self, obj: ObjectId) -> Option<InstanceId> {
        self.roots.get(&obj).copied().filter(|&id| self.is_alive(id))
    }

    /// Returns the root scene object of an instance.
    #[must_use]
    pub fn root_object(&self, id: InstanceId) -> Option<ObjectId> {
        self.instance(id).map(|i| i.root)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Instantiates collection `group` from `file`.
    ///
    /// Creates the root object, a clipper, and one object per part in part
    /// order, registers the instance with every class its descriptions
    /// name, and runs the first recalculation. Returns `None` if the file has
    /// no such collection.
    pub fn add_instance(&mut self, file: Rc<ThemeFile>, group: &str) -> Option<InstanceId> {
        let collection_idx = file.collection_index(group)?;
        let id = if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.generation = entry.generation.wrapping_add(1);
            InstanceId(slot, entry.generation)
        } else {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "more than u32::MAX instances is unsupported"
            )]
            let slot = self.slots.len() as u32;
            self.slots.push(InstanceSlot {
                generation: 1,
                instance: None,
            });
            InstanceId(slot, 1)
        };

        let collection = file.collection_at(collection_idx);
        let root = self.scene.create(ObjectKind::Layout);
        let clipper = self.scene.create(ObjectKind::Rectangle);
        let mut parts = Vec::with_capacity(collection.parts.len());
        for template in &collection.parts {
            let object = self.scene.create(template.kind.object_kind());
            parts.push(RealPart::new(object));
        }
        for (template, part) in collection.parts.iter().zip(&parts) {
            let clip = template.clip_to.map_or(clipper, |j| parts[j].object);
            self.scene.set_clip(part.object, Some(clip));
            if template.kind == PartKind::Swallow {
                self.scene.set_visible(part.object, false);
            }
            for desc in &template.descriptions {
                if let Some(name) = &desc.color_class {
                    self.classes.add_color_member(name, id);
                }
                if let Some(name) = &desc.text.text_class {
                    self.classes.add_text_member(name, id);
                }
            }
        }

        self.slots[id.idx()].instance = Some(Instance {
            file,
            collection: collection_idx,
            root,
            clipper,
            parts,
            classes: ClassSet::new(),
            origin: Point::ORIGIN,
            size: Size::ZERO,
            dirty: true,
            recalc_pending: false,
            calc_only: false,
            recalculating: false,
            freeze: 0,
            block: 0,
            block_break: false,
            refs: 0,
            delete_me: false,
            recalc_count: 0,
            text_change: None,
            signals: Signals::new(),
        });
        self.roots.insert(root, id);
        self.recalc(id);
        Some(id)
    }

    /// Removes an instance.
    ///
    /// A blocked instance is only marked deleted: the block is violated so
    /// the enclosing operation can bail out, every call already treats the
    /// handle as invalid, and the instance is freed on the final
    /// [`Engine::unblock`]. Swallowed objects are released, never destroyed.
    pub fn remove_instance(&mut self, id: InstanceId) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        if inst.refs > 0 {
            inst.delete_me = true;
            if inst.block > 0 {
                inst.block_break = true;
            }
            debug!(?id, refs = inst.refs, "deferring deletion of blocked instance");
            return;
        }
        self.free_instance(id);
    }

    pub(crate) fn free_instance(&mut self, id: InstanceId) {
        let Some(slot) = self.slots.get_mut(id.idx()) else {
            return;
        };
        if slot.generation != id.1 {
            return;
        }
        let Some(inst) = slot.instance.take() else {
            return;
        };
        self.free.push(id.0);
        self.classes.remove_member(id);
        for part in &inst.parts {
            if let Some(sw) = part.swallow {
                self.swallow_owners.remove(&sw.object);
                self.scene.unwatch_destroy(sw.object, id.observer());
                self.scene.set_clip(sw.object, None);
            }
        }
        for part in &inst.parts {
            let notice = self.scene.destroy(part.object);
            self.object_destroyed(part.object, &notice);
        }
        self.scene.destroy(inst.clipper);
        self.roots.remove(&inst.root);
        let notice = self.scene.destroy(inst.root);
        self.object_destroyed(inst.root, &notice);
    }

    /// Removes every instance and releases every process-scoped class.
    ///
    /// Deferred deletions are completed immediately.
    pub fn clear(&mut self) {
        let ids: Vec<InstanceId> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.instance.is_some())
            .map(|(idx, s)| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "slot indices are allocated as u32"
                )]
                let slot = idx as u32;
                InstanceId(slot, s.generation)
            })
            .collect();
        for id in ids {
            self.free_instance(id);
        }
        self.classes.clear();
    }

    // -------------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------------

    /// Moves an instance.
    pub fn move_to(&mut self, id: InstanceId, origin: Point) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        if inst.origin == origin {
            return;
        }
        inst.origin = origin;
        inst.dirty = true;
        self.recalc(id);
    }

    /// Resizes an instance.
    pub fn resize(&mut self, id: InstanceId, size: Size) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        if inst.size == size {
            return;
        }
        inst.size = size;
        inst.dirty = true;
        self.recalc(id);
    }

    /// Returns the geometry of an instance, or [`Rect::ZERO`].
    #[must_use]
    pub fn geometry(&self, id: InstanceId) -> Rect {
        self.instance(id)
            .map_or(Rect::ZERO, |i| Rect::from_origin_size(i.origin, i.size))
    }

    pub(crate) fn place(&mut self, id: InstanceId, rect: Rect) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        if inst.origin == rect.origin() && inst.size == rect.size() {
            return;
        }
        inst.origin = rect.origin();
        inst.size = rect.size();
        inst.dirty = true;
        self.recalc(id);
    }

    // -------------------------------------------------------------------------
    // Process-scoped classes
    // -------------------------------------------------------------------------

    /// Sets a process-level color class and recalculates its members.
    ///
    /// Channels are clamped to `0..=255`. Setting the current values again
    /// touches nobody.
    pub fn color_class_set(
        &mut self,
        name: &str,
        object: [i32; 4],
        outline: [i32; 4],
        shadow: [i32; 4],
    ) {
        let members = self.classes.set_color_class(name, object, outline, shadow);
        self.invalidate(&members, false);
    }

    /// Deletes a process-level color class and recalculates its members.
    pub fn color_class_del(&mut self, name: &str) {
        let members = self.classes.delete_color_class(name);
        self.invalidate(&members, false);
    }

    /// Returns a process-level color class.
    #[must_use]
    pub fn color_class_get(&self, name: &str) -> Option<&ColorClass> {
        self.classes.color_class(name)
    }

    /// Lists color class names in use by at least one instance.
    pub fn color_class_list(&self) -> ClassNames<'_, InstanceId> {
        self.classes.color_class_names()
    }

    /// Sets a process-level text class.
    ///
    /// Members refresh their cached text styles and recalculate.
    pub fn text_class_set(&mut self, name: &str, font: Option<&str>, size: i32) {
        let members = self.classes.set_text_class(name, font, size);
        self.invalidate(&members, true);
    }

    /// Deletes a process-level text class.
    pub fn text_class_del(&mut self, name: &str) {
        let members = self.classes.delete_text_class(name);
        self.invalidate(&members, true);
    }

    /// Returns a process-level text class.
    #[must_use]
    pub fn text_class_get(&self, name: &str) -> Option<&TextClass> {
        self.classes.text_class(name)
    }

    /// Lists text class names in use by at least one instance.
    pub fn text_class_list(&self) -> ClassNames<'_, InstanceId> {
        self.classes.text_class_names()
    }

    /// Sets the font list appended to every resolved font.
    pub fn fontset_append_set(&mut self, fonts: Option<&str>) {
        if self.classes.set_fontset_append(fonts) {
            let ids = self.live_ids();
            self.invalidate(&ids, true);
        }
    }

    /// Returns the font list appended to every resolved font.
    #[must_use]
    pub fn fontset_append_get(&self) -> Option<&str> {
        self.classes.fontset_append()
    }

    fn invalidate(&mut self, members: &[InstanceId], text: bool) {
        for &id in members {
            let Some(inst) = self.instance_mut(id) else {
                continue;
            };
            inst.dirty = true;
            if text {
                inst.invalidate_text_styles();
            }
            self.recalc(id);
        }
    }

    // -------------------------------------------------------------------------
    // Instance-scoped classes
    // -------------------------------------------------------------------------

    /// Sets an instance-level color class, shadowing process and file scope.
    pub fn object_color_class_set(
        &mut self,
        id: InstanceId,
        name: &str,
        object: [i32; 4],
        outline: [i32; 4],
        shadow: [i32; 4],
    ) {
        if name.is_empty() {
            return;
        }
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        let class = ColorClass::from_channels(name, object, outline, shadow);
        if inst.classes.colors.set(class) {
            inst.dirty = true;
            self.recalc(id);
        }
    }

    /// Deletes an instance-level color class.
    pub fn object_color_class_del(&mut self, id: InstanceId, name: &str) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        if inst.classes.colors.remove(name).is_some() {
            inst.dirty = true;
            self.recalc(id);
        }
    }

    /// Returns an instance-level color class.
    #[must_use]
    pub fn object_color_class_get(&self, id: InstanceId, name: &str) -> Option<&ColorClass> {
        self.instance(id)?.classes.colors.get(name)
    }

    /// Sets an instance-level text class.
    pub fn object_text_class_set(
        &mut self,
        id: InstanceId,
        name: &str,
        font: Option<&str>,
        size: i32,
    ) {
        if name.is_empty() {
            return;
        }
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        if inst.classes.texts.set(TextClass::new(name, font, size)) {
            inst.dirty = true;
            inst.invalidate_text_styles();
            self.recalc(id);
        }
    }

    /// Deletes an instance-level text class.
    pub fn object_text_class_del(&mut self, id: InstanceId, name: &str) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        if inst.classes.texts.remove(name).is_some() {
            inst.dirty = true;
            inst.invalidate_text_styles();
            self.recalc(id);
        }
    }

    /// Returns an instance-level text class.
    #[must_use]
    pub fn object_text_class_get(&self, id: InstanceId, name: &str) -> Option<&TextClass> {
        self.instance(id)?.classes.texts.get(name)
    }

    /// Resolves a color class the way recalculation does for this instance.
    #[must_use]
    pub fn color_class_resolve(
        &self,
        id: InstanceId,
        name: &str,
    ) -> Option<(ClassScope, &ColorClass)> {
        let inst = self.instance(id)?;
        ClassCx::new(&inst.classes, &self.classes, &inst.file.classes).color_class(name)
    }

    /// Resolves a text class the way recalculation does for this instance.
    #[must_use]
    pub fn text_class_resolve(
        &self,
        id: InstanceId,
        name: &str,
    ) -> Option<(ClassScope, &TextClass)> {
        let inst = self.instance(id)?;
        ClassCx::new(&inst.classes, &self.classes, &inst.file.classes).text_class(name)
    }

    // -------------------------------------------------------------------------
    // Freeze and block
    // -------------------------------------------------------------------------

    /// Suspends recalculation. Returns the new freeze depth, or `0`.
    pub fn freeze(&mut self, id: InstanceId) -> u32 {
        let Some(inst) = self.instance_mut(id) else {
            return 0;
        };
        inst.freeze += 1;
        inst.freeze
    }

    /// Undoes one [`Engine::freeze`]. Returns the new freeze depth.
    ///
    /// Reaching depth zero with a deferred recalculation runs it once.
    /// Thawing an unfrozen instance is clamped, not an error.
    pub fn thaw(&mut self, id: InstanceId) -> u32 {
        let Some(inst) = self.instance_mut(id) else {
            return 0;
        };
        if inst.freeze == 0 {
            debug!(?id, "thaw without matching freeze");
        } else {
            inst.freeze -= 1;
        }
        if inst.freeze == 0 && inst.recalc_pending {
            self.recalc(id);
        }
        self.instance(id).map_or(0, |i| i.freeze)
    }

    /// Returns the current freeze depth.
    #[must_use]
    pub fn freeze_depth(&self, id: InstanceId) -> u32 {
        self.instance(id).map_or(0, |i| i.freeze)
    }

    /// Freezes every live instance.
    pub fn freeze_all(&mut self) {
        for id in self.live_ids() {
            self.freeze(id);
        }
    }

    /// Thaws every live instance.
    pub fn thaw_all(&mut self) {
        for id in self.live_ids() {
            self.thaw(id);
        }
    }

    /// Recalculates now, regardless of freeze depth.
    ///
    /// The caller's freeze depth is left as it was.
    pub fn calc_force(&mut self, id: InstanceId) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        trace!(?id, freeze = inst.freeze, "forced recalculation");
        inst.dirty = true;
        let saved = core::mem::take(&mut inst.freeze);
        self.recalc(id);
        if let Some(inst) = self.instance_mut(id) {
            inst.freeze = saved;
        }
    }

    /// Enters a block scope. Returns the new block depth, or `0`.
    ///
    /// While blocked the instance holds a reference, so removing it only
    /// marks it deleted until the last [`Engine::unblock`].
    pub fn block(&mut self, id: InstanceId) -> u32 {
        let Some(inst) = self.instance_mut(id) else {
            return 0;
        };
        inst.refs += 1;
        inst.block += 1;
        inst.block
    }

    /// Leaves a block scope. Returns the new block depth.
    ///
    /// The break flag clears when the depth returns to zero. This works on
    /// instances whose deletion is deferred, and frees them on the last
    /// release.
    pub fn unblock(&mut self, id: InstanceId) -> u32 {
        let Some(inst) = self.slot_mut(id) else {
            return 0;
        };
        if inst.block == 0 {
            return 0;
        }
        inst.block -= 1;
        if inst.block == 0 {
            inst.block_break = false;
        }
        let depth = inst.block;
        inst.refs = inst.refs.saturating_sub(1);
        if inst.refs == 0 && inst.delete_me {
            debug!(?id, "freeing instance after last unblock");
            self.free_instance(id);
        }
        depth
    }

    /// Signals the enclosing block scope to abort.
    ///
    /// Has no effect outside a block scope.
    pub fn block_violate(&mut self, id: InstanceId) {
        if let Some(inst) = self.slot_mut(id)
            && inst.block > 0
        {
            inst.block_break = true;
        }
    }

    /// Returns `true` if the current block scope was violated.
    #[must_use]
    pub fn is_block_broken(&self, id: InstanceId) -> bool {
        self.slot(id).is_some_and(|i| i.block_break)
    }

    /// Returns the current block depth.
    #[must_use]
    pub fn block_depth(&self, id: InstanceId) -> u32 {
        self.slot(id).map_or(0, |i| i.block)
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Returns `true` if the instance has a part named `part`.
    #[must_use]
    pub fn part_exists(&self, id: InstanceId, part: &str) -> bool {
        self.part(id, part).is_some()
    }

    /// Returns the scene object backing a part.
    ///
    /// Only query the object; the engine overwrites its geometry, stacking
    /// and visibility on every recalculation.
    #[must_use]
    pub fn part_object(&self, id: InstanceId, part: &str) -> Option<ObjectId> {
        let (inst, idx) = self.part(id, part)?;
        Some(inst.parts[idx].object)
    }

    /// Returns the geometry of a part relative to the instance origin, or
    /// [`Rect::ZERO`].
    #[must_use]
    pub fn part_geometry(&self, id: InstanceId, part: &str) -> Rect {
        self.part(id, part)
            .map_or(Rect::ZERO, |(inst, idx)| inst.parts[idx].geometry)
    }

    /// Returns the current state name and value of a part, or `("", 0.0)`.
    ///
    /// Unnamed states report `"default"`.
    #[must_use]
    pub fn part_state(&self, id: InstanceId, part: &str) -> (&str, f64) {
        let Some((inst, idx)) = self.part(id, part) else {
            return ("", 0.0);
        };
        let template = &inst.collection().parts[idx];
        template
            .descriptions
            .get(inst.parts[idx].chosen)
            .map_or(("", 0.0), |d| (d.state_name(), d.value))
    }

    /// Switches a part to a state.
    ///
    /// Picks the exact name and value, else the same name with the nearest
    /// value, else the default description.
    pub fn part_state_set(&mut self, id: InstanceId, part: &str, name: &str, value: f64) {
        let Some((inst, idx)) = self.part_mut(id, part) else {
            return;
        };
        let desc = inst.collection().parts[idx].find_description(name, value);
        let rp = &mut inst.parts[idx];
        if rp.desc1 == desc && rp.desc2.is_none() {
            return;
        }
        rp.desc1 = desc;
        rp.desc2 = None;
        rp.pos = 0.0;
        inst.dirty = true;
        self.recalc(id);
    }

    /// Moves a part part-way towards another state.
    ///
    /// Geometry and color interpolate by `pos` in `0..=1`; the target state is
    /// reported from `pos >= 0.5`, and `pos >= 1` completes the transition.
    pub fn part_state_transition(
        &mut self,
        id: InstanceId,
        part: &str,
        name: &str,
        value: f64,
        pos: f64,
    ) {
        let Some((inst, idx)) = self.part_mut(id, part) else {
            return;
        };
        let desc = inst.collection().parts[idx].find_description(name, value);
        let pos = pos.clamp(0.0, 1.0);
        let rp = &mut inst.parts[idx];
        if pos >= 1.0 {
            rp.desc1 = desc;
            rp.desc2 = None;
            rp.pos = 0.0;
        } else {
            rp.desc2 = Some(desc);
            rp.pos = pos;
        }
        inst.dirty = true;
        self.recalc(id);
    }

    /// Returns collection data stored under `key`.
    #[must_use]
    pub fn data_get(&self, id: InstanceId, key: &str) -> Option<&str> {
        self.instance(id)?.collection().data(key)
    }

    /// Returns how many recalculation passes the instance has run.
    #[must_use]
    pub fn recalc_count(&self, id: InstanceId) -> u64 {
        self.instance(id).map_or(0, |i| i.recalc_count)
    }

    /// Returns the declared minimum size, or [`Size::ZERO`].
    #[must_use]
    pub fn size_min_get(&self, id: InstanceId) -> Size {
        self.instance(id).map_or(Size::ZERO, |i| i.collection().min)
    }

    /// Returns the declared maximum size, or [`Size::ZERO`].
    ///
    /// Axes declared as `0` are unbounded and report
    /// [`EngineConfig::unbounded_max`].
    #[must_use]
    pub fn size_max_get(&self, id: InstanceId) -> Size {
        let Some(inst) = self.instance(id) else {
            return Size::ZERO;
        };
        let max = inst.collection().max;
        let bound = |v: f64| {
            if v == 0.0 {
                self.config.unbounded_max
            } else {
                v
            }
        };
        Size::new(bound(max.width), bound(max.height))
    }

    // -------------------------------------------------------------------------
    // Destruction routing
    // -------------------------------------------------------------------------

    /// Destroys a scene object and tells every instance watching it.
    ///
    /// Destroying the root object of an instance removes that instance.
    pub fn destroy_object(&mut self, obj: ObjectId) {
        if let Some(id) = self.instance_of_root(obj) {
            self.remove_instance(id);
            return;
        }
        let notice = self.scene.destroy(obj);
        self.object_destroyed(obj, &notice);
    }

    /// Routes a destruction notice produced by [`Scene::destroy`].
    ///
    /// Each observing instance drops its reference to `obj` without touching
    /// the dead object. Safe to call from inside any engine callback.
    pub fn object_destroyed(&mut self, obj: ObjectId, observers: &[ObserverId]) {
        for &observer in observers {
            let id = InstanceId::from_observer(observer);
            self.swallow_released(id, obj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observer_identity_round_trips() {
        let id = InstanceId(7, 0xdead_beef);
        assert_eq!(InstanceId::from_observer(id.observer()), id);
        let id = InstanceId(u32::MAX, 1);
        assert_eq!(InstanceId::from_observer(id.observer()), id);
    }

    #[test]
    fn default_policy() {
        let config = EngineConfig::default();
        assert_eq!(config.min_size_ceiling, 4000.0);
        assert_eq!(config.unbounded_max, 100_000.0);
    }
}
