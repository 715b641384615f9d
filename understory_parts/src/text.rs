// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text content of text parts.

use alloc::string::ToString;

use understory_scene::Scene;

use crate::engine::{Engine, InstanceId, TextChangeCallback};

impl<S: Scene> Engine<S> {
    /// Replaces the text of a text or textblock part.
    ///
    /// `None` restores the text declared by the part's description. When the
    /// effective content changes the instance recalculates and the text
    /// change callback fires with the part name.
    pub fn part_text_set(&mut self, id: InstanceId, part: &str, text: Option<&str>) {
        let Some((inst, idx)) = self.part_mut(id, part) else {
            return;
        };
        if !inst.collection().parts[idx].kind.is_text() {
            return;
        }
        let rp = &mut inst.parts[idx];
        if rp.text.as_deref() == text {
            return;
        }
        rp.text = text.map(ToString::to_string);
        inst.dirty = true;
        self.recalc(id);

        if let Some(inst) = self.instance_mut(id)
            && let Some(cb) = &mut inst.text_change
        {
            cb(id, part);
        }
    }

    /// Returns the text shown by a text or textblock part.
    ///
    /// Parts without explicit text report their description's text.
    #[must_use]
    pub fn part_text_get(&self, id: InstanceId, part: &str) -> Option<&str> {
        let (inst, idx) = self.part(id, part)?;
        let template = &inst.collection().parts[idx];
        if !template.kind.is_text() {
            return None;
        }
        let rp = &inst.parts[idx];
        match rp.text.as_deref() {
            Some(text) => Some(text),
            None => template
                .descriptions
                .get(rp.chosen)
                .map(|d| d.text.text.as_str()),
        }
    }

    /// Installs or clears the callback fired after a part's text changed.
    pub fn text_change_cb_set(&mut self, id: InstanceId, cb: Option<TextChangeCallback>) {
        if let Some(inst) = self.instance_mut(id) {
            inst.text_change = cb;
        }
    }
}
