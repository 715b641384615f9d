// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signals: named notifications an instance emits, matched against
//! callbacks by emission and source globs.
//!
//! Dispatch runs inside a block scope. A callback may mutate or remove the
//! instance; when that violates the block, the rest of the queue is dropped.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use understory_parts::{
//!     CollectionBuilder, Engine, InstanceId, PartBuilder, PartKind, ThemeFile,
//! };
//! use understory_scene::MemoryScene;
//!
//! let mut file = ThemeFile::new();
//! file.add_collection(
//!     CollectionBuilder::new("button")
//!         .part(PartBuilder::new("bg", PartKind::Rectangle))
//!         .build()
//!         .unwrap(),
//! )
//! .unwrap();
//! let mut engine = Engine::new(MemoryScene::new());
//! let button = engine.add_instance(Rc::new(file), "button").unwrap();
//!
//! let clicks = Rc::new(Cell::new(0));
//! let seen = clicks.clone();
//! engine.signal_callback_add(
//!     button,
//!     "mouse,clicked,*",
//!     "bg",
//!     Box::new(move |_: &mut Engine<MemoryScene>, _: InstanceId, _: &str, _: &str| {
//!         seen.set(seen.get() + 1);
//!     }),
//! );
//! engine.signal_emit(button, "mouse,clicked,1", "bg");
//! engine.signal_emit(button, "mouse,down,1", "bg");
//! assert_eq!(clicks.get(), 1);
//! ```

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use tracing::debug;
use understory_scene::Scene;

use crate::engine::{Engine, InstanceId};

/// Callback invoked for a matching signal with the emission and source.
pub type SignalCallback<S> = Box<dyn FnMut(&mut Engine<S>, InstanceId, &str, &str)>;

/// Identifier of a registered signal callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

struct Handler<S> {
    id: CallbackId,
    emission: String,
    source: String,
    /// `None` while the callback is running.
    callback: Option<SignalCallback<S>>,
    deleted: bool,
}

pub(crate) struct Signals<S> {
    handlers: Vec<Handler<S>>,
    queue: VecDeque<(String, String)>,
    dispatching: bool,
    next_id: u64,
}

impl<S> Signals<S> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: Vec::new(),
            queue: VecDeque::new(),
            dispatching: false,
            next_id: 0,
        }
    }
}

/// Matches `text` against a shell-style glob.
///
/// `*` matches any run of characters, `?` one character, and `[...]` one
/// character from a set (`[a-z]`, negated with `!` or `^`). An unterminated
/// `[` is literal. An empty glob matches only the empty string.
#[must_use]
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        if let Some(&c) = p.get(pi) {
            let step = match c {
                '*' => {
                    star = Some((pi, ti));
                    pi += 1;
                    continue;
                }
                '?' => Some(1),
                '[' => match class_match(&p[pi..], t[ti]) {
                    Some((true, len)) => Some(len),
                    Some((false, _)) => None,
                    None => (t[ti] == '[').then_some(1),
                },
                c => (c == t[ti]).then_some(1),
            };
            if let Some(len) = step {
                pi += len;
                ti += 1;
                continue;
            }
        }
        let Some((sp, st)) = star else {
            return false;
        };
        pi = sp + 1;
        ti = st + 1;
        star = Some((sp, st + 1));
    }
    p[pi..].iter().all(|&c| c == '*')
}

/// Matches `c` against the bracket expression at the start of `p`.
///
/// Returns whether it matched and the expression's length, or `None` when
/// the expression is unterminated.
fn class_match(p: &[char], c: char) -> Option<(bool, usize)> {
    let mut i = 1;
    let negate = matches!(p.get(i), Some('!' | '^'));
    if negate {
        i += 1;
    }
    let mut matched = false;
    let mut first = true;
    loop {
        let lo = *p.get(i)?;
        if lo == ']' && !first {
            return Some((matched != negate, i + 1));
        }
        first = false;
        if p.get(i + 1) == Some(&'-')
            && let Some(&hi) = p.get(i + 2)
            && hi != ']'
        {
            matched |= lo <= c && c <= hi;
            i += 3;
        } else {
            matched |= lo == c;
            i += 1;
        }
    }
}

impl<S: Scene> Engine<S> {
    /// Registers a callback for signals whose emission and source match the
    /// given globs.
    pub fn signal_callback_add(
        &mut self,
        id: InstanceId,
        emission: &str,
        source: &str,
        callback: SignalCallback<S>,
    ) -> Option<CallbackId> {
        let signals = &mut self.instance_mut(id)?.signals;
        let cb = CallbackId(signals.next_id);
        signals.next_id += 1;
        signals.handlers.push(Handler {
            id: cb,
            emission: emission.to_string(),
            source: source.to_string(),
            callback: Some(callback),
            deleted: false,
        });
        Some(cb)
    }

    /// Unregisters a callback. Returns `false` if it was not registered.
    ///
    /// A callback removed while signals are being dispatched is not called
    /// again.
    pub fn signal_callback_del(&mut self, id: InstanceId, cb: CallbackId) -> bool {
        let Some(inst) = self.instance_mut(id) else {
            return false;
        };
        let signals = &mut inst.signals;
        let Some(pos) = signals
            .handlers
            .iter()
            .position(|h| h.id == cb && !h.deleted)
        else {
            return false;
        };
        if signals.dispatching {
            signals.handlers[pos].deleted = true;
        } else {
            signals.handlers.remove(pos);
        }
        true
    }

    /// Emits a signal from an instance.
    ///
    /// Signals emitted from inside a callback are queued and delivered after
    /// the current one, in order.
    pub fn signal_emit(&mut self, id: InstanceId, emission: &str, source: &str) {
        let Some(inst) = self.instance_mut(id) else {
            return;
        };
        let signals = &mut inst.signals;
        signals
            .queue
            .push_back((emission.to_string(), source.to_string()));
        if signals.dispatching {
            return;
        }
        signals.dispatching = true;
        self.block(id);
        self.dispatch(id);

        let broken = self.is_block_broken(id);
        if let Some(inst) = self.slot_mut(id) {
            let signals = &mut inst.signals;
            signals.dispatching = false;
            if broken {
                debug!(?id, dropped = signals.queue.len(), "signal dispatch aborted");
                signals.queue.clear();
            }
            signals.handlers.retain(|h| !h.deleted);
        }
        self.unblock(id);
    }

    fn dispatch(&mut self, id: InstanceId) {
        loop {
            let Some(inst) = self.instance_mut(id) else {
                return;
            };
            let Some((emission, source)) = inst.signals.queue.pop_front() else {
                return;
            };
            let mut i = 0;
            loop {
                let Some(inst) = self.instance_mut(id) else {
                    return;
                };
                let Some(handler) = inst.signals.handlers.get_mut(i) else {
                    break;
                };
                i += 1;
                if handler.deleted
                    || !glob_match(&handler.emission, &emission)
                    || !glob_match(&handler.source, &source)
                {
                    continue;
                }
                let Some(mut callback) = handler.callback.take() else {
                    continue;
                };
                let cb = handler.id;
                callback(self, id, &emission, &source);
                if let Some(inst) = self.slot_mut(id)
                    && let Some(handler) = inst.signals.handlers.iter_mut().find(|h| h.id == cb)
                {
                    handler.callback = Some(callback);
                }
                if self.is_block_broken(id) {
                    return;
                }
            }
        }
    }
}
