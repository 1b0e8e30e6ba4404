//! Scoped definitions with TeX-like grouping semantics
//!
//! A `Namespace` refers to a space of nameable things like macros or
//! environments, which can be set either globally or local to a nested group
//! using an undo stack similar to how TeX implements this functionality.
//!
//! Besides ordinary groups a namespace supports *sandbox* frames: a sandbox
//! behaves like a group, but global definitions made inside it only reach up
//! to the sandbox itself and are undone when it closes. Ordinary group closes
//! cannot remove a sandbox frame.

use core::ops::{Deref, DerefMut};

use rapidhash::{RapidHashMap, RapidHashSet};

use crate::types::{ParseError, ParseErrorKind};

/// Make it easier to switch between different hash backends.
pub type KeyMap<K, V> = RapidHashMap<K, V>;
/// Alias for the default hash set.
pub type KeySet<K> = RapidHashSet<K>;
/// Mapping type alias
pub type Mapping<V> = KeyMap<String, V>;

/// How a frame was opened, which decides how it may be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// `{...}`, `\begingroup...\endgroup`, macro arguments.
    Group,
    /// Hard boundary for global definitions.
    Sandbox,
}

#[derive(Debug)]
struct Frame<V> {
    kind: FrameKind,
    /// Previous value of each name changed in this frame (`None` means the
    /// name was undefined), restored when the frame closes.
    undo: KeyMap<String, Option<V>>,
}

impl<V> Frame<V> {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            undo: KeyMap::default(),
        }
    }
}

/// A `Namespace` implements scoped definitions with begin/end group semantics.
///
/// - `get` and local `set` are O(1)
/// - global `set` is O(depth), where depth is the group nesting level
#[derive(Debug)]
pub struct Namespace<V: Clone> {
    /// Current bindings. Local changes modify this table and record undos on
    /// the frame stack.
    current: Mapping<V>,
    frames: Vec<Frame<V>>,
    protected: KeySet<String>,
}

impl<V: Clone> Default for Namespace<V> {
    fn default() -> Self {
        Self::new(Mapping::default())
    }
}

impl<V: Clone> Namespace<V> {
    /// Create a namespace whose outermost level holds `global`.
    #[must_use]
    pub fn new(global: Mapping<V>) -> Self {
        Self {
            current: global,
            frames: Vec::new(),
            protected: KeySet::default(),
        }
    }

    /// Number of open frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Kind of the innermost open frame.
    #[must_use]
    pub fn top_kind(&self) -> Option<FrameKind> {
        self.frames.last().map(|frame| frame.kind)
    }

    /// Start a new nested group, affecting future local `set`s.
    pub fn begin_group(&mut self) {
        self.frames.push(Frame::new(FrameKind::Group));
    }

    /// Start a sandbox frame.
    pub fn begin_sandbox(&mut self) {
        self.frames.push(Frame::new(FrameKind::Sandbox));
    }

    fn restore_changes(&mut self, frame: Frame<V>) {
        for (name, previous) in frame.undo {
            match previous {
                Some(v) => {
                    self.current.insert(name, v);
                }
                None => {
                    self.current.remove(&name);
                }
            }
        }
    }

    /// End the current group, restoring values from before the group began.
    ///
    /// Fails when no group is open, or when the innermost frame is a sandbox.
    pub fn end_group(&mut self) -> Result<(), ParseError> {
        match self.top_kind() {
            None => Err(ParseError::new(
                ParseErrorKind::UnbalancedNamespaceDestruction,
            )),
            Some(FrameKind::Sandbox) => Err(ParseError::new(ParseErrorKind::SandboxViolation {
                reason: "a group close cannot end a sandbox".to_owned(),
            })),
            Some(FrameKind::Group) => {
                if let Some(frame) = self.frames.pop() {
                    self.restore_changes(frame);
                }
                Ok(())
            }
        }
    }

    /// End the innermost sandbox. Every group opened inside it must already
    /// be closed.
    pub fn end_sandbox(&mut self) -> Result<(), ParseError> {
        match self.top_kind() {
            None => Err(ParseError::new(
                ParseErrorKind::UnbalancedNamespaceDestruction,
            )),
            Some(FrameKind::Group) => Err(ParseError::new(ParseErrorKind::SandboxViolation {
                reason: "groups are still open inside the sandbox".to_owned(),
            })),
            Some(FrameKind::Sandbox) => {
                if let Some(frame) = self.frames.pop() {
                    self.restore_changes(frame);
                }
                Ok(())
            }
        }
    }

    /// Closes every open frame, sandboxes included, discarding all
    /// frame-local definitions. Returns how many frames were closed.
    pub fn reset(&mut self) -> usize {
        self.unwind_to(0)
    }

    /// Closes frames, sandboxes included, until only `depth` remain. Returns
    /// how many frames were closed.
    pub fn unwind_to(&mut self, depth: usize) -> usize {
        let mut count = 0;
        while self.frames.len() > depth {
            if let Some(frame) = self.frames.pop() {
                self.restore_changes(frame);
                count += 1;
            }
        }
        count
    }

    /// Detect whether `name` has a definition.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.current.contains_key(name)
    }

    /// Get the current value of a name, or `None` if there is no value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&V> {
        self.current.get(name)
    }

    /// Set the current value of a name, and optionally set it globally too.
    ///
    /// Local `set` sets the current value and (when appropriate) adds an undo
    /// operation to the undo stack. Global `set` may change the undo operation
    /// at every level up to the innermost sandbox, so takes time linear in
    /// the number of nested groups. A value of `None` deletes the definition.
    pub fn set(&mut self, name: &str, value: Option<V>, global: bool) {
        if global {
            let floor = self
                .frames
                .iter()
                .rposition(|frame| frame.kind == FrameKind::Sandbox);
            // Global set is equivalent to setting in all groups above the
            // floor: destroy any undos scheduled for this name there, and add
            // an undo with the new value (in case it later gets locally reset
            // within this group).
            let first_cleared = floor.map_or(0, |k| k + 1);
            for frame in &mut self.frames[first_cleared..] {
                frame.undo.remove(name);
            }
            if let Some(k) = floor
                && !self.frames[k].undo.contains_key(name)
            {
                let prev = self.current.get(name).cloned();
                self.frames[k].undo.insert(name.to_owned(), prev);
            }
            let top = self.frames.len().checked_sub(1);
            if let Some(top) = top
                && floor != Some(top)
            {
                self.frames[top]
                    .undo
                    .insert(name.to_owned(), value.clone());
            }
        } else if let Some(top) = self.frames.last_mut()
            && !top.undo.contains_key(name)
        {
            // Undo this set at end of this group (possibly to `None`), unless
            // an undo is already in place, in which case that older value is
            // the correct one.
            let prev = self.current.get(name).cloned();
            top.undo.insert(name.to_owned(), prev);
        }

        match value {
            Some(v) => {
                self.current.insert(name.to_owned(), v);
            }
            None => {
                self.current.remove(name);
            }
        }
    }

    /// Like [`Namespace::set`], but refuses protected names.
    pub fn define(&mut self, name: &str, value: Option<V>, global: bool) -> Result<(), ParseError> {
        if self.is_protected(name) {
            return Err(ParseError::new(ParseErrorKind::ProtectedRedefinition {
                name: format!("\\{name}"),
            }));
        }
        self.set(name, value, global);
        Ok(())
    }

    /// Mark `name` as immune to [`Namespace::define`].
    pub fn protect(&mut self, name: &str) {
        self.protected.insert(name.to_owned());
    }

    /// Whether `name` is protected.
    #[must_use]
    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.contains(name)
    }

    /// Open a group that is closed again, restoring bindings, when the guard
    /// is dropped, whether or not the code using it returned early.
    pub fn scoped(&mut self) -> GroupGuard<'_, V> {
        let depth = self.depth();
        self.begin_group();
        GroupGuard {
            namespace: self,
            depth,
        }
    }

    /// Close every frame and hand back the outermost bindings.
    #[must_use]
    pub fn into_globals(mut self) -> Mapping<V> {
        self.reset();
        self.current
    }
}

/// Guard returned by [`Namespace::scoped`].
///
/// Dropping the guard closes the frame it opened along with anything left
/// open inside it.
#[derive(Debug)]
pub struct GroupGuard<'a, V: Clone> {
    namespace: &'a mut Namespace<V>,
    depth: usize,
}

impl<V: Clone> Deref for GroupGuard<'_, V> {
    type Target = Namespace<V>;

    fn deref(&self) -> &Self::Target {
        self.namespace
    }
}

impl<V: Clone> DerefMut for GroupGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.namespace
    }
}

impl<V: Clone> Drop for GroupGuard<'_, V> {
    fn drop(&mut self) {
        self.namespace.unwind_to(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns() -> Namespace<&'static str> {
        let mut global = Mapping::default();
        global.insert("x".to_owned(), "A");
        Namespace::new(global)
    }

    #[test]
    fn test_local_definition_is_undone() {
        let mut ns = ns();
        ns.begin_group();
        ns.set("x", Some("B"), false);
        assert_eq!(ns.get("x"), Some(&"B"));
        ns.end_group().unwrap();
        assert_eq!(ns.get("x"), Some(&"A"));
    }

    #[test]
    fn test_global_definition_survives() {
        let mut ns = ns();
        ns.begin_group();
        ns.begin_group();
        ns.set("x", Some("B"), true);
        ns.end_group().unwrap();
        ns.end_group().unwrap();
        assert_eq!(ns.get("x"), Some(&"B"));
    }

    #[test]
    fn test_local_after_global_restores_global_value() {
        let mut ns = ns();
        ns.begin_group();
        ns.set("x", Some("G"), true);
        ns.begin_group();
        ns.set("x", Some("L"), false);
        ns.end_group().unwrap();
        assert_eq!(ns.get("x"), Some(&"G"));
        ns.end_group().unwrap();
        assert_eq!(ns.get("x"), Some(&"G"));
    }

    #[test]
    fn test_unbalanced_close() {
        let mut ns = ns();
        let err = ns.end_group().unwrap_err();
        assert_eq!(err.id(), "UnbalancedNamespaceDestruction");
    }

    #[test]
    fn test_sandbox_stops_global_propagation() {
        let mut ns = ns();
        ns.begin_group();
        ns.begin_sandbox();
        ns.begin_group();
        ns.set("x", Some("S"), true);
        ns.set("y", Some("S"), true);
        ns.end_group().unwrap();
        // visible inside the sandbox after the inner group closes
        assert_eq!(ns.get("x"), Some(&"S"));
        ns.end_sandbox().unwrap();
        assert_eq!(ns.get("x"), Some(&"A"));
        assert_eq!(ns.get("y"), None);
        ns.end_group().unwrap();
        assert_eq!(ns.get("x"), Some(&"A"));
    }

    #[test]
    fn test_group_close_cannot_end_sandbox() {
        let mut ns = ns();
        ns.begin_sandbox();
        let err = ns.end_group().unwrap_err();
        assert_eq!(err.id(), "SandboxViolation");
        ns.begin_group();
        let err = ns.end_sandbox().unwrap_err();
        assert_eq!(err.id(), "SandboxViolation");
    }

    #[test]
    fn test_reset_discards_everything_local() {
        let mut ns = ns();
        ns.begin_group();
        ns.set("x", Some("B"), false);
        ns.begin_sandbox();
        ns.set("z", Some("Z"), true);
        assert_eq!(ns.reset(), 2);
        assert_eq!(ns.get("x"), Some(&"A"));
        assert!(!ns.has("z"));
        assert_eq!(ns.depth(), 0);
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let mut ns = ns();
        {
            let mut guard = ns.scoped();
            guard.set("x", Some("B"), false);
            guard.begin_group();
            assert_eq!(guard.get("x"), Some(&"B"));
        }
        assert_eq!(ns.depth(), 0);
        assert_eq!(ns.get("x"), Some(&"A"));
    }

    #[test]
    fn test_protected_names() {
        let mut ns = ns();
        ns.protect("begingroup");
        let err = ns.define("begingroup", Some("oops"), false).unwrap_err();
        assert_eq!(err.id(), "ProtectedRedefinition");
        assert!(ns.define("x", Some("C"), false).is_ok());
    }
}
