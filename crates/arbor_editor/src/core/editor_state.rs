//! Mutable editor document state.

use std::collections::HashMap;

use arbor_scene::{NodeId, SceneGraph, Script};

use crate::core::signals::Signals;

/// Everything commands mutate: the scene tree, scripts keyed by object
/// uuid, and the signal bus used to announce changes.
pub struct EditorState {
    pub scene: SceneGraph,
    /// Scripts live beside the tree rather than on nodes, keyed by the
    /// owning object's uuid, so they survive node detach/re-attach.
    pub scripts: HashMap<String, Vec<Script>>,
    pub signals: Signals,
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            scene: SceneGraph::new(),
            scripts: HashMap::new(),
            signals: Signals::new(),
        }
    }

    /// Resolve an object uuid against the live graph.
    pub fn object_by_uuid(&self, uuid: &str) -> Option<NodeId> {
        self.scene.find_by_uuid(uuid)
    }

    /// Run `f` with signal dispatch batched: every signal raised inside
    /// fires at most once, after `f` returns.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.signals.begin_batch();
        let result = f(self);
        self.signals.end_batch();
        result
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signals::SignalKind;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn batch_defers_signals_until_scope_ends() {
        let mut state = EditorState::new();
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        state
            .signals
            .connect(SignalKind::SceneGraphChanged, move || {
                inner.set(inner.get() + 1)
            });

        state.batch(|s| {
            s.signals.dispatch(SignalKind::SceneGraphChanged);
            s.signals.dispatch(SignalKind::SceneGraphChanged);
        });
        assert_eq!(count.get(), 1);
    }
}
