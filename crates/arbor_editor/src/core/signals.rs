//! Change-notification signals.
//!
//! Commands announce what they touched by dispatching one of a fixed set
//! of signals; UI layers subscribe with plain closures. Dispatch is
//! synchronous except inside a batch scope, where each signal is
//! latched and fired once when the outermost batch ends. Compound commands use this so a burst of sub-command mutations
//! reaches listeners as a single notification.

type Listener = Box<dyn FnMut()>;

/// The editor's notification channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    /// Tree structure changed: nodes added, removed, or reparented.
    SceneGraphChanged,
    /// A node's own attributes or transform changed.
    ObjectChanged,
    GeometryChanged,
    MaterialChanged,
    ScriptChanged,
    /// Undo/redo stacks changed shape.
    HistoryChanged,
}

#[derive(Default)]
struct Channel {
    listeners: Vec<Listener>,
    pending: bool,
}

impl Channel {
    fn fire(&mut self) {
        for listener in &mut self.listeners {
            listener();
        }
    }
}

/// Listener registry for all [`SignalKind`]s, with reentrant batching.
#[derive(Default)]
pub struct Signals {
    batch_depth: u32,
    scene_graph_changed: Channel,
    object_changed: Channel,
    geometry_changed: Channel,
    material_changed: Channel,
    script_changed: Channel,
    history_changed: Channel,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel_mut(&mut self, kind: SignalKind) -> &mut Channel {
        match kind {
            SignalKind::SceneGraphChanged => &mut self.scene_graph_changed,
            SignalKind::ObjectChanged => &mut self.object_changed,
            SignalKind::GeometryChanged => &mut self.geometry_changed,
            SignalKind::MaterialChanged => &mut self.material_changed,
            SignalKind::ScriptChanged => &mut self.script_changed,
            SignalKind::HistoryChanged => &mut self.history_changed,
        }
    }

    /// Subscribe to a signal. Listeners stay registered for the life of
    /// the editor; there is no disconnect.
    pub fn connect(&mut self, kind: SignalKind, listener: impl FnMut() + 'static) {
        self.channel_mut(kind).listeners.push(Box::new(listener));
    }

    /// Fire a signal now, or latch it if a batch is open.
    pub fn dispatch(&mut self, kind: SignalKind) {
        let batching = self.batch_depth > 0;
        let channel = self.channel_mut(kind);
        if batching {
            channel.pending = true;
        } else {
            channel.fire();
        }
    }

    /// Open a batch scope. Nests; only the outermost `end_batch` flushes.
    pub(crate) fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    pub(crate) fn end_batch(&mut self) {
        debug_assert!(self.batch_depth > 0);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.flush();
        }
    }

    fn flush(&mut self) {
        // Fixed order so listeners see structure changes before the
        // history notification.
        for kind in [
            SignalKind::SceneGraphChanged,
            SignalKind::ObjectChanged,
            SignalKind::GeometryChanged,
            SignalKind::MaterialChanged,
            SignalKind::ScriptChanged,
            SignalKind::HistoryChanged,
        ] {
            let channel = self.channel_mut(kind);
            if channel.pending {
                channel.pending = false;
                channel.fire();
            }
        }
    }
}
