//! Arena-backed scene tree with uuid lookup and matrix propagation.

use std::collections::HashMap;

use arbor_math::Mat4;

use crate::error::SceneError;
use crate::node::{Node, NodeId};

/// Insertion index for a reparent, given the raw requested index.
///
/// The raw index is clamped into `[0, new_parent_len]`. When a node
/// moves within the same parent to a slot after its current position,
/// the index is decremented by one: removing the node first shifts the
/// later siblings down. Isolated here because every move/undo path must
/// agree on this exact arithmetic.
pub fn compute_insert_index(
    old_parent: NodeId,
    old_index: usize,
    new_parent: NodeId,
    raw_index: usize,
    new_parent_len: usize,
) -> usize {
    let clamped = raw_index.min(new_parent_len);
    if old_parent == new_parent && clamped > old_index {
        clamped - 1
    } else {
        clamped
    }
}

/// A subtree detached from a [`SceneGraph`].
///
/// Nodes keep their ids, uuids, child order, transforms, and resources,
/// so re-attaching restores the exact prior state without rebuilding
/// anything. Fragments are only valid for the graph they came from.
#[derive(Clone, Debug)]
pub struct SceneFragment {
    /// Pre-order, subtree root first.
    pub(crate) nodes: Vec<Node>,
}

impl SceneFragment {
    pub fn root_uuid(&self) -> Option<&str> {
        self.nodes.first().map(|n| n.uuid.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The scene tree: an arena of nodes rooted at a single scene node.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    uuid_index: HashMap<String, NodeId>,
    root: NodeId,
    next_id: u32,
}

impl SceneGraph {
    /// Create a graph containing only the root scene node.
    pub fn new() -> Self {
        let mut graph = Self {
            nodes: HashMap::new(),
            uuid_index: HashMap::new(),
            root: NodeId(0),
            next_id: 0,
        };
        graph.root = graph.create_node("Scene");
        graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, including detached ones and the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Create a detached node. Attach it with [`Self::set_parent`].
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let node = Node::new(id, name);
        self.uuid_index.insert(node.uuid.clone(), id);
        self.nodes.insert(id, node);
        id
    }

    /// Depth-first lookup by stable identifier.
    ///
    /// This is how commands re-resolve targets after deserialization;
    /// they never hold node handles across that boundary.
    pub fn find_by_uuid(&self, uuid: &str) -> Option<NodeId> {
        self.uuid_index.get(uuid).copied()
    }

    /// Replace a node's uuid, keeping the index consistent.
    /// Returns the previous uuid.
    pub fn set_uuid(&mut self, id: NodeId, new_uuid: impl Into<String>) -> Result<String, SceneError> {
        let new_uuid = new_uuid.into();
        if let Some(&existing) = self.uuid_index.get(&new_uuid) {
            if existing != id {
                return Err(SceneError::DuplicateUuid(new_uuid));
            }
            return Ok(new_uuid);
        }
        let node = self.node_mut(id)?;
        let old = std::mem::replace(&mut node.uuid, new_uuid.clone());
        self.uuid_index.remove(&old);
        self.uuid_index.insert(new_uuid, id);
        Ok(old)
    }

    /// Position of `id` within its parent's children, if attached.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.nodes.get(&id)?.parent?;
        self.nodes
            .get(&parent)?
            .children
            .iter()
            .position(|&c| c == id)
    }

    /// Whether `node` lies strictly below `ancestor`.
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }
        false
    }

    /// Attach or move `child` under `new_parent` at `index_hint`
    /// (clamped; default end). Returns the index actually used.
    ///
    /// Rejects cycles before touching the tree: the graph is a tree at
    /// all times, so a node can never be reparented under itself or one
    /// of its descendants.
    pub fn set_parent(
        &mut self,
        child: NodeId,
        new_parent: NodeId,
        index_hint: Option<usize>,
    ) -> Result<usize, SceneError> {
        let old_parent = self.node(child)?.parent;
        let new_len = self.node(new_parent)?.children.len();
        let raw = index_hint.unwrap_or(new_len);
        let index = match (old_parent, self.index_in_parent(child)) {
            (Some(op), Some(old_index)) => {
                compute_insert_index(op, old_index, new_parent, raw, new_len)
            }
            _ => raw.min(new_len),
        };

        self.splice(child, new_parent, index)
    }

    /// Detach `child` from its current parent and insert it into
    /// `parent`'s children at exactly `index` (clamped post-removal).
    ///
    /// Callers are expected to have run [`compute_insert_index`]
    /// already; [`Self::set_parent`] is the hint-based wrapper. Move
    /// commands replay through this so a precomputed index is applied
    /// verbatim instead of being adjusted a second time.
    pub fn splice(
        &mut self,
        child: NodeId,
        parent: NodeId,
        index: usize,
    ) -> Result<usize, SceneError> {
        if child == self.root {
            return Err(SceneError::CannotDetachRoot);
        }
        self.node(child)?;
        self.node(parent)?;
        if parent == child || self.is_descendant(parent, child) {
            return Err(SceneError::WouldCreateCycle { child, parent });
        }

        let old_parent = self.node(child)?.parent;
        if let Some(op) = old_parent {
            if let Some(p) = self.nodes.get_mut(&op) {
                p.children.retain(|&c| c != child);
            }
        }

        let parent_node = self.node_mut(parent)?;
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, child);

        let child_node = self.node_mut(child)?;
        child_node.parent = Some(parent);
        // World matrix is stale under the new parent.
        child_node.dirty = true;

        Ok(index)
    }

    /// Convenience for attaching a freshly created node.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: Option<usize>,
    ) -> Result<usize, SceneError> {
        self.set_parent(child, parent, index)
    }

    /// Pre-order node ids of the subtree rooted at `id` (parent before
    /// children, children in order).
    pub fn traverse(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Detach the subtree at `id` and extract it from the arena.
    ///
    /// The subtree is not destroyed: the returned fragment owns it and
    /// [`Self::insert_fragment`] restores it exactly, which is how
    /// remove/add commands undo cheaply.
    pub fn remove(&mut self, id: NodeId) -> Result<SceneFragment, SceneError> {
        if id == self.root {
            return Err(SceneError::CannotDetachRoot);
        }
        let parent = self.node(id)?.parent;
        if let Some(p) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&p) {
                parent_node.children.retain(|&c| c != id);
            }
        }

        let order = self.traverse(id);
        let mut nodes = Vec::with_capacity(order.len());
        for nid in order {
            if let Some(mut node) = self.nodes.remove(&nid) {
                self.uuid_index.remove(&node.uuid);
                if nid == id {
                    node.parent = None;
                }
                nodes.push(node);
            }
        }
        Ok(SceneFragment { nodes })
    }

    /// Re-attach a fragment previously returned by [`Self::remove`].
    /// Returns the subtree root's id.
    pub fn insert_fragment(
        &mut self,
        fragment: SceneFragment,
        parent: NodeId,
        index: Option<usize>,
    ) -> Result<NodeId, SceneError> {
        self.node(parent)?;
        let root_id = fragment
            .nodes
            .first()
            .map(|n| n.id)
            .ok_or(SceneError::ForeignFragment)?;

        for node in &fragment.nodes {
            if self.nodes.contains_key(&node.id) {
                return Err(SceneError::ForeignFragment);
            }
            if self.uuid_index.contains_key(&node.uuid) {
                return Err(SceneError::DuplicateUuid(node.uuid.clone()));
            }
        }

        for node in fragment.nodes {
            self.uuid_index.insert(node.uuid.clone(), node.id);
            self.nodes.insert(node.id, node);
        }

        let parent_node = self.node_mut(parent)?;
        let len = parent_node.children.len();
        let index = index.unwrap_or(len).min(len);
        parent_node.children.insert(index, root_id);

        let root_node = self.node_mut(root_id)?;
        root_node.parent = Some(parent);
        root_node.dirty = true;

        Ok(root_id)
    }

    /// Recompute cached matrices for the subtree at `id`, pre-order.
    ///
    /// A node's local matrix is rebuilt when its dirty flag is set or
    /// `force` is true; any recomputed node forces its whole subtree so
    /// world matrices stay consistent with
    /// `world = parent_world * local`. After this returns, every matrix
    /// in the subtree is consistent with the current local transforms.
    pub fn update_world_matrix(&mut self, id: NodeId, force: bool) {
        let Some(node) = self.nodes.get(&id) else {
            log::warn!("update_world_matrix on dead handle {id}");
            return;
        };
        let parent_world = node
            .parent
            .and_then(|p| self.nodes.get(&p))
            .map(|p| p.world_matrix)
            .unwrap_or(Mat4::IDENTITY);
        self.update_world_recursive(id, parent_world, force);
    }

    fn update_world_recursive(&mut self, id: NodeId, parent_world: Mat4, force: bool) {
        let (world, children, changed) = {
            let Some(node) = self.nodes.get_mut(&id) else {
                return;
            };
            let changed = node.dirty || force;
            if changed {
                node.local_matrix = Mat4::compose(node.position, node.rotation, node.scale);
                node.world_matrix = parent_world * node.local_matrix;
                node.dirty = false;
            }
            (node.world_matrix, node.children.clone(), changed)
        };
        for child in children {
            self.update_world_recursive(child, world, changed);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
