//! Platform nodes created by render patches.
//!
//! Components build their own markup (notifications, the cookie banner, the
//! modal) through `DomPatch::Create`, so the platform holds a node per
//! synthetic id. Removing a root must release every node created under it.

use std::collections::HashMap;

use vitrine_ui::ElementId;

/// Created nodes keyed by synthetic id, with their parent links.
#[derive(Debug)]
pub struct CreatedNodes<T> {
    nodes: HashMap<ElementId, T>,
    parents: HashMap<ElementId, ElementId>,
    children: HashMap<ElementId, Vec<ElementId>>,
}

impl<T> Default for CreatedNodes<T> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            parents: HashMap::new(),
            children: HashMap::new(),
        }
    }
}

impl<T> CreatedNodes<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `node` under `id`. Only created parents are linked; page
    /// elements outlive everything created under them.
    pub fn insert(&mut self, id: ElementId, parent: Option<ElementId>, node: T) {
        if let Some(parent) = parent.filter(|p| self.nodes.contains_key(p)) {
            self.children.entry(parent).or_default().push(id);
            self.parents.insert(id, parent);
        }
        self.nodes.insert(id, node);
    }

    /// Returns the node for `id`.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&T> {
        self.nodes.get(&id)
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Releases `id` and everything created under it. Returns how many
    /// nodes were released.
    pub fn remove(&mut self, id: ElementId) -> usize {
        if let Some(parent) = self.parents.remove(&id) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|&child| child != id);
            }
        }

        let mut released = 0;
        let mut pending = vec![id];
        while let Some(node) = pending.pop() {
            if self.nodes.remove(&node).is_some() {
                released += 1;
            }
            self.parents.remove(&node);
            if let Some(children) = self.children.remove(&node) {
                pending.extend(children);
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> ElementId {
        ElementId::synthetic(n)
    }

    #[test]
    fn test_removing_root_releases_subtree() {
        let body = ElementId::new(0);
        let mut nodes = CreatedNodes::new();
        nodes.insert(id(0), Some(body), "notification");
        nodes.insert(id(1), Some(id(0)), "message");
        nodes.insert(id(2), Some(id(0)), "close");

        assert_eq!(nodes.remove(id(0)), 3);
        assert!(nodes.is_empty());
        assert!(nodes.get(id(2)).is_none());
    }

    #[test]
    fn test_removing_child_unlinks_it() {
        let mut nodes = CreatedNodes::new();
        nodes.insert(id(0), None, "banner");
        nodes.insert(id(1), Some(id(0)), "text");
        nodes.insert(id(2), Some(id(0)), "actions");
        nodes.insert(id(3), Some(id(2)), "accept");

        assert_eq!(nodes.remove(id(1)), 1);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.get(id(3)), Some(&"accept"));

        assert_eq!(nodes.remove(id(0)), 3);
        assert!(nodes.is_empty());
        assert_eq!(nodes.remove(id(0)), 0);
    }

    #[test]
    fn test_repeated_notifications_do_not_accumulate() {
        let mut nodes = CreatedNodes::new();
        for round in 0..100 {
            let root = id(round * 3);
            nodes.insert(root, None, ());
            nodes.insert(id(round * 3 + 1), Some(root), ());
            nodes.insert(id(round * 3 + 2), Some(root), ());
            nodes.remove(root);
        }
        assert!(nodes.is_empty());
    }
}
