//! Is-a edges between entities and lookup through ancestor chains.
//!
//! The graph only stores edges. Whether an entity owns a component is a
//! question for the archetype store, so resolution takes an `owns` predicate
//! and returns the entity whose value should be used.
//!
//! Parents are kept in insertion order. Resolution is a depth-first pre-order
//! walk: the entity itself, then its first parent's whole ancestry, then the
//! second parent's, and so on. The first owner found wins; values from several
//! parents are never merged.

use std::collections::{HashMap, HashSet};

use forge_component::Entity;

/// Directed acyclic graph of `child is-a parent` edges.
#[derive(Debug, Default)]
pub struct InheritanceGraph {
    /// Parents of each entity, in edge insertion order.
    parents: HashMap<Entity, Vec<Entity>>,
    /// Children of each entity, in edge insertion order.
    children: HashMap<Entity, Vec<Entity>>,
}

impl InheritanceGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if adding `child is-a parent` would close a cycle.
    #[must_use]
    pub fn would_cycle(&self, child: Entity, parent: Entity) -> bool {
        child == parent || self.is_ancestor(parent, child)
    }

    /// Insert `child is-a parent`.
    ///
    /// Returns `false` if the edge already existed. The caller must have
    /// checked [`InheritanceGraph::would_cycle`] first.
    pub fn insert(&mut self, child: Entity, parent: Entity) -> bool {
        debug_assert!(!self.would_cycle(child, parent));
        let parents = self.parents.entry(child).or_default();
        if parents.contains(&parent) {
            return false;
        }
        parents.push(parent);
        self.children.entry(parent).or_default().push(child);
        true
    }

    /// Remove `child is-a parent`. Returns `true` if the edge existed.
    pub fn remove(&mut self, child: Entity, parent: Entity) -> bool {
        let removed = remove_from(&mut self.parents, child, parent);
        if removed {
            remove_from(&mut self.children, parent, child);
        }
        removed
    }

    /// Drop every edge that touches `entity`, as parent or as child.
    pub fn remove_entity(&mut self, entity: Entity) {
        for parent in self.parents.remove(&entity).unwrap_or_default() {
            remove_from(&mut self.children, parent, entity);
        }
        for child in self.children.remove(&entity).unwrap_or_default() {
            remove_from(&mut self.parents, child, entity);
        }
    }

    /// Direct parents of `entity`, in insertion order.
    #[must_use]
    pub fn parents(&self, entity: Entity) -> &[Entity] {
        self.parents.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct children of `entity`, in insertion order.
    #[must_use]
    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.children.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if `entity` has at least one parent.
    #[must_use]
    pub fn has_parents(&self, entity: Entity) -> bool {
        !self.parents(entity).is_empty()
    }

    /// All transitive ancestors of `entity` in resolution order, each once.
    #[must_use]
    pub fn ancestors(&self, entity: Entity) -> Vec<Entity> {
        let mut out = Vec::new();
        self.walk(entity, |e| {
            if e != entity {
                out.push(e);
            }
            false
        });
        out
    }

    /// Returns `true` if `ancestor` is reachable from `entity` through one or
    /// more is-a edges.
    #[must_use]
    pub fn is_ancestor(&self, entity: Entity, ancestor: Entity) -> bool {
        entity != ancestor && self.walk(entity, |e| e == ancestor).is_some()
    }

    /// Find the entity that supplies a component for `entity`.
    ///
    /// `owns` is asked about `entity` first and then about its ancestors in
    /// resolution order. Returns the first entity for which it holds.
    pub fn resolve_owner(&self, entity: Entity, owns: impl FnMut(Entity) -> bool) -> Option<Entity> {
        self.walk(entity, owns)
    }

    /// Depth-first pre-order walk from `start`, parents in insertion order.
    /// Stops at and returns the first entity for which `visit` returns `true`.
    fn walk(&self, start: Entity, mut visit: impl FnMut(Entity) -> bool) -> Option<Entity> {
        if visit(start) {
            return Some(start);
        }
        let first = self.parents(start);
        if first.is_empty() {
            return None;
        }

        let mut stack: Vec<Entity> = first.iter().rev().copied().collect();
        let mut seen = HashSet::from([start]);
        while let Some(entity) = stack.pop() {
            if !seen.insert(entity) {
                continue;
            }
            if visit(entity) {
                return Some(entity);
            }
            // Reverse so the first parent is popped next.
            stack.extend(self.parents(entity).iter().rev().copied());
        }
        None
    }
}

fn remove_from(map: &mut HashMap<Entity, Vec<Entity>>, key: Entity, value: Entity) -> bool {
    let Some(list) = map.get_mut(&key) else {
        return false;
    };
    let Some(pos) = list.iter().position(|&e| e == value) else {
        return false;
    };
    list.remove(pos);
    if list.is_empty() {
        map.remove(&key);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(index: u32) -> Entity {
        Entity::from_raw_parts(index, 0)
    }

    #[test]
    fn test_insert_keeps_order_and_ignores_duplicates() {
        let mut graph = InheritanceGraph::new();
        assert!(graph.insert(e(0), e(1)));
        assert!(graph.insert(e(0), e(2)));
        assert!(!graph.insert(e(0), e(1)));
        assert_eq!(graph.parents(e(0)), &[e(1), e(2)]);
        assert_eq!(graph.children(e(1)), &[e(0)]);
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = InheritanceGraph::new();
        graph.insert(e(0), e(1));
        graph.insert(e(1), e(2));

        assert!(graph.would_cycle(e(1), e(0)));
        assert!(graph.would_cycle(e(2), e(0)));
        assert!(graph.would_cycle(e(3), e(3)));
        assert!(!graph.would_cycle(e(0), e(2)));
        assert!(!graph.would_cycle(e(3), e(0)));
    }

    #[test]
    fn test_ancestors_depth_first_in_insertion_order() {
        // 0 is-a 1, 0 is-a 2, 1 is-a 3, 2 is-a 3 (diamond).
        let mut graph = InheritanceGraph::new();
        graph.insert(e(0), e(1));
        graph.insert(e(0), e(2));
        graph.insert(e(1), e(3));
        graph.insert(e(2), e(3));

        assert_eq!(graph.ancestors(e(0)), vec![e(1), e(3), e(2)]);
        assert!(graph.is_ancestor(e(0), e(3)));
        assert!(!graph.is_ancestor(e(3), e(0)));
        assert!(!graph.is_ancestor(e(0), e(0)));
    }

    #[test]
    fn test_resolve_owner_first_match_wins() {
        let mut graph = InheritanceGraph::new();
        graph.insert(e(0), e(1));
        graph.insert(e(0), e(2));

        let owners = [e(1), e(2)];
        assert_eq!(graph.resolve_owner(e(0), |x| owners.contains(&x)), Some(e(1)));
        assert_eq!(graph.resolve_owner(e(0), |x| x == e(0)), Some(e(0)));
        assert_eq!(graph.resolve_owner(e(0), |_| false), None);
    }

    #[test]
    fn test_resolve_owner_without_parents_visits_only_self() {
        let mut graph = InheritanceGraph::new();
        graph.insert(e(1), e(2));

        let mut visited = Vec::new();
        let owner = graph.resolve_owner(e(0), |x| {
            visited.push(x);
            false
        });
        assert_eq!(owner, None);
        assert_eq!(visited, vec![e(0)]);

        // A diamond still visits the shared ancestor once.
        graph.insert(e(0), e(1));
        graph.insert(e(0), e(2));
        visited.clear();
        graph.resolve_owner(e(0), |x| {
            visited.push(x);
            false
        });
        assert_eq!(visited, vec![e(0), e(1), e(2)]);
    }

    #[test]
    fn test_remove_entity_drops_both_directions() {
        let mut graph = InheritanceGraph::new();
        graph.insert(e(0), e(1));
        graph.insert(e(1), e(2));

        graph.remove_entity(e(1));
        assert!(graph.parents(e(0)).is_empty());
        assert!(graph.children(e(2)).is_empty());
        assert!(!graph.has_parents(e(1)));
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = InheritanceGraph::new();
        graph.insert(e(0), e(1));
        assert!(graph.remove(e(0), e(1)));
        assert!(!graph.remove(e(0), e(1)));
        assert!(graph.children(e(1)).is_empty());
    }
}
