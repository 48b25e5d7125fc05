//! Query descriptors for iteration.
//!
//! A [`QueryDescriptor`] declares which component types a traversal needs and
//! which entities it should skip. Matching counts inherited components: an
//! entity satisfies a term if it owns the component or resolves it through an
//! is-a ancestor.

use serde::{Deserialize, Serialize};

use crate::component::ComponentTypeId;

/// Describes what an iteration over the world should yield.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Component types every yielded entity must have (owned or inherited),
    /// in the order their fields are exposed.
    pub terms: Vec<ComponentTypeId>,
    /// Filters applied on top of the terms.
    pub filters: Vec<QueryFilter>,
    /// Whether prefab-tagged entities are yielded.
    #[serde(default)]
    pub include_prefabs: bool,
}

impl QueryDescriptor {
    /// Create a new empty query descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a descriptor requiring each of `types`.
    #[must_use]
    pub fn from_terms(types: &[ComponentTypeId]) -> Self {
        Self {
            terms: types.to_vec(),
            ..Self::default()
        }
    }

    /// Add a required component.
    #[must_use]
    pub fn term(mut self, type_id: ComponentTypeId) -> Self {
        self.terms.push(type_id);
        self
    }

    /// Add a query filter.
    #[must_use]
    pub fn filter(mut self, f: QueryFilter) -> Self {
        self.filters.push(f);
        self
    }

    /// Yield prefabs as well as regular entities.
    #[must_use]
    pub fn with_prefabs(mut self) -> Self {
        self.include_prefabs = true;
        self
    }

    /// Returns every component type the descriptor mentions, terms first.
    #[must_use]
    pub fn all_accessed_types(&self) -> Vec<ComponentTypeId> {
        let mut types = self.terms.clone();
        types.extend(self.filters.iter().map(QueryFilter::type_id));
        types
    }

    /// Returns `true` if `type_id` is a term of this query.
    #[must_use]
    pub fn requires(&self, type_id: ComponentTypeId) -> bool {
        self.terms.contains(&type_id)
            || self
                .filters
                .iter()
                .any(|f| matches!(f, QueryFilter::With(id) if *id == type_id))
    }
}

/// A filter that narrows the set of entities matched by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryFilter {
    /// Only match entities that have this component, owned or inherited.
    With(ComponentTypeId),
    /// Only match entities that do NOT have this component, owned or inherited.
    Without(ComponentTypeId),
}

impl QueryFilter {
    /// The component type the filter tests.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        match self {
            QueryFilter::With(id) | QueryFilter::Without(id) => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_terms_in_order() {
        let speed = ComponentTypeId(1);
        let position = ComponentTypeId(2);

        let q = QueryDescriptor::new().term(speed).term(position);
        assert_eq!(q.terms, vec![speed, position]);
        assert!(!q.include_prefabs);
        assert_eq!(q, QueryDescriptor::from_terms(&[speed, position]));
    }

    #[test]
    fn test_requires_includes_with_filters() {
        let a = ComponentTypeId(1);
        let b = ComponentTypeId(2);
        let c = ComponentTypeId(3);

        let q = QueryDescriptor::new()
            .term(a)
            .filter(QueryFilter::With(b))
            .filter(QueryFilter::Without(c));

        assert!(q.requires(a));
        assert!(q.requires(b));
        assert!(!q.requires(c));
        assert_eq!(q.all_accessed_types(), vec![a, b, c]);
    }

    #[test]
    fn test_descriptor_parses_from_json() {
        let json = r#"{"terms":[7],"filters":[{"Without":9}]}"#;
        let q: QueryDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(q.terms, vec![ComponentTypeId(7)]);
        assert_eq!(q.filters, vec![QueryFilter::Without(ComponentTypeId(9))]);
        assert!(!q.include_prefabs);
    }
}
