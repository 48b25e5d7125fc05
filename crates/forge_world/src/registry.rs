//! Component registry: maps component type ids to their storage metadata.
//!
//! Each [`World`](crate::World) owns its own registry; nothing is shared
//! process-wide, so independent worlds can register the same names without
//! interfering.

use std::alloc::Layout;
use std::collections::HashMap;

use forge_component::{ComponentMeta, ComponentTypeId, MAX_COMPONENT_ALIGN};
use tracing::debug;

use crate::error::{WorldError, WorldResult};

/// Registry of all component types known to a world.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    /// Metadata keyed by type id.
    types: HashMap<ComponentTypeId, ComponentMeta>,
}

impl ComponentRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register a component type.
    ///
    /// Registering the same metadata again is a no-op. Registering a
    /// different layout under an existing id fails with
    /// [`WorldError::LayoutConflict`].
    pub fn register(&mut self, meta: ComponentMeta) -> WorldResult<ComponentTypeId> {
        if meta.layout.align() > MAX_COMPONENT_ALIGN {
            return Err(WorldError::UnsupportedAlignment {
                name: meta.name,
                align: meta.layout.align(),
                max: MAX_COMPONENT_ALIGN,
            });
        }

        if let Some(existing) = self.types.get(&meta.type_id) {
            if existing.layout != meta.layout || existing.inheritable != meta.inheritable {
                return Err(WorldError::LayoutConflict {
                    component: meta.type_id,
                    name: meta.name,
                });
            }
            return Ok(meta.type_id);
        }

        debug!(
            component = %meta.name,
            size = meta.layout.size(),
            align = meta.layout.align(),
            "registered component type"
        );
        let id = meta.type_id;
        self.types.insert(id, meta);
        Ok(id)
    }

    /// Insert a built-in type without validation.
    pub(crate) fn insert_builtin(&mut self, meta: ComponentMeta) -> ComponentTypeId {
        let id = meta.type_id;
        self.types.insert(id, meta);
        id
    }

    /// Returns the metadata for `type_id`.
    pub fn meta(&self, type_id: ComponentTypeId) -> WorldResult<&ComponentMeta> {
        self.types
            .get(&type_id)
            .ok_or(WorldError::UnknownType(type_id))
    }

    /// Returns the size and alignment of `type_id`.
    pub fn layout_of(&self, type_id: ComponentTypeId) -> WorldResult<Layout> {
        self.meta(type_id).map(|meta| meta.layout)
    }

    /// Returns the registered name of `type_id`.
    pub fn name_of(&self, type_id: ComponentTypeId) -> WorldResult<&str> {
        self.meta(type_id).map(|meta| meta.name.as_str())
    }

    /// Returns `true` if entities can see `type_id` through is-a edges.
    /// Unregistered types are reported as not inheritable.
    #[must_use]
    pub fn is_inheritable(&self, type_id: ComponentTypeId) -> bool {
        self.types
            .get(&type_id)
            .is_some_and(|meta| meta.inheritable)
    }

    /// Returns `true` if `type_id` has been registered.
    #[must_use]
    pub fn contains(&self, type_id: ComponentTypeId) -> bool {
        self.types.contains_key(&type_id)
    }

    /// Fails with [`WorldError::UnknownType`] on the first unregistered id.
    pub fn ensure_known(&self, types: &[ComponentTypeId]) -> WorldResult<()> {
        match types.iter().find(|ty| !self.contains(**ty)) {
            Some(missing) => Err(WorldError::UnknownType(*missing)),
            None => Ok(()),
        }
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
