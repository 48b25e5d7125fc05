//! World state storage.
//!
//! The [`World`] owns everything: the component registry, entity slots and
//! their locations, archetype tables, is-a edges, override markers, and
//! entity names. Typed accessors (`set::<T>`, `get::<T>`) are thin wrappers
//! over the byte-level API (`set_component`, `get_component`) keyed by
//! [`ComponentTypeId`].

use std::alloc::Layout;
use std::collections::{BTreeSet, HashMap};

use forge_component::{
    ArchetypeId, ArchetypeTable, Component, ComponentMeta, ComponentTypeId, Entity,
    EntityAllocator, Prefab, Tag,
};
use tracing::{debug, warn};

use crate::config::WorldConfig;
use crate::error::{WorldError, WorldResult};
use crate::inheritance::InheritanceGraph;
use crate::registry::ComponentRegistry;

/// Where an entity's owned components live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    /// The table holding the entity's row.
    pub archetype: ArchetypeId,
    /// Row index inside that table.
    pub row: usize,
}

/// An ECS world with prefab inheritance.
///
/// Every live entity has exactly one row in exactly one archetype table
/// (the empty archetype when it owns nothing). Components reached through
/// is-a edges are never copied into the child's row unless the child
/// overrides them.
#[derive(Debug)]
pub struct World {
    pub(crate) config: WorldConfig,
    pub(crate) registry: ComponentRegistry,
    allocator: EntityAllocator,
    /// Location of each slot, indexed by [`Entity::index`]. Only meaningful
    /// for live entities.
    locations: Vec<EntityLocation>,
    /// Archetype tables, indexed by [`ArchetypeId`].
    pub(crate) archetypes: Vec<ArchetypeTable>,
    /// Maps component type sets to archetype IDs, for fast lookup.
    type_set_to_archetype: HashMap<BTreeSet<ComponentTypeId>, ArchetypeId>,
    pub(crate) inheritance: InheritanceGraph,
    /// Override markers: types an entity keeps a private copy of, and that
    /// entities linked to it later receive a private copy of.
    overrides: HashMap<Entity, BTreeSet<ComponentTypeId>>,
    names: HashMap<Entity, String>,
    by_name: HashMap<String, Entity>,
    pub(crate) prefab: ComponentTypeId,
}

impl World {
    /// Create a new empty world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a new empty world.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        let mut registry = ComponentRegistry::new();
        let prefab = registry.insert_builtin(Prefab::meta());

        let empty = ArchetypeTable::new(
            ArchetypeId::EMPTY,
            std::iter::empty::<(ComponentTypeId, Layout)>(),
        );
        let mut type_set_to_archetype = HashMap::new();
        type_set_to_archetype.insert(BTreeSet::new(), ArchetypeId::EMPTY);

        debug!(world = %config.name, "world created");
        Self {
            allocator: EntityAllocator::with_capacity(config.entity_capacity),
            locations: Vec::with_capacity(config.entity_capacity),
            config,
            registry,
            archetypes: vec![empty],
            type_set_to_archetype,
            inheritance: InheritanceGraph::new(),
            overrides: HashMap::new(),
            names: HashMap::new(),
            by_name: HashMap::new(),
            prefab,
        }
    }

    /// Returns the world's configuration.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Returns the component registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// The id of the built-in [`Prefab`] tag.
    #[must_use]
    pub fn prefab_type(&self) -> ComponentTypeId {
        self.prefab
    }

    // -- Registration --

    /// Register a component type described at runtime.
    pub fn register_meta(&mut self, meta: ComponentMeta) -> WorldResult<ComponentTypeId> {
        self.registry.register(meta)
    }

    /// Register the Rust component type `T`.
    pub fn register<T: Component>(&mut self) -> WorldResult<ComponentTypeId> {
        self.registry.register(T::meta())
    }

    /// Register the Rust tag type `T`.
    pub fn register_tag<T: Tag>(&mut self) -> WorldResult<ComponentTypeId> {
        self.registry.register(T::meta())
    }

    /// Id of `T`, checking that the registered layout is really `T`'s.
    fn typed_id<T: Component>(&self) -> WorldResult<ComponentTypeId> {
        let id = T::component_type_id();
        if self.registry.layout_of(id)? != Layout::new::<T>() {
            return Err(WorldError::LayoutConflict {
                component: id,
                name: T::type_name().to_owned(),
            });
        }
        Ok(id)
    }

    // -- Entity lifecycle --

    /// Allocate a new entity without any components.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        let row = self.archetypes[ArchetypeId::EMPTY.index()].push_zeroed(entity);
        let location = EntityLocation {
            archetype: ArchetypeId::EMPTY,
            row,
        };

        let index = entity.index() as usize;
        if index == self.locations.len() {
            self.locations.push(location);
        } else {
            self.locations[index] = location;
        }

        debug!(world = %self.config.name, %entity, "entity created");
        entity
    }

    /// Return the live entity called `name`, creating it if there is none.
    pub fn create_named(&mut self, name: &str) -> Entity {
        if let Some(&entity) = self.by_name.get(name) {
            return entity;
        }
        let entity = self.create_entity();
        self.names.insert(entity, name.to_owned());
        self.by_name.insert(name.to_owned(), entity);
        entity
    }

    /// Return the entity called `name` tagged as a [`Prefab`], creating it if
    /// needed.
    pub fn create_prefab(&mut self, name: &str) -> Entity {
        let entity = self.create_named(name);
        if !self.owns_unchecked(entity, self.prefab) {
            self.insert_owned(entity, self.prefab, &[]);
        }
        entity
    }

    /// Destroy an entity.
    ///
    /// Its row is removed, every is-a edge touching it is dropped, and the
    /// handle goes stale. Entities that inherited from it lose access to its
    /// components. Returns `false` (and does nothing) if the handle is already
    /// stale.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }

        let location = self.locations[entity.index() as usize];
        if let Some(moved) = self.archetypes[location.archetype.index()].swap_remove(location.row) {
            self.locations[moved.index() as usize].row = location.row;
        }

        self.inheritance.remove_entity(entity);
        self.overrides.remove(&entity);
        if let Some(name) = self.names.remove(&entity) {
            self.by_name.remove(&name);
        }
        self.allocator.free(entity);

        debug!(world = %self.config.name, %entity, "entity destroyed");
        true
    }

    /// Returns `true` if `entity` is a live handle.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Look up a live entity by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Entity> {
        self.by_name.get(name).copied()
    }

    /// Returns the name of `entity`, if it has one.
    #[must_use]
    pub fn name_of(&self, entity: Entity) -> Option<&str> {
        self.names.get(&entity).map(String::as_str)
    }

    fn ensure_alive(&self, entity: Entity) -> WorldResult<()> {
        if self.allocator.is_alive(entity) {
            Ok(())
        } else {
            Err(WorldError::StaleHandle(entity))
        }
    }

    /// Returns the storage location of `entity`.
    pub fn location(&self, entity: Entity) -> WorldResult<EntityLocation> {
        self.ensure_alive(entity)?;
        Ok(self.locations[entity.index() as usize])
    }

    // -- Owned components --

    /// Write `bytes` as `entity`'s own value of `type_id`.
    ///
    /// If the entity already owns the component it is overwritten in place;
    /// otherwise the entity moves to the archetype that adds `type_id`. An
    /// inherited value is shadowed from then on.
    pub fn set_component(
        &mut self,
        entity: Entity,
        type_id: ComponentTypeId,
        bytes: &[u8],
    ) -> WorldResult<()> {
        let layout = self.registry.layout_of(type_id)?;
        self.ensure_alive(entity)?;
        if bytes.len() != layout.size() {
            return Err(WorldError::SizeMismatch {
                component: type_id,
                expected: layout.size(),
                actual: bytes.len(),
            });
        }
        self.insert_owned(entity, type_id, bytes);
        Ok(())
    }

    /// Set `entity`'s own value of `T`, registering `T` if needed.
    pub fn set<T: Component>(&mut self, entity: Entity, value: T) -> WorldResult<()> {
        let id = self.register::<T>()?;
        self.set_component(entity, id, bytemuck::bytes_of(&value))
    }

    /// Add the tag `T` to `entity`, registering `T` if needed.
    pub fn add_tag<T: Tag>(&mut self, entity: Entity) -> WorldResult<()> {
        let id = self.register_tag::<T>()?;
        self.set_component(entity, id, &[])
    }

    /// Remove `entity`'s own value of `type_id`.
    ///
    /// Any override marker for the type is cleared too. If an ancestor still
    /// defines the component, it becomes visible again through inheritance.
    /// Returns `false` if the entity did not own the component.
    pub fn remove_component(&mut self, entity: Entity, type_id: ComponentTypeId) -> WorldResult<bool> {
        self.registry.meta(type_id)?;
        self.ensure_alive(entity)?;

        if let Some(marked) = self.overrides.get_mut(&entity) {
            marked.remove(&type_id);
            if marked.is_empty() {
                self.overrides.remove(&entity);
            }
        }

        let location = self.locations[entity.index() as usize];
        let table = &self.archetypes[location.archetype.index()];
        if !table.has_component(type_id) {
            return Ok(false);
        }

        let mut types = table.component_types.clone();
        types.remove(&type_id);
        let target = self.get_or_create_archetype(types);
        self.move_entity(entity, location, target);
        Ok(true)
    }

    /// Remove `entity`'s own value of `T`.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> WorldResult<bool> {
        self.remove_component(entity, T::component_type_id())
    }

    /// Remove the tag `T` from `entity`.
    pub fn remove_tag<T: Tag>(&mut self, entity: Entity) -> WorldResult<bool> {
        self.remove_component(entity, T::component_type_id())
    }

    /// Returns `entity`'s own bytes for `type_id`, or
    /// [`WorldError::NotOwned`] if it is inherited or absent.
    pub fn get_own_component(&self, entity: Entity, type_id: ComponentTypeId) -> WorldResult<&[u8]> {
        self.registry.meta(type_id)?;
        self.ensure_alive(entity)?;
        self.own_bytes_unchecked(entity, type_id)
            .ok_or(WorldError::NotOwned {
                entity,
                component: type_id,
            })
    }

    /// Mutable variant of [`World::get_own_component`].
    pub fn get_own_component_mut(
        &mut self,
        entity: Entity,
        type_id: ComponentTypeId,
    ) -> WorldResult<&mut [u8]> {
        self.registry.meta(type_id)?;
        self.ensure_alive(entity)?;
        self.own_bytes_mut_unchecked(entity, type_id)
            .ok_or(WorldError::NotOwned {
                entity,
                component: type_id,
            })
    }

    /// Typed variant of [`World::get_own_component`].
    pub fn get_own<T: Component>(&self, entity: Entity) -> WorldResult<&T> {
        let id = self.typed_id::<T>()?;
        self.get_own_component(entity, id).map(bytemuck::from_bytes)
    }

    /// Typed variant of [`World::get_own_component_mut`].
    pub fn get_own_mut<T: Component>(&mut self, entity: Entity) -> WorldResult<&mut T> {
        let id = self.typed_id::<T>()?;
        self.get_own_component_mut(entity, id)
            .map(bytemuck::from_bytes_mut)
    }

    /// Returns `true` if `entity` owns `type_id` (inheritance not consulted).
    pub fn owns(&self, entity: Entity, type_id: ComponentTypeId) -> WorldResult<bool> {
        self.registry.meta(type_id)?;
        self.ensure_alive(entity)?;
        Ok(self.owns_unchecked(entity, type_id))
    }

    // -- Resolved components --

    /// Resolve `type_id` for `entity`: its own value if it has one, otherwise
    /// the first value found walking is-a parents depth-first in insertion
    /// order. `Ok(None)` means the component is absent everywhere.
    pub fn get_component(&self, entity: Entity, type_id: ComponentTypeId) -> WorldResult<Option<&[u8]>> {
        self.registry.meta(type_id)?;
        self.ensure_alive(entity)?;
        Ok(self
            .owner_unchecked(entity, type_id)
            .and_then(|owner| self.own_bytes_unchecked(owner, type_id)))
    }

    /// Typed variant of [`World::get_component`].
    pub fn get<T: Component>(&self, entity: Entity) -> WorldResult<Option<&T>> {
        let id = self.typed_id::<T>()?;
        Ok(self.get_component(entity, id)?.map(bytemuck::from_bytes))
    }

    /// Returns the entity whose value `entity` sees for `type_id`.
    pub fn owner_of(&self, entity: Entity, type_id: ComponentTypeId) -> WorldResult<Option<Entity>> {
        self.registry.meta(type_id)?;
        self.ensure_alive(entity)?;
        Ok(self.owner_unchecked(entity, type_id))
    }

    /// Returns `true` if `entity` owns or inherits `type_id`.
    pub fn has(&self, entity: Entity, type_id: ComponentTypeId) -> WorldResult<bool> {
        Ok(self.owner_of(entity, type_id)?.is_some())
    }

    /// Returns `true` if `entity` owns or inherits the tag `T`.
    pub fn has_tag<T: Tag>(&self, entity: Entity) -> WorldResult<bool> {
        self.has(entity, T::component_type_id())
    }

    /// Returns `true` if `entity` carries the [`Prefab`] tag.
    pub fn is_prefab(&self, entity: Entity) -> WorldResult<bool> {
        self.owns(entity, self.prefab)
    }

    // -- Inheritance --

    /// Make `child` inherit from `parent`.
    ///
    /// Fails with [`WorldError::CycleDetected`] if `child` is `parent` or
    /// already one of its ancestors. Adding an existing edge is a no-op.
    ///
    /// Override markers on `parent` and its ancestors are applied here: the
    /// child receives a private copy of each marked component it does not
    /// already own. Markers added to a prefab later are not applied to
    /// entities that were linked before.
    pub fn add_is_a(&mut self, child: Entity, parent: Entity) -> WorldResult<()> {
        self.ensure_alive(child)?;
        self.ensure_alive(parent)?;

        if self.inheritance.would_cycle(child, parent) {
            warn!(world = %self.config.name, %child, %parent, "rejected cyclic is-a edge");
            return Err(WorldError::CycleDetected { child, parent });
        }
        if !self.inheritance.insert(child, parent) {
            return Ok(());
        }
        debug!(world = %self.config.name, %child, %parent, "is-a edge added");

        let mut marked: Vec<ComponentTypeId> = Vec::new();
        for source in std::iter::once(parent).chain(self.inheritance.ancestors(parent)) {
            for &type_id in self.overrides.get(&source).into_iter().flatten() {
                if !marked.contains(&type_id) && self.registry.is_inheritable(type_id) {
                    marked.push(type_id);
                }
            }
        }
        for type_id in marked {
            if !self.owns_unchecked(child, type_id) {
                self.materialize_copy(child, type_id);
            }
        }
        Ok(())
    }

    /// Remove the edge `child is-a parent`. Private copies made when the edge
    /// was added stay with the child.
    pub fn remove_is_a(&mut self, child: Entity, parent: Entity) -> WorldResult<bool> {
        self.ensure_alive(child)?;
        self.ensure_alive(parent)?;
        Ok(self.inheritance.remove(child, parent))
    }

    /// Returns `true` if `ancestor` is reachable from `entity` through is-a
    /// edges.
    pub fn is_a(&self, entity: Entity, ancestor: Entity) -> WorldResult<bool> {
        self.ensure_alive(entity)?;
        self.ensure_alive(ancestor)?;
        Ok(self.inheritance.is_ancestor(entity, ancestor))
    }

    /// Direct is-a parents of `entity`, in insertion order.
    pub fn parents(&self, entity: Entity) -> WorldResult<&[Entity]> {
        self.ensure_alive(entity)?;
        Ok(self.inheritance.parents(entity))
    }

    /// Entities that directly inherit from `entity`.
    pub fn children(&self, entity: Entity) -> WorldResult<&[Entity]> {
        self.ensure_alive(entity)?;
        Ok(self.inheritance.children(entity))
    }

    /// Every entity reachable from `entity` through is-a edges, in lookup
    /// order.
    pub fn ancestors(&self, entity: Entity) -> WorldResult<Vec<Entity>> {
        self.ensure_alive(entity)?;
        Ok(self.inheritance.ancestors(entity))
    }

    /// Give `entity` a private copy of `type_id` and mark it as overridden.
    ///
    /// The copy starts from the value `entity` currently resolves (zeroed if
    /// absent). Entities linked to `entity` afterwards get their own copies
    /// too; entities already linked keep sharing. Non-inheritable types such
    /// as [`Prefab`] fail with [`WorldError::NotInheritable`].
    pub fn override_component(&mut self, entity: Entity, type_id: ComponentTypeId) -> WorldResult<()> {
        self.registry.meta(type_id)?;
        self.ensure_alive(entity)?;
        if !self.registry.is_inheritable(type_id) {
            return Err(WorldError::NotInheritable(type_id));
        }

        if !self.owns_unchecked(entity, type_id) {
            self.materialize_copy(entity, type_id);
        }
        self.overrides.entry(entity).or_default().insert(type_id);
        debug!(world = %self.config.name, %entity, component = %type_id, "component overridden");
        Ok(())
    }

    /// Typed variant of [`World::override_component`], registering `T` if
    /// needed.
    pub fn auto_override<T: Component>(&mut self, entity: Entity) -> WorldResult<()> {
        let id = self.register::<T>()?;
        self.override_component(entity, id)
    }

    /// Returns `true` if `entity` carries an override marker for `type_id`.
    pub fn has_override(&self, entity: Entity, type_id: ComponentTypeId) -> WorldResult<bool> {
        self.ensure_alive(entity)?;
        Ok(self
            .overrides
            .get(&entity)
            .is_some_and(|marked| marked.contains(&type_id)))
    }

    // -- Introspection --

    /// The component types `entity` owns, in canonical order.
    pub fn type_of(&self, entity: Entity) -> WorldResult<Vec<ComponentTypeId>> {
        let location = self.location(entity)?;
        Ok(self.archetypes[location.archetype.index()]
            .component_types
            .iter()
            .copied()
            .collect())
    }

    /// Render `entity`'s owned types and is-a parents, e.g.
    /// `Position, (IsA, MammothFreighter)`.
    pub fn describe(&self, entity: Entity) -> WorldResult<String> {
        let mut parts = Vec::new();
        for type_id in self.type_of(entity)? {
            parts.push(self.registry.name_of(type_id)?.to_owned());
        }
        for &parent in self.inheritance.parents(entity) {
            let label = match self.name_of(parent) {
                Some(name) => name.to_owned(),
                None => parent.to_string(),
            };
            parts.push(format!("(IsA, {label})"));
        }
        Ok(parts.join(", "))
    }

    /// Returns the number of live entities in the world.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.allocator.live_count()
    }

    /// Returns the number of archetypes in the world.
    #[must_use]
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    // -- Internals. Callers have checked liveness and registration. --

    pub(crate) fn owns_unchecked(&self, entity: Entity, type_id: ComponentTypeId) -> bool {
        let location = self.locations[entity.index() as usize];
        self.archetypes[location.archetype.index()].has_component(type_id)
    }

    pub(crate) fn owner_unchecked(&self, entity: Entity, type_id: ComponentTypeId) -> Option<Entity> {
        if !self.registry.is_inheritable(type_id) {
            return self.owns_unchecked(entity, type_id).then_some(entity);
        }
        self.inheritance
            .resolve_owner(entity, |candidate| self.owns_unchecked(candidate, type_id))
    }

    pub(crate) fn own_bytes_unchecked(&self, entity: Entity, type_id: ComponentTypeId) -> Option<&[u8]> {
        let location = self.locations[entity.index() as usize];
        self.archetypes[location.archetype.index()]
            .column(type_id)?
            .get_raw(location.row)
    }

    pub(crate) fn own_bytes_mut_unchecked(
        &mut self,
        entity: Entity,
        type_id: ComponentTypeId,
    ) -> Option<&mut [u8]> {
        let location = self.locations[entity.index() as usize];
        self.archetypes[location.archetype.index()]
            .column_mut(type_id)?
            .get_raw_mut(location.row)
    }

    /// Copy the value `entity` currently resolves for `type_id` (or zeroes)
    /// into a value it owns.
    fn materialize_copy(&mut self, entity: Entity, type_id: ComponentTypeId) {
        let value = match self
            .owner_unchecked(entity, type_id)
            .and_then(|owner| self.own_bytes_unchecked(owner, type_id))
        {
            Some(bytes) => bytes.to_vec(),
            None => {
                let size = self.registry.layout_of(type_id).map_or(0, |l| l.size());
                vec![0; size]
            }
        };
        self.insert_owned(entity, type_id, &value);
    }

    /// Write an owned value, moving the entity to a wider archetype if
    /// needed. `bytes` must already match the registered size.
    fn insert_owned(&mut self, entity: Entity, type_id: ComponentTypeId, bytes: &[u8]) {
        if let Some(slot) = self.own_bytes_mut_unchecked(entity, type_id) {
            slot.copy_from_slice(bytes);
            return;
        }

        let location = self.locations[entity.index() as usize];
        let mut types = self.archetypes[location.archetype.index()]
            .component_types
            .clone();
        types.insert(type_id);
        let target = self.get_or_create_archetype(types);
        self.move_entity(entity, location, target);

        if let Some(slot) = self.own_bytes_mut_unchecked(entity, type_id) {
            slot.copy_from_slice(bytes);
        }
    }

    /// Move `entity`'s row from `from` into archetype `to`.
    fn move_entity(&mut self, entity: Entity, from: EntityLocation, to: ArchetypeId) {
        let (src, dst) = pair_mut(&mut self.archetypes, from.archetype.index(), to.index());
        let (row, swapped) = src.move_row(from.row, dst);
        if let Some(moved) = swapped {
            self.locations[moved.index() as usize].row = from.row;
        }
        self.locations[entity.index() as usize] = EntityLocation { archetype: to, row };
    }

    /// Get or create an archetype for the given set of component types.
    /// Every type in the set must be registered.
    fn get_or_create_archetype(&mut self, component_types: BTreeSet<ComponentTypeId>) -> ArchetypeId {
        if let Some(&id) = self.type_set_to_archetype.get(&component_types) {
            return id;
        }

        let id = ArchetypeId(self.archetypes.len() as u32);
        let layouts = component_types.iter().filter_map(|&type_id| {
            self.registry
                .layout_of(type_id)
                .ok()
                .map(|layout| (type_id, layout))
        });
        let table = ArchetypeTable::new(id, layouts);
        debug!(
            world = %self.config.name,
            archetype = id.0,
            components = component_types.len(),
            "archetype created"
        );
        self.archetypes.push(table);
        self.type_set_to_archetype.insert(component_types, id);
        id
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrow two distinct tables mutably.
fn pair_mut(tables: &mut [ArchetypeTable], a: usize, b: usize) -> (&mut ArchetypeTable, &mut ArchetypeTable) {
    assert_ne!(a, b, "cannot move an entity into its own archetype");
    if a < b {
        let (left, right) = tables.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = tables.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use bytemuck::{Pod, Zeroable};

    use super::*;

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
    struct Defense {
        value: f64,
    }

    impl Component for Defense {
        fn type_name() -> &'static str {
            "Defense"
        }
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
    struct Position {
        x: f64,
        y: f64,
    }

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    struct HasFtl;

    impl Tag for HasFtl {
        fn type_name() -> &'static str {
            "HasFTL"
        }
    }

    #[test]
    fn test_create_places_entity_in_empty_archetype() {
        let mut world = World::new();
        let e = world.create_entity();
        assert!(world.is_alive(e));
        assert_eq!(world.entity_count(), 1);
        assert_eq!(
            world.location(e).unwrap(),
            EntityLocation {
                archetype: ArchetypeId::EMPTY,
                row: 0
            }
        );
        assert!(world.type_of(e).unwrap().is_empty());
    }

    #[test]
    fn test_set_and_get_own() {
        let mut world = World::new();
        let e = world.create_entity();
        world.set(e, Defense { value: 50.0 }).unwrap();
        world.set(e, Position { x: 1.0, y: 2.0 }).unwrap();

        assert_eq!(world.get_own::<Defense>(e).unwrap().value, 50.0);
        assert_eq!(world.get::<Position>(e).unwrap(), Some(&Position { x: 1.0, y: 2.0 }));

        world.set(e, Defense { value: 75.0 }).unwrap();
        assert_eq!(world.get_own::<Defense>(e).unwrap().value, 75.0);
        assert_eq!(world.type_of(e).unwrap().len(), 2);
    }

    #[test]
    fn test_moving_rows_keeps_other_entities_intact() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.set(a, Defense { value: 1.0 }).unwrap();
        world.set(b, Defense { value: 2.0 }).unwrap();

        // `a` leaves the Defense table; `b` is swapped into its row.
        world.set(a, Position { x: 0.0, y: 0.0 }).unwrap();
        assert_eq!(world.get_own::<Defense>(a).unwrap().value, 1.0);
        assert_eq!(world.get_own::<Defense>(b).unwrap().value, 2.0);
        assert_eq!(world.location(b).unwrap().row, 0);
    }

    #[test]
    fn test_raw_set_checks_size_and_registration() {
        let mut world = World::new();
        let e = world.create_entity();
        let id = ComponentTypeId::of::<Defense>();

        assert_eq!(
            world.set_component(e, id, &[0; 8]),
            Err(WorldError::UnknownType(id))
        );

        world.register::<Defense>().unwrap();
        assert_eq!(
            world.set_component(e, id, &[0; 4]),
            Err(WorldError::SizeMismatch {
                component: id,
                expected: 8,
                actual: 4
            })
        );

        world.set_component(e, id, &42.0f64.to_ne_bytes()).unwrap();
        assert_eq!(world.get_own::<Defense>(e).unwrap().value, 42.0);
    }

    #[test]
    fn test_get_own_on_inherited_is_not_owned() {
        let mut world = World::new();
        let base = world.create_prefab("Base");
        world.set(base, Defense { value: 10.0 }).unwrap();
        let inst = world.create_entity();
        world.add_is_a(inst, base).unwrap();

        let id = ComponentTypeId::of::<Defense>();
        assert_eq!(
            world.get_own::<Defense>(inst),
            Err(WorldError::NotOwned {
                entity: inst,
                component: id
            })
        );
        assert_eq!(world.get::<Defense>(inst).unwrap(), Some(&Defense { value: 10.0 }));
        assert_eq!(world.owner_of(inst, id).unwrap(), Some(base));
    }

    #[test]
    fn test_remove_falls_back_to_inherited_then_absent() {
        let mut world = World::new();
        let base = world.create_prefab("Base");
        world.set(base, Defense { value: 10.0 }).unwrap();
        let inst = world.create_entity();
        world.add_is_a(inst, base).unwrap();
        world.set(inst, Defense { value: 99.0 }).unwrap();
        assert_eq!(world.get::<Defense>(inst).unwrap().unwrap().value, 99.0);

        assert!(world.remove::<Defense>(inst).unwrap());
        assert_eq!(world.get::<Defense>(inst).unwrap().unwrap().value, 10.0);
        assert!(!world.remove::<Defense>(inst).unwrap());

        world.remove::<Defense>(base).unwrap();
        assert_eq!(world.get::<Defense>(inst).unwrap(), None);
    }

    #[test]
    fn test_destroy_invalidates_handle() {
        let mut world = World::new();
        let e = world.create_entity();
        world.set(e, Defense { value: 1.0 }).unwrap();
        assert!(world.destroy(e));
        assert!(!world.destroy(e));

        let id = ComponentTypeId::of::<Defense>();
        assert_eq!(world.get_component(e, id), Err(WorldError::StaleHandle(e)));

        // The slot is reused with a new generation; the old handle stays dead.
        let reused = world.create_entity();
        assert_eq!(reused.index(), e.index());
        assert_ne!(reused, e);
        assert_eq!(world.get_component(reused, id).unwrap(), None);
        assert_eq!(world.get_component(e, id), Err(WorldError::StaleHandle(e)));
    }

    #[test]
    fn test_destroy_removes_edges_and_names() {
        let mut world = World::new();
        let base = world.create_prefab("Base");
        world.set(base, Defense { value: 5.0 }).unwrap();
        let inst = world.create_entity();
        world.add_is_a(inst, base).unwrap();

        world.destroy(base);
        assert!(world.parents(inst).unwrap().is_empty());
        assert_eq!(world.get::<Defense>(inst).unwrap(), None);
        assert_eq!(world.lookup("Base"), None);
    }

    #[test]
    fn test_destroy_fixes_swapped_location() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.set(a, Defense { value: 1.0 }).unwrap();
        world.set(b, Defense { value: 2.0 }).unwrap();

        world.destroy(a);
        assert_eq!(world.location(b).unwrap().row, 0);
        assert_eq!(world.get_own::<Defense>(b).unwrap().value, 2.0);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add_is_a(a, b).unwrap();
        assert_eq!(
            world.add_is_a(b, a),
            Err(WorldError::CycleDetected { child: b, parent: a })
        );
        assert_eq!(
            world.add_is_a(a, a),
            Err(WorldError::CycleDetected { child: a, parent: a })
        );
        assert!(world.is_a(a, b).unwrap());
        assert!(!world.is_a(b, a).unwrap());
        assert_eq!(world.ancestors(a).unwrap(), vec![b]);
    }

    #[test]
    fn test_first_parent_wins() {
        let mut world = World::new();
        let p1 = world.create_prefab("P1");
        let p2 = world.create_prefab("P2");
        world.set(p1, Defense { value: 1.0 }).unwrap();
        world.set(p2, Defense { value: 2.0 }).unwrap();

        let e = world.create_entity();
        world.add_is_a(e, p1).unwrap();
        world.add_is_a(e, p2).unwrap();
        assert_eq!(world.get::<Defense>(e).unwrap().unwrap().value, 1.0);

        let f = world.create_entity();
        world.add_is_a(f, p2).unwrap();
        world.add_is_a(f, p1).unwrap();
        assert_eq!(world.get::<Defense>(f).unwrap().unwrap().value, 2.0);

        // Dropping the first edge lets the second parent's value through.
        world.remove_is_a(e, p1).unwrap();
        assert_eq!(world.get::<Defense>(e).unwrap().unwrap().value, 2.0);
    }

    #[test]
    fn test_prefab_tag_is_not_inherited() {
        let mut world = World::new();
        let prefab = world.create_prefab("Ship");
        let inst = world.create_entity();
        world.add_is_a(inst, prefab).unwrap();

        assert!(world.is_prefab(prefab).unwrap());
        assert!(!world.is_prefab(inst).unwrap());
        assert!(!world.has(inst, world.prefab_type()).unwrap());
    }

    #[test]
    fn test_tags_are_inherited() {
        let mut world = World::new();
        let prefab = world.create_prefab("Freighter");
        world.add_tag::<HasFtl>(prefab).unwrap();
        let inst = world.create_entity();
        world.add_is_a(inst, prefab).unwrap();

        assert!(world.has_tag::<HasFtl>(inst).unwrap());
        assert!(!world.owns(inst, ComponentTypeId::of_tag::<HasFtl>()).unwrap());
    }

    #[test]
    fn test_override_copies_inherited_value() {
        let mut world = World::new();
        let base = world.create_prefab("Base");
        world.set(base, Defense { value: 30.0 }).unwrap();
        let inst = world.create_entity();
        world.add_is_a(inst, base).unwrap();

        world.auto_override::<Defense>(inst).unwrap();
        assert_eq!(world.get_own::<Defense>(inst).unwrap().value, 30.0);

        world.get_own_mut::<Defense>(inst).unwrap().value = 31.0;
        assert_eq!(world.get::<Defense>(base).unwrap().unwrap().value, 30.0);
        assert_eq!(world.get::<Defense>(inst).unwrap().unwrap().value, 31.0);
    }

    #[test]
    fn test_override_without_value_starts_zeroed() {
        let mut world = World::new();
        let prefab = world.create_prefab("Spaceship");
        world.auto_override::<Position>(prefab).unwrap();
        assert_eq!(world.get_own::<Position>(prefab).unwrap(), &Position { x: 0.0, y: 0.0 });
        assert!(world.has_override(prefab, ComponentTypeId::of::<Position>()).unwrap());
    }

    #[test]
    fn test_override_marker_gives_instances_private_copies() {
        let mut world = World::new();
        let prefab = world.create_prefab("Spaceship");
        world.set(prefab, Position { x: 3.0, y: 4.0 }).unwrap();
        world.auto_override::<Position>(prefab).unwrap();

        let a = world.create_entity();
        let b = world.create_entity();
        world.add_is_a(a, prefab).unwrap();
        world.add_is_a(b, prefab).unwrap();

        world.get_own_mut::<Position>(a).unwrap().x = 100.0;
        assert_eq!(world.get_own::<Position>(a).unwrap().x, 100.0);
        assert_eq!(world.get_own::<Position>(b).unwrap().x, 3.0);
        assert_eq!(world.get_own::<Position>(prefab).unwrap().x, 3.0);
    }

    #[test]
    fn test_override_is_not_retroactive() {
        let mut world = World::new();
        let root = world.create_prefab("Root");
        world.set(root, Defense { value: 7.0 }).unwrap();
        let mid = world.create_prefab("Mid");
        world.add_is_a(mid, root).unwrap();
        let early = world.create_entity();
        world.add_is_a(early, mid).unwrap();

        world.auto_override::<Defense>(mid).unwrap();

        let id = ComponentTypeId::of::<Defense>();
        // The early instance still shares, and sees the same value as before.
        assert!(!world.owns(early, id).unwrap());
        assert_eq!(world.get::<Defense>(early).unwrap().unwrap().value, 7.0);
        assert_eq!(world.owner_of(early, id).unwrap(), Some(mid));

        // Instances linked afterwards get a private copy.
        let late = world.create_entity();
        world.add_is_a(late, mid).unwrap();
        assert!(world.owns(late, id).unwrap());
    }

    #[test]
    fn test_remove_clears_override_marker() {
        let mut world = World::new();
        let prefab = world.create_prefab("Spaceship");
        world.auto_override::<Position>(prefab).unwrap();
        world.remove::<Position>(prefab).unwrap();

        let inst = world.create_entity();
        world.add_is_a(inst, prefab).unwrap();
        assert!(!world.has(inst, ComponentTypeId::of::<Position>()).unwrap());
    }

    #[test]
    fn test_prefab_tag_cannot_be_overridden() {
        let mut world = World::new();
        let ship = world.create_entity();
        let prefab = world.prefab_type();
        assert_eq!(
            world.override_component(ship, prefab),
            Err(WorldError::NotInheritable(prefab))
        );
        assert!(!world.is_prefab(ship).unwrap());
        assert!(!world.has_override(ship, prefab).unwrap());
    }

    #[test]
    fn test_has_override_on_stale_handle() {
        let mut world = World::new();
        let prefab = world.create_prefab("Spaceship");
        world.auto_override::<Position>(prefab).unwrap();
        world.destroy(prefab);

        let id = ComponentTypeId::of::<Position>();
        assert_eq!(
            world.has_override(prefab, id),
            Err(WorldError::StaleHandle(prefab))
        );
    }

    #[test]
    fn test_named_entities_are_unique() {
        let mut world = World::new();
        let a = world.create_named("my_ship");
        let b = world.create_named("my_ship");
        assert_eq!(a, b);
        assert_eq!(world.lookup("my_ship"), Some(a));
        assert_eq!(world.name_of(a), Some("my_ship"));

        let p = world.create_prefab("my_ship");
        assert_eq!(p, a);
        assert!(world.is_prefab(a).unwrap());
    }

    #[test]
    fn test_describe_lists_owned_types_and_parents() {
        let mut world = World::new();
        let prefab = world.create_prefab("MammothFreighter");
        world.auto_override::<Position>(prefab).unwrap();
        let inst = world.create_named("my_mammoth_freighter");
        world.add_is_a(inst, prefab).unwrap();

        assert_eq!(world.describe(inst).unwrap(), "Position, (IsA, MammothFreighter)");
    }

    #[test]
    fn test_typed_get_rejects_foreign_layout() {
        let mut world = World::new();
        world
            .register_meta(ComponentMeta::new("Defense", Layout::new::<f32>()))
            .unwrap();
        let e = world.create_entity();
        assert!(matches!(
            world.get::<Defense>(e),
            Err(WorldError::LayoutConflict { .. })
        ));
    }

    #[test]
    fn test_entities_with_same_types_share_an_archetype() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.set(a, Defense { value: 1.0 }).unwrap();
        world.set(a, Position { x: 0.0, y: 0.0 }).unwrap();
        world.set(b, Defense { value: 1.0 }).unwrap();
        // empty, {Defense}, {Defense, Position}
        assert_eq!(world.archetype_count(), 3);

        world.set(b, Position { x: 1.0, y: 1.0 }).unwrap();
        assert_eq!(world.archetype_count(), 3);
        assert_eq!(
            world.location(a).unwrap().archetype,
            world.location(b).unwrap().archetype
        );
    }
}
