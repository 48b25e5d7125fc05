//! Iteration over entities matching a [`QueryDescriptor`].
//!
//! A traversal walks archetype tables in creation order and rows in row
//! order, so each live entity is considered exactly once. An entity matches
//! when every term resolves for it, either from its own row or through its
//! is-a ancestors, and every filter holds. Tables holding the [`Prefab`] tag
//! are skipped unless the query asks for prefabs.
//!
//! [`World::query`] is lazy and read-only. [`World::each_mut`] collects the
//! matches first and then hands out rows that can write owned components;
//! the world stays mutably borrowed for the whole pass, so no entity can be
//! created, destroyed, or moved between archetypes while rows are live.
//!
//! [`Prefab`]: forge_component::Prefab

use forge_component::{Component, ComponentTypeId, Entity, QueryDescriptor, QueryFilter};

use crate::error::{WorldError, WorldResult};
use crate::world::World;

/// One resolved component of a [`QueryRow`].
#[derive(Debug, Clone, Copy)]
pub struct Field<'w> {
    /// The component type.
    pub type_id: ComponentTypeId,
    /// The entity the value belongs to: the row's entity when owned, an
    /// ancestor when inherited.
    pub owner: Entity,
    /// The value's bytes.
    pub bytes: &'w [u8],
}

/// A matched entity and its resolved terms, in term order.
#[derive(Debug, Clone)]
pub struct QueryRow<'w> {
    entity: Entity,
    fields: Vec<Field<'w>>,
}

impl<'w> QueryRow<'w> {
    /// The matched entity.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The resolved terms, in the order the query listed them.
    #[must_use]
    pub fn fields(&self) -> &[Field<'w>] {
        &self.fields
    }

    fn field(&self, type_id: ComponentTypeId) -> Option<&Field<'w>> {
        self.fields.iter().find(|f| f.type_id == type_id)
    }

    /// Typed view of the term `T`, owned or inherited.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&'w T> {
        let bytes = self.field(T::component_type_id())?.bytes;
        bytemuck::try_from_bytes(bytes).ok()
    }

    /// Bytes of the term `type_id`.
    #[must_use]
    pub fn raw(&self, type_id: ComponentTypeId) -> Option<&'w [u8]> {
        self.field(type_id).map(|f| f.bytes)
    }

    /// The entity supplying the term `type_id`.
    #[must_use]
    pub fn owner(&self, type_id: ComponentTypeId) -> Option<Entity> {
        self.field(type_id).map(|f| f.owner)
    }

    /// Returns `true` if the row's entity owns the term `type_id`.
    #[must_use]
    pub fn is_owned(&self, type_id: ComponentTypeId) -> bool {
        self.owner(type_id) == Some(self.entity)
    }
}

/// Lazy traversal produced by [`World::query`] and [`World::each`].
#[derive(Debug)]
pub struct QueryIter<'w> {
    world: &'w World,
    terms: Vec<ComponentTypeId>,
    filters: Vec<QueryFilter>,
    include_prefabs: bool,
    archetype: usize,
    row: usize,
}

impl<'w> QueryIter<'w> {
    fn match_entity(&self, entity: Entity) -> Option<Vec<Field<'w>>> {
        let world = self.world;
        for filter in &self.filters {
            let present = world.owner_unchecked(entity, filter.type_id()).is_some();
            match filter {
                QueryFilter::With(_) if !present => return None,
                QueryFilter::Without(_) if present => return None,
                _ => {}
            }
        }

        let mut fields = Vec::with_capacity(self.terms.len());
        for &type_id in &self.terms {
            let owner = world.owner_unchecked(entity, type_id)?;
            let bytes = world.own_bytes_unchecked(owner, type_id)?;
            fields.push(Field {
                type_id,
                owner,
                bytes,
            });
        }
        Some(fields)
    }
}

impl<'w> Iterator for QueryIter<'w> {
    type Item = QueryRow<'w>;

    fn next(&mut self) -> Option<Self::Item> {
        let world = self.world;
        while let Some(table) = world.archetypes.get(self.archetype) {
            let skip_table = !self.include_prefabs && table.has_component(world.prefab);
            if skip_table || self.row >= table.len() {
                self.archetype += 1;
                self.row = 0;
                continue;
            }

            let entity = table.entities[self.row];
            self.row += 1;

            // Entities without parents can only match through their own table.
            if !table.has_all(&self.terms) && !world.inheritance.has_parents(entity) {
                continue;
            }
            if let Some(fields) = self.match_entity(entity) {
                return Some(QueryRow { entity, fields });
            }
        }
        None
    }
}

/// A matched entity inside [`World::each_mut`].
///
/// Any resolved component can be read; only components the entity owns can
/// be written.
#[derive(Debug)]
pub struct QueryRowMut<'a> {
    world: &'a mut World,
    entity: Entity,
    owners: Vec<(ComponentTypeId, Entity)>,
}

impl QueryRowMut<'_> {
    /// The matched entity.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The entity's name, if it has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.world.name_of(self.entity)
    }

    /// The entity supplying the term `type_id`.
    #[must_use]
    pub fn owner(&self, type_id: ComponentTypeId) -> Option<Entity> {
        self.owners
            .iter()
            .find(|(id, _)| *id == type_id)
            .map(|(_, owner)| *owner)
    }

    /// Returns `true` if the entity owns the term `type_id`.
    #[must_use]
    pub fn is_owned(&self, type_id: ComponentTypeId) -> bool {
        self.owner(type_id) == Some(self.entity)
    }

    /// Typed view of `T`, owned or inherited.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&T> {
        let type_id = T::component_type_id();
        let owner = self.world.owner_unchecked(self.entity, type_id)?;
        let bytes = self.world.own_bytes_unchecked(owner, type_id)?;
        bytemuck::try_from_bytes(bytes).ok()
    }

    /// Mutable bytes of a component the entity owns.
    pub fn raw_mut(&mut self, type_id: ComponentTypeId) -> WorldResult<&mut [u8]> {
        let entity = self.entity;
        self.world
            .own_bytes_mut_unchecked(entity, type_id)
            .ok_or(WorldError::NotOwned {
                entity,
                component: type_id,
            })
    }

    /// Mutable typed view of a component the entity owns; inherited values
    /// fail with [`WorldError::NotOwned`].
    pub fn get_mut<T: Component>(&mut self) -> WorldResult<&mut T> {
        let type_id = T::component_type_id();
        let bytes = self.raw_mut(type_id)?;
        let actual = bytes.len();
        bytemuck::try_from_bytes_mut(bytes).map_err(|_| WorldError::SizeMismatch {
            component: type_id,
            expected: std::mem::size_of::<T>(),
            actual,
        })
    }
}

impl World {
    /// Start a lazy traversal of the entities matching `descriptor`.
    ///
    /// Every call builds a fresh, independent traversal. Fails with
    /// [`WorldError::UnknownType`] if the descriptor names an unregistered
    /// component.
    pub fn query(&self, descriptor: &QueryDescriptor) -> WorldResult<QueryIter<'_>> {
        self.registry
            .ensure_known(&descriptor.all_accessed_types())?;
        Ok(QueryIter {
            world: self,
            terms: descriptor.terms.clone(),
            filters: descriptor.filters.clone(),
            include_prefabs: descriptor.include_prefabs || descriptor.requires(self.prefab),
            archetype: 0,
            row: 0,
        })
    }

    /// Traverse the non-prefab entities that have every type in `types`.
    pub fn each(&self, types: &[ComponentTypeId]) -> WorldResult<QueryIter<'_>> {
        self.query(&QueryDescriptor::from_terms(types))
    }

    /// Visit every entity matching `descriptor` with write access to its
    /// owned components. Returns the number of rows visited.
    pub fn each_mut(
        &mut self,
        descriptor: &QueryDescriptor,
        mut f: impl FnMut(QueryRowMut<'_>),
    ) -> WorldResult<usize> {
        let matches: Vec<(Entity, Vec<(ComponentTypeId, Entity)>)> = self
            .query(descriptor)?
            .map(|row| {
                let owners = row.fields.iter().map(|f| (f.type_id, f.owner)).collect();
                (row.entity, owners)
            })
            .collect();

        let visited = matches.len();
        for (entity, owners) in matches {
            f(QueryRowMut {
                world: &mut *self,
                entity,
                owners,
            });
        }
        Ok(visited)
    }
}
