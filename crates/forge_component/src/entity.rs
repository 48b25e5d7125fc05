//! Entity type and allocation utilities.
//!
//! An [`Entity`] is a generational handle: a slot index plus the generation
//! the slot had when the handle was issued. Destroying an entity bumps its
//! slot's generation, so every handle issued before the destroy becomes stale
//! and fails lookups instead of silently reading whatever reuses the slot.

use serde::{Deserialize, Serialize};

/// A generational entity identifier.
///
/// Entities are pure identifiers; they carry no data of their own.
/// Components are attached to entities to give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Build an entity handle from its raw parts.
    #[must_use]
    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation the slot had when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Packs the handle into a single `u64` (generation in the high bits).
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Inverse of [`Entity::to_bits`].
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

/// Allocates generational entity handles, recycling destroyed slots.
///
/// Freed slots are reused last-in first-out. A slot's generation is bumped
/// when it is freed, so a recycled slot never hands out a handle equal to one
/// issued before.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    live_count: usize,
}

impl EntityAllocator {
    /// Creates a new, empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator with room for `capacity` slots before growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            free: Vec::new(),
            live_count: 0,
        }
    }

    /// Allocates a handle, reusing a freed slot when one is available.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` slots are ever needed.
    pub fn allocate(&mut self) -> Entity {
        self.live_count += 1;
        if let Some(index) = self.free.pop() {
            self.alive[index as usize] = true;
            return Entity::from_raw_parts(index, self.generations[index as usize]);
        }

        let index = u32::try_from(self.generations.len()).expect("entity index space exhausted");
        self.generations.push(0);
        self.alive.push(true);
        Entity::from_raw_parts(index, 0)
    }

    /// Frees the slot behind `entity`.
    ///
    /// Returns `false` (and does nothing) if the handle is already stale.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let index = entity.index() as usize;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.alive[index] = false;
        self.free.push(entity.index());
        self.live_count -= 1;
        true
    }

    /// Returns `true` if `entity` refers to a live slot at its current
    /// generation.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        let index = entity.index() as usize;
        self.alive.get(index).copied().unwrap_or(false) && self.generations[index] == entity.generation()
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// Returns the number of slots ever allocated (live or free).
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.generations.len()
    }
}
