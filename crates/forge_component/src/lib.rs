//! # forge_component
//!
//! The data primitives of the forge ECS: what a component is, how entities
//! are identified, and how owned component values are laid out in memory.
//!
//! This crate provides:
//!
//! - [`Component`] and [`Tag`] traits: plain-data components and zero-sized
//!   markers, including the built-in [`Prefab`] tag.
//! - [`Entity`]: generational handles that go stale on destroy.
//! - [`EntityAllocator`]: slot allocator with generation bumping.
//! - [`ArchetypeTable`]: SoA byte storage grouped by owned component set.
//! - [`QueryDescriptor`]: declarative iteration requirements.
//!
//! World state (registry, inheritance, iteration) lives in `forge_world`.

pub mod archetype;
pub mod component;
pub mod entity;
pub mod query;

pub use archetype::{ArchetypeId, ArchetypeTable, Column, MAX_COMPONENT_ALIGN};
pub use component::{Component, ComponentMeta, ComponentTypeId, Prefab, Tag};
pub use entity::{Entity, EntityAllocator};
pub use query::{QueryDescriptor, QueryFilter};
