//! # forge_world
//!
//! An entity-component-system world with prefab inheritance.
//!
//! Entities own components stored in archetype tables. An entity can also be
//! linked to one or more parents with is-a edges; any component it does not
//! own is then looked up through its ancestors, first parent first. Prefabs
//! are ordinary entities carrying the built-in `Prefab` tag, which keeps them
//! out of queries and is never inherited.
//!
//! ```rust
//! use bytemuck::{Pod, Zeroable};
//! use forge_component::{Component, QueryDescriptor};
//! use forge_world::World;
//!
//! #[repr(C)]
//! #[derive(Debug, Clone, Copy, Pod, Zeroable)]
//! struct ImpulseSpeed {
//!     value: f64,
//! }
//!
//! impl Component for ImpulseSpeed {
//!     fn type_name() -> &'static str { "ImpulseSpeed" }
//! }
//!
//! let mut world = World::new();
//! let spaceship = world.create_prefab("Spaceship");
//! world.set(spaceship, ImpulseSpeed { value: 50.0 })?;
//!
//! let ship = world.create_entity();
//! world.add_is_a(ship, spaceship)?;
//! assert_eq!(world.get::<ImpulseSpeed>(ship)?.map(|s| s.value), Some(50.0));
//!
//! let speeds = QueryDescriptor::new().term(ImpulseSpeed::component_type_id());
//! assert_eq!(world.query(&speeds)?.count(), 1);
//! # Ok::<(), forge_world::WorldError>(())
//! ```

pub mod config;
pub mod error;
pub mod inheritance;
pub mod iter;
pub mod registry;
pub mod world;

pub use config::WorldConfig;
pub use error::{WorldError, WorldResult};
pub use inheritance::InheritanceGraph;
pub use iter::{Field, QueryIter, QueryRow, QueryRowMut};
pub use registry::ComponentRegistry;
pub use world::{EntityLocation, World};
