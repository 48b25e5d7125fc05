//! World-level error types.

use forge_component::{ComponentTypeId, Entity};

/// Errors returned by [`World`](crate::World) operations.
///
/// A component that is simply not present anywhere in an entity's
/// inheritance chain is not an error; lookups report it as `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A component type was used before it was registered.
    #[error("unknown component type {0}")]
    UnknownType(ComponentTypeId),

    /// The handle refers to a destroyed entity (or an older generation of its
    /// slot).
    #[error("stale entity handle {0}")]
    StaleHandle(Entity),

    /// Adding the is-a edge would make the inheritance graph cyclic.
    #[error("{child} is-a {parent} would create an inheritance cycle")]
    CycleDetected {
        /// The would-be child.
        child: Entity,
        /// The would-be parent.
        parent: Entity,
    },

    /// An own-only accessor was used on a component the entity does not own.
    #[error("{entity} does not own component {component}")]
    NotOwned {
        /// The entity that was queried.
        entity: Entity,
        /// The component that is inherited or absent.
        component: ComponentTypeId,
    },

    /// The component is never inherited, so it cannot be overridden.
    #[error("component {0} is not inheritable and cannot be overridden")]
    NotInheritable(ComponentTypeId),

    /// A raw component value did not match the registered size.
    #[error("component {component} expects {expected} bytes, got {actual}")]
    SizeMismatch {
        /// The component being written.
        component: ComponentTypeId,
        /// Registered size.
        expected: usize,
        /// Size of the supplied value.
        actual: usize,
    },

    /// The same type id was registered twice with different layouts.
    #[error("component '{name}' ({component}) is already registered with a different layout")]
    LayoutConflict {
        /// The conflicting type.
        component: ComponentTypeId,
        /// Name given on the rejected registration.
        name: String,
    },

    /// The component's alignment exceeds what column storage supports.
    #[error("component '{name}' needs alignment {align}, the maximum is {max}")]
    UnsupportedAlignment {
        /// Name of the rejected type.
        name: String,
        /// Requested alignment.
        align: usize,
        /// Largest supported alignment.
        max: usize,
    },
}

/// Convenience alias for results of world operations.
pub type WorldResult<T> = Result<T, WorldError>;
