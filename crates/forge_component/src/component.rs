//! Core [`Component`] and [`Tag`] traits and associated metadata.
//!
//! Every piece of data stored in the ECS must implement [`Component`]. The
//! trait requires [`bytemuck::Pod`], so any component value can be viewed as
//! plain bytes and any correctly sized byte slice is a valid value. This is
//! what lets the world store components in type-erased byte columns and accept
//! raw byte writes from host code.
//!
//! Zero-sized markers (such as the built-in [`Prefab`] tag) implement [`Tag`]
//! instead. They occupy no column bytes.
//!
//! ## Type Identity
//!
//! [`ComponentTypeId`] is derived from the component's **string name** using
//! the FNV-1a 64-bit hash algorithm, so the same name always yields the same
//! ID in every world and every process.

use std::alloc::Layout;

use bytemuck::Pod;
use serde::{Deserialize, Serialize};

/// A unique identifier for a component type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's string name.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }

    /// Compute the [`ComponentTypeId`] for a Rust tag type `T`.
    #[must_use]
    pub fn of_tag<T: Tag>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:016x}", self.0)
    }
}

/// Metadata about a component type, used for type-erased storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMeta {
    /// The unique type identifier.
    pub type_id: ComponentTypeId,
    /// The human-readable name of the component (e.g. `"Position"`).
    pub name: String,
    /// Size and alignment of one component instance.
    pub layout: Layout,
    /// Whether entities can see this component through is-a edges.
    pub inheritable: bool,
}

impl ComponentMeta {
    /// Describe a component type by name and layout.
    ///
    /// This is the entry point for host code that registers types without a
    /// Rust struct behind them.
    #[must_use]
    pub fn new(name: impl Into<String>, layout: Layout) -> Self {
        let name = name.into();
        Self {
            type_id: ComponentTypeId::from_name(&name),
            name,
            layout,
            inheritable: true,
        }
    }

    /// Describe a zero-sized tag by name.
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self::new(name, Layout::new::<()>())
    }

    /// Mark the type as visible only on entities that own it.
    #[must_use]
    pub fn not_inheritable(mut self) -> Self {
        self.inheritable = false;
        self
    }

    /// Returns `true` for zero-sized tags.
    #[must_use]
    pub fn is_tag(&self) -> bool {
        self.layout.size() == 0
    }
}

/// The core component trait.
///
/// Components are plain data: `Pod` guarantees there is no padding and no
/// invalid bit pattern, so values can be copied in and out of byte columns.
///
/// # Examples
///
/// ```rust
/// use bytemuck::{Pod, Zeroable};
/// use forge_component::Component;
///
/// #[repr(C)]
/// #[derive(Debug, Clone, Copy, Pod, Zeroable)]
/// struct ImpulseSpeed {
///     value: f64,
/// }
///
/// impl Component for ImpulseSpeed {
///     fn type_name() -> &'static str { "ImpulseSpeed" }
/// }
/// ```
pub trait Component: Pod + Send + Sync {
    /// A human-readable name for this component type.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Returns the [`ComponentMeta`] descriptor for this component type.
    fn meta() -> ComponentMeta {
        ComponentMeta {
            type_id: Self::component_type_id(),
            name: Self::type_name().to_owned(),
            layout: Layout::new::<Self>(),
            inheritable: true,
        }
    }
}

/// A zero-sized marker component.
///
/// Tags carry no data; an entity either owns them or it doesn't.
pub trait Tag: Send + Sync + 'static {
    /// A human-readable name for this tag.
    fn type_name() -> &'static str;

    /// Whether instances see this tag through is-a edges.
    fn inheritable() -> bool {
        true
    }

    /// Returns the [`ComponentTypeId`] for this tag.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Returns the [`ComponentMeta`] descriptor for this tag.
    fn meta() -> ComponentMeta {
        let meta = ComponentMeta::tag(Self::type_name());
        if Self::inheritable() {
            meta
        } else {
            meta.not_inheritable()
        }
    }
}

/// Built-in tag marking an entity as a template.
///
/// Prefabs are skipped by queries unless explicitly requested, and the tag is
/// never inherited: an instance of a prefab is a regular entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prefab;

impl Tag for Prefab {
    fn type_name() -> &'static str {
        "Prefab"
    }

    fn inheritable() -> bool {
        false
    }
}
