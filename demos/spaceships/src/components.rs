//! Components of the spaceship fleet.

use bytemuck::{Pod, Zeroable};
use forge_component::{Component, Tag};
use glam::DVec2;

/// Attack rating.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Attack {
    pub value: f64,
}

impl Component for Attack {
    fn type_name() -> &'static str {
        "Attack"
    }
}

/// Defense rating.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Defense {
    pub value: f64,
}

impl Component for Defense {
    fn type_name() -> &'static str {
        "Defense"
    }
}

/// Cargo capacity.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FreightCapacity {
    pub value: f64,
}

impl Component for FreightCapacity {
    fn type_name() -> &'static str {
        "FreightCapacity"
    }
}

/// Sub-light speed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ImpulseSpeed {
    pub value: f64,
}

impl Component for ImpulseSpeed {
    fn type_name() -> &'static str {
        "ImpulseSpeed"
    }
}

/// Ship position in the plane.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Position(pub DVec2);

impl Component for Position {
    fn type_name() -> &'static str {
        "Position"
    }
}

/// Marks ships with a faster-than-light drive.
#[derive(Debug, Clone, Copy)]
pub struct HasFtl;

impl Tag for HasFtl {
    fn type_name() -> &'static str {
        "HasFTL"
    }
}
