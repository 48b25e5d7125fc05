//! Archetype definitions and storage.
//!
//! An archetype is a unique combination of owned component types. Entities
//! sharing the same set of components are grouped into the same table, one
//! byte [`Column`] per component type, row-aligned across columns.
//!
//! Inherited components never appear here: a table only describes what its
//! entities own.

use std::alloc::Layout;
use std::collections::BTreeSet;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::component::ComponentTypeId;
use crate::entity::Entity;

/// Largest component alignment a [`Column`] can honour.
pub const MAX_COMPONENT_ALIGN: usize = 16;

/// Index of an archetype table inside its world, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArchetypeId(pub u32);

impl ArchetypeId {
    /// The archetype with no components. Every world creates it first.
    pub const EMPTY: ArchetypeId = ArchetypeId(0);

    /// Returns the id as a `usize` index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Backing unit for column bytes. Its alignment bounds the alignment of every
/// value stored in a column.
#[derive(Clone, Copy)]
#[repr(C, align(16))]
struct Block([u8; MAX_COMPONENT_ALIGN]);

// SAFETY: `Block` is a `repr(C)` wrapper around a byte array whose size equals
// its alignment, so it has no padding and every bit pattern is valid.
unsafe impl Zeroable for Block {}
// SAFETY: see above; `Block` is `Copy + 'static`.
unsafe impl Pod for Block {}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Block")
    }
}

/// A column in an archetype table, storing components of a single type.
///
/// Components are stored as raw bytes for type-erased access. Each element is
/// `layout.size()` bytes, laid out contiguously from a 16-byte aligned base.
/// Because a type's size is always a multiple of its alignment, every row is
/// correctly aligned for types with alignment up to
/// [`MAX_COMPONENT_ALIGN`].
#[derive(Debug, Clone)]
pub struct Column {
    /// The component type stored in this column.
    pub type_id: ComponentTypeId,
    layout: Layout,
    blocks: Vec<Block>,
    len: usize,
}

impl Column {
    /// Create a new empty column for the given component type.
    ///
    /// # Panics
    ///
    /// Panics if `layout.align()` exceeds [`MAX_COMPONENT_ALIGN`]; the
    /// registry rejects such types before a column is ever built.
    #[must_use]
    pub fn new(type_id: ComponentTypeId, layout: Layout) -> Self {
        assert!(
            layout.align() <= MAX_COMPONENT_ALIGN,
            "component alignment {} exceeds column limit {MAX_COMPONENT_ALIGN}",
            layout.align()
        );
        Self {
            type_id,
            layout,
            blocks: Vec::new(),
            len: 0,
        }
    }

    /// Size of a single component instance in bytes.
    #[must_use]
    pub fn item_size(&self) -> usize {
        self.layout.size()
    }

    /// Returns the stored layout.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the number of component instances stored.
    ///
    /// Zero-sized tag columns still count their rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if this column contains no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<Block, u8>(&self.blocks)[..self.len * self.item_size()]
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        let end = self.len * self.item_size();
        &mut bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[..end]
    }

    fn reserve_rows(&mut self, rows: usize) {
        let needed = (rows * self.item_size()).div_ceil(MAX_COMPONENT_ALIGN);
        if self.blocks.len() < needed {
            let grown = needed.max(self.blocks.len() * 2);
            self.blocks.resize(grown, Block::zeroed());
        }
    }

    /// Push a component's raw bytes into the column.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len()` differs from the column's item size.
    pub fn push_raw(&mut self, bytes: &[u8]) {
        assert_eq!(
            bytes.len(),
            self.item_size(),
            "byte slice size mismatch: expected {}, got {}",
            self.item_size(),
            bytes.len()
        );
        self.reserve_rows(self.len + 1);
        self.len += 1;
        let size = self.item_size();
        let start = (self.len - 1) * size;
        self.bytes_mut()[start..start + size].copy_from_slice(bytes);
    }

    /// Push an all-zero value; the caller is expected to overwrite it.
    pub fn push_zeroed(&mut self) {
        self.reserve_rows(self.len + 1);
        self.len += 1;
        let size = self.item_size();
        let start = (self.len - 1) * size;
        self.bytes_mut()[start..start + size].fill(0);
    }

    /// Get a reference to the raw bytes of the component at `index`.
    #[must_use]
    pub fn get_raw(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len {
            return None;
        }
        let start = index * self.item_size();
        Some(&self.bytes()[start..start + self.item_size()])
    }

    /// Get a mutable reference to the raw bytes of the component at `index`.
    #[must_use]
    pub fn get_raw_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.len {
            return None;
        }
        let size = self.item_size();
        let start = index * size;
        Some(&mut self.bytes_mut()[start..start + size])
    }

    /// Get a typed reference to the component at `index`.
    ///
    /// Returns `None` if the row is out of bounds or `T` does not have the
    /// column's layout.
    #[must_use]
    pub fn get<T: Pod>(&self, index: usize) -> Option<&T> {
        if Layout::new::<T>() != self.layout {
            return None;
        }
        self.get_raw(index).map(bytemuck::from_bytes)
    }

    /// Get a typed mutable reference to the component at `index`.
    #[must_use]
    pub fn get_mut<T: Pod>(&mut self, index: usize) -> Option<&mut T> {
        if Layout::new::<T>() != self.layout {
            return None;
        }
        self.get_raw_mut(index).map(bytemuck::from_bytes_mut)
    }

    /// Remove the value at `index` by moving the last value into its place.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn swap_remove(&mut self, index: usize) {
        assert!(index < self.len, "row {index} out of bounds ({})", self.len);
        let size = self.item_size();
        let last = self.len - 1;
        if index != last {
            self.bytes_mut()
                .copy_within(last * size..(last + 1) * size, index * size);
        }
        self.len = last;
    }
}

/// A table of entities sharing the same archetype (set of owned component
/// types).
///
/// Data is stored in struct-of-arrays (SoA) layout: one [`Column`] per
/// component type, with entity IDs stored in a parallel vector.
#[derive(Debug, Clone)]
pub struct ArchetypeTable {
    /// The archetype identifier.
    pub id: ArchetypeId,
    /// Sorted set of component type IDs that define this archetype.
    pub component_types: BTreeSet<ComponentTypeId>,
    /// Entity IDs in row order. `entities[i]` corresponds to row `i`
    /// in every column.
    pub entities: Vec<Entity>,
    /// One column per component type, in the same order as `component_types`.
    pub columns: Vec<Column>,
}

impl ArchetypeTable {
    /// Create a new, empty archetype table from `(type, layout)` pairs.
    #[must_use]
    pub fn new(id: ArchetypeId, layouts: impl IntoIterator<Item = (ComponentTypeId, Layout)>) -> Self {
        let mut layouts: Vec<_> = layouts.into_iter().collect();
        layouts.sort_by_key(|(type_id, _)| *type_id);
        layouts.dedup_by_key(|(type_id, _)| *type_id);

        let component_types = layouts.iter().map(|(type_id, _)| *type_id).collect();
        let columns = layouts
            .into_iter()
            .map(|(type_id, layout)| Column::new(type_id, layout))
            .collect();

        Self {
            id,
            component_types,
            entities: Vec::new(),
            columns,
        }
    }

    /// Returns the number of entities in this archetype table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if this table has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns `true` if this archetype contains the given component type.
    #[must_use]
    pub fn has_component(&self, type_id: ComponentTypeId) -> bool {
        self.component_types.contains(&type_id)
    }

    /// Returns `true` if this archetype owns every type in `types`.
    #[must_use]
    pub fn has_all(&self, types: &[ComponentTypeId]) -> bool {
        types.iter().all(|ty| self.has_component(*ty))
    }

    /// Returns the column index for the given component type, if present.
    #[must_use]
    pub fn column_index(&self, type_id: ComponentTypeId) -> Option<usize> {
        self.columns
            .binary_search_by_key(&type_id, |col| col.type_id)
            .ok()
    }

    /// Returns the column for the given component type, if present.
    #[must_use]
    pub fn column(&self, type_id: ComponentTypeId) -> Option<&Column> {
        self.column_index(type_id).map(|idx| &self.columns[idx])
    }

    /// Returns the mutable column for the given component type, if present.
    #[must_use]
    pub fn column_mut(&mut self, type_id: ComponentTypeId) -> Option<&mut Column> {
        self.column_index(type_id).map(|idx| &mut self.columns[idx])
    }

    /// Append `entity` with zeroed values in every column and return its row.
    pub fn push_zeroed(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        for col in &mut self.columns {
            col.push_zeroed();
        }
        self.entities.len() - 1
    }

    /// Remove `row`, filling the hole with the last row.
    ///
    /// Returns the entity that was moved into `row`, if any, so the caller
    /// can update its location.
    pub fn swap_remove(&mut self, row: usize) -> Option<Entity> {
        self.entities.swap_remove(row);
        for col in &mut self.columns {
            col.swap_remove(row);
        }
        self.entities.get(row).copied()
    }

    /// Move `row` of this table into `dst`.
    ///
    /// Values of types present in both tables are copied; columns only `dst`
    /// has are zero-filled for the caller to overwrite. Values of types only
    /// this table has are dropped. Returns the entity's row in `dst` and the
    /// entity (if any) that was swapped into `row` here.
    pub fn move_row(&mut self, row: usize, dst: &mut ArchetypeTable) -> (usize, Option<Entity>) {
        let entity = self.entities[row];
        dst.entities.push(entity);
        for dst_col in &mut dst.columns {
            match self
                .column(dst_col.type_id)
                .and_then(|col| col.get_raw(row))
            {
                Some(bytes) => dst_col.push_raw(bytes),
                None => dst_col.push_zeroed(),
            }
        }
        let dst_row = dst.entities.len() - 1;
        let swapped = self.swap_remove(row);
        (dst_row, swapped)
    }
}
