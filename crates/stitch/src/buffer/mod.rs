//! Growable vertex storage with an explicit capacity/active-length pair.
//!
//! Capacity only grows during the lifetime of a scene instance. Rebuilds that
//! fit in the current allocation are written in place and only move the
//! draw-range marker, so interactive chart edits do not force a GPU buffer
//! reallocation on every keystroke.

mod builder;

use std::ops::Range;

use glam::Vec3;
use tracing::debug;

use crate::constants::FLOATS_PER_VERTEX;
use crate::validation::BufferError;

pub use builder::{connector_pairs, BuildOptions, BuildStats, VertexBufferBuilder};

/// Flat position stream (`xyz` per vertex) plus draw range.
#[derive(Debug, Default)]
pub struct VertexBuffer {
    /// Allocated backing storage; its length is the capacity in floats
    storage: Box<[f32]>,
    /// Vertices in the active draw range
    active_vertices: usize,
    /// Whether the position attribute is bound at all
    attribute_present: bool,
    /// Set on every write, consumed once by the rendering surface
    changed: bool,
    /// Number of times storage was reallocated
    reallocations: u32,
}

/// Sequential writer over the active region of a [`VertexBuffer`]
pub struct VertexWriter<'a> {
    data: &'a mut [f32],
    cursor: usize,
}

impl VertexWriter<'_> {
    /// Append one vertex
    #[inline]
    pub fn push(&mut self, vertex: Vec3) {
        self.data[self.cursor..self.cursor + FLOATS_PER_VERTEX].copy_from_slice(&vertex.to_array());
        self.cursor += FLOATS_PER_VERTEX;
    }

    /// Append a segment as two vertices
    #[inline]
    pub fn push_segment(&mut self, a: Vec3, b: Vec3) {
        self.push(a);
        self.push(b);
    }

    /// Vertices written so far
    pub fn written(&self) -> usize {
        self.cursor / FLOATS_PER_VERTEX
    }
}

impl VertexBuffer {
    /// Create an empty buffer with no allocation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with room for `vertices` vertices
    pub fn with_capacity(vertices: usize) -> Result<Self, BufferError> {
        let mut buffer = Self::new();
        buffer.ensure_capacity(vertices)?;
        Ok(buffer)
    }

    /// Allocated capacity in vertices
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len() / FLOATS_PER_VERTEX
    }

    /// Vertices in the active draw range
    #[inline]
    pub fn active_vertex_count(&self) -> usize {
        self.active_vertices
    }

    /// Draw range in vertices
    pub fn draw_range(&self) -> Range<usize> {
        0..self.active_vertices
    }

    /// Number of reallocations since creation
    pub fn reallocations(&self) -> u32 {
        self.reallocations
    }

    /// Active position data, or `None` when the attribute has been cleared
    pub fn position_attribute(&self) -> Option<&[f32]> {
        if !self.attribute_present {
            return None;
        }
        Some(&self.storage[..self.active_vertices * FLOATS_PER_VERTEX])
    }

    /// Active position data as raw bytes for GPU upload
    pub fn position_bytes(&self) -> Option<&[u8]> {
        self.position_attribute()
            .map(|floats| bytemuck::cast_slice::<f32, u8>(floats))
    }

    /// Vertex `index` of the active range
    pub fn vertex(&self, index: usize) -> Option<Vec3> {
        if index >= self.active_vertices {
            return None;
        }
        let start = index * FLOATS_PER_VERTEX;
        Some(Vec3::from_slice(&self.storage[start..start + FLOATS_PER_VERTEX]))
    }

    /// Grow storage to hold at least `vertices`; never shrinks.
    ///
    /// Growth at least doubles the capacity so repeated small increases are
    /// amortized. Returns whether a reallocation happened.
    pub fn ensure_capacity(&mut self, vertices: usize) -> Result<bool, BufferError> {
        let current = self.capacity();
        if vertices <= current {
            return Ok(false);
        }

        let new_capacity = vertices.max(current.saturating_mul(2));
        let requested = new_capacity
            .checked_mul(FLOATS_PER_VERTEX)
            .ok_or(BufferError::Allocation {
                requested: usize::MAX,
            })?;

        let mut storage: Vec<f32> = Vec::new();
        storage
            .try_reserve_exact(requested)
            .map_err(|_| BufferError::Allocation { requested })?;
        storage.resize(requested, 0.0);

        self.storage = storage.into_boxed_slice();
        self.reallocations += 1;
        debug!(
            "VertexBuffer grew {} -> {} vertices (reallocation #{})",
            current, new_capacity, self.reallocations
        );
        Ok(true)
    }

    /// Write exactly `vertex_count` vertices through `fill`.
    ///
    /// A zero count clears the position attribute instead. Returns whether
    /// storage had to be reallocated.
    pub fn write_with<F>(&mut self, vertex_count: usize, fill: F) -> Result<bool, BufferError>
    where
        F: FnOnce(&mut VertexWriter<'_>),
    {
        if vertex_count == 0 {
            self.clear_attribute();
            return Ok(false);
        }

        let reallocated = self.ensure_capacity(vertex_count)?;
        let mut writer = VertexWriter {
            data: &mut self.storage[..vertex_count * FLOATS_PER_VERTEX],
            cursor: 0,
        };
        fill(&mut writer);
        debug_assert_eq!(writer.written(), vertex_count);

        self.active_vertices = vertex_count;
        self.attribute_present = true;
        self.changed = true;
        Ok(reallocated)
    }

    /// Unbind the position attribute; backing storage is kept for reuse
    pub fn clear_attribute(&mut self) {
        self.active_vertices = 0;
        self.attribute_present = false;
        self.changed = true;
    }

    /// Consume the change flag (once per frame)
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Free all storage when the owning scene is disposed
    pub fn release(&mut self) {
        self.storage = Box::default();
        self.active_vertices = 0;
        self.attribute_present = false;
        self.changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_n(buffer: &mut VertexBuffer, n: usize) -> bool {
        buffer
            .write_with(n, |w| {
                for i in 0..n {
                    w.push(Vec3::splat(i as f32));
                }
            })
            .unwrap()
    }

    #[test]
    fn test_growth_then_reuse() {
        let mut buffer = VertexBuffer::new();
        assert!(fill_n(&mut buffer, 10));
        assert_eq!(buffer.capacity(), 10);

        assert!(!fill_n(&mut buffer, 4));
        assert_eq!(buffer.capacity(), 10);
        assert_eq!(buffer.active_vertex_count(), 4);
        assert_eq!(buffer.position_attribute().unwrap().len(), 12);
        assert_eq!(buffer.reallocations(), 1);
    }

    #[test]
    fn test_growth_doubles() {
        let mut buffer = VertexBuffer::new();
        fill_n(&mut buffer, 10);
        fill_n(&mut buffer, 11);
        assert_eq!(buffer.capacity(), 20);
        assert_eq!(buffer.reallocations(), 2);
    }

    #[test]
    fn test_empty_clears_attribute_but_keeps_storage() {
        let mut buffer = VertexBuffer::new();
        fill_n(&mut buffer, 6);
        buffer.take_changed();

        fill_n(&mut buffer, 0);
        assert!(buffer.position_attribute().is_none());
        assert_eq!(buffer.draw_range(), 0..0);
        assert_eq!(buffer.capacity(), 6);
        assert!(buffer.take_changed());
    }

    #[test]
    fn test_change_flag_consumed_once() {
        let mut buffer = VertexBuffer::new();
        fill_n(&mut buffer, 2);
        assert!(buffer.take_changed());
        assert!(!buffer.take_changed());
    }

    #[test]
    fn test_vertex_access_and_bytes() {
        let mut buffer = VertexBuffer::new();
        fill_n(&mut buffer, 3);
        assert_eq!(buffer.vertex(2), Some(Vec3::splat(2.0)));
        assert_eq!(buffer.vertex(3), None);
        assert_eq!(buffer.position_bytes().unwrap().len(), 3 * 3 * 4);
    }

    #[test]
    fn test_release() {
        let mut buffer = VertexBuffer::with_capacity(8).unwrap();
        buffer.release();
        assert_eq!(buffer.capacity(), 0);
        assert!(buffer.position_attribute().is_none());
    }
}
