//! Vertex stream generation from stitch placements.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use loopwork_config::{Fidelity, Topology, VertexMode};
use tracing::debug;

use super::VertexBuffer;
use crate::geometry::GeometryCache;
use crate::types::{StitchPlacement, StitchType};
use crate::validation::BufferError;

/// Settings that shape the generated stream but not the layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    pub fidelity: Fidelity,
    pub height_scale: f32,
    pub mode: VertexMode,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            fidelity: Fidelity::Standard,
            height_scale: 1.0,
            mode: VertexMode::Lines,
        }
    }
}

/// Result of one build pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Vertices tracing stitch outlines (or tube triangles)
    pub outline_vertices: usize,
    /// Vertices in row and column connector segments
    pub connector_vertices: usize,
    /// Active vertex count after the build
    pub total_vertices: usize,
    /// Capacity after the build
    pub capacity: usize,
    /// Whether the build had to reallocate storage
    pub reallocated: bool,
}

/// Owns the vertex buffer and regenerates it from placements.
#[derive(Debug, Default)]
pub struct VertexBufferBuilder {
    buffer: VertexBuffer,
    last_stats: BuildStats,
}

impl VertexBufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &VertexBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut VertexBuffer {
        &mut self.buffer
    }

    pub fn last_stats(&self) -> BuildStats {
        self.last_stats
    }

    /// Regenerate the vertex stream.
    ///
    /// The exact vertex count is computed before writing so the buffer can
    /// decide between in-place reuse and growth. Connectors are emitted in
    /// lines mode only.
    pub fn build(
        &mut self,
        placements: &[StitchPlacement],
        topology: Topology,
        connectors_enabled: bool,
        geometry: &mut GeometryCache,
        options: BuildOptions,
    ) -> Result<BuildStats, BufferError> {
        let stats = match options.mode {
            VertexMode::Lines => {
                self.build_lines(placements, topology, connectors_enabled, geometry, options)?
            }
            VertexMode::Triangles => self.build_triangles(placements, geometry, options)?,
        };

        debug!(
            "Vertex build: {} outline + {} connector vertices, capacity {}{}",
            stats.outline_vertices,
            stats.connector_vertices,
            stats.capacity,
            if stats.reallocated { " (reallocated)" } else { "" }
        );

        self.last_stats = stats;
        Ok(stats)
    }

    fn build_lines(
        &mut self,
        placements: &[StitchPlacement],
        topology: Topology,
        connectors_enabled: bool,
        geometry: &mut GeometryCache,
        options: BuildOptions,
    ) -> Result<BuildStats, BufferError> {
        let curves = resolve(placements, |stitch| geometry.curve(stitch, options.fidelity));
        let connectors = if connectors_enabled {
            connector_pairs(placements, topology)
        } else {
            Vec::new()
        };

        let outline_vertices: usize = placements
            .iter()
            .map(|p| curves[&p.stitch].line_vertex_count())
            .sum();
        let connector_vertices = connectors.len() * 2;
        let total = outline_vertices + connector_vertices;

        let reallocated = self.buffer.write_with(total, |writer| {
            for placement in placements {
                let transform = placement.transform(options.height_scale);
                for (a, b) in curves[&placement.stitch].segments() {
                    writer.push_segment(
                        transform.transform_point3(a),
                        transform.transform_point3(b),
                    );
                }
            }
            for &(from, to) in &connectors {
                writer.push_segment(placements[from].position, placements[to].position);
            }
        })?;

        Ok(BuildStats {
            outline_vertices,
            connector_vertices,
            total_vertices: total,
            capacity: self.buffer.capacity(),
            reallocated,
        })
    }

    fn build_triangles(
        &mut self,
        placements: &[StitchPlacement],
        geometry: &mut GeometryCache,
        options: BuildOptions,
    ) -> Result<BuildStats, BufferError> {
        let meshes = resolve(placements, |stitch| geometry.tube_mesh(stitch, options.fidelity));
        let total: usize = placements
            .iter()
            .map(|p| meshes[&p.stitch].indices.len())
            .sum();

        let reallocated = self.buffer.write_with(total, |writer| {
            for placement in placements {
                let transform = placement.transform(options.height_scale);
                for corner in meshes[&placement.stitch].triangle_positions() {
                    writer.push(transform.transform_point3(corner));
                }
            }
        })?;

        Ok(BuildStats {
            outline_vertices: total,
            connector_vertices: 0,
            total_vertices: total,
            capacity: self.buffer.capacity(),
            reallocated,
        })
    }

    /// Free the buffer storage
    pub fn release(&mut self) {
        self.buffer.release();
        self.last_stats = BuildStats::default();
    }
}

/// Look up shared geometry once per distinct stitch type
fn resolve<T>(
    placements: &[StitchPlacement],
    mut fetch: impl FnMut(StitchType) -> Arc<T>,
) -> HashMap<StitchType, Arc<T>> {
    let mut resolved = HashMap::new();
    for placement in placements {
        resolved
            .entry(placement.stitch)
            .or_insert_with(|| fetch(placement.stitch));
    }
    resolved
}

/// Index pairs linking the fabric's structural lattice.
///
/// Each placement links to its successor in the same row (radial rings of
/// three or more also close last to first) and to the proportionally
/// corresponding placement of the previous row. Rows are taken in ascending
/// order with placement order kept inside each row.
pub fn connector_pairs(placements: &[StitchPlacement], topology: Topology) -> Vec<(usize, usize)> {
    let mut rows: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (index, placement) in placements.iter().enumerate() {
        rows.entry(placement.row).or_default().push(index);
    }

    let mut pairs = Vec::new();
    let mut previous: Option<&Vec<usize>> = None;
    for members in rows.values() {
        for window in members.windows(2) {
            pairs.push((window[0], window[1]));
        }
        if topology == Topology::Radial && members.len() >= 3 {
            pairs.push((members[members.len() - 1], members[0]));
        }

        if let Some(below) = previous {
            let n = members.len();
            let m = below.len();
            for (k, &index) in members.iter().enumerate() {
                let j = ((2 * k + 1) * m / (2 * n)).min(m - 1);
                pairs.push((index, below[j]));
            }
        }
        previous = Some(members);
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;
    use crate::types::Chart;
    use loopwork_config::LayoutParams;

    fn ring_chart(rows: &[usize]) -> Chart {
        let rows: Vec<Vec<StitchType>> = rows
            .iter()
            .map(|&n| vec![StitchType::Single; n])
            .collect();
        Chart::from_rows(&rows)
    }

    fn placements_for(chart: &Chart, topology: Topology) -> Vec<StitchPlacement> {
        layout(chart, topology, &LayoutParams::default()).unwrap()
    }

    #[test]
    fn test_outline_vertex_count() {
        let placements = placements_for(&ring_chart(&[6]), Topology::Radial);
        let mut geometry = GeometryCache::new();
        let mut builder = VertexBufferBuilder::new();
        let stats = builder
            .build(&placements, Topology::Radial, false, &mut geometry, BuildOptions::default())
            .unwrap();

        let per_stitch = geometry.curve(StitchType::Single, Fidelity::Standard).line_vertex_count();
        assert_eq!(stats.outline_vertices, per_stitch * 6);
        assert_eq!(stats.connector_vertices, 0);
        assert_eq!(builder.buffer().active_vertex_count(), stats.total_vertices);
    }

    #[test]
    fn test_connectors_ring_and_rows() {
        let placements = placements_for(&ring_chart(&[4, 8]), Topology::Radial);
        let pairs = connector_pairs(&placements, Topology::Radial);
        // Two closed rings (4 + 8) plus one link down per outer stitch
        assert_eq!(pairs.len(), 4 + 8 + 8);
        // Outer stitches 0 and 1 share inner stitch 0
        assert!(pairs.contains(&(4, 0)));
        assert!(pairs.contains(&(5, 0)));
        assert!(pairs.contains(&(11, 3)));
    }

    #[test]
    fn test_rectilinear_rows_do_not_close() {
        let chart = Chart::from_rows(&[vec![StitchType::Knit; 3], vec![StitchType::Knit; 3]]);
        let placements = placements_for(&chart, Topology::Rectilinear);
        let pairs = connector_pairs(&placements, Topology::Rectilinear);
        assert_eq!(pairs.len(), 2 + 2 + 3);
        assert!(pairs.contains(&(3, 0)));
        assert!(pairs.contains(&(5, 2)));
    }

    #[test]
    fn test_non_increasing_rebuilds_keep_capacity() {
        let mut geometry = GeometryCache::new();
        let mut builder = VertexBufferBuilder::new();
        let options = BuildOptions::default();

        let first = placements_for(&ring_chart(&[6, 12, 18]), Topology::Radial);
        builder
            .build(&first, Topology::Radial, true, &mut geometry, options)
            .unwrap();
        let capacity = builder.buffer().capacity();
        let reallocations = builder.buffer().reallocations();

        for rows in [&[6, 12, 18][..], &[6, 12], &[6, 6], &[3]] {
            let placements = placements_for(&ring_chart(rows), Topology::Radial);
            let stats = builder
                .build(&placements, Topology::Radial, true, &mut geometry, options)
                .unwrap();
            assert!(!stats.reallocated);
        }

        assert_eq!(builder.buffer().capacity(), capacity);
        assert_eq!(builder.buffer().reallocations(), reallocations);
    }

    #[test]
    fn test_empty_placements_clear_attribute() {
        let mut geometry = GeometryCache::new();
        let mut builder = VertexBufferBuilder::new();
        let placements = placements_for(&ring_chart(&[5]), Topology::Radial);
        builder
            .build(&placements, Topology::Radial, true, &mut geometry, BuildOptions::default())
            .unwrap();
        assert!(builder.buffer().position_attribute().is_some());

        builder
            .build(&[], Topology::Radial, true, &mut geometry, BuildOptions::default())
            .unwrap();
        assert!(builder.buffer().position_attribute().is_none());
        assert!(builder.buffer().capacity() > 0);
    }

    #[test]
    fn test_triangle_mode_uses_tube_meshes() {
        let mut geometry = GeometryCache::new();
        let mut builder = VertexBufferBuilder::new();
        let placements = placements_for(&ring_chart(&[3]), Topology::Radial);
        let options = BuildOptions {
            mode: VertexMode::Triangles,
            ..BuildOptions::default()
        };
        let stats = builder
            .build(&placements, Topology::Radial, true, &mut geometry, options)
            .unwrap();

        let mesh = geometry.tube_mesh(StitchType::Single, Fidelity::Standard);
        assert_eq!(stats.total_vertices, mesh.indices.len() * 3);
        assert_eq!(stats.connector_vertices, 0);
        assert_eq!(stats.total_vertices % 3, 0);
    }

    #[test]
    fn test_outline_starts_at_transformed_curve() {
        let mut geometry = GeometryCache::new();
        let mut builder = VertexBufferBuilder::new();
        let placements = placements_for(&ring_chart(&[1]), Topology::Radial);
        builder
            .build(&placements, Topology::Radial, false, &mut geometry, BuildOptions::default())
            .unwrap();

        let curve = geometry.curve(StitchType::Single, Fidelity::Standard);
        let expected = placements[0].transform(1.0).transform_point3(curve.points[0]);
        let first = builder.buffer().vertex(0).unwrap();
        assert!((first - expected).length() < 1e-6);
    }
}
