//! Complete stitch visualization pipeline
//!
//! This module connects:
//! - Chart input (versioned, last write wins)
//! - Layout engine (placements)
//! - Vertex buffer builder (outline or tube stream)
//! - Instance batcher (render buckets)
//! - Hit tester (pointer picking)
//!
//! Work is driven by dirty flags and performed in [`StitchPipeline::update`],
//! which the rendering surface calls once per frame. Layout always completes
//! before the vertex build and batch that depend on it.

use glam::Vec3;
use loopwork_config::{
    ConfigError, Fidelity, LayoutParams, Palette, Topology, VertexMode, VisualizationConfig,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::batch::InstanceBatcher;
use crate::buffer::{BuildOptions, BuildStats, VertexBuffer, VertexBufferBuilder};
use crate::geometry::GeometryCache;
use crate::layout::layout;
use crate::picking::HitTester;
use crate::types::{CellSpec, Chart, StitchId, StitchPlacement};
use crate::validation::{
    validate_layout_params, validate_scalar, BufferError, ChartError, LayoutError,
};

/// Errors surfaced by the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Vertex buffer error: {0}")]
    Buffer(#[from] BufferError),
}

/// Pending work, set by mutators and cleared by `update`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DirtyFlags {
    layout: bool,
    vertices: bool,
    batch: bool,
}

impl DirtyFlags {
    fn all() -> Self {
        Self {
            layout: true,
            vertices: true,
            batch: true,
        }
    }

    /// Mark the stages affected by moving from `old` to `new` parameters.
    ///
    /// Placements never read `height_scale`; it only reaches the vertex
    /// build and instance transforms.
    fn mark_params(&mut self, old: &LayoutParams, new: &LayoutParams) {
        let placement_params = LayoutParams {
            height_scale: old.height_scale,
            ..*new
        };
        if placement_params != *old {
            self.layout = true;
        }
        if new.height_scale != old.height_scale {
            self.vertices = true;
            self.batch = true;
        }
    }
}

/// What one `update` call did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Layout was recomputed this frame
    pub relayout: bool,
    /// Vertex stats if the stream was rebuilt this frame
    pub build: Option<BuildStats>,
    /// Buckets were rebuilt this frame
    pub rebatched: bool,
    /// Placements currently held
    pub placements: usize,
    /// Active vertices in the buffer
    pub vertices: usize,
    /// Instanced draws needed for the current buckets
    pub draw_calls: usize,
    /// Seconds since the pipeline started ticking
    pub elapsed_seconds: f32,
}

/// Stitch visualization pipeline for one scene
///
/// The workflow is:
/// 1. Mutators (`set_chart`, `set_fidelity`, ...) record the change and mark work dirty
/// 2. `update` recomputes placements, then the vertex stream, then buckets
/// 3. The surface uploads `vertex_buffer()` when `take_vertices_changed` reports a change
/// 4. Pointer input is resolved through `pick`
pub struct StitchPipeline {
    config: VisualizationConfig,
    chart: Chart,
    /// Version of the chart currently held (None before the first load)
    version: Option<u64>,
    placements: Vec<StitchPlacement>,
    geometry: GeometryCache,
    builder: VertexBufferBuilder,
    batcher: InstanceBatcher,
    hit_tester: HitTester,
    dirty: DirtyFlags,
}

impl Default for StitchPipeline {
    fn default() -> Self {
        Self::with_valid_config(VisualizationConfig::default())
    }
}

impl StitchPipeline {
    /// Create a pipeline from a configuration, rejecting invalid values
    pub fn new(config: VisualizationConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: VisualizationConfig) -> Self {
        Self {
            hit_tester: HitTester::new(config.hit_radius),
            config,
            chart: Chart::empty(),
            version: None,
            placements: Vec::new(),
            geometry: GeometryCache::new(),
            builder: VertexBufferBuilder::new(),
            batcher: InstanceBatcher::new(),
            dirty: DirtyFlags::all(),
        }
    }

    pub fn config(&self) -> &VisualizationConfig {
        &self.config
    }

    /// Replace the whole configuration, marking only affected stages dirty
    pub fn set_config(&mut self, config: VisualizationConfig) -> Result<(), PipelineError> {
        config.validate()?;

        if config.topology != self.config.topology {
            self.dirty.layout = true;
        }
        self.dirty.mark_params(&self.config.layout, &config.layout);
        if config.fidelity != self.config.fidelity
            || config.vertex_mode != self.config.vertex_mode
            || config.connectors_enabled != self.config.connectors_enabled
        {
            self.dirty.vertices = true;
        }
        if config.fidelity != self.config.fidelity || config.palette != self.config.palette {
            self.dirty.batch = true;
        }

        self.hit_tester.set_radius(config.hit_radius);
        self.config = config;
        Ok(())
    }

    /// Install a chart if `version` is not older than the current one.
    ///
    /// Returns whether the chart was accepted.
    pub fn set_chart(&mut self, version: u64, chart: Chart) -> bool {
        if let Some(current) = self.version {
            if version < current {
                warn!(
                    "Discarding stale chart version {} (current {})",
                    version, current
                );
                return false;
            }
        }

        info!("Loaded chart version {} with {} cells", version, chart.len());
        self.chart = chart;
        self.version = Some(version);
        self.dirty.layout = true;
        true
    }

    /// Build a chart from cell specs and install it under `version`
    pub fn load_cells(
        &mut self,
        version: u64,
        specs: impl IntoIterator<Item = CellSpec>,
    ) -> Result<bool, PipelineError> {
        let chart = Chart::from_specs(specs)?;
        Ok(self.set_chart(version, chart))
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn chart_version(&self) -> Option<u64> {
        self.version
    }

    pub fn topology(&self) -> Topology {
        self.config.topology
    }

    pub fn set_topology(&mut self, topology: Topology) {
        if topology != self.config.topology {
            self.config.topology = topology;
            self.dirty.layout = true;
        }
    }

    pub fn fidelity(&self) -> Fidelity {
        self.config.fidelity
    }

    /// Switch fidelity; returns whether it changed
    pub fn set_fidelity(&mut self, fidelity: Fidelity) -> bool {
        if fidelity == self.config.fidelity {
            return false;
        }
        self.config.fidelity = fidelity;
        self.dirty.vertices = true;
        self.dirty.batch = true;
        true
    }

    /// Replace layout parameters, rejecting invalid values before they are stored
    pub fn set_layout_params(&mut self, params: LayoutParams) -> Result<(), LayoutError> {
        validate_layout_params(&params)?;
        self.dirty.mark_params(&self.config.layout, &params);
        self.config.layout = params;
        Ok(())
    }

    pub fn set_connectors(&mut self, enabled: bool) {
        if enabled != self.config.connectors_enabled {
            self.config.connectors_enabled = enabled;
            self.dirty.vertices = true;
        }
    }

    pub fn set_vertex_mode(&mut self, mode: VertexMode) {
        if mode != self.config.vertex_mode {
            self.config.vertex_mode = mode;
            self.dirty.vertices = true;
        }
    }

    pub fn set_palette(&mut self, palette: Palette) {
        if palette != self.config.palette {
            self.config.palette = palette;
            self.dirty.batch = true;
        }
    }

    /// Whether any stage has pending work
    pub fn is_dirty(&self) -> bool {
        self.dirty != DirtyFlags::default()
    }

    /// Run pending stages and advance frame uniforms by `dt` seconds
    pub fn update(&mut self, dt: f32) -> Result<FrameReport, PipelineError> {
        validate_scalar("dt", dt)?;
        let mut report = FrameReport::default();

        if self.dirty.layout {
            self.placements = layout(&self.chart, self.config.topology, &self.config.layout)?;
            self.dirty.layout = false;
            self.dirty.vertices = true;
            self.dirty.batch = true;
            report.relayout = true;
        }

        if self.dirty.vertices {
            let options = BuildOptions {
                fidelity: self.config.fidelity,
                height_scale: self.config.layout.height_scale,
                mode: self.config.vertex_mode,
            };
            let stats = self.builder.build(
                &self.placements,
                self.config.topology,
                self.config.connectors_enabled,
                &mut self.geometry,
                options,
            )?;
            self.dirty.vertices = false;
            report.build = Some(stats);
        }

        if self.dirty.batch {
            self.batcher.rebuild(
                &self.placements,
                &self.config.palette,
                self.config.fidelity,
                self.config.layout.height_scale,
            );
            self.dirty.batch = false;
            report.rebatched = true;
        }

        self.batcher.tick(dt);

        report.placements = self.placements.len();
        report.vertices = self.builder.buffer().active_vertex_count();
        report.draw_calls = self.batcher.draw_calls();
        report.elapsed_seconds = self.batcher.uniforms().elapsed_seconds;

        if report.relayout || report.build.is_some() {
            debug!(
                "Pipeline update: {} placements, {} vertices, {} draw calls",
                report.placements, report.vertices, report.draw_calls
            );
        }

        Ok(report)
    }

    pub fn placements(&self) -> &[StitchPlacement] {
        &self.placements
    }

    pub fn vertex_buffer(&self) -> &VertexBuffer {
        self.builder.buffer()
    }

    /// Consume the vertex change flag; true at most once per rebuild
    pub fn take_vertices_changed(&mut self) -> bool {
        self.builder.buffer_mut().take_changed()
    }

    pub fn batcher(&self) -> &InstanceBatcher {
        &self.batcher
    }

    pub fn geometry(&self) -> &GeometryCache {
        &self.geometry
    }

    /// Stitch under a world-space point
    pub fn pick(&self, point: Vec3) -> Option<StitchId> {
        self.hit_tester.pick(point, &self.placements)
    }

    /// Stitch under a pointer ray
    pub fn pick_ray(&self, origin: Vec3, direction: Vec3) -> Option<StitchId> {
        self.hit_tester.pick_ray(origin, direction, &self.placements)
    }

    /// Release every buffer, bucket and cached geometry
    pub fn dispose(&mut self) {
        self.builder.release();
        self.batcher.clear();
        self.geometry.clear();
        self.placements = Vec::new();
        self.chart = Chart::empty();
        self.version = None;
        self.dirty = DirtyFlags::default();
        info!("Stitch pipeline disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StitchType;

    fn rounds(rows: &[usize]) -> Chart {
        let rows: Vec<Vec<StitchType>> = rows
            .iter()
            .map(|&n| vec![StitchType::Single; n])
            .collect();
        Chart::from_rows(&rows)
    }

    #[test]
    fn test_first_update_runs_every_stage() {
        let mut pipeline = StitchPipeline::default();
        pipeline.set_chart(1, rounds(&[6, 12]));
        let report = pipeline.update(0.016).unwrap();

        assert!(report.relayout);
        assert!(report.build.is_some());
        assert!(report.rebatched);
        assert_eq!(report.placements, 18);
        assert_eq!(report.draw_calls, 1);
        assert!(report.vertices > 0);
        assert!(pipeline.take_vertices_changed());
        assert!(!pipeline.take_vertices_changed());
    }

    #[test]
    fn test_idle_update_only_ticks() {
        let mut pipeline = StitchPipeline::default();
        pipeline.set_chart(1, rounds(&[6]));
        pipeline.update(0.5).unwrap();

        let report = pipeline.update(0.5).unwrap();
        assert!(!report.relayout);
        assert!(report.build.is_none());
        assert!(!report.rebatched);
        assert!((report.elapsed_seconds - 1.0).abs() < 1e-6);
        assert_eq!(pipeline.batcher().rebuilds(), 1);
    }

    #[test]
    fn test_stale_versions_discarded() {
        let mut pipeline = StitchPipeline::default();
        assert!(pipeline.set_chart(5, rounds(&[6])));
        assert!(!pipeline.set_chart(3, rounds(&[6, 12])));
        assert!(pipeline.set_chart(5, rounds(&[8])));
        assert!(pipeline.set_chart(7, rounds(&[4])));

        assert_eq!(pipeline.chart_version(), Some(7));
        let report = pipeline.update(0.0).unwrap();
        assert_eq!(report.placements, 4);
    }

    #[test]
    fn test_load_cells_rejects_negative_rows() {
        let mut pipeline = StitchPipeline::default();
        let spec = CellSpec {
            row: -1,
            column: None,
            stitch: StitchType::Single,
            modifiers: Default::default(),
        };
        assert!(matches!(
            pipeline.load_cells(1, vec![spec]),
            Err(PipelineError::Chart(ChartError::NegativeRow(-1)))
        ));
        assert_eq!(pipeline.chart_version(), None);
    }

    #[test]
    fn test_fidelity_change_skips_layout() {
        let mut pipeline = StitchPipeline::default();
        pipeline.set_chart(1, rounds(&[6]));
        let before = pipeline.update(0.0).unwrap();

        assert!(pipeline.set_fidelity(Fidelity::High));
        assert!(!pipeline.set_fidelity(Fidelity::High));
        assert_eq!(pipeline.fidelity(), Fidelity::High);

        let after = pipeline.update(0.0).unwrap();
        assert!(!after.relayout);
        assert!(after.rebatched);
        assert!(after.vertices > before.vertices);
        assert_eq!(pipeline.batcher().uniforms().fidelity_level, 1);
    }

    #[test]
    fn test_height_scale_skips_layout() {
        let mut pipeline = StitchPipeline::default();
        pipeline.set_chart(1, rounds(&[6]));
        pipeline.update(0.0).unwrap();
        let placements = pipeline.placements().to_vec();

        let mut params = LayoutParams::default();
        params.height_scale = 2.0;
        pipeline.set_layout_params(params).unwrap();
        let report = pipeline.update(0.0).unwrap();

        assert!(!report.relayout);
        assert!(report.build.is_some());
        assert!(report.rebatched);
        assert_eq!(pipeline.placements(), placements.as_slice());

        let bucket = pipeline.batcher().buckets().next().unwrap();
        let transform = glam::Mat4::from_cols_array_2d(&bucket.instances[0].transform);
        assert!((transform.transform_vector3(Vec3::Y).length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_spacing_change_relayouts() {
        let mut pipeline = StitchPipeline::default();
        pipeline.set_chart(1, rounds(&[6]));
        pipeline.update(0.0).unwrap();

        let mut config = pipeline.config().clone();
        config.layout.base_radius = 0.5;
        pipeline.set_config(config).unwrap();
        assert!(pipeline.update(0.0).unwrap().relayout);
    }

    #[test]
    fn test_invalid_params_rejected_early() {
        let mut pipeline = StitchPipeline::default();
        let mut params = LayoutParams::default();
        params.base_radius = f32::INFINITY;
        assert!(pipeline.set_layout_params(params).is_err());
        assert_eq!(pipeline.config().layout, LayoutParams::default());
    }

    #[test]
    fn test_non_finite_frame_delta_rejected() {
        let mut pipeline = StitchPipeline::default();
        assert!(matches!(
            pipeline.update(f32::NAN),
            Err(PipelineError::Layout(LayoutError::InvalidParameter { name: "dt", .. }))
        ));
        assert_eq!(pipeline.batcher().uniforms().elapsed_seconds, 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = VisualizationConfig::default();
        config.hit_radius = -1.0;
        assert!(matches!(
            StitchPipeline::new(config),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_palette_change_rebatches_only() {
        let mut pipeline = StitchPipeline::default();
        pipeline.set_chart(1, rounds(&[6]));
        pipeline.update(0.0).unwrap();

        let mut palette = Palette::default();
        palette.standard = [1.0, 0.0, 0.0, 1.0];
        pipeline.set_palette(palette);
        let report = pipeline.update(0.0).unwrap();
        assert!(report.rebatched);
        assert!(report.build.is_none());
        let bucket = pipeline.batcher().buckets().next().unwrap();
        assert_eq!(bucket.instances[0].color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_pick_after_update() {
        let mut pipeline = StitchPipeline::default();
        pipeline.set_chart(1, rounds(&[6]));
        pipeline.update(0.0).unwrap();

        let target = pipeline.placements()[2];
        assert_eq!(pipeline.pick(target.position), Some(target.id()));
        assert_eq!(pipeline.pick(Vec3::new(10.0, 10.0, 0.0)), None);
    }

    #[test]
    fn test_shrinking_chart_reuses_buffer() {
        let mut pipeline = StitchPipeline::default();
        pipeline.set_chart(1, rounds(&[6, 12, 18]));
        pipeline.update(0.0).unwrap();
        let capacity = pipeline.vertex_buffer().capacity();

        pipeline.set_chart(2, rounds(&[6, 12]));
        let report = pipeline.update(0.0).unwrap();
        assert!(!report.build.unwrap().reallocated);
        assert_eq!(pipeline.vertex_buffer().capacity(), capacity);
    }

    #[test]
    fn test_empty_chart_clears_attribute() {
        let mut pipeline = StitchPipeline::default();
        pipeline.set_chart(1, rounds(&[6]));
        pipeline.update(0.0).unwrap();
        pipeline.set_chart(2, Chart::empty());
        pipeline.update(0.0).unwrap();

        assert!(pipeline.vertex_buffer().position_attribute().is_none());
        assert_eq!(pipeline.batcher().draw_calls(), 0);
        assert!(pipeline.pick(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut pipeline = StitchPipeline::default();
        pipeline.set_chart(1, rounds(&[6, 12]));
        pipeline.update(0.0).unwrap();
        pipeline.dispose();

        assert_eq!(pipeline.vertex_buffer().capacity(), 0);
        assert_eq!(pipeline.batcher().draw_calls(), 0);
        assert_eq!(pipeline.geometry().curve_count(), 0);
        assert!(pipeline.placements().is_empty());
        assert_eq!(pipeline.chart_version(), None);
        assert!(!pipeline.is_dirty());
    }
}
