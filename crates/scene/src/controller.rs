//! Message-driven controller owning one stitch pipeline.
//!
//! The surface sends [`SurfaceToCore`] messages in and drains
//! [`CoreToSurface`] messages out. Hover and selection state live here rather
//! than in the pipeline, and change events are only queued when the state
//! actually changes.

use glam::Vec3;
use loopwork_config::VisualizationConfig;
use loopwork_ipc::{ChartDocument, CoreToSurface, IpcError, SurfaceToCore};
use stitch::{PipelineError, StitchId, StitchPipeline};
use tracing::{debug, warn};

use crate::OutboundMessages;
use crate::convert::{chart_from_document, geometry_info, stitch_ref};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Error codes reported through `CoreToSurface::Error`
pub mod codes {
    pub const CONFIG: &str = "config";
    pub const CHART: &str = "chart";
    pub const LAYOUT: &str = "layout";
    pub const BUFFER: &str = "buffer";
    pub const MESSAGE: &str = "message";
}

fn error_code(error: &PipelineError) -> &'static str {
    match error {
        PipelineError::Config(_) => codes::CONFIG,
        PipelineError::Chart(_) => codes::CHART,
        PipelineError::Layout(_) => codes::LAYOUT,
        PipelineError::Buffer(_) => codes::BUFFER,
    }
}

/// Scene controller for one chart view
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct SceneController {
    pipeline: StitchPipeline,
    outbound: OutboundMessages,
    hovered: Option<StitchId>,
    selected: Option<StitchId>,
}

impl Default for SceneController {
    fn default() -> Self {
        Self::with_pipeline(StitchPipeline::default())
    }
}

impl SceneController {
    /// Create a controller with a validated configuration
    pub fn new(config: VisualizationConfig) -> Result<Self, PipelineError> {
        Ok(Self::with_pipeline(StitchPipeline::new(config)?))
    }

    pub fn with_pipeline(pipeline: StitchPipeline) -> Self {
        Self {
            pipeline,
            outbound: OutboundMessages::default(),
            hovered: None,
            selected: None,
        }
    }

    pub fn pipeline(&self) -> &StitchPipeline {
        &self.pipeline
    }

    pub fn hovered(&self) -> Option<StitchId> {
        self.hovered
    }

    pub fn selected(&self) -> Option<StitchId> {
        self.selected
    }

    /// Take all queued outbound messages
    pub fn drain(&mut self) -> Vec<CoreToSurface> {
        self.outbound.drain()
    }

    /// Handle one inbound message, queueing any responses
    pub fn handle(&mut self, message: SurfaceToCore) {
        match message {
            SurfaceToCore::LoadChart(document) => self.load_chart(&document),
            SurfaceToCore::SetTopology { topology } => self.pipeline.set_topology(topology),
            SurfaceToCore::SetFidelity { fidelity } => {
                if self.pipeline.set_fidelity(fidelity) {
                    self.outbound.send(CoreToSurface::FidelityChanged { fidelity });
                }
            }
            SurfaceToCore::UpdateConfig(config) => self.update_config(config),
            SurfaceToCore::PointerMoved { point } => {
                let hit = self.pipeline.pick(Vec3::from_array(point));
                self.set_hovered(hit);
            }
            SurfaceToCore::PointerClicked { point } => {
                let hit = self.pipeline.pick(Vec3::from_array(point));
                self.set_selected(hit);
            }
            SurfaceToCore::Frame { dt } => self.frame(dt),
            SurfaceToCore::Dispose => {
                self.pipeline.dispose();
                self.hovered = None;
                self.selected = None;
                self.outbound.send(CoreToSurface::Disposed);
            }
        }
    }

    /// Decode a JSON message, handle it and return the encoded responses
    pub fn handle_json(&mut self, json: &str) -> Result<Vec<String>, IpcError> {
        match loopwork_ipc::decode::<SurfaceToCore>(json) {
            Ok(message) => self.handle(message),
            Err(error) => {
                warn!("Rejected inbound message: {}", error);
                self.report(codes::MESSAGE, error.to_string());
            }
        }
        self.drain().iter().map(loopwork_ipc::encode).collect()
    }

    fn load_chart(&mut self, document: &ChartDocument) {
        match chart_from_document(document) {
            Ok(chart) => {
                self.pipeline.set_chart(document.version, chart);
            }
            Err(error) => self.report(codes::CHART, error.to_string()),
        }
    }

    fn update_config(&mut self, config: VisualizationConfig) {
        let previous = self.pipeline.fidelity();
        match self.pipeline.set_config(config) {
            Ok(()) => {
                let fidelity = self.pipeline.fidelity();
                if fidelity != previous {
                    self.outbound.send(CoreToSurface::FidelityChanged { fidelity });
                }
            }
            Err(error) => self.report(error_code(&error), error.to_string()),
        }
    }

    fn frame(&mut self, dt: f32) {
        let report = match self.pipeline.update(dt) {
            Ok(report) => report,
            Err(error) => {
                self.report(error_code(&error), error.to_string());
                return;
            }
        };

        if report.relayout {
            self.forget_missing();
        }

        if report.build.is_some() || report.rebatched {
            let buffer = self.pipeline.vertex_buffer();
            self.outbound.send(CoreToSurface::GeometryUpdated(geometry_info(
                self.pipeline.chart_version(),
                report.placements,
                report.draw_calls,
                report.build,
                report.vertices,
                buffer.capacity(),
            )));
        }
    }

    /// Drop hover/selection ids that no longer name a placement
    fn forget_missing(&mut self) {
        let exists = |id: StitchId| self.pipeline.placements().iter().any(|p| p.id() == id);
        let hovered = self.hovered.filter(|&id| exists(id));
        let selected = self.selected.filter(|&id| exists(id));
        self.set_hovered(hovered);
        self.set_selected(selected);
    }

    fn set_hovered(&mut self, hit: Option<StitchId>) {
        if hit == self.hovered {
            return;
        }
        self.hovered = hit;
        self.outbound.send(CoreToSurface::HoverChanged {
            stitch: hit.map(stitch_ref),
        });
    }

    fn set_selected(&mut self, hit: Option<StitchId>) {
        if hit == self.selected {
            return;
        }
        debug!("Selection changed to {:?}", hit);
        self.selected = hit;
        self.outbound.send(CoreToSurface::SelectionChanged {
            stitch: hit.map(stitch_ref),
        });
    }

    fn report(&mut self, code: &str, message: String) {
        self.outbound.send(CoreToSurface::Error {
            code: code.to_string(),
            message,
        });
    }
}
