//! Instance batching by (stitch type, color).
//!
//! Buckets let the rendering surface issue one instanced draw per bucket
//! instead of one draw per stitch. They are rebuilt only when chart content
//! or fidelity changes; per frame only [`FrameUniforms`] move.

use std::collections::BTreeMap;

use loopwork_config::{Fidelity, Palette};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::GeometryKey;
use crate::types::{ColorId, StitchCategory, StitchPlacement, StitchType};

/// Bucket key: one draw call per distinct pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderBucketKey {
    pub stitch: StitchType,
    pub color: ColorId,
}

/// Per-instance data laid out for direct GPU upload
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct InstanceData {
    /// Column-major local-to-world transform
    pub transform: [[f32; 4]; 4],
    /// Linear RGBA
    pub color: [f32; 4],
}

/// Instances sharing one mesh and color
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBucket {
    pub key: RenderBucketKey,
    /// Mesh to bind for this bucket
    pub mesh: GeometryKey,
    pub instances: Vec<InstanceData>,
}

impl RenderBucket {
    /// Instance data as raw bytes for GPU upload
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// Continuous values updated every frame without rebatching
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct FrameUniforms {
    /// Seconds since the scene started, drives procedural fiber noise
    pub elapsed_seconds: f32,
    /// 0 for standard, 1 for high fidelity
    pub fidelity_level: u32,
    pub _padding: [u32; 2],
}

/// Resolve the palette color for a category
pub fn resolve_color(palette: &Palette, color: ColorId) -> [f32; 4] {
    match color {
        StitchCategory::Standard => palette.standard,
        StitchCategory::Increase => palette.increase,
        StitchCategory::Decrease => palette.decrease,
        StitchCategory::Foundation => palette.foundation,
        StitchCategory::Textured => palette.textured,
    }
}

/// Groups placements into render buckets
#[derive(Debug, Default)]
pub struct InstanceBatcher {
    buckets: BTreeMap<RenderBucketKey, RenderBucket>,
    uniforms: FrameUniforms,
    rebuilds: u64,
}

impl InstanceBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every bucket from placements.
    ///
    /// Each instance transform comes one-to-one from its placement; colors are
    /// resolved from the palette here rather than baked into geometry.
    pub fn rebuild(
        &mut self,
        placements: &[StitchPlacement],
        palette: &Palette,
        fidelity: Fidelity,
        height_scale: f32,
    ) {
        self.buckets.clear();
        for placement in placements {
            let key = RenderBucketKey {
                stitch: placement.stitch,
                color: placement.color,
            };
            let bucket = self.buckets.entry(key).or_insert_with(|| RenderBucket {
                key,
                mesh: GeometryKey::new(placement.stitch, fidelity),
                instances: Vec::new(),
            });
            bucket.instances.push(InstanceData {
                transform: placement.transform(height_scale).to_cols_array_2d(),
                color: resolve_color(palette, placement.color),
            });
        }

        self.uniforms.fidelity_level = u32::from(fidelity.is_high());
        self.rebuilds += 1;
        debug!(
            "Batched {} instances into {} buckets",
            placements.len(),
            self.buckets.len()
        );
    }

    /// Advance continuous uniforms; buckets are left untouched
    pub fn tick(&mut self, dt: f32) {
        self.uniforms.elapsed_seconds += dt;
        trace!("Frame uniforms at {:.3}s", self.uniforms.elapsed_seconds);
    }

    /// Buckets in deterministic key order
    pub fn buckets(&self) -> impl Iterator<Item = &RenderBucket> {
        self.buckets.values()
    }

    pub fn bucket(&self, key: &RenderBucketKey) -> Option<&RenderBucket> {
        self.buckets.get(key)
    }

    /// One draw call per bucket
    pub fn draw_calls(&self) -> usize {
        self.buckets.len()
    }

    pub fn instance_count(&self) -> usize {
        self.buckets.values().map(|b| b.instances.len()).sum()
    }

    pub fn uniforms(&self) -> FrameUniforms {
        self.uniforms
    }

    /// Number of rebuilds since creation
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Drop all buckets and reset uniforms
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.uniforms = FrameUniforms::default();
    }
}
