//! Explicit memoization of generated stitch geometry.

use std::collections::HashMap;
use std::sync::Arc;

use loopwork_config::Fidelity;
use tracing::debug;

use super::{curve_for, sweep_tube, tube_sides, CurveDefinition, GeometryKey, MeshDescriptor};
use crate::constants::YARN_RADIUS;
use crate::types::StitchType;

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Curves and tube meshes keyed by `(type, fidelity)`
#[derive(Debug, Default)]
pub struct GeometryCache {
    curves: HashMap<GeometryKey, Arc<CurveDefinition>>,
    meshes: HashMap<GeometryKey, Arc<MeshDescriptor>>,
    stats: CacheStats,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or generate the curve for a stitch type
    pub fn curve(&mut self, stitch: StitchType, fidelity: Fidelity) -> Arc<CurveDefinition> {
        let key = GeometryKey::new(stitch, fidelity);
        if let Some(curve) = self.curves.get(&key) {
            self.stats.hits += 1;
            return Arc::clone(curve);
        }

        self.stats.misses += 1;
        let curve = Arc::new(curve_for(stitch, fidelity));
        debug!(
            "Generated {:?} curve at {} fidelity ({} points)",
            stitch,
            fidelity.label(),
            curve.points.len()
        );
        self.curves.insert(key, Arc::clone(&curve));
        curve
    }

    /// Get or generate the tube mesh for a stitch type.
    ///
    /// Reuses the cached curve so tessellation happens once per key.
    pub fn tube_mesh(&mut self, stitch: StitchType, fidelity: Fidelity) -> Arc<MeshDescriptor> {
        let key = GeometryKey::new(stitch, fidelity);
        if let Some(mesh) = self.meshes.get(&key) {
            self.stats.hits += 1;
            return Arc::clone(mesh);
        }

        let curve = self.curve(stitch, fidelity);
        self.stats.misses += 1;
        let mesh = Arc::new(sweep_tube(&curve.points, YARN_RADIUS, tube_sides(fidelity)));
        self.meshes.insert(key, Arc::clone(&mesh));
        mesh
    }

    /// Number of cached curves
    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    /// Number of cached meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every cached entry
    pub fn clear(&mut self) {
        self.curves.clear();
        self.meshes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_memoized() {
        let mut cache = GeometryCache::new();
        let a = cache.curve(StitchType::Double, Fidelity::High);
        let b = cache.curve(StitchType::Double, Fidelity::High);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.curve_count(), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_fidelity_is_part_of_key() {
        let mut cache = GeometryCache::new();
        cache.curve(StitchType::Single, Fidelity::Standard);
        cache.curve(StitchType::Single, Fidelity::High);
        assert_eq!(cache.curve_count(), 2);
    }

    #[test]
    fn test_mesh_reuses_curve() {
        let mut cache = GeometryCache::new();
        let mesh = cache.tube_mesh(StitchType::Chain, Fidelity::Standard);
        assert!(mesh.triangle_count() > 0);
        assert_eq!(cache.curve_count(), 1);
        assert_eq!(cache.mesh_count(), 1);

        cache.tube_mesh(StitchType::Chain, Fidelity::Standard);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_clear() {
        let mut cache = GeometryCache::new();
        cache.tube_mesh(StitchType::Purl, Fidelity::High);
        cache.clear();
        assert_eq!(cache.curve_count(), 0);
        assert_eq!(cache.mesh_count(), 0);
    }
}
