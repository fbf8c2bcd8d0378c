//! Loop modifier displacement, applied after topology placement.

use std::collections::BTreeSet;

use glam::Vec3;

use crate::constants::LOOP_DEPTH_OFFSET;
use crate::types::Modifier;

/// Fixed displacement for a cell's loop modifiers.
///
/// Back-loop-only pushes away from the viewer (-z), front-loop-only pulls
/// toward it (+z). A cell carrying both ends up with no net offset.
pub fn loop_offset(modifiers: &BTreeSet<Modifier>) -> Vec3 {
    modifiers
        .iter()
        .map(|modifier| match modifier {
            Modifier::BackLoop => Vec3::new(0.0, 0.0, -LOOP_DEPTH_OFFSET),
            Modifier::FrontLoop => Vec3::new(0.0, 0.0, LOOP_DEPTH_OFFSET),
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_modifiers() {
        assert_eq!(loop_offset(&BTreeSet::new()), Vec3::ZERO);
    }

    #[test]
    fn test_back_and_front() {
        let back = BTreeSet::from([Modifier::BackLoop]);
        let front = BTreeSet::from([Modifier::FrontLoop]);
        assert_eq!(loop_offset(&back).z, -LOOP_DEPTH_OFFSET);
        assert_eq!(loop_offset(&front).z, LOOP_DEPTH_OFFSET);
    }
}
