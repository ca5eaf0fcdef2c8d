//! trajectory.rs — one sine cycle as a finite sequence of positions

use core::iter::FusedIterator;

use crate::config::TrajectorySpec;
use crate::duty::NormalizedPosition;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrajectoryStep {
    /// Zero-based sample number.
    pub index: u32,
    pub angle_rad: f32,
    pub position: NormalizedPosition,
}

/// Forward-only iterator over the samples of a [`TrajectorySpec`].
///
/// Angles are derived from the sample index instead of being accumulated,
/// so the last sample and the sample count do not depend on rounding drift.
#[derive(Clone, Debug)]
pub struct Trajectory {
    spec: TrajectorySpec,
    next_index: u32,
    len: u32,
}

impl Trajectory {
    pub fn new(spec: TrajectorySpec) -> Self {
        Self {
            spec,
            next_index: 0,
            len: spec.sample_count(),
        }
    }

    /// Position for `angle_rad`: sine remapped from [-1, 1] onto [0, 1].
    pub fn position_at(angle_rad: f32) -> NormalizedPosition {
        NormalizedPosition::saturating((libm::sinf(angle_rad) + 1.0) / 2.0)
    }

    fn step_at(&self, index: u32) -> TrajectoryStep {
        let angle_deg = self.spec.start_deg + index as f32 * self.spec.step_deg;
        let angle_rad = angle_deg.to_radians();
        TrajectoryStep {
            index,
            angle_rad,
            position: Self::position_at(angle_rad),
        }
    }
}

impl Iterator for Trajectory {
    type Item = TrajectoryStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.len {
            return None;
        }
        let step = self.step_at(self.next_index);
        self.next_index += 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.len - self.next_index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Trajectory {}

impl FusedIterator for Trajectory {}
