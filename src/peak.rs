//! peak.rs — recognizing the top of the sweep

use crate::duty::NormalizedPosition;

/// Position of the trajectory's maximum.
pub const PEAK_POSITION: f32 = 1.0;

/// Default tolerance for [`is_at_peak`].
///
/// Only samples that land on the top within float rounding qualify. With
/// 0.5° steps the neighbors of the top sit about 1.9e-5 away.
pub const PEAK_TOLERANCE: f32 = 1e-7;

pub fn distance_to_peak(position: NormalizedPosition) -> f32 {
    libm::fabsf(PEAK_POSITION - position.value())
}

pub fn is_at_peak(position: NormalizedPosition, tolerance: f32) -> bool {
    distance_to_peak(position) < tolerance
}

/// How the sequencer decides that a sample is a peak.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeakDetection {
    /// Absolute distance to [`PEAK_POSITION`] below the tolerance.
    Tolerance(f32),
    /// Strictly above the previous sample and not below the next one.
    /// The first and last samples never qualify.
    LocalMaximum,
}

impl PeakDetection {
    pub fn is_peak(
        &self,
        previous: Option<NormalizedPosition>,
        current: NormalizedPosition,
        next: Option<NormalizedPosition>,
    ) -> bool {
        match *self {
            PeakDetection::Tolerance(tolerance) => is_at_peak(current, tolerance),
            PeakDetection::LocalMaximum => match (previous, next) {
                (Some(previous), Some(next)) => previous < current && current >= next,
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrajectorySpec;
    use crate::trajectory::Trajectory;

    fn pos(value: f32) -> NormalizedPosition {
        NormalizedPosition::new(value).unwrap()
    }

    #[test]
    fn test_far_from_peak() {
        assert!(!is_at_peak(pos(0.99), PEAK_TOLERANCE));
        assert!(!is_at_peak(pos(0.0), PEAK_TOLERANCE));
        assert!(!is_at_peak(pos(-1.0), PEAK_TOLERANCE));
    }

    #[test]
    fn test_near_peak_boundary() {
        assert!(is_at_peak(pos(1.0), PEAK_TOLERANCE));

        // Largest f32 below 1.0 is 1 - 2^-24, distance 5.96e-8
        let just_below = 1.0 - f32::EPSILON / 2.0;
        assert_eq!(just_below, 0.99999994);
        assert!(is_at_peak(pos(just_below), PEAK_TOLERANCE));

        // 0.9999998 rounds to 1 - 3 * 2^-24, distance 1.79e-7
        assert!(!is_at_peak(pos(0.9999998), PEAK_TOLERANCE));
    }

    #[test]
    fn test_distance_is_absolute() {
        assert_eq!(distance_to_peak(pos(0.75)), 0.25);
        assert_eq!(distance_to_peak(pos(-1.0)), 2.0);
    }

    #[test]
    fn test_tolerance_ignores_neighbors() {
        let detection = PeakDetection::Tolerance(PEAK_TOLERANCE);
        assert!(detection.is_peak(None, pos(1.0), None));
        assert!(!detection.is_peak(Some(pos(0.5)), pos(0.9), Some(pos(0.5))));
    }

    #[test]
    fn test_local_maximum() {
        let detection = PeakDetection::LocalMaximum;
        assert!(detection.is_peak(Some(pos(0.5)), pos(0.9), Some(pos(0.5))));
        // plateau: first sample of the flat top counts, the second does not
        assert!(detection.is_peak(Some(pos(0.5)), pos(0.9), Some(pos(0.9))));
        assert!(!detection.is_peak(Some(pos(0.9)), pos(0.9), Some(pos(0.5))));
        assert!(!detection.is_peak(None, pos(0.9), Some(pos(0.5))));
        assert!(!detection.is_peak(Some(pos(0.5)), pos(0.9), None));
    }

    #[test]
    fn test_default_sweep_has_single_peak() {
        let peaks: Vec<u32> = Trajectory::new(TrajectorySpec::FULL_CYCLE)
            .filter(|step| is_at_peak(step.position, PEAK_TOLERANCE))
            .map(|step| step.index)
            .collect();
        assert_eq!(peaks, vec![360]);
    }

    #[test]
    fn test_local_maximum_agrees_on_default_sweep() {
        let samples: Vec<NormalizedPosition> = Trajectory::new(TrajectorySpec::FULL_CYCLE)
            .map(|step| step.position)
            .collect();
        let peaks: Vec<usize> = (1..samples.len() - 1)
            .filter(|&i| {
                PeakDetection::LocalMaximum.is_peak(Some(samples[i - 1]), samples[i], Some(samples[i + 1]))
            })
            .collect();
        assert_eq!(peaks, vec![360]);
    }
}
