//! Keyframed transform tracks
//!
//! Tracks are sampled at integer frames. Between two keys the transform is
//! decomposed into scale/rotation/translation and blended, the same way a TRS
//! animation channel is sampled.

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// How a track fills the frames between two keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Lerp scale and translation, slerp rotation
    #[default]
    Linear,
    /// Hold the previous key
    Constant,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Keyframe {
    pub frame: i32,
    pub matrix: Mat4,
}

/// A transform animated over frames; keys must be in strictly increasing frame order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformTrack {
    #[serde(default)]
    pub interpolation: Interpolation,
    pub keys: Vec<Keyframe>,
}

impl TransformTrack {
    pub fn new(interpolation: Interpolation, keys: Vec<Keyframe>) -> Self {
        Self { interpolation, keys }
    }

    /// True when key frames strictly increase
    pub fn is_ordered(&self) -> bool {
        self.keys.windows(2).all(|w| w[0].frame < w[1].frame)
    }

    /// Evaluate the track at `frame`. Returns `None` for a track without keys.
    pub fn sample(&self, frame: i32) -> Option<Mat4> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;

        if frame <= first.frame {
            return Some(first.matrix);
        }
        if frame >= last.frame {
            return Some(last.matrix);
        }

        // First key strictly after `frame`; in 1..len because of the clamps above
        let next = self.keys.partition_point(|k| k.frame <= frame);
        let k0 = &self.keys[next - 1];
        let k1 = &self.keys[next];

        if k0.frame == frame || self.interpolation == Interpolation::Constant {
            return Some(k0.matrix);
        }

        let t = ((frame as i64 - k0.frame as i64) as f64
            / (k1.frame as i64 - k0.frame as i64) as f64) as f32;
        Some(blend(&k0.matrix, &k1.matrix, t))
    }
}

fn blend(a: &Mat4, b: &Mat4, t: f32) -> Mat4 {
    let (s0, r0, t0) = a.to_scale_rotation_translation();
    let (s1, r1, t1) = b.to_scale_rotation_translation();
    Mat4::from_scale_rotation_translation(s0.lerp(s1, t), r0.slerp(r1, t), t0.lerp(t1, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn key(frame: i32, x: f32) -> Keyframe {
        Keyframe {
            frame,
            matrix: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
        }
    }

    fn x_of(m: Mat4) -> f32 {
        m.w_axis.x
    }

    #[test]
    fn test_empty_track_has_no_sample() {
        assert!(TransformTrack::default().sample(1).is_none());
    }

    #[test]
    fn test_clamps_outside_key_range() {
        let track = TransformTrack::new(Interpolation::Linear, vec![key(10, 1.0), key(20, 3.0)]);
        assert_eq!(x_of(track.sample(0).unwrap()), 1.0);
        assert_eq!(x_of(track.sample(10).unwrap()), 1.0);
        assert_eq!(x_of(track.sample(20).unwrap()), 3.0);
        assert_eq!(x_of(track.sample(99).unwrap()), 3.0);
    }

    #[test]
    fn test_exact_key_returns_key_matrix() {
        let m = Mat4::from_rotation_z(0.3) * Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let track = TransformTrack::new(
            Interpolation::Linear,
            vec![key(1, 0.0), Keyframe { frame: 5, matrix: m }, key(9, 0.0)],
        );
        assert_eq!(track.sample(5).unwrap(), m);
    }

    #[test]
    fn test_linear_translation() {
        let track = TransformTrack::new(Interpolation::Linear, vec![key(0, 0.0), key(4, 8.0)]);
        assert!((x_of(track.sample(1).unwrap()) - 2.0).abs() < 1e-5);
        assert!((x_of(track.sample(3).unwrap()) - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_constant_holds_previous_key() {
        let track = TransformTrack::new(Interpolation::Constant, vec![key(0, 0.0), key(4, 8.0)]);
        assert_eq!(x_of(track.sample(3).unwrap()), 0.0);
        assert_eq!(x_of(track.sample(4).unwrap()), 8.0);
    }

    #[test]
    fn test_rotation_uses_slerp() {
        let track = TransformTrack::new(
            Interpolation::Linear,
            vec![
                Keyframe { frame: 0, matrix: Mat4::IDENTITY },
                Keyframe {
                    frame: 2,
                    matrix: Mat4::from_quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
                },
            ],
        );
        let mid = track.sample(1).unwrap();
        let (_, rotation, _) = mid.to_scale_rotation_translation();
        let expected = Quat::from_rotation_z(std::f32::consts::FRAC_PI_4);
        assert!(rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_far_apart_keys() {
        let track = TransformTrack::new(
            Interpolation::Linear,
            vec![key(-2_000_000_000, 0.0), key(2_000_000_000, 4.0)],
        );
        assert!((x_of(track.sample(0).unwrap()) - 2.0).abs() < 1e-5);
        assert!((x_of(track.sample(i32::MAX - 1).unwrap()) - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_is_ordered() {
        assert!(TransformTrack::new(Interpolation::Linear, vec![key(1, 0.0), key(2, 0.0)]).is_ordered());
        assert!(!TransformTrack::new(Interpolation::Linear, vec![key(2, 0.0), key(2, 0.0)]).is_ordered());
        assert!(!TransformTrack::new(Interpolation::Linear, vec![key(3, 0.0), key(1, 0.0)]).is_ordered());
    }
}
