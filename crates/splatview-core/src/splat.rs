//! Gaussian splat clouds
//!
//! Splats are read from the `.splat` binary layout: little-endian records of
//! 32 bytes each.
//!
//! ```text
//! offset  size  field
//!      0    12  position  3 x f32
//!     12    12  scale     3 x f32
//!     24     4  color     RGBA u8
//!     28     4  rotation  w, x, y, z as u8, decoded (b - 128) / 128
//! ```
//!
//! Before display a cloud is placed in the world, filtered by the clip sphere
//! and recoloured by the colour-weight effect. The prepared cloud is what the
//! renderer draws and what double-click hit-tests query.

use glam::{Mat4, Quat, Vec2, Vec3};
use thiserror::Error;

use crate::overlay::{project, DepthRange};
use crate::viewport::ViewportState;

/// Size of one `.splat` record in bytes
pub const SPLAT_RECORD_SIZE: usize = 32;

/// Luma weights used by the grayscale effect
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

#[derive(Error, Debug, PartialEq)]
pub enum SplatError {
    #[error("Splat data length {len} is not a multiple of 32 bytes")]
    Truncated { len: usize },
    #[error("Splat data contains no splats")]
    Empty,
}

/// A single Gaussian splat in cloud-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    pub position: Vec3,
    pub scale: Vec3,
    pub color: [u8; 4],
    pub rotation: Quat,
}

impl Splat {
    /// Radius used by the clip test: the largest scale axis
    pub fn radius(&self) -> f32 {
        self.scale.max_element()
    }

    fn from_record(record: &[u8]) -> Self {
        let f = |i: usize| {
            f32::from_le_bytes([record[i], record[i + 1], record[i + 2], record[i + 3]])
        };
        let q = |i: usize| (record[i] as f32 - 128.0) / 128.0;
        // Stored w first
        let rotation = Quat::from_xyzw(q(29), q(30), q(31), q(28));
        Self {
            position: Vec3::new(f(0), f(4), f(8)),
            scale: Vec3::new(f(12), f(16), f(20)),
            color: [record[24], record[25], record[26], record[27]],
            rotation: if rotation.length_squared() > 0.0 {
                rotation.normalize()
            } else {
                Quat::IDENTITY
            },
        }
    }
}

/// Shader-style effects applied to splats before display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatEffect {
    /// Replace RGB by `dot(rgb, weights)` when set
    pub color_weights: Option<[f32; 3]>,
    /// Discard splats with `length(position) + radius > clip_radius`
    pub clip_radius: Option<f32>,
}

impl Default for SplatEffect {
    fn default() -> Self {
        Self {
            color_weights: Some(LUMA_WEIGHTS),
            clip_radius: Some(10.0),
        }
    }
}

impl SplatEffect {
    /// No recolouring, no clipping
    pub fn none() -> Self {
        Self {
            color_weights: None,
            clip_radius: None,
        }
    }

    /// Whether a world-space splat survives the clip test
    pub fn keeps(&self, position: Vec3, radius: f32) -> bool {
        match self.clip_radius {
            Some(limit) => position.length() + radius <= limit,
            None => true,
        }
    }

    /// Apply colour weighting to an RGBA colour in 0..1
    pub fn shade(&self, color: [f32; 4]) -> [f32; 4] {
        match self.color_weights {
            Some(w) => {
                let gray = Vec3::new(color[0], color[1], color[2]).dot(Vec3::from(w));
                [gray, gray, gray, color[3]]
            }
            None => color,
        }
    }
}

/// A loaded cloud of splats
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplatCloud {
    pub splats: Vec<Splat>,
}

impl SplatCloud {
    /// Parse `.splat` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SplatError> {
        if bytes.len() % SPLAT_RECORD_SIZE != 0 {
            return Err(SplatError::Truncated { len: bytes.len() });
        }
        if bytes.is_empty() {
            return Err(SplatError::Empty);
        }
        let splats = bytes
            .chunks_exact(SPLAT_RECORD_SIZE)
            .map(Splat::from_record)
            .collect();
        Ok(Self { splats })
    }

    pub fn len(&self) -> usize {
        self.splats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splats.is_empty()
    }

    /// Place the cloud in the world and apply `effect`
    pub fn prepare(&self, world_from_cloud: &Mat4, effect: &SplatEffect) -> PreparedSplats {
        let mut prepared = PreparedSplats::default();
        for splat in &self.splats {
            let position = world_from_cloud.transform_point3(splat.position);
            if !effect.keeps(position, splat.radius()) {
                continue;
            }
            let rgba = splat.color.map(|c| c as f32 / 255.0);
            prepared.positions.push(position);
            prepared.colors.push(effect.shade(rgba));
        }
        prepared
    }
}

/// World-space splats ready for drawing and picking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedSplats {
    pub positions: Vec<Vec3>,
    pub colors: Vec<[f32; 4]>,
}

impl PreparedSplats {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Nearest splat centre under a screen point.
    ///
    /// Candidates are splats whose projected centre lies within
    /// `pick_radius_px` of `screen` and inside the view volume. The one
    /// closest to the camera wins.
    pub fn hit_test(
        &self,
        clip_from_world: &Mat4,
        viewport: &ViewportState,
        screen: Vec2,
        pick_radius_px: f32,
        depth: DepthRange,
    ) -> Option<Vec3> {
        let radius_sq = pick_radius_px * pick_radius_px;
        self.positions
            .iter()
            .filter_map(|&p| {
                let projected = project(clip_from_world, p);
                if !projected.is_visible(depth) {
                    return None;
                }
                let pixel = viewport.ndc_to_pixels(projected.ndc.truncate());
                (pixel.distance_squared(screen) <= radius_sq).then_some((projected.w, p))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splat_at(position: Vec3, scale: f32, color: [u8; 4]) -> Splat {
        Splat {
            position,
            scale: Vec3::splat(scale),
            color,
            rotation: Quat::IDENTITY,
        }
    }

    fn encode(cloud: &SplatCloud) -> Vec<u8> {
        let mut out = Vec::with_capacity(cloud.len() * SPLAT_RECORD_SIZE);
        let enc = |v: f32| ((v * 128.0 + 128.0).round().clamp(0.0, 255.0)) as u8;
        for s in &cloud.splats {
            for v in s.position.to_array().into_iter().chain(s.scale.to_array()) {
                out.extend_from_slice(&v.to_le_bytes());
            }
            out.extend_from_slice(&s.color);
            let r = s.rotation;
            out.extend_from_slice(&[enc(r.w), enc(r.x), enc(r.y), enc(r.z)]);
        }
        out
    }

    fn camera() -> Mat4 {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        Mat4::perspective_rh_gl(50f32.to_radians(), 1.0, 0.1, 1000.0) * view
    }

    #[test]
    fn test_parse_record() {
        let cloud = SplatCloud {
            splats: vec![splat_at(Vec3::new(1.0, 2.0, 3.0), 0.5, [255, 0, 0, 128])],
        };
        let bytes = encode(&cloud);
        assert_eq!(bytes.len(), SPLAT_RECORD_SIZE);
        // w of the identity rotation is stored first
        assert_eq!(&bytes[28..32], &[255, 128, 128, 128]);

        let parsed = SplatCloud::from_bytes(&bytes).unwrap();
        let s = parsed.splats[0];
        assert_eq!(s.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(s.scale, Vec3::splat(0.5));
        assert_eq!(s.color, [255, 0, 0, 128]);
        assert!(s.rotation.angle_between(Quat::IDENTITY) < 1e-2);
    }

    #[test]
    fn test_reject_bad_lengths() {
        assert_eq!(
            SplatCloud::from_bytes(&[0u8; 33]),
            Err(SplatError::Truncated { len: 33 })
        );
        assert_eq!(SplatCloud::from_bytes(&[]), Err(SplatError::Empty));
    }

    #[test]
    fn test_clip_sphere() {
        let cloud = SplatCloud {
            splats: vec![
                splat_at(Vec3::new(9.0, 0.0, 0.0), 0.5, [0; 4]),
                splat_at(Vec3::new(9.8, 0.0, 0.0), 0.5, [0; 4]),
            ],
        };
        let prepared = cloud.prepare(&Mat4::IDENTITY, &SplatEffect::default());
        assert_eq!(prepared.positions, vec![Vec3::new(9.0, 0.0, 0.0)]);

        let unclipped = cloud.prepare(&Mat4::IDENTITY, &SplatEffect::none());
        assert_eq!(unclipped.len(), 2);
    }

    #[test]
    fn test_grayscale_effect() {
        let effect = SplatEffect::default();
        let [r, g, b, a] = effect.shade([1.0, 0.0, 0.0, 0.5]);
        assert!((r - 0.299).abs() < 1e-6);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 0.5);
    }

    #[test]
    fn test_world_transform_applied() {
        let cloud = SplatCloud {
            splats: vec![splat_at(Vec3::Y, 0.1, [0; 4])],
        };
        let rotate = Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2);
        let prepared = cloud.prepare(&rotate, &SplatEffect::none());
        assert!(prepared.positions[0].distance(Vec3::Z) < 1e-6);
    }

    #[test]
    fn test_hit_test_prefers_nearest() {
        let cloud = SplatCloud {
            splats: vec![
                splat_at(Vec3::new(0.0, 0.0, -2.0), 0.1, [0; 4]),
                splat_at(Vec3::new(0.0, 0.0, 1.0), 0.1, [0; 4]),
                splat_at(Vec3::new(1.5, 0.0, 0.0), 0.1, [0; 4]),
            ],
        };
        let prepared = cloud.prepare(&Mat4::IDENTITY, &SplatEffect::none());
        let viewport = ViewportState::new(800, 800);

        let hit = prepared.hit_test(
            &camera(),
            &viewport,
            Vec2::new(400.0, 400.0),
            6.0,
            DepthRange::NegOneToOne,
        );
        assert_eq!(hit, Some(Vec3::new(0.0, 0.0, 1.0)));

        let miss = prepared.hit_test(
            &camera(),
            &viewport,
            Vec2::new(10.0, 10.0),
            6.0,
            DepthRange::NegOneToOne,
        );
        assert_eq!(miss, None);
    }
}
