//! Screen-space tooltip placement
//!
//! The tooltip floats above the top-centre of the model's world bounding box.
//! Each frame the anchor is projected through the camera and mapped to pixel
//! coordinates; it is hidden when the projected depth leaves the view volume.

use glam::{Mat4, Vec2, Vec3};

use crate::viewport::ViewportState;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Smallest box containing all points, or None for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |b, p| Self {
            min: b.min.min(p),
            max: b.max.max(p),
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Centre of the top face (largest y)
    pub fn top_center(&self) -> Vec3 {
        let mut top = self.center();
        top.y += self.size().y / 2.0;
        top
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Axis-aligned box enclosing this box after an affine transform
    pub fn transformed(&self, world_from_local: &Mat4) -> Bounds {
        let corners = self.corners().map(|c| world_from_local.transform_point3(c));
        // Eight corners are never empty
        Bounds::from_points(corners).unwrap_or(*self)
    }
}

/// Depth interval of the canonical view volume after perspective divide
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepthRange {
    /// OpenGL / WebGL convention: z in [-1, 1]
    NegOneToOne,
    /// WebGPU / Vulkan / D3D convention (including reverse-Z): z in [0, 1]
    ZeroToOne,
}

impl DepthRange {
    pub fn contains(&self, z: f32) -> bool {
        match self {
            DepthRange::NegOneToOne => (-1.0..=1.0).contains(&z),
            DepthRange::ZeroToOne => (0.0..=1.0).contains(&z),
        }
    }
}

/// A world point after projection through a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub ndc: Vec3,
    /// Clip-space w; not positive when the point is behind the camera
    pub w: f32,
}

impl Projected {
    pub fn is_visible(&self, depth: DepthRange) -> bool {
        self.w > 0.0 && self.ndc.is_finite() && depth.contains(self.ndc.z)
    }
}

/// Project a world point through a clip-from-world matrix
pub fn project(clip_from_world: &Mat4, point: Vec3) -> Projected {
    let clip = *clip_from_world * point.extend(1.0);
    Projected {
        ndc: clip.truncate() / clip.w,
        w: clip.w,
    }
}

/// Where the tooltip should be drawn this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    /// Pixel position of the anchor, origin top-left
    pub position: Vec2,
    pub visible: bool,
}

impl OverlayPlacement {
    pub fn hidden() -> Self {
        Self {
            position: Vec2::ZERO,
            visible: false,
        }
    }

    /// Place the tooltip for an already projected anchor
    pub fn from_projected(projected: Projected, viewport: &ViewportState, depth: DepthRange) -> Self {
        Self {
            position: viewport.ndc_to_pixels(projected.ndc.truncate()),
            visible: projected.is_visible(depth),
        }
    }

    /// Place the tooltip above the top-centre of `bounds`
    pub fn for_bounds(
        bounds: &Bounds,
        clip_from_world: &Mat4,
        viewport: &ViewportState,
        depth: DepthRange,
    ) -> Self {
        Self::from_projected(project(clip_from_world, bounds.top_center()), viewport, depth)
    }
}
