//! Ray picking against the hotspot disc and the model's bounding spheres.

use crate::camera::Ray;
use crate::constants::*;
use crate::scene::{NodeHandle, SceneGraph};
use glam::Vec3;
use smallvec::SmallVec;

/// Invisible disc in front of the eye that receives clicks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HotspotRegion {
    pub center: Vec3,
    /// Unit normal of the disc plane.
    pub normal: Vec3,
    pub radius: f32,
    /// Debug visibility only; picking ignores it.
    pub visible: bool,
}

impl Default for HotspotRegion {
    fn default() -> Self {
        Self {
            center: hotspot_center_vec3(),
            normal: Vec3::Z,
            radius: HOTSPOT_RADIUS,
            visible: false,
        }
    }
}

impl HotspotRegion {
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        ray_disc(ray.origin, ray.dir, self.center, self.normal, self.radius)
    }

    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }
}

/// Local-space bounding sphere of a mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub center: Vec3,
    pub radius: f32,
}

impl Bounds {
    pub fn from_points(points: &[[f32; 3]]) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let (mut min, mut max) = (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN));
        for p in points {
            let v = Vec3::from(*p);
            min = min.min(v);
            max = max.max(v);
        }
        let center = (min + max) * 0.5;
        let radius = points
            .iter()
            .map(|p| Vec3::from(*p).distance(center))
            .fold(0.0_f32, f32::max);
        Self { center, radius }
    }
}

#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Distance along the ray to a filled disc, either face.
#[inline]
pub fn ray_disc(
    ray_origin: Vec3,
    ray_dir: Vec3,
    center: Vec3,
    normal: Vec3,
    radius: f32,
) -> Option<f32> {
    let denom = normal.dot(ray_dir);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (center - ray_origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }
    let hit = ray_origin + ray_dir * t;
    (hit.distance_squared(center) <= radius * radius).then_some(t)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickTarget {
    Hotspot,
    Node(NodeHandle),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub target: PickTarget,
    pub distance: f32,
}

pub type Hits = SmallVec<[Hit; 4]>;

/// Every intersection along `ray`, nearest first. Hidden nodes still count,
/// matching how the hotspot itself is picked while invisible.
pub fn raycast(
    ray: &Ray,
    hotspot: &HotspotRegion,
    scene: Option<(&SceneGraph, &[Bounds])>,
) -> Hits {
    let mut hits = Hits::new();
    if let Some(t) = hotspot.intersect(ray) {
        hits.push(Hit {
            target: PickTarget::Hotspot,
            distance: t,
        });
    }
    if let Some((scene, bounds)) = scene {
        let worlds = scene.world_matrices();
        for h in scene.traverse() {
            let Some(b) = scene.node(h).mesh.and_then(|m| bounds.get(m)) else {
                continue;
            };
            let world = worlds[h.index()];
            let center = world.transform_point3(b.center);
            let scale = world
                .x_axis
                .truncate()
                .length()
                .max(world.y_axis.truncate().length())
                .max(world.z_axis.truncate().length());
            if let Some(t) = ray_sphere(ray.origin, ray.dir, center, b.radius * scale) {
                hits.push(Hit {
                    target: PickTarget::Node(h),
                    distance: t,
                });
            }
        }
    }
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

#[inline]
pub fn hits_hotspot(hits: &[Hit]) -> bool {
    hits.iter().any(|h| h.target == PickTarget::Hotspot)
}
