// Host-side tests for ray picking against the hotspot and mesh bounds.

use eye_core::*;
use glam::{Vec2, Vec3};

#[test]
fn ray_sphere_hits_front_and_misses_side() {
    let t = ray_sphere(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z, Vec3::ZERO, 1.0);
    assert!((t.unwrap() - 4.0).abs() < 1e-5);
    assert!(ray_sphere(Vec3::new(2.0, 0.0, 5.0), -Vec3::Z, Vec3::ZERO, 1.0).is_none());
    // sphere behind the origin
    assert!(ray_sphere(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, Vec3::ZERO, 1.0).is_none());
}

#[test]
fn ray_disc_respects_radius_and_direction() {
    let center = Vec3::new(0.0, 3.0, 1.0);
    let origin = Vec3::new(0.0, 3.0, 8.0);
    let t = ray_disc(origin, -Vec3::Z, center, Vec3::Z, 0.63).unwrap();
    assert!((t - 7.0).abs() < 1e-5);

    // just inside and just outside the rim
    let inside = Vec3::new(0.62, 3.0, 8.0);
    let outside = Vec3::new(0.64, 3.0, 8.0);
    assert!(ray_disc(inside, -Vec3::Z, center, Vec3::Z, 0.63).is_some());
    assert!(ray_disc(outside, -Vec3::Z, center, Vec3::Z, 0.63).is_none());

    // parallel to the plane, and pointing away
    assert!(ray_disc(origin, Vec3::X, center, Vec3::Z, 0.63).is_none());
    assert!(ray_disc(origin, Vec3::Z, center, Vec3::Z, 0.63).is_none());

    // back face counts too
    let behind = Vec3::new(0.0, 3.0, -4.0);
    assert!(ray_disc(behind, Vec3::Z, center, Vec3::Z, 0.63).is_some());
}

#[test]
fn camera_center_ray_hits_the_hotspot() {
    let camera = Camera::default();
    let ray = camera.ray_from_ndc(Vec2::ZERO);
    assert_eq!(ray.origin, camera_eye_vec3());
    assert!(ray.dir.abs_diff_eq(-Vec3::Z, 1e-5));

    let hotspot = HotspotRegion::default();
    let t = hotspot.intersect(&ray).unwrap();
    assert!(ray.at(t).abs_diff_eq(hotspot_center_vec3(), 1e-4));
}

#[test]
fn corner_ray_misses_the_hotspot() {
    let camera = Camera::default();
    let hotspot = HotspotRegion::default();
    for ndc in [
        Vec2::new(1.0, 1.0),
        Vec2::new(-1.0, -1.0),
        Vec2::new(0.5, 0.0),
        Vec2::new(0.0, -0.5),
    ] {
        let ray = camera.ray_from_ndc(ndc);
        assert!(hotspot.intersect(&ray).is_none(), "unexpected hit at {:?}", ndc);
    }
}

#[test]
fn hidden_hotspot_is_still_pickable() {
    let camera = Camera::default();
    let mut hotspot = HotspotRegion::default();
    assert!(!hotspot.visible);
    let hits = raycast(&camera.ray_from_ndc(Vec2::ZERO), &hotspot, None);
    assert!(hits_hotspot(&hits));

    assert!(hotspot.toggle_visible());
    let hits = raycast(&camera.ray_from_ndc(Vec2::ZERO), &hotspot, None);
    assert!(hits_hotspot(&hits));
    assert!(!hotspot.toggle_visible());
}

#[test]
fn raycast_sorts_nearest_first() {
    let mut scene = SceneGraph::new();
    let mut near = Node::new(Some("near".to_string()));
    near.translation = Vec3::new(0.0, 3.0, 4.0);
    near.mesh = Some(0);
    let near = scene.add(near, None);
    let mut far = Node::new(Some("far".to_string()));
    far.translation = Vec3::new(0.0, 3.0, -5.0);
    far.mesh = Some(0);
    let far = scene.add(far, None);
    let bounds = [Bounds {
        center: Vec3::ZERO,
        radius: 0.5,
    }];

    let ray = Camera::default().ray_from_ndc(Vec2::ZERO);
    let hits = raycast(&ray, &HotspotRegion::default(), Some((&scene, &bounds)));
    let targets: Vec<PickTarget> = hits.iter().map(|h| h.target).collect();
    assert_eq!(
        targets,
        vec![PickTarget::Node(near), PickTarget::Hotspot, PickTarget::Node(far)]
    );
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[test]
fn raycast_scales_bounds_with_the_node() {
    let mut scene = SceneGraph::new();
    let mut node = Node::new(None);
    node.translation = Vec3::new(2.0, 3.0, 0.0);
    node.scale = Vec3::splat(3.0);
    node.mesh = Some(0);
    let h = scene.add(node, None);
    let bounds = [Bounds {
        center: Vec3::ZERO,
        radius: 1.0,
    }];
    let ray = Camera::default().ray_from_ndc(Vec2::ZERO);
    let hits = raycast(&ray, &HotspotRegion::default(), Some((&scene, &bounds)));
    assert!(hits.iter().any(|hit| hit.target == PickTarget::Node(h)));
}

#[test]
fn bounds_enclose_their_points() {
    let points = [[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]];
    let b = Bounds::from_points(&points);
    assert_eq!(b.center, Vec3::ZERO);
    for p in points {
        assert!(Vec3::from(p).distance(b.center) <= b.radius + 1e-6);
    }
    assert_eq!(Bounds::from_points(&[]), Bounds::default());
}

#[test]
fn ray_from_ndc_follows_aspect() {
    let mut camera = Camera::default();
    camera.set_aspect(2.0);
    let right = camera.ray_from_ndc(Vec2::new(1.0, 0.0));
    let up = camera.ray_from_ndc(Vec2::new(0.0, 1.0));
    // wider than tall: the horizontal edge ray leans further out
    assert!(right.dir.x / -right.dir.z > up.dir.y / -up.dir.z);

    camera.set_aspect(f32::NAN);
    assert_eq!(camera.aspect, 2.0);
    camera.set_aspect(0.0);
    assert_eq!(camera.aspect, 2.0);
}
