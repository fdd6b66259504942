use glam::Vec3;

// Shared tuning constants used by the core and both front-ends.

// Steering: screen offsets (px from viewport center) mapped to pupil deflection
pub const STEER_X_THRESHOLD_PX: f32 = 640.0; // beyond this the x deflection saturates
pub const STEER_X_MAX: f32 = 4.0 / 15.0; // max world-space x deflection
pub const STEER_X_DIVISOR: f32 = 2400.0; // px per world unit in the linear region
pub const STEER_Y_THRESHOLD_PX: f32 = 300.0;
pub const STEER_Y_MAX: f32 = 3.0 / 10.0;
pub const STEER_Y_DIVISOR: f32 = 1000.0;

// Easing back to rest after the pointer leaves
pub const EASE_FRAMES: u32 = 10;
pub const EASE_SNAP_SLACK: f32 = 1.0e-3; // fraction of a step tolerated as rounding noise

// Hotspot disc used for click picking
pub const HOTSPOT_RADIUS: f32 = 0.63;
pub const HOTSPOT_CENTER: [f32; 3] = [0.0, 3.0, 1.0];
pub const HOTSPOT_SEGMENTS: u32 = 32;
pub const HOTSPOT_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

// Camera
pub const CAMERA_EYE: [f32; 3] = [0.0, 3.0, 8.0];
pub const CAMERA_FOVY_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;

// Lights: front, top, bottom
pub const LIGHT_POSITIONS: [[f32; 3]; 3] = [[0.0, 2.0, 20.0], [0.0, 20.0, 0.0], [0.0, -20.0, 0.0]];
pub const LIGHT_INTENSITY: f32 = 1.5;

// Surface sizing
pub const MAX_PIXEL_RATIO: f64 = 2.0;

// Asset layout
pub const ASSET_URL: &str = "/objectLoad/logo.glb";
pub const PUPIL_NODE: &str = "Pupil";
pub const EYE_RING_NODE: &str = "EyeRing";
pub const EYE_COVER_NODE: &str = "EyeCover";
pub const LID_CLIP: &str = "EyelidAction";
pub const COVER_CLIP: &str = "EyeCoverAction";

// Draw ordering for the eye parts (lower draws first)
pub const EYE_COVER_RENDER_ORDER: i32 = 1;
pub const EYE_PARTS_RENDER_ORDER: i32 = 2;

#[inline]
pub fn hotspot_center_vec3() -> Vec3 {
    Vec3::from(HOTSPOT_CENTER)
}

#[inline]
pub fn camera_eye_vec3() -> Vec3 {
    Vec3::from(CAMERA_EYE)
}
