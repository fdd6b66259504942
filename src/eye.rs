//! Pupil position ownership: steering while the pointer is present, easing back
//! to rest once it leaves.

use crate::constants::{EASE_FRAMES, EASE_SNAP_SLACK};
use crate::pointer::{steer_offset, SteeringParams};
use crate::scene::{NodeHandle, SceneGraph};
use glam::Vec2;

/// Rest position of the pupil, captured once at load time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeGeometry {
    pub rest: Vec2,
}

/// Per-axis displacement applied each frame while returning to rest.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EaseStep {
    pub x: f32,
    pub y: f32,
}

impl EaseStep {
    pub fn from_displacement(current: Vec2, rest: Vec2, frames: u32) -> Self {
        Self::from_offset(current - rest, frames)
    }

    pub fn from_offset(offset: Vec2, frames: u32) -> Self {
        let frames = frames.max(1) as f32;
        Self {
            x: offset.x.abs() / frames,
            y: offset.y.abs() / frames,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingMode {
    Steering,
    Returning,
}

impl TrackingMode {
    #[inline]
    pub fn from_presence(present: bool) -> Self {
        if present {
            TrackingMode::Steering
        } else {
            TrackingMode::Returning
        }
    }
}

/// One axis of the return, on the offset from rest: step towards zero,
/// snapping once within a step.
#[inline]
fn ease_axis(offset: f32, step: f32) -> f32 {
    let band = step * (1.0 + EASE_SNAP_SLACK);
    if offset > band {
        offset - step
    } else if offset < -band {
        offset + step
    } else {
        0.0
    }
}

/// Owns the pupil position. It is kept as an offset from rest so that the
/// return converges on rest exactly, whatever the magnitude of rest itself.
#[derive(Clone, Debug)]
pub struct EyeModel {
    pupil: NodeHandle,
    geometry: EyeGeometry,
    offset: Vec2,
    ease: EaseStep,
}

impl EyeModel {
    /// Capture the rest position from the pupil node's current translation.
    pub fn new(pupil: NodeHandle, scene: &SceneGraph) -> Self {
        let t = scene.node(pupil).translation;
        Self {
            pupil,
            geometry: EyeGeometry {
                rest: Vec2::new(t.x, t.y),
            },
            offset: Vec2::ZERO,
            ease: EaseStep::default(),
        }
    }

    #[inline]
    pub fn pupil(&self) -> NodeHandle {
        self.pupil
    }

    #[inline]
    pub fn geometry(&self) -> EyeGeometry {
        self.geometry
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.geometry.rest + self.offset
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    #[inline]
    pub fn ease_step(&self) -> EaseStep {
        self.ease
    }

    #[inline]
    pub fn at_rest(&self) -> bool {
        self.offset == Vec2::ZERO
    }

    /// Write the steered position directly, no smoothing.
    pub fn steer(&mut self, screen: Vec2, params: &SteeringParams) {
        self.offset = steer_offset(screen, params);
    }

    /// Size the ease step from the current displacement. Called on the
    /// steering to returning transition only.
    pub fn begin_return(&mut self) {
        self.ease = EaseStep::from_offset(self.offset, EASE_FRAMES);
    }

    pub fn ease_toward_rest(&mut self) {
        self.offset.x = ease_axis(self.offset.x, self.ease.x);
        self.offset.y = ease_axis(self.offset.y, self.ease.y);
    }

    /// Copy the pupil position into the scene graph, keeping its z.
    pub fn apply_to(&self, scene: &mut SceneGraph) {
        let position = self.position();
        let node = scene.node_mut(self.pupil);
        node.translation.x = position.x;
        node.translation.y = position.y;
    }
}
