//! Pointer tracking and the saturating steering map.
//!
//! Two coordinate spaces are recorded for every pointer move: the offset from
//! the viewport center in CSS pixels (drives steering) and normalized device
//! coordinates (drives picking).

use crate::constants::*;
use glam::Vec2;

/// Logical viewport size in CSS/logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    #[inline]
    pub fn half(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Map a client-space point to NDC with +y up.
    #[inline]
    pub fn to_ndc(&self, client: Vec2) -> Vec2 {
        Vec2::new(
            client.x / self.width * 2.0 - 1.0,
            -(client.y / self.height) * 2.0 + 1.0,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub present: bool,
    /// Offset from the viewport center, +y down.
    pub screen: Vec2,
    pub ndc: Vec2,
}

impl Default for PointerState {
    fn default() -> Self {
        // Present at the center until told otherwise, so the pupil sits at rest.
        Self {
            present: true,
            screen: Vec2::ZERO,
            ndc: Vec2::ZERO,
        }
    }
}

impl PointerState {
    pub fn on_move(&mut self, client: Vec2, viewport: &Viewport) {
        self.present = true;
        self.screen = client - viewport.half();
        self.ndc = viewport.to_ndc(client);
    }

    /// Only refreshes the picking coordinates; presence is untouched.
    pub fn on_down(&mut self, client: Vec2, viewport: &Viewport) {
        self.ndc = viewport.to_ndc(client);
    }

    /// Returns true when this call moved the pointer from present to absent.
    pub fn on_leave(&mut self) -> bool {
        std::mem::replace(&mut self.present, false)
    }
}

/// Thresholds and divisors of the steering map. The defaults are tuned for one
/// viewport size and are deliberately not rescaled on resize.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringParams {
    pub x_threshold_px: f32,
    pub x_max: f32,
    pub x_divisor: f32,
    pub y_threshold_px: f32,
    pub y_max: f32,
    pub y_divisor: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            x_threshold_px: STEER_X_THRESHOLD_PX,
            x_max: STEER_X_MAX,
            x_divisor: STEER_X_DIVISOR,
            y_threshold_px: STEER_Y_THRESHOLD_PX,
            y_max: STEER_Y_MAX,
            y_divisor: STEER_Y_DIVISOR,
        }
    }
}

#[inline]
fn steer_axis(offset_px: f32, threshold_px: f32, max: f32, divisor: f32) -> f32 {
    if offset_px > threshold_px {
        max
    } else if offset_px < -threshold_px {
        -max
    } else {
        offset_px / divisor
    }
}

/// Pupil deflection from rest for a pointer at `screen` (center-relative px,
/// +y down).
///
/// Screen y grows downwards while world y grows upwards, hence the inverted
/// vertical axis.
#[inline]
pub fn steer_offset(screen: Vec2, params: &SteeringParams) -> Vec2 {
    Vec2::new(
        steer_axis(screen.x, params.x_threshold_px, params.x_max, params.x_divisor),
        steer_axis(-screen.y, params.y_threshold_px, params.y_max, params.y_divisor),
    )
}

/// Absolute pupil position for a pointer at `screen`.
#[inline]
pub fn steer_target(screen: Vec2, rest: Vec2, params: &SteeringParams) -> Vec2 {
    rest + steer_offset(screen, params)
}
