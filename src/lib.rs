//! Platform-neutral core of the watchful-eye scene: pointer tracking, pupil
//! steering and easing, hotspot picking, one-shot clip playback and glTF
//! decoding. The web and native front-ends drive [`SceneState`] from their
//! event loops and hand it to the renderer each frame.

pub mod anim;
pub mod asset;
pub mod camera;
pub mod constants;
pub mod eye;
pub mod pick;
pub mod pointer;
pub mod scene;
pub mod state;

#[cfg(feature = "render")]
pub mod render;

pub use anim::*;
pub use asset::*;
pub use camera::*;
pub use constants::*;
pub use eye::*;
pub use pick::*;
pub use pointer::*;
pub use scene::*;
pub use state::*;

// Shaders bundled as string constants
#[cfg(feature = "render")]
pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
