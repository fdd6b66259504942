//! Explicit scene state owned by the frame loop. Event handlers and the
//! per-frame tick all go through `SceneState`; nothing is ambient.

use crate::anim::{AnimationHandle, BlinkTrigger, ClipAction};
use crate::asset::{AssetError, LoadedAsset};
use crate::camera::Camera;
use crate::constants::{COVER_CLIP, LID_CLIP};
use crate::eye::{EyeModel, TrackingMode};
use crate::pick::{hits_hotspot, raycast, Bounds, Hits, HotspotRegion};
use crate::pointer::{PointerState, SteeringParams, Viewport};
use crate::scene::{apply_role_materials, NodeRole, RoleTable, SceneGraph};
use glam::Vec2;
use std::time::Duration;

/// Everything that only exists once the model has loaded.
#[derive(Clone, Debug)]
pub struct EyeRig {
    pub asset: LoadedAsset,
    pub roles: RoleTable,
    pub bounds: Vec<Bounds>,
    /// None when the model has no Pupil node.
    pub eye: Option<EyeModel>,
    /// None unless both blink clips were found.
    pub blink: Option<BlinkTrigger<ClipAction>>,
}

impl EyeRig {
    pub fn new(mut asset: LoadedAsset) -> Self {
        let roles = RoleTable::build(&asset.scene);
        for role in roles.missing() {
            log::warn!("[state] model has no {:?} node", role.node_name());
        }
        apply_role_materials(&mut asset.scene, &roles);

        let eye = roles
            .get(NodeRole::Pupil)
            .ok()
            .map(|pupil| EyeModel::new(pupil, &asset.scene));

        let blink = match (asset.clip(LID_CLIP), asset.clip(COVER_CLIP)) {
            (Some(lid), Some(cover)) => Some(BlinkTrigger::new(
                ClipAction::new(lid, &asset.scene),
                ClipAction::new(cover, &asset.scene),
            )),
            (lid, cover) => {
                log::warn!(
                    "[state] blink disabled (lid clip: {}, cover clip: {})",
                    lid.is_some(),
                    cover.is_some()
                );
                None
            }
        };

        Self {
            bounds: asset.mesh_bounds(),
            asset,
            roles,
            eye,
            blink,
        }
    }

    #[inline]
    pub fn scene(&self) -> &SceneGraph {
        &self.asset.scene
    }
}

#[derive(Clone, Debug)]
pub enum Readiness {
    NotLoaded,
    Ready(Box<EyeRig>),
    Failed(String),
}

impl Readiness {
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready(_))
    }
}

#[derive(Clone, Debug)]
pub struct SceneState {
    pub pointer: PointerState,
    pub viewport: Viewport,
    pub camera: Camera,
    pub hotspot: HotspotRegion,
    pub steering: SteeringParams,
    readiness: Readiness,
}

impl SceneState {
    pub fn new(viewport: Viewport) -> Self {
        let mut camera = Camera::default();
        camera.set_aspect(viewport.aspect());
        Self {
            pointer: PointerState::default(),
            viewport,
            camera,
            hotspot: HotspotRegion::default(),
            steering: SteeringParams::default(),
            readiness: Readiness::NotLoaded,
        }
    }

    #[inline]
    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    pub fn rig(&self) -> Option<&EyeRig> {
        match &self.readiness {
            Readiness::Ready(rig) => Some(&**rig),
            _ => None,
        }
    }

    pub fn rig_mut(&mut self) -> Option<&mut EyeRig> {
        match &mut self.readiness {
            Readiness::Ready(rig) => Some(&mut **rig),
            _ => None,
        }
    }

    #[inline]
    pub fn mode(&self) -> TrackingMode {
        TrackingMode::from_presence(self.pointer.present)
    }

    /// The single NotLoaded -> Ready | Failed transition.
    pub fn on_asset_loaded(&mut self, result: Result<LoadedAsset, AssetError>) {
        if !matches!(self.readiness, Readiness::NotLoaded) {
            log::warn!("[state] asset result ignored, already settled");
            return;
        }
        self.readiness = match result {
            Ok(asset) => {
                log::info!(
                    "[state] model ready: nodes={} meshes={} clips={}",
                    asset.scene.len(),
                    asset.meshes.len(),
                    asset.clips.len()
                );
                Readiness::Ready(Box::new(EyeRig::new(asset)))
            }
            Err(e) => {
                log::error!("[state] model load failed: {}", e);
                Readiness::Failed(e.to_string())
            }
        };
    }

    pub fn on_pointer_move(&mut self, client: Vec2) {
        self.pointer.on_move(client, &self.viewport);
    }

    pub fn on_pointer_leave(&mut self) {
        if !self.pointer.on_leave() {
            return;
        }
        if let Some(eye) = self.rig_mut().and_then(|r| r.eye.as_mut()) {
            eye.begin_return();
        }
    }

    /// Pick at `client`; returns true if the blink was fired.
    pub fn on_pointer_down(&mut self, client: Vec2) -> bool {
        self.pointer.on_down(client, &self.viewport);
        let hits = self.pick();
        if !hits_hotspot(&hits) {
            return false;
        }
        match self.rig_mut().and_then(|r| r.blink.as_mut()) {
            Some(blink) => {
                blink.fire();
                log::debug!("[state] blink fired");
                true
            }
            None => false,
        }
    }

    /// Intersections under the last known pointer position.
    pub fn pick(&self) -> Hits {
        let ray = self.camera.ray_from_ndc(self.pointer.ndc);
        let scene = self.rig().map(|r| (r.scene(), r.bounds.as_slice()));
        raycast(&ray, &self.hotspot, scene)
    }

    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        self.camera.set_aspect(self.viewport.aspect());
    }

    pub fn toggle_hotspot_visible(&mut self) -> bool {
        let visible = self.hotspot.toggle_visible();
        log::info!("[state] hotspot visible: {}", visible);
        visible
    }

    /// Per-frame update: pupil tracking, animation playback, pose write-back.
    pub fn tick(&mut self, dt: Duration) {
        let pointer = self.pointer;
        let steering = self.steering;
        let Readiness::Ready(rig) = &mut self.readiness else {
            return;
        };
        let rig: &mut EyeRig = rig;
        if let Some(eye) = rig.eye.as_mut() {
            match TrackingMode::from_presence(pointer.present) {
                TrackingMode::Steering => eye.steer(pointer.screen, &steering),
                TrackingMode::Returning => eye.ease_toward_rest(),
            }
        }
        if let Some(blink) = rig.blink.as_mut() {
            blink.update(dt, &mut rig.asset.scene);
        }
        if let Some(eye) = rig.eye.as_ref() {
            eye.apply_to(&mut rig.asset.scene);
        }
    }

    pub fn blink_playing(&self) -> bool {
        self.rig()
            .and_then(|r| r.blink.as_ref())
            .map(|b| b.lid.is_playing() && b.cover.is_playing())
            .unwrap_or(false)
    }
}
