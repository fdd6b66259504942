//! One-shot keyframe clips and the blink trigger built on top of them.

use crate::scene::{NodeHandle, SceneGraph};
use fnv::FnvHashMap;
use glam::{Quat, Vec3};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

impl ChannelValues {
    pub fn property(&self) -> Property {
        match self {
            ChannelValues::Translation(_) => Property::Translation,
            ChannelValues::Rotation(_) => Property::Rotation,
            ChannelValues::Scale(_) => Property::Scale,
        }
    }

    fn len(&self) -> usize {
        match self {
            ChannelValues::Translation(v) | ChannelValues::Scale(v) => v.len(),
            ChannelValues::Rotation(v) => v.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub node: NodeHandle,
    pub times: Vec<f32>,
    pub values: ChannelValues,
    pub interpolation: Interpolation,
}

impl Channel {
    /// Keyframe pair bracketing `t` and the blend factor between them.
    fn locate(&self, t: f32) -> (usize, usize, f32) {
        let n = self.times.len().min(self.values.len());
        if n == 0 {
            return (0, 0, 0.0);
        }
        if t <= self.times[0] {
            return (0, 0, 0.0);
        }
        if t >= self.times[n - 1] {
            return (n - 1, n - 1, 0.0);
        }
        let hi = self.times[..n].partition_point(|&k| k <= t);
        let lo = hi - 1;
        let span = self.times[hi] - self.times[lo];
        let f = if span > 0.0 {
            (t - self.times[lo]) / span
        } else {
            0.0
        };
        match self.interpolation {
            Interpolation::Step => (lo, lo, 0.0),
            Interpolation::Linear => (lo, hi, f),
        }
    }

    /// Write the sampled value at `t` into the target node.
    pub fn apply(&self, t: f32, scene: &mut SceneGraph) {
        if self.values.len() == 0 || self.times.is_empty() {
            return;
        }
        let (a, b, f) = self.locate(t);
        let node = scene.node_mut(self.node);
        match &self.values {
            ChannelValues::Translation(v) => node.translation = v[a].lerp(v[b], f),
            ChannelValues::Rotation(v) => node.rotation = v[a].slerp(v[b], f).normalize(),
            ChannelValues::Scale(v) => node.scale = v[a].lerp(v[b], f),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl Clip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0_f32, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    pub fn find_by_name<'a>(clips: &'a [Arc<Clip>], name: &str) -> Option<&'a Arc<Clip>> {
        clips.iter().find(|c| c.name == name)
    }
}

/// Play/stop capability shared by every animation the scene can fire.
pub trait AnimationHandle {
    fn play(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    /// Local playback time in seconds.
    fn time(&self) -> f32;
}

/// Node property a channel drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    Translation,
    Rotation,
    Scale,
}

/// A single property value captured before playback.
#[derive(Clone, Copy, Debug, PartialEq)]
enum SavedValue {
    Translation(Vec3),
    Rotation(Quat),
    Scale(Vec3),
}

/// Plays a clip once. Finishing or stopping restores the properties its
/// channels drive to the values they had when the action was created; other
/// properties of the same nodes are left alone.
#[derive(Clone, Debug)]
pub struct ClipAction {
    clip: Arc<Clip>,
    rest_pose: FnvHashMap<(NodeHandle, Property), SavedValue>,
    time: f32,
    playing: bool,
    needs_restore: bool,
}

impl ClipAction {
    pub fn new(clip: Arc<Clip>, scene: &SceneGraph) -> Self {
        let rest_pose = clip
            .channels
            .iter()
            .map(|c| {
                let n = scene.node(c.node);
                let property = c.values.property();
                let saved = match property {
                    Property::Translation => SavedValue::Translation(n.translation),
                    Property::Rotation => SavedValue::Rotation(n.rotation),
                    Property::Scale => SavedValue::Scale(n.scale),
                };
                ((c.node, property), saved)
            })
            .collect();
        Self {
            clip,
            rest_pose,
            time: 0.0,
            playing: false,
            needs_restore: false,
        }
    }

    #[inline]
    pub fn clip(&self) -> &Clip {
        &self.clip
    }

    fn restore(&mut self, scene: &mut SceneGraph) {
        for (&(h, _), saved) in &self.rest_pose {
            let node = scene.node_mut(h);
            match *saved {
                SavedValue::Translation(v) => node.translation = v,
                SavedValue::Rotation(q) => node.rotation = q,
                SavedValue::Scale(v) => node.scale = v,
            }
        }
        self.needs_restore = false;
    }

    /// Advance by `dt` and write the sampled pose into `scene`.
    pub fn update(&mut self, dt: Duration, scene: &mut SceneGraph) {
        if !self.playing {
            if self.needs_restore {
                self.restore(scene);
            }
            return;
        }
        self.time += dt.as_secs_f32();
        if self.time >= self.clip.duration {
            self.time = self.clip.duration;
            self.playing = false;
            self.restore(scene);
            return;
        }
        for channel in &self.clip.channels {
            channel.apply(self.time, scene);
        }
    }
}

impl AnimationHandle for ClipAction {
    fn play(&mut self) {
        if !self.playing {
            self.time = 0.0;
            self.playing = true;
            self.needs_restore = true;
        }
    }

    fn stop(&mut self) {
        // pose is put back on the next update
        self.playing = false;
        self.time = 0.0;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn time(&self) -> f32 {
        self.time
    }
}

/// The lid-close and cover-eye actions, always fired together.
#[derive(Clone, Debug)]
pub struct BlinkTrigger<H: AnimationHandle> {
    pub lid: H,
    pub cover: H,
}

impl<H: AnimationHandle> BlinkTrigger<H> {
    pub fn new(lid: H, cover: H) -> Self {
        Self { lid, cover }
    }

    /// Restart both animations from time zero, discarding any progress.
    pub fn fire(&mut self) {
        self.lid.stop();
        self.cover.stop();
        self.lid.play();
        self.cover.play();
    }

    pub fn is_playing(&self) -> bool {
        self.lid.is_playing() || self.cover.is_playing()
    }
}

impl BlinkTrigger<ClipAction> {
    pub fn update(&mut self, dt: Duration, scene: &mut SceneGraph) {
        self.lid.update(dt, scene);
        self.cover.update(dt, scene);
    }
}
