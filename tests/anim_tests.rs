// Host-side tests for clip sampling, one-shot playback and the blink trigger.

use eye_core::*;
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

fn one_node_scene() -> (SceneGraph, NodeHandle) {
    let mut scene = SceneGraph::new();
    let mut node = Node::new(Some("EyeCover".to_string()));
    node.translation = Vec3::new(0.0, 3.0, 0.8);
    let h = scene.add(node, None);
    (scene, h)
}

fn lift_clip(node: NodeHandle) -> Arc<Clip> {
    Arc::new(Clip::new(
        "EyelidAction",
        vec![Channel {
            node,
            times: vec![0.0, 1.0],
            values: ChannelValues::Translation(vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)]),
            interpolation: Interpolation::Linear,
        }],
    ))
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn clip_duration_is_the_last_keyframe() {
    let (_, h) = one_node_scene();
    let clip = Clip::new(
        "c",
        vec![
            Channel {
                node: h,
                times: vec![0.0, 0.4],
                values: ChannelValues::Scale(vec![Vec3::ONE, Vec3::ZERO]),
                interpolation: Interpolation::Step,
            },
            Channel {
                node: h,
                times: vec![0.0, 1.5],
                values: ChannelValues::Translation(vec![Vec3::ZERO, Vec3::ONE]),
                interpolation: Interpolation::Linear,
            },
        ],
    );
    assert_eq!(clip.duration, 1.5);
}

#[test]
fn linear_channel_interpolates() {
    let (mut scene, h) = one_node_scene();
    let clip = lift_clip(h);
    clip.channels[0].apply(0.25, &mut scene);
    assert!(scene.node(h).translation.abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6));
    // clamped outside the keyframe range
    clip.channels[0].apply(-1.0, &mut scene);
    assert_eq!(scene.node(h).translation, Vec3::ZERO);
    clip.channels[0].apply(9.0, &mut scene);
    assert_eq!(scene.node(h).translation, Vec3::new(0.0, 2.0, 0.0));
}

#[test]
fn step_channel_holds_the_previous_key() {
    let (mut scene, h) = one_node_scene();
    let channel = Channel {
        node: h,
        times: vec![0.0, 0.5, 1.0],
        values: ChannelValues::Scale(vec![Vec3::ONE, Vec3::splat(0.5), Vec3::ZERO]),
        interpolation: Interpolation::Step,
    };
    channel.apply(0.49, &mut scene);
    assert_eq!(scene.node(h).scale, Vec3::ONE);
    channel.apply(0.5, &mut scene);
    assert_eq!(scene.node(h).scale, Vec3::splat(0.5));
    channel.apply(0.99, &mut scene);
    assert_eq!(scene.node(h).scale, Vec3::splat(0.5));
}

#[test]
fn clip_action_is_idle_until_played() {
    let (mut scene, h) = one_node_scene();
    let mut action = ClipAction::new(lift_clip(h), &scene);
    assert!(!action.is_playing());
    action.update(ms(500), &mut scene);
    assert_eq!(action.time(), 0.0);
    assert_eq!(scene.node(h).translation, Vec3::new(0.0, 3.0, 0.8));
}

#[test]
fn clip_action_plays_once_then_restores() {
    let (mut scene, h) = one_node_scene();
    let rest = scene.node(h).translation;
    let mut action = ClipAction::new(lift_clip(h), &scene);
    action.play();
    action.update(ms(500), &mut scene);
    assert!(action.is_playing());
    assert!(scene.node(h).translation.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));

    action.update(ms(600), &mut scene);
    assert!(!action.is_playing());
    assert_eq!(scene.node(h).translation, rest);

    // no loop
    action.update(ms(500), &mut scene);
    assert_eq!(scene.node(h).translation, rest);
}

#[test]
fn stopping_restores_on_next_update() {
    let (mut scene, h) = one_node_scene();
    let rest = scene.node(h).translation;
    let mut action = ClipAction::new(lift_clip(h), &scene);
    action.play();
    action.update(ms(300), &mut scene);
    assert_ne!(scene.node(h).translation, rest);

    action.stop();
    assert!(!action.is_playing());
    assert_eq!(action.time(), 0.0);
    action.update(ms(16), &mut scene);
    assert_eq!(scene.node(h).translation, rest);
}

#[test]
fn play_while_playing_does_not_rewind() {
    let (mut scene, h) = one_node_scene();
    let mut action = ClipAction::new(lift_clip(h), &scene);
    action.play();
    action.update(ms(400), &mut scene);
    action.play();
    assert!((action.time() - 0.4).abs() < 1e-6);
}

#[derive(Clone)]
struct Recorder {
    name: &'static str,
    log: Rc<RefCell<Vec<String>>>,
    playing: bool,
    time: f32,
}

impl Recorder {
    fn new(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            name,
            log: log.clone(),
            playing: false,
            time: 0.0,
        }
    }
}

impl AnimationHandle for Recorder {
    fn play(&mut self) {
        self.log.borrow_mut().push(format!("{}.play", self.name));
        self.playing = true;
    }

    fn stop(&mut self) {
        self.log.borrow_mut().push(format!("{}.stop", self.name));
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

#[test]
fn blink_stops_both_before_playing_both() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut blink = BlinkTrigger::new(Recorder::new("lid", &log), Recorder::new("cover", &log));
    assert!(!blink.is_playing());
    blink.fire();
    assert_eq!(
        *log.borrow(),
        vec!["lid.stop", "cover.stop", "lid.play", "cover.play"]
    );
    assert!(blink.lid.is_playing() && blink.cover.is_playing());
}

#[test]
fn refiring_restarts_from_zero() {
    let (mut scene, h) = one_node_scene();
    let clip = lift_clip(h);
    let mut blink = BlinkTrigger::new(
        ClipAction::new(clip.clone(), &scene),
        ClipAction::new(clip, &scene),
    );
    blink.fire();
    blink.update(ms(700), &mut scene);
    assert!((blink.lid.time() - 0.7).abs() < 1e-6);

    blink.fire();
    assert_eq!(blink.lid.time(), 0.0);
    assert_eq!(blink.cover.time(), 0.0);
    assert!(blink.is_playing());

    blink.update(ms(1100), &mut scene);
    assert!(!blink.is_playing());
    assert_eq!(scene.node(h).translation, Vec3::new(0.0, 3.0, 0.8));
}

#[test]
fn find_clip_by_name() {
    let (_, h) = one_node_scene();
    let clips = vec![lift_clip(h), Arc::new(Clip::new("EyeCoverAction", Vec::new()))];
    assert_eq!(
        Clip::find_by_name(&clips, "EyeCoverAction").map(|c| c.name.as_str()),
        Some("EyeCoverAction")
    );
    assert!(Clip::find_by_name(&clips, "Missing").is_none());
}

#[test]
fn shorter_clip_restores_only_its_own_property() {
    let (mut scene, h) = one_node_scene();
    let rest_translation = scene.node(h).translation;
    let squash = Arc::new(Clip::new(
        "EyeCoverAction",
        vec![Channel {
            node: h,
            times: vec![0.0, 0.5],
            values: ChannelValues::Scale(vec![Vec3::ONE, Vec3::splat(0.2)]),
            interpolation: Interpolation::Linear,
        }],
    ));
    let mut blink = BlinkTrigger::new(
        ClipAction::new(lift_clip(h), &scene),
        ClipAction::new(squash, &scene),
    );
    blink.fire();

    blink.update(ms(400), &mut scene);
    assert!(scene.node(h).translation.abs_diff_eq(Vec3::new(0.0, 0.8, 0.0), 1e-6));

    // the scale clip ends here; the longer translation clip keeps going
    blink.update(ms(200), &mut scene);
    assert!(!blink.cover.is_playing());
    assert!(blink.lid.is_playing());
    assert_eq!(scene.node(h).scale, Vec3::ONE);
    assert!(scene.node(h).translation.abs_diff_eq(Vec3::new(0.0, 1.2, 0.0), 1e-6));

    blink.update(ms(16), &mut scene);
    assert!(scene.node(h).translation.y > 1.2);

    blink.update(ms(500), &mut scene);
    assert!(!blink.is_playing());
    assert_eq!(scene.node(h).translation, rest_translation);
    assert_eq!(scene.node(h).scale, Vec3::ONE);
}

#[test]
fn restore_leaves_unanimated_properties_alone() {
    let (mut scene, h) = one_node_scene();
    let mut action = ClipAction::new(lift_clip(h), &scene);
    action.play();
    action.update(ms(100), &mut scene);
    // something else edits the scale mid-clip
    scene.node_mut(h).scale = Vec3::splat(2.0);
    action.stop();
    action.update(ms(16), &mut scene);
    assert_eq!(scene.node(h).translation, Vec3::new(0.0, 3.0, 0.8));
    assert_eq!(scene.node(h).scale, Vec3::splat(2.0));
}
