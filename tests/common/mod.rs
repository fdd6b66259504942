// Shared glTF fixture: an "Eye" root with Pupil, EyeRing (one triangle) and
// EyeCover children, plus the two blink clips targeting EyeCover.
#![allow(dead_code)]

use eye_core::*;

// times [0, 0.5] | translations [0,0,0] [0,1,0] | triangle (-1,-1,0) (1,-1,0) (0,1,0)
const BUFFER_B64: &str = "AAAAAAAAAD8AAAAAAAAAAAAAAAAAAAAAAACAPwAAAAAAAIC/AACAvwAAAAAAAIA/AACAvwAAAAAAAAAAAACAPwAAAAA=";

pub const PUPIL_TRANSLATION: [f32; 3] = [0.1, 3.0, 0.9];
pub const COVER_TRANSLATION: [f32; 3] = [0.0, 3.0, 0.8];

fn animations(with_blink: bool) -> &'static str {
    if with_blink {
        r#"[
          {"name": "EyelidAction",
           "channels": [{"sampler": 0, "target": {"node": 3, "path": "translation"}}],
           "samplers": [{"input": 0, "output": 1, "interpolation": "LINEAR"}]},
          {"name": "EyeCoverAction",
           "channels": [{"sampler": 0, "target": {"node": 3, "path": "scale"}}],
           "samplers": [{"input": 0, "output": 1, "interpolation": "STEP"}]}
        ]"#
    } else {
        r#"[
          {"name": "EyelidAction",
           "channels": [{"sampler": 0, "target": {"node": 3, "path": "translation"}}],
           "samplers": [{"input": 0, "output": 1, "interpolation": "LINEAR"}]}
        ]"#
    }
}

pub fn eye_gltf_json(with_blink: bool) -> String {
    format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "scene": 0,
  "scenes": [{{"nodes": [0]}}],
  "nodes": [
    {{"name": "Eye", "children": [1, 2, 3]}},
    {{"name": "Pupil", "translation": [{px}, {py}, {pz}]}},
    {{"name": "EyeRing", "mesh": 0}},
    {{"name": "EyeCover", "translation": [{cx}, {cy}, {cz}]}}
  ],
  "meshes": [{{"name": "ring", "primitives": [{{"attributes": {{"POSITION": 2}}}}]}}],
  "buffers": [{{"byteLength": 68, "uri": "data:application/octet-stream;base64,{b64}"}}],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": 8}},
    {{"buffer": 0, "byteOffset": 8, "byteLength": 24}},
    {{"buffer": 0, "byteOffset": 32, "byteLength": 36}}
  ],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [0.5]}},
    {{"bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3"}},
    {{"bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC3", "min": [-1.0, -1.0, 0.0], "max": [1.0, 1.0, 0.0]}}
  ],
  "animations": {anims}
}}"#,
        px = PUPIL_TRANSLATION[0],
        py = PUPIL_TRANSLATION[1],
        pz = PUPIL_TRANSLATION[2],
        cx = COVER_TRANSLATION[0],
        cy = COVER_TRANSLATION[1],
        cz = COVER_TRANSLATION[2],
        b64 = BUFFER_B64,
        anims = animations(with_blink),
    )
}

pub fn eye_asset() -> LoadedAsset {
    load_glb(eye_gltf_json(true).as_bytes()).expect("fixture decodes")
}

pub fn ready_state() -> SceneState {
    let mut state = SceneState::new(Viewport::new(1280.0, 720.0));
    state.on_asset_loaded(Ok(eye_asset()));
    assert!(state.readiness().is_ready());
    state
}
