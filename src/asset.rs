//! glTF 2.0 / GLB decoding into the scene graph, mesh data and clips the rest
//! of the crate works with.

use crate::anim::{Channel, ChannelValues, Clip, Interpolation};
use crate::pick::Bounds;
use crate::scene::{Node, NodeHandle, SceneGraph};
use fnv::FnvHashMap;
use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::mesh::Mode;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset unavailable: {0}")]
    Unavailable(String),
    #[error("asset is empty")]
    Empty,
    #[error("gltf decode failed: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("required extension {0} is not supported")]
    UnsupportedExtension(String),
    #[error("asset has no scene")]
    NoScene,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshPrimitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub name: Option<String>,
    pub primitives: Vec<MeshPrimitive>,
    pub bounds: Bounds,
}

#[derive(Clone, Debug)]
pub struct LoadedAsset {
    pub scene: SceneGraph,
    pub meshes: Vec<MeshData>,
    pub clips: Vec<Arc<Clip>>,
}

impl LoadedAsset {
    pub fn mesh_bounds(&self) -> Vec<Bounds> {
        self.meshes.iter().map(|m| m.bounds).collect()
    }

    pub fn clip(&self, name: &str) -> Option<Arc<Clip>> {
        Clip::find_by_name(&self.clips, name).cloned()
    }
}

/// Decode a GLB or embedded-buffer glTF document.
pub fn load_glb(bytes: &[u8]) -> Result<LoadedAsset, AssetError> {
    if bytes.is_empty() {
        return Err(AssetError::Empty);
    }
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    if let Some(ext) = document.extensions_required().next() {
        return Err(AssetError::UnsupportedExtension(ext.to_owned()));
    }
    let buffers = gltf::import_buffers(&document, None, blob)?;
    let data = |b: gltf::Buffer<'_>| buffers.get(b.index()).map(|d| d.0.as_slice());

    let root = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::NoScene)?;

    let mut scene = SceneGraph::new();
    let mut handles: FnvHashMap<usize, NodeHandle> = FnvHashMap::default();
    for node in root.nodes() {
        add_node(&mut scene, node, None, &mut handles);
    }

    let meshes = document
        .meshes()
        .map(|mesh| {
            let primitives: Vec<MeshPrimitive> = mesh
                .primitives()
                .filter_map(|prim| {
                    if prim.mode() != Mode::Triangles {
                        log::debug!("[asset] skipping {:?} primitive in mesh {}", prim.mode(), mesh.index());
                        return None;
                    }
                    let reader = prim.reader(data);
                    let Some(positions) = reader.read_positions() else {
                        log::warn!("[asset] primitive without positions in mesh {}", mesh.index());
                        return None;
                    };
                    let positions: Vec<[f32; 3]> = positions.collect();
                    let indices: Vec<u32> = match reader.read_indices() {
                        Some(ix) => ix.into_u32().collect(),
                        None => (0..positions.len() as u32).collect(),
                    };
                    let normals = match reader.read_normals() {
                        Some(n) => n.collect(),
                        None => smooth_normals(&positions, &indices),
                    };
                    let base_color = prim.material().pbr_metallic_roughness().base_color_factor();
                    Some(MeshPrimitive {
                        positions,
                        normals,
                        indices,
                        base_color,
                    })
                })
                .collect();
            let all_points: Vec<[f32; 3]> = primitives
                .iter()
                .flat_map(|p| p.positions.iter().copied())
                .collect();
            MeshData {
                name: mesh.name().map(str::to_owned),
                bounds: Bounds::from_points(&all_points),
                primitives,
            }
        })
        .collect();

    let clips = document
        .animations()
        .map(|anim| {
            let channels = anim
                .channels()
                .filter_map(|channel| {
                    let node = *handles.get(&channel.target().node().index())?;
                    let reader = channel.reader(data);
                    let times: Vec<f32> = reader.read_inputs()?.collect();
                    let cubic = channel.sampler().interpolation()
                        == gltf::animation::Interpolation::CubicSpline;
                    let values = match reader.read_outputs()? {
                        ReadOutputs::Translations(it) => {
                            ChannelValues::Translation(spline_values(it.map(Vec3::from).collect(), cubic))
                        }
                        ReadOutputs::Rotations(r) => ChannelValues::Rotation(spline_values(
                            r.into_f32().map(Quat::from_array).collect(),
                            cubic,
                        )),
                        ReadOutputs::Scales(it) => {
                            ChannelValues::Scale(spline_values(it.map(Vec3::from).collect(), cubic))
                        }
                        ReadOutputs::MorphTargetWeights(_) => {
                            log::debug!("[asset] morph target channel ignored");
                            return None;
                        }
                    };
                    let interpolation = match channel.sampler().interpolation() {
                        gltf::animation::Interpolation::Step => Interpolation::Step,
                        _ => Interpolation::Linear,
                    };
                    Some(Channel {
                        node,
                        times,
                        values,
                        interpolation,
                    })
                })
                .collect();
            Arc::new(Clip::new(anim.name().unwrap_or_default(), channels))
        })
        .collect();

    Ok(LoadedAsset {
        scene,
        meshes,
        clips,
    })
}

fn add_node(
    scene: &mut SceneGraph,
    src: gltf::Node<'_>,
    parent: Option<NodeHandle>,
    handles: &mut FnvHashMap<usize, NodeHandle>,
) {
    let (t, r, s) = src.transform().decomposed();
    let mut node = Node::new(src.name().map(str::to_owned));
    node.translation = Vec3::from(t);
    node.rotation = Quat::from_array(r);
    node.scale = Vec3::from(s);
    node.mesh = src.mesh().map(|m| m.index());
    let handle = scene.add(node, parent);
    handles.insert(src.index(), handle);
    for child in src.children() {
        add_node(scene, child, Some(handle), handles);
    }
}

/// Cubic-spline outputs come as (in-tangent, value, out-tangent) triples;
/// keep only the values.
fn spline_values<T: Copy>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if !cubic {
        return values;
    }
    values.chunks(3).filter_map(|c| c.get(1).copied()).collect()
}

fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (
            Vec3::from(positions[a]),
            Vec3::from(positions[b]),
            Vec3::from(positions[c]),
        );
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Z).to_array())
        .collect()
}
