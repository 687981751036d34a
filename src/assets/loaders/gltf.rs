use std::fs;
use std::path::Path;

use base64::Engine;
use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::raw::{AnimationChannel, ImportedAnimation, Keyframe};
use crate::animation::tracks::InterpolationMode;
use crate::assets::import::{AssetBundle, AssetImporter, ImportedNode, LoadFlags};
use crate::errors::{Result, RigError};
use crate::scene::skinning::MeshBoneTable;
use crate::scene::transform::Transform;

// ============================================================================
// Importer
// ============================================================================

/// glTF 2.0 importer (`.gltf` with external or `data:` buffers, and `.glb`).
///
/// - Hierarchy: the default scene's root nodes (every node keeps its local
///   TRS). Unnamed nodes are called `Node_{index}`.
/// - Meshes: one bone table per node that has both a mesh and a skin; slot
///   order is the skin's joint order.
/// - Animations: key times are already seconds, so the tick rate is `1.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfImporter;

impl GltfImporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Imports a document held in memory.
    ///
    /// External buffer URIs are resolved against `base_dir` (the current
    /// directory when `None`).
    pub fn import_slice(
        &self,
        bytes: &[u8],
        base_dir: Option<&Path>,
        source: &str,
        flags: LoadFlags,
    ) -> Result<AssetBundle> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        if gltf.nodes().next().is_none() {
            return Err(RigError::EmptyScene(source.to_string()));
        }

        let base_dir = base_dir.unwrap_or_else(|| Path::new("./"));
        let buffers = load_buffers(&gltf, base_dir)?;

        let mut bundle = AssetBundle {
            source: source.to_string(),
            ..AssetBundle::default()
        };

        if flags.contains(LoadFlags::SKELETON) {
            bundle.hierarchy = load_hierarchy(&gltf);
        }
        if flags.contains(LoadFlags::MESHES) {
            bundle.meshes = load_bone_tables(&gltf, &buffers)?;
        }
        if flags.contains(LoadFlags::ANIMATIONS) {
            bundle.animations = load_animations(&gltf, &buffers)?;
        }

        log::debug!(
            "Imported '{}': {} root nodes, {} skinned meshes, {} animations",
            source,
            bundle.hierarchy.len(),
            bundle.meshes.len(),
            bundle.animations.len()
        );

        Ok(bundle)
    }
}

impl AssetImporter for GltfImporter {
    fn import(&self, path: &Path, flags: LoadFlags) -> Result<AssetBundle> {
        if !path.is_file() {
            return Err(RigError::AssetNotFound(path.display().to_string()));
        }

        let bytes = fs::read(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("./"));
        self.import_slice(&bytes, Some(base_dir), &path.display().to_string(), flags)
            .inspect_err(|err| log::error!("Failed to import '{}': {err}", path.display()))
    }
}

// ============================================================================
// Buffers
// ============================================================================

fn load_buffers(gltf: &gltf::Gltf, base_dir: &Path) -> Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::with_capacity(gltf.buffers().count());
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .ok_or(RigError::MissingBuffer(buffer.index()))?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                buffer_data.push(decode_data_uri(uri)?);
            }
            gltf::buffer::Source::Uri(uri) => {
                buffer_data.push(fs::read(base_dir.join(uri))?);
            }
        }
    }
    Ok(buffer_data)
}

/// Decodes `data:[<mime>];base64,<payload>`.
fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let Some((header, payload)) = uri.split_once(',') else {
        return Err(RigError::DataUri("missing ',' separator".to_string()));
    };
    if !header.ends_with(";base64") {
        return Err(RigError::DataUri(format!("unsupported encoding '{header}'")));
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

fn buffer_slice<'s>(buffers: &'s [Vec<u8>], buffer: &gltf::Buffer<'_>) -> Option<&'s [u8]> {
    buffers.get(buffer.index()).map(Vec::as_slice)
}

// ============================================================================
// Hierarchy
// ============================================================================

fn node_name(node: &gltf::Node<'_>) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), ToString::to_string)
}

fn load_hierarchy(gltf: &gltf::Gltf) -> Vec<ImportedNode> {
    let mut visited = vec![false; gltf.nodes().count()];

    let roots: Vec<gltf::Node<'_>> = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
        Some(scene) => scene.nodes().collect(),
        None => {
            let mut is_child = vec![false; gltf.nodes().count()];
            for node in gltf.nodes() {
                for child in node.children() {
                    is_child[child.index()] = true;
                }
            }
            gltf.nodes().filter(|n| !is_child[n.index()]).collect()
        }
    };

    roots
        .iter()
        .filter_map(|root| build_node(root, &mut visited))
        .collect()
}

fn build_node(node: &gltf::Node<'_>, visited: &mut [bool]) -> Option<ImportedNode> {
    if std::mem::replace(&mut visited[node.index()], true) {
        log::warn!("glTF node {} is referenced more than once; ignoring repeat", node.index());
        return None;
    }

    let (t, r, s) = node.transform().decomposed();
    let transform = Transform::new(Vec3::from_array(t), Quat::from_array(r), Vec3::from_array(s));

    let mut imported = ImportedNode::new(node_name(node), transform);
    imported.children = node
        .children()
        .filter_map(|child| build_node(&child, visited))
        .collect();
    Some(imported)
}

// ============================================================================
// Skins
// ============================================================================

fn load_bone_tables(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<Vec<MeshBoneTable>> {
    let mut tables = Vec::new();

    for node in gltf.nodes() {
        let (Some(_mesh), Some(skin)) = (node.mesh(), node.skin()) else {
            continue;
        };

        let reader = skin.reader(|buffer| buffer_slice(buffers, &buffer));
        let joint_count = skin.joints().count();
        let ibms: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
            Some(iter) => iter.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
            None => vec![Mat4::IDENTITY; joint_count],
        };
        if ibms.len() < joint_count {
            return Err(RigError::Gltf(format!(
                "skin {} has {} joints but {} inverse bind matrices",
                skin.index(),
                joint_count,
                ibms.len()
            )));
        }

        let bones = skin
            .joints()
            .map(|joint| node_name(&joint))
            .zip(ibms);
        tables.push(MeshBoneTable::new(&node_name(&node), bones));
    }

    Ok(tables)
}

// ============================================================================
// Animations
// ============================================================================

fn interpolation_mode(mode: gltf::animation::Interpolation) -> InterpolationMode {
    match mode {
        gltf::animation::Interpolation::Step => InterpolationMode::Step,
        gltf::animation::Interpolation::Linear | gltf::animation::Interpolation::CubicSpline => {
            InterpolationMode::Linear
        }
    }
}

/// Cubic spline outputs are stored as (in-tangent, value, out-tangent).
fn spline_values<T: Copy>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.chunks_exact(3).map(|c| c[1]).collect()
    } else {
        values
    }
}

/// Pairs key times with values; `None` when the accessor counts differ.
fn keyframes<T>(times: &[f32], values: Vec<T>) -> Option<Vec<Keyframe<T>>> {
    if times.len() != values.len() {
        return None;
    }
    Some(
        times
            .iter()
            .zip(values)
            .map(|(&time, value)| Keyframe::new(f64::from(time), value))
            .collect(),
    )
}

enum ChannelKeys {
    Translation(Vec<Keyframe<Vec3>>),
    Rotation(Vec<Keyframe<Quat>>),
    Scale(Vec<Keyframe<Vec3>>),
}

fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<Vec<ImportedAnimation>> {
    use gltf::animation::util::ReadOutputs;

    let mut animations = Vec::with_capacity(gltf.animations().count());

    for anim in gltf.animations() {
        let name = anim
            .name()
            .map_or_else(|| format!("Animation_{}", anim.index()), ToString::to_string);

        let mut channels: Vec<AnimationChannel> = Vec::new();
        let mut channel_of_node: FxHashMap<usize, usize> = FxHashMap::default();
        let mut end_time = 0.0f32;

        for channel in anim.channels() {
            let reader = channel.reader(|buffer| buffer_slice(buffers, &buffer));
            let target = channel.target().node();

            let Some(inputs) = reader.read_inputs() else {
                log::warn!("Animation '{name}': channel without input accessor skipped");
                continue;
            };
            let times: Vec<f32> = inputs.collect();
            let Some(outputs) = reader.read_outputs() else {
                log::warn!("Animation '{name}': channel without output accessor skipped");
                continue;
            };

            let sampler_mode = channel.sampler().interpolation();
            let cubic = sampler_mode == gltf::animation::Interpolation::CubicSpline;
            if cubic {
                log::warn!(
                    "Animation '{name}': cubic spline on '{}' imported as linear",
                    node_name(&target)
                );
            }

            let keys = match outputs {
                ReadOutputs::Translations(iter) => {
                    let values = spline_values(iter.map(Vec3::from_array).collect(), cubic);
                    keyframes(&times, values).map(ChannelKeys::Translation)
                }
                ReadOutputs::Rotations(iter) => {
                    let values = spline_values(iter.into_f32().map(Quat::from_array).collect(), cubic);
                    keyframes(&times, values).map(ChannelKeys::Rotation)
                }
                ReadOutputs::Scales(iter) => {
                    let values = spline_values(iter.map(Vec3::from_array).collect(), cubic);
                    keyframes(&times, values).map(ChannelKeys::Scale)
                }
                ReadOutputs::MorphTargetWeights(_) => {
                    log::debug!("Animation '{name}': morph target weights are not supported");
                    continue;
                }
            };
            let Some(keys) = keys else {
                log::warn!(
                    "Animation '{name}': channel on '{}' has mismatched input/output counts; skipped",
                    node_name(&target)
                );
                continue;
            };

            let slot = *channel_of_node.entry(target.index()).or_insert_with(|| {
                let mut raw = AnimationChannel::new(node_name(&target));
                raw.interpolation = interpolation_mode(sampler_mode);
                channels.push(raw);
                channels.len() - 1
            });
            let raw = &mut channels[slot];

            if raw.interpolation != interpolation_mode(sampler_mode) {
                log::warn!(
                    "Animation '{name}': mixed interpolation on '{}', using linear",
                    raw.node_name
                );
                raw.interpolation = InterpolationMode::Linear;
            }

            match keys {
                ChannelKeys::Translation(keys) => raw.translation_keys = keys,
                ChannelKeys::Rotation(keys) => raw.rotation_keys = keys,
                ChannelKeys::Scale(keys) => raw.scale_keys = keys,
            }

            if let Some(&last) = times.last() {
                end_time = end_time.max(last);
            }
        }

        let mut animation = ImportedAnimation::new(name, f64::from(end_time), 1.0);
        animation.channels = channels;
        animations.push(animation);
    }

    Ok(animations)
}
