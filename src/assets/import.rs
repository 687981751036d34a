//! Asset import interface.
//!
//! An importer turns a file into an [`AssetBundle`]: raw node hierarchy,
//! mesh bone tables and keyframe channels. Nothing in a bundle is validated
//! yet; [`SceneAsset`](crate::assets::scene_asset::SceneAsset) runs the
//! skeleton and animation builders over it.

use std::path::Path;

use bitflags::bitflags;

use crate::animation::raw::ImportedAnimation;
use crate::errors::Result;
use crate::scene::skinning::MeshBoneTable;
use crate::scene::transform::Transform;

bitflags! {
    /// Selects which parts of a file an importer should read.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LoadFlags: u32 {
        const MESHES     = 1 << 0;
        const SKELETON   = 1 << 1;
        const ANIMATIONS = 1 << 2;
        const ALL = Self::MESHES.bits() | Self::SKELETON.bits() | Self::ANIMATIONS.bits();
    }
}

impl Default for LoadFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Node of an imported hierarchy, before it becomes a skeleton joint.
#[derive(Debug, Clone)]
pub struct ImportedNode {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<ImportedNode>,
}

impl ImportedNode {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
        }
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: ImportedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree (including `self`).
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ImportedNode::count).sum::<usize>()
    }
}

/// Result of importing one file.
#[derive(Debug, Default)]
pub struct AssetBundle {
    /// Human readable origin (usually the file path).
    pub source: String,
    /// Scene root nodes, empty when [`LoadFlags::SKELETON`] was not requested.
    pub hierarchy: Vec<ImportedNode>,
    pub meshes: Vec<MeshBoneTable>,
    pub animations: Vec<ImportedAnimation>,
}

impl AssetBundle {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hierarchy.is_empty() && self.meshes.is_empty() && self.animations.is_empty()
    }
}

/// File importer collaborator.
pub trait AssetImporter {
    /// Reads `path`, honouring `flags`.
    ///
    /// Fails with an asset error when the file is unreadable or holds no
    /// usable scene.
    fn import(&self, path: &Path, flags: LoadFlags) -> Result<AssetBundle>;
}
