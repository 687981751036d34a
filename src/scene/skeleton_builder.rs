//! Skeleton Builder
//!
//! Flattens an imported node tree into a [`Skeleton`].
//!
//! Nodes are visited depth-first in pre-order with an explicit stack, so each
//! node gets its index before any of its children: `parent < child` holds for
//! every joint by construction.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::assets::import::ImportedNode;
use crate::errors::{Result, RigError};
use crate::scene::skeleton::{Joint, NO_PARENT, Skeleton};

/// Upper bound on joints per skeleton.
pub const MAX_JOINTS: usize = 1024;

pub struct SkeletonBuilder;

impl SkeletonBuilder {
    /// Builds a skeleton from a single root node.
    pub fn build(name: &str, root: &ImportedNode) -> Result<Skeleton> {
        Self::build_forest(name, std::slice::from_ref(root))
    }

    /// Builds a skeleton from several root nodes; each becomes a root joint
    /// (parent [`NO_PARENT`]), in slice order.
    ///
    /// On failure a diagnostic is logged and no skeleton is produced.
    pub fn build_forest(name: &str, roots: &[ImportedNode]) -> Result<Skeleton> {
        Self::build_inner(name, roots).inspect_err(|err| {
            log::error!("Skeleton '{name}' building failed: {err}");
        })
    }

    fn build_inner(name: &str, roots: &[ImportedNode]) -> Result<Skeleton> {
        if roots.is_empty() {
            return Err(RigError::EmptyHierarchy);
        }

        let count: usize = roots.iter().map(ImportedNode::count).sum();
        if count > MAX_JOINTS {
            return Err(RigError::TooManyJoints {
                count,
                max: MAX_JOINTS,
            });
        }

        let mut joints: Vec<Joint> = Vec::with_capacity(count);
        let mut name_to_index: FxHashMap<String, usize> = FxHashMap::default();
        name_to_index.reserve(count);

        // (parent index, node); reversed pushes keep children in source order.
        let mut stack: SmallVec<[(i32, &ImportedNode); 32]> = SmallVec::new();
        stack.extend(roots.iter().rev().map(|root| (NO_PARENT, root)));

        while let Some((parent, node)) = stack.pop() {
            let index = joints.len();

            if let Some(&first) = name_to_index.get(&node.name) {
                return Err(RigError::DuplicateJointName {
                    name: node.name.clone(),
                    first,
                    second: index,
                });
            }
            name_to_index.insert(node.name.clone(), index);

            joints.push(Joint {
                name: node.name.clone(),
                parent,
                rest_pose: node.transform,
            });

            let own = index as i32;
            stack.extend(node.children.iter().rev().map(|child| (own, child)));
        }

        log::debug!("Built skeleton '{name}' with {} joints", joints.len());
        Ok(Skeleton::from_validated(name, joints, name_to_index))
    }
}
