use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::scene::transform::Transform;

/// Sentinel parent index of a root joint.
pub const NO_PARENT: i32 = -1;

/// A node of the runtime joint hierarchy.
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint, [`NO_PARENT`] for roots.
    /// Always strictly less than the joint's own index.
    pub parent: i32,
    /// Bind-time local transform, used whenever no animation overrides it.
    pub rest_pose: Transform,
}

impl Joint {
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent < 0
    }

    /// Parent index as `usize`, `None` for roots.
    #[inline]
    #[must_use]
    pub fn parent_index(&self) -> Option<usize> {
        usize::try_from(self.parent).ok()
    }
}

/// Flat, topologically ordered joint hierarchy.
///
/// Built once at asset load time by
/// [`SkeletonBuilder`](crate::scene::skeleton_builder::SkeletonBuilder) and
/// read-only afterwards; share it through `Arc<Skeleton>`.
///
/// Invariants (hold by construction):
/// - `joints[i].parent < i` for every non-root joint
/// - joint names are unique
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    joints: Vec<Joint>,
    name_to_index: FxHashMap<String, usize>,
}

impl Skeleton {
    /// Only the builder creates skeletons; it has already validated `joints`.
    pub(crate) fn from_validated(
        name: &str,
        joints: Vec<Joint>,
        name_to_index: FxHashMap<String, usize>,
    ) -> Self {
        debug_assert_eq!(joints.len(), name_to_index.len());
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            joints,
            name_to_index,
        }
    }

    #[inline]
    #[must_use]
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    #[inline]
    #[must_use]
    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// Looks up a joint index by name.
    #[inline]
    #[must_use]
    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn joint_name(&self, index: usize) -> Option<&str> {
        self.joints.get(index).map(|j| j.name.as_str())
    }

    /// Parent indices in joint order.
    pub fn parents(&self) -> impl ExactSizeIterator<Item = i32> + '_ {
        self.joints.iter().map(|j| j.parent)
    }

    /// Rest-pose local transform of one joint.
    #[inline]
    #[must_use]
    pub fn rest_pose(&self, index: usize) -> Option<&Transform> {
        self.joints.get(index).map(|j| &j.rest_pose)
    }

    /// Copies the rest pose of every joint into `output`.
    ///
    /// `output` is resized to the joint count.
    pub fn copy_rest_pose(&self, output: &mut Vec<Transform>) {
        output.clear();
        output.extend(self.joints.iter().map(|j| j.rest_pose));
    }

    /// Indices of all root joints.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter_map(|(i, j)| j.is_root().then_some(i))
    }
}
