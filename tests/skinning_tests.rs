//! Skinning Tests
//!
//! Tests for:
//! - MeshBoneTable name → slot lookup
//! - resolve() name bridging between joint and slot order
//! - Identity policy for unmatched slots
//! - BoneRemap equivalence with the per-name lookup

use glam::{Mat4, Quat, Vec3};

use myth_rig::scene::skinning::{resolve, resolve_with_remap};
use myth_rig::scene::transform_system::{propagate_to_vec, rest_pose_model_transforms};
use myth_rig::{
    BoneRemap, ImportedNode, MeshBoneTable, Skeleton, SkeletonBuilder, SkinningMatrices, Transform,
};

const EPSILON: f32 = 1e-5;

fn approx_mat4(a: &Mat4, b: &Mat4) -> bool {
    a.abs_diff_eq(*b, EPSILON)
}

/// pelvis -> spine -> head, plus a non-deforming helper under pelvis.
fn skeleton() -> Skeleton {
    let root = ImportedNode::new("pelvis", Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)))
        .with_child(
            ImportedNode::new(
                "spine",
                Transform::new(Vec3::new(0.0, 0.5, 0.0), Quat::from_rotation_x(0.2), Vec3::ONE),
            )
            .with_child(ImportedNode::new("head", Transform::from_translation(Vec3::new(0.0, 0.4, 0.0)))),
        )
        .with_child(ImportedNode::new("ik_helper", Transform::from_translation(Vec3::Z)));
    SkeletonBuilder::build("body", &root).unwrap()
}

/// Bone table in a different order than the skeleton, with inverse bind
/// poses taken from the skeleton's rest pose.
fn bind_pose_mesh(skeleton: &Skeleton, order: &[&str]) -> MeshBoneTable {
    let rest = rest_pose_model_transforms(skeleton);
    let bones = order.iter().map(|name| {
        let joint = skeleton.find_joint(name).unwrap();
        (*name, Mat4::from(rest[joint]).inverse())
    });
    MeshBoneTable::new("body_mesh", bones)
}

// ============================================================================
// MeshBoneTable
// ============================================================================

#[test]
fn bone_table_maps_names_to_slots() {
    let table = MeshBoneTable::new(
        "mesh",
        [("a", Mat4::IDENTITY), ("b", Mat4::from_translation(Vec3::X))],
    );

    assert_eq!(table.slot_count(), 2);
    assert_eq!(table.find_slot("b"), Some(1));
    assert_eq!(table.slot_name(0), Some("a"));
    assert_eq!(table.find_slot("c"), None);
    assert_eq!(table.inverse_bind_pose(1), Some(&Mat4::from_translation(Vec3::X)));
}

#[test]
fn bone_table_duplicate_name_resolves_to_first_slot() {
    let table = MeshBoneTable::new("mesh", [("a", Mat4::IDENTITY), ("a", Mat4::IDENTITY)]);
    assert_eq!(table.slot_count(), 2);
    assert_eq!(table.find_slot("a"), Some(0));
}

// ============================================================================
// resolve()
// ============================================================================

#[test]
fn resolve_single_identity_joint_yields_inverse_bind_pose() {
    let skeleton = SkeletonBuilder::build("single", &ImportedNode::new("bone", Transform::IDENTITY)).unwrap();
    let ibm = Mat4::from_scale_rotation_translation(
        Vec3::splat(0.5),
        Quat::from_rotation_y(1.0),
        Vec3::new(3.0, -1.0, 2.0),
    );
    let mesh = MeshBoneTable::new("mesh", [("bone", ibm)]);

    let model = rest_pose_model_transforms(&skeleton);
    let mut skin = SkinningMatrices::default();
    resolve(&skeleton, &model, &mesh, &mut skin);

    assert_eq!(skin.as_slice(), &[ibm]);
}

#[test]
fn resolve_rest_pose_with_matching_bind_pose_is_identity() {
    let skeleton = skeleton();
    let mesh = bind_pose_mesh(&skeleton, &["head", "pelvis", "spine"]);

    let model = rest_pose_model_transforms(&skeleton);
    let mut skin = SkinningMatrices::default();
    resolve(&skeleton, &model, &mesh, &mut skin);

    assert_eq!(skin.len(), 3);
    for m in skin.as_slice() {
        assert!(approx_mat4(m, &Mat4::IDENTITY), "{m:?}");
    }
}

#[test]
fn resolve_writes_slot_of_matching_name() {
    let skeleton = skeleton();
    let mesh = bind_pose_mesh(&skeleton, &["head", "pelvis", "spine"]);

    let mut local = Vec::new();
    skeleton.copy_rest_pose(&mut local);
    let head = skeleton.find_joint("head").unwrap();
    local[head].translation += Vec3::new(0.0, 0.1, 0.0);
    let model = propagate_to_vec(&skeleton, &local).unwrap();

    let mut skin = SkinningMatrices::default();
    resolve(&skeleton, &model, &mesh, &mut skin);

    // "head" is slot 0 of the mesh, joint 2 of the skeleton.
    let expected = Mat4::from(model[head]) * *mesh.inverse_bind_pose(0).unwrap();
    assert!(approx_mat4(&skin.as_slice()[0], &expected));
    assert!(!approx_mat4(&skin.as_slice()[0], &Mat4::IDENTITY));
    assert!(approx_mat4(&skin.as_slice()[1], &Mat4::IDENTITY));
}

#[test]
fn resolve_without_matching_names_is_all_identity() {
    let skeleton = skeleton();
    let mesh = MeshBoneTable::new(
        "alien",
        [
            ("tentacle_1", Mat4::from_translation(Vec3::X)),
            ("tentacle_2", Mat4::from_translation(Vec3::Y)),
        ],
    );

    let mut local = Vec::new();
    skeleton.copy_rest_pose(&mut local);
    local[0].rotation = Quat::from_rotation_z(1.0);
    let model = propagate_to_vec(&skeleton, &local).unwrap();

    let mut skin = SkinningMatrices::default();
    resolve(&skeleton, &model, &mesh, &mut skin);

    assert_eq!(skin.as_slice(), &[Mat4::IDENTITY; 2]);
}

#[test]
fn resolve_keeps_identity_for_slots_missing_from_skeleton() {
    let skeleton = skeleton();
    let rest = rest_pose_model_transforms(&skeleton);
    let spine = skeleton.find_joint("spine").unwrap();
    let mesh = MeshBoneTable::new(
        "mesh",
        [
            ("tail", Mat4::from_translation(Vec3::splat(5.0))),
            ("spine", Mat4::IDENTITY),
        ],
    );

    let mut skin = SkinningMatrices::default();
    resolve(&skeleton, &rest, &mesh, &mut skin);

    assert_eq!(skin.as_slice()[0], Mat4::IDENTITY);
    assert!(approx_mat4(&skin.as_slice()[1], &Mat4::from(rest[spine])));
}

#[test]
fn resolve_resets_previous_output() {
    let skeleton = skeleton();
    let mesh = MeshBoneTable::new("mesh", [("nothing", Mat4::IDENTITY)]);

    let mut skin = SkinningMatrices::new(8);
    resolve(&skeleton, &rest_pose_model_transforms(&skeleton), &mesh, &mut skin);
    assert_eq!(skin.len(), 1);
}

#[test]
fn skinning_bytes_cover_every_matrix() {
    let skin = SkinningMatrices::new(3);
    assert_eq!(skin.as_bytes().len(), 3 * 64);
}

// ============================================================================
// BoneRemap
// ============================================================================

#[test]
fn remap_records_joint_to_slot_table() {
    let skeleton = skeleton();
    let mesh = bind_pose_mesh(&skeleton, &["head", "pelvis", "spine"]);
    let remap = BoneRemap::new(&skeleton, &mesh);

    assert_eq!(remap.num_joints(), 4);
    assert_eq!(remap.slot_count(), 3);
    assert_eq!(remap.joint_slot(0), Some(1)); // pelvis
    assert_eq!(remap.joint_slot(1), Some(2)); // spine
    assert_eq!(remap.joint_slot(2), Some(0)); // head
    assert_eq!(remap.joint_slot(3), None); // ik_helper
    assert_eq!(remap.matched_joints(), 3);
    assert_eq!(remap.unmatched_slots(&mesh).count(), 0);
    assert!(remap.matches(&skeleton, &mesh));
}

#[test]
fn remap_reports_unmatched_slots() {
    let skeleton = skeleton();
    let mesh = MeshBoneTable::new("mesh", [("head", Mat4::IDENTITY), ("tail", Mat4::IDENTITY)]);
    let remap = BoneRemap::new(&skeleton, &mesh);

    assert_eq!(remap.unmatched_slots(&mesh).collect::<Vec<_>>(), vec![1]);
}

#[test]
fn remap_resolution_matches_name_lookup() {
    let skeleton = skeleton();
    let mesh = MeshBoneTable::new(
        "mesh",
        [
            ("spine", Mat4::from_translation(Vec3::new(0.0, -1.5, 0.0))),
            ("missing", Mat4::from_translation(Vec3::X)),
            ("pelvis", Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0))),
        ],
    );
    let remap = BoneRemap::new(&skeleton, &mesh);

    let local: Vec<Transform> = (0..skeleton.num_joints())
        .map(|i| Transform::new(Vec3::splat(i as f32), Quat::from_rotation_y(i as f32), Vec3::ONE))
        .collect();
    let model = propagate_to_vec(&skeleton, &local).unwrap();

    let mut by_name = SkinningMatrices::default();
    let mut by_remap = SkinningMatrices::default();
    resolve(&skeleton, &model, &mesh, &mut by_name);
    resolve_with_remap(&remap, &model, &mesh, &mut by_remap);

    assert_eq!(by_name.as_slice(), by_remap.as_slice());
}
