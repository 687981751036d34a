//! Animation Tests
//!
//! Tests for:
//! - KeyframeTrack linear/step interpolation and clamping
//! - KeyframeCursor scan and binary search fallback
//! - AnimationBuilder tick conversion, rest-pose filling and validation
//! - KeyframeOptimizer key reduction and build statistics

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use myth_rig::animation::tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
use myth_rig::errors::{RigError, TrackComponent};
use myth_rig::{
    AnimationBuildOptions, AnimationBuilder, AnimationChannel, AnimationStats, ImportedAnimation,
    ImportedNode, JointTrack, Keyframe, KeyframeOptimizer, Skeleton, SkeletonBuilder, Transform,
};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

/// root -> hips -> knee, with distinct rest poses.
fn leg_skeleton() -> Skeleton {
    let root = ImportedNode::new("root", Transform::IDENTITY).with_child(
        ImportedNode::new("hips", Transform::from_translation(Vec3::new(0.0, 1.0, 0.0))).with_child(
            ImportedNode::new(
                "knee",
                Transform::new(
                    Vec3::new(0.0, -0.5, 0.0),
                    Quat::from_rotation_x(0.25),
                    Vec3::splat(2.0),
                ),
            ),
        ),
    );
    SkeletonBuilder::build("leg", &root).unwrap()
}

fn hips_walk(duration_ticks: f64, ticks_per_second: f64) -> ImportedAnimation {
    let mut channel = AnimationChannel::new("hips").with_ticks_per_second(ticks_per_second);
    channel.translation_keys = vec![
        Keyframe::new(0.0, Vec3::ZERO),
        Keyframe::new(duration_ticks, Vec3::new(2.0, 0.0, 0.0)),
    ];

    let mut animation = ImportedAnimation::new("walk", duration_ticks, ticks_per_second);
    animation.channels.push(channel);
    animation
}

// ============================================================================
// KeyframeTrack: Linear Interpolation
// ============================================================================

#[test]
fn track_linear_f32_midpoint() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 10.0], InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    let val = track.sample_with_cursor(0.5, &mut cursor).unwrap();
    assert!(approx(val, 5.0), "Expected 5.0, got {val}");
}

#[test]
fn track_linear_f32_exact_keyframe() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![0.0_f32, 10.0, 20.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.0, &mut cursor).unwrap(), 0.0));
    assert!(approx(track.sample_with_cursor(1.0, &mut cursor).unwrap(), 10.0));
    assert!(approx(track.sample_with_cursor(2.0, &mut cursor).unwrap(), 20.0));
}

#[test]
fn track_linear_clamps_outside_key_range() {
    let track = KeyframeTrack::new(vec![1.0, 2.0], vec![10.0_f32, 20.0], InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.0, &mut cursor).unwrap(), 10.0));
    assert!(approx(track.sample_with_cursor(5.0, &mut cursor).unwrap(), 20.0));
    assert!(approx(track.sample(-1.0).unwrap(), 10.0));
    assert!(approx(track.sample(9.0).unwrap(), 20.0));
}

#[test]
fn track_linear_vec3() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)],
        InterpolationMode::Linear,
    );

    let val = track.sample(0.5).unwrap();
    assert!(approx_vec3(val, Vec3::new(1.0, 0.0, 0.0)));
}

#[test]
fn track_rotation_takes_shortest_path() {
    let start = Quat::IDENTITY;
    let end = Quat::from_rotation_y(FRAC_PI_2);
    // Same orientation as `end`, opposite hemisphere.
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![start, -end], InterpolationMode::Linear);

    let mid = track.sample(0.5).unwrap();
    let expected = Quat::from_rotation_y(FRAC_PI_2 * 0.5);
    assert!(mid.angle_between(expected) < 1e-3, "took the long way: {mid:?}");
}

#[test]
fn track_empty_samples_none() {
    let track: KeyframeTrack<f32> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();
    assert!(track.sample(0.0).is_none());
    assert!(track.sample_with_cursor(0.0, &mut cursor).is_none());
}

#[test]
fn track_constant_holds_value() {
    let track = KeyframeTrack::constant(Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(track.len(), 1);
    assert_eq!(track.sample(0.7), Some(Vec3::new(1.0, 2.0, 3.0)));
}

// ============================================================================
// KeyframeTrack: Step Interpolation
// ============================================================================

#[test]
fn track_step_holds_previous_key() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![0.0_f32, 10.0, 20.0],
        InterpolationMode::Step,
    );

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.99, &mut cursor).unwrap(), 0.0));
    assert!(approx(track.sample_with_cursor(1.0, &mut cursor).unwrap(), 10.0));
    assert!(approx(track.sample_with_cursor(1.5, &mut cursor).unwrap(), 10.0));
}

// ============================================================================
// KeyframeCursor
// ============================================================================

fn long_track() -> KeyframeTrack<f32> {
    let times: Vec<f32> = (0..100).map(|i| i as f32 * 0.1).collect();
    let values: Vec<f32> = (0..100).map(|i| i as f32).collect();
    KeyframeTrack::new(times, values, InterpolationMode::Linear)
}

#[test]
fn cursor_tracks_forward_playback() {
    let track = long_track();
    let mut cursor = KeyframeCursor::default();

    for frame in 0..90 {
        let time = frame as f32 * 0.1 + 0.05;
        let val = track.sample_with_cursor(time, &mut cursor).unwrap();
        assert!((val - (frame as f32 + 0.5)).abs() < 1e-3, "frame {frame}: {val}");
        assert_eq!(cursor.last_index, frame);
    }
}

#[test]
fn cursor_recovers_from_large_jumps() {
    let track = long_track();
    let mut cursor = KeyframeCursor::default();

    let forward = track.sample_with_cursor(8.05, &mut cursor).unwrap();
    assert!((forward - 80.5).abs() < 1e-3);
    assert_eq!(cursor.last_index, 80);

    let back = track.sample_with_cursor(0.25, &mut cursor).unwrap();
    assert!((back - 2.5).abs() < 1e-3);
    assert_eq!(cursor.last_index, 2);
}

#[test]
fn cursor_result_matches_stateless_sampling() {
    let track = long_track();
    let mut cursor = KeyframeCursor::default();

    for &time in &[0.0, 3.33, 3.4, 1.2, 9.9, 12.0, -1.0, 5.05] {
        let cached = track.sample_with_cursor(time, &mut cursor).unwrap();
        let fresh = track.sample(time).unwrap();
        assert!(approx(cached, fresh), "t={time}: {cached} vs {fresh}");
    }
}

// ============================================================================
// AnimationBuilder
// ============================================================================

#[test]
fn builder_produces_one_track_per_joint() {
    let skeleton = leg_skeleton();
    let animation = AnimationBuilder::default()
        .build(&skeleton, &hips_walk(1.0, 1.0), None)
        .unwrap();

    assert_eq!(animation.num_tracks(), skeleton.num_joints());
    assert_eq!(animation.skeleton_id(), skeleton.id);
    assert!(approx(animation.duration(), 1.0));
    assert_eq!(animation.name, "walk");
}

#[test]
fn builder_converts_ticks_to_seconds() {
    let skeleton = leg_skeleton();
    let animation = AnimationBuilder::default()
        .build(&skeleton, &hips_walk(48.0, 24.0), None)
        .unwrap();

    assert!(approx(animation.duration(), 2.0));
    let hips = animation.track(1).unwrap();
    assert_eq!(hips.translation.times, vec![0.0, 2.0]);
}

#[test]
fn builder_accepts_last_key_at_duration_for_large_tick_counts() {
    // Not representable as an f32 tick count.
    let duration_ticks = 16_777_219.0;
    let skeleton = leg_skeleton();
    let animation = AnimationBuilder::default()
        .build(&skeleton, &hips_walk(duration_ticks, 1000.0), None)
        .unwrap();

    let hips = animation.track(1).unwrap();
    assert_eq!(hips.translation.times.last().copied(), Some(animation.duration()));
}

#[test]
fn builder_fills_unanimated_joints_with_rest_pose() {
    let skeleton = leg_skeleton();
    let animation = AnimationBuilder::default()
        .build(&skeleton, &hips_walk(1.0, 1.0), None)
        .unwrap();

    let knee = animation.track(2).unwrap();
    let rest = skeleton.rest_pose(2).unwrap();
    assert_eq!(knee.translation.times, vec![0.0]);
    assert_eq!(knee.translation.values, vec![rest.translation]);
    assert_eq!(knee.rotation.values, vec![rest.rotation]);
    assert_eq!(knee.scale.values, vec![rest.scale]);
}

#[test]
fn builder_fills_missing_components_from_rest_pose() {
    let skeleton = leg_skeleton();
    let animation = AnimationBuilder::default()
        .build(&skeleton, &hips_walk(1.0, 1.0), None)
        .unwrap();

    let hips = animation.track(1).unwrap();
    assert_eq!(hips.translation.len(), 2);
    assert_eq!(hips.rotation.values, vec![Quat::IDENTITY]);
    assert_eq!(hips.scale.values, vec![Vec3::ONE]);
}

#[test]
fn builder_first_matching_channel_wins() {
    let skeleton = leg_skeleton();
    let mut source = hips_walk(1.0, 1.0);
    let mut duplicate = AnimationChannel::new("hips");
    duplicate.translation_keys = vec![Keyframe::new(0.0, Vec3::splat(9.0))];
    source.channels.push(duplicate);

    let animation = AnimationBuilder::default().build(&skeleton, &source, None).unwrap();
    assert_eq!(animation.track(1).unwrap().translation.len(), 2);
}

#[test]
fn builder_normalizes_rotation_keys() {
    let skeleton = leg_skeleton();
    let mut source = ImportedAnimation::new("spin", 1.0, 1.0);
    let mut channel = AnimationChannel::new("root");
    channel.rotation_keys = vec![
        Keyframe::new(0.0, Quat::from_xyzw(0.0, 0.0, 0.0, 2.0)),
        Keyframe::new(1.0, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0)),
    ];
    source.channels.push(channel);

    let animation = AnimationBuilder::default().build(&skeleton, &source, None).unwrap();
    for q in &animation.track(0).unwrap().rotation.values {
        assert!(q.is_normalized(), "{q:?}");
    }
}

#[test]
fn builder_rejects_non_positive_duration() {
    let skeleton = leg_skeleton();
    let source = ImportedAnimation::new("empty", 0.0, 1.0);

    let err = AnimationBuilder::default().build(&skeleton, &source, None).unwrap_err();
    assert!(matches!(err, RigError::NonPositiveDuration(_)));
    assert!(err.is_build_error());
}

#[test]
fn builder_rejects_invalid_tick_rate() {
    let skeleton = leg_skeleton();
    let source = ImportedAnimation::new("broken", 10.0, 0.0);

    let err = AnimationBuilder::default().build(&skeleton, &source, None).unwrap_err();
    assert!(matches!(err, RigError::InvalidTickRate(_)));
}

#[test]
fn builder_rejects_non_ascending_keys() {
    let skeleton = leg_skeleton();
    let mut source = ImportedAnimation::new("jitter", 2.0, 1.0);
    let mut channel = AnimationChannel::new("knee");
    channel.scale_keys = vec![
        Keyframe::new(0.0, Vec3::ONE),
        Keyframe::new(1.0, Vec3::ONE),
        Keyframe::new(1.0, Vec3::ONE),
    ];
    source.channels.push(channel);

    let err = AnimationBuilder::default().build(&skeleton, &source, None).unwrap_err();
    assert!(matches!(
        err,
        RigError::KeyframesNotAscending { joint: 2, component: TrackComponent::Scale, index: 2 }
    ));
}

#[test]
fn builder_rejects_keys_past_duration() {
    let skeleton = leg_skeleton();
    let mut source = ImportedAnimation::new("overrun", 1.0, 1.0);
    let mut channel = AnimationChannel::new("root");
    channel.rotation_keys = vec![
        Keyframe::new(0.0, Quat::IDENTITY),
        Keyframe::new(1.5, Quat::IDENTITY),
    ];
    source.channels.push(channel);

    let err = AnimationBuilder::default().build(&skeleton, &source, None).unwrap_err();
    assert!(matches!(
        err,
        RigError::KeyframeOutOfRange { joint: 0, component: TrackComponent::Rotation, .. }
    ));
}

#[test]
fn builder_rejects_negative_key_time() {
    let skeleton = leg_skeleton();
    let mut source = hips_walk(1.0, 1.0);
    source.channels[0].translation_keys[0].time = -0.1;

    let err = AnimationBuilder::default().build(&skeleton, &source, None).unwrap_err();
    assert!(matches!(err, RigError::KeyframeOutOfRange { joint: 1, .. }));
}

#[test]
fn builder_fills_statistics() {
    let skeleton = leg_skeleton();
    let mut stats = AnimationStats::default();
    AnimationBuilder::default()
        .build(&skeleton, &hips_walk(1.0, 1.0), Some(&mut stats))
        .unwrap();

    assert_eq!(stats.raw_keys, 2);
    assert_eq!(stats.unanimated_joints, 2);
    // hips: 2 translation + rest rotation + rest scale; root and knee: 3 each.
    assert_eq!(stats.final_keys, 4 + 3 + 3);
    assert_eq!(stats.optimized_keys, stats.final_keys);
    assert!(stats.final_size > stats.raw_size);
}

// ============================================================================
// KeyframeOptimizer
// ============================================================================

fn linear_ramp_source(keys: usize) -> ImportedAnimation {
    let duration = (keys - 1) as f64;
    let mut channel = AnimationChannel::new("hips");
    channel.translation_keys = (0..keys)
        .map(|i| Keyframe::new(i as f64, Vec3::new(i as f32, 0.0, 0.0)))
        .collect();
    channel.rotation_keys = (0..keys)
        .map(|i| Keyframe::new(i as f64, Quat::from_rotation_y(0.1 * i as f32)))
        .collect();

    let mut animation = ImportedAnimation::new("ramp", duration, 1.0);
    animation.channels.push(channel);
    animation
}

#[test]
fn optimizer_drops_collinear_keys() {
    let skeleton = leg_skeleton();
    let options = AnimationBuildOptions {
        optimize: true,
        ..AnimationBuildOptions::default()
    };
    let mut stats = AnimationStats::default();
    let animation = AnimationBuilder::new(options)
        .build(&skeleton, &linear_ramp_source(10), Some(&mut stats))
        .unwrap();

    let hips = animation.track(1).unwrap();
    assert_eq!(hips.translation.times, vec![0.0, 9.0]);
    assert_eq!(hips.rotation.len(), 2);
    assert!(stats.optimized_keys < stats.final_keys);
    assert!(stats.optimized_size < stats.final_size);
}

#[test]
fn optimizer_keeps_significant_keys() {
    let skeleton = leg_skeleton();
    let mut source = ImportedAnimation::new("bump", 2.0, 1.0);
    let mut channel = AnimationChannel::new("hips");
    channel.translation_keys = vec![
        Keyframe::new(0.0, Vec3::ZERO),
        Keyframe::new(1.0, Vec3::new(0.0, 1.0, 0.0)),
        Keyframe::new(2.0, Vec3::ZERO),
    ];
    source.channels.push(channel);

    let animation = AnimationBuilder::default().build(&skeleton, &source, None).unwrap();
    let optimized = KeyframeOptimizer::default().optimize(&animation);

    assert_eq!(optimized.track(1).unwrap().translation.len(), 3);
    assert_eq!(optimized.key_count(), animation.key_count());
}

#[test]
fn optimizer_preserves_sampled_pose_within_tolerance() {
    let skeleton = leg_skeleton();
    let animation = AnimationBuilder::default()
        .build(&skeleton, &linear_ramp_source(10), None)
        .unwrap();
    let optimized = KeyframeOptimizer::default().optimize(&animation);

    let full = animation.track(1).unwrap();
    let reduced = optimized.track(1).unwrap();
    for step in 0..=90 {
        let time = step as f32 * 0.1;
        let a = full.translation.sample(time).unwrap();
        let b = reduced.translation.sample(time).unwrap();
        assert!((a - b).length() <= 1e-3, "t={time}: {a} vs {b}");
    }
}

#[test]
fn optimizer_leaves_step_tracks_alone() {
    let mut joint = JointTrack::constant(&Transform::IDENTITY);
    joint.translation = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
        InterpolationMode::Step,
    );

    KeyframeOptimizer::default().optimize_track(&mut joint);
    assert_eq!(joint.translation.len(), 3);
}
