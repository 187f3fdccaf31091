//! End-to-end rewind integration tests.
//!
//! Each test: run N steps → save a keyframe → run M more steps → load
//! the keyframe → verify the world hashes identically to step N, and
//! that re-running the same M steps reproduces step N+M exactly.

use timewarp_core::StepId;
use timewarp_keyframe::Keyframe;
use timewarp_sim::{free_keyframe, keyframe_time, World, WorldConfig};

fn world(seed: u64) -> World {
    World::new(WorldConfig {
        seed,
        ..WorldConfig::default()
    })
    .unwrap()
}

#[test]
fn rewind_restores_exact_state() {
    let mut w = world(1001);
    w.advance_by(50).unwrap();
    let hash_at_save = w.state_hash();
    let kf = w.save_keyframe();
    assert_eq!(keyframe_time(&kf), StepId(50));

    w.advance_by(120).unwrap();
    assert_ne!(w.state_hash(), hash_at_save);

    w.load_keyframe(&kf).unwrap();
    assert_eq!(w.step(), StepId(50));
    assert_eq!(w.state_hash(), hash_at_save);
}

#[test]
fn replay_after_rewind_reproduces_the_timeline() {
    let mut w = world(2002);
    w.advance_by(40).unwrap();
    let kf = w.save_keyframe();

    w.advance_by(75).unwrap();
    let hash_first_run = w.state_hash();

    w.load_keyframe(&kf).unwrap();
    w.advance_by(75).unwrap();
    assert_eq!(w.step(), StepId(115));
    assert_eq!(w.state_hash(), hash_first_run);
}

#[test]
fn repeated_rewinds_from_one_keyframe() {
    let mut w = world(3003);
    w.advance_by(30).unwrap();
    let kf = w.save_keyframe();
    let hash_at_save = w.state_hash();

    for run in 1..=4u64 {
        w.advance_by(run * 10).unwrap();
        w.load_keyframe(&kf).unwrap();
        assert_eq!(w.state_hash(), hash_at_save, "rewind {run} diverged");
    }
}

#[test]
fn keyframe_survives_the_arenas_it_captured() {
    let mut w = world(4004);
    w.advance_by(60).unwrap();
    let kf = w.save_keyframe();
    let hash_at_save = w.state_hash();

    // Churn the lists hard; the keyframe must stay self-contained.
    w.advance_by(300).unwrap();
    for block in w.thinker_list() {
        w.remove_thinker(block).unwrap();
    }
    assert_eq!(w.live_thinkers(), 0);

    w.load_keyframe(&kf).unwrap();
    assert_eq!(w.state_hash(), hash_at_save);
    assert!(w.live_thinkers() > 0);
}

#[test]
fn older_and_newer_keyframes_are_independent() {
    let mut w = world(5005);
    w.advance_by(20).unwrap();
    let early = w.save_keyframe();
    let hash_early = w.state_hash();

    w.advance_by(40).unwrap();
    let late = w.save_keyframe();
    let hash_late = w.state_hash();

    w.advance_by(10).unwrap();
    w.load_keyframe(&early).unwrap();
    assert_eq!(w.state_hash(), hash_early);

    w.load_keyframe(&late).unwrap();
    assert_eq!(w.state_hash(), hash_late);

    w.load_keyframe(&early).unwrap();
    assert_eq!(w.state_hash(), hash_early);

    free_keyframe(late);
    free_keyframe(early);
}

#[test]
fn keyframes_do_not_cross_worlds() {
    let mut a = world(6006);
    let mut b = world(6006);
    a.advance_by(10).unwrap();
    b.advance_by(10).unwrap();

    // Identical trajectories, but each keyframe's snapshots are bound
    // to the arenas they were taken from.
    let kf_a = a.save_keyframe();
    assert!(b.load_keyframe(&kf_a).is_err());
    a.load_keyframe(&kf_a).unwrap();
}

#[test]
fn freeing_a_keyframe_leaves_the_world_running() {
    let mut w = world(7007);
    w.advance_by(15).unwrap();
    let kf = w.save_keyframe();
    let hash_before = w.state_hash();

    free_keyframe(kf);
    assert_eq!(w.state_hash(), hash_before);
    w.advance_by(5).unwrap();
    assert_eq!(w.step(), StepId(20));
}

#[test]
fn failed_load_leaves_world_unusable() {
    let mut w = world(8008);
    w.advance_by(10).unwrap();
    let kf = w.save_keyframe();
    let cut = Keyframe::new(
        kf.step(),
        kf.buf()[..4].to_vec(),
        vec![kf.snapshots()[0].clone(), kf.snapshots()[1].clone()],
    );

    assert!(w.load_keyframe(&cut).is_err());
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        w.placement_clear(0, 0)
    }));
    assert!(result.is_err());
}

#[test]
fn demo_cursor_rewinds_with_the_world() {
    let mut w = world(9009);
    w.advance_by(25).unwrap();
    let demo_at_save = w.demo_pos();
    let kf = w.save_keyframe();

    w.advance_by(25).unwrap();
    assert_ne!(w.demo_pos(), demo_at_save);

    w.load_keyframe(&kf).unwrap();
    assert_eq!(w.demo_pos(), demo_at_save);
}
