//! Plugin behavior inside a bare `App`.

use std::sync::Arc;

use bevy::prelude::*;
use vmc_bevy::{RootTarget, Skeleton, SyncConfig, VmcReceiverPlugin, VmcSession};
use vmc_protocol::{
    Address, HumanBone, OscArg, OscMessage, Pose, Position, Receiver, ReceiverConfig, Rotation,
};

struct Rig {
    hips: Entity,
    finger: Entity,
    eye: Entity,
    root: Entity,
}

fn quiet_sync(hands: bool, eyes: bool) -> SyncConfig {
    SyncConfig {
        hands,
        eyes,
        report_interval_secs: 0,
    }
}

fn setup(plugin: VmcReceiverPlugin) -> (App, Rig) {
    let mut app = App::new();
    app.add_plugins(plugin);

    let world = app.world_mut();
    let hips = world.spawn(Transform::default()).id();
    let finger = world.spawn(Transform::default()).id();
    let eye = world.spawn(Transform::default()).id();
    let root = world.spawn((Transform::default(), RootTarget)).id();
    world.spawn(
        Skeleton::new()
            .with_bone(HumanBone::Hips, hips)
            .with_bone(HumanBone::LeftIndexProximal, finger)
            .with_bone(HumanBone::LeftEye, eye),
    );

    (app, Rig { hips, finger, eye, root })
}

fn pose(v: f32) -> Pose {
    Pose::new(Position::new(v, v + 1.0, v + 2.0), Rotation::new(0.0, 0.0, 0.6, 0.8))
}

fn send(app: &App, address: Address, name: &str, pose: Pose) {
    let session = app.world().resource::<VmcSession>();
    session.on_message(&OscMessage::pose(address, name, pose));
}

fn transform(app: &App, entity: Entity) -> Transform {
    *app.world().get::<Transform>(entity).unwrap()
}

#[test]
fn test_bones_and_root_follow_cache() {
    let (mut app, rig) = setup(VmcReceiverPlugin {
        sync: quiet_sync(true, true),
        ..Default::default()
    });

    send(&app, Address::BonePose, "Hips", pose(1.0));
    send(&app, Address::BonePose, "LeftIndexProximal", pose(2.0));
    send(&app, Address::BonePose, "Chest", pose(3.0));
    send(&app, Address::RootPose, "root", pose(4.0));
    app.update();

    let hips = transform(&app, rig.hips);
    assert_eq!(hips.translation, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(hips.rotation, Quat::from_xyzw(0.0, 0.0, 0.6, 0.8));
    assert_eq!(transform(&app, rig.finger).translation, Vec3::new(2.0, 3.0, 4.0));
    // No rig entity for Chest, nothing else changes.
    assert_eq!(transform(&app, rig.eye), Transform::default());
    assert_eq!(transform(&app, rig.root).translation, Vec3::new(4.0, 5.0, 6.0));
}

#[test]
fn test_hand_and_eye_filters() {
    let (mut app, rig) = setup(VmcReceiverPlugin {
        sync: quiet_sync(false, false),
        ..Default::default()
    });

    send(&app, Address::BonePose, "LeftIndexProximal", pose(2.0));
    send(&app, Address::BonePose, "LeftEye", pose(5.0));
    send(&app, Address::BonePose, "Hips", pose(1.0));
    app.update();

    assert_eq!(transform(&app, rig.finger), Transform::default());
    assert_eq!(transform(&app, rig.eye), Transform::default());
    assert_eq!(transform(&app, rig.hips).translation, Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_tick_rolls_limiter_once_per_frame() {
    let (mut app, _) = setup(VmcReceiverPlugin {
        sync: quiet_sync(true, true),
        ..Default::default()
    });

    let session = app.world().resource::<VmcSession>().clone();
    for i in 0..5 {
        session.on_message(&OscMessage::new("/VMC/Ext/T", vec![OscArg::Float(i as f32)]));
    }
    assert_eq!(session.limiter().frames_this_tick(), 5);

    app.update();
    assert_eq!(session.last_tick_count(), 5);
    assert_eq!(session.limiter().frames_this_tick(), 0);

    app.update();
    assert_eq!(session.last_tick_count(), 0);
}

#[test]
fn test_frozen_receiver_halts_sync_and_tick() {
    let receiver = Arc::new(Receiver::new(&ReceiverConfig::default()));
    let (mut app, rig) = setup(VmcReceiverPlugin::with_receiver(
        Arc::clone(&receiver),
        quiet_sync(true, true),
    ));

    receiver.on_message(&OscMessage::new("/VMC/Ext/T", vec![OscArg::Float(1.0)]));
    receiver.on_message(&OscMessage::pose(Address::BonePose, "Hips", pose(1.0)));
    receiver.set_frozen(true);
    app.update();

    assert_eq!(transform(&app, rig.hips), Transform::default());
    assert_eq!(receiver.last_tick_count(), 0);
    assert_eq!(receiver.limiter().frames_this_tick(), 1);

    receiver.set_frozen(false);
    app.update();
    assert_eq!(transform(&app, rig.hips).translation, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(receiver.last_tick_count(), 1);
}
