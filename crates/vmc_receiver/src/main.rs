mod cli;
mod config;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::prelude::*;
use clap::Parser;
use strum::IntoEnumIterator;
use tracing::info;
use vmc_bevy::{RootTarget, Skeleton, VmcReceiverPlugin};
use vmc_protocol::{HumanBone, Receiver};
use vmc_transport::UdpReceiver;

use crate::cli::Args;
use crate::config::AppConfig;

const FRAME_TIME: Duration = Duration::from_micros(16_667);

/// Keeps the UDP listener alive for as long as the app runs.
#[derive(Resource)]
struct Transport {
    _listener: UdpReceiver,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    let _log_guard = logging::init(&config.logging)?;
    info!(
        freeze = config.receiver.freeze,
        rate_limit = config.receiver.rate_limit_enabled,
        threshold = config.receiver.rate_limit_threshold,
        "starting vmc_receiver {}",
        env!("CARGO_PKG_VERSION")
    );

    let receiver = Arc::new(Receiver::new(&config.receiver));

    let listen_addr = config.transport.listen_addr;
    let mut transport = UdpReceiver::new(config.transport.clone())
        .context("creating transport runtime")?;
    transport
        .start(Arc::clone(&receiver))
        .with_context(|| format!("binding {listen_addr}"))?;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(FRAME_TIME)))
        .add_plugins(VmcReceiverPlugin::with_receiver(receiver, config.sync.clone()))
        .insert_resource(Transport {
            _listener: transport,
        })
        .add_systems(Startup, spawn_demo_skeleton);

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("app exited with code {code}"),
    }
}

/// One entity per joint plus a root target, so every cached pose has
/// somewhere to land.
fn spawn_demo_skeleton(mut commands: Commands) {
    commands.spawn((Name::new("Root"), Transform::default(), RootTarget));

    let mut skeleton = Skeleton::new();
    for bone in HumanBone::iter() {
        let entity = commands
            .spawn((Name::new(bone.name()), Transform::default()))
            .id();
        skeleton.insert(bone, entity);
    }
    info!(target: vmc_bevy::LOG_SYNC, joints = skeleton.len(), "demo skeleton spawned");
    commands.spawn((Name::new("Skeleton"), skeleton));
}
