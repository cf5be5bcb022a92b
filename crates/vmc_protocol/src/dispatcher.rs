//! Address dispatch.
//!
//! The address string is matched once into an [`Address`], the arguments are
//! validated into a [`VmcMessage`], and only then is state touched. A
//! rejected message updates nothing but the status text.

use std::sync::Arc;

use tracing::trace;

use crate::error::DispatchError;
use crate::message::{Address, OscMessage, VmcMessage};
use crate::pose::PoseCache;
use crate::resolver::JointResolver;
use crate::session::{SessionState, Status};
use crate::{HumanBone, LOG_DISPATCH};

/// Effect of a successfully validated message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Applied {
    /// `None` when the joint name is outside the vocabulary.
    BonePose(Option<HumanBone>),
    TrackerPose(Option<HumanBone>),
    RootPose,
    Available(i32),
    /// One sender frame; the caller counts it toward the tick rate.
    Frame(f32),
}

/// Routes validated messages into the caches and session scalars.
///
/// The dispatcher is the only writer of that state; readers hold the same
/// `Arc`s and see every update atomically per joint / per scalar.
#[derive(Debug)]
pub struct MessageDispatcher {
    resolver: JointResolver,
    performer: Arc<PoseCache>,
    trackers: Arc<PoseCache>,
    session: Arc<SessionState>,
}

impl MessageDispatcher {
    pub fn new(
        performer: Arc<PoseCache>,
        trackers: Arc<PoseCache>,
        session: Arc<SessionState>,
    ) -> Self {
        Self {
            resolver: JointResolver::new(),
            performer,
            trackers,
            session,
        }
    }

    pub fn dispatch(&mut self, message: &OscMessage) -> Result<Applied, DispatchError> {
        let address = Address::parse(&message.address).ok_or(DispatchError::UnknownAddress)?;

        match VmcMessage::decode(address, &message.args) {
            Ok(decoded) => Ok(self.apply(decoded)),
            Err(err) => {
                self.session.set_status(Status::Malformed(err));
                Err(err.into())
            }
        }
    }

    /// Apply an already validated message.
    pub fn apply(&mut self, message: VmcMessage<'_>) -> Applied {
        let applied = match message {
            VmcMessage::BonePose { name, pose } => {
                let bone = self.resolver.resolve(name);
                if let Some(bone) = bone {
                    self.performer.set_pose(bone, pose);
                }
                Applied::BonePose(bone)
            }
            VmcMessage::TrackerPose { name, pose } => {
                let bone = self.resolver.resolve(name);
                if let Some(bone) = bone {
                    self.trackers.set_pose(bone, pose);
                }
                Applied::TrackerPose(bone)
            }
            VmcMessage::RootPose { pose, .. } => {
                self.session.set_root_pose(pose);
                self.session.set_status(Status::RootPoseOk);
                Applied::RootPose
            }
            VmcMessage::Available(value) => {
                self.session.set_availability(value);
                Applied::Available(value)
            }
            VmcMessage::Time(value) => {
                self.session.set_remote_time(value);
                Applied::Frame(value)
            }
        };
        trace!(target: LOG_DISPATCH, ?applied, "applied {}", message.address());
        applied
    }

    pub fn resolver(&self) -> &JointResolver {
        &self.resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::message::OscArg;
    use crate::pose::{Pose, Position, Rotation};

    struct Fixture {
        dispatcher: MessageDispatcher,
        performer: Arc<PoseCache>,
        trackers: Arc<PoseCache>,
        session: Arc<SessionState>,
    }

    fn fixture() -> Fixture {
        let performer = Arc::new(PoseCache::new());
        let trackers = Arc::new(PoseCache::new());
        let session = Arc::new(SessionState::new());
        Fixture {
            dispatcher: MessageDispatcher::new(
                Arc::clone(&performer),
                Arc::clone(&trackers),
                Arc::clone(&session),
            ),
            performer,
            trackers,
            session,
        }
    }

    fn pose(x: f32) -> Pose {
        Pose::new(Position::new(x, 0.0, 0.0), Rotation::IDENTITY)
    }

    #[test]
    fn bone_and_tracker_caches_are_separate() {
        let mut f = fixture();
        let bone = OscMessage::pose(Address::BonePose, "Hips", pose(1.0));
        let tracker = OscMessage::pose(Address::TrackerPose, "Hips", pose(2.0));

        assert_eq!(
            f.dispatcher.dispatch(&bone),
            Ok(Applied::BonePose(Some(HumanBone::Hips)))
        );
        assert_eq!(
            f.dispatcher.dispatch(&tracker),
            Ok(Applied::TrackerPose(Some(HumanBone::Hips)))
        );
        assert_eq!(f.performer.get_pose(HumanBone::Hips), Some(pose(1.0)));
        assert_eq!(f.trackers.get_pose(HumanBone::Hips), Some(pose(2.0)));
    }

    #[test]
    fn unresolved_joint_is_accepted_without_effect() {
        let mut f = fixture();
        let message = OscMessage::pose(Address::TrackerPose, "Tracker 3", pose(1.0));
        assert_eq!(f.dispatcher.dispatch(&message), Ok(Applied::TrackerPose(None)));
        assert!(f.trackers.is_empty());
        assert_eq!(f.session.status(), Status::Waiting);
        assert_eq!(f.dispatcher.resolver().stats().unresolved, 1);
    }

    #[test]
    fn root_pose_updates_session_and_status() {
        let mut f = fixture();
        let message = OscMessage::pose(Address::RootPose, "root", pose(4.0));
        assert_eq!(f.dispatcher.dispatch(&message), Ok(Applied::RootPose));
        assert_eq!(f.session.root_pose(), pose(4.0));
        assert_eq!(f.session.status(), Status::RootPoseOk);
        assert!(f.performer.is_empty());
    }

    #[test]
    fn control_messages() {
        let mut f = fixture();
        let ok = OscMessage::new(Address::Available.path(), vec![OscArg::Int(1)]);
        let time = OscMessage::new(Address::Time.path(), vec![OscArg::Float(3.5)]);
        assert_eq!(f.dispatcher.dispatch(&ok), Ok(Applied::Available(1)));
        assert_eq!(f.dispatcher.dispatch(&time), Ok(Applied::Frame(3.5)));
        assert_eq!(f.session.availability(), 1);
        assert_eq!(f.session.remote_time(), 3.5);
    }

    #[test]
    fn rejection_only_touches_status() {
        let mut f = fixture();
        f.dispatcher
            .dispatch(&OscMessage::pose(Address::BonePose, "Head", pose(1.0)))
            .unwrap();

        let mut bad = OscMessage::pose(Address::BonePose, "Head", pose(9.0));
        bad.args[7] = OscArg::Int(1);
        let err = f.dispatcher.dispatch(&bad).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Malformed(SchemaError::WrongType { index: 7, .. })
        ));
        assert_eq!(f.performer.get_pose(HumanBone::Head), Some(pose(1.0)));
        assert!(matches!(f.session.status(), Status::Malformed(_)));
        assert_eq!(f.session.root_pose(), Pose::IDENTITY);
    }

    #[test]
    fn unknown_address_leaves_status_alone() {
        let mut f = fixture();
        let message = OscMessage::new("/VMC/Ext/Blend/Val", vec!["A".into(), 1.0f32.into()]);
        assert_eq!(
            f.dispatcher.dispatch(&message),
            Err(DispatchError::UnknownAddress)
        );
        assert_eq!(f.session.status(), Status::Waiting);
    }
}
