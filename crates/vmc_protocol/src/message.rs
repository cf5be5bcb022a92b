//! OSC message model and the VMC address schemas.
//!
//! The transport hands over [`OscMessage`] values (address + typed argument
//! list). Each known address has a fixed argument layout:
//!
//! | Address              | 0      | 1..=3       | 4..=7             |
//! |----------------------|--------|-------------|-------------------|
//! | `/VMC/Ext/Bone/Pos`  | string | 3 × float32 | 4 × float32 (quat) |
//! | `/VMC/Ext/Tra/Pos`   | string | 3 × float32 | 4 × float32 (quat) |
//! | `/VMC/Ext/Root/Pos`  | string | 3 × float32 | 4 × float32 (quat) |
//! | `/VMC/Ext/OK`        | int32  |             |                   |
//! | `/VMC/Ext/T`         | float32|             |                   |
//!
//! Types are matched exactly (no int/float widening). Arguments after the
//! listed positions are ignored; senders append optional fields there.

use std::fmt;

use strum::{Display, EnumIter, IntoStaticStr};

use crate::error::SchemaError;
use crate::pose::{Pose, Position, Rotation};

/// A single OSC argument as decoded by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum OscArg {
    Int(i32),
    Float(f32),
    String(String),
    Blob(Vec<u8>),
    Long(i64),
    Double(f64),
    Bool(bool),
    Nil,
}

impl OscArg {
    pub fn kind(&self) -> ArgKind {
        match self {
            OscArg::Int(_) => ArgKind::Int,
            OscArg::Float(_) => ArgKind::Float,
            OscArg::String(_) => ArgKind::String,
            OscArg::Blob(_) => ArgKind::Blob,
            OscArg::Long(_) => ArgKind::Long,
            OscArg::Double(_) => ArgKind::Double,
            OscArg::Bool(_) => ArgKind::Bool,
            OscArg::Nil => ArgKind::Nil,
        }
    }
}

impl From<i32> for OscArg {
    fn from(value: i32) -> Self {
        OscArg::Int(value)
    }
}

impl From<f32> for OscArg {
    fn from(value: f32) -> Self {
        OscArg::Float(value)
    }
}

impl From<&str> for OscArg {
    fn from(value: &str) -> Self {
        OscArg::String(value.to_owned())
    }
}

impl From<String> for OscArg {
    fn from(value: String) -> Self {
        OscArg::String(value)
    }
}

/// Type of an [`OscArg`], used in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArgKind {
    Int,
    Float,
    String,
    Blob,
    Long,
    Double,
    Bool,
    Nil,
}

/// One decoded OSC message.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<OscArg>,
}

impl OscMessage {
    pub fn new(address: impl Into<String>, args: Vec<OscArg>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// Bone, tracker or root pose message with the canonical layout.
    pub fn pose(address: Address, name: &str, pose: Pose) -> Self {
        let Pose { position: p, rotation: r } = pose;
        Self::new(
            address.path(),
            vec![
                name.into(),
                p.x.into(),
                p.y.into(),
                p.z.into(),
                r.x.into(),
                r.y.into(),
                r.z.into(),
                r.w.into(),
            ],
        )
    }
}

/// The addresses this receiver understands.
///
/// Declaration order is the handler priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Address {
    BonePose,
    TrackerPose,
    RootPose,
    Available,
    Time,
}

impl Address {
    pub const fn path(self) -> &'static str {
        match self {
            Address::BonePose => "/VMC/Ext/Bone/Pos",
            Address::TrackerPose => "/VMC/Ext/Tra/Pos",
            Address::RootPose => "/VMC/Ext/Root/Pos",
            Address::Available => "/VMC/Ext/OK",
            Address::Time => "/VMC/Ext/T",
        }
    }

    /// Exact match against the known paths; no wildcards, no prefixes.
    pub fn parse(path: &str) -> Option<Self> {
        match path {
            "/VMC/Ext/Bone/Pos" => Some(Address::BonePose),
            "/VMC/Ext/Tra/Pos" => Some(Address::TrackerPose),
            "/VMC/Ext/Root/Pos" => Some(Address::RootPose),
            "/VMC/Ext/OK" => Some(Address::Available),
            "/VMC/Ext/T" => Some(Address::Time),
            _ => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A message that passed its address schema.
///
/// Borrows the joint name from the source [`OscMessage`]; nothing here is
/// applied to any state yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VmcMessage<'a> {
    BonePose { name: &'a str, pose: Pose },
    TrackerPose { name: &'a str, pose: Pose },
    /// The label is required on the wire but carries no meaning here.
    RootPose { label: &'a str, pose: Pose },
    Available(i32),
    /// Sender clock. By sender convention exactly one is emitted per sender
    /// frame, so it doubles as the frame marker the rate limiter counts.
    Time(f32),
}

impl<'a> VmcMessage<'a> {
    /// Validate `args` against the layout of `address`.
    ///
    /// Every position is checked before anything is returned, so a rejected
    /// message can never be partially applied.
    pub fn decode(address: Address, args: &'a [OscArg]) -> Result<Self, SchemaError> {
        let args = Args { address, args };
        Ok(match address {
            Address::BonePose => VmcMessage::BonePose {
                name: args.string(0)?,
                pose: args.pose(1)?,
            },
            Address::TrackerPose => VmcMessage::TrackerPose {
                name: args.string(0)?,
                pose: args.pose(1)?,
            },
            Address::RootPose => VmcMessage::RootPose {
                label: args.string(0)?,
                pose: args.pose(1)?,
            },
            Address::Available => VmcMessage::Available(args.int(0)?),
            Address::Time => VmcMessage::Time(args.float(0)?),
        })
    }

    pub fn address(&self) -> Address {
        match self {
            VmcMessage::BonePose { .. } => Address::BonePose,
            VmcMessage::TrackerPose { .. } => Address::TrackerPose,
            VmcMessage::RootPose { .. } => Address::RootPose,
            VmcMessage::Available(_) => Address::Available,
            VmcMessage::Time(_) => Address::Time,
        }
    }
}

struct Args<'a> {
    address: Address,
    args: &'a [OscArg],
}

impl<'a> Args<'a> {
    fn get(&self, index: usize, expected: ArgKind) -> Result<&'a OscArg, SchemaError> {
        self.args.get(index).ok_or(SchemaError::Missing {
            address: self.address,
            index,
            expected,
        })
    }

    fn mismatch(&self, index: usize, expected: ArgKind, found: &OscArg) -> SchemaError {
        SchemaError::WrongType {
            address: self.address,
            index,
            expected,
            found: found.kind(),
        }
    }

    fn string(&self, index: usize) -> Result<&'a str, SchemaError> {
        match self.get(index, ArgKind::String)? {
            OscArg::String(value) => Ok(value.as_str()),
            other => Err(self.mismatch(index, ArgKind::String, other)),
        }
    }

    fn float(&self, index: usize) -> Result<f32, SchemaError> {
        match self.get(index, ArgKind::Float)? {
            OscArg::Float(value) => Ok(*value),
            other => Err(self.mismatch(index, ArgKind::Float, other)),
        }
    }

    fn int(&self, index: usize) -> Result<i32, SchemaError> {
        match self.get(index, ArgKind::Int)? {
            OscArg::Int(value) => Ok(*value),
            other => Err(self.mismatch(index, ArgKind::Int, other)),
        }
    }

    /// Seven floats starting at `first`: position then quaternion.
    fn pose(&self, first: usize) -> Result<Pose, SchemaError> {
        let position = Position::new(
            self.float(first)?,
            self.float(first + 1)?,
            self.float(first + 2)?,
        );
        let rotation = Rotation::new(
            self.float(first + 3)?,
            self.float(first + 4)?,
            self.float(first + 5)?,
            self.float(first + 6)?,
        );
        Ok(Pose::new(position, rotation))
    }
}
