use thiserror::Error;

use crate::message::{Address, ArgKind};

/// A known address whose arguments do not match its layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{address}: missing argument {index}, expected {expected}")]
    Missing {
        address: Address,
        index: usize,
        expected: ArgKind,
    },
    #[error("{address}: argument {index} is {found}, expected {expected}")]
    WrongType {
        address: Address,
        index: usize,
        expected: ArgKind,
        found: ArgKind,
    },
}

impl SchemaError {
    pub fn address(&self) -> Address {
        match self {
            SchemaError::Missing { address, .. } | SchemaError::WrongType { address, .. } => {
                *address
            }
        }
    }
}

/// Why a message was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("malformed message: {0}")]
    Malformed(#[from] SchemaError),
    #[error("unknown address")]
    UnknownAddress,
}
