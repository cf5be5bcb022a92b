use thiserror::Error;

/// A datagram that is not valid OSC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OscDecodeError {
    #[error("packet truncated")]
    Truncated,
    #[error("string is not NUL terminated")]
    UnterminatedString,
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("address does not start with '/'")]
    BadAddress,
    #[error("type tag string does not start with ','")]
    MissingTypeTags,
    #[error("unsupported type tag '{0}'")]
    UnsupportedTag(char),
    #[error("invalid bundle element or blob size {0}")]
    BadElementSize(i32),
    #[error("bundles nested deeper than {0} levels")]
    BundleTooDeep(usize),
}

impl OscDecodeError {
    /// Short description without payload, used as receiver status text.
    pub fn reason(&self) -> &'static str {
        match self {
            OscDecodeError::Truncated => "truncated OSC packet",
            OscDecodeError::UnterminatedString => "unterminated OSC string",
            OscDecodeError::InvalidUtf8 => "invalid UTF-8 in OSC string",
            OscDecodeError::BadAddress => "invalid OSC address",
            OscDecodeError::MissingTypeTags => "missing OSC type tags",
            OscDecodeError::UnsupportedTag(_) => "unsupported OSC type tag",
            OscDecodeError::BadElementSize(_) => "invalid OSC element size",
            OscDecodeError::BundleTooDeep(_) => "OSC bundle nested too deep",
        }
    }
}

/// Errors starting or running the UDP listener.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("udp receiver already started")]
    AlreadyStarted,
}
