//! OSC 1.0 packet codec.
//!
//! Responsibilities:
//! - Decode one UDP datagram into zero or more [`OscMessage`]s. A datagram is
//!   either a single message or a `#bundle` whose elements are messages or
//!   nested bundles.
//! - Encode messages and bundles (used by senders and tests).
//!
//! Layout reminders:
//! - Strings are NUL terminated and padded with NULs to a multiple of 4.
//! - Numbers are big endian. Blobs are `[i32 len][bytes][pad]`.
//! - Bundle: `"#bundle\0"`, 8 byte time tag, then `[i32 size][element]`...
//!
//! Bundle time tags are not interpreted; elements are delivered immediately
//! in packet order.
//!
//! Error handling: decoding stops at the first malformed element. Messages
//! decoded before it stay in the output vector so the caller can still use
//! them.

use vmc_protocol::{OscArg, OscMessage};

use crate::error::OscDecodeError;

const BUNDLE_TAG: &[u8; 8] = b"#bundle\0";

/// Bundles nested deeper than this are rejected.
pub const MAX_BUNDLE_DEPTH: usize = 8;

/// Decode `packet`, appending the contained messages to `out`.
pub fn decode_packet(packet: &[u8], out: &mut Vec<OscMessage>) -> Result<(), OscDecodeError> {
    decode_element(packet, out, 0)
}

fn decode_element(
    element: &[u8],
    out: &mut Vec<OscMessage>,
    depth: usize,
) -> Result<(), OscDecodeError> {
    if element.starts_with(BUNDLE_TAG) {
        decode_bundle(element, out, depth)
    } else {
        out.push(decode_message(element)?);
        Ok(())
    }
}

fn decode_bundle(
    bundle: &[u8],
    out: &mut Vec<OscMessage>,
    depth: usize,
) -> Result<(), OscDecodeError> {
    if depth >= MAX_BUNDLE_DEPTH {
        return Err(OscDecodeError::BundleTooDeep(MAX_BUNDLE_DEPTH));
    }

    let mut reader = Reader::new(bundle);
    reader.take(BUNDLE_TAG.len())?;
    let _time_tag = reader.take(8)?;

    while !reader.is_empty() {
        let size = reader.i32()?;
        let size = usize::try_from(size).map_err(|_| OscDecodeError::BadElementSize(size))?;
        if size % 4 != 0 {
            return Err(OscDecodeError::BadElementSize(size as i32));
        }
        let element = reader.take(size)?;
        decode_element(element, out, depth + 1)?;
    }
    Ok(())
}

/// Decode a single (non-bundle) message.
pub fn decode_message(packet: &[u8]) -> Result<OscMessage, OscDecodeError> {
    let mut reader = Reader::new(packet);
    let address = reader.string()?;
    if !address.starts_with('/') {
        return Err(OscDecodeError::BadAddress);
    }

    // Very old senders omit the type tag string entirely.
    if reader.is_empty() {
        return Ok(OscMessage::new(address, Vec::new()));
    }

    let tags = reader.string()?;
    let tags = tags
        .strip_prefix(',')
        .ok_or(OscDecodeError::MissingTypeTags)?;

    let mut args = Vec::with_capacity(tags.len());
    for tag in tags.chars() {
        let arg = match tag {
            'i' => OscArg::Int(reader.i32()?),
            'f' => OscArg::Float(f32::from_bits(reader.u32()?)),
            's' | 'S' => OscArg::String(reader.string()?.to_owned()),
            'b' => OscArg::Blob(reader.blob()?.to_vec()),
            'h' => OscArg::Long(reader.i64()?),
            'd' => OscArg::Double(f64::from_bits(reader.u64()?)),
            'T' => OscArg::Bool(true),
            'F' => OscArg::Bool(false),
            'N' => OscArg::Nil,
            other => return Err(OscDecodeError::UnsupportedTag(other)),
        };
        args.push(arg);
    }

    Ok(OscMessage::new(address, args))
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], OscDecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(OscDecodeError::Truncated)?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], OscDecodeError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn u32(&mut self) -> Result<u32, OscDecodeError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    fn i32(&mut self) -> Result<i32, OscDecodeError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64, OscDecodeError> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    fn i64(&mut self) -> Result<i64, OscDecodeError> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    fn string(&mut self) -> Result<&'a str, OscDecodeError> {
        let rest = &self.data[self.pos..];
        let nul = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(OscDecodeError::UnterminatedString)?;
        let text = std::str::from_utf8(&rest[..nul]).map_err(|_| OscDecodeError::InvalidUtf8)?;
        self.take(padded(nul + 1))?;
        Ok(text)
    }

    fn blob(&mut self) -> Result<&'a [u8], OscDecodeError> {
        let len = self.i32()?;
        let len = usize::try_from(len).map_err(|_| OscDecodeError::BadElementSize(len))?;
        let padded_block = self.take(padded(len))?;
        Ok(&padded_block[..len])
    }
}

const fn padded(len: usize) -> usize {
    (len + 3) & !3
}

// -------------------------------------------------------------------------------------------------
// Encoding
// -------------------------------------------------------------------------------------------------

/// Append the OSC encoding of `message` to `out`.
pub fn encode_message(message: &OscMessage, out: &mut Vec<u8>) {
    write_string(&message.address, out);

    let mut tags = String::with_capacity(message.args.len() + 1);
    tags.push(',');
    for arg in &message.args {
        tags.push(match arg {
            OscArg::Int(_) => 'i',
            OscArg::Float(_) => 'f',
            OscArg::String(_) => 's',
            OscArg::Blob(_) => 'b',
            OscArg::Long(_) => 'h',
            OscArg::Double(_) => 'd',
            OscArg::Bool(true) => 'T',
            OscArg::Bool(false) => 'F',
            OscArg::Nil => 'N',
        });
    }
    write_string(&tags, out);

    for arg in &message.args {
        match arg {
            OscArg::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
            OscArg::Float(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
            OscArg::String(v) => write_string(v, out),
            OscArg::Blob(v) => {
                out.extend_from_slice(&(v.len() as i32).to_be_bytes());
                out.extend_from_slice(v);
                pad(out);
            }
            OscArg::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
            OscArg::Double(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
            OscArg::Bool(_) | OscArg::Nil => {}
        }
    }
}

/// Append a bundle (time tag "immediately") containing `messages`.
pub fn encode_bundle(messages: &[OscMessage], out: &mut Vec<u8>) {
    out.extend_from_slice(BUNDLE_TAG);
    out.extend_from_slice(&1u64.to_be_bytes());
    for message in messages {
        let size_at = out.len();
        out.extend_from_slice(&[0; 4]);
        encode_message(message, out);
        let size = (out.len() - size_at - 4) as i32;
        out[size_at..size_at + 4].copy_from_slice(&size.to_be_bytes());
    }
}

fn write_string(value: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(value.as_bytes());
    out.push(0);
    pad(out);
}

fn pad(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmc_protocol::{Address, Pose, Position, Rotation};

    fn bone_pos() -> OscMessage {
        OscMessage::pose(
            Address::BonePose,
            "Head",
            Pose::new(Position::new(0.0, 1.5, 0.0), Rotation::IDENTITY),
        )
    }

    #[test]
    fn message_layout_matches_osc() {
        let mut out = Vec::new();
        encode_message(
            &OscMessage::new("/VMC/Ext/OK", vec![OscArg::Int(1)]),
            &mut out,
        );
        assert_eq!(
            out,
            b"/VMC/Ext/OK\0,i\0\0\0\0\0\x01".to_vec(),
        );
        assert_eq!(decode_message(&out).unwrap().args, vec![OscArg::Int(1)]);
    }

    #[test]
    fn decodes_pose_message() {
        let mut out = Vec::new();
        encode_message(&bone_pos(), &mut out);
        assert_eq!(out.len() % 4, 0);
        assert_eq!(decode_message(&out).unwrap(), bone_pos());
    }

    #[test]
    fn decodes_nested_bundles_in_order() {
        let time = OscMessage::new("/VMC/Ext/T", vec![OscArg::Float(1.0)]);
        let mut inner = Vec::new();
        encode_bundle(&[bone_pos()], &mut inner);

        let mut packet = Vec::new();
        encode_bundle(&[time.clone()], &mut packet);
        packet.extend_from_slice(&(inner.len() as i32).to_be_bytes());
        packet.extend_from_slice(&inner);

        let mut out = Vec::new();
        decode_packet(&packet, &mut out).unwrap();
        assert_eq!(out, vec![time, bone_pos()]);
    }

    #[test]
    fn truncated_bundle_keeps_earlier_messages() {
        let time = OscMessage::new("/VMC/Ext/T", vec![OscArg::Float(1.0)]);
        let mut packet = Vec::new();
        encode_bundle(&[time.clone(), bone_pos()], &mut packet);
        packet.truncate(packet.len() - 8);

        let mut out = Vec::new();
        let err = decode_packet(&packet, &mut out).unwrap_err();
        assert_eq!(err, OscDecodeError::Truncated);
        assert_eq!(out, vec![time]);
    }

    #[test]
    fn rejects_garbage() {
        let mut out = Vec::new();
        assert_eq!(
            decode_packet(b"/abc", &mut out),
            Err(OscDecodeError::UnterminatedString)
        );
        assert_eq!(
            decode_packet(b"abc\0", &mut out),
            Err(OscDecodeError::BadAddress)
        );
        assert_eq!(
            decode_packet(b"/a\0\0i\0\0\0", &mut out),
            Err(OscDecodeError::MissingTypeTags)
        );
        assert_eq!(
            decode_packet(b"/a\0\0,i\0\0", &mut out),
            Err(OscDecodeError::Truncated)
        );
        assert_eq!(
            decode_packet(b"/a\0\0,t\0\0\0\0\0\0\0\0\0\0", &mut out),
            Err(OscDecodeError::UnsupportedTag('t'))
        );
        assert_eq!(
            decode_packet(b"/\xff\0\0", &mut out),
            Err(OscDecodeError::InvalidUtf8)
        );
        assert!(out.is_empty());
    }

    #[test]
    fn rejects_unaligned_and_deep_bundles() {
        let mut packet = Vec::new();
        packet.extend_from_slice(BUNDLE_TAG);
        packet.extend_from_slice(&[0; 8]);
        packet.extend_from_slice(&3i32.to_be_bytes());
        packet.extend_from_slice(b"/a\0\0");
        let mut out = Vec::new();
        assert_eq!(
            decode_packet(&packet, &mut out),
            Err(OscDecodeError::BadElementSize(3))
        );

        let mut nested = Vec::new();
        encode_bundle(&[], &mut nested);
        for _ in 0..MAX_BUNDLE_DEPTH {
            let mut outer = Vec::new();
            encode_bundle(&[], &mut outer);
            outer.extend_from_slice(&(nested.len() as i32).to_be_bytes());
            outer.extend_from_slice(&nested);
            nested = outer;
        }
        assert_eq!(
            decode_packet(&nested, &mut out),
            Err(OscDecodeError::BundleTooDeep(MAX_BUNDLE_DEPTH))
        );
    }

    #[test]
    fn message_without_type_tags_has_no_args() {
        let message = decode_message(b"/VMC/Ext/T\0\0").unwrap();
        assert_eq!(message.address, "/VMC/Ext/T");
        assert!(message.args.is_empty());
    }

    #[test]
    fn all_argument_kinds_decode() {
        let message = OscMessage::new(
            "/x",
            vec![
                OscArg::Int(-2),
                OscArg::Float(0.5),
                OscArg::String("abcd".into()),
                OscArg::Blob(vec![1, 2, 3]),
                OscArg::Long(1 << 40),
                OscArg::Double(-0.25),
                OscArg::Bool(true),
                OscArg::Bool(false),
                OscArg::Nil,
            ],
        );
        let mut out = Vec::new();
        encode_message(&message, &mut out);
        assert_eq!(decode_message(&out).unwrap(), message);
    }
}
