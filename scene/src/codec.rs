//! Primitive codec for the scene pack format.
//!
//! Scalars are plain-old-data values copied byte for byte in host order, strings
//! are null-terminated with no length prefix, and raw buffers carry no framing of
//! their own (their length always comes from a count written earlier).
//!
//! Readers map a short read to [`FormatError::Truncated`] naming the field that
//! was being read, so a cut-off pack never produces a silently short value.

use std::io::{self, BufRead, Read, Write};
use std::mem::size_of;

use bytemuck::Pod;

use crate::format::FormatError;

/// Writes a plain-old-data value in host byte order.
pub fn write_pod<T: Pod, W: Write>(writer: &mut W, value: &T) -> Result<(), FormatError> {
    writer.write_all(bytemuck::bytes_of(value))?;
    Ok(())
}

/// Reads a plain-old-data value in host byte order.
pub fn read_pod<T: Pod, R: Read>(reader: &mut R, what: &'static str) -> Result<T, FormatError> {
    let mut value = T::zeroed();
    reader
        .read_exact(bytemuck::bytes_of_mut(&mut value))
        .map_err(|e| truncated(e, what))?;
    Ok(value)
}

/// Writes an element count as a u64.
pub fn write_count<W: Write>(writer: &mut W, count: usize) -> Result<(), FormatError> {
    write_pod(writer, &(count as u64))
}

/// Reads a u64 element count, rejecting values that cannot be addressed on this host.
pub fn read_count<R: Read>(reader: &mut R, what: &'static str) -> Result<usize, FormatError> {
    let count: u64 = read_pod(reader, what)?;
    usize::try_from(count).map_err(|_| FormatError::CountOverflow { what, count })
}

/// Writes a string followed by a single `0x00` terminator.
pub fn write_cstring<W: Write>(writer: &mut W, value: &str) -> Result<(), FormatError> {
    if value.as_bytes().contains(&0) {
        return Err(FormatError::EmbeddedNul(value.to_string()));
    }
    writer.write_all(value.as_bytes())?;
    writer.write_all(&[0])?;
    Ok(())
}

/// Reads bytes up to and including the next `0x00` and returns them without the terminator.
pub fn read_cstring<R: BufRead>(reader: &mut R, what: &'static str) -> Result<String, FormatError> {
    let mut bytes = Vec::new();
    reader.read_until(0, &mut bytes)?;
    if bytes.pop() != Some(0) {
        return Err(FormatError::Truncated(what));
    }
    String::from_utf8(bytes).map_err(|_| FormatError::InvalidString(what))
}

/// Writes a raw byte buffer with no framing.
pub fn write_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<(), FormatError> {
    writer.write_all(bytes)?;
    Ok(())
}

/// Reads exactly `len` raw bytes.
///
/// The buffer only grows as bytes actually arrive, so a corrupt length cannot
/// trigger a huge allocation up front.
pub fn read_bytes<R: Read>(reader: &mut R, len: usize, what: &'static str) -> Result<Vec<u8>, FormatError> {
    let mut bytes = Vec::new();
    reader.take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(FormatError::Truncated(what));
    }
    Ok(bytes)
}

/// Reads `count` fixed-size elements of `T` stored back to back.
pub fn read_pod_array<T: Pod, R: Read>(
    reader: &mut R,
    count: usize,
    what: &'static str,
) -> Result<Vec<T>, FormatError> {
    let len = count
        .checked_mul(size_of::<T>())
        .ok_or(FormatError::CountOverflow { what, count: count as u64 })?;
    let bytes = read_bytes(reader, len, what)?;
    Ok(bytes
        .chunks_exact(size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

/// Writes a slice of fixed-size elements back to back.
pub fn write_pod_array<T: Pod, W: Write>(writer: &mut W, values: &[T]) -> Result<(), FormatError> {
    write_bytes(writer, bytemuck::cast_slice(values))
}

fn truncated(error: io::Error, what: &'static str) -> FormatError {
    if error.kind() == io::ErrorKind::UnexpectedEof {
        FormatError::Truncated(what)
    } else {
        FormatError::IoError(error)
    }
}
