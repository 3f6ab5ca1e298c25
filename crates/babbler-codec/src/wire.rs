//! Byte-level read/write helpers shared by both formats.
//!
//! The legacy format is host-native byte order (preserved as-is, never
//! "corrected"); the compact format is big-endian with a 2-bit width code
//! per field selecting a u8/u16/u32/u64 encoding.

use std::io::{Read, Write};

use crate::errors::{CodecError, Result};

/// Read exactly `N` bytes.
pub(crate) fn read_bytes<const N: usize, R: Read>(r: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub(crate) fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    Ok(read_bytes::<1, _>(r)?[0])
}

pub(crate) fn read_u16_ne<R: Read>(r: &mut R) -> Result<u16> {
    Ok(u16::from_ne_bytes(read_bytes::<2, _>(r)?))
}

pub(crate) fn read_u32_ne<R: Read>(r: &mut R) -> Result<u32> {
    Ok(u32::from_ne_bytes(read_bytes::<4, _>(r)?))
}

pub(crate) fn write_u8<W: Write>(w: &mut W, value: u8) -> Result<()> {
    w.write_all(&[value])?;
    Ok(())
}

pub(crate) fn write_u16_ne<W: Write>(w: &mut W, value: u16) -> Result<()> {
    w.write_all(&value.to_ne_bytes())?;
    Ok(())
}

pub(crate) fn write_u32_ne<W: Write>(w: &mut W, value: u32) -> Result<()> {
    w.write_all(&value.to_ne_bytes())?;
    Ok(())
}

pub(crate) fn read_u32_be<R: Read>(r: &mut R) -> Result<u32> {
    Ok(u32::from_be_bytes(read_bytes::<4, _>(r)?))
}

pub(crate) fn write_u32_be<W: Write>(w: &mut W, value: u32) -> Result<()> {
    w.write_all(&value.to_be_bytes())?;
    Ok(())
}

/// Smallest 2-bit width code whose encoding fits `value`.
pub(crate) fn width_code(value: u64) -> u8 {
    if value <= u64::from(u8::MAX) {
        0
    } else if value <= u64::from(u16::MAX) {
        1
    } else if value <= u64::from(u32::MAX) {
        2
    } else {
        3
    }
}

/// Write `value` big-endian at the width selected by `code`. Callers pair
/// `code` with [`width_code`] of the same value, so the casts never narrow.
pub(crate) fn write_uint_be<W: Write>(w: &mut W, code: u8, value: u64) -> Result<()> {
    debug_assert!(code >= width_code(value), "width code too narrow for value");
    match code {
        0 => w.write_all(&[value as u8])?,
        1 => w.write_all(&(value as u16).to_be_bytes())?,
        2 => w.write_all(&(value as u32).to_be_bytes())?,
        _ => w.write_all(&value.to_be_bytes())?,
    }
    Ok(())
}

/// Read a big-endian unsigned integer at the width selected by `code`.
pub(crate) fn read_uint_be<R: Read>(r: &mut R, code: u8) -> Result<u64> {
    Ok(match code {
        0 => u64::from(read_u8(r)?),
        1 => u64::from(u16::from_be_bytes(read_bytes::<2, _>(r)?)),
        2 => u64::from(u32::from_be_bytes(read_bytes::<4, _>(r)?)),
        _ => u64::from_be_bytes(read_bytes::<8, _>(r)?),
    })
}

/// Narrow a decoded u64 statistic into the store's column type.
pub(crate) fn into_stat(value: u64, field: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| CodecError::Corrupt(format!("{field} value {value} out of range")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
