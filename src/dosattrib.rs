//! DOSATTRIB extended-attribute blob
//!
//! Layout (little-endian), as read by SMB servers from `user.DOSATTRIB`:
//!
//! ```text
//! "0x<hex attrib>" NUL      pad to 2
//! u16 version, u16 version  pad to 4
//! u32 valid_flags
//! u32 attrib
//! u32 ea_size
//! u32 size_lo, u32 size_hi
//! u32 alloc_lo, u32 alloc_hi
//! u64 create_time           (NT ticks)
//! u32 change_lo, u32 change_hi
//! ```

use crate::datetime::EpochTimestamp;
use crate::error::{PrimError, Result};
use crate::logging::{self, LogLevel};
use crate::uint64::Uint64;
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::io::{Cursor, Seek, SeekFrom};

// ============================================================================
// DOSATTRIB Constants
// ============================================================================

/// Info level written into both version fields
pub const DOSATTRIB_VERSION: u16 = 3;

/// `valid_flags` bit: the attrib field is meaningful
pub const XATTR_DOSINFO_ATTRIB: u32 = 0x0000_0001;

/// `valid_flags` bit: the create_time field is meaningful
pub const XATTR_DOSINFO_CREATE_TIME: u32 = 0x0000_0010;

const VALID_FLAGS: u32 = XATTR_DOSINFO_ATTRIB | XATTR_DOSINFO_CREATE_TIME;

/// Longest possible hex prefix: "0xffffffff"
const MAX_HEX_LEN: usize = 10;

pub mod file_attributes {
    pub const READONLY: u32 = 0x00000001;
    pub const HIDDEN: u32 = 0x00000002;
    pub const SYSTEM: u32 = 0x00000004;
    pub const DIRECTORY: u32 = 0x00000010;
    pub const ARCHIVE: u32 = 0x00000020;
    pub const NORMAL: u32 = 0x00000080;
    pub const TEMPORARY: u32 = 0x00000100;
    pub const SPARSE_FILE: u32 = 0x00000200;
    pub const REPARSE_POINT: u32 = 0x00000400;
    pub const COMPRESSED: u32 = 0x00000800;
    pub const OFFLINE: u32 = 0x00001000;
    pub const NOT_CONTENT_INDEXED: u32 = 0x00002000;
    pub const ENCRYPTED: u32 = 0x00004000;
}

// ============================================================================
// Writer
// ============================================================================

/// Sequential little-endian writer that tracks its position for padding
#[derive(Debug, Default)]
pub struct AttribWriter {
    buf: Vec<u8>,
}

impl AttribWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Append NUL bytes until the position is a multiple of `alignment`
    pub fn pad_to(&mut self, alignment: usize) -> &mut Self {
        let rem = self.buf.len() % alignment;
        if rem != 0 {
            self.buf.resize(self.buf.len() + alignment - rem, 0);
        }
        self
    }

    /// Write text followed by a NUL terminator
    pub fn cstr(&mut self, text: &str) -> &mut Self {
        self.buf.extend_from_slice(text.as_bytes());
        self.buf.push(0);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        let mut bytes = [0u8; 2];
        LittleEndian::write_u16(&mut bytes, v);
        self.buf.extend_from_slice(&bytes);
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, v);
        self.buf.extend_from_slice(&bytes);
        self
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        let mut bytes = [0u8; 8];
        LittleEndian::write_u64(&mut bytes, v);
        self.buf.extend_from_slice(&bytes);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// 100-nanosecond ticks since 1601-01-01, wrapping modulo 2^64
pub fn timespec_to_nttime(seconds: u64, nanoseconds: u32) -> Uint64 {
    EpochTimestamp::new(seconds, nanoseconds).to_nt_time()
}

/// Encode a DOSATTRIB blob carrying `attribute` and a creation time
pub fn encode_dos_attrib(attribute: u32, seconds: u64, nanoseconds: u32) -> Vec<u8> {
    let create_time = timespec_to_nttime(seconds, nanoseconds);
    if logging::enabled(LogLevel::Debug) {
        logging::debug(
            "DOSATTRIB",
            &format!(
                "encode attrib=0x{:x} sec={} nsec={} create_time={}",
                attribute, seconds, nanoseconds, create_time
            ),
        );
    }

    let mut out = AttribWriter::new();
    out.cstr(&format!("0x{:x}", attribute))
        .pad_to(2)
        .u16(DOSATTRIB_VERSION)
        .u16(DOSATTRIB_VERSION)
        .pad_to(4)
        .u32(VALID_FLAGS)
        .u32(attribute)
        // ea_size
        .u32(0)
        // size
        .u32(0)
        .u32(0)
        // alloc_size
        .u32(0)
        .u32(0)
        .u64(create_time.get())
        // change_time
        .u32(0)
        .u32(0);
    out.finish()
}

/// Same as [`encode_dos_attrib`], taking a parsed timestamp
pub fn encode_dos_attrib_at(attribute: u32, create_time: EpochTimestamp) -> Vec<u8> {
    encode_dos_attrib(attribute, create_time.seconds, create_time.nanoseconds)
}

// ============================================================================
// Decoding
// ============================================================================

/// Fields recovered from a DOSATTRIB blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DosInfo {
    /// Attribute as spelled in the leading hex text
    pub hex_attribute: u32,
    pub version: u16,
    pub valid_flags: u32,
    pub attribute: u32,
    pub ea_size: u32,
    pub size: u64,
    pub alloc_size: u64,
    /// NT ticks
    pub create_time: u64,
    pub change_time: u64,
}

impl DosInfo {
    /// Parse a blob in the layout produced by [`encode_dos_attrib`]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let nul = data
            .iter()
            .take(MAX_HEX_LEN + 1)
            .position(|&b| b == 0)
            .ok_or_else(|| PrimError::InvalidBlob("missing hex terminator".into()))?;
        let text = std::str::from_utf8(&data[..nul])
            .map_err(|_| PrimError::InvalidBlob("hex prefix is not ASCII".into()))?;
        let hex_attribute = text
            .strip_prefix("0x")
            .filter(|digits| {
                !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
            })
            .and_then(|digits| u32::from_str_radix(digits, 16).ok())
            .ok_or_else(|| PrimError::InvalidBlob(format!("bad hex prefix '{}'", text)))?;

        let mut cursor = Cursor::new(data);
        let after_text = (nul + 1 + 1) & !1;
        cursor.seek(SeekFrom::Start(after_text as u64))?;

        let version = cursor.read_u16::<LittleEndian>()?;
        let info_level = cursor.read_u16::<LittleEndian>()?;
        if version != DOSATTRIB_VERSION || info_level != DOSATTRIB_VERSION {
            return Err(PrimError::InvalidBlob(format!(
                "unsupported version {}/{}",
                version, info_level
            )));
        }

        let aligned = (cursor.position() + 3) & !3;
        cursor.seek(SeekFrom::Start(aligned))?;

        let valid_flags = cursor.read_u32::<LittleEndian>()?;
        let attribute = cursor.read_u32::<LittleEndian>()?;
        let ea_size = cursor.read_u32::<LittleEndian>()?;
        let size = read_split_u64(&mut cursor)?;
        let alloc_size = read_split_u64(&mut cursor)?;
        let create_time = cursor.read_u64::<LittleEndian>()?;
        let change_time = read_split_u64(&mut cursor)?;

        Ok(Self {
            hex_attribute,
            version,
            valid_flags,
            attribute,
            ea_size,
            size,
            alloc_size,
            create_time,
            change_time,
        })
    }

    pub fn has_create_time(&self) -> bool {
        self.valid_flags & XATTR_DOSINFO_CREATE_TIME != 0
    }

    pub fn create_time(&self) -> EpochTimestamp {
        EpochTimestamp::from_nt_time(Uint64::new(self.create_time))
    }
}

/// Two consecutive u32 words, low word first
fn read_split_u64(cursor: &mut Cursor<&[u8]>) -> Result<u64> {
    let lower = cursor.read_u32::<LittleEndian>()?;
    let upper = cursor.read_u32::<LittleEndian>()?;
    Ok(Uint64::from_words(lower, upper).get())
}
