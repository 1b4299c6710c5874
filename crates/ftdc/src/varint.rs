//! LEB128 variable-length integers.
//!
//! The metrics stream stores each delta as the unsigned LEB128 encoding of
//! its i64 two's-complement bit pattern: 7 payload bits per byte, the
//! continuation flag in bit 7. There is no zig-zag step; a negative delta
//! simply arrives as a large u64 whose i64 reinterpretation restores the
//! sign.

use ftdc_buffers::{Reader, Writer};

use crate::error::FtdcError;

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Reads one unsigned LEB128 value from the cursor.
///
/// Fails with [`FtdcError::UnexpectedEof`] when the stream ends mid-varint
/// and [`FtdcError::VarintTooLong`] when a tenth byte still carries the
/// continuation flag.
pub fn read_var_u64(reader: &mut Reader<'_>) -> Result<u64, FtdcError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    for _ in 0..MAX_VARINT_LEN {
        let byte = reader.u8()? as u64;
        value |= (byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
    Err(FtdcError::VarintTooLong)
}

/// Writes one unsigned LEB128 value.
pub fn write_var_u64(writer: &mut Writer, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            writer.u8(byte);
            return;
        }
        writer.u8(byte | 0x80);
    }
}
