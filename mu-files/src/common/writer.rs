use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::ParserError;

pub trait Emittable {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError>;
}

impl Emittable for u8 {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        Ok(wtr.write_u8(*self)?)
    }
}

impl Emittable for u32 {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        Ok(wtr.write_u32::<LittleEndian>(*self)?)
    }
}

impl Emittable for i32 {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        Ok(wtr.write_i32::<LittleEndian>(*self)?)
    }
}

impl Emittable for f32 {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        Ok(wtr.write_f32::<LittleEndian>(*self)?)
    }
}

impl Emittable for bool {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        Ok(wtr.write_u8(*self as u8)?)
    }
}

impl Emittable for String {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        write_string(wtr, self)
    }
}

impl<T: Emittable> Emittable for Vec<T> {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        write_count(wtr, self.len())?;
        for element in self {
            element.emit(wtr)?;
        }
        Ok(())
    }
}

impl<T: Emittable, const N: usize> Emittable for [T; N] {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        for element in self {
            element.emit(wtr)?;
        }
        Ok(())
    }
}

pub(crate) fn write_count<W: Write>(wtr: &mut W, count: usize) -> Result<(), ParserError> {
    let count = u32::try_from(count).map_err(|_| ParserError::format("array has more than u32::MAX elements"))?;
    Ok(wtr.write_u32::<LittleEndian>(count)?)
}

/// Always emits the shortest 7-bit encoding, which is the only one the reader accepts.
pub(crate) fn write_7bit_length<W: Write>(wtr: &mut W, len: usize) -> Result<(), ParserError> {
    let mut value = u32::try_from(len).map_err(|_| ParserError::format("string is longer than u32::MAX bytes"))?;
    while value >= 0x80 {
        wtr.write_u8((value as u8 & 0x7F) | 0x80)?;
        value >>= 7;
    }
    Ok(wtr.write_u8(value as u8)?)
}

pub(crate) fn write_string<W: Write>(wtr: &mut W, value: &str) -> Result<(), ParserError> {
    write_7bit_length(wtr, value.len())?;
    Ok(wtr.write_all(value.as_bytes())?)
}

/// Writes `tag`, the payload length and the payload that `body` produces.
pub(crate) fn write_chunk<W, F>(wtr: &mut W, tag: u32, body: F) -> Result<(), ParserError>
where
    W: Write,
    F: FnOnce(&mut Vec<u8>) -> Result<(), ParserError>,
{
    let mut payload = Vec::new();
    body(&mut payload)?;
    let size = u32::try_from(payload.len())
        .map_err(|_| ParserError::format(format!("chunk {} is larger than u32::MAX bytes", tag)))?;

    wtr.write_u32::<LittleEndian>(tag)?;
    wtr.write_u32::<LittleEndian>(size)?;
    Ok(wtr.write_all(&payload)?)
}
