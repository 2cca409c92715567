use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::types::RawChunk;

// Counts come straight from the file, so we only trust them up to this many elements for preallocation.
const MAX_PREALLOCATION: usize = 4096;

pub trait Parseable<T> {
    fn parse<R: Read>(rdr: &mut R) -> Result<T, ParserError>;
}

impl Parseable<u8> for u8 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u8, ParserError> {
        Ok(rdr.read_u8()?)
    }
}

impl Parseable<u32> for u32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u32, ParserError> {
        Ok(rdr.read_u32::<LittleEndian>()?)
    }
}

impl Parseable<i32> for i32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<i32, ParserError> {
        Ok(rdr.read_i32::<LittleEndian>()?)
    }
}

impl Parseable<f32> for f32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<f32, ParserError> {
        Ok(rdr.read_f32::<LittleEndian>()?)
    }
}

impl Parseable<bool> for bool {
    fn parse<R: Read>(rdr: &mut R) -> Result<bool, ParserError> {
        match rdr.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ParserError::format(format!("{} is not a valid boolean", other))),
        }
    }
}

impl Parseable<String> for String {
    fn parse<R: Read>(rdr: &mut R) -> Result<String, ParserError> {
        read_string(rdr)
    }
}

/// Arrays are always prefixed with their element count as u32.
impl<T: Parseable<T>> Parseable<Vec<T>> for Vec<T> {
    fn parse<R: Read>(rdr: &mut R) -> Result<Vec<T>, ParserError> {
        let count = rdr.read_u32::<LittleEndian>()? as usize;
        let mut list = Vec::with_capacity(count.min(MAX_PREALLOCATION));
        for _ in 0..count {
            list.push(T::parse(rdr)?);
        }
        Ok(list)
    }
}

impl<T: Parseable<T> + Copy + Default, const N: usize> Parseable<[T; N]> for [T; N] {
    fn parse<R: Read>(rdr: &mut R) -> Result<[T; N], ParserError> {
        let mut array = [T::default(); N];
        for slot in array.iter_mut() {
            *slot = T::parse(rdr)?;
        }
        Ok(array)
    }
}

/// Reads the 7-bit encoded length prefix that .NET's BinaryWriter puts in front of strings.
pub(crate) fn read_7bit_length<R: Read>(rdr: &mut R) -> Result<usize, ParserError> {
    let mut value = 0u32;
    for index in 0..5 {
        let byte = rdr.read_u8()?;
        if index == 4 && byte > 0x0F {
            return Err(ParserError::format("string length does not fit into 32 bits"));
        }

        value |= ((byte & 0x7F) as u32) << (7 * index);
        if byte & 0x80 == 0 {
            // a zero in the last group means the same value would have fit into fewer bytes.
            if index > 0 && byte == 0 {
                return Err(ParserError::format("overlong string length encoding"));
            }
            return Ok(value as usize);
        }
    }

    unreachable!("the fifth length byte never has its continuation bit set")
}

pub(crate) fn read_string<R: Read>(rdr: &mut R) -> Result<String, ParserError> {
    let len = read_7bit_length(rdr)?;
    let mut buf = Vec::new();
    rdr.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }

    Ok(String::from_utf8(buf)?)
}

/// Splits a payload into the chunks it is made of, until the payload is used up.
pub(crate) fn read_chunk_list(rdr: &mut Cursor<&[u8]>) -> Result<Vec<RawChunk>, ParserError> {
    let mut chunk_list = Vec::new();
    while remaining(rdr) > 0 {
        chunk_list.push(RawChunk::read_next_chunk(rdr)?);
    }
    Ok(chunk_list)
}

pub(crate) fn remaining(rdr: &Cursor<&[u8]>) -> usize {
    rdr.get_ref().len().saturating_sub(rdr.position() as usize)
}

/// Fixed records have to use up their chunk, leftovers could not be written back.
pub(crate) fn expect_consumed(rdr: &Cursor<&[u8]>, context: &str) -> Result<(), ParserError> {
    match remaining(rdr) {
        0 => Ok(()),
        left => Err(ParserError::format(format!(
            "{} trailing bytes after {}",
            left, context
        ))),
    }
}

/// Parses a whole chunk payload as a single record.
pub(crate) fn parse_exact<T: Parseable<T>>(data: &[u8], context: &str) -> Result<T, ParserError> {
    let mut rdr = Cursor::new(data);
    let value = T::parse(&mut rdr).map_err(|err| err.truncated_in(|| context.to_owned()))?;
    expect_consumed(&rdr, context)?;
    Ok(value)
}
