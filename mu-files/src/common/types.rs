use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use mu_files_derive_parseable::{Emit, Parse};

use crate::ParserError;

#[derive(Debug, Copy, Clone, Default, PartialEq, Parse, Emit)]
pub struct C2Vector {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Parse, Emit)]
pub struct C3Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Parse, Emit)]
pub struct C4Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Unity stores rotations as (x, y, z, w) in its left handed, Y-up system.
#[derive(Debug, Copy, Clone, PartialEq, Parse, Emit)]
pub struct C4Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for C4Quaternion {
    fn default() -> Self {
        C4Quaternion {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

/// Floating point color, as used by material properties and lights.
#[derive(Debug, Copy, Clone, Default, PartialEq, Parse, Emit)]
pub struct CRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Per vertex color.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Parse, Emit)]
pub struct CRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Column major 4x4 matrix, as Unity writes its bind poses.
#[derive(Debug, Copy, Clone, Default, PartialEq, Parse, Emit)]
pub struct Matrix4 {
    pub m: [f32; 16],
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Parse, Emit)]
pub struct Bounds {
    pub center: C3Vector,
    pub size: C3Vector,
}

/// A tagged, length prefixed chunk whose payload has not been interpreted.
///
/// Unknown chunks are kept as-is so that they survive a read/write cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    pub tag: u32,
    pub data: Vec<u8>,
}

impl RawChunk {
    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }

    pub(crate) fn read_next_chunk<R: Read>(rdr: &mut R) -> Result<RawChunk, ParserError> {
        let tag = rdr.read_u32::<LittleEndian>()?;
        let size = rdr.read_u32::<LittleEndian>()?;

        // Don't trust the size for the allocation, a corrupt header would otherwise allocate up to 4GiB.
        let mut data = Vec::new();
        rdr.take(size as u64).read_to_end(&mut data)?;
        if data.len() != size as usize {
            return Err(ParserError::Truncated {
                context: format!(
                    "chunk {} (declared {} bytes, found {})",
                    tag,
                    size,
                    data.len()
                ),
            });
        }

        Ok(RawChunk { tag, data })
    }

    pub(crate) fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        wtr.write_u32::<LittleEndian>(self.tag)?;
        wtr.write_u32::<LittleEndian>(self.size())?;
        wtr.write_all(&self.data)?;
        Ok(())
    }
}
