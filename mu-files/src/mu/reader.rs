use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::reader::{Parseable, expect_consumed, parse_exact, read_chunk_list, read_string};
use crate::common::types::{Bounds, C2Vector, C3Vector, C4Vector, CRgba8, Matrix4, RawChunk};
use crate::mu::types::{
    Animation, BoneWeight, ChunkTag, Collider, Light, MAX_NODE_DEPTH, MIN_MU_VERSION, MU_MAGIC, MU_VERSION, Material,
    Mesh, MeshStream, MuModel, MuNode, MuTransform, NodeEntry, Renderer, SkinnedRenderer, TagAndLayer, Texture,
    VERSION_COLLIDER_TRIGGER, VERSION_RENDERER_SHADOWS, WheelCollider, nesting_too_deep,
};

pub struct MuReader {
    version: u32,
}

impl MuReader {
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<MuModel, ParserError> {
        let data = std::fs::read(path)?;
        MuReader::parse_bytes(&data)
    }

    pub fn parse_model<R: Read>(rdr: &mut R) -> Result<MuModel, ParserError> {
        let mut data = Vec::new();
        rdr.read_to_end(&mut data)?;
        MuReader::parse_bytes(&data)
    }

    /// Parses a complete model and validates all of its cross references.
    pub fn parse_bytes(data: &[u8]) -> Result<MuModel, ParserError> {
        let mut rdr = Cursor::new(data);
        let magic = rdr
            .read_u32::<LittleEndian>()
            .map_err(|err| ParserError::from(err).truncated_in(|| "file header".to_owned()))?;
        if magic != MU_MAGIC {
            return Err(ParserError::InvalidMagicValue { magic });
        }

        let version = rdr
            .read_u32::<LittleEndian>()
            .map_err(|err| ParserError::from(err).truncated_in(|| "file header".to_owned()))?;
        if !(MIN_MU_VERSION..=MU_VERSION).contains(&version) {
            return Err(ParserError::UnsupportedVersion { version });
        }

        let name = read_string(&mut rdr).map_err(|err| err.truncated_in(|| "model name".to_owned()))?;
        let reader = MuReader { version };

        let chunk_list =
            read_chunk_list(&mut rdr).map_err(|err| err.truncated_in(|| "top-level chunk header".to_owned()))?;

        let mut root = None;
        let mut textures = None;
        let mut materials = None;
        let mut extensions = Vec::new();
        for chunk in chunk_list {
            match ChunkTag::try_from(chunk.tag) {
                Ok(ChunkTag::Node) => {
                    ensure_single(&root, "root node")?;
                    root = Some(reader.parse_node(&chunk.data, "", 1)?);
                }
                Ok(ChunkTag::Textures) => {
                    ensure_single(&textures, "textures")?;
                    textures = Some(parse_exact::<Vec<Texture>>(&chunk.data, "textures chunk")?);
                }
                Ok(ChunkTag::Materials) => {
                    ensure_single(&materials, "materials")?;
                    materials = Some(parse_exact::<Vec<Material>>(&chunk.data, "materials chunk")?);
                }
                _ => extensions.push(chunk),
            }
        }

        let model = MuModel {
            version,
            name,
            root: root.ok_or_else(|| missing_chunk("root node"))?,
            textures: textures.ok_or_else(|| missing_chunk("textures"))?,
            materials: materials.ok_or_else(|| missing_chunk("materials"))?,
            extensions,
        };

        model.validate()?;
        Ok(model)
    }

    /// `depth` counts the root node as 1.
    fn parse_node(&self, data: &[u8], parent_path: &str, depth: usize) -> Result<MuNode, ParserError> {
        let mut rdr = Cursor::new(data);
        let transform = MuTransform::parse(&mut rdr).map_err(|err| {
            err.truncated_in(|| match parent_path {
                "" => "transform of the root node".to_owned(),
                parent => format!("transform of a child of node '{}'", parent),
            })
        })?;

        let path = match parent_path {
            "" => transform.name.clone(),
            parent => format!("{}/{}", parent, transform.name),
        };
        if depth > MAX_NODE_DEPTH {
            return Err(nesting_too_deep(&path));
        }

        let chunk_list = read_chunk_list(&mut rdr)
            .map_err(|err| err.truncated_in(|| format!("chunk header in node '{}'", path)))?;

        let mut entries = Vec::with_capacity(chunk_list.len());
        for chunk in chunk_list {
            entries.push(self.parse_entry(chunk, &path, depth)?);
        }

        Ok(MuNode { transform, entries })
    }

    fn parse_entry(&self, chunk: RawChunk, path: &str, depth: usize) -> Result<NodeEntry, ParserError> {
        let tag = match ChunkTag::try_from(chunk.tag) {
            Ok(tag) => tag,
            Err(_) => return Ok(NodeEntry::Unknown(chunk)),
        };

        let context = |what: &str| format!("{} of node '{}'", what, path);
        let data = chunk.data.as_slice();
        let entry = match tag {
            ChunkTag::Node => NodeEntry::Child(self.parse_node(data, path, depth + 1)?),
            ChunkTag::TagAndLayer => {
                NodeEntry::TagAndLayer(parse_exact::<TagAndLayer>(data, &context("tag and layer"))?)
            }
            ChunkTag::MeshFilter => {
                NodeEntry::MeshFilter(self.parse_mesh(&mut Cursor::new(data), &context("mesh filter"))?)
            }
            ChunkTag::MeshRenderer => NodeEntry::Renderer(self.parse_renderer(data, &context("mesh renderer"))?),
            ChunkTag::SkinnedMeshRenderer => {
                NodeEntry::SkinnedRenderer(self.parse_skinned_renderer(data, &context("skinned mesh renderer"))?)
            }
            ChunkTag::MeshCollider
            | ChunkTag::SphereCollider
            | ChunkTag::CapsuleCollider
            | ChunkTag::BoxCollider
            | ChunkTag::WheelCollider => NodeEntry::Collider(self.parse_collider(tag, data, &context("collider"))?),
            ChunkTag::Animation => NodeEntry::Animation(parse_exact::<Animation>(data, &context("animation"))?),
            ChunkTag::Light => NodeEntry::Light(parse_exact::<Light>(data, &context("light"))?),
            // Known tags that don't belong into a node are kept like any other unknown chunk.
            _ => NodeEntry::Unknown(chunk),
        };
        Ok(entry)
    }

    /// Reads mesh streams until the end of the enclosing payload.
    fn parse_mesh(&self, rdr: &mut Cursor<&[u8]>, context: &str) -> Result<Mesh, ParserError> {
        let chunk_list =
            read_chunk_list(rdr).map_err(|err| err.truncated_in(|| format!("stream header in {}", context)))?;

        let mut streams = Vec::with_capacity(chunk_list.len());
        for chunk in chunk_list {
            let data = chunk.data.as_slice();
            let stream_context = |what: &str| format!("{} stream in {}", what, context);
            let stream = match ChunkTag::try_from(chunk.tag) {
                Ok(ChunkTag::Vertices) => {
                    MeshStream::Vertices(parse_exact::<Vec<C3Vector>>(data, &stream_context("vertex"))?)
                }
                Ok(ChunkTag::Normals) => {
                    MeshStream::Normals(parse_exact::<Vec<C3Vector>>(data, &stream_context("normal"))?)
                }
                Ok(ChunkTag::Tangents) => {
                    MeshStream::Tangents(parse_exact::<Vec<C4Vector>>(data, &stream_context("tangent"))?)
                }
                Ok(ChunkTag::Uv) => MeshStream::Uv(parse_exact::<Vec<C2Vector>>(data, &stream_context("uv"))?),
                Ok(ChunkTag::Uv2) => MeshStream::Uv2(parse_exact::<Vec<C2Vector>>(data, &stream_context("uv2"))?),
                Ok(ChunkTag::VertexColors) => {
                    MeshStream::Colors(parse_exact::<Vec<CRgba8>>(data, &stream_context("color"))?)
                }
                Ok(ChunkTag::BoneWeights) => {
                    MeshStream::BoneWeights(parse_exact::<Vec<BoneWeight>>(data, &stream_context("bone weight"))?)
                }
                Ok(ChunkTag::BindPoses) => {
                    MeshStream::BindPoses(parse_exact::<Vec<Matrix4>>(data, &stream_context("bind pose"))?)
                }
                Ok(ChunkTag::Triangles) => {
                    MeshStream::Triangles(parse_exact::<Vec<u32>>(data, &stream_context("triangle"))?)
                }
                _ => MeshStream::Unknown(chunk),
            };
            streams.push(stream);
        }

        Ok(Mesh { streams })
    }

    fn parse_renderer(&self, data: &[u8], context: &str) -> Result<Renderer, ParserError> {
        let mut rdr = Cursor::new(data);
        let read = |rdr: &mut Cursor<&[u8]>| -> Result<Renderer, ParserError> {
            let (cast_shadows, receive_shadows) = if self.version >= VERSION_RENDERER_SHADOWS {
                (bool::parse(rdr)?, bool::parse(rdr)?)
            } else {
                (true, true)
            };

            Ok(Renderer {
                cast_shadows,
                receive_shadows,
                materials: Vec::<u32>::parse(rdr)?,
            })
        };

        let renderer = read(&mut rdr).map_err(|err| err.truncated_in(|| context.to_owned()))?;
        expect_consumed(&rdr, context)?;
        Ok(renderer)
    }

    fn parse_skinned_renderer(&self, data: &[u8], context: &str) -> Result<SkinnedRenderer, ParserError> {
        let mut rdr = Cursor::new(data);
        let read = |rdr: &mut Cursor<&[u8]>| -> Result<_, ParserError> {
            Ok((
                Vec::<u32>::parse(rdr)?,
                Bounds::parse(rdr)?,
                u32::parse(rdr)?,
                bool::parse(rdr)?,
                Vec::<u32>::parse(rdr)?,
            ))
        };

        let (materials, bounds, quality, update_when_offscreen, bones) =
            read(&mut rdr).map_err(|err| err.truncated_in(|| context.to_owned()))?;

        Ok(SkinnedRenderer {
            materials,
            bounds,
            quality,
            update_when_offscreen,
            bones,
            mesh: self.parse_mesh(&mut rdr, context)?,
        })
    }

    fn parse_collider(&self, tag: ChunkTag, data: &[u8], context: &str) -> Result<Collider, ParserError> {
        let mut rdr = Cursor::new(data);
        let has_trigger = self.version >= VERSION_COLLIDER_TRIGGER;
        let read_trigger = |rdr: &mut Cursor<&[u8]>| -> Result<bool, ParserError> {
            if has_trigger { bool::parse(rdr) } else { Ok(false) }
        };

        let read = |rdr: &mut Cursor<&[u8]>| -> Result<Collider, ParserError> {
            Ok(match tag {
                ChunkTag::MeshCollider => Collider::Mesh {
                    is_trigger: read_trigger(rdr)?,
                    convex: bool::parse(rdr)?,
                    mesh: Mesh::default(),
                },
                ChunkTag::SphereCollider => Collider::Sphere {
                    is_trigger: read_trigger(rdr)?,
                    radius: f32::parse(rdr)?,
                    center: C3Vector::parse(rdr)?,
                },
                ChunkTag::CapsuleCollider => Collider::Capsule {
                    is_trigger: read_trigger(rdr)?,
                    radius: f32::parse(rdr)?,
                    height: f32::parse(rdr)?,
                    direction: u32::parse(rdr)?,
                    center: C3Vector::parse(rdr)?,
                },
                ChunkTag::BoxCollider => Collider::Box {
                    is_trigger: read_trigger(rdr)?,
                    size: C3Vector::parse(rdr)?,
                    center: C3Vector::parse(rdr)?,
                },
                ChunkTag::WheelCollider => Collider::Wheel(WheelCollider::parse(rdr)?),
                other => return Err(ParserError::format(format!("{:?} is not a collider", other))),
            })
        };

        let mut collider = read(&mut rdr).map_err(|err| err.truncated_in(|| context.to_owned()))?;
        match &mut collider {
            // the mesh streams take up the rest of the payload
            Collider::Mesh { mesh, .. } => *mesh = self.parse_mesh(&mut rdr, context)?,
            _ => expect_consumed(&rdr, context)?,
        }
        Ok(collider)
    }
}

fn ensure_single<T>(slot: &Option<T>, what: &str) -> Result<(), ParserError> {
    match slot {
        Some(_) => Err(ParserError::format(format!("duplicate {} chunk", what))),
        None => Ok(()),
    }
}

fn missing_chunk(what: &str) -> ParserError {
    ParserError::format(format!("missing mandatory {} chunk", what))
}
