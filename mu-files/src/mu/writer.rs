use std::io::Write;
use std::path::Path;

use crate::ParserError;
use crate::common::writer::{Emittable, write_chunk, write_string};
use crate::mu::types::{
    ChunkTag, Collider, MIN_MU_VERSION, MU_MAGIC, MU_VERSION, Mesh, MeshStream, MuModel, MuNode, NodeEntry,
    VERSION_COLLIDER_TRIGGER, VERSION_RENDERER_SHADOWS,
};

pub struct MuWriter {
    version: u32,
}

impl MuWriter {
    pub fn write_file<P: AsRef<Path>>(model: &MuModel, path: P) -> Result<(), ParserError> {
        let bytes = model.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Writes the model in canonical chunk order: root node, textures, materials, then extensions.
    pub fn write_model<W: Write>(model: &MuModel, wtr: &mut W) -> Result<(), ParserError> {
        if !(MIN_MU_VERSION..=MU_VERSION).contains(&model.version) {
            return Err(ParserError::UnsupportedVersion { version: model.version });
        }
        model.validate()?;

        let writer = MuWriter { version: model.version };
        MU_MAGIC.emit(wtr)?;
        model.version.emit(wtr)?;
        write_string(wtr, &model.name)?;

        write_chunk(wtr, ChunkTag::Node.into(), |buf| writer.write_node(&model.root, buf))?;
        write_chunk(wtr, ChunkTag::Textures.into(), |buf| model.textures.emit(buf))?;
        write_chunk(wtr, ChunkTag::Materials.into(), |buf| model.materials.emit(buf))?;
        for chunk in &model.extensions {
            chunk.write(wtr)?;
        }
        Ok(())
    }

    fn write_node(&self, node: &MuNode, buf: &mut Vec<u8>) -> Result<(), ParserError> {
        node.transform.emit(buf)?;
        for entry in &node.entries {
            match entry {
                NodeEntry::Child(child) => write_chunk(buf, ChunkTag::Node.into(), |b| self.write_node(child, b))?,
                NodeEntry::TagAndLayer(tag) => write_chunk(buf, ChunkTag::TagAndLayer.into(), |b| tag.emit(b))?,
                NodeEntry::MeshFilter(mesh) => {
                    write_chunk(buf, ChunkTag::MeshFilter.into(), |b| self.write_mesh(mesh, b))?
                }
                NodeEntry::Renderer(renderer) => write_chunk(buf, ChunkTag::MeshRenderer.into(), |b| {
                    if self.version >= VERSION_RENDERER_SHADOWS {
                        renderer.cast_shadows.emit(b)?;
                        renderer.receive_shadows.emit(b)?;
                    }
                    renderer.materials.emit(b)
                })?,
                NodeEntry::SkinnedRenderer(renderer) => write_chunk(buf, ChunkTag::SkinnedMeshRenderer.into(), |b| {
                    renderer.materials.emit(b)?;
                    renderer.bounds.emit(b)?;
                    renderer.quality.emit(b)?;
                    renderer.update_when_offscreen.emit(b)?;
                    renderer.bones.emit(b)?;
                    self.write_mesh(&renderer.mesh, b)
                })?,
                NodeEntry::Collider(collider) => self.write_collider(collider, buf)?,
                NodeEntry::Animation(animation) => write_chunk(buf, ChunkTag::Animation.into(), |b| animation.emit(b))?,
                NodeEntry::Light(light) => write_chunk(buf, ChunkTag::Light.into(), |b| light.emit(b))?,
                NodeEntry::Unknown(chunk) => chunk.write(buf)?,
            }
        }
        Ok(())
    }

    fn write_collider(&self, collider: &Collider, buf: &mut Vec<u8>) -> Result<(), ParserError> {
        let trigger = |is_trigger: bool, b: &mut Vec<u8>| -> Result<(), ParserError> {
            if self.version >= VERSION_COLLIDER_TRIGGER {
                is_trigger.emit(b)?;
            }
            Ok(())
        };

        match collider {
            Collider::Mesh { is_trigger, convex, mesh } => write_chunk(buf, ChunkTag::MeshCollider.into(), |b| {
                trigger(*is_trigger, b)?;
                convex.emit(b)?;
                self.write_mesh(mesh, b)
            }),
            Collider::Sphere { is_trigger, radius, center } => {
                write_chunk(buf, ChunkTag::SphereCollider.into(), |b| {
                    trigger(*is_trigger, b)?;
                    radius.emit(b)?;
                    center.emit(b)
                })
            }
            Collider::Capsule {
                is_trigger,
                radius,
                height,
                direction,
                center,
            } => write_chunk(buf, ChunkTag::CapsuleCollider.into(), |b| {
                trigger(*is_trigger, b)?;
                radius.emit(b)?;
                height.emit(b)?;
                direction.emit(b)?;
                center.emit(b)
            }),
            Collider::Box { is_trigger, size, center } => write_chunk(buf, ChunkTag::BoxCollider.into(), |b| {
                trigger(*is_trigger, b)?;
                size.emit(b)?;
                center.emit(b)
            }),
            Collider::Wheel(wheel) => write_chunk(buf, ChunkTag::WheelCollider.into(), |b| wheel.emit(b)),
        }
    }

    fn write_mesh(&self, mesh: &Mesh, buf: &mut Vec<u8>) -> Result<(), ParserError> {
        for stream in &mesh.streams {
            match stream {
                MeshStream::Vertices(list) => write_chunk(buf, ChunkTag::Vertices.into(), |b| list.emit(b))?,
                MeshStream::Normals(list) => write_chunk(buf, ChunkTag::Normals.into(), |b| list.emit(b))?,
                MeshStream::Tangents(list) => write_chunk(buf, ChunkTag::Tangents.into(), |b| list.emit(b))?,
                MeshStream::Uv(list) => write_chunk(buf, ChunkTag::Uv.into(), |b| list.emit(b))?,
                MeshStream::Uv2(list) => write_chunk(buf, ChunkTag::Uv2.into(), |b| list.emit(b))?,
                MeshStream::Colors(list) => write_chunk(buf, ChunkTag::VertexColors.into(), |b| list.emit(b))?,
                MeshStream::BoneWeights(list) => write_chunk(buf, ChunkTag::BoneWeights.into(), |b| list.emit(b))?,
                MeshStream::BindPoses(list) => write_chunk(buf, ChunkTag::BindPoses.into(), |b| list.emit(b))?,
                MeshStream::Triangles(list) => write_chunk(buf, ChunkTag::Triangles.into(), |b| list.emit(b))?,
                MeshStream::Unknown(chunk) => chunk.write(buf)?,
            }
        }
        Ok(())
    }
}

impl MuModel {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ParserError> {
        let mut buf = Vec::new();
        MuWriter::write_model(self, &mut buf)?;
        Ok(buf)
    }
}
