use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use log::info;
use mu_files::mu::types::{Collider, MuModel, MuNode};
use serde::Serialize;

use crate::scene::memory_scene::SceneObject;
use crate::scene::{MemoryScene, ObjectId, SceneHost};

#[derive(Debug, Serialize)]
pub struct SceneDump {
    pub objects: Vec<ObjectDump>,
}

#[derive(Debug, Serialize)]
pub struct ObjectDump {
    pub name: String,
    pub position: [f32; 3],
    /// (x, y, z, w)
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshDump>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<MaterialDump>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collider: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ObjectDump>,
}

#[derive(Debug, Serialize)]
pub struct MeshDump {
    pub vertices: usize,
    pub triangles: usize,
    pub submeshes: usize,
}

#[derive(Debug, Serialize)]
pub struct MaterialDump {
    pub name: String,
    pub shader: String,
    pub textures: Vec<TextureSlotDump>,
}

#[derive(Debug, Serialize)]
pub struct TextureSlotDump {
    pub property: String,
    pub texture: Option<String>,
}

pub fn dump_scene(scene: &MemoryScene) -> SceneDump {
    SceneDump {
        objects: scene
            .top_level_objects()
            .into_iter()
            .filter_map(|id| dump_object(scene, id))
            .collect(),
    }
}

pub fn to_json(scene: &MemoryScene) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&dump_scene(scene))?)
}

pub fn write_json<P: AsRef<Path>>(scene: &MemoryScene, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &dump_scene(scene))
        .with_context(|| format!("Writing the scene to {}", path.display()))?;
    info!("Saved {} objects to {}", scene.len(), path.display());
    Ok(())
}

fn dump_object(scene: &MemoryScene, id: ObjectId) -> Option<ObjectDump> {
    let object = scene.object(id)?;
    let mut dump = ObjectDump {
        name: object.name.clone(),
        position: object.transform.position.to_array(),
        rotation: object.transform.rotation.to_array(),
        scale: object.transform.scale.to_array(),
        mesh: None,
        materials: Vec::new(),
        collider: None,
        children: object
            .children
            .iter()
            .filter_map(|child| dump_object(scene, *child))
            .collect(),
    };
    dump_components(object, &mut dump);
    Some(dump)
}

fn dump_components(object: &SceneObject, dump: &mut ObjectDump) {
    let Some(link) = &object.link else {
        return;
    };
    let Some(node) = link.node() else {
        return;
    };

    dump.mesh = node.mesh().map(|mesh| MeshDump {
        vertices: mesh.vertices().len(),
        triangles: mesh.triangle_count(),
        submeshes: mesh.submeshes().count(),
    });
    dump.materials = dump_materials(&link.model, node);
    dump.collider = link.collider().map(collider_kind);
}

fn dump_materials(model: &MuModel, node: &MuNode) -> Vec<MaterialDump> {
    node.material_indices()
        .iter()
        .filter_map(|index| model.materials.get(*index as usize))
        .map(|material| MaterialDump {
            name: material.name.clone(),
            shader: material.shader.clone(),
            textures: material
                .textures
                .iter()
                .map(|prop| TextureSlotDump {
                    property: prop.name.clone(),
                    texture: prop.index.and_then(|index| model.texture(index)).map(|tex| tex.name.clone()),
                })
                .collect(),
        })
        .collect()
}

fn collider_kind(collider: &Collider) -> &'static str {
    match collider {
        Collider::Mesh { .. } => "mesh",
        Collider::Sphere { .. } => "sphere",
        Collider::Capsule { .. } => "capsule",
        Collider::Box { .. } => "box",
        Collider::Wheel(_) => "wheel",
    }
}
