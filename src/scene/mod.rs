use std::path::Path;

use glam::{Quat, Vec3};

pub mod export;
pub mod memory_scene;

pub use memory_scene::MemoryScene;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

/// What the craft assembly needs from the editor that owns the scene.
pub trait SceneHost {
    /// Imports a Mu file and returns its root object.
    fn load_model(&mut self, path: &Path) -> anyhow::Result<ObjectId>;
    /// Linked copy of `object` and its descendants, placed at the top level.
    fn duplicate(&mut self, object: ObjectId) -> anyhow::Result<ObjectId>;
    /// `scale: None` keeps the current scale.
    fn set_transform(&mut self, object: ObjectId, position: Vec3, rotation: Quat, scale: Option<Vec3>)
    -> anyhow::Result<()>;
    fn set_parent(&mut self, object: ObjectId, parent: Option<ObjectId>) -> anyhow::Result<()>;
    /// Removes `object` and its descendants.
    fn delete(&mut self, object: ObjectId) -> anyhow::Result<()>;
    fn create_empty(&mut self, name: &str) -> ObjectId;
    fn top_level_objects(&self) -> Vec<ObjectId>;
    fn rename(&mut self, object: ObjectId, name: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}
