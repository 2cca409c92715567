use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use glam::{Quat, Vec3};
use log::{debug, trace};
use mu_files::mu::reader::MuReader;
use mu_files::mu::types::{Collider, MuModel, MuNode};

use crate::craft::coordinate_systems::{mu_to_scene_quaternion, mu_to_scene_vector};
use crate::scene::{ObjectId, SceneHost, Transform};

/// The node of a decoded model an object stands for. Duplicates share the model.
#[derive(Debug, Clone)]
pub struct ModelLink {
    pub model: Arc<MuModel>,
    /// Pre-order index, see [`MuModel::nodes`].
    pub node_index: usize,
    /// Position among the parent's children for every level below the root.
    pub child_path: Vec<usize>,
    pub with_collider: bool,
}

impl ModelLink {
    pub fn node(&self) -> Option<&MuNode> {
        self.child_path
            .iter()
            .try_fold(&self.model.root, |node, position| node.children().nth(*position))
    }

    pub fn collider(&self) -> Option<&Collider> {
        if !self.with_collider {
            return None;
        }
        self.node()?.collider()
    }
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    /// Relative to the parent.
    pub transform: Transform,
    pub link: Option<ModelLink>,
}

/// Arena backed scene, deleted objects leave an empty slot so ids stay stable.
#[derive(Debug, Default)]
pub struct MemoryScene {
    objects: Vec<Option<SceneObject>>,
    import_colliders: bool,
}

impl MemoryScene {
    pub fn new(import_colliders: bool) -> Self {
        Self {
            objects: Vec::new(),
            import_colliders,
        }
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0).and_then(Option::as_ref)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(index, object)| object.as_ref().map(|object| (ObjectId(index), object)))
    }

    pub fn len(&self) -> usize {
        self.objects().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First live object called `name`.
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.object(id).map(|object| object.children.as_slice()).unwrap_or(&[])
    }

    /// Adds one object per node of `model`, converted into scene conventions.
    pub fn add_model(&mut self, model: Arc<MuModel>) -> ObjectId {
        let mut next_index = 0;
        let root = self.instantiate(&model, &model.root, &mut next_index, &mut Vec::new(), None);
        trace!("Added model {} with {} objects", model.name, next_index);
        root
    }

    fn instantiate(
        &mut self,
        model: &Arc<MuModel>,
        node: &MuNode,
        next_index: &mut usize,
        child_path: &mut Vec<usize>,
        parent: Option<ObjectId>,
    ) -> ObjectId {
        let node_index = *next_index;
        *next_index += 1;
        let with_collider = self.import_colliders && node.collider().is_some();

        let id = self.insert(SceneObject {
            name: node.name().to_owned(),
            parent,
            children: Vec::new(),
            transform: Transform {
                position: mu_to_scene_vector(node.transform.position),
                rotation: mu_to_scene_quaternion(node.transform.rotation),
                scale: mu_to_scene_vector(node.transform.scale),
            },
            link: Some(ModelLink {
                model: Arc::clone(model),
                node_index,
                child_path: child_path.clone(),
                with_collider,
            }),
        });

        for (position, child) in node.children().enumerate() {
            child_path.push(position);
            self.instantiate(model, child, next_index, child_path, Some(id));
            child_path.pop();
        }
        id
    }

    fn insert(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.objects.len());
        if let Some(parent) = object.parent.and_then(|parent| self.objects.get_mut(parent.0)).and_then(Option::as_mut) {
            parent.children.push(id);
        }
        self.objects.push(Some(object));
        id
    }

    fn get(&self, id: ObjectId) -> anyhow::Result<&SceneObject> {
        self.object(id).with_context(|| format!("Object {:?} does not exist", id))
    }

    fn get_mut(&mut self, id: ObjectId) -> anyhow::Result<&mut SceneObject> {
        self.objects
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .with_context(|| format!("Object {:?} does not exist", id))
    }

    fn copy_subtree(&mut self, source: ObjectId, parent: Option<ObjectId>) -> anyhow::Result<ObjectId> {
        let SceneObject {
            name,
            transform,
            link,
            children,
            ..
        } = self.get(source)?.clone();

        let id = self.insert(SceneObject {
            name,
            parent,
            children: Vec::new(),
            transform,
            link,
        });

        for child in children {
            self.copy_subtree(child, Some(id))?;
        }
        Ok(id)
    }

    fn is_ancestor(&self, ancestor: ObjectId, mut object: ObjectId) -> bool {
        while let Some(parent) = self.object(object).and_then(|object| object.parent) {
            if parent == ancestor {
                return true;
            }
            object = parent;
        }
        false
    }

    fn detach(&mut self, object: ObjectId) -> anyhow::Result<()> {
        if let Some(parent) = self.get(object)?.parent {
            self.get_mut(parent)?.children.retain(|child| *child != object);
        }
        self.get_mut(object)?.parent = None;
        Ok(())
    }
}

impl SceneHost for MemoryScene {
    fn load_model(&mut self, path: &Path) -> anyhow::Result<ObjectId> {
        let model = MuReader::read_file(path).with_context(|| format!("Loading Mu model {}", path.display()))?;
        debug!("Loaded {} ({} nodes)", path.display(), model.nodes().len());
        Ok(self.add_model(Arc::new(model)))
    }

    fn duplicate(&mut self, object: ObjectId) -> anyhow::Result<ObjectId> {
        self.copy_subtree(object, None)
    }

    fn set_transform(
        &mut self,
        object: ObjectId,
        position: Vec3,
        rotation: Quat,
        scale: Option<Vec3>,
    ) -> anyhow::Result<()> {
        let transform = &mut self.get_mut(object)?.transform;
        transform.position = position;
        transform.rotation = rotation;
        if let Some(scale) = scale {
            transform.scale = scale;
        }
        Ok(())
    }

    fn set_parent(&mut self, object: ObjectId, parent: Option<ObjectId>) -> anyhow::Result<()> {
        if let Some(parent) = parent {
            self.get(parent)?;
            if parent == object || self.is_ancestor(object, parent) {
                bail!("Parenting {:?} under {:?} would create a cycle", object, parent);
            }
        }

        self.detach(object)?;
        if let Some(parent) = parent {
            self.get_mut(parent)?.children.push(object);
            self.get_mut(object)?.parent = Some(parent);
        }
        Ok(())
    }

    fn delete(&mut self, object: ObjectId) -> anyhow::Result<()> {
        let children = self.get(object)?.children.clone();
        for child in children {
            self.delete(child)?;
        }

        self.detach(object)?;
        self.objects[object.0] = None;
        Ok(())
    }

    fn create_empty(&mut self, name: &str) -> ObjectId {
        self.insert(SceneObject {
            name: name.to_owned(),
            parent: None,
            children: Vec::new(),
            transform: Transform::default(),
            link: None,
        })
    }

    fn top_level_objects(&self) -> Vec<ObjectId> {
        self.objects()
            .filter(|(_, object)| object.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    fn rename(&mut self, object: ObjectId, name: &str) -> anyhow::Result<()> {
        self.get_mut(object)?.name = name.to_owned();
        Ok(())
    }
}
