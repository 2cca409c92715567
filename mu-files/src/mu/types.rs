use std::io::Read;
use std::str::FromStr;

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};
use mu_files_derive_parseable::{Emit, Parse};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::ParserError;
use crate::common::reader::Parseable;
use crate::common::types::{Bounds, C2Vector, C3Vector, C4Quaternion, C4Vector, CRgba, CRgba8, Matrix4, RawChunk};
use crate::common::writer::Emittable;

pub const MU_MAGIC: u32 = 76543;
/// The version new models are written with.
pub const MU_VERSION: u32 = 3;
pub const MIN_MU_VERSION: u32 = 1;

/// Renderers carry their shadow flags starting with this version.
pub(crate) const VERSION_RENDERER_SHADOWS: u32 = 2;
/// Colliders carry their trigger flag starting with this version.
pub(crate) const VERSION_COLLIDER_TRIGGER: u32 = 3;

/// Deepest node hierarchy the reader accepts and the writer emits, counting the root as 1.
pub const MAX_NODE_DEPTH: usize = 128;

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum ChunkTag {
    Node = 1,
    Animation = 3,
    MeshCollider = 4,
    SphereCollider = 5,
    CapsuleCollider = 6,
    BoxCollider = 7,
    MeshFilter = 8,
    MeshRenderer = 9,
    SkinnedMeshRenderer = 10,
    Materials = 11,
    Textures = 13,
    Vertices = 15,
    Uv = 16,
    Uv2 = 17,
    Normals = 18,
    Tangents = 19,
    Triangles = 20,
    BoneWeights = 21,
    BindPoses = 22,
    Light = 24,
    TagAndLayer = 25,
    WheelCollider = 30,
    VertexColors = 34,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MuModel {
    pub version: u32,
    pub name: String,
    pub root: MuNode,
    pub textures: Vec<Texture>,
    pub materials: Vec<Material>,
    /// Top-level chunks this reader does not understand, in file order.
    pub extensions: Vec<RawChunk>,
}

impl MuModel {
    pub fn new(name: &str, root: MuNode) -> Self {
        MuModel {
            version: MU_VERSION,
            name: name.to_owned(),
            root,
            textures: Vec::new(),
            materials: Vec::new(),
            extensions: Vec::new(),
        }
    }

    /// All nodes in depth-first pre-order. Node indices (e.g. skinned bones) index into this.
    pub fn nodes(&self) -> Vec<&MuNode> {
        let mut nodes = Vec::new();
        self.root.collect_preorder(&mut nodes);
        nodes
    }

    pub fn texture(&self, index: u32) -> Option<&Texture> {
        self.textures.get(index as usize)
    }

    /// Resolves a texture property of `material` (e.g. `_MainTex`) through the texture table.
    pub fn material_texture(&self, material: &Material, property: &str) -> Option<&Texture> {
        material
            .texture_property(property)
            .and_then(|prop| prop.index)
            .and_then(|index| self.texture(index))
    }

    /// Returns the slot of the texture with the same name, appending it if it is new.
    pub fn intern_texture(&mut self, texture: Texture) -> u32 {
        if let Some(index) = self.textures.iter().position(|tex| tex.name == texture.name) {
            return index as u32;
        }

        self.textures.push(texture);
        (self.textures.len() - 1) as u32
    }

    pub fn add_material(&mut self, material: Material) -> u32 {
        self.materials.push(material);
        (self.materials.len() - 1) as u32
    }

    /// Checks every cross reference inside the model.
    pub fn validate(&self) -> Result<(), ParserError> {
        for material in &self.materials {
            for prop in &material.textures {
                if let Some(index) = prop.index {
                    check_index(
                        "texture",
                        index,
                        self.textures.len(),
                        || format!("material '{}' property '{}'", material.name, prop.name),
                    )?;
                }
            }
        }

        self.root.check_depth(1)?;
        let node_count = self.nodes().len();
        self.root
            .validate(&self.root.transform.name, self.materials.len(), node_count)
    }
}

pub(crate) fn nesting_too_deep(name: &str) -> ParserError {
    ParserError::format(format!(
        "node '{}' is nested deeper than {} levels",
        name, MAX_NODE_DEPTH
    ))
}

pub(crate) fn check_index(
    what: &'static str,
    index: u32,
    len: usize,
    context: impl FnOnce() -> String,
) -> Result<(), ParserError> {
    if (index as usize) < len {
        return Ok(());
    }

    Err(ParserError::InvalidReference {
        what,
        index: index as i64,
        len,
        context: context(),
    })
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct MuTransform {
    pub name: String,
    pub position: C3Vector,
    pub rotation: C4Quaternion,
    pub scale: C3Vector,
}

impl MuTransform {
    pub fn named(name: &str) -> Self {
        MuTransform {
            name: name.to_owned(),
            position: C3Vector::default(),
            rotation: C4Quaternion::default(),
            scale: C3Vector { x: 1.0, y: 1.0, z: 1.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MuNode {
    pub transform: MuTransform,
    /// Children and components, in the order they are stored in the file.
    pub entries: Vec<NodeEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeEntry {
    Child(MuNode),
    TagAndLayer(TagAndLayer),
    MeshFilter(Mesh),
    Renderer(Renderer),
    SkinnedRenderer(SkinnedRenderer),
    Collider(Collider),
    Animation(Animation),
    Light(Light),
    Unknown(RawChunk),
}

impl MuNode {
    pub fn new(name: &str) -> Self {
        MuNode {
            transform: MuTransform::named(name),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.transform.name
    }

    pub fn with_entry(mut self, entry: NodeEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn children(&self) -> impl Iterator<Item = &MuNode> {
        self.entries.iter().filter_map(|entry| match entry {
            NodeEntry::Child(child) => Some(child),
            _ => None,
        })
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.entries.iter().find_map(|entry| match entry {
            NodeEntry::MeshFilter(mesh) => Some(mesh),
            NodeEntry::SkinnedRenderer(renderer) => Some(&renderer.mesh),
            _ => None,
        })
    }

    pub fn renderer(&self) -> Option<&Renderer> {
        self.entries.iter().find_map(|entry| match entry {
            NodeEntry::Renderer(renderer) => Some(renderer),
            _ => None,
        })
    }

    /// Material indices of whichever renderer this node carries.
    pub fn material_indices(&self) -> &[u32] {
        self.entries
            .iter()
            .find_map(|entry| match entry {
                NodeEntry::Renderer(renderer) => Some(renderer.materials.as_slice()),
                NodeEntry::SkinnedRenderer(renderer) => Some(renderer.materials.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.entries.iter().find_map(|entry| match entry {
            NodeEntry::Collider(collider) => Some(collider),
            _ => None,
        })
    }

    pub fn animation(&self) -> Option<&Animation> {
        self.entries.iter().find_map(|entry| match entry {
            NodeEntry::Animation(animation) => Some(animation),
            _ => None,
        })
    }

    /// Finds a descendant by a `/` separated path of node names, relative to this node.
    pub fn find(&self, path: &str) -> Option<&MuNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.children().find(|child| child.name() == segment))
    }

    fn check_depth(&self, depth: usize) -> Result<(), ParserError> {
        if depth > MAX_NODE_DEPTH {
            return Err(nesting_too_deep(self.name()));
        }
        self.children().try_for_each(|child| child.check_depth(depth + 1))
    }

    fn collect_preorder<'a>(&'a self, nodes: &mut Vec<&'a MuNode>) {
        nodes.push(self);
        for child in self.children() {
            child.collect_preorder(nodes);
        }
    }

    fn validate(&self, path: &str, material_count: usize, node_count: usize) -> Result<(), ParserError> {
        for entry in &self.entries {
            match entry {
                NodeEntry::Child(child) => {
                    child.validate(&format!("{}/{}", path, child.name()), material_count, node_count)?
                }
                NodeEntry::MeshFilter(mesh) => mesh.validate(&format!("mesh of node '{}'", path))?,
                NodeEntry::Renderer(renderer) => {
                    for index in &renderer.materials {
                        check_index("material", *index, material_count, || {
                            format!("renderer of node '{}'", path)
                        })?;
                    }
                }
                NodeEntry::SkinnedRenderer(renderer) => {
                    for index in &renderer.materials {
                        check_index("material", *index, material_count, || {
                            format!("skinned renderer of node '{}'", path)
                        })?;
                    }
                    for bone in &renderer.bones {
                        check_index("bone node", *bone, node_count, || {
                            format!("skinned renderer of node '{}'", path)
                        })?;
                    }
                    renderer
                        .mesh
                        .validate(&format!("skinned mesh of node '{}'", path))?;
                }
                NodeEntry::Collider(Collider::Mesh { mesh, .. }) => {
                    mesh.validate(&format!("mesh collider of node '{}'", path))?
                }
                _ => (),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct TagAndLayer {
    pub tag: String,
    pub layer: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub streams: Vec<MeshStream>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeshStream {
    Vertices(Vec<C3Vector>),
    Normals(Vec<C3Vector>),
    Tangents(Vec<C4Vector>),
    Uv(Vec<C2Vector>),
    Uv2(Vec<C2Vector>),
    Colors(Vec<CRgba8>),
    BoneWeights(Vec<BoneWeight>),
    BindPoses(Vec<Matrix4>),
    /// One stream per sub-mesh.
    Triangles(Vec<u32>),
    Unknown(RawChunk),
}

impl MeshStream {
    fn per_vertex_len(&self) -> Option<(&'static str, usize)> {
        match self {
            MeshStream::Normals(list) => Some(("normals", list.len())),
            MeshStream::Tangents(list) => Some(("tangents", list.len())),
            MeshStream::Uv(list) => Some(("uv", list.len())),
            MeshStream::Uv2(list) => Some(("uv2", list.len())),
            MeshStream::Colors(list) => Some(("colors", list.len())),
            MeshStream::BoneWeights(list) => Some(("bone weights", list.len())),
            _ => None,
        }
    }
}

impl Mesh {
    pub fn vertices(&self) -> &[C3Vector] {
        self.streams
            .iter()
            .find_map(|stream| match stream {
                MeshStream::Vertices(list) => Some(list.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn normals(&self) -> &[C3Vector] {
        self.streams
            .iter()
            .find_map(|stream| match stream {
                MeshStream::Normals(list) => Some(list.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn uvs(&self) -> &[C2Vector] {
        self.streams
            .iter()
            .find_map(|stream| match stream {
                MeshStream::Uv(list) => Some(list.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn bind_poses(&self) -> &[Matrix4] {
        self.streams
            .iter()
            .find_map(|stream| match stream {
                MeshStream::BindPoses(list) => Some(list.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn submeshes(&self) -> impl Iterator<Item = &[u32]> {
        self.streams.iter().filter_map(|stream| match stream {
            MeshStream::Triangles(list) => Some(list.as_slice()),
            _ => None,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes().map(|tris| tris.len() / 3).sum()
    }

    pub(crate) fn validate(&self, context: &str) -> Result<(), ParserError> {
        let vertex_streams = self
            .streams
            .iter()
            .filter(|stream| matches!(stream, MeshStream::Vertices(_)))
            .count();
        if vertex_streams > 1 {
            return Err(ParserError::format(format!("{} has {} vertex streams", context, vertex_streams)));
        }

        let vertex_count = self.vertices().len();
        let bone_count = self.bind_poses().len();
        for stream in &self.streams {
            if let Some((what, len)) = stream.per_vertex_len() {
                if len != vertex_count {
                    return Err(ParserError::format(format!(
                        "{} has {} {} for {} vertices",
                        context, len, what, vertex_count
                    )));
                }
            }

            match stream {
                MeshStream::Triangles(tris) => {
                    if tris.len() % 3 != 0 {
                        return Err(ParserError::format(format!(
                            "{} has a sub-mesh with {} indices, which is not a multiple of 3",
                            context,
                            tris.len()
                        )));
                    }
                    for index in tris {
                        check_index("vertex", *index, vertex_count, || context.to_owned())?;
                    }
                }
                MeshStream::BoneWeights(weights) if bone_count > 0 => {
                    for weight in weights {
                        for index in weight.indices {
                            check_index("bind pose", index, bone_count, || context.to_owned())?;
                        }
                    }
                }
                _ => (),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Parse, Emit)]
pub struct BoneWeight {
    pub indices: [u32; 4],
    pub weights: [f32; 4],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Renderer {
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    /// Indices into [`MuModel::materials`].
    pub materials: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedRenderer {
    pub materials: Vec<u32>,
    pub bounds: Bounds,
    pub quality: u32,
    pub update_when_offscreen: bool,
    /// Pre-order node indices, see [`MuModel::nodes`].
    pub bones: Vec<u32>,
    pub mesh: Mesh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    Mesh {
        is_trigger: bool,
        convex: bool,
        mesh: Mesh,
    },
    Sphere {
        is_trigger: bool,
        radius: f32,
        center: C3Vector,
    },
    Capsule {
        is_trigger: bool,
        radius: f32,
        height: f32,
        direction: u32,
        center: C3Vector,
    },
    Box {
        is_trigger: bool,
        size: C3Vector,
        center: C3Vector,
    },
    Wheel(WheelCollider),
}

#[derive(Debug, Copy, Clone, PartialEq, Parse, Emit)]
pub struct WheelCollider {
    pub mass: f32,
    pub radius: f32,
    pub suspension_distance: f32,
    pub center: C3Vector,
    pub spring: f32,
    pub damper: f32,
    pub target_position: f32,
    pub forward_friction: Friction,
    pub sideways_friction: Friction,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Parse, Emit)]
pub struct Friction {
    pub extremum_slip: f32,
    pub extremum_value: f32,
    pub asymptote_slip: f32,
    pub asymptote_value: f32,
    pub stiffness: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum LightKind {
    Spot = 0,
    Directional = 1,
    Point = 2,
}

impl Parseable<LightKind> for LightKind {
    fn parse<R: Read>(rdr: &mut R) -> Result<LightKind, ParserError> {
        let raw = rdr.read_u32::<LittleEndian>()?;
        LightKind::try_from(raw).map_err(|_| ParserError::format(format!("unknown light kind {}", raw)))
    }
}

impl Emittable for LightKind {
    fn emit<W: std::io::Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        u32::from(*self).emit(wtr)
    }
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct Light {
    pub kind: LightKind,
    pub intensity: f32,
    pub range: f32,
    pub color: CRgba,
    pub cull_mask: u32,
    pub spot_angle: f32,
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct Animation {
    pub clips: Vec<AnimationClip>,
    pub default_clip: String,
    pub auto_play: bool,
}

impl Animation {
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|clip| clip.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct AnimationClip {
    pub name: String,
    pub bounds: Bounds,
    pub wrap_mode: u32,
    pub curves: Vec<AnimationCurve>,
}

impl AnimationClip {
    /// The curve driving `property` of the node at `path` (relative to the animated node).
    pub fn curve(&self, path: &str, property: &str) -> Option<&AnimationCurve> {
        self.curves
            .iter()
            .find(|curve| curve.path == path && curve.property == property)
    }

    /// `None` means the channel is not animated by this clip.
    pub fn sample(&self, path: &str, property: &str, time: f32) -> Option<f32> {
        self.curve(path, property).and_then(|curve| curve.evaluate(time))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum AnimationTarget {
    Transform = 0,
    Material = 1,
    Light = 2,
    AudioSource = 3,
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct AnimationCurve {
    pub path: String,
    pub property: String,
    pub target: u32,
    pub pre_wrap: u32,
    pub post_wrap: u32,
    pub keys: Vec<Keyframe>,
}

impl AnimationCurve {
    pub fn target_kind(&self) -> Option<AnimationTarget> {
        AnimationTarget::try_from(self.target).ok()
    }

    /// Cubic Hermite interpolation between the surrounding keys, clamped to the first and last key.
    pub fn evaluate(&self, time: f32) -> Option<f32> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if time <= first.time {
            return Some(first.value);
        }
        if time >= last.time {
            return Some(last.value);
        }

        let (from, to) = self
            .keys
            .windows(2)
            .map(|pair| (&pair[0], &pair[1]))
            .find(|(_, to)| time <= to.time)?;

        let span = to.time - from.time;
        if span <= 0.0 {
            return Some(to.value);
        }

        let t = (time - from.time) / span;
        let t2 = t * t;
        let t3 = t2 * t;
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;
        Some(h00 * from.value + h10 * span * from.out_tangent + h01 * to.value + h11 * span * to.in_tangent)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Parse, Emit)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
    pub tangent_mode: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum TextureKind {
    Texture = 0,
    NormalMap = 1,
}

impl Parseable<TextureKind> for TextureKind {
    fn parse<R: Read>(rdr: &mut R) -> Result<TextureKind, ParserError> {
        let raw = rdr.read_u32::<LittleEndian>()?;
        TextureKind::try_from(raw).map_err(|_| ParserError::format(format!("unknown texture kind {}", raw)))
    }
}

impl Emittable for TextureKind {
    fn emit<W: std::io::Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        u32::from(*self).emit(wtr)
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct TextureFlags: u32 {
        const CLAMP_U = 0x1;
        const CLAMP_V = 0x2;
        const MIRROR_U = 0x4;
        const MIRROR_V = 0x8;
        const ALPHA = 0x10;
    }
}

impl Parseable<TextureFlags> for TextureFlags {
    fn parse<R: Read>(rdr: &mut R) -> Result<TextureFlags, ParserError> {
        // unknown bits are kept so that they are written back unchanged
        Ok(TextureFlags::from_bits_retain(rdr.read_u32::<LittleEndian>()?))
    }
}

impl Emittable for TextureFlags {
    fn emit<W: std::io::Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        self.bits().emit(wtr)
    }
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct Texture {
    pub name: String,
    pub kind: TextureKind,
    pub flags: TextureFlags,
    /// Raw image file contents, never decoded here.
    pub data: Vec<u8>,
}

impl Texture {
    pub fn new(name: &str, kind: TextureKind) -> Self {
        Texture {
            name: name.to_owned(),
            kind,
            flags: TextureFlags::empty(),
            data: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct ColorProperty {
    pub name: String,
    pub value: CRgba,
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct VectorProperty {
    pub name: String,
    pub value: C4Vector,
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct FloatProperty {
    pub name: String,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureProperty {
    pub name: String,
    /// Index into [`MuModel::textures`], stored as -1 when unset.
    pub index: Option<u32>,
    pub scale: C2Vector,
    pub offset: C2Vector,
}

impl Parseable<TextureProperty> for TextureProperty {
    fn parse<R: Read>(rdr: &mut R) -> Result<TextureProperty, ParserError> {
        let name = String::parse(rdr)?;
        let index = match rdr.read_i32::<LittleEndian>()? {
            -1 => None,
            index if index >= 0 => Some(index as u32),
            index => {
                return Err(ParserError::format(format!(
                    "texture property '{}' has the negative index {}",
                    name, index
                )));
            }
        };

        Ok(TextureProperty {
            name,
            index,
            scale: C2Vector::parse(rdr)?,
            offset: C2Vector::parse(rdr)?,
        })
    }
}

impl Emittable for TextureProperty {
    fn emit<W: std::io::Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        self.name.emit(wtr)?;
        let index = match self.index {
            None => -1,
            Some(index) => i32::try_from(index).map_err(|_| {
                ParserError::format(format!(
                    "texture property '{}' index {} does not fit into an i32",
                    self.name, index
                ))
            })?,
        };
        index.emit(wtr)?;
        self.scale.emit(wtr)?;
        self.offset.emit(wtr)
    }
}

#[derive(Debug, Clone, PartialEq, Parse, Emit)]
pub struct Material {
    pub name: String,
    pub shader: String,
    pub colors: Vec<ColorProperty>,
    pub vectors: Vec<VectorProperty>,
    pub floats: Vec<FloatProperty>,
    pub textures: Vec<TextureProperty>,
}

impl Material {
    pub fn new(name: &str, shader: ShaderKind) -> Self {
        Material {
            name: name.to_owned(),
            shader: shader.identifier().to_owned(),
            colors: Vec::new(),
            vectors: Vec::new(),
            floats: Vec::new(),
            textures: Vec::new(),
        }
    }

    pub fn shader_kind(&self) -> Option<ShaderKind> {
        self.shader.parse().ok()
    }

    pub fn texture_property(&self, name: &str) -> Option<&TextureProperty> {
        self.textures.iter().find(|prop| prop.name == name)
    }

    pub fn color(&self, name: &str) -> Option<CRgba> {
        self.colors.iter().find(|prop| prop.name == name).map(|prop| prop.value)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.floats.iter().find(|prop| prop.name == name).map(|prop| prop.value)
    }
}

/// The shaders KSP ships with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Diffuse,
    Specular,
    Bumped,
    BumpedSpecular,
    EmissiveDiffuse,
    EmissiveSpecular,
    EmissiveBumpedSpecular,
    AlphaCutoff,
    AlphaCutoffBumped,
    AlphaTranslucent,
    AlphaTranslucentSpecular,
    AlphaUnlitTransparent,
    Unlit,
    ParticlesAlphaBlended,
    ParticlesAdditive,
}

const SHADER_IDENTIFIERS: [(ShaderKind, &str); 15] = [
    (ShaderKind::Diffuse, "KSP/Diffuse"),
    (ShaderKind::Specular, "KSP/Specular"),
    (ShaderKind::Bumped, "KSP/Bumped"),
    (ShaderKind::BumpedSpecular, "KSP/Bumped Specular"),
    (ShaderKind::EmissiveDiffuse, "KSP/Emissive/Diffuse"),
    (ShaderKind::EmissiveSpecular, "KSP/Emissive/Specular"),
    (ShaderKind::EmissiveBumpedSpecular, "KSP/Emissive/Bumped Specular"),
    (ShaderKind::AlphaCutoff, "KSP/Alpha/Cutoff"),
    (ShaderKind::AlphaCutoffBumped, "KSP/Alpha/Cutoff Bumped"),
    (ShaderKind::AlphaTranslucent, "KSP/Alpha/Translucent"),
    (ShaderKind::AlphaTranslucentSpecular, "KSP/Alpha/Translucent Specular"),
    (ShaderKind::AlphaUnlitTransparent, "KSP/Alpha/Unlit Transparent"),
    (ShaderKind::Unlit, "KSP/Unlit"),
    (ShaderKind::ParticlesAlphaBlended, "KSP/Particles/Alpha Blended"),
    (ShaderKind::ParticlesAdditive, "KSP/Particles/Additive"),
];

impl ShaderKind {
    pub fn identifier(self) -> &'static str {
        SHADER_IDENTIFIERS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, id)| *id)
            .unwrap_or_default()
    }

    pub fn is_emissive(self) -> bool {
        matches!(
            self,
            ShaderKind::EmissiveDiffuse | ShaderKind::EmissiveSpecular | ShaderKind::EmissiveBumpedSpecular
        )
    }

    pub fn is_transparent(self) -> bool {
        matches!(
            self,
            ShaderKind::AlphaCutoff
                | ShaderKind::AlphaCutoffBumped
                | ShaderKind::AlphaTranslucent
                | ShaderKind::AlphaTranslucentSpecular
                | ShaderKind::AlphaUnlitTransparent
                | ShaderKind::ParticlesAlphaBlended
                | ShaderKind::ParticlesAdditive
        )
    }
}

impl FromStr for ShaderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SHADER_IDENTIFIERS
            .iter()
            .find(|(_, id)| *id == s)
            .map(|(kind, _)| *kind)
            .ok_or_else(|| format!("unknown shader '{}'", s))
    }
}
