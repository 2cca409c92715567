use crate::ParserError;
use crate::common::types::{Bounds, C2Vector, C3Vector, C4Quaternion, CRgba, CRgba8, Matrix4, RawChunk};
use crate::mu::reader::MuReader;
use crate::common::writer::{Emittable, write_string};
use crate::mu::types::{
    Animation, AnimationClip, AnimationCurve, AnimationTarget, BoneWeight, ChunkTag, Collider, ColorProperty,
    FloatProperty, Friction, Keyframe, Light, LightKind, MAX_NODE_DEPTH, MU_MAGIC, MU_VERSION, Material, Mesh,
    MeshStream, MuModel, MuNode, MuTransform, NodeEntry, Renderer, ShaderKind, SkinnedRenderer, TagAndLayer, Texture,
    TextureFlags, TextureKind, TextureProperty, WheelCollider,
};
use crate::mu::writer::MuWriter;

fn v3(x: f32, y: f32, z: f32) -> C3Vector {
    C3Vector { x, y, z }
}

fn quad_mesh() -> Mesh {
    Mesh {
        streams: vec![
            MeshStream::Vertices(vec![v3(0.0, 0.0, 0.0), v3(1.0, 0.0, 0.0), v3(1.0, 0.0, 1.0), v3(0.0, 0.0, 1.0)]),
            MeshStream::Normals(vec![v3(0.0, 1.0, 0.0); 4]),
            MeshStream::Uv(vec![
                C2Vector { x: 0.0, y: 0.0 },
                C2Vector { x: 1.0, y: 0.0 },
                C2Vector { x: 1.0, y: 1.0 },
                C2Vector { x: 0.0, y: 1.0 },
            ]),
            MeshStream::Colors(vec![CRgba8 { r: 255, g: 128, b: 0, a: 255 }; 4]),
            MeshStream::Triangles(vec![0, 1, 2, 0, 2, 3]),
        ],
    }
}

fn textured_material(name: &str, texture: u32) -> Material {
    let mut material = Material::new(name, ShaderKind::Specular);
    material.colors.push(ColorProperty {
        name: "_SpecColor".to_owned(),
        value: CRgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 },
    });
    material.floats.push(FloatProperty {
        name: "_Shininess".to_owned(),
        value: 0.4,
    });
    material.textures.push(TextureProperty {
        name: "_MainTex".to_owned(),
        index: Some(texture),
        scale: C2Vector { x: 1.0, y: 1.0 },
        offset: C2Vector::default(),
    });
    material
}

/// A single node without anything attached, the smallest model the reader accepts.
fn minimal_model() -> MuModel {
    MuModel::new("tank", MuNode::new("tank"))
}

fn sample_model() -> MuModel {
    let animation = Animation {
        clips: vec![AnimationClip {
            name: "deploy".to_owned(),
            bounds: Bounds::default(),
            wrap_mode: 1,
            curves: vec![AnimationCurve {
                path: "hatch".to_owned(),
                property: "m_LocalPosition.y".to_owned(),
                target: AnimationTarget::Transform.into(),
                pre_wrap: 8,
                post_wrap: 8,
                keys: vec![
                    Keyframe { time: 0.0, value: 0.0, ..Default::default() },
                    Keyframe { time: 1.0, value: 10.0, ..Default::default() },
                ],
            }],
        }],
        default_clip: "deploy".to_owned(),
        auto_play: false,
    };

    let hatch = MuNode::new("hatch")
        .with_entry(NodeEntry::TagAndLayer(TagAndLayer { tag: "Untagged".to_owned(), layer: 0 }))
        .with_entry(NodeEntry::MeshFilter(quad_mesh()))
        .with_entry(NodeEntry::Renderer(Renderer {
            cast_shadows: true,
            receive_shadows: false,
            materials: vec![1],
        }))
        .with_entry(NodeEntry::Collider(Collider::Box {
            is_trigger: false,
            size: v3(1.0, 0.1, 1.0),
            center: v3(0.5, 0.0, 0.5),
        }));

    let mut skinned_mesh = quad_mesh();
    skinned_mesh.streams.push(MeshStream::BoneWeights(vec![
        BoneWeight { indices: [0, 1, 0, 0], weights: [0.5, 0.5, 0.0, 0.0] };
        4
    ]));
    skinned_mesh.streams.push(MeshStream::BindPoses(vec![Matrix4::default(); 2]));

    let wheel = MuNode::new("wheel")
        .with_entry(NodeEntry::Collider(Collider::Wheel(WheelCollider {
            mass: 0.1,
            radius: 0.3,
            suspension_distance: 0.05,
            center: v3(0.0, 0.0, 0.0),
            spring: 100.0,
            damper: 2.0,
            target_position: 0.5,
            forward_friction: Friction { stiffness: 1.0, ..Default::default() },
            sideways_friction: Friction { stiffness: 2.0, ..Default::default() },
        })))
        .with_entry(NodeEntry::SkinnedRenderer(SkinnedRenderer {
            materials: vec![0],
            bounds: Bounds { center: v3(0.0, 0.0, 0.0), size: v3(1.0, 1.0, 1.0) },
            quality: 4,
            update_when_offscreen: true,
            bones: vec![0, 2],
            mesh: skinned_mesh,
        }));

    let mut root = MuNode::new("tank")
        .with_entry(NodeEntry::Animation(animation))
        .with_entry(NodeEntry::Child(hatch))
        .with_entry(NodeEntry::Collider(Collider::Mesh {
            is_trigger: true,
            convex: true,
            mesh: quad_mesh(),
        }))
        .with_entry(NodeEntry::Light(Light {
            kind: LightKind::Point,
            intensity: 1.5,
            range: 10.0,
            color: CRgba { r: 1.0, g: 0.9, b: 0.8, a: 1.0 },
            cull_mask: 0xFFFF_FFFF,
            spot_angle: 30.0,
        }))
        .with_entry(NodeEntry::Child(wheel))
        .with_entry(NodeEntry::Collider(Collider::Capsule {
            is_trigger: false,
            radius: 0.5,
            height: 2.0,
            direction: 1,
            center: v3(0.0, 1.0, 0.0),
        }))
        .with_entry(NodeEntry::Collider(Collider::Sphere {
            is_trigger: false,
            radius: 1.25,
            center: v3(0.0, 0.0, 0.0),
        }));
    root.transform.position = v3(0.0, 1.0, 2.0);
    root.transform.rotation = C4Quaternion { x: 0.0, y: 0.7071068, z: 0.0, w: 0.7071068 };

    let mut model = MuModel::new("tank", root);
    let diffuse = model.intern_texture(Texture::new("Squad/Parts/tank", TextureKind::Texture));
    let mut normal = Texture::new("Squad/Parts/tank_NRM", TextureKind::NormalMap);
    normal.flags = TextureFlags::CLAMP_U | TextureFlags::from_bits_retain(0x100);
    normal.data = vec![0x89, b'P', b'N', b'G'];
    let normal = model.intern_texture(normal);
    model.add_material(textured_material("body", diffuse));
    model.add_material(textured_material("hatch", normal));
    model
}

#[test]
fn round_trip_is_byte_identical() -> Result<(), anyhow::Error> {
    let model = sample_model();
    let bytes = model.to_bytes()?;

    let read_back = MuReader::parse_bytes(&bytes)?;
    assert_eq!(read_back, model);
    assert_eq!(read_back.to_bytes()?, bytes);
    Ok(())
}

#[test]
fn round_trip_of_older_versions() -> Result<(), anyhow::Error> {
    for version in 1..=2 {
        let mut model = sample_model();
        model.version = version;
        let bytes = model.to_bytes()?;

        let read_back = MuReader::parse_bytes(&bytes)?;
        assert_eq!(read_back.version, version);
        assert_eq!(read_back.to_bytes()?, bytes);
    }
    Ok(())
}

#[test]
fn version_one_renderers_have_no_shadow_flags() -> Result<(), anyhow::Error> {
    let mut model = sample_model();
    let v3_len = model.to_bytes()?.len();
    model.version = 1;
    let v1 = MuReader::parse_bytes(&model.to_bytes()?)?;

    let hatch = v1.root.find("hatch").expect("hatch node");
    let renderer = hatch.renderer().expect("renderer");
    assert!(renderer.cast_shadows && renderer.receive_shadows);
    // two shadow flags and four trigger flags are gone
    assert_eq!(model.to_bytes()?.len(), v3_len - 6);
    Ok(())
}

#[test]
fn file_round_trip() -> Result<(), anyhow::Error> {
    let path = std::env::temp_dir().join(format!("mu-files-round-trip-{}.mu", std::process::id()));
    let model = sample_model();
    MuWriter::write_file(&model, &path)?;
    let read_back = MuReader::read_file(&path);
    std::fs::remove_file(&path)?;

    assert_eq!(read_back?, model);
    Ok(())
}

#[test]
fn texture_indices_resolve_after_reading() -> Result<(), anyhow::Error> {
    let model = MuReader::parse_bytes(&sample_model().to_bytes()?)?;

    for material in &model.materials {
        for prop in &material.textures {
            if let Some(index) = prop.index {
                assert!(model.texture(index).is_some(), "{} -> {}", material.name, index);
            }
        }
    }

    let hatch = &model.materials[1];
    assert_eq!(hatch.shader_kind(), Some(ShaderKind::Specular));
    let texture = model.material_texture(hatch, "_MainTex").expect("main texture");
    assert_eq!(texture.name, "Squad/Parts/tank_NRM");
    assert_eq!(texture.kind, TextureKind::NormalMap);
    assert!(model.material_texture(hatch, "_BumpMap").is_none());
    Ok(())
}

#[test]
fn out_of_range_texture_index_is_rejected() -> Result<(), anyhow::Error> {
    let mut model = minimal_model();
    model.intern_texture(Texture::new("only", TextureKind::Texture));
    model.add_material(textured_material("body", 0));
    let mut bytes = model.to_bytes()?;

    // the materials chunk comes last, ending with: i32 index, vec2 scale, vec2 offset
    let at = bytes.len() - 20;
    bytes[at..at + 4].copy_from_slice(&5i32.to_le_bytes());

    match MuReader::parse_bytes(&bytes) {
        Err(ParserError::InvalidReference { what, index, len, context }) => {
            assert_eq!(what, "texture");
            assert_eq!(index, 5);
            assert_eq!(len, 1);
            assert!(context.contains("body"), "{}", context);
        }
        other => panic!("expected an invalid reference, got {:?}", other),
    }
    Ok(())
}

#[test]
fn writer_refuses_dangling_references() {
    let mut model = minimal_model();
    model.root.entries.push(NodeEntry::Renderer(Renderer {
        cast_shadows: true,
        receive_shadows: true,
        materials: vec![3],
    }));

    assert!(matches!(
        model.to_bytes(),
        Err(ParserError::InvalidReference { what: "material", index: 3, .. })
    ));
}

#[test]
fn bone_indices_are_node_indices() {
    let mut model = sample_model();
    assert_eq!(model.nodes().len(), 3);

    if let Some(NodeEntry::Child(wheel)) = model.root.entries.get_mut(4) {
        if let Some(NodeEntry::SkinnedRenderer(renderer)) = wheel.entries.get_mut(1) {
            renderer.bones.push(7);
        }
    }

    match model.validate() {
        Err(ParserError::InvalidReference { what, context, .. }) => {
            assert_eq!(what, "bone node");
            assert!(context.contains("tank/wheel"), "{}", context);
        }
        other => panic!("expected an invalid bone reference, got {:?}", other),
    }
}

#[test]
fn mesh_streams_must_match_vertex_count() {
    let mut mesh = quad_mesh();
    mesh.streams.push(MeshStream::Uv2(vec![C2Vector::default(); 3]));
    let model = MuModel::new("broken", MuNode::new("broken").with_entry(NodeEntry::MeshFilter(mesh)));

    assert!(matches!(model.validate(), Err(ParserError::FormatError { .. })));

    let mut mesh = quad_mesh();
    mesh.streams.push(MeshStream::Triangles(vec![0, 1, 4]));
    let model = MuModel::new("broken", MuNode::new("broken").with_entry(NodeEntry::MeshFilter(mesh)));

    assert!(matches!(
        model.validate(),
        Err(ParserError::InvalidReference { what: "vertex", index: 4, len: 4, .. })
    ));
}

#[test]
fn bad_magic_and_version_are_rejected() -> Result<(), anyhow::Error> {
    let bytes = minimal_model().to_bytes()?;

    let mut bad_magic = bytes.clone();
    bad_magic[0] ^= 0xFF;
    assert!(matches!(
        MuReader::parse_bytes(&bad_magic),
        Err(ParserError::InvalidMagicValue { .. })
    ));

    let mut bad_version = bytes.clone();
    bad_version[4..8].copy_from_slice(&9u32.to_le_bytes());
    assert!(matches!(
        MuReader::parse_bytes(&bad_version),
        Err(ParserError::UnsupportedVersion { version: 9 })
    ));
    Ok(())
}

#[test]
fn truncated_files_are_rejected() -> Result<(), anyhow::Error> {
    let bytes = sample_model().to_bytes()?;

    for cut in [2, 6, 20, bytes.len() / 2, bytes.len() - 1] {
        let result = MuReader::parse_bytes(&bytes[..cut]);
        assert!(
            matches!(result, Err(ParserError::Truncated { .. })),
            "cut at {}: {:?}",
            cut,
            result
        );
    }
    Ok(())
}

#[test]
fn missing_mandatory_chunk_is_a_format_error() -> Result<(), anyhow::Error> {
    let model = minimal_model();
    let bytes = model.to_bytes()?;
    // empty materials chunk: tag, size and a zero count
    let without_materials = &bytes[..bytes.len() - 12];

    match MuReader::parse_bytes(without_materials) {
        Err(ParserError::FormatError { reason }) => assert!(reason.contains("materials"), "{}", reason),
        other => panic!("expected a format error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn unknown_chunks_survive_a_round_trip() -> Result<(), anyhow::Error> {
    let mut model = sample_model();
    let unknown = |tag: u32| RawChunk {
        tag,
        data: vec![1, 2, 3, 4, 5],
    };
    model.root.entries.insert(1, NodeEntry::Unknown(unknown(32)));
    if let Some(NodeEntry::Child(hatch)) = model.root.entries.get_mut(2) {
        if let Some(NodeEntry::MeshFilter(mesh)) = hatch.entries.get_mut(1) {
            mesh.streams.insert(0, MeshStream::Unknown(unknown(99)));
        }
    }
    model.extensions.push(unknown(31));

    let bytes = model.to_bytes()?;
    let read_back = MuReader::parse_bytes(&bytes)?;
    assert_eq!(read_back, model);
    assert_eq!(read_back.to_bytes()?, bytes);
    Ok(())
}

#[test]
fn top_level_chunks_are_written_in_canonical_order() -> Result<(), anyhow::Error> {
    let mut model = sample_model();
    model.extensions.push(RawChunk { tag: 500, data: vec![7; 3] });
    let canonical = model.to_bytes()?;

    // split into header and chunks and put the extension and materials first
    let header_len = 4 + 4 + 1 + model.name.len();
    let mut chunks = Vec::new();
    let mut pos = header_len;
    while pos < canonical.len() {
        let size = u32::from_le_bytes(canonical[pos + 4..pos + 8].try_into()?) as usize;
        chunks.push(&canonical[pos..pos + 8 + size]);
        pos += 8 + size;
    }
    assert_eq!(chunks.len(), 4);

    let mut shuffled = canonical[..header_len].to_vec();
    for index in [3, 2, 0, 1] {
        shuffled.extend_from_slice(chunks[index]);
    }
    assert_ne!(shuffled, canonical);

    let read_back = MuReader::parse_bytes(&shuffled)?;
    assert_eq!(read_back, model);
    assert_eq!(read_back.to_bytes()?, canonical);
    Ok(())
}

#[test]
fn duplicate_mandatory_chunks_are_rejected() -> Result<(), anyhow::Error> {
    let mut bytes = minimal_model().to_bytes()?;
    let textures_and_materials = bytes[bytes.len() - 24..].to_vec();
    bytes.extend_from_slice(&textures_and_materials);

    assert!(matches!(
        MuReader::parse_bytes(&bytes),
        Err(ParserError::FormatError { .. })
    ));
    Ok(())
}

#[test]
fn intern_texture_reuses_slots_in_first_seen_order() {
    let mut model = minimal_model();
    assert_eq!(model.intern_texture(Texture::new("a", TextureKind::Texture)), 0);
    assert_eq!(model.intern_texture(Texture::new("b", TextureKind::NormalMap)), 1);
    assert_eq!(model.intern_texture(Texture::new("a", TextureKind::Texture)), 0);
    assert_eq!(model.textures.len(), 2);
}

#[test]
fn animation_channels() -> Result<(), anyhow::Error> {
    let model = MuReader::parse_bytes(&sample_model().to_bytes()?)?;
    let animation = model.root.animation().expect("animation");
    let clip = animation.clip(&animation.default_clip).expect("default clip");

    assert_eq!(clip.sample("hatch", "m_LocalPosition.y", 0.5), Some(5.0));
    assert_eq!(clip.sample("hatch", "m_LocalPosition.y", 2.0), Some(10.0));
    assert_eq!(clip.sample("hatch", "m_LocalPosition.x", 0.5), None);
    assert_eq!(clip.sample("missing", "m_LocalPosition.y", 0.5), None);
    assert_eq!(
        clip.curve("hatch", "m_LocalPosition.y").and_then(|curve| curve.target_kind()),
        Some(AnimationTarget::Transform)
    );
    Ok(())
}

#[test]
fn node_lookup_by_path() {
    let model = sample_model();
    assert_eq!(model.root.children().count(), 2);
    assert!(model.root.find("wheel").and_then(|wheel| wheel.mesh()).is_some());
    assert!(model.root.find("hatch").and_then(|hatch| hatch.collider()).is_some());
    assert!(model.root.find("hatch/nothing").is_none());
    assert_eq!(model.root.find("hatch").map(|hatch| hatch.material_indices()), Some(&[1u32][..]));
}

#[test]
fn shader_identifiers() {
    assert_eq!("KSP/Emissive/Bumped Specular".parse(), Ok(ShaderKind::EmissiveBumpedSpecular));
    assert!("Legacy Shaders/Diffuse".parse::<ShaderKind>().is_err());
    assert_eq!(ShaderKind::AlphaTranslucent.identifier(), "KSP/Alpha/Translucent");
    assert!(ShaderKind::EmissiveDiffuse.is_emissive());
    assert!(!ShaderKind::Diffuse.is_transparent());
}

#[test]
fn strings_use_minimal_seven_bit_lengths() -> Result<(), anyhow::Error> {
    use crate::common::reader::read_string;

    let long = "x".repeat(300);
    let mut buf = Vec::new();
    write_string(&mut buf, &long)?;
    assert_eq!(&buf[..2], &[0xAC, 0x02]);
    assert_eq!(read_string(&mut std::io::Cursor::new(buf.as_slice()))?, long);

    let overlong: &[u8] = &[0x81, 0x00, b'x'];
    assert!(matches!(
        read_string(&mut std::io::Cursor::new(overlong)),
        Err(ParserError::FormatError { .. })
    ));
    Ok(())
}

#[test]
fn properties_resolve_by_name() -> Result<(), anyhow::Error> {
    let bytes = sample_model().to_bytes()?;
    let model = MuReader::parse_model(&mut std::io::Cursor::new(bytes))?;

    let body = &model.materials[0];
    assert_eq!(body.color("_SpecColor"), Some(CRgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 }));
    assert_eq!(body.float("_Shininess"), Some(0.4));
    assert_eq!(body.float("_SpecColor"), None);
    assert_eq!(body.color("_Missing"), None);

    let hatch_mesh = model.root.find("hatch").and_then(|hatch| hatch.mesh()).expect("hatch mesh");
    assert_eq!(hatch_mesh.uvs().len(), 4);
    assert_eq!(hatch_mesh.uvs()[2], C2Vector { x: 1.0, y: 1.0 });
    assert!(Mesh::default().uvs().is_empty());
    Ok(())
}

/// A file whose root is a chain of `depth` nodes, written without going through `MuWriter`.
fn nested_node_file(depth: usize) -> Result<Vec<u8>, anyhow::Error> {
    let mut payload = Vec::new();
    MuTransform::named("link").emit(&mut payload)?;
    for _ in 1..depth {
        let mut parent = Vec::new();
        MuTransform::named("link").emit(&mut parent)?;
        RawChunk { tag: ChunkTag::Node.into(), data: payload }.write(&mut parent)?;
        payload = parent;
    }

    let mut bytes = Vec::new();
    MU_MAGIC.emit(&mut bytes)?;
    MU_VERSION.emit(&mut bytes)?;
    write_string(&mut bytes, "chain")?;
    RawChunk { tag: ChunkTag::Node.into(), data: payload }.write(&mut bytes)?;
    for tag in [ChunkTag::Textures, ChunkTag::Materials] {
        RawChunk { tag: tag.into(), data: vec![0; 4] }.write(&mut bytes)?;
    }
    Ok(bytes)
}

#[test]
fn node_nesting_is_limited_when_reading() -> Result<(), anyhow::Error> {
    let model = MuReader::parse_bytes(&nested_node_file(MAX_NODE_DEPTH)?)?;
    assert_eq!(model.nodes().len(), MAX_NODE_DEPTH);

    match MuReader::parse_bytes(&nested_node_file(MAX_NODE_DEPTH + 1)?) {
        Err(ParserError::FormatError { reason }) => assert!(reason.contains("nested deeper"), "{}", reason),
        other => panic!("expected a format error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn node_nesting_is_limited_when_writing() -> Result<(), anyhow::Error> {
    let chain = |depth: usize| {
        let mut node = MuNode::new("link");
        for _ in 1..depth {
            node = MuNode::new("link").with_entry(NodeEntry::Child(node));
        }
        MuModel::new("chain", node)
    };

    let bytes = chain(MAX_NODE_DEPTH).to_bytes()?;
    assert_eq!(bytes, nested_node_file(MAX_NODE_DEPTH)?);
    assert!(matches!(
        chain(MAX_NODE_DEPTH + 1).to_bytes(),
        Err(ParserError::FormatError { .. })
    ));
    Ok(())
}
