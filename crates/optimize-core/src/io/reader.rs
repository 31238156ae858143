//! GLB container parsing into an in-memory [`Document`] (spec §4.1, §6).
//!
//! Grounded in `draco_io::gltf_reader::GltfReader::from_glb` for the chunk
//! walk and glTF JSON schema, extended to build the full scene graph
//! (materials, textures, nodes, skins) this pipeline's steps operate on.

use std::collections::HashMap;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::document::{
    Accessor, AccessorData, AccessorType, Buffer, ComponentType, Document, Material, Mesh, Node,
    Primitive, Scene, Semantic, Skin, Texture, Topology, Transform,
};
use crate::error::{OptimizeError, Result};
use crate::io::gltf_json::{GltfRoot, JsonAccessor, JsonBufferView};

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const GLB_CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const MAX_FILE_SIZE: usize = 100 * 1024 * 1024;

pub fn read(path: impl AsRef<Path>) -> Result<Document> {
    let bytes = std::fs::read(path.as_ref())
        .map_err(|e| OptimizeError::InvalidFile(format!("cannot read file: {e}")))?;
    read_bytes(&bytes)
}

pub fn read_bytes(data: &[u8]) -> Result<Document> {
    if data.len() > MAX_FILE_SIZE {
        return Err(OptimizeError::InvalidFile(format!(
            "file exceeds the 100 MiB limit ({} bytes)",
            data.len()
        )));
    }
    if data.len() < 12 {
        return Err(OptimizeError::InvalidFile(
            "file too small for a GLB header".into(),
        ));
    }

    let mut header = &data[0..12];
    let magic = header.read_u32::<LittleEndian>().unwrap();
    let version = header.read_u32::<LittleEndian>().unwrap();
    let length = header.read_u32::<LittleEndian>().unwrap() as usize;

    if magic != GLB_MAGIC {
        return Err(OptimizeError::InvalidFile(format!(
            "bad container magic: {magic:#x}"
        )));
    }
    if version != GLB_VERSION {
        return Err(OptimizeError::InvalidFile(format!(
            "unsupported glTF version: {version}"
        )));
    }
    if length != data.len() {
        return Err(OptimizeError::InvalidFile(format!(
            "header length {length} does not match file size {}",
            data.len()
        )));
    }

    let mut offset = 12usize;
    let mut json_chunk: Option<&[u8]> = None;
    let mut bin_chunk: Option<&[u8]> = None;

    while offset + 8 <= length {
        let chunk_length = u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap()) as usize;
        let chunk_type = u32::from_le_bytes(data[offset + 4..offset + 8].try_into().unwrap());
        offset += 8;
        if offset + chunk_length > length {
            return Err(OptimizeError::InvalidFile("chunk extends past file end".into()));
        }
        let chunk_data = &data[offset..offset + chunk_length];
        offset += chunk_length;
        match chunk_type {
            GLB_CHUNK_JSON => json_chunk = Some(chunk_data),
            t if t == bin_chunk_type() => bin_chunk = Some(chunk_data),
            _ => {}
        }
    }

    let json_data = json_chunk.ok_or_else(|| OptimizeError::InvalidFile("no JSON chunk".into()))?;
    let root: GltfRoot = serde_json::from_slice(json_data)
        .map_err(|e| OptimizeError::InvalidFile(format!("bad JSON chunk: {e}")))?;

    build_document(root, bin_chunk)
}

/// `b"BIN\0"` read as a little-endian u32; split out so the magic constant
/// above stays a readable hex literal.
fn bin_chunk_type() -> u32 {
    u32::from_le_bytes(*b"BIN\0")
}

fn build_document(root: GltfRoot, bin_chunk: Option<&[u8]>) -> Result<Document> {
    let mut doc = Document::new();

    // Buffers: buffer 0 with no uri binds to the GLB BIN chunk.
    let mut raw_buffers: Vec<Vec<u8>> = Vec::with_capacity(root.buffers.len());
    for (i, buf) in root.buffers.iter().enumerate() {
        if i == 0 && buf.uri.is_none() {
            let bin = bin_chunk
                .ok_or_else(|| OptimizeError::InvalidFile("buffer 0 has no BIN chunk".into()))?;
            raw_buffers.push(bin.to_vec());
        } else if let Some(uri) = &buf.uri {
            raw_buffers.push(decode_data_uri(uri)?);
        } else {
            return Err(OptimizeError::InvalidFile(
                "external buffer URIs are not supported".into(),
            ));
        }
    }
    for raw in &raw_buffers {
        doc.add_buffer(Buffer::new(raw.clone()));
    }

    // Accessors (non-Draco primitives reference these directly).
    let mut accessor_ids = Vec::with_capacity(root.accessors.len());
    for acc in &root.accessors {
        let id = doc.add_accessor(decode_accessor(acc, &root.buffer_views, &raw_buffers)?);
        accessor_ids.push(id);
    }

    // Textures / images.
    let mut texture_ids = Vec::with_capacity(root.textures.len());
    for tex in &root.textures {
        let source = tex
            .extensions
            .as_ref()
            .and_then(|e| e.khr_texture_basisu.as_ref())
            .map(|b| b.source)
            .or(tex.source)
            .ok_or_else(|| OptimizeError::InvalidFile("texture has no image source".into()))?;
        let image = root
            .images
            .get(source)
            .ok_or_else(|| OptimizeError::InvalidFile(format!("invalid image index {source}")))?;
        let mime = image
            .mime_type
            .as_deref()
            .and_then(crate::document::MimeType::from_str)
            .unwrap_or(crate::document::MimeType::Png);
        let data = if let Some(bv) = image.buffer_view {
            let view = root
                .buffer_views
                .get(bv)
                .ok_or_else(|| OptimizeError::InvalidFile(format!("invalid buffer view {bv}")))?;
            slice_buffer_view(view, &raw_buffers)?.to_vec()
        } else if let Some(uri) = &image.uri {
            decode_data_uri(uri)?
        } else {
            return Err(OptimizeError::InvalidFile("image has no data".into()));
        };
        let id = doc.add_texture(Texture {
            name: image.name.clone(),
            mime_type: mime,
            data,
        });
        texture_ids.push(id);
    }

    // Materials.
    let mut material_ids = Vec::with_capacity(root.materials.len());
    for mat in &root.materials {
        let pbr = mat.pbr_metallic_roughness.clone().unwrap_or_default();
        let mut m = Material {
            name: mat.name.clone(),
            ..Default::default()
        };
        if let Some(bcf) = pbr.base_color_factor {
            m.base_color_factor = bcf;
        }
        if let Some(mf) = pbr.metallic_factor {
            m.metallic_factor = mf;
        }
        if let Some(rf) = pbr.roughness_factor {
            m.roughness_factor = rf;
        }
        if let Some(ef) = mat.emissive_factor {
            m.emissive_factor = ef;
        }
        m.base_color_texture = pbr.base_color_texture.as_ref().map(|r| texture_ids[r.index]);
        m.metallic_roughness_texture = pbr
            .metallic_roughness_texture
            .as_ref()
            .map(|r| texture_ids[r.index]);
        m.normal_texture = mat.normal_texture.as_ref().map(|r| texture_ids[r.index]);
        m.occlusion_texture = mat.occlusion_texture.as_ref().map(|r| texture_ids[r.index]);
        m.emissive_texture = mat.emissive_texture.as_ref().map(|r| texture_ids[r.index]);
        material_ids.push(doc.add_material(m));
    }

    // Meshes + primitives (decoding Draco-compressed primitives eagerly so
    // every later step operates on plain accessors).
    let mut mesh_ids = Vec::with_capacity(root.meshes.len());
    for gm in &root.meshes {
        let mut mesh = Mesh {
            name: gm.name.clone(),
            primitives: Vec::with_capacity(gm.primitives.len()),
        };
        for gp in &gm.primitives {
            let draco_ext = gp
                .extensions
                .as_ref()
                .and_then(|e| e.khr_draco_mesh_compression.as_ref());
            let prim = if let Some(draco) = draco_ext {
                let mut prim = decode_draco_primitive(draco, gp, &root.buffer_views, &raw_buffers, &mut doc)?;
                prim.material = gp.material.map(|i| material_ids[i]);
                prim
            } else {
                let mut attributes = std::collections::BTreeMap::new();
                for (name, idx) in &gp.attributes {
                    if let Some(sem) = Semantic::from_gl_name(name) {
                        attributes.insert(sem, accessor_ids[*idx]);
                    }
                }
                Primitive {
                    attributes,
                    indices: gp.indices.map(|i| accessor_ids[i]),
                    material: gp.material.map(|i| material_ids[i]),
                    mode: gp.mode.map(Topology::from_gl_enum),
                    draco: None,
                }
            };
            mesh.primitives.push(prim);
        }
        mesh_ids.push(doc.add_mesh(mesh));
    }

    // Skins.
    let mut skin_ids = Vec::with_capacity(root.skins.len());
    for sk in &root.skins {
        skin_ids.push(doc.add_skin(Skin {
            name: sk.name.clone(),
            inverse_bind_matrices: sk.inverse_bind_matrices.map(|i| accessor_ids[i]),
            joints: Vec::new(), // patched below, once node ids exist
            skeleton: None,
        }));
    }

    // Nodes (two passes: create, then wire up children/mesh/skin since
    // children may reference forward indices).
    let mut node_ids = Vec::with_capacity(root.nodes.len());
    for jn in &root.nodes {
        let transform = if let Some(m) = jn.matrix {
            decompose_matrix(&m)
        } else {
            Transform {
                translation: jn.translation.unwrap_or([0.0, 0.0, 0.0]),
                rotation: jn.rotation.unwrap_or([0.0, 0.0, 0.0, 1.0]),
                scale: jn.scale.unwrap_or([1.0, 1.0, 1.0]),
            }
        };
        node_ids.push(doc.add_node(Node {
            name: jn.name.clone(),
            transform,
            children: Vec::new(),
            mesh: None,
            skin: None,
            camera: jn.camera.map(|idx| crate::document::node::OpaqueAttachment {
                kind: "camera",
                json: root
                    .cameras
                    .get(idx)
                    .cloned()
                    .unwrap_or(serde_json::Value::Null),
            }),
            light: jn
                .extensions
                .as_ref()
                .and_then(|ext| ext.get("KHR_lights_punctual"))
                .and_then(|kl| kl.get("light"))
                .and_then(|i| i.as_u64())
                .map(|idx| crate::document::node::OpaqueAttachment {
                    kind: "light",
                    json: root
                        .extensions
                        .as_ref()
                        .and_then(|ext| ext.get("KHR_lights_punctual"))
                        .and_then(|kl| kl.get("lights"))
                        .and_then(|lights| lights.get(idx as usize))
                        .cloned()
                        .unwrap_or(serde_json::Value::Null),
                }),
        }));
    }
    for (jn, &id) in root.nodes.iter().zip(node_ids.iter()) {
        let node = doc.node_mut(id).expect("just inserted");
        node.children = jn.children.iter().map(|&c| node_ids[c]).collect();
        node.mesh = jn.mesh.map(|m| mesh_ids[m]);
        node.skin = jn.skin.map(|s| skin_ids[s]);
    }
    for (sk, &id) in root.skins.iter().zip(skin_ids.iter()) {
        let skin = doc.skin_mut(id).expect("just inserted");
        skin.joints = sk.joints.iter().map(|&j| node_ids[j]).collect();
        skin.skeleton = sk.skeleton.map(|s| node_ids[s]);
    }
    if root.nodes.iter().any(|jn| {
        jn.extensions
            .as_ref()
            .is_some_and(|ext| ext.get("KHR_lights_punctual").is_some())
    }) {
        doc.mark_extension("KHR_lights_punctual", false);
    }

    for js in &root.scenes {
        doc.scenes.push(Scene {
            name: js.name.clone(),
            root_nodes: js.nodes.iter().map(|&n| node_ids[n]).collect(),
        });
    }
    doc.default_scene = root.scene.map(crate::document::SceneId);

    doc.extensions_used = root.extensions_used.into_iter().collect();
    doc.extensions_required = root.extensions_required.into_iter().collect();

    Ok(doc)
}

fn decode_draco_primitive(
    draco: &crate::io::gltf_json::JsonDracoExtension,
    gp: &crate::io::gltf_json::JsonPrimitive,
    buffer_views: &[JsonBufferView],
    raw_buffers: &[Vec<u8>],
    doc: &mut Document,
) -> Result<Primitive> {
    let view = buffer_views
        .get(draco.buffer_view)
        .ok_or_else(|| OptimizeError::InvalidFile("invalid draco buffer view".into()))?;
    let bytes = slice_buffer_view(view, raw_buffers)?;

    let (decoded, indices) = crate::draco_handle::decode_primitive(bytes, &draco.attributes)?;

    let mut attributes = std::collections::BTreeMap::new();
    for (sem, accessor) in decoded {
        attributes.insert(sem, doc.add_accessor(accessor));
    }
    let indices_id = doc.add_accessor(Accessor::from_u32_indices(indices));

    Ok(Primitive {
        attributes,
        indices: Some(indices_id),
        material: None, // patched by caller once material ids are resolved
        mode: gp.mode.map(Topology::from_gl_enum),
        draco: None,
    })
}

fn decode_accessor(
    acc: &JsonAccessor,
    buffer_views: &[JsonBufferView],
    raw_buffers: &[Vec<u8>],
) -> Result<Accessor> {
    let accessor_type = AccessorType::from_gl_str(&acc.accessor_type)
        .ok_or_else(|| OptimizeError::InvalidFile(format!("unknown accessor type {}", acc.accessor_type)))?;
    let component_type = ComponentType::from_gl_enum(acc.component_type)
        .ok_or_else(|| OptimizeError::InvalidFile(format!("unknown component type {}", acc.component_type)))?;
    let components = accessor_type.components();
    let count = acc.count;

    let data = if let Some(bv_idx) = acc.buffer_view {
        let view = buffer_views
            .get(bv_idx)
            .ok_or_else(|| OptimizeError::InvalidFile(format!("invalid buffer view {bv_idx}")))?;
        let view_bytes = slice_buffer_view(view, raw_buffers)?;
        let byte_offset = acc.byte_offset.unwrap_or(0);
        let elem_size = component_type.byte_length() * components;
        let stride = view.byte_stride.unwrap_or(elem_size);
        decode_typed(view_bytes, byte_offset, stride, elem_size, count, components, component_type)?
    } else {
        zero_filled(component_type, count * components)
    };

    Ok(Accessor {
        accessor_type,
        normalized: acc.normalized,
        min: acc.min.clone(),
        max: acc.max.clone(),
        data,
    })
}

fn zero_filled(ct: ComponentType, len: usize) -> AccessorData {
    match ct {
        ComponentType::F32 => AccessorData::F32(vec![0.0; len]),
        ComponentType::U32 => AccessorData::U32(vec![0; len]),
        ComponentType::U16 => AccessorData::U16(vec![0; len]),
        ComponentType::U8 => AccessorData::U8(vec![0; len]),
        ComponentType::I16 => AccessorData::I16(vec![0; len]),
        ComponentType::I8 => AccessorData::I8(vec![0; len]),
    }
}

#[allow(clippy::too_many_arguments)]
fn decode_typed(
    bytes: &[u8],
    byte_offset: usize,
    stride: usize,
    elem_size: usize,
    count: usize,
    components: usize,
    component_type: ComponentType,
) -> Result<AccessorData> {
    macro_rules! read_loop {
        ($read:expr, $ty:ty) => {{
            let mut out = Vec::with_capacity(count * components);
            for i in 0..count {
                let base = byte_offset + i * stride;
                let mut cursor = &bytes[base..base + elem_size];
                for _ in 0..components {
                    out.push($read(&mut cursor)?);
                }
            }
            out
        }};
    }
    let data = match component_type {
        ComponentType::F32 => AccessorData::F32(read_loop!(
            |c: &mut &[u8]| c.read_f32::<LittleEndian>(),
            f32
        )),
        ComponentType::U32 => AccessorData::U32(read_loop!(
            |c: &mut &[u8]| c.read_u32::<LittleEndian>(),
            u32
        )),
        ComponentType::U16 => AccessorData::U16(read_loop!(
            |c: &mut &[u8]| c.read_u16::<LittleEndian>(),
            u16
        )),
        ComponentType::U8 => AccessorData::U8(read_loop!(|c: &mut &[u8]| c.read_u8(), u8)),
        ComponentType::I16 => AccessorData::I16(read_loop!(
            |c: &mut &[u8]| c.read_i16::<LittleEndian>(),
            i16
        )),
        ComponentType::I8 => AccessorData::I8(read_loop!(|c: &mut &[u8]| c.read_i8(), i8)),
    };
    Ok(data)
}

fn slice_buffer_view<'a>(view: &JsonBufferView, raw_buffers: &'a [Vec<u8>]) -> Result<&'a [u8]> {
    let buf = raw_buffers
        .get(view.buffer)
        .ok_or_else(|| OptimizeError::InvalidFile(format!("invalid buffer {}", view.buffer)))?;
    let offset = view.byte_offset.unwrap_or(0);
    let end = offset + view.byte_length;
    if end > buf.len() {
        return Err(OptimizeError::InvalidFile("buffer view extends past buffer end".into()));
    }
    Ok(&buf[offset..end])
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    use base64::{engine::general_purpose, Engine as _};

    let comma = uri
        .find(',')
        .ok_or_else(|| OptimizeError::InvalidFile("malformed data URI".into()))?;
    let (header, payload) = uri.split_at(comma);
    let payload = &payload[1..];
    if header.contains(";base64") {
        general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| OptimizeError::InvalidFile(format!("bad base64 data URI: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

fn decompose_matrix(m: &[f32; 16]) -> Transform {
    let mat = glam::Mat4::from_cols_array(m);
    let (scale, rotation, translation) = mat.to_scale_rotation_translation();
    Transform {
        translation: translation.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    }
}

