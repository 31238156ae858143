//! Serializing a [`Document`] back out to a GLB container (spec §4.9, §6).
//!
//! Grounded in `draco_io::gltf_writer::GltfWriter::to_glb` for the chunk
//! layout (header, 4-byte-aligned JSON chunk, 4-byte-aligned BIN chunk).
//! Unlike the teacher writer, which only ever emits meshes it built itself,
//! this one serializes an arbitrary [`Document`] that may have passed
//! through pruning — entity arenas can have holes, so every cross-reference
//! is rewritten through a compacting id remap before it reaches the JSON.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::document::{
    Accessor, AccessorData, AccessorId, Document, MaterialId, MeshId, NodeId, Primitive,
    SkinId, TextureId,
};
use crate::error::{OptimizeError, Result};
use crate::io::gltf_json::{
    Asset, GltfRoot, JsonAccessor, JsonBasisuExtension, JsonBuffer, JsonBufferView,
    JsonDracoExtension, JsonImage, JsonMaterial, JsonMesh, JsonNode, JsonPbrMetallicRoughness,
    JsonPrimitive, JsonPrimitiveExtensions, JsonScene, JsonSkin, JsonTexture,
    JsonTextureExtensions, JsonTextureRef,
};

const GLB_MAGIC: u32 = 0x4654_6C67;
const GLB_VERSION: u32 = 2;
const GLB_CHUNK_JSON: u32 = 0x4E4F_534A;

pub fn write(doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    let bytes = write_bytes(doc)?;
    std::fs::write(path, bytes).map_err(|e| OptimizeError::WriteFailed(e.to_string()))
}

pub fn write_bytes(doc: &Document) -> Result<Vec<u8>> {
    let remap = IdRemap::build(doc);
    let mut bin = Vec::new();
    let mut buffer_views = Vec::new();
    let mut extensions_used: BTreeSet<String> = doc.extensions_used.clone();
    let mut extensions_required: BTreeSet<String> = doc.extensions_required.clone();

    let draco_backed = draco_backed_accessors(doc);

    let mut accessors_out = Vec::new();
    for id in doc.accessor_ids() {
        let acc = doc.accessor(id).expect("live id from accessor_ids");
        let json_acc = if draco_backed.contains(&id) {
            let (min, max) = min_max(acc);
            JsonAccessor {
                buffer_view: None,
                byte_offset: None,
                component_type: acc.component_type().gl_enum(),
                normalized: acc.normalized,
                count: acc.count(),
                accessor_type: acc.accessor_type.gl_str().to_string(),
                min,
                max,
            }
        } else {
            let view_idx = push_accessor_data(&mut bin, &mut buffer_views, acc);
            let (min, max) = min_max(acc);
            JsonAccessor {
                buffer_view: Some(view_idx),
                byte_offset: Some(0),
                component_type: acc.component_type().gl_enum(),
                normalized: acc.normalized,
                count: acc.count(),
                accessor_type: acc.accessor_type.gl_str().to_string(),
                min,
                max,
            }
        };
        accessors_out.push(json_acc);
    }

    let mut images_out = Vec::new();
    let mut textures_out = Vec::new();
    for id in doc.texture_ids() {
        let tex = doc.texture(id).expect("live id from texture_ids");
        let view_idx = push_raw_bytes(&mut bin, &mut buffer_views, &tex.data);
        let image_idx = images_out.len();
        images_out.push(JsonImage {
            name: tex.name.clone(),
            uri: None,
            mime_type: Some(tex.mime_type.as_str().to_string()),
            buffer_view: Some(view_idx),
        });
        let is_basisu = matches!(tex.mime_type, crate::document::MimeType::Ktx2);
        let extensions = if is_basisu {
            extensions_used.insert("KHR_texture_basisu".to_string());
            extensions_required.insert("KHR_texture_basisu".to_string());
            Some(JsonTextureExtensions {
                khr_texture_basisu: Some(JsonBasisuExtension { source: image_idx }),
            })
        } else {
            None
        };
        textures_out.push(JsonTexture {
            source: if is_basisu { None } else { Some(image_idx) },
            sampler: None,
            extensions,
        });
    }

    let mut materials_out = Vec::new();
    for id in doc.material_ids() {
        let mat = doc.material(id).expect("live id from material_ids");
        materials_out.push(JsonMaterial {
            name: mat.name.clone(),
            pbr_metallic_roughness: Some(JsonPbrMetallicRoughness {
                base_color_factor: Some(mat.base_color_factor),
                metallic_factor: Some(mat.metallic_factor),
                roughness_factor: Some(mat.roughness_factor),
                base_color_texture: mat.base_color_texture.map(|t| texture_ref(&remap, t)),
                metallic_roughness_texture: mat
                    .metallic_roughness_texture
                    .map(|t| texture_ref(&remap, t)),
            }),
            normal_texture: mat.normal_texture.map(|t| texture_ref(&remap, t)),
            occlusion_texture: mat.occlusion_texture.map(|t| texture_ref(&remap, t)),
            emissive_texture: mat.emissive_texture.map(|t| texture_ref(&remap, t)),
            emissive_factor: Some(mat.emissive_factor),
        });
    }

    let mut meshes_out = Vec::new();
    for id in doc.mesh_ids() {
        let mesh = doc.mesh(id).expect("live id from mesh_ids");
        let mut primitives_out = Vec::with_capacity(mesh.primitives.len());
        for prim in &mesh.primitives {
            primitives_out.push(write_primitive(
                doc,
                prim,
                &remap,
                &mut bin,
                &mut buffer_views,
                &mut extensions_used,
                &mut extensions_required,
            )?);
        }
        meshes_out.push(JsonMesh {
            name: mesh.name.clone(),
            primitives: primitives_out,
        });
    }

    let mut nodes_out = Vec::new();
    let mut cameras_out: Vec<serde_json::Value> = Vec::new();
    let mut lights_out: Vec<serde_json::Value> = Vec::new();
    for id in doc.node_ids() {
        let node = doc.node(id).expect("live id from node_ids");

        let camera = node.camera.as_ref().map(|att| {
            cameras_out.push(att.json.clone());
            cameras_out.len() - 1
        });

        let extensions = node.light.as_ref().map(|att| {
            extensions_used.insert("KHR_lights_punctual".to_string());
            lights_out.push(att.json.clone());
            serde_json::json!({ "KHR_lights_punctual": { "light": lights_out.len() - 1 } })
        });

        nodes_out.push(JsonNode {
            name: node.name.clone(),
            children: node.children.iter().map(|&c| remap.node[&c]).collect(),
            mesh: node.mesh.map(|m| remap.mesh[&m]),
            skin: node.skin.map(|s| remap.skin[&s]),
            camera,
            translation: Some(node.transform.translation),
            rotation: Some(node.transform.rotation),
            scale: Some(node.transform.scale),
            matrix: None,
            extensions,
        });
    }

    let mut skins_out = Vec::new();
    for id in doc.skin_ids() {
        let skin = doc.skin(id).expect("live id from skin_ids");
        skins_out.push(JsonSkin {
            name: skin.name.clone(),
            inverse_bind_matrices: skin.inverse_bind_matrices.map(|a| remap.accessor[&a]),
            skeleton: skin.skeleton.map(|n| remap.node[&n]),
            joints: skin.joints.iter().map(|&n| remap.node[&n]).collect(),
        });
    }

    let scenes_out: Vec<JsonScene> = doc
        .scenes
        .iter()
        .map(|s| JsonScene {
            name: s.name.clone(),
            nodes: s.root_nodes.iter().map(|&n| remap.node[&n]).collect(),
        })
        .collect();

    let extensions = if lights_out.is_empty() {
        None
    } else {
        Some(serde_json::json!({ "KHR_lights_punctual": { "lights": lights_out } }))
    };

    let root = GltfRoot {
        asset: Asset {
            version: "2.0".to_string(),
            generator: Some("optimize-core".to_string()),
        },
        scene: doc.default_scene.map(|s| s.0),
        scenes: scenes_out,
        nodes: nodes_out,
        meshes: meshes_out,
        materials: materials_out,
        textures: textures_out,
        images: images_out,
        skins: skins_out,
        cameras: cameras_out,
        accessors: accessors_out,
        buffer_views,
        buffers: vec![JsonBuffer {
            byte_length: bin.len(),
            uri: None,
        }],
        extensions_used: extensions_used.into_iter().collect(),
        extensions_required: extensions_required.into_iter().collect(),
        extensions,
    };

    let json =
        serde_json::to_vec(&root).map_err(|e| OptimizeError::WriteFailed(format!("JSON encode failed: {e}")))?;
    Ok(pack_glb(&json, &bin))
}

fn texture_ref(remap: &IdRemap, id: TextureId) -> JsonTextureRef {
    JsonTextureRef {
        index: remap.texture[&id],
        tex_coord: Some(0),
    }
}

#[allow(clippy::too_many_arguments)]
fn write_primitive(
    doc: &Document,
    prim: &Primitive,
    remap: &IdRemap,
    bin: &mut Vec<u8>,
    buffer_views: &mut Vec<JsonBufferView>,
    extensions_used: &mut BTreeSet<String>,
    extensions_required: &mut BTreeSet<String>,
) -> Result<JsonPrimitive> {
    let mut attributes = HashMap::new();
    for (&sem, &acc_id) in &prim.attributes {
        attributes.insert(sem.gl_name(), remap.accessor[&acc_id]);
    }

    let extensions = if let Some(compression) = &prim.draco {
        let (bytes, attribute_ids) = crate::draco_handle::encode_primitive(doc, prim, compression)?;
        let view_idx = push_raw_bytes(bin, buffer_views, &bytes);
        extensions_used.insert("KHR_draco_mesh_compression".to_string());
        extensions_required.insert("KHR_draco_mesh_compression".to_string());
        Some(JsonPrimitiveExtensions {
            khr_draco_mesh_compression: Some(JsonDracoExtension {
                buffer_view: view_idx,
                attributes: attribute_ids
                    .into_iter()
                    .map(|(sem, id)| (sem.gl_name(), id))
                    .collect(),
            }),
        })
    } else {
        None
    };

    Ok(JsonPrimitive {
        attributes,
        indices: prim.indices.map(|a| remap.accessor[&a]),
        material: prim.material.map(|m| remap.material[&m]),
        mode: prim.mode.map(|m| m.gl_enum()),
        extensions,
    })
}

/// Accessors that belong exclusively to Draco-compressed primitives don't
/// get a regular buffer view — their values live only in the compressed
/// Draco payload (spec §4.7).
fn draco_backed_accessors(doc: &Document) -> BTreeSet<AccessorId> {
    let mut set = BTreeSet::new();
    for (_, prim) in doc.all_primitives() {
        if prim.draco.is_some() {
            set.extend(prim.attributes.values().copied());
            if let Some(idx) = prim.indices {
                set.insert(idx);
            }
        }
    }
    set
}

fn min_max(acc: &Accessor) -> (Option<Vec<f64>>, Option<Vec<f64>>) {
    if acc.min.is_some() || acc.max.is_some() {
        return (acc.min.clone(), acc.max.clone());
    }
    let mut clone = acc.clone();
    clone.recompute_min_max();
    (clone.min, clone.max)
}

fn push_accessor_data(bin: &mut Vec<u8>, views: &mut Vec<JsonBufferView>, acc: &Accessor) -> usize {
    align4(bin);
    let start = bin.len();
    match &acc.data {
        AccessorData::F32(v) => {
            for x in v {
                bin.write_f32::<LittleEndian>(*x).unwrap();
            }
        }
        AccessorData::U32(v) => {
            for x in v {
                bin.write_u32::<LittleEndian>(*x).unwrap();
            }
        }
        AccessorData::U16(v) => {
            for x in v {
                bin.write_u16::<LittleEndian>(*x).unwrap();
            }
        }
        AccessorData::U8(v) => bin.extend_from_slice(v),
        AccessorData::I16(v) => {
            for x in v {
                bin.write_i16::<LittleEndian>(*x).unwrap();
            }
        }
        AccessorData::I8(v) => {
            for x in v {
                bin.write_i8(*x).unwrap();
            }
        }
    }
    let byte_length = bin.len() - start;
    views.push(JsonBufferView {
        buffer: 0,
        byte_offset: Some(start),
        byte_length,
        byte_stride: None,
        target: None,
    });
    views.len() - 1
}

fn push_raw_bytes(bin: &mut Vec<u8>, views: &mut Vec<JsonBufferView>, data: &[u8]) -> usize {
    align4(bin);
    let start = bin.len();
    bin.extend_from_slice(data);
    views.push(JsonBufferView {
        buffer: 0,
        byte_offset: Some(start),
        byte_length: data.len(),
        byte_stride: None,
        target: None,
    });
    views.len() - 1
}

fn align4(bin: &mut Vec<u8>) {
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
}

fn pack_glb(json: &[u8], bin: &[u8]) -> Vec<u8> {
    let json_padding = (4 - (json.len() % 4)) % 4;
    let padded_json_len = json.len() + json_padding;
    let bin_padding = (4 - (bin.len() % 4)) % 4;
    let padded_bin_len = bin.len() + bin_padding;

    let total_len = 12 + 8 + padded_json_len + 8 + padded_bin_len;
    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total_len as u32).to_le_bytes());

    out.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    out.extend_from_slice(&GLB_CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(json);
    out.resize(out.len() + json_padding, b' ');

    out.extend_from_slice(&(padded_bin_len as u32).to_le_bytes());
    out.extend_from_slice(&u32::from_le_bytes(*b"BIN\0").to_le_bytes());
    out.extend_from_slice(bin);
    out.resize(out.len() + bin_padding, 0);

    out
}

/// Maps live arena ids to the compacted indices they get in the output
/// JSON arrays, since pruning can leave holes in the arenas (spec §9).
struct IdRemap {
    accessor: HashMap<AccessorId, usize>,
    material: HashMap<MaterialId, usize>,
    texture: HashMap<TextureId, usize>,
    mesh: HashMap<MeshId, usize>,
    node: HashMap<NodeId, usize>,
    skin: HashMap<SkinId, usize>,
}

impl IdRemap {
    fn build(doc: &Document) -> Self {
        fn index_of<I: Eq + std::hash::Hash>(ids: impl Iterator<Item = I>) -> HashMap<I, usize> {
            ids.enumerate().map(|(i, id)| (id, i)).collect()
        }
        Self {
            accessor: index_of(doc.accessor_ids()),
            material: index_of(doc.material_ids()),
            texture: index_of(doc.texture_ids()),
            mesh: index_of(doc.mesh_ids()),
            node: index_of(doc.node_ids()),
            skin: index_of(doc.skin_ids()),
        }
    }
}
