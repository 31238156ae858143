//! Process-wide Draco encoder/decoder handle (spec §5, §9, §10.6).
//!
//! `draco_core`'s `MeshEncoder`/`MeshDecoder` are cheap, stateless value
//! types constructed fresh per call, so there is no native handle to pool —
//! but the spec models first use as the pipeline's one observable global
//! side effect, so we keep a `OnceLock` init guard here rather than
//! scattering ad-hoc "first call?" checks across the I/O writer and reader.
//! The guard itself carries no mutable state, so it is `Send + Sync` by
//! construction and needs no mutex at the boundary.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use draco_core::decoder_buffer::DecoderBuffer;
use draco_core::draco_types::DataType;
use draco_core::encoder_buffer::EncoderBuffer;
use draco_core::encoder_options::EncoderOptions;
use draco_core::geometry_attribute::{GeometryAttributeType, PointAttribute};
use draco_core::geometry_indices::{FaceIndex, PointIndex};
use draco_core::mesh::{Face, Mesh as DracoMesh};
use draco_core::mesh_decoder::MeshDecoder;
use draco_core::mesh_encoder::MeshEncoder;

use crate::document::{Accessor, AccessorType, Primitive, Semantic};
use crate::error::{OptimizeError, Result};

static INIT: OnceLock<()> = OnceLock::new();

fn ensure_initialized() {
    INIT.get_or_init(|| {
        tracing::debug!("draco encoder/decoder handle initialized");
    });
}

fn semantic_to_attribute_type(sem: Semantic) -> GeometryAttributeType {
    match sem {
        Semantic::Position => GeometryAttributeType::Position,
        Semantic::Normal => GeometryAttributeType::Normal,
        Semantic::Tangent => GeometryAttributeType::Generic,
        Semantic::TexCoord(_) => GeometryAttributeType::TexCoord,
        Semantic::Color(_) => GeometryAttributeType::Color,
        Semantic::Joints(_) | Semantic::Weights(_) => GeometryAttributeType::Generic,
    }
}

/// Build a `draco_core` mesh from this primitive's plain f32 accessors and
/// edgebreaker-encode it, returning the compressed bytes and the semantic
/// -> Draco-attribute-id mapping the `KHR_draco_mesh_compression` extension
/// needs (grounded in `draco_io::gltf_writer::encode_draco_mesh_internal`).
pub fn encode_primitive(
    doc: &crate::document::Document,
    prim: &Primitive,
    compression: &crate::document::DracoCompression,
) -> Result<(Vec<u8>, BTreeMap<Semantic, usize>)> {
    ensure_initialized();

    let position_id = prim
        .position()
        .ok_or_else(|| OptimizeError::optimization_failed("draco", "primitive has no POSITION"))?;
    let position = doc
        .accessor(position_id)
        .ok_or_else(|| OptimizeError::Internal("dangling POSITION accessor".into()))?;
    let num_points = position.count();

    let indices = prim
        .indices
        .and_then(|id| doc.accessor(id))
        .map(|a| a.as_u32_indices())
        .unwrap_or_else(|| (0..num_points as u32).collect());

    let mut mesh = DracoMesh::new();
    mesh.set_num_faces(indices.len() / 3);
    for (face_idx, tri) in indices.chunks_exact(3).enumerate() {
        let face: Face = [
            PointIndex(tri[0]),
            PointIndex(tri[1]),
            PointIndex(tri[2]),
        ];
        mesh.set_face(FaceIndex(face_idx as u32), face);
    }
    mesh.set_num_points(num_points);

    let mut attribute_ids = BTreeMap::new();
    for (&sem, &acc_id) in &prim.attributes {
        let accessor = doc
            .accessor(acc_id)
            .ok_or_else(|| OptimizeError::Internal("dangling attribute accessor".into()))?;
        let components = accessor.num_components();
        let mut point_attr = PointAttribute::new();
        point_attr.init(
            semantic_to_attribute_type(sem),
            components as u8,
            DataType::Float32,
            false,
            accessor.count(),
        );
        let buffer = point_attr.buffer_mut();
        for i in 0..accessor.count() {
            let mut bytes = Vec::with_capacity(components * 4);
            for c in 0..components {
                bytes.extend_from_slice(&accessor.get_f32(i, c).to_le_bytes());
            }
            buffer.write(i * components * 4, &bytes);
        }
        let id = mesh.add_attribute(point_attr);
        attribute_ids.insert(sem, id as usize);
    }

    let mut options = EncoderOptions::new();
    options.set_global_int("encoding_method", 1); // edgebreaker
    let speed = 10i32.saturating_sub(compression.compression_level as i32);
    options.set_global_int("encoding_speed", speed);
    options.set_global_int("decoding_speed", speed);
    for (&sem, &id) in &attribute_ids {
        let bits = match sem {
            Semantic::Position => compression.quantize_position,
            Semantic::Normal | Semantic::Tangent => compression.quantize_normal,
            Semantic::TexCoord(_) => compression.quantize_texcoord,
            Semantic::Color(_) => compression.quantize_color,
            Semantic::Joints(_) | Semantic::Weights(_) => compression.quantize_generic,
        };
        options.set_attribute_int(id as i32, "quantization_bits", bits.clamp(1, 30) as i32);
    }

    let mut encoder = MeshEncoder::new();
    encoder.set_mesh(mesh);
    let mut out_buffer = EncoderBuffer::new();
    encoder
        .encode(&options, &mut out_buffer)
        .map_err(|e| OptimizeError::optimization_failed("draco", format!("{e:?}")))?;

    Ok((out_buffer.data().to_vec(), attribute_ids))
}

/// Decode Draco-compressed bytes into plain f32 accessors keyed by glTF
/// semantic, using the `semantic -> draco attribute id` map recorded in the
/// `KHR_draco_mesh_compression` extension, plus the flattened triangle
/// index list.
pub fn decode_primitive(
    bytes: &[u8],
    semantic_ids: &std::collections::HashMap<String, usize>,
) -> Result<(BTreeMap<Semantic, Accessor>, Vec<u32>)> {
    ensure_initialized();

    let mut decoder_buffer = DecoderBuffer::new();
    // Safety: `bytes` is kept alive for the duration of this call and the
    // buffer is not retained past it.
    unsafe { decoder_buffer.init(bytes.as_ptr(), bytes.len()) };

    let mut draco_mesh = DracoMesh::new();
    let mut decoder = MeshDecoder::new();
    decoder
        .decode(&mut decoder_buffer, &mut draco_mesh)
        .map_err(|e| OptimizeError::optimization_failed("draco", format!("decode failed: {e:?}")))?;

    let mut attributes = BTreeMap::new();
    for (name, &att_id) in semantic_ids {
        let Some(sem) = Semantic::from_gl_name(name) else {
            continue;
        };
        let att = draco_mesh.attribute(att_id as i32);
        let components = att.num_components() as usize;
        let num_points = draco_mesh.num_points();
        let mut values = Vec::with_capacity(num_points * components);
        for p in 0..num_points {
            let value_idx = att.mapped_index(PointIndex(p as u32));
            let byte_base = value_idx.0 as usize * components * 4;
            let mut raw = vec![0u8; components * 4];
            att.buffer().read(byte_base, &mut raw);
            for c in 0..components {
                let bytes4: [u8; 4] = raw[c * 4..c * 4 + 4].try_into().unwrap();
                values.push(f32::from_le_bytes(bytes4));
            }
        }
        let accessor_type = match components {
            1 => AccessorType::Scalar,
            2 => AccessorType::Vec2,
            3 => AccessorType::Vec3,
            4 => AccessorType::Vec4,
            _ => AccessorType::Scalar,
        };
        attributes.insert(sem, Accessor::from_f32(accessor_type, values));
    }

    let mut indices = Vec::with_capacity(draco_mesh.num_faces() * 3);
    for f in 0..draco_mesh.num_faces() {
        let face = draco_mesh.face(FaceIndex(f as u32));
        indices.push(face[0].0);
        indices.push(face[1].0);
        indices.push(face[2].0);
    }

    Ok((attributes, indices))
}
