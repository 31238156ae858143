//! Vertex quantizer (spec §4.6): rewrites selected attribute classes to a
//! lower-precision component type. Position quantization needs an inverse
//! transform to keep rendered geometry equivalent (spec: "a per-primitive
//! inverse transform is applied as a node-local scale/offset"); the other
//! attribute classes are already bounded ([-1,1] directions, [0,1]
//! tex-coords/colors) so a normalized integer with no transform round-trips
//! them directly.

use glam::{Mat4, Vec3};
use serde::Serialize;

use crate::document::{Accessor, AccessorData, AccessorType, ComponentType, Document, MeshId, Semantic};
use crate::error::Result;
use crate::options::QuantizeOptions;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantizeStats {
    pub attributes_quantized: Vec<String>,
    pub original_size: usize,
    pub quantized_size: usize,
    pub reduction_ratio: f64,
}

pub fn run(doc: &mut Document, opts: &QuantizeOptions) -> Result<QuantizeStats> {
    let mut stats = QuantizeStats::default();

    if opts.quantize_position {
        if quantize_position(doc, &mut stats) {
            stats.attributes_quantized.push("POSITION".to_string());
        }
    }
    if opts.quantize_normal {
        if quantize_unit_vector(doc, Semantic::Normal, &mut stats) {
            stats.attributes_quantized.push("NORMAL".to_string());
        }
        // Tangents are quantized jointly with normals (spec §4.6).
        if quantize_unit_vector(doc, Semantic::Tangent, &mut stats) {
            stats.attributes_quantized.push("TANGENT".to_string());
        }
    }
    if opts.quantize_texcoord {
        if quantize_zero_one(doc, |s| matches!(s, Semantic::TexCoord(_)), ComponentType::U16, &mut stats) {
            stats.attributes_quantized.push("TEXCOORD".to_string());
        }
    }
    if opts.quantize_color {
        if quantize_zero_one(doc, |s| matches!(s, Semantic::Color(_)), ComponentType::U8, &mut stats) {
            stats.attributes_quantized.push("COLOR".to_string());
        }
    }

    stats.reduction_ratio = if stats.original_size == 0 {
        1.0
    } else {
        stats.quantized_size as f64 / stats.original_size as f64
    };

    Ok(stats)
}

/// Quantizes POSITION to i16 normalized against a shared per-mesh bounding
/// box (a single box across all of the mesh's primitives, since a mesh's
/// referencing nodes get one dequantization transform, not one per
/// primitive), then folds the dequantization into every node that
/// references the mesh.
fn quantize_position(doc: &mut Document, stats: &mut QuantizeStats) -> bool {
    let mut any = false;
    for mesh_id in doc.mesh_ids().collect::<Vec<_>>() {
        let position_ids: Vec<_> = doc
            .mesh(mesh_id)
            .unwrap()
            .primitives
            .iter()
            .filter_map(|p| p.position())
            .collect();
        if position_ids.is_empty() {
            continue;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for &id in &position_ids {
            let acc = doc.accessor(id).unwrap();
            for i in 0..acc.count() {
                let v = acc.get_vec3(i);
                min = min.min(v);
                max = max.max(v);
            }
        }
        if !min.is_finite() || !max.is_finite() {
            continue;
        }
        let extent = (max - min).max(Vec3::splat(1e-6));
        let scale = extent / 65534.0;

        for &id in &position_ids {
            let acc = doc.accessor_mut(id).unwrap();
            stats.original_size += byte_len(acc);
            requantize_vec3_i16(acc, min, scale);
            stats.quantized_size += byte_len(acc);
        }
        any = true;

        // Maps the normalized-int decode of `requantize_vec3_i16` (which
        // lands in `[-1, 1]`) back out to `[min, max]`.
        let dequant = Mat4::from_cols(
            (extent.x / 2.0, 0.0, 0.0, 0.0).into(),
            (0.0, extent.y / 2.0, 0.0, 0.0).into(),
            (0.0, 0.0, extent.z / 2.0, 0.0).into(),
            ((min.x + max.x) / 2.0, (min.y + max.y) / 2.0, (min.z + max.z) / 2.0, 1.0).into(),
        );

        for node_id in nodes_referencing(doc, mesh_id) {
            let node = doc.node_mut(node_id).unwrap();
            let current = Mat4::from_scale_rotation_translation(
                Vec3::from(node.transform.scale),
                glam::Quat::from_array(node.transform.rotation),
                Vec3::from(node.transform.translation),
            );
            let composed = current * dequant;
            let (s, r, t) = composed.to_scale_rotation_translation();
            node.transform.scale = s.into();
            node.transform.rotation = r.into();
            node.transform.translation = t.into();
        }
    }
    any
}

fn nodes_referencing(doc: &Document, mesh_id: MeshId) -> Vec<crate::document::NodeId> {
    doc.node_ids()
        .filter(|&id| doc.node(id).map(|n| n.mesh == Some(mesh_id)).unwrap_or(false))
        .collect()
}

/// `p_int = round((p - min) / extent * 65534 - 32767)`, stored as a
/// normalized i16 so the accessor's own decode maps it back to
/// `[-1, 1]`; the node transform above re-expands `[-1, 1]` to `[min, max]`.
fn requantize_vec3_i16(acc: &mut Accessor, min: Vec3, scale: Vec3) {
    let count = acc.count();
    let mut values = Vec::with_capacity(count * 3);
    for i in 0..count {
        let v = acc.get_vec3(i);
        let normalized = (v - min) / scale - Vec3::splat(32767.0);
        for c in [normalized.x, normalized.y, normalized.z] {
            values.push(c.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16);
        }
    }
    acc.data = AccessorData::I16(values);
    acc.normalized = true;
    acc.recompute_min_max();
}

/// Quantizes a directional attribute (NORMAL/TANGENT) to i8 normalized.
/// Tangent's `w` sign component is preserved as -1/1 by the same mapping.
fn quantize_unit_vector(doc: &mut Document, semantic: Semantic, stats: &mut QuantizeStats) -> bool {
    let mut any = false;
    for mesh_id in doc.mesh_ids().collect::<Vec<_>>() {
        let accessor_ids: Vec<_> = doc
            .mesh(mesh_id)
            .unwrap()
            .primitives
            .iter()
            .filter_map(|p| p.attributes.get(&semantic).copied())
            .collect();
        for id in accessor_ids {
            let acc = doc.accessor_mut(id).unwrap();
            if acc.accessor_type != AccessorType::Vec3 && acc.accessor_type != AccessorType::Vec4 {
                continue;
            }
            stats.original_size += byte_len(acc);
            let components = acc.num_components();
            let count = acc.count();
            let mut values = Vec::with_capacity(count * components);
            for i in 0..count {
                for c in 0..components {
                    let x = acc.get_f32(i, c).clamp(-1.0, 1.0);
                    values.push((x * i8::MAX as f32).round() as i8);
                }
            }
            acc.data = AccessorData::I8(values);
            acc.normalized = true;
            acc.recompute_min_max();
            stats.quantized_size += byte_len(acc);
            any = true;
        }
    }
    any
}

fn quantize_zero_one(
    doc: &mut Document,
    matches_semantic: impl Fn(Semantic) -> bool,
    target: ComponentType,
    stats: &mut QuantizeStats,
) -> bool {
    let mut any = false;
    for mesh_id in doc.mesh_ids().collect::<Vec<_>>() {
        let accessor_ids: Vec<_> = doc
            .mesh(mesh_id)
            .unwrap()
            .primitives
            .iter()
            .flat_map(|p| p.attributes.iter())
            .filter(|(&s, _)| matches_semantic(s))
            .map(|(_, &id)| id)
            .collect();
        for id in accessor_ids {
            let acc = doc.accessor_mut(id).unwrap();
            stats.original_size += byte_len(acc);
            let components = acc.num_components();
            let count = acc.count();
            match target {
                ComponentType::U16 => {
                    let mut values = Vec::with_capacity(count * components);
                    for i in 0..count {
                        for c in 0..components {
                            let x = acc.get_f32(i, c).clamp(0.0, 1.0);
                            values.push((x * u16::MAX as f32).round() as u16);
                        }
                    }
                    acc.data = AccessorData::U16(values);
                }
                ComponentType::U8 => {
                    let mut values = Vec::with_capacity(count * components);
                    for i in 0..count {
                        for c in 0..components {
                            let x = acc.get_f32(i, c).clamp(0.0, 1.0);
                            values.push((x * u8::MAX as f32).round() as u8);
                        }
                    }
                    acc.data = AccessorData::U8(values);
                }
                _ => unreachable!("only U16/U8 targets are used by this helper"),
            }
            acc.normalized = true;
            acc.recompute_min_max();
            stats.quantized_size += byte_len(acc);
            any = true;
        }
    }
    any
}

fn byte_len(acc: &Accessor) -> usize {
    acc.data.len() * acc.component_type().byte_length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AccessorType, Material, Mesh, Primitive};
    use std::collections::BTreeMap;

    fn cube_doc() -> (Document, crate::document::AccessorId) {
        let mut doc = Document::new();
        let positions = doc.add_accessor(Accessor::from_f32(
            AccessorType::Vec3,
            vec![
                -1.0, -1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0,
            ],
        ));
        let mut attributes = BTreeMap::new();
        attributes.insert(Semantic::Position, positions);
        doc.add_mesh(Mesh {
            name: None,
            primitives: vec![Primitive {
                attributes,
                indices: None,
                material: None,
                mode: None,
                draco: None,
            }],
        });
        let _ = Material::default();
        (doc, positions)
    }

    #[test]
    fn position_quantization_never_expands() {
        let (mut doc, positions) = cube_doc();
        let opts = QuantizeOptions {
            enabled: true,
            quantize_position: true,
            quantize_normal: false,
            quantize_texcoord: false,
            quantize_color: false,
        };
        let stats = run(&mut doc, &opts).unwrap();
        assert!(stats.quantized_size <= stats.original_size);
        assert_eq!(doc.accessor(positions).unwrap().component_type(), ComponentType::I16);
    }

    #[test]
    fn no_textures_quantized_when_all_flags_false() {
        let (mut doc, _) = cube_doc();
        let opts = QuantizeOptions {
            enabled: true,
            quantize_position: false,
            quantize_normal: false,
            quantize_texcoord: false,
            quantize_color: false,
        };
        let stats = run(&mut doc, &opts).unwrap();
        assert!(stats.attributes_quantized.is_empty());
        assert_eq!(stats.original_size, 0);
    }
}
