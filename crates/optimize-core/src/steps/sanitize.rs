//! Two-phase geometry sanitizer (spec §4.2): `repair_input` brackets the
//! pipeline on entry, `repair_output` on exit. Both share the same
//! per-primitive passes; only the "generate normals if entirely missing"
//! rule is exclusive to the output phase.

use glam::Vec3;
use serde::Serialize;

use crate::document::{Accessor, AccessorData, AccessorType, Document, MeshId, Semantic};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryFixResult {
    pub invalid_vertices_fixed: usize,
    pub normals_regenerated: usize,
    pub tangents_removed: usize,
    pub empty_accessors_removed: usize,
    pub total_primitives_processed: usize,
}

pub fn repair_input(doc: &mut Document) -> Result<GeometryFixResult> {
    run(doc, false)
}

pub fn repair_output(doc: &mut Document) -> Result<GeometryFixResult> {
    run(doc, true)
}

fn run(doc: &mut Document, generate_missing_normals: bool) -> Result<GeometryFixResult> {
    let mut result = GeometryFixResult::default();

    for (mesh_id, idx) in doc.all_primitives_mut() {
        result.total_primitives_processed += 1;

        let (position, normal, tangent, texcoord0, texcoord1) = {
            let mesh = doc.mesh(mesh_id).expect("mesh from all_primitives_mut");
            let prim = &mesh.primitives[idx];
            (
                prim.position(),
                prim.normal(),
                prim.tangent(),
                prim.attributes.get(&Semantic::TexCoord(0)).copied(),
                prim.attributes.get(&Semantic::TexCoord(1)).copied(),
            )
        };

        for acc_id in [position, normal, texcoord0, texcoord1].into_iter().flatten() {
            if let Some(acc) = doc.accessor_mut(acc_id) {
                result.invalid_vertices_fixed += fix_non_finite(acc);
            }
        }

        let needs_regeneration = match normal {
            Some(nid) => doc
                .accessor(nid)
                .map(|acc| !normals_valid(acc))
                .unwrap_or(false),
            None => generate_missing_normals && position.is_some(),
        };

        if needs_regeneration {
            if regenerate_normals(doc, mesh_id, idx)? {
                result.normals_regenerated += 1;
            }
        }

        if let Some(tid) = tangent {
            let drop = doc
                .accessor(tid)
                .map(|acc| tangent_invalid(acc))
                .unwrap_or(true);
            if drop {
                let mesh = doc.mesh_mut(mesh_id).expect("mesh from all_primitives_mut");
                mesh.primitives[idx].attributes.remove(&Semantic::Tangent);
                result.tangents_removed += 1;
            }
        }
    }

    result.empty_accessors_removed = dispose_empty_accessors(doc);
    Ok(result)
}

fn fix_non_finite(acc: &mut Accessor) -> usize {
    let mut fixed = 0;
    if let AccessorData::F32(values) = &mut acc.data {
        for x in values.iter_mut() {
            if !x.is_finite() {
                *x = 0.0;
                fixed += 1;
            }
        }
    }
    fixed
}

/// Samples every `ceil(count/10)`-th normal; all finite and within
/// `[0.5, 1.5]` length is treated as valid (spec §4.2 invariant 3).
fn normals_valid(acc: &Accessor) -> bool {
    let count = acc.count();
    if count == 0 {
        return false;
    }
    let step = ((count as f64) / 10.0).ceil().max(1.0) as usize;
    let mut i = 0;
    while i < count {
        let v = acc.get_vec3(i);
        if !v.is_finite() || !(0.5..=1.5).contains(&v.length()) {
            return false;
        }
        i += step;
    }
    true
}

fn tangent_invalid(acc: &Accessor) -> bool {
    if acc.accessor_type != AccessorType::Vec4 {
        return true;
    }
    let count = acc.count();
    if count == 0 {
        return true;
    }
    let step = ((count as f64) / 10.0).ceil().max(1.0) as usize;
    let mut i = 0;
    while i < count {
        let v = acc.get_vec4(i);
        if !v.is_finite() || (v.w.abs() - 1.0).abs() > 0.1 {
            return true;
        }
        i += step;
    }
    false
}

/// Area-weighted face normals across the primitive's triangles, accumulated
/// per vertex and normalized; zero-length accumulations fall back to
/// `(0, 1, 0)` (spec §4.2).
fn regenerate_normals(doc: &mut Document, mesh_id: MeshId, idx: usize) -> Result<bool> {
    let (position_id, indices) = {
        let mesh = doc.mesh(mesh_id).expect("mesh from all_primitives_mut");
        let prim = &mesh.primitives[idx];
        let Some(position_id) = prim.position() else {
            return Ok(false);
        };
        (position_id, prim.indices)
    };
    let Some(position) = doc.accessor(position_id) else {
        return Ok(false);
    };
    let count = position.count();
    let positions: Vec<Vec3> = (0..count).map(|i| position.get_vec3(i)).collect();
    let index_values = indices
        .and_then(|id| doc.accessor(id))
        .map(|a| a.as_u32_indices())
        .unwrap_or_else(|| (0..count as u32).collect());

    let mut accum = vec![Vec3::ZERO; count];
    for tri in index_values.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if a >= count || b >= count || c >= count {
            continue;
        }
        let face_normal = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        accum[a] += face_normal;
        accum[b] += face_normal;
        accum[c] += face_normal;
    }

    let mut values = Vec::with_capacity(count * 3);
    for v in accum {
        let n = if v.length_squared() > 1e-12 { v.normalize() } else { Vec3::Y };
        values.extend_from_slice(&[n.x, n.y, n.z]);
    }

    let new_id = doc.add_accessor(Accessor::from_f32(AccessorType::Vec3, values));
    let mesh = doc.mesh_mut(mesh_id).expect("mesh from all_primitives_mut");
    mesh.primitives[idx].attributes.insert(Semantic::Normal, new_id);
    Ok(true)
}

/// Disposes accessors with an empty backing array that no other entity
/// references (spec §4.2 / invariant 6).
fn dispose_empty_accessors(doc: &mut Document) -> usize {
    let candidates: Vec<_> = doc
        .accessor_ids()
        .filter(|&id| doc.accessor(id).map(|a| a.data.is_empty()).unwrap_or(false))
        .filter(|&id| doc.accessor_referrer_count(id) == 0)
        .collect();
    let removed = candidates.len();
    for id in candidates {
        doc.remove_accessor(id);
    }
    removed
}
