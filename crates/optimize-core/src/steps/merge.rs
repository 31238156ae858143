//! Mesh joiner (spec §4.4): merges same-material, same-topology,
//! same-attribute-layout primitives within a mesh into one draw unit.
//! Primitives without a material, or whose layout doesn't match any other
//! primitive's, pass through unchanged. The set of materials in use is
//! never altered by this step.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::document::{Accessor, AccessorType, MaterialId, Primitive, Semantic, Topology};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStats {
    pub original_mesh_count: usize,
    pub merged_mesh_count: usize,
    pub meshes_reduced: usize,
}

pub fn run(doc: &mut crate::document::Document) -> Result<MergeStats> {
    let mut original_mesh_count = 0;
    let mut merged_mesh_count = 0;

    for mesh_id in doc.mesh_ids().collect::<Vec<_>>() {
        let primitives = doc.mesh(mesh_id).expect("live mesh id").primitives.clone();
        original_mesh_count += primitives.len();
        let new_primitives = merge_primitives(doc, primitives);
        merged_mesh_count += new_primitives.len();
        doc.mesh_mut(mesh_id).expect("live mesh id").primitives = new_primitives;
    }

    Ok(MergeStats {
        original_mesh_count,
        merged_mesh_count,
        meshes_reduced: original_mesh_count.saturating_sub(merged_mesh_count),
    })
}

fn merge_primitives(doc: &mut crate::document::Document, primitives: Vec<Primitive>) -> Vec<Primitive> {
    let mut groups: Vec<(MaterialId, Topology, Vec<Semantic>, Vec<Primitive>)> = Vec::new();
    let mut out = Vec::new();

    for prim in primitives {
        let Some(mat) = prim.material else {
            out.push(prim);
            continue;
        };
        let mode = prim.mode.unwrap_or_default();
        let mut sems: Vec<Semantic> = prim.attributes.keys().copied().collect();
        sems.sort();
        match groups
            .iter_mut()
            .find(|(m, md, s, _)| *m == mat && *md == mode && *s == sems)
        {
            Some(group) => group.3.push(prim),
            None => groups.push((mat, mode, sems, vec![prim])),
        }
    }

    for (_, mode, _, group) in groups {
        if group.len() == 1 {
            out.push(group.into_iter().next().unwrap());
            continue;
        }
        match try_merge(doc, &group, mode) {
            Some(merged) => out.push(merged),
            None => out.extend(group),
        }
    }

    out
}

/// Concatenates vertex data across primitives that share an identical
/// attribute-semantic set and offsets each primitive's index values by the
/// running vertex count. Bails (returns `None`, leaving primitives intact)
/// if any attribute's accessor type disagrees across the group.
fn try_merge(doc: &mut crate::document::Document, group: &[Primitive], mode: Topology) -> Option<Primitive> {
    let mut sems: Vec<Semantic> = group[0].attributes.keys().copied().collect();
    sems.sort();
    if group
        .iter()
        .any(|p| p.attributes.len() != sems.len() || !sems.iter().all(|s| p.attributes.contains_key(s)))
    {
        return None;
    }

    let mut accessor_type = BTreeMap::new();
    for &sem in &sems {
        let acc = doc.accessor(group[0].attributes[&sem])?;
        accessor_type.insert(sem, acc.accessor_type);
    }

    let mut merged_attrs: BTreeMap<Semantic, Vec<f32>> = sems.iter().map(|&s| (s, Vec::new())).collect();
    let mut merged_indices: Vec<u32> = Vec::new();
    let mut vertex_offset: u32 = 0;

    for prim in group {
        let mut vertex_count = None;
        for &sem in &sems {
            let acc = doc.accessor(prim.attributes[&sem])?;
            if acc.accessor_type != accessor_type[&sem] {
                return None;
            }
            let count = acc.count();
            match vertex_count {
                Some(vc) if vc != count => return None,
                _ => vertex_count = Some(count),
            }
            let comps = acc.num_components();
            let values = merged_attrs.get_mut(&sem).unwrap();
            for i in 0..count {
                for c in 0..comps {
                    values.push(acc.get_f32(i, c));
                }
            }
        }
        let vertex_count = vertex_count.unwrap_or(0) as u32;

        match prim.indices.and_then(|id| doc.accessor(id)) {
            Some(idx_acc) => {
                for v in idx_acc.as_u32_indices() {
                    merged_indices.push(v + vertex_offset);
                }
            }
            None => merged_indices.extend(vertex_offset..vertex_offset + vertex_count),
        }
        vertex_offset += vertex_count;
    }

    let mut merged = Primitive {
        attributes: BTreeMap::new(),
        indices: None,
        material: group[0].material,
        mode: Some(mode),
        draco: None,
    };
    for (sem, values) in merged_attrs {
        let id = doc.add_accessor(Accessor::from_f32(accessor_type[&sem], values));
        merged.attributes.insert(sem, id);
    }
    merged.indices = Some(doc.add_accessor(Accessor::from_u32_indices(merged_indices)));
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Material, Mesh};

    fn quad_primitive(doc: &mut Document, mat: MaterialId) -> Primitive {
        let positions = doc.add_accessor(Accessor::from_f32(
            AccessorType::Vec3,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
        ));
        let mut attributes = BTreeMap::new();
        attributes.insert(Semantic::Position, positions);
        Primitive {
            attributes,
            indices: None,
            material: Some(mat),
            mode: Some(Topology::Triangles),
            draco: None,
        }
    }

    #[test]
    fn same_material_primitives_merge_into_one() {
        let mut doc = Document::new();
        let mat = doc.add_material(Material::default());
        let p1 = quad_primitive(&mut doc, mat);
        let p2 = quad_primitive(&mut doc, mat);
        let mesh_id = doc.add_mesh(Mesh {
            name: None,
            primitives: vec![p1, p2],
        });

        let stats = run(&mut doc).unwrap();
        assert_eq!(stats.original_mesh_count, 2);
        assert_eq!(stats.merged_mesh_count, 1);
        assert_eq!(doc.mesh(mesh_id).unwrap().primitives.len(), 1);
        let merged = &doc.mesh(mesh_id).unwrap().primitives[0];
        let pos = doc.accessor(merged.position().unwrap()).unwrap();
        assert_eq!(pos.count(), 6);
    }

    #[test]
    fn materialless_primitive_is_left_alone() {
        let mut doc = Document::new();
        let positions = doc.add_accessor(Accessor::from_f32(AccessorType::Vec3, vec![0.0; 9]));
        let mut attributes = BTreeMap::new();
        attributes.insert(Semantic::Position, positions);
        let prim = Primitive {
            attributes,
            indices: None,
            material: None,
            mode: None,
            draco: None,
        };
        let mesh_id = doc.add_mesh(Mesh {
            name: None,
            primitives: vec![prim],
        });
        let stats = run(&mut doc).unwrap();
        assert_eq!(stats.meshes_reduced, 0);
        assert_eq!(doc.mesh(mesh_id).unwrap().primitives.len(), 1);
    }
}
