//! Resource pruner (spec §4.3): drops whatever the scene graph no longer
//! reaches. Accessors and buffers are always pruned once unreferenced;
//! nodes, materials, and textures are each gated by their own config flag.

use serde::Serialize;

use crate::document::Document;
use crate::error::Result;
use crate::options::CleanOptions;

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneStats {
    pub nodes_removed: usize,
    pub materials_removed: usize,
    pub textures_removed: usize,
}

pub fn run(doc: &mut Document, opts: &CleanOptions) -> Result<PruneStats> {
    let reachable = doc.reachable();

    let mut materials_removed = 0;
    if opts.remove_unused_materials {
        let doomed: Vec<_> = doc
            .material_ids()
            .filter(|id| !reachable.materials.contains(id))
            .collect();
        materials_removed = doomed.len();
        for id in doomed {
            doc.remove_material(id);
        }
    }

    let mut textures_removed = 0;
    if opts.remove_unused_textures {
        let doomed: Vec<_> = doc
            .texture_ids()
            .filter(|id| !reachable.textures.contains(id))
            .collect();
        textures_removed = doomed.len();
        for id in doomed {
            doc.remove_texture(id);
        }
    }

    let nodes_removed = if opts.remove_unused_nodes {
        prune_nodes(doc, &reachable)
    } else {
        0
    };

    let doomed_accessors: Vec<_> = doc
        .accessor_ids()
        .filter(|id| !reachable.accessors.contains(id))
        .collect();
    for id in doomed_accessors {
        doc.remove_accessor(id);
    }

    // Buffers are never referenced after the reader eagerly decodes every
    // accessor into a typed array (see document/mod.rs), so they carry no
    // information the writer needs; the pruner clears them unconditionally.
    let buffer_ids: Vec<_> = doc.buffer_ids().collect();
    for id in buffer_ids {
        doc.remove_buffer(id);
    }

    Ok(PruneStats {
        nodes_removed,
        materials_removed,
        textures_removed,
    })
}

/// First drops nodes the scene graph no longer reaches at all, then
/// recursively strips "empty leaves" — nodes with no mesh/camera/light/skin
/// and no remaining children — bottom-up until a fixed point (spec §4.3).
fn prune_nodes(doc: &mut Document, reachable: &crate::document::Reachable) -> usize {
    let mut removed = 0;

    let unreachable: Vec<_> = doc
        .node_ids()
        .filter(|id| !reachable.nodes.contains(id))
        .collect();
    removed += unreachable.len();
    for id in unreachable {
        doc.remove_node(id);
    }

    loop {
        let empty_leaves: Vec<_> = doc
            .node_ids()
            .filter(|&id| {
                let node = doc.node(id).expect("live id from node_ids");
                !node.has_attachment() && node.children.is_empty()
            })
            .collect();
        if empty_leaves.is_empty() {
            break;
        }
        for id in &empty_leaves {
            doc.remove_node(*id);
            for other in doc.node_ids().collect::<Vec<_>>() {
                if let Some(node) = doc.node_mut(other) {
                    node.children.retain(|c| c != id);
                }
            }
            for scene in doc.scenes.iter_mut() {
                scene.root_nodes.retain(|c| c != id);
            }
        }
        removed += empty_leaves.len();
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Material, Node};

    #[test]
    fn unreferenced_material_is_removed_by_default() {
        let mut doc = Document::new();
        doc.add_material(Material::default());
        let stats = run(&mut doc, &CleanOptions::default()).unwrap();
        assert_eq!(stats.materials_removed, 1);
        assert_eq!(doc.material_ids().count(), 0);
    }

    #[test]
    fn empty_leaf_node_is_pruned_when_enabled() {
        let mut doc = Document::new();
        let leaf = doc.add_node(Node::default());
        doc.scenes.push(crate::document::Scene {
            name: None,
            root_nodes: vec![leaf],
        });
        doc.default_scene = Some(crate::document::SceneId(0));
        let stats = run(&mut doc, &CleanOptions::default()).unwrap();
        assert_eq!(stats.nodes_removed, 1);
        assert_eq!(doc.node_ids().count(), 0);
    }

    #[test]
    fn nodes_preserved_when_remove_unused_nodes_is_false() {
        let mut doc = Document::new();
        let leaf = doc.add_node(Node::default());
        doc.scenes.push(crate::document::Scene {
            name: None,
            root_nodes: vec![leaf],
        });
        doc.default_scene = Some(crate::document::SceneId(0));
        let opts = CleanOptions {
            remove_unused_nodes: false,
            ..Default::default()
        };
        let stats = run(&mut doc, &opts).unwrap();
        assert_eq!(stats.nodes_removed, 0);
        assert_eq!(doc.node_ids().count(), 1);
    }
}
