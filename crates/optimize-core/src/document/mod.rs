//! The in-memory glTF document graph (spec §3).
//!
//! Entities live in typed arenas keyed by monotonically increasing ids
//! (spec §9); a disposed slot becomes `None` rather than shifting every
//! other id. Reverse navigation ("who references this accessor?") is
//! computed on demand by walking the forward graph rather than maintained
//! as a persistent invalidating index — simpler to keep correct, and the
//! documents this pipeline handles are small enough that an O(entities)
//! scan per pruning/sanitizing pass is not a bottleneck.

pub mod accessor;
pub mod buffer;
pub mod ids;
pub mod material;
pub mod mesh;
pub mod node;
pub mod primitive;
pub mod scene;
pub mod skin;
pub mod texture;

pub use accessor::{Accessor, AccessorData, AccessorType, ComponentType};
pub use buffer::Buffer;
pub use ids::{AccessorId, BufferId, MaterialId, MeshId, NodeId, SceneId, SkinId, TextureId};
pub use material::{Material, TextureSlot};
pub use mesh::Mesh;
pub use node::{Node, Transform};
pub use primitive::{DracoCompression, Primitive, Semantic, Topology};
pub use scene::Scene;
pub use skin::Skin;
pub use texture::{MimeType, Texture};

use std::collections::BTreeSet;

macro_rules! arena {
    ($field:ident, $id:ty, $ty:ty, $add:ident, $get:ident, $get_mut:ident, $remove:ident, $iter:ident, $iter_ids:ident) => {
        pub fn $add(&mut self, value: $ty) -> $id {
            self.$field.push(Some(value));
            <$id>::new_from_index(self.$field.len() - 1)
        }

        pub fn $get(&self, id: $id) -> Option<&$ty> {
            self.$field.get(id.index())?.as_ref()
        }

        pub fn $get_mut(&mut self, id: $id) -> Option<&mut $ty> {
            self.$field.get_mut(id.index())?.as_mut()
        }

        pub fn $remove(&mut self, id: $id) -> Option<$ty> {
            self.$field.get_mut(id.index())?.take()
        }

        pub fn $iter(&self) -> impl Iterator<Item = &$ty> + '_ {
            self.$field.iter().filter_map(|e| e.as_ref())
        }

        pub fn $iter_ids(&self) -> impl Iterator<Item = $id> + '_ {
            self.$field
                .iter()
                .enumerate()
                .filter_map(|(i, e)| e.as_ref().map(|_| <$id>::new_from_index(i)))
        }
    };
}

// Give every id type a private index constructor so the arena! macro can
// build them without exposing a public, easily-misused `fn new`.
macro_rules! id_index {
    ($id:ty) => {
        impl $id {
            fn new_from_index(i: usize) -> Self {
                Self(i)
            }
            fn index(&self) -> usize {
                self.0
            }
        }
    };
}

id_index!(BufferId);
id_index!(AccessorId);
id_index!(MaterialId);
id_index!(TextureId);
id_index!(MeshId);
id_index!(NodeId);
id_index!(SkinId);

#[derive(Debug, Clone, Default)]
pub struct Document {
    buffers: Vec<Option<Buffer>>,
    accessors: Vec<Option<Accessor>>,
    materials: Vec<Option<Material>>,
    textures: Vec<Option<Texture>>,
    meshes: Vec<Option<Mesh>>,
    nodes: Vec<Option<Node>>,
    skins: Vec<Option<Skin>>,
    pub scenes: Vec<Scene>,
    pub default_scene: Option<SceneId>,
    pub extensions_used: BTreeSet<String>,
    pub extensions_required: BTreeSet<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    arena!(
        buffers,
        BufferId,
        Buffer,
        add_buffer,
        buffer,
        buffer_mut,
        remove_buffer,
        iter_buffers,
        buffer_ids
    );
    arena!(
        accessors,
        AccessorId,
        Accessor,
        add_accessor,
        accessor,
        accessor_mut,
        remove_accessor,
        iter_accessors,
        accessor_ids
    );
    arena!(
        materials,
        MaterialId,
        Material,
        add_material,
        material,
        material_mut,
        remove_material,
        iter_materials,
        material_ids
    );
    arena!(
        textures,
        TextureId,
        Texture,
        add_texture,
        texture,
        texture_mut,
        remove_texture,
        iter_textures,
        texture_ids
    );
    arena!(
        meshes,
        MeshId,
        Mesh,
        add_mesh,
        mesh,
        mesh_mut,
        remove_mesh,
        iter_meshes,
        mesh_ids
    );
    arena!(
        nodes,
        NodeId,
        Node,
        add_node,
        node,
        node_mut,
        remove_node,
        iter_nodes,
        node_ids
    );
    arena!(
        skins,
        SkinId,
        Skin,
        add_skin,
        skin,
        skin_mut,
        remove_skin,
        iter_skins,
        skin_ids
    );

    pub fn default_scene(&self) -> Option<&Scene> {
        self.default_scene.and_then(|i| self.scenes.get(i.0))
    }

    pub fn mark_extension(&mut self, name: &str, required: bool) {
        self.extensions_used.insert(name.to_string());
        if required {
            self.extensions_required.insert(name.to_string());
        }
    }

    /// All primitives across all live meshes, with their owning mesh id.
    pub fn all_primitives(&self) -> impl Iterator<Item = (MeshId, &Primitive)> + '_ {
        self.mesh_ids().collect::<Vec<_>>().into_iter().flat_map(move |id| {
            self.mesh(id)
                .into_iter()
                .flat_map(move |m| m.primitives.iter().map(move |p| (id, p)))
        })
    }

    pub fn all_primitives_mut(&mut self) -> Vec<(MeshId, usize)> {
        let mut out = Vec::new();
        for id in self.mesh_ids().collect::<Vec<_>>() {
            if let Some(mesh) = self.mesh(id) {
                for i in 0..mesh.primitives.len() {
                    out.push((id, i));
                }
            }
        }
        out
    }

    /// The set of entities reachable from the scene graph (spec §4.3).
    /// Falls back to every scene's roots when there is no default scene —
    /// an open question the distilled spec leaves unresolved (see DESIGN.md).
    pub fn reachable(&self) -> Reachable {
        let mut r = Reachable::default();
        let roots: Vec<NodeId> = if let Some(scene) = self.default_scene() {
            scene.root_nodes.clone()
        } else {
            self.scenes.iter().flat_map(|s| s.root_nodes.clone()).collect()
        };
        let mut stack = roots;
        while let Some(node_id) = stack.pop() {
            if !r.nodes.insert(node_id) {
                continue;
            }
            let Some(node) = self.node(node_id) else {
                continue;
            };
            for &child in &node.children {
                stack.push(child);
            }
            if let Some(mesh_id) = node.mesh {
                r.meshes.insert(mesh_id);
                if let Some(mesh) = self.mesh(mesh_id) {
                    for prim in &mesh.primitives {
                        for &acc in prim.attributes.values() {
                            r.accessors.insert(acc);
                        }
                        if let Some(idx) = prim.indices {
                            r.accessors.insert(idx);
                        }
                        if let Some(mat_id) = prim.material {
                            r.materials.insert(mat_id);
                            if let Some(mat) = self.material(mat_id) {
                                for tex in mat.textures() {
                                    r.textures.insert(tex);
                                }
                            }
                        }
                    }
                }
            }
            if let Some(skin_id) = node.skin {
                r.skins.insert(skin_id);
                if let Some(skin) = self.skin(skin_id) {
                    if let Some(ibm) = skin.inverse_bind_matrices {
                        r.accessors.insert(ibm);
                    }
                    for &joint in &skin.joints {
                        stack.push(joint);
                    }
                    if let Some(skeleton) = skin.skeleton {
                        stack.push(skeleton);
                    }
                }
            }
        }
        r
    }

    /// Number of primitives (across all meshes) referencing this accessor,
    /// plus skins referencing it as their inverse-bind-matrices accessor.
    /// Used by the sanitizer/pruner to decide disposability (invariant 6).
    pub fn accessor_referrer_count(&self, id: AccessorId) -> usize {
        let mut count = 0;
        for (_, prim) in self.all_primitives() {
            if prim.attributes.values().any(|&a| a == id) {
                count += 1;
            }
            if prim.indices == Some(id) {
                count += 1;
            }
        }
        for skin in self.iter_skins() {
            if skin.inverse_bind_matrices == Some(id) {
                count += 1;
            }
        }
        count
    }
}

#[derive(Debug, Default)]
pub struct Reachable {
    pub nodes: std::collections::HashSet<NodeId>,
    pub meshes: std::collections::HashSet<MeshId>,
    pub materials: std::collections::HashSet<MaterialId>,
    pub textures: std::collections::HashSet<TextureId>,
    pub accessors: std::collections::HashSet<AccessorId>,
    pub skins: std::collections::HashSet<SkinId>,
}
