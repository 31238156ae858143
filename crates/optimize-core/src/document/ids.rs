//! Monotonically increasing, arena-slot entity ids (spec §9).

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub usize);
    };
}

entity_id!(BufferId);
entity_id!(AccessorId);
entity_id!(MaterialId);
entity_id!(TextureId);
entity_id!(MeshId);
entity_id!(NodeId);
entity_id!(SceneId);
entity_id!(SkinId);
