use super::ids::{MeshId, NodeId, SkinId};

#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

/// A camera or light attachment is carried opaquely: no pipeline step
/// inspects or rewrites its parameters (spec §3 supplement), but the
/// pruner's reachability walk must still treat the attachment as a live
/// reference so the owning node is not pruned as an "empty leaf".
#[derive(Debug, Clone)]
pub struct OpaqueAttachment {
    pub kind: &'static str,
    pub json: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub children: Vec<NodeId>,
    pub mesh: Option<MeshId>,
    pub skin: Option<SkinId>,
    pub camera: Option<OpaqueAttachment>,
    pub light: Option<OpaqueAttachment>,
}

impl Node {
    pub fn has_attachment(&self) -> bool {
        self.mesh.is_some()
            || self.skin.is_some()
            || self.camera.is_some()
            || self.light.is_some()
    }
}
