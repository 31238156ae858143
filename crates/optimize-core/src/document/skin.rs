use super::ids::{AccessorId, NodeId};

/// A joint hierarchy + inverse-bind matrices (spec §3 supplement). Carried
/// through the document model and I/O layer unchanged: no pipeline step
/// rewrites skin contents, but the pruner must treat a referenced skin
/// (and the joints it names) as live so skinned meshes round-trip intact.
#[derive(Debug, Clone)]
pub struct Skin {
    pub name: Option<String>,
    pub inverse_bind_matrices: Option<AccessorId>,
    pub joints: Vec<NodeId>,
    pub skeleton: Option<NodeId>,
}
