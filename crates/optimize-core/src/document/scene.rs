use super::ids::NodeId;

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: Option<String>,
    pub root_nodes: Vec<NodeId>,
}
