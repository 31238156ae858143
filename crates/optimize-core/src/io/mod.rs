//! glTF binary (.glb) container I/O (spec §4.1, §4.9).

pub mod gltf_json;
pub mod reader;
pub mod writer;

pub use reader::{read, read_bytes};
pub use writer::{write, write_bytes};
