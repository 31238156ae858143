use super::ids::{AccessorId, MaterialId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    TexCoord(u32),
    Color(u32),
    Joints(u32),
    Weights(u32),
}

impl Semantic {
    pub fn gl_name(&self) -> String {
        match self {
            Semantic::Position => "POSITION".to_string(),
            Semantic::Normal => "NORMAL".to_string(),
            Semantic::Tangent => "TANGENT".to_string(),
            Semantic::TexCoord(n) => format!("TEXCOORD_{n}"),
            Semantic::Color(n) => format!("COLOR_{n}"),
            Semantic::Joints(n) => format!("JOINTS_{n}"),
            Semantic::Weights(n) => format!("WEIGHTS_{n}"),
        }
    }

    pub fn from_gl_name(name: &str) -> Option<Self> {
        Some(match name {
            "POSITION" => Semantic::Position,
            "NORMAL" => Semantic::Normal,
            "TANGENT" => Semantic::Tangent,
            _ => {
                let (prefix, suffix) = name.rsplit_once('_')?;
                let n: u32 = suffix.parse().ok()?;
                match prefix {
                    "TEXCOORD" => Semantic::TexCoord(n),
                    "COLOR" => Semantic::Color(n),
                    "JOINTS" => Semantic::Joints(n),
                    "WEIGHTS" => Semantic::Weights(n),
                    _ => return None,
                }
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    pub fn gl_enum(&self) -> u32 {
        match self {
            Topology::Points => 0,
            Topology::Lines => 1,
            Topology::LineLoop => 2,
            Topology::LineStrip => 3,
            Topology::Triangles => 4,
            Topology::TriangleStrip => 5,
            Topology::TriangleFan => 6,
        }
    }

    pub fn from_gl_enum(value: u32) -> Self {
        match value {
            0 => Topology::Points,
            1 => Topology::Lines,
            2 => Topology::LineLoop,
            3 => Topology::LineStrip,
            5 => Topology::TriangleStrip,
            6 => Topology::TriangleFan,
            _ => Topology::Triangles,
        }
    }
}

/// Draco-compression metadata attached by the `draco` step (spec §4.7);
/// consumed by the I/O writer at encode time.
#[derive(Debug, Clone)]
pub struct DracoCompression {
    pub compression_level: u8,
    pub quantize_position: u8,
    pub quantize_normal: u8,
    pub quantize_texcoord: u8,
    pub quantize_color: u8,
    pub quantize_generic: u8,
}

#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub attributes: BTreeMap<Semantic, AccessorId>,
    pub indices: Option<AccessorId>,
    pub material: Option<MaterialId>,
    pub mode: Option<Topology>,
    pub draco: Option<DracoCompression>,
}

impl Primitive {
    pub fn position(&self) -> Option<AccessorId> {
        self.attributes.get(&Semantic::Position).copied()
    }

    pub fn normal(&self) -> Option<AccessorId> {
        self.attributes.get(&Semantic::Normal).copied()
    }

    pub fn tangent(&self) -> Option<AccessorId> {
        self.attributes.get(&Semantic::Tangent).copied()
    }

    pub fn is_triangles(&self) -> bool {
        matches!(self.mode, None | Some(Topology::Triangles))
    }
}

impl Default for Topology {
    fn default() -> Self {
        Topology::Triangles
    }
}
