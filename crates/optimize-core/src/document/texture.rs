#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeType {
    Png,
    Jpeg,
    Ktx2,
    Webp,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Png => "image/png",
            MimeType::Jpeg => "image/jpeg",
            MimeType::Ktx2 => "image/ktx2",
            MimeType::Webp => "image/webp",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "image/png" => MimeType::Png,
            "image/jpeg" => MimeType::Jpeg,
            "image/ktx2" => MimeType::Ktx2,
            "image/webp" => MimeType::Webp,
            _ => return None,
        })
    }
}

/// A reference to encoded image bytes plus a MIME type (spec §3).
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: Option<String>,
    pub mime_type: MimeType,
    pub data: Vec<u8>,
}

impl Texture {
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}
