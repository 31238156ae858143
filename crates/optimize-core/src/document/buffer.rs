/// An opaque byte store owned by the document; accessors reference a buffer
/// by id and describe how to interpret a byte range of it.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    pub bytes: Vec<u8>,
}

impl Buffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
