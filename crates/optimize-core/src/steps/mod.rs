//! Pipeline steps (spec §4.2–§4.8), invoked in a fixed order by the
//! [`crate::scheduler`].
//!
//! Each step returns its own stats type; the scheduler wraps whichever one
//! ran into a [`StepStats`] variant for the result it hands back to callers.

pub mod draco;
pub mod merge;
pub mod prune;
pub mod quantize;
pub mod sanitize;
pub mod simplify;
pub mod texture;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StepStats {
    Sanitize(sanitize::GeometryFixResult),
    Prune(prune::PruneStats),
    Merge(merge::MergeStats),
    Simplify(simplify::SimplifyStats),
    Quantize(quantize::QuantizeStats),
    Draco(draco::DracoStats),
    Texture(texture::TextureStats),
}
