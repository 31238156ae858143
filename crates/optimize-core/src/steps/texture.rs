//! Texture compressor (spec §4.8): re-encodes qualifying textures to KTX2
//! (Basis Universal ETC1S/UASTC) with a WebP re-encode fallback when the
//! Basis encoder can't make sense of the source image (spec §9: "texture
//! fallback production-readiness is an open question"; we resolve it by
//! treating the fallback as a correctness net, not a quality target, and
//! recording which path each texture took in `TextureDetail`).

use std::collections::HashSet;
use std::io::Cursor;

use basis_universal::{BasisTextureFormat, Compressor, CompressorParams, ColorSpace};
use image::DynamicImage;
use serde::Serialize;
use tempfile::TempDir;
use tracing::warn;

use crate::document::{Document, MimeType, TextureId, TextureSlot};
use crate::error::{OptimizeError, Result};
use crate::options::{TextureMode, TextureOptions};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureDetail {
    pub index: usize,
    pub original_mime: &'static str,
    pub result_mime: &'static str,
    pub original_size: usize,
    pub compressed_size: usize,
    pub fallback_used: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureStats {
    pub textures_processed: usize,
    pub original_size: usize,
    pub compressed_size: usize,
    pub compression_ratio: f64,
    pub details: Vec<TextureDetail>,
}

pub fn run(doc: &mut Document, opts: &TextureOptions) -> Result<TextureStats> {
    validate(opts)?;

    let mut stats = TextureStats::default();
    let targets = qualifying_textures(doc, opts);
    if targets.is_empty() {
        return Ok(stats);
    }

    // Scoped scratch directory for the Basis encoder's intermediate files;
    // dropped (and cleaned up) at the end of this step regardless of how
    // many textures succeed or fall back (spec §5 resource model).
    let _scratch = TempDir::new().map_err(crate::error::OptimizeError::Io)?;

    let quality = opts.effective_quality();
    for (index, texture_id) in targets.into_iter().enumerate() {
        let Some(texture) = doc.texture(texture_id) else { continue };
        let original_size = texture.byte_len();
        let original_mime = texture.mime_type.as_str();

        let Ok(decoded) = image::load_from_memory(&texture.data) else {
            warn!(texture = index, "skipping texture with undecodable source image");
            continue;
        };

        let (result_mime, data, fallback_used) = match encode_ktx2(&decoded, opts.mode, quality) {
            Ok(bytes) => (MimeType::Ktx2.as_str(), bytes, false),
            Err(err) => {
                warn!(texture = index, error = %err, "basis encode failed, falling back to WebP");
                match encode_webp(&decoded) {
                    Ok(bytes) => (MimeType::Webp.as_str(), bytes, true),
                    Err(err) => {
                        warn!(texture = index, error = %err, "webp fallback failed, leaving texture untouched");
                        continue;
                    }
                }
            }
        };

        let compressed_size = data.len();
        let texture = doc.texture_mut(texture_id).expect("checked above");
        texture.mime_type = MimeType::from_str(result_mime).expect("known mime constant");
        texture.data = data;

        stats.textures_processed += 1;
        stats.original_size += original_size;
        stats.compressed_size += compressed_size;
        stats.details.push(TextureDetail {
            index,
            original_mime,
            result_mime,
            original_size,
            compressed_size,
            fallback_used,
        });
    }

    stats.compression_ratio = if stats.original_size == 0 {
        1.0
    } else {
        stats.compressed_size as f64 / stats.original_size as f64
    };

    Ok(stats)
}

/// `quality` must fall within the mode-dependent range from spec §4.8: ETC1S
/// `1..=255`, UASTC `0..=4`. An explicit out-of-range value is rejected;
/// an absent value falls back to `effective_quality()`'s per-mode default
/// and never reaches this check.
fn validate(opts: &TextureOptions) -> Result<()> {
    let Some(quality) = opts.quality else {
        return Ok(());
    };
    let in_range = match opts.mode {
        TextureMode::Etc1s => (1..=255).contains(&quality),
        TextureMode::Uastc => (0..=4).contains(&quality),
    };
    if !in_range {
        let expected = match opts.mode {
            TextureMode::Etc1s => "[1, 255]",
            TextureMode::Uastc => "[0, 4]",
        };
        return Err(OptimizeError::invalid_options(
            "quality",
            format!("expected {expected} for {:?} mode, got {quality}", opts.mode),
        ));
    }
    Ok(())
}

/// The set of textures reachable through a slot the `slots` filter allows
/// (or every texture bound to any material slot, when the filter is absent).
fn qualifying_textures(doc: &Document, opts: &TextureOptions) -> Vec<TextureId> {
    let allowed_slots: Option<HashSet<&str>> = opts
        .slots
        .as_ref()
        .map(|names| names.iter().map(|s| s.as_str()).collect());

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for material in doc.iter_materials() {
        for slot in TextureSlot::ALL {
            if let Some(allowed) = &allowed_slots {
                if !allowed.contains(slot.slot_name()) {
                    continue;
                }
            }
            if let Some(tex_id) = material.texture(slot) {
                if seen.insert(tex_id) {
                    out.push(tex_id);
                }
            }
        }
    }
    out
}

/// ETC1S compression level (1-5, the speed/ratio knob distinct from the
/// quality value itself) derived from `quality` (spec §4.8: "a compression
/// level 1-5 is derived as `clamp(round(quality/51), 1, 5)`").
fn etc1s_compression_level(quality: u16) -> u32 {
    (quality as f32 / 51.0).round().clamp(1.0, 5.0) as u32
}

/// The Zstd level basisu's RDO post-process is tuned to pair with when
/// producing UASTC output (spec §4.8: "a post-compression LZ pass, typical
/// Zstd ≈ 19").
const UASTC_RDO_ZSTD_LEVEL: i32 = 19;

fn encode_ktx2(image: &DynamicImage, mode: TextureMode, quality: u16) -> std::result::Result<Vec<u8>, String> {
    let rgba = image.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    if width == 0 || height == 0 {
        return Err("zero-sized image".to_string());
    }

    let mut params = CompressorParams::new();
    params.set_generate_mipmaps(true);
    params.set_color_space(ColorSpace::Srgb);
    match mode {
        TextureMode::Etc1s => {
            params.set_basis_format(BasisTextureFormat::ETC1S);
            params.set_etc1s_quality_level(quality.clamp(1, 255) as u32);
            params.set_etc1s_compression_level(etc1s_compression_level(quality));
        }
        TextureMode::Uastc => {
            params.set_basis_format(BasisTextureFormat::UASTC4x4);
            params.set_uastc_quality_level(quality.clamp(0, 4) as u32);
            // RDO post-processing trades a little quality for bitstream that
            // a downstream LZ pass (Zstd) compresses much further.
            params.set_rdo_uastc(true);
            params.set_rdo_uastc_quality_scalar(UASTC_RDO_ZSTD_LEVEL as f32 / 19.0);
        }
    }
    params
        .source_image_mut(0)
        .init(&rgba, width, height, 4);

    let mut compressor = Compressor::new(1);
    // Safety: `params` fully initializes every field `process()` reads, and
    // the compressor is not reused after this call.
    unsafe {
        compressor.init(&params);
        compressor.process().map_err(|e| format!("{e:?}"))?;
    }
    Ok(compressor.basis_file().to_vec())
}

fn encode_webp(image: &DynamicImage) -> std::result::Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::WebP)
        .map_err(|e| e.to_string())?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Material, Texture};

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::new_rgba8(4, 4);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn no_materials_means_no_textures_processed() {
        let mut doc = Document::new();
        let stats = run(&mut doc, &TextureOptions { enabled: true, ..Default::default() }).unwrap();
        assert_eq!(stats.textures_processed, 0);
    }

    #[test]
    fn slot_filter_excludes_unlisted_slots() {
        let mut doc = Document::new();
        let tex_id = doc.add_texture(Texture {
            name: None,
            mime_type: MimeType::Png,
            data: png_bytes(),
        });
        doc.add_material(Material {
            base_color_texture: Some(tex_id),
            ..Default::default()
        });
        let opts = TextureOptions {
            enabled: true,
            slots: Some(vec!["normalTexture".to_string()]),
            ..Default::default()
        };
        assert!(qualifying_textures(&doc, &opts).is_empty());
    }

    #[test]
    fn unfiltered_texture_is_selected_for_processing() {
        let mut doc = Document::new();
        let tex_id = doc.add_texture(Texture {
            name: None,
            mime_type: MimeType::Png,
            data: png_bytes(),
        });
        doc.add_material(Material {
            base_color_texture: Some(tex_id),
            ..Default::default()
        });
        let targets = qualifying_textures(&doc, &TextureOptions::default());
        assert_eq!(targets, vec![tex_id]);
    }
}
