//! The pipeline configuration object (spec §6) and its three named presets.

use serde::{Deserialize, Serialize};

fn f() -> bool {
    false
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanOptions {
    pub enabled: bool,
    pub remove_unused_nodes: bool,
    pub remove_unused_materials: bool,
    pub remove_unused_textures: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            remove_unused_nodes: true,
            remove_unused_materials: true,
            remove_unused_textures: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MergeOptions {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyOptions {
    #[serde(default = "f")]
    pub enabled: bool,
    #[serde(default)]
    pub target_ratio: Option<f32>,
    #[serde(default)]
    pub target_count: Option<u32>,
    #[serde(default = "default_error")]
    pub error: f32,
    #[serde(default = "f")]
    pub lock_border: bool,
}

fn default_error() -> f32 {
    0.01
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuantizeOptions {
    pub enabled: bool,
    pub quantize_position: bool,
    pub quantize_normal: bool,
    pub quantize_texcoord: bool,
    pub quantize_color: bool,
}

impl Default for QuantizeOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            quantize_position: true,
            quantize_normal: true,
            quantize_texcoord: true,
            quantize_color: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DracoOptions {
    #[serde(default = "f")]
    pub enabled: bool,
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,
    #[serde(default = "default_quantize_position")]
    pub quantize_position: u8,
    #[serde(default = "default_quantize_normal")]
    pub quantize_normal: u8,
    #[serde(default = "default_quantize_texcoord")]
    pub quantize_texcoord: u8,
}

fn default_compression_level() -> u8 {
    7
}
fn default_quantize_position() -> u8 {
    14
}
fn default_quantize_normal() -> u8 {
    10
}
fn default_quantize_texcoord() -> u8 {
    12
}

impl Default for DracoOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            compression_level: default_compression_level(),
            quantize_position: default_quantize_position(),
            quantize_normal: default_quantize_normal(),
            quantize_texcoord: default_quantize_texcoord(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TextureMode {
    Etc1s,
    Uastc,
}

impl Default for TextureMode {
    fn default() -> Self {
        TextureMode::Etc1s
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureOptions {
    #[serde(default = "f")]
    pub enabled: bool,
    #[serde(default)]
    pub mode: TextureMode,
    #[serde(default)]
    pub quality: Option<u16>,
    #[serde(default)]
    pub slots: Option<Vec<String>>,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: TextureMode::default(),
            quality: None,
            slots: None,
        }
    }
}

impl TextureOptions {
    /// Effective quality, applying the mode-dependent default from spec §4.8.
    pub fn effective_quality(&self) -> u16 {
        self.quality.unwrap_or(match self.mode {
            TextureMode::Etc1s => 128,
            TextureMode::Uastc => 2,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    pub clean: CleanOptions,
    pub merge: MergeOptions,
    pub simplify: SimplifyOptions,
    pub quantize: QuantizeOptions,
    pub draco: DracoOptions,
    pub texture: TextureOptions,
}

impl Options {
    pub fn fast() -> Self {
        Self {
            clean: CleanOptions {
                enabled: true,
                ..Default::default()
            },
            draco: DracoOptions {
                enabled: true,
                compression_level: 3,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn balanced() -> Self {
        Self {
            clean: CleanOptions {
                enabled: true,
                ..Default::default()
            },
            merge: MergeOptions { enabled: true },
            simplify: SimplifyOptions {
                enabled: true,
                target_ratio: Some(0.75),
                error: default_error(),
                lock_border: false,
                target_count: None,
            },
            draco: DracoOptions {
                enabled: true,
                compression_level: 7,
                ..Default::default()
            },
            texture: TextureOptions {
                enabled: true,
                mode: TextureMode::Etc1s,
                quality: Some(128),
                slots: None,
            },
            ..Default::default()
        }
    }

    pub fn maximum() -> Self {
        Self {
            clean: CleanOptions {
                enabled: true,
                ..Default::default()
            },
            merge: MergeOptions { enabled: true },
            simplify: SimplifyOptions {
                enabled: true,
                target_ratio: Some(0.5),
                error: 0.02,
                lock_border: false,
                target_count: None,
            },
            draco: DracoOptions {
                enabled: true,
                compression_level: 10,
                ..Default::default()
            },
            texture: TextureOptions {
                enabled: true,
                mode: TextureMode::Etc1s,
                quality: Some(80),
                slots: None,
            },
            ..Default::default()
        }
    }

    /// Looks up a preset by name, as used by the CLI's `--preset` flag.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "fast" => Some(Self::fast()),
            "balanced" => Some(Self::balanced()),
            "maximum" => Some(Self::maximum()),
            _ => None,
        }
    }
}
