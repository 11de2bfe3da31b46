//! Asset registry service.
//!
//! Assets are registered once at startup under a string key and looked up
//! read-only afterwards. Only metadata is kept here; decoding files is the
//! render surface's job.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::components::Vec2;
use crate::EngineError;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextureInfo {
    pub path: String,
    pub width: u32,
    pub height: u32,
}

impl TextureInfo {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShaderInfo {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontInfo {
    pub path: String,
}

/// Read-only asset lookup.
pub trait AssetSource {
    fn texture(&self, key: &str) -> Option<&TextureInfo>;
    fn shader(&self, key: &str) -> Option<&ShaderInfo>;
    fn font(&self, key: &str) -> Option<&FontInfo>;

    /// Like [`texture`](Self::texture) but missing keys are an error.
    fn require_texture(&self, key: &str) -> Result<&TextureInfo, EngineError> {
        self.texture(key).ok_or_else(|| EngineError::MissingAsset {
            kind: "texture",
            key: key.to_owned(),
        })
    }
}

/// In-memory [`AssetSource`].
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssetCatalog {
    #[serde(default)]
    textures: HashMap<String, TextureInfo>,
    #[serde(default)]
    shaders: HashMap<String, ShaderInfo>,
    #[serde(default)]
    fonts: HashMap<String, FontInfo>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog of the form
    /// `{"textures": {"ship": {"path": "...", "width": 64, "height": 64}}}`.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&text)
    }

    pub fn load_texture(&mut self, key: &str, path: &str, width: u32, height: u32) {
        debug!(key, path, width, height, "registered texture");
        self.textures.insert(
            key.to_owned(),
            TextureInfo {
                path: path.to_owned(),
                width,
                height,
            },
        );
    }

    pub fn load_shader(&mut self, key: &str, path: &str) {
        debug!(key, path, "registered shader");
        self.shaders.insert(
            key.to_owned(),
            ShaderInfo {
                path: path.to_owned(),
            },
        );
    }

    pub fn load_font(&mut self, key: &str, path: &str) {
        debug!(key, path, "registered font");
        self.fonts.insert(
            key.to_owned(),
            FontInfo {
                path: path.to_owned(),
            },
        );
    }
}

impl AssetSource for AssetCatalog {
    fn texture(&self, key: &str) -> Option<&TextureInfo> {
        self.textures.get(key)
    }

    fn shader(&self, key: &str) -> Option<&ShaderInfo> {
        self.shaders.get(key)
    }

    fn font(&self, key: &str) -> Option<&FontInfo> {
        self.fonts.get(key)
    }
}
