//! Progress export and import as JSON documents.

use super::types::PlayerSession;
use crate::error::GachaResult;
use std::fs;
use std::path::Path;

impl PlayerSession {
    /// Pretty JSON dump of the whole progress tree. Maps are ordered, so dumping
    /// a loaded session reproduces the original text.
    pub fn to_json(&self) -> GachaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> GachaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> GachaResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> GachaResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
