//! Land-cover label registry
//!
//! The registry is the single source of label names and display colors.
//! Label rasters store raw `u8` ids; ids outside the registry are still
//! tallied and rendered, falling back to the background entry's name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five built-in land-cover classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ClassLabel {
    Other = 0,
    Agricultural = 1,
    Urban = 2,
    Forest = 3,
    Water = 4,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 5] = [
        ClassLabel::Other,
        ClassLabel::Agricultural,
        ClassLabel::Urban,
        ClassLabel::Forest,
        ClassLabel::Water,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Canonical registry key
    pub fn key(self) -> &'static str {
        match self {
            ClassLabel::Other => "other",
            ClassLabel::Agricultural => "agricultural",
            ClassLabel::Urban => "urban",
            ClassLabel::Forest => "forest",
            ClassLabel::Water => "water",
        }
    }

    pub fn from_id(id: u8) -> Option<ClassLabel> {
        ClassLabel::ALL.iter().copied().find(|l| l.id() == id)
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One registry row: id, canonical key, display name, `#RRGGBB` color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub id: u8,
    pub key: String,
    pub name: String,
    pub color: String,
}

impl LabelEntry {
    pub fn new(id: u8, key: &str, name: &str, color: &str) -> Self {
        Self {
            id,
            key: key.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// Ordered, read-only set of label entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelRegistry {
    entries: Vec<LabelEntry>,
}

/// Name reported for ids that are not in the registry
const FALLBACK_KEY: &str = "other";

/// Color used for ids that are not in the registry
pub const FALLBACK_COLOR: &str = "#808080";

impl Default for LabelRegistry {
    fn default() -> Self {
        Self {
            entries: vec![
                LabelEntry::new(1, "agricultural", "Agricultural", "#90EE90"),
                LabelEntry::new(2, "urban", "Urban", "#FF6B6B"),
                LabelEntry::new(3, "forest", "Forest", "#228B22"),
                LabelEntry::new(4, "water", "Water", "#4169E1"),
                LabelEntry::new(0, "other", "Other", "#D3D3D3"),
            ],
        }
    }
}

impl LabelRegistry {
    pub fn new(entries: Vec<LabelEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u8) -> Option<&LabelEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn by_key(&self, key: &str) -> Option<&LabelEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Registry key for `id`, `"other"` when unregistered
    pub fn key_for(&self, id: u8) -> &str {
        self.get(id).map_or(FALLBACK_KEY, |e| e.key.as_str())
    }

    /// Display name for `id`; unregistered ids borrow the background entry's name.
    pub fn name_for(&self, id: u8) -> &str {
        match self.get(id).or_else(|| self.by_key(FALLBACK_KEY)) {
            Some(entry) => entry.name.as_str(),
            None => FALLBACK_KEY,
        }
    }

    /// Hex color for `id`, [`FALLBACK_COLOR`] when unregistered
    pub fn color_for(&self, id: u8) -> &str {
        self.get(id).map_or(FALLBACK_COLOR, |e| e.color.as_str())
    }
}
