//! Presentation settings for the drop zone and the rendering surface.
//!
//! Hosts can deserialize [`DropZoneConfig`] from JSON; missing keys take their defaults.

use serde::{Deserialize, Serialize};

/// Text and picker settings rendered by a [`crate::interaction::DropSurface`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropZoneConfig {
    /// Instruction shown inside the drop region.
    pub prompt: String,
    /// Reassurance that files never leave the machine.
    pub privacy_note: String,
    /// Label of the file-picker button.
    pub picker_label: String,
    /// Extensions offered by the file picker. Dropped files are not filtered by this list.
    pub accept: Vec<String>,
    /// Whether the picker allows selecting several files.
    pub multiple: bool,
    /// Size applied to the rendering surface when the first table is attached.
    pub surface_size: SurfaceSize,
}

impl Default for DropZoneConfig {
    fn default() -> Self {
        Self {
            prompt: "Upload a CSV/JSON/Arrow file by dragging from your desktop and dropping onto the dashed region.".to_string(),
            privacy_note: "(Data is processed locally, and never sent to any server).".to_string(),
            picker_label: "Select a file".to_string(),
            accept: [".feather", ".arrow", ".csv", ".json"]
                .into_iter()
                .map(String::from)
                .collect(),
            multiple: true,
            surface_size: SurfaceSize::default(),
        }
    }
}

impl DropZoneConfig {
    /// Picker `accept` attribute, e.g. `.feather,.arrow,.csv,.json`.
    pub fn accept_attribute(&self) -> String {
        self.accept.join(",")
    }
}

/// CSS-style dimensions for the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSize {
    pub width: String,
    pub height: String,
}

impl Default for SurfaceSize {
    /// Fill the viewport.
    fn default() -> Self {
        Self {
            width: "100%".to_string(),
            height: "100vh".to_string(),
        }
    }
}
