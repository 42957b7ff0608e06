use log::warn;
use serde::{Deserialize, Serialize};

use super::{CanvasSize, FrameSet, PixelRaster, SpriteSet, SpriteVariant};

fn default_version() -> String {
    "2.0".to_string()
}

fn default_name() -> String {
    "Untitled Project".to_string()
}

fn default_canvas_dim() -> u32 {
    CanvasSize::default().width
}

/// Legacy stencil payload: a single pre-drawn frame a project was started
/// from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StencilData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pixels: PixelRaster,
}

/// The persisted project document.
///
/// The wire shape matches what the studio has always saved: camelCase
/// keys, the four-variant sprite set, canvas dimensions, tags, and the
/// editor cursor. Unknown fields (reference-source attribution and other
/// opaque metadata) are captured in `extra` and written back untouched on
/// save. Older documents carried a flattened `animatedFrames` reel or a
/// `stencilData` seed instead of a sprite set; `from_json` migrates both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_canvas_dim")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_dim")]
    pub canvas_height: u32,
    #[serde(default)]
    pub is_animated: bool,
    #[serde(default)]
    pub sprite_set: SpriteSet,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub current_frame: usize,
    #[serde(default, alias = "spriteType")]
    pub current_sprite_type: SpriteVariant,

    /// Legacy v1 field: a single flattened frame reel (pre-variant docs).
    #[serde(default, skip_serializing)]
    animated_frames: Option<FrameSet>,
    /// Legacy v1 field: stencil seed for frame 0 of the active variant.
    #[serde(default, skip_serializing)]
    stencil_data: Option<StencilData>,
    /// Legacy v1 field: nested canvas dimensions.
    #[serde(default, skip_serializing, rename = "canvasSize")]
    canvas_size_legacy: Option<CanvasSize>,

    /// Opaque metadata preserved verbatim through a save/load cycle.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Untitled Project", CanvasSize::default())
    }
}

impl Project {
    pub fn new(name: impl Into<String>, canvas: CanvasSize) -> Self {
        let canvas = canvas.clamped();
        Self {
            version: default_version(),
            name: name.into(),
            description: String::new(),
            canvas_width: canvas.width,
            canvas_height: canvas.height,
            is_animated: false,
            sprite_set: SpriteSet::new(),
            tags: Vec::new(),
            current_frame: 0,
            current_sprite_type: SpriteVariant::Front,
            animated_frames: None,
            stencil_data: None,
            canvas_size_legacy: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize {
            width: self.canvas_width,
            height: self.canvas_height,
        }
    }

    /// Save project to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load project from JSON string, with automatic migration from legacy
    /// document shapes. A totally unparseable document is an error; a
    /// partial one loads with defensive defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut project: Self = serde_json::from_str(json)?;
        project.migrate_legacy();
        project.clamp_canvas();
        Ok(project)
    }

    fn migrate_legacy(&mut self) {
        if let Some(canvas) = self.canvas_size_legacy.take() {
            self.canvas_width = canvas.width;
            self.canvas_height = canvas.height;
        }

        // A populated sprite set always wins over legacy payloads.
        if self.sprite_set.has_pixels() {
            self.animated_frames = None;
            self.stencil_data = None;
            return;
        }

        if let Some(frames) = self.animated_frames.take() {
            self.sprite_set.front = frames;
            self.is_animated = true;
            self.stencil_data = None;
            self.version = default_version();
            return;
        }

        if let Some(stencil) = self.stencil_data.take() {
            let variant = self.current_sprite_type;
            self.sprite_set.variant_mut(variant).set_frame(0, stencil.pixels);
            self.version = default_version();
        }
    }

    fn clamp_canvas(&mut self) {
        let declared = self.canvas_size();
        let clamped = declared.clamped();
        if declared != clamped {
            warn!(
                "project '{}' declares canvas {}x{}, clamping to {}x{}",
                self.name, declared.width, declared.height, clamped.width, clamped.height
            );
            self.canvas_width = clamped.width;
            self.canvas_height = clamped.height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_through_json() {
        let mut project = Project::new("Starter", CanvasSize::new(32, 32));
        project.tags = vec!["fire".to_string(), "gen1".to_string()];
        project
            .sprite_set
            .front
            .frame_mut(0)
            .set(3, 3, "#ff8800");

        let json = project.to_json().unwrap();
        let loaded = Project::from_json(&json).unwrap();
        assert_eq!(loaded, project);
    }

    #[test]
    fn preserves_unknown_metadata_verbatim() {
        let json = r##"{
            "name": "Imported",
            "canvasWidth": 64,
            "canvasHeight": 64,
            "spriteSet": {},
            "pokemonData": {"sprites": {"front": "https://example.test/25.png"}, "id": 25},
            "gameVersion": "crystal"
        }"##;

        let project = Project::from_json(json).unwrap();
        assert_eq!(project.extra.len(), 2);

        let saved = project.to_json().unwrap();
        let reloaded = Project::from_json(&saved).unwrap();
        assert_eq!(reloaded.extra, project.extra);
        assert_eq!(
            reloaded.extra["pokemonData"]["sprites"]["front"],
            serde_json::json!("https://example.test/25.png")
        );
        assert_eq!(reloaded.extra["gameVersion"], serde_json::json!("crystal"));
    }

    #[test]
    fn migrates_flattened_animated_frames() {
        let json = r##"{
            "name": "Old Reel",
            "isAnimated": true,
            "animatedFrames": {
                "0": [{"x": 1, "y": 1, "color": "#111111"}],
                "2": [{"x": 2, "y": 2, "color": "#222222"}]
            }
        }"##;

        let project = Project::from_json(json).unwrap();
        assert!(project.is_animated);
        assert_eq!(project.sprite_set.front.frame(0).get(1, 1), Some("#111111"));
        assert_eq!(project.sprite_set.front.frame(2).get(2, 2), Some("#222222"));
        assert!(!project.sprite_set.back.has_pixels());

        // Legacy payload is not written back out.
        let saved = project.to_json().unwrap();
        assert!(!saved.contains("animatedFrames"));
    }

    #[test]
    fn migrates_stencil_seed_into_named_variant() {
        let json = r##"{
            "name": "From Stencil",
            "spriteType": "backShiny",
            "stencilData": {"name": "bulba", "pixels": [{"x": 0, "y": 0, "color": "#00ff00"}]}
        }"##;

        let project = Project::from_json(json).unwrap();
        assert_eq!(project.current_sprite_type, SpriteVariant::BackShiny);
        assert_eq!(
            project.sprite_set.back_shiny.frame(0).get(0, 0),
            Some("#00ff00")
        );
    }

    #[test]
    fn populated_sprite_set_wins_over_legacy_payloads() {
        let json = r##"{
            "name": "Both",
            "spriteSet": {"front": {"0": [{"x": 5, "y": 5, "color": "#0000ff"}]}},
            "animatedFrames": {"0": [{"x": 1, "y": 1, "color": "#111111"}]}
        }"##;

        let project = Project::from_json(json).unwrap();
        assert_eq!(project.sprite_set.front.frame(0).get(5, 5), Some("#0000ff"));
        assert_eq!(project.sprite_set.front.frame(0).get(1, 1), None);
    }

    #[test]
    fn nested_legacy_canvas_size_is_adopted() {
        let json = r##"{
            "name": "Local Save",
            "canvasSize": {"width": 40, "height": 48},
            "spriteSet": {}
        }"##;

        let project = Project::from_json(json).unwrap();
        assert_eq!(project.canvas_size(), CanvasSize::new(40, 48));
    }

    #[test]
    fn out_of_range_canvas_is_clamped_not_rejected() {
        let json = r##"{"name": "Huge", "canvasWidth": 9000, "canvasHeight": 8}"##;
        let project = Project::from_json(json).unwrap();
        assert_eq!(project.canvas_width, crate::model::MAX_CANVAS_DIM);
        assert_eq!(project.canvas_height, crate::model::MIN_CANVAS_DIM);
    }

    #[test]
    fn unparseable_document_is_an_error() {
        assert!(Project::from_json("not json at all").is_err());
        assert!(Project::from_json(r#"{"name": ["wrong", "type"]}"#).is_err());
    }
}
