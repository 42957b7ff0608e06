use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

mod project;

pub use project::Project;

/// Fixed animation reel length; every frame set always has all four slots.
pub const FRAME_COUNT: usize = 4;

pub const MIN_CANVAS_DIM: u32 = 16;
pub const MAX_CANVAS_DIM: u32 = 512;

/// A single colored cell. The color is an opaque token (`#rrggbb` or
/// `rgb(r, g, b)`); the core compares it only for equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
    pub color: String,
}

impl Pixel {
    pub fn new(x: u32, y: u32, color: impl Into<String>) -> Self {
        Self {
            x,
            y,
            color: color.into(),
        }
    }
}

/// Sparse per-cell color map for one drawable frame.
///
/// The map is keyed by `(x, y)`, so the "at most one color per coordinate"
/// invariant holds at the data-structure level; inserting at an occupied
/// coordinate replaces the previous entry. An absent coordinate is
/// transparent. The raster itself carries no bounds - callers that need
/// them (flood fill, the viewport) supply a [`CanvasSize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelRaster {
    cells: BTreeMap<(u32, u32), String>,
}

impl PixelRaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a raster from pixels in order; duplicate coordinates keep the
    /// last entry.
    pub fn from_pixels(pixels: impl IntoIterator<Item = Pixel>) -> Self {
        let mut raster = Self::new();
        for p in pixels {
            raster.set(p.x, p.y, p.color);
        }
        raster
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&str> {
        self.cells.get(&(x, y)).map(String::as_str)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.cells.contains_key(&(x, y))
    }

    /// Insert a cell, replacing any existing entry at the coordinate.
    pub fn set(&mut self, x: u32, y: u32, color: impl Into<String>) {
        self.cells.insert((x, y), color.into());
    }

    /// Remove the cell at the coordinate; returns whether one was present.
    pub fn remove(&mut self, x: u32, y: u32) -> bool {
        self.cells.remove(&(x, y)).is_some()
    }

    /// Iterate cells in deterministic (x, y) order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &str)> {
        self.cells
            .iter()
            .map(|(&(x, y), color)| (x, y, color.as_str()))
    }

    pub fn pixels(&self) -> Vec<Pixel> {
        self.iter()
            .map(|(x, y, color)| Pixel::new(x, y, color))
            .collect()
    }
}

// On the wire a raster is a flat pixel array:
// [{"x":0,"y":0,"color":"#112233"}, ...]
impl Serialize for PixelRaster {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct PixelRef<'a> {
            x: u32,
            y: u32,
            color: &'a str,
        }
        serializer.collect_seq(self.iter().map(|(x, y, color)| PixelRef { x, y, color }))
    }
}

impl<'de> Deserialize<'de> for PixelRaster {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pixels = Vec::<Pixel>::deserialize(deserializer)?;
        Ok(Self::from_pixels(pixels))
    }
}

/// The fixed 4-slot animation reel for one sprite variant. Never sparse at
/// the frame-index level: all four rasters exist, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSet {
    frames: [PixelRaster; FRAME_COUNT],
}

impl Default for FrameSet {
    fn default() -> Self {
        Self {
            frames: std::array::from_fn(|_| PixelRaster::new()),
        }
    }
}

impl FrameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panics if `index >= FRAME_COUNT`; frame indices are validated at the
    /// navigation boundary, not here.
    pub fn frame(&self, index: usize) -> &PixelRaster {
        &self.frames[index]
    }

    pub fn frame_mut(&mut self, index: usize) -> &mut PixelRaster {
        &mut self.frames[index]
    }

    pub fn set_frame(&mut self, index: usize, raster: PixelRaster) {
        self.frames[index] = raster;
    }

    pub fn iter(&self) -> impl Iterator<Item = &PixelRaster> {
        self.frames.iter()
    }

    pub fn has_pixels(&self) -> bool {
        self.frames.iter().any(|f| !f.is_empty())
    }

    /// Indices of frames that contain at least one pixel, in reel order.
    pub fn frames_with_data(&self) -> Vec<usize> {
        (0..FRAME_COUNT)
            .filter(|&i| !self.frames[i].is_empty())
            .collect()
    }
}

// Documents key frames by stringified index:
// {"0": [...], "1": [...], "2": [...], "3": [...]}. Missing indices
// backfill empty on load; out-of-range keys are dropped.
impl Serialize for FrameSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FRAME_COUNT))?;
        for (i, frame) in self.frames.iter().enumerate() {
            map.serialize_entry(&i.to_string(), frame)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FrameSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, PixelRaster>::deserialize(deserializer)?;
        let mut set = FrameSet::default();
        for (key, raster) in entries {
            match key.parse::<usize>() {
                Ok(index) if index < FRAME_COUNT => set.frames[index] = raster,
                Ok(_) => {} // out-of-range frame index in a foreign document
                Err(_) => return Err(D::Error::custom(format!("invalid frame key '{}'", key))),
            }
        }
        Ok(set)
    }
}

/// The four named sprite variants: front/back, normal/shiny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpriteVariant {
    #[default]
    Front,
    Back,
    FrontShiny,
    BackShiny,
}

impl SpriteVariant {
    pub const ALL: [SpriteVariant; 4] = [
        SpriteVariant::Front,
        SpriteVariant::Back,
        SpriteVariant::FrontShiny,
        SpriteVariant::BackShiny,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpriteVariant::Front => "front",
            SpriteVariant::Back => "back",
            SpriteVariant::FrontShiny => "frontShiny",
            SpriteVariant::BackShiny => "backShiny",
        }
    }
}

impl fmt::Display for SpriteVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpriteVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "front" => Ok(SpriteVariant::Front),
            "back" => Ok(SpriteVariant::Back),
            "frontshiny" => Ok(SpriteVariant::FrontShiny),
            "backshiny" => Ok(SpriteVariant::BackShiny),
            _ => Err(format!(
                "unknown sprite variant '{}' (expected front, back, frontShiny or backShiny)",
                s
            )),
        }
    }
}

/// The four variant frame sets of one sprite. Structurally identical shape
/// across variants; pixel content is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpriteSet {
    pub front: FrameSet,
    pub back: FrameSet,
    pub front_shiny: FrameSet,
    pub back_shiny: FrameSet,
}

impl SpriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variant(&self, variant: SpriteVariant) -> &FrameSet {
        match variant {
            SpriteVariant::Front => &self.front,
            SpriteVariant::Back => &self.back,
            SpriteVariant::FrontShiny => &self.front_shiny,
            SpriteVariant::BackShiny => &self.back_shiny,
        }
    }

    pub fn variant_mut(&mut self, variant: SpriteVariant) -> &mut FrameSet {
        match variant {
            SpriteVariant::Front => &mut self.front,
            SpriteVariant::Back => &mut self.back,
            SpriteVariant::FrontShiny => &mut self.front_shiny,
            SpriteVariant::BackShiny => &mut self.back_shiny,
        }
    }

    pub fn has_pixels(&self) -> bool {
        SpriteVariant::ALL.iter().any(|&v| self.variant(v).has_pixels())
    }
}

/// Canvas dimensions, fixed per project and shared by every variant and
/// frame of a sprite set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 80,
            height: 80,
        }
    }
}

impl CanvasSize {
    /// Dimensions are clamped into the supported 16..=512 range.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }.clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            width: self.width.clamp(MIN_CANVAS_DIM, MAX_CANVAS_DIM),
            height: self.height.clamp(MIN_CANVAS_DIM, MAX_CANVAS_DIM),
        }
    }

    pub fn in_range(&self) -> bool {
        *self == self.clamped()
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

/// Transient navigation state: which variant/frame is being viewed and at
/// what zoom. Never part of undo history - switching frames is not an
/// undoable edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewCursor {
    pub current_sprite_type: SpriteVariant,
    pub current_frame: usize,
    pub zoom: f32,
}

impl Default for ViewCursor {
    fn default() -> Self {
        Self {
            current_sprite_type: SpriteVariant::Front,
            current_frame: 0,
            zoom: 1.0,
        }
    }
}
