//! Sprite Studio - a pixel sprite editor for small multi-frame,
//! multi-variant sprite sets (front/back, shiny/non-shiny).
//!
//! The crate is organized around an in-memory editing engine:
//! [`model`] holds the raster data model and the persisted project
//! document, [`draw`] the stateless drawing algorithms, [`view`] the
//! screen/raster coordinate transform, [`state`] the editor session
//! (tools, undo/redo history, shared session store), [`export`] the
//! raster-image and spritesheet output path, and [`imaging`] the
//! import path from decoded bitmaps. [`cli`] is a thin command-line
//! driver over the same engine.

pub mod cli;
pub mod draw;
pub mod export;
pub mod file;
pub mod imaging;
pub mod model;
pub mod state;
pub mod view;
