mod color;
mod spritesheet;

pub use color::{parse_color_token, ColorError};
pub use spritesheet::{
    ensure_png_extension, export_frames, export_strip, render_frame, render_strip, select_frames,
};
