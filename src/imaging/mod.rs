mod processing;

pub use processing::{
    decode_data_uri, decode_image_bytes, fit_to_canvas, load_image_file, rasterize_for_canvas,
    ImportError,
};
