//! Command-line interface implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::export;
use crate::file;
use crate::imaging;
use crate::model::{SpriteVariant, FRAME_COUNT};
use crate::state::AppConfig;

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// Sprite Studio - inspect, export and populate sprite project documents
#[derive(Parser)]
#[command(name = "sprite-studio")]
#[command(about = "Sprite Studio - inspect, export and populate sprite project documents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a summary of a project document
    Info {
        /// Project document (JSON)
        project: PathBuf,
    },
    /// Export frames of one variant as a spritesheet strip or individual PNGs
    Export {
        /// Project document (JSON)
        project: PathBuf,

        /// Sprite variant: front, back, frontShiny or backShiny
        #[arg(short, long, default_value = "front")]
        variant: String,

        /// Comma-separated frame indices (0-3); all four when omitted
        #[arg(short, long)]
        frames: Option<String>,

        /// One PNG per frame instead of a single strip
        #[arg(long)]
        individual: bool,

        /// Output path; defaults to <project>-sheet.png
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rasterize an image into one frame of a project document
    Import {
        /// Project document (JSON)
        project: PathBuf,

        /// Image file path, or a data:...;base64,... URI
        image: String,

        /// Sprite variant to import into
        #[arg(short, long, default_value = "front")]
        variant: String,

        /// Frame index to replace (0-3)
        #[arg(short, long, default_value_t = 0)]
        frame: usize,

        /// Where to write the updated document; defaults to in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Info { project } => cmd_info(&project),
        Commands::Export {
            project,
            variant,
            frames,
            individual,
            output,
        } => cmd_export(&project, &variant, frames.as_deref(), individual, output),
        Commands::Import {
            project,
            image,
            variant,
            frame,
            output,
        } => cmd_import(&project, &image, &variant, frame, output),
    };
    ExitCode::from(code)
}

fn parse_frames(spec: Option<&str>) -> Result<Vec<usize>, String> {
    let Some(spec) = spec else {
        return Ok((0..FRAME_COUNT).collect());
    };

    let frames = spec
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid frame index '{}'", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(&bad) = frames.iter().find(|&&f| f >= FRAME_COUNT) {
        return Err(format!(
            "frame index {} out of range (0-{})",
            bad,
            FRAME_COUNT - 1
        ));
    }
    Ok(frames)
}

fn default_sheet_path(project: &Path) -> PathBuf {
    PathBuf::from(format!("{}-sheet.png", project.with_extension("").display()))
}

fn cmd_info(path: &Path) -> u8 {
    let project = match file::read_project(path) {
        Ok(project) => project,
        Err(err) => {
            eprintln!("error: {}", err);
            return EXIT_ERROR;
        }
    };

    let canvas = project.canvas_size();
    println!("{}", project.name);
    if !project.description.is_empty() {
        println!("  {}", project.description);
    }
    println!("  canvas:   {}x{}", canvas.width, canvas.height);
    println!("  animated: {}", if project.is_animated { "yes" } else { "no" });
    if !project.tags.is_empty() {
        println!("  tags:     {}", project.tags.join(", "));
    }
    for variant in SpriteVariant::ALL {
        let frames = project.sprite_set.variant(variant);
        let counts: Vec<String> = frames.iter().map(|f| f.len().to_string()).collect();
        println!(
            "  {:<11} pixels per frame: [{}]",
            variant.to_string(),
            counts.join(", ")
        );
    }

    AppConfig::load().add_recent(&path.to_string_lossy());
    EXIT_SUCCESS
}

fn cmd_export(
    path: &Path,
    variant: &str,
    frames: Option<&str>,
    individual: bool,
    output: Option<PathBuf>,
) -> u8 {
    let variant: SpriteVariant = match variant.parse() {
        Ok(variant) => variant,
        Err(err) => {
            eprintln!("error: {}", err);
            return EXIT_INVALID_ARGS;
        }
    };
    let frames = match parse_frames(frames) {
        Ok(frames) => frames,
        Err(err) => {
            eprintln!("error: {}", err);
            return EXIT_INVALID_ARGS;
        }
    };

    let project = match file::read_project(path) {
        Ok(project) => project,
        Err(err) => {
            eprintln!("error: {}", err);
            return EXIT_ERROR;
        }
    };

    let canvas = project.canvas_size();
    let frame_set = project.sprite_set.variant(variant);
    let output = output.unwrap_or_else(|| default_sheet_path(path));

    let result = if individual {
        export::export_frames(frame_set, &frames, canvas, &output).map(|written| {
            for path in written {
                println!("wrote {}", path.display());
            }
        })
    } else {
        export::export_strip(frame_set, &frames, canvas, &output)
            .map(|path| println!("wrote {}", path.display()))
    };

    match result {
        Ok(()) => {
            AppConfig::load().add_recent(&path.to_string_lossy());
            EXIT_SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            EXIT_ERROR
        }
    }
}

fn cmd_import(
    path: &Path,
    image: &str,
    variant: &str,
    frame: usize,
    output: Option<PathBuf>,
) -> u8 {
    let variant: SpriteVariant = match variant.parse() {
        Ok(variant) => variant,
        Err(err) => {
            eprintln!("error: {}", err);
            return EXIT_INVALID_ARGS;
        }
    };
    if frame >= FRAME_COUNT {
        eprintln!(
            "error: frame index {} out of range (0-{})",
            frame,
            FRAME_COUNT - 1
        );
        return EXIT_INVALID_ARGS;
    }

    let mut project = match file::read_project(path) {
        Ok(project) => project,
        Err(err) => {
            eprintln!("error: {}", err);
            return EXIT_ERROR;
        }
    };

    let decoded = if image.starts_with("data:") {
        imaging::decode_data_uri(image)
    } else {
        imaging::load_image_file(Path::new(image))
    };
    let decoded = match decoded {
        Ok(decoded) => decoded,
        Err(err) => {
            eprintln!("error: {}", err);
            return EXIT_ERROR;
        }
    };

    let canvas = project.canvas_size();
    let raster = imaging::rasterize_for_canvas(decoded, canvas);
    println!(
        "imported {} pixels into {} frame {}",
        raster.len(),
        variant,
        frame
    );
    project.sprite_set.variant_mut(variant).set_frame(frame, raster);

    let output = output.unwrap_or_else(|| path.to_path_buf());
    match file::write_project(&project, &output) {
        Ok(_) => {
            println!("wrote {}", output.display());
            AppConfig::load().add_recent(&path.to_string_lossy());
            EXIT_SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            EXIT_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_spec_defaults_to_the_full_reel() {
        assert_eq!(parse_frames(None).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn frame_spec_parses_comma_lists() {
        assert_eq!(parse_frames(Some("0, 2,3")).unwrap(), vec![0, 2, 3]);
        assert!(parse_frames(Some("0,x")).is_err());
        assert!(parse_frames(Some("4")).is_err());
    }

    #[test]
    fn default_output_sits_next_to_the_project() {
        assert_eq!(
            default_sheet_path(Path::new("work/pikachu.json")),
            PathBuf::from("work/pikachu-sheet.png")
        );
    }
}
