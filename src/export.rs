//! Rendering a world to raster images.
//!
//! `WorldImage` is the pixel source: one pixel per tile, colored by the biome
//! of the owning region. Encoding supports PNG (default), JPEG and GIF.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::world::{World, WorldSummary};

/// Color of tiles no region claimed.
pub const UNCLAIMED_COLOR: Rgba<u8> = Rgba([0x00, 0x00, 0x00, 0xFF]);

/// Errors that can occur while encoding or saving output.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Summary encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Supported output container formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Gif,
}

impl OutputFormat {
    /// Pick a format from a file extension. Unknown or missing extensions
    /// fall back to PNG.
    pub fn from_extension(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => Self::Jpeg,
            Some("gif") => Self::Gif,
            _ => Self::Png,
        }
    }

    /// Parse an explicit format name such as `png`, `.jpg` or `gif`.
    pub fn from_name(name: &str) -> Result<Self, ExportError> {
        match name.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "gif" => Ok(Self::Gif),
            _ => Err(ExportError::UnsupportedFormat(name.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Gif => ImageFormat::Gif,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Pixel view of a world.
#[derive(Clone, Copy)]
pub struct WorldImage<'a> {
    world: &'a World,
}

impl World {
    pub fn image(&self) -> WorldImage<'_> {
        WorldImage { world: self }
    }
}

// Grids hold at most `u32::MAX` tiles, so both dimensions fit in a u32.
impl<'a> WorldImage<'a> {
    pub fn width(&self) -> u32 {
        self.world.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.world.height() as u32
    }

    /// Biome color of the owning region, black if unclaimed. The region's
    /// own display color is never used here.
    pub fn color_at(&self, x: u32, y: u32) -> Rgba<u8> {
        self.world
            .biome_at(x as usize, y as usize)
            .map(|biome| biome.color)
            .unwrap_or(UNCLAIMED_COLOR)
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| self.color_at(x, y))
    }

    /// Encode into `writer` in the given format.
    pub fn encode<W: Write + Seek>(&self, writer: &mut W, format: OutputFormat) -> Result<(), ExportError> {
        let img = DynamicImage::ImageRgba8(self.to_rgba_image());
        match format {
            // JPEG has no alpha channel
            OutputFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()).write_to(writer, format.image_format())?,
            _ => img.write_to(writer, format.image_format())?,
        }
        Ok(())
    }

    pub fn encode_to_vec(&self, format: OutputFormat) -> Result<Vec<u8>, ExportError> {
        let mut cursor = Cursor::new(Vec::new());
        self.encode(&mut cursor, format)?;
        Ok(cursor.into_inner())
    }

    /// Save to `path`, choosing the format from its extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<OutputFormat, ExportError> {
        let format = OutputFormat::from_extension(path.as_ref());
        self.save_as(path, format)?;
        Ok(format)
    }

    /// Save to `path` in `format`, creating parent directories as needed.
    pub fn save_as<P: AsRef<Path>>(&self, path: P, format: OutputFormat) -> Result<(), ExportError> {
        let path = path.as_ref();
        create_parent_dirs(path)?;

        let mut writer = BufWriter::new(File::create(path)?);
        self.encode(&mut writer, format)?;
        writer.flush()?;
        Ok(())
    }
}

/// Write a run summary as pretty-printed JSON.
pub fn save_summary<P: AsRef<Path>>(summary: &WorldSummary, path: P) -> Result<(), ExportError> {
    let path = path.as_ref();
    create_parent_dirs(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;
    Ok(())
}

/// `dir/name.ext` becomes `dir/name_<index>.ext`.
pub fn indexed_path(path: &Path, index: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index),
    };
    path.with_file_name(name)
}

fn create_parent_dirs(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
