use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma, Rgb};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TempoError};
use crate::frame::{ColorFrame, Frame, VideoFrame};

/// File extensions recognised as source frames.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "tif", "tiff", "jpg", "jpeg", "bmp"];

/// Container written for each output frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 8-bit PNG.
    #[default]
    Png,
    /// 16-bit TIFF.
    Tiff,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Tiff => "tiff",
        }
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn to_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

fn buffer_error(w: usize, h: usize) -> TempoError {
    TempoError::InvalidDimensions {
        width: w,
        height: h,
    }
}

/// Save a frame as 16-bit grayscale TIFF.
pub fn save_tiff(frame: &Frame, path: &Path) -> Result<()> {
    let (h, w) = frame.dim();
    let pixels: Vec<u16> = frame.data.iter().map(|&v| to_u16(v)).collect();
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or_else(|| buffer_error(w, h))?;
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save a frame as 8-bit grayscale PNG.
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let (h, w) = frame.dim();
    let pixels: Vec<u8> = frame.data.iter().map(|&v| to_u8(v)).collect();
    let img = GrayImage::from_raw(w as u32, h as u32, pixels).ok_or_else(|| buffer_error(w, h))?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a ColorFrame as 16-bit RGB TIFF.
pub fn save_color_tiff(color: &ColorFrame, path: &Path) -> Result<()> {
    let (h, w) = color.red.dim();
    let mut pixels: Vec<u16> = Vec::with_capacity(h * w * 3);
    for ((r, g), b) in color
        .red
        .data
        .iter()
        .zip(color.green.data.iter())
        .zip(color.blue.data.iter())
    {
        pixels.extend_from_slice(&[to_u16(*r), to_u16(*g), to_u16(*b)]);
    }
    let img = ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or_else(|| buffer_error(w, h))?;
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save a ColorFrame as 8-bit RGB PNG.
pub fn save_color_png(color: &ColorFrame, path: &Path) -> Result<()> {
    let (h, w) = color.red.dim();
    let mut pixels: Vec<u8> = Vec::with_capacity(h * w * 3);
    for ((r, g), b) in color
        .red
        .data
        .iter()
        .zip(color.green.data.iter())
        .zip(color.blue.data.iter())
    {
        pixels.extend_from_slice(&[to_u8(*r), to_u8(*g), to_u8(*b)]);
    }
    let img = image::RgbImage::from_raw(w as u32, h as u32, pixels)
        .ok_or_else(|| buffer_error(w, h))?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a frame in `format`.
pub fn save_video_frame(frame: &VideoFrame, path: &Path, format: OutputFormat) -> Result<()> {
    match (frame, format) {
        (VideoFrame::Mono(f), OutputFormat::Png) => save_png(f, path),
        (VideoFrame::Mono(f), OutputFormat::Tiff) => save_tiff(f, path),
        (VideoFrame::Color(cf), OutputFormat::Png) => save_color_png(cf, path),
        (VideoFrame::Color(cf), OutputFormat::Tiff) => save_color_tiff(cf, path),
    }
}

/// `dir/frame_000042.png` style output path.
pub fn frame_path(dir: &Path, index: usize, format: OutputFormat) -> PathBuf {
    dir.join(format!("frame_{index:06}.{}", format.extension()))
}

fn plane_from_u16(w: u32, h: u32, sample: impl Fn(u32, u32) -> u16) -> Frame {
    let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
        sample(col as u32, row as u32) as f32 / 65535.0
    });
    Frame::new(data, 16)
}

fn decode(img: DynamicImage) -> VideoFrame {
    let bit_depth = if img.color().bytes_per_pixel() / img.color().channel_count() > 1 {
        16
    } else {
        8
    };
    let (w, h) = (img.width(), img.height());
    let with_depth = |mut frame: Frame| {
        frame.original_bit_depth = bit_depth;
        frame
    };

    if img.color().has_color() {
        let rgb = img.to_rgb16();
        let channel = |c: usize| with_depth(plane_from_u16(w, h, |x, y| rgb.get_pixel(x, y).0[c]));
        VideoFrame::Color(ColorFrame {
            red: channel(0),
            green: channel(1),
            blue: channel(2),
        })
    } else {
        let gray = img.to_luma16();
        VideoFrame::Mono(with_depth(plane_from_u16(w, h, |x, y| {
            gray.get_pixel(x, y).0[0]
        })))
    }
}

/// Load one image file; grayscale files become mono frames.
pub fn load_video_frame(path: &Path) -> Result<VideoFrame> {
    let img = image::open(path)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(TempoError::InvalidDimensions {
            width: img.width() as usize,
            height: img.height() as usize,
        });
    }
    Ok(decode(img))
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| {
                        IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
                    })
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Load every frame of an image-sequence directory, in name order.
pub fn load_sequence(dir: &Path) -> Result<Vec<VideoFrame>> {
    let paths = list_frames(dir)?;
    if paths.is_empty() {
        return Err(TempoError::EmptySequence);
    }
    paths.par_iter().map(|p| load_video_frame(p)).collect()
}
