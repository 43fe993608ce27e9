use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::error::ConfigError;

/// A single image plane.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Original bit depth before conversion (8 or 16)
    pub original_bit_depth: u8,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }
}

/// Color image composed of separate channel frames.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorFrame {
    pub red: Frame,
    pub green: Frame,
    pub blue: Frame,
}

/// Compute BT.601 luminance of a color frame.
pub fn luminance(color: &ColorFrame) -> Frame {
    let data = Zip::from(&color.red.data)
        .and(&color.green.data)
        .and(&color.blue.data)
        .map_collect(|&r, &g, &b| LUMINANCE_R * r + LUMINANCE_G * g + LUMINANCE_B * b);
    Frame::new(data, color.red.original_bit_depth)
}

/// One picture of a clip, either a single luma plane or three color planes.
#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum VideoFrame {
    Mono(Frame),
    Color(ColorFrame),
}

impl VideoFrame {
    pub fn width(&self) -> usize {
        self.plane(0).width()
    }

    pub fn height(&self) -> usize {
        self.plane(0).height()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.plane(0).dim()
    }

    pub fn is_color(&self) -> bool {
        matches!(self, Self::Color(_))
    }

    fn plane(&self, i: usize) -> &Frame {
        match self {
            Self::Mono(f) => f,
            Self::Color(cf) => match i {
                0 => &cf.red,
                1 => &cf.green,
                _ => &cf.blue,
            },
        }
    }

    /// The plane motion analysis and masks are computed on.
    pub fn luma(&self) -> Frame {
        match self {
            Self::Mono(f) => f.clone(),
            Self::Color(cf) => luminance(cf),
        }
    }

    /// Apply `f` plane-by-plane to two frames with the same layout.
    ///
    /// A mono frame paired with a color frame is promoted to gray color.
    pub fn zip_planes<E>(
        &self,
        other: &VideoFrame,
        mut f: impl FnMut(&Frame, &Frame) -> Result<Frame, E>,
    ) -> Result<VideoFrame, E> {
        Ok(match (self, other) {
            (Self::Mono(a), Self::Mono(b)) => Self::Mono(f(a, b)?),
            _ => {
                let a = self.to_color();
                let b = other.to_color();
                Self::Color(ColorFrame {
                    red: f(&a.red, &b.red)?,
                    green: f(&a.green, &b.green)?,
                    blue: f(&a.blue, &b.blue)?,
                })
            }
        })
    }

    /// Mutate every plane in place.
    pub fn for_each_plane_mut(&mut self, mut f: impl FnMut(&mut Frame)) {
        match self {
            Self::Mono(p) => f(p),
            Self::Color(cf) => {
                f(&mut cf.red);
                f(&mut cf.green);
                f(&mut cf.blue);
            }
        }
    }

    /// Expand to three planes (gray replicated for mono input).
    pub fn to_color(&self) -> ColorFrame {
        match self {
            Self::Mono(f) => ColorFrame {
                red: f.clone(),
                green: f.clone(),
                blue: f.clone(),
            },
            Self::Color(cf) => cf.clone(),
        }
    }
}

/// A rational frame rate, `num / den` frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    pub fn new(num: u32, den: u32) -> Result<Self, ConfigError> {
        if num == 0 || den == 0 {
            return Err(ConfigError::InvalidFrameRate(format!("{num}/{den}")));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Twice this rate. Fails when the doubled numerator does not fit.
    pub fn doubled(&self) -> Result<Self, ConfigError> {
        if self.den % 2 == 0 {
            return Self::new(self.num, self.den / 2);
        }
        let num = self
            .num
            .checked_mul(2)
            .ok_or_else(|| ConfigError::InvalidFrameRate(format!("2 x {self}")))?;
        Self::new(num, self.den)
    }

    /// Re-check a rate that may have been built field by field.
    pub fn validated(self) -> Result<Self, ConfigError> {
        Self::new(self.num, self.den)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for FrameRate {
    type Err = ConfigError;

    /// Accepts `"60000/1001"`, `"30"` or `"29.97"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidFrameRate(s.to_string());
        let s = s.trim();
        if let Some((n, d)) = s.split_once('/') {
            let num = n.trim().parse::<u32>().map_err(|_| invalid())?;
            let den = d.trim().parse::<u32>().map_err(|_| invalid())?;
            return Self::new(num, den).map_err(|_| invalid());
        }
        if let Ok(num) = s.parse::<u32>() {
            return Self::new(num, 1).map_err(|_| invalid());
        }
        let value = s.parse::<f64>().map_err(|_| invalid())?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid());
        }
        // NTSC-style rates are expressed over 1001.
        let ntsc = value * 1001.0 / 1000.0;
        if (ntsc - ntsc.round()).abs() < 1e-3 {
            return Self::new((ntsc.round() * 1000.0) as u32, 1001).map_err(|_| invalid());
        }
        Self::new((value * 1000.0).round() as u32, 1000).map_err(|_| invalid())
    }
}

impl TryFrom<String> for FrameRate {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameRate> for String {
    fn from(rate: FrameRate) -> Self {
        rate.to_string()
    }
}
