//! Color parsing, interpolation and the sequential schemes used by the encoder.
//!
//! The schemes are the 9-class ColorBrewer ramps that d3-scale-chromatic ships, interpolated with
//! the same uniform B-spline (`interpolateRgbBasis`), so colors match what a d3 front end would
//! draw for the same inputs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let channel = |h: &str| u8::from_str_radix(h, 16).ok();
        match hex.len() {
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn from_channels(r: f64, g: f64, b: f64) -> Self {
        let q = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(q(r), q(g), q(b))
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value).ok_or_else(|| format!("invalid color {value:?}, expected #rrggbb"))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Straight per-channel interpolation (`d3.interpolateRgb` with gamma 1).
pub fn interpolate_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let t = if t.is_finite() { t } else { 0.0 };
    let lerp = |x: u8, y: u8| f64::from(x) + (f64::from(y) - f64::from(x)) * t;
    Rgb::from_channels(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
}

fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

fn basis_channel(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let (t, i) = if t.is_nan() || t <= 0.0 {
        (0.0, 0)
    } else if t >= 1.0 {
        (1.0, n - 1)
    } else {
        (t, (t * n as f64).floor() as usize)
    };
    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 {
        values[i + 2]
    } else {
        2.0 * v2 - v1
    };
    basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
}

/// Uniform B-spline through the given colors (`d3.interpolateRgbBasis`). `t` is clamped to
/// `[0, 1]`.
pub fn interpolate_rgb_basis(colors: &[Rgb], t: f64) -> Rgb {
    match colors {
        [] => Rgb::BLACK,
        [only] => *only,
        _ => {
            let channel = |f: fn(&Rgb) -> u8| -> Vec<f64> {
                colors.iter().map(|c| f64::from(f(c))).collect()
            };
            Rgb::from_channels(
                basis_channel(&channel(|c| c.r), t),
                basis_channel(&channel(|c| c.g), t),
                basis_channel(&channel(|c| c.b), t),
            )
        }
    }
}

const REDS: [Rgb; 9] = [
    Rgb::new(0xff, 0xf5, 0xf0),
    Rgb::new(0xfe, 0xe0, 0xd2),
    Rgb::new(0xfc, 0xbb, 0xa1),
    Rgb::new(0xfc, 0x92, 0x72),
    Rgb::new(0xfb, 0x6a, 0x4a),
    Rgb::new(0xef, 0x3b, 0x2c),
    Rgb::new(0xcb, 0x18, 0x1d),
    Rgb::new(0xa5, 0x0f, 0x15),
    Rgb::new(0x67, 0x00, 0x0d),
];

const GREYS: [Rgb; 9] = [
    Rgb::new(0xff, 0xff, 0xff),
    Rgb::new(0xf0, 0xf0, 0xf0),
    Rgb::new(0xd9, 0xd9, 0xd9),
    Rgb::new(0xbd, 0xbd, 0xbd),
    Rgb::new(0x96, 0x96, 0x96),
    Rgb::new(0x73, 0x73, 0x73),
    Rgb::new(0x52, 0x52, 0x52),
    Rgb::new(0x25, 0x25, 0x25),
    Rgb::new(0x00, 0x00, 0x00),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    Reds,
    Greys,
}

impl Scheme {
    pub fn colors(self) -> &'static [Rgb] {
        match self {
            Scheme::Reds => &REDS,
            Scheme::Greys => &GREYS,
        }
    }

    pub fn interpolate(self, t: f64) -> Rgb {
        interpolate_rgb_basis(self.colors(), t)
    }
}

/// A scheme sampled over a sub-interval: `scheme(offset + span * t)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub scheme: Scheme,
    pub offset: f64,
    pub span: f64,
}

impl Ramp {
    pub const fn new(scheme: Scheme, offset: f64, span: f64) -> Self {
        Self {
            scheme,
            offset,
            span,
        }
    }

    pub fn at(&self, t: f64) -> Rgb {
        self.scheme.interpolate(self.offset + self.span * t)
    }
}
