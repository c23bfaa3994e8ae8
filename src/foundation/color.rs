use serde::{Deserialize, Serialize};

/// Neutral color used by fallback grids and unreadable pixel buffers.
pub const FALLBACK_COLOR: Rgb8 = Rgb8::new(0x1a, 0x1a, 0x1a);

/// Opaque 8-bit sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array.
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Lowercase 6-digit hex form, e.g. `#1a1a1a`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse a 6-digit hex string (`#rrggbb`).
    ///
    /// This is the strict form produced by sampling; use [`Rgb8::parse`] for user input.
    pub fn from_hex6(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#')?;
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::new(byte(0)?, byte(2)?, byte(4)?))
    }

    /// Parse a CSS-like color string: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` or
    /// `hsl(h, s%, l%)`. Alpha is accepted and ignored.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.starts_with('#') {
            return parse_hex(s);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = func_args(&lower, "rgb") {
            let v = parse_components(args, 3)?;
            let ch = |x: f64| x.round().clamp(0.0, 255.0) as u8;
            return Ok(Self::new(ch(v[0]), ch(v[1]), ch(v[2])));
        }
        if let Some(args) = func_args(&lower, "hsl") {
            let v = parse_components(args, 3)?;
            return Ok(hsl_to_rgb(v[0], v[1] / 100.0, v[2] / 100.0));
        }
        Err(format!("unsupported color \"{s}\""))
    }

    /// Convert from normalized `0..1` channels, clamping out-of-range values.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self::new(to_u8(r), to_u8(g), to_u8(b))
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            RgbObj { r: f64, g: f64, b: f64 },
            HslObj { h: f64, s: f64, l: f64 },
            Arr(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::RgbObj { r, g, b } => Ok(Self::from_unit(r, g, b)),
            Repr::HslObj { h, s, l } => Ok(hsl_to_rgb(h, s, l)),
            Repr::Arr(v) if v.len() == 3 || v.len() == 4 => Ok(Self::from_unit(v[0], v[1], v[2])),
            Repr::Arr(_) => Err(serde::de::Error::custom(
                "color array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
            )),
        }
    }
}

fn func_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(name)?;
    let rest = rest.strip_prefix('a').unwrap_or(rest);
    rest.trim().strip_prefix('(')?.strip_suffix(')')
}

fn parse_components(args: &str, want: usize) -> Result<Vec<f64>, String> {
    let parts: Vec<&str> = args
        .split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < want {
        return Err(format!("expected {want} color components in \"{args}\""));
    }
    parts
        .iter()
        .take(want)
        .map(|p| {
            let p = p.trim_end_matches('%').trim_end_matches("deg");
            p.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("invalid color component \"{p}\""))
        })
        .collect()
}

fn parse_hex(s: &str) -> Result<Rgb8, String> {
    let s = s.trim().strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() {
        return Err(format!("invalid hex color \"{s}\""));
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    match s.len() {
        3 => {
            let nib = |i: usize| hex_byte(&s[i..i + 1].repeat(2));
            Ok(Rgb8::new(nib(0)?, nib(1)?, nib(2)?))
        }
        6 | 8 => Ok(Rgb8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        _ => Err("hex color must be #RGB, #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned()),
    }
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb8 {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Rgb8::from_unit(l, l, l);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    Rgb8::from_unit(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
