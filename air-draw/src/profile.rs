use crate::error::{Error, Result};
use image::Rgb;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// A color in the 8-bit HSV convention used by the profile bounds:
/// hue is degrees / 2 (0..180), saturation and value span 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Hue values above this are out of range.
pub const MAX_HUE: u8 = 180;

/// Named HSV bounds plus the ink color strokes are drawn with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorProfile {
    pub name: String,
    pub lower: Hsv,
    pub upper: Hsv,
    pub draw_color: Rgb<u8>,
}

impl ColorProfile {
    /// Build a profile, rejecting inverted bounds and out-of-range hues.
    pub fn new(name: &str, lower: Hsv, upper: Hsv, draw_color: Rgb<u8>) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidProfile {
            input: name.to_string(),
            reason: reason.to_string(),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if lower.h > MAX_HUE || upper.h > MAX_HUE {
            return Err(invalid("hue must be within 0..=180"));
        }
        if lower.h > upper.h || lower.s > upper.s || lower.v > upper.v {
            return Err(invalid("lower bound exceeds upper bound"));
        }

        Ok(Self {
            name: name.to_string(),
            lower,
            upper,
            draw_color,
        })
    }

    /// Inclusive, componentwise bounds check
    #[inline]
    pub fn contains(&self, px: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&px.h)
            && (self.lower.s..=self.upper.s).contains(&px.s)
            && (self.lower.v..=self.upper.v).contains(&px.v)
    }
}

/// Parses `name:h,s,v:h,s,v:r,g,b` (lower bound, upper bound, draw color).
impl FromStr for ColorProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidProfile {
            input: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split(':').collect();
        let [name, lower, upper, color] = parts.as_slice() else {
            return Err(invalid("expected name:h,s,v:h,s,v:r,g,b".to_string()));
        };

        let lower = parse_triple(lower).map_err(invalid)?;
        let upper = parse_triple(upper).map_err(invalid)?;
        let color = parse_triple(color).map_err(invalid)?;

        ColorProfile::new(
            name,
            Hsv::new(lower[0], lower[1], lower[2]),
            Hsv::new(upper[0], upper[1], upper[2]),
            Rgb(color),
        )
    }
}

fn parse_triple(s: &str) -> std::result::Result<[u8; 3], String> {
    let values: Vec<u8> = s
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<u8>()
                .map_err(|e| format!("`{}` is not a value in 0..=255: {e}", v.trim()))
        })
        .collect::<std::result::Result<_, _>>()?;

    <[u8; 3]>::try_from(values).map_err(|v| format!("expected 3 components, got {}", v.len()))
}

/// Built-in profiles: name, lower HSV, upper HSV, draw RGB.
/// New entries here are picked up by the registry, the detector and the
/// renderer without any other change.
const BUILTIN_PROFILES: [(&str, [u8; 3], [u8; 3], [u8; 3]); 4] = [
    ("red", [0, 120, 70], [10, 255, 255], [255, 0, 0]),
    ("green", [40, 50, 50], [80, 255, 255], [0, 255, 0]),
    ("blue", [100, 100, 100], [130, 255, 255], [0, 0, 255]),
    ("yellow", [20, 100, 100], [30, 255, 255], [255, 255, 0]),
];

#[derive(Debug, Deserialize)]
struct ProfileEntry {
    name: String,
    lower: [u8; 3],
    upper: [u8; 3],
    color: [u8; 3],
}

/// Ordered, name-indexed set of color profiles.
///
/// Built once at startup (built-ins, then command-line and file entries) and
/// only read afterwards.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<ColorProfile>,
}

impl ProfileRegistry {
    /// Registry holding only the built-in red, green, blue and yellow profiles
    pub fn builtin() -> Self {
        let profiles = BUILTIN_PROFILES
            .iter()
            .map(|(name, lower, upper, color)| ColorProfile {
                name: (*name).to_string(),
                lower: Hsv::new(lower[0], lower[1], lower[2]),
                upper: Hsv::new(upper[0], upper[1], upper[2]),
                draw_color: Rgb(*color),
            })
            .collect();

        Self { profiles }
    }

    /// Append a profile. Names are unique, compared case-insensitively.
    pub fn register(&mut self, profile: ColorProfile) -> Result<()> {
        if self.position(&profile.name).is_ok() {
            return Err(Error::DuplicateProfile(profile.name));
        }
        tracing::debug!("Registered color profile {}", profile.name);
        self.profiles.push(profile);
        Ok(())
    }

    /// Load a JSON array of `{name, lower, upper, color}` entries and register
    /// each of them. Returns how many were added.
    ///
    /// All or nothing: if any entry is invalid or clashes with a registered
    /// name, the registry is left unchanged.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::ProfileFile {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<ProfileEntry> =
            serde_json::from_str(&content).map_err(|source| Error::ProfileJson {
                path: path.to_path_buf(),
                source,
            })?;

        let count = entries.len();
        let mut staged = self.clone();
        for entry in entries {
            let profile = ColorProfile::new(
                &entry.name,
                Hsv::new(entry.lower[0], entry.lower[1], entry.lower[2]),
                Hsv::new(entry.upper[0], entry.upper[1], entry.upper[2]),
                Rgb(entry.color),
            )?;
            staged.register(profile)?;
        }
        *self = staged;

        tracing::info!("Loaded {} color profiles from {}", count, path.display());
        Ok(count)
    }

    pub fn lookup(&self, name: &str) -> Result<&ColorProfile> {
        self.position(name).map(|idx| &self.profiles[idx])
    }

    pub fn position(&self, name: &str) -> Result<usize> {
        let name = name.trim();
        self.profiles
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownProfile(name.to_string()))
    }

    pub fn get(&self, index: usize) -> Option<&ColorProfile> {
        self.profiles.get(index)
    }

    pub fn as_slice(&self) -> &[ColorProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorProfile> {
        self.profiles.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
