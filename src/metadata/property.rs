// Named derived properties and their display forms

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::constants::ABSENT_DISPLAY;
use crate::error::MinfoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Resolution,
    Fps,
    Duration,
    CameraModel,
    CameraLens,
    Aperture,
    FocalLength,
    Iso,
    ShutterSpeed,
    ColorTemp,
    WhiteBalance,
}

impl Property {
    pub const ALL: [Property; 11] = [
        Property::Resolution,
        Property::Fps,
        Property::Duration,
        Property::CameraModel,
        Property::CameraLens,
        Property::Aperture,
        Property::FocalLength,
        Property::Iso,
        Property::ShutterSpeed,
        Property::ColorTemp,
        Property::WhiteBalance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Property::Resolution => "resolution",
            Property::Fps => "fps",
            Property::Duration => "duration",
            Property::CameraModel => "camera_model",
            Property::CameraLens => "camera_lens",
            Property::Aperture => "aperture",
            Property::FocalLength => "focal_length",
            Property::Iso => "iso",
            Property::ShutterSpeed => "shutter_speed",
            Property::ColorTemp => "color_temp",
            Property::WhiteBalance => "white_balance",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = MinfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Property::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| MinfoError::UnknownProperty(wanted.to_string()))
    }
}

/// Width/height pair. At least one side is present whenever a record
/// hands one out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub width: Option<Value>,
    pub height: Option<Value>,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})",
            DisplayValue(self.width.as_ref()),
            DisplayValue(self.height.as_ref())
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Scalar(Value),
    Pair(Resolution),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Scalar(v) => fmt::Display::fmt(&DisplayValue(Some(v)), f),
            PropertyValue::Pair(r) => fmt::Display::fmt(r, f),
        }
    }
}

/// Prints strings without JSON quotes and absent values as a placeholder.
#[derive(Debug, Clone, Copy)]
pub struct DisplayValue<'a>(pub Option<&'a Value>);

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None | Some(Value::Null) => f.write_str(ABSENT_DISPLAY),
            Some(Value::String(s)) => f.write_str(s),
            Some(other) => write!(f, "{}", other),
        }
    }
}
