// Metadata record: exiftool tags and ffprobe streams behind one lookup

pub mod exiftool;
pub mod ffprobe;
pub mod property;

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::constants::{
    DEFAULT_STREAM_INDEX, DURATION_UNIT_SUFFIX, KEY_DURATION, KEY_FPS, KEY_HEIGHT, KEY_WIDTH,
    TAG_APERTURE, TAG_CAMERA_LENS, TAG_CAMERA_MODEL, TAG_COLOR_TEMP, TAG_FOCAL_LENGTH, TAG_ISO,
    TAG_SHUTTER_SPEED, TAG_WHITE_BALANCE,
};
use crate::error::Result;
use crate::tools::ToolConfig;

pub use exiftool::ExifEntry;
pub use ffprobe::{FormatDescriptor, ProbeOutput, StreamDescriptor};
pub use property::{DisplayValue, Property, PropertyValue, Resolution};

/// Candidate keys for one logical fact: the exiftool tag name and the
/// ffprobe stream field. Either side may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupKeys<'a> {
    pub exif: Option<&'a str>,
    pub stream: Option<&'a str>,
}

impl<'a> LookupKeys<'a> {
    pub fn new(exif: &'a str, stream: &'a str) -> Self {
        LookupKeys {
            exif: Some(exif),
            stream: Some(stream),
        }
    }

    pub fn exif_only(exif: &'a str) -> Self {
        LookupKeys {
            exif: Some(exif),
            stream: None,
        }
    }

    pub fn stream_only(stream: &'a str) -> Self {
        LookupKeys {
            exif: None,
            stream: Some(stream),
        }
    }

    /// Same literal name in both tiers.
    pub fn both(key: &'a str) -> Self {
        Self::new(key, key)
    }
}

impl<'a> From<(&'a str, &'a str)> for LookupKeys<'a> {
    fn from((exif, stream): (&'a str, &'a str)) -> Self {
        Self::new(exif, stream)
    }
}

/// Everything known about one media file. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataRecord {
    path: PathBuf,
    exif: Vec<ExifEntry>,
    streams: Vec<StreamDescriptor>,
    format: FormatDescriptor,
}

impl MetadataRecord {
    /// Run both tools with the environment-resolved configuration.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let config = ToolConfig::from_env()?;
        Self::open_with(path, &config)
    }

    /// Run both tools against `path`. exiftool output is taken as-is; an
    /// ffprobe result that is not JSON fails the whole record.
    pub fn open_with(path: impl Into<PathBuf>, config: &ToolConfig) -> Result<Self> {
        let path = path.into();
        let exif = exiftool::extract(&config.exiftool, &path)?;
        let probe = ffprobe::probe(&config.ffprobe, &path)?;
        Ok(Self::from_parts(path, exif, probe))
    }

    /// Build from tool output captured elsewhere.
    pub fn from_outputs(path: impl Into<PathBuf>, exif_text: &str, probe_json: &str) -> Result<Self> {
        let probe = ffprobe::parse(probe_json)?;
        Ok(Self::from_parts(path.into(), exiftool::parse(exif_text), probe))
    }

    pub fn from_parts(path: PathBuf, exif: Vec<ExifEntry>, probe: ProbeOutput) -> Self {
        MetadataRecord {
            path,
            exif,
            streams: probe.streams,
            format: probe.format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exif(&self) -> &[ExifEntry] {
        &self.exif
    }

    pub fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    pub fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    /// First exiftool entry with this key.
    pub fn exif_value(&self, key: &str) -> Option<&Value> {
        self.exif.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    pub fn stream(&self, index: usize) -> Option<&StreamDescriptor> {
        self.streams.get(index)
    }

    /// Field of the stream at `index`. A missing stream or a `null` field
    /// is just no data.
    pub fn stream_value(&self, index: usize, key: &str) -> Option<&Value> {
        self.stream(index)
            .and_then(|s| s.get(key))
            .filter(|v| !v.is_null())
    }

    pub fn format_value(&self, key: &str) -> Option<&Value> {
        self.format.get(key)
    }

    /// Look up a fact in the default stream. See [`Self::find_data_at`].
    pub fn find_data<'k>(&self, keys: impl Into<LookupKeys<'k>>) -> Option<&Value> {
        self.find_data_at(keys, DEFAULT_STREAM_INDEX)
    }

    /// EXIF wins over the stream whenever it has the key.
    pub fn find_data_at<'k>(
        &self,
        keys: impl Into<LookupKeys<'k>>,
        stream_index: usize,
    ) -> Option<&Value> {
        let keys = keys.into();
        keys.exif
            .and_then(|k| self.exif_value(k))
            .or_else(|| keys.stream.and_then(|k| self.stream_value(stream_index, k)))
    }

    /// Width and height. Absent only when neither side is known.
    pub fn resolution(&self) -> Option<Resolution> {
        let width = self.find_data(KEY_WIDTH).cloned();
        let height = self.find_data(KEY_HEIGHT).cloned();
        if width.is_none() && height.is_none() {
            return None;
        }
        Some(Resolution { width, height })
    }

    /// Frame rate as reported: a number from exiftool, or ffprobe's
    /// rational string such as `"30/1"` or `"0/0"`.
    pub fn fps(&self) -> Option<&Value> {
        self.find_data(KEY_FPS)
    }

    /// Duration in seconds when reported with a `s` suffix; otherwise the
    /// value is handed back exactly as the tool printed it.
    pub fn duration(&self) -> Option<Value> {
        self.find_data(KEY_DURATION).map(strip_seconds_suffix)
    }

    pub fn camera_model(&self) -> Option<&Value> {
        self.exif_value(TAG_CAMERA_MODEL)
    }

    pub fn camera_lens(&self) -> Option<&Value> {
        self.exif_value(TAG_CAMERA_LENS)
    }

    pub fn aperture(&self) -> Option<&Value> {
        self.exif_value(TAG_APERTURE)
    }

    pub fn focal_length(&self) -> Option<&Value> {
        self.exif_value(TAG_FOCAL_LENGTH)
    }

    pub fn iso(&self) -> Option<&Value> {
        self.exif_value(TAG_ISO)
    }

    pub fn shutter_speed(&self) -> Option<&Value> {
        self.exif_value(TAG_SHUTTER_SPEED)
    }

    pub fn color_temp(&self) -> Option<&Value> {
        self.exif_value(TAG_COLOR_TEMP)
    }

    pub fn white_balance(&self) -> Option<&Value> {
        self.exif_value(TAG_WHITE_BALANCE)
    }

    /// Derived property by name.
    pub fn property(&self, property: Property) -> Option<PropertyValue> {
        let scalar = |v: Option<&Value>| v.cloned().map(PropertyValue::Scalar);
        match property {
            Property::Resolution => self.resolution().map(PropertyValue::Pair),
            Property::Fps => scalar(self.fps()),
            Property::Duration => self.duration().map(PropertyValue::Scalar),
            Property::CameraModel => scalar(self.camera_model()),
            Property::CameraLens => scalar(self.camera_lens()),
            Property::Aperture => scalar(self.aperture()),
            Property::FocalLength => scalar(self.focal_length()),
            Property::Iso => scalar(self.iso()),
            Property::ShutterSpeed => scalar(self.shutter_speed()),
            Property::ColorTemp => scalar(self.color_temp()),
            Property::WhiteBalance => scalar(self.white_balance()),
        }
    }
}

/// `"10.02 s"` -> `10.02`. Anything else passes through.
fn strip_seconds_suffix(value: &Value) -> Value {
    value
        .as_str()
        .and_then(|s| s.strip_suffix(DURATION_UNIT_SUFFIX))
        .and_then(|s| s.trim().parse::<f64>().ok())
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MOV_EXIF: &str = "\
ExifTool Version Number         : 11.88
File Name                       : clip.mov
File Type                       : MOV
Duration                        : 10.02 s
Image Width                     : 1280
Image Height                    : 720
Source Image Width              : 1280
Source Image Height             : 720
Video Frame Rate                : 30
Focus Mode                      : Manual
";

    const MOV_PROBE: &str = r#"{
        "programs": [],
        "streams": [
            {"index": 0, "codec_type": "video", "width": 1280, "height": 720,
             "r_frame_rate": "30/1", "duration": "10.000000"},
            {"index": 1, "codec_type": "audio", "r_frame_rate": "0/0",
             "duration": "10.020000"}
        ],
        "chapters": [],
        "format": {"filename": "clip.mov", "duration": "10.020000", "bit_rate": "1594532"}
    }"#;

    const WAV_EXIF: &str = "\
File Name                       : tone.wav
Encoding                        : Microsoft PCM
Num Channels                    : 2
Sample Rate                     : 48000
Duration                        : 10.00 s
";

    const WAV_PROBE: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "audio", "sample_rate": "48000",
             "r_frame_rate": "0/0", "duration": "10.000000"}
        ],
        "format": {"filename": "tone.wav", "duration": "10.000000"}
    }"#;

    fn mov() -> MetadataRecord {
        MetadataRecord::from_outputs("clip.mov", MOV_EXIF, MOV_PROBE).unwrap()
    }

    fn wav() -> MetadataRecord {
        MetadataRecord::from_outputs("tone.wav", WAV_EXIF, WAV_PROBE).unwrap()
    }

    #[test]
    fn test_movie_properties() {
        let m = mov();
        assert_eq!(
            m.resolution(),
            Some(Resolution {
                width: Some(json!(1280)),
                height: Some(json!(720)),
            })
        );
        assert_eq!(m.fps(), Some(&json!(30)));
        assert_eq!(m.duration(), Some(json!(10.02)));
    }

    #[test]
    fn test_audio_properties() {
        let w = wav();
        assert_eq!(w.resolution(), None);
        assert_eq!(w.fps(), Some(&json!("0/0")));
        assert_eq!(w.duration(), Some(json!(10.0)));
    }

    #[test]
    fn test_duration_is_idempotent() {
        let w = wav();
        let first = w.duration();
        let second = w.duration();
        assert_eq!(first, second);
        assert_eq!(w.property(Property::Duration), w.property(Property::Duration));
    }

    #[test]
    fn test_exif_wins_over_stream() {
        let r = MetadataRecord::from_outputs(
            "a.mov",
            "Source Image Width : 3840\n",
            r#"{"streams": [{"width": 1920, "height": 1080}], "format": {}}"#,
        )
        .unwrap();
        let res = r.resolution().unwrap();
        assert_eq!(res.width, Some(json!(3840)));
        assert_eq!(res.height, Some(json!(1080)));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let r = MetadataRecord::from_outputs(
            "a.mov",
            "ISO : 100\nISO : 400\n",
            r#"{"streams": [], "format": {}}"#,
        )
        .unwrap();
        assert_eq!(r.iso(), Some(&json!(100)));
        assert_eq!(r.exif().len(), 2);
    }

    #[test]
    fn test_missing_stream_index_is_absent() {
        let w = wav();
        assert_eq!(w.find_data_at(LookupKeys::stream_only("codec_type"), 5), None);
        assert_eq!(w.stream(1), None);

        let empty = MetadataRecord::from_outputs("x", "", r#"{"streams": [], "format": {}}"#).unwrap();
        assert_eq!(empty.fps(), None);
        assert_eq!(empty.resolution(), None);
        assert_eq!(empty.duration(), None);
    }

    #[test]
    fn test_lookup_at_stream_index() {
        let m = mov();
        assert_eq!(
            m.find_data_at(LookupKeys::stream_only("codec_type"), 1),
            Some(&json!("audio"))
        );
        assert_eq!(m.find_data(LookupKeys::both("Focus Mode")), Some(&json!("Manual")));
        assert_eq!(m.find_data(LookupKeys::both("codec_type")), Some(&json!("video")));
    }

    #[test]
    fn test_exif_only_keys_skip_streams() {
        let r = MetadataRecord::from_outputs(
            "a.mov",
            "",
            r#"{"streams": [{"ISO": 800}], "format": {}}"#,
        )
        .unwrap();
        assert_eq!(r.iso(), None);
        assert_eq!(r.find_data(LookupKeys::exif_only("ISO")), None);
        assert_eq!(r.find_data(LookupKeys::both("ISO")), Some(&json!(800)));
    }

    #[test]
    fn test_partial_resolution_is_a_pair() {
        let r = MetadataRecord::from_outputs(
            "a.mov",
            "",
            r#"{"streams": [{"width": 640}], "format": {}}"#,
        )
        .unwrap();
        assert_eq!(
            r.resolution(),
            Some(Resolution {
                width: Some(json!(640)),
                height: None,
            })
        );
    }

    #[test]
    fn test_null_stream_fields_are_absent() {
        let r = MetadataRecord::from_outputs(
            "a.mov",
            "",
            r#"{"streams": [{"width": null, "height": null, "duration": null}], "format": {}}"#,
        )
        .unwrap();
        assert_eq!(r.stream_value(0, "width"), None);
        assert_eq!(r.find_data(KEY_WIDTH), None);
        assert_eq!(r.resolution(), None);
        assert_eq!(r.duration(), None);
        assert_eq!(r.property(Property::Resolution), None);
    }

    #[test]
    fn test_null_height_keeps_partial_pair() {
        let r = MetadataRecord::from_outputs(
            "a.mov",
            "",
            r#"{"streams": [{"width": 640, "height": null}], "format": {}}"#,
        )
        .unwrap();
        assert_eq!(
            r.resolution(),
            Some(Resolution {
                width: Some(json!(640)),
                height: None,
            })
        );
    }

    #[test]
    fn test_duration_without_suffix_passes_through() {
        let from_stream = MetadataRecord::from_outputs(
            "a.mkv",
            "",
            r#"{"streams": [{"duration": "10.000000"}], "format": {}}"#,
        )
        .unwrap();
        assert_eq!(from_stream.duration(), Some(json!("10.000000")));

        let clock = MetadataRecord::from_outputs(
            "b.mov",
            "Duration : 0:01:30\n",
            r#"{"streams": [], "format": {}}"#,
        )
        .unwrap();
        assert_eq!(clock.duration(), Some(json!("0:01:30")));

        let numeric = MetadataRecord::from_outputs("c.mov", "Duration : 12\n", "{}").unwrap();
        assert_eq!(numeric.duration(), Some(json!(12)));
    }

    #[test]
    fn test_duration_suffix_not_a_number() {
        let r = MetadataRecord::from_outputs("a.mov", "Duration : hours\n", "{}").unwrap();
        assert_eq!(r.duration(), Some(json!("hours")));
    }

    #[test]
    fn test_camera_properties() {
        let r = MetadataRecord::from_outputs(
            "EXAMPLE.MOV",
            "Camera Model Name : ILCE-7SM2\n\
             Lens Type : E-Mount\n\
             Aperture : 2.8\n\
             Focal Length : 80.0 mm\n\
             ISO : 100\n\
             Shutter Speed : 1/60\n\
             Color Temp Kelvin : 5600\n\
             White Balance : Daylight\n",
            "{}",
        )
        .unwrap();

        assert_eq!(r.camera_model(), Some(&json!("ILCE-7SM2")));
        assert_eq!(r.camera_lens(), Some(&json!("E-Mount")));
        assert_eq!(r.aperture(), Some(&json!(2.8)));
        assert_eq!(r.focal_length(), Some(&json!("80.0 mm")));
        assert_eq!(r.iso(), Some(&json!(100)));
        assert_eq!(r.shutter_speed(), Some(&json!("1/60")));
        assert_eq!(r.color_temp(), Some(&json!(5600)));
        assert_eq!(r.white_balance(), Some(&json!("Daylight")));
    }

    #[test]
    fn test_property_dispatch() {
        let m = mov();
        assert_eq!(
            m.property(Property::Resolution).unwrap().to_string(),
            "(1280, 720)"
        );
        assert_eq!(m.property(Property::Fps).unwrap().to_string(), "30");
        assert_eq!(m.property(Property::Duration).unwrap().to_string(), "10.02");
        assert_eq!(m.property(Property::Iso), None);
    }

    #[test]
    fn test_format_and_accessors() {
        let m = mov();
        assert_eq!(m.path(), Path::new("clip.mov"));
        assert_eq!(m.streams().len(), 2);
        assert_eq!(m.format_value("bit_rate"), Some(&json!("1594532")));
        assert_eq!(m.stream_value(0, "width"), Some(&json!(1280)));
    }

    #[test]
    fn test_malformed_probe_fails_record() {
        assert!(MetadataRecord::from_outputs("a.mov", MOV_EXIF, "not json").is_err());
    }

    #[test]
    fn test_serializes_fixed_shape() {
        let value = serde_json::to_value(wav()).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["exif", "format", "path", "streams"]);
        assert_eq!(obj["exif"][0], json!({"key": "File Name", "value": "tone.wav"}));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_with_runs_both_tools() {
        use crate::tools::{CommandTemplate, ToolConfig};

        let dir = tempfile::TempDir::new().unwrap();
        let media = dir.path().join("clip.mov");
        std::fs::write(&media, MOV_EXIF).unwrap();
        std::fs::write(dir.path().join("clip.mov.json"), MOV_PROBE).unwrap();

        let config = ToolConfig {
            exiftool: CommandTemplate::parse("cat {}").unwrap(),
            ffprobe: CommandTemplate::parse("cat {}.json").unwrap(),
        };
        let record = MetadataRecord::open_with(&media, &config).unwrap();
        assert_eq!(record.path(), media.as_path());
        assert_eq!(record.fps(), Some(&json!(30)));
        assert_eq!(record.duration(), Some(json!(10.02)));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_with_silent_probe_failure_is_parse_error() {
        use crate::error::MinfoError;
        use crate::tools::{CommandTemplate, ToolConfig};

        let dir = tempfile::TempDir::new().unwrap();
        let media = dir.path().join("clip.mov");
        std::fs::write(&media, MOV_EXIF).unwrap();

        // no clip.mov.json: cat prints nothing and exits non-zero
        let config = ToolConfig {
            exiftool: CommandTemplate::parse("cat {}").unwrap(),
            ffprobe: CommandTemplate::parse("cat {}.json").unwrap(),
        };
        assert!(matches!(
            MetadataRecord::open_with(&media, &config),
            Err(MinfoError::Json(_))
        ));
    }
}
