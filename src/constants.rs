// Minfo Constants

// Path slot substituted in command templates
pub const PATH_SLOT: &str = "{}";

// Default tool arguments
pub const FFPROBE_DEFAULT_ARGS: &str =
    "-v quiet -print_format json -show_format -show_streams -show_programs -show_chapters {}";
pub const EXIFTOOL_DEFAULT_ARGS: &str = "{}";

// Tool names (resolved on PATH when no override exists)
pub const FFPROBE_NAME: &str = "ffprobe";
pub const EXIFTOOL_NAME: &str = "exiftool";

// Environment overrides
pub const ENV_FFPROBE_PATH: &str = "MINFO_FFPROBE_PATH";
pub const ENV_EXIFTOOL_PATH: &str = "MINFO_EXIFTOOL_PATH";
pub const ENV_FFPROBE_COMMAND: &str = "MINFO_FFPROBE_COMMAND";
pub const ENV_EXIFTOOL_COMMAND: &str = "MINFO_EXIFTOOL_COMMAND";

// Lookup keys: (exiftool tag name, ffprobe stream field)
pub const KEY_WIDTH: (&str, &str) = ("Source Image Width", "width");
pub const KEY_HEIGHT: (&str, &str) = ("Source Image Height", "height");
pub const KEY_FPS: (&str, &str) = ("Video Frame Rate", "r_frame_rate");
pub const KEY_DURATION: (&str, &str) = ("Duration", "duration");

// EXIF-only tags
pub const TAG_CAMERA_MODEL: &str = "Camera Model Name";
pub const TAG_CAMERA_LENS: &str = "Lens Type";
pub const TAG_APERTURE: &str = "Aperture";
pub const TAG_FOCAL_LENGTH: &str = "Focal Length";
pub const TAG_ISO: &str = "ISO";
pub const TAG_SHUTTER_SPEED: &str = "Shutter Speed";
pub const TAG_COLOR_TEMP: &str = "Color Temp Kelvin";
pub const TAG_WHITE_BALANCE: &str = "White Balance";

// Suffix exiftool appends to durations in seconds
pub const DURATION_UNIT_SUFFIX: char = 's';

// Stream consulted by derived properties
pub const DEFAULT_STREAM_INDEX: usize = 0;

// CLI placeholder for absent values
pub const ABSENT_DISPLAY: &str = "-";
