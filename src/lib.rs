//! Minfo - media metadata from exiftool and ffprobe
//!
//! ```no_run
//! use minfo::MetadataRecord;
//!
//! let record = MetadataRecord::open("EXAMPLE.MOV")?;
//! println!("{:?}", record.focal_length());
//! println!("{:?}", record.exif_value("Focus Mode"));
//! println!("{:?}", record.stream_value(0, "r_frame_rate"));
//! # Ok::<(), minfo::MinfoError>(())
//! ```

pub mod constants;
pub mod error;
pub mod tools;
pub mod metadata;

pub use error::{MinfoError, Result};
pub use metadata::{
    DisplayValue, ExifEntry, LookupKeys, MetadataRecord, Property, PropertyValue, Resolution,
};
pub use tools::{CommandTemplate, ToolConfig};
