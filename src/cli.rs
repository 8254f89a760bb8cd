// Minfo CLI binary
//
// Prints derived properties and raw keys for each file:
//
//   minfo EXAMPLE.MOV -p focal_length,iso -k "Focus Mode"
//   EXAMPLE.MOV
//           focal_length: 80.0 mm
//           iso: 100
//           Focus Mode: Manual

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use serde_json::{Map, Value};

use minfo::constants::DEFAULT_STREAM_INDEX;
use minfo::{CommandTemplate, DisplayValue, LookupKeys, MetadataRecord, Property, ToolConfig};

#[derive(Parser)]
#[command(name = "minfo")]
#[command(about = "Minfo - media metadata from exiftool and ffprobe", long_about = None)]
#[command(version)]
struct Cli {
    /// Media files to inspect
    files: Vec<PathBuf>,

    /// Derived properties to print, comma-separated (e.g. focal_length,iso)
    #[arg(short, long, value_delimiter = ',')]
    property: Vec<String>,

    /// Raw keys to print, comma-separated; exiftool first, then the stream
    #[arg(short, long, value_delimiter = ',')]
    key: Vec<String>,

    /// Stream consulted for raw keys
    #[arg(short, long, default_value_t = DEFAULT_STREAM_INDEX)]
    stream_index: usize,

    /// Print each record as JSON
    #[arg(long)]
    json: bool,

    /// List known property names and exit
    #[arg(long)]
    list_properties: bool,

    /// ffprobe command template, `{}` marks the file path
    #[arg(long, value_name = "TEMPLATE")]
    ffprobe_cmd: Option<String>,

    /// exiftool command template, `{}` marks the file path
    #[arg(long, value_name = "TEMPLATE")]
    exiftool_cmd: Option<String>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_properties {
        for p in Property::ALL {
            println!("{}", p);
        }
        return Ok(());
    }

    if cli.files.is_empty() {
        return Ok(());
    }

    let config = resolve_config(cli.ffprobe_cmd.as_deref(), cli.exiftool_cmd.as_deref())?;
    let properties = parse_properties(&cli.property);
    let keys: Vec<&str> = non_empty(&cli.key).collect();

    let mut failed = 0;
    for file in &cli.files {
        let record = match MetadataRecord::open_with(file, &config) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to read metadata for {}: {}", file.display(), e);
                failed += 1;
                continue;
            }
        };

        if cli.json {
            let doc = record_json(&record, &properties, &keys, cli.stream_index)
                .with_context(|| format!("Failed to serialize {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        } else {
            print_record(&record, &properties, &keys, cli.stream_index);
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files failed", failed, cli.files.len());
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // RUST_LOG still wins when set
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Env-resolved templates, with command-line templates taking precedence.
fn resolve_config(ffprobe_cmd: Option<&str>, exiftool_cmd: Option<&str>) -> Result<ToolConfig> {
    let mut config = ToolConfig::from_env().context("Invalid tool configuration")?;
    if let Some(cmd) = ffprobe_cmd {
        config.ffprobe = CommandTemplate::parse(cmd).context("Invalid --ffprobe-cmd")?;
    }
    if let Some(cmd) = exiftool_cmd {
        config.exiftool = CommandTemplate::parse(cmd).context("Invalid --exiftool-cmd")?;
    }
    log::debug!("ffprobe: {}", config.ffprobe);
    log::debug!("exiftool: {}", config.exiftool);
    Ok(config)
}

/// Unknown names are skipped, not fatal.
fn parse_properties(names: &[String]) -> Vec<Property> {
    non_empty(names)
        .filter_map(|name| match name.parse::<Property>() {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        })
        .collect()
}

fn non_empty(items: &[String]) -> impl Iterator<Item = &str> {
    items.iter().map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn print_record(record: &MetadataRecord, properties: &[Property], keys: &[&str], stream_index: usize) {
    println!("{}", record.path().display());

    for &p in properties {
        match record.property(p) {
            Some(value) => println!("\t{}: {}", p, value),
            None => println!("\t{}: {}", p, DisplayValue(None)),
        }
    }

    for key in keys {
        let value = record.find_data_at(LookupKeys::both(key), stream_index);
        println!("\t{}: {}", key, DisplayValue(value));
    }
}

fn record_json(
    record: &MetadataRecord,
    properties: &[Property],
    keys: &[&str],
    stream_index: usize,
) -> Result<Value> {
    let mut doc = serde_json::to_value(record)?;

    let mut props = Map::new();
    for &p in properties {
        props.insert(p.name().to_string(), serde_json::to_value(record.property(p))?);
    }

    let mut raw = Map::new();
    for key in keys {
        let value = record.find_data_at(LookupKeys::both(key), stream_index);
        raw.insert(key.to_string(), value.cloned().unwrap_or(Value::Null));
    }

    if let Some(obj) = doc.as_object_mut() {
        obj.insert("properties".to_string(), Value::Object(props));
        obj.insert("keys".to_string(), Value::Object(raw));
    }
    Ok(doc)
}
