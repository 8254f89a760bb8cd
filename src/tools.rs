// External tool resolver and command templates for ffprobe/exiftool
//
// Resolution order for tool binaries:
// 1) Environment variable override (MINFO_FFPROBE_PATH, etc.)
// 2) Sidecar next to the executable
// 3) bin/ folder next to the executable
// 4) PATH fallback
//
// Invocation captures stdout only. The exit status is never checked: a tool
// that fails quietly yields empty or partial text and the parsers downstream
// turn that into absent values.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::constants::{
    ENV_EXIFTOOL_COMMAND, ENV_EXIFTOOL_PATH, ENV_FFPROBE_COMMAND, ENV_FFPROBE_PATH,
    EXIFTOOL_DEFAULT_ARGS, EXIFTOOL_NAME, FFPROBE_DEFAULT_ARGS, FFPROBE_NAME, PATH_SLOT,
};
use crate::error::{MinfoError, Result};

/// Get the directory containing the current executable
fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
}

/// Resolve a tool binary path.
fn resolve_tool(env_key: &str, default_name: &str) -> PathBuf {
    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
        log::warn!("{} points to missing file {}, ignoring", env_key, v);
    }

    let mut filename = default_name.to_string();
    if cfg!(windows) && !filename.to_lowercase().ends_with(".exe") {
        filename.push_str(".exe");
    }

    if let Some(dir) = exe_dir() {
        let candidate = dir.join(&filename);
        if candidate.exists() {
            return candidate;
        }

        let bin_candidate = dir.join("bin").join(&filename);
        if bin_candidate.exists() {
            return bin_candidate;
        }
    }

    PathBuf::from(default_name)
}

/// Get path to ffprobe binary
pub fn ffprobe_path() -> PathBuf {
    resolve_tool(ENV_FFPROBE_PATH, FFPROBE_NAME)
}

/// Get path to exiftool binary
pub fn exiftool_path() -> PathBuf {
    resolve_tool(ENV_EXIFTOOL_PATH, EXIFTOOL_NAME)
}

/// Check if a tool can be started. Known tools go through the resolver,
/// anything else is looked up on PATH.
pub fn is_tool_available(tool: &str) -> bool {
    let (path, probe_arg) = match tool {
        FFPROBE_NAME => (ffprobe_path(), "-version"),
        EXIFTOOL_NAME => (exiftool_path(), "-ver"),
        "sox" => (PathBuf::from(tool), "--version"),
        _ => (PathBuf::from(tool), "-version"),
    };

    if path.is_absolute() && path.exists() {
        return true;
    }

    Command::new(&path)
        .arg(probe_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// A program plus arguments, one of which carries the `{}` path slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandTemplate {
    /// Build a template from a resolved program and an argument string.
    pub fn new(program: impl Into<PathBuf>, args: &str) -> Result<Self> {
        let template = CommandTemplate {
            program: program.into(),
            args: split_words(args)?,
        };
        template.check_slot()?;
        Ok(template)
    }

    /// Parse a full command line such as `exiftool "{}"`.
    pub fn parse(command: &str) -> Result<Self> {
        let mut words = split_words(command)?.into_iter();
        let program = words
            .next()
            .ok_or_else(|| MinfoError::InvalidTemplate("empty command".to_string()))?;
        let template = CommandTemplate {
            program: PathBuf::from(program),
            args: words.collect(),
        };
        template.check_slot()?;
        Ok(template)
    }

    /// Default ffprobe invocation (JSON with format, streams, programs, chapters).
    pub fn ffprobe() -> Result<Self> {
        Self::new(ffprobe_path(), FFPROBE_DEFAULT_ARGS)
    }

    /// Default exiftool invocation (human-readable `Key : Value` lines).
    pub fn exiftool() -> Result<Self> {
        Self::new(exiftool_path(), EXIFTOOL_DEFAULT_ARGS)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments with the path slot filled in.
    pub fn args_for(&self, path: &Path) -> Vec<OsString> {
        self.args.iter().map(|a| substitute(a, path)).collect()
    }

    /// Run the command against `path` and return everything it wrote to stdout.
    pub fn run(&self, path: &Path) -> Result<String> {
        log::debug!("Running {} on {}", self, path.display());

        let output = Command::new(&self.program)
            .args(self.args_for(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()?;

        log::debug!(
            "{} exited with {:?}, {} bytes of output",
            self.program.display(),
            output.status.code(),
            output.stdout.len()
        );

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn check_slot(&self) -> Result<()> {
        let slots: usize = self.args.iter().map(|a| a.matches(PATH_SLOT).count()).sum();
        if slots != 1 {
            return Err(MinfoError::InvalidTemplate(format!(
                "expected exactly one {} slot in `{}`, found {}",
                PATH_SLOT, self, slots
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// The pair of commands a metadata record is built from.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub ffprobe: CommandTemplate,
    pub exiftool: CommandTemplate,
}

impl ToolConfig {
    /// Resolve both templates, honoring `MINFO_*_COMMAND` overrides.
    pub fn from_env() -> Result<Self> {
        let ffprobe = match env::var(ENV_FFPROBE_COMMAND) {
            Ok(cmd) => CommandTemplate::parse(&cmd)?,
            Err(_) => CommandTemplate::ffprobe()?,
        };
        let exiftool = match env::var(ENV_EXIFTOOL_COMMAND) {
            Ok(cmd) => CommandTemplate::parse(&cmd)?,
            Err(_) => CommandTemplate::exiftool()?,
        };
        Ok(ToolConfig { ffprobe, exiftool })
    }
}

fn substitute(arg: &str, path: &Path) -> OsString {
    match arg.split_once(PATH_SLOT) {
        Some((before, after)) => {
            let mut s = OsString::from(before);
            s.push(path.as_os_str());
            s.push(after);
            s
        }
        None => OsString::from(arg),
    }
}

/// Split on whitespace; single or double quotes group words (no escapes).
fn split_words(input: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    in_word = true;
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if let Some(q) = quote {
        return Err(MinfoError::InvalidTemplate(format!(
            "unbalanced {} in `{}`",
            q, input
        )));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
