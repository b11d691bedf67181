//! Requests handed to the external cut and tag tools, and the process
//! runner that executes them.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;
use thiserror::Error;

use crate::timecode::Timecode;

pub const DEFAULT_CUT_PROGRAM: &str = "ffmpeg";
pub const DEFAULT_TAG_PROGRAM: &str = "eyeD3";

/// Failure of an external tool invocation.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started at all.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The program ran and exited unsuccessfully. Displays the captured
    /// standard error when there is any.
    #[error("{}", failure_message(.tool, .code, .stderr))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn failure_message(tool: &str, code: &Option<i32>, stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if !stderr.is_empty() {
        return stderr.to_owned();
    }
    match code {
        Some(code) => format!("{tool} exited with code {code}"),
        None => format!("{tool} was terminated by a signal"),
    }
}

/// A lossless cut of `[start, end)` from the source into `destination`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CutRequest {
    pub source: PathBuf,
    pub start: Timecode,
    /// `None` cuts through to the end of the source.
    pub end: Option<Timecode>,
    pub destination: PathBuf,
    /// Output container, derived from the destination's extension.
    pub format: Option<String>,
}

impl CutRequest {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        source: P,
        start: Timecode,
        end: Option<Timecode>,
        destination: Q,
    ) -> Self {
        let destination = destination.into();
        let format = destination
            .extension()
            .and_then(|ext| ext.to_str())
            .map(container_format);
        Self {
            source: source.into(),
            start,
            end,
            destination,
            format,
        }
    }

    /// Arguments for an ffmpeg-compatible cut tool. Audio is stream copied,
    /// video streams (cover art) are dropped.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-nostdin", "-y", "-loglevel", "error", "-ss"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(self.start.as_str().into());

        if let Some(end) = &self.end {
            args.push("-to".into());
            args.push(end.as_str().into());
        }

        args.push("-i".into());
        args.push(self.source.clone().into_os_string());
        args.extend(["-vn", "-c", "copy"].into_iter().map(OsString::from));

        if let Some(format) = &self.format {
            args.push("-f".into());
            args.push(format.into());
        }

        args.push(self.destination.clone().into_os_string());
        args
    }
}

/// Muxer name for an output file extension.
fn container_format(extension: &str) -> String {
    let extension = extension.to_ascii_lowercase();
    let muxer = match extension.as_str() {
        "m4a" | "m4b" => "ipod",
        "aac" => "adts",
        "mka" => "matroska",
        "wma" => "asf",
        "aif" | "aiff" => "aiff",
        _ => return extension,
    };
    muxer.to_owned()
}

/// Metadata to embed into an already cut track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagRequest {
    pub destination: PathBuf,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub number: usize,
    pub total: usize,
}

impl TagRequest {
    /// Arguments for an eyeD3-compatible tag tool. String values are quoted
    /// as-is without escaping; the album artist mirrors the artist.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            format!("--artist=\"{}\"", self.artist).into(),
            format!("--album-artist=\"{}\"", self.artist).into(),
            format!("--album=\"{}\"", self.album).into(),
            format!("--title=\"{}\"", self.title).into(),
            format!("--track={}", self.number).into(),
            format!("--track-total={}", self.total).into(),
        ];
        args.push(self.destination.clone().into_os_string());
        args
    }
}

/// The two operations a run needs from the outside world.
pub trait Collaborator {
    fn cut(&mut self, request: &CutRequest) -> Result<(), ProcessError>;

    fn tag(&mut self, request: &TagRequest) -> Result<(), ProcessError>;
}

/// Runs the cut and tag tools as child processes and waits for each.
#[derive(Clone, Debug)]
pub struct ExternalTools {
    cut_program: PathBuf,
    tag_program: PathBuf,
}

impl Default for ExternalTools {
    fn default() -> Self {
        Self::new(DEFAULT_CUT_PROGRAM, DEFAULT_TAG_PROGRAM)
    }
}

impl ExternalTools {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(cut_program: P, tag_program: Q) -> Self {
        Self {
            cut_program: cut_program.into(),
            tag_program: tag_program.into(),
        }
    }

    pub fn cut_program(&self) -> &Path {
        &self.cut_program
    }

    pub fn tag_program(&self) -> &Path {
        &self.tag_program
    }
}

impl Collaborator for ExternalTools {
    fn cut(&mut self, request: &CutRequest) -> Result<(), ProcessError> {
        execute(&self.cut_program, &request.args())
    }

    fn tag(&mut self, request: &TagRequest) -> Result<(), ProcessError> {
        execute(&self.tag_program, &request.args())
    }
}

fn execute(program: &Path, args: &[OsString]) -> Result<(), ProcessError> {
    let tool = program.to_string_lossy().into_owned();
    debug!("running {} {}", tool, display_args(args));

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ProcessError::Spawn {
            tool: tool.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ProcessError::Failed {
            tool,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(())
}

fn display_args(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
