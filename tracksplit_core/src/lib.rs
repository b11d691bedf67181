use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

pub mod timecode;
pub mod tools;
pub mod track;

pub use timecode::{
    parse_timecodes, parse_timecodes_file, Timecode, TimecodePair, TimecodeParseError, MAX_TRACKS,
};
pub use tools::{Collaborator, CutRequest, ExternalTools, ProcessError, TagRequest};
pub use track::{segment, source_extension, Track};

/// Errors that can occur while splitting a recording into tracks.
#[derive(Debug, Error)]
pub enum TrackSplitError {
    /// The source recording does not exist.
    #[error("audio file not found: {}", .0.display())]
    AudioFileNotFound(PathBuf),

    /// The timecode list does not exist.
    #[error("timecodes file not found: {}", .0.display())]
    TimecodesFileNotFound(PathBuf),

    /// The timecode list exists but could not be opened or read.
    #[error("cannot read timecodes file: {0}")]
    TimecodesUnreadable(#[source] io::Error),

    /// A non-blank line lacks the whitespace between time and title.
    #[error("invalid format on line {line}: {content:?}")]
    InvalidLineFormat { line: usize, content: String },

    /// The time token of a line is not a valid `HH:MM:SS` value.
    #[error("invalid timecode on line {line}: {token:?}")]
    InvalidTimecode { line: usize, token: String },

    /// A timecode does not come strictly after the one before it.
    #[error("timecode {current} on line {line} does not come after {previous}")]
    TimecodeNotIncreasing {
        line: usize,
        previous: String,
        current: String,
    },

    /// The timecode list holds no entries.
    #[error("no timecodes found")]
    NoTimecodesFound,

    /// The timecode list holds more entries than track numbering allows.
    #[error("too many tracks: {0} (maximum is {max})", max = MAX_TRACKS)]
    TooManyTracks(usize),

    /// A required configuration value was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// The `Artist/Album` directory could not be created.
    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cut or tag tool failed.
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Configuration for a single splitting run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Source recording to cut.
    pub audio_file: PathBuf,
    /// Timecode list describing the tracks.
    pub timecodes_file: PathBuf,
    pub artist: String,
    pub album: String,
    /// Root under which `Artist/Album` is created. Empty means the current
    /// directory, which keeps derived paths relative.
    pub output_dir: PathBuf,
}

/// Builder for [`Config`] allowing optional settings to be supplied.
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    audio_file: PathBuf,
    timecodes_file: PathBuf,
    artist: String,
    album: String,
    output_dir: PathBuf,
}

impl ConfigBuilder {
    fn new(audio_file: PathBuf, timecodes_file: PathBuf, artist: String, album: String) -> Self {
        Self {
            audio_file,
            timecodes_file,
            artist,
            album,
            output_dir: PathBuf::new(),
        }
    }

    /// Write `Artist/Album` below `dir` instead of the current directory.
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn build(self) -> Result<Config, TrackSplitError> {
        if self.artist.is_empty() {
            return Err(TrackSplitError::EmptyField("artist"));
        }
        if self.album.is_empty() {
            return Err(TrackSplitError::EmptyField("album"));
        }

        Ok(Config {
            audio_file: self.audio_file,
            timecodes_file: self.timecodes_file,
            artist: self.artist,
            album: self.album,
            output_dir: self.output_dir,
        })
    }
}

impl Config {
    /// Construct a new [`Config`] writing below the current directory.
    pub fn new<P, Q, A, B>(
        audio_file: P,
        timecodes_file: Q,
        artist: A,
        album: B,
    ) -> Result<Self, TrackSplitError>
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
        A: Into<String>,
        B: Into<String>,
    {
        Self::builder(audio_file, timecodes_file, artist, album).build()
    }

    /// Start building a [`Config`] with optional settings.
    pub fn builder<P, Q, A, B>(
        audio_file: P,
        timecodes_file: Q,
        artist: A,
        album: B,
    ) -> ConfigBuilder
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
        A: Into<String>,
        B: Into<String>,
    {
        ConfigBuilder::new(
            audio_file.into(),
            timecodes_file.into(),
            artist.into(),
            album.into(),
        )
    }

    /// Directory that receives every track of the run.
    pub fn album_dir(&self) -> PathBuf {
        self.output_dir.join(&self.artist).join(&self.album)
    }
}

/// A track together with the tool requests derived from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedTrack {
    pub track: Track,
    pub cut: CutRequest,
    pub tag: TagRequest,
}

impl PlannedTrack {
    pub fn output_path(&self) -> &Path {
        &self.cut.destination
    }
}

/// Progress notifications emitted while a run advances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Emitted once the tracks are known and the directory exists.
    Start { total: usize },
    /// Emitted before a track is cut.
    Track {
        number: usize,
        total: usize,
        path: PathBuf,
    },
    /// Emitted after the last track has been tagged.
    Finish,
}

/// Validate the inputs and derive every track without touching the
/// filesystem or running any tool.
pub fn plan_tracks(config: &Config) -> Result<Vec<PlannedTrack>, TrackSplitError> {
    if !config.audio_file.exists() {
        return Err(TrackSplitError::AudioFileNotFound(config.audio_file.clone()));
    }
    if !config.timecodes_file.exists() {
        return Err(TrackSplitError::TimecodesFileNotFound(
            config.timecodes_file.clone(),
        ));
    }

    let pairs = parse_timecodes_file(&config.timecodes_file)?;
    debug!(
        "parsed {} timecodes from '{}'",
        pairs.len(),
        config.timecodes_file.display()
    );

    let plan = segment(pairs, &config.artist, &config.album)
        .into_iter()
        .map(|track| PlannedTrack {
            cut: track.cut_request(&config.audio_file, &config.output_dir),
            tag: track.tag_request(&config.audio_file, &config.output_dir),
            track,
        })
        .collect();

    Ok(plan)
}

/// Split the recording described by `config`, cutting and tagging each track
/// through `collaborator`.
pub fn run<C: Collaborator>(config: Config, collaborator: &mut C) -> Result<(), TrackSplitError> {
    run_with_progress(config, collaborator, |_| {})
}

/// Split the recording while reporting progress through `on_event`.
///
/// Tracks are processed in order and the run stops at the first failing
/// tool invocation. Files produced before the failure are left in place.
pub fn run_with_progress<C, F>(
    config: Config,
    collaborator: &mut C,
    mut on_event: F,
) -> Result<(), TrackSplitError>
where
    C: Collaborator,
    F: FnMut(ProgressEvent),
{
    let plan = plan_tracks(&config)?;

    let album_dir = config.album_dir();
    fs::create_dir_all(&album_dir).map_err(|source| TrackSplitError::CreateDirectory {
        path: album_dir.clone(),
        source,
    })?;

    on_event(ProgressEvent::Start { total: plan.len() });

    for planned in &plan {
        let track = &planned.track;
        info!(
            "processing track {}/{}: '{}'",
            track.number,
            track.total,
            planned.output_path().display()
        );
        on_event(ProgressEvent::Track {
            number: track.number,
            total: track.total,
            path: planned.output_path().to_path_buf(),
        });

        collaborator.cut(&planned.cut)?;
        collaborator.tag(&planned.tag)?;
    }

    on_event(ProgressEvent::Finish);
    Ok(())
}
