use std::path::{Path, PathBuf};

use crate::timecode::{Timecode, TimecodePair};
use crate::tools::{CutRequest, TagRequest};

/// Track counts above this use three-digit track numbers in file names.
const TWO_DIGIT_LIMIT: usize = 99;

/// One output segment of the source recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    /// 1-based position within the run.
    pub number: usize,
    /// Number of tracks in the run.
    pub total: usize,
    pub title: String,
    pub start: Timecode,
    /// `None` on the last track, which runs to the end of the source.
    pub end: Option<Timecode>,
    pub artist: String,
    pub album: String,
}

/// Turn ordered timecode pairs into contiguous tracks.
///
/// Every track ends where the next one starts; the last track has no end.
pub fn segment(pairs: Vec<TimecodePair>, artist: &str, album: &str) -> Vec<Track> {
    let total = pairs.len();
    let ends: Vec<Option<Timecode>> = pairs
        .iter()
        .skip(1)
        .map(|next| Some(next.time.clone()))
        .chain(std::iter::once(None))
        .collect();

    pairs
        .into_iter()
        .zip(ends)
        .enumerate()
        .map(|(index, (pair, end))| Track {
            number: index + 1,
            total,
            title: pair.title,
            start: pair.time,
            end,
            artist: artist.to_owned(),
            album: album.to_owned(),
        })
        .collect()
}

/// Extension of `source` including its leading dot, or an empty string.
pub fn source_extension(source: &Path) -> String {
    source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

impl Track {
    fn pad_width(&self) -> usize {
        if self.total > TWO_DIGIT_LIMIT {
            3
        } else {
            2
        }
    }

    /// File name of the form `NN - Title.ext`.
    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "{:0width$} - {}{extension}",
            self.number,
            self.title,
            width = self.pad_width()
        )
    }

    /// Directory holding every track of the run: `root/artist/album`.
    pub fn album_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.artist).join(&self.album)
    }

    /// Destination of this track when cutting `source` under `root`.
    pub fn output_path(&self, root: &Path, source: &Path) -> PathBuf {
        self.album_dir(root)
            .join(self.file_name(&source_extension(source)))
    }

    pub fn cut_request(&self, source: &Path, root: &Path) -> CutRequest {
        CutRequest::new(
            source,
            self.start.clone(),
            self.end.clone(),
            self.output_path(root, source),
        )
    }

    pub fn tag_request(&self, source: &Path, root: &Path) -> TagRequest {
        TagRequest {
            destination: self.output_path(root, source),
            artist: self.artist.clone(),
            album: self.album.clone(),
            title: self.title.clone(),
            number: self.number,
            total: self.total,
        }
    }
}
