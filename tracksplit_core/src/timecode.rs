//! Timecode list parsing.
//!
//! A timecode list holds one `HH:MM:SS<whitespace>Title` entry per line.
//! Blank lines are ignored. Every entry must start strictly later than the
//! entry before it.

use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use thiserror::Error;

use crate::TrackSplitError;

/// Highest number of entries a list may contain; track numbers never exceed
/// three digits.
pub const MAX_TRACKS: usize = 999;

const TIME_FORMAT: &str = "%H:%M:%S";

/// A validated time of day marking a track boundary.
///
/// The parsed value drives validation and ordering, while the original text
/// is kept so it can be handed to the cut tool unchanged.
#[derive(Clone, Debug)]
pub struct Timecode {
    time: NaiveTime,
    text: String,
}

impl Timecode {
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Reasons a token is not a valid `HH:MM:SS` time of day.
#[derive(Debug, Error)]
pub enum TimecodeParseError {
    /// Hours need one or two digits, minutes and seconds exactly two.
    #[error("expected HH:MM:SS")]
    Shape,

    #[error(transparent)]
    OutOfRange(#[from] chrono::ParseError),

    /// chrono reads `:60` as a leap second; a track boundary never is one.
    #[error("seconds must be below 60")]
    LeapSecond,
}

impl FromStr for Timecode {
    type Err = TimecodeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let text = value.trim();
        if !has_clock_shape(text) {
            return Err(TimecodeParseError::Shape);
        }

        let time = NaiveTime::parse_from_str(text, TIME_FORMAT)?;
        if time.nanosecond() >= 1_000_000_000 {
            return Err(TimecodeParseError::LeapSecond);
        }

        Ok(Self {
            time,
            text: text.to_owned(),
        })
    }
}

fn has_clock_shape(text: &str) -> bool {
    let fields: Vec<&str> = text.split(':').collect();
    let digits = |field: &str| field.bytes().all(|b| b.is_ascii_digit());
    match fields.as_slice() {
        [hours, minutes, seconds] => {
            (1..=2).contains(&hours.len())
                && minutes.len() == 2
                && seconds.len() == 2
                && digits(hours)
                && digits(minutes)
                && digits(seconds)
        }
        _ => false,
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq for Timecode {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
    }
}

impl Eq for Timecode {}

impl PartialOrd for Timecode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timecode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.cmp(&other.time)
    }
}

/// One parsed entry of the timecode list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimecodePair {
    pub time: Timecode,
    pub title: String,
}

/// Read and parse the timecode list stored at `path`.
pub fn parse_timecodes_file<P: AsRef<Path>>(path: P) -> Result<Vec<TimecodePair>, TrackSplitError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TrackSplitError::TimecodesFileNotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(TrackSplitError::TimecodesUnreadable)?;
    parse_timecodes(BufReader::new(file))
}

/// Parse a timecode list from any buffered reader.
///
/// Line numbers reported in errors are 1-based and count blank lines.
pub fn parse_timecodes<R: BufRead>(reader: R) -> Result<Vec<TimecodePair>, TrackSplitError> {
    let mut pairs: Vec<TimecodePair> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(TrackSplitError::TimecodesUnreadable)?;
        let line_number = index + 1;
        let content = line.trim();
        if content.is_empty() {
            continue;
        }

        let (token, title) =
            split_entry(content).ok_or_else(|| TrackSplitError::InvalidLineFormat {
                line: line_number,
                content: content.to_owned(),
            })?;

        let time: Timecode = token
            .parse()
            .map_err(|_| TrackSplitError::InvalidTimecode {
                line: line_number,
                token: token.to_owned(),
            })?;

        if let Some(previous) = pairs.last() {
            if time <= previous.time {
                return Err(TrackSplitError::TimecodeNotIncreasing {
                    line: line_number,
                    previous: previous.time.to_string(),
                    current: time.to_string(),
                });
            }
        }

        pairs.push(TimecodePair {
            time,
            title: title.to_owned(),
        });
    }

    if pairs.is_empty() {
        return Err(TrackSplitError::NoTimecodesFound);
    }

    if pairs.len() > MAX_TRACKS {
        return Err(TrackSplitError::TooManyTracks(pairs.len()));
    }

    Ok(pairs)
}

/// Split a trimmed, non-blank line at its first run of whitespace.
///
/// Returns `None` when there is no separator, which also covers a time token
/// followed only by whitespace.
fn split_entry(content: &str) -> Option<(&str, &str)> {
    let separator = content.find(char::is_whitespace)?;
    let (token, rest) = content.split_at(separator);
    let title = rest.trim_start();
    if title.is_empty() {
        return None;
    }
    Some((token, title))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Vec<TimecodePair>, TrackSplitError> {
        parse_timecodes(input.as_bytes())
    }

    #[test]
    fn parses_entries_in_file_order() {
        let pairs = parse("00:00:00 Intro\n00:03:15 Track Two\n").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].time.as_str(), "00:00:00");
        assert_eq!(pairs[0].title, "Intro");
        assert_eq!(pairs[1].time.as_str(), "00:03:15");
        assert_eq!(pairs[1].title, "Track Two");
    }

    #[test]
    fn skips_blank_lines_and_preserves_inner_title_spacing() {
        let pairs = parse("\n00:00:00   Side  A:  Opening  \n\n   \n00:10:00\tClosing\r\n").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].title, "Side  A:  Opening");
        assert_eq!(pairs[1].title, "Closing");
    }

    #[test]
    fn rejects_line_without_separator() {
        match parse("00:00:00 Intro\n00:03:00\n") {
            Err(TrackSplitError::InvalidLineFormat { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "00:03:00");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_time_without_title() {
        assert!(matches!(
            parse("00:00:00    \n"),
            Err(TrackSplitError::InvalidLineFormat { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_unparsable_time_token() {
        match parse("badtime Intro\n") {
            Err(TrackSplitError::InvalidTimecode { line, token }) => {
                assert_eq!(line, 1);
                assert_eq!(token, "badtime");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            parse("25:00:00 Late\n"),
            Err(TrackSplitError::InvalidTimecode { .. })
        ));
        assert!(matches!(
            parse("00:61:00 Odd\n"),
            Err(TrackSplitError::InvalidTimecode { .. })
        ));
    }

    #[test]
    fn rejects_leap_seconds_and_short_fields() {
        assert!(matches!(
            parse("00:00:00 Intro\n00:01:60 Leap\n"),
            Err(TrackSplitError::InvalidTimecode { line: 2, .. })
        ));
        for token in ["00:3:15", "00:03:5", "00:3:5", "000:03:15", "00:03:15:00", "+0:03:15"] {
            assert!(
                matches!(
                    parse(&format!("{token} Short\n")),
                    Err(TrackSplitError::InvalidTimecode { .. })
                ),
                "{token} should be rejected"
            );
        }
        assert!("23:59:59".parse::<Timecode>().is_ok());
    }

    #[test]
    fn rejects_input_that_is_not_utf8() {
        let bytes: &[u8] = b"00:00:00 Intro\n00:01:00 \xff\n";
        assert!(matches!(
            parse_timecodes(bytes),
            Err(TrackSplitError::TimecodesUnreadable(_))
        ));
    }

    #[test]
    fn directory_is_not_a_readable_list() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            parse_timecodes_file(dir.path()),
            Err(TrackSplitError::TimecodesUnreadable(_))
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse(""), Err(TrackSplitError::NoTimecodesFound)));
        assert!(matches!(
            parse("\n  \n\t\n"),
            Err(TrackSplitError::NoTimecodesFound)
        ));
    }

    #[test]
    fn rejects_out_of_order_and_duplicate_times() {
        match parse("00:05:00 B\n00:01:00 A\n") {
            Err(TrackSplitError::TimecodeNotIncreasing {
                line,
                previous,
                current,
            }) => {
                assert_eq!(line, 2);
                assert_eq!(previous, "00:05:00");
                assert_eq!(current, "00:01:00");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            parse("00:01:00 A\n\n00:01:00 A again\n"),
            Err(TrackSplitError::TimecodeNotIncreasing { line: 3, .. })
        ));
    }

    #[test]
    fn timecodes_compare_by_time_of_day() {
        let short: Timecode = "0:03:15".parse().unwrap();
        let padded: Timecode = "00:03:15".parse().unwrap();
        assert_eq!(short, padded);
        assert_eq!(short.time(), NaiveTime::from_hms_opt(0, 3, 15).unwrap());
        assert_eq!(short.to_string(), "0:03:15");
        assert!(padded < "00:03:16".parse::<Timecode>().unwrap());
    }
}
