use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::{NonEmptyStringValueParser, TypedValueParser};
use clap::{value_parser, Arg, ArgAction, Command};
use tracksplit_core::tools::{DEFAULT_CUT_PROGRAM, DEFAULT_TAG_PROGRAM};

/// Long options that may also be spelled with a single leading dash.
const LONG_OPTIONS: &[&str] = &[
    "filename",
    "timecodes",
    "artist",
    "album",
    "output",
    "ffmpeg",
    "eyed3",
    "dry-run",
];

/// Options that consume the following token as their value.
const VALUE_OPTIONS: &[&str] = &[
    "filename",
    "timecodes",
    "artist",
    "album",
    "output",
    "ffmpeg",
    "eyed3",
];

/// Rewrite single-dash long options (`-artist X`, `-artist=X`) into the
/// double-dash form understood by clap. Option values and everything after
/// `--` are untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    let mut awaiting_value = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 || passthrough {
                return arg;
            }
            if awaiting_value {
                awaiting_value = false;
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }

            let normalized = if is_single_dash_long(text) {
                format!("-{text}")
            } else {
                text.to_owned()
            };
            awaiting_value = takes_separate_value(&normalized);
            OsString::from(normalized)
        })
        .collect()
}

fn is_single_dash_long(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }
    let name = rest.split('=').next().unwrap_or(rest);
    LONG_OPTIONS.contains(&name)
}

/// True for `--name` or `-o` forms whose value is the next token.
fn takes_separate_value(arg: &str) -> bool {
    if arg == "-o" {
        return true;
    }
    match arg.strip_prefix("--") {
        Some(name) => !name.contains('=') && VALUE_OPTIONS.contains(&name),
        None => false,
    }
}

fn non_empty_path() -> impl TypedValueParser<Value = PathBuf> {
    NonEmptyStringValueParser::new().map(PathBuf::from)
}

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Split a continuous recording into tagged tracks using a timecode list")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("filename")
                .long("filename")
                .value_name("FILE")
                .allow_hyphen_values(true)
                .help("Path to the audio file")
                .required(true)
                .value_parser(non_empty_path()),
        )
        .arg(
            Arg::new("timecodes")
                .long("timecodes")
                .value_name("FILE")
                .allow_hyphen_values(true)
                .help("Path to the timecodes file (one \"HH:MM:SS Title\" per line)")
                .required(true)
                .value_parser(non_empty_path()),
        )
        .arg(
            Arg::new("artist")
                .long("artist")
                .value_name("ARTIST")
                .allow_hyphen_values(true)
                .help("Album artist")
                .required(true)
                .value_parser(NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("album")
                .long("album")
                .value_name("ALBUM")
                .allow_hyphen_values(true)
                .help("Album name")
                .required(true)
                .value_parser(NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_DIR")
                .allow_hyphen_values(true)
                .help("Directory below which Artist/Album is created [default: current directory]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ffmpeg")
                .long("ffmpeg")
                .value_name("PROGRAM")
                .allow_hyphen_values(true)
                .help("Program used to cut tracks")
                .env("TRACKSPLIT_FFMPEG")
                .default_value(DEFAULT_CUT_PROGRAM)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("eyed3")
                .long("eyed3")
                .value_name("PROGRAM")
                .allow_hyphen_values(true)
                .help("Program used to write tags")
                .env("TRACKSPLIT_EYED3")
                .default_value(DEFAULT_TAG_PROGRAM)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the tracks that would be produced without writing files")
                .action(ArgAction::SetTrue),
        )
}
