mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::ArgMatches;
use tracksplit_core::{plan_tracks, run_with_progress, Config, ExternalTools, ProgressEvent};

use crate::cli::{build_cli, normalize_args};

fn main() -> ExitCode {
    env_logger::init();

    let matches = match build_cli().try_get_matches_from(normalize_args(std::env::args_os())) {
        Ok(matches) => matches,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match split(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn split(matches: &ArgMatches) -> anyhow::Result<()> {
    let audio_file = matches
        .get_one::<PathBuf>("filename")
        .expect("required argument");
    let timecodes_file = matches
        .get_one::<PathBuf>("timecodes")
        .expect("required argument");
    let artist = matches
        .get_one::<String>("artist")
        .expect("required argument");
    let album = matches
        .get_one::<String>("album")
        .expect("required argument");

    let mut builder = Config::builder(audio_file, timecodes_file, artist, album);
    if let Some(output_dir) = matches.get_one::<PathBuf>("output") {
        builder = builder.output_dir(output_dir);
    }
    let config = builder.build()?;

    if matches.get_flag("dry-run") {
        let plan = plan_tracks(&config)?;
        println!("Dry run: would generate {} track(s):", plan.len());
        for planned in plan {
            println!("  {}", planned.output_path().display());
        }
        return Ok(());
    }

    let mut tools = ExternalTools::new(
        matches
            .get_one::<PathBuf>("ffmpeg")
            .expect("defaulted argument"),
        matches
            .get_one::<PathBuf>("eyed3")
            .expect("defaulted argument"),
    );
    log::debug!(
        "using '{}' to cut and '{}' to tag",
        tools.cut_program().display(),
        tools.tag_program().display()
    );

    run_with_progress(config, &mut tools, |event| {
        if let ProgressEvent::Track { path, .. } = event {
            println!("processing track \"{}\"", path.display());
        }
    })?;

    Ok(())
}
