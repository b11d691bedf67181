use std::fs;
use std::path::{Path, PathBuf};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::TempDir;
use tracksplit_core::{parse_timecodes, plan_tracks, Config};

fn timecode_list(count: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                "{:02}:{:02}:{:02}  Movement {} - Allegro ma non troppo\n",
                i / 60,
                i % 60,
                0,
                i + 1
            )
        })
        .collect()
}

struct Workspace {
    dir: TempDir,
    audio: PathBuf,
    timecodes: PathBuf,
}

impl Workspace {
    fn new(count: usize) -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let audio = dir.path().join("concert.mp3");
        fs::write(&audio, b"")?;
        let timecodes = dir.path().join("timecodes.txt");
        fs::write(&timecodes, timecode_list(count))?;
        Ok(Self {
            dir,
            audio,
            timecodes,
        })
    }

    fn config(&self, root: &Path) -> Config {
        Config::builder(&self.audio, &self.timecodes, "Orchestra", "Live")
            .output_dir(root)
            .build()
            .expect("valid config")
    }
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_timecodes");
    for count in [10usize, 100, 999] {
        let list = timecode_list(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &list, |b, list| {
            b.iter(|| parse_timecodes(list.as_bytes()).expect("valid list"));
        });
    }
    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let workspace = Workspace::new(999).expect("failed to prepare workspace");
    let config = workspace.config(workspace.dir.path());
    c.bench_function("plan_tracks/999", |b| {
        b.iter(|| plan_tracks(&config).expect("valid plan"));
    });
}

criterion_group!(benches, bench_parse, bench_plan);
criterion_main!(benches);
