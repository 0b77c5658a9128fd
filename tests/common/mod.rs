#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use match_stats::{
    config::Profile,
    dataset::Dataset,
    engine::{Engine, SourceInput},
    reader::SourceOptions,
};
use tempfile::{TempDir, tempdir};

pub const CARDS_FILE: &str = "cartoes.csv";
pub const STATS_FILE: &str = "estatisticas.csv";

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Ingests in-memory sources with the default profile.
pub fn ingest(sources: &[(&str, &str)]) -> Dataset {
    let inputs = sources
        .iter()
        .map(|(name, data)| SourceInput::new(*name, *data))
        .collect::<Vec<_>>();
    let dataset = Engine::new(Profile::default(), SourceOptions::default())
        .ingest(&inputs)
        .expect("ingest sources");
    (*dataset).clone()
}

/// Ingests the two bundled Brasileirão fixtures, cards first.
pub fn ingest_fixtures() -> Dataset {
    let inputs = [CARDS_FILE, STATS_FILE]
        .iter()
        .map(|name| SourceInput::from_path(&fixture_path(name)).expect("read fixture"))
        .collect::<Vec<_>>();
    let dataset = Engine::new(Profile::default(), SourceOptions::default())
        .ingest(&inputs)
        .expect("ingest fixtures");
    (*dataset).clone()
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
