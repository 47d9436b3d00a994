//! Shared fixtures and command builders

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

use wordblame::PageHistory;

/// Directory holding the test fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn load_history(name: &str) -> PageHistory {
    PageHistory::load(&fixture(name)).expect("fixture should parse")
}

/// A scratch store directory plus an isolated config file location.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn store(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    pub fn config(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// `wordblame` with the config pointed into the workspace and logging off.
    pub fn wordblame(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_wordblame"));
        cmd.env("WORDBLAME_CONFIG", self.config())
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run `annotate` on fixture files into the workspace store.
    pub fn annotate(&self, fixtures: &[&str]) -> assert_cmd::assert::Assert {
        let mut cmd = self.wordblame();
        cmd.arg("annotate").arg("--store").arg(self.store());
        for name in fixtures {
            cmd.arg(fixture(name));
        }
        cmd.assert()
    }
}
