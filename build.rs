//! Build script for wordblame: stamps `--version` with build metadata.
//!
//! `VERGEN_BUILD_DATE` is always emitted. Builds without the `release`
//! feature also get `VERGEN_GIT_SHA`, so a store written by a dev build can be
//! traced back to the commit that produced its annotations.

use vergen_gitcl::{BuildBuilder, Emitter};

fn main() {
    if let Err(e) = emit() {
        // Not in a git checkout (e.g. a source tarball)
        println!("cargo:warning=Build metadata unavailable: {}", e);
        println!("cargo:rustc-env=VERGEN_BUILD_DATE=unknown");
        println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
    }
}

#[cfg(not(feature = "release"))]
fn emit() -> anyhow::Result<()> {
    use vergen_gitcl::GitclBuilder;

    let build = BuildBuilder::default().build_date(true).build()?;
    let git = GitclBuilder::default().sha(true).build()?;
    Emitter::default()
        .add_instructions(&build)?
        .add_instructions(&git)?
        .emit()
}

#[cfg(feature = "release")]
fn emit() -> anyhow::Result<()> {
    let build = BuildBuilder::default().build_date(true).build()?;
    Emitter::default().add_instructions(&build)?.emit()
}
