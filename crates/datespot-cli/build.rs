//! Embeds build metadata for `datespot --version` (read in `src/config.rs`).
//!
//! Outside a git checkout vergen emits placeholder values and a warning
//! instead of failing the build; `version_info` then shows "unknown".

use vergen_git2::{BuildBuilder, CargoBuilder, Emitter, Git2Builder, RustcBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // VERGEN_GIT_SHA
    let commit = Git2Builder::default().sha(true).build()?;
    // VERGEN_BUILD_DATE
    let date = BuildBuilder::default().build_date(true).build()?;
    // VERGEN_CARGO_TARGET_TRIPLE
    let target = CargoBuilder::default().target_triple(true).build()?;
    // VERGEN_RUSTC_SEMVER
    let toolchain = RustcBuilder::default().semver(true).build()?;

    let mut emitter = Emitter::default();
    emitter
        .add_instructions(&commit)?
        .add_instructions(&date)?
        .add_instructions(&target)?
        .add_instructions(&toolchain)?;
    emitter.emit()?;

    Ok(())
}
