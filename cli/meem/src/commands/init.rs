//! `meem init`: project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use meem_codec::{DocumentKind, Session};
use meem_core::{Block, DataType, Parameter};

use crate::manifest::{MeemManifest, MANIFEST_FILE};

/// Create a new project in directory `name`, relative to cwd.
pub fn run(name: &str) -> Result<()> {
    create_project(Path::new(name), name)
}

/// Session holding the starter documents: one block with one parameter,
/// default platform settings and a plain CRC checksum.
pub(crate) fn template_session(name: &str) -> Session {
    let mut session = Session::new();
    let dm = session.new_data_model();
    dm.name = name.to_string();
    let mut block = Block::named("block0");
    block.children.push(Parameter::named("param0", DataType::Uint8));
    dm.children.push(block);
    session.new_platform();
    session.new_checksum();
    session
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }
    fs::create_dir_all(project_dir)
        .with_context(|| format!("creating {}", project_dir.display()))?;

    fs::write(project_dir.join(MANIFEST_FILE), MeemManifest::template(name))
        .context("writing meem.toml")?;

    let session = template_session(name);
    let dm_file = DocumentKind::DataModel.default_file_name();
    let ps_file = DocumentKind::Platform.default_file_name();
    let cs_file = DocumentKind::Checksum.default_file_name();
    session
        .save_data_model_file(&project_dir.join(dm_file))
        .with_context(|| format!("writing {dm_file}"))?;
    session
        .save_platform_file(&project_dir.join(ps_file))
        .with_context(|| format!("writing {ps_file}"))?;
    session
        .save_checksum_file(&project_dir.join(cs_file))
        .with_context(|| format!("writing {cs_file}"))?;

    println!("Created project '{name}'");
    println!("  {name}/{MANIFEST_FILE}");
    println!("  {name}/{dm_file}");
    println!("  {name}/{ps_file}");
    println!("  {name}/{cs_file}");

    Ok(())
}
