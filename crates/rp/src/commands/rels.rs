//! `rp rels` command implementation.

use std::path::PathBuf;

use clap::Args;
use rp_package::{Package, Relationship, ZipPackage, rels_path_for, resolve_target};
use rp_template::MAIN_DOCUMENT_PART;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the rels command.
#[derive(Args)]
pub(crate) struct RelsArgs {
    /// Package to inspect (`.docx`).
    package: PathBuf,

    /// Source part whose manifest is listed.
    #[arg(short, long, default_value = MAIN_DOCUMENT_PART)]
    part: String,
}

impl RelsArgs {
    /// Execute the rels command.
    ///
    /// # Errors
    ///
    /// Returns an error if the package or its manifest can't be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let package = ZipPackage::open(&self.package)?;

        let manifest = rels_path_for(&self.part);
        let entries = package.relationships(&manifest)?;

        output.highlight(&format!("{manifest} ({} entries)", entries.len()));
        for line in describe(&package, &self.part, &entries) {
            output.info(&line);
        }
        Ok(())
    }
}

/// One line per entry: id, short type, target and whether the target exists.
fn describe(package: &dyn Package, part: &str, entries: &[Relationship]) -> Vec<String> {
    entries
        .iter()
        .map(|rel| {
            let kind = rel.rel_type.rsplit('/').next().unwrap_or(&rel.rel_type);
            let status = if rel.is_external() {
                "external"
            } else if package.contains(&resolve_target(part, &rel.target)) {
                "ok"
            } else {
                "missing"
            };
            format!("  {:<8} {:<12} {} [{status}]", rel.id, kind, rel.target)
        })
        .collect()
}
