//! Report generation over a directory of Solidity sources.

use crate::compiler::{CompileError, Solc};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the report written into the source directory.
pub const REPORT_FILE: &str = "report.txt";

/// Suffix that marks a directory entry as compiler input.
const SOURCE_SUFFIX: &str = ".sol";

/// Settings for one report run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Compiler binary to drive.
    pub compiler: PathBuf,
    /// Directory holding the sources; the report lands here too.
    pub source_dir: PathBuf,
}

/// Drives the compiler across every source file and flattens the results.
///
/// Strictly sequential: each file is compiled and written out before the
/// next one is touched. There is no timeout, so a hung compiler hangs
/// the run.
pub struct ReportGenerator {
    solc: Solc,
    source_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            solc: Solc::new(config.compiler),
            source_dir: config.source_dir,
        }
    }

    /// Produce `report.txt`, truncating any previous one.
    ///
    /// Every source file contributes either two lines per contract (bin
    /// then metadata, contracts in name order) or a single
    /// `<file>: ERROR` marker. Decoding happens before any line for a
    /// file is written, so a failing file never leaves partial contract
    /// lines behind. Per-file failures never abort the run; only a spawn
    /// failure or an unwritable report does.
    pub fn run(&self) -> Result<()> {
        let sources = collect_sources(&self.source_dir)?;
        info!(files = sources.len(), "preparing bytecode report");

        let report_path = self.source_dir.join(REPORT_FILE);
        let report = File::create(&report_path)
            .with_context(|| format!("failed to create {}", report_path.display()))?;
        let mut report = BufWriter::new(report);

        for source in &sources {
            match self.solc.compile(source, &self.source_dir) {
                Ok(combined) => {
                    debug!(%source, contracts = combined.contracts.len(), "compiled");
                    for (name, contract) in &combined.contracts {
                        writeln!(report, "{} {}", name, contract.bin)?;
                        writeln!(report, "{} {}", name, contract.metadata)?;
                    }
                }
                Err(CompileError::BadOutput(err)) => {
                    warn!(%source, error = %err, "unusable compiler output");
                    writeln!(report, "{}: ERROR", source)?;
                }
                Err(err @ CompileError::Spawn { .. }) => {
                    return Err(err).context("compiler invocation failed");
                }
            }
        }

        report
            .flush()
            .with_context(|| format!("failed to flush {}", report_path.display()))?;
        info!(report = %report_path.display(), "report complete");
        Ok(())
    }
}

/// Sorted names of every `.sol` entry in the source directory.
///
/// Non-recursive, matching on the name suffix only. Names that are not
/// valid UTF-8 cannot be compiler input here and are skipped.
fn collect_sources(source_dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("failed to read {}", source_dir.display()))?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.ends_with(SOURCE_SUFFIX) {
            sources.push(name.to_string());
        }
    }
    sources.sort();
    Ok(sources)
}
