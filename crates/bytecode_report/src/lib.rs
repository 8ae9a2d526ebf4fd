//! Flattened bytecode reports over an external Solidity compiler.
//!
//! Drives a compiler binary across every `.sol` file in a directory,
//! decodes its `--combined-json bin,metadata` output, and writes one
//! `report.txt` with two lines per contract. The flat format is meant
//! for diffing bytecode between two compiler builds.

pub mod compiler;
pub mod report;

pub use compiler::{CombinedOutput, CompileError, Contract, Solc};
pub use report::{ReportConfig, ReportGenerator, REPORT_FILE};
