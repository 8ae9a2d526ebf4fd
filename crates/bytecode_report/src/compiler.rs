//! Compiler invocation and combined-JSON decoding.
//!
//! Runs the external compiler as an isolated subprocess, one blocking
//! invocation per source file, and decodes its stdout into typed structs.
//! Spawn failures and undecodable output are kept as distinct error
//! variants because the report loop treats them very differently.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// One compiled unit from the combined-JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct Contract {
    /// Compiled bytecode as a hex string.
    pub bin: String,
    /// Compiler metadata, itself a serialized JSON document.
    pub metadata: String,
}

/// Top-level shape of `--combined-json bin,metadata` output.
///
/// Contract names live in a `BTreeMap` so iteration yields them in
/// lexicographic order, which is the order the report requires.
#[derive(Debug, Deserialize)]
pub struct CombinedOutput {
    pub contracts: BTreeMap<String, Contract>,
}

/// Why a single invocation produced no usable contracts.
///
/// `Spawn` is fatal to the whole run. `BadOutput` covers every per-file
/// failure (malformed JSON, missing `contracts`, missing or non-string
/// fields) without distinguishing between them; the report reduces all
/// of these to one ERROR marker and moves on.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to spawn compiler {compiler}: {source}")]
    Spawn {
        compiler: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("compiler output is not a bin/metadata combined-JSON document: {0}")]
    BadOutput(#[from] serde_json::Error),
}

/// Handle on one external compiler binary.
#[derive(Debug, Clone)]
pub struct Solc {
    compiler: PathBuf,
}

impl Solc {
    pub fn new(compiler: impl Into<PathBuf>) -> Self {
        Self {
            compiler: compiler.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.compiler
    }

    /// Compile one source file and decode the combined-JSON result.
    ///
    /// Blocks until the compiler exits with both streams fully drained.
    /// The exit status is not inspected and stderr is discarded: a
    /// compiler that complains loudly but still prints a valid document
    /// is treated the same as a clean run.
    pub fn compile(&self, source: &str, source_dir: &Path) -> Result<CombinedOutput, CompileError> {
        debug!(compiler = %self.compiler.display(), %source, "invoking compiler");
        let output = Command::new(&self.compiler)
            .arg("--combined-json")
            .arg("bin,metadata")
            .arg(source)
            .current_dir(source_dir)
            .output()
            .map_err(|err| CompileError::Spawn {
                compiler: self.compiler.clone(),
                source: err,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let combined = serde_json::from_str(stdout.trim())?;
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> Result<CombinedOutput, serde_json::Error> {
        serde_json::from_str(raw.trim())
    }

    #[test]
    fn decodes_combined_document() {
        let raw = r#"
            {"contracts": {"Foo": {"bin": "600160020190", "metadata": "{\"x\":1}"}}}
        "#;
        let combined = decode(raw).expect("valid document");
        assert_eq!(combined.contracts.len(), 1);
        let foo = &combined.contracts["Foo"];
        assert_eq!(foo.bin, "600160020190");
        assert_eq!(foo.metadata, "{\"x\":1}");
    }

    #[test]
    fn contract_names_iterate_sorted() {
        let raw = r#"{"contracts": {
            "Bar": {"bin": "02", "metadata": "{}"},
            "Abc": {"bin": "01", "metadata": "{}"}
        }}"#;
        let combined = decode(raw).expect("valid document");
        let names: Vec<&str> = combined.contracts.keys().map(String::as_str).collect();
        assert_eq!(names, ["Abc", "Bar"]);
    }

    #[test]
    fn rejects_non_json() {
        assert!(decode("not json").is_err());
    }

    #[test]
    fn rejects_missing_contracts_key() {
        assert!(decode(r#"{"version": "0.4.0"}"#).is_err());
    }

    #[test]
    fn rejects_non_string_bin() {
        let raw = r#"{"contracts": {"Foo": {"bin": 42, "metadata": "{}"}}}"#;
        assert!(decode(raw).is_err());
    }

    #[test]
    fn rejects_contract_missing_metadata() {
        let raw = r#"{"contracts": {"Foo": {"bin": "600160020190"}}}"#;
        assert!(decode(raw).is_err());
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let solc = Solc::new("/nonexistent/definitely-not-a-compiler");
        let err = solc
            .compile("a.sol", Path::new("."))
            .expect_err("spawn must fail");
        assert!(matches!(err, CompileError::Spawn { .. }));
    }
}
