//! Artifact Store - Compiled Contract Lookup
//!
//! Reads compiler output from disk: Hardhat's `artifacts/` layout
//! (`bytecode` as a hex string, `.dbg.json` pointing at build info) and
//! Foundry's `out/` layout (`bytecode.object`). Contracts are looked up
//! by name anywhere under the root directory.

use std::path::{Path, PathBuf};

use alloy::primitives::Bytes;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Compiled contract ready to deploy.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    /// Source path the compiler saw, e.g. `contracts/FundMe.sol`.
    pub source_name: Option<String>,
    pub abi: serde_json::Value,
    /// Creation bytecode (constructor arguments are appended to this).
    pub bytecode: Bytes,
    /// File the artifact was read from.
    pub path: PathBuf,
}

impl Artifact {
    /// `source:Name`, the form explorers expect for multi-file builds.
    pub fn fully_qualified_name(&self) -> String {
        match &self.source_name {
            Some(source) => format!("{source}:{}", self.contract_name),
            None => self.contract_name.clone(),
        }
    }
}

/// Compiler input and version for one build (Hardhat build info).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Full compiler version, e.g. `0.8.8+commit.dddeac2f`.
    pub solc_long_version: String,
    /// Standard JSON input given to solc.
    pub input: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(Bytes),
    Object { object: Bytes },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    source_name: Option<String>,
    #[serde(default)]
    abi: serde_json::Value,
    bytecode: BytecodeField,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: String,
}

/// Looks up compiled artifacts under one root directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load the artifact for contract `name`.
    ///
    /// # Errors
    /// Fails if no artifact exists, it cannot be parsed, or it carries no
    /// creation bytecode (interfaces and abstract contracts).
    pub async fn load(&self, name: &str) -> Result<Artifact> {
        let root = self.root.clone();
        let file_name = format!("{name}.json");
        let matches = tokio::task::spawn_blocking(move || find_artifact_files(&root, &file_name))
            .await
            .context("Artifact scan task panicked")?
            .with_context(|| format!("Failed to scan artifacts in {}", self.root.display()))?;

        let path = match matches.as_slice() {
            [] => bail!(
                "No artifact for {name} under {}; compile the contracts first",
                self.root.display()
            ),
            [only] => only.clone(),
            [first, ..] => {
                warn!(
                    contract = name,
                    candidates = matches.len(),
                    chosen = %first.display(),
                    "Multiple artifacts match, using the first"
                );
                first.clone()
            }
        };

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        let raw: RawArtifact = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))?;

        let bytecode = match raw.bytecode {
            BytecodeField::Hex(bytes) | BytecodeField::Object { object: bytes } => bytes,
        };
        if bytecode.is_empty() {
            bail!("Artifact {} has no bytecode (abstract contract or interface?)", path.display());
        }

        debug!(contract = name, path = %path.display(), size = bytecode.len(), "Artifact loaded");

        Ok(Artifact {
            contract_name: raw.contract_name.unwrap_or_else(|| name.to_string()),
            source_name: raw.source_name,
            abi: raw.abi,
            bytecode,
            path,
        })
    }

    /// Load the build info referenced by a Hardhat artifact's `.dbg.json`.
    pub async fn build_info(&self, artifact: &Artifact) -> Result<BuildInfo> {
        let dbg_path = artifact.path.with_extension("dbg.json");
        let content = tokio::fs::read_to_string(&dbg_path).await.with_context(|| {
            format!("No debug file {} (build info needs a Hardhat build)", dbg_path.display())
        })?;
        let dbg: DebugFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", dbg_path.display()))?;

        let dir = artifact.path.parent().unwrap_or(&self.root);
        let build_path = dir.join(&dbg.build_info);
        let content = tokio::fs::read_to_string(&build_path)
            .await
            .with_context(|| format!("Failed to read build info {}", build_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse build info {}", build_path.display()))
    }
}

/// Files named `file_name` below `root`, sorted, skipping build-info trees.
fn find_artifact_files(root: &Path, file_name: &str) -> Result<Vec<PathBuf>> {
    let mut matches = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != "build-info")
    {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name().to_str() == Some(file_name) {
            matches.push(entry.into_path());
        }
    }
    matches.sort();
    Ok(matches)
}
