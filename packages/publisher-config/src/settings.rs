use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::policy::FileExistsPolicy;
use publisher_provider::{GITHUB_API_URL, GITHUB_UPLOAD_URL};
use publisher_utils::ChecksumAlgorithm;

pub const DEFAULT_API_URL: &str = GITHUB_API_URL;
pub const DEFAULT_UPLOAD_URL: &str = GITHUB_UPLOAD_URL;
pub const DEFAULT_CHECKSUM_FILE: &str = "CHECKSUMsum.txt";
/// Replaced by the algorithm name in the checksum file template
pub const CHECKSUM_PLACEHOLDER: &str = "CHECKSUM";

/// Raw, unvalidated settings as collected from flags and environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub upload_url: String,
    pub owner: String,
    pub repo: String,
    pub tag: String,
    /// Build event that triggered the run; anything but `tag` is rejected
    pub event: Option<String>,
    pub files: Vec<String>,
    pub file_exists: String,
    pub checksum: Vec<String>,
    pub checksum_file: String,
    pub checksum_flatten: bool,
    pub checksum_dir: PathBuf,
    pub draft: bool,
    pub prerelease: bool,
    pub title: String,
    pub note: String,
    pub overwrite: bool,
    pub pickup_draft: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            owner: String::new(),
            repo: String::new(),
            tag: String::new(),
            event: None,
            files: Vec::new(),
            file_exists: FileExistsPolicy::default().to_string(),
            checksum: Vec::new(),
            checksum_file: DEFAULT_CHECKSUM_FILE.to_string(),
            checksum_flatten: false,
            checksum_dir: PathBuf::from("."),
            draft: false,
            prerelease: false,
            title: String::new(),
            note: String::new(),
            overwrite: false,
            pickup_draft: false,
        }
    }
}

/// Where and how to reach the release service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub api_key: String,
    pub base_url: String,
    pub upload_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumOptions {
    pub algorithms: Vec<ChecksumAlgorithm>,
    pub file_template: String,
    /// Write base names instead of the given paths into checksum files
    pub flatten: bool,
    pub dir: PathBuf,
}

impl ChecksumOptions {
    pub fn file_name(&self, algorithm: ChecksumAlgorithm) -> String {
        self.file_template
            .replace(CHECKSUM_PLACEHOLDER, algorithm.name())
    }
}

impl Default for ChecksumOptions {
    fn default() -> Self {
        Self {
            algorithms: Vec::new(),
            file_template: DEFAULT_CHECKSUM_FILE.to_string(),
            flatten: false,
            dir: PathBuf::from("."),
        }
    }
}

/// The desired release state for one run. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSpec {
    pub owner: String,
    pub repo: String,
    pub tag: String,
    pub draft: bool,
    pub prerelease: bool,
    pub title: String,
    pub note: String,
    pub overwrite: bool,
    pub pickup_draft: bool,
    pub file_exists: FileExistsPolicy,
    pub files: Vec<PathBuf>,
    pub checksum: ChecksumOptions,
}

impl Settings {
    pub fn connection(&self) -> Result<Connection> {
        Ok(Connection {
            api_key: required("api_key", &self.api_key)?,
            base_url: self.base_url.trim().to_string(),
            upload_url: self.upload_url.trim().to_string(),
        })
    }

    pub fn validate(&self) -> Result<ReleaseSpec> {
        if let Some(event) = self.event.as_deref().filter(|e| !e.is_empty()) {
            if event != "tag" {
                return Err(ConfigError::NotTagEvent(event.to_string()));
            }
        }

        let owner = required("owner", &self.owner)?;
        let repo = required("repo", &self.repo)?;
        let tag = required("tag", &self.tag)?;
        let file_exists = self.file_exists.trim().parse::<FileExistsPolicy>()?;

        let mut algorithms = Vec::new();
        for name in self.checksum.iter().filter(|c| !c.trim().is_empty()) {
            let algorithm = name.parse::<ChecksumAlgorithm>()?;
            if !algorithms.contains(&algorithm) {
                algorithms.push(algorithm);
            }
        }

        Ok(ReleaseSpec {
            owner,
            repo,
            tag,
            draft: self.draft,
            prerelease: self.prerelease,
            title: read_string_or_file(&self.title)?,
            note: read_string_or_file(&self.note)?,
            overwrite: self.overwrite,
            pickup_draft: self.pickup_draft,
            file_exists,
            files: expand_files(&self.files)?,
            checksum: ChecksumOptions {
                algorithms,
                file_template: self.checksum_file.clone(),
                flatten: self.checksum_flatten,
                dir: self.checksum_dir.clone(),
            },
        })
    }
}

fn required(name: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(ConfigError::MissingSetting(name))
    } else {
        Ok(value.to_string())
    }
}

/// Returns the file's contents when `value` names an existing file, the
/// value itself otherwise.
pub fn read_string_or_file(value: &str) -> Result<String> {
    let path = Path::new(value);
    if value.is_empty() || !path.is_file() {
        return Ok(value.to_string());
    }
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Expands glob patterns in order. Directories are dropped and a path matched
/// by several patterns is kept at its first position.
pub fn expand_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        let paths = glob::glob(pattern).map_err(|source| ConfigError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut matched = false;
        for entry in paths {
            let path = entry.map_err(|e| ConfigError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if path.is_dir() {
                continue;
            }
            matched = true;
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }

        if !matched {
            tracing::warn!("No files match pattern {}", pattern);
        }
    }

    Ok(files)
}
