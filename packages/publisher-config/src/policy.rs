use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// What to do when a desired file's name matches an asset already on the release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FileExistsPolicy {
    /// Delete the existing asset and upload the new content
    #[default]
    Overwrite,
    /// Abort the run
    Fail,
    /// Leave the existing asset and do not upload the file
    Skip,
}

impl FileExistsPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileExistsPolicy::Overwrite => "overwrite",
            FileExistsPolicy::Fail => "fail",
            FileExistsPolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for FileExistsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileExistsPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overwrite" => Ok(FileExistsPolicy::Overwrite),
            "fail" => Ok(FileExistsPolicy::Fail),
            "skip" => Ok(FileExistsPolicy::Skip),
            other => Err(ConfigError::UnknownFileExists(other.to_string())),
        }
    }
}
