pub mod error;
pub mod policy;
pub mod settings;

// Re-export commonly used types
pub use error::{ConfigError, Result};
pub use policy::FileExistsPolicy;
pub use settings::{
    expand_files, read_string_or_file, ChecksumOptions, Connection, ReleaseSpec, Settings,
    DEFAULT_API_URL, DEFAULT_CHECKSUM_FILE, DEFAULT_UPLOAD_URL,
};
