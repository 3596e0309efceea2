use std::path::{Path, PathBuf};

use publisher_config::ChecksumOptions;
use tracing::info;

use crate::error::{PublishError, Result};

fn label(path: &Path, flatten: bool) -> String {
    if flatten {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string())
    } else {
        path.display().to_string()
    }
}

/// Drops files named like a checksum listing this run will generate, so a
/// listing left by an earlier run is neither hashed nor uploaded twice.
pub fn without_checksum_files(files: &[PathBuf], options: &ChecksumOptions) -> Vec<PathBuf> {
    let generated: Vec<String> = options
        .algorithms
        .iter()
        .map(|algorithm| options.file_name(*algorithm))
        .collect();
    files
        .iter()
        .filter(|path| {
            path.file_name()
                .map_or(true, |name| !generated.iter().any(|g| name == g.as_str()))
        })
        .cloned()
        .collect()
}

/// Writes one `<digest>  <file>` listing per configured algorithm and returns
/// the written paths. Nothing is written when no algorithm is configured.
pub async fn write_checksum_files(
    files: &[PathBuf],
    options: &ChecksumOptions,
) -> Result<Vec<PathBuf>> {
    if options.algorithms.is_empty() {
        return Ok(Vec::new());
    }

    let mut contents = Vec::with_capacity(files.len());
    for path in files {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| PublishError::local_io("read", path, e))?;
        contents.push((path, data));
    }

    let mut written = Vec::with_capacity(options.algorithms.len());
    for algorithm in &options.algorithms {
        let listing: String = contents
            .iter()
            .map(|(path, data)| {
                format!(
                    "{}  {}\n",
                    algorithm.digest(data),
                    label(path, options.flatten)
                )
            })
            .collect();

        let target = options.dir.join(options.file_name(*algorithm));
        tokio::fs::write(&target, listing)
            .await
            .map_err(|e| PublishError::local_io("write", &target, e))?;
        info!("Wrote {} checksums to {}", algorithm, target.display());
        written.push(target);
    }

    Ok(written)
}
