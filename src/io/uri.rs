use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use url::Url;

/// A parsed `filepath` setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePath(PathBuf);

impl SourcePath {
    /// Parse a plain path or `file://` URI into a local path
    pub fn parse(uri: &str) -> Result<Self> {
        match Url::parse(uri) {
            // Single-letter schemes are Windows drive letters, not URIs
            Ok(url) if url.scheme().len() > 1 => match url.scheme() {
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|_| anyhow!("Invalid file:// URI: {}", uri))?;
                    Ok(SourcePath(path))
                }
                scheme => Err(anyhow!(
                    "Unsupported URI scheme '{}' in '{}'. Only local paths and file:// URIs are supported",
                    scheme,
                    uri
                )),
            },
            _ => Ok(SourcePath(PathBuf::from(uri))),
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}
