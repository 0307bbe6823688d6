// Endpoint sources for bac-hunter
// A sitemap export is read as one URL per line; nothing else is validated here

use crate::error::EndpointError;
use std::path::{Path, PathBuf};

/// Trait for anything that supplies the ordered list of candidate endpoints
pub trait EndpointSource {
    fn load(&self) -> Result<Vec<String>, EndpointError>;
}

/// Plain-text URL list, e.g. a Burp Suite "copy URLs" sitemap export.
#[derive(Debug, Clone)]
pub struct SitemapFile {
    path: PathBuf,
}

impl SitemapFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EndpointSource for SitemapFile {
    fn load(&self) -> Result<Vec<String>, EndpointError> {
        let data = std::fs::read_to_string(&self.path).map_err(|source| EndpointError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(parse_endpoint_list(&data))
    }
}

/// Trimmed non-blank lines, in file order.
pub fn parse_endpoint_list(data: &str) -> Vec<String> {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
