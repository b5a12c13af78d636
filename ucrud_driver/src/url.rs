use crate::Error::InvalidUrl;
use crate::Result;
use std::path::{MAIN_SEPARATOR_STR, PathBuf};
use url::Url;

pub trait UrlExtension {
    /// Get a file path from the URL
    ///
    /// # Errors
    /// if the URL does not contain a path
    fn to_file(&self) -> Result<PathBuf>;
}

impl UrlExtension for Url {
    fn to_file(&self) -> Result<PathBuf> {
        let url = self.as_str();
        let scheme = self.scheme();
        let start_index = (scheme.len() + 3).min(url.len());
        let end_index = url.find('?').unwrap_or(url.len()).max(start_index);
        let path = &url[start_index..end_index];

        #[cfg(target_os = "windows")]
        let path = if path.contains(':') {
            // Strip preceding '/' character for Windows absolute path (e.g. /C:/foo)
            path.strip_prefix('/').unwrap_or(path)
        } else {
            path
        };

        let path = path.replace('/', MAIN_SEPARATOR_STR);
        let file_path = PathBuf::from(path);
        let path = file_path.to_string_lossy().to_string();
        if path.is_empty() || path == MAIN_SEPARATOR_STR {
            return Err(InvalidUrl(format!("no file provided: {url}")));
        }
        Ok(file_path)
    }
}
