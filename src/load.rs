//! Loading image bytes from a local path or an `http(s)://` URL.

use std::path::Path;
use std::time::Duration;

use log::debug;

use crate::error::LoadError;

/// Default timeout for a whole download.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(3 * 60);

/// True if `path` should be downloaded rather than read from disk.
#[inline]
pub fn is_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Read a local file into memory.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Download `url`; anything but a 200 response is an error.
#[cfg(feature = "http")]
pub fn download(url: &str, timeout: Duration) -> Result<Vec<u8>, LoadError> {
    use std::io::Read;

    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let response = match agent.get(url).set("User-Agent", "").call() {
        Ok(r) => r,
        Err(ureq::Error::Status(status, _)) => {
            return Err(LoadError::Status {
                url: url.to_string(),
                status,
            })
        }
        Err(e) => {
            return Err(LoadError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })
        }
    };
    if response.status() != 200 {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| LoadError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    debug!("downloaded {} bytes from {}", bytes.len(), url);
    Ok(bytes)
}

#[cfg(not(feature = "http"))]
pub fn download(url: &str, _timeout: Duration) -> Result<Vec<u8>, LoadError> {
    Err(LoadError::HttpDisabled(url.to_string()))
}

/// Load from a URL or a local path, whichever `path` is.
pub fn load(path: &str, timeout: Duration) -> Result<Vec<u8>, LoadError> {
    if is_url(path) {
        download(path, timeout)
    } else {
        read_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection() {
        assert!(is_url("http://example.com/a.jpg"));
        assert!(is_url("https://example.com/a.jpg"));
        assert!(!is_url("ftp://example.com/a.jpg"));
        assert!(!is_url("./http/a.jpg"));
        assert!(!is_url("HTTP://example.com"));
    }
}
