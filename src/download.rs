//! Fetching attachments to local files for the viewers

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;

use crate::error::{Error, Result};

/// Build the HTTP client used for attachments
pub fn client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_default()
}

/// Download `url` into a temporary file that outlives this process.
///
/// The viewer may still be reading the file long after we return, so the
/// file is not cleaned up.
pub async fn download_file(client: &Client, url: &str) -> Result<PathBuf> {
    tracing::debug!("Downloading attachment: {url}");

    let failed = |reason: String| Error::Download {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }
    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

    let mut file = tempfile::Builder::new()
        .prefix("tusk-")
        .suffix(&extension_of(url))
        .tempfile()?;
    file.write_all(&bytes)?;
    file.flush()?;

    let (_, path) = file.keep().map_err(|e| Error::Persist {
        path: e.file.path().to_path_buf(),
        source: e.error,
    })?;
    Ok(path)
}

/// Download every URL concurrently. Paths come back in the order of `urls`.
pub async fn download_all(client: &Client, urls: &[String]) -> Result<Vec<PathBuf>> {
    let handles: Vec<_> = urls
        .iter()
        .map(|url| {
            let client = client.clone();
            let url = url.clone();
            tokio::spawn(async move { download_file(&client, &url).await })
        })
        .collect();

    let mut paths = Vec::with_capacity(handles.len());
    for (handle, url) in handles.into_iter().zip(urls) {
        let path = handle.await.map_err(|e| Error::Download {
            url: url.clone(),
            reason: e.to_string(),
        })??;
        paths.push(path);
    }
    Ok(paths)
}

/// File extension of the URL's last path segment, with the dot.
/// Viewers like `xdg-open` pick the program by extension.
fn extension_of(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    }
}
