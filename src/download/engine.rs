//! Attachment file downloading.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::api::Fetch;
use crate::download::hash::{etag_matches, hash_md5};
use crate::download::retry::RetryPolicy;
use crate::error::{Error, Result};
use crate::output::TransferProgress;

/// Result of a single download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The local file matches the server digest; nothing was transferred.
    AlreadyExists,
    /// The server reported 404.
    NotFound,
    /// Any other non-success status. Worth retrying.
    Failed(u16),
    /// The file was written.
    Success(u16),
}

/// Final result for one attachment after retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentOutcome {
    Downloaded,
    AlreadyExists,
    NotFound,
    /// Retries were exhausted or a non-retryable error occurred.
    Abandoned,
}

/// Per-download switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadOptions {
    /// Skip network and disk, only log and draw progress.
    pub simulate: bool,
    /// Draw the progress line.
    pub show_progress: bool,
}

/// Sibling path the body is streamed to before replacing the destination.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Download `url` to `path` unless an identical file is already there.
///
/// A non-success status is returned as an outcome without touching the
/// disk. When the server sends an ETag equal to the MD5 of the existing file
/// the body is never read.
pub async fn download_file(
    fetcher: &dyn Fetch,
    url: &str,
    path: &Path,
    options: &DownloadOptions,
) -> Result<DownloadOutcome> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::info!("Downloading: {}", filename);
    tracing::debug!("Path: {}", path.display());
    tracing::debug!("URL: {}", url);

    if options.simulate {
        let mut progress = TransferProgress::new(Some(1), options.show_progress);
        progress.advance(1);
        progress.finish();
        return Ok(DownloadOutcome::Success(200));
    }

    let local_digest = if path.is_file() {
        Some(hash_md5(path)?)
    } else {
        None
    };

    let remote = fetcher.fetch(url).await?;

    if !(200..300).contains(&remote.status) {
        return Ok(match remote.status {
            404 => DownloadOutcome::NotFound,
            status => DownloadOutcome::Failed(status),
        });
    }

    match (remote.etag.as_deref(), local_digest.as_deref()) {
        (None, _) => tracing::warn!("No server hash found for attachment"),
        (Some(etag), Some(digest)) if etag_matches(etag, digest) => {
            return Ok(DownloadOutcome::AlreadyExists);
        }
        _ => {}
    }

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            tracing::debug!("Creating {} because it did not exist", parent.display());
            fs::create_dir_all(parent).await?;
        }
    }

    let part = partial_path(path);
    let progress = TransferProgress::new(remote.content_length, options.show_progress);

    if let Err(e) = write_body(remote.body, &part, path, progress).await {
        if part.exists() {
            if let Err(remove_err) = fs::remove_file(&part).await {
                tracing::warn!("Could not remove {}: {}", part.display(), remove_err);
            }
        }
        return Err(e);
    }

    Ok(DownloadOutcome::Success(remote.status))
}

/// Stream `body` into `part`, then move it over `path`.
///
/// Local write failures are reported as [`Error::Download`]; errors from the
/// body stream are passed through so transient ones stay retryable.
async fn write_body(
    mut body: BoxStream<'static, Result<Bytes>>,
    part: &Path,
    path: &Path,
    mut progress: TransferProgress,
) -> Result<()> {
    let write_error =
        |e: std::io::Error| Error::Download(format!("cannot write {}: {}", part.display(), e));

    let mut file = File::create(part).await.map_err(write_error)?;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await.map_err(write_error)?;
        progress.advance(chunk.len());
    }

    file.flush().await.map_err(write_error)?;
    drop(file);

    fs::rename(part, path).await.map_err(|e| {
        Error::Download(format!(
            "cannot move {} to {}: {}",
            part.display(),
            path.display(),
            e
        ))
    })?;
    progress.finish();

    Ok(())
}

/// Download with retries.
///
/// Success and already-present files stop immediately, 404 stops without
/// retrying, other failures back off `30s × attempt` until the policy runs
/// out of attempts.
pub async fn download_with_retry(
    fetcher: &dyn Fetch,
    url: &str,
    path: &Path,
    options: &DownloadOptions,
    policy: &RetryPolicy,
) -> AttachmentOutcome {
    let mut attempt = 0;

    loop {
        attempt += 1;

        match download_file(fetcher, url, path, options).await {
            Ok(DownloadOutcome::Success(_)) => return AttachmentOutcome::Downloaded,
            Ok(DownloadOutcome::AlreadyExists) => {
                tracing::info!("File already downloaded with matching hash and file name");
                return AttachmentOutcome::AlreadyExists;
            }
            Ok(DownloadOutcome::NotFound) => {
                tracing::warn!("404 Failed to download url: {}", url);
                return AttachmentOutcome::NotFound;
            }
            Ok(DownloadOutcome::Failed(status)) => {
                tracing::warn!("{} Failed to download url: {}", status, url);
            }
            Err(e) if e.is_transient() => {
                tracing::warn!("Failed to download url: {}: {}", url, e);
            }
            Err(e) => {
                tracing::warn!("Giving up on {}: {}", url, e);
                return AttachmentOutcome::Abandoned;
            }
        }

        if !policy.backoff(attempt).await {
            tracing::warn!(
                "Giving up on {} after {} attempts",
                url,
                policy.max_attempts
            );
            return AttachmentOutcome::Abandoned;
        }
    }
}
