//! Request-scoped files that must not outlive the request.

use axum::body::Bytes;
use chrono::Utc;
use futures::future::BoxFuture;
use futures::Stream;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::fs::{File, OpenOptions};
use tokio_util::io::ReaderStream;

const MAX_NAME_ATTEMPTS: usize = 1000;

/// A file on disk owned by one handler invocation.
///
/// The file is removed when the guard is dropped unless it was already
/// removed explicitly, so every exit path (success, error, aborted
/// transmission) cleans up.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    removed: bool,
}

impl TempArtifact {
    /// Take ownership of `path`. The file itself may not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            removed: false,
        }
    }

    /// Create `<dir>/<prefix><unix millis>.<extension>` and guard it.
    ///
    /// The name is claimed with `create_new`, so two requests in the same
    /// millisecond never share a file: the later one moves on to the next
    /// free millisecond.
    pub async fn create_timestamped(
        dir: &Path,
        prefix: &str,
        extension: &str,
    ) -> io::Result<(Self, File)> {
        let mut millis = Utc::now().timestamp_millis();

        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = dir.join(format!("{}{}.{}", prefix, millis, extension));
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((Self::new(path), file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => millis += 1,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free {}<millis>.{} name in {}", prefix, extension, dir.display()),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Delete the file now. A file that never got created is not an error.
    pub fn remove(&mut self) -> io::Result<()> {
        if self.removed {
            return Ok(());
        }
        self.removed = true;

        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Delete the file on the blocking pool. The guard is disarmed right
    /// away; the returned future owns the deletion.
    fn remove_in_background(&mut self) -> BoxFuture<'static, io::Result<()>> {
        self.removed = true;
        let path = self.path.clone();

        Box::pin(async move {
            match tokio::fs::remove_file(&path).await {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            }
        })
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove temporary file"
            );
        }
    }
}

/// Streams a file and deletes it once the last byte has been read.
///
/// The end of the body is only signalled after the file is gone. If the
/// stream is dropped early (client went away, write error) the artifact's
/// drop guard deletes the file instead.
pub struct CleanupStream {
    inner: ReaderStream<File>,
    artifact: TempArtifact,
    removal: Option<BoxFuture<'static, io::Result<()>>>,
    finished: bool,
}

impl CleanupStream {
    pub fn new(file: File, artifact: TempArtifact) -> Self {
        Self {
            inner: ReaderStream::new(file),
            artifact,
            removal: None,
            finished: false,
        }
    }
}

impl Stream for CleanupStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        if self.removal.is_none() {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(None) => {
                    let removal = self.artifact.remove_in_background();
                    self.removal = Some(removal);
                }
                polled => return polled,
            }
        }

        let result = match self.removal.as_mut() {
            Some(removal) => ready!(removal.as_mut().poll(cx)),
            None => return Poll::Ready(None),
        };
        self.removal = None;
        self.finished = true;

        match result {
            Ok(()) => {
                tracing::debug!(path = %self.artifact.path().display(), "Transmitted file removed")
            }
            Err(e) => tracing::warn!(
                path = %self.artifact.path().display(),
                error = %e,
                "Failed to remove transmitted file"
            ),
        }

        Poll::Ready(None)
    }
}
