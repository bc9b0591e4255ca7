//! Artifact Store
//!
//! Locates the three model artifacts on disk and fetches missing ones
//! from their configured source, unpacking `.zip` archives when the
//! source is one. A missing or unverifiable artifact is never fatal:
//! callers see it as "unavailable".

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    EmailModel,
    EmailVectorizer,
    UrlModel,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::EmailModel,
        ArtifactKind::EmailVectorizer,
        ArtifactKind::UrlModel,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::EmailModel => "email_model.onnx",
            ArtifactKind::EmailVectorizer => "email_vectorizer.json",
            ArtifactKind::UrlModel => "url_model.onnx",
        }
    }
}

/// Where an artifact comes from and what it should hash to
#[derive(Debug, Clone, Default)]
pub struct ArtifactSource {
    pub url: Option<String>,
    /// Expected SHA-256, lowercase hex
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ArtifactSources {
    pub email_model: ArtifactSource,
    pub email_vectorizer: ArtifactSource,
    pub url_model: ArtifactSource,
}

impl ArtifactSources {
    pub fn get(&self, kind: ArtifactKind) -> &ArtifactSource {
        match kind {
            ArtifactKind::EmailModel => &self.email_model,
            ArtifactKind::EmailVectorizer => &self.email_vectorizer,
            ArtifactKind::UrlModel => &self.url_model,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Expected path, whether or not the file exists
    pub fn path(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Archive the artifact is unpacked from, e.g. `url_model.onnx.zip`
    pub fn archive_path(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(format!("{}.zip", kind.file_name()))
    }

    pub fn locate(&self, kind: ArtifactKind) -> Option<PathBuf> {
        let path = self.path(kind);
        path.is_file().then_some(path)
    }

    /// Hex SHA-256 of the artifact, if present and readable
    pub fn digest(&self, kind: ArtifactKind) -> Option<String> {
        let bytes = std::fs::read(self.locate(kind)?).ok()?;
        Some(hex::encode(Sha256::digest(&bytes)))
    }

    /// Locate an artifact and check it against its pinned digest.
    pub fn verified(&self, kind: ArtifactKind, source: &ArtifactSource) -> Option<PathBuf> {
        let path = self.locate(kind)?;

        let Some(expected) = source.sha256.as_deref() else {
            return Some(path);
        };

        match self.digest(kind) {
            Some(actual) if actual.eq_ignore_ascii_case(expected) => Some(path),
            Some(actual) => {
                tracing::warn!(
                    "Checksum mismatch for {}: expected {}, got {}",
                    kind.file_name(), expected, actual
                );
                None
            }
            None => None,
        }
    }

    /// Install every artifact that is missing or fails its pinned digest.
    ///
    /// A local archive is unpacked first; otherwise the artifact is
    /// downloaded from its source URL. Returns how many were installed.
    /// Failures are logged and skipped.
    pub async fn fetch_missing(&self, sources: &ArtifactSources, timeout: Duration) -> usize {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!("Cannot create models dir {}: {}", self.dir.display(), e);
            return 0;
        }

        let needs_client = ArtifactKind::ALL.iter().any(|kind| sources.get(*kind).url.is_some());
        let client = if needs_client {
            match reqwest::Client::builder().timeout(timeout).build() {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!("Failed to create HTTP client: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut installed = 0;
        for kind in ArtifactKind::ALL {
            let source = sources.get(kind);
            if self.verified(kind, source).is_some() {
                continue;
            }

            if self.archive_path(kind).is_file() {
                tracing::info!("Extracting {}...", kind.file_name());
                match self.extract_archive(kind, source).await {
                    Ok(size) => {
                        tracing::info!("Extracted {} ({} bytes)", kind.file_name(), size);
                        installed += 1;
                        continue;
                    }
                    Err(e) => tracing::warn!("Failed to extract {}: {}", kind.file_name(), e),
                }
            }

            let (Some(url), Some(client)) = (source.url.as_deref(), client.as_ref()) else {
                continue;
            };

            tracing::info!("Downloading {}...", kind.file_name());
            match self.download(client, kind, source, url).await {
                Ok(size) => {
                    tracing::info!("Downloaded {} ({} bytes)", kind.file_name(), size);
                    installed += 1;
                }
                Err(e) => tracing::warn!("Failed to download {}: {}", kind.file_name(), e),
            }
        }
        installed
    }

    async fn download(
        &self,
        client: &reqwest::Client,
        kind: ArtifactKind,
        source: &ArtifactSource,
        url: &str,
    ) -> anyhow::Result<usize> {
        let response = client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        if is_archive_url(url) {
            write_atomic(&self.archive_path(kind), &bytes).await?;
            return self.extract_archive(kind, source).await;
        }

        self.install(kind, source, &bytes).await
    }

    /// Unpack the artifact from its local archive. A bad archive is removed.
    async fn extract_archive(&self, kind: ArtifactKind, source: &ArtifactSource) -> anyhow::Result<usize> {
        let archive = self.archive_path(kind);
        let name = kind.file_name();

        let read_path = archive.clone();
        let result = match tokio::task::spawn_blocking(move || read_archive_entry(&read_path, name)).await {
            Ok(Ok(bytes)) => self.install(kind, source, &bytes).await,
            Ok(Err(e)) => Err(e),
            Err(e) => Err(e.into()),
        };

        if result.is_err() {
            let _ = tokio::fs::remove_file(&archive).await;
        }
        result
    }

    /// Check the pinned digest, then move the bytes into place
    async fn install(&self, kind: ArtifactKind, source: &ArtifactSource, bytes: &[u8]) -> anyhow::Result<usize> {
        if let Some(expected) = source.sha256.as_deref() {
            let actual = hex::encode(Sha256::digest(bytes));
            if !actual.eq_ignore_ascii_case(expected) {
                anyhow::bail!("checksum mismatch: expected {}, got {}", expected, actual);
            }
        }

        write_atomic(&self.path(kind), bytes).await?;
        Ok(bytes.len())
    }
}

/// `.zip` by path, ignoring any query string or fragment
fn is_archive_url(url: &str) -> bool {
    url.split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase()
        .ends_with(".zip")
}

fn part_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}

/// Write to `<target>.part`, then rename over `target`
async fn write_atomic(target: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let partial = part_path(target);
    tokio::fs::write(&partial, bytes).await?;
    if let Err(e) = tokio::fs::rename(&partial, target).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    Ok(())
}

/// Contents of the first file entry named `name`, at any depth
fn read_archive_entry(archive: &Path, name: &str) -> anyhow::Result<Vec<u8>> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let matches = entry.is_file()
            && Path::new(entry.name()).file_name().is_some_and(|f| f == name);
        if matches {
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            return Ok(bytes);
        }
    }

    anyhow::bail!("{} not found in {}", name, archive.display())
}
