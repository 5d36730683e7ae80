//! Concurrent artifact retrieval from a remote origin or a local mirror
//!
//! Every requirement is fetched in its own task; the fetch stage returns once all
//! of them finished, or as soon as one of them failed.

use super::{is_binary, Artifact, ArtifactKey, Requirements, ResolvedArtifacts};
use crate::error::{BundleError, Result};
use tokio::fs;
use tokio::task::JoinSet;
use url::Url;

/// Receives one unit of progress per completed retrieval
pub trait FetchProgress {
    /// Called once before any retrieval starts
    fn start(&mut self, total: usize);

    /// Called when `key` finished downloading, in completion order
    fn advance(&mut self, key: ArtifactKey, url: &Url);

    /// Called once after every retrieval succeeded
    fn finish(&mut self);

    /// Called once when a retrieval failed and the rest were abandoned
    fn fail(&mut self) {}
}

/// Artifact fetcher - retrieves a requirement set over HTTP or from disk
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: reqwest::Client,
}

impl ArtifactFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Retrieve every requirement concurrently.
    ///
    /// Fails with the first retrieval error; the remaining tasks are aborted.
    pub async fn fetch_all<P>(
        &self,
        requirements: &Requirements,
        progress: &mut P,
    ) -> Result<ResolvedArtifacts>
    where
        P: FetchProgress + ?Sized,
    {
        progress.start(requirements.len());

        let mut tasks = JoinSet::new();
        for (key, url) in requirements.iter() {
            let client = self.client.clone();
            let url = url.clone();
            tasks.spawn(async move {
                let outcome = fetch_one(&client, key, &url).await;
                (key, url, outcome)
            });
        }

        let mut resolved = ResolvedArtifacts::new();
        while let Some(joined) = tasks.join_next().await {
            let (key, url, outcome) = match joined {
                Ok(done) => done,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    progress.fail();
                    return Err(BundleError::Interrupted(e.to_string()));
                }
            };

            match outcome {
                Ok(artifact) => {
                    resolved.insert(key, artifact);
                    progress.advance(key, &url);
                }
                Err(e) => {
                    tasks.abort_all();
                    progress.fail();
                    return Err(e);
                }
            }
        }

        progress.finish();
        Ok(resolved)
    }
}

/// Retrieve a single artifact, as bytes or text depending on its suffix
async fn fetch_one(client: &reqwest::Client, key: ArtifactKey, url: &Url) -> Result<Artifact> {
    let failure = |reason: String| BundleError::Retrieval {
        key,
        url: url.to_string(),
        reason,
    };

    let bytes = if url.scheme() == "file" {
        let path = url
            .to_file_path()
            .map_err(|_| failure("not a local file path".to_string()))?;
        fs::read(&path).await.map_err(|e| failure(e.to_string()))?
    } else {
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failure(format!("HTTP {}", response.status())));
        }

        response
            .bytes()
            .await
            .map_err(|e| failure(e.to_string()))?
            .to_vec()
    };

    if is_binary(url) {
        Ok(Artifact::Binary(bytes))
    } else {
        String::from_utf8(bytes)
            .map(Artifact::Text)
            .map_err(|_| failure("content is not valid UTF-8".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::Path;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct RecordingProgress {
        total: Option<usize>,
        advanced: Vec<ArtifactKey>,
        finished: bool,
        failed: bool,
    }

    impl FetchProgress for RecordingProgress {
        fn start(&mut self, total: usize) {
            self.total = Some(total);
        }

        fn advance(&mut self, key: ArtifactKey, _url: &Url) {
            self.advanced.push(key);
        }

        fn finish(&mut self) {
            self.finished = true;
        }

        fn fail(&mut self) {
            self.failed = true;
        }
    }

    fn write_artifacts(dir: &Path) {
        std::fs::write(dir.join("quiet.js"), "var Quiet = {};").unwrap();
        std::fs::write(dir.join("quiet-emscripten.js"), "var Module = {};").unwrap();
        std::fs::write(dir.join("quiet-emscripten.js.mem"), [0u8, 1, 2, 0, 255]).unwrap();
        std::fs::write(dir.join("quiet-profiles.json"), r#"{"robust":{}}"#).unwrap();
    }

    #[tokio::test]
    async fn test_fetch_all_resolves_every_key() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        let source = crate::artifacts::ArtifactSource::local(dir.path().to_path_buf());
        let reqs = Requirements::from_source(&source).unwrap();

        let fetcher = ArtifactFetcher::new("test");
        let mut progress = RecordingProgress::default();
        let resolved = fetcher.fetch_all(&reqs, &mut progress).await.unwrap();

        assert_eq!(resolved.len(), 4);
        assert_eq!(
            resolved.get(ArtifactKey::MemoryImage),
            Some(&Artifact::Binary(vec![0, 1, 2, 0, 255]))
        );
        for key in [ArtifactKey::Glue, ArtifactKey::Loader, ArtifactKey::Profiles] {
            assert!(resolved.text(key).is_ok(), "{} should be text", key);
        }

        assert_eq!(progress.total, Some(4));
        assert_eq!(progress.advanced.len(), 4);
        assert!(progress.finished);
        assert!(!progress.failed);
    }

    #[tokio::test]
    async fn test_one_missing_artifact_fails_whole_fetch() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        std::fs::remove_file(dir.path().join("quiet-profiles.json")).unwrap();
        let base = Url::from_directory_path(dir.path()).unwrap();
        let reqs = Requirements::from_base(&base).unwrap();

        let fetcher = ArtifactFetcher::new("test");
        let mut progress = RecordingProgress::default();
        let err = fetcher.fetch_all(&reqs, &mut progress).await.unwrap_err();

        assert!(matches!(
            err,
            BundleError::Retrieval {
                key: ArtifactKey::Profiles,
                ..
            }
        ));
        assert!(progress.failed);
        assert!(!progress.finished);
    }

    #[tokio::test]
    async fn test_non_utf8_text_artifact_is_retrieval_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        std::fs::write(dir.path().join("quiet.js"), [0xffu8, 0xfe]).unwrap();
        let base = Url::from_directory_path(dir.path()).unwrap();
        let reqs = Requirements::from_base(&base).unwrap();

        let err = ArtifactFetcher::new("test")
            .fetch_all(&reqs, &mut RecordingProgress::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BundleError::Retrieval {
                key: ArtifactKey::Glue,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_suffix_rule_decides_content_kind() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.js"), "text").unwrap();
        std::fs::write(dir.path().join("image.mem"), "also text, read as bytes").unwrap();
        let base = Url::from_directory_path(dir.path()).unwrap();

        let mut entries = BTreeMap::new();
        for key in ArtifactKey::ALL {
            let name = if key == ArtifactKey::MemoryImage {
                "image.mem"
            } else {
                "a.js"
            };
            entries.insert(key, base.join(name).unwrap());
        }
        let reqs = Requirements::new(entries).unwrap();

        let resolved = ArtifactFetcher::new("test")
            .fetch_all(&reqs, &mut RecordingProgress::default())
            .await
            .unwrap();

        assert_eq!(
            resolved.bytes(ArtifactKey::MemoryImage).unwrap(),
            b"also text, read as bytes"
        );
        assert_eq!(resolved.text(ArtifactKey::Loader).unwrap(), "text");
    }

    /// Serve `files` under `/base/` until the test ends; anything else is a 404
    async fn start_http_server(files: Vec<(&'static str, Vec<u8>)>) -> Url {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        let files: BTreeMap<String, Vec<u8>> = files
            .into_iter()
            .map(|(name, body)| (format!("/base/{name}"), body))
            .collect();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let files = files.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut tmp = [0u8; 4096];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut tmp).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => buf.extend_from_slice(&tmp[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&buf);
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let (status_line, body) = match files.get(&path) {
                        Some(body) => ("200 OK", body.clone()),
                        None => ("404 Not Found", b"not found".to_vec()),
                    };

                    let head = format!(
                        "HTTP/1.1 {status_line}\r\n\
Content-Type: application/octet-stream\r\n\
Content-Length: {}\r\n\
Connection: close\r\n\
\r\n",
                        body.len()
                    );
                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.write_all(&body).await;
                    let _ = stream.flush().await;
                });
            }
        });

        Url::parse(&format!("http://{addr}/base/")).expect("parse server url")
    }

    fn served_artifacts() -> Vec<(&'static str, Vec<u8>)> {
        vec![
            ("quiet.js", b"var Quiet = {};".to_vec()),
            ("quiet-emscripten.js", b"var Module = {};".to_vec()),
            ("quiet-emscripten.js.mem", vec![0, 1, 255]),
            ("quiet-profiles.json", br#"{"robust":{}}"#.to_vec()),
        ]
    }

    #[tokio::test]
    async fn test_fetch_all_over_http() {
        let base = start_http_server(served_artifacts()).await;
        let reqs = Requirements::from_base(&base).unwrap();

        let mut progress = RecordingProgress::default();
        let resolved = ArtifactFetcher::new("test")
            .fetch_all(&reqs, &mut progress)
            .await
            .unwrap();

        assert_eq!(resolved.len(), 4);
        assert_eq!(
            resolved.bytes(ArtifactKey::MemoryImage).unwrap(),
            &[0u8, 1, 255][..]
        );
        assert_eq!(resolved.text(ArtifactKey::Glue).unwrap(), "var Quiet = {};");
        assert_eq!(
            resolved.text(ArtifactKey::Loader).unwrap(),
            "var Module = {};"
        );
        assert_eq!(
            resolved.text(ArtifactKey::Profiles).unwrap(),
            r#"{"robust":{}}"#
        );
        assert_eq!(progress.advanced.len(), 4);
        assert!(progress.finished);
        assert!(!progress.failed);
    }

    #[tokio::test]
    async fn test_http_error_status_is_retrieval_failure() {
        let files = served_artifacts()
            .into_iter()
            .filter(|(name, _)| *name != "quiet-profiles.json")
            .collect();
        let base = start_http_server(files).await;
        let reqs = Requirements::from_base(&base).unwrap();

        let mut progress = RecordingProgress::default();
        let err = ArtifactFetcher::new("test")
            .fetch_all(&reqs, &mut progress)
            .await
            .unwrap_err();

        match err {
            BundleError::Retrieval { key, url, reason } => {
                assert_eq!(key, ArtifactKey::Profiles);
                assert!(url.ends_with("/base/quiet-profiles.json"), "got: {url}");
                assert!(reason.contains("404"), "expected status in reason, got: {reason}");
            }
            other => panic!("expected a retrieval failure, got: {other}"),
        }
        assert!(progress.failed);
        assert!(!progress.finished);
    }
}
