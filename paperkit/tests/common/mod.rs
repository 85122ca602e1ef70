//! Shared doubles for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use paperkit::artifact::{HttpTransport, TransportError};
use paperkit::server::{ControlChannel, ControlChannelError, ControlEndpoint};
use reqwest::Url;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// In-memory web server: exact URL → body.
#[derive(Default)]
pub struct FakeRemote {
    files: Mutex<HashMap<String, Vec<u8>>>,
    pub probes: AtomicUsize,
    pub downloads: AtomicUsize,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: Vec<u8>) {
        self.files.lock().unwrap().insert(url.to_string(), body);
    }

    fn body(&self, url: &Url) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(url.as_str()).cloned()
    }
}

impl HttpTransport for FakeRemote {
    async fn probe(&self, url: &Url) -> Result<bool, TransportError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(self.body(url).is_some())
    }

    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        self.body(url).ok_or_else(|| TransportError::Status {
            url: url.to_string(),
            status: 404,
        })
    }

    async fn download_to<W>(&self, url: &Url, sink: &mut W) -> Result<u64, TransportError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let body = self.get_bytes(url).await?;
        sink.write_all(&body).await?;
        sink.flush().await?;
        Ok(body.len() as u64)
    }
}

/// Records every command; reachability and failure are configurable.
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Mutex<Vec<(ControlEndpoint, String)>>,
    pub reachable: bool,
    pub fail: bool,
}

impl RecordingChannel {
    pub fn reachable() -> Self {
        Self {
            reachable: true,
            ..Default::default()
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }
}

impl ControlChannel for RecordingChannel {
    async fn send_command(
        &self,
        endpoint: &ControlEndpoint,
        command: &str,
    ) -> Result<String, ControlChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((endpoint.clone(), command.to_string()));
        if self.fail {
            return Err(ControlChannelError::Session {
                address: endpoint.address(),
                reason: "authentication rejected".to_string(),
            });
        }
        Ok(String::new())
    }

    async fn is_reachable(&self, _endpoint: &ControlEndpoint) -> bool {
        self.reachable
    }
}

/// Build a jar with the given entries.
pub fn jar(entries: &[&str]) -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for entry in entries {
        zip.start_file(*entry, SimpleFileOptions::default()).unwrap();
        zip.write_all(b"content").unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A jar the fetcher accepts as a plugin.
pub fn plugin_jar() -> Vec<u8> {
    jar(&["plugin.yml", "com/example/Main.class"])
}

/// A well-formed jar without plugin manifests.
pub fn library_jar() -> Vec<u8> {
    jar(&["META-INF/MANIFEST.MF", "com/example/Util.class"])
}

/// Maven-layout URL of `org.example:{name}:1.0` under `base`.
pub fn artifact_url(base: &str, name: &str) -> String {
    format!("{}org/example/{name}/1.0/{name}-1.0.jar", base, name = name)
}
