//! Uploading built artifacts to a remote file store.
use log::*;
#[cfg(test)]
use mockall::automock;
use reqwest::{blocking::Client, header::CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use std::{env, fs::File, path::PathBuf, sync::OnceLock};

use crate::{BakeError, Result, config::UploadConfig};

/// Content type attached to every uploaded artifact.
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// A file to create in the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Local file to send.
    pub path: PathBuf,
    /// Name of the remote object, the artifact's base filename.
    pub name: String,
    pub content_type: String,
}

impl UploadRequest {
    pub fn for_artifact(path: PathBuf) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                BakeError::upload(format!(
                    "artifact path has no file name: {}",
                    path.display()
                ))
            })?;

        Ok(Self {
            path,
            name,
            content_type: BINARY_CONTENT_TYPE.into(),
        })
    }
}

#[cfg_attr(test, automock)]
pub trait Uploader {
    /// Whether a destination has been configured at all.
    fn is_configured(&self) -> bool;
    fn upload(&self, req: &UploadRequest) -> Result<()>;
}

/// Uploads with a `PUT` of the raw file to `<endpoint>/<name>`. The HTTP
/// client is only created by the first upload.
pub struct HttpUploader {
    client: OnceLock<Client>,
    endpoint: Option<String>,
    token: Option<SecretString>,
}

impl HttpUploader {
    pub fn new(endpoint: Option<String>, token: Option<SecretString>) -> Self {
        Self {
            client: OnceLock::new(),
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
            token,
        }
    }

    /// Builds an uploader from configuration, reading the token from the
    /// configured environment variable.
    pub fn from_config(config: &UploadConfig) -> Self {
        let token = env::var(&config.token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        if config.endpoint.is_some() && token.is_none() {
            debug!(
                "no upload token found in {}: uploading anonymously",
                config.token_env
            );
        }

        Self::new(config.endpoint.clone(), token)
    }

    fn client(&self) -> &Client {
        self.client.get_or_init(Client::new)
    }

    fn object_url(&self, name: &str) -> Option<String> {
        self.endpoint
            .as_ref()
            .map(|endpoint| format!("{endpoint}/{name}"))
    }
}

impl Uploader for HttpUploader {
    fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn upload(&self, req: &UploadRequest) -> Result<()> {
        let url = self
            .object_url(&req.name)
            .ok_or_else(|| BakeError::upload("no upload endpoint configured"))?;

        let file = File::open(&req.path).map_err(|e| {
            BakeError::upload(format!(
                "unable to open {}: {e}",
                req.path.display()
            ))
        })?;

        debug!("uploading {} to {url}", req.path.display());

        let mut request = self
            .client()
            .put(&url)
            .header(CONTENT_TYPE, &req.content_type)
            .body(file);

        if let Some(token) = self.token.as_ref() {
            request = request.bearer_auth(token.expose_secret());
        }

        request.send()?.error_for_status()?;

        Ok(())
    }
}
