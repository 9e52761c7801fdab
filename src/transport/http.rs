//! Multipart HTTP upload via `reqwest`.

use reqwest::Body;
use reqwest::multipart::{Form, Part};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument};

use crate::config::UploaderSettings;
use crate::types::UploadTask;

use super::Transport;
use super::error::TransportError;

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Uploads files as `multipart/form-data` POSTs.
///
/// The underlying client holds the connection pool; it is created once by
/// [`Uploader::init`](crate::Uploader::init) and dropped at shutdown.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport from process-wide settings.
    pub fn new(settings: &UploaderSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self::from_client(client))
    }

    /// Wraps a pre-configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        HttpTransport { client }
    }

    /// Builds the single-part form for `task`, streaming the file from disk.
    async fn form_for(task: &UploadTask) -> Result<Form, TransportError> {
        let read_error = |source: std::io::Error| TransportError::ReadFile {
            path: task.path.clone(),
            source,
        };
        let file = File::open(&task.path).await.map_err(read_error)?;
        let length = file.metadata().await.map_err(read_error)?.len();

        let body = Body::wrap_stream(ReaderStream::new(file));
        let mut part = Part::stream_with_length(body, length);
        if let Some(name) = task.path.file_name() {
            part = part.file_name(name.to_string_lossy().into_owned());
        }
        Ok(Form::new().part(FILE_FIELD, part))
    }
}

impl Transport for HttpTransport {
    #[instrument(skip_all, fields(path = %task.path.display(), url = %task.config.endpoint_url))]
    async fn deliver(&self, task: &UploadTask) -> Result<(), TransportError> {
        let form = Self::form_for(task).await?;
        let response = self
            .client
            .post(&task.config.endpoint_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "Endpoint responded");
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
