//! Content retrieval for file nodes.

use std::fmt;
use std::io::Write;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};
use reqwest::{Method, Request, Response, StatusCode, Url};

use crate::client::Client;
use crate::error::{DriveError, Result};
use crate::fs::node::Node;
use crate::progress::{ProgressCallback, TransferProgress};

/// Largest buffer reserved up front from a server-supplied `Content-Length`.
const PREALLOC_LIMIT: u64 = 64 * 1024;

/// Open body of a content request.
///
/// The connection is released when the stream is dropped, whether or not it
/// was read to the end.
pub struct ContentStream {
    status: StatusCode,
    content_length: Option<u64>,
    body: BoxStream<'static, Result<Bytes>>,
}

impl ContentStream {
    fn from_response(response: Response) -> Self {
        Self {
            status: response.status(),
            content_length: response.content_length(),
            body: response
                .bytes_stream()
                .map(|chunk| chunk.map_err(DriveError::from))
                .boxed(),
        }
    }

    /// Status code of the response. Not validated by [`Node::download`].
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Content length announced by the server, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Read the remaining body into memory.
    ///
    /// The announced length only sizes the first allocation, up to 64 KiB.
    pub async fn bytes(mut self) -> Result<Vec<u8>> {
        let capacity = self.content_length.unwrap_or(0).min(PREALLOC_LIMIT);
        let mut data = Vec::with_capacity(capacity as usize);
        while let Some(chunk) = self.body.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(data)
    }
}

impl Stream for ContentStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.body.poll_next_unpin(cx)
    }
}

impl fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStream")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl Node {
    /// Open the node's content for reading.
    ///
    /// The node is not checked to be a file and the response status is not
    /// inspected; both are left to the caller.
    ///
    /// # Example
    /// ```no_run
    /// # use cloudtree::Node;
    /// # async fn example(node: &Node) -> cloudtree::Result<()> {
    /// let stream = node.download().await?;
    /// println!("status {}", stream.status());
    /// let data = stream.bytes().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download(&self) -> Result<ContentStream> {
        let (_, response) = self.request_content().await?;
        Ok(ContentStream::from_response(response))
    }

    /// Download the node's content into a writer.
    ///
    /// Unlike [`download`](Self::download) the response status is checked
    /// through the client. Progress is reported against
    /// `contentProperties.size` after every chunk; the callback may return
    /// `false` to cancel.
    ///
    /// # Returns
    /// Number of bytes written
    pub async fn download_to<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        mut progress: Option<ProgressCallback>,
    ) -> Result<u64> {
        let (client, response) = self.request_content().await?;
        client.check_response(&response)?;

        let total = self.content_properties.size;
        let mut done = 0u64;
        let mut stream = ContentStream::from_response(response);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk)?;
            done += chunk.len() as u64;

            if let Some(callback) = progress.as_mut() {
                if !callback(&TransferProgress::new(done, total, &self.name)) {
                    return Err(DriveError::Cancelled);
                }
            }
        }
        writer.flush()?;

        Ok(done)
    }

    async fn request_content(&self) -> Result<(Arc<dyn Client>, Response)> {
        let client = self.client().ok_or(DriveError::Detached)?;

        let url = client.content_url(&format!("nodes/{}/content", self.id));
        let url = Url::parse(&url).map_err(|e| {
            tracing::error!("error creating download request: {}", e);
            DriveError::RequestConstruction(format!("{}: {}", url, e))
        })?;
        let request = Request::new(Method::GET, url);

        let response = client.execute(request).await.map_err(|e| {
            tracing::error!("error downloading the file: {}", e);
            match e {
                DriveError::RequestExecution(_) => e,
                DriveError::RequestError(source) => {
                    DriveError::RequestExecution(Box::new(source))
                }
                other => DriveError::RequestExecution(Box::new(other)),
            }
        })?;

        Ok((client, response))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::config::ClientConfig;
    use crate::fs::node::NodeKind;
    use crate::fs::testing::MockClient;
    use crate::http::HttpClient;

    fn attached_http(node: &mut Node, base: &str) -> Arc<dyn Client> {
        let config = ClientConfig::new(format!("{}/metadata/", base), format!("{}/content/", base));
        let client: Arc<dyn Client> = Arc::new(HttpClient::with_config(config).unwrap());
        node.attach(&client);
        client
    }

    /// Serve one connection with a fixed raw HTTP response, then close it.
    async fn serve_once(response: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    fn attached(node: &mut Node, client: MockClient) -> Arc<MockClient> {
        let client = Arc::new(client);
        let dyn_client: Arc<dyn Client> = client.clone();
        node.attach(&dyn_client);
        client
    }

    fn file_node() -> Node {
        let mut node = Node::new("f1", "hello.txt", "FILE");
        node.content_properties.size = 11;
        node
    }

    #[tokio::test]
    async fn test_download_streams_content() {
        let mut node = file_node();
        let client = attached(&mut node, MockClient::new().with_content(b"hello world"));

        let stream = node.download().await.unwrap();
        assert_eq!(stream.status(), StatusCode::OK);
        assert_eq!(stream.bytes().await.unwrap(), b"hello world");
        assert_eq!(
            client.requests(),
            vec!["GET http://drive.test/content/nodes/f1/content"]
        );
    }

    #[tokio::test]
    async fn test_download_construction_error() {
        let mut node = file_node();
        let client = attached(
            &mut node,
            MockClient {
                base: "not a url".to_string(),
                ..MockClient::new()
            },
        );

        let err = node.download().await.unwrap_err();
        assert!(matches!(err, DriveError::RequestConstruction(_)));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_download_execution_error() {
        let mut node = file_node();
        let _client = attached(
            &mut node,
            MockClient {
                fail_execute: true,
                ..MockClient::new()
            },
        );

        let err = node.download().await.unwrap_err();
        assert!(matches!(err, DriveError::RequestExecution(_)));
        assert_eq!(
            err.to_string(),
            "error doing the HTTP request: connection refused"
        );
    }

    #[tokio::test]
    async fn test_download_execution_error_keeps_source() {
        let mut node = file_node();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let _client = attached_http(&mut node, &base);

        let err = node.download().await.unwrap_err();
        assert!(matches!(err, DriveError::RequestExecution(_)));
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<reqwest::Error>().is_some());
    }

    #[tokio::test]
    async fn test_download_oversized_content_length() {
        let mut node = file_node();
        let base = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 1000000000000000\r\n\r\nhello",
        )
        .await;
        let _client = attached_http(&mut node, &base);

        let stream = node.download().await.unwrap();
        assert_eq!(stream.content_length(), Some(1_000_000_000_000_000));
        match stream.bytes().await {
            Ok(data) => assert_eq!(data, b"hello"),
            Err(err) => assert!(matches!(err, DriveError::RequestError(_))),
        }
    }

    #[tokio::test]
    async fn test_download_does_not_check_status_or_kind() {
        let mut node = Node::new("d1", "docs", NodeKind::Folder);
        let _client = attached(
            &mut node,
            MockClient {
                status: 404,
                ..MockClient::new()
            },
        );

        let stream = node.download().await.unwrap();
        assert_eq!(stream.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_download_detached() {
        let node = file_node();
        assert!(matches!(
            node.download().await.unwrap_err(),
            DriveError::Detached
        ));

        let mut dropped = file_node();
        drop(attached(&mut dropped, MockClient::new()));
        assert!(matches!(
            dropped.download().await.unwrap_err(),
            DriveError::Detached
        ));
    }

    #[tokio::test]
    async fn test_download_to_writer() {
        let mut node = file_node();
        let _client = attached(&mut node, MockClient::new().with_content(b"hello world"));

        let reports = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = reports.clone();
        let callback: ProgressCallback = Box::new(move |p: &TransferProgress| {
            sink.lock().unwrap().push(p.clone());
            true
        });

        let mut out = Vec::new();
        let written = node.download_to(&mut out, Some(callback)).await.unwrap();
        assert_eq!(written, 11);
        assert_eq!(out, b"hello world");

        let reports = reports.lock().unwrap();
        let last = reports.last().unwrap();
        assert!(last.is_complete());
        assert_eq!(last.name, "hello.txt");
    }

    #[tokio::test]
    async fn test_download_to_checks_status() {
        let mut node = file_node();
        let _client = attached(
            &mut node,
            MockClient {
                status: 403,
                ..MockClient::new()
            },
        );

        let mut out = Vec::new();
        let err = node.download_to(&mut out, None).await.unwrap_err();
        assert!(matches!(err, DriveError::HttpError(403)));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_download_to_cancelled() {
        let mut node = file_node();
        let _client = attached(&mut node, MockClient::new().with_content(b"hello world"));

        let mut out = Vec::new();
        let err = node
            .download_to(&mut out, Some(Box::new(|_: &TransferProgress| false)))
            .await
            .unwrap_err();
        assert!(matches!(err, DriveError::Cancelled));
    }
}
