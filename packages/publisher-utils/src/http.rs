use bytes::{Bytes, BytesMut};
use http_body_util::{BodyExt, Full};
use hyper::{Method, StatusCode, Uri};
#[cfg(not(feature = "rustls-platform-verifier"))]
use hyper_rustls::ConfigBuilderExt;
use hyper_util::{
    client::legacy::{
        connect::{Connect, HttpConnector},
        Client,
    },
    rt::TokioExecutor,
};
use once_cell::sync::Lazy;
use rustls::ClientConfig;
#[cfg(feature = "rustls-platform-verifier")]
use rustls_platform_verifier::BuilderVerifierExt;
use std::{collections::HashMap, fmt};

pub type HttpError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub struct ResponseData {
    pub status: u16,
    pub body: Option<Bytes>,
}

impl ResponseData {
    pub fn is_ok(&self) -> bool {
        http_status_is_ok(self.status)
    }

    pub fn body_text(&self) -> String {
        self.body.as_ref().map_or_else(
            || "".to_string(),
            |body| String::from_utf8_lossy(body).to_string(),
        )
    }
}

impl fmt::Display for ResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response status: {}, body: {}",
            self.status,
            self.body_text()
        )
    }
}

/// Sends a single request, picking the TLS connector for `https` urls and a
/// plain connector otherwise.
pub async fn request(
    method: Method,
    url: Uri,
    header_map: &HashMap<String, String>,
    body: Option<Bytes>,
) -> Result<ResponseData, HttpError> {
    tracing::debug!("{} {}", method, url);
    if url.scheme_str() == Some("https") {
        let https = https_config()?;
        let client = Client::builder(TokioExecutor::new()).build(https);
        send(&client, method, url, header_map, body).await
    } else {
        let http = HttpConnector::new();
        let client = Client::builder(TokioExecutor::new()).build(http);
        send(&client, method, url, header_map, body).await
    }
}

async fn send<C>(
    client: &Client<C, Full<Bytes>>,
    method: Method,
    url: Uri,
    header_map: &HashMap<String, String>,
    body: Option<Bytes>,
) -> Result<ResponseData, HttpError>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    let mut req = hyper::Request::builder().method(method).uri(url);
    for (key, value) in header_map {
        req = req.header(key, value);
    }
    let req = req.body(Full::new(body.unwrap_or_default()))?;

    let mut res = client.request(req).await?;
    let status = res.status();
    let mut body = BytesMut::new();
    while let Some(next) = res.frame().await {
        let frame = next?;
        if let Some(chunk) = frame.data_ref() {
            body.extend_from_slice(chunk);
        }
    }
    Ok(ResponseData {
        status: status.as_u16(),
        body: Some(body.freeze()),
    })
}

static PROVIDER: Lazy<std::sync::Arc<rustls::crypto::CryptoProvider>> =
    Lazy::new(|| std::sync::Arc::new(rustls::crypto::ring::default_provider()));

struct HttpsConfigError {
    error: HttpError,
}

impl fmt::Display for HttpsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpsConfigError: {}", self.error)
    }
}

impl fmt::Debug for HttpsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpsConfigError: {:?}", self.error)
    }
}

impl std::error::Error for HttpsConfigError {}

fn https_config() -> Result<hyper_rustls::HttpsConnector<HttpConnector>, HttpsConfigError> {
    let provider = PROVIDER.clone();
    let tls: rustls::ClientConfig;
    #[cfg(feature = "rustls-platform-verifier")]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_platform_verifier()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_no_client_auth();
    }
    #[cfg(all(feature = "webpki-roots", not(feature = "rustls-platform-verifier")))]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_webpki_roots()
            .with_no_client_auth();
    }
    #[cfg(all(
        feature = "native-tokio",
        not(feature = "webpki-roots"),
        not(feature = "rustls-platform-verifier")
    ))]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_native_roots()
            .map_err(|e| HttpsConfigError { error: Box::new(e) })?
            .with_no_client_auth();
    }
    #[cfg(all(
        not(feature = "native-tokio"),
        not(feature = "webpki-roots"),
        not(feature = "rustls-platform-verifier")
    ))]
    {
        compile_error!("No TLS backend enabled");
    }
    Ok(hyper_rustls::HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build())
}

pub fn http_status_is_ok(status: u16) -> bool {
    if let Ok(status) = StatusCode::from_u16(status) {
        !(status.is_client_error() || status.is_server_error())
    } else {
        false
    }
}
