// File: src/client/core.rs
use crate::client::PageFetcher;
use crate::client::middleware::{DefaultHeadersLayer, DefaultHeadersService};
use crate::client::redirect::{FinalUri, FollowRedirectLayer, FollowRedirectService};
use crate::config::Config;
use crate::error::{RaspError, Result};

use http::{Method, Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tower::ServiceExt;
use tower_layer::Layer;

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;
type ServiceStack = FollowRedirectService<DefaultHeadersService<HttpsClient>>;

/// Body and final location of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub final_url: String,
    pub status: StatusCode,
    pub body: String,
}

impl Fetched {
    fn into_success_body(self, url: &str) -> Result<String> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(RaspError::fetch(url, format!("HTTP {}", self.status)))
        }
    }
}

/// `PageFetcher` over hyper + rustls with native roots.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    service: ServiceStack,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() {
            // Plain-http sites (local mirrors) work without roots.
            if config.base_url.starts_with("https://") {
                return Err(RaspError::fetch(
                    &config.base_url,
                    "no valid system certificates found",
                ));
            }
            log::warn!("No system certificates found, https requests will fail");
        }
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http_client: HttpsClient = Client::builder(TokioExecutor::new()).build(https_connector);
        let with_headers = DefaultHeadersLayer::new(&config.user_agent).layer(http_client);
        let service = FollowRedirectLayer::new(config.max_redirects).layer(with_headers);

        Ok(Self { service })
    }

    pub async fn send(&self, req: Request<String>) -> Result<Fetched> {
        let url = req.uri().to_string();
        let response = self
            .service
            .clone()
            .oneshot(req)
            .await
            .map_err(|e| RaspError::fetch(&url, e))?;

        let final_url = final_url_of(&response, &url);
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| RaspError::fetch(&url, e))?
            .to_bytes();

        Ok(Fetched {
            final_url,
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    fn get_request(url: &str) -> Result<Request<String>> {
        Request::builder()
            .method(Method::GET)
            .uri(url)
            .body(String::new())
            .map_err(|e| RaspError::fetch(url, e))
    }
}

/// Where the redirect chain of `response` ended, or `requested`.
fn final_url_of<B>(response: &Response<B>, requested: &str) -> String {
    response
        .extensions()
        .get::<FinalUri>()
        .map(|f| f.0.to_string())
        .unwrap_or_else(|| requested.to_string())
}

impl PageFetcher for HttpFetcher {
    async fn fetch_document(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);
        let req = Self::get_request(url)?;
        self.send(req).await?.into_success_body(url)
    }

    async fn fetch_redirect_target(&self, url: &str) -> String {
        let req = match Self::get_request(url) {
            Ok(req) => req,
            Err(_) => return url.to_string(),
        };
        // Only the head matters here; the body is dropped unread.
        match self.service.clone().oneshot(req).await {
            Ok(response) => final_url_of(&response, url),
            Err(e) => {
                log::warn!("Could not resolve redirect for {}: {}", url, e);
                url.to_string()
            }
        }
    }

    async fn fetch_json(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<String> {
        log::debug!("POST {}", url);
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form.iter())
            .finish();

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(url)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::ACCEPT, "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let req = builder.body(body).map_err(|e| RaspError::fetch(url, e))?;

        self.send(req).await?.into_success_body(url)
    }
}
