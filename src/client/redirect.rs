// File: ./src/client/redirect.rs
//! Tower layer following 3xx responses and remembering where it ended up.
use http::{Method, Request, Response, Uri};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

/// Response extension holding the URI of the request that produced the
/// final (non-redirect) response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalUri(pub Uri);

#[derive(Clone, Debug)]
pub struct FollowRedirectLayer {
    max_redirects: usize,
}

impl FollowRedirectLayer {
    pub fn new(max_redirects: usize) -> Self {
        Self { max_redirects }
    }
}

impl<S> Layer<S> for FollowRedirectLayer {
    type Service = FollowRedirectService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FollowRedirectService {
            inner,
            max_redirects: self.max_redirects,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FollowRedirectService<S> {
    inner: S,
    max_redirects: usize,
}

/// Resolves a `Location` value against the URI that was just requested.
pub fn resolve_location(base: &Uri, location: &str) -> Option<Uri> {
    let parsed = location.parse::<Uri>().ok()?;
    let parts = parsed.into_parts();
    let mut builder = Uri::builder();

    match parts.scheme {
        Some(scheme) => builder = builder.scheme(scheme),
        None => {
            if let Some(s) = base.scheme() {
                builder = builder.scheme(s.clone());
            }
        }
    }
    match parts.authority {
        Some(authority) => builder = builder.authority(authority),
        None => {
            if let Some(a) = base.authority() {
                builder = builder.authority(a.clone());
            }
        }
    }
    if let Some(pq) = parts.path_and_query {
        builder = builder.path_and_query(pq);
    }
    builder.build().ok()
}

impl<S, ResBody> Service<Request<String>> for FollowRedirectService<S>
where
    S: Service<Request<String>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::error::Error + Send + Sync + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<String>) -> Self::Future {
        let mut inner = self.inner.clone();
        let max_redirects = self.max_redirects;

        Box::pin(async move {
            let mut current_req = req;
            let mut attempts = 0;

            loop {
                let retry = current_req.clone();
                let mut response = inner.call(current_req).await?;

                let location = response
                    .headers()
                    .get(http::header::LOCATION)
                    .and_then(|l| l.to_str().ok())
                    .and_then(|l| resolve_location(retry.uri(), l));

                match location {
                    Some(next) if response.status().is_redirection() && attempts < max_redirects => {
                        log::debug!("Redirect {} -> {}", retry.uri(), next);
                        current_req = retry;
                        *current_req.uri_mut() = next;
                        // 301/302/303 after a POST continue as a plain GET.
                        if current_req.method() == Method::POST
                            && response.status() != http::StatusCode::TEMPORARY_REDIRECT
                            && response.status() != http::StatusCode::PERMANENT_REDIRECT
                        {
                            *current_req.method_mut() = Method::GET;
                            current_req.body_mut().clear();
                            current_req.headers_mut().remove(http::header::CONTENT_TYPE);
                        }
                        attempts += 1;
                    }
                    _ => {
                        response.extensions_mut().insert(FinalUri(retry.uri().clone()));
                        return Ok(response);
                    }
                }
            }
        })
    }
}
