//! Tower integration for the header injector.

use std::task::{Context, Poll};

use axum::http::{Request, Response};
use futures_util::future::{self, BoxFuture, FutureExt};
use tower::{BoxError, Layer, Service};

use crate::config::SecureHeadersConfig;
use crate::security::headers::HeaderInjector;

/// Tower layer that appends security headers to every response.
#[derive(Debug, Clone)]
pub struct SecureHeadersLayer {
    injector: HeaderInjector,
}

impl SecureHeadersLayer {
    pub fn new(config: SecureHeadersConfig) -> Self {
        Self {
            injector: HeaderInjector::new(config),
        }
    }

    pub fn from_injector(injector: HeaderInjector) -> Self {
        Self { injector }
    }
}

impl<S> Layer<S> for SecureHeadersLayer {
    type Service = SecureHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecureHeadersService {
            inner,
            injector: self.injector.clone(),
        }
    }
}

/// Tower service produced by [`SecureHeadersLayer`].
///
/// Header values are built before the inner service is called. If one of
/// them fails the inner service never sees the request and the
/// `HeaderError` is returned as a `BoxError`.
#[derive(Debug, Clone)]
pub struct SecureHeadersService<S> {
    inner: S,
    injector: HeaderInjector,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SecureHeadersService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let prepared = match self.injector.headers() {
            Ok(prepared) => prepared,
            Err(e) => return future::ready(Err(e.into())).boxed(),
        };

        let fut = self.inner.call(req);
        Box::pin(async move {
            let mut response = fut.await.map_err(Into::into)?;
            prepared.apply_to(&mut response);
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{HstsConfiguration, XFrameOptionsConfiguration};
    use crate::security::HeaderError;
    use axum::body::Body;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::{service_fn, ServiceBuilder, ServiceExt};

    #[tokio::test]
    async fn test_headers_added_to_inner_response() {
        let config = SecureHeadersConfig::builder()
            .use_hsts(HstsConfiguration::new(300, false))
            .use_content_type_options()
            .build();

        let svc = ServiceBuilder::new()
            .layer(SecureHeadersLayer::new(config))
            .service(service_fn(|_req: Request<Body>| async {
                Ok::<_, Infallible>(Response::new(Body::empty()))
            }));

        let response = svc.oneshot(Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.headers()["strict-transport-security"], "max-age=300");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn test_inner_not_called_on_header_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let config = SecureHeadersConfig {
            use_hsts: true,
            ..Default::default()
        };

        let svc = SecureHeadersLayer::new(config).layer(service_fn(move |_req: Request<Body>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Infallible>(Response::new(Body::empty())) }
        }));

        let err = svc.oneshot(Request::new(Body::empty())).await.unwrap_err();
        let err = err.downcast::<HeaderError>().unwrap();
        assert!(matches!(*err, HeaderError::MissingSettings { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inner_error_propagates() {
        let config = SecureHeadersConfig::builder()
            .use_x_frame_options(XFrameOptionsConfiguration::deny())
            .build();
        let svc = SecureHeadersLayer::new(config).layer(service_fn(|_req: Request<Body>| async {
            Err::<Response<Body>, _>(std::io::Error::other("downstream"))
        }));

        let err = svc.oneshot(Request::new(Body::empty())).await.unwrap_err();
        assert_eq!(err.to_string(), "downstream");
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
