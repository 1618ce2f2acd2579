use axum::{
    extract::Request,
    http::{HeaderName, header},
    middleware::Next,
    response::Response,
};
use tower_http::{
    CompressionLevel,
    compression::{
        CompressionLayer,
        predicate::{And, DefaultPredicate, Predicate, SizeAbove},
    },
};

const NO_COMPRESSION: HeaderName = HeaderName::from_static("x-no-compression");
const MIN_COMPRESSED_BYTES: u16 = 1024;

/// Gzip at level 6 for responses of at least 1 KiB.
pub fn compression_layer() -> CompressionLayer<And<DefaultPredicate, SizeAbove>> {
    CompressionLayer::new()
        .quality(CompressionLevel::Precise(6))
        .compress_when(DefaultPredicate::new().and(SizeAbove::new(MIN_COMPRESSED_BYTES)))
}

/// Clients sending `x-no-compression` get an identity-encoded response.
/// Must sit outside the compression layer.
pub async fn honor_no_compression(mut request: Request, next: Next) -> Response {
    if request.headers().contains_key(NO_COMPRESSION) {
        request.headers_mut().remove(header::ACCEPT_ENCODING);
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, routing::get};
    use rstest::rstest;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/large", get(|| async { "x".repeat(4096) }))
            .route("/small", get(|| async { "tiny" }))
            .layer(compression_layer())
            .layer(middleware::from_fn(honor_no_compression))
    }

    #[rstest]
    #[case("/large", false, Some("gzip"))]
    #[case("/large", true, None)]
    #[case("/small", false, None)]
    #[tokio::test]
    async fn test_compression(
        #[case] path: &str,
        #[case] opt_out: bool,
        #[case] expected: Option<&str>,
    ) {
        let mut builder = axum::http::Request::get(path).header(header::ACCEPT_ENCODING, "gzip");
        if opt_out {
            builder = builder.header("x-no-compression", "1");
        }

        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let encoding = response
            .headers()
            .get(header::CONTENT_ENCODING)
            .map(|v| v.to_str().unwrap());
        assert_eq!(encoding, expected);
    }
}
