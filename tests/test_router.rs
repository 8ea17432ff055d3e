use cardserve::http::connection::Dispatcher;
use cardserve::http::request::Method;
use cardserve::http::router::{HandlerFuture, Router};

fn noop(_: &mut Dispatcher<()>) -> HandlerFuture<'_> {
    Box::pin(async { anyhow::Ok(()) })
}

fn other(_: &mut Dispatcher<()>) -> HandlerFuture<'_> {
    Box::pin(async { anyhow::Ok(()) })
}

#[test]
fn test_exact_pattern() {
    let router = Router::new().route("/status", Method::GET, noop);

    assert_eq!(router.position("/status", Method::GET), Some(0));
    assert_eq!(router.position("/status/x", Method::GET), None);
    assert_eq!(router.position("/statu", Method::GET), None);
}

#[test]
fn test_wildcard_pattern_is_prefix() {
    let router = Router::new().route("/files/*", Method::GET, noop);

    assert_eq!(router.position("/files/", Method::GET), Some(0));
    assert_eq!(router.position("/files/a/b.txt", Method::GET), Some(0));
    assert_eq!(router.position("/file", Method::GET), None);
}

#[test]
fn test_method_must_match() {
    let router = Router::new()
        .route("/*", Method::GET, noop)
        .route("/*", Method::PUT, other);

    assert_eq!(router.position("/a", Method::GET), Some(0));
    assert_eq!(router.position("/a", Method::PUT), Some(1));
    assert_eq!(router.position("/a", Method::DELETE), None);
    assert_eq!(router.position("/a", Method::UNKNOWN), None);
}

#[test]
fn test_any_matches_every_method() {
    let router = Router::new().route("/*", Method::ANY, noop);

    for method in [Method::GET, Method::HEAD, Method::MOVE, Method::UNKNOWN] {
        assert_eq!(router.position("/x", method), Some(0));
    }
}

#[test]
fn test_first_match_wins() {
    let router = Router::new()
        .route("/a/*", Method::ANY, noop)
        .route("/a/b", Method::GET, other);

    assert_eq!(router.position("/a/b", Method::GET), Some(0));
}

#[test]
fn test_appending_does_not_change_earlier_match() {
    let router = Router::new()
        .route("/*", Method::GET, noop)
        .route("/exact", Method::PUT, other);
    let before = router.position("/exact", Method::GET);

    let router = router
        .route("/exact", Method::GET, other)
        .route("/*", Method::GET, other);

    assert_eq!(router.position("/exact", Method::GET), before);
    assert_eq!(router.len(), 4);
}

#[test]
fn test_empty_router() {
    let router: Router<()> = Router::default();

    assert!(router.is_empty());
    assert!(router.find("/", Method::GET).is_none());
}

#[test]
fn test_find_returns_route() {
    let router = Router::new().route("/x*", Method::MOVE, noop);
    let route = router.find("/xyz", Method::MOVE).unwrap();

    assert_eq!(route.pattern, "/x*");
    assert_eq!(route.method, Method::MOVE);
}
