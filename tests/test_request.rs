use cardserve::http::request::{HeaderStore, Method};

fn store() -> HeaderStore {
    HeaderStore::new(["Content-Length", "Host"])
}

#[test]
fn test_header_capture_and_retrieval() {
    let mut headers = store();

    assert!(headers.capture(b"Host: example.com"));
    assert!(headers.capture(b"Content-Length: 42"));

    assert_eq!(headers.get("host"), Some("example.com"));
    assert_eq!(headers.get("Content-Length"), Some("42"));
    assert_eq!(headers.captured(), 2);
}

#[test]
fn test_header_name_is_case_insensitive() {
    let mut headers = store();

    assert!(headers.capture(b"CONTENT-LENGTH: 7"));
    assert_eq!(headers.get("content-length"), Some("7"));
    assert_eq!(headers.get("CoNtEnT-LeNgTh"), Some("7"));
}

#[test]
fn test_header_not_registered_is_ignored() {
    let mut headers = store();

    assert!(!headers.capture(b"Content-Type: text/plain"));
    assert_eq!(headers.get("content-type"), None);
    assert_eq!(headers.captured(), 0);
}

#[test]
fn test_header_without_colon_is_ignored() {
    let mut headers = store();

    assert!(!headers.capture(b"Host example.com"));
    assert_eq!(headers.get("host"), None);
}

#[test]
fn test_header_value_whitespace_trimmed() {
    let mut headers = store();

    headers.capture(b"Host:    spaced.example   ");
    assert_eq!(headers.get("host"), Some("spaced.example"));

    headers.capture(b"Content-Length:12");
    assert_eq!(headers.get("content-length"), Some("12"));
}

#[test]
fn test_header_value_keeps_later_colons() {
    let mut headers = store();

    headers.capture(b"Host: 10.0.0.1:8080");
    assert_eq!(headers.get("host"), Some("10.0.0.1:8080"));
}

#[test]
fn test_duplicate_header_last_wins() {
    let mut headers = store();

    headers.capture(b"Content-Length: 1");
    headers.capture(b"Content-Length: 2");

    assert_eq!(headers.get("content-length"), Some("2"));
    assert_eq!(headers.captured(), 1);
}

#[test]
fn test_clear_releases_values() {
    let mut headers = store();
    headers.capture(b"Host: example.com");
    headers.capture(b"Content-Length: 3");

    headers.clear();

    assert_eq!(headers.captured(), 0);
    assert_eq!(headers.get("host"), None);
    assert!(headers.capture(b"Host: again"));
}

#[test]
fn test_content_length_parsing() {
    let mut headers = store();
    headers.capture(b"Content-Length: 42");
    assert_eq!(headers.content_length(), 42);
}

#[test]
fn test_content_length_missing_or_invalid() {
    let mut headers = store();
    assert_eq!(headers.content_length(), 0);

    headers.capture(b"Content-Length: lots");
    assert_eq!(headers.content_length(), 0);
}

#[test]
fn test_method_prefix_matching() {
    assert_eq!(Method::from_token(b"GET /"), Method::GET);
    assert_eq!(Method::from_token(b"GETX"), Method::GET);
    assert_eq!(Method::from_token(b"HEAD / HTTP/1.1"), Method::HEAD);
    assert_eq!(Method::from_token(b"PATCH /"), Method::UNKNOWN);
    assert_eq!(Method::from_token(b""), Method::UNKNOWN);
}

#[test]
fn test_method_accepts() {
    assert!(Method::ANY.accepts(Method::GET));
    assert!(Method::ANY.accepts(Method::UNKNOWN));
    assert!(Method::PUT.accepts(Method::PUT));
    assert!(!Method::PUT.accepts(Method::GET));
    assert!(!Method::GET.accepts(Method::ANY));
}
