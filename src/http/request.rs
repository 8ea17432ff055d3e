/// HTTP request methods.
///
/// `ANY` never comes off the wire; it only appears in route tables where it
/// matches every parsed method, `UNKNOWN` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Request line did not start with a known keyword
    UNKNOWN,
    /// GET - Retrieve a file or a directory listing
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Submit data
    POST,
    /// PUT - Store a file
    PUT,
    /// DELETE - Remove a file or an empty directory
    DELETE,
    /// MOVE - Rename a file or directory
    MOVE,
    /// Route wildcard
    ANY,
}

const KEYWORDS: [(&str, Method); 6] = [
    ("GET", Method::GET),
    ("HEAD", Method::HEAD),
    ("POST", Method::POST),
    ("PUT", Method::PUT),
    ("DELETE", Method::DELETE),
    ("MOVE", Method::MOVE),
];

impl Method {
    /// Classifies the start of a request line.
    ///
    /// Matching is by prefix and case-sensitive, so `"GET /x"` and `"GETX"`
    /// are both `GET` while `"get"` is `UNKNOWN`.
    ///
    /// # Example
    ///
    /// ```
    /// # use cardserve::http::request::Method;
    /// assert_eq!(Method::from_token(b"MOVE /a HTTP/1.1"), Method::MOVE);
    /// assert_eq!(Method::from_token(b"get /"), Method::UNKNOWN);
    /// ```
    pub fn from_token(line: &[u8]) -> Self {
        KEYWORDS
            .iter()
            .find(|(keyword, _)| line.starts_with(keyword.as_bytes()))
            .map(|(_, method)| *method)
            .unwrap_or(Method::UNKNOWN)
    }

    /// Route-side check: does a route registered for `self` accept `parsed`?
    pub fn accepts(self, parsed: Method) -> bool {
        self == Method::ANY || self == parsed
    }
}

/// What one request owns between the request line and `Closing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: Method,
    /// Percent-decoded request path
    pub path: String,
}

#[derive(Debug, Clone)]
struct HeaderValue {
    name: String,
    value: Option<String>,
}

/// The headers handlers care about, and what the current request sent for
/// them.
///
/// Names are fixed at construction and stored lowercase. Lookup and capture
/// compare names ASCII case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct HeaderStore {
    entries: Vec<HeaderValue>,
}

impl HeaderStore {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = names
            .into_iter()
            .map(|name| HeaderValue {
                name: name.as_ref().trim().to_ascii_lowercase(),
                value: None,
            })
            .collect();

        Self { entries }
    }

    /// Stores the value of a raw `Name: value` line if the name is one we
    /// track. A second line with the same name replaces the first.
    ///
    /// Returns `true` when something was captured.
    pub fn capture(&mut self, line: &[u8]) -> bool {
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            return false;
        };
        let name = line[..colon].trim_ascii();
        let value = line[colon + 1..].trim_ascii();

        match self
            .entries
            .iter_mut()
            .find(|entry| entry.name.as_bytes().eq_ignore_ascii_case(name))
        {
            Some(entry) => {
                entry.value = Some(String::from_utf8_lossy(value).into_owned());
                true
            }
            None => false,
        }
    }

    /// Retrieves a captured value by header name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .and_then(|entry| entry.value.as_deref())
    }

    /// Number of headers holding a value for the current request.
    pub fn captured(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_some()).count()
    }

    /// Releases every captured value; names stay registered.
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            entry.value = None;
        }
    }

    /// The captured Content-Length parsed as a byte count.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> u64 {
        self.get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}
