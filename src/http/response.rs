/// HTTP status codes the server answers with.
///
/// - `Ok` (200): Request successful
/// - `NotFound` (404): Missing resource, unmatched route or short transfer
/// - `RequestTimeout` (408): Request did not arrive in time
/// - `UnprocessableEntity` (422): Name the volume refuses, e.g. on PUT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 408 Request Timeout
    RequestTimeout,
    /// 422 Unprocessable Entity
    UnprocessableEntity,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use cardserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::RequestTimeout.as_u16(), 408);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::RequestTimeout => 408,
            StatusCode::UnprocessableEntity => 422,
        }
    }

    /// Standard reason phrase, for logs. The status line itself always
    /// says `OK`.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::UnprocessableEntity => "Unprocessable Entity",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
