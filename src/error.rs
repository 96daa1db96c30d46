use thiserror::Error;

/// Result type for `rsdanbooru`, using [`rsdanbooru::error::Error`].
///
/// [`rsdanbooru::error::Error`]: enum.Error.html
pub type Result<T> = ::std::result::Result<T, Error>;

/// Enum for `rsdanbooru` errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The server answered with a non-success HTTP status. `reason` is the message given by the
    /// API, if available.
    #[error("HTTP error {status} for {url}: {}", describe_status(.status, .reason))]
    Http {
        url: String,
        status: u16,
        reason: Option<String>,
    },
    /// A single resource was requested and the server doesn't know about it.
    #[error("not found: {url}")]
    NotFound { url: String },
    /// The request couldn't be sent or its response couldn't be read.
    #[error("couldn't send request to {url}: {source}")]
    CannotSendRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The client couldn't be created. Contains a description of the error.
    #[error("couldn't create client: {0}")]
    CannotCreateClient(String),
    /// The API returned JSON that couldn't be turned into a post.
    #[error("post JSON: {0}")]
    Deserialization(#[from] serde_json::Error),
    /// Fetching the media of a post through its source failed.
    #[error("post #{id} has no file URL and its source {source_url:?} couldn't be fetched: {cause}")]
    MediaResolution {
        id: u64,
        source_url: String,
        #[source]
        cause: Box<Error>,
    },
    /// The post has neither a file URL nor a source to fetch its media from.
    #[error("post #{id} has no media URL")]
    NoMediaUrl { id: u64 },
}

impl Error {
    /// The HTTP status code behind this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::NotFound { .. } => Some(404),
            Error::MediaResolution { cause, .. } => cause.status(),
            _ => None,
        }
    }

    /// Whether the requested resource doesn't exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn describe_status(status: &u16, reason: &Option<String>) -> String {
    if let Some(reason) = reason {
        return reason.clone();
    }

    // Give em a generic reason
    String::from(match status {
        400 => "Bad Request: The given parameters could not be parsed",
        401 => "Unauthorized: Authentication failed",
        403 => "Forbidden: Access denied",
        404 => "Not Found",
        410 => "Gone: Pagination limit reached",
        420 => "Invalid Record: Record could not be saved",
        422 => "Locked: The resource is locked and cannot be modified",
        423 => "Already Exists: Resource already exists",
        424 => "Invalid Parameters: The given parameters were invalid",
        429 => "User Throttled: User is throttled, try again later",
        500 => "Internal Server Error: Some unknown error occurred on the server",
        502 => "Bad Gateway: A gateway server received an invalid response",
        503 => "Service Unavailable: Server cannot currently handle the request, try again later",
        _ => "Unexpected response",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_uses_api_reason() {
        let err = Error::Http {
            url: String::from("https://danbooru.donmai.us/posts.json"),
            status: 422,
            reason: Some(String::from("You cannot go beyond page 1000.")),
        };

        assert_eq!(
            err.to_string(),
            "HTTP error 422 for https://danbooru.donmai.us/posts.json: You cannot go beyond page 1000."
        );
    }

    #[test]
    fn http_error_falls_back_to_generic_reason() {
        let err = Error::Http {
            url: String::from("https://danbooru.donmai.us/posts.json"),
            status: 429,
            reason: None,
        };

        assert!(err.to_string().ends_with("User Throttled: User is throttled, try again later"));
        assert_eq!(err.status(), Some(429));
        assert!(!err.is_not_found());
    }

    #[test]
    fn media_resolution_keeps_cause_status() {
        let err = Error::MediaResolution {
            id: 42,
            source_url: String::from("https://example.com/a.png"),
            cause: Box::new(Error::NotFound {
                url: String::from("https://example.com/a.png"),
            }),
        };

        assert!(err.is_not_found());
        assert!(err.to_string().contains("post #42"));
        assert!(err.to_string().contains("\"https://example.com/a.png\""));
    }
}
