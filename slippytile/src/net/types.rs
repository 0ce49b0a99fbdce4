//! Request and response types shared by the transport and retry layers.

/// Extra request headers, sent in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    items: Vec<(String, String)>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.items.push((name.into(), value.into()));
    }

    /// Builder-style [`RequestHeaders::add`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    pub fn items(&self) -> &[(String, String)] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Validators for a conditional GET.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditional {
    /// Sent as `If-None-Match`.
    pub if_none_match: Option<String>,
    /// Sent as `If-Modified-Since`.
    pub if_modified_since: Option<String>,
}

impl Conditional {
    /// Converts the validators into request header pairs.
    pub fn to_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(etag) = &self.if_none_match {
            headers.push(("If-None-Match".to_string(), etag.clone()));
        }
        if let Some(since) = &self.if_modified_since {
            headers.push(("If-Modified-Since".to_string(), since.clone()));
        }
        headers
    }

    pub fn is_empty(&self) -> bool {
        self.if_none_match.is_none() && self.if_modified_since.is_none()
    }
}

/// Response headers relevant to caching, plus every header as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub content_length: Option<u64>,
    /// All headers in arrival order, names as received.
    pub raw: Vec<(String, String)>,
}

impl ResponseHeaders {
    /// Builds headers from `(name, value)` pairs.
    ///
    /// Names match case-insensitively and values are trimmed. A
    /// `content-length` that does not parse as an unsigned integer is ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut headers = Self::default();
        for (name, value) in pairs {
            let name = name.as_ref();
            let value = value.as_ref().trim();

            match name.to_ascii_lowercase().as_str() {
                "etag" => headers.etag = Some(value.to_string()),
                "last-modified" => headers.last_modified = Some(value.to_string()),
                "content-type" => headers.content_type = Some(value.to_string()),
                "content-encoding" => headers.content_encoding = Some(value.to_string()),
                "content-length" => {
                    if let Ok(len) = value.parse::<u64>() {
                        headers.content_length = Some(len);
                    }
                }
                _ => {}
            }
            headers.raw.push((name.to_string(), value.to_string()));
        }
        headers
    }
}

/// Outcome of a single GET.
///
/// A `status` of 0 means the request never produced an HTTP response
/// (DNS, connect, TLS or body read failure).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: ResponseHeaders,
    /// Final URL after redirects.
    pub effective_url: String,
}

impl HttpResponse {
    /// A transport-level failure for `url`.
    pub fn transport_failure(url: &str) -> Self {
        Self {
            effective_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status == 0
    }

    /// Transport failures and 5xx responses are worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.status == 0 || (500..600).contains(&self.status)
    }
}
