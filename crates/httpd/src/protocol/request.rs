//! HTTP request representation.
//!
//! [`RequestHeader`] is what the request decoder produces from the request line
//! and header lines. Attaching the body stream turns it into a [`Request`], the
//! value a handler receives.

use std::collections::HashMap;
use std::fmt;

use http::{Method, Uri, Version};
use once_cell::sync::OnceCell;

use crate::codec::body::Body;
use crate::protocol::query::{parse_cookies, parse_query};
use crate::protocol::Headers;

/// The request line and headers of a request, before a body is attached.
#[derive(Debug, Clone)]
pub struct RequestHeader {
    method: Method,
    request_uri: String,
    uri: Uri,
    proto: String,
    headers: Headers,
}

impl RequestHeader {
    pub fn new(method: Method, request_uri: String, uri: Uri, proto: String, headers: Headers) -> Self {
        Self { method, request_uri, uri, proto, headers }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target exactly as written on the request line.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// Returns a reference to the parsed request target.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The protocol version token as written, e.g. `HTTP/1.1`.
    pub fn proto(&self) -> &str {
        &self.proto
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Determines if this request may carry a body based on its HTTP method.
    ///
    /// Only POST and PUT requests get a body decoder; any other method gets an
    /// always-empty body whatever its headers say.
    pub fn need_body(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT)
    }

    /// Attaches a body stream, converting this header into a full [`Request`].
    pub fn body<'conn, S: Into<String>>(self, body: Body<'conn>, remote_addr: S) -> Request<'conn> {
        let queries = parse_query(self.uri.query().unwrap_or_default());
        Request { header: self, body, remote_addr: remote_addr.into(), queries, cookies: OnceCell::new() }
    }
}

/// One parsed request, owned by its connection until the body has been drained.
pub struct Request<'conn> {
    header: RequestHeader,
    body: Body<'conn>,
    remote_addr: String,
    queries: HashMap<String, String>,
    cookies: OnceCell<HashMap<String, String>>,
}

impl<'conn> Request<'conn> {
    pub fn method(&self) -> &Method {
        self.header.method()
    }

    pub fn request_uri(&self) -> &str {
        self.header.request_uri()
    }

    pub fn uri(&self) -> &Uri {
        self.header.uri()
    }

    pub fn path(&self) -> &str {
        self.header.uri().path()
    }

    /// The query string without its leading `?`, if any.
    pub fn raw_query(&self) -> Option<&str> {
        self.header.uri().query()
    }

    pub fn proto(&self) -> &str {
        self.header.proto()
    }

    /// The protocol version, when it is one this server understands.
    pub fn version(&self) -> Option<Version> {
        match self.header.proto() {
            "HTTP/1.1" => Some(Version::HTTP_11),
            "HTTP/1.0" => Some(Version::HTTP_10),
            _ => None,
        }
    }

    pub fn headers(&self) -> &Headers {
        self.header.headers()
    }

    /// Headers may be changed by a handler before it starts writing its response.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.header.headers
    }

    pub fn body(&self) -> &Body<'conn> {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body<'conn> {
        &mut self.body
    }

    /// The peer address of the connection this request arrived on.
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    /// Returns the query parameter `name`, or `""` when absent.
    ///
    /// Values are not percent-decoded.
    pub fn query(&self, name: &str) -> &str {
        self.queries.get(name).map_or("", String::as_str)
    }

    pub fn queries(&self) -> &HashMap<String, String> {
        &self.queries
    }

    /// Returns the cookie `name`, or `""` when absent.
    ///
    /// The `Cookie` headers are parsed on first use.
    pub fn cookie(&self, name: &str) -> &str {
        self.cookies().get(name).map_or("", String::as_str)
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        self.cookies.get_or_init(|| parse_cookies(self.header.headers().get_all("Cookie").iter().map(String::as_str)))
    }

    pub fn into_header(self) -> RequestHeader {
        self.header
    }
}

impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", self.method())
            .field("request_uri", &self.request_uri())
            .field("proto", &self.proto())
            .field("headers", self.headers())
            .field("body", &self.body)
            .field("remote_addr", &self.remote_addr)
            .finish_non_exhaustive()
    }
}
