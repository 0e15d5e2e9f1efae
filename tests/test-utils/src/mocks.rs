//! Mock transport for driving clients without a network

use common::{Method, TransportErrorKind};
use parking_lot::Mutex;
use rest::{RawResponse, RequestOptions, SignedRequest, Transport, TransportFailure};
use std::fmt;

struct Route {
    method: Option<Method>,
    fragment: String,
    reply: Result<RawResponse, TransportFailure>,
}

/// Transport answering from canned routes and recording every request
///
/// A request is answered by the route whose URL fragment it contains; when
/// several match, the longest fragment wins. Unrouted requests fail with a
/// connection error so a missing fixture is loud.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<SignedRequest>>,
}

impl MockTransport {
    /// Empty transport
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any verb on URLs containing `fragment`
    #[must_use]
    pub fn route(self, fragment: &str, status: u16, body: &str) -> Self {
        self.push(None, fragment, Ok(RawResponse::new(status, body)))
    }

    /// Answer one verb on URLs containing `fragment`
    #[must_use]
    pub fn route_method(self, method: Method, fragment: &str, status: u16, body: &str) -> Self {
        self.push(Some(method), fragment, Ok(RawResponse::new(status, body)))
    }

    /// Fail requests to URLs containing `fragment`
    #[must_use]
    pub fn fail(self, fragment: &str, kind: TransportErrorKind) -> Self {
        self.push(None, fragment, Err(TransportFailure::new(kind, "simulated failure")))
    }

    fn push(self, method: Option<Method>, fragment: &str, reply: Result<RawResponse, TransportFailure>) -> Self {
        self.routes.lock().push(Route {
            method,
            fragment: fragment.to_string(),
            reply,
        });
        self
    }

    /// Requests seen so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<SignedRequest> {
        self.calls.lock().clone()
    }

    /// Number of requests seen
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Most recent request
    #[must_use]
    pub fn last_call(&self) -> Option<SignedRequest> {
        self.calls.lock().last().cloned()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &SignedRequest, _options: &RequestOptions) -> Result<RawResponse, TransportFailure> {
        self.calls.lock().push(request.clone());
        let routes = self.routes.lock();
        routes
            .iter()
            .filter(|route| route.method.is_none_or(|m| m == request.method))
            .filter(|route| request.url.contains(&route.fragment))
            .max_by_key(|route| route.fragment.len())
            .map(|route| route.reply.clone())
            .unwrap_or_else(|| {
                Err(TransportFailure::new(
                    TransportErrorKind::ConnectionFailed,
                    format!("no route for {} {}", request.method, request.url),
                ))
            })
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("routes", &self.routes.lock().len())
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}
