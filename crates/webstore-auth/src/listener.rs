//! Single-use loopback listener that catches the OAuth redirect.
//!
//! The listener lives only inside [`CallbackListener::wait_for_code`]: the
//! sockets and every connection task are dropped when that call returns or
//! when its future is dropped.

use crate::{Error, Result};
use http::header::CONTENT_TYPE;
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Port registered as the loopback redirect
pub const DEFAULT_CALLBACK_PORT: u16 = 14809;

/// Idle connections are closed after this long so shutdown is prompt
const CONNECTION_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// What a single inbound request carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackQuery {
    Code(String),
    Denied(String),
    Empty,
}

impl CallbackQuery {
    /// Parse the query string of a redirect request
    pub fn parse(query: Option<&str>) -> Self {
        let mut error = None;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            match key.as_ref() {
                "code" if !value.is_empty() => return CallbackQuery::Code(value.into_owned()),
                "error" if !value.is_empty() => error = Some(value.into_owned()),
                _ => {}
            }
        }

        match error {
            Some(reason) => CallbackQuery::Denied(reason),
            None => CallbackQuery::Empty,
        }
    }
}

/// Pages served back to the browser
struct Pages {
    account: String,
    auth_url: String,
}

impl Pages {
    fn confirmation(&self) -> String {
        format!(
            "Got it! Authorization for account \"{}\" done. \
             Check your console for new details. Tab now can be closed.",
            html_escape(&self.account)
        )
    }

    fn retry_link(&self) -> String {
        format!(
            "<a href=\"{}\">Please click here and allow access for account \"{}\" \
             to continue uploading..</a>",
            html_escape(&self.auth_url),
            html_escape(&self.account)
        )
    }

    fn denied(&self, reason: &str) -> String {
        format!(
            "Authorization for account \"{}\" failed: {}. Check your console.<br>{}",
            html_escape(&self.account),
            html_escape(reason),
            self.retry_link()
        )
    }
}

/// A bound, not yet serving, redirect listener
#[derive(Debug)]
pub struct CallbackListener {
    listener: TcpListener,
    listener_v6: Option<TcpListener>,
    addr: SocketAddr,
}

impl CallbackListener {
    /// Bind on `127.0.0.1` and, when available, `::1`; port 0 picks a free port.
    ///
    /// `localhost` may resolve to either family, so the IPv6 socket shares
    /// the IPv4 port. Only the IPv4 bind is mandatory.
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| Error::Listener(format!("Failed to bind port {}: {}", port, e)))?;
        let addr = listener
            .local_addr()
            .map_err(|e| Error::Listener(e.to_string()))?;

        let listener_v6 = match TcpListener::bind(("::1", addr.port())).await {
            Ok(l) => Some(l),
            Err(e) => {
                tracing::debug!("IPv6 loopback unavailable on port {}: {}", addr.port(), e);
                None
            }
        };

        tracing::debug!(
            "Callback listener bound on {}{}",
            addr,
            if listener_v6.is_some() { " and [::1]" } else { "" }
        );

        Ok(Self {
            listener,
            listener_v6,
            addr,
        })
    }

    /// Every address accepting redirects
    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        let mut addrs = vec![self.addr];
        if let Some(addr) = self.listener_v6.as_ref().and_then(|l| l.local_addr().ok()) {
            addrs.push(addr);
        }
        addrs
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Redirect URI to register in the consent URL
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.port())
    }

    /// Serve until a request carries an authorization code, then shut down.
    ///
    /// Requests without a code get a page re-offering `auth_url`. A request
    /// carrying `error=...` gets the same link and ends the wait with
    /// [`Error::Denied`]. Interrupts are left to the caller.
    pub async fn wait_for_code(
        self,
        account: &str,
        auth_url: &str,
        timeout: Option<Duration>,
    ) -> Result<String> {
        let pages = Arc::new(Pages {
            account: account.to_string(),
            auth_url: auth_url.to_string(),
        });
        let (tx, mut rx) = mpsc::channel::<CallbackQuery>(1);
        let mut connections = JoinSet::new();

        let deadline = async {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let outcome = loop {
            tokio::select! {
                Some(outcome) = rx.recv() => break outcome,
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted
                        .map_err(|e| Error::Listener(format!("Accept failed: {}", e)))?;
                    tracing::trace!("Callback connection from {}", peer);
                    connections.spawn(serve_connection(stream, tx.clone(), Arc::clone(&pages)));
                }
                accepted = accept_optional(self.listener_v6.as_ref()) => {
                    let (stream, peer) = accepted
                        .map_err(|e| Error::Listener(format!("Accept failed: {}", e)))?;
                    tracing::trace!("Callback connection from {}", peer);
                    connections.spawn(serve_connection(stream, tx.clone(), Arc::clone(&pages)));
                }
                _ = &mut deadline => {
                    return Err(Error::Timeout(timeout.unwrap_or_default()));
                }
            }
        };

        // Stop accepting, then let the answering connection flush its page
        drop(self.listener);
        drop(self.listener_v6);
        let _ = tokio::time::timeout(CONNECTION_IDLE_TIMEOUT, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        tracing::debug!("Callback listener on {} stopped", self.addr);

        match outcome {
            CallbackQuery::Code(code) => Ok(code),
            CallbackQuery::Denied(reason) => Err(Error::Denied(reason)),
            CallbackQuery::Empty => Err(Error::Listener("callback without code".to_string())),
        }
    }
}

async fn accept_optional(
    listener: Option<&TcpListener>,
) -> std::io::Result<(TcpStream, SocketAddr)> {
    match listener {
        Some(listener) => listener.accept().await,
        None => std::future::pending().await,
    }
}

async fn serve_connection(stream: TcpStream, tx: mpsc::Sender<CallbackQuery>, pages: Arc<Pages>) {
    let service = service_fn(move |req: Request<Incoming>| {
        let tx = tx.clone();
        let pages = Arc::clone(&pages);
        async move { Ok::<_, Infallible>(handle_request(req, &tx, &pages)) }
    });

    let result = http1::Builder::new()
        .timer(TokioTimer::new())
        .keep_alive(false)
        .header_read_timeout(CONNECTION_IDLE_TIMEOUT)
        .serve_connection(TokioIo::new(stream), service)
        .await;

    if let Err(e) = result {
        tracing::debug!("Callback connection closed: {}", e);
    }
}

fn handle_request(
    req: Request<Incoming>,
    tx: &mpsc::Sender<CallbackQuery>,
    pages: &Pages,
) -> Response<Full<Bytes>> {
    let query = CallbackQuery::parse(req.uri().query());

    let (status, body) = match &query {
        CallbackQuery::Code(_) => (StatusCode::OK, pages.confirmation()),
        CallbackQuery::Denied(reason) => (StatusCode::BAD_REQUEST, pages.denied(reason)),
        CallbackQuery::Empty => (StatusCode::OK, pages.retry_link()),
    };

    if query != CallbackQuery::Empty {
        // Capacity 1: a second code racing the first is dropped
        let _ = tx.try_send(query);
    }

    html_response(status, body)
}

fn html_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from(body)));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        CONTENT_TYPE,
        http::HeaderValue::from_static("text/html; charset=utf-8"),
    );
    resp
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code() {
        assert_eq!(
            CallbackQuery::parse(Some("code=4%2F0Ab&scope=x")),
            CallbackQuery::Code("4/0Ab".to_string())
        );
    }

    #[test]
    fn test_parse_error() {
        assert_eq!(
            CallbackQuery::parse(Some("error=access_denied")),
            CallbackQuery::Denied("access_denied".to_string())
        );
    }

    #[test]
    fn test_code_wins_over_error() {
        assert_eq!(
            CallbackQuery::parse(Some("error=x&code=abc")),
            CallbackQuery::Code("abc".to_string())
        );
    }

    #[test]
    fn test_parse_without_code() {
        assert_eq!(CallbackQuery::parse(None), CallbackQuery::Empty);
        assert_eq!(CallbackQuery::parse(Some("code=")), CallbackQuery::Empty);
        assert_eq!(CallbackQuery::parse(Some("foo=bar")), CallbackQuery::Empty);
    }

    #[test]
    fn test_retry_link_escapes_url() {
        let pages = Pages {
            account: "default".to_string(),
            auth_url: "https://example.com/auth?a=1&b=2".to_string(),
        };

        let html = pages.retry_link();
        assert!(html.contains("href=\"https://example.com/auth?a=1&amp;b=2\""));
        assert!(html.contains("account \"default\""));
    }

    #[test]
    fn test_denied_page_offers_retry_link() {
        let pages = Pages {
            account: "default".to_string(),
            auth_url: "https://example.com/auth".to_string(),
        };

        let html = pages.denied("access_denied");
        assert!(html.contains("failed: access_denied"));
        assert!(html.contains("href=\"https://example.com/auth\""));
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = CallbackListener::bind(0).await.unwrap();
        assert_ne!(listener.port(), 0);
        assert!(listener.local_addrs().iter().all(|a| a.port() == listener.port()));
        assert_eq!(
            listener.redirect_uri(),
            format!("http://localhost:{}", listener.port())
        );
    }
}
