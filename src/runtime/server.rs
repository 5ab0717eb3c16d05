//! Charge HTTP server implementation.

use crate::charge::{
    ChargeError, ChargeEvent, ChargeService, Ledger, LedgerError, MemoryLedger, RedisLedger,
};
use crate::http::StatusCode;
use crate::runtime::{LedgerConfig, ServerConfig};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// HTTP front end for the [`ChargeService`].
///
/// Routes:
/// - `POST /charge`: charge a JSON `ChargeEvent`, answer with a `ChargeReceipt`
/// - `POST /reset`: restore the default balance
/// - `GET /_health`: liveness check
pub struct ChargeServer {
    /// Server configuration.
    config: ServerConfig,
    /// Charge service shared by all connections.
    service: ChargeService,
}

impl ChargeServer {
    /// Create a server using the ledger named in `config`.
    pub fn new(config: ServerConfig) -> Result<Self, LedgerError> {
        let ledger: Arc<dyn Ledger> = match &config.ledger {
            LedgerConfig::Memory => Arc::new(MemoryLedger::new()),
            LedgerConfig::Redis(url) => Arc::new(RedisLedger::open(url)?),
        };
        Ok(Self::with_ledger(config, ledger))
    }

    /// Create a server around an existing ledger.
    pub fn with_ledger(config: ServerConfig, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            config,
            service: ChargeService::new(ledger),
        }
    }

    /// Bind the configured address and serve forever.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections accepted from `listener`.
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Charge server listening on {}", listener.local_addr()?);

        let service = self.service.clone();
        let config = Arc::new(self.config);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);

            let service = service.clone();
            let config = config.clone();

            tokio::task::spawn(async move {
                let handler = service_fn(move |req| {
                    let service = service.clone();
                    let config = config.clone();
                    async move { handle_request(req, service, config, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, handler).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    service: ChargeService,
    config: Arc<ServerConfig>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let request_id = generate_request_id();

    debug!(
        "Handling request: {} {} from {} [{}]",
        method, path, remote_addr, request_id
    );

    match (&method, path.as_str()) {
        (&Method::GET, "/_health") => Ok(text_response(StatusCode::OK, "OK")),
        (&Method::POST, "/charge") => {
            let body = match read_body(req, config.max_body_size).await {
                Ok(body) => body,
                Err(response) => return Ok(response),
            };

            let event: ChargeEvent = match serde_json::from_slice(&body) {
                Ok(event) => event,
                Err(e) => {
                    warn!("Rejected charge body: {} [{}]", e, request_id);
                    return Ok(text_response(
                        StatusCode::BAD_REQUEST,
                        format!("Invalid charge request: {}", e),
                    ));
                }
            };

            match service.charge(&event).await {
                Ok(receipt) => Ok(json_response(StatusCode::OK, &receipt)),
                Err(e) => Ok(error_response(e, &request_id)),
            }
        }
        (&Method::POST, "/reset") => match service.reset().await {
            Ok(balance) => Ok(json_response(StatusCode::OK, &balance)),
            Err(e) => Ok(error_response(e, &request_id)),
        },
        _ => Ok(text_response(
            StatusCode::NOT_FOUND,
            format!("No route for {} {}", method, path),
        )),
    }
}

/// Collect the request body, rejecting it as soon as it exceeds `limit`.
///
/// A declared `Content-Length` above the limit is refused before any of the
/// body is read; otherwise reading stops at the first frame past the limit.
async fn read_body(
    req: Request<Incoming>,
    limit: usize,
) -> Result<Bytes, Response<Full<Bytes>>> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    if declared.is_some_and(|len| len > limit as u64) {
        debug!("Declared body of {:?} bytes exceeds {}", declared, limit);
        return Err(too_large());
    }

    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(too_large()),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            Err(text_response(StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

fn too_large() -> Response<Full<Bytes>> {
    text_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
}

fn error_response(err: ChargeError, request_id: &str) -> Response<Full<Bytes>> {
    let status = err.status();
    if status.is_server_error() {
        error!("Charge error: {} [{}]", err, request_id);
    } else {
        debug!("Charge rejected: {} [{}]", err, request_id);
    }
    text_response(status, err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, data: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(data) {
        Ok(body) => build_response(status, "application/json", body.into()),
        Err(e) => text_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn text_response(status: StatusCode, body: impl Into<String>) -> Response<Full<Bytes>> {
    build_response(status, "text/plain", Bytes::from(body.into()))
}

fn build_response(
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = hyper::StatusCode::from_u16(status.0).unwrap_or_else(|_| {
        warn!(
            "Invalid status code {}, falling back to 500 Internal Server Error",
            status
        );
        hyper::StatusCode::INTERNAL_SERVER_ERROR
    });
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Generate a unique request ID.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{:x}", timestamp)
}
