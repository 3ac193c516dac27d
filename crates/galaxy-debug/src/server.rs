//! HTTP debug server implementation.

use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use galaxy_gen::ParameterSet;
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::DebugState;

#[derive(Debug, thiserror::Error)]
pub enum DebugServerError {
    #[error("failed to bind to port {port}: {error}")]
    BindError { port: u16, error: String },
    #[error("failed to spawn server thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// HTTP server for the debug API, bound to 127.0.0.1 on a background thread.
pub struct DebugServer {
    port: u16,
    actual_port: Option<u16>,
    server: Option<Arc<Server>>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Deserialize)]
struct Command {
    command: String,
}

#[derive(Serialize)]
struct CommandResponse {
    executed: bool,
    command: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: f64,
}

#[derive(Serialize)]
struct AcceptedResponse {
    accepted: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type Reply = (u16, String);

impl DebugServer {
    /// Port 0 lets the OS pick; see [`DebugServer::actual_port`].
    pub fn new(port: u16) -> Self {
        Self {
            port,
            actual_port: None,
            server: None,
            handle: None,
        }
    }

    pub fn start(&mut self, state: Arc<Mutex<DebugState>>) -> Result<(), DebugServerError> {
        let server = Server::http(("127.0.0.1", self.port)).map_err(|e| {
            DebugServerError::BindError {
                port: self.port,
                error: e.to_string(),
            }
        })?;
        let server = Arc::new(server);

        let actual_port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.port);
        self.actual_port = Some(actual_port);

        let worker = Arc::clone(&server);
        let handle = thread::Builder::new()
            .name("debug-api".to_string())
            .spawn(move || Self::run_server(&worker, &state))
            .map_err(DebugServerError::Spawn)?;

        log::info!("Debug API listening on http://127.0.0.1:{actual_port}");
        self.server = Some(server);
        self.handle = Some(handle);
        Ok(())
    }

    /// Unblock the accept loop and join the server thread.
    pub fn stop(&mut self) {
        if let Some(server) = self.server.take() {
            server.unblock();
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::warn!("Debug API thread panicked");
        }
    }

    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(self.port)
    }

    fn run_server(server: &Server, state: &Arc<Mutex<DebugState>>) {
        for request in server.incoming_requests() {
            if let Err(e) = Self::handle_request(request, state) {
                log::warn!("Debug API error: {e}");
            }
        }
    }

    fn handle_request(
        mut request: Request,
        state: &Arc<Mutex<DebugState>>,
    ) -> std::io::Result<()> {
        let mut body = String::new();
        if matches!(request.method(), Method::Post | Method::Put) {
            request.as_reader().read_to_string(&mut body)?;
        }

        let (status, json) = route(request.method(), request.url(), &body, state);
        request.respond(json_response(status, json))
    }
}

impl Drop for DebugServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn route(method: &Method, url: &str, body: &str, state: &Arc<Mutex<DebugState>>) -> Reply {
    let Ok(mut debug_state) = state.lock() else {
        return error_reply(500, "debug state unavailable");
    };

    match (method, url) {
        (Method::Get, "/health") => reply(
            200,
            &HealthResponse {
                status: "ok",
                uptime_seconds: debug_state.uptime_seconds,
            },
        ),
        (Method::Get, "/metrics") => reply(200, &*debug_state),
        (Method::Get, "/params") => reply(200, &debug_state.params),
        (Method::Put, "/params") => match serde_json::from_str::<ParameterSet>(body) {
            Ok(params) => {
                debug_state.pending_params = Some(params);
                reply(202, &AcceptedResponse { accepted: true })
            }
            Err(e) => error_reply(400, &e.to_string()),
        },
        (Method::Post, "/command") => match serde_json::from_str::<Command>(body) {
            Ok(command) => {
                let executed = match command.command.as_str() {
                    "quit" => {
                        debug_state.quit_requested = true;
                        true
                    }
                    "regenerate" => {
                        debug_state.regenerate_requested = true;
                        true
                    }
                    _ => false,
                };
                reply(
                    200,
                    &CommandResponse {
                        executed,
                        command: command.command,
                    },
                )
            }
            Err(e) => error_reply(400, &e.to_string()),
        },
        (_, "/health" | "/metrics" | "/params" | "/command") => {
            error_reply(405, "method not allowed")
        }
        _ => error_reply(404, "not found"),
    }
}

fn reply<T: Serialize + ?Sized>(status: u16, value: &T) -> Reply {
    match serde_json::to_string(value) {
        Ok(json) => (status, json),
        Err(e) => error_reply(500, &e.to_string()),
    }
}

fn error_reply(status: u16, message: &str) -> Reply {
    let json = serde_json::to_string(&ErrorResponse {
        error: message.to_string(),
    })
    .unwrap_or_else(|_| "{}".to_string());
    (status, json)
}

fn json_response(status: u16, json: String) -> Response<Cursor<Vec<u8>>> {
    let response = Response::from_string(json).with_status_code(status);
    match Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
