//! Loopback HTTP debug API for the galaxy viewer.
//!
//! The frame loop publishes metrics into a shared [`DebugState`] once per
//! frame; the server thread only reads them and queues requests (quit,
//! regenerate, new parameters) that the frame loop drains on its next tick.
//! Rendering state is never touched from the server thread.

pub mod server;

pub use server::{DebugServer, DebugServerError};


use galaxy_gen::ParameterSet;

/// Environment variable overriding the configured debug API port.
pub const DEBUG_PORT_ENV: &str = "GALAXY_DEBUG_PORT";

/// State shared between the frame loop and the debug server.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DebugState {
    pub frame_count: u64,
    pub frame_time_ms: f64,
    pub fps: f64,
    pub uptime_seconds: f64,
    pub window_width: u32,
    pub window_height: u32,
    /// Points in the active galaxy, zero before the first generation.
    pub point_count: usize,
    /// Value last written to the time uniform.
    pub shader_time: f32,
    /// Number of successful generations so far.
    pub generation: u64,
    pub quit_requested: bool,
    /// Served separately on `/params`.
    #[serde(skip)]
    pub params: ParameterSet,
    #[serde(skip)]
    pub pending_params: Option<ParameterSet>,
    #[serde(skip)]
    pub regenerate_requested: bool,
}

impl DebugState {
    /// Take a parameter replacement queued by `PUT /params`.
    pub fn take_pending_params(&mut self) -> Option<ParameterSet> {
        self.pending_params.take()
    }

    /// Take a regeneration request queued by `POST /command`.
    pub fn take_regenerate_request(&mut self) -> bool {
        std::mem::take(&mut self.regenerate_requested)
    }
}

/// Create a debug server when running a debug build or when explicitly
/// enabled, `None` otherwise.
pub fn create_debug_server(port: u16, enabled: bool) -> Option<DebugServer> {
    (cfg!(debug_assertions) || enabled).then(|| DebugServer::new(port))
}

/// The port from `GALAXY_DEBUG_PORT`, falling back to `default`.
pub fn get_debug_port(default: u16) -> u16 {
    std::env::var(DEBUG_PORT_ENV)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
