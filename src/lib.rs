//! Relay backend that fronts the AutoAgents chat API and re-delivers
//! complete answers as a chunked SSE stream.

pub mod autoagents;
pub mod config;
pub mod routes;
pub mod state;
pub mod streaming;
