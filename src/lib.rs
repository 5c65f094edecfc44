//! ollama-bridge library
//!
//! A Discord bot that proxies a local Ollama server and exposes a few
//! host-introspection commands.
//!
//! ## Architecture
//!
//! Isolated slash-command handlers over three external surfaces: the Ollama
//! HTTP API, host commands (nvidia-smi, who), and flat files on disk. The one
//! shared internal component is the chunked reply formatter in `reply`, which
//! fits arbitrary-length output into Discord's message-length caps.
//!
//! - `config`: runtime configuration built once at startup
//! - `logging`: structured logging with tracing
//! - `reply`: chunked reply formatting under the message-length budget
//! - `ollama`: typed client for the Ollama model-listing API
//! - `host`: nvidia-smi / who execution and session filtering
//! - `user_config`: per-user JSON config (switch-model override)
//! - `preprompt`: the persisted, admin-managed pre-prompt file
//! - `discord`: gateway client and the slash-command handlers

pub mod config;
pub mod discord;
pub mod host;
pub mod logging;
pub mod ollama;
pub mod preprompt;
pub mod reply;
pub mod user_config;

pub use logging::init_tracing;
