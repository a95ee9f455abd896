//! Community (group of groups) management on top of a messaging socket.
//!
//! - [`binary`] - structured payload trees
//! - [`ds`] - the query transport the operations run on
//! - [`core`] - request builders, response extractors, [`core::CommunitySocket`]
//! - [`app`] - keyed serialization and the dirty-bit listener

pub mod app;
pub mod binary;
pub mod config;
pub mod core;
pub mod ds;
pub mod jid;
pub mod utils;

pub use config::CommunityConfig;

/// Initialise `env_logger` from `RUST_LOG`. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}
