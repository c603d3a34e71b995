//! Graceful shutdown handling for the runner.
//!
//! The simulation loop polls the shared flag between ticks; nothing inside a
//! tick is interrupted.

use crate::model::world::World;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Manages graceful shutdown of the runner.
pub struct ShutdownManager {
    shutdown_requested: Arc<AtomicBool>,
    save_path: Option<PathBuf>,
    compress: bool,
    exit_code: i32,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            save_path: None,
            compress: false,
            exit_code: 0,
        }
    }

    /// Saves the world to `path` during cleanup.
    pub fn set_save_on_exit(&mut self, path: Option<PathBuf>, compress: bool) {
        self.save_path = path;
        self.compress = compress;
    }

    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        tracing::info!("Shutdown requested");
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Shared close flag, for callers that poll it from elsewhere.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_requested)
    }

    /// Raises the close flag on Ctrl-C. Must be called inside a tokio runtime.
    pub fn listen_for_ctrl_c(&self) {
        let flag = self.flag();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received, stopping after the current tick");
                flag.store(true, Ordering::SeqCst);
            }
        });
    }

    pub fn should_save_on_exit(&self) -> bool {
        self.save_path.is_some()
    }

    pub fn set_exit_code(&mut self, code: i32) {
        self.exit_code = code;
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Performs cleanup operations before exit.
    pub fn cleanup(&self, world: &World) -> Result<()> {
        tracing::info!("Performing shutdown cleanup...");

        if let Some(path) = &self.save_path {
            tracing::info!(path = %path.display(), "Saving state before exit...");
            world.save(path, self.compress)?;
        }

        tracing::info!("Cleanup complete");
        Ok(())
    }
}
