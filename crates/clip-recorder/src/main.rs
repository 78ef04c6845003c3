//! Clip-Recorder: record, preview and save audio clips from the console.

mod app;
mod app_command;
mod config;
mod console;
mod engine;
mod error;
mod services;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    console::ConsoleHandler,
    error::{AppError, Result as AppResult},
};

use crate::{
    config::Config,
    engine::CpalEngine,
    services::{DesktopNotifier, DesktopPermissionGate},
};

use clip_recorder_core::{LocalFileStore, RecordingSession, SessionDeps, SystemClock};

use std::{sync::Arc, time::Duration};

use tokio::sync::{mpsc, watch};
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "clip_recorder=debug,clip_recorder_core=debug";
const LOG_FILE_PREFIX: &str = "clip-recorder.log";

/// Application entry point.
fn main() {
    // Keeps the log file writer flushing until exit.
    let _log_guard = init_logging();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.prepare_storage() {
        error!("Failed to prepare storage: {:?}", e);
        std::process::exit(1);
    }

    let engine = match CpalEngine::new() {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to create audio engine: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let deps = SessionDeps {
            engine: Arc::new(engine),
            files: Arc::new(LocalFileStore),
            permissions: Arc::new(DesktopPermissionGate),
            notifier: Arc::new(DesktopNotifier::new(config.notifications.desktop)),
            clock: Arc::new(SystemClock),
        };

        let (session, session_events) = RecordingSession::mount(deps, config.session_config());
        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let console = ConsoleHandler::new(command_tx);
        let app = App {
            session,
            session_events,
            command_rx,
            shutdown_tx,
        };

        tokio::join!(
            async {
                if let Err(e) = console.run(shutdown_rx).await {
                    error!(error = ?e, "Console handler error");
                }
            },
            async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            }
        );
    });

    // stdin reads cannot be cancelled; do not wait on them.
    rt.shutdown_timeout(Duration::from_secs(1));
}

/// Console logging on stderr plus a daily JSON log file in the data
/// directory when it can be determined.
fn init_logging() -> Option<WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match Config::log_dir() {
        Ok(log_dir) => {
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter())
                .with(console)
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(filter())
                .with(console)
                .init();
            None
        }
    }
}
