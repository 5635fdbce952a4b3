//! Runtime bridge between UI command queue and backend event intake.
//!
//! The worker only performs network fetches. Results travel back to the UI
//! thread, which owns the panel session and applies them.

use std::{thread, time::Duration};

use client_core::{CapabilitiesSource, HttpCapabilitiesSource};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, request_timeout: Duration) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::backend_startup(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                ))));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let source = match HttpCapabilitiesSource::new(request_timeout) {
            Ok(source) => source,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_discovery(&err)));
                tracing::error!("failed to build capabilities client: {err}");
                return;
            }
        };

        let _ = ui_tx.try_send(UiEvent::Info("Ready".to_string()));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                BackendCommand::FetchCapabilities { ticket } => {
                    let source = source.clone();
                    let ui_tx = ui_tx.clone();
                    runtime.spawn(async move {
                        let result = source.fetch_capabilities(ticket.server_url()).await;
                        if ui_tx
                            .send(UiEvent::CapabilitiesFetched { ticket, result })
                            .is_err()
                        {
                            tracing::debug!("ui closed before capabilities arrived");
                        }
                    });
                }
            }
        }

        tracing::debug!("backend command queue closed; stopping worker");
    });
}
