//! Backend commands queued from UI to backend worker.

use client_core::DiscoveryTicket;

pub enum BackendCommand {
    FetchCapabilities { ticket: DiscoveryTicket },
}
