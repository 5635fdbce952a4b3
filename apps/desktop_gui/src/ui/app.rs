use std::time::Duration;

use client_core::{DiscoveryOutcome, LayerListing, PanelSession, ToggleOutcome};
use crossbeam_channel::{Receiver, Sender};
use map_surface::{BaseLayer, LayerStack, MapView, RenderSurface, SurfaceLayer};
use shared::error::DiscoveryError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

pub const NO_WORKSPACE_LABEL: &str = "Select a Workspace";
const IDLE_REPAINT: Duration = Duration::from_millis(250);
const PENDING_REPAINT: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
    pub map_view: MapView,
}

pub struct MapPanelApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: PanelSession,
    surface: LayerStack,
    server_url_input: String,
    pending_discovery: Option<u64>,
    controls_expanded: bool,
    status: String,
    error: Option<UiError>,
}

impl MapPanelApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            session: PanelSession::new(),
            surface: LayerStack::new(BaseLayer::default(), startup.map_view),
            server_url_input: startup.server_url,
            pending_discovery: None,
            controls_expanded: true,
            status: "Starting backend...".to_string(),
            error: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::CapabilitiesFetched { ticket, result } => {
                let outcome = self
                    .session
                    .complete_discovery(ticket, result, &mut self.surface);
                // Only the newest ticket gets past the session, so anything but
                // a superseded outcome settles the pending request.
                if !matches!(outcome, Ok(DiscoveryOutcome::Superseded)) {
                    self.pending_discovery = None;
                }
                match outcome {
                    Ok(DiscoveryOutcome::Committed(summary)) => {
                        self.status = format!(
                            "Found {} workspaces and {} layers",
                            summary.workspaces.len(),
                            summary.layer_count
                        );
                        self.controls_expanded = true;
                    }
                    Ok(DiscoveryOutcome::Superseded) => {}
                    Err(err) => {
                        tracing::error!("error loading capabilities: {err}");
                        self.status = err.to_string();
                        self.error = Some(UiError::from_discovery(&err));
                    }
                }
            }
            UiEvent::Error(err) => {
                self.status = err.message().to_string();
                self.error = Some(err);
            }
        }
    }

    fn load_capabilities(&mut self) {
        match self.session.begin_discovery(&self.server_url_input) {
            Ok(ticket) => {
                self.pending_discovery = Some(ticket.generation());
                self.status = format!("Loading capabilities from {}", ticket.server_url());
                let queued = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::FetchCapabilities { ticket },
                    &mut self.status,
                );
                if !queued {
                    self.pending_discovery = None;
                    let err = DiscoveryError::connection(self.status.clone());
                    self.error = Some(UiError::from_discovery(&err));
                }
            }
            Err(err) => {
                self.error = Some(UiError::from_discovery(&err));
            }
        }
    }

    fn select_workspace(&mut self, workspace: &str) -> LayerListing {
        self.session.on_workspace_selected(workspace)
    }

    fn toggle_layer(&mut self, full_name: &str, turn_on: bool) -> ToggleOutcome {
        let outcome = self
            .session
            .on_layer_toggled(full_name, turn_on, &mut self.surface);
        if outcome == ToggleOutcome::UnknownLayer {
            self.status = format!("Layer {full_name} is not in the current catalog");
        }
        outcome
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Map server");
        ui.horizontal(|ui| {
            let response = ui.text_edit_singleline(&mut self.server_url_input);
            let submitted =
                response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
            if ui.button("Load layers").clicked() || submitted {
                self.load_capabilities();
            }
            if self.pending_discovery.is_some() {
                ui.spinner();
            }
        });

        if self.session.server_url().is_none() {
            return;
        }

        ui.separator();
        ui.label("Workspace");
        let workspaces = self.session.catalog().workspaces().to_sorted_vec();
        let mut selected = self.session.selected_workspace().to_string();
        let selected_text = if selected.is_empty() {
            NO_WORKSPACE_LABEL.to_string()
        } else {
            selected.clone()
        };
        egui::ComboBox::from_id_salt("workspace_select")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut selected, String::new(), NO_WORKSPACE_LABEL);
                for workspace in &workspaces {
                    ui.selectable_value(&mut selected, workspace.clone(), workspace.as_str());
                }
            });
        if selected != self.session.selected_workspace() {
            self.select_workspace(&selected);
        }

        ui.separator();
        self.show_layer_list(ui);
    }

    fn show_layer_list(&mut self, ui: &mut egui::Ui) {
        let listing = self.session.current_listing();
        ui.strong(listing.heading());
        if let Some(message) = listing.message() {
            ui.label(message);
        }

        match &listing {
            LayerListing::NoSelection { workspaces } => {
                for workspace in workspaces {
                    ui.label(format!("• {workspace}"));
                }
            }
            LayerListing::Workspace { layers, .. } => {
                let mut toggles = Vec::new();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for layer in layers {
                        let mut checked = self.session.is_layer_active(layer.full_name.as_str());
                        if ui
                            .checkbox(&mut checked, layer.label())
                            .on_hover_text(layer.full_name.as_str())
                            .changed()
                        {
                            toggles.push((layer.full_name.to_string(), checked));
                        }
                    }
                });
                for (full_name, turn_on) in toggles {
                    self.toggle_layer(&full_name, turn_on);
                }
            }
        }
    }

    fn show_map(&self, ui: &mut egui::Ui) {
        let view = self.surface.view();
        ui.heading("Map");
        ui.label(format!(
            "Center {:.4}, {:.4} at zoom {}",
            view.center_lon, view.center_lat, view.zoom
        ));
        ui.separator();
        ui.label("Layer stack (bottom to top)");
        egui::Grid::new("layer_stack")
            .striped(true)
            .num_columns(3)
            .show(ui, |ui| {
                for layer in self.surface.layers() {
                    ui.label(format!("#{}", layer.handle().0));
                    match layer {
                        SurfaceLayer::Base { base, .. } => {
                            ui.label(base.label());
                            ui.label("base map");
                        }
                        SurfaceLayer::Tile { source, .. } => {
                            ui.label(source.layer_identifier.as_str());
                            ui.monospace(source.get_map_template());
                        }
                    }
                    ui.end_row();
                }
            });
    }

    fn show_error_window(&mut self, ctx: &egui::Context) {
        let Some(error) = &self.error else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new(error.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(error.message());
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.error = None;
        }
    }
}

impl eframe::App for MapPanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let toggle_label = if self.controls_expanded {
                    "Hide controls"
                } else {
                    "Show controls"
                };
                if ui.button(toggle_label).clicked() {
                    self.controls_expanded = !self.controls_expanded;
                }
                ui.label(self.status.as_str());
            });
        });

        if self.controls_expanded {
            egui::SidePanel::left("controls_panel")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| self.show_controls(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| self.show_map(ui));
        self.show_error_window(ctx);

        let repaint = if self.pending_discovery.is_some() {
            PENDING_REPAINT
        } else {
            IDLE_REPAINT
        };
        ctx.request_repaint_after(repaint);
    }
}
