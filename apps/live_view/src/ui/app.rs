use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use peer_grid::GridLayout;
use session_core::SessionSnapshot;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::grid;

const MAX_EVENTS_PER_FRAME: usize = 256;

pub struct LiveViewApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    snapshot: Option<SessionSnapshot>,
    status: String,
    last_error: Option<UiError>,
    show_simulation: bool,
}

impl LiveViewApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        show_simulation: bool,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            snapshot: None,
            status: "Starting...".to_string(),
            last_error: None,
            show_simulation,
        }
    }

    pub fn layout(&self) -> Option<GridLayout> {
        self.snapshot.as_ref().map(peer_grid::layout)
    }

    pub fn process_ui_events(&mut self) {
        for event in self.ui_rx.try_iter().take(MAX_EVENTS_PER_FRAME) {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::SessionChanged(snapshot) => {
                    if snapshot.session.joined {
                        self.last_error = None;
                    }
                    self.snapshot = Some(snapshot);
                }
                UiEvent::Error(err) => {
                    tracing::warn!(
                        context = err.context().label(),
                        "session error: {}",
                        err.message()
                    );
                    self.status = format!("{} failed: {}", err.context().label(), err.message());
                    self.last_error = Some(err);
                }
            }
        }
    }

    fn send(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn show_controls(&mut self, ctx: &egui::Context, layout: Option<&GridLayout>) {
        let initialized = self
            .snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.initialized);
        let joined = self
            .snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.session.joined);

        egui::TopBottomPanel::top("session_controls").show(ctx, |ui| {
            ui.add_space(6.0);
            let heading = layout.map_or("Connecting...", |layout| layout.status_line.as_str());
            ui.heading(heading);
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(initialized, egui::Button::new("Toggle Role"))
                    .clicked()
                {
                    self.send(BackendCommand::ToggleRole);
                }
                if ui
                    .add_enabled(initialized && !joined, egui::Button::new("Start Call"))
                    .clicked()
                {
                    self.send(BackendCommand::StartCall);
                }
                if ui
                    .add_enabled(initialized, egui::Button::new("End Call"))
                    .clicked()
                {
                    self.send(BackendCommand::EndCall);
                }
                if self.show_simulation {
                    ui.separator();
                    if ui
                        .add_enabled(joined, egui::Button::new("Simulate peer join"))
                        .clicked()
                    {
                        self.send(BackendCommand::SimulatePeerJoin);
                    }
                    if ui
                        .add_enabled(joined, egui::Button::new("Simulate peer leave"))
                        .clicked()
                    {
                        self.send(BackendCommand::SimulatePeerLeave);
                    }
                }
            });
            ui.add_space(6.0);
        });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.last_error {
                    Some(err) if err.requires_reconfigure() => {
                        ui.colored_label(
                            ui.visuals().error_fg_color,
                            format!("{} (check app id and token)", self.status),
                        );
                    }
                    Some(_) => {
                        ui.colored_label(ui.visuals().warn_fg_color, &self.status);
                    }
                    None => {
                        ui.label(&self.status);
                    }
                }
                if let Some(snapshot) = &self.snapshot {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.weak(format!("{} peer(s)", snapshot.peers.len()));
                        if let Some(uid) = snapshot.session.local_uid {
                            ui.weak(format!("uid {uid}"));
                        }
                    });
                }
            });
        });
    }
}

impl eframe::App for LiveViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let layout = self.layout();
        self.show_controls(ctx, layout.as_ref());
        self.show_status_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let (area, _) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
            if let Some(layout) = &layout {
                grid::paint_grid(ui, layout, area);
            }
        });

        let in_call = self
            .snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.session.joined || snapshot.session.join_pending);
        if in_call {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
