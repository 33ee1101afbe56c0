use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::StoreError;
use crate::io::{run_export, CsvExporter, Exporter, PngExporter};
use crate::model::{
    DragController, Granularity, MilestoneStatus, ScaleSelector, TicketBlock, TicketStatus, TimelineItem,
    TimelineLayout, ViewMode,
};
use crate::notify::{Notification, Notify, ToastQueue};
use crate::reschedule::Rescheduler;
use crate::store::{JsonFileStore, MemoryStore, TicketStore};
use crate::ui;

/// Results coming back from async work.
#[derive(Debug)]
enum AppEvent {
    Loaded(Result<Vec<TimelineItem>, StoreError>),
    StoreChanged,
    Rescheduled { ticket_id: Uuid, new_date: NaiveDate },
}

/// Main application state.
pub struct DispatchApp {
    pub config: AppConfig,
    pub items: Vec<TimelineItem>,
    pub selector: ScaleSelector,
    pub view_mode: ViewMode,
    pub drag: DragController,
    pub selected: Option<Uuid>,
    pub board_name: String,
    pub loading: bool,

    // Status message
    pub status_message: String,

    runtime: tokio::runtime::Runtime,
    store: Arc<dyn TicketStore>,
    rescheduler: Rescheduler,
    toasts: Arc<ToastQueue>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl DispatchApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> std::io::Result<Self> {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let runtime = tokio::runtime::Runtime::new()?;
        let today = chrono::Local::now().date_naive();

        let (store, board_name): (Arc<dyn TicketStore>, String) = match &config.data_file {
            Some(path) => (Arc::new(JsonFileStore::new(path)), board_name_from(path)),
            None => (Arc::new(MemoryStore::new(Self::sample_board(today))), "Sample Board".to_string()),
        };

        let toasts = Arc::new(ToastQueue::new(config.toast_lifetime()));
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let callback_tx = events_tx.clone();
        let rescheduler = Rescheduler::new(store.clone(), toasts.clone() as Arc<dyn Notify>).on_reschedule(Arc::new(
            move |ticket_id, new_date| {
                let _ = callback_tx.send(AppEvent::Rescheduled { ticket_id, new_date });
            },
        ));

        let mut app = Self {
            selector: ScaleSelector::new(config.default_granularity, today, config.scale),
            view_mode: config.default_view,
            drag: DragController::new(config.geometry),
            config,
            items: Vec::new(),
            selected: None,
            board_name,
            loading: false,
            status_message: "Ready".to_string(),
            runtime,
            store,
            rescheduler,
            toasts,
            events_tx,
            events_rx,
        };
        app.watch_store(&cc.egui_ctx);
        app.request_reload(&cc.egui_ctx);
        Ok(app)
    }

    /// Generate a sample board for demonstration.
    fn sample_board(today: NaiveDate) -> Vec<TimelineItem> {
        let ana = Uuid::new_v4();
        let ben = Uuid::new_v4();
        let chidi = Uuid::new_v4();

        let mut kickoff = TimelineItem::milestone("Site survey signed off", today - Duration::days(6));
        if let TimelineItem::Milestone(m) = &mut kickoff {
            m.status = MilestoneStatus::Completed;
        }
        let handover = TimelineItem::milestone("Customer handover", today + Duration::days(24));

        let mut tickets = vec![
            TicketBlock::new("Replace boiler valve", today - Duration::days(2)).assigned_to(ana, "Ana Ortiz"),
            TicketBlock::new("Rooftop unit inspection", today + Duration::days(1)).assigned_to(ben, "Ben Carter"),
            TicketBlock::new("Thermostat rewiring", today + Duration::days(3)).assigned_to(ana, "Ana Ortiz"),
            TicketBlock::new("Warranty callback", today + Duration::days(4)),
            TicketBlock::new("Duct cleaning", today + Duration::days(8)).assigned_to(chidi, "Chidi Okafor"),
            TicketBlock::new("Leak follow-up", today + Duration::days(11)).assigned_to(ben, "Ben Carter"),
            TicketBlock::new("Quote visit", today + Duration::days(15)),
        ];
        tickets[0].status = TicketStatus::Completed;
        tickets[1].status = TicketStatus::InProgress;
        tickets[1].scheduled_time = Some("08:30".to_string());
        tickets[3].status = TicketStatus::Open;
        tickets[5].status = TicketStatus::OnHold;

        let mut board = vec![
            TimelineItem::span("HVAC retrofit, Building C", today - Duration::days(10), today + Duration::days(25)),
            kickoff,
        ];
        board.extend(tickets.into_iter().map(TimelineItem::from));
        board.push(handover);
        board
    }

    // --- Store plumbing ---

    /// Re-fetch every item from the store.
    pub fn request_reload(&mut self, ctx: &egui::Context) {
        self.loading = true;
        let store = self.store.clone();
        let tx = self.events_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = store.load_items().await;
            let _ = tx.send(AppEvent::Loaded(result));
            ctx.request_repaint();
        });
    }

    /// Forward the store's change feed; every change triggers a re-fetch.
    fn watch_store(&mut self, ctx: &egui::Context) {
        let mut feed = self.store.subscribe();
        let tx = self.events_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        if tx.send(AppEvent::StoreChanged).is_err() {
                            break;
                        }
                        ctx.request_repaint();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::Loaded(Ok(items)) => {
                    self.loading = false;
                    self.status_message = format!("Loaded {} items", items.len());
                    self.items = items;
                    if self.selected.is_some_and(|id| !self.items.iter().any(|i| i.id() == id)) {
                        self.selected = None;
                    }
                }
                AppEvent::Loaded(Err(e)) => {
                    self.loading = false;
                    tracing::warn!(error = %e, "failed to load board");
                    self.toasts.notify(Notification::failure(format!("Could not load board: {e}")));
                }
                AppEvent::StoreChanged => self.request_reload(ctx),
                AppEvent::Rescheduled { ticket_id, new_date } => {
                    let label = self
                        .items
                        .iter()
                        .find(|item| item.id() == ticket_id)
                        .map(|item| item.label().to_string())
                        .unwrap_or_else(|| "Ticket".to_string());
                    self.status_message = format!("Moved '{}' to {}", label, new_date.format("%Y-%m-%d"));
                }
            }
        }
    }

    // --- Export ---

    pub fn export_png(&mut self) {
        self.export_with(&PngExporter::default());
    }

    pub fn export_csv(&mut self) {
        self.export_with(&CsvExporter);
    }

    fn export_with(&mut self, exporter: &dyn Exporter) {
        if self.items.is_empty() {
            self.status_message = "Nothing to export: board has no items".to_string();
            return;
        }
        let default_name = format!("{}.{}", self.board_name, exporter.extension());
        let Some(path) = rfd::FileDialog::new()
            .add_filter(exporter.name(), &[exporter.extension()])
            .set_file_name(&default_name)
            .save_file()
        else {
            return;
        };

        let layout = TimelineLayout::compute(
            self.selector.window(),
            &self.items,
            chrono::Local::now().date_naive(),
            self.view_mode,
            &self.config.layout,
        );
        if run_export(exporter, &layout, &path, self.toasts.as_ref()) {
            self.status_message = format!("Exported {}", path.display());
            if self.config.open_after_export {
                if let Err(e) = open::that(&path) {
                    tracing::warn!(error = %e, "could not open exported file");
                }
            }
        }
    }

    pub fn save_settings(&mut self) {
        self.config.default_granularity = self.selector.granularity;
        self.config.default_view = self.view_mode;
        let saved = AppConfig::default_path().and_then(|path| self.config.save_to(&path));
        match saved {
            Ok(()) => self.status_message = "Settings saved".to_string(),
            Err(e) => self
                .toasts
                .notify(Notification::failure(format!("Could not save settings: {e}"))),
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (prev, next, escape, zoom) = ctx.input(|i| {
            let zoom = if i.modifiers.ctrl { i.smooth_scroll_delta.y } else { 0.0 };
            (
                i.modifiers.ctrl && i.key_pressed(egui::Key::ArrowLeft),
                i.modifiers.ctrl && i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::Escape),
                zoom,
            )
        });
        if prev {
            self.selector.prev();
        }
        if next {
            self.selector.next();
        }
        if escape && self.drag.is_dragging() {
            self.drag.cancel();
        }
        if zoom != 0.0 {
            let finer = zoom > 0.0;
            let granularity = match (self.selector.granularity, finer) {
                (Granularity::Month, true) => Granularity::Week,
                (Granularity::Week, true) | (Granularity::Day, true) => Granularity::Day,
                (Granularity::Day, false) => Granularity::Week,
                (Granularity::Week, false) | (Granularity::Month, false) => Granularity::Month,
            };
            if granularity != self.selector.granularity {
                self.selector.set_granularity(granularity);
            }
        }
    }
}

fn board_name_from(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.trim_end_matches(".board").to_string())
        .unwrap_or_else(|| "Board".to_string())
}

impl eframe::App for DispatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);
        self.drain_events(ctx);
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_sub())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let tickets = self.items.iter().filter(|i| i.as_ticket().is_some()).count();
                        ui.label(
                            egui::RichText::new(format!(
                                "Tickets: {} · Scale: {}",
                                tickets,
                                self.selector.granularity.label()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // The window is rebuilt every frame from the selector; never cached.
        let window = self.selector.window();
        let today = chrono::Local::now().date_naive();
        let layout = TimelineLayout::compute(window, &self.items, today, self.view_mode, &self.config.layout);

        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let interaction = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| {
                ui::timeline_chart::show_timeline_chart(&layout, &mut self.drag, &mut self.selected, ui)
            })
            .inner;

        if let Some(request) = interaction.reschedule {
            self.status_message = "Saving new date…".to_string();
            let rescheduler = self.rescheduler.clone();
            let ctx = ctx.clone();
            self.runtime.spawn(async move {
                rescheduler.submit(request).await;
                ctx.request_repaint();
            });
        } else if interaction.cancelled || ui::timeline_chart::cancel_orphaned_drag(&mut self.drag, ctx) {
            self.status_message = "Drag cancelled".to_string();
        }

        let toasts = self.toasts.active();
        ui::toasts::show_toasts(ctx, &toasts);
        if !toasts.is_empty() {
            ctx.request_repaint_after(std::time::Duration::from_millis(250));
        }
    }
}
