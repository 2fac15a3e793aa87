use crate::config::{Settings, Theme};
use crate::dataset::{DatasetKind, Tone};
use crate::inspector::{Command, DatasetSnapshot, InspectorHandle, PanelSnapshot};
use crate::navigator::TreeViewState;
use crate::render::{Label, RenderedGroup, RenderedRow, RenderedValue};
use crate::state::{ActivePage, PagePhase};
use crate::statics;
use eframe::egui;
use egui::text::{CCursor, CCursorRange, LayoutJob, TextFormat};
use std::path::PathBuf;

pub struct GuiOptions {
    pub inspector: InspectorHandle,
    pub runtime: tokio::runtime::Handle,
    pub settings: Settings,
    pub settings_path: Option<PathBuf>,
    pub theme: Theme,
}

pub fn run_gui(options: GuiOptions) -> eframe::Result {
    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([960.0, 760.0]),
        ..Default::default()
    };
    let title = format!("{} {}", statics::EN_APP_TITLE, env!("CARGO_PKG_VERSION"));
    eframe::run_native(
        &title,
        native,
        Box::new(move |cc| {
            // Repaint whenever the inspector publishes, not only on input.
            let ctx = cc.egui_ctx.clone();
            let mut snapshots = options.inspector.subscribe();
            options.runtime.spawn(async move {
                while snapshots.changed().await.is_ok() {
                    ctx.request_repaint();
                }
            });

            apply_theme(&cc.egui_ctx, options.theme);
            options.inspector.send(Command::Start);
            Ok(Box::new(PanelApp::new(options)))
        }),
    )
}

fn apply_theme(ctx: &egui::Context, theme: Theme) {
    match theme {
        Theme::Dark => ctx.set_visuals(egui::Visuals::dark()),
        Theme::Light => ctx.set_visuals(egui::Visuals::light()),
    }
}

/// The panel window. Holds only view-local state; everything else comes from the
/// inspector's latest snapshot.
struct PanelApp {
    inspector: InspectorHandle,
    snapshot: PanelSnapshot,
    tab: DatasetKind,
    // Search boxes own their text; the inspector gets a copy on every edit.
    queries: [String; 3],
    // Last scroll request handled per dataset.
    handled_scroll: [u64; 3],
    keep_search_focus: bool,
    // Set by Ctrl/Cmd+F; consumed by the active tab's search box.
    focus_search: bool,
    theme: Theme,
    settings: Settings,
    settings_path: Option<PathBuf>,
    last_error: Option<String>,
}

impl PanelApp {
    fn new(options: GuiOptions) -> Self {
        let snapshot = options.inspector.snapshot();
        Self {
            inspector: options.inspector,
            snapshot,
            tab: DatasetKind::Translations,
            queries: Default::default(),
            handled_scroll: [0; 3],
            keep_search_focus: false,
            focus_search: false,
            theme: options.theme,
            settings: options.settings,
            settings_path: options.settings_path,
            last_error: None,
        }
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.theme = self.theme.toggled();
        apply_theme(ctx, self.theme);
        self.settings.theme = Some(self.theme);
        if let Some(path) = &self.settings_path
            && let Err(e) = self.settings.save(path)
        {
            tracing::warn!(error = %format!("{e:#}"), "could not save theme");
            self.last_error = Some(format!("{e:#}"));
        }
    }

    fn send_all(&self, commands: Vec<Command>) {
        for command in commands {
            if !self.inspector.send(command) {
                tracing::warn!("inspector is no longer running");
                break;
            }
        }
    }

    fn dataset_toolbar(&mut self, ui: &mut egui::Ui, ds: &DatasetSnapshot, commands: &mut Vec<Command>) {
        let kind = ds.kind;
        ui.horizontal(|ui| {
            let query = &mut self.queries[kind.index()];
            let search_id = search_box_id(kind);
            let resp = ui.add(
                egui::TextEdit::singleline(query)
                    .id(search_id)
                    .hint_text(kind.search_hint())
                    .desired_width(260.0),
            );
            if resp.changed() {
                commands.push(Command::SetQuery(kind, query.clone()));
            }
            // Single-line edits drop focus on Enter; navigate and take it back.
            if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                if ui.input(|i| i.modifiers.shift) {
                    commands.push(Command::PrevMatch(kind));
                } else {
                    commands.push(Command::NextMatch(kind));
                }
                self.keep_search_focus = true;
            } else if self.keep_search_focus {
                resp.request_focus();
                self.keep_search_focus = false;
            }
            if self.focus_search {
                select_all_text(ui.ctx(), search_id, query);
                resp.request_focus();
                commands.push(Command::SetQuery(kind, query.clone()));
                self.focus_search = false;
            }

            let enabled = ds.controls_enabled;
            if ui
                .add_enabled(enabled, egui::Button::new(statics::EN_BTN_PREV))
                .clicked()
            {
                commands.push(Command::PrevMatch(kind));
            }
            if ui
                .add_enabled(enabled, egui::Button::new(statics::EN_BTN_NEXT))
                .clicked()
            {
                commands.push(Command::NextMatch(kind));
            }
            ui.label(ds.counter.as_deref().unwrap_or(""));

            ui.separator();
            let can_refresh = self.snapshot.gate_enabled && !ds.loading;
            if ui
                .add_enabled(can_refresh, egui::Button::new(statics::EN_BTN_REFRESH))
                .clicked()
            {
                commands.push(Command::Refresh(kind));
            }
            let has_view = ds.view.is_some();
            if ui
                .add_enabled(has_view, egui::Button::new(statics::EN_BTN_OPEN_ALL))
                .clicked()
            {
                commands.push(Command::SetAllOpen(kind, true));
            }
            if ui
                .add_enabled(has_view, egui::Button::new(statics::EN_BTN_CLOSE_ALL))
                .clicked()
            {
                commands.push(Command::SetAllOpen(kind, false));
            }
        });

        let color = match ds.status.tone {
            Tone::Info => ui.visuals().weak_text_color(),
            Tone::Success => egui::Color32::from_rgb(0, 160, 0),
            Tone::Error => egui::Color32::RED,
        };
        ui.colored_label(color, &ds.status.message);
    }
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.snapshot = self.inspector.snapshot();
        let mut commands = Vec::new();
        if search_shortcut_pressed(ctx) {
            self.focus_search = true;
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.label(statics::EN_LABEL_ACTIVE_PAGE);
                match &self.snapshot.active_page {
                    ActivePage::Url(url) => {
                        ui.monospace(url);
                    }
                    ActivePage::Loading => {
                        ui.weak(statics::EN_ACTIVE_PAGE_LOADING);
                    }
                    ActivePage::Unavailable => {
                        ui.weak(statics::EN_ACTIVE_PAGE_UNAVAILABLE);
                    }
                    ActivePage::Unknown => {}
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = match self.theme {
                        Theme::Dark => statics::EN_BTN_THEME_LIGHT,
                        Theme::Light => statics::EN_BTN_THEME_DARK,
                    };
                    if ui.button(label).clicked() {
                        self.toggle_theme(ctx);
                    }
                });
            });
        });

        if let Some(err) = &self.last_error {
            egui::TopBottomPanel::top("error_bar").show(ctx, |ui| {
                ui.colored_label(egui::Color32::RED, err);
            });
        }

        if self.snapshot.show_debug_warning() {
            egui::TopBottomPanel::top("gate_warning").show(ctx, |ui| {
                ui.colored_label(egui::Color32::from_rgb(230, 150, 0), statics::EN_DEBUG_WARNING);
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            match self.snapshot.phase {
                PagePhase::Starting | PagePhase::Probing => {
                    ui.weak(statics::EN_PROBING_PAGE);
                    return;
                }
                PagePhase::Unsupported => {
                    ui.label(statics::EN_UNSUPPORTED_PAGE);
                    return;
                }
                PagePhase::Supported => {}
            }

            ui.horizontal(|ui| {
                for kind in DatasetKind::ALL {
                    ui.selectable_value(&mut self.tab, kind, kind.title());
                }
            });
            ui.separator();

            let Some(ds) = self.snapshot.dataset(self.tab).cloned() else {
                return;
            };
            self.dataset_toolbar(ui, &ds, &mut commands);
            ui.separator();

            let Some(view) = ds.view.clone() else {
                return;
            };
            let mut tree = TreeUi {
                kind: ds.kind,
                state: &ds.tree,
                handled_scroll: &mut self.handled_scroll[ds.kind.index()],
                commands: &mut commands,
            };
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    for group in &view.groups {
                        tree.group(ui, group);
                    }
                });
        });

        self.send_all(commands);
    }
}

/// Draws one rendered view. Clicks become commands; open state comes from the snapshot.
struct TreeUi<'a> {
    kind: DatasetKind,
    state: &'a TreeViewState,
    handled_scroll: &'a mut u64,
    commands: &'a mut Vec<Command>,
}

impl TreeUi<'_> {
    fn group(&mut self, ui: &mut egui::Ui, group: &RenderedGroup) {
        let Some(title) = &group.title else {
            self.rows(ui, &group.rows);
            return;
        };

        let job = label_job(ui, &Label::plain(title.clone()), false, true);
        let open = self.state.is_open(group.id, group.open);
        let resp = egui::CollapsingHeader::new(job)
            .id_salt((self.kind, group.id))
            .open(Some(open))
            .show(ui, |ui| {
                if let Some(placeholder) = group.placeholder {
                    ui.weak(placeholder);
                }
                self.rows(ui, &group.rows);
            });
        if resp.header_response.clicked() {
            self.commands.push(Command::ToggleNode(self.kind, group.id));
        }
    }

    fn rows(&mut self, ui: &mut egui::Ui, rows: &[RenderedRow]) {
        for row in rows {
            self.row(ui, row);
        }
    }

    fn row(&mut self, ui: &mut egui::Ui, row: &RenderedRow) {
        let current = self.state.current() == Some(row.id);
        let resp = match &row.value {
            RenderedValue::Scalar(value) => {
                let resp = ui
                    .horizontal_wrapped(|ui| {
                        ui.label(label_job(ui, &row.key, current, true));
                        ui.label(":");
                        ui.label(label_job(ui, value, current, false));
                    })
                    .response
                    .interact(egui::Sense::click());
                if current {
                    ui.painter().rect_stroke(
                        resp.rect,
                        2.0,
                        egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 140, 0)),
                        egui::StrokeKind::Outside,
                    );
                }
                resp
            }
            RenderedValue::Node(node) => {
                let mut job = label_job(ui, &row.key, current, true);
                job.append(
                    &format!(": {}", node.summary),
                    0.0,
                    TextFormat {
                        font_id: egui::TextStyle::Monospace.resolve(ui.style()),
                        color: ui.visuals().weak_text_color(),
                        ..Default::default()
                    },
                );
                let open = self.state.is_open(node.id, node.open);
                let collapsing = egui::CollapsingHeader::new(job)
                    .id_salt((self.kind, node.id))
                    .open(Some(open))
                    .show(ui, |ui| self.rows(ui, &node.rows));
                if collapsing.header_response.clicked() {
                    self.commands.push(Command::ToggleNode(self.kind, node.id));
                }
                collapsing.header_response
            }
        };

        if let Some(request) = self.state.scroll_request()
            && request.row == row.id
            && request.seq > *self.handled_scroll
        {
            resp.scroll_to_me(Some(egui::Align::Center));
            *self.handled_scroll = request.seq;
        }

        resp.context_menu(|ui| {
            if ui.button(statics::EN_BTN_COPY_KEY).clicked() {
                ui.ctx().copy_text(row.key.text.clone());
                ui.close();
            }
            if ui.button(statics::EN_BTN_COPY_VALUE).clicked() {
                ui.ctx().copy_text(row.copy_text.clone());
                ui.close();
            }
        });
    }
}

/// Monospace text with highlighted match spans; the current match gets a stronger color.
fn label_job(ui: &egui::Ui, label: &Label, current: bool, strong: bool) -> LayoutJob {
    let normal = TextFormat {
        font_id: egui::TextStyle::Monospace.resolve(ui.style()),
        color: if strong {
            ui.visuals().strong_text_color()
        } else {
            ui.visuals().text_color()
        },
        ..Default::default()
    };
    let hit = TextFormat {
        color: egui::Color32::BLACK,
        background: if current {
            egui::Color32::from_rgb(255, 140, 0)
        } else {
            egui::Color32::from_rgb(255, 225, 80)
        },
        ..normal.clone()
    };

    let mut job = LayoutJob::default();
    let mut at = 0;
    for range in &label.highlights {
        if range.start > at {
            job.append(&label.text[at..range.start], 0.0, normal.clone());
        }
        job.append(&label.text[range.clone()], 0.0, hit.clone());
        at = range.end;
    }
    if at < label.text.len() {
        job.append(&label.text[at..], 0.0, normal);
    }
    job
}

fn search_box_id(kind: DatasetKind) -> egui::Id {
    egui::Id::new(("search_box", kind))
}

/// Ctrl+F, or Cmd+F on macOS.
fn search_shortcut_pressed(ctx: &egui::Context) -> bool {
    ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::F))
}

/// Select the whole query so typing replaces it.
fn select_all_text(ctx: &egui::Context, id: egui::Id, text: &str) {
    let mut state = egui::text_edit::TextEditState::load(ctx, id).unwrap_or_default();
    let end = CCursor::new(text.chars().count());
    state
        .cursor
        .set_char_range(Some(CCursorRange::two(CCursor::new(0), end)));
    state.store(ctx, id);
}
