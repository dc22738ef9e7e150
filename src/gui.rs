use crate::poster::composer::CompositionStyle;
use crate::poster::input::{map_key_event, KeyCode, KeyEvent, KeyModifiers, PosterAction};
use crate::poster::save::ExportSink;
use crate::poster::session::{ActionOutcome, PosterSession};
use crate::poster::settings::PosterSettings;
use crate::poster::text_store::TextStore;
use eframe::egui;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    None,
    Submitted(String),
    Cancelled,
}

/// Modal single-line text prompt.
#[derive(Debug, Clone, Default)]
pub struct TextPrompt {
    open: bool,
    buffer: String,
    max_len: usize,
}

impl TextPrompt {
    pub fn open_with(&mut self, current: &str, max_len: usize) {
        self.buffer = current.to_string();
        self.max_len = max_len;
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> PromptResult {
        if !self.open {
            return PromptResult::None;
        }
        let mut result = PromptResult::None;
        let mut open = true;
        egui::Window::new("Poster text")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(format!("Enter text (max. {} characters):", self.max_len));
                let edit = ui.text_edit_singleline(&mut self.buffer);
                edit.request_focus();
                let submitted =
                    edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() || submitted {
                        result = PromptResult::Submitted(self.buffer.clone());
                    }
                    if ui.button("Cancel").clicked() {
                        result = PromptResult::Cancelled;
                    }
                });
            });
        if ui_escape_pressed(ctx) && result == PromptResult::None {
            result = PromptResult::Cancelled;
        }
        if result != PromptResult::None {
            self.open = false;
        }
        if !open {
            self.open = false;
            if result == PromptResult::None {
                result = PromptResult::Cancelled;
            }
        }
        result
    }
}

fn ui_escape_pressed(ctx: &egui::Context) -> bool {
    ctx.input(|i| i.key_pressed(egui::Key::Escape))
}

fn key_code(key: egui::Key) -> KeyCode {
    match key {
        egui::Key::R => KeyCode::R,
        egui::Key::S => KeyCode::S,
        egui::Key::T => KeyCode::T,
        egui::Key::M => KeyCode::M,
        egui::Key::Num0 => KeyCode::Digit(0),
        egui::Key::Num1 => KeyCode::Digit(1),
        egui::Key::Num2 => KeyCode::Digit(2),
        egui::Key::Num3 => KeyCode::Digit(3),
        egui::Key::Num4 => KeyCode::Digit(4),
        egui::Key::Num5 => KeyCode::Digit(5),
        egui::Key::Num6 => KeyCode::Digit(6),
        egui::Key::Num7 => KeyCode::Digit(7),
        egui::Key::Num8 => KeyCode::Digit(8),
        egui::Key::Num9 => KeyCode::Digit(9),
        _ => KeyCode::Other,
    }
}

pub struct PosterApp {
    session: PosterSession,
    sink: Box<dyn ExportSink>,
    texture: Option<egui::TextureHandle>,
    uploaded_revision: Option<u64>,
    prompt: TextPrompt,
    status: Option<String>,
    pointer_inside: bool,
    last_frame: Instant,
}

impl PosterApp {
    pub fn new(
        settings: &PosterSettings,
        store: Box<dyn TextStore>,
        sink: Box<dyn ExportSink>,
    ) -> Self {
        Self {
            session: PosterSession::new(settings, store),
            sink,
            texture: None,
            uploaded_revision: None,
            prompt: TextPrompt::default(),
            status: None,
            pointer_inside: false,
            last_frame: Instant::now(),
        }
    }

    fn run_action(&mut self, action: PosterAction) {
        match self.session.apply(action, self.sink.as_mut()) {
            Ok(ActionOutcome::Exported(path)) => {
                self.status = Some(format!("Saved {}", path.display()));
            }
            Ok(ActionOutcome::TextPromptRequested) => {
                let max_len = self.session.max_text_len();
                self.prompt.open_with(self.session.text(), max_len);
            }
            Ok(ActionOutcome::BlendChanged(mode)) => {
                self.status = Some(format!("Blend: {mode:?}"));
            }
            Ok(ActionOutcome::StyleChanged(style)) => {
                self.status = Some(format!("Style: {style:?}"));
            }
            Ok(ActionOutcome::Redrawn) | Ok(ActionOutcome::NothingToExport) => {}
            Err(err) => {
                self.status = Some(format!("Failed: {err:#}"));
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let mut action = None;
        ui.horizontal(|ui| {
            if ui.button("Regenerate (R)").clicked() {
                action = Some(PosterAction::Regenerate);
            }
            if ui.button("Save (S)").clicked() {
                action = Some(PosterAction::Save);
            }
            if ui.button("Text (T)").clicked() {
                action = Some(PosterAction::EditText);
            }
            if ui.button("Blend (M)").clicked() {
                action = Some(PosterAction::ToggleBlend);
            }
            let style_label = match self.session.style() {
                CompositionStyle::Grid => "Sketch motifs",
                CompositionStyle::Motif => "Shape grid",
            };
            if ui.button(style_label).clicked() {
                action = Some(PosterAction::ToggleStyle);
            }
            ui.separator();
            for index in 0..8usize {
                let selected = self.session.palette_index() == index as i64;
                if ui
                    .selectable_label(selected, format!("{}", index + 1))
                    .clicked()
                {
                    action = Some(PosterAction::SelectPalette(index));
                }
            }
            ui.separator();
            ui.label(format!("seed {}", self.session.seed()));
            if let Some(status) = &self.status {
                ui.separator();
                ui.label(status);
            }
        });
        if let Some(action) = action {
            self.run_action(action);
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let active = !self.prompt.is_open();
        let events = ctx.input(|i| i.events.clone());
        for event in events {
            let egui::Event::Key {
                key,
                pressed: true,
                repeat: false,
                modifiers,
                ..
            } = event
            else {
                continue;
            };
            let event = KeyEvent {
                key: key_code(key),
                modifiers: KeyModifiers {
                    ctrl: modifiers.ctrl || modifiers.command,
                },
            };
            if let Some(action) = map_key_event(active, event) {
                self.run_action(action);
            }
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        let revision = self.session.canvas_revision();
        if self.uploaded_revision == Some(revision) {
            return;
        }
        let Some(canvas) = self.session.canvas() else {
            self.texture = None;
            self.uploaded_revision = Some(revision);
            return;
        };
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [canvas.width as usize, canvas.height as usize],
            &canvas.pixels,
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("poster", image, egui::TextureOptions::NEAREST))
            }
        }
        self.uploaded_revision = Some(revision);
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, rect: egui::Rect) -> bool {
        let ppp = ctx.pixels_per_point();
        let to_canvas = |pos: egui::Pos2| ((pos.x - rect.min.x) * ppp, (pos.y - rect.min.y) * ppp);
        let (hover, pressed, released, latest) = ctx.input(|i| {
            (
                i.pointer.hover_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
            )
        });

        let mut animating = false;
        match hover.filter(|pos| rect.contains(*pos)) {
            Some(pos) => {
                self.pointer_inside = true;
                let point = to_canvas(pos);
                if pressed {
                    animating |= self.session.pointer_pressed(point);
                }
                animating |= self.session.pointer_moved(point);
            }
            None if self.pointer_inside => {
                self.pointer_inside = false;
                animating |= self.session.pointer_left();
            }
            None => {}
        }
        if released {
            if let Some(pos) = latest {
                animating |= self.session.pointer_released(to_canvas(pos));
            }
        }
        animating
    }
}

impl eframe::App for PosterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;

        self.handle_keys(ctx);

        egui::TopBottomPanel::top("poster_toolbar").show(ctx, |ui| self.toolbar(ui));

        let mut animating = false;
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let size = ui.available_size();
                let ppp = ctx.pixels_per_point();
                self.session
                    .resize((size.x * ppp).floor() as u32, (size.y * ppp).floor() as u32);

                animating |= self.session.tick(dt);

                let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
                if !self.prompt.is_open() {
                    animating |= self.handle_pointer(ctx, rect);
                }

                self.upload_texture(ctx);
                if let Some(texture) = &self.texture {
                    ui.painter().image(
                        texture.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
            });

        match self.prompt.ui(ctx) {
            PromptResult::Submitted(text) => {
                if let Err(err) = self.session.apply_text_edit(Some(text)) {
                    self.status = Some(format!("Failed: {err:#}"));
                }
            }
            PromptResult::Cancelled | PromptResult::None => {}
        }

        if animating || self.session.interaction().is_animating() {
            ctx.request_repaint();
        }
    }
}
