use crate::core::AppConfig;
use crate::video::{
    FfmpegCapture, PlayState, PlaybackController, PlaybackEvent, StreamKind,
};
use eframe::egui;
use std::sync::Arc;

/// Affordance shown on the toggle button. Presentation-side only: the
/// controller reports state changes and the gui maps them to a glyph here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackIcon {
    Play,
    Pause,
    Stop,
}

impl PlaybackIcon {
    fn for_state(state: PlayState) -> Self {
        match state {
            PlayState::Playing => PlaybackIcon::Pause,
            PlayState::Init | PlayState::Paused => PlaybackIcon::Play,
        }
    }

    fn glyph(self) -> &'static str {
        match self {
            PlaybackIcon::Play => "▶",
            PlaybackIcon::Pause => "⏸",
            PlaybackIcon::Stop => "⏹",
        }
    }
}

pub struct VideoBoxApp {
    pub config: AppConfig,
    controller: PlaybackController,
    frame_texture: Option<egui::TextureHandle>,
    placeholder: egui::TextureHandle,
    icon: PlaybackIcon,
    url_input: String,
    kind_input: StreamKind,
    status_message: String,
}

impl VideoBoxApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        source_override: Option<String>,
    ) -> anyhow::Result<Self> {
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::WHITE);
        cc.egui_ctx.set_visuals(visuals);

        let config = AppConfig::load()?;

        let capture = FfmpegCapture::new(
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
            config.input_format.clone(),
        );
        let mut controller = PlaybackController::new(Box::new(capture), config.fallback_fps);

        // Ticks land in a channel drained by update(); the waker makes sure
        // an update actually runs for each tick.
        let repaint_ctx = cc.egui_ctx.clone();
        controller.set_waker(Arc::new(move || repaint_ctx.request_repaint()));

        let placeholder = cc.egui_ctx.load_texture(
            "placeholder",
            placeholder_image(&config),
            egui::TextureOptions::LINEAR,
        );

        let startup_source = source_override.or_else(|| config.source_url.clone());
        let url_input = startup_source.clone().unwrap_or_default();
        if let Some(url) = startup_source {
            controller.set_source(url, config.stream_kind, config.auto_play);
        }

        let icon = PlaybackIcon::for_state(controller.state());
        let kind_input = config.stream_kind;

        Ok(Self {
            config,
            controller,
            frame_texture: None,
            placeholder,
            icon,
            url_input,
            kind_input,
            status_message: String::new(),
        })
    }

    fn process_playback_events(&mut self, ctx: &egui::Context) {
        while let Some(event) = self.controller.poll_event() {
            match event {
                PlaybackEvent::Frame(frame) => {
                    let image = egui::ColorImage::from_rgb(
                        [frame.width as usize, frame.height as usize],
                        &frame.data,
                    );
                    self.frame_texture = Some(ctx.load_texture(
                        "video_frame",
                        image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
                PlaybackEvent::StateChanged(state) => {
                    self.icon = PlaybackIcon::for_state(state);
                    self.status_message = match state {
                        PlayState::Init => "Stopped".to_string(),
                        PlayState::Playing => "Playing".to_string(),
                        PlayState::Paused => "Paused".to_string(),
                    };
                }
                PlaybackEvent::Finished => {
                    self.icon = PlaybackIcon::Stop;
                    self.status_message = "Playback finished".to_string();
                }
            }
        }
    }

    fn show_source_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Source:");
            ui.add(
                egui::TextEdit::singleline(&mut self.url_input)
                    .hint_text("file path, URL, or device")
                    .desired_width(320.0),
            );

            egui::ComboBox::from_id_source("stream_kind")
                .selected_text(match self.kind_input {
                    StreamKind::Offline => "offline",
                    StreamKind::Live => "live",
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.kind_input, StreamKind::Offline, "offline");
                    ui.selectable_value(&mut self.kind_input, StreamKind::Live, "live");
                });

            if ui.button("Load").clicked() {
                self.controller
                    .set_source(self.url_input.clone(), self.kind_input, false);
                self.frame_texture = None;
                if self.controller.source().is_some() {
                    // Remember the source so the next launch restores it.
                    self.config.source_url = Some(self.url_input.clone());
                    self.config.stream_kind = self.kind_input;
                    if let Err(e) = self.config.save() {
                        log::warn!("failed to save config: {}", e);
                    }
                    self.status_message = format!("Loaded {}", self.url_input);
                } else {
                    self.status_message = "No source set".to_string();
                }
            }
        });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui
                .button(egui::RichText::new(self.icon.glyph()).size(22.0))
                .clicked()
            {
                self.controller.toggle();
            }
            ui.label(&self.status_message);
        });
    }
}

impl eframe::App for VideoBoxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Pull frames for any ticks queued by the clock thread. Reads happen
        // here on the UI thread, so a stalling source stalls the UI with it.
        self.controller.pump();
        self.process_playback_events(ctx);

        egui::TopBottomPanel::top("source_bar").show(ctx, |ui| {
            self.show_source_bar(ui);
        });

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            self.show_controls(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let texture = self.frame_texture.as_ref().unwrap_or(&self.placeholder);
            ui.centered_and_justified(|ui| {
                ui.add(egui::Image::new(texture).shrink_to_fit());
            });
        });
    }
}

/// Decodes the configured placeholder file, or renders a dark checkerboard
/// when none is configured or it cannot be read.
fn placeholder_image(config: &AppConfig) -> egui::ColorImage {
    if let Some(ref path) = config.placeholder_image {
        match image::open(path) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                return egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            }
            Err(e) => {
                log::warn!("failed to load placeholder {}: {}", path.display(), e);
            }
        }
    }

    const WIDTH: usize = 640;
    const HEIGHT: usize = 360;
    const CELL: usize = 40;
    let mut rgb = Vec::with_capacity(WIDTH * HEIGHT * 3);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let dark = (x / CELL + y / CELL) % 2 == 0;
            let value = if dark { 28 } else { 44 };
            rgb.extend_from_slice(&[value, value, value]);
        }
    }
    egui::ColorImage::from_rgb([WIDTH, HEIGHT], &rgb)
}
