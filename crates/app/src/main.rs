use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use eframe::egui;
use shared::chat::{ChatMessage, Role};
use std::collections::HashMap;
use uuid::Uuid;

mod attachment;
mod config;
mod markdown;
mod session;
mod types;
mod widgets;
mod workers;

use types::AppState;
use widgets::UsageMeterAction;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 720.0])
            .with_min_inner_size([600.0, 480.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "StudyAI",
        options,
        Box::new(|_cc| Box::new(StudyAiApp { state: AppState::new() })),
    )
}

struct StudyAiApp {
    state: AppState,
}

impl eframe::App for StudyAiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let s = &mut self.state;

        // Drain worker results (non-blocking)
        s.poll_exchange_result();
        s.poll_sign_in_result();
        s.poll_attachment();

        // Keep polling while anything is in flight
        if s.has_pending_work() {
            ctx.request_repaint();
        }

        apply_theme(ctx, s.settings.user_profile.dark_mode);

        render_header(s, ctx);
        render_usage_strip(s, ctx);
        render_input_panel(s, ctx);
        render_chat_area(s, ctx);

        if let Some(kind) = s.limit_notice {
            if widgets::limit_notice(ctx, kind, s.session.limits()) {
                s.limit_notice = None;
            }
        }
    }
}

fn apply_theme(ctx: &egui::Context, dark: bool) {
    let mut style = (*ctx.style()).clone();
    style.visuals = if dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    style.visuals.window_rounding = egui::Rounding::same(12.0);
    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    if dark {
        style.visuals.panel_fill = egui::Color32::from_rgb(30, 30, 35);
    } else {
        style.visuals.panel_fill = egui::Color32::from_rgb(250, 250, 252);
    }
    ctx.set_style(style);
}

fn render_header(s: &mut AppState, ctx: &egui::Context) {
    let dark = s.settings.user_profile.dark_mode;
    egui::TopBottomPanel::top("header")
        .frame(egui::Frame::none().fill(if dark {
            egui::Color32::from_rgb(35, 35, 42)
        } else {
            egui::Color32::WHITE
        }))
        .show(ctx, |ui| {
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.add_space(16.0);
                ui.heading(
                    egui::RichText::new("📖 StudyAI")
                        .size(22.0)
                        .color(egui::Color32::from_rgb(79, 70, 229)),
                );
                ui.label(
                    egui::RichText::new("Your Personal AI Tutor")
                        .size(12.0)
                        .weak(),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(16.0);
                    if ui
                        .button(if dark { "☀" } else { "🌙" })
                        .on_hover_text("Toggle dark mode")
                        .clicked()
                    {
                        s.toggle_dark_mode();
                    }

                    if s.signing_in {
                        ui.spinner();
                        ui.label(egui::RichText::new("Signing in...").size(12.0).weak());
                    } else if s.credentials.is_some() {
                        ui.label(
                            egui::RichText::new("✔ Signed in")
                                .size(12.0)
                                .color(egui::Color32::from_rgb(16, 160, 90)),
                        );
                    } else if ui.button("Sign in with Google").clicked() {
                        s.sign_in();
                    }

                    if let Some(err) = &s.sign_in_error {
                        ui.label(
                            egui::RichText::new(err)
                                .size(11.0)
                                .color(egui::Color32::from_rgb(200, 60, 60)),
                        );
                    }
                });
            });
            ui.add_space(10.0);
        });
}

fn render_usage_strip(s: &mut AppState, ctx: &egui::Context) {
    egui::TopBottomPanel::top("usage").show(ctx, |ui| {
        ui.add_space(6.0);
        let action = widgets::usage_meter(ui, s.session.usage(), s.session.limits());
        if action == UsageMeterAction::Reset {
            s.reset_limits();
        }
        ui.add_space(6.0);
    });
}

fn render_chat_area(s: &mut AppState, ctx: &egui::Context) {
    let dark = s.settings.user_profile.dark_mode;
    let messages: Vec<ChatMessage> = s.session.conversation().messages().to_vec();
    let awaiting = s.session.is_awaiting_response();

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(8.0);
                for msg in &messages {
                    render_bubble(ui, ctx, &mut s.image_textures, msg, dark);
                    ui.add_space(10.0);
                }

                if awaiting {
                    ui.horizontal(|ui| {
                        ui.add_space(8.0);
                        ui.spinner();
                        ui.label(egui::RichText::new("Thinking...").weak());
                    });
                    ui.add_space(8.0);
                }
            });
    });
}

fn render_bubble(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    textures: &mut HashMap<Uuid, egui::TextureHandle>,
    msg: &ChatMessage,
    dark: bool,
) {
    let is_user = msg.role == Role::User;

    let (bubble_fill, text_color) = if is_user {
        (egui::Color32::from_rgb(79, 70, 229), egui::Color32::WHITE)
    } else if dark {
        (
            egui::Color32::from_rgb(45, 45, 55),
            egui::Color32::from_rgb(225, 225, 230),
        )
    } else {
        (egui::Color32::WHITE, egui::Color32::from_rgb(40, 45, 55))
    };

    let layout = if is_user {
        egui::Layout::top_down(egui::Align::Max)
    } else {
        egui::Layout::top_down(egui::Align::Min)
    };

    ui.with_layout(layout, |ui| {
        let max_bubble = ui.available_width() * 0.8;
        ui.scope(|ui| {
            ui.set_max_width(max_bubble);
            egui::Frame::none()
                .fill(bubble_fill)
                .rounding(egui::Rounding::same(12.0))
                .inner_margin(egui::Margin::symmetric(12.0, 10.0))
                .show(ui, |ui| {
                    if let Some(texture) = attachment_texture(ctx, textures, msg) {
                        ui.add(
                            egui::Image::new(&texture)
                                .max_size(egui::vec2(256.0, 256.0))
                                .rounding(egui::Rounding::same(8.0)),
                        );
                        if !msg.text.is_empty() {
                            ui.add_space(6.0);
                        }
                    }
                    if !msg.text.is_empty() {
                        if is_user {
                            ui.label(
                                egui::RichText::new(&msg.text).size(14.0).color(text_color),
                            );
                        } else {
                            markdown::render(ui, &msg.text, text_color);
                        }
                    }
                });
        });
        ui.label(
            egui::RichText::new(msg.formatted_time())
                .size(10.0)
                .weak(),
        );
    });
}

/// Decode an attached data URL into a cached egui texture. Anything that
/// fails to decode simply renders without a thumbnail.
fn attachment_texture(
    ctx: &egui::Context,
    cache: &mut HashMap<Uuid, egui::TextureHandle>,
    msg: &ChatMessage,
) -> Option<egui::TextureHandle> {
    if let Some(texture) = cache.get(&msg.id) {
        return Some(texture.clone());
    }
    let raw = msg.image.as_deref()?;
    let parsed = providers::data_url::parse(raw)?;
    let bytes = STANDARD.decode(parsed.data).ok()?;
    let decoded = image::load_from_memory(&bytes).ok()?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice());
    let texture = ctx.load_texture(
        format!("attachment-{}", msg.id),
        color_image,
        egui::TextureOptions::LINEAR,
    );
    cache.insert(msg.id, texture.clone());
    Some(texture)
}

fn render_input_panel(s: &mut AppState, ctx: &egui::Context) {
    let dark = s.settings.user_profile.dark_mode;
    egui::TopBottomPanel::bottom("input")
        .frame(egui::Frame::none().fill(if dark {
            egui::Color32::from_rgb(35, 35, 42)
        } else {
            egui::Color32::WHITE
        }))
        .show(ctx, |ui| {
            ui.add_space(8.0);

            if s.selected_image.is_some() {
                ui.horizontal(|ui| {
                    ui.add_space(16.0);
                    ui.label(egui::RichText::new("🖼 Image attached").size(12.0));
                    if ui.small_button("Remove").clicked() {
                        s.selected_image = None;
                    }
                });
            } else if s.attachment.is_picking() {
                ui.horizontal(|ui| {
                    ui.add_space(16.0);
                    ui.spinner();
                    ui.label(egui::RichText::new("Preparing image...").size(12.0).weak());
                });
            }

            let awaiting = s.session.is_awaiting_response();
            let text_quota_left = s.session.usage().can_send_text(&s.session.limits());
            let has_image = s.selected_image.is_some();
            let hint = if text_quota_left || has_image {
                "Ask a question..."
            } else {
                "Daily limit reached..."
            };

            ui.horizontal(|ui| {
                ui.add_space(16.0);

                if ui
                    .add_enabled(
                        !s.attachment.is_picking(),
                        egui::Button::new("🖼").min_size(egui::vec2(36.0, 36.0)),
                    )
                    .on_hover_text("Upload Image")
                    .clicked()
                {
                    s.attach_image();
                }

                let editor_width = ui.available_width() - 100.0;
                let response = ui.add_enabled(
                    text_quota_left || has_image,
                    egui::TextEdit::multiline(&mut s.input_text)
                        .desired_rows(1)
                        .desired_width(editor_width)
                        .hint_text(hint),
                );

                let enter_sends = response.has_focus()
                    && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift);
                if enter_sends {
                    // The edit already inserted the newline; drop it.
                    while s.input_text.ends_with('\n') {
                        s.input_text.pop();
                    }
                    s.send_message();
                    response.request_focus();
                }

                let can_send = (!s.input_text.trim().is_empty() || has_image)
                    && !awaiting
                    && !s.attachment.is_picking()
                    && (text_quota_left || has_image);
                if ui
                    .add_enabled(
                        can_send,
                        egui::Button::new(
                            egui::RichText::new("Send ➤")
                                .strong()
                                .color(egui::Color32::WHITE),
                        )
                            .min_size(egui::vec2(72.0, 36.0))
                            .fill(egui::Color32::from_rgb(79, 70, 229)),
                    )
                    .clicked()
                {
                    s.send_message();
                }
                ui.add_space(16.0);
            });

            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("StudyAI can make mistakes. Check important info.")
                        .size(10.0)
                        .weak(),
                );
            });
            ui.add_space(6.0);
        });
}
