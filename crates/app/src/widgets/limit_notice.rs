//! Modal shown when a submission runs into an exhausted quota.

use crate::session::LimitKind;
use eframe::egui;
use shared::usage::UsageLimits;

/// Returns `true` once the user dismisses the notice.
pub fn limit_notice(ctx: &egui::Context, kind: LimitKind, limits: UsageLimits) -> bool {
    let mut dismissed = false;

    let what = match kind {
        LimitKind::Text => format!("questions ({})", limits.max_text),
        LimitKind::Image => format!("images ({})", limits.max_images),
    };

    egui::Window::new("Daily Limit Reached")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.set_max_width(320.0);
            ui.vertical_centered(|ui| {
                ui.add_space(4.0);
                ui.label(egui::RichText::new("🔒").size(32.0));
                ui.add_space(8.0);
                ui.label(format!(
                    "You have reached your free daily limit for {}. \
                     Please upgrade to premium to continue learning without limits!",
                    what
                ));
                ui.add_space(12.0);
                let _ = ui.add(
                    egui::Button::new(
                        egui::RichText::new("⚡ Upgrade to Premium")
                            .color(egui::Color32::WHITE)
                            .strong(),
                    )
                    .fill(egui::Color32::from_rgb(245, 158, 11))
                    .min_size(egui::vec2(240.0, 32.0)),
                );
                ui.add_space(4.0);
                if ui
                    .add(egui::Button::new(egui::RichText::new("Maybe later").weak()).frame(false))
                    .clicked()
                {
                    dismissed = true;
                }
                ui.add_space(4.0);
            });
        });

    dismissed
}
