//! The usage strip under the header: one progress bar per quota and the
//! demo reset action.

use eframe::egui;
use shared::usage::{UsageLimits, UsageStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageMeterAction {
    None,
    Reset,
}

pub fn usage_meter(
    ui: &mut egui::Ui,
    usage: UsageStats,
    limits: UsageLimits,
) -> UsageMeterAction {
    let mut action = UsageMeterAction::None;

    ui.horizontal(|ui| {
        ui.add_space(16.0);
        quota_bar(
            ui,
            "Questions",
            usage.text_count,
            limits.max_text,
            egui::Color32::from_rgb(79, 70, 229),
        );
        ui.separator();
        quota_bar(
            ui,
            "Images",
            usage.image_count,
            limits.max_images,
            egui::Color32::from_rgb(147, 51, 234),
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.add_space(16.0);
            ui.label(
                egui::RichText::new("⚡ Premium")
                    .size(12.0)
                    .color(egui::Color32::from_rgb(245, 158, 11)),
            );
            ui.add_space(8.0);
            if ui
                .small_button(egui::RichText::new("Reset Limits (Demo)").size(11.0))
                .clicked()
            {
                action = UsageMeterAction::Reset;
            }
        });
    });

    action
}

fn quota_bar(ui: &mut egui::Ui, label: &str, count: u32, max: u32, fill: egui::Color32) {
    ui.label(egui::RichText::new(label).size(12.0));
    let fraction = if max == 0 {
        1.0
    } else {
        (count as f32 / max as f32).min(1.0)
    };
    ui.add(
        egui::ProgressBar::new(fraction)
            .desired_width(64.0)
            .desired_height(8.0)
            .fill(fill),
    );
    ui.label(
        egui::RichText::new(format!("{}/{}", count, max))
            .size(12.0)
            .monospace()
            .weak(),
    );
}
