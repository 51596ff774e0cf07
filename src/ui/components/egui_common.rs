use crate::app::state::{AppState, GatewayStatus};
use crate::session::Session;
use crate::ui::notify::{NoticeKind, Notices};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

pub fn ui_top_panel(
    contexts: &mut EguiContexts,
    current_state: Res<State<AppState>>,
    next_state: &mut ResMut<NextState<AppState>>,
    session: &Session,
    gateway: GatewayStatus,
) {
    egui::TopBottomPanel::top("top_panel").show(contexts.ctx_mut(), |ui| {
        egui::menu::bar(ui, |ui| {
            egui::widgets::global_theme_preference_switch(ui);

            ui.separator();

            if ui
                .selectable_label(*current_state == AppState::Dashboard, "🏠 Dashboard")
                .clicked()
            {
                next_state.set(AppState::Dashboard)
            }

            if ui
                .selectable_label(*current_state == AppState::Activities, "📋 Activities")
                .clicked()
            {
                next_state.set(AppState::Activities)
            }

            if ui
                .selectable_label(*current_state == AppState::Habits, "🎯 Habits")
                .clicked()
            {
                next_state.set(AppState::Habits)
            }

            if ui
                .selectable_label(*current_state == AppState::Stats, "📊 Stats")
                .clicked()
            {
                next_state.set(AppState::Stats)
            }

            if ui
                .selectable_label(*current_state == AppState::Profile, "👤 Profile")
                .clicked()
            {
                next_state.set(AppState::Profile)
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                match gateway {
                    GatewayStatus::Online => {
                        ui.colored_label(egui::Color32::from_rgb(0, 160, 60), "● Connected");
                    }
                    GatewayStatus::Offline => {
                        ui.colored_label(egui::Color32::RED, "● Offline");
                    }
                    GatewayStatus::Unknown => {
                        ui.weak("● …");
                    }
                }

                if let Some(user) = &session.user {
                    ui.separator();
                    ui.weak(&user.username);
                }
            });
        });
    });
}

/// Bottom panel of dismissible notices; hidden while there are none.
pub fn ui_notices(contexts: &mut EguiContexts, notices: &mut Notices) {
    if notices.is_empty() {
        return;
    }

    egui::TopBottomPanel::bottom("notices_panel").show(contexts.ctx_mut(), |ui| {
        let mut dismissed = None;
        for (index, notice) in notices.items().iter().enumerate() {
            ui.horizontal(|ui| {
                let color = match notice.kind {
                    NoticeKind::Success => egui::Color32::from_rgb(0, 160, 60),
                    NoticeKind::Error => egui::Color32::RED,
                    NoticeKind::Info => egui::Color32::GRAY,
                };
                ui.colored_label(color, &notice.text);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✖").clicked() {
                        dismissed = Some(index);
                    }
                });
            });
        }
        if let Some(index) = dismissed {
            notices.dismiss(index);
        }
    });
}

/// Standard banner + retry button for a page in offline/demo mode.
/// Returns true when the user asked to retry and the cooldown allows it.
pub fn ui_offline_banner(ui: &mut egui::Ui, retry_ready: bool) -> bool {
    let mut retry = false;
    ui.horizontal(|ui| {
        ui.colored_label(
            egui::Color32::from_rgb(200, 120, 0),
            "⚠ Gateway unreachable - showing demo data, editing disabled",
        );
        if ui
            .add_enabled(retry_ready, egui::Button::new("🔄 Retry connection"))
            .clicked()
        {
            retry = true;
        }
    });
    ui.separator();
    retry
}
