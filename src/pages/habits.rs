use crate::api::ApiResult;
use crate::api::habits::{
    CreateHabitLogRequest, CreateHabitRequest, Habit, HabitLog, HabitStatus, HabitWithLogs,
    HabitsApi,
};
use crate::app::state::{AppState, GatewayStatus};
use crate::net::{self, Inbox, RetryGate};
use crate::session::Session;
use crate::ui::components::egui_common;
use crate::ui::notify::Notices;
use crate::{demo, format, validate};
use bevy::log::{info, warn};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};
use chrono::Utc;

#[derive(Resource, Default)]
pub struct HabitsListChannel(pub Inbox<ApiResult<Vec<Habit>>>);

#[derive(Resource, Default)]
pub struct HabitSaveChannel(pub Inbox<ApiResult<Habit>>);

#[derive(Resource, Default)]
pub struct HabitDeleteChannel(pub Inbox<ApiResult<i64>>);

#[derive(Resource, Default)]
pub struct HabitLogChannel(pub Inbox<ApiResult<HabitLog>>);

#[derive(Resource, Default)]
pub struct HabitDetailChannel(pub Inbox<ApiResult<HabitWithLogs>>);

#[derive(Default)]
pub struct HabitForm {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub reminder_time: String,
}

pub struct LogForm {
    pub habit_id: i64,
    pub date: String,
    pub status: HabitStatus,
    pub note: String,
}

#[derive(Resource, Default)]
pub struct HabitsPageData {
    pub items: Vec<Habit>,
    pub is_fetching: bool,
    pub offline: bool,
    pub retry: RetryGate,
    pub show_create: bool,
    pub form: HabitForm,
    pub form_error: Option<String>,
    pub is_saving: bool,
    pub log_form: Option<LogForm>,
    pub log_error: Option<String>,
    pub is_logging: bool,
    pub detail: Option<HabitWithLogs>,
    pub is_loading_detail: bool,
    pub confirm_delete: Option<i64>,
}

pub fn setup(mut commands: Commands, session: Res<Session>) {
    info!("habits setup");
    let channel = HabitsListChannel::default();
    let mut data = HabitsPageData::default();
    if let Some(token) = session.token() {
        start_fetch(token.clone(), &channel, &mut data);
    }
    commands.insert_resource(channel);
    commands.insert_resource(data);
    commands.init_resource::<HabitSaveChannel>();
    commands.init_resource::<HabitDeleteChannel>();
    commands.init_resource::<HabitLogChannel>();
    commands.init_resource::<HabitDetailChannel>();
}

fn start_fetch(token: String, channel: &HabitsListChannel, data: &mut HabitsPageData) {
    data.is_fetching = true;
    data.retry.mark();
    net::spawn(channel.0.sender(), async move {
        HabitsApi::new().list(&token, false).await
    });
}

pub fn update(
    list_channel: Res<HabitsListChannel>,
    save_channel: Res<HabitSaveChannel>,
    delete_channel: Res<HabitDeleteChannel>,
    log_channel: Res<HabitLogChannel>,
    detail_channel: Res<HabitDetailChannel>,
    mut data: ResMut<HabitsPageData>,
    mut gateway: ResMut<GatewayStatus>,
    mut notices: ResMut<Notices>,
) {
    for result in list_channel.0.drain() {
        data.is_fetching = false;
        match result {
            Ok(habits) => {
                data.items = habits;
                data.offline = false;
                *gateway = GatewayStatus::Online;
            }
            Err(err) if err.is_network_unavailable() => {
                warn!("habits fetch: {}", err);
                data.offline = true;
                data.items = demo::habits();
                *gateway = GatewayStatus::Offline;
            }
            Err(err) => {
                notices.error(format!("Failed to load habits: {}", err));
            }
        }
    }

    for result in save_channel.0.drain() {
        data.is_saving = false;
        match result {
            Ok(habit) => {
                data.items.push(habit);
                data.show_create = false;
                data.form = HabitForm::default();
                notices.success("Habit created");
            }
            Err(err) => {
                data.form_error = Some(err.to_string());
            }
        }
    }

    for result in delete_channel.0.drain() {
        match result {
            Ok(id) => {
                data.items.retain(|h| h.id != id);
                if data.detail.as_ref().is_some_and(|d| d.habit.id == id) {
                    data.detail = None;
                }
                notices.success("Habit deleted");
            }
            Err(err) => {
                notices.error(format!("Delete failed: {}", err));
            }
        }
    }

    for result in log_channel.0.drain() {
        data.is_logging = false;
        match result {
            Ok(log) => {
                data.log_form = None;
                data.log_error = None;
                if let Some(detail) = &mut data.detail {
                    if detail.habit.id == log.habit_id {
                        detail.logs.push(log);
                    }
                }
                notices.success("Habit log recorded");
            }
            Err(err) => {
                data.log_error = Some(err.to_string());
            }
        }
    }

    for result in detail_channel.0.drain() {
        data.is_loading_detail = false;
        match result {
            Ok(detail) => {
                data.detail = Some(detail);
            }
            Err(err) => {
                notices.error(format!("Failed to load habit details: {}", err));
            }
        }
    }
}

pub fn ui_system(
    mut contexts: EguiContexts,
    current_state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut data: ResMut<HabitsPageData>,
    list_channel: Res<HabitsListChannel>,
    save_channel: Res<HabitSaveChannel>,
    delete_channel: Res<HabitDeleteChannel>,
    log_channel: Res<HabitLogChannel>,
    detail_channel: Res<HabitDetailChannel>,
    session: Res<Session>,
    gateway: Res<GatewayStatus>,
    mut notices: ResMut<Notices>,
) {
    egui_common::ui_top_panel(&mut contexts, current_state, &mut next_state, &session, *gateway);
    egui_common::ui_notices(&mut contexts, &mut notices);

    egui::CentralPanel::default().show(contexts.ctx_mut(), |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("Habits");
            ui.add_space(10.0);
        });

        if data.offline {
            let retry_ready = data.retry.ready() && !data.is_fetching;
            if egui_common::ui_offline_banner(ui, retry_ready) {
                if let Some(token) = session.token() {
                    let token = token.clone();
                    start_fetch(token, &list_channel, &mut data);
                }
            }
        }

        let mutations_enabled = !data.offline && session.is_authenticated();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(mutations_enabled, egui::Button::new("➕ New habit"))
                .clicked()
            {
                data.show_create = true;
                data.form = HabitForm::default();
                data.form_error = None;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🔄 Refresh").clicked() && !data.is_fetching && !data.offline {
                    if let Some(token) = session.token() {
                        let token = token.clone();
                        start_fetch(token, &list_channel, &mut data);
                    }
                }
            });
        });

        ui.separator();

        if data.is_fetching {
            ui.vertical_centered(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Loading habits...");
            });
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            if data.items.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(50.0);
                    ui.label("No habits yet");
                    ui.label("Create your first habit to get started!");
                });
                return;
            }

            let mut log_request = None;
            let mut detail_request = None;
            let mut delete_request = None;

            for habit in &data.items {
                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.strong(&habit.title);
                            ui.weak(format!(
                                "{} → {}",
                                format::date(&habit.start_date),
                                format::date(&habit.end_date)
                            ));
                            if !habit.reminder_time.is_empty() {
                                ui.weak(format!("⏰ {}", habit.reminder_time));
                            }
                            // Elapsed share of the habit window, display only.
                            let (elapsed, total) = window_progress(habit);
                            ui.add(
                                egui::ProgressBar::new(format::fraction(elapsed, total))
                                    .text(format!("day {} of {}", elapsed, total)),
                            );
                        });

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui
                                .add_enabled(mutations_enabled, egui::Button::new("🗑 Delete"))
                                .clicked()
                            {
                                delete_request = Some(habit.id);
                            }
                            if ui.button("📈 Details").clicked() {
                                detail_request = Some(habit.id);
                            }
                            if ui
                                .add_enabled(mutations_enabled, egui::Button::new("✔ Log today"))
                                .clicked()
                            {
                                log_request = Some(habit.id);
                            }
                        });
                    });
                });
                ui.add_space(5.0);
            }

            if let Some(id) = log_request {
                data.log_form = Some(LogForm {
                    habit_id: id,
                    date: Utc::now().format("%Y-%m-%d").to_string(),
                    status: HabitStatus::Done,
                    note: String::new(),
                });
                data.log_error = None;
            }
            if let Some(id) = detail_request {
                if data.offline {
                    if let Some(habit) = data.items.iter().find(|h| h.id == id).cloned() {
                        data.detail = Some(HabitWithLogs {
                            habit,
                            logs: Vec::new(),
                            stats: demo::habit_stats(),
                        });
                    }
                } else if let Some(token) = session.token().cloned() {
                    data.is_loading_detail = true;
                    net::spawn(detail_channel.0.sender(), async move {
                        HabitsApi::new().complete(&token, id).await
                    });
                }
            }
            if let Some(id) = delete_request {
                data.confirm_delete = Some(id);
            }
        });

        show_create_dialog(ui, &mut data, &session, &save_channel);
        show_log_dialog(ui, &mut data, &session, &log_channel);
        show_detail_window(ui, &mut data);
        show_delete_confirmation(ui, &mut data, &session, &delete_channel);
    });
}

/// Days into the habit window so far, clamped to the window. The window
/// length is floored at zero so a record with reversed dates cannot
/// produce an invalid clamp range.
fn window_progress(habit: &Habit) -> (i64, i64) {
    let total = (habit.end_date - habit.start_date).num_days().max(0);
    let elapsed = (Utc::now() - habit.start_date).num_days().clamp(0, total);
    (elapsed, total)
}

fn show_create_dialog(
    ui: &mut egui::Ui,
    data: &mut HabitsPageData,
    session: &Session,
    save_channel: &HabitSaveChannel,
) {
    if !data.show_create {
        return;
    }

    egui::Window::new("New habit")
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            ui.label("Title:");
            ui.text_edit_singleline(&mut data.form.title);
            ui.add_space(8.0);

            ui.label("Start date (YYYY-MM-DD):");
            ui.text_edit_singleline(&mut data.form.start_date);
            ui.add_space(8.0);

            ui.label("End date (YYYY-MM-DD):");
            ui.text_edit_singleline(&mut data.form.end_date);
            ui.add_space(8.0);

            ui.label("Reminder time (HH:MM, optional):");
            ui.text_edit_singleline(&mut data.form.reminder_time);
            ui.add_space(8.0);

            if let Some(error) = &data.form_error {
                ui.colored_label(egui::Color32::RED, error);
                ui.add_space(8.0);
            }

            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    data.show_create = false;
                    data.form = HabitForm::default();
                    data.form_error = None;
                }

                if ui
                    .add_enabled(!data.is_saving, egui::Button::new("Create"))
                    .clicked()
                {
                    submit_create(data, session, save_channel);
                }
                if data.is_saving {
                    ui.add(egui::Spinner::new());
                }
            });
        });
}

fn submit_create(data: &mut HabitsPageData, session: &Session, save_channel: &HabitSaveChannel) {
    // Date ordering is checked here and again inside HabitsApi::create,
    // so a bad range can never reach the network.
    let checks = validate::habit_title(&data.form.title)
        .and_then(|_| validate::habit_dates(&data.form.start_date, &data.form.end_date));
    if let Err(error) = checks {
        data.form_error = Some(error);
        return;
    }

    let Some(token) = session.token().cloned() else {
        return;
    };

    data.form_error = None;
    data.is_saving = true;

    let request = CreateHabitRequest {
        title: data.form.title.trim().to_string(),
        start_date: data.form.start_date.trim().to_string(),
        end_date: data.form.end_date.trim().to_string(),
        reminder_time: data.form.reminder_time.trim().to_string(),
    };
    net::spawn(save_channel.0.sender(), async move {
        HabitsApi::new().create(&token, &request).await
    });
}

fn show_log_dialog(
    ui: &mut egui::Ui,
    data: &mut HabitsPageData,
    session: &Session,
    log_channel: &HabitLogChannel,
) {
    let Some(form) = &mut data.log_form else {
        return;
    };

    let mut close = false;
    let mut submit = None;

    egui::Window::new("Log habit entry")
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            ui.label("Date (YYYY-MM-DD):");
            ui.text_edit_singleline(&mut form.date);
            ui.add_space(8.0);

            ui.label("Status:");
            ui.horizontal(|ui| {
                for status in HabitStatus::ALL {
                    ui.selectable_value(&mut form.status, status, status.to_string());
                }
            });
            ui.add_space(8.0);

            ui.label("Note (optional):");
            ui.text_edit_multiline(&mut form.note);
            ui.add_space(8.0);

            if let Some(error) = &data.log_error {
                ui.colored_label(egui::Color32::RED, error);
                ui.add_space(8.0);
            }

            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    close = true;
                }
                if ui
                    .add_enabled(!data.is_logging, egui::Button::new("Save"))
                    .clicked()
                {
                    submit = Some(CreateHabitLogRequest {
                        habit_id: form.habit_id,
                        date: form.date.trim().to_string(),
                        status: form.status,
                        note: form.note.trim().to_string(),
                    });
                }
                if data.is_logging {
                    ui.add(egui::Spinner::new());
                }
            });
        });

    if close {
        data.log_form = None;
        data.log_error = None;
    }

    if let Some(request) = submit {
        let checks = validate::date(&request.date, "Date")
            .map(|_| ())
            .and_then(|_| validate::note(&request.note));
        if let Err(error) = checks {
            data.log_error = Some(error);
            return;
        }
        let Some(token) = session.token().cloned() else {
            return;
        };
        data.log_error = None;
        data.is_logging = true;
        net::spawn(log_channel.0.sender(), async move {
            HabitsApi::new()
                .create_log(&token, request.habit_id, &request)
                .await
        });
    }
}

fn show_detail_window(ui: &mut egui::Ui, data: &mut HabitsPageData) {
    if data.is_loading_detail {
        egui::Window::new("Habit details")
            .collapsible(false)
            .show(ui.ctx(), |ui| {
                ui.add(egui::Spinner::new());
                ui.label("Loading...");
            });
        return;
    }

    let Some(detail) = &data.detail else {
        return;
    };

    let mut close = false;
    egui::Window::new(format!("📈 {}", detail.habit.title))
        .collapsible(false)
        .show(ui.ctx(), |ui| {
            let stats = &detail.stats;
            ui.add(
                egui::ProgressBar::new(format::fraction(stats.completed_days, stats.total_days))
                    .text(format!(
                        "{} of {} days done ({})",
                        stats.completed_days,
                        stats.total_days,
                        format::percent(stats.success_rate)
                    )),
            );
            ui.horizontal(|ui| {
                ui.weak(format!("Current streak: {}", stats.current_streak));
                ui.weak(format!("Longest: {}", stats.longest_streak));
                ui.weak(format!("Skipped: {}", stats.skipped_days));
                ui.weak(format!("Failed: {}", stats.failed_days));
            });

            ui.separator();
            ui.strong("Recent log entries");
            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                for log in detail.logs.iter().rev() {
                    ui.horizontal(|ui| {
                        ui.label(format::date(&log.date));
                        ui.label(log.status.to_string());
                        if !log.note.is_empty() {
                            ui.weak(&log.note);
                        }
                    });
                }
            });

            ui.add_space(8.0);
            if ui.button("Close").clicked() {
                close = true;
            }
        });

    if close {
        data.detail = None;
    }
}

fn show_delete_confirmation(
    ui: &mut egui::Ui,
    data: &mut HabitsPageData,
    session: &Session,
    delete_channel: &HabitDeleteChannel,
) {
    let Some(id) = data.confirm_delete else {
        return;
    };

    egui::Window::new("Delete habit?")
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            ui.label("All of its logs go with it. This cannot be undone.");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    data.confirm_delete = None;
                }
                if ui.button("Delete").clicked() {
                    data.confirm_delete = None;
                    if let Some(token) = session.token().cloned() {
                        net::spawn(delete_channel.0.sender(), async move {
                            HabitsApi::new().delete(&token, id).await.map(|_| id)
                        });
                    }
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};

    fn habit_with_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Habit {
        Habit {
            id: 1,
            user_id: 1,
            title: "Morning Exercise".to_string(),
            start_date: start,
            end_date: end,
            reminder_time: String::new(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn window_progress_clamps_to_the_habit_window() {
        let start = Utc::now() - Duration::days(10);
        let (elapsed, total) = window_progress(&habit_with_window(start, start + Duration::days(30)));
        assert_eq!(total, 30);
        assert_eq!(elapsed, 10);

        // Already over.
        let (elapsed, total) = window_progress(&habit_with_window(start, start + Duration::days(5)));
        assert_eq!(total, 5);
        assert_eq!(elapsed, 5);

        // Not started yet.
        let future = Utc::now() + Duration::days(3);
        let (elapsed, _) = window_progress(&habit_with_window(future, future + Duration::days(7)));
        assert_eq!(elapsed, 0);
    }

    #[test]
    fn reversed_server_dates_do_not_panic() {
        let start = Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let (elapsed, total) = window_progress(&habit_with_window(start, end));
        assert_eq!(total, 0);
        assert_eq!(elapsed, 0);
    }
}

pub fn cleanup(mut commands: Commands) {
    info!("habits cleanup");
    commands.remove_resource::<HabitsPageData>();
    commands.remove_resource::<HabitsListChannel>();
    commands.remove_resource::<HabitSaveChannel>();
    commands.remove_resource::<HabitDeleteChannel>();
    commands.remove_resource::<HabitLogChannel>();
    commands.remove_resource::<HabitDetailChannel>();
}
