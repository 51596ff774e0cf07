use crate::api::ApiResult;
use crate::api::stats::{ActivityChart, ActivitySummary, ExpenseReport, HabitProgress, StatsApi};
use crate::app::state::{AppState, GatewayStatus};
use crate::net::{self, Inbox, RetryGate};
use crate::session::Session;
use crate::ui::components::egui_common;
use crate::ui::notify::Notices;
use crate::{demo, format};
use bevy::log::{info, warn};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

const CHART_PERIOD_DAYS: i64 = 7;

type StatsBundle = (ActivityChart, ActivitySummary, HabitProgress, ExpenseReport);

#[derive(Resource, Default)]
pub struct StatsChannel(pub Inbox<ApiResult<StatsBundle>>);

#[derive(Resource, Default)]
pub struct StatsPageData {
    pub chart: Option<ActivityChart>,
    pub summary: Option<ActivitySummary>,
    pub habits: Option<HabitProgress>,
    pub expenses: Option<ExpenseReport>,
    pub is_fetching: bool,
    pub offline: bool,
    pub retry: RetryGate,
}

pub fn setup(mut commands: Commands, session: Res<Session>) {
    info!("stats setup");
    let channel = StatsChannel::default();
    let mut data = StatsPageData::default();
    if let Some(token) = session.token() {
        start_fetch(token.clone(), &channel, &mut data);
    }
    commands.insert_resource(channel);
    commands.insert_resource(data);
}

/// The four report endpoints are independent, so they are issued in
/// parallel and joined.
fn start_fetch(token: String, channel: &StatsChannel, data: &mut StatsPageData) {
    data.is_fetching = true;
    data.retry.mark();
    net::spawn(channel.0.sender(), async move {
        let api = StatsApi::new();
        tokio::try_join!(
            api.activity_chart(&token, "daily", CHART_PERIOD_DAYS),
            api.activity_summary(&token, None, None),
            api.habit_progress(&token),
            api.expense_report(&token),
        )
    });
}

pub fn update(
    channel: Res<StatsChannel>,
    mut data: ResMut<StatsPageData>,
    mut gateway: ResMut<GatewayStatus>,
    mut notices: ResMut<Notices>,
) {
    for result in channel.0.drain() {
        data.is_fetching = false;
        match result {
            Ok((chart, summary, habits, expenses)) => {
                data.chart = Some(chart);
                data.summary = Some(summary);
                data.habits = Some(habits);
                data.expenses = Some(expenses);
                data.offline = false;
                *gateway = GatewayStatus::Online;
            }
            Err(err) if err.is_network_unavailable() => {
                warn!("stats fetch: {}", err);
                data.offline = true;
                data.chart = Some(demo::activity_chart());
                data.summary = Some(demo::activity_summary());
                data.habits = Some(demo::habit_progress());
                data.expenses = Some(demo::expense_report());
                *gateway = GatewayStatus::Offline;
            }
            Err(err) => {
                notices.error(format!("Failed to load statistics: {}", err));
            }
        }
    }
}

pub fn ui_system(
    mut contexts: EguiContexts,
    current_state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut data: ResMut<StatsPageData>,
    channel: Res<StatsChannel>,
    session: Res<Session>,
    gateway: Res<GatewayStatus>,
    mut notices: ResMut<Notices>,
) {
    egui_common::ui_top_panel(&mut contexts, current_state, &mut next_state, &session, *gateway);
    egui_common::ui_notices(&mut contexts, &mut notices);

    egui::CentralPanel::default().show(contexts.ctx_mut(), |ui| {
        ui.heading("Statistics");
        ui.add_space(8.0);

        if data.offline {
            let retry_ready = data.retry.ready() && !data.is_fetching;
            if egui_common::ui_offline_banner(ui, retry_ready) {
                if let Some(token) = session.token() {
                    let token = token.clone();
                    start_fetch(token, &channel, &mut data);
                }
            }
        }

        if data.is_fetching {
            ui.vertical_centered(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Loading statistics...");
            });
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            if let Some(chart) = &data.chart {
                show_activity_chart(ui, chart);
                ui.add_space(12.0);
                ui.separator();
            }
            if let Some(summary) = &data.summary {
                show_activity_summary(ui, summary);
                ui.add_space(12.0);
                ui.separator();
            }
            if let Some(habits) = &data.habits {
                show_habit_progress(ui, habits);
                ui.add_space(12.0);
                ui.separator();
            }
            if let Some(expenses) = &data.expenses {
                show_expense_report(ui, expenses);
            }
        });
    });
}

fn show_activity_chart(ui: &mut egui::Ui, chart: &ActivityChart) {
    ui.strong(format!("Hours per day (last {} days)", CHART_PERIOD_DAYS));
    ui.add_space(4.0);

    let max_hours = chart
        .data
        .iter()
        .map(|p| p.hours)
        .fold(0.0_f64, f64::max)
        .max(1.0);

    for point in &chart.data {
        ui.horizontal(|ui| {
            ui.add_sized([90.0, 18.0], egui::Label::new(&point.date));
            ui.add(
                egui::ProgressBar::new((point.hours / max_hours) as f32)
                    .text(format::hours(point.hours)),
            );
        });
    }
    if chart.data.is_empty() {
        ui.weak("No activity recorded in this period.");
    }
}

fn show_activity_summary(ui: &mut egui::Ui, summary: &ActivitySummary) {
    ui.strong(format!("Activity summary ({})", summary.period));
    ui.add_space(4.0);

    egui::Grid::new("activity_summary")
        .num_columns(4)
        .spacing([30.0, 8.0])
        .show(ui, |ui| {
            summary_cell(ui, "Activities", &summary.total_activities.to_string());
            summary_cell(ui, "Hours", &format::hours(summary.total_hours));
            summary_cell(ui, "Expenses", &format::currency(summary.total_expenses));
            summary_cell(
                ui,
                "Avg duration",
                &format::duration(summary.avg_duration_mins.round() as i64),
            );
            ui.end_row();
        });

    if !summary.most_productive_day.is_empty() {
        ui.weak(format!("Most productive day: {}", summary.most_productive_day));
    }

    for category in &summary.top_categories {
        ui.horizontal(|ui| {
            ui.label(&category.category);
            ui.weak(format!(
                "{} activities, {}, {}",
                category.count,
                format::hours(category.total_hours),
                format::percent(category.percentage)
            ));
        });
    }
}

fn show_habit_progress(ui: &mut egui::Ui, progress: &HabitProgress) {
    ui.strong("Habit progress");
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.weak(format!("Total: {}", progress.total_habits));
        ui.weak(format!("Active: {}", progress.active_habits));
        ui.weak(format!("Completed: {}", progress.completed_habits));
        ui.weak(format!(
            "Overall success: {}",
            format::percent(progress.overall_success_rate)
        ));
    });
    ui.add_space(4.0);

    for detail in &progress.habit_details {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.strong(&detail.title);
                ui.weak(&detail.status);
                ui.weak(format!("streak {}", detail.current_streak));
            });
            ui.add(
                egui::ProgressBar::new(format::fraction(detail.completed_days, detail.total_days))
                    .text(format!(
                        "{} of {} days ({})",
                        detail.completed_days,
                        detail.total_days,
                        format::percent(detail.success_rate)
                    )),
            );
        });
        ui.add_space(4.0);
    }
}

fn show_expense_report(ui: &mut egui::Ui, report: &ExpenseReport) {
    ui.strong(format!("Expense report ({})", report.period));
    ui.add_space(4.0);

    egui::Grid::new("expense_report")
        .num_columns(3)
        .spacing([30.0, 8.0])
        .show(ui, |ui| {
            summary_cell(ui, "Total", &format::currency(report.total_expenses));
            summary_cell(
                ui,
                "Daily average",
                &format::currency(report.average_daily.round() as i64),
            );
            summary_cell(
                ui,
                "Highest day",
                &format!(
                    "{} ({})",
                    format::currency(report.highest_day.amount),
                    report.highest_day.date
                ),
            );
            ui.end_row();
        });

    for category in &report.expenses_by_category {
        ui.horizontal(|ui| {
            ui.label(&category.category);
            ui.weak(format!(
                "{} ({} items, {})",
                format::currency(category.amount),
                category.count,
                format::percent(category.percentage)
            ));
        });
    }
}

fn summary_cell(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.vertical(|ui| {
        ui.weak(label);
        ui.strong(value);
    });
}

pub fn cleanup(mut commands: Commands) {
    info!("stats cleanup");
    commands.remove_resource::<StatsPageData>();
    commands.remove_resource::<StatsChannel>();
}
