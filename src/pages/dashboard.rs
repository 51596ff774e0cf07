use crate::api::ApiResult;
use crate::api::ai::{
    ActivityAnalysis, AiApi, DailySummary, HabitRecommendation, Insights, ProductivityTips,
};
use crate::api::stats::{DashboardStats, StatsApi};
use crate::app::state::{AppState, GatewayStatus};
use crate::net::{self, Inbox, RetryGate};
use crate::session::Session;
use crate::ui::components::egui_common;
use crate::ui::notify::Notices;
use crate::{demo, format};
use bevy::log::{info, warn};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

#[derive(Resource, Default)]
pub struct DashboardChannel(pub Inbox<ApiResult<(DashboardStats, Insights)>>);

/// One generated AI report, whichever kind was last requested.
pub enum AiReport {
    Summary(DailySummary),
    Recommendation(HabitRecommendation),
    Analysis(ActivityAnalysis),
    Tips(ProductivityTips),
}

#[derive(Resource, Default)]
pub struct AiReportChannel(pub Inbox<ApiResult<AiReport>>);

#[derive(Resource, Default)]
pub struct DashboardPageData {
    pub stats: Option<DashboardStats>,
    pub insights: Option<Insights>,
    pub is_fetching: bool,
    pub offline: bool,
    pub retry: RetryGate,
    pub report: Option<AiReport>,
    pub is_generating: bool,
}

pub fn setup(mut commands: Commands, session: Res<Session>) {
    info!("dashboard setup");
    let channel = DashboardChannel::default();
    let mut data = DashboardPageData::default();
    if let Some(token) = session.token() {
        start_fetch(token.clone(), &channel, &mut data);
    }
    commands.insert_resource(channel);
    commands.insert_resource(data);
    commands.init_resource::<AiReportChannel>();
}

/// Dashboard stats and AI insights are independent, so they are issued
/// in parallel and joined; one error path covers the whole join.
fn start_fetch(token: String, channel: &DashboardChannel, data: &mut DashboardPageData) {
    data.is_fetching = true;
    data.retry.mark();
    net::spawn(channel.0.sender(), async move {
        let stats_api = StatsApi::new();
        let ai_api = AiApi::new();
        tokio::try_join!(stats_api.dashboard(&token), ai_api.insights(&token))
    });
}

pub fn update(
    channel: Res<DashboardChannel>,
    report_channel: Res<AiReportChannel>,
    mut data: ResMut<DashboardPageData>,
    mut gateway: ResMut<GatewayStatus>,
    mut notices: ResMut<Notices>,
) {
    for result in report_channel.0.drain() {
        data.is_generating = false;
        match result {
            Ok(report) => {
                data.report = Some(report);
            }
            Err(err) => {
                notices.error(format!("AI request failed: {}", err));
            }
        }
    }

    for result in channel.0.drain() {
        data.is_fetching = false;
        match result {
            Ok((stats, insights)) => {
                data.stats = Some(stats);
                data.insights = Some(insights);
                data.offline = false;
                *gateway = GatewayStatus::Online;
            }
            Err(err) if err.is_network_unavailable() => {
                warn!("dashboard fetch: {}", err);
                data.offline = true;
                data.stats = Some(demo::dashboard_stats());
                data.insights = Some(demo::insights());
                *gateway = GatewayStatus::Offline;
            }
            Err(err) => {
                notices.error(format!("Failed to load dashboard: {}", err));
            }
        }
    }
}

pub fn ui_system(
    mut contexts: EguiContexts,
    current_state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut data: ResMut<DashboardPageData>,
    channel: Res<DashboardChannel>,
    report_channel: Res<AiReportChannel>,
    session: Res<Session>,
    gateway: Res<GatewayStatus>,
    mut notices: ResMut<Notices>,
) {
    egui_common::ui_top_panel(&mut contexts, current_state, &mut next_state, &session, *gateway);
    egui_common::ui_notices(&mut contexts, &mut notices);

    egui::CentralPanel::default().show(contexts.ctx_mut(), |ui| {
        let welcome = match &session.user {
            Some(user) => format!("Welcome back, {}!", user.username),
            None => "Welcome back!".to_string(),
        };
        ui.heading(welcome);
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
                ui.label("Loading dashboard...");
            });
            return;
        }

        if let Some(stats) = data.stats.clone() {
            show_stats_grid(ui, &stats);
        }

        ui.add_space(12.0);
        ui.separator();

        if let Some(insights) = data.insights.clone() {
            ui.strong("✨ AI insights");
            if insights.ai_insights.is_empty() {
                ui.weak("No insights yet - log a few activities first.");
            } else {
                ui.label(&insights.ai_insights);
            }
            ui.horizontal(|ui| {
                if !insights.most_productive_time.is_empty() {
                    ui.weak(format!("Most productive: {}", insights.most_productive_time));
                }
                if !insights.top_activity_type.is_empty() {
                    ui.weak(format!("Top activity: {}", insights.top_activity_type));
                }
            });
        }

        ui.add_space(12.0);
        ui.separator();
        show_ai_tools(ui, &mut data, &session, &report_channel);

        if data.offline {
            ui.add_space(12.0);
            ui.separator();
            show_demo_recents(ui);
        }
    });
}

fn show_ai_tools(
    ui: &mut egui::Ui,
    data: &mut DashboardPageData,
    session: &Session,
    report_channel: &AiReportChannel,
) {
    ui.strong("AI tools");
    let enabled = !data.offline && !data.is_generating && session.is_authenticated();

    enum AiAction {
        Summary,
        Recommendation,
        Analysis,
        Tips,
    }

    let mut action = None;
    ui.horizontal(|ui| {
        if ui
            .add_enabled(enabled, egui::Button::new("📝 Daily summary"))
            .clicked()
        {
            action = Some(AiAction::Summary);
        }
        if ui
            .add_enabled(enabled, egui::Button::new("🎯 Habit recommendation"))
            .clicked()
        {
            action = Some(AiAction::Recommendation);
        }
        if ui
            .add_enabled(enabled, egui::Button::new("🔍 Analyze last 7 days"))
            .clicked()
        {
            action = Some(AiAction::Analysis);
        }
        if ui
            .add_enabled(enabled, egui::Button::new("💡 Productivity tips"))
            .clicked()
        {
            action = Some(AiAction::Tips);
        }
        if data.is_generating {
            ui.add(egui::Spinner::new());
        }
    });

    if let (Some(action), Some(token)) = (action, session.token().cloned()) {
        data.is_generating = true;
        net::spawn(report_channel.0.sender(), async move {
            let api = AiApi::new();
            match action {
                AiAction::Summary => api.daily_summary(&token, None).await.map(AiReport::Summary),
                AiAction::Recommendation => api
                    .habit_recommendation(&token)
                    .await
                    .map(AiReport::Recommendation),
                AiAction::Analysis => api
                    .analyze_activities(&token, 7)
                    .await
                    .map(AiReport::Analysis),
                AiAction::Tips => api.productivity_tips(&token).await.map(AiReport::Tips),
            }
        });
    }

    if let Some(report) = &data.report {
        ui.add_space(6.0);
        match report {
            AiReport::Summary(summary) => {
                ui.weak(format!("Daily summary for {}", format::date(&summary.date)));
                ui.label(&summary.summary_text);
            }
            AiReport::Recommendation(rec) => {
                ui.weak(format!(
                    "Based on {} activities over {}",
                    rec.total_activities, rec.analysis_period
                ));
                ui.label(&rec.recommendation);
            }
            AiReport::Analysis(analysis) => {
                ui.weak(format!(
                    "{} activities analyzed ({})",
                    analysis.activities_count, analysis.period
                ));
                ui.label(&analysis.analysis);
            }
            AiReport::Tips(tips) => {
                if tips.personalized {
                    ui.weak(format!("Personalized from {}", tips.based_on));
                }
                ui.label(&tips.tips);
            }
        }
    }
}

fn show_stats_grid(ui: &mut egui::Ui, stats: &DashboardStats) {
    egui::Grid::new("dashboard_stats")
        .num_columns(4)
        .spacing([30.0, 8.0])
        .show(ui, |ui| {
            stat_cell(ui, "Activities", &stats.total_activities.to_string());
            stat_cell(ui, "Total hours", &format::hours(stats.total_hours));
            stat_cell(ui, "Active habits", &stats.active_habits.to_string());
            stat_cell(ui, "Expenses", &format::currency(stats.total_expenses));
            ui.end_row();

            stat_cell(ui, "Streak", &format!("{} days", stats.streak_days));
            stat_cell(ui, "Avg daily", &format::hours(stats.avg_daily_hours));
            stat_cell(ui, "This week", &format::hours(stats.this_week_hours));
            stat_cell(
                ui,
                "Week growth",
                &format!("{:+.1}%", stats.hours_growth_percent),
            );
            ui.end_row();
        });
}

fn stat_cell(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.vertical(|ui| {
        ui.weak(label);
        ui.strong(value);
    });
}

fn show_demo_recents(ui: &mut egui::Ui) {
    ui.strong("Recent activities (demo)");
    for activity in demo::activities() {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(&activity.title);
                ui.weak(format::duration(activity.duration_mins));
                if let Some(cost) = activity.cost {
                    ui.weak(format::currency(cost));
                }
                ui.weak(format::date(&activity.start_time));
            });
        });
    }

    ui.add_space(8.0);
    ui.strong("Habits (demo)");
    for habit in demo::habits() {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(&habit.title);
                ui.weak(format!(
                    "{} → {}",
                    format::date(&habit.start_date),
                    format::date(&habit.end_date)
                ));
            });
        });
    }
}

pub fn cleanup(mut commands: Commands) {
    info!("dashboard cleanup");
    commands.remove_resource::<DashboardPageData>();
    commands.remove_resource::<DashboardChannel>();
    commands.remove_resource::<AiReportChannel>();
}
