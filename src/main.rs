use bevy::prelude::*;
use bevy_egui::{EguiContextPass, EguiPlugin};

use dailytrackr::app::state::{AppState, GatewayStatus};
use dailytrackr::pages::{activities, dashboard, habits, login, profile, register, stats};
use dailytrackr::session::Session;
use dailytrackr::ui::notify::{self, Notices};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(EguiPlugin {
            enable_multipass_for_primary_context: true,
        })
        .init_state::<AppState>()
        .insert_resource(Session::load())
        .init_resource::<GatewayStatus>()
        .init_resource::<Notices>()
        .add_systems(Startup, setup)
        .add_systems(Update, notify::expire_notices)
        // login page
        .add_systems(OnEnter(AppState::Login), login::setup)
        .add_systems(Update, login::update.run_if(in_state(AppState::Login)))
        .add_systems(
            EguiContextPass,
            login::ui_system.run_if(in_state(AppState::Login)),
        )
        .add_systems(OnExit(AppState::Login), login::cleanup)
        // register page
        .add_systems(OnEnter(AppState::Register), register::setup)
        .add_systems(Update, register::update.run_if(in_state(AppState::Register)))
        .add_systems(
            EguiContextPass,
            register::ui_system.run_if(in_state(AppState::Register)),
        )
        .add_systems(OnExit(AppState::Register), register::cleanup)
        // dashboard page
        .add_systems(OnEnter(AppState::Dashboard), dashboard::setup)
        .add_systems(Update, dashboard::update.run_if(in_state(AppState::Dashboard)))
        .add_systems(
            EguiContextPass,
            dashboard::ui_system.run_if(in_state(AppState::Dashboard)),
        )
        .add_systems(OnExit(AppState::Dashboard), dashboard::cleanup)
        // activities page
        .add_systems(OnEnter(AppState::Activities), activities::setup)
        .add_systems(
            Update,
            activities::update.run_if(in_state(AppState::Activities)),
        )
        .add_systems(
            EguiContextPass,
            activities::ui_system.run_if(in_state(AppState::Activities)),
        )
        .add_systems(OnExit(AppState::Activities), activities::cleanup)
        // habits page
        .add_systems(OnEnter(AppState::Habits), habits::setup)
        .add_systems(Update, habits::update.run_if(in_state(AppState::Habits)))
        .add_systems(
            EguiContextPass,
            habits::ui_system.run_if(in_state(AppState::Habits)),
        )
        .add_systems(OnExit(AppState::Habits), habits::cleanup)
        // stats page
        .add_systems(OnEnter(AppState::Stats), stats::setup)
        .add_systems(Update, stats::update.run_if(in_state(AppState::Stats)))
        .add_systems(
            EguiContextPass,
            stats::ui_system.run_if(in_state(AppState::Stats)),
        )
        .add_systems(OnExit(AppState::Stats), stats::cleanup)
        // profile page
        .add_systems(OnEnter(AppState::Profile), profile::setup)
        .add_systems(Update, profile::update.run_if(in_state(AppState::Profile)))
        .add_systems(
            EguiContextPass,
            profile::ui_system.run_if(in_state(AppState::Profile)),
        )
        .add_systems(OnExit(AppState::Profile), profile::cleanup)
        .run();
}

fn setup(
    mut commands: Commands,
    session: Res<Session>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    commands.spawn(Camera2d);
    // A persisted session skips the login form.
    if session.is_authenticated() {
        next_state.set(AppState::Dashboard);
    }
}
