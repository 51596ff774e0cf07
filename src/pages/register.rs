use crate::api::ApiResult;
use crate::api::auth::{AuthApi, AuthPayload};
use crate::app::state::AppState;
use crate::net::{self, Inbox};
use crate::session::Session;
use crate::ui::notify::Notices;
use crate::validate;
use bevy::log::info;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

#[derive(Resource, Default)]
pub struct RegisterChannel(pub Inbox<ApiResult<AuthPayload>>);

#[derive(Resource, Default)]
pub struct RegisterPageData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirmation: String,
    pub error: Option<String>,
    pub is_submitting: bool,
}

pub fn setup(mut commands: Commands) {
    commands.init_resource::<RegisterPageData>();
    commands.init_resource::<RegisterChannel>();
    info!("register setup");
}

pub fn update(
    channel: Res<RegisterChannel>,
    mut data: ResMut<RegisterPageData>,
    mut session: ResMut<Session>,
    mut next_state: ResMut<NextState<AppState>>,
    mut notices: ResMut<Notices>,
) {
    for result in channel.0.drain() {
        data.is_submitting = false;
        match result {
            Ok(payload) => {
                session.establish(payload);
                notices.success("Account created");
                next_state.set(AppState::Dashboard);
            }
            Err(err) => {
                data.error = Some(err.to_string());
            }
        }
    }
}

pub fn ui_system(
    mut contexts: EguiContexts,
    mut data: ResMut<RegisterPageData>,
    channel: Res<RegisterChannel>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    egui::CentralPanel::default().show(contexts.ctx_mut(), |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading("Create your DailyTrackr account");
            ui.add_space(30.0);

            ui.scope(|ui| {
                ui.set_max_width(320.0);

                ui.label("Username");
                ui.text_edit_singleline(&mut data.username);
                ui.add_space(8.0);

                ui.label("Email");
                ui.text_edit_singleline(&mut data.email);
                ui.add_space(8.0);

                ui.label("Password");
                ui.add(egui::TextEdit::singleline(&mut data.password).password(true));
                ui.add_space(8.0);

                ui.label("Confirm password");
                ui.add(egui::TextEdit::singleline(&mut data.confirmation).password(true));
                ui.add_space(12.0);

                if let Some(error) = &data.error {
                    ui.colored_label(egui::Color32::RED, error);
                    ui.add_space(8.0);
                }

                ui.horizontal(|ui| {
                    let can_submit = !data.is_submitting;
                    if ui
                        .add_enabled(can_submit, egui::Button::new("Register"))
                        .clicked()
                    {
                        submit(&mut data, &channel);
                    }
                    if data.is_submitting {
                        ui.add(egui::Spinner::new());
                    }
                });

                ui.add_space(20.0);
                if ui.link("Already have an account? Sign in").clicked() {
                    next_state.set(AppState::Login);
                }
            });
        });
    });
}

fn submit(data: &mut RegisterPageData, channel: &RegisterChannel) {
    let checks = validate::username(&data.username)
        .and_then(|_| validate::email(&data.email))
        .and_then(|_| validate::password(&data.password))
        .and_then(|_| validate::password_confirmation(&data.password, &data.confirmation));
    if let Err(error) = checks {
        data.error = Some(error);
        return;
    }

    data.error = None;
    data.is_submitting = true;

    let username = data.username.trim().to_string();
    let email = data.email.trim().to_string();
    let password = data.password.clone();
    net::spawn(channel.0.sender(), async move {
        AuthApi::new().register(&username, &email, &password).await
    });
}

pub fn cleanup(mut commands: Commands) {
    commands.remove_resource::<RegisterPageData>();
    commands.remove_resource::<RegisterChannel>();
    info!("register cleanup");
}
