use crate::api::ApiResult;
use crate::api::auth::{AuthApi, User};
use crate::api::users::{PhotoUpload, UpdateProfileRequest, UsersApi};
use crate::app::state::{AppState, GatewayStatus};
use crate::net::{self, Inbox, RetryGate};
use crate::session::Session;
use crate::ui::components::egui_common;
use crate::ui::notify::Notices;
use crate::{format, validate};
use bevy::log::{info, warn};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};
use rfd::FileDialog;
use std::fs;

#[derive(Resource, Default)]
pub struct ProfileFetchChannel(pub Inbox<ApiResult<User>>);

#[derive(Resource, Default)]
pub struct ProfileSaveChannel(pub Inbox<ApiResult<User>>);

#[derive(Resource, Default)]
pub struct PasswordChannel(pub Inbox<ApiResult<()>>);

#[derive(Resource, Default)]
pub struct ProfilePhotoChannel(pub Inbox<ApiResult<PhotoUpload>>);

#[derive(Resource, Default)]
pub struct AccountDeleteChannel(pub Inbox<ApiResult<()>>);

#[derive(Default)]
pub struct PasswordForm {
    pub current: String,
    pub new: String,
    pub confirmation: String,
}

#[derive(Resource, Default)]
pub struct ProfilePageData {
    pub username: String,
    pub email: String,
    pub bio: String,
    pub is_fetching: bool,
    pub offline: bool,
    pub retry: RetryGate,
    pub is_saving: bool,
    pub form_error: Option<String>,
    pub show_password_dialog: bool,
    pub password_form: PasswordForm,
    pub password_error: Option<String>,
    pub is_changing_password: bool,
    pub is_uploading: bool,
    pub show_delete_dialog: bool,
    pub delete_password: String,
    pub is_deleting: bool,
}

impl ProfilePageData {
    fn adopt(&mut self, user: &User) {
        self.username = user.username.clone();
        self.email = user.email.clone();
        self.bio = user.bio.clone();
    }
}

pub fn setup(mut commands: Commands, session: Res<Session>) {
    info!("profile setup");
    let fetch_channel = ProfileFetchChannel::default();
    let mut data = ProfilePageData::default();

    // Cached record first so the form is usable immediately, then a
    // refresh from the gateway.
    if let Some(user) = &session.user {
        data.adopt(user);
    }
    if let Some(token) = session.token().cloned() {
        start_fetch(token, &fetch_channel, &mut data);
    }

    commands.insert_resource(fetch_channel);
    commands.insert_resource(data);
    commands.init_resource::<ProfileSaveChannel>();
    commands.init_resource::<PasswordChannel>();
    commands.init_resource::<ProfilePhotoChannel>();
    commands.init_resource::<AccountDeleteChannel>();
}

fn start_fetch(token: String, channel: &ProfileFetchChannel, data: &mut ProfilePageData) {
    data.is_fetching = true;
    data.retry.mark();
    net::spawn(channel.0.sender(), async move {
        AuthApi::new().get_profile(&token).await
    });
}

pub fn update(
    fetch_channel: Res<ProfileFetchChannel>,
    save_channel: Res<ProfileSaveChannel>,
    password_channel: Res<PasswordChannel>,
    photo_channel: Res<ProfilePhotoChannel>,
    delete_channel: Res<AccountDeleteChannel>,
    mut data: ResMut<ProfilePageData>,
    mut session: ResMut<Session>,
    mut gateway: ResMut<GatewayStatus>,
    mut next_state: ResMut<NextState<AppState>>,
    mut notices: ResMut<Notices>,
) {
    for result in fetch_channel.0.drain() {
        data.is_fetching = false;
        match result {
            Ok(user) => {
                data.adopt(&user);
                data.offline = false;
                session.update_user(user);
                *gateway = GatewayStatus::Online;
            }
            Err(err) if err.is_network_unavailable() => {
                warn!("profile fetch: {}", err);
                data.offline = true;
                *gateway = GatewayStatus::Offline;
            }
            Err(err) => {
                notices.error(format!("Failed to load profile: {}", err));
            }
        }
    }

    for result in save_channel.0.drain() {
        data.is_saving = false;
        match result {
            Ok(user) => {
                data.adopt(&user);
                session.update_user(user);
                notices.success("Profile updated");
            }
            Err(err) => {
                data.form_error = Some(err.to_string());
            }
        }
    }

    for result in password_channel.0.drain() {
        data.is_changing_password = false;
        match result {
            Ok(()) => {
                data.show_password_dialog = false;
                data.password_form = PasswordForm::default();
                data.password_error = None;
                notices.success("Password changed");
            }
            Err(err) => {
                data.password_error = Some(err.to_string());
            }
        }
    }

    for result in photo_channel.0.drain() {
        data.is_uploading = false;
        match result {
            Ok(upload) => {
                if let Some(mut user) = session.user.clone() {
                    user.profile_photo = if upload.secure_url.is_empty() {
                        upload.url
                    } else {
                        upload.secure_url
                    };
                    session.update_user(user);
                }
                notices.success("Profile photo updated");
            }
            Err(err) => {
                notices.error(format!("Photo upload failed: {}", err));
            }
        }
    }

    for result in delete_channel.0.drain() {
        data.is_deleting = false;
        match result {
            Ok(()) => {
                session.clear();
                notices.info("Account deleted");
                next_state.set(AppState::Login);
            }
            Err(err) => {
                notices.error(format!("Account deletion failed: {}", err));
            }
        }
    }
}

pub fn ui_system(
    mut contexts: EguiContexts,
    current_state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut data: ResMut<ProfilePageData>,
    fetch_channel: Res<ProfileFetchChannel>,
    save_channel: Res<ProfileSaveChannel>,
    password_channel: Res<PasswordChannel>,
    photo_channel: Res<ProfilePhotoChannel>,
    delete_channel: Res<AccountDeleteChannel>,
    mut session: ResMut<Session>,
    gateway: Res<GatewayStatus>,
    mut notices: ResMut<Notices>,
) {
    egui_common::ui_top_panel(&mut contexts, current_state, &mut next_state, &session, *gateway);
    egui_common::ui_notices(&mut contexts, &mut notices);

    egui::CentralPanel::default().show(contexts.ctx_mut(), |ui| {
        ui.heading("Profile");
        ui.add_space(8.0);

        if data.offline {
            let retry_ready = data.retry.ready() && !data.is_fetching;
            if egui_common::ui_offline_banner(ui, retry_ready) {
                if let Some(token) = session.token() {
                    let token = token.clone();
                    start_fetch(token, &fetch_channel, &mut data);
                }
            }
        }

        let mutations_enabled = !data.offline && session.is_authenticated();

        if data.is_fetching {
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new());
                ui.weak("Refreshing profile...");
            });
            ui.add_space(8.0);
        }

        if let Some(user) = &session.user {
            ui.horizontal(|ui| {
                ui.weak("Member since");
                ui.label(format::date(&user.created_at));
            });
            if !user.profile_photo.is_empty() {
                ui.weak(format!("Photo: {}", user.profile_photo));
            }
            ui.add_space(8.0);
        }

        ui.separator();

        ui.scope(|ui| {
            ui.set_max_width(400.0);

            ui.label("Username");
            ui.text_edit_singleline(&mut data.username);
            ui.add_space(8.0);

            ui.label("Email");
            ui.text_edit_singleline(&mut data.email);
            ui.add_space(8.0);

            ui.label("Bio");
            ui.text_edit_multiline(&mut data.bio);
            ui.add_space(8.0);

            if let Some(error) = &data.form_error {
                ui.colored_label(egui::Color32::RED, error);
                ui.add_space(8.0);
            }

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(
                        mutations_enabled && !data.is_saving,
                        egui::Button::new("💾 Save profile"),
                    )
                    .clicked()
                {
                    submit_profile(&mut data, &session, &save_channel);
                }
                if data.is_saving {
                    ui.add(egui::Spinner::new());
                }

                if ui
                    .add_enabled(
                        mutations_enabled && !data.is_uploading,
                        egui::Button::new("📷 Change photo"),
                    )
                    .clicked()
                {
                    pick_and_upload_photo(&mut data, &session, &photo_channel, &mut notices);
                }
                if data.is_uploading {
                    ui.add(egui::Spinner::new());
                }
            });
        });

        ui.add_space(16.0);
        ui.separator();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(mutations_enabled, egui::Button::new("🔑 Change password"))
                .clicked()
            {
                data.show_password_dialog = true;
                data.password_form = PasswordForm::default();
                data.password_error = None;
            }

            if ui.button("🚪 Sign out").clicked() {
                session.clear();
                next_state.set(AppState::Login);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(
                        mutations_enabled,
                        egui::Button::new(
                            egui::RichText::new("Delete account").color(egui::Color32::RED),
                        ),
                    )
                    .clicked()
                {
                    data.show_delete_dialog = true;
                    data.delete_password = String::new();
                }
            });
        });

        show_password_dialog(ui, &mut data, &session, &password_channel);
        show_delete_dialog(ui, &mut data, &session, &delete_channel);
    });
}

fn submit_profile(data: &mut ProfilePageData, session: &Session, save_channel: &ProfileSaveChannel) {
    let checks = validate::username(&data.username)
        .and_then(|_| validate::email(&data.email))
        .and_then(|_| validate::bio(&data.bio));
    if let Err(error) = checks {
        data.form_error = Some(error);
        return;
    }

    let Some(token) = session.token().cloned() else {
        return;
    };

    data.form_error = None;
    data.is_saving = true;

    let request = UpdateProfileRequest {
        username: Some(data.username.trim().to_string()),
        email: Some(data.email.trim().to_string()),
        bio: Some(data.bio.trim().to_string()),
    };
    net::spawn(save_channel.0.sender(), async move {
        UsersApi::new().update_profile(&token, &request).await
    });
}

fn show_password_dialog(
    ui: &mut egui::Ui,
    data: &mut ProfilePageData,
    session: &Session,
    password_channel: &PasswordChannel,
) {
    if !data.show_password_dialog {
        return;
    }

    egui::Window::new("Change password")
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            ui.label("Current password:");
            ui.add(egui::TextEdit::singleline(&mut data.password_form.current).password(true));
            ui.add_space(8.0);

            ui.label("New password:");
            ui.add(egui::TextEdit::singleline(&mut data.password_form.new).password(true));
            ui.add_space(8.0);

            ui.label("Confirm new password:");
            ui.add(egui::TextEdit::singleline(&mut data.password_form.confirmation).password(true));
            ui.add_space(8.0);

            if let Some(error) = &data.password_error {
                ui.colored_label(egui::Color32::RED, error);
                ui.add_space(8.0);
            }

            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    data.show_password_dialog = false;
                    data.password_form = PasswordForm::default();
                    data.password_error = None;
                }

                if ui
                    .add_enabled(!data.is_changing_password, egui::Button::new("Change"))
                    .clicked()
                {
                    submit_password(data, session, password_channel);
                }
                if data.is_changing_password {
                    ui.add(egui::Spinner::new());
                }
            });
        });
}

fn submit_password(
    data: &mut ProfilePageData,
    session: &Session,
    password_channel: &PasswordChannel,
) {
    let form = &data.password_form;
    let checks = validate::required(&form.current, "Current password")
        .and_then(|_| validate::password(&form.new))
        .and_then(|_| validate::password_confirmation(&form.new, &form.confirmation));
    if let Err(error) = checks {
        data.password_error = Some(error);
        return;
    }

    let Some(token) = session.token().cloned() else {
        return;
    };

    data.password_error = None;
    data.is_changing_password = true;

    let current = form.current.clone();
    let new = form.new.clone();
    net::spawn(password_channel.0.sender(), async move {
        UsersApi::new().change_password(&token, &current, &new).await
    });
}

fn pick_and_upload_photo(
    data: &mut ProfilePageData,
    session: &Session,
    photo_channel: &ProfilePhotoChannel,
    notices: &mut Notices,
) {
    let Some(token) = session.token().cloned() else {
        return;
    };

    let Some(path) = FileDialog::new()
        .add_filter("Images", &["jpg", "jpeg", "png", "webp"])
        .pick_file()
    else {
        return;
    };

    let Some(mime) = validate::image_mime_for(&path) else {
        notices.error("Photo must be a JPEG, PNG or WebP image");
        return;
    };

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            notices.error(format!("Could not read file: {}", e));
            return;
        }
    };

    if let Err(error) = validate::photo(bytes.len(), mime) {
        notices.error(error);
        return;
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "photo".to_string());

    data.is_uploading = true;
    let mime = mime.to_string();
    net::spawn(photo_channel.0.sender(), async move {
        UsersApi::new()
            .upload_photo(&token, &filename, bytes, &mime)
            .await
    });
}

fn show_delete_dialog(
    ui: &mut egui::Ui,
    data: &mut ProfilePageData,
    session: &Session,
    delete_channel: &AccountDeleteChannel,
) {
    if !data.show_delete_dialog {
        return;
    }

    egui::Window::new("Delete account?")
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            ui.label("This permanently removes your account and all of its data.");
            ui.add_space(8.0);

            ui.label("Enter your password to confirm:");
            ui.add(egui::TextEdit::singleline(&mut data.delete_password).password(true));
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    data.show_delete_dialog = false;
                    data.delete_password = String::new();
                }

                let can_delete = !data.is_deleting && !data.delete_password.is_empty();
                if ui
                    .add_enabled(
                        can_delete,
                        egui::Button::new(
                            egui::RichText::new("Delete forever").color(egui::Color32::RED),
                        ),
                    )
                    .clicked()
                {
                    data.show_delete_dialog = false;
                    data.is_deleting = true;
                    if let Some(token) = session.token().cloned() {
                        let password = data.delete_password.clone();
                        net::spawn(delete_channel.0.sender(), async move {
                            UsersApi::new().delete_account(&token, &password).await
                        });
                    }
                }
                if data.is_deleting {
                    ui.add(egui::Spinner::new());
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use bevy::state::app::StatesPlugin;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin);
        app.init_state::<AppState>();
        app.insert_resource(Session::default());
        app.init_resource::<GatewayStatus>();
        app.init_resource::<Notices>();
        app.init_resource::<ProfileFetchChannel>();
        app.init_resource::<ProfileSaveChannel>();
        app.init_resource::<PasswordChannel>();
        app.init_resource::<ProfilePhotoChannel>();
        app.init_resource::<AccountDeleteChannel>();
        app.init_resource::<ProfilePageData>();
        app.add_systems(Update, update);
        app
    }

    #[test]
    fn unreachable_gateway_puts_the_page_in_offline_mode() {
        let mut app = test_app();
        app.world_mut()
            .resource_mut::<ProfilePageData>()
            .is_fetching = true;

        app.world()
            .resource::<ProfileFetchChannel>()
            .0
            .sender()
            .send(Err(ApiError::NetworkUnavailable(
                "connection refused".to_string(),
            )))
            .unwrap();
        app.update();

        let data = app.world().resource::<ProfilePageData>();
        assert!(data.offline);
        assert!(!data.is_fetching);
        assert_eq!(
            *app.world().resource::<GatewayStatus>(),
            GatewayStatus::Offline
        );
    }

    #[test]
    fn successful_fetch_clears_offline_mode() {
        let mut app = test_app();
        app.world_mut().resource_mut::<ProfilePageData>().offline = true;

        let user = User {
            id: 1,
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            bio: String::new(),
            profile_photo: String::new(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        app.world()
            .resource::<ProfileFetchChannel>()
            .0
            .sender()
            .send(Ok(user))
            .unwrap();
        app.update();

        let data = app.world().resource::<ProfilePageData>();
        assert!(!data.offline);
        assert_eq!(data.username, "tester");
        assert_eq!(
            *app.world().resource::<GatewayStatus>(),
            GatewayStatus::Online
        );
    }
}

pub fn cleanup(mut commands: Commands) {
    info!("profile cleanup");
    commands.remove_resource::<ProfilePageData>();
    commands.remove_resource::<ProfileFetchChannel>();
    commands.remove_resource::<ProfileSaveChannel>();
    commands.remove_resource::<PasswordChannel>();
    commands.remove_resource::<ProfilePhotoChannel>();
    commands.remove_resource::<AccountDeleteChannel>();
}
