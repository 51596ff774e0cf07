use crate::api::activities::{
    ActivitiesApi, Activity, ActivityPage, CreateActivityRequest, UpdateActivityRequest,
};
use crate::api::users::PhotoUpload;
use crate::api::ApiResult;
use crate::app::state::{AppState, GatewayStatus};
use crate::net::{self, Inbox, RetryGate};
use crate::session::Session;
use crate::ui::components::egui_common;
use crate::ui::notify::Notices;
use crate::{demo, format, validate};
use bevy::log::{info, warn};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};
use rfd::FileDialog;

const PAGE_SIZE: i64 = 20;

#[derive(Resource, Default)]
pub struct ActivitiesListChannel(pub Inbox<ApiResult<ActivityPage>>);

#[derive(Resource, Default)]
pub struct ActivitySaveChannel(pub Inbox<ApiResult<Activity>>);

#[derive(Resource, Default)]
pub struct ActivityDeleteChannel(pub Inbox<ApiResult<i64>>);

#[derive(Resource, Default)]
pub struct ActivityPhotoChannel(pub Inbox<ApiResult<(i64, PhotoUpload)>>);

#[derive(Default)]
pub struct ActivityForm {
    pub title: String,
    pub start_time: String,
    pub duration_mins: String,
    pub cost: String,
    pub note: String,
}

#[derive(Resource, Default)]
pub struct ActivitiesPageData {
    pub items: Vec<Activity>,
    pub total: i64,
    pub page: i64,
    pub is_fetching: bool,
    pub offline: bool,
    pub retry: RetryGate,
    pub show_form: bool,
    pub editing_id: Option<i64>,
    pub form: ActivityForm,
    pub form_error: Option<String>,
    pub is_saving: bool,
    pub confirm_delete: Option<i64>,
    pub is_uploading: bool,
}

pub fn setup(mut commands: Commands, session: Res<Session>) {
    info!("activities setup");
    let channel = ActivitiesListChannel::default();
    let mut data = ActivitiesPageData::default();
    data.page = 1;
    if let Some(token) = session.token() {
        start_fetch(token.clone(), 1, &channel, &mut data);
    }
    commands.insert_resource(channel);
    commands.insert_resource(data);
    commands.init_resource::<ActivitySaveChannel>();
    commands.init_resource::<ActivityDeleteChannel>();
    commands.init_resource::<ActivityPhotoChannel>();
}

fn start_fetch(
    token: String,
    page: i64,
    channel: &ActivitiesListChannel,
    data: &mut ActivitiesPageData,
) {
    data.is_fetching = true;
    data.retry.mark();
    net::spawn(channel.0.sender(), async move {
        ActivitiesApi::new().list(&token, page, PAGE_SIZE).await
    });
}

pub fn update(
    list_channel: Res<ActivitiesListChannel>,
    save_channel: Res<ActivitySaveChannel>,
    delete_channel: Res<ActivityDeleteChannel>,
    photo_channel: Res<ActivityPhotoChannel>,
    mut data: ResMut<ActivitiesPageData>,
    mut gateway: ResMut<GatewayStatus>,
    mut notices: ResMut<Notices>,
) {
    for result in list_channel.0.drain() {
        data.is_fetching = false;
        match result {
            Ok(page) => {
                data.items = page.activities;
                data.total = page.total;
                data.page = page.page;
                data.offline = false;
                *gateway = GatewayStatus::Online;
            }
            Err(err) if err.is_network_unavailable() => {
                warn!("activities fetch: {}", err);
                data.offline = true;
                data.items = demo::activities();
                data.total = data.items.len() as i64;
                *gateway = GatewayStatus::Offline;
            }
            Err(err) => {
                notices.error(format!("Failed to load activities: {}", err));
            }
        }
    }

    for result in save_channel.0.drain() {
        data.is_saving = false;
        match result {
            Ok(activity) => {
                match data.items.iter_mut().find(|a| a.id == activity.id) {
                    Some(existing) => *existing = activity,
                    None => {
                        data.items.insert(0, activity);
                        data.total += 1;
                    }
                }
                data.show_form = false;
                data.editing_id = None;
                data.form = ActivityForm::default();
                notices.success("Activity saved");
            }
            Err(err) => {
                data.form_error = Some(err.to_string());
            }
        }
    }

    for result in delete_channel.0.drain() {
        match result {
            Ok(id) => {
                data.items.retain(|a| a.id != id);
                data.total -= 1;
                notices.success("Activity deleted");
            }
            Err(err) => {
                notices.error(format!("Delete failed: {}", err));
            }
        }
    }

    for result in photo_channel.0.drain() {
        data.is_uploading = false;
        match result {
            Ok((id, upload)) => {
                if let Some(activity) = data.items.iter_mut().find(|a| a.id == id) {
                    activity.photo_url = if upload.secure_url.is_empty() {
                        upload.url
                    } else {
                        upload.secure_url
                    };
                }
                notices.success("Photo uploaded");
            }
            Err(err) => {
                notices.error(format!("Photo upload failed: {}", err));
            }
        }
    }
}

pub fn ui_system(
    mut contexts: EguiContexts,
    current_state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut data: ResMut<ActivitiesPageData>,
    list_channel: Res<ActivitiesListChannel>,
    save_channel: Res<ActivitySaveChannel>,
    delete_channel: Res<ActivityDeleteChannel>,
    photo_channel: Res<ActivityPhotoChannel>,
    session: Res<Session>,
    gateway: Res<GatewayStatus>,
    mut notices: ResMut<Notices>,
) {
    egui_common::ui_top_panel(&mut contexts, current_state, &mut next_state, &session, *gateway);
    egui_common::ui_notices(&mut contexts, &mut notices);

    egui::CentralPanel::default().show(contexts.ctx_mut(), |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("Activities");
            ui.add_space(10.0);
        });

        if data.offline {
            let retry_ready = data.retry.ready() && !data.is_fetching;
            if egui_common::ui_offline_banner(ui, retry_ready) {
                if let Some(token) = session.token() {
                    let token = token.clone();
                    let page = data.page.max(1);
                    start_fetch(token, page, &list_channel, &mut data);
                }
            }
        }

        let mutations_enabled = !data.offline && session.is_authenticated();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(mutations_enabled, egui::Button::new("➕ Log activity"))
                .clicked()
            {
                data.show_form = true;
                data.editing_id = None;
                data.form = ActivityForm::default();
                data.form_error = None;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🔄 Refresh").clicked() && !data.is_fetching && !data.offline {
                    if let Some(token) = session.token() {
                        let token = token.clone();
                        let page = data.page.max(1);
                        start_fetch(token, page, &list_channel, &mut data);
                    }
                }
                ui.weak(format!("{} total", data.total));
            });
        });

        ui.separator();

        if data.is_fetching {
            ui.vertical_centered(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Loading activities...");
            });
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            if data.items.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(50.0);
                    ui.label("No activities yet");
                    ui.label("Log your first activity to get started!");
                });
                return;
            }

            let mut edit_request = None;
            let mut delete_request = None;
            let mut photo_request = None;

            for activity in &data.items {
                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.strong(&activity.title);
                            ui.horizontal(|ui| {
                                ui.weak(format::datetime(&activity.start_time));
                                ui.weak(format::duration(activity.duration_mins));
                                if let Some(cost) = activity.cost {
                                    if cost > 0 {
                                        ui.weak(format::currency(cost));
                                    }
                                }
                            });
                            if !activity.note.is_empty() {
                                ui.weak(&activity.note);
                            }
                            if !activity.photo_url.is_empty() {
                                ui.weak("📷 photo attached");
                            }
                        });

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui
                                .add_enabled(mutations_enabled, egui::Button::new("🗑 Delete"))
                                .clicked()
                            {
                                delete_request = Some(activity.id);
                            }
                            if ui
                                .add_enabled(mutations_enabled, egui::Button::new("✏ Edit"))
                                .clicked()
                            {
                                edit_request = Some(activity.clone());
                            }
                            if ui
                                .add_enabled(
                                    mutations_enabled && !data.is_uploading,
                                    egui::Button::new("📷 Photo"),
                                )
                                .clicked()
                            {
                                photo_request = Some(activity.id);
                            }
                        });
                    });
                });
                ui.add_space(5.0);
            }

            if let Some(activity) = edit_request {
                data.show_form = true;
                data.editing_id = Some(activity.id);
                data.form = ActivityForm {
                    title: activity.title.clone(),
                    start_time: activity.start_time.format("%Y-%m-%dT%H:%M").to_string(),
                    duration_mins: activity.duration_mins.to_string(),
                    cost: activity.cost.map(|c| c.to_string()).unwrap_or_default(),
                    note: activity.note.clone(),
                };
                data.form_error = None;
            }
            if let Some(id) = delete_request {
                data.confirm_delete = Some(id);
            }
            if let Some(id) = photo_request {
                pick_and_upload_photo(id, &session, &photo_channel, &mut data, &mut notices);
            }
        });

        show_form_dialog(ui, &mut data, &session, &save_channel);
        show_delete_confirmation(ui, &mut data, &session, &delete_channel);
    });
}

fn show_form_dialog(
    ui: &mut egui::Ui,
    data: &mut ActivitiesPageData,
    session: &Session,
    save_channel: &ActivitySaveChannel,
) {
    if !data.show_form {
        return;
    }

    let title = if data.editing_id.is_some() {
        "Edit activity"
    } else {
        "Log activity"
    };

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            ui.label("Title:");
            ui.text_edit_singleline(&mut data.form.title);
            ui.add_space(8.0);

            ui.label("Start time (YYYY-MM-DDTHH:MM):");
            ui.text_edit_singleline(&mut data.form.start_time);
            ui.add_space(8.0);

            ui.label("Duration (minutes):");
            ui.text_edit_singleline(&mut data.form.duration_mins);
            ui.add_space(8.0);

            ui.label("Cost (Rp, optional):");
            ui.text_edit_singleline(&mut data.form.cost);
            ui.add_space(8.0);

            ui.label("Note (optional):");
            ui.text_edit_multiline(&mut data.form.note);
            ui.add_space(8.0);

            if let Some(error) = &data.form_error {
                ui.colored_label(egui::Color32::RED, error);
                ui.add_space(8.0);
            }

            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    data.show_form = false;
                    data.editing_id = None;
                    data.form = ActivityForm::default();
                    data.form_error = None;
                }

                let can_save = !data.is_saving;
                if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
                    submit_form(data, session, save_channel);
                }
                if data.is_saving {
                    ui.add(egui::Spinner::new());
                }
            });
        });
}

fn submit_form(
    data: &mut ActivitiesPageData,
    session: &Session,
    save_channel: &ActivitySaveChannel,
) {
    let checks = validate::activity_title(&data.form.title)
        .and_then(|_| validate::start_time(&data.form.start_time))
        .and_then(|_| validate::note(&data.form.note));
    if let Err(error) = checks {
        data.form_error = Some(error);
        return;
    }

    let Ok(duration) = data.form.duration_mins.trim().parse::<i64>() else {
        data.form_error = Some("Duration must be a whole number of minutes".to_string());
        return;
    };
    if let Err(error) = validate::duration_mins(duration) {
        data.form_error = Some(error);
        return;
    }

    let cost = if data.form.cost.trim().is_empty() {
        None
    } else {
        match data.form.cost.trim().parse::<i64>() {
            Ok(cost) if cost >= 0 => Some(cost),
            _ => {
                data.form_error = Some("Cost must be a non-negative number".to_string());
                return;
            }
        }
    };

    let Some(token) = session.token().cloned() else {
        return;
    };

    data.form_error = None;
    data.is_saving = true;

    let title = data.form.title.trim().to_string();
    let start_time = data.form.start_time.trim().to_string();
    let note = data.form.note.trim().to_string();

    match data.editing_id {
        Some(id) => {
            // The whole form is sent on edit, so an emptied cost field
            // clears the stored cost rather than leaving it as-is.
            let request = UpdateActivityRequest {
                title: Some(title),
                start_time: Some(start_time),
                duration_mins: Some(duration),
                cost: Some(cost),
                note: Some(note),
            };
            net::spawn(save_channel.0.sender(), async move {
                ActivitiesApi::new().update(&token, id, &request).await
            });
        }
        None => {
            let request = CreateActivityRequest {
                title,
                start_time,
                duration_mins: duration,
                cost,
                note,
            };
            net::spawn(save_channel.0.sender(), async move {
                ActivitiesApi::new().create(&token, &request).await
            });
        }
    }
}

fn show_delete_confirmation(
    ui: &mut egui::Ui,
    data: &mut ActivitiesPageData,
    session: &Session,
    delete_channel: &ActivityDeleteChannel,
) {
    let Some(id) = data.confirm_delete else {
        return;
    };

    egui::Window::new("Delete activity?")
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            ui.label("This cannot be undone.");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    data.confirm_delete = None;
                }
                if ui.button("Delete").clicked() {
                    data.confirm_delete = None;
                    if let Some(token) = session.token().cloned() {
                        net::spawn(delete_channel.0.sender(), async move {
                            ActivitiesApi::new().delete(&token, id).await.map(|_| id)
                        });
                    }
                }
            });
        });
}

fn pick_and_upload_photo(
    id: i64,
    session: &Session,
    photo_channel: &ActivityPhotoChannel,
    data: &mut ActivitiesPageData,
    notices: &mut Notices,
) {
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
    let bytes = match std::fs::read(&path) {
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
    let Some(token) = session.token().cloned() else {
        return;
    };

    data.is_uploading = true;
    net::spawn(photo_channel.0.sender(), async move {
        ActivitiesApi::new()
            .upload_photo(&token, id, &filename, bytes, mime)
            .await
            .map(|upload| (id, upload))
    });
}

pub fn cleanup(mut commands: Commands) {
    info!("activities cleanup");
    commands.remove_resource::<ActivitiesPageData>();
    commands.remove_resource::<ActivitiesListChannel>();
    commands.remove_resource::<ActivitySaveChannel>();
    commands.remove_resource::<ActivityDeleteChannel>();
    commands.remove_resource::<ActivityPhotoChannel>();
}
