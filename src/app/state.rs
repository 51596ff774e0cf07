use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Login,
    Register,
    Dashboard,
    Activities,
    Habits,
    Stats,
    Profile,
}

/// Last observed reachability of the gateway, shown as a badge in the
/// top panel. Updated by whichever page fetched most recently.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}
