pub mod egui_common;
