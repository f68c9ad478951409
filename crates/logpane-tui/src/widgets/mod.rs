pub mod log_view;
pub mod status_bar;
