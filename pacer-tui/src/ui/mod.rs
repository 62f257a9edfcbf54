mod calendar_tab;
mod layout;
mod modals;
mod plan_tab;
mod status_bar;

// Re-export the main render function
pub use layout::render_ui;
