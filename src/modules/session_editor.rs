mod se_main;
mod se_ui;

pub use se_main::SessionEditor;
