pub mod dialogs;
pub mod theme;
pub mod timeline_view;
pub mod toolbar;
