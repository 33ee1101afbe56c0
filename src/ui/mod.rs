pub mod theme;
pub mod timeline_chart;
pub mod toasts;
pub mod toolbar;
