pub mod app;
mod map;
mod panels;

pub use app::GuiApp;

pub const APP_TITLE: &str = "La cour de Louis XVI en 1786";
