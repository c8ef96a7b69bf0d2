//! Terminal rendering of a [`laydate::Picker`]: the panel widgets, the key
//! loop and the help overlay
mod app;
mod help;
mod panel;
mod theme;
pub(crate) use self::app::App;
