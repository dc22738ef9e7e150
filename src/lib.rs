pub mod logging;
pub mod poster;

#[cfg(feature = "desktop_gui")]
pub mod gui;
