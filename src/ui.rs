//! Terminal front-end for the proxy: a deposit panel driven by an explicit
//! state controller.

pub mod client;
pub mod clipboard;
pub mod console;
pub mod state;
pub mod view;
