pub mod app;
pub mod bootstrap;
pub mod chat;
pub mod fallback;
pub mod focus_timer;
pub mod navigation;
pub mod resource_store;
pub mod session;
