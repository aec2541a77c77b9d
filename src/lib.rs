pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod session;
pub mod view;
pub mod web;

use std::sync::Arc;
use config::Config;
use controller::Controller;

/// Application state that will be shared across handlers
pub struct AppState<B> {
    pub config: Arc<Config>,
    pub controller: Arc<Controller<B>>,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            controller: Arc::clone(&self.controller),
        }
    }
}
