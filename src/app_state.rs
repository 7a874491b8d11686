use std::sync::Arc;

use crate::{advisor::TextGenerator, config::AppConfig, title::TitleDetector};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub generator: Arc<dyn TextGenerator>,
    pub title_detector: Arc<TitleDetector>,
}
