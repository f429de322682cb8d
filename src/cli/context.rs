use std::path::Path;
use std::sync::Arc;

use crate::api::{HttpBackend, PocBackend};
use crate::config::{load_config, ClientConfig};
use crate::errors::PocForgeError;
use crate::notify::Notifier;
use crate::render::renderer::render_notification;

/// What every command handler needs: the backend, effective settings and
/// the notification channel.
pub struct AppContext {
    pub backend: Arc<dyn PocBackend>,
    pub config: ClientConfig,
    pub notifier: Notifier,
}

impl AppContext {
    pub async fn load(config_path: Option<&str>, api_base: Option<&str>) -> Result<Self, PocForgeError> {
        let config = load_config(config_path.map(Path::new), api_base).await?;
        let backend: Arc<dyn PocBackend> = Arc::new(HttpBackend::new(&config.base_url));
        Ok(Self::with_backend(backend, config))
    }

    pub fn with_backend(backend: Arc<dyn PocBackend>, config: ClientConfig) -> Self {
        let notifier = Notifier::new(config.dismiss_after);
        Self { backend, config, notifier }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notifier.success(message);
        self.show_current();
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notifier.warning(message);
        self.show_current();
    }

    /// Surface an error through the notification channel. Silent errors
    /// still reach stderr so the exit code is explained.
    pub fn report_error(&self, error: &PocForgeError) {
        if self.notifier.report_error(error).is_some() {
            self.show_current();
        } else {
            eprintln!("Error: {}", error);
        }
    }

    fn show_current(&self) {
        if let Some(notification) = self.notifier.current() {
            eprintln!("{}", render_notification(&notification));
        }
    }
}
