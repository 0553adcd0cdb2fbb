use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use crate::{backend::BackendClient, config::AppConfig};

/// Estado compartido de la pasarela. Clonable: el cliente HTTP comparte su
/// pool de conexiones entre handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub backend: BackendClient,
    pub shutdown_sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}
