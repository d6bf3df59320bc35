use std::sync::Arc;

use ferrite_mnist::TwoLayerNet;

/// State handed to every request handler.
///
/// The network is loaded once at startup and only read afterwards, so it is
/// shared without a lock.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<TwoLayerNet>,
}

impl AppState {
    pub fn new(model: TwoLayerNet) -> AppState {
        AppState { model: Arc::new(model) }
    }
}
