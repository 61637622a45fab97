pub mod api_client;
pub mod checkout;
pub mod config;
pub mod errors;
pub mod models;
pub mod pricing;
pub mod selection;
pub mod session;

use std::sync::Arc;

pub use checkout::{EstimatePolicy, FinalizedSelection};
pub use errors::SeatingError;
pub use models::{PriceQuote, Row, SeatId, SeatingLayout};
pub use session::SeatingSession;

// Явный контекст экрана выбора мест вместо глобальных синглтонов:
// конфигурация и клиент API передаются компоненту, а не берутся из ambient.
#[derive(Clone)]
pub struct AppContext {
    pub config: config::Config,
    pub api: api_client::BookingApiClient,
}

impl AppContext {
    pub fn new(config: config::Config) -> Result<Arc<Self>, SeatingError> {
        let api = api_client::BookingApiClient::from_config(&config)?;
        Ok(Arc::new(Self { config, api }))
    }

    /// Новая сессия выбора мест для сеанса.
    pub fn open_session(&self, screening_id: i64) -> SeatingSession {
        SeatingSession::new(screening_id, &self.config)
    }
}
