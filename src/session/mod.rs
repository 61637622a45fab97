//! Сессия выбора мест — один экземпляр экрана для одного сеанса.
//!
//! Жизненный цикл: создание -> загрузка схемы и занятых мест -> интерактив
//! (переключение мест с синхронным пересчётом цены) -> финализация и
//! передача снимка шагу оформления. Сессия принадлежит одному экрану,
//! мутации идут через `&mut self` в одном логическом потоке UI; внутренних
//! блокировок нет.

use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api_client::BookingApiClient;
use crate::checkout::{self, EstimatePolicy, FinalizedSelection};
use crate::config::Config;
use crate::errors::SeatingError;
use crate::models::layout::SeatingLayout;
use crate::models::quote::PriceQuote;
use crate::models::seat::SeatId;
use crate::pricing::PriceDeriver;
use crate::selection::SeatSelection;

pub struct SeatingSession {
    session_id: Uuid,
    screening_id: i64,
    policy: EstimatePolicy,
    deriver: PriceDeriver,
    // Заполняются только после успешной загрузки обоих провайдеров.
    layout: Option<SeatingLayout>,
    selection: Option<SeatSelection>,
    quote: Option<PriceQuote>,
}

impl SeatingSession {
    pub fn new(screening_id: i64, config: &Config) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            screening_id,
            policy: config.pricing.estimate_policy,
            deriver: PriceDeriver::new(config.pricing.flat_fallback_price_cents),
            layout: None,
            selection: None,
            quote: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn screening_id(&self) -> i64 {
        self.screening_id
    }

    /// Сессия готова к интерактиву: схема и занятые места загружены.
    pub fn is_ready(&self) -> bool {
        self.layout.is_some() && self.selection.is_some()
    }

    /// Загрузка данных сеанса. Повторный вызов после сбоя допустим —
    /// до первого успеха сетка мест остаётся неинтерактивной.
    pub async fn load(&mut self, api: &BookingApiClient) -> Result<(), SeatingError> {
        let (layout, booked) = tokio::join!(
            api.fetch_seating_layout(self.screening_id),
            api.fetch_booked_seats(self.screening_id),
        );

        let layout = layout.map_err(|e| {
            warn!(session_id = %self.session_id, "seating layout fetch failed: {}", e);
            SeatingError::DataUnavailable(format!("seating layout: {}", e))
        })?;
        let booked: HashSet<SeatId> = booked.map_err(|e| {
            warn!(session_id = %self.session_id, "booked seats fetch failed: {}", e);
            SeatingError::DataUnavailable(format!("booked seats: {}", e))
        })?;

        let selection = SeatSelection::new(&layout, booked);
        self.quote = Some(self.deriver.derive(&layout, &selection));
        self.layout = Some(layout);
        self.selection = Some(selection);
        info!(
            session_id = %self.session_id,
            screening_id = self.screening_id,
            "seating session ready"
        );
        Ok(())
    }

    /// Переключить место. До завершения загрузки — молчаливый no-op,
    /// как и для занятых мест. Каждое изменение синхронно пересчитывает
    /// локальную цену.
    pub fn toggle(&mut self, seat: &SeatId) {
        let (Some(layout), Some(selection)) = (&self.layout, &mut self.selection) else {
            return;
        };
        selection.toggle(seat);
        self.quote = Some(self.deriver.derive(layout, selection));
    }

    pub fn is_selected(&self, seat: &SeatId) -> bool {
        self.selection
            .as_ref()
            .map(|s| s.is_selected(seat))
            .unwrap_or(false)
    }

    pub fn is_booked(&self, seat: &SeatId) -> bool {
        self.selection
            .as_ref()
            .map(|s| s.is_booked(seat))
            .unwrap_or(false)
    }

    pub fn selected_seats(&self) -> Vec<SeatId> {
        self.selection
            .as_ref()
            .map(|s| s.seats())
            .unwrap_or_default()
    }

    /// Текущая цена (локальная или подтверждённая).
    pub fn quote(&self) -> Option<&PriceQuote> {
        self.quote.as_ref()
    }

    /// Запросить авторитетное подтверждение цены у удалённого сервиса.
    ///
    /// Сбой сервиса — не ошибка для вызывающей стороны: цена заменяется
    /// плоской оценкой с пометкой `is_estimate`, потребители обязаны
    /// отличать её от авторитетной.
    pub async fn confirm_quote(
        &mut self,
        api: &BookingApiClient,
    ) -> Result<&PriceQuote, SeatingError> {
        let (Some(layout), Some(selection)) = (&self.layout, &self.selection) else {
            return Err(SeatingError::DataUnavailable(
                "session is not loaded".to_string(),
            ));
        };

        let quote = match api
            .fetch_price_quote(self.screening_id, selection.seats())
            .await
        {
            Ok(quote) => quote,
            Err(e) => {
                warn!(
                    session_id = %self.session_id,
                    "price confirmation failed ({}), falling back to flat estimate",
                    e
                );
                self.deriver.estimate(layout.base_price_cents, selection)
            }
        };

        Ok(&*self.quote.insert(quote))
    }

    /// Заморозить выбор и передать снимок шагу оформления заказа.
    ///
    /// Неуспех (пустой выбор, оценка при запрещающей политике, сбой
    /// передачи) оставляет сессию нетронутой и повторяемой. После успеха
    /// жизненный цикл выбора на этом экране завершён.
    pub async fn finalize(
        &mut self,
        api: &BookingApiClient,
    ) -> Result<FinalizedSelection, SeatingError> {
        let (Some(selection), Some(quote)) = (&self.selection, &self.quote) else {
            return Err(SeatingError::DataUnavailable(
                "session is not loaded".to_string(),
            ));
        };

        let snapshot = checkout::finalize(self.screening_id, selection, quote, self.policy)?;
        api.submit_selection(&snapshot, &self.session_id.to_string())
            .await?;

        // Следующий экран владеет собственной копией: локальное состояние
        // этой сессии закончило жизненный цикл.
        self.layout = None;
        self.selection = None;
        self.quote = None;
        info!(session_id = %self.session_id, "selection handed off, session closed");
        Ok(snapshot)
    }
}
