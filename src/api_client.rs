//! api_client.rs
//!
//! Этот модуль реализует клиент удалённого REST API кинотеатра — всех
//! внешних коллабораторов ядра выбора мест.
//!
//! Ключевые компоненты:
//! 1.  **CircuitBreaker**: Реализация паттерна "Автоматический выключатель"
//!     для отказоустойчивости при работе с удалённым API. После серии сбоев
//!     запросы блокируются локально, без обращения к неработающему сервису.
//! 2.  **BookingApiClient**: Клиент провайдеров схемы зала и занятых мест,
//!     сервиса подтверждения цены и приёмника финального выбора. Все
//!     сетевые вызовы защищены `CircuitBreaker`.
//! 3.  **DTO границы**: Десятичные цены и множители приходят числами JSON и
//!     ровно один раз конвертируются в центы / базисные пункты. Дальше
//!     внутри ядра плавающей точки нет.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};
use tokio::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::errors::SeatingError;
use crate::models::layout::{Row, SeatingLayout};
use crate::models::quote::PriceQuote;
use crate::models::seat::SeatId;

/// Состояния "Автоматического выключателя" (Circuit Breaker).
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitState {
    /// Нормальный режим: запросы к API разрешены.
    Closed,
    /// Режим блокировки после серии сбоев: запросы запрещены до таймаута.
    Open,
    /// Тестовый режим: разрешён один пробный запрос после таймаута.
    HalfOpen,
}

/// Автоматический выключатель для доступа к удалённому API.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    /// Счетчик последовательных сбоев.
    failure_count: AtomicU32,
    /// Момент последнего сбоя для расчёта таймаута.
    last_failure: RwLock<Option<Instant>>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown_seconds: u64) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            last_failure: RwLock::new(None),
            failure_threshold,
            cooldown: Duration::from_secs(cooldown_seconds),
        }
    }

    /// Можно ли выполнить следующий запрос.
    pub fn can_execute(&self) -> bool {
        let state = self.state.read().unwrap();

        match *state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = self
                    .last_failure
                    .read()
                    .unwrap()
                    .map(|t| t.elapsed())
                    .unwrap_or(self.cooldown);

                if elapsed >= self.cooldown {
                    // Таймаут прошёл: переходим в HalfOpen на один пробный запрос.
                    drop(state); // Освобождаем блокировку чтения перед записью.
                    *self.state.write().unwrap() = CircuitState::HalfOpen;
                    info!("Circuit breaker transitioning to HalfOpen state");
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => true,
        }
    }

    /// Регистрирует успешный запрос.
    pub fn record_success(&self) {
        let mut state = self.state.write().unwrap();

        match *state {
            CircuitState::HalfOpen => {
                *state = CircuitState::Closed;
                self.failure_count.store(0, Ordering::Relaxed);
                info!("Circuit breaker recovered - transitioning to Closed state");
            }
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    /// Регистрирует сбой запроса.
    pub fn record_failure(&self) {
        let failure_count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        *self.last_failure.write().unwrap() = Some(Instant::now());

        let mut state = self.state.write().unwrap();

        match *state {
            CircuitState::Closed => {
                if failure_count >= self.failure_threshold {
                    *state = CircuitState::Open;
                    error!(
                        "Circuit breaker OPENED - {} failures reached threshold {}",
                        failure_count, self.failure_threshold
                    );
                }
            }
            CircuitState::HalfOpen => {
                *state = CircuitState::Open;
                warn!("Circuit breaker test failed - returning to Open state");
            }
            _ => {}
        }
    }

    /// Текущее состояние для мониторинга.
    pub fn get_state(&self) -> CircuitState {
        self.state.read().unwrap().clone()
    }
}

// --- DTO границы с удалённым API ---

/// Схема зала от провайдера. Цены — десятичные числа JSON.
#[derive(Debug, Deserialize)]
struct SeatingLayoutDto {
    #[serde(rename = "screeningId")]
    screening_id: i64,
    #[serde(rename = "basePrice")]
    base_price: f64,
    #[serde(rename = "startsAt")]
    starts_at: Option<chrono::NaiveDateTime>,
    rows: Vec<RowDto>,
}

#[derive(Debug, Deserialize)]
struct RowDto {
    name: String,
    #[serde(rename = "seatsCount")]
    seats_count: u32,
    #[serde(rename = "priceMultiplier")]
    price_multiplier: f64,
    #[serde(rename = "seatType")]
    seat_type: String,
}

/// Запрос авторитетного расчёта цены.
#[derive(Debug, Serialize)]
struct PriceQuoteRequest {
    #[serde(rename = "screeningId")]
    screening_id: i64,
    seats: Vec<SeatId>,
}

/// Ответ сервиса подтверждения цены.
#[derive(Debug, Deserialize)]
struct PriceQuoteResponse {
    #[serde(rename = "basePrice")]
    base_price: f64,
    #[serde(rename = "totalPrice")]
    total_price: f64,
}

/// Передача финального выбора шагу оформления заказа.
#[derive(Debug, Serialize)]
struct SubmitSelectionRequest {
    #[serde(rename = "screeningId")]
    screening_id: i64,
    seats: Vec<SeatId>,
    #[serde(rename = "totalPriceCents")]
    total_price_cents: i64,
    #[serde(rename = "handoffToken")]
    handoff_token: String,
    #[serde(rename = "sessionId")]
    session_id: String,
}

// Единственное место с плавающей точкой: конвертация десятичной цены
// провайдера в центы при входе в ядро.
fn cents_from_decimal(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

fn bps_from_decimal(value: f64) -> u32 {
    (value * 10_000.0).round() as u32
}

/// Клиент удалённого API кинотеатра.
#[derive(Clone)]
pub struct BookingApiClient {
    base_url: String,
    http_client: reqwest::Client,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl BookingApiClient {
    /// Создает и конфигурирует клиент на основе настроек приложения.
    pub fn from_config(config: &Config) -> Result<Self, SeatingError> {
        let circuit_breaker = Arc::new(CircuitBreaker::new(
            config.circuit_breaker.failure_threshold,
            config.circuit_breaker.cooldown_seconds,
        ));

        Ok(Self {
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.api.timeout_seconds))
                .build()?,
            circuit_breaker,
        })
    }

    /// Выполняет асинхронную операцию, пропуская её через Circuit Breaker.
    async fn execute_with_circuit_breaker<F, T>(&self, operation: F) -> Result<T, SeatingError>
    where
        F: std::future::Future<Output = Result<T, reqwest::Error>>,
    {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking booking API request");
            return Err(SeatingError::CircuitOpen);
        }

        match operation.await {
            Ok(result) => {
                self.circuit_breaker.record_success();
                Ok(result)
            }
            Err(e) => {
                error!("Booking API request failed: {:?}", e);
                self.circuit_breaker.record_failure();
                Err(SeatingError::Http(e))
            }
        }
    }

    /// Схема зала для сеанса: ряды, множители, базовая цена.
    pub async fn fetch_seating_layout(
        &self,
        screening_id: i64,
    ) -> Result<SeatingLayout, SeatingError> {
        let url = format!("{}/screenings/{}/layout", self.base_url, screening_id);

        let operation = async {
            self.http_client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json::<SeatingLayoutDto>()
                .await
        };

        let dto = self.execute_with_circuit_breaker(operation).await?;
        let layout = SeatingLayout {
            screening_id: dto.screening_id,
            starts_at: dto.starts_at,
            base_price_cents: cents_from_decimal(dto.base_price),
            rows: dto
                .rows
                .into_iter()
                .map(|r| Row {
                    name: r.name,
                    seats_count: r.seats_count,
                    price_multiplier_bps: bps_from_decimal(r.price_multiplier),
                    seat_type: r.seat_type,
                })
                .collect(),
        };
        layout.validate()?;
        info!(
            screening_id,
            rows = layout.rows.len(),
            capacity = layout.capacity(),
            "seating layout loaded"
        );
        Ok(layout)
    }

    /// Уже проданные места сеанса. Снимок на момент запроса: живых
    /// уведомлений нет, устаревание разрешается сервером при создании брони.
    pub async fn fetch_booked_seats(
        &self,
        screening_id: i64,
    ) -> Result<HashSet<SeatId>, SeatingError> {
        let url = format!("{}/screenings/{}/booked-seats", self.base_url, screening_id);

        let operation = async {
            self.http_client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<String>>()
                .await
        };

        let labels = self.execute_with_circuit_breaker(operation).await?;
        let seats = labels
            .iter()
            .map(|s| s.parse::<SeatId>())
            .collect::<Result<HashSet<SeatId>, SeatingError>>()?;
        info!(screening_id, booked = seats.len(), "booked seats loaded");
        Ok(seats)
    }

    /// Авторитетное подтверждение цены. Ошибка здесь не фатальна:
    /// вызывающая сторона переходит на оценочный расчёт.
    pub async fn fetch_price_quote(
        &self,
        screening_id: i64,
        seats: Vec<SeatId>,
    ) -> Result<PriceQuote, SeatingError> {
        let url = format!("{}/screenings/{}/price-quote", self.base_url, screening_id);
        let request = PriceQuoteRequest {
            screening_id,
            seats: seats.clone(),
        };

        let operation = async {
            self.http_client
                .post(&url)
                .json(&request)
                .send()
                .await?
                .error_for_status()?
                .json::<PriceQuoteResponse>()
                .await
        };

        let response = self.execute_with_circuit_breaker(operation).await?;
        Ok(PriceQuote {
            base_price_cents: cents_from_decimal(response.base_price),
            total_price_cents: cents_from_decimal(response.total_price),
            seats,
            is_estimate: false,
        })
    }

    /// Передаёт замороженный выбор шагу оформления заказа. Создание брони и
    /// платёж — на стороне этого коллаборатора, не здесь.
    pub async fn submit_selection(
        &self,
        snapshot: &crate::checkout::FinalizedSelection,
        session_id: &str,
    ) -> Result<(), SeatingError> {
        let url = format!(
            "{}/screenings/{}/selection",
            self.base_url, snapshot.screening_id
        );
        let request = SubmitSelectionRequest {
            screening_id: snapshot.screening_id,
            seats: snapshot.seats.clone(),
            total_price_cents: snapshot.quote.total_price_cents,
            handoff_token: snapshot.handoff_token.clone(),
            session_id: session_id.to_string(),
        };

        info!(
            screening_id = snapshot.screening_id,
            seats = snapshot.seats.len(),
            "submitting finalized selection"
        );

        let operation = async {
            self.http_client
                .post(&url)
                .json(&request)
                .send()
                .await?
                .error_for_status()
        };

        self.execute_with_circuit_breaker(operation).await?;
        Ok(())
    }

    /// Состояние Circuit Breaker для мониторинга.
    pub fn circuit_breaker_status(&self) -> (CircuitState, u32) {
        (
            self.circuit_breaker.get_state(),
            self.circuit_breaker.failure_count.load(Ordering::Relaxed),
        )
    }
}
