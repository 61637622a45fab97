//! Передача выбора на оформление заказа.
//!
//! `finalize` замораживает выбор в неизменяемый снимок — единственный
//! контракт, который уходит внешнему шагу оплаты. Само создание брони и
//! платёж этим ядром не выполняются.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::errors::SeatingError;
use crate::models::quote::{format_cents, PriceQuote};
use crate::models::seat::SeatId;
use crate::selection::SeatSelection;

/// Принимать ли оценочную цену при переходе к оплате.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatePolicy {
    /// Оценка допустима: сервер всё равно пересчитает при создании брони.
    AllowEstimate,
    /// Оценка блокирует переход, пока не получена авторитетная цена.
    RequireAuthoritative,
}

/// Неизменяемый снимок выбора для следующего шага.
#[derive(Debug, Clone, Serialize)]
pub struct FinalizedSelection {
    pub screening_id: i64,
    /// Места в лексикографическом порядке меток — детерминированный
    /// порядок отображения.
    pub seats: Vec<SeatId>,
    pub quote: PriceQuote,
    /// Токен, связывающий сеанс, места и сумму для шага оформления.
    pub handoff_token: String,
}

/// Заморозить текущий выбор.
///
/// Пустой выбор — ошибка `EmptySelection`, состояние выбора не меняется.
/// Оценочная цена при политике `RequireAuthoritative` — `EstimateNotAccepted`.
pub fn finalize(
    screening_id: i64,
    selection: &SeatSelection,
    quote: &PriceQuote,
    policy: EstimatePolicy,
) -> Result<FinalizedSelection, SeatingError> {
    if selection.is_empty() {
        return Err(SeatingError::EmptySelection);
    }
    if quote.is_estimate && policy == EstimatePolicy::RequireAuthoritative {
        return Err(SeatingError::EstimateNotAccepted);
    }

    let seats = selection.seats();
    let token = handoff_token(screening_id, &seats, quote.total_price_cents);
    info!(
        screening_id,
        seats = seats.len(),
        total = %format_cents(quote.total_price_cents),
        estimate = quote.is_estimate,
        "selection finalized for checkout"
    );

    Ok(FinalizedSelection {
        screening_id,
        seats,
        quote: quote.clone(),
        handoff_token: token,
    })
}

/// SHA-256 от "{сеанс}{места}{сумма}" — та же схема, что у токенов
/// платёжного шлюза.
fn handoff_token(screening_id: i64, seats: &[SeatId], total_cents: i64) -> String {
    let labels: Vec<String> = seats.iter().map(SeatId::label).collect();
    let token_string = format!("{}{}{}", screening_id, labels.join(""), total_cents);
    let mut hasher = Sha256::new();
    hasher.update(token_string.as_bytes());
    format!("{:x}", hasher.finalize())
}
