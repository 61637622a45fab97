use serde::{Deserialize, Serialize};

use crate::models::seat::SeatId;

/// Масштаб множителей цены: базисные пункты, 10000 = x1.0.
pub const BPS_SCALE: i64 = 10_000;

/// Цена места = база * множитель, целыми центами, округление half-up.
/// Никакой двоичной плавающей точки в денежных расчётах.
pub fn apply_multiplier(base_cents: i64, multiplier_bps: u32) -> i64 {
    (base_cents * multiplier_bps as i64 + BPS_SCALE / 2) / BPS_SCALE
}

/// Форматирование центов в десятичную строку для логов ("1500" -> "15.00").
pub fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

/// Расчёт цены для текущего выбора мест.
///
/// Производное значение: не хранится, пересчитывается при каждом изменении
/// выбора или схемы зала. `is_estimate` помечает деградированный расчёт
/// (flat fallback) — оценка никогда не выглядит как авторитетная цена.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub base_price_cents: i64,
    pub total_price_cents: i64,
    /// Снимок выбранных мест в лексикографическом порядке.
    pub seats: Vec<SeatId>,
    pub is_estimate: bool,
}
