//! Вывод цены для текущего выбора мест.
//!
//! Основной путь: сумма `база * множитель_ряда` по выбранным местам.
//! Ряд не нашёлся в схеме (рассинхрон данных) — место считается по базовой
//! цене, это деградация, а не отказ. Запасной путь: плоская оценка
//! `кол-во * flat_fallback`, помеченная `is_estimate`, — только когда
//! авторитетный расчёт недоступен.

use tracing::{debug, warn};

use crate::models::layout::SeatingLayout;
use crate::models::quote::{apply_multiplier, format_cents, PriceQuote};
use crate::models::seat::SeatId;
use crate::selection::SeatSelection;

pub struct PriceDeriver {
    flat_fallback_cents: i64,
    // Мемо последнего расчёта по ключу (сеанс, отсортированные места).
    memo: Option<(String, PriceQuote)>,
}

impl PriceDeriver {
    pub fn new(flat_fallback_cents: i64) -> Self {
        Self {
            flat_fallback_cents,
            memo: None,
        }
    }

    /// Авторитетный локальный расчёт. Синхронный и чистый с точки зрения
    /// вызывающей стороны; мемоизация — деталь реализации.
    pub fn derive(&mut self, layout: &SeatingLayout, selection: &SeatSelection) -> PriceQuote {
        let seats = selection.seats();
        let key = memo_key(layout.screening_id, &seats);
        if let Some((cached_key, cached)) = &self.memo {
            if *cached_key == key {
                return cached.clone();
            }
        }

        let mut total = 0i64;
        for seat in &seats {
            match layout.row(&seat.row) {
                Some(row) => {
                    total += apply_multiplier(layout.base_price_cents, row.price_multiplier_bps);
                }
                None => {
                    // Рассинхрон схемы и выбора: берём базовую цену без
                    // множителя вместо отказа.
                    warn!(
                        seat = %seat,
                        "row not found in layout, pricing seat at base price"
                    );
                    total += layout.base_price_cents;
                }
            }
        }

        let quote = PriceQuote {
            base_price_cents: layout.base_price_cents,
            total_price_cents: total,
            seats,
            is_estimate: false,
        };
        debug!(
            screening_id = layout.screening_id,
            seats = quote.seats.len(),
            total = %format_cents(quote.total_price_cents),
            "derived price quote"
        );
        self.memo = Some((key, quote.clone()));
        quote
    }

    /// Плоская оценка на случай недоступности авторитетного расчёта.
    /// Не зависит от множителей рядов и всегда помечена как оценка.
    pub fn estimate(&self, base_price_cents: i64, selection: &SeatSelection) -> PriceQuote {
        let seats = selection.seats();
        let total = seats.len() as i64 * self.flat_fallback_cents;
        warn!(
            seats = seats.len(),
            total = %format_cents(total),
            "price service unavailable, using flat fallback estimate"
        );
        PriceQuote {
            base_price_cents,
            total_price_cents: total,
            seats,
            is_estimate: true,
        }
    }
}

fn memo_key(screening_id: i64, seats: &[SeatId]) -> String {
    let labels: Vec<String> = seats.iter().map(SeatId::label).collect();
    format!("{}:{}", screening_id, labels.join(","))
}
