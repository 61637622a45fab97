use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::SeatingError;
use crate::models::seat::SeatId;

/// Ряд зала: группа мест с общим множителем цены и типом места.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub name: String,
    pub seats_count: u32,
    /// Множитель цены в базисных пунктах (10000 = x1.0, 15000 = x1.5).
    pub price_multiplier_bps: u32,
    pub seat_type: String,
}

/// Схема зала для одного сеанса.
///
/// Принадлежит внешнему провайдеру схем; внутри одной сессии выбора мест
/// она read-only. Порядок рядов — порядок отображения (от экрана вглубь).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatingLayout {
    pub screening_id: i64,
    pub starts_at: Option<NaiveDateTime>,
    pub base_price_cents: i64,
    pub rows: Vec<Row>,
}

impl SeatingLayout {
    /// Валидация данных провайдера. Битую схему не принимаем:
    /// дальше на ней строится весь инвариант выбора.
    pub fn validate(&self) -> Result<(), SeatingError> {
        if self.base_price_cents <= 0 {
            return Err(SeatingError::InvalidLayout(format!(
                "base price must be positive, got {}",
                self.base_price_cents
            )));
        }
        if self.rows.is_empty() {
            return Err(SeatingError::InvalidLayout("layout has no rows".into()));
        }

        let mut names: HashSet<&str> = HashSet::with_capacity(self.rows.len());
        for row in &self.rows {
            if row.name.is_empty() || !row.name.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(SeatingError::InvalidLayout(format!(
                    "row name {:?} is not a letter sequence",
                    row.name
                )));
            }
            if !names.insert(row.name.as_str()) {
                return Err(SeatingError::InvalidLayout(format!(
                    "duplicate row name {:?}",
                    row.name
                )));
            }
            if row.seats_count == 0 {
                return Err(SeatingError::InvalidLayout(format!(
                    "row {:?} has zero seats",
                    row.name
                )));
            }
            if row.price_multiplier_bps == 0 {
                return Err(SeatingError::InvalidLayout(format!(
                    "row {:?} has non-positive price multiplier",
                    row.name
                )));
            }
        }
        Ok(())
    }

    /// Ряд по имени.
    pub fn row(&self, name: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Входит ли место в объявленную схему.
    pub fn contains(&self, seat: &SeatId) -> bool {
        self.row(&seat.row)
            .map(|r| seat.number >= 1 && seat.number <= r.seats_count)
            .unwrap_or(false)
    }

    /// Все идентификаторы мест схемы, в порядке рядов.
    pub fn seat_ids(&self) -> Vec<SeatId> {
        self.rows
            .iter()
            .flat_map(|r| (1..=r.seats_count).map(|n| SeatId::new(r.name.clone(), n)))
            .collect()
    }

    /// Общее число мест в зале.
    pub fn capacity(&self) -> usize {
        self.rows.iter().map(|r| r.seats_count as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SeatingLayout {
        SeatingLayout {
            screening_id: 1,
            starts_at: None,
            base_price_cents: 1000,
            rows: vec![
                Row {
                    name: "A".into(),
                    seats_count: 5,
                    price_multiplier_bps: 15_000,
                    seat_type: "Premium".into(),
                },
                Row {
                    name: "B".into(),
                    seats_count: 5,
                    price_multiplier_bps: 10_000,
                    seat_type: "Standard".into(),
                },
            ],
        }
    }

    #[test]
    fn valid_layout_passes() {
        assert!(layout().validate().is_ok());
        assert_eq!(layout().capacity(), 10);
    }

    #[test]
    fn rejects_bad_layouts() {
        let mut l = layout();
        l.base_price_cents = 0;
        assert!(l.validate().is_err());

        let mut l = layout();
        l.rows.clear();
        assert!(l.validate().is_err());

        let mut l = layout();
        l.rows[1].name = "A".into();
        assert!(l.validate().is_err());

        let mut l = layout();
        l.rows[0].seats_count = 0;
        assert!(l.validate().is_err());

        let mut l = layout();
        l.rows[0].price_multiplier_bps = 0;
        assert!(l.validate().is_err());
    }

    #[test]
    fn contains_respects_row_bounds() {
        let l = layout();
        assert!(l.contains(&SeatId::new("A", 1)));
        assert!(l.contains(&SeatId::new("B", 5)));
        assert!(!l.contains(&SeatId::new("B", 6)));
        assert!(!l.contains(&SeatId::new("C", 1)));
    }

    #[test]
    fn seat_ids_enumerates_in_row_order() {
        let ids = layout().seat_ids();
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], SeatId::new("A", 1));
        assert_eq!(ids[5], SeatId::new("B", 1));
    }
}
