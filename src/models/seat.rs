use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::SeatingError;

/// Идентификатор места: явное имя ряда + номер места в ряду.
///
/// Внутри ядра ряд хранится отдельным полем; строковая форма вида "A12"
/// существует только на границе с API (провайдер занятых мест говорит
/// строками) и для отображения.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId {
    pub row: String,
    pub number: u32,
}

impl SeatId {
    pub fn new(row: impl Into<String>, number: u32) -> Self {
        Self {
            row: row.into(),
            number,
        }
    }

    /// Строковая метка вида "A12".
    pub fn label(&self) -> String {
        format!("{}{}", self.row, self.number)
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.number)
    }
}

// Порядок — лексикографический по строковой метке ("A10" < "A2").
// Так зафиксирован детерминированный порядок отображения снимка выбора.
impl Ord for SeatId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label().cmp(&other.label())
    }
}

impl PartialOrd for SeatId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for SeatId {
    type Err = SeatingError;

    /// Разбор строковой формы: ведущие нецифровые символы — имя ряда,
    /// остаток — номер места.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s.find(|c: char| c.is_ascii_digit());
        let (row, digits) = match split {
            Some(idx) if idx > 0 => s.split_at(idx),
            _ => return Err(SeatingError::SeatIdParse(s.to_string())),
        };
        if !row.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SeatingError::SeatIdParse(s.to_string()));
        }

        let number: u32 = digits
            .parse()
            .map_err(|_| SeatingError::SeatIdParse(s.to_string()))?;
        if number == 0 {
            return Err(SeatingError::SeatIdParse(s.to_string()));
        }

        Ok(SeatId::new(row, number))
    }
}

impl TryFrom<String> for SeatId {
    type Error = SeatingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> String {
        seat.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_row_and_number() {
        let seat: SeatId = "A12".parse().unwrap();
        assert_eq!(seat.row, "A");
        assert_eq!(seat.number, 12);
        assert_eq!(seat.label(), "A12");
    }

    #[test]
    fn parses_multi_letter_row() {
        let seat: SeatId = "AA3".parse().unwrap();
        assert_eq!(seat.row, "AA");
        assert_eq!(seat.number, 3);
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for bad in ["", "A", "12", "A0", "A1B", "A-1"] {
            assert!(bad.parse::<SeatId>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn ordering_is_lexicographic_by_label() {
        let mut seats = vec![
            SeatId::new("B", 3),
            SeatId::new("A", 2),
            SeatId::new("A", 10),
        ];
        seats.sort();
        let labels: Vec<String> = seats.iter().map(SeatId::label).collect();
        assert_eq!(labels, vec!["A10", "A2", "B3"]);
    }

    #[test]
    fn serde_roundtrip_uses_string_form() {
        let seat = SeatId::new("C", 7);
        let json = serde_json::to_string(&seat).unwrap();
        assert_eq!(json, "\"C7\"");
        let back: SeatId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seat);
    }
}
