//! Состояние выбора мест — единственное изменяемое состояние ядра.
//!
//! Инварианты держатся структурно, а не проверками по месту использования:
//! выбранные места никогда не пересекаются с занятыми и никогда не выходят
//! за пределы объявленной схемы зала.

use std::collections::HashSet;

use crate::models::layout::SeatingLayout;
use crate::models::seat::SeatId;

pub struct SeatSelection {
    selected: HashSet<SeatId>,
    booked: HashSet<SeatId>,
    // Места, существующие в объявленной схеме.
    layout_seats: HashSet<SeatId>,
}

impl SeatSelection {
    /// Пустой выбор для загруженной схемы и снимка занятых мест.
    pub fn new(layout: &SeatingLayout, booked: HashSet<SeatId>) -> Self {
        Self {
            selected: HashSet::new(),
            layout_seats: layout.seat_ids().into_iter().collect(),
            booked,
        }
    }

    /// Переключить место.
    ///
    /// Занятое место — молчаливый no-op: оно просто не выбирается, без
    /// ошибок и побочных эффектов. Место вне схемы — тоже no-op. Иначе
    /// место добавляется или убирается из выбора.
    pub fn toggle(&mut self, seat: &SeatId) {
        if self.booked.contains(seat) || !self.layout_seats.contains(seat) {
            return;
        }
        if !self.selected.remove(seat) {
            self.selected.insert(seat.clone());
        }
    }

    pub fn is_selected(&self, seat: &SeatId) -> bool {
        self.selected.contains(seat)
    }

    pub fn is_booked(&self, seat: &SeatId) -> bool {
        self.booked.contains(seat)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Снимок выбора в лексикографическом порядке меток.
    pub fn seats(&self) -> Vec<SeatId> {
        let mut seats: Vec<SeatId> = self.selected.iter().cloned().collect();
        seats.sort();
        seats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layout::Row;
    use proptest::prelude::*;

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
    fn booked_seat_toggle_is_a_silent_noop() {
        let booked: HashSet<SeatId> = [SeatId::new("A", 1)].into_iter().collect();
        let mut sel = SeatSelection::new(&layout(), booked);

        sel.toggle(&SeatId::new("A", 1));
        assert!(sel.is_empty());
        assert!(sel.is_booked(&SeatId::new("A", 1)));
        assert!(!sel.is_selected(&SeatId::new("A", 1)));
    }

    #[test]
    fn seat_outside_layout_is_ignored() {
        let mut sel = SeatSelection::new(&layout(), HashSet::new());
        sel.toggle(&SeatId::new("Z", 1));
        sel.toggle(&SeatId::new("A", 6));
        assert!(sel.is_empty());
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = SeatSelection::new(&layout(), HashSet::new());
        let seat = SeatId::new("B", 3);

        sel.toggle(&seat);
        assert!(sel.is_selected(&seat));
        assert_eq!(sel.len(), 1);

        sel.toggle(&seat);
        assert!(!sel.is_selected(&seat));
        assert!(sel.is_empty());
    }

    #[test]
    fn snapshot_is_sorted_regardless_of_insertion_order() {
        let mut sel = SeatSelection::new(&layout(), HashSet::new());
        sel.toggle(&SeatId::new("B", 3));
        sel.toggle(&SeatId::new("A", 2));

        let labels: Vec<String> = sel.seats().iter().map(SeatId::label).collect();
        assert_eq!(labels, vec!["A2", "B3"]);
    }

    // Генератор мест внутри схемы из теста: ряды A/B, номера 1..=5.
    fn arb_seat() -> impl Strategy<Value = SeatId> {
        (prop::sample::select(vec!["A", "B"]), 1u32..=5).prop_map(|(r, n)| SeatId::new(r, n))
    }

    proptest! {
        // §: toggle занятого места никогда не меняет выбор, при любой
        // предыстории переключений.
        #[test]
        fn booked_toggle_never_changes_selection(
            history in prop::collection::vec(arb_seat(), 0..20),
            booked_seat in arb_seat(),
        ) {
            let booked: HashSet<SeatId> = [booked_seat.clone()].into_iter().collect();
            let mut sel = SeatSelection::new(&layout(), booked);
            for s in &history {
                sel.toggle(s);
            }

            let before = sel.seats();
            sel.toggle(&booked_seat);
            prop_assert_eq!(sel.seats(), before);
        }

        // Двойной toggle свободного места — инволюция: состояние
        // возвращается к исходному.
        #[test]
        fn double_toggle_is_involution(
            history in prop::collection::vec(arb_seat(), 0..20),
            seat in arb_seat(),
        ) {
            let mut sel = SeatSelection::new(&layout(), HashSet::new());
            for s in &history {
                sel.toggle(s);
            }

            let before = sel.seats();
            sel.toggle(&seat);
            sel.toggle(&seat);
            prop_assert_eq!(sel.seats(), before);
        }
    }
}
