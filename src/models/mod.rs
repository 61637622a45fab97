pub mod layout;
pub mod quote;
pub mod seat;

pub use layout::{Row, SeatingLayout};
pub use quote::PriceQuote;
pub use seat::SeatId;
