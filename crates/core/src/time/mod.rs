pub mod month;

pub use month::{today_local, YearMonth};
