pub mod csv;
pub mod xlsx;

pub use self::csv::{parse_csv_str, read_csv};
pub use self::xlsx::read_xlsx;
