pub mod table;

pub use table::{CellValue, Table};
