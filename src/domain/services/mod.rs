pub mod data_file_locator;

pub use data_file_locator::{discover, DataFiles};
