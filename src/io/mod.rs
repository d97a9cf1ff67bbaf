pub mod json;

// Re-export commonly used functions
pub use json::{read_pivot_input, write_series_matrix, PivotInput};
