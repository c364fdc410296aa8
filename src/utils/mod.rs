mod bitmap;
pub use bitmap::Bitmap;

mod column;
pub use column::{Column, ColumnBuilder};

mod runs;
pub(crate) use runs::paired_valid_runs_in;
pub use runs::paired_valid_runs;
