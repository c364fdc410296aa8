mod element;
pub use element::{DataType, Element, Strategy};

mod sequence;
pub use sequence::{NullableSequence, Sliced};
