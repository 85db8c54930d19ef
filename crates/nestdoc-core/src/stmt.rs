mod document;
pub use document::Document;

mod id;
pub use id::Id;

mod range;
pub use range::ValueRange;

mod ty;
pub use ty::Type;

mod value;
pub use value::Value;

mod value_chrono;
