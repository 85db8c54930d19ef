mod builder;
pub use builder::{FieldBuilder, ModelBuilder};

mod embedment;
pub use embedment::{Embedment, EmbedmentKind};

mod field;
pub use field::{Field, FieldName, Visibility};

mod model;
pub use model::Model;

mod name;
pub use name::Name;

/// Repository used when no adapter-instance name is configured.
pub const DEFAULT_REPOSITORY: &str = "default";

/// Storage field the document store uses for identity.
pub const IDENTITY_FIELD: &str = "_id";
