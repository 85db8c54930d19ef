mod adapter;
pub use adapter::{Adapter, Config};

mod connection_stack;
pub use connection_stack::ConnectionStack;

pub mod embedment;
pub use embedment::{Relationship, Target};

pub mod flatten;
pub use flatten::{flatten, flatten_attributes};

pub mod query;
pub use query::{Condition, Query};

mod resource;
pub use resource::{Parent, Resource};

pub use nestdoc_core::{
    async_trait, codec, doc, driver,
    schema::{self, Model},
    stmt::{self, Document, Id, Type, Value},
    Error, Result,
};

#[cfg(feature = "mongodb")]
pub use nestdoc_driver_mongodb::MongoDb;
