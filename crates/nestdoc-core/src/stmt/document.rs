use super::Value;
use indexmap::IndexMap;

/// An ordered field name to value mapping, the unit of storage.
pub type Document = IndexMap<String, Value>;

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Self::Document(value)
    }
}

impl Value {
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(document) => Some(document),
            _ => None,
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            Self::Document(document) => Some(document),
            _ => None,
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }
}

/// Builds a [`Document`] from `key => value` pairs.
#[macro_export]
macro_rules! doc {
    () => {
        $crate::stmt::Document::new()
    };
    ( $( $key:expr => $value:expr ),+ $(,)? ) => {{
        let mut document = $crate::stmt::Document::new();
        $( document.insert(String::from($key), $crate::stmt::Value::from($value)); )+
        document
    }};
}
