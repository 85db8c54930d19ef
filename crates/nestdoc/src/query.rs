//! Query objects and their translation into driver filters.

use nestdoc_core::{
    driver::{Direction, FindOptions},
    schema::{Field, Model},
    stmt::{Document, Value, ValueRange},
    Error, Result,
};
use std::sync::Arc;

/// Selects resources of one model.
#[derive(Debug, Clone)]
pub struct Query {
    model: Arc<Model>,

    /// Conditions by property name, all of which must hold
    conditions: Vec<(String, Condition)>,

    sort: Vec<(String, Direction)>,

    limit: Option<u64>,

    offset: Option<u64>,
}

/// A condition on a single property.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    Range(ValueRange),
}

impl Query {
    /// A query matching every resource of `model`.
    pub fn new(model: &Arc<Model>) -> Query {
        Query {
            model: model.clone(),
            conditions: vec![],
            sort: vec![],
            limit: None,
            offset: None,
        }
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn filter(mut self, name: &str, condition: Condition) -> Self {
        self.conditions.push((name.to_string(), condition));
        self
    }

    pub fn sort(mut self, name: &str, direction: Direction) -> Self {
        self.sort.push((name.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Builds the driver filter and find options.
    ///
    /// Property names become storage field names and operands are dumped
    /// through the field's codec. Several conditions on one property are
    /// combined into a single operator document; when they repeat an
    /// operator, the later ones go into a top-level `$and` so every
    /// condition still holds.
    pub fn translate(&self) -> Result<(Document, FindOptions)> {
        let mut filter = Document::new();
        let mut and = vec![];

        for (name, condition) in &self.conditions {
            let field = self.field(name)?;
            let value = condition.translate(field)?;

            let Some(existing) = filter.get_mut(field.storage_name()) else {
                filter.insert(field.storage_name().to_string(), value);
                continue;
            };

            if let Some(merged) = merge(existing, &value) {
                *existing = merged;
                continue;
            }

            let mut clause = Document::new();
            clause.insert(field.storage_name().to_string(), value);
            and.push(Value::Document(clause));
        }

        if !and.is_empty() {
            filter.insert("$and".to_string(), Value::List(and));
        }

        let sort = self
            .sort
            .iter()
            .map(|(name, direction)| Ok((self.field(name)?.storage_name().to_string(), *direction)))
            .collect::<Result<_>>()?;

        let options = FindOptions {
            sort,
            limit: self.limit,
            skip: self.offset,
        };

        Ok((filter, options))
    }

    fn field(&self, name: &str) -> Result<&Field> {
        self.model
            .field(name)
            .ok_or_else(|| Error::unknown_property(self.model.name.to_string(), name))
    }
}

impl Condition {
    fn translate(&self, field: &Field) -> Result<Value> {
        let dump = |value: &Value| field.codec.dump(value);

        let operator = |op: &str, value: &Value| -> Result<Value> {
            let mut document = Document::new();
            document.insert(op.to_string(), dump(value)?);
            Ok(Value::Document(document))
        };

        match self {
            Condition::Eq(value) => dump(value),
            Condition::Ne(value) => operator("$ne", value),
            Condition::Gt(value) => operator("$gt", value),
            Condition::Gte(value) => operator("$gte", value),
            Condition::Lt(value) => operator("$lt", value),
            Condition::Lte(value) => operator("$lte", value),
            Condition::In(values) => {
                let values = values.iter().map(dump).collect::<Result<Vec<_>>>()?;
                let mut document = Document::new();
                document.insert("$in".to_string(), Value::List(values));
                Ok(Value::Document(document))
            }
            Condition::Range(range) => {
                let range = range.clone().try_map(|bound| dump(&bound))?;
                let end = if range.inclusive { "$lte" } else { "$lt" };

                let mut document = Document::new();
                document.insert("$gte".to_string(), *range.start);
                document.insert(end.to_string(), *range.end);
                Ok(Value::Document(document))
            }
        }
    }
}

/// Combines two conditions on one field into one operator document, unless
/// they share an operator.
fn merge(existing: &Value, condition: &Value) -> Option<Value> {
    let mut merged = operators(existing);
    let condition = operators(condition);

    if condition.keys().any(|operator| merged.contains_key(operator)) {
        return None;
    }

    merged.extend(condition);
    Some(Value::Document(merged))
}

/// The condition as an operator document; a plain operand becomes `$eq`.
fn operators(condition: &Value) -> Document {
    match condition {
        Value::Document(document) if is_operator_document(document) => document.clone(),
        operand => {
            let mut document = Document::new();
            document.insert("$eq".to_string(), operand.clone());
            document
        }
    }
}

fn is_operator_document(document: &Document) -> bool {
    !document.is_empty() && document.keys().all(|key| key.starts_with('$'))
}
