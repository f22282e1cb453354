use crate::value::Value;
use derive_more::{Deref, DerefMut, IntoIterator};
use std::collections::BTreeMap;

///
/// Entry
///
/// One structured record: field name → logical value. Used for both
/// mutation input and decoded query results.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, IntoIterator, PartialEq)]
pub struct Entry(BTreeMap<String, Value>);

impl Entry {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Chainable field setter.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

impl From<BTreeMap<String, Value>> for Entry {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self(fields)
    }
}

impl FromIterator<(String, Value)> for Entry {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
