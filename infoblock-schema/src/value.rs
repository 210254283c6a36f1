use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

pub const ITEM_SEPARATOR: char = ',';
pub const MISSING_TEXT: &str = ".";

// What the typed accessor hands back. A missing scalar is an empty list,
// and a missing element inside an array is `None`; the heap sentinels
// never show up here.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Ints(Vec<Option<i32>>),
    Floats(Vec<Option<OrderedFloat<f32>>>),
    Strings(Vec<String>),
}

impl Value {
    pub fn len(&self) -> usize {
        match self {
            Value::Bool(b) => *b as usize,
            Value::Ints(v) => v.len(),
            Value::Floats(v) => v.len(),
            Value::Strings(v) => v.len(),
        }
    }

    /// True for `false` flags and for empty lists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[Option<i32>]> {
        match self {
            Value::Ints(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[Option<OrderedFloat<f32>>]> {
        match self {
            Value::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Value::Strings(v) => Some(v),
            _ => None,
        }
    }

    /// Re-encodes as one INFO entry, or `None` when there is nothing to
    /// write (an unset flag or an empty list).
    pub fn to_info_entry(&self, name: &str) -> Option<String> {
        match self {
            Value::Bool(true) => Some(name.to_string()),
            Value::Bool(false) => None,
            v if v.is_empty() => None,
            v => Some(format!("{}={}", name, v)),
        }
    }
}

fn write_list<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    items: impl Iterator<Item = Option<T>>,
) -> std::fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, "{}", ITEM_SEPARATOR)?;
        }
        match item {
            Some(x) => write!(f, "{}", x)?,
            None => write!(f, "{}", MISSING_TEXT)?,
        }
    }
    Ok(())
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Ints(v) => write_list(f, v.iter().copied()),
            Value::Floats(v) => write_list(f, v.iter().map(|x| x.map(|x| x.0))),
            Value::Strings(v) => write_list(f, v.iter().map(Some)),
        }
    }
}
