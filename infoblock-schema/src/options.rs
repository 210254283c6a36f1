use crate::{catalogue::Catalogue, field::FieldDescriptor};
use rapidhash::RapidHashSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Subscription list token that selects no fields at all.
pub const SUBSCRIBE_NONE: &str = "NONE";

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    // Empty means every catalogued field.
    pub subscribe: Vec<String>,
}

impl SchemaOptions {
    pub fn all() -> Self {
        SchemaOptions::default()
    }

    pub fn only<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        SchemaOptions {
            subscribe: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn subscription(&self) -> Subscription {
        match self.subscribe.as_slice() {
            [] => Subscription::All,
            [only] if only == SUBSCRIBE_NONE => Subscription::Nothing,
            names => Subscription::Only(names.to_vec()),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Subscription {
    All,
    Nothing,
    Only(Vec<String>),
}

impl Subscription {
    /// The subscribed fields, always in catalogue order.
    pub fn select<'c>(&self, catalogue: &'c Catalogue) -> Vec<&'c FieldDescriptor> {
        match self {
            Subscription::All => catalogue.fields().iter().collect(),
            Subscription::Nothing => Vec::new(),
            Subscription::Only(names) => {
                let mut wanted = RapidHashSet::default();
                for name in names {
                    if name == SUBSCRIBE_NONE {
                        warn!(target: "infoblock", "{} mixed with field names is ignored", SUBSCRIBE_NONE);
                    } else if !wanted.insert(name.as_str()) {
                        warn!(target: "infoblock", %name, "duplicate field subscription");
                    } else if catalogue.get(name).is_none() {
                        warn!(target: "infoblock", %name, "subscribed field is not in the header");
                    }
                }
                catalogue
                    .fields()
                    .iter()
                    .filter(|f| wanted.contains(f.name.as_str()))
                    .collect()
            }
        }
    }
}
