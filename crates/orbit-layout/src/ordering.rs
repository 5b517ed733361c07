use crate::model::Item;
use feruca::Collator;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

type CompareFn = dyn Fn(&Item, &Item) -> Ordering + Send + Sync;

/// Caller-supplied total order over items. Two comparators are equal only if
/// they share the same allocation, so plans built with a cloned comparator
/// still hit the cache.
#[derive(Clone)]
pub struct ItemComparator(Arc<CompareFn>);

impl ItemComparator {
    pub fn new(f: impl Fn(&Item, &Item) -> Ordering + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        (self.0)(a, b)
    }
}

impl fmt::Debug for ItemComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ItemComparator(..)")
    }
}

impl PartialEq for ItemComparator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, SerializeDisplay, DeserializeFromStr)]
pub enum SortMode {
    /// Keep dataset order.
    #[default]
    None,
    /// Highest value first.
    Value,
    /// Ascending by label in Unicode collation order, so case and accents
    /// only break ties.
    Label,
    Custom(ItemComparator),
}

impl FromStr for SortMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "value" => Self::Value,
            "label" => Self::Label,
            "" | "none" => Self::None,
            other => {
                log::warn!("Unknown sort mode '{}', keeping dataset order", other);
                Self::None
            }
        })
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Value => "value",
            Self::Label => "label",
            Self::Custom(_) => "custom",
        })
    }
}

fn compare_labels(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}

/// Returns a reordered copy of `items`. The sort is stable, so items with
/// equal keys keep their dataset order.
pub fn sort_items(items: &[Item], sort: &SortMode) -> Vec<Item> {
    let mut sorted = items.to_vec();
    match sort {
        SortMode::None => {}
        SortMode::Value => sorted.sort_by(|a, b| {
            // NaN last
            a.value
                .is_nan()
                .cmp(&b.value.is_nan())
                .then_with(|| b.value.total_cmp(&a.value))
        }),
        SortMode::Label => {
            let mut collator = Collator::default();
            sorted.sort_by(|a, b| compare_labels(&mut collator, &a.label, &b.label));
        }
        SortMode::Custom(cmp) => sorted.sort_by(|a, b| cmp.compare(a, b)),
    }
    sorted
}
