use super::{LayoutOptions, RenderPlan, plan};
use crate::model::{Dataset, Group, Item};

struct CacheEntry {
    dataset: Dataset,
    options: LayoutOptions,
    plan: RenderPlan,
}

impl CacheEntry {
    fn matches(&self, dataset: &Dataset, options: &LayoutOptions) -> bool {
        same_options(&self.options, options) && same_dataset(&self.dataset, dataset)
    }
}

// Floats compare by bits so a NaN input still hits the cache.
fn same_f64(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}

fn same_options(a: &LayoutOptions, b: &LayoutOptions) -> bool {
    let LayoutOptions {
        width,
        height,
        sort,
        group_by,
        orbit_assignment,
    } = a;
    same_f64(*width, b.width)
        && same_f64(*height, b.height)
        && sort == &b.sort
        && group_by == &b.group_by
        && orbit_assignment == &b.orbit_assignment
}

fn same_dataset(a: &Dataset, b: &Dataset) -> bool {
    a.center == b.center
        && a.groups.len() == b.groups.len()
        && a.groups.iter().zip(&b.groups).all(|(a, b)| same_group(a, b))
}

fn same_group(a: &Group, b: &Group) -> bool {
    let Group {
        id,
        label,
        items,
        radius,
        color,
    } = a;
    id == &b.id
        && label == &b.label
        && radius.map(f64::to_bits) == b.radius.map(f64::to_bits)
        && color == &b.color
        && items.len() == b.items.len()
        && items.iter().zip(&b.items).all(|(a, b)| same_item(a, b))
}

fn same_item(a: &Item, b: &Item) -> bool {
    let Item {
        id,
        label,
        value,
        color,
        glow,
        icon_url,
        meta,
    } = a;
    id == &b.id
        && label == &b.label
        && same_f64(*value, b.value)
        && color == &b.color
        && glow == &b.glow
        && icon_url == &b.icon_url
        && meta == &b.meta
}

/// Holds the last plan and the inputs it was built from.
#[derive(Default)]
pub struct PlanCache {
    entry: Option<CacheEntry>,
    computed: usize,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached plan when `dataset` and `options` equal the last
    /// inputs, otherwise plans again and replaces the entry.
    pub fn get_or_plan(&mut self, dataset: &Dataset, options: &LayoutOptions) -> &RenderPlan {
        let entry = match self.entry.take() {
            Some(entry) if entry.matches(dataset, options) => entry,
            _ => {
                self.computed += 1;
                log::debug!("Planning {} group(s)", dataset.groups.len());
                CacheEntry {
                    dataset: dataset.clone(),
                    options: options.clone(),
                    plan: plan(dataset, options),
                }
            }
        };
        &self.entry.insert(entry).plan
    }

    pub fn current(&self) -> Option<&RenderPlan> {
        self.entry.as_ref().map(|e| &e.plan)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Number of plans computed so far.
    pub fn computed(&self) -> usize {
        self.computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Center, Group, Item};
    use crate::ordering::{ItemComparator, SortMode};

    fn dataset() -> Dataset {
        Dataset::new(
            Center::new("c", "C"),
            vec![Group::new(
                "g",
                "G",
                vec![Item::new("a", "A", 1.0), Item::new("b", "B", 2.0)],
            )],
        )
    }

    #[test]
    fn test_identical_inputs_hit_cache() {
        let mut cache = PlanCache::new();
        let data = dataset();
        let options = LayoutOptions::default();

        let first = cache.get_or_plan(&data, &options).clone();
        let second = cache.get_or_plan(&data.clone(), &options.clone()).clone();

        assert_eq!(first, second);
        assert_eq!(cache.computed(), 1);
    }

    #[test]
    fn test_changed_inputs_replan() {
        let mut cache = PlanCache::new();
        let mut data = dataset();
        let options = LayoutOptions::default();
        cache.get_or_plan(&data, &options);

        cache.get_or_plan(&data, &LayoutOptions::sized(400.0, 400.0));
        assert_eq!(cache.computed(), 2);

        data.groups[0].items[0].value = 5.0;
        cache.get_or_plan(&data, &LayoutOptions::sized(400.0, 400.0));
        assert_eq!(cache.computed(), 3);

        cache.invalidate();
        assert!(cache.current().is_none());
        cache.get_or_plan(&data, &LayoutOptions::sized(400.0, 400.0));
        assert_eq!(cache.computed(), 4);
    }

    #[test]
    fn test_nan_inputs_still_hit_cache() {
        let mut cache = PlanCache::new();
        let mut data = dataset();
        data.groups[0].items[0].value = f64::NAN;
        data.groups[0].radius = Some(f64::NAN);
        let options = LayoutOptions::sized(f64::NAN, 600.0);

        cache.get_or_plan(&data, &options);
        cache.get_or_plan(&data.clone(), &options.clone());
        assert_eq!(cache.computed(), 1);

        data.groups[0].items[0].value = 1.0;
        cache.get_or_plan(&data, &options);
        assert_eq!(cache.computed(), 2);
    }

    #[test]
    fn test_comparator_identity_keys_cache() {
        let mut cache = PlanCache::new();
        let data = dataset();
        let cmp = ItemComparator::new(|a, b| a.label.cmp(&b.label));
        let options = LayoutOptions {
            sort: SortMode::Custom(cmp.clone()),
            ..LayoutOptions::default()
        };

        cache.get_or_plan(&data, &options);
        cache.get_or_plan(&data, &options.clone());
        assert_eq!(cache.computed(), 1);

        let other = LayoutOptions {
            sort: SortMode::Custom(ItemComparator::new(|a, b| a.label.cmp(&b.label))),
            ..LayoutOptions::default()
        };
        cache.get_or_plan(&data, &other);
        assert_eq!(cache.computed(), 2);
    }
}
