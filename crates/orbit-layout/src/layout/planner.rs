use super::{LayoutOptions, Metrics, Orbit, RenderPlan, ResolvedGroup, sanitize_dimension};
use crate::angles::{distribute_angles, distribute_angles_grouped};
use crate::geometry::{Point, polar_to_cartesian, value_to_radius};
use crate::model::{Dataset, Group, GroupId, Item};
use crate::ordering::{SortMode, sort_items};
use std::collections::HashSet;

/// Builds the render plan for `dataset` in a `width` x `height` container.
///
/// Pure: identical inputs give identical plans. Never fails; malformed input
/// degrades to a smaller but drawable plan.
pub fn plan(dataset: &Dataset, options: &LayoutOptions) -> RenderPlan {
    let width = sanitize_dimension(options.width);
    let height = sanitize_dimension(options.height);
    let metrics = Metrics::new(width, height);
    let center = Point::new(width / 2.0, height / 2.0);
    let planner = Planner {
        metrics,
        center,
        sort: &options.sort,
        group_by: options.group_by,
    };

    let (orbits, groups) = match options.assignment() {
        Some(buckets) => planner.plan_buckets(dataset, buckets),
        None => planner.plan_per_group(dataset),
    };

    RenderPlan {
        width,
        height,
        center,
        metrics,
        orbits,
        groups,
    }
}

struct Planner<'a> {
    metrics: Metrics,
    center: Point,
    sort: &'a SortMode,
    group_by: bool,
}

struct SortedGroup<'a> {
    group: &'a Group,
    items: Vec<Item>,
}

impl Planner<'_> {
    fn plan_per_group(&self, dataset: &Dataset) -> (Vec<Orbit>, Vec<ResolvedGroup>) {
        let count = dataset.groups.len();

        dataset
            .groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let preferred = group
                    .radius
                    .filter(|r| r.is_finite() && *r > 0.0)
                    .unwrap_or(self.default_radius(index));
                let radius = self.clamp_radius(preferred, index, count);

                let items = sort_items(&group.items, self.sort);
                let angles = self.angles(items.len(), index, count);
                let orbit = Orbit {
                    index,
                    radius,
                    group_ids: vec![group.id.clone()],
                };
                let resolved = self.resolve(
                    SortedGroup { group, items },
                    radius,
                    angles,
                    index,
                    0,
                );
                (orbit, resolved)
            })
            .unzip()
    }

    fn plan_buckets(
        &self,
        dataset: &Dataset,
        buckets: &[Vec<GroupId>],
    ) -> (Vec<Orbit>, Vec<ResolvedGroup>) {
        let count = buckets.len();
        let mut placed: HashSet<&GroupId> = HashSet::new();
        let mut orbits = Vec::new();
        let mut groups = Vec::new();

        for (index, bucket) in buckets.iter().enumerate() {
            let members: Vec<SortedGroup> = bucket
                .iter()
                .filter_map(|id| match dataset.find_group(id) {
                    Some(group) if placed.insert(&group.id) => Some(group),
                    Some(_) => {
                        log::debug!("Group '{}' already placed, skipping in orbit {}", id, index);
                        None
                    }
                    None => {
                        log::debug!("Unknown group '{}' in orbit {}, skipping", id, index);
                        None
                    }
                })
                .map(|group| SortedGroup {
                    group,
                    items: sort_items(&group.items, self.sort),
                })
                .collect();

            if members.is_empty() {
                continue;
            }

            let radius = self.clamp_radius(self.default_radius(index), index, count);
            let total: usize = members.iter().map(|m| m.items.len()).sum();
            let angles = self.angles(total, index, count);

            orbits.push(Orbit {
                index,
                radius,
                group_ids: members.iter().map(|m| m.group.id.clone()).collect(),
            });

            let mut start = 0;
            for member in members {
                let end = start + member.items.len();
                let slice = angles[start..end].to_vec();
                groups.push(self.resolve(member, radius, slice, index, start));
                start = end;
            }
        }

        let dropped = dataset
            .groups
            .iter()
            .filter(|g| !placed.contains(&g.id))
            .count();
        if dropped > 0 {
            log::debug!("{} group(s) not assigned to any orbit were dropped", dropped);
        }

        (orbits, groups)
    }

    fn default_radius(&self, index: usize) -> f64 {
        self.metrics.base_orbit_radius + index as f64 * self.metrics.orbit_spacing
    }

    /// Keeps a ring inside `[base_orbit_radius, max_available_radius]`. An
    /// overflowing ring is moved to its rank's share of the remaining space.
    fn clamp_radius(&self, preferred: f64, index: usize, count: usize) -> f64 {
        let m = &self.metrics;
        let radius = preferred.max(m.base_orbit_radius);
        if radius <= m.max_available_radius {
            return radius;
        }

        let available = m.max_available_radius - m.base_orbit_radius;
        let clamped = m.base_orbit_radius + available / count.max(1) as f64 * (index + 1) as f64;
        log::debug!(
            "Orbit {} radius {:.1} exceeds {:.1}, redistributed to {:.1}",
            index,
            radius,
            m.max_available_radius,
            clamped
        );
        clamped
    }

    fn angles(&self, count: usize, index: usize, total: usize) -> Vec<f64> {
        if self.group_by {
            distribute_angles_grouped(count, index, total, 0.0)
        } else {
            distribute_angles(count, 0.0)
        }
    }

    fn resolve(
        &self,
        sorted: SortedGroup,
        radius: f64,
        angles: Vec<f64>,
        orbit_index: usize,
        item_start_index: usize,
    ) -> ResolvedGroup {
        let (min_value, max_value) = value_range(&sorted.items);
        let m = &self.metrics;

        let points = angles
            .iter()
            .map(|&angle| polar_to_cartesian(self.center.x, self.center.y, radius, angle))
            .collect();
        let item_radii = sorted
            .items
            .iter()
            .map(|item| {
                let r = value_to_radius(
                    item.value,
                    min_value,
                    max_value,
                    m.min_item_radius,
                    m.max_item_radius,
                );
                if r.is_finite() {
                    r
                } else {
                    (m.min_item_radius + m.max_item_radius) / 2.0
                }
            })
            .collect();

        ResolvedGroup {
            group: sorted.group.clone(),
            sorted_items: sorted.items,
            radius,
            min_value,
            max_value,
            angles,
            points,
            item_radii,
            orbit_index,
            item_start_index,
        }
    }
}

/// Min and max over finite values; `(0, 0)` when there are none.
fn value_range(items: &[Item]) -> (f64, f64) {
    let (min, max) = items
        .iter()
        .map(|item| item.value)
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min.is_finite() { (min, max) } else { (0.0, 0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Center, ItemKey};
    use std::f64::consts::TAU;

    const EPS: f64 = 1e-9;

    fn group(id: &str, values: &[f64]) -> Group {
        let items = values
            .iter()
            .enumerate()
            .map(|(i, v)| Item::new(format!("{id}-{i}"), format!("Item {i}"), *v))
            .collect();
        Group::new(id, id.to_uppercase(), items)
    }

    fn dataset(groups: Vec<Group>) -> Dataset {
        Dataset::new(Center::new("center", "Center"), groups)
    }

    fn ids(ids: &[&str]) -> Vec<GroupId> {
        ids.iter().map(|id| GroupId::new(*id)).collect()
    }

    #[test]
    fn test_metrics_at_reference_size() {
        let m = Metrics::new(800.0, 800.0);
        assert_eq!(m.scale_factor, 1.0);
        assert_eq!(m.center_radius, 60.0);
        assert_eq!(m.dial_radius, 100.0);
        assert_eq!(m.base_orbit_radius, 160.0);
        assert_eq!(m.orbit_spacing, 120.0);
        assert_eq!(m.max_available_radius, 350.0);
        assert_eq!((m.min_item_radius, m.max_item_radius), (8.0, 32.0));
    }

    #[test]
    fn test_metrics_scale_with_smaller_dimension() {
        let m = Metrics::new(1200.0, 400.0);
        assert_eq!(m.scale_factor, 0.5);
        assert_eq!(m.base_orbit_radius, 80.0);
        assert_eq!(m.max_available_radius, 175.0);
    }

    #[test]
    fn test_one_orbit_per_group() {
        let data = dataset(vec![group("a", &[1.0, 2.0]), group("b", &[3.0])]);
        let plan = plan(&data, &LayoutOptions::default());

        assert_eq!(plan.orbits.len(), 2);
        assert_eq!(plan.groups[0].radius, 160.0);
        assert_eq!(plan.groups[1].radius, 280.0);
        assert_eq!(plan.groups[1].orbit_index, 1);
        assert_eq!(plan.center, Point::new(400.0, 400.0));
    }

    #[test]
    fn test_every_item_gets_one_angle_and_point() {
        let data = dataset(vec![group("a", &[1.0, 2.0, 3.0]), group("b", &[])]);
        let plan = plan(&data, &LayoutOptions::default());

        for g in &plan.groups {
            assert_eq!(g.angles.len(), g.sorted_items.len());
            assert_eq!(g.points.len(), g.sorted_items.len());
            assert_eq!(g.item_radii.len(), g.sorted_items.len());
        }
        let empty = &plan.groups[1];
        assert!(empty.angles.is_empty());
        assert_eq!((empty.min_value, empty.max_value), (0.0, 0.0));
        assert_eq!(plan.orbits.len(), 2);
    }

    #[test]
    fn test_points_lie_on_orbit() {
        let data = dataset(vec![group("a", &[1.0, 2.0, 3.0, 4.0, 5.0])]);
        let plan = plan(&data, &LayoutOptions::sized(600.0, 900.0));
        let g = &plan.groups[0];
        for p in &g.points {
            assert!((p.distance(plan.center) - g.radius).abs() < EPS);
        }
    }

    #[test]
    fn test_radius_clamped_for_many_groups() {
        for count in 1..12 {
            for (w, h) in [(800.0, 800.0), (320.0, 480.0), (1920.0, 1080.0)] {
                let groups = (0..count)
                    .map(|i| group(&format!("g{i}"), &[1.0]))
                    .collect();
                let plan = plan(&dataset(groups), &LayoutOptions::sized(w, h));
                let m = plan.metrics;
                for g in &plan.groups {
                    assert!(g.radius <= m.max_available_radius + EPS);
                    assert!(g.radius >= m.base_orbit_radius - EPS);
                }
            }
        }
    }

    #[test]
    fn test_overflow_redistributes_by_rank() {
        let groups = (0..4).map(|i| group(&format!("g{i}"), &[1.0])).collect();
        let plan = plan(&dataset(groups), &LayoutOptions::default());
        let radii: Vec<f64> = plan.groups.iter().map(|g| g.radius).collect();

        // indices 0 and 1 fit, 2 (400) and 3 (520) overflow 350
        assert_eq!(radii[0], 160.0);
        assert_eq!(radii[1], 280.0);
        assert!((radii[2] - (160.0 + 190.0 / 4.0 * 3.0)).abs() < EPS);
        assert!((radii[3] - 350.0).abs() < EPS);
    }

    #[test]
    fn test_explicit_radius_override() {
        let mut a = group("a", &[1.0]);
        a.radius = Some(300.0);
        let mut b = group("b", &[1.0]);
        b.radius = Some(20.0);
        let mut c = group("c", &[1.0]);
        c.radius = Some(5000.0);

        let plan = plan(&dataset(vec![a, b, c]), &LayoutOptions::default());
        assert_eq!(plan.groups[0].radius, 300.0);
        assert_eq!(plan.groups[1].radius, 160.0);
        assert!((plan.groups[2].radius - 350.0).abs() < EPS);
    }

    #[test]
    fn test_group_by_confines_each_group_to_its_sector() {
        let data = dataset(vec![group("a", &[1.0, 2.0, 3.0]), group("b", &[4.0, 5.0])]);
        let options = LayoutOptions {
            group_by: true,
            ..LayoutOptions::default()
        };
        let plan = plan(&data, &options);
        let half = TAU / 2.0;

        assert!(plan.groups[0].angles.iter().all(|a| *a > 0.0 && *a < half));
        assert!(plan.groups[1].angles.iter().all(|a| *a > half && *a < TAU));
    }

    #[test]
    fn test_buckets_share_radius_and_distribution() {
        let data = dataset(vec![
            group("g1", &[1.0, 2.0]),
            group("g2", &[3.0, 4.0, 5.0]),
            group("g3", &[6.0]),
        ]);
        let options = LayoutOptions {
            orbit_assignment: Some(vec![ids(&["g1", "g2"]), ids(&["g3"])]),
            ..LayoutOptions::default()
        };
        let plan = plan(&data, &options);

        assert_eq!(plan.orbits.len(), 2);
        let (g1, g2, g3) = (&plan.groups[0], &plan.groups[1], &plan.groups[2]);
        assert_eq!(g1.radius, g2.radius);
        assert_ne!(g1.radius, g3.radius);
        assert_eq!(g2.item_start_index, 2);

        let shared: Vec<f64> = g1.angles.iter().chain(&g2.angles).copied().collect();
        assert_eq!(shared, distribute_angles(5, 0.0));
    }

    #[test]
    fn test_bucket_radii_clamped_and_spread_by_bucket_count() {
        for buckets in 1..10 {
            let data = dataset(
                (0..buckets * 2)
                    .map(|i| group(&format!("g{i}"), &[1.0, 2.0]))
                    .collect(),
            );
            let assignment: Vec<Vec<GroupId>> = (0..buckets)
                .map(|b| {
                    vec![
                        GroupId::new(format!("g{}", b * 2)),
                        GroupId::new(format!("g{}", b * 2 + 1)),
                    ]
                })
                .collect();

            for (w, h) in [(800.0, 800.0), (320.0, 480.0), (1920.0, 1080.0)] {
                let options = LayoutOptions {
                    orbit_assignment: Some(assignment.clone()),
                    ..LayoutOptions::sized(w, h)
                };
                let plan = plan(&data, &options);
                let m = plan.metrics;
                let within = |r: f64| {
                    r >= m.base_orbit_radius - EPS && r <= m.max_available_radius + EPS
                };

                assert_eq!(plan.orbits.len(), buckets);
                assert!(plan.orbits.iter().all(|o| within(o.radius)));
                assert!(plan.groups.iter().all(|g| within(g.radius)));
            }
        }

        // six buckets of two groups: overflowing rings step by a sixth of
        // the free band, not a twelfth
        let data = dataset((0..12).map(|i| group(&format!("g{i}"), &[1.0])).collect());
        let assignment = (0..6)
            .map(|b| {
                let (first, second) = (format!("g{}", b * 2), format!("g{}", b * 2 + 1));
                ids(&[first.as_str(), second.as_str()])
            })
            .collect();
        let options = LayoutOptions {
            orbit_assignment: Some(assignment),
            ..LayoutOptions::default()
        };
        let plan = plan(&data, &options);
        let radii: Vec<f64> = plan.orbits.iter().map(|o| o.radius).collect();
        let step = (350.0 - 160.0) / 6.0;

        assert_eq!(radii[..2], [160.0, 280.0]);
        assert!((radii[4] - (160.0 + step * 5.0)).abs() < EPS);
        assert!((radii[5] - 350.0).abs() < EPS);
        assert_eq!(plan.group(&GroupId::new("g9")).unwrap().radius, radii[4]);
    }

    #[test]
    fn test_unassigned_and_unknown_groups_are_dropped() {
        let data = dataset(vec![group("g1", &[1.0]), group("g2", &[2.0])]);
        let options = LayoutOptions {
            orbit_assignment: Some(vec![ids(&["missing"]), ids(&["g2", "nope"])]),
            ..LayoutOptions::default()
        };
        let plan = plan(&data, &options);

        assert_eq!(plan.groups.len(), 1);
        assert!(plan.group(&GroupId::new("g1")).is_none());
        // the empty first bucket still holds its position
        assert_eq!(plan.orbits[0].index, 1);
        assert_eq!(plan.groups[0].radius, 280.0);
    }

    #[test]
    fn test_group_placed_in_first_bucket_only() {
        let data = dataset(vec![group("g1", &[1.0])]);
        let options = LayoutOptions {
            orbit_assignment: Some(vec![ids(&["g1"]), ids(&["g1"])]),
            ..LayoutOptions::default()
        };
        let plan = plan(&data, &options);
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups[0].orbit_index, 0);
    }

    #[test]
    fn test_buckets_use_bucket_sectors() {
        let data = dataset(vec![
            group("g1", &[1.0]),
            group("g2", &[2.0]),
            group("g3", &[3.0]),
        ]);
        let options = LayoutOptions {
            group_by: true,
            orbit_assignment: Some(vec![ids(&["g1", "g2"]), ids(&["g3"])]),
            ..LayoutOptions::default()
        };
        let plan = plan(&data, &options);
        assert_eq!(plan.groups[0].angles.len(), 1);
        assert!((plan.groups[0].angles[0] - 0.1 * TAU / 2.0).abs() < EPS);
        assert!((plan.groups[1].angles[0] - 0.9 * TAU / 2.0).abs() < EPS);
        assert!((plan.groups[2].angles[0] - (TAU / 2.0 + 0.1 * TAU / 2.0)).abs() < EPS);
    }

    #[test]
    fn test_empty_assignment_uses_default_mode() {
        let data = dataset(vec![group("g1", &[1.0]), group("g2", &[2.0])]);
        let options = LayoutOptions {
            orbit_assignment: Some(vec![]),
            ..LayoutOptions::default()
        };
        assert_eq!(plan(&data, &options).groups.len(), 2);
    }

    #[test]
    fn test_degenerate_container_is_finite() {
        let data = dataset(vec![group("g1", &[1.0, 2.0])]);
        for (w, h) in [(0.0, 800.0), (f64::NAN, 10.0), (-5.0, -5.0)] {
            let plan = plan(&data, &LayoutOptions::sized(w, h));
            for g in &plan.groups {
                assert!(g.radius.is_finite() && g.radius >= 0.0);
                assert!(g.item_radii.iter().all(|r| r.is_finite()));
            }
        }
    }

    #[test]
    fn test_item_lookup() {
        let data = dataset(vec![group("g1", &[1.0, 9.0])]);
        let options = LayoutOptions {
            sort: SortMode::Value,
            ..LayoutOptions::default()
        };
        let plan = plan(&data, &options);
        let (item, group) = plan.item(&ItemKey::new("g1", "g1-0")).unwrap();
        assert_eq!(item.value, 1.0);
        assert_eq!(group.position_of(&ItemKey::new("g1", "g1-0")), Some(1));
        assert!(plan.item(&ItemKey::new("g2", "g1-0")).is_none());
    }
}
