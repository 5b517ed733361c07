use std::f64::consts::TAU;

/// Share of a sector left empty on each side in grouped mode.
pub const SECTOR_PADDING: f64 = 0.1;

/// Spreads `count` angles evenly around the full circle starting at
/// `start_angle`.
pub fn distribute_angles(count: usize, start_angle: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start_angle],
        _ => {
            let step = TAU / count as f64;
            (0..count).map(|i| start_angle + i as f64 * step).collect()
        }
    }
}

/// Confines `count` angles to sector `group_index` of `total_groups` equal
/// sectors, keeping `SECTOR_PADDING` of the sector width clear at both ends.
pub fn distribute_angles_grouped(
    count: usize,
    group_index: usize,
    total_groups: usize,
    start_angle: f64,
) -> Vec<f64> {
    let sector = TAU / total_groups.max(1) as f64;
    let sector_start = start_angle + group_index as f64 * sector;
    let padding = sector * SECTOR_PADDING;
    let available = sector - padding * 2.0;

    match count {
        0 => Vec::new(),
        1 => vec![sector_start + padding],
        _ => {
            let step = available / (count - 1) as f64;
            (0..count)
                .map(|i| sector_start + padding + i as f64 * step)
                .collect()
        }
    }
}
