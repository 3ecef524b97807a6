//! Distance fields ("heat maps") over the tile grid
//!
//! Multi-pass relaxation rather than a priority queue: rounds run at
//! increasing integer cost thresholds, and each round lets cells valued
//! exactly k push k+1 into their larger-valued 4-neighbors. Rounds are
//! bounded by the grid diameter, which is cheap at arena sizes.

use glam::IVec2;

use crate::consts::UNREACHABLE;

/// Dense per-tile float field matching a map's dimensions
#[derive(Debug, Clone)]
pub struct TileHeatMap {
    dims: IVec2,
    values: Vec<f32>,
}

impl TileHeatMap {
    pub fn new(dims: IVec2, initial: f32) -> Self {
        Self {
            dims,
            values: vec![initial; (dims.x * dims.y) as usize],
        }
    }

    pub fn dims(&self) -> IVec2 {
        self.dims
    }

    pub fn cell_count(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn index(&self, coords: IVec2) -> usize {
        (coords.x + coords.y * self.dims.x) as usize
    }

    pub fn in_bounds(&self, coords: IVec2) -> bool {
        coords.x >= 0 && coords.y >= 0 && coords.x < self.dims.x && coords.y < self.dims.y
    }

    pub fn value(&self, coords: IVec2) -> f32 {
        self.values[self.index(coords)]
    }

    pub fn set_value(&mut self, coords: IVec2, value: f32) {
        let i = self.index(coords);
        self.values[i] = value;
    }

    pub fn fill(&mut self, value: f32) {
        self.values.fill(value);
    }

    /// Highest non-sentinel value, for normalizing debug overlays
    pub fn max_reachable_value(&self) -> f32 {
        self.values
            .iter()
            .copied()
            .filter(|v| *v < UNREACHABLE)
            .fold(0.0, f32::max)
    }
}

const NEIGHBOR_STEPS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
];

/// Populate `heat` with 4-connected hop counts from `seed` over `solid`,
/// a row-major solidity snapshot matching the field's dimensions. Solid and
/// unreached cells end at the `UNREACHABLE` sentinel. A dimension mismatch
/// is fatal.
pub fn populate_distance_field(heat: &mut TileHeatMap, seed: IVec2, solid: &[bool]) {
    if solid.len() != heat.cell_count() {
        log::error!(
            "Distance field dimension mismatch: field has {} cells, solid snapshot has {}",
            heat.cell_count(),
            solid.len()
        );
        panic!("distance field dimension mismatch");
    }

    heat.fill(UNREACHABLE);
    if !heat.in_bounds(seed) || solid[heat.index(seed)] {
        return;
    }
    heat.set_value(seed, 0.0);

    let dims = heat.dims;
    let mut threshold = 0.0f32;
    loop {
        let mut any_matched = false;
        for y in 0..dims.y {
            for x in 0..dims.x {
                let coords = IVec2::new(x, y);
                if heat.value(coords) != threshold {
                    continue;
                }
                any_matched = true;
                for step in NEIGHBOR_STEPS {
                    let neighbor = coords + step;
                    if !heat.in_bounds(neighbor) {
                        continue;
                    }
                    if solid[heat.index(neighbor)] {
                        continue;
                    }
                    if heat.value(neighbor) > threshold + 1.0 {
                        heat.set_value(neighbor, threshold + 1.0);
                    }
                }
            }
        }
        if !any_matched {
            break;
        }
        threshold += 1.0;
    }
}

/// Greedy descent from `start` to the field's seed. Each step moves to the
/// first 4-neighbor with a strictly smaller value; steps are appended then
/// the list is reversed, so the seed ends at index 0 and the next waypoint
/// is at the back. An unreachable start yields an empty path. A walk that
/// stalls or exceeds the cell count means a malformed field and is fatal.
pub fn path_to_seed(start: IVec2, heat: &TileHeatMap) -> Vec<IVec2> {
    if !heat.in_bounds(start) || heat.value(start) >= UNREACHABLE {
        return Vec::new();
    }

    let mut path = Vec::new();
    let mut current = start;
    let step_bound = heat.cell_count();
    while heat.value(current) > 0.0 {
        let here = heat.value(current);
        let mut stepped = false;
        for step in NEIGHBOR_STEPS {
            let neighbor = current + step;
            if heat.in_bounds(neighbor) && heat.value(neighbor) < here {
                current = neighbor;
                path.push(current);
                stepped = true;
                break;
            }
        }
        if !stepped {
            log::error!("Path walk stalled at {current:?} (field value {here})");
            panic!("distance field has no descending neighbor");
        }
        if path.len() > step_bound {
            log::error!("Path walk exceeded {step_bound} steps from {start:?}");
            panic!("path walk exceeded the cell-count bound");
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(dims: IVec2) -> Vec<bool> {
        vec![false; (dims.x * dims.y) as usize]
    }

    /// Brute-force BFS hop counts for cross-checking
    fn bfs_distances(dims: IVec2, solid: &[bool], seed: IVec2) -> Vec<f32> {
        let idx = |c: IVec2| (c.x + c.y * dims.x) as usize;
        let mut dist = vec![UNREACHABLE; solid.len()];
        let mut queue = std::collections::VecDeque::new();
        if !solid[idx(seed)] {
            dist[idx(seed)] = 0.0;
            queue.push_back(seed);
        }
        while let Some(c) = queue.pop_front() {
            for step in NEIGHBOR_STEPS {
                let n = c + step;
                if n.x < 0 || n.y < 0 || n.x >= dims.x || n.y >= dims.y {
                    continue;
                }
                if solid[idx(n)] || dist[idx(n)] < UNREACHABLE {
                    continue;
                }
                dist[idx(n)] = dist[idx(c)] + 1.0;
                queue.push_back(n);
            }
        }
        dist
    }

    #[test]
    fn test_open_grid_matches_bfs() {
        let dims = IVec2::new(7, 5);
        let solid = open_grid(dims);
        let seed = IVec2::new(2, 2);
        let mut heat = TileHeatMap::new(dims, UNREACHABLE);
        populate_distance_field(&mut heat, seed, &solid);
        let expected = bfs_distances(dims, &solid, seed);
        for y in 0..dims.y {
            for x in 0..dims.x {
                let c = IVec2::new(x, y);
                assert_eq!(heat.value(c), expected[(x + y * dims.x) as usize], "{c:?}");
            }
        }
    }

    #[test]
    fn test_wall_matches_bfs() {
        // Vertical wall with a gap forces a detour
        let dims = IVec2::new(9, 7);
        let mut solid = open_grid(dims);
        for y in 0..6 {
            solid[(4 + y * dims.x) as usize] = true;
        }
        let seed = IVec2::new(1, 3);
        let mut heat = TileHeatMap::new(dims, UNREACHABLE);
        populate_distance_field(&mut heat, seed, &solid);
        let expected = bfs_distances(dims, &solid, seed);
        for (i, v) in expected.iter().enumerate() {
            let c = IVec2::new(i as i32 % dims.x, i as i32 / dims.x);
            assert_eq!(heat.value(c), *v, "{c:?}");
        }
        // Solid cells stay at the sentinel
        assert_eq!(heat.value(IVec2::new(4, 0)), UNREACHABLE);
    }

    #[test]
    fn test_sealed_region_unreachable() {
        let dims = IVec2::new(6, 6);
        let mut solid = open_grid(dims);
        // Box off the top-right corner cell
        for c in [IVec2::new(4, 5), IVec2::new(5, 4)] {
            solid[(c.x + c.y * dims.x) as usize] = true;
        }
        let mut heat = TileHeatMap::new(dims, UNREACHABLE);
        populate_distance_field(&mut heat, IVec2::new(0, 0), &solid);
        assert_eq!(heat.value(IVec2::new(5, 5)), UNREACHABLE);
        assert!(heat.value(IVec2::new(3, 3)) < UNREACHABLE);
    }

    #[test]
    fn test_path_strictly_decreases_to_zero() {
        let dims = IVec2::new(9, 7);
        let mut solid = open_grid(dims);
        for y in 0..6 {
            solid[(4 + y * dims.x) as usize] = true;
        }
        let seed = IVec2::new(7, 2);
        let mut heat = TileHeatMap::new(dims, UNREACHABLE);
        populate_distance_field(&mut heat, seed, &solid);

        let start = IVec2::new(1, 1);
        let path = path_to_seed(start, &heat);
        assert!(!path.is_empty());
        // Nearest-to-seed first after reversal
        assert_eq!(path[0], seed);
        assert_eq!(heat.value(path[0]), 0.0);
        // Walking the list back-to-front, values strictly decrease
        let mut prev = heat.value(start);
        for coords in path.iter().rev() {
            let v = heat.value(*coords);
            assert!(v < prev, "{coords:?}: {v} !< {prev}");
            prev = v;
        }
        assert_eq!(path.len() as f32, heat.value(start));
    }

    #[test]
    fn test_unreachable_start_yields_empty_path() {
        let dims = IVec2::new(5, 5);
        let mut solid = open_grid(dims);
        // Wall the start cell's whole column
        for y in 0..5 {
            solid[(2 + y * dims.x) as usize] = true;
        }
        let mut heat = TileHeatMap::new(dims, UNREACHABLE);
        populate_distance_field(&mut heat, IVec2::new(0, 0), &solid);
        assert!(path_to_seed(IVec2::new(4, 0), &heat).is_empty());
        // Start on a solid cell is also empty, not fatal
        assert!(path_to_seed(IVec2::new(2, 2), &heat).is_empty());
    }

    #[test]
    fn test_seed_on_solid_leaves_field_unreachable() {
        let dims = IVec2::new(4, 4);
        let mut solid = open_grid(dims);
        solid[0] = true;
        let mut heat = TileHeatMap::new(dims, UNREACHABLE);
        populate_distance_field(&mut heat, IVec2::new(0, 0), &solid);
        assert_eq!(heat.value(IVec2::new(3, 3)), UNREACHABLE);
    }

    #[test]
    #[should_panic(expected = "dimension mismatch")]
    fn test_dimension_mismatch_is_fatal() {
        let mut heat = TileHeatMap::new(IVec2::new(4, 4), UNREACHABLE);
        populate_distance_field(&mut heat, IVec2::ZERO, &[false; 3]);
    }
}
