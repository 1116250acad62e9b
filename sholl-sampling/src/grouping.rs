//! Grouping of foreground samples into intersections.
//!
//! Each connected cluster of foreground points crossing a circle or shell is
//! one intersection, represented by a single point.

use sholl_core::RasterPoint;

/// Union-Find (Disjoint Set Union) structure for connected components.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, x: usize, y: usize) {
        let px = self.find(x);
        let py = self.find(y);

        if px == py {
            return;
        }

        match self.rank[px].cmp(&self.rank[py]) {
            std::cmp::Ordering::Less => self.parent[px] = py,
            std::cmp::Ordering::Greater => self.parent[py] = px,
            std::cmp::Ordering::Equal => {
                self.parent[py] = px;
                self.rank[px] += 1;
            }
        }
    }
}

/// Neighbor offsets used by the staircase test, in the order
/// NW, N, NE, W, E, SW, S, SE (with y growing "north").
const NEIGHBORS: [(i32, i32); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Inside-corner templates: three neighbors that must be foreground and
/// three that must be background.
const STAIRCASES: [([usize; 3], [usize; 3]); 4] = [
    ([0, 1, 3], [4, 6, 7]),
    ([1, 2, 4], [3, 5, 6]),
    ([4, 6, 7], [0, 1, 3]),
    ([3, 5, 6], [1, 2, 4]),
];

/// True if an isolated pixel sits on a diagonal staircase of foreground
/// pixels, i.e. it is a rasterization artifact rather than a crossing.
pub fn is_spike<F>(p: RasterPoint, is_foreground: &F) -> bool
where
    F: Fn(i32, i32) -> bool,
{
    let fg: Vec<bool> = NEIGHBORS
        .iter()
        .map(|(dx, dy)| is_foreground(p.x + dx, p.y + dy))
        .collect();
    STAIRCASES
        .iter()
        .any(|(on, off)| on.iter().all(|&i| fg[i]) && off.iter().all(|&i| !fg[i]))
}

/// Groups 8-connected points and returns one representative per group.
///
/// All pairs are compared; the representative of a group is its member with
/// the lowest index. When `spike_filter` is given, single-point groups for
/// which [`is_spike`] holds are discarded.
pub fn group_planar<F>(points: &[RasterPoint], spike_filter: Option<&F>) -> Vec<RasterPoint>
where
    F: Fn(i32, i32) -> bool,
{
    let n = points.len();
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if points[i].chebyshev_xy(&points[j]) <= 1 {
                uf.union(i, j);
            }
        }
    }

    let mut sizes = vec![0usize; n];
    let mut first = vec![usize::MAX; n];
    for i in 0..n {
        let root = uf.find(i);
        sizes[root] += 1;
        first[root] = first[root].min(i);
    }

    (0..n)
        .filter(|&i| {
            let root = uf.find(i);
            if first[root] != i {
                return false;
            }
            match spike_filter {
                Some(fg) if sizes[root] == 1 => !is_spike(points[i], fg),
                _ => true,
            }
        })
        .map(|i| points[i])
        .collect()
}

/// Groups shell voxels by comparing each point only with its predecessor in
/// scan order: a point within Chebyshev distance 1 of the preceding point is
/// not a new representative.
///
/// Adjacent voxels that are not consecutive in scan order stay separate.
#[must_use]
pub fn group_sequential(points: &[RasterPoint]) -> Vec<RasterPoint> {
    points
        .iter()
        .enumerate()
        .filter(|&(k, p)| k == 0 || p.chebyshev(&points[k - 1]) > 1)
        .map(|(_, p)| *p)
        .collect()
}
