//! Grouping of wound triangles into filled components.

use super::arrangement::{Arrangement, edge_key};
use super::faces::WoundTriangle;
use super::{ContourId, SplitPoint};
use glam::DVec2;
use std::collections::{BTreeMap, VecDeque};
use std::ops::Range;
use tessera_core::alloc::{HashMap, HashSet};

/// A directed edge on the border of a filled component.
///
/// The component lies to the left of `start → end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryEdge {
    /// Start point index.
    pub start: u32,
    /// End point index.
    pub end: u32,
    /// Winding number across the edge, `None` outside the bounding box.
    pub neighbor_winding: Option<i32>,
    /// First contour that produced the edge.
    pub contour: Option<ContourId>,
}

/// Triangles sharing a winding number.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledComponent {
    winding: i32,
    indices: Vec<u32>,
    component_ranges: Vec<Range<usize>>,
    boundary_edges: Vec<BoundaryEdge>,
    boundary_contours: Vec<Vec<usize>>,
    split_indices: Vec<u32>,
    split_component_ranges: Vec<Range<usize>>,
}

impl FilledComponent {
    /// Winding number shared by every triangle.
    pub fn winding(&self) -> i32 {
        self.winding
    }

    /// Counter-clockwise triangle indices into the point table.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Ranges of `indices` covering each edge-connected piece.
    pub fn component_ranges(&self) -> &[Range<usize>] {
        &self.component_ranges
    }

    /// Directed edges separating the component from everything else.
    pub fn boundary_edges(&self) -> &[BoundaryEdge] {
        &self.boundary_edges
    }

    /// Closed loops of boundary edges, as indices into [`Self::boundary_edges`].
    pub fn boundary_contours(&self) -> &[Vec<usize>] {
        &self.boundary_contours
    }

    /// Triangle indices after splitting triangles whose corners all lie on
    /// the boundary.
    pub fn split_indices(&self) -> &[u32] {
        &self.split_indices
    }

    /// Ranges of `split_indices` per edge-connected piece, in the same order
    /// as [`Self::component_ranges`].
    pub fn split_component_ranges(&self) -> &[Range<usize>] {
        &self.split_component_ranges
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Group {
    /// Winding zero, connected to the bounding box.
    Unbounded,
    Winding(i32),
}

/// Components grouped by winding number.
pub(super) struct Classified {
    pub components: BTreeMap<i32, FilledComponent>,
    pub winding_zero_bounded: Option<FilledComponent>,
    pub winding_zero_unbounded: FilledComponent,
    pub split_points: Vec<SplitPoint>,
}

/// Creates split points, one per bisected edge.
struct Splitter<'a> {
    positions: &'a [DVec2],
    base: u32,
    points: Vec<SplitPoint>,
    midpoints: HashMap<(u32, u32), u32>,
}

impl Splitter<'_> {
    fn push(&mut self, position: DVec2, sources: &[(u32, f32)]) -> u32 {
        let id = self.base + self.points.len() as u32;
        self.points.push(SplitPoint::new(position.as_vec2(), sources));
        id
    }

    fn midpoint(&mut self, a: u32, b: u32) -> u32 {
        if let Some(&id) = self.midpoints.get(&edge_key(a, b)) {
            return id;
        }
        let position = (self.positions[a as usize] + self.positions[b as usize]) * 0.5;
        let id = self.push(position, &[(a, 0.5), (b, 0.5)]);
        self.midpoints.insert(edge_key(a, b), id);
        id
    }

    fn centroid(&mut self, [a, b, c]: [u32; 3]) -> u32 {
        let p = |i: u32| self.positions[i as usize];
        let position = (p(a) + p(b) + p(c)) / 3.0;
        let third = 1.0 / 3.0;
        self.push(position, &[(a, third), (b, third), (c, third)])
    }
}

struct Context<'a> {
    arr: &'a Arrangement,
    triangles: &'a [WoundTriangle],
    groups: &'a [Group],
    /// Directed edge to the triangle on its left.
    by_edge: &'a HashMap<(u32, u32), usize>,
}

impl Context<'_> {
    fn neighbor(&self, a: u32, b: u32) -> Option<usize> {
        self.by_edge.get(&(b, a)).copied()
    }

    fn build(&self, group: Group, members: &[usize], splitter: &mut Splitter<'_>) -> FilledComponent {
        let winding = match group {
            Group::Unbounded => 0,
            Group::Winding(w) => w,
        };

        // Edge-connected pieces, emitted contiguously.
        let member_set: HashSet<usize> = members.iter().copied().collect();
        let mut visited: HashSet<usize> = HashSet::new();
        let mut pieces: Vec<Vec<usize>> = Vec::new();
        for &seed in members {
            if !visited.insert(seed) {
                continue;
            }
            let mut piece = vec![seed];
            let mut queue = VecDeque::from([seed]);
            while let Some(t) = queue.pop_front() {
                for [a, b] in edges_of(self.triangles[t].vertices) {
                    if let Some(n) = self.neighbor(a, b) {
                        if member_set.contains(&n) && visited.insert(n) {
                            piece.push(n);
                            queue.push_back(n);
                        }
                    }
                }
            }
            pieces.push(piece);
        }

        let mut indices = Vec::with_capacity(members.len() * 3);
        let mut component_ranges = Vec::with_capacity(pieces.len());
        let mut boundary_edges = Vec::new();
        for piece in &pieces {
            let start = indices.len();
            for &t in piece {
                let vertices = self.triangles[t].vertices;
                indices.extend_from_slice(&vertices);
                for [a, b] in edges_of(vertices) {
                    let neighbor = self.neighbor(a, b);
                    if neighbor.is_some_and(|n| self.groups[n] == group) {
                        continue;
                    }
                    boundary_edges.push(BoundaryEdge {
                        start: a,
                        end: b,
                        neighbor_winding: neighbor.map(|n| self.triangles[n].winding),
                        contour: self
                            .arr
                            .edges
                            .get(&edge_key(a, b))
                            .and_then(|e| e.contours.first().copied()),
                    });
                }
            }
            component_ranges.push(start..indices.len());
        }

        let boundary_contours = chain_contours(&boundary_edges);

        let on_boundary: HashSet<u32> = boundary_edges.iter().flat_map(|e| [e.start, e.end]).collect();
        let mut split_indices = Vec::with_capacity(indices.len());
        let mut split_component_ranges = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            let start = split_indices.len();
            for &t in piece {
                let vertices = self.triangles[t].vertices;
                self.split_triangle(vertices, group, &on_boundary, splitter, &mut split_indices);
            }
            split_component_ranges.push(start..split_indices.len());
        }

        FilledComponent {
            winding,
            indices,
            component_ranges,
            boundary_edges,
            boundary_contours,
            split_indices,
            split_component_ranges,
        }
    }

    fn split_triangle(
        &self,
        vertices: [u32; 3],
        group: Group,
        on_boundary: &HashSet<u32>,
        splitter: &mut Splitter<'_>,
        out: &mut Vec<u32>,
    ) {
        let edges = edges_of(vertices);
        let mids: [Option<u32>; 3] = edges.map(|[a, b]| {
            let interior = self.neighbor(a, b).is_some_and(|n| self.groups[n] == group);
            (interior && on_boundary.contains(&a) && on_boundary.contains(&b))
                .then(|| splitter.midpoint(a, b))
        });

        if vertices.iter().all(|v| on_boundary.contains(v)) {
            let c = splitter.centroid(vertices);
            for ([a, b], mid) in edges.into_iter().zip(mids) {
                match mid {
                    Some(m) => out.extend_from_slice(&[a, m, c, m, b, c]),
                    None => out.extend_from_slice(&[a, b, c]),
                }
            }
            return;
        }

        match mids.iter().enumerate().find_map(|(k, m)| m.map(|m| (k, m))) {
            Some((k, m)) => {
                let [a, b] = edges[k];
                let o = vertices[(k + 2) % 3];
                out.extend_from_slice(&[a, m, o, m, b, o]);
            }
            None => out.extend_from_slice(&vertices),
        }
    }
}

fn edges_of([a, b, c]: [u32; 3]) -> [[u32; 2]; 3] {
    [[a, b], [b, c], [c, a]]
}

/// Chain directed boundary edges into closed loops.
fn chain_contours(edges: &[BoundaryEdge]) -> Vec<Vec<usize>> {
    let mut outgoing: HashMap<u32, Vec<usize>> = HashMap::new();
    for (i, edge) in edges.iter().enumerate() {
        outgoing.entry(edge.start).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut contours = Vec::new();
    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let origin = edges[first].start;
        let mut contour = vec![first];
        let mut at = edges[first].end;
        while at != origin {
            let next = outgoing
                .get(&at)
                .and_then(|list| list.iter().copied().find(|&e| !used[e]));
            let Some(next) = next else {
                tracing::trace!("Open boundary chain at point {}", at);
                break;
            };
            used[next] = true;
            contour.push(next);
            at = edges[next].end;
        }
        contours.push(contour);
    }
    contours
}

/// Group `triangles` by winding number and build each component.
pub(super) fn classify(arr: &Arrangement, triangles: &[WoundTriangle], split_base: u32) -> Classified {
    let mut by_edge: HashMap<(u32, u32), usize> = HashMap::with_capacity(triangles.len() * 3);
    for (t, triangle) in triangles.iter().enumerate() {
        for [a, b] in edges_of(triangle.vertices) {
            by_edge.insert((a, b), t);
        }
    }

    // Winding-zero triangles reachable from the bounding box are unbounded.
    let mut groups: Vec<Group> = triangles.iter().map(|t| Group::Winding(t.winding)).collect();
    let mut queue: VecDeque<usize> = triangles
        .iter()
        .enumerate()
        .filter(|(_, t)| {
            t.winding == 0
                && edges_of(t.vertices).iter().any(|&[a, b]| {
                    arr.edges
                        .get(&edge_key(a, b))
                        .is_some_and(|e| e.touches_bounding_box())
                })
        })
        .map(|(i, _)| i)
        .collect();
    for &t in &queue {
        groups[t] = Group::Unbounded;
    }
    while let Some(t) = queue.pop_front() {
        for [a, b] in edges_of(triangles[t].vertices) {
            if let Some(&n) = by_edge.get(&(b, a)) {
                if groups[n] == Group::Winding(0) {
                    groups[n] = Group::Unbounded;
                    queue.push_back(n);
                }
            }
        }
    }

    let mut members: BTreeMap<Group, Vec<usize>> = BTreeMap::new();
    for (t, &group) in groups.iter().enumerate() {
        members.entry(group).or_default().push(t);
    }

    let context = Context {
        arr,
        triangles,
        groups: &groups,
        by_edge: &by_edge,
    };
    let mut splitter = Splitter {
        positions: &arr.positions,
        base: split_base,
        points: Vec::new(),
        midpoints: HashMap::new(),
    };

    let mut components = BTreeMap::new();
    let mut winding_zero_bounded = None;
    let mut winding_zero_unbounded = None;
    for (group, list) in &members {
        let component = context.build(*group, list, &mut splitter);
        match group {
            Group::Unbounded => winding_zero_unbounded = Some(component),
            Group::Winding(0) => winding_zero_bounded = Some(component),
            Group::Winding(w) => {
                components.insert(*w, component);
            }
        }
    }

    Classified {
        components,
        winding_zero_bounded,
        winding_zero_unbounded: winding_zero_unbounded
            .unwrap_or_else(|| context.build(Group::Unbounded, &[], &mut splitter)),
        split_points: splitter.points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(start: u32, end: u32) -> BoundaryEdge {
        BoundaryEdge {
            start,
            end,
            neighbor_winding: None,
            contour: None,
        }
    }

    #[test]
    fn test_chain_contours_closes_loops() {
        let edges = [edge(0, 1), edge(3, 4), edge(1, 2), edge(4, 5), edge(2, 0), edge(5, 3)];
        let contours = chain_contours(&edges);
        assert_eq!(contours, vec![vec![0, 2, 4], vec![1, 3, 5]]);
    }

    #[test]
    fn test_edges_of_is_cyclic() {
        assert_eq!(edges_of([4, 5, 6]), [[4, 5], [5, 6], [6, 4]]);
    }
}
