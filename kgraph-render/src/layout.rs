// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Layered layout with orthogonal edge routes
//!
//! 1. Ranks by longest path from the sources. Back edges found by a DFS in
//!    node order are ignored for ranking, so cycles are fine.
//! 2. Nodes keep first-appearance order inside a rank, then one barycenter
//!    pass pulls each node towards its parents.
//! 3. Ranks are centered against the widest one.
//! 4. Forward edges go out of the parent, turn in the gap below its rank and
//!    enter the child from above. Edges leaving the same parent share that
//!    first segment. Back edges run around the far side of the drawing and
//!    self-loops are drawn as a small rectangle beside the node.
//!
//! All coordinates are points. Internally the layout works on a `main` axis
//! (the direction ranks advance) and a `cross` axis, and maps them to x/y at
//! the end.

use crate::style::{self, RankDir, EDGE_FONT_SIZE, MARGIN};
use kgraph_core::KnowledgeGraph;
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

const LANE_GAP: f64 = 12.0;
const LANE_SPACING: f64 = 8.0;
const SELF_LOOP_REACH: f64 = 18.0;
const SELF_LOOP_SPREAD: f64 = 10.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("graph has no nodes")]
    Empty,

    #[error("layout produced a non-finite coordinate for {0}")]
    NonFinite(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    pub id: String,
    pub label: String,
    /// Created for an edge endpoint that was never declared
    pub implicit: bool,
    pub rank: usize,
    /// Center
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    pub fn left(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y - self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Forward,
    Back,
    SelfLoop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRoute {
    pub from: String,
    pub to: String,
    pub label: String,
    pub kind: RouteKind,
    /// Polyline from the source boundary to the target boundary
    pub points: Vec<(f64, f64)>,
    /// Center of the edge label
    pub label_at: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub direction: RankDir,
    pub nodes: Vec<NodeBox>,
    pub edges: Vec<EdgeRoute>,
    pub width: f64,
    pub height: f64,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeBox> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn rank_count(&self) -> usize {
        self.nodes.iter().map(|n| n.rank + 1).max().unwrap_or(0)
    }
}

/// Node data while the layout is in (main, cross) space.
struct Slot {
    id: String,
    label: String,
    implicit: bool,
    main_extent: f64,
    cross_extent: f64,
    rank: usize,
    main: f64,
    cross: f64,
}

struct EdgeRef {
    from: usize,
    to: usize,
    label: String,
}

pub fn compute(graph: &KnowledgeGraph, direction: RankDir) -> Result<Layout, LayoutError> {
    let mut slots = collect_slots(graph, direction);
    if slots.is_empty() {
        return Err(LayoutError::Empty);
    }

    let index: HashMap<&str, usize> = slots
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.as_str(), i))
        .collect();
    let edges: Vec<EdgeRef> = graph
        .edges
        .iter()
        .filter_map(|e| {
            Some(EdgeRef {
                from: *index.get(e.from.as_str())?,
                to: *index.get(e.to.as_str())?,
                label: e.label.clone(),
            })
        })
        .collect();

    let back = find_back_edges(slots.len(), &edges);
    let ranks = assign_ranks(slots.len(), &edges, &back);
    for (slot, rank) in slots.iter_mut().zip(&ranks) {
        slot.rank = *rank;
    }

    let layers = order_layers(&slots, &edges, &back);
    let layer_ends = place(&mut slots, &layers);

    let mut routes = Vec::with_capacity(edges.len());
    let cross_limit = slots
        .iter()
        .map(|s| s.cross + s.cross_extent / 2.0)
        .fold(0.0, f64::max);
    let mut lane = cross_limit + LANE_GAP;

    for (i, edge) in edges.iter().enumerate() {
        let from = &slots[edge.from];
        let to = &slots[edge.to];
        let route = if edge.from == edge.to {
            self_loop(from, &edge.label, direction)
        } else if back.contains(&i) || to.rank <= from.rank {
            let route = back_route(from, to, lane, &edge.label, direction);
            lane += LANE_SPACING;
            route
        } else {
            let channel = layer_ends[from.rank] + style::points(style::RANKSEP_IN) / 2.0;
            forward_route(from, to, channel, &edge.label, direction)
        };
        routes.push((edge, route));
    }

    finish(slots, routes, direction)
}

fn collect_slots(graph: &KnowledgeGraph, direction: RankDir) -> Vec<Slot> {
    let declared = graph
        .nodes
        .iter()
        .map(|n| (n.id.clone(), n.label.clone(), false));
    let implicit = graph
        .dangling_references()
        .into_iter()
        .map(|id| (id.to_string(), id.to_string(), true));

    declared
        .chain(implicit)
        .map(|(id, label, implicit)| {
            let width = style::node_width(&label);
            let height = style::node_height(&label);
            let (main_extent, cross_extent) = match direction {
                RankDir::TopBottom => (height, width),
                RankDir::LeftRight => (width, height),
            };
            Slot {
                id,
                label,
                implicit,
                main_extent,
                cross_extent,
                rank: 0,
                main: 0.0,
                cross: 0.0,
            }
        })
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    OnStack,
    Done,
}

/// Indices of edges that close a cycle, found by DFS in node order.
fn find_back_edges(node_count: usize, edges: &[EdgeRef]) -> HashSet<usize> {
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); node_count];
    for (i, edge) in edges.iter().enumerate() {
        if edge.from != edge.to {
            adjacency[edge.from].push((edge.to, i));
        }
    }

    let mut state = vec![Visit::Unvisited; node_count];
    let mut back = HashSet::new();
    for start in 0..node_count {
        if state[start] == Visit::Unvisited {
            visit(start, &adjacency, &mut state, &mut back);
        }
    }
    back
}

fn visit(
    start: usize,
    adjacency: &[Vec<(usize, usize)>],
    state: &mut [Visit],
    back: &mut HashSet<usize>,
) {
    // (node, index of the next outgoing edge to look at)
    let mut stack = vec![(start, 0usize)];
    state[start] = Visit::OnStack;
    while let Some(frame) = stack.last_mut() {
        let (node, cursor) = *frame;
        match adjacency[node].get(cursor) {
            Some(&(next, edge)) => {
                frame.1 += 1;
                match state[next] {
                    Visit::OnStack => {
                        back.insert(edge);
                    }
                    Visit::Unvisited => {
                        state[next] = Visit::OnStack;
                        stack.push((next, 0));
                    }
                    Visit::Done => {}
                }
            }
            None => {
                state[node] = Visit::Done;
                stack.pop();
            }
        }
    }
}

/// Longest path from the sources over the acyclic edges.
fn assign_ranks(node_count: usize, edges: &[EdgeRef], back: &HashSet<usize>) -> Vec<usize> {
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indegree = vec![0usize; node_count];
    for (i, edge) in edges.iter().enumerate() {
        if edge.from == edge.to || back.contains(&i) {
            continue;
        }
        successors[edge.from].push(edge.to);
        indegree[edge.to] += 1;
    }

    let mut ranks = vec![0usize; node_count];
    let mut queue: VecDeque<usize> = (0..node_count).filter(|&n| indegree[n] == 0).collect();
    while let Some(node) = queue.pop_front() {
        for &next in &successors[node] {
            ranks[next] = ranks[next].max(ranks[node] + 1);
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }
    ranks
}

/// Node indices per rank, after one barycenter pass.
fn order_layers(slots: &[Slot], edges: &[EdgeRef], back: &HashSet<usize>) -> Vec<Vec<usize>> {
    let rank_count = slots.iter().map(|s| s.rank + 1).max().unwrap_or(0);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (i, slot) in slots.iter().enumerate() {
        layers[slot.rank].push(i);
    }

    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    for (i, edge) in edges.iter().enumerate() {
        if !back.contains(&i) {
            incoming[edge.to].push(edge.from);
        }
    }

    for rank in 1..rank_count {
        let above: HashMap<usize, usize> = layers[rank - 1]
            .iter()
            .enumerate()
            .map(|(pos, &node)| (node, pos))
            .collect();

        let mut keyed: Vec<(f64, usize)> = layers[rank]
            .iter()
            .enumerate()
            .map(|(pos, &node)| {
                let parents: Vec<f64> = incoming[node]
                    .iter()
                    .filter_map(|from| above.get(from).map(|&p| p as f64))
                    .collect();
                let key = if parents.is_empty() {
                    pos as f64
                } else {
                    parents.iter().sum::<f64>() / parents.len() as f64
                };
                (key, node)
            })
            .collect();

        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        layers[rank] = keyed.into_iter().map(|(_, node)| node).collect();
    }

    layers
}

/// Assign centers; returns where each rank ends along the main axis.
fn place(slots: &mut [Slot], layers: &[Vec<usize>]) -> Vec<f64> {
    let nodesep = style::points(style::NODESEP_IN);
    let ranksep = style::points(style::RANKSEP_IN);

    let spans: Vec<f64> = layers
        .iter()
        .map(|layer| {
            let total: f64 = layer.iter().map(|&n| slots[n].cross_extent).sum();
            total + nodesep * layer.len().saturating_sub(1) as f64
        })
        .collect();
    let widest = spans.iter().copied().fold(0.0, f64::max);

    let mut layer_ends = Vec::with_capacity(layers.len());
    let mut main_cursor = MARGIN;
    for (layer, span) in layers.iter().zip(&spans) {
        let depth = layer
            .iter()
            .map(|&n| slots[n].main_extent)
            .fold(0.0, f64::max);
        let center = main_cursor + depth / 2.0;

        let mut cross_cursor = MARGIN + (widest - span) / 2.0;
        for &n in layer {
            let slot = &mut slots[n];
            slot.main = center;
            slot.cross = cross_cursor + slot.cross_extent / 2.0;
            cross_cursor += slot.cross_extent + nodesep;
        }

        main_cursor += depth;
        layer_ends.push(main_cursor);
        main_cursor += ranksep;
    }
    layer_ends
}

struct Route {
    kind: RouteKind,
    points: Vec<(f64, f64)>,
    label_at: (f64, f64),
}

fn label_half_width(label: &str) -> f64 {
    style::text_width(label, EDGE_FONT_SIZE) / 2.0
}

fn forward_route(from: &Slot, to: &Slot, channel: f64, label: &str, direction: RankDir) -> Route {
    let start = from.main + from.main_extent / 2.0;
    let end = to.main - to.main_extent / 2.0;

    if (from.cross - to.cross).abs() < 0.5 {
        // Straight: label beside the line
        let offset = match direction {
            RankDir::TopBottom => label_half_width(label) + 4.0,
            RankDir::LeftRight => EDGE_FONT_SIZE,
        };
        return Route {
            kind: RouteKind::Forward,
            points: vec![(start, from.cross), (end, from.cross)],
            label_at: ((start + end) / 2.0, from.cross + offset),
        };
    }

    let offset = match direction {
        RankDir::TopBottom => -EDGE_FONT_SIZE / 2.0,
        RankDir::LeftRight => label_half_width(label) + 3.0,
    };
    Route {
        kind: RouteKind::Forward,
        points: vec![
            (start, from.cross),
            (channel, from.cross),
            (channel, to.cross),
            (end, to.cross),
        ],
        label_at: (channel + offset, (from.cross + to.cross) / 2.0),
    }
}

fn back_route(from: &Slot, to: &Slot, lane: f64, label: &str, direction: RankDir) -> Route {
    let from_side = from.cross + from.cross_extent / 2.0;
    let to_side = to.cross + to.cross_extent / 2.0;
    let offset = match direction {
        RankDir::TopBottom => label_half_width(label) + 3.0,
        RankDir::LeftRight => EDGE_FONT_SIZE,
    };
    Route {
        kind: RouteKind::Back,
        points: vec![
            (from.main, from_side),
            (from.main, lane),
            (to.main, lane),
            (to.main, to_side),
        ],
        label_at: ((from.main + to.main) / 2.0, lane + offset),
    }
}

fn self_loop(slot: &Slot, label: &str, direction: RankDir) -> Route {
    let side = slot.cross + slot.cross_extent / 2.0;
    let reach = side + SELF_LOOP_REACH;
    let offset = match direction {
        RankDir::TopBottom => label_half_width(label) + 3.0,
        RankDir::LeftRight => EDGE_FONT_SIZE,
    };
    Route {
        kind: RouteKind::SelfLoop,
        points: vec![
            (slot.main - SELF_LOOP_SPREAD, side),
            (slot.main - SELF_LOOP_SPREAD, reach),
            (slot.main + SELF_LOOP_SPREAD, reach),
            (slot.main + SELF_LOOP_SPREAD, side),
        ],
        label_at: (slot.main, reach + offset),
    }
}

fn finish(
    slots: Vec<Slot>,
    routes: Vec<(&EdgeRef, Route)>,
    direction: RankDir,
) -> Result<Layout, LayoutError> {
    let to_xy = |main: f64, cross: f64| match direction {
        RankDir::TopBottom => (cross, main),
        RankDir::LeftRight => (main, cross),
    };

    let nodes: Vec<NodeBox> = slots
        .iter()
        .map(|slot| {
            let (x, y) = to_xy(slot.main, slot.cross);
            let (width, height) = match direction {
                RankDir::TopBottom => (slot.cross_extent, slot.main_extent),
                RankDir::LeftRight => (slot.main_extent, slot.cross_extent),
            };
            NodeBox {
                id: slot.id.clone(),
                label: slot.label.clone(),
                implicit: slot.implicit,
                rank: slot.rank,
                x,
                y,
                width,
                height,
            }
        })
        .collect();

    let edges: Vec<EdgeRoute> = routes
        .into_iter()
        .map(|(edge, route)| EdgeRoute {
            from: slots[edge.from].id.clone(),
            to: slots[edge.to].id.clone(),
            label: edge.label.clone(),
            kind: route.kind,
            points: route.points.iter().map(|&(m, c)| to_xy(m, c)).collect(),
            label_at: to_xy(route.label_at.0, route.label_at.1),
        })
        .collect();

    for node in &nodes {
        if ![node.x, node.y, node.width, node.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(LayoutError::NonFinite(node.id.clone()));
        }
    }

    let mut width: f64 = 0.0;
    let mut height: f64 = 0.0;
    for node in &nodes {
        width = width.max(node.x + node.width / 2.0);
        height = height.max(node.y + node.height / 2.0);
    }
    for edge in &edges {
        for &(x, y) in &edge.points {
            width = width.max(x);
            height = height.max(y);
        }
        let (lx, ly) = edge.label_at;
        width = width.max(lx + label_half_width(&edge.label));
        height = height.max(ly + EDGE_FONT_SIZE / 2.0);
    }
    if !width.is_finite() || !height.is_finite() {
        return Err(LayoutError::NonFinite("canvas".to_string()));
    }

    Ok(Layout {
        direction,
        nodes,
        edges,
        width: (width + MARGIN).ceil(),
        height: (height + MARGIN).ceil(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> KnowledgeGraph {
        KnowledgeGraph::new()
            .with_node("a", "A")
            .with_node("b", "B")
            .with_node("c", "C")
            .with_edge("a", "b", "to")
            .with_edge("b", "c", "to")
    }

    #[test]
    fn test_chain_is_vertical_and_centered() {
        let layout = compute(&chain(), RankDir::TopBottom).unwrap();
        let (a, b, c) = (
            layout.node("a").unwrap(),
            layout.node("b").unwrap(),
            layout.node("c").unwrap(),
        );
        assert!(a.y < b.y && b.y < c.y);
        assert_eq!(a.x, b.x);
        assert_eq!(b.x, c.x);
        assert_eq!(layout.rank_count(), 3);
        assert!(layout.edges.iter().all(|e| e.kind == RouteKind::Forward));
    }

    #[test]
    fn test_rank_gap_matches_ranksep() {
        let layout = compute(&chain(), RankDir::TopBottom).unwrap();
        let a = layout.node("a").unwrap();
        let b = layout.node("b").unwrap();
        let gap = b.top() - (a.top() + a.height);
        assert!((gap - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_fan_out_shares_trunk() {
        let graph = KnowledgeGraph::new()
            .with_node("root", "Root")
            .with_node("l", "Left")
            .with_node("r", "Right")
            .with_edge("root", "l", "has")
            .with_edge("root", "r", "has");
        let layout = compute(&graph, RankDir::TopBottom).unwrap();

        let l = layout.node("l").unwrap();
        let r = layout.node("r").unwrap();
        assert_eq!(l.y, r.y);
        assert!(l.x < r.x);

        let first = &layout.edges[0].points;
        let second = &layout.edges[1].points;
        assert_eq!(first[0], second[0]);
        assert_eq!(first[1], second[1]);
    }

    #[test]
    fn test_routes_are_orthogonal() {
        let graph = KnowledgeGraph::new()
            .with_node("root", "Root")
            .with_node("l", "Left")
            .with_node("r", "Right")
            .with_edge("root", "l", "x")
            .with_edge("root", "r", "y")
            .with_edge("r", "root", "back");
        for direction in [RankDir::TopBottom, RankDir::LeftRight] {
            let layout = compute(&graph, direction).unwrap();
            for edge in &layout.edges {
                for pair in edge.points.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    assert!(a.0 == b.0 || a.1 == b.1, "diagonal segment in {:?}", edge);
                }
            }
        }
    }

    #[test]
    fn test_cycle_does_not_break_ranking() {
        let graph = KnowledgeGraph::new()
            .with_node("a", "A")
            .with_node("b", "B")
            .with_node("c", "C")
            .with_edge("a", "b", "1")
            .with_edge("b", "c", "2")
            .with_edge("c", "a", "3");
        let layout = compute(&graph, RankDir::TopBottom).unwrap();

        assert_eq!(layout.node("a").unwrap().rank, 0);
        assert_eq!(layout.node("c").unwrap().rank, 2);
        let back = layout.edges.iter().find(|e| e.label == "3").unwrap();
        assert_eq!(back.kind, RouteKind::Back);
        let right_of_nodes = layout
            .nodes
            .iter()
            .map(|n| n.x + n.width / 2.0)
            .fold(0.0, f64::max);
        assert!(back.points[1].0 > right_of_nodes);
    }

    #[test]
    fn test_long_chain_with_cycle_lays_out() {
        const LEN: usize = 50_000;
        let mut graph = KnowledgeGraph::new();
        for i in 0..LEN {
            graph = graph.with_node(format!("n{}", i), format!("N{}", i));
        }
        for i in 1..LEN {
            graph = graph.with_edge(format!("n{}", i - 1), format!("n{}", i), "next");
        }
        graph = graph.with_edge(format!("n{}", LEN - 1), "n0", "wrap");

        let layout = compute(&graph, RankDir::TopBottom).unwrap();
        assert_eq!(layout.rank_count(), LEN);
        assert_eq!(layout.node(&format!("n{}", LEN - 1)).unwrap().rank, LEN - 1);
        let wrap = layout.edges.iter().find(|e| e.label == "wrap").unwrap();
        assert_eq!(wrap.kind, RouteKind::Back);
    }

    #[test]
    fn test_self_loop_stays_beside_node() {
        let graph = KnowledgeGraph::new()
            .with_node("a", "A")
            .with_edge("a", "a", "self");
        let layout = compute(&graph, RankDir::TopBottom).unwrap();
        let a = layout.node("a").unwrap();
        let edge = &layout.edges[0];
        assert_eq!(edge.kind, RouteKind::SelfLoop);
        assert_eq!(edge.points.len(), 4);
        assert!(edge.points.iter().all(|p| p.0 >= a.x + a.width / 2.0));
        assert!(layout.width >= edge.points[1].0);
    }

    #[test]
    fn test_dangling_endpoints_become_implicit_nodes() {
        let graph = KnowledgeGraph::new()
            .with_node("a", "A")
            .with_edge("a", "ghost", "haunts");
        let layout = compute(&graph, RankDir::TopBottom).unwrap();
        let ghost = layout.node("ghost").unwrap();
        assert!(ghost.implicit);
        assert_eq!(ghost.label, "ghost");
        assert_eq!(ghost.rank, 1);
    }

    #[test]
    fn test_left_right_advances_along_x() {
        let layout = compute(&chain(), RankDir::LeftRight).unwrap();
        let a = layout.node("a").unwrap();
        let b = layout.node("b").unwrap();
        assert!(a.x < b.x);
        assert_eq!(a.y, b.y);
    }

    #[test]
    fn test_barycenter_pulls_children_under_parents() {
        // d is declared first but hangs off the right-hand parent.
        let graph = KnowledgeGraph::new()
            .with_node("p1", "P1")
            .with_node("p2", "P2")
            .with_node("d", "D")
            .with_node("c", "C")
            .with_edge("p1", "c", "x")
            .with_edge("p2", "d", "y");
        let layout = compute(&graph, RankDir::TopBottom).unwrap();
        assert!(layout.node("c").unwrap().x < layout.node("d").unwrap().x);
    }

    #[test]
    fn test_empty_graph_is_an_error() {
        assert_eq!(
            compute(&KnowledgeGraph::new(), RankDir::TopBottom).unwrap_err(),
            LayoutError::Empty
        );
    }

    #[test]
    fn test_canvas_contains_every_node() {
        let layout = compute(&chain(), RankDir::TopBottom).unwrap();
        for node in &layout.nodes {
            assert!(node.left() >= 0.0 && node.top() >= 0.0);
            assert!(node.x + node.width / 2.0 <= layout.width);
            assert!(node.y + node.height / 2.0 <= layout.height);
        }
    }
}
