//! 2D node placement for a graph view.
//!
//! Two algorithms: a spiral that rings nodes around the center with
//! collision avoidance, and a hierarchical banding that splits the center
//! node's importers and dependencies above and below it. Positions persist
//! through an injected [`PositionStore`] and are reused on the next run when
//! enough node ids still match.
use crate::graph::view::GraphView;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Minimum share of matching node ids required to reuse persisted
/// positions instead of recomputing the layout.
pub const REUSE_THRESHOLD: f64 = 0.70;
/// Probe budget per node before the deterministic fallback placement.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 600;
/// Radius added per spiral ring.
pub const RING_STEP: f64 = 120.0;
/// Angular slots on ring 1; ring `r` offers `r *` this many.
pub const SLOTS_PER_RING: usize = 8;

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A placed node. `x`/`y` is the top-left corner of the box; the box is
/// already padded and clamped, so collision tests compare boxes directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    fn overlaps(&self, other: &NodeBox) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

pub type PositionMap = BTreeMap<String, Point>;

/// Abstract persistence for node positions, keyed by an identity string
/// derived from the analyzed root and entry file. The engine itself never
/// touches a store; the host loads and saves around `layout`.
pub trait PositionStore {
    fn get(&self, key: &str) -> Option<PositionMap>;
    fn set(&mut self, key: &str, positions: &PositionMap);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Spiral,
    Hierarchical,
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub margin: f64,
    pub padding: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            canvas_width: 1600.0,
            canvas_height: 1200.0,
            margin: 40.0,
            padding: 12.0,
            min_width: 60.0,
            min_height: 34.0,
        }
    }
}

/// Fallback text measurement for hosts without a real text metric.
#[must_use]
pub fn approx_text_size(label: &str) -> (f64, f64) {
    (8.0 * label.chars().count() as f64, 16.0)
}

#[derive(Debug, Default)]
pub struct LayoutEngine {
    opts: LayoutOptions,
}

impl LayoutEngine {
    #[must_use]
    pub fn new(opts: LayoutOptions) -> Self {
        Self { opts }
    }

    /// Computes a position for every node in `view`.
    ///
    /// Sizes come first: each label is measured, padded, and clamped to the
    /// minimum box before any placement decision. With `Algorithm::Spiral`
    /// and a persisted map whose id overlap reaches [`REUSE_THRESHOLD`],
    /// matching nodes keep their stored coordinates and only new nodes are
    /// placed. `Algorithm::Hierarchical` is the explicit re-layout trigger
    /// and always computes from scratch.
    ///
    /// Identical input and no persisted map yield identical output.
    #[must_use]
    pub fn layout(
        &self,
        view: &GraphView,
        algorithm: Algorithm,
        measure: &dyn Fn(&str) -> (f64, f64),
        persisted: Option<&PositionMap>,
    ) -> BTreeMap<String, NodeBox> {
        if view.nodes.is_empty() {
            return BTreeMap::new();
        }
        let sizes = self.size_nodes(view, measure);
        let Some(center_id) = center_node(view) else {
            return BTreeMap::new();
        };

        if algorithm == Algorithm::Spiral {
            if let Some(saved) = persisted {
                if reuse_ratio(&sizes, saved) >= REUSE_THRESHOLD {
                    return self.restore_and_fill(&sizes, saved, &center_id);
                }
            }
            return self.spiral(&sizes, &center_id);
        }
        self.hierarchical(view, &sizes, &center_id)
    }

    fn size_nodes(
        &self,
        view: &GraphView,
        measure: &dyn Fn(&str) -> (f64, f64),
    ) -> BTreeMap<String, (f64, f64)> {
        view.nodes
            .iter()
            .map(|node| {
                let (tw, th) = measure(&node.label);
                let w = (tw + 2.0 * self.opts.padding).max(self.opts.min_width);
                let h = (th + 2.0 * self.opts.padding).max(self.opts.min_height);
                (node.id.clone(), (w, h))
            })
            .collect()
    }

    /// Copies stored coordinates for every surviving id and runs spiral
    /// placement for the rest, colliding against the restored boxes.
    fn restore_and_fill(
        &self,
        sizes: &BTreeMap<String, (f64, f64)>,
        saved: &PositionMap,
        center_id: &str,
    ) -> BTreeMap<String, NodeBox> {
        let mut placer = Placer::new(&self.opts);
        let mut missing: Vec<&String> = Vec::new();
        for (id, &(w, h)) in sizes {
            match saved.get(id) {
                Some(p) => placer.put(id, NodeBox { x: p.x, y: p.y, width: w, height: h }),
                None => missing.push(id),
            }
        }
        for id in missing {
            let (w, h) = sizes[id];
            if id == center_id {
                placer.put_center(id, w, h);
            } else {
                placer.place_spiral(id, w, h);
            }
        }
        placer.placed
    }

    fn spiral(
        &self,
        sizes: &BTreeMap<String, (f64, f64)>,
        center_id: &str,
    ) -> BTreeMap<String, NodeBox> {
        let mut placer = Placer::new(&self.opts);
        let (cw, ch) = sizes[center_id];
        placer.put_center(center_id, cw, ch);
        for (id, &(w, h)) in sizes {
            if id == center_id {
                continue;
            }
            placer.place_spiral(id, w, h);
        }
        placer.placed
    }

    fn hierarchical(
        &self,
        view: &GraphView,
        sizes: &BTreeMap<String, (f64, f64)>,
        center_id: &str,
    ) -> BTreeMap<String, NodeBox> {
        let mut placed = BTreeMap::new();
        let cx = self.opts.canvas_width / 2.0;
        let cy = self.opts.canvas_height / 2.0;
        let (cw, ch) = sizes[center_id];
        placed.insert(
            center_id.to_string(),
            NodeBox { x: cx - cw / 2.0, y: cy - ch / 2.0, width: cw, height: ch },
        );

        // Partition around the center: files importing it go above, files
        // it imports go below, externals further below, the rest aside.
        let mut dependents: BTreeSet<&str> = BTreeSet::new();
        let mut dependencies: BTreeSet<&str> = BTreeSet::new();
        let mut externals: BTreeSet<&str> = BTreeSet::new();
        for node in &view.nodes {
            if node.is_external {
                externals.insert(&node.id);
            }
        }
        for edge in &view.edges {
            if edge.from == center_id && !externals.contains(edge.to.as_str()) {
                dependents.insert(&edge.to);
            }
            if edge.to == center_id && !externals.contains(edge.from.as_str()) {
                dependencies.insert(&edge.from);
            }
        }
        let related: BTreeSet<&str> = dependents.union(&dependencies).copied().collect();
        let unrelated: Vec<&str> = view
            .nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| {
                *id != center_id && !related.contains(id) && !externals.contains(id)
            })
            .collect();

        let gap = self.opts.padding;
        let top = cy - ch / 2.0 - gap;
        self.bands(&mut placed, sizes, &ordered(&dependents), cx, top, -1.0);
        let bottom = cy + ch / 2.0 + gap;
        let after_deps =
            self.bands(&mut placed, sizes, &ordered(&dependencies), cx, bottom, 1.0);
        self.bands(&mut placed, sizes, &ordered(&externals), cx, after_deps + gap, 1.0);
        self.side_grid(&mut placed, sizes, &unrelated);
        placed
    }

    /// Lays `ids` out in row-wrapped horizontal bands, each row centered on
    /// the vertical axis through `cx`. `dir` is -1 to stack rows upward,
    /// +1 downward. Returns the outer edge of the last row.
    fn bands(
        &self,
        placed: &mut BTreeMap<String, NodeBox>,
        sizes: &BTreeMap<String, (f64, f64)>,
        ids: &[&str],
        cx: f64,
        start_y: f64,
        dir: f64,
    ) -> f64 {
        let gap = self.opts.padding;
        let max_row_width = self.opts.canvas_width - 2.0 * self.opts.margin;
        let mut edge = start_y;
        let mut row: Vec<&str> = Vec::new();
        let mut row_width = 0.0;

        let mut flush = |row: &mut Vec<&str>, row_width: &mut f64, edge: &mut f64| {
            if row.is_empty() {
                return;
            }
            let row_height =
                row.iter().map(|id| sizes[*id].1).fold(0.0_f64, f64::max);
            let y = if dir < 0.0 { *edge - row_height } else { *edge };
            let mut x = cx - *row_width / 2.0;
            for id in row.iter() {
                let (w, h) = sizes[*id];
                placed.insert((*id).to_string(), NodeBox { x, y, width: w, height: h });
                x += w + gap;
            }
            *edge += dir * (row_height + gap);
            row.clear();
            *row_width = 0.0;
        };

        for id in ids {
            let (w, _) = sizes[*id];
            let next = if row.is_empty() { w } else { row_width + gap + w };
            if !row.is_empty() && next > max_row_width {
                flush(&mut row, &mut row_width, &mut edge);
                row_width = w;
            } else {
                row_width = next;
            }
            row.push(id);
        }
        flush(&mut row, &mut row_width, &mut edge);
        edge
    }

    /// Column grid along the right canvas edge for nodes with no relation
    /// to the center.
    fn side_grid(
        &self,
        placed: &mut BTreeMap<String, NodeBox>,
        sizes: &BTreeMap<String, (f64, f64)>,
        ids: &[&str],
    ) {
        let gap = self.opts.padding;
        let bottom = self.opts.canvas_height - self.opts.margin;
        let mut column_right = self.opts.canvas_width - self.opts.margin;
        let mut column_width = 0.0_f64;
        let mut y = self.opts.margin;
        for id in ids {
            let (w, h) = sizes[*id];
            if y + h > bottom && y > self.opts.margin {
                column_right -= column_width + gap;
                column_width = 0.0;
                y = self.opts.margin;
            }
            placed.insert((*id).to_string(), NodeBox { x: column_right - w, y, width: w, height: h });
            column_width = column_width.max(w);
            y += h + gap;
        }
    }
}

/// Share of ids present in both the current set and the persisted map,
/// against the larger of the two.
fn reuse_ratio(sizes: &BTreeMap<String, (f64, f64)>, saved: &PositionMap) -> f64 {
    let denom = sizes.len().max(saved.len());
    if denom == 0 {
        return 0.0;
    }
    let shared = sizes.keys().filter(|id| saved.contains_key(*id)).count();
    shared as f64 / denom as f64
}

/// The node everything arranges around: the entry when one is flagged,
/// otherwise the best-connected node (ties break on the smaller id).
fn center_node(view: &GraphView) -> Option<String> {
    if let Some(entry) = view.nodes.iter().find(|n| n.is_entry) {
        return Some(entry.id.clone());
    }
    let mut degree: BTreeMap<&str, usize> = BTreeMap::new();
    for node in &view.nodes {
        degree.insert(&node.id, 0);
    }
    for edge in &view.edges {
        if let Some(d) = degree.get_mut(edge.from.as_str()) {
            *d += 1;
        }
        if let Some(d) = degree.get_mut(edge.to.as_str()) {
            *d += 1;
        }
    }
    degree
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(id, _)| (*id).to_string())
}

fn ordered<'a>(ids: &BTreeSet<&'a str>) -> Vec<&'a str> {
    ids.iter().copied().collect()
}

/// Shared spiral cursor: each node continues probing outward from where the
/// previous one stopped, so placements never chase one another and the
/// sequence is reproducible.
struct Placer<'a> {
    opts: &'a LayoutOptions,
    placed: BTreeMap<String, NodeBox>,
    ring: usize,
    slot: usize,
    fallbacks: usize,
}

impl<'a> Placer<'a> {
    fn new(opts: &'a LayoutOptions) -> Self {
        Self { opts, placed: BTreeMap::new(), ring: 1, slot: 0, fallbacks: 0 }
    }

    fn center(&self) -> (f64, f64) {
        (self.opts.canvas_width / 2.0, self.opts.canvas_height / 2.0)
    }

    fn put(&mut self, id: &str, b: NodeBox) {
        self.placed.insert(id.to_string(), b);
    }

    fn put_center(&mut self, id: &str, w: f64, h: f64) {
        let (cx, cy) = self.center();
        self.put(id, NodeBox { x: cx - w / 2.0, y: cy - h / 2.0, width: w, height: h });
    }

    fn place_spiral(&mut self, id: &str, w: f64, h: f64) {
        let (cx, cy) = self.center();
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let slots = self.ring * SLOTS_PER_RING;
            if self.slot >= slots {
                self.ring += 1;
                self.slot = 0;
                continue;
            }
            let angle = std::f64::consts::TAU * self.slot as f64 / slots as f64;
            let radius = self.ring as f64 * RING_STEP;
            self.slot += 1;
            let candidate = NodeBox {
                x: cx + radius * angle.cos() - w / 2.0,
                y: cy + radius * angle.sin() - h / 2.0,
                width: w,
                height: h,
            };
            if self.fits(&candidate) {
                self.put(id, candidate);
                return;
            }
        }
        // Bounded effort exhausted: deterministic placement on a radius
        // that only grows. Overlap is accepted here.
        self.fallbacks += 1;
        warn!("layout fallback for node {id} after {MAX_PLACEMENT_ATTEMPTS} attempts");
        let radius = self.ring as f64 * RING_STEP + self.fallbacks as f64 * (RING_STEP / 2.0);
        let angle = self.fallbacks as f64 * GOLDEN_ANGLE;
        let b = NodeBox {
            x: cx + radius * angle.cos() - w / 2.0,
            y: cy + radius * angle.sin() - h / 2.0,
            width: w,
            height: h,
        };
        self.put(id, b);
    }

    fn fits(&self, b: &NodeBox) -> bool {
        let m = self.opts.margin;
        if b.x < m
            || b.y < m
            || b.x + b.width > self.opts.canvas_width - m
            || b.y + b.height > self.opts.canvas_height - m
        {
            return false;
        }
        !self.placed.values().any(|other| b.overlaps(other))
    }
}
