//! Alluvial (sankey) layout: nodes in columns by depth, links stacked along node edges.
//!
//! Nodes are justified (sinks go to the last column) and stacked in input order; no
//! relaxation pass moves them afterwards.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use carbonviz_engine::color::from_hex;
use carbonviz_engine::Attrs;

use crate::chart::{Datum, Layout, Mark};
use crate::error::ChartError;

const NODE_COLOR: u32 = 0x69b3a2;
const LINK_COLOR: u32 = 0x888888;
const LINK_OPACITY: f32 = 0.7;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SankeyNodeSpec {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SankeyLinkSpec {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SankeyInput {
    pub nodes: Vec<SankeyNodeSpec>,
    pub links: Vec<SankeyLinkSpec>,
}

impl SankeyInput {
    pub fn from_json(text: &str) -> Result<Self, ChartError> {
        serde_json::from_str(text).map_err(|e| ChartError::load("flows", e.to_string()))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SankeyOptions {
    pub node_width: f32,
    pub node_padding: f32,
    /// `[[x0, y0], [x1, y1]]`
    pub extent: [[f32; 2]; 2],
}

impl Default for SankeyOptions {
    fn default() -> Self {
        Self {
            node_width: 20.0,
            node_padding: 10.0,
            extent: [[0.0, 0.0], [600.0, 400.0]],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SankeyNode {
    pub name: String,
    /// Longest path from any source.
    pub depth: usize,
    pub column: usize,
    /// max(inflow, outflow)
    pub value: f64,
    pub x0: f32,
    pub x1: f32,
    pub y0: f32,
    pub y1: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub width: f32,
    /// Center of the link where it leaves its source.
    pub y0: f32,
    /// Center of the link where it reaches its target.
    pub y1: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SankeyLayout {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

pub fn sankey_layout(input: &SankeyInput, opts: &SankeyOptions) -> Result<SankeyLayout, ChartError> {
    let n = input.nodes.len();
    if n == 0 {
        return Err(ChartError::empty("sankey: no nodes"));
    }
    for (i, link) in input.links.iter().enumerate() {
        if link.source >= n || link.target >= n {
            return Err(ChartError::config(format!(
                "sankey link {i} references a missing node ({} -> {})",
                link.source, link.target
            )));
        }
        if !(link.value.is_finite() && link.value >= 0.0) {
            return Err(ChartError::config(format!("sankey link {i} has invalid value {}", link.value)));
        }
    }

    let mut outgoing = vec![Vec::new(); n];
    let mut incoming = vec![Vec::new(); n];
    for (i, link) in input.links.iter().enumerate() {
        outgoing[link.source].push(i);
        incoming[link.target].push(i);
    }

    let value: Vec<f64> = (0..n)
        .map(|i| {
            let sum = |ls: &[usize]| ls.iter().map(|l| input.links[*l].value).sum::<f64>();
            sum(&outgoing[i]).max(sum(&incoming[i]))
        })
        .collect();

    // Depth: breadth-first relaxation; a cycle keeps the frontier alive past n steps.
    let mut depth = vec![0usize; n];
    let mut current: Vec<usize> = (0..n).collect();
    let mut step = 0;
    while !current.is_empty() {
        let mut next = vec![false; n];
        for &node in &current {
            depth[node] = step;
            for &l in &outgoing[node] {
                next[input.links[l].target] = true;
            }
        }
        step += 1;
        if step > n {
            return Err(ChartError::config("sankey: circular link"));
        }
        current = (0..n).filter(|i| next[*i]).collect();
    }

    let cols = depth.iter().copied().max().unwrap_or(0) + 1;
    let column: Vec<usize> = (0..n)
        .map(|i| if outgoing[i].is_empty() { cols - 1 } else { depth[i] })
        .collect();
    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); cols];
    for i in 0..n {
        columns[column[i]].push(i);
    }

    let [[x0, y0], [x1, y1]] = opts.extent;
    let dx = opts.node_width;
    let kx = if cols > 1 {
        (x1 - x0 - dx) / (cols - 1) as f32
    } else {
        0.0
    };

    let longest = columns.iter().map(|c| c.len()).max().unwrap_or(1);
    let py = if longest > 1 {
        opts.node_padding.min((y1 - y0) / (longest - 1) as f32)
    } else {
        opts.node_padding
    };
    let ky = columns
        .iter()
        .filter_map(|c| {
            let total: f64 = c.iter().map(|i| value[*i]).sum();
            (total > 0.0).then(|| (y1 - y0 - (c.len() as f32 - 1.0) * py) as f64 / total)
        })
        .fold(f64::INFINITY, f64::min);
    let ky = if ky.is_finite() { ky.max(0.0) } else { 0.0 };

    let mut nodes: Vec<SankeyNode> = (0..n)
        .map(|i| SankeyNode {
            name: input.nodes[i].name.clone(),
            depth: depth[i],
            column: column[i],
            value: value[i],
            x0: x0 + column[i] as f32 * kx,
            x1: x0 + column[i] as f32 * kx + dx,
            y0: 0.0,
            y1: 0.0,
        })
        .collect();

    for col in &columns {
        let mut y = y0;
        for &i in col {
            nodes[i].y0 = y;
            nodes[i].y1 = y + (value[i] * ky) as f32;
            y = nodes[i].y1 + py;
        }
        // Spread leftover space evenly around the column's nodes.
        let gap = (y1 - y + py) / (col.len() + 1) as f32;
        for (k, &i) in col.iter().enumerate() {
            let shift = gap * (k + 1) as f32;
            nodes[i].y0 += shift;
            nodes[i].y1 += shift;
        }
    }

    let mut links: Vec<SankeyLink> = input
        .links
        .iter()
        .map(|l| SankeyLink {
            source: l.source,
            target: l.target,
            value: l.value,
            width: (l.value * ky) as f32,
            y0: 0.0,
            y1: 0.0,
        })
        .collect();

    for i in 0..n {
        let mut out = outgoing[i].clone();
        out.sort_by(|a, b| nodes[links[*a].target].y0.total_cmp(&nodes[links[*b].target].y0).then(a.cmp(b)));
        let mut y = nodes[i].y0;
        for l in out {
            links[l].y0 = y + links[l].width / 2.0;
            y += links[l].width;
        }

        let mut inc = incoming[i].clone();
        inc.sort_by(|a, b| nodes[links[*a].source].y0.total_cmp(&nodes[links[*b].source].y0).then(a.cmp(b)));
        let mut y = nodes[i].y0;
        for l in inc {
            links[l].y1 = y + links[l].width / 2.0;
            y += links[l].width;
        }
    }

    Ok(SankeyLayout { nodes, links })
}

impl SankeyLayout {
    /// Horizontal cubic link path from the source's right edge to the target's left edge.
    pub fn link_path(&self, link: &SankeyLink) -> String {
        let sx = self.nodes[link.source].x1;
        let tx = self.nodes[link.target].x0;
        let mx = (sx + tx) / 2.0;
        let mut d = String::new();
        let _ = write!(d, "M{sx},{}C{mx},{} {mx},{} {tx},{}", link.y0, link.y0, link.y1, link.y1);
        d
    }

    /// Nodes as rectangles, links as banded connectors.
    pub fn to_layout(&self) -> Layout {
        let mut layout = Layout::default();
        for node in &self.nodes {
            let attrs = Attrs::rect(node.x0, node.y0, node.x1 - node.x0, node.y1 - node.y0)
                .with_color(from_hex(NODE_COLOR));
            layout.insert(
                attrs,
                Datum::rect(format!("node/{}", node.name), node.value, node.name.clone(), node.value.to_string()),
            );
        }
        for (i, link) in self.links.iter().enumerate() {
            let source = &self.nodes[link.source];
            let target = &self.nodes[link.target];
            let mut key = format!("link/{}->{}", source.name, target.name);
            if layout.data.contains_key(&key) {
                key.push_str(&format!("#{i}"));
            }
            let top = link.y0.min(link.y1) - link.width / 2.0;
            let bottom = link.y0.max(link.y1) + link.width / 2.0;
            let attrs = Attrs::rect(source.x1, top, target.x0 - source.x1, bottom - top)
                .with_color(from_hex(LINK_COLOR))
                .with_opacity(LINK_OPACITY);
            let datum = Datum::rect(
                key,
                link.value,
                format!("{} → {}", source.name, target.name),
                link.value.to_string(),
            )
            .with_mark(Mark::Line(vec![[source.x1, link.y0], [target.x0, link.y1]]));
            layout.insert(attrs, datum);
        }
        layout
    }
}
