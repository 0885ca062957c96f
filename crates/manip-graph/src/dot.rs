// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graphviz output.
use std::io::{self, Write};

use crate::component::{Component, ComponentKind};
use crate::edge::EdgeKind;
use crate::graph::ConstraintGraph;
use crate::ComponentId;

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

impl ConstraintGraph {
    /// Writes the graph in DOT: one cluster per subgraph, waypoint chains
    /// dashed, level-set edges bold.
    pub fn write_dot(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "digraph {} {{", quoted(self.name()))?;
        for &selector in self.selectors() {
            let Ok(component) = self.component(selector) else {
                continue;
            };
            writeln!(out, "  subgraph \"cluster_{selector}\" {{")?;
            writeln!(out, "    label={};", quoted(component.name()))?;
            for &node in component.as_selector().map(|s| s.nodes()).unwrap_or_default() {
                if let Ok(n) = self.component(node) {
                    writeln!(out, "    \"{node}\" [label={}];", quoted(n.name()))?;
                }
            }
            writeln!(out, "  }}")?;
        }
        for component in self.components() {
            match component.kind() {
                ComponentKind::Node(node) if node.waypoint_of().is_some() => {
                    writeln!(
                        out,
                        "  \"{}\" [label={}, shape=point];",
                        component.id(),
                        quoted(component.name())
                    )?;
                }
                ComponentKind::Edge(edge) if edge.segment_of().is_none() => {
                    self.write_edge(out, component, edge.source(), edge.kind())?;
                }
                _ => {}
            }
        }
        writeln!(out, "}}")
    }

    fn write_edge(
        &self,
        out: &mut dyn Write,
        component: &Component,
        source: ComponentId,
        kind: &EdgeKind,
    ) -> io::Result<()> {
        let label = |c: &Component| {
            let weight = c.as_edge().map_or(0, |e| e.weight());
            quoted(&format!("{} ({weight})", c.name()))
        };
        match kind {
            EdgeKind::Plain | EdgeKind::LevelSet(_) => {
                let target = component.as_edge().map_or(source, |e| e.target());
                let style = if matches!(kind, EdgeKind::LevelSet(_)) {
                    ", style=bold"
                } else {
                    ""
                };
                writeln!(out, "  \"{source}\" -> \"{target}\" [label={}{style}];", label(component))
            }
            EdgeKind::Waypoint(chain) => {
                let mut previous = source;
                for &segment in chain.segments() {
                    let Ok(c) = self.component(segment) else {
                        continue;
                    };
                    let target = c.as_edge().map_or(previous, |e| e.target());
                    writeln!(
                        out,
                        "  \"{previous}\" -> \"{target}\" [label={}, style=dashed];",
                        label(c)
                    )?;
                    previous = target;
                }
                Ok(())
            }
        }
    }
}
