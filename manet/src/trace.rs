//! Animation trace, for external visualisation tools.
//!
//! The trace is a NetAnim-style XML document listing every node with its
//! initial position, followed by one size annotation per node.

use manet_core::{NodeId, position::Position};
use std::io::{self, Write};

const ANIMATION_VERSION: &str = "netanim-3.108";

/// Write the trace of the nodes at `positions`, every node drawn as a
/// `node_size` square.
pub fn write_animation<W>(mut writer: W, positions: &[(NodeId, Position)], node_size: f64) -> io::Result<()>
where
    W: Write,
{
    let (min, max) = bounds(positions);

    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(writer, r#"<anim ver="{ANIMATION_VERSION}" filetype="animation">"#)?;
    writeln!(
        writer,
        r#"<topology minX="{}" minY="{}" maxX="{}" maxY="{}">"#,
        min.x, min.y, max.x, max.y
    )?;
    for (node, position) in positions {
        writeln!(
            writer,
            r#"<node id="{node}" sysId="0" locX="{x}" locY="{y}"/>"#,
            x = position.x,
            y = position.y
        )?;
    }
    writeln!(writer, "</topology>")?;

    for (node, _) in positions {
        writeln!(
            writer,
            r#"<nu p="s" t="0" id="{node}" w="{node_size}" h="{node_size}"/>"#
        )?;
    }
    writeln!(writer, "</anim>")?;

    writer.flush()
}

fn bounds(positions: &[(NodeId, Position)]) -> (Position, Position) {
    if positions.is_empty() {
        return (Position::default(), Position::default());
    }

    positions.iter().fold(
        (
            Position::new(f64::INFINITY, f64::INFINITY),
            Position::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(min, max), (_, p)| {
            (
                Position::new(min.x.min(p.x), min.y.min(p.y)),
                Position::new(max.x.max(p.x), max.y.max(p.y)),
            )
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_size_annotation_per_node() {
        let positions = [
            (NodeId::new(0), Position::new(1.0, 2.0)),
            (NodeId::new(1), Position::new(300.5, 40.0)),
        ];
        let mut trace = Vec::new();
        write_animation(&mut trace, &positions, 15.0).unwrap();
        let trace = String::from_utf8(trace).unwrap();

        assert!(trace.contains(r#"<topology minX="1" minY="2" maxX="300.5" maxY="40">"#));
        assert!(trace.contains(r#"<node id="1" sysId="0" locX="300.5" locY="40"/>"#));
        assert_eq!(trace.matches("<nu ").count(), 2);
        assert!(trace.contains(r#"<nu p="s" t="0" id="0" w="15" h="15"/>"#));
        assert!(trace.trim_end().ends_with("</anim>"));
    }

    #[test]
    fn empty() {
        let mut trace = Vec::new();
        write_animation(&mut trace, &[], 15.0).unwrap();
        let trace = String::from_utf8(trace).unwrap();

        assert_eq!(trace.matches("<node ").count(), 0);
    }
}
