use std::io::{Result, Write};

use evidence_visualize::{Drawer, Visualize, to_hex};

use crate::{Node, NodeIndex, SparseMerkleTree};

impl Visualize for Node {
    fn visualize<W: Write>(&self, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        match self {
            Node::Empty => drawer.write(b"empty")?,
            Node::Leaf { key, value, hash } => drawer.write(
                format!(
                    "leaf {} key: {} value: {}",
                    to_hex(hash),
                    hex::encode(key),
                    hex::encode(value)
                )
                .as_bytes(),
            )?,
            Node::Middle { hash, .. } => drawer.write(format!("middle {}", to_hex(hash)).as_bytes())?,
        }
        Ok(drawer)
    }
}

impl SparseMerkleTree {
    fn draw_subtree<W: Write>(&self, index: NodeIndex, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        let node = self.get_node(index);
        drawer.write(format!("[{index}] ").as_bytes())?;
        drawer = node.visualize(drawer)?;
        if let Node::Middle { left, right, .. } = node {
            drawer.down();
            for (side, child) in [("0", *left), ("1", *right)] {
                drawer.write(format!("\n{side}: ").as_bytes())?;
                drawer = self.draw_subtree(child, drawer)?;
            }
            drawer.up();
        }
        Ok(drawer)
    }
}

impl Visualize for SparseMerkleTree {
    fn visualize<W: Write>(&self, mut drawer: Drawer<W>) -> Result<Drawer<W>> {
        drawer.write(
            format!(
                "smt hasher: {} max_depth: {} nodes: {}\n",
                self.hasher().name(),
                self.max_depth(),
                self.nodes_count()
            )
            .as_bytes(),
        )?;
        self.draw_subtree(self.root_index(), drawer)
    }
}
