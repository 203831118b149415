use super::*;

/// One generated state, stored as the move that reached it plus a link to its
/// parent. The root carries no move.
#[derive(Debug, Copy, Clone)]
pub struct MoveNode {
    pub parent: u32,
    pub mov: Option<Move>,
}

#[derive(Debug, Clone)]
pub struct NodeStorage {
    nodes: Vec<MoveNode>,
}

impl Default for NodeStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStorage {
    pub const ROOT: u32 = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![MoveNode {
                parent: Self::ROOT,
                mov: None,
            }],
        }
    }

    pub fn push(&mut self, parent: u32, mov: Move) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(MoveNode {
            parent,
            mov: Some(mov),
        });
        index
    }

    /// Writes the primary moves leading from the root to `index` into
    /// `destination`, first move first.
    pub fn path_to(&self, index: u32, destination: &mut Vec<Move>) {
        destination.clear();
        let mut current = self.nodes[index as usize];
        while let Some(mov) = current.mov {
            destination.push(mov);
            current = self.nodes[current.parent as usize];
        }
        destination.reverse();
    }
}
