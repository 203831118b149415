use super::*;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::hash_map::Entry;

const MOVE_COST_BASE: f64 = 1000.0;

/// Cost of entering a board. Depends on the whole board, not on the move that
/// produced it, so path costs only bias the expansion order.
pub fn move_cost(board: &Board) -> f64 {
    MOVE_COST_BASE - score(board)
}

#[derive(Debug, Copy, Clone)]
struct OpenNode {
    cost: f64,
    length: u32,
    index: u32,
}

// `BinaryHeap` pops the greatest element, so the comparison is reversed:
// lowest cost first, then shortest path, then earliest generated.
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.length.cmp(&self.length))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

/// Records `cost` for `key` when the state is new or strictly cheaper than
/// before. Returns whether the state should be queued.
fn relax(closed: &mut StateMap<f64>, key: StateKey, cost: f64) -> bool {
    match closed.entry(key) {
        Entry::Occupied(mut entry) => {
            if cost < *entry.get() {
                entry.insert(cost);
                true
            } else {
                false
            }
        }
        Entry::Vacant(entry) => {
            entry.insert(cost);
            true
        }
    }
}

/// Search state shared across pops: the open list, the best cost seen per
/// state and the node store the queued entries point into.
struct Frontier {
    open: BinaryHeap<OpenNode>,
    closed: StateMap<f64>,
    nodes: NodeStorage,
    path: Vec<Move>,
    possible_moves: PossibleMoves,
}

impl Frontier {
    fn new(root: StateKey) -> Self {
        let mut closed = StateMap::default();
        closed.insert(root, 0.0);
        let mut open = BinaryHeap::new();
        open.push(OpenNode {
            cost: 0.0,
            length: 0,
            index: NodeStorage::ROOT,
        });
        Self {
            open,
            closed,
            nodes: NodeStorage::new(),
            path: Vec::new(),
            possible_moves: PossibleMoves::new(),
        }
    }
}

impl Solver {
    pub(super) fn best_first(&mut self) -> SolverResult<SolveStatus> {
        let mut frontier = Frontier::new(state_key(&self.board));

        while let Some(node) = frontier.open.pop() {
            if let Some(status) = self.expand(node, &mut frontier)? {
                return Ok(status);
            }
        }

        Ok(SolveStatus::Exhausted)
    }

    /// Rebuilds the node's board from the initial one, then either reports a
    /// win or queues every child that relaxes its state's cost. Every popped
    /// entry is expanded, since entries sharing a key may differ in suits.
    fn expand(
        &mut self,
        node: OpenNode,
        frontier: &mut Frontier,
    ) -> SolverResult<Option<SolveStatus>> {
        frontier.nodes.path_to(node.index, &mut frontier.path);
        self.replay(&frontier.path)?;

        if self.board.is_won() {
            debug!(
                cost = node.cost,
                length = node.length,
                states = self.states,
                "Found a winning line"
            );
            return Ok(Some(SolveStatus::Solved));
        }

        frontier.possible_moves.clear();
        candidates(&self.board, &self.config, &mut frontier.possible_moves);

        for &mov in frontier.possible_moves.iter() {
            if self.make_move(mov).is_err() {
                continue;
            }
            let cost = node.cost + move_cost(&self.board);
            if relax(&mut frontier.closed, state_key(&self.board), cost) {
                let index = frontier.nodes.push(node.index, mov);
                frontier.open.push(OpenNode {
                    cost,
                    length: node.length + 1,
                    index,
                });
                if self.note_state() {
                    return Ok(Some(SolveStatus::StateLimitReached));
                }
            }
            self.undo_move();
        }

        Ok(None)
    }
}
