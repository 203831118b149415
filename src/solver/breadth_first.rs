use super::*;

use std::collections::VecDeque;

impl Solver {
    /// FIFO search. The win test happens when a state is dequeued, so the
    /// returned line has the fewest primary moves.
    pub(super) fn breadth_first(&mut self) -> SolverResult<SolveStatus> {
        let mut queue = VecDeque::new();
        let mut visited = StateSet::default();
        let mut nodes = NodeStorage::new();
        let mut path = Vec::new();
        let mut possible_moves = PossibleMoves::new();

        visited.insert(state_key(&self.board));
        queue.push_back(NodeStorage::ROOT);

        while let Some(index) = queue.pop_front() {
            nodes.path_to(index, &mut path);
            self.replay(&path)?;

            if self.board.is_won() {
                debug!(length = path.len(), states = self.states, "Found a winning line");
                return Ok(SolveStatus::Solved);
            }

            possible_moves.clear();
            candidates(&self.board, &self.config, &mut possible_moves);

            for &mov in possible_moves.iter() {
                if self.make_move(mov).is_err() {
                    continue;
                }
                if visited.insert(state_key(&self.board)) {
                    queue.push_back(nodes.push(index, mov));
                    if self.note_state() {
                        return Ok(SolveStatus::StateLimitReached);
                    }
                }
                self.undo_move();
            }
        }

        Ok(SolveStatus::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::HEARTS;

    const FULL_FOUNDATIONS: &str = r#"Foundation1: A♦2♦3♦4♦5♦6♦7♦8♦9♦T♦J♦Q♦K♦
Foundation2: A♠2♠3♠4♠5♠6♠7♠8♠9♠T♠J♠Q♠K♠
Foundation3: A♣2♣3♣4♣5♣6♣7♣8♣9♣T♣J♣Q♣K♣"#;

    #[test]
    fn test_shortest_line() {
        let board = Board::parse(&format!(
            "{FULL_FOUNDATIONS}\nSlot1: A♥2♥\nSlot2: K♥Q♥J♥T♥9♥8♥7♥6♥5♥4♥3♥"
        ))
        .unwrap();
        let mut solver = Solver::new(&board, &SolverConfig::default()).unwrap();
        let result = solver.solve(Strategy::BreadthFirst).unwrap();
        assert!(result.is_solved());
        assert_eq!(result.strategy.name(), "BFS");
        assert_eq!(result.moves.len(), 14);
        assert_eq!(
            result.moves[1],
            Move::new(
                PileId::Slot(0),
                Card::new_with_rank_suit(0, HEARTS),
                PileId::Foundation(3)
            )
        );
        assert!(solver.board().is_won());
    }

    #[test]
    fn test_state_limit() {
        let board = Board::parse(&format!(
            "{FULL_FOUNDATIONS}\nSlot1: A♥2♥\nSlot2: K♥Q♥J♥T♥9♥8♥7♥6♥5♥4♥3♥"
        ))
        .unwrap();
        let config = SolverConfig {
            max_states: Some(2),
            ..Default::default()
        };
        let mut solver = Solver::new(&board, &config).unwrap();
        let initial = solver.board().clone();
        let result = solver.solve(Strategy::BreadthFirst).unwrap();
        assert_eq!(result.status, SolveStatus::StateLimitReached);
        assert!(result.moves.is_empty());
        assert_eq!(solver.board(), &initial);
    }
}
