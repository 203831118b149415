use super::*;

enum Search {
    Found,
    Exhausted,
    StateLimit,
}

impl Solver {
    /// Backtracking search that stops at the first win. Every state it enters
    /// is added to the visited set, which is never pruned.
    pub(super) fn depth_first(&mut self) -> SolveStatus {
        let mut visited = StateSet::default();
        visited.insert(state_key(&self.board));
        let mut depth_limited = false;

        match self.explore(0, &mut visited, &mut depth_limited) {
            Search::Found => SolveStatus::Solved,
            Search::StateLimit => SolveStatus::StateLimitReached,
            Search::Exhausted if depth_limited => SolveStatus::DepthLimitReached,
            Search::Exhausted => SolveStatus::Exhausted,
        }
    }

    fn explore(
        &mut self,
        depth: usize,
        visited: &mut StateSet,
        depth_limited: &mut bool,
    ) -> Search {
        if depth > self.config.max_depth {
            *depth_limited = true;
            return Search::Exhausted;
        }
        if self.board.is_won() {
            debug!(depth, states = self.states, "Found a winning line");
            return Search::Found;
        }

        let mut possible_moves = PossibleMoves::new();
        candidates(&self.board, &self.config, &mut possible_moves);

        for mov in possible_moves {
            if self.make_move(mov).is_err() {
                continue;
            }
            if visited.insert(state_key(&self.board)) {
                if self.note_state() {
                    return Search::StateLimit;
                }
                match self.explore(depth + 1, visited, depth_limited) {
                    Search::Exhausted => {}
                    found_or_limit => return found_or_limit,
                }
            }
            self.undo_move();
        }

        Search::Exhausted
    }
}
