use crate::core::{Board, Cell, Move, Side};

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// 合法手判定 (Max 側)
///
/// The cell must be empty, and in at least one direction the adjacent cell
/// must hold a Min disc whose run is closed by a Max disc before an empty cell
/// or the edge.
pub fn is_valid_move(board: &Board, row: usize, col: usize) -> bool {
    board.get(col, row) == Cell::Empty
        && DIRECTIONS
            .iter()
            .any(|&(dx, dy)| !flips_in_direction(board, col, row, dx, dy, Side::Max).is_empty())
}

/// 合法手生成 (row-major)
///
/// Min's legal moves are Max's legal moves on the sign-flipped board.
pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    let flipped;
    let view = match side {
        Side::Max => board,
        Side::Min => {
            flipped = flip_all(board);
            &flipped
        }
    };

    let mut moves = Vec::new();
    for y in 0..view.height {
        for x in 0..view.width {
            if is_valid_move(view, y, x) {
                moves.push(Move::new(x, y));
            }
        }
    }
    moves
}

pub fn has_moves(board: &Board, side: Side) -> bool {
    !legal_moves(board, side).is_empty()
}

/// Discs of the opponent that `side` would flip in one direction from
/// `(x, y)`. Empty when the run is not closed by a disc of `side`.
fn flips_in_direction(
    board: &Board,
    x: usize,
    y: usize,
    dx: i32,
    dy: i32,
    side: Side,
) -> Vec<(usize, usize)> {
    let own = side.disc();
    let theirs = side.opponent().disc();

    let mut candidates = Vec::new();
    let (mut cx, mut cy) = (x as i32 + dx, y as i32 + dy);
    while let Some(cell) = board.at(cx, cy) {
        if cell == theirs {
            candidates.push((cx as usize, cy as usize));
        } else if cell == own {
            return candidates;
        } else {
            break;
        }
        cx += dx;
        cy += dy;
    }
    Vec::new()
}

/// 移動適用
///
/// The full flip set is computed first and committed in one pass, so no
/// intermediate board is ever observable. The move must be legal for `side`.
pub fn apply_move(board: &Board, mv: &Move, side: Side) -> Board {
    debug_assert!(
        board.get(mv.x, mv.y) == Cell::Empty,
        "move {} targets an occupied cell",
        mv
    );

    let flips: Vec<(usize, usize)> = DIRECTIONS
        .iter()
        .flat_map(|&(dx, dy)| flips_in_direction(board, mv.x, mv.y, dx, dy, side))
        .collect();
    debug_assert!(!flips.is_empty(), "move {} is not legal for {:?}", mv, side);

    let mut next = board.clone();
    next.set(mv.x, mv.y, side.disc());
    for (x, y) in flips {
        next.set(x, y, side.disc());
    }
    next
}

/// Every disc changes owner; empty cells stay empty.
pub fn flip_all(board: &Board) -> Board {
    board.map_cells(Cell::negate)
}

/// (Max discs, Min discs)
pub fn disc_count(board: &Board) -> (i32, i32) {
    board
        .cells()
        .iter()
        .fold((0, 0), |(max, min), cell| match cell {
            Cell::Max => (max + 1, min),
            Cell::Min => (max, min + 1),
            Cell::Empty => (max, min),
        })
}

/// Neither side can move.
pub fn is_terminal(board: &Board) -> bool {
    !has_moves(board, Side::Max) && !has_moves(board, Side::Min)
}
