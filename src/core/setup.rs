use crate::core::{Board, Cell};

/// 初期配置: 中央の4石
///
/// Min holds the top-left and bottom-right centre cells, Max the other two,
/// so on 8x8 Max (black) opens with d3, c4, f5 or e6.
pub fn standard_setup(width: usize, height: usize) -> Board {
    let mut board = Board::new(width, height);
    if width < 2 || height < 2 {
        return board;
    }
    let (cx, cy) = (width / 2, height / 2);
    board.set(cx - 1, cy - 1, Cell::Min);
    board.set(cx, cy, Cell::Min);
    board.set(cx, cy - 1, Cell::Max);
    board.set(cx - 1, cy, Cell::Max);
    board
}

/// 文字列配列から盤面を作る
///
/// `X` is a Max disc, `O` a Min disc, anything else is empty. Whitespace is
/// ignored so rows may be written either as `"..XO"` or `". . X O"`.
/// Returns `None` for ragged or empty input.
pub fn setup_from_strings(rows: &[&str]) -> Option<Board> {
    let parsed: Vec<Vec<Cell>> = rows
        .iter()
        .map(|row| {
            row.chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| match c {
                    'X' | 'x' => Cell::Max,
                    'O' | 'o' => Cell::Min,
                    _ => Cell::Empty,
                })
                .collect()
        })
        .collect();

    let height = parsed.len();
    let width = parsed.first().map(Vec::len)?;
    if width == 0 || parsed.iter().any(|r| r.len() != width) {
        return None;
    }
    Board::from_cells(width, height, parsed.into_iter().flatten().collect())
}
