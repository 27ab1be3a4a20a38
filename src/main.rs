use anyhow::Context;
use othello_search::core::standard_setup;
use othello_search::{Engine, EvalParams};

const USAGE: &str = "usage: othello-search [params.json] [workers] [size]";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let params = match args.next() {
        Some(flag) if flag == "-h" || flag == "--help" => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(path) => EvalParams::load_from(&path)?,
        None => EvalParams::get().clone(),
    };
    let workers: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("bad worker count {:?}", n))?,
        None => 0,
    };
    let size: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("bad board size {:?}", n))?,
        None => 8,
    };

    // 初期盤面から一手探索
    let board = standard_setup(size, size);
    println!("{}", board);

    let engine = Engine::new(params, workers);
    let outcome = engine.best_move(&board)?;

    match outcome.best {
        Some(mv) => println!("best move: {}", mv),
        None => println!("no legal move, pass"),
    }
    for scored in &outcome.ranked {
        println!("  {}", scored);
    }
    println!(
        "{} mode, {} boards evaluated, {} pruned, depth {}, {:?}{}",
        outcome.mode,
        outcome.stats.boards_evaluated,
        outcome.stats.nodes_pruned,
        outcome.stats.max_depth_reached,
        outcome.elapsed,
        if outcome.stats.entire_space_covered {
            ", whole tree searched"
        } else {
            ""
        }
    );
    Ok(())
}
