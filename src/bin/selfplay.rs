use rand::Rng;

use special_chess::board::GameConfig;
use special_chess::game::ApplyOutcome;
use special_chess::piece::PieceType;
use special_chess::session::GameSession;

const MAX_HALF_MOVES: u32 = 300;

/// Plays random legal moves (with both optional pieces enabled) until the
/// game ends or the move cap is hit. A cheap end-to-end exercise of the
/// rules engine.
fn main() {
    let config = GameConfig {
        timer: false,
        triceratops: true,
        assassin: true,
    };
    let mut session = GameSession::new(config);
    let mut rng = rand::thread_rng();
    let mut half_moves = 0;

    while session.state.outcome.is_none() && half_moves < MAX_HALF_MOVES {
        if session.state.placement_pending(session.state.turn) {
            let squares = session.state.placement_squares();
            let (row, col) = squares[rng.gen_range(0..squares.len())];
            session
                .place_assassin(row, col)
                .expect("placement square came from the engine");
            half_moves += 1;
            continue;
        }

        let mut options = Vec::new();
        for row in 0..8 {
            for col in 0..8 {
                match session.state.board.squares[row][col] {
                    Some(piece) if piece.color == session.state.turn => {}
                    _ => continue,
                }
                for mv in session.state.legal_moves(row, col) {
                    options.push(((row, col), mv));
                }
            }
        }

        let (from, mv) = options[rng.gen_range(0..options.len())];
        match session.apply_move_confirmed(from, &mv) {
            Ok(ApplyOutcome::AwaitingPromotion) => {
                session
                    .complete_promotion(PieceType::Queen)
                    .expect("queen promotion is always allowed");
            }
            Ok(_) => {}
            Err(err) => {
                eprintln!("engine rejected its own legal move: {err}");
                break;
            }
        }
        half_moves += 1;
    }

    let result = session
        .state
        .outcome
        .map(|outcome| outcome.to_string())
        .unwrap_or_else(|| String::from("ongoing"));
    eprintln!("Game over after {half_moves} half-moves: {result}");
    println!("{}", session.state.move_list.join(" "));
}
