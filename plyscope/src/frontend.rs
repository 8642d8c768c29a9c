//! Line-oriented terminal front end over a [`SessionHandle`].

use analysis::AnalysisLine;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use crate::session::{SessionEvent, SessionHandle, SessionSnapshot};

const HELP: &str = "\
commands:
  n, next            step forward one ply
  p, prev            step back one ply
  start, end         jump to the initial position or the last move
  jump <ply>         show the position after <ply> half-moves
  move <uci|san>     play a move (discards moves after the cursor)
  load <moves...>    replace the game with a move list
  reset [fen]        clear the game, optionally from a new start position
  lines <n>          number of engine lines to show
  analysis on|off    switch engine analysis
  show               print the current position again
  quit               exit";

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Next,
    Prev,
    Start,
    End,
    /// Number of half-moves played at the target position.
    Jump(usize),
    Move(String),
    Load(Vec<String>),
    Reset(Option<String>),
    Lines(u8),
    Analysis(bool),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Unknown command: {0} (try 'help')")]
    Unknown(String),
    #[error("Missing argument for '{0}'")]
    MissingArgument(&'static str),
    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_input(line: &str) -> Result<Option<Input>, InputError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let input = match command {
        "n" | "next" => Input::Next,
        "p" | "prev" => Input::Prev,
        "start" => Input::Start,
        "end" => Input::End,
        "jump" => {
            let value = rest.first().ok_or(InputError::MissingArgument("jump"))?;
            let ply = value.parse().map_err(|_| InputError::InvalidArgument {
                command: "jump",
                value: value.to_string(),
            })?;
            Input::Jump(ply)
        }
        "move" => {
            let value = rest.first().ok_or(InputError::MissingArgument("move"))?;
            Input::Move(value.to_string())
        }
        "load" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("load"));
            }
            Input::Load(rest.iter().map(|s| s.to_string()).collect())
        }
        "reset" => Input::Reset((!rest.is_empty()).then(|| rest.join(" "))),
        "lines" => {
            let value = rest.first().ok_or(InputError::MissingArgument("lines"))?;
            match value.parse::<u8>() {
                Ok(n) if n >= 1 => Input::Lines(n),
                _ => {
                    return Err(InputError::InvalidArgument {
                        command: "lines",
                        value: value.to_string(),
                    })
                }
            }
        }
        "analysis" => match rest.first().copied() {
            Some("on") => Input::Analysis(true),
            Some("off") => Input::Analysis(false),
            Some(other) => {
                return Err(InputError::InvalidArgument {
                    command: "analysis",
                    value: other.to_string(),
                })
            }
            None => return Err(InputError::MissingArgument("analysis")),
        },
        "show" => Input::Show,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Some(input))
}

/// Output mode for everything the front end prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run(handle: &SessionHandle, mode: OutputMode) -> anyhow::Result<()> {
    let (snapshot, mut events) = handle.subscribe().await?;
    print_snapshot(&snapshot, mode);
    if mode == OutputMode::Text {
        println!("Type 'help' for commands.");
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_input(&line) {
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(input)) => dispatch(handle, input, mode).await,
                    Ok(None) => {}
                    Err(e) => print_error(&e.to_string(), mode),
                }
            }

            event = events.recv() => {
                match event {
                    Ok(event) => print_event(&event, mode),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::debug!("Front end lagged {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    Ok(())
}

async fn dispatch(handle: &SessionHandle, input: Input, mode: OutputMode) {
    let result = match input {
        Input::Next => handle.next().await,
        Input::Prev => handle.prev().await,
        Input::Start => handle.start().await,
        Input::End => handle.end().await,
        Input::Jump(ply) => handle.jump(jump_cursor(ply)).await,
        Input::Move(notation) => handle.make_move(notation).await,
        Input::Load(moves) => handle.load(moves).await,
        Input::Reset(fen) => handle.reset(fen).await,
        Input::Lines(n) => handle.set_line_count(n).await,
        Input::Analysis(on) => handle.set_analysis(on).await,
        Input::Show => handle.get_snapshot().await,
        Input::Help => {
            println!("{}", HELP);
            return;
        }
        Input::Quit => return,
    };

    match result {
        Ok(snapshot) => print_snapshot(&snapshot, mode),
        Err(e) => print_error(&e.to_string(), mode),
    }
}

/// Timeline cursor showing the position after `ply` half-moves. Targets past
/// the end are clamped by the timeline.
fn jump_cursor(ply: usize) -> isize {
    isize::try_from(ply).map_or(isize::MAX, |p| p - 1)
}

/// Broadcast events repeat what command replies already printed, except for
/// engine output and errors.
fn print_event(event: &SessionEvent, mode: OutputMode) {
    match event {
        SessionEvent::StateChanged(_) => {}
        SessionEvent::LinesUpdated { depth, lines, .. } => match mode {
            OutputMode::Json => print_json(event),
            OutputMode::Text => println!("{}", render_lines(lines, *depth, false)),
        },
        SessionEvent::AnalysisComplete { depth, .. } => match mode {
            OutputMode::Json => print_json(event),
            OutputMode::Text => println!("analysis complete at depth {}", depth),
        },
        SessionEvent::Error { message } => print_error(message, mode),
    }
}

fn print_snapshot(snapshot: &SessionSnapshot, mode: OutputMode) {
    match mode {
        OutputMode::Json => print_json(snapshot),
        OutputMode::Text => println!("{}", render_snapshot(snapshot)),
    }
}

fn print_error(message: &str, mode: OutputMode) {
    match mode {
        OutputMode::Json => println!("{}", serde_json::json!({ "error": message })),
        OutputMode::Text => println!("error: {}", message),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize output: {}", e),
    }
}

/// Human-readable summary of the timeline and its analysis.
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let timeline = &snapshot.timeline;
    let played = (timeline.cursor + 1) as usize;

    let mut out = format!(
        "ply {}/{}  {} to move",
        played,
        timeline.moves.len(),
        timeline.side_to_move
    );
    if let Some(last) = timeline.last_move() {
        out.push_str(&format!(
            "  last: {}",
            numbered_san(&timeline.start_fen, last.ply, &last.san)
        ));
    }
    out.push('\n');
    out.push_str(&timeline.fen);

    let analysis = &snapshot.analysis;
    if !analysis.engine_available {
        out.push_str("\nanalysis unavailable (no engine)");
    } else if !analysis.enabled {
        out.push_str("\nanalysis off");
    } else if !analysis.lines.is_empty() {
        out.push('\n');
        out.push_str(&render_lines(&analysis.lines, analysis.depth, analysis.complete));
    }
    out
}

/// Ranked lines, one per row, best first.
pub fn render_lines(lines: &[AnalysisLine], depth: u32, complete: bool) -> String {
    let mut out = format!("depth {}{}", depth, if complete { " (done)" } else { "" });
    for line in lines {
        out.push_str(&format!(
            "\n  {}. {:>7}  {}",
            line.rank + 1,
            line.score.display(),
            line.san.join(" ")
        ));
    }
    out
}

/// SAN with a move number, e.g. `1. e4` or `1... e5`. Numbering continues
/// from the fullmove counter and side to move of the start position.
fn numbered_san(start_fen: &str, ply: usize, san: &str) -> String {
    let fields: Vec<&str> = start_fen.split_whitespace().collect();
    let black_first = fields.get(1) == Some(&"b");
    let first_number = fields
        .get(5)
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(1);

    let half_moves = ply + usize::from(black_first);
    let number = first_number + half_moves / 2;
    if half_moves % 2 == 0 {
        format!("{}. {}", number, san)
    } else {
        format!("{}... {}", number, san)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::snapshot::AnalysisView;
    use analysis::AnalysisScore;
    use chess::GameTimeline;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_input("n").unwrap(), Some(Input::Next));
        assert_eq!(parse_input("  prev ").unwrap(), Some(Input::Prev));
        assert_eq!(parse_input("jump 4").unwrap(), Some(Input::Jump(4)));
        assert_eq!(parse_input("").unwrap(), None);
    }

    #[test]
    fn test_parse_moves() {
        assert_eq!(
            parse_input("move Nf3").unwrap(),
            Some(Input::Move("Nf3".to_string()))
        );
        assert_eq!(
            parse_input("load e4 e5 Nf3").unwrap(),
            Some(Input::Load(vec![
                "e4".to_string(),
                "e5".to_string(),
                "Nf3".to_string()
            ]))
        );
        assert_eq!(parse_input("reset").unwrap(), Some(Input::Reset(None)));
    }

    #[test]
    fn test_parse_settings() {
        assert_eq!(parse_input("lines 2").unwrap(), Some(Input::Lines(2)));
        assert_eq!(parse_input("analysis off").unwrap(), Some(Input::Analysis(false)));
        assert!(matches!(
            parse_input("lines 0"),
            Err(InputError::InvalidArgument { command: "lines", .. })
        ));
        assert_eq!(
            parse_input("analysis"),
            Err(InputError::MissingArgument("analysis"))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_input("fly"), Err(InputError::Unknown(_))));
        assert!(matches!(
            parse_input("jump -2"),
            Err(InputError::InvalidArgument { command: "jump", .. })
        ));
        assert_eq!(parse_input("move"), Err(InputError::MissingArgument("move")));
    }

    fn snapshot_after(moves: &[&str]) -> SessionSnapshot {
        let mut timeline = GameTimeline::new();
        timeline.load_from_move_list(moves).unwrap();
        SessionSnapshot {
            timeline: timeline.snapshot(),
            analysis: AnalysisView {
                enabled: true,
                engine_available: true,
                line_count: 2,
                depth: 12,
                complete: false,
                lines: vec![AnalysisLine {
                    rank: 0,
                    score: AnalysisScore::Centipawns(35),
                    moves: vec!["g1f3".to_string()],
                    san: vec!["Nf3".to_string()],
                    depth: 12,
                }],
            },
        }
    }

    #[test]
    fn test_render_snapshot() {
        let text = render_snapshot(&snapshot_after(&["e4", "e5"]));
        let mut rows = text.lines();
        assert_eq!(rows.next(), Some("ply 2/2  white to move  last: 1... e5"));
        assert!(rows.next().unwrap().starts_with("rnbqkbnr/pppp1ppp/"));
        assert_eq!(rows.next(), Some("depth 12"));
        assert_eq!(rows.next(), Some("  1.   +0.35  Nf3"));
    }

    #[test]
    fn test_move_numbers_follow_start_position() {
        let start = chess::fen::STARTING_FEN;
        assert_eq!(numbered_san(start, 0, "e4"), "1. e4");
        assert_eq!(numbered_san(start, 3, "Nc6"), "2... Nc6");

        let black_to_move = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        assert_eq!(numbered_san(black_to_move, 0, "e5"), "1... e5");
        assert_eq!(numbered_san(black_to_move, 1, "Nf3"), "2. Nf3");

        let late = "8/8/8/8/8/8/8/K6k b - - 3 40";
        assert_eq!(numbered_san(late, 0, "Kg1"), "40... Kg1");
        assert_eq!(numbered_san(late, 1, "Kb1"), "41. Kb1");
    }

    #[test]
    fn test_render_after_black_start() {
        let mut timeline = GameTimeline::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        )
        .unwrap();
        timeline.load_from_move_list(&["e5", "Nf3"]).unwrap();
        let mut snapshot = snapshot_after(&[]);
        snapshot.timeline = timeline.snapshot();

        let text = render_snapshot(&snapshot);
        assert!(text.starts_with("ply 2/2  black to move  last: 2. Nf3\n"));
    }

    #[test]
    fn test_jump_target_to_cursor() {
        assert_eq!(jump_cursor(0), -1);
        assert_eq!(jump_cursor(4), 3);
        assert_eq!(
            parse_input(&format!("jump {}", usize::MAX)).unwrap(),
            Some(Input::Jump(usize::MAX))
        );
        assert_eq!(jump_cursor(usize::MAX), isize::MAX);
    }

    #[test]
    fn test_render_without_engine() {
        let mut snapshot = snapshot_after(&[]);
        snapshot.analysis.engine_available = false;
        let text = render_snapshot(&snapshot);
        assert!(text.starts_with("ply 0/0  white to move\n"));
        assert!(text.ends_with("analysis unavailable (no engine)"));
    }
}
