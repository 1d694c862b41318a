use std::io::{self, BufRead, Write};

use crate::application::game_service::{GameService, StoreError};
use crate::application::snapshot::Snapshot;
use crate::domain::models::{GameKind, Selector};

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_ONE: &str = "\x1b[37m";
const COLOR_TWO: &str = "\x1b[31m";
const COLOR_DIM: &str = "\x1b[90m";

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Hot-seat play on the public board of one game.
pub struct ConsoleInterface<'a> {
    service: &'a GameService,
    game: GameKind,
}

impl<'a> ConsoleInterface<'a> {
    pub fn new(service: &'a GameService, game: GameKind) -> Self {
        Self { service, game }
    }

    /// Reads `<from> <to>` moves until `quit` or end of input.
    /// `reset` starts a new game once the current one is over.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut out: W) -> Result<(), ConsoleError> {
        let snapshot = self.service.get_state(self.game, Selector::Public, None)?;
        writeln!(out, "{}", render_snapshot(&snapshot))?;
        prompt(&mut out, &snapshot)?;

        for line in input.lines() {
            let line = line?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            let snapshot = match parts.as_slice() {
                [] => continue,
                ["quit"] | ["exit"] => break,
                ["reset"] => {
                    let player = snapshot_player(&self.service.get_state(
                        self.game,
                        Selector::Public,
                        None,
                    )?);
                    let result =
                        self.service
                            .reset_game(self.game, Selector::Public, None, player)?;
                    if let Some(reason) = result.error {
                        writeln!(out, "Error: {}", reason)?;
                    }
                    result.state
                }
                [from, to] => {
                    let current = self.service.get_state(self.game, Selector::Public, None)?;
                    let result = self.service.submit_move(
                        self.game,
                        Selector::Public,
                        None,
                        snapshot_player(&current),
                        from,
                        to,
                    )?;
                    if let Some(reason) = result.error {
                        writeln!(out, "Error: {}", reason)?;
                    }
                    result.state
                }
                _ => {
                    writeln!(out, "Enter a move as '<from> <to>', e.g. 'e2 e4'")?;
                    continue;
                }
            };
            writeln!(out, "{}", render_snapshot(&snapshot))?;
            prompt(&mut out, &snapshot)?;
        }
        Ok(())
    }
}

fn snapshot_player(snapshot: &Snapshot) -> u8 {
    snapshot.current_player.number()
}

fn prompt<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    match &snapshot.result {
        Some(result) => writeln!(
            out,
            "{:?}! {}. Type 'reset' for a new game.",
            result.title, result.message
        )?,
        None => writeln!(out, "{}'s turn", snapshot.current_player)?,
    }
    write!(out, "> ")?;
    out.flush()
}

/// Board rows with rank numbers on the left and files underneath.
/// Player one's pieces are light, player two's red.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let side = snapshot.board.len();
    let mut text = String::new();
    for (row, cells) in snapshot.board.iter().enumerate() {
        text.push_str(&format!("{}{:>2}{} ", COLOR_DIM, side - row, COLOR_RESET));
        for c in cells.chars() {
            let color = match c {
                '.' => COLOR_DIM,
                'A' => COLOR_TWO,
                'K' | 'D' => COLOR_ONE,
                c if c.is_ascii_uppercase() => COLOR_ONE,
                _ => COLOR_TWO,
            };
            text.push_str(&format!("{}{}{} ", color, c, COLOR_RESET));
        }
        text.push('\n');
    }
    text.push_str("   ");
    for file in (b'a'..).take(side) {
        text.push_str(&format!("{}{}{} ", COLOR_DIM, file as char, COLOR_RESET));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualClock;
    use std::sync::Arc;

    fn service() -> GameService {
        GameService::in_memory(Arc::new(ManualClock::new(1_000)))
    }

    #[test]
    fn test_console_plays_moves_and_reports_errors() {
        let service = service();
        let console = ConsoleInterface::new(&service, GameKind::Chess);
        let input = b"e2 e4\ne2 e4\nnonsense\nquit\ne7 e5\n";
        let mut out = Vec::new();
        console.run(&input[..], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Player 2's turn"));
        assert!(text.contains("Error: Not your piece"));
        assert!(text.contains("Enter a move"));

        let state = service.states();
        assert_eq!(state.get(GameKind::Chess, Selector::Public).move_history.len(), 1);
    }

    #[test]
    fn test_render_labels_ranks_and_files() {
        let service = service();
        let snapshot = service
            .get_state(GameKind::Hnefatafl, Selector::Public, None)
            .unwrap();
        let text = render_snapshot(&snapshot);
        assert_eq!(text.lines().count(), 10);
        assert!(text.lines().next().unwrap().contains(" 9"));
        assert!(text.lines().last().unwrap().contains('i'));
    }
}
