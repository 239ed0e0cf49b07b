//! Play command - Interactive terminal game against an agent

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Parser;

use crate::{
    adapters::MsgPackRepository,
    agents::AgentSelector,
    app::{AppBuilder, AppConfig},
    error::ErrorKind,
    ports::AgentPolicy,
    session::GameStateMachine,
    tictactoe::{GameOutcome, Mark},
};

#[derive(Parser, Debug)]
#[command(about = "Play against an agent in the terminal")]
pub struct PlayArgs {
    /// Agent type (q=Q-Learning, s=SARSA, v=Value Iteration, p=Policy Iteration)
    #[arg(long, short = 'a', default_value = "q")]
    pub agent: AgentSelector,

    /// Save file to load the agent from
    #[arg(long, short = 'p')]
    pub path: Option<PathBuf>,
}

pub fn execute(args: PlayArgs, config: AppConfig) -> Result<()> {
    let mut repository = MsgPackRepository::new(config.agents.directory.clone());
    if let Some(path) = &args.path {
        repository = repository.with_path(args.agent, path.clone());
    }
    let app = AppBuilder::new()
        .with_config(config)
        .with_repository(repository)
        .build();
    let catalog = app.catalog();

    let stdin = io::stdin();
    let stdout = io::stdout();
    play_games(stdin.lock(), stdout.lock(), catalog.as_ref(), args.agent)?;
    Ok(())
}

/// Run games until the player declines another or input ends.
///
/// Returns the number of finished games.
pub fn play_games<R, W>(
    mut input: R,
    mut out: W,
    policy: &dyn AgentPolicy,
    agent: AgentSelector,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    writeln!(
        out,
        "Welcome to Tic-Tac-Toe. You are '{}' and the computer is '{}'.",
        Mark::PLAYER,
        Mark::AGENT
    )?;

    let mut games = 0;
    loop {
        let mut game = GameStateMachine::new(agent);
        if !play_one(&mut input, &mut out, policy, &mut game)? {
            break;
        }
        games += 1;
        writeln!(out, "Games played: {games}")?;

        if !ask_again(&mut input, &mut out)? {
            writeln!(out, "OK. Quitting.")?;
            break;
        }
    }
    Ok(games)
}

/// `false` when input ended mid-game.
fn play_one<R, W>(
    input: &mut R,
    out: &mut W,
    policy: &dyn AgentPolicy,
    game: &mut GameStateMachine,
) -> Result<bool>
where
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(out, "\n{}", game.board())?;
        write!(out, "Your move (row col): ")?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(false);
        };
        let Some((row, col)) = parse_coords(&line) else {
            writeln!(out, "Please enter a row and a column, e.g. `1 2`.")?;
            continue;
        };

        match game.apply_player_move(row, col, policy) {
            Ok(report) => {
                if let Some(reply) = report.agent_move {
                    writeln!(out, "Agent plays {} {}", reply.row, reply.col)?;
                }
                if let Some(outcome) = report.outcome {
                    writeln!(out, "\n{}", game.board())?;
                    writeln!(out, "{}", outcome_message(outcome))?;
                    return Ok(true);
                }
            }
            Err(err) if matches!(err.kind(), ErrorKind::Validation | ErrorKind::GameRule) => {
                writeln!(out, "{err}")?;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn ask_again<R, W>(input: &mut R, out: &mut W) -> Result<bool>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(out, "Do you want to play again? [y/n]: ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(false);
        };
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(out, "Invalid input. Please choose 'y' or 'n'.")?,
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Accepts `1 2`, `1,2` or `12`.
fn parse_coords(line: &str) -> Option<(i64, i64)> {
    let digits: Vec<i64> = line
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| c.to_digit(10).map(i64::from))
        .collect::<Option<_>>()?;
    match digits[..] {
        [row, col] => Some((row, col)),
        _ => None,
    }
}

fn outcome_message(outcome: GameOutcome) -> &'static str {
    match outcome {
        GameOutcome::Win(Mark::X) => "You win!",
        GameOutcome::Win(Mark::O) => "Agent wins!",
        GameOutcome::Draw => "It's a draw!",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::tictactoe::Board;

    /// Always takes the first empty cell.
    struct FirstEmpty;

    impl AgentPolicy for FirstEmpty {
        fn choose_move(&self, board: &Board, _agent: AgentSelector) -> crate::Result<(usize, usize)> {
            board
                .empty_cells()
                .first()
                .copied()
                .ok_or(crate::Error::NoValidMoves)
        }
    }

    fn run(input: &str) -> (usize, String) {
        let mut out = Vec::new();
        let games = play_games(
            Cursor::new(input.as_bytes()),
            &mut out,
            &FirstEmpty,
            AgentSelector::QLearning,
        )
        .unwrap();
        (games, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_coords() {
        assert_eq!(parse_coords("1 2\n"), Some((1, 2)));
        assert_eq!(parse_coords("0,0"), Some((0, 0)));
        assert_eq!(parse_coords("21"), Some((2, 1)));
        assert_eq!(parse_coords("1"), None);
        assert_eq!(parse_coords("a b"), None);
    }

    #[test]
    fn test_player_wins_down_the_right_column() {
        // Agent fills (0,0), (0,1), (1,0) while X takes the right column.
        let (games, out) = run("0 2\n1 2\n2 2\nn\n");
        assert_eq!(games, 1);
        assert!(out.contains("You win!"));
        assert!(out.contains("OK. Quitting."));
    }

    #[test]
    fn test_rule_errors_are_reported_and_play_continues() {
        let (games, out) = run("0 2\n0 0\n5 5\nhello\n1 2\n2 2\nn\n");
        assert_eq!(games, 1);
        assert!(out.contains("already occupied"));
        assert!(out.contains("out of bounds"));
        assert!(out.contains("Please enter a row and a column"));
    }

    #[test]
    fn test_input_end_mid_game_stops_quietly() {
        let (games, out) = run("1 1\n");
        assert_eq!(games, 0);
        assert!(!out.contains("Games played"));
    }
}
