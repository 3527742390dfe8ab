//! Replay a game written in algebraic notation and print the board it ends on
//!
//! Handy for checking what the mirror makes of a game when it disagrees with the server. Set
//! `RUST_LOG=debug` to see every move as it is applied.

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use board::Color;
use clap::Parser;
use client::Orientation;
use mirror::BoardState;

#[derive(Parser, Debug)]
#[command(about = "Replay algebraic notation from the initial position and print the board")]
struct Args {
    /// File holding the moves, read from stdin when missing
    file: Option<PathBuf>,
    /// Show the board from black's side
    #[arg(long)]
    flip: bool,
    /// Print the board after every move instead of only at the end
    #[arg(long)]
    each: bool,
}

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Drop a leading move number like `12.` or `12...`
fn strip_move_number(token: &str) -> &str {
    match token.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) if idx > 0 && token[idx..].starts_with('.') => {
            token[idx..].trim_start_matches('.')
        }
        _ => token,
    }
}

/// Split a written game into the notation of each half move
fn notation_tokens(text: &str) -> Vec<String> {
    let mut moves: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        if RESULTS.contains(&token) {
            continue;
        }
        // A detached en passant annotation belongs to the move before it
        if token == "e.p." || token == "ep" {
            if let Some(last) = moves.last_mut() {
                last.push(' ');
                last.push_str(token);
            }
            continue;
        }
        let token = strip_move_number(token);
        if !token.is_empty() {
            moves.push(token.to_string());
        }
    }
    moves
}

fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let text = match read_input(args.file.as_deref()) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Couldn't read the moves: {e}");
            return ExitCode::FAILURE;
        }
    };
    let local_color = if args.flip {
        Color::Black
    } else {
        Color::White
    };
    let orientation = Orientation {
        local_color: Some(local_color),
        inverted: args.flip,
    };

    let mut state = BoardState::new();
    let mut color = Color::White;
    for (half_move, notation) in notation_tokens(&text).iter().enumerate() {
        let move_number = half_move / 2 + 1;
        if let Err(e) = state.apply_notation(color, notation) {
            eprintln!("Move {move_number} ({color} {notation:?}) was rejected: {e}");
            print!("{}", orientation.display_grid(state.grid()));
            return ExitCode::FAILURE;
        }
        if args.each {
            println!("{move_number}. {color} {notation}");
            println!("{}", orientation.display_grid(state.grid()));
        }
        color = color.other();
    }
    if !args.each {
        print!("{}", orientation.display_grid(state.grid()));
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        assert_eq!(
            notation_tokens("1. e4 e5 2.Nf3 Nc6 3... O-O 0-0-0 exd6 e.p. 1-0"),
            vec!["e4", "e5", "Nf3", "Nc6", "O-O", "0-0-0", "exd6 e.p."],
        );
        assert!(notation_tokens("  \n 1/2-1/2").is_empty());
    }

    #[test]
    fn test_move_numbers() {
        assert_eq!(strip_move_number("12."), "");
        assert_eq!(strip_move_number("12...Nf6"), "Nf6");
        assert_eq!(strip_move_number("0-0"), "0-0");
        assert_eq!(strip_move_number("e4"), "e4");
    }
}
