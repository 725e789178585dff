use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{Result, bail};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

pub const CHOICES: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

impl Choice {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        CHOICES[rng.random_range(0..CHOICES.len())]
    }

    /// The choice this one defeats.
    #[must_use]
    pub fn beats(self) -> Self {
        match self {
            Self::Rock => Self::Scissors,
            Self::Paper => Self::Rock,
            Self::Scissors => Self::Paper,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rock => "rock",
            Self::Paper => "paper",
            Self::Scissors => "scissors",
        })
    }
}

impl FromStr for Choice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rock" => Ok(Self::Rock),
            "paper" => Ok(Self::Paper),
            "scissors" => Ok(Self::Scissors),
            _ => bail!("Invalid choice '{}'", s.trim()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Tie,
    PlayerWins,
    ComputerWins,
}

impl Outcome {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Tie => "It is a tie!",
            Self::PlayerWins => "You win!",
            Self::ComputerWins => "Computer wins!",
        }
    }
}

#[must_use]
pub fn determine_winner(player: Choice, computer: Choice) -> Outcome {
    if player == computer {
        Outcome::Tie
    } else if player.beats() == computer {
        Outcome::PlayerWins
    } else {
        Outcome::ComputerWins
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Prompt until the player types a valid choice. `None` means input ended.
pub fn read_player_choice<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Option<Choice>> {
    loop {
        write!(out, "Enter your choice (rock, paper, scissors): ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        if let Ok(choice) = line.parse() {
            return Ok(Some(choice));
        }
        writeln!(out, "Invalid choice. Please try again.")?;
    }
}

/// Play rounds until the player enters `q` or input runs out. Returns the
/// outcome of every completed round.
pub fn play_session<R, W, C>(input: &mut R, out: &mut W, mut computer: C) -> Result<Vec<Outcome>>
where
    R: BufRead,
    W: Write,
    C: FnMut() -> Choice,
{
    let mut outcomes = Vec::new();

    loop {
        let Some(player) = read_player_choice(input, out)? else {
            break;
        };
        let opponent = computer();
        writeln!(out, "You chose {player}, computer chose {opponent}.")?;

        let outcome = determine_winner(player, opponent);
        writeln!(out, "{}", outcome.message())?;
        outcomes.push(outcome);

        write!(out, "Do you want to play again? (enter any key to continue, 'q' to exit): ")?;
        out.flush()?;
        match read_line(input)? {
            Some(answer) if !answer.trim().eq_ignore_ascii_case("q") => {}
            _ => break,
        }
    }

    Ok(outcomes)
}
