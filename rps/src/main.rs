mod game;

use std::io;
use std::process;

use anyhow::Result;

use crate::game::{Choice, play_session};

fn run() -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout().lock();
    let mut rng = rand::rng();

    play_session(&mut input, &mut out, || Choice::random(&mut rng))?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
