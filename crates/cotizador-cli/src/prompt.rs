use std::io::IsTerminal;

use anyhow::{Context, Result};
use dialoguer::Input;

/// Answers accepted as "go ahead", compared case-insensitively.
const AFFIRMATIVE: [&str; 4] = ["s", "si", "yes", "y"];

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

/// Ask the operator before touching the database. A non-interactive stdin
/// counts as a refusal; pass `--yes` to run unattended.
pub fn confirm_migration() -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        println!("Non-interactive environment detected; use --yes to run the migration.");
        return Ok(false);
    }

    println!();
    let answer: String = Input::new()
        .with_prompt("¿Deseas continuar con la migración? (s/n)")
        .allow_empty(true)
        .interact_text()
        .context("confirmation cancelled")?;

    Ok(is_affirmative(&answer))
}
