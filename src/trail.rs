use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::settings::TrailSettings;

pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Which symbols make up a trail, and in which interleaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum SymbolType {
    #[default]
    #[strum(serialize = "numbers")]
    Numbers,
    #[strum(serialize = "letters")]
    Letters,
    #[strum(serialize = "numbers-letters")]
    NumbersLetters,
    #[strum(serialize = "letters-numbers")]
    LettersNumbers,
}

impl SymbolType {
    pub fn parse(value: &str) -> Result<Self, SettingsError> {
        match value {
            "numbers" => Ok(SymbolType::Numbers),
            "letters" => Ok(SymbolType::Letters),
            "numbers-letters" => Ok(SymbolType::NumbersLetters),
            "letters-numbers" => Ok(SymbolType::LettersNumbers),
            other => Err(SettingsError::UnknownSymbolType(other.to_string())),
        }
    }

    /// Longest trail this symbol type can produce without running out of letters.
    pub fn max_trail_length(&self) -> Option<usize> {
        match self {
            SymbolType::Numbers => None,
            SymbolType::Letters => Some(ALPHABET.len()),
            SymbolType::NumbersLetters | SymbolType::LettersNumbers => Some(ALPHABET.len() * 2),
        }
    }
}

/// A single target label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Symbol {
    Number(u32),
    Letter(char),
}

impl Symbol {
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Number(n) => write!(f, "{n}"),
            Symbol::Letter(c) => write!(f, "{c}"),
        }
    }
}

fn numbers(count: usize) -> impl Iterator<Item = Symbol> {
    (1..=count as u32).map(Symbol::Number)
}

fn letters(count: usize) -> impl Iterator<Item = Symbol> {
    ALPHABET.chars().take(count).map(Symbol::Letter)
}

fn interleave(
    first: impl Iterator<Item = Symbol>,
    second: impl Iterator<Item = Symbol>,
    len: usize,
) -> Vec<Symbol> {
    itertools::interleave(first, second).take(len).collect()
}

/// Build the ordered target sequence for a run.
///
/// Pure function of the settings. Interleaved types take `ceil(n/2)` numbers
/// and `floor(n/2)` letters and alternate them starting with the type named
/// first.
pub fn generate_trail(settings: &TrailSettings) -> Vec<Symbol> {
    let n = settings.trail_length;
    let number_half = n.div_ceil(2);
    let letter_half = n / 2;

    let mut trail = match settings.symbol_type {
        SymbolType::Numbers => numbers(n).collect(),
        SymbolType::Letters => letters(n).collect(),
        SymbolType::NumbersLetters => interleave(numbers(number_half), letters(letter_half), n),
        SymbolType::LettersNumbers => interleave(letters(letter_half), numbers(number_half), n),
    };

    if settings.reverse_order {
        trail.reverse();
    }

    trail
}
