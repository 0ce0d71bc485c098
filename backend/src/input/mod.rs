//! Typed interactive prompts.
//!
//! A question is printed, a line is read and checked against the pattern of
//! the requested [`InputKind`]; invalid answers are rejected and the question
//! asked again. End of input cancels.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("numeric pattern"));
static LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-ZÀ-ÿ\s]+$").expect("letter pattern"));
static ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9À-ÿ\s]+$").expect("alphanumeric pattern"));
static ANY: Lazy<Regex> = Lazy::new(|| Regex::new(r".+").expect("any pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Numeric,
    Letter,
    Alphanumeric,
    Any,
}

impl InputKind {
    fn pattern(&self) -> &'static Regex {
        match self {
            InputKind::Numeric => &NUMERIC,
            InputKind::Letter => &LETTER,
            InputKind::Alphanumeric => &ALPHANUMERIC,
            InputKind::Any => &ANY,
        }
    }

    pub fn accepts(&self, answer: &str) -> bool {
        self.pattern().is_match(answer)
    }

    fn hint(&self) -> &'static str {
        match self {
            InputKind::Numeric => "digits only",
            InputKind::Letter => "letters and spaces only",
            InputKind::Alphanumeric => "letters, digits and spaces only",
            InputKind::Any => "a non-empty answer",
        }
    }
}

impl FromStr for InputKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" => Ok(InputKind::Numeric),
            "letter" => Ok(InputKind::Letter),
            "alphanumeric" => Ok(InputKind::Alphanumeric),
            "any" => Ok(InputKind::Any),
            _ => Err(ConfigurationError::UnknownInputKind(s.to_string())),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::Numeric => "numeric",
            InputKind::Letter => "letter",
            InputKind::Alphanumeric => "alphanumeric",
            InputKind::Any => "any",
        };
        f.write_str(name)
    }
}

/// Ask `question` until an answer of `kind` is given.
///
/// Returns the trimmed answer, or `None` if input ends first.
pub fn request_value<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    kind: InputKind,
) -> io::Result<Option<String>> {
    loop {
        write!(output, "{} ", question)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let answer = line.trim();
        if kind.accepts(answer) {
            return Ok(Some(answer.to_string()));
        }
        writeln!(output, "Invalid answer, expected {}.", kind.hint())?;
    }
}

/// [`request_value`] on the process's stdin and stdout.
pub fn request_value_stdin(question: &str, kind: InputKind) -> io::Result<Option<String>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    request_value(&mut stdin.lock(), &mut stdout, question, kind)
}
