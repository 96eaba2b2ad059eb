use std::fmt;

/// Rejection of raw input before any normalization is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormatError {
    DisallowedCharacter { ch: char, position: usize },
    TooLong { max: usize, actual: usize },
}

impl fmt::Display for InputFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisallowedCharacter { ch, position } => write!(
                f,
                "only digits, spaces and '+' are allowed (found {ch:?} at position {position})"
            ),
            Self::TooLong { max, actual } => {
                write!(f, "input too long: {actual} characters (max {max})")
            }
        }
    }
}

impl std::error::Error for InputFormatError {}
