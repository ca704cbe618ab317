use std::io;

use thiserror::Error;

/// Reasons a program image can't be placed in memory.
/// Nothing is executed against a program that failed to load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program is {size} bytes but only {max} bytes fit above 0x200")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("unable to read program: {0}")]
    Io(#[from] io::Error),
}

/// Conditions that stop a machine for good.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("returned from a subroutine with an empty call stack")]
    StackUnderflow,

    /// The second halting condition, alongside `StackUnderflow`
    #[error("call stack exceeded its depth of {depth}")]
    StackOverflow { depth: usize },
}
