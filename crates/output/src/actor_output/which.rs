use std::{fmt, str::FromStr};

use crate::OutputError;

/// Identifies which data of an actor output an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Which {
    /// The merged container.
    Merged,

    /// Every run container still held in memory.
    AllRuns,

    /// Every run container, then the merged container.
    All,

    /// One run.
    Run(usize),
}

impl FromStr for Which {
    type Err = OutputError;

    /// Parses `merged`, `all_runs`, `all`, or a run index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merged" => Ok(Self::Merged),
            "all_runs" => Ok(Self::AllRuns),
            "all" => Ok(Self::All),
            other => other
                .parse()
                .map(Self::Run)
                .map_err(|_| OutputError::InvalidWhich(other.to_owned())),
        }
    }
}

impl From<usize> for Which {
    fn from(run_index: usize) -> Self {
        Self::Run(run_index)
    }
}

impl fmt::Display for Which {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merged => f.write_str("merged"),
            Self::AllRuns => f.write_str("all_runs"),
            Self::All => f.write_str("all"),
            Self::Run(index) => write!(f, "{index}"),
        }
    }
}
