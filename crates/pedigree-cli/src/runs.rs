//! Runs file parsing.
//!
//! One run per line, `part,generations`:
//!
//! ```text
//! 1,6
//! 2,6
//! 3,6
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Anything else that
//! does not parse is skipped with a warning.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use pedigree_core::{Strategy, TraversalSettings};
use tracing::warn;

/// Which retrieval a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    /// Part 1: depth-first.
    DepthFirst,
    /// Part 2: breadth-first with `traversal.bfs_workers`.
    BreadthFirst,
    /// Part 3: breadth-first with `traversal.limited_bfs_workers`.
    LimitedBreadthFirst,
}

impl Part {
    /// Maps the part number used in runs files.
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Part::DepthFirst),
            2 => Some(Part::BreadthFirst),
            3 => Some(Part::LimitedBreadthFirst),
            _ => None,
        }
    }

    /// Strategy of this part under the configured worker counts.
    #[must_use]
    pub fn strategy(self, settings: &TraversalSettings) -> Strategy {
        match self {
            Part::DepthFirst => Strategy::DepthFirst,
            Part::BreadthFirst => Strategy::breadth_first(settings.bfs_workers),
            Part::LimitedBreadthFirst => Strategy::breadth_first(settings.limited_bfs_workers),
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self {
            Part::DepthFirst => "Depth First Search",
            Part::BreadthFirst => "Breadth First Search",
            Part::LimitedBreadthFirst => "Limited Breadth First Search",
        };
        f.write_str(title)
    }
}

/// One line of a runs file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// Retrieval to perform.
    pub part: Part,
    /// Generations of the pedigree to generate.
    pub generations: u32,
}

/// Reads and parses a runs file.
pub fn load_runs(path: &Path) -> anyhow::Result<Vec<Run>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read runs file {}", path.display()))?;
    Ok(parse_runs(&text))
}

/// Parses runs, skipping invalid lines.
#[must_use]
pub fn parse_runs(text: &str) -> Vec<Run> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let run = parse_line(line);
            if run.is_none() {
                warn!(line = index + 1, content = line, "skipping invalid run");
            }
            run
        })
        .collect()
}

fn parse_line(line: &str) -> Option<Run> {
    let (part, generations) = line.split_once(',')?;
    let part = Part::from_number(part.trim().parse().ok()?)?;
    let generations: u32 = generations.trim().parse().ok()?;
    (generations > 0).then_some(Run { part, generations })
}
