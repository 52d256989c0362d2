//! 1-based index selection over canonical titles.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// A set of 1-based positions written as `"a"`, `"a-b"`, or `"a-"`, comma separated.
///
/// `"a-"` is open-ended and covers every position from `a` onwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelector {
    parts: Vec<RangePart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangePart {
    Single(usize),
    Closed(usize, usize),
    From(usize),
}

impl RangeSelector {
    /// Selector covering every position.
    #[must_use]
    pub fn all() -> Self {
        Self {
            parts: vec![RangePart::From(1)],
        }
    }

    /// Parse a selector.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRange`] for empty input, non-numeric bounds,
    /// index `0`, or a range whose end precedes its start.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let invalid = |reason: &'static str| CoreError::InvalidRange {
            input: input.to_string(),
            reason,
        };

        let mut parts = Vec::new();
        for raw in input.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(invalid("empty range segment"));
            }
            let part = match raw.split_once('-') {
                None => RangePart::Single(parse_index(raw).ok_or_else(|| invalid("not an index"))?),
                Some((start, "")) => {
                    RangePart::From(parse_index(start).ok_or_else(|| invalid("not an index"))?)
                }
                Some((start, end)) => {
                    let start = parse_index(start).ok_or_else(|| invalid("not an index"))?;
                    let end = parse_index(end).ok_or_else(|| invalid("not an index"))?;
                    if end < start {
                        return Err(invalid("range end precedes its start"));
                    }
                    RangePart::Closed(start, end)
                }
            };
            parts.push(part);
        }
        Ok(Self { parts })
    }

    /// Whether the 1-based `position` is selected.
    #[must_use]
    pub fn contains(&self, position: usize) -> bool {
        self.parts.iter().any(|part| match *part {
            RangePart::Single(index) => position == index,
            RangePart::Closed(start, end) => (start..=end).contains(&position),
            RangePart::From(start) => position >= start,
        })
    }
}

fn parse_index(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|index| *index > 0)
}

impl Default for RangeSelector {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for RangeSelector {
    type Err = CoreError;

    fn from_str(input: &str) -> CoreResult<Self> {
        Self::parse(input)
    }
}

impl Display for RangeSelector {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .parts
            .iter()
            .map(|part| match part {
                RangePart::Single(index) => index.to_string(),
                RangePart::Closed(start, end) => format!("{start}-{end}"),
                RangePart::From(start) => format!("{start}-"),
            })
            .collect();
        formatter.write_str(&rendered.join(","))
    }
}
