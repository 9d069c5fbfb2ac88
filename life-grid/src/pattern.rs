use crate::Loc;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unbalanced brackets in pattern {0:?}")]
    UnbalancedBrackets(String),
    #[error("expected an `x,y` pair, found {0:?}")]
    MalformedPair(String),
    #[error("invalid coordinate {value:?}")]
    InvalidCoordinate {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// A list of live cells written as `[x,y;x,y;...]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    locs: Vec<Loc>,
}

impl Pattern {
    pub fn new(locs: Vec<Loc>) -> Self {
        Self { locs }
    }

    /// The shape a fresh board starts with when nothing else is asked for.
    pub fn default_seed() -> Self {
        Self::new(
            [(15, 15), (15, 16), (14, 16), (15, 17), (16, 17)]
                .into_iter()
                .map(Loc::from)
                .collect(),
        )
    }

    pub fn locs(&self) -> &[Loc] {
        &self.locs
    }

    pub fn len(&self) -> usize {
        self.locs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locs.is_empty()
    }

    fn parse_pair(pair: &str) -> Result<Loc, PatternError> {
        let mut parts = pair.split(',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(x), Some(y), None) => Ok(Loc::new(
                Self::parse_coordinate(x)?,
                Self::parse_coordinate(y)?,
            )),
            _ => Err(PatternError::MalformedPair(pair.to_string())),
        }
    }

    fn parse_coordinate(value: &str) -> Result<i32, PatternError> {
        let value = value.trim();
        value
            .parse()
            .map_err(|source| PatternError::InvalidCoordinate {
                value: value.to_string(),
                source,
            })
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let body = match (s.strip_prefix('['), s.ends_with(']')) {
            (Some(rest), true) => &rest[..rest.len() - 1],
            (None, false) => s,
            _ => return Err(PatternError::UnbalancedBrackets(s.to_string())),
        };
        if body.contains(['[', ']']) {
            return Err(PatternError::UnbalancedBrackets(s.to_string()));
        }

        body.split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(Self::parse_pair)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, loc) in self.locs.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{},{}", loc.x, loc.y)?;
        }
        f.write_str("]")
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = Loc;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Loc>>;

    fn into_iter(self) -> Self::IntoIter {
        self.locs.iter().copied()
    }
}
