use std::fmt::Write;

use super::{StatsError, Summary};

/// Template used when none is given.
pub const DEFAULT_TEMPLATE: &str = "{min},{mean},{max},{std}";

/// A statistic that can appear in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    /// `{min}`
    Min,
    /// `{mean}`
    Mean,
    /// `{max}`
    Max,
    /// `{std}`
    Std,
}

impl Statistic {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Statistic::Min),
            "mean" => Some(Statistic::Mean),
            "max" => Some(Statistic::Max),
            "std" => Some(Statistic::Std),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Literal(String),
    Stat(Statistic),
}

/// Output layout with `{min}`, `{mean}`, `{max}` and `{std}` placeholders.
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTemplate {
    pieces: Vec<Piece>,
}

impl OutputTemplate {
    /// Parse a template, rejecting unknown placeholders.
    pub fn parse(template: &str) -> Result<Self, StatsError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => {
                                return Err(StatsError::Template(
                                    "unterminated placeholder".to_string(),
                                ))
                            }
                        }
                    }
                    let stat = Statistic::from_name(&name).ok_or_else(|| {
                        StatsError::Template(format!("unknown placeholder '{{{}}}'", name))
                    })?;
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Stat(stat));
                }
                '}' => return Err(StatsError::Template("unmatched '}'".to_string())),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self { pieces })
    }

    /// Fill the template with values from `summary`.
    pub fn render(&self, summary: &Summary) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Stat(stat) => {
                    let _ = write!(out, "{}", summary.get(*stat));
                }
            }
        }
        out
    }
}

impl Default for OutputTemplate {
    fn default() -> Self {
        Self {
            pieces: vec![
                Piece::Stat(Statistic::Min),
                Piece::Literal(",".to_string()),
                Piece::Stat(Statistic::Mean),
                Piece::Literal(",".to_string()),
                Piece::Stat(Statistic::Max),
                Piece::Literal(",".to_string()),
                Piece::Stat(Statistic::Std),
            ],
        }
    }
}
