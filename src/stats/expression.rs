use thiserror::Error;

/// Errors from parsing or evaluating a column expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    /// A character that starts no token.
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter {
        /// Offending character.
        ch: char,
        /// Byte offset within the expression.
        offset: usize,
    },

    /// A token that does not fit the grammar at this point.
    #[error("unexpected token at offset {offset}")]
    UnexpectedToken {
        /// Byte offset within the expression.
        offset: usize,
    },

    /// The expression stopped before it was complete.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A numeric literal that does not parse.
    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber {
        /// Literal text.
        text: String,
        /// Byte offset within the expression.
        offset: usize,
    },

    /// `$0` or a `$` without digits.
    #[error("invalid column reference at offset {offset}: columns are numbered from $1")]
    InvalidColumn {
        /// Byte offset within the expression.
        offset: usize,
    },

    /// The row does not have the referenced column.
    #[error("column ${column} referenced but the row has {available} fields")]
    MissingColumn {
        /// 1-based column number.
        column: usize,
        /// Number of fields in the row.
        available: usize,
    },

    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Number(f64),
    // 0-based field index
    Column(usize),
    Neg(Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Column(usize),
    Op(BinaryOp),
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, ExpressionError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let c = bytes[pos];
        match c {
            b' ' | b'\t' => {
                pos += 1;
                continue;
            }
            b'(' => {
                tokens.push((start, Token::LParen));
                pos += 1;
            }
            b')' => {
                tokens.push((start, Token::RParen));
                pos += 1;
            }
            b'+' | b'-' | b'/' | b'%' => {
                let op = match c {
                    b'+' => BinaryOp::Add,
                    b'-' => BinaryOp::Sub,
                    b'/' => BinaryOp::Div,
                    _ => BinaryOp::Rem,
                };
                tokens.push((start, Token::Op(op)));
                pos += 1;
            }
            b'*' => {
                if bytes.get(pos + 1) == Some(&b'*') {
                    tokens.push((start, Token::Op(BinaryOp::Pow)));
                    pos += 2;
                } else {
                    tokens.push((start, Token::Op(BinaryOp::Mul)));
                    pos += 1;
                }
            }
            b'$' => {
                pos += 1;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                let column: usize = source[start + 1..pos]
                    .parse()
                    .map_err(|_| ExpressionError::InvalidColumn { offset: start })?;
                if column == 0 {
                    return Err(ExpressionError::InvalidColumn { offset: start });
                }
                tokens.push((start, Token::Column(column - 1)));
            }
            b'0'..=b'9' | b'.' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                    pos += 1;
                }
                if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
                    let mut exp = pos + 1;
                    if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
                        exp += 1;
                    }
                    if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                        pos = exp;
                        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                            pos += 1;
                        }
                    }
                }
                let text = &source[start..pos];
                let value: f64 = text.parse().map_err(|_| ExpressionError::InvalidNumber {
                    text: text.to_string(),
                    offset: start,
                })?;
                tokens.push((start, Token::Number(value)));
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or('?');
                return Err(ExpressionError::UnexpectedCharacter { ch, offset: start });
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser with the usual precedence:
/// `+ -` < `* / %` < unary minus < `**` (right-associative).
struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Node, ExpressionError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Node, ExpressionError> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem))) =
            self.peek()
        {
            let op = *op;
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Node, ExpressionError> {
        match self.peek() {
            Some(Token::Op(BinaryOp::Sub)) => {
                self.pos += 1;
                Ok(Node::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Op(BinaryOp::Add)) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Node, ExpressionError> {
        let base = self.atom()?;
        if let Some(Token::Op(BinaryOp::Pow)) = self.peek() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(Node::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Node, ExpressionError> {
        match self.next() {
            Some((_, Token::Number(value))) => Ok(Node::Number(value)),
            Some((_, Token::Column(index))) => Ok(Node::Column(index)),
            Some((_, Token::LParen)) => {
                let inner = self.expr()?;
                match self.next() {
                    Some((_, Token::RParen)) => Ok(inner),
                    Some((offset, _)) => Err(ExpressionError::UnexpectedToken { offset }),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            Some((offset, _)) => Err(ExpressionError::UnexpectedToken { offset }),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }
}

/// Arithmetic expression over the fields of a row.
///
/// Fields are referenced as `$1`, `$2`, …; numbers, `+ - * / %`, `**`,
/// unary minus and parentheses are supported.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    root: Node,
}

impl Expression {
    /// Parse an expression such as `($4 - $3) / 1024`.
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let mut parser = Parser {
            tokens: tokenize(source)?,
            pos: 0,
        };
        let root = parser.expr()?;
        if let Some((offset, _)) = parser.tokens.get(parser.pos) {
            return Err(ExpressionError::UnexpectedToken { offset: *offset });
        }
        Ok(Self { root })
    }

    /// Evaluate against the fields of one row.
    pub fn evaluate(&self, fields: &[f64]) -> Result<f64, ExpressionError> {
        eval(&self.root, fields)
    }
}

fn eval(node: &Node, fields: &[f64]) -> Result<f64, ExpressionError> {
    match node {
        Node::Number(value) => Ok(*value),
        Node::Column(index) => {
            fields
                .get(*index)
                .copied()
                .ok_or(ExpressionError::MissingColumn {
                    column: index + 1,
                    available: fields.len(),
                })
        }
        Node::Neg(inner) => Ok(-eval(inner, fields)?),
        Node::Binary(op, lhs, rhs) => {
            let a = eval(lhs, fields)?;
            let b = eval(rhs, fields)?;
            match op {
                BinaryOp::Add => Ok(a + b),
                BinaryOp::Sub => Ok(a - b),
                BinaryOp::Mul => Ok(a * b),
                BinaryOp::Div if b == 0.0 => Err(ExpressionError::DivisionByZero),
                BinaryOp::Div => Ok(a / b),
                BinaryOp::Rem if b == 0.0 => Err(ExpressionError::DivisionByZero),
                // result takes the sign of the divisor
                BinaryOp::Rem => Ok(a - b * (a / b).floor()),
                BinaryOp::Pow => Ok(a.powf(b)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(source: &str, fields: &[f64]) -> f64 {
        Expression::parse(source).unwrap().evaluate(fields).unwrap()
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval_str("1 + 2 * 3", &[]), 7.0);
        assert_eq!(eval_str("(1 + 2) * 3", &[]), 9.0);
        assert_eq!(eval_str("10 - 4 - 3", &[]), 3.0);
        assert_eq!(eval_str("2 ** 3 ** 2", &[]), 512.0);
        assert_eq!(eval_str("-2 ** 2", &[]), -4.0);
        assert_eq!(eval_str("2 ** -1", &[]), 0.5);
    }

    #[test]
    fn column_references_are_one_based() {
        assert_eq!(eval_str("$1", &[3.0, 5.0]), 3.0);
        assert_eq!(eval_str("($2 - $1) / 2", &[3.0, 5.0]), 1.0);
        assert_eq!(eval_str("1.5e2 + $2", &[0.0, 1.0]), 151.0);
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        assert_eq!(eval_str("7 % 3", &[]), 1.0);
        assert_eq!(eval_str("-7 % 3", &[]), 2.0);
    }

    #[test]
    fn evaluation_errors() {
        let expr = Expression::parse("$3").unwrap();
        assert_eq!(
            expr.evaluate(&[1.0]),
            Err(ExpressionError::MissingColumn { column: 3, available: 1 })
        );
        let expr = Expression::parse("1 / ($1 - 1)").unwrap();
        assert_eq!(expr.evaluate(&[1.0]), Err(ExpressionError::DivisionByZero));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Expression::parse("$0"), Err(ExpressionError::InvalidColumn { offset: 0 }));
        assert_eq!(Expression::parse("1 +"), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(
            Expression::parse("1 2"),
            Err(ExpressionError::UnexpectedToken { offset: 2 })
        );
        assert_eq!(
            Expression::parse("a"),
            Err(ExpressionError::UnexpectedCharacter { ch: 'a', offset: 0 })
        );
        assert!(matches!(
            Expression::parse("1..2"),
            Err(ExpressionError::InvalidNumber { .. })
        ));
    }
}
