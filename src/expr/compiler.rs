//! compiler turns a tokenized expression into a flat, paren-free sequence
//! ready for repeated evaluation.

use crate::error::Error;
use crate::expr::tokenizer::{Lexeme, Tokenizer};
use crate::interner::Interner;
use crate::token::{BinOp, Token};

/// CompiledExpr is an ordered, postfix-oriented sequence of [`Token`]s,
/// produced once per constraint or `$eval(...)` body and evaluated many
/// times by [`crate::expr::eval::Evaluator`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledExpr {
    pub(crate) tokens: Vec<Token>,
}

impl CompiledExpr {
    /// tokens exposes the compiled sequence for the evaluator.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

/// compile tokenizes `src` once and folds the result into a [`CompiledExpr`],
/// interning literals via `interner` and discarding parentheses.
pub fn compile(src: &str, line: Option<usize>, interner: &mut Interner) -> Result<CompiledExpr, Error> {
    let mut tokenizer = Tokenizer::new(src, line);
    let mut tokens = Vec::new();

    while let Some(lexeme) = tokenizer.next_lexeme()? {
        let token = match lexeme {
            Lexeme::Number(n) => Token::Number(n),
            Lexeme::Variable(v) => Token::Variable(v),
            Lexeme::Literal(s) => Token::Literal(interner.intern(&s)),
            Lexeme::Plus => Token::Op(BinOp::Add),
            Lexeme::Minus => Token::Op(BinOp::Sub),
            Lexeme::Times => Token::Op(BinOp::Mul),
            Lexeme::Divide => Token::Op(BinOp::Div),
            Lexeme::Mod => Token::Op(BinOp::Mod),
            Lexeme::Lt => Token::Op(BinOp::Lt),
            Lexeme::Gt => Token::Op(BinOp::Gt),
            Lexeme::Le => Token::Op(BinOp::Le),
            Lexeme::Ge => Token::Op(BinOp::Ge),
            Lexeme::Eq => Token::Op(BinOp::Eq),
            Lexeme::Ne => Token::Op(BinOp::Ne),
            Lexeme::And => Token::Op(BinOp::And),
            Lexeme::Or => Token::Op(BinOp::Or),
            Lexeme::Xor => Token::Op(BinOp::Xor),
            Lexeme::IsNumeric => Token::IsNumeric,
            Lexeme::StartsWith => Token::StartsWith,
            Lexeme::LParen | Lexeme::RParen => continue,
        };
        tokens.push(token);
    }

    if tokens.is_empty() {
        return Err(Error::InvalidExpression(line, "empty expression".to_string()));
    }

    Ok(CompiledExpr { tokens })
}
