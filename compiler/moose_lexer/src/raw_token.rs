//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before
//! string interning and final token conversion.

use logos::Logos;

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")] // Skip horizontal whitespace
pub(crate) enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("\n")]
    Newline,

    // Keywords
    #[token("mut")]
    Mut,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("func")]
    Func,
    #[token("class")]
    Class,
    #[token("prefix")]
    Prefix,
    #[token("infix")]
    Infix,
    #[token("postfix")]
    Postfix,
    #[token("me")]
    Me,
    #[token("is")]
    Is,
    #[token("nil")]
    Nil,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Literals
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    Float,
    #[regex(r"[0-9][0-9_]*")]
    Int,
    #[regex(r#""([^"\\\n]|\\.)*""#, priority = 3)]
    Str,
    #[regex(r#""([^"\\\n]|\\.)*"#, priority = 1)]
    UnterminatedStr,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // Operator symbols. Multi-character symbols are listed before
    // their single-character prefixes; logos picks the longest match.
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("->")]
    Arrow,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,

    // Punctuation
    #[token("=")]
    Assign,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
}
