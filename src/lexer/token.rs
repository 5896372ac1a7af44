use std::fmt;

use phf::phf_map;

pub static KEYWORDS: phf::Map<&str, TokenKind> = phf_map! {
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "int" => TokenKind::Basic(BasicType::Int),
    "float" => TokenKind::Basic(BasicType::Float),
    "char" => TokenKind::Basic(BasicType::Char),
    "bool" => TokenKind::Basic(BasicType::Bool),
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "do" => TokenKind::Do,
    "break" => TokenKind::Break,
};

pub static TWO_SYMBOLS_TOKENS: phf::Map<&str, TokenKind> = phf_map! {
    "==" => TokenKind::DoubleEqual,
    "!=" => TokenKind::NotEqual,
    "<=" => TokenKind::LessEqual,
    ">=" => TokenKind::GreaterEqual,
    "&&" => TokenKind::And,
    "||" => TokenKind::Or,
};

/// Operators that are legal on their own. `&` and `|` only exist as the
/// first half of `&&` and `||`.
pub static ONE_SYMBOL_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '<' => TokenKind::LessThan,
    '>' => TokenKind::GreaterThan,
    '=' => TokenKind::Equal,
    '!' => TokenKind::Not,
    '+' => TokenKind::Plus,
    '-' => TokenKind::Minus,
    '*' => TokenKind::Star,
    '/' => TokenKind::Slash,
};

pub static PUNCTUATION_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    ';' => TokenKind::SemiColon,
    '(' => TokenKind::OpenParen,
    ')' => TokenKind::CloseParen,
    '{' => TokenKind::OpenCurlyBrace,
    '}' => TokenKind::CloseCurlyBrace,
    '[' => TokenKind::OpenSquareBrace,
    ']' => TokenKind::CloseSquareBrace,
};

/// Characters that may start an operator lexeme.
pub const OPERATOR_CHARS: [char; 10] = ['<', '>', '=', '!', '&', '|', '+', '-', '*', '/'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasicType {
    Int,
    Float,
    Char,
    Bool,
}

impl BasicType {
    /// Storage width in bytes.
    pub fn width(&self) -> usize {
        match self {
            BasicType::Int => 4,
            BasicType::Float => 8,
            BasicType::Char | BasicType::Bool => 1,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, BasicType::Int | BasicType::Float | BasicType::Char)
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BasicType::Int => "int",
            BasicType::Float => "float",
            BasicType::Char => "char",
            BasicType::Bool => "bool",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Eof,
    Num(i32),
    Real(f64),
    Ident(String),
    Basic(BasicType),

    True,
    False,
    If,
    Else,
    While,
    Do,
    Break,

    DoubleEqual,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    And,
    Or,
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    Not,

    SemiColon,
    OpenParen,
    CloseParen,
    OpenCurlyBrace,
    CloseCurlyBrace,
    OpenSquareBrace,
    CloseSquareBrace,
}

impl TokenKind {
    /// Compares kinds while ignoring the payload of literals and identifiers.
    pub fn same_kind(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Num(n) => write!(f, "{}", n),
            TokenKind::Real(r) => write!(f, "{:?}", r),
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Basic(b) => write!(f, "{}", b),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::While => write!(f, "while"),
            TokenKind::Do => write!(f, "do"),
            TokenKind::Break => write!(f, "break"),
            TokenKind::DoubleEqual => write!(f, "=="),
            TokenKind::NotEqual => write!(f, "!="),
            TokenKind::LessThan => write!(f, "<"),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::GreaterThan => write!(f, ">"),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::And => write!(f, "&&"),
            TokenKind::Or => write!(f, "||"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Equal => write!(f, "="),
            TokenKind::Not => write!(f, "!"),
            TokenKind::SemiColon => write!(f, ";"),
            TokenKind::OpenParen => write!(f, "("),
            TokenKind::CloseParen => write!(f, ")"),
            TokenKind::OpenCurlyBrace => write!(f, "{{"),
            TokenKind::CloseCurlyBrace => write!(f, "}}"),
            TokenKind::OpenSquareBrace => write!(f, "["),
            TokenKind::CloseSquareBrace => write!(f, "]"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}
