use spp_ast::Span;
use std::fmt;

/// Represents the different kinds of tokens in SPP source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords - declarations
    Cls,
    Fn,
    Sup,
    For,
    Use,
    As,
    Mod,
    Enum,

    // Keywords - statements
    Let,
    Mut,
    Ret,
    Gen,
    If,
    Else,
    While,
    With,
    Exit,
    Skip,

    // Keywords - values
    True,
    False,
    SelfValue,

    // Literals
    NumberLiteral,
    StringLiteral,
    RegexLiteral,

    // Identifier
    Identifier,
    Underscore,

    // Operators
    Plus,              // +
    Minus,             // -
    Star,              // *
    Slash,             // /
    Percent,           // %
    Eq,                // =
    EqEq,              // ==
    BangEq,            // !=
    Lt,                // <
    Gt,                // >
    LtEq,              // <=
    GtEq,              // >=
    AmpAmp,            // &&
    PipePipe,          // ||
    Bang,              // !
    Amp,               // &
    Pipe,              // |
    PlusEq,            // +=
    MinusEq,           // -=
    StarEq,            // *=
    SlashEq,           // /=
    Arrow,             // ->

    // Delimiters
    LParen,            // (
    RParen,            // )
    LBrace,            // {
    RBrace,            // }
    LBracket,          // [
    RBracket,          // ]
    Semicolon,         // ;
    Comma,             // ,
    Dot,               // .
    Colon,             // :
    At,                // @

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Keyword for an identifier-shaped word, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "cls" => TokenKind::Cls,
            "fn" => TokenKind::Fn,
            "sup" => TokenKind::Sup,
            "for" => TokenKind::For,
            "use" => TokenKind::Use,
            "as" => TokenKind::As,
            "mod" => TokenKind::Mod,
            "enum" => TokenKind::Enum,
            "let" => TokenKind::Let,
            "mut" => TokenKind::Mut,
            "ret" => TokenKind::Ret,
            "gen" => TokenKind::Gen,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "with" => TokenKind::With,
            "exit" => TokenKind::Exit,
            "skip" => TokenKind::Skip,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "self" => TokenKind::SelfValue,
            "_" => TokenKind::Underscore,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Cls => "'cls'",
            TokenKind::Fn => "'fn'",
            TokenKind::Sup => "'sup'",
            TokenKind::For => "'for'",
            TokenKind::Use => "'use'",
            TokenKind::As => "'as'",
            TokenKind::Mod => "'mod'",
            TokenKind::Enum => "'enum'",
            TokenKind::Let => "'let'",
            TokenKind::Mut => "'mut'",
            TokenKind::Ret => "'ret'",
            TokenKind::Gen => "'gen'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::With => "'with'",
            TokenKind::Exit => "'exit'",
            TokenKind::Skip => "'skip'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::SelfValue => "'self'",
            TokenKind::NumberLiteral => "number",
            TokenKind::StringLiteral => "string",
            TokenKind::RegexLiteral => "regex",
            TokenKind::Identifier => "identifier",
            TokenKind::Underscore => "'_'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::Arrow => "'->'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Colon => "':'",
            TokenKind::At => "'@'",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Represents a token with its kind, span, and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self { kind, span, value }
    }
}
