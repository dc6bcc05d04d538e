use spp_ast::Span;
use crate::token::{Token, TokenKind};

/// The lexer/tokenizer for SPP source text.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    file_id: usize,
    /// Set after a `.` so that `t.0.1` lexes as two tuple indices.
    after_dot: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    /// Creates a new lexer with a specific file ID.
    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            file_id,
            after_dot: false,
        }
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let token = self.scan_token();
        self.after_dot = token.kind == TokenKind::Dot;
        token
    }

    fn scan_token(&mut self) -> Token {
        if let Some(error_token) = self.skip_whitespace_and_comments() {
            return error_token;
        }

        let start = self.current_pos;

        let ch = match self.current_char {
            None => return Token::new(TokenKind::Eof, self.span_from(start), String::new()),
            Some(ch) => ch,
        };

        match ch {
            '"' => self.read_string_literal(start),
            '0'..='9' => self.read_number(),
            'r' if self.peek() == Some('"') => {
                self.advance();
                let token = self.read_string_literal(start);
                if token.kind == TokenKind::StringLiteral {
                    Token::new(TokenKind::RegexLiteral, token.span, token.value)
                } else {
                    token
                }
            }
            _ if ch.is_alphabetic() || ch == '_' => self.read_identifier_or_keyword(),

            '+' => self.read_with_eq(TokenKind::Plus, TokenKind::PlusEq),
            '*' => self.read_with_eq(TokenKind::Star, TokenKind::StarEq),
            '/' => self.read_with_eq(TokenKind::Slash, TokenKind::SlashEq),
            '=' => self.read_with_eq(TokenKind::Eq, TokenKind::EqEq),
            '!' => self.read_with_eq(TokenKind::Bang, TokenKind::BangEq),
            '<' => self.read_with_eq(TokenKind::Lt, TokenKind::LtEq),
            '>' => self.read_with_eq(TokenKind::Gt, TokenKind::GtEq),
            '-' => {
                self.advance();
                match self.current_char {
                    Some('>') => {
                        self.advance();
                        self.make(TokenKind::Arrow, start)
                    }
                    Some('=') => {
                        self.advance();
                        self.make(TokenKind::MinusEq, start)
                    }
                    _ => self.make(TokenKind::Minus, start),
                }
            }
            '&' => self.read_doubled(TokenKind::Amp, TokenKind::AmpAmp, '&'),
            '|' => self.read_doubled(TokenKind::Pipe, TokenKind::PipePipe, '|'),

            '%' => self.single(TokenKind::Percent, start),
            '(' => self.single(TokenKind::LParen, start),
            ')' => self.single(TokenKind::RParen, start),
            '{' => self.single(TokenKind::LBrace, start),
            '}' => self.single(TokenKind::RBrace, start),
            '[' => self.single(TokenKind::LBracket, start),
            ']' => self.single(TokenKind::RBracket, start),
            ';' => self.single(TokenKind::Semicolon, start),
            ',' => self.single(TokenKind::Comma, start),
            '.' => self.single(TokenKind::Dot, start),
            ':' => self.single(TokenKind::Colon, start),
            '@' => self.single(TokenKind::At, start),

            _ => {
                self.advance();
                Token::new(
                    TokenKind::Error,
                    self.span_from(start),
                    format!("Unexpected character: {}", ch),
                )
            }
        }
    }

    // Helper methods

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.current_pos, self.file_id)
    }

    /// Token whose value is the source text it covers.
    fn make(&self, kind: TokenKind, start: usize) -> Token {
        let span = self.span_from(start);
        Token::new(kind, span, self.source[start..self.current_pos].to_string())
    }

    fn single(&mut self, kind: TokenKind, start: usize) -> Token {
        self.advance();
        self.make(kind, start)
    }

    fn read_with_eq(&mut self, plain: TokenKind, with_eq: TokenKind) -> Token {
        let start = self.current_pos;
        self.advance();
        if self.current_char == Some('=') {
            self.advance();
            self.make(with_eq, start)
        } else {
            self.make(plain, start)
        }
    }

    fn read_doubled(&mut self, plain: TokenKind, doubled: TokenKind, ch: char) -> Token {
        let start = self.current_pos;
        self.advance();
        if self.current_char == Some(ch) {
            self.advance();
            self.make(doubled, start)
        } else {
            self.make(plain, start)
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.current_char {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek() == Some('/') {
                        while let Some(ch) = self.current_char {
                            if ch == '\n' {
                                break;
                            }
                            self.advance();
                        }
                    } else if self.peek() == Some('*') {
                        let start = self.current_pos;
                        if !self.skip_multi_line_comment() {
                            return Some(Token::new(
                                TokenKind::Error,
                                self.span_from(start),
                                "Unterminated multi-line comment".to_string(),
                            ));
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        None
    }

    fn skip_multi_line_comment(&mut self) -> bool {
        self.advance(); // Skip '/'
        self.advance(); // Skip '*'

        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance();
                self.advance();
                return true;
            }
            self.advance();
        }
        false
    }

    fn read_string_literal(&mut self, start: usize) -> Token {
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch == '"' {
                self.advance(); // Skip closing quote
                return Token::new(TokenKind::StringLiteral, self.span_from(start), value);
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    let unescaped = match escaped {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        '0' => '\0',
                        _ => escaped,
                    };
                    value.push(unescaped);
                    self.advance();
                }
            } else if ch == '\n' {
                return Token::new(
                    TokenKind::Error,
                    self.span_from(start),
                    "Unterminated string literal".to_string(),
                );
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Token::new(
            TokenKind::Error,
            self.span_from(start),
            "Unterminated string literal".to_string(),
        )
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;
        let mut value = String::new();

        self.read_digits(&mut value);

        // A number right after '.' is a tuple index and never has a fraction
        if !self.after_dot
            && self.current_char == Some('.')
            && self.peek().map_or(false, |c| c.is_ascii_digit())
        {
            value.push('.');
            self.advance();
            self.read_digits(&mut value);
        }

        if !self.after_dot && matches!(self.current_char, Some('e') | Some('E')) {
            value.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.current_char {
                value.push(sign);
                self.advance();
            }
            self.read_digits(&mut value);
        }

        Token::new(TokenKind::NumberLiteral, self.span_from(start), value)
    }

    fn read_digits(&mut self, value: &mut String) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() || ch == '_' {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;
        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword(&value).unwrap_or(TokenKind::Identifier);
        Token::new(kind, self.span_from(start), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        let source = "cls fn sup for use as let mut ret gen if else while with self";
        let tokens = kinds(source);

        assert_eq!(tokens[0], TokenKind::Cls);
        assert_eq!(tokens[1], TokenKind::Fn);
        assert_eq!(tokens[2], TokenKind::Sup);
        assert_eq!(tokens[3], TokenKind::For);
        assert_eq!(tokens[4], TokenKind::Use);
        assert_eq!(tokens[5], TokenKind::As);
        assert_eq!(tokens[6], TokenKind::Let);
        assert_eq!(tokens[7], TokenKind::Mut);
        assert_eq!(tokens[8], TokenKind::Ret);
        assert_eq!(tokens[9], TokenKind::Gen);
        assert_eq!(tokens[10], TokenKind::If);
        assert_eq!(tokens[11], TokenKind::Else);
        assert_eq!(tokens[12], TokenKind::While);
        assert_eq!(tokens[13], TokenKind::With);
        assert_eq!(tokens[14], TokenKind::SelfValue);
        assert_eq!(tokens[15], TokenKind::Eof);
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("123 45.67 1_000 2e3").tokenize();

        assert_eq!(tokens[0].kind, TokenKind::NumberLiteral);
        assert_eq!(tokens[0].value, "123");
        assert_eq!(tokens[1].value, "45.67");
        assert_eq!(tokens[2].value, "1000");
        assert_eq!(tokens[3].value, "2e3");
    }

    #[test]
    fn test_tuple_index_after_dot() {
        let tokens = Lexer::new("t.0.1").tokenize();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();

        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::NumberLiteral,
                TokenKind::Dot,
                TokenKind::NumberLiteral,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].value, "0");
        assert_eq!(tokens[4].value, "1");
    }

    #[test]
    fn test_strings_and_regex() {
        let tokens = Lexer::new(r#""hello\n" r"[a-z]+" right"#).tokenize();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].value, "hello\n");
        assert_eq!(tokens[1].kind, TokenKind::RegexLiteral);
        assert_eq!(tokens[1].value, "[a-z]+");
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].value, "right");
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("+ - * / % += -= == != <= >= && || -> & | ! =");

        assert_eq!(
            tokens,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Arrow,
                TokenKind::Amp,
                TokenKind::Pipe,
                TokenKind::Bang,
                TokenKind::Eq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        let tokens = kinds("let // line\n x /* block */ = 1;");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::NumberLiteral,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let tokens = Lexer::new("\"abc").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].value, "Unterminated string literal");
    }

    #[test]
    fn test_spans_carry_file_id() {
        let tokens = Lexer::with_file_id("fn main", 3).tokenize();
        assert_eq!(tokens[1].span, Span::new(3, 7, 3));
    }

    #[test]
    fn test_underscore_and_decorator() {
        let tokens = kinds("@meta.virtual_method _ _x");
        assert_eq!(tokens[0], TokenKind::At);
        assert_eq!(tokens[1], TokenKind::Identifier);
        assert_eq!(tokens[2], TokenKind::Dot);
        assert_eq!(tokens[3], TokenKind::Identifier);
        assert_eq!(tokens[4], TokenKind::Underscore);
        assert_eq!(tokens[5], TokenKind::Identifier);
    }
}
