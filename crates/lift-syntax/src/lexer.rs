use lift_core::TextRange;

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

impl Token {
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.range.start..self.range.end]
    }
}

/// Tokenize `input` into a lossless stream (trivia included).
///
/// Unknown characters and unterminated literals become [`SyntaxKind::Error`]
/// tokens; the parser reports them.
pub fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth_char(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn bump_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn next_kind(&mut self) -> Option<SyntaxKind> {
        let c = self.bump_char()?;
        let kind = match c {
            c if c.is_whitespace() => {
                self.bump_while(char::is_whitespace);
                SyntaxKind::Whitespace
            }
            '/' if self.peek_char() == Some('/') => {
                self.bump_while(|c| c != '\n');
                SyntaxKind::LineComment
            }
            '/' if self.peek_char() == Some('*') => {
                self.bump_char();
                match self.rest().find("*/") {
                    Some(idx) => {
                        self.pos += idx + 2;
                        SyntaxKind::BlockComment
                    }
                    None => {
                        self.pos = self.input.len();
                        SyntaxKind::Error
                    }
                }
            }
            c if is_ident_start(c) => {
                let start = self.pos - c.len_utf8();
                self.bump_while(is_ident_continue);
                SyntaxKind::from_keyword(&self.input[start..self.pos])
                    .unwrap_or(SyntaxKind::Identifier)
            }
            c if c.is_ascii_digit() => {
                self.bump_while(|c| c.is_ascii_alphanumeric() || c == '_');
                if self.peek_char() == Some('.')
                    && self.peek_nth_char(1).is_some_and(|c| c.is_ascii_digit())
                {
                    self.bump_char();
                    self.bump_while(|c| c.is_ascii_alphanumeric() || c == '_');
                }
                SyntaxKind::NumberLiteral
            }
            '.' if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => {
                self.bump_while(|c| c.is_ascii_alphanumeric() || c == '_');
                SyntaxKind::NumberLiteral
            }
            '"' | '\'' | '`' => self.string_literal(c),
            '(' => SyntaxKind::LParen,
            ')' => SyntaxKind::RParen,
            '{' => SyntaxKind::LBrace,
            '}' => SyntaxKind::RBrace,
            '[' => SyntaxKind::LBracket,
            ']' => SyntaxKind::RBracket,
            ';' => SyntaxKind::Semicolon,
            ',' => SyntaxKind::Comma,
            '.' => SyntaxKind::Dot,
            ':' => SyntaxKind::Colon,
            '?' => SyntaxKind::Question,
            '+' => self.operator(&[("+", SyntaxKind::PlusPlus), ("=", SyntaxKind::PlusEq)], SyntaxKind::Plus),
            '-' => self.operator(
                &[("-", SyntaxKind::MinusMinus), ("=", SyntaxKind::MinusEq)],
                SyntaxKind::Minus,
            ),
            '*' => self.operator(&[("=", SyntaxKind::StarEq)], SyntaxKind::Star),
            '/' => self.operator(&[("=", SyntaxKind::SlashEq)], SyntaxKind::Slash),
            '%' => self.operator(&[("=", SyntaxKind::PercentEq)], SyntaxKind::Percent),
            '!' => self.operator(
                &[("==", SyntaxKind::BangEqEq), ("=", SyntaxKind::BangEq)],
                SyntaxKind::Bang,
            ),
            '=' => self.operator(
                &[
                    ("==", SyntaxKind::EqEqEq),
                    ("=", SyntaxKind::EqEq),
                    (">", SyntaxKind::Arrow),
                ],
                SyntaxKind::Eq,
            ),
            '<' => self.operator(&[("=", SyntaxKind::LessEq)], SyntaxKind::Less),
            '>' => self.operator(&[("=", SyntaxKind::GreaterEq)], SyntaxKind::Greater),
            '&' => self.operator(&[("&", SyntaxKind::AmpAmp)], SyntaxKind::Error),
            '|' => self.operator(&[("|", SyntaxKind::PipePipe)], SyntaxKind::Error),
            _ => SyntaxKind::Error,
        };
        Some(kind)
    }

    /// Longest-match on the characters following an operator's first char.
    fn operator(&mut self, suffixes: &[(&str, SyntaxKind)], single: SyntaxKind) -> SyntaxKind {
        for (suffix, kind) in suffixes {
            if self.rest().starts_with(suffix) {
                self.pos += suffix.len();
                return *kind;
            }
        }
        single
    }

    fn string_literal(&mut self, quote: char) -> SyntaxKind {
        while let Some(c) = self.bump_char() {
            match c {
                '\\' => {
                    self.bump_char();
                }
                c if c == quote => return SyntaxKind::StringLiteral,
                '\n' if quote != '`' => return SyntaxKind::Error,
                _ => {}
            }
        }
        SyntaxKind::Error
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let start = self.pos;
        let kind = self.next_kind()?;
        Some(Token {
            kind,
            range: TextRange::new(start, self.pos),
        })
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        lex(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_keywords_and_operators() {
        assert_eq!(
            kinds("let x=a&&b;"),
            vec![
                SyntaxKind::LetKw,
                SyntaxKind::Whitespace,
                SyntaxKind::Identifier,
                SyntaxKind::Eq,
                SyntaxKind::Identifier,
                SyntaxKind::AmpAmp,
                SyntaxKind::Identifier,
                SyntaxKind::Semicolon,
            ]
        );
    }

    #[test]
    fn prefers_longest_operator() {
        assert_eq!(
            kinds("a===b!==c=>d"),
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::EqEqEq,
                SyntaxKind::Identifier,
                SyntaxKind::BangEqEq,
                SyntaxKind::Identifier,
                SyntaxKind::Arrow,
                SyntaxKind::Identifier,
            ]
        );
    }

    #[test]
    fn token_ranges_cover_the_input() {
        let input = "/* c */ x // tail\n\"s\\\"q\" 1.5";
        let tokens = lex(input);
        let rebuilt: String = tokens.iter().map(|t| t.text(input)).collect();
        assert_eq!(rebuilt, input);
        assert!(tokens.iter().all(|t| t.kind != SyntaxKind::Error));
    }

    #[test]
    fn unterminated_string_is_an_error_token() {
        assert_eq!(kinds("'abc"), vec![SyntaxKind::Error]);
    }

    #[test]
    fn of_is_an_identifier() {
        assert_eq!(kinds("of"), vec![SyntaxKind::Identifier]);
    }
}
