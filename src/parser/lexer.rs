use std::fmt;

use super::error::LexicalError;
use crate::error::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    OpDefine,
    OpDelete,
    OpInspect,
    OpMath,
    OpImport,
    Name,
    Assign,
    Type,
    LiteralNumber,
    LiteralString,
    LiteralBool,
    Plus,
    Minus,
    Times,
    Divide,
    LeftParen,
    RightParen,
}

impl TokenKind {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::LiteralNumber | TokenKind::LiteralString | TokenKind::LiteralBool
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::OpDefine => "define operator `:o`",
            TokenKind::OpDelete => "delete operator `:3`",
            TokenKind::OpInspect => "inspect operator `:<`",
            TokenKind::OpMath => "math operator `:m`",
            TokenKind::OpImport => "import operator `:D`",
            TokenKind::Name => "name",
            TokenKind::Assign => "`<--`",
            TokenKind::Type => "type annotation",
            TokenKind::LiteralNumber => "number",
            TokenKind::LiteralString => "string",
            TokenKind::LiteralBool => "boolean",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Times => "`*`",
            TokenKind::Divide => "`/`",
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenData {
    pub kind: TokenKind,
    pub text: String,
}

impl ToLocated for TokenData {}

pub type Token = Located<TokenData>;

impl Token {
    pub fn kind(&self) -> TokenKind {
        self.data.kind
    }

    pub fn text(&self) -> &str {
        &self.data.text
    }

    pub fn line(&self) -> u32 {
        self.location.map_or(0, |[line, _]| line)
    }

    pub fn column(&self) -> u32 {
        self.location.map_or(0, |[_, column]| column)
    }
}

impl fmt::Display for TokenData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.text)
    }
}

pub const TRUE_WORDS: [&str; 3] = ["yes", "yaa", "ya"];
pub const FALSE_WORDS: [&str; 3] = ["no", "nuh", "nuhuh"];

// longer words first so that `yaa` is never cut to `ya`
const BOOLEAN_WORDS: [&str; 6] = ["yes", "yaa", "ya", "nuhuh", "nuh", "no"];

enum Pattern {
    Exact(&'static str),
    Type,
    String,
    Number,
    Boolean,
    Name,
}

/// Tried in this order at every position; the first pattern that matches wins,
/// even when a later one would match a longer prefix.
const PATTERNS: [(TokenKind, Pattern); 17] = [
    (TokenKind::OpDefine, Pattern::Exact(":o")),
    (TokenKind::OpDelete, Pattern::Exact(":3")),
    (TokenKind::OpInspect, Pattern::Exact(":<")),
    (TokenKind::OpMath, Pattern::Exact(":m")),
    (TokenKind::OpImport, Pattern::Exact(":D")),
    (TokenKind::Assign, Pattern::Exact("<--")),
    (TokenKind::Type, Pattern::Type),
    (TokenKind::LiteralString, Pattern::String),
    (TokenKind::LiteralNumber, Pattern::Number),
    (TokenKind::LiteralBool, Pattern::Boolean),
    (TokenKind::Name, Pattern::Name),
    (TokenKind::Plus, Pattern::Exact("+")),
    (TokenKind::Minus, Pattern::Exact("-")),
    (TokenKind::Times, Pattern::Exact("*")),
    (TokenKind::Divide, Pattern::Exact("/")),
    (TokenKind::LeftParen, Pattern::Exact("(")),
    (TokenKind::RightParen, Pattern::Exact(")")),
];

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn identifier_len(input: &str) -> Option<usize> {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, c)) if is_identifier_start(c) => (),
        _ => return None,
    }
    Some(
        chars
            .find(|(_, c)| !is_identifier_continue(*c))
            .map_or(input.len(), |(index, _)| index),
    )
}

impl Pattern {
    /// Byte length of the match at the start of `input`.
    fn match_len(&self, input: &str) -> Option<usize> {
        match self {
            Pattern::Exact(sigil) => {
                if input.starts_with(sigil) {
                    Some(sigil.len())
                } else {
                    None
                }
            }
            Pattern::Type => {
                let rest = input.strip_prefix('~')?;
                identifier_len(rest).map(|len| len + 1)
            }
            Pattern::String => {
                let quote = input.chars().next().filter(|c| *c == '"' || *c == '\'')?;
                let body = &input[1..];
                let end = body.find(|c: char| c == quote || c == '\n')?;
                if body[end..].starts_with(quote) {
                    Some(end + 2)
                } else {
                    None
                }
            }
            Pattern::Number => {
                let sign = if input.starts_with('-') { 1 } else { 0 };
                let digits = input[sign..]
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(input.len() - sign);
                if digits == 0 {
                    None
                } else {
                    Some(sign + digits)
                }
            }
            Pattern::Boolean => BOOLEAN_WORDS.iter().find_map(|word| {
                let rest = input.strip_prefix(word)?;
                match rest.chars().next() {
                    Some(c) if is_identifier_continue(c) || c == '!' => None,
                    _ => Some(word.len()),
                }
            }),
            Pattern::Name => {
                // segments joined by `!`: `x`, `utils!`, `utils!x`, `a!b!`
                let mut len = 0;
                loop {
                    len += identifier_len(&input[len..])?;
                    if !input[len..].starts_with('!') {
                        break Some(len);
                    }
                    len += 1;
                    match input[len..].chars().next() {
                        Some(c) if is_identifier_start(c) => continue,
                        _ => break Some(len),
                    }
                }
            }
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    column: u32,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
            failed: false,
        }
    }

    fn location(&self) -> Option<Location> {
        Some([self.line, self.column])
    }

    fn skip_blank(&mut self) {
        let source = self.source;
        for c in source[self.position..].chars() {
            match c {
                ' ' | '\t' | '\r' => self.column += 1,
                '\n' => {
                    self.line += 1;
                    self.column = 1;
                }
                _ => break,
            }
            self.position += c.len_utf8();
        }
    }

    fn unmatched(&self, c: char) -> LexicalError {
        match c {
            '"' | '\'' => LexicalError::UnterminatedString(c),
            '~' => LexicalError::EmptyTypeAnnotation,
            _ => LexicalError::UnexpectedCharacter(c),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.skip_blank();
        let source = self.source;
        let rest = &source[self.position..];
        let current = rest.chars().next()?;
        let location = self.location();
        let matched = PATTERNS
            .iter()
            .find_map(|(kind, pattern)| pattern.match_len(rest).map(|len| (*kind, len)));
        Some(match matched {
            Some((kind, len)) => {
                let text = &rest[..len];
                self.position += len;
                self.column += text.chars().count() as u32;
                Ok(TokenData {
                    kind,
                    text: text.to_string(),
                }
                .locate(location))
            }
            None => {
                self.failed = true;
                located_error!(self.unmatched(current), location)
            }
        })
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let tokens = Lexer::new(source).collect::<Result<Vec<_>>>()?;
    log::trace!("tokenized {} tokens", tokens.len());
    Ok(tokens)
}

#[cfg(test)]
fn kinds(source: &str) -> Result<Vec<TokenKind>> {
    Ok(tokenize(source)?.iter().map(Token::kind).collect())
}

#[test]
fn empty() -> Result<()> {
    assert_eq!(tokenize("")?, vec![]);
    assert_eq!(tokenize(" \t\n  ")?, vec![]);
    Ok(())
}

#[test]
fn define_statement() -> Result<()> {
    let tokens = tokenize(":o answer <-- 42 ~chiyo")?;
    assert_eq!(
        tokens,
        vec![
            TokenData {
                kind: TokenKind::OpDefine,
                text: ":o".to_string()
            }
            .locate(Some([1, 1])),
            TokenData {
                kind: TokenKind::Name,
                text: "answer".to_string()
            }
            .locate(Some([1, 4])),
            TokenData {
                kind: TokenKind::Assign,
                text: "<--".to_string()
            }
            .locate(Some([1, 11])),
            TokenData {
                kind: TokenKind::LiteralNumber,
                text: "42".to_string()
            }
            .locate(Some([1, 15])),
            TokenData {
                kind: TokenKind::Type,
                text: "~chiyo".to_string()
            }
            .locate(Some([1, 18])),
        ]
    );
    Ok(())
}

#[test]
fn sigils() -> Result<()> {
    assert_eq!(
        kinds(":o :3 :< :m :D <--")?,
        vec![
            TokenKind::OpDefine,
            TokenKind::OpDelete,
            TokenKind::OpInspect,
            TokenKind::OpMath,
            TokenKind::OpImport,
            TokenKind::Assign,
        ]
    );
    Ok(())
}

#[test]
fn strings() -> Result<()> {
    let tokens = tokenize(r#""hello world" 'single' "it's""#)?;
    let texts: Vec<_> = tokens.iter().map(Token::text).collect();
    assert_eq!(texts, vec![r#""hello world""#, "'single'", r#""it's""#]);
    assert!(tokens.iter().all(|t| t.kind() == TokenKind::LiteralString));
    Ok(())
}

#[test]
fn numbers_and_minus() -> Result<()> {
    assert_eq!(
        kinds("-5 1 - 1 1 -1")?,
        vec![
            TokenKind::LiteralNumber,
            TokenKind::LiteralNumber,
            TokenKind::Minus,
            TokenKind::LiteralNumber,
            TokenKind::LiteralNumber,
            TokenKind::LiteralNumber,
        ]
    );
    assert_eq!(
        kinds("+ * / ( )")?,
        vec![
            TokenKind::Plus,
            TokenKind::Times,
            TokenKind::Divide,
            TokenKind::LeftParen,
            TokenKind::RightParen,
        ]
    );
    Ok(())
}

#[test]
fn boolean_words_need_boundary() -> Result<()> {
    let tokens = tokenize("yes yaa ya no nuh nuhuh yesterday nope no!")?;
    let summary: Vec<_> = tokens.iter().map(|t| (t.kind(), t.text())).collect();
    assert_eq!(
        summary,
        vec![
            (TokenKind::LiteralBool, "yes"),
            (TokenKind::LiteralBool, "yaa"),
            (TokenKind::LiteralBool, "ya"),
            (TokenKind::LiteralBool, "no"),
            (TokenKind::LiteralBool, "nuh"),
            (TokenKind::LiteralBool, "nuhuh"),
            (TokenKind::Name, "yesterday"),
            (TokenKind::Name, "nope"),
            (TokenKind::Name, "no!"),
        ]
    );
    Ok(())
}

#[test]
fn namespace_names() -> Result<()> {
    let tokens = tokenize("utils! utils!greeting a!b! x")?;
    let texts: Vec<_> = tokens.iter().map(Token::text).collect();
    assert_eq!(texts, vec!["utils!", "utils!greeting", "a!b!", "x"]);
    assert!(tokens.iter().all(|t| t.kind() == TokenKind::Name));
    Ok(())
}

#[test]
fn first_match_wins() -> Result<()> {
    // `:o` is tried before the name pattern, so `:oops` is an operator and a name
    assert_eq!(kinds(":oops")?, vec![TokenKind::OpDefine, TokenKind::Name]);
    // numbers are tried before names, so `12abc` splits
    assert_eq!(kinds("12abc")?, vec![TokenKind::LiteralNumber, TokenKind::Name]);
    Ok(())
}

#[test]
fn line_and_column() -> Result<()> {
    let tokens = tokenize(":o x <-- 1 ~chiyo\n  :< x")?;
    let inspect = &tokens[5];
    assert_eq!(inspect.kind(), TokenKind::OpInspect);
    assert_eq!((inspect.line(), inspect.column()), (2, 3));
    assert_eq!((tokens[6].line(), tokens[6].column()), (2, 6));
    Ok(())
}

#[test]
fn carriage_returns_are_blank() -> Result<()> {
    let tokens = tokenize(":o x <-- 1 ~chiyo\r\n:< x\r\n")?;
    assert_eq!(
        tokens.iter().map(Token::kind).collect::<Vec<_>>(),
        vec![
            TokenKind::OpDefine,
            TokenKind::Name,
            TokenKind::Assign,
            TokenKind::LiteralNumber,
            TokenKind::Type,
            TokenKind::OpInspect,
            TokenKind::Name,
        ]
    );
    assert_eq!(tokens[4].text(), "~chiyo");
    assert_eq!((tokens[5].line(), tokens[5].column()), (2, 1));
    assert_eq!((tokens[6].line(), tokens[6].column()), (2, 4));
    Ok(())
}

#[test]
fn unknown_character() {
    let error = tokenize(":o x <-- 1 ~chiyo\n:< @x").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::LexError);
    assert_eq!(
        error,
        ErrorData::from(LexicalError::UnexpectedCharacter('@')).locate(Some([2, 4]))
    );
}

#[test]
fn unterminated_string() {
    let error = tokenize(r#":o x <-- "oops ~nyan"#).unwrap_err();
    assert_eq!(
        error.data,
        ErrorData::from(LexicalError::UnterminatedString('"'))
    );
    let error = tokenize("\"line\nbreak\"").unwrap_err();
    assert_eq!(error.location, Some([1, 1]));
}

#[test]
fn bare_tilde() {
    let error = tokenize("~ chiyo").unwrap_err();
    assert_eq!(error.data, ErrorData::from(LexicalError::EmptyTypeAnnotation));
}
