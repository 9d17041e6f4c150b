use super::{
    error::SyntaxError, unquote, Definition, Import, MathExpression, Operand, Operator, RValue,
    Statement, StatementBody, Token, TokenKind,
};
use crate::error::*;

const DEFINE_EXAMPLE: &str = ":o answer <-- 42 ~chiyo";
const DELETE_EXAMPLE: &str = ":3 answer";
const INSPECT_EXAMPLE: &str = ":< answer";
const IMPORT_EXAMPLE: &str = ":D utils! <-- \"utils.osaka\" ~azumanga";
const MATH_EXAMPLE: &str = ":m 1 + answer";

pub const MODULE_ANNOTATION: &str = "azumanga";

/// Recognizes one fixed-shape statement at a time from a flat token slice.
///
/// Tokens between statements that are not leading operators are skipped. Statements
/// are produced lazily so a caller can execute each one before the next is recognized.
pub struct Parser<'a> {
    tokens: &'a [Token],
    cursor: usize,
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Statement>;
    fn next(&mut self) -> Option<Self::Item> {
        match self.parse() {
            Ok(Some(statement)) => Some(Ok(statement)),
            Ok(None) => None,
            Err(e) => {
                self.cursor = self.tokens.len();
                Some(Err(e))
            }
        }
    }
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, cursor: 0 }
    }

    pub fn parse(&mut self) -> Result<Option<Statement>> {
        while let Some(token) = self.advance() {
            let body = match token.kind() {
                TokenKind::OpDefine => self.define()?,
                TokenKind::OpDelete => StatementBody::Delete(
                    self.expect(TokenKind::Name, "a name after `:3`", DELETE_EXAMPLE)?
                        .text()
                        .to_string(),
                ),
                TokenKind::OpInspect => StatementBody::Inspect(
                    self.expect(TokenKind::Name, "a name after `:<`", INSPECT_EXAMPLE)?
                        .text()
                        .to_string(),
                ),
                TokenKind::OpImport => self.import()?,
                TokenKind::OpMath => StatementBody::Math(self.math()?),
                _ => {
                    log::trace!("skipping stray {}", token.data);
                    continue;
                }
            };
            return Ok(Some(body.locate(token.location)));
        }
        Ok(None)
    }

    fn define(&mut self) -> Result<StatementBody> {
        let name = self.expect(TokenKind::Name, "a name after `:o`", DEFINE_EXAMPLE)?;
        if name.text().ends_with('!') {
            return located_error!(
                SyntaxError::ReservedNamespaceName(name.text().to_string()),
                name.location
            );
        }
        self.expect(TokenKind::Assign, "`<--` after the name", DEFINE_EXAMPLE)?;
        let value = self.rvalue()?;
        let annotation = self.expect(
            TokenKind::Type,
            "a type annotation such as `~chiyo`",
            DEFINE_EXAMPLE,
        )?;
        Ok(StatementBody::Define(Definition {
            name: name.text().to_string(),
            value,
            annotation: Located {
                data: annotation.text()[1..].to_string(),
                location: annotation.location,
            },
        }))
    }

    fn rvalue(&mut self) -> Result<Located<RValue>> {
        let token = match self.peek() {
            Some(token) => token,
            None => {
                return self.missing("a literal, a name or a `:m` expression", DEFINE_EXAMPLE)
            }
        };
        let value = match token.kind() {
            kind if kind.is_literal() => RValue::Literal(token.text().to_string()),
            TokenKind::Name => RValue::Reference(token.text().to_string()),
            TokenKind::OpMath => {
                self.cursor += 1;
                return Ok(RValue::Math(self.math()?).locate(token.location));
            }
            TokenKind::LeftParen => {
                self.cursor += 1;
                self.expect(TokenKind::OpMath, "`:m` after `(`", "(:m 1 + 1)")?;
                let math = self.math()?;
                self.expect(TokenKind::RightParen, "`)` to close the math", "(:m 1 + 1)")?;
                return Ok(RValue::Math(math).locate(token.location));
            }
            _ => {
                return self.mismatch(
                    token,
                    "a literal, a name or a `:m` expression",
                    DEFINE_EXAMPLE,
                )
            }
        };
        self.cursor += 1;
        Ok(value.locate(token.location))
    }

    fn math(&mut self) -> Result<MathExpression> {
        let lhs = self.operand()?;
        let operator = match self.peek() {
            Some(token) => {
                let operator = match token.kind() {
                    TokenKind::Plus => Operator::Add,
                    TokenKind::Minus => Operator::Subtract,
                    TokenKind::Times => Operator::Multiply,
                    TokenKind::Divide => Operator::Divide,
                    _ => {
                        return self.mismatch(token, "one of `+ - * /`", MATH_EXAMPLE);
                    }
                };
                self.cursor += 1;
                Located {
                    data: operator,
                    location: token.location,
                }
            }
            None => return self.missing("one of `+ - * /`", MATH_EXAMPLE),
        };
        let rhs = self.operand()?;
        Ok(MathExpression { lhs, operator, rhs })
    }

    fn operand(&mut self) -> Result<Located<Operand>> {
        let token = match self.peek() {
            Some(token) => token,
            None => return self.missing("a number or a name", MATH_EXAMPLE),
        };
        let operand = match token.kind() {
            TokenKind::LiteralNumber => Operand::Number(token.text().to_string()),
            TokenKind::Name => Operand::Reference(token.text().to_string()),
            _ => return self.mismatch(token, "a number or a name", MATH_EXAMPLE),
        };
        self.cursor += 1;
        Ok(operand.locate(token.location))
    }

    fn import(&mut self) -> Result<StatementBody> {
        let name = self.expect(TokenKind::Name, "a namespace name after `:D`", IMPORT_EXAMPLE)?;
        if !name.text().ends_with('!') {
            return located_error!(
                SyntaxError::NamespaceMarker(name.text().to_string()),
                name.location
            );
        }
        self.expect(TokenKind::Assign, "`<--` after the namespace", IMPORT_EXAMPLE)?;
        let path = self.expect(
            TokenKind::LiteralString,
            "a quoted module path",
            IMPORT_EXAMPLE,
        )?;
        let annotation = self.expect(
            TokenKind::Type,
            "the module annotation `~azumanga`",
            IMPORT_EXAMPLE,
        )?;
        if &annotation.text()[1..] != MODULE_ANNOTATION {
            return located_error!(
                SyntaxError::ModuleAnnotation(annotation.text().to_string()),
                annotation.location
            );
        }
        Ok(StatementBody::Import(Import {
            namespace: name.text().to_string(),
            path: Located {
                data: unquote(path.text()).to_string(),
                location: path.location,
            },
        }))
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.cursor)
    }

    fn expect(
        &mut self,
        kind: TokenKind,
        expected: &'static str,
        example: &'static str,
    ) -> Result<&'a Token> {
        match self.peek() {
            Some(token) if token.kind() == kind => {
                self.cursor += 1;
                Ok(token)
            }
            Some(token) => self.mismatch(token, expected, example),
            None => self.missing(expected, example),
        }
    }

    fn mismatch<T>(&self, token: &Token, expected: &'static str, example: &'static str) -> Result<T> {
        located_error!(
            SyntaxError::Expected {
                expected,
                found: token.data.to_string(),
                example,
            },
            token.location
        )
    }

    fn missing<T>(&self, expected: &'static str, example: &'static str) -> Result<T> {
        located_error!(
            SyntaxError::Expected {
                expected,
                found: "end of input".to_string(),
                example,
            },
            self.tokens.last().and_then(|t| t.location)
        )
    }
}

#[cfg(test)]
use super::tokenize;

#[cfg(test)]
fn parse_all(source: &str) -> Result<Vec<StatementBody>> {
    let tokens = tokenize(source)?;
    Parser::new(&tokens)
        .map(|statement| statement.map(|s| s.data))
        .collect()
}

#[cfg(test)]
fn syntax_error(source: &str) -> SyntaxError {
    match parse_all(source) {
        Err(OsakerError {
            data: ErrorData::Syntax(error),
            ..
        }) => error,
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn empty() -> Result<()> {
    let tokens = Vec::new();
    let mut parser = Parser::new(&tokens);
    assert_eq!(parser.parse(), Ok(None));
    Ok(())
}

#[test]
fn define_literal() -> Result<()> {
    let tokens = tokenize(":o answer <-- 42 ~chiyo")?;
    let statement = Parser::new(&tokens).parse()?;
    assert_eq!(
        statement,
        Some(
            StatementBody::Define(Definition {
                name: "answer".to_string(),
                value: RValue::Literal("42".to_string()).locate(Some([1, 15])),
                annotation: Located {
                    data: "chiyo".to_string(),
                    location: Some([1, 18]),
                },
            })
            .locate(Some([1, 1]))
        )
    );
    Ok(())
}

#[test]
fn define_reference_and_math() -> Result<()> {
    let statements = parse_all(":o b <-- a ~nyan :o c <-- :m a * 2 ~chiyo")?;
    match &statements[..] {
        [StatementBody::Define(reference), StatementBody::Define(math)] => {
            assert_eq!(reference.value.data, RValue::Reference("a".to_string()));
            match &math.value.data {
                RValue::Math(MathExpression { lhs, operator, rhs }) => {
                    assert_eq!(lhs.data, Operand::Reference("a".to_string()));
                    assert_eq!(operator.data, Operator::Multiply);
                    assert_eq!(rhs.data, Operand::Number("2".to_string()));
                }
                other => panic!("expected math, got {:?}", other),
            }
        }
        other => panic!("unexpected statements {:?}", other),
    }
    Ok(())
}

#[test]
fn parenthesized_math() -> Result<()> {
    let statements = parse_all(":o answer <-- (:m 1 + 1) ~chiyo")?;
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0].to_string(),
        ":o answer <-- :m 1 + 1 ~chiyo"
    );
    Ok(())
}

#[test]
fn delete_inspect_import() -> Result<()> {
    let statements = parse_all(":3 x\n:< y\n:D utils! <-- 'lib/utils.osaka' ~azumanga")?;
    assert_eq!(statements[0], StatementBody::Delete("x".to_string()));
    assert_eq!(statements[1], StatementBody::Inspect("y".to_string()));
    assert_eq!(
        statements[2],
        StatementBody::Import(Import {
            namespace: "utils!".to_string(),
            path: Located {
                data: "lib/utils.osaka".to_string(),
                location: Some([3, 15]),
            },
        })
    );
    Ok(())
}

#[test]
fn stray_tokens_are_skipped() -> Result<()> {
    let statements = parse_all("hello 42 + ( :< x ) yes")?;
    assert_eq!(statements, vec![StatementBody::Inspect("x".to_string())]);
    Ok(())
}

#[test]
fn top_level_math() -> Result<()> {
    let statements = parse_all(":m 6 / 3")?;
    assert_eq!(statements[0].to_string(), ":m 6 / 3");
    Ok(())
}

#[test]
fn missing_elements() {
    assert_eq!(
        syntax_error(":o answer 42 ~chiyo"),
        SyntaxError::Expected {
            expected: "`<--` after the name",
            found: "number `42`".to_string(),
            example: DEFINE_EXAMPLE,
        }
    );
    assert_eq!(
        syntax_error(":o answer <-- 42"),
        SyntaxError::Expected {
            expected: "a type annotation such as `~chiyo`",
            found: "end of input".to_string(),
            example: DEFINE_EXAMPLE,
        }
    );
    assert_eq!(
        syntax_error(":3"),
        SyntaxError::Expected {
            expected: "a name after `:3`",
            found: "end of input".to_string(),
            example: DELETE_EXAMPLE,
        }
    );
    assert_eq!(
        syntax_error(":o x <-- :m 1 ( 2 ~chiyo"),
        SyntaxError::Expected {
            expected: "one of `+ - * /`",
            found: "`(` `(`".to_string(),
            example: MATH_EXAMPLE,
        }
    );
}

#[test]
fn import_requires_namespace_marker() {
    assert_eq!(
        syntax_error(":D utils <-- \"utils.osaka\" ~azumanga"),
        SyntaxError::NamespaceMarker("utils".to_string())
    );
    assert_eq!(
        syntax_error(":D utils! <-- \"utils.osaka\" ~nyan"),
        SyntaxError::ModuleAnnotation("~nyan".to_string())
    );
    assert_eq!(
        syntax_error(":o utils! <-- 1 ~chiyo"),
        SyntaxError::ReservedNamespaceName("utils!".to_string())
    );
}

#[test]
fn error_stops_iteration() -> Result<()> {
    let tokens = tokenize(":< a :3 :< b")?;
    let mut parser = Parser::new(&tokens);
    assert!(parser.next().unwrap().is_ok());
    assert!(parser.next().unwrap().is_err());
    assert!(parser.next().is_none());
    Ok(())
}
