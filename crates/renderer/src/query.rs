//! The SQL subset understood by the built-in data sources.
//!
//! ```text
//! SELECT * FROM <table> [WHERE <field> <op> <literal> [AND ...]] [;]
//! ```
//!
//! Operators are `=`, `!=`, `<>`, `<`, `<=`, `>` and `>=`. Literals are
//! single-quoted strings (`''` escapes a quote) or numbers. Keywords are
//! case-insensitive; identifiers may be double-quoted.

use serde_json::{Map as JsonObject, Value};
use tiles_common::{TilesError, TilesResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Number(f64),
}

/// A single `field op literal` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub value: Literal,
}

/// A parsed query: one table and a conjunction of predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Text(String),
    Number(f64),
    Star,
    Op(Operator),
    Semicolon,
}

impl Query {
    pub fn parse(sql: &str) -> TilesResult<Self> {
        let tokens = tokenize(sql)?;
        let mut parser = Parser { tokens, pos: 0 };

        parser.keyword("SELECT")?;
        match parser.next() {
            Some(Token::Star) => {}
            _ => return Err(syntax("only SELECT * is supported")),
        }
        parser.keyword("FROM")?;
        let table = parser.identifier()?;

        let mut conditions = Vec::new();
        if parser.peek_keyword("WHERE") {
            parser.pos += 1;
            loop {
                conditions.push(parser.condition()?);
                if !parser.peek_keyword("AND") {
                    break;
                }
                parser.pos += 1;
            }
        }

        if parser.peek() == Some(&Token::Semicolon) {
            parser.pos += 1;
        }
        if let Some(token) = parser.peek() {
            return Err(syntax(&format!("unexpected trailing input {:?}", token)));
        }

        Ok(Self { table, conditions })
    }

    /// True when every predicate holds for `properties`.
    pub fn matches(&self, properties: &JsonObject<String, Value>) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(properties))
    }
}

impl Condition {
    fn matches(&self, properties: &JsonObject<String, Value>) -> bool {
        let Some(value) = properties.get(&self.field) else {
            return false;
        };
        let ordering = match (&self.value, value) {
            (_, Value::Null) => return false,
            (Literal::Number(expected), Value::Number(actual)) => {
                actual.as_f64().and_then(|a| a.partial_cmp(expected))
            }
            (Literal::Number(expected), Value::String(actual)) => actual
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|a| a.partial_cmp(expected)),
            (Literal::Number(_), _) => None,
            (Literal::Text(expected), Value::String(actual)) => {
                Some(actual.as_str().cmp(expected.as_str()))
            }
            (Literal::Text(expected), other) => Some(other.to_string().cmp(expected)),
        };
        let Some(ordering) = ordering else {
            return false;
        };

        use std::cmp::Ordering::*;
        match self.op {
            Operator::Eq => ordering == Equal,
            Operator::Ne => ordering != Equal,
            Operator::Lt => ordering == Less,
            Operator::Le => ordering != Greater,
            Operator::Gt => ordering == Greater,
            Operator::Ge => ordering != Less,
        }
    }
}

fn syntax(message: &str) -> TilesError {
    TilesError::DataSourceError(format!("invalid query: {}", message))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(word)) if word.eq_ignore_ascii_case(keyword))
    }

    fn keyword(&mut self, keyword: &str) -> TilesResult<()> {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            Ok(())
        } else {
            Err(syntax(&format!("expected {}", keyword)))
        }
    }

    fn identifier(&mut self) -> TilesResult<String> {
        match self.next() {
            Some(Token::Word(word)) | Some(Token::Quoted(word)) => Ok(word),
            _ => Err(syntax("expected identifier")),
        }
    }

    fn condition(&mut self) -> TilesResult<Condition> {
        let field = self.identifier()?;
        let op = match self.next() {
            Some(Token::Op(op)) => op,
            _ => return Err(syntax("expected comparison operator")),
        };
        let value = match self.next() {
            Some(Token::Text(text)) => Literal::Text(text),
            Some(Token::Number(number)) => Literal::Number(number),
            _ => return Err(syntax("expected literal")),
        };
        Ok(Condition { field, op, value })
    }
}

fn tokenize(sql: &str) -> TilesResult<Vec<Token>> {
    let chars: Vec<char> = sql.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            ';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Op(Operator::Eq));
                i += 1;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Op(Operator::Ne));
                i += 2;
            }
            '<' | '>' => {
                let next = chars.get(i + 1).copied();
                let (op, width) = match (c, next) {
                    ('<', Some('=')) => (Operator::Le, 2),
                    ('<', Some('>')) => (Operator::Ne, 2),
                    ('<', _) => (Operator::Lt, 1),
                    ('>', Some('=')) => (Operator::Ge, 2),
                    _ => (Operator::Gt, 1),
                };
                tokens.push(Token::Op(op));
                i += width;
            }
            '\'' | '"' => {
                let (text, end) = quoted(&chars, i)?;
                tokens.push(if c == '\'' {
                    Token::Text(text)
                } else {
                    Token::Quoted(text)
                });
                i = end;
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let start = i;
                i += 1;
                while i < chars.len()
                    && (chars[i].is_ascii_digit()
                        || matches!(chars[i], '.' | 'e' | 'E')
                        || (matches!(chars[i], '+' | '-') && matches!(chars[i - 1], 'e' | 'E')))
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number = text
                    .parse()
                    .map_err(|_| syntax(&format!("bad number {:?}", text)))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '.')) {
                    i += 1;
                }
                tokens.push(Token::Word(chars[start..i].iter().collect()));
            }
            other => return Err(syntax(&format!("unexpected character {:?}", other))),
        }
    }

    Ok(tokens)
}

/// Read a quoted run starting at `start`; a doubled quote is an escaped quote.
fn quoted(chars: &[char], start: usize) -> TilesResult<(String, usize)> {
    let quote = chars[start];
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                text.push(quote);
                i += 2;
                continue;
            }
            return Ok((text, i + 1));
        }
        text.push(chars[i]);
        i += 1;
    }
    Err(syntax("unterminated quote"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> JsonObject<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_parse_plain_select() {
        let query = Query::parse("select * from roads;").unwrap();
        assert_eq!(query.table, "roads");
        assert!(query.conditions.is_empty());
    }

    #[test]
    fn test_parse_conditions() {
        let query =
            Query::parse("SELECT * FROM \"land use\" WHERE kind = 'park' AND area >= 1e3").unwrap();
        assert_eq!(query.table, "land use");
        assert_eq!(
            query.conditions,
            vec![
                Condition {
                    field: "kind".into(),
                    op: Operator::Eq,
                    value: Literal::Text("park".into()),
                },
                Condition {
                    field: "area".into(),
                    op: Operator::Ge,
                    value: Literal::Number(1000.0),
                },
            ]
        );
    }

    #[test]
    fn test_rejects_unsupported_sql() {
        for sql in [
            "",
            "SELECT name FROM roads",
            "SELECT * roads",
            "SELECT * FROM roads WHERE",
            "SELECT * FROM roads WHERE a = 'open",
            "SELECT * FROM roads ORDER BY name",
            "DELETE FROM roads",
        ] {
            let err = Query::parse(sql).unwrap_err();
            assert_eq!(err.status(), tiles_common::Status::DataSourceError, "{}", sql);
        }
    }

    #[test]
    fn test_matching() {
        let query = Query::parse("SELECT * FROM t WHERE kind <> 'river' AND lanes > 1").unwrap();
        assert!(query.matches(&props(json!({"kind": "road", "lanes": 2}))));
        assert!(query.matches(&props(json!({"kind": "road", "lanes": "4"}))));
        assert!(!query.matches(&props(json!({"kind": "river", "lanes": 2}))));
        assert!(!query.matches(&props(json!({"kind": "road", "lanes": 1}))));
        assert!(!query.matches(&props(json!({"kind": "road"}))));
        assert!(!query.matches(&props(json!({"kind": "road", "lanes": null}))));
    }

    #[test]
    fn test_escaped_quote() {
        let query = Query::parse("SELECT * FROM t WHERE name = 'O''Brien St'").unwrap();
        assert!(query.matches(&props(json!({"name": "O'Brien St"}))));
    }
}
