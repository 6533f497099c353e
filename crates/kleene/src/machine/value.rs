use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Runtime value. Texts are `Arc`-backed so stack copies are O(1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Text(Arc<str>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
        }
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Int(number)
    }
}

impl From<bool> for Value {
    fn from(boolean: bool) -> Self {
        Value::Bool(boolean)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.into())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text.into())
    }
}

/// Renders the value as the literal that pushes it.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(number) => write!(f, "{number}"),
            Value::Bool(boolean) => write!(f, "{boolean}"),
            Value::Text(text) => write!(f, "\"{}\"", escape(text)),
        }
    }
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for character in text.chars() {
        match character {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Inverse of [`escape`]. `raw` is the literal body without its quotes.
pub fn unescape(raw: &str) -> Result<String, String> {
    let mut text = String::with_capacity(raw.len());
    let mut characters = raw.chars();
    while let Some(character) = characters.next() {
        if character != '\\' {
            text.push(character);
            continue;
        }
        match characters.next() {
            Some('"') => text.push('"'),
            Some('\\') => text.push('\\'),
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some(other) => return Err(format!("Unknown escape sequence '\\{other}'")),
            None => return Err("Unterminated escape sequence".to_owned()),
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_and_unescape_are_inverse() {
        let text = "say \"hi\"\\ then\nnewline\tand tab";
        assert_eq!(unescape(&escape(text)).as_deref(), Ok(text));
    }

    #[test]
    fn unknown_escape_is_rejected() {
        assert!(unescape("bad \\q").is_err());
        assert!(unescape("dangling \\").is_err());
    }

    #[test]
    fn display_renders_literals() {
        assert_eq!(Value::from(-7).to_string(), "-7");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from("a \"b\"").to_string(), r#""a \"b\"""#);
    }

    #[test]
    fn json_is_untagged() {
        let values = vec![Value::from(120), Value::from(false), Value::from("dup")];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[120,false,"dup"]"#);
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
