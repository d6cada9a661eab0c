// src/core/protocol/message.rs

//! Implements the immutable `Message` value representing one protocol line,
//! together with its parser and builder.
//!
//! Wire grammar: `command (SP key=value)*`. The command matches `[a-z0-9_-]+`,
//! keys match `[a-zA-Z0-9_-]+`, and values contain no whitespace. A value may
//! contain further `=` characters; the first `=` in a token separates key from
//! value.

use crate::core::GameError;
use std::collections::BTreeMap;
use std::fmt;

/// The conventional parameter used by clients to correlate request/response.
pub const SEQ_PARAM: &str = "seq";

/// An immutable, parsed command line.
///
/// Equality and hashing are structural over the command and the parameter
/// map. Parameter ordering is semantically insignificant; the `BTreeMap`
/// merely makes `to_line()` deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message {
    command: String,
    params: BTreeMap<String, String>,
}

impl Message {
    /// Parses a raw line into a `Message` in a single pass.
    ///
    /// Fails if the line is blank, the command token is invalid, a parameter
    /// token is not `key=value` shaped, or a key fails the key pattern.
    pub fn parse(line: &str) -> Result<Self, GameError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(GameError::Parse("command line is empty".to_string()));
        }

        let mut tokens = trimmed.split_whitespace();
        let Some(command) = tokens.next() else {
            return Err(GameError::Parse("command line is empty".to_string()));
        };
        if !is_valid_command(command) {
            return Err(GameError::Parse(format!("invalid command name: {command}")));
        }

        let mut params = BTreeMap::new();
        for token in tokens {
            let Some(eq) = token.find('=') else {
                return Err(GameError::Parse(format!(
                    "malformed parameter '{token}', expected key=value"
                )));
            };
            if eq == 0 || eq == token.len() - 1 {
                return Err(GameError::Parse(format!(
                    "malformed parameter '{token}', expected key=value"
                )));
            }
            let (key, value) = (&token[..eq], &token[eq + 1..]);
            if !is_valid_param_key(key) {
                return Err(GameError::Parse(format!("invalid parameter name: {key}")));
            }
            params.insert(key.to_string(), value.to_string());
        }

        Ok(Self {
            command: command.to_string(),
            params,
        })
    }

    /// Creates a builder for the given command, failing fast if the command
    /// token is invalid.
    pub fn builder(command: impl Into<String>) -> Result<MessageBuilder, GameError> {
        let command = command.into();
        if !is_valid_command(&command) {
            return Err(GameError::Parse(format!("invalid command name: {command}")));
        }
        Ok(MessageBuilder {
            command,
            params: BTreeMap::new(),
        })
    }

    /// Builds the reserved `error code=<CODE> message=<text> [seq=<n>]`
    /// response. Whitespace in any value is replaced with `_` so the rendered
    /// line always stays parseable.
    pub fn error(code: &str, message: &str, seq: Option<&str>) -> Self {
        let mut params = BTreeMap::new();
        params.insert("code".to_string(), sanitize_value(code));
        params.insert("message".to_string(), sanitize_value(message));
        if let Some(seq) = seq {
            params.insert(SEQ_PARAM.to_string(), sanitize_value(seq));
        }
        Self {
            command: "error".to_string(),
            params,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Returns the value of the given parameter, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the value of the given parameter, or the default if absent.
    pub fn param_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.param(key).unwrap_or(default)
    }

    pub fn has_param(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Shorthand for the conventional `seq` correlation parameter.
    pub fn seq(&self) -> Option<&str> {
        self.param(SEQ_PARAM)
    }

    /// Renders the message back to its wire form: `command k1=v1 k2=v2`.
    /// Re-parsing the rendered line reproduces an equal `Message`.
    pub fn to_line(&self) -> String {
        let mut line = self.command.clone();
        for (key, value) in &self.params {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// A mutable accumulator producing an immutable `Message` on `build()`.
///
/// All invariants are validated at accumulation time, so `build()` itself
/// cannot fail.
#[derive(Debug)]
pub struct MessageBuilder {
    command: String,
    params: BTreeMap<String, String>,
}

impl MessageBuilder {
    /// Adds a parameter. Fails if the key is invalid or the value is empty or
    /// contains whitespace.
    pub fn param(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, GameError> {
        let key = key.into();
        let value = value.into();
        if !is_valid_param_key(&key) {
            return Err(GameError::Parse(format!("invalid parameter name: {key}")));
        }
        if value.is_empty() {
            return Err(GameError::Parse(format!(
                "parameter value for '{key}' is empty"
            )));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(GameError::Parse(format!(
                "parameter value contains whitespace: {value}"
            )));
        }
        self.params.insert(key, value);
        Ok(self)
    }

    /// Sets the `seq` correlation parameter.
    pub fn seq(self, seq: impl Into<String>) -> Result<Self, GameError> {
        self.param(SEQ_PARAM, seq)
    }

    /// Echoes an optional request `seq` into the response, a no-op when the
    /// request carried none.
    pub fn seq_opt(self, seq: Option<&str>) -> Result<Self, GameError> {
        match seq {
            Some(seq) => self.seq(seq),
            None => Ok(self),
        }
    }

    /// Produces the immutable message.
    pub fn build(self) -> Message {
        Message {
            command: self.command,
            params: self.params,
        }
    }
}

/// Command tokens are lowercase: `[a-z0-9_-]+`.
pub(crate) fn is_valid_command(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-'))
}

/// Parameter keys allow mixed case: `[a-zA-Z0-9_-]+`.
pub(crate) fn is_valid_param_key(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn sanitize_value(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}
