//! Parameterized SQL statements
//!
//! A statement is SQL text plus an ordered parameter vector. Scalars only
//! ever travel through the parameter vector; the text contains `$n`
//! placeholders and schema-resolved identifiers, never user input.

use crate::ast::Value;

/// One parameterized SELECT, ready for a session to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Accumulates bound parameters, handing out `$n` placeholders.
#[derive(Debug, Default)]
pub(crate) struct ParamBinder {
    params: Vec<Value>,
}

impl ParamBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a value and returns its placeholder.
    pub fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    /// Splices a hook fragment: each `?` marker becomes the next `$n`
    /// placeholder as its parameter is appended.
    pub fn splice_fragment(&mut self, sql: &str, params: Vec<Value>) -> String {
        let mut spliced = String::with_capacity(sql.len());
        let mut values = params.into_iter();
        for c in sql.chars() {
            if c == '?' {
                match values.next() {
                    Some(value) => spliced.push_str(&self.bind(value)),
                    None => spliced.push(c),
                }
            } else {
                spliced.push(c);
            }
        }
        spliced
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}
