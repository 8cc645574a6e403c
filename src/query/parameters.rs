//! Parameter collection and anonymization
//!
//! Queries are first built with named `@pN` parameters. The final pass swaps
//! each reference to a known parameter for `?` and orders the parameter list
//! by placeholder occurrence.

use std::collections::HashMap;

use crate::command::Parameter;

/// Hands out parameter names and keeps the parameters of one query
#[derive(Debug, Default)]
pub struct ParameterCollector {
    parameters: Vec<Parameter>,
    next: usize,
}

impl ParameterCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&mut self) -> String {
        self.next += 1;
        format!("@p{}", self.next)
    }

    /// Store a parameter and return its name for use in the SQL text
    pub fn add(&mut self, parameter: Parameter) -> String {
        let name = parameter.name.clone();
        self.parameters.push(parameter);
        name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn into_parameters(self) -> Vec<Parameter> {
        self.parameters
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '#')
}

/// Replace every reference to a known parameter with `?`.
///
/// Returns the rewritten text and the parameters in placeholder order; a
/// parameter referenced twice appears twice. Unknown `@names`, `@@` system
/// variables, string literals and bracketed identifiers are left untouched.
/// Parameters that aren't referenced are dropped.
pub fn make_parameters_anonymous(text: &str, parameters: &[Parameter]) -> (String, Vec<Parameter>) {
    let known: HashMap<String, &Parameter> = parameters
        .iter()
        .map(|p| (p.name.to_lowercase(), p))
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut ordered = Vec::with_capacity(parameters.len());
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '\'' | '[' => {
                let close = if c == '[' { ']' } else { '\'' };
                out.push(c);
                for (_, inner) in chars.by_ref() {
                    out.push(inner);
                    if inner == close {
                        break;
                    }
                }
            }
            '@' if matches!(chars.peek(), Some((_, '@'))) => {
                // system variable such as @@IDENTITY
                out.push('@');
                while let Some(&(_, next)) = chars.peek() {
                    if next == '@' || is_name_char(next) {
                        out.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
            }
            '@' => {
                let mut end = start + 1;
                while let Some(&(i, next)) = chars.peek() {
                    if is_name_char(next) {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let name = &text[start..end];
                match known.get(&name.to_lowercase()) {
                    Some(parameter) => {
                        out.push('?');
                        ordered.push((*parameter).clone());
                    }
                    None => out.push_str(name),
                }
            }
            _ => out.push(c),
        }
    }
    (out, ordered)
}
