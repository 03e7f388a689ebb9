// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt template substitution.
//!
//! Templates use shell-style variables: `$NAME` or `${NAME}`, with `$$`
//! producing a literal `$`. Unknown variables are left verbatim so a
//! template mentioning `$PATH` in prose survives rendering unchanged.

use std::collections::HashMap;

/// Variables available to system prompt templates.
#[derive(Debug, Clone, Default)]
pub struct PromptVars {
    pub user_name: String,
    pub ai_name: String,
    pub user_description: String,
}

impl PromptVars {
    fn as_map(&self) -> HashMap<&'static str, &str> {
        HashMap::from([
            ("USER_NAME", self.user_name.as_str()),
            ("AI_NAME", self.ai_name.as_str()),
            ("USER_DESCRIPTION", self.user_description.as_str()),
        ])
    }
}

/// Renders a template against the given variables.
pub fn render_prompt(template: &str, vars: &PromptVars) -> String {
    render_template(template, &vars.as_map())
}

/// Substitutes `$NAME` and `${NAME}` occurrences from `vars`.
///
/// `$$` escapes to a literal `$`. Variables not present in `vars` are
/// emitted verbatim, including the `$`. A `${` with no closing brace is
/// also emitted verbatim.
pub fn render_template(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;

    while let Some(dollar) = template[i..].find('$').map(|off| i + off) {
        out.push_str(&template[i..dollar]);
        let next = dollar + 1;

        match bytes.get(next) {
            Some(b'$') => {
                out.push('$');
                i = next + 1;
            }
            Some(b'{') => match template[next + 1..].find('}') {
                Some(end) => {
                    let close = next + 1 + end;
                    let name = &template[next + 1..close];
                    match lookup(vars, name) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&template[dollar..=close]),
                    }
                    i = close + 1;
                }
                None => {
                    out.push('$');
                    i = next;
                }
            },
            Some(&b) if b.is_ascii_alphabetic() || b == b'_' => {
                let end = template[next..]
                    .find(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
                    .map(|off| next + off)
                    .unwrap_or(template.len());
                let name = &template[next..end];
                match lookup(vars, name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&template[dollar..end]),
                }
                i = end;
            }
            _ => {
                out.push('$');
                i = next;
            }
        }
    }

    out.push_str(&template[i..]);
    out
}

fn lookup<'a>(vars: &'a HashMap<&str, &str>, name: &str) -> Option<&'a str> {
    if name.is_empty() {
        return None;
    }
    vars.get(name).copied()
}
