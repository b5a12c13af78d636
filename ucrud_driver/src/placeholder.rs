//! Translation of backend neutral `?` placeholders into the syntax of a backend.

use crate::{Backend, PlaceholderStyle};
use std::iter::Peekable;
use std::str::Chars;

/// Rewrite the neutral `?` placeholders in `sql` for the given backend and count them.
///
/// Placeholders inside single quoted literals, double quoted identifiers, backtick quoted
/// identifiers, `--` line comments and `/* */` block comments are left untouched.  On MySQL a
/// backslash escapes the next character inside a quoted string.  Returns the rewritten statement
/// and the number of placeholders found; the n-th placeholder in the result always refers to the
/// n-th parameter.
#[must_use]
pub fn rewrite(sql: &str, backend: Backend) -> (String, usize) {
    let style = backend.placeholder_style();
    let backslash_escapes = backend.backslash_escapes();
    let mut result = String::with_capacity(sql.len());
    let mut param_index = 0usize;
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '?' {
            param_index += 1;
            match style {
                PlaceholderStyle::Positional => result.push('?'),
                PlaceholderStyle::Numbered => {
                    result.push('$');
                    result.push_str(&param_index.to_string());
                }
            }
            continue;
        }

        result.push(ch);
        match ch {
            '\'' | '"' | '`' => {
                copy_quoted(&mut chars, &mut result, ch, backslash_escapes && ch != '`');
            }
            '-' if chars.peek() == Some(&'-') => copy_until(&mut chars, &mut result, "\n"),
            '/' if chars.peek() == Some(&'*') => {
                if let Some(star) = chars.next() {
                    result.push(star);
                }
                copy_until(&mut chars, &mut result, "*/");
            }
            _ => {}
        }
    }
    (result, param_index)
}

fn copy_quoted(chars: &mut Peekable<Chars<'_>>, result: &mut String, quote: char, escapes: bool) {
    while let Some(ch) = chars.next() {
        result.push(ch);
        if escapes && ch == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else if ch == quote {
            return;
        }
    }
}

fn copy_until(chars: &mut Peekable<Chars<'_>>, result: &mut String, terminator: &str) {
    let start = result.len();
    for ch in chars.by_ref() {
        result.push(ch);
        if result[start..].ends_with(terminator) {
            return;
        }
    }
}
