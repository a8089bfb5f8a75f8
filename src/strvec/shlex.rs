//! Shell-style tokenizer turning one input line into a [StrVec].
//!
//! Recognized syntax: unquoted whitespace separates tokens, single quotes
//! disable every escape, double quotes honor backslash escapes, a backslash
//! outside quotes escapes the next character, and `#` starts a comment that
//! runs to the end of the line.

use super::{StrVec, ATTR_END, ATTR_START};
use crate::attrs::Attrs;
use crate::{ErrorKind, GrammarError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Tokenizer behavior switches.
pub struct LexFlags {
    /// Fail with [ErrorKind::BadMessage] on an unterminated quote instead of
    /// closing the token as-is.
    pub strict: bool,
    /// Append a final empty token when the input ends with unquoted
    /// whitespace (or is empty), to signal that a new token may begin there.
    pub keep_trailing_space: bool,
}

impl LexFlags {
    pub const STRICT: LexFlags = LexFlags {
        strict: true,
        keep_trailing_space: false,
    };

    pub const TRAILING_SPACE: LexFlags = LexFlags {
        strict: false,
        keep_trailing_space: true,
    };
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Space,
    SingleQuote,
    DoubleQuote,
    Backslash,
    Pound,
    Other,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LexState {
    Start,
    InWord,
    Escaping,
    EscapingQuoted,
    InDoubleQuotes,
    InSingleQuotes,
    InComment,
}

fn char_class(c: char) -> CharClass {
    match c {
        '\'' => CharClass::SingleQuote,
        '"' => CharClass::DoubleQuote,
        '\\' => CharClass::Backslash,
        '#' => CharClass::Pound,
        c if c.is_whitespace() => CharClass::Space,
        _ => CharClass::Other,
    }
}

fn push_token(
    vec: &mut StrVec,
    token: &mut String,
    arg_start: usize,
    arg_end: usize,
) -> Result<(), GrammarError> {
    vec.add(std::mem::take(token));
    let mut attrs = Attrs::new();
    attrs.set_value(ATTR_START, arg_start);
    attrs.set_value(ATTR_END, arg_end);
    vec.set_attrs(vec.len() - 1, attrs)
}

/// Tokenize `input` and report the missing quote character, if the line
/// ended inside a quoted run (`None` when the run was opened by a bare
/// backslash).
///
/// Every produced token carries [ATTR_START]/[ATTR_END] byte offsets into
/// `input`; the synthetic trailing token produced under
/// [LexFlags::keep_trailing_space] points at the end of the input.
pub fn sh_lex_str(
    input: &str,
    flags: LexFlags,
) -> Result<(StrVec, Option<char>), GrammarError> {
    let mut vec = StrVec::new();
    let mut state = LexState::Start;
    let mut token = String::new();
    let mut quote: Option<char> = None;
    // An empty input must still report a trailing space so that completion
    // knows a token may begin there.
    let mut trailing_space = true;
    let mut arg_start = 0usize;

    for (i, c) in input.char_indices() {
        let cls = char_class(c);

        match state {
            LexState::Start => {
                match cls {
                    CharClass::Space => {}
                    CharClass::Pound => state = LexState::InComment,
                    CharClass::DoubleQuote => {
                        state = LexState::InDoubleQuotes;
                        quote = Some(c);
                    }
                    CharClass::SingleQuote => {
                        state = LexState::InSingleQuotes;
                        quote = Some(c);
                    }
                    CharClass::Backslash => state = LexState::Escaping,
                    _ => {
                        state = LexState::InWord;
                        token.push(c);
                    }
                }
                trailing_space = cls == CharClass::Space;
                arg_start = i;
            }
            LexState::InWord => match cls {
                CharClass::Space => {
                    quote = None;
                    push_token(&mut vec, &mut token, arg_start, i)?;
                    state = LexState::Start;
                    trailing_space = true;
                    arg_start = i;
                }
                CharClass::DoubleQuote => {
                    state = LexState::InDoubleQuotes;
                    quote = Some(c);
                }
                CharClass::SingleQuote => {
                    state = LexState::InSingleQuotes;
                    quote = Some(c);
                }
                CharClass::Backslash => state = LexState::Escaping,
                _ => token.push(c),
            },
            LexState::Escaping => {
                state = LexState::InWord;
                token.push(c);
            }
            LexState::EscapingQuoted => {
                state = LexState::InDoubleQuotes;
                token.push(c);
            }
            LexState::InDoubleQuotes => match cls {
                CharClass::DoubleQuote => {
                    state = LexState::InWord;
                    quote = None;
                }
                CharClass::Backslash => state = LexState::EscapingQuoted,
                _ => token.push(c),
            },
            LexState::InSingleQuotes => match cls {
                CharClass::SingleQuote => {
                    state = LexState::InWord;
                    quote = None;
                }
                _ => token.push(c),
            },
            LexState::InComment => {
                if c == '\n' || c == '\r' {
                    state = LexState::Start;
                }
            }
        }
    }

    let mut missing_quote = None;
    match state {
        LexState::Start | LexState::InWord | LexState::InComment => {}
        _ => {
            // Unterminated quote or trailing backslash.
            missing_quote = quote;
            if flags.strict {
                return Err(GrammarError::new(
                    ErrorKind::BadMessage,
                    match quote {
                        Some(q) => format!("unterminated {} quote", q),
                        None => String::from("trailing escape character"),
                    },
                ));
            }
            state = LexState::InWord;
        }
    }

    if state == LexState::InWord && !token.is_empty() {
        push_token(&mut vec, &mut token, arg_start, input.len())?;
    } else if trailing_space && flags.keep_trailing_space {
        push_token(&mut vec, &mut token, input.len(), input.len())?;
    }

    Ok((vec, missing_quote))
}
