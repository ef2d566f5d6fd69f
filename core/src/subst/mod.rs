//! String substitution for user-entered path values.
//!
//! Supports `~` home expansion at the start of a string, `${NAME}` and
//! `$NAME` variables (context overrides first, then the process
//! environment, else empty), `#` frame padding and `\` escapes. Each kind can
//! be switched off through [`Substitutions`].

use std::collections::BTreeMap;
use std::env;
use std::ops::BitOr;

use directories::BaseDirs;
use tracing::trace;

/// Set of substitution kinds to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Substitutions(u8);

impl Substitutions {
    pub const NONE: Self = Self(0);
    pub const FRAME: Self = Self(1);
    pub const VARIABLES: Self = Self(1 << 1);
    pub const ESCAPES: Self = Self(1 << 2);
    pub const TILDE: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);
    /// What filesystem path values use: everything except frame padding,
    /// so `#` placeholders in sequence paths survive.
    pub const PATH_DEFAULT: Self = Self(Self::ALL.0 & !Self::FRAME.0);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl Default for Substitutions {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for Substitutions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Variable overrides and the current frame.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionContext {
    variables: BTreeMap<String, String>,
    frame: Option<i64>,
}

impl SubstitutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn set_frame(&mut self, frame: i64) {
        self.frame = Some(frame);
    }

    pub fn frame(&self) -> Option<i64> {
        self.frame
    }

    /// Value of `name`: the override if set, else the environment, else empty.
    pub fn resolve(&self, name: &str) -> String {
        self.get(name)
            .map(str::to_owned)
            .or_else(|| env::var(name).ok())
            .unwrap_or_default()
    }

    pub fn substitute(&self, input: &str, substitutions: Substitutions) -> String {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.char_indices().peekable();

        while let Some((index, ch)) = chars.next() {
            match ch {
                '~' if index == 0 && substitutions.contains(Substitutions::TILDE) => {
                    result.push_str(&home_dir());
                }
                '\\' if substitutions.contains(Substitutions::ESCAPES) => {
                    if let Some((_, escaped)) = chars.next() {
                        result.push(escaped);
                    }
                }
                '$' if substitutions.contains(Substitutions::VARIABLES) => {
                    if chars.next_if(|&(_, next)| next == '{').is_some() {
                        let mut name = String::new();
                        let mut closed = false;
                        for (_, next) in chars.by_ref() {
                            if next == '}' {
                                closed = true;
                                break;
                            }
                            name.push(next);
                        }
                        if closed {
                            result.push_str(&self.resolve(&name));
                        } else {
                            // Unterminated braces stay literal.
                            result.push_str("${");
                            result.push_str(&name);
                        }
                    } else {
                        let mut name = String::new();
                        while let Some((_, next)) =
                            chars.next_if(|&(_, next)| next.is_ascii_alphanumeric() || next == '_')
                        {
                            name.push(next);
                        }
                        if name.is_empty() {
                            result.push('$');
                        } else {
                            result.push_str(&self.resolve(&name));
                        }
                    }
                }
                '#' if substitutions.contains(Substitutions::FRAME) && self.frame.is_some() => {
                    let mut width = 1;
                    while chars.next_if(|&(_, next)| next == '#').is_some() {
                        width += 1;
                    }
                    let frame = self.frame.unwrap_or_default();
                    result.push_str(&format!("{frame:0width$}"));
                }
                _ => result.push(ch),
            }
        }

        trace!(input, output = %result, "substituted");
        result
    }
}

/// Returns `true` if `input` contains anything [`SubstitutionContext::substitute`]
/// could replace.
pub fn has_substitutions(input: &str) -> bool {
    input.starts_with('~') || input.contains(['$', '#', '\\'])
}

fn home_dir() -> String {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_string_lossy().into_owned())
        .unwrap_or_else(|| "~".to_owned())
}
