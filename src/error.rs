//! error collects the closed set of failure modes the engine can report.

use std::fmt;

/// Error models a fatal condition raised anywhere in the engine.
///
/// Every variant maps to one diagnosis category from the rule-file and
/// expression grammars. A `None` line means the failure has no meaningful
/// source position (e.g. a missing file).
#[derive(Debug, PartialEq)]
pub enum Error {
    /// FileNotFound denotes a missing or unreadable rule/input file.
    FileNotFound(String),

    /// OutOfMemory denotes an allocation failure.
    OutOfMemory,

    /// InvalidRule denotes a structurally unsound rule, such as one whose
    /// replacement would overflow the engine's window.
    InvalidRule(Option<usize>, String),

    /// InvalidExpression denotes a malformed constraint or `$eval(...)` body.
    InvalidExpression(Option<usize>, String),

    /// InvalidBinding denotes a reference to an unbound placeholder slot.
    InvalidBinding(Option<usize>, u8),

    /// ExpectedPattern denotes a rule that ended without any pattern lines.
    ExpectedPattern(usize),

    /// ExpectedReplacementOrConstraint denotes a rule that ended before a
    /// `replacement:` section was ever seen.
    ExpectedReplacementOrConstraint(usize),

    /// TooManyLines denotes a pattern or replacement body exceeding
    /// `MAX_WINDOW_SIZE` lines.
    TooManyLines(usize),

    /// MultilineConstraint denotes a second non-empty body line under a
    /// `constraints:` header.
    MultilineConstraint(usize),

    /// RewriteLimitExceeded denotes a window position that kept matching
    /// and rewriting past `MAX_REWRITES_PER_POSITION`, most likely a
    /// self-regenerating rule.
    RewriteLimitExceeded(usize),
}

impl fmt::Display for Error {
    /// fmt renders a diagnostic in `line: message` form when a line is
    /// known, else bare `message`. `Error` has no path field — it is
    /// raised from deep inside rule/expression parsing, which has no
    /// notion of which file is open; the caller that does know (the CLI)
    /// prepends the path when it prints.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FileNotFound(path) => write!(f, "{}: file not found", path),
            Error::OutOfMemory => write!(f, "out of memory"),
            Error::InvalidRule(line, msg) => write_with_line(f, *line, msg),
            Error::InvalidExpression(line, msg) => write_with_line(f, *line, msg),
            Error::InvalidBinding(line, slot) => {
                write_with_line(f, *line, &format!("unbound binding ${}", slot))
            }
            Error::ExpectedPattern(line) => {
                write!(f, "{}: expected a \"pattern:\" section", line)
            }
            Error::ExpectedReplacementOrConstraint(line) => write!(
                f,
                "{}: expected a \"replacement:\" or \"constraints:\" section",
                line
            ),
            Error::TooManyLines(line) => {
                write!(f, "{}: too many lines in pattern or replacement", line)
            }
            Error::MultilineConstraint(line) => {
                write!(f, "{}: constraints section must be a single line", line)
            }
            Error::RewriteLimitExceeded(line) => write!(
                f,
                "{}: exceeded the per-position rewrite limit; rule set looks non-terminating",
                line
            ),
        }
    }
}

fn write_with_line(f: &mut fmt::Formatter<'_>, line: Option<usize>, msg: &str) -> fmt::Result {
    match line {
        Some(l) => write!(f, "{}: {}", l, msg),
        None => write!(f, "{}", msg),
    }
}

impl std::error::Error for Error {}

/// Result is the crate-wide alias for fallible operations.
pub type Result<T> = std::result::Result<T, Error>;
