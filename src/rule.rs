//! rule parses the `pattern:`/`constraints:`/`replacement:` rule-file
//! grammar into a sequence of [`Rule`] values.
//!
//! Ported from `parse_rules` in the original implementation, including its
//! `do { ... } while (state == START)` re-dispatch: finishing one rule (on
//! seeing a fresh `pattern:` header, or end of file) can hand the very same
//! physical line to the next state without consuming another line of input.

use crate::config::MAX_WINDOW_SIZE;
use crate::error::Error;
use crate::expr::{compile, CompiledExpr};
use crate::interner::Interner;

/// Rule is one compiled pattern/constraint/replacement triple.
#[derive(Debug)]
pub struct Rule {
    pub lineno: usize,
    pub pattern_lines: Vec<String>,
    pub replacement_lines: Vec<String>,
    pub constraint: Option<CompiledExpr>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    Start,
    InPattern,
    InConstraint,
    InReplacement,
}

/// RuleParser consumes a rule file one physical line at a time and produces
/// the finished [`Rule`] list.
pub struct RuleParser<'a> {
    state: State,
    current_lineno: usize,
    rule_lineno: usize,
    pattern_lines: Vec<String>,
    replacement_lines: Vec<String>,
    replacement_seen: bool,
    constraint: Option<CompiledExpr>,
    rules: Vec<Rule>,
    interner: &'a mut Interner,
}

impl<'a> RuleParser<'a> {
    /// new creates a parser that interns replacement/constraint literals
    /// through `interner`.
    pub fn new(interner: &'a mut Interner) -> RuleParser<'a> {
        RuleParser {
            state: State::Start,
            current_lineno: 0,
            rule_lineno: 0,
            pattern_lines: Vec::new(),
            replacement_lines: Vec::new(),
            replacement_seen: false,
            constraint: None,
            rules: Vec::new(),
            interner,
        }
    }

    /// feed_line advances the parser by exactly one physical line. Blank
    /// lines and `#`-comment lines are skipped without changing state.
    pub fn feed_line(&mut self, raw_line: &str) -> Result<(), Error> {
        self.current_lineno += 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        loop {
            self.step(raw_line, trimmed)?;
            if self.state != State::Start {
                break;
            }
        }
        Ok(())
    }

    fn step(&mut self, raw_line: &str, trimmed: &str) -> Result<(), Error> {
        match self.state {
            State::Start => {
                if trimmed != "pattern:" {
                    return Err(Error::ExpectedReplacementOrConstraint(self.current_lineno));
                }
                self.state = State::InPattern;
                self.rule_lineno = self.current_lineno;
            }

            State::InPattern => {
                if trimmed == "replacement:" {
                    self.state = State::InReplacement;
                    self.replacement_seen = true;
                } else if trimmed == "constraints:" {
                    self.state = State::InConstraint;
                }

                if self.state == State::InPattern {
                    self.push_pattern_line(raw_line)?;
                }
            }

            State::InConstraint => {
                if trimmed == "replacement:" {
                    self.state = State::InReplacement;
                    self.replacement_seen = true;
                } else {
                    if self.constraint.is_some() {
                        return Err(Error::MultilineConstraint(self.current_lineno));
                    }
                    self.constraint = Some(compile(trimmed, Some(self.current_lineno), self.interner)?);
                }
            }

            State::InReplacement => {
                if trimmed == "pattern:" {
                    self.finish_rule()?;
                    self.state = State::Start;
                } else {
                    self.push_replacement_line(raw_line, trimmed)?;
                }
            }
        }
        Ok(())
    }

    fn push_pattern_line(&mut self, raw_line: &str) -> Result<(), Error> {
        if self.pattern_lines.len() >= MAX_WINDOW_SIZE {
            return Err(Error::TooManyLines(self.current_lineno));
        }
        self.pattern_lines.push(raw_line.to_string());
        Ok(())
    }

    fn push_replacement_line(&mut self, raw_line: &str, trimmed: &str) -> Result<(), Error> {
        if self.replacement_lines.len() >= MAX_WINDOW_SIZE {
            return Err(Error::TooManyLines(self.current_lineno));
        }
        // A body line equal to "-" is an explicit empty replacement line,
        // not an omitted one: it still occupies one row of `replacement_lines`.
        if trimmed == "-" {
            self.replacement_lines.push(String::new());
        } else {
            self.replacement_lines.push(raw_line.to_string());
        }
        Ok(())
    }

    fn finish_rule(&mut self) -> Result<(), Error> {
        if !self.replacement_seen {
            return Err(Error::ExpectedReplacementOrConstraint(self.current_lineno));
        }
        if self.pattern_lines.is_empty() {
            return Err(Error::ExpectedPattern(self.current_lineno));
        }

        let window_needed = self.pattern_lines.len().max(self.replacement_lines.len());
        if window_needed > MAX_WINDOW_SIZE {
            return Err(Error::InvalidRule(
                Some(self.rule_lineno),
                "replacement would overflow the maximum window size".to_string(),
            ));
        }

        self.rules.push(Rule {
            lineno: self.rule_lineno,
            pattern_lines: std::mem::take(&mut self.pattern_lines),
            replacement_lines: std::mem::take(&mut self.replacement_lines),
            constraint: self.constraint.take(),
        });
        self.replacement_seen = false;
        Ok(())
    }

    /// finish flushes any in-progress rule (the file may end mid-`replacement:`
    /// with no trailing `pattern:` to trigger the usual close) and returns the
    /// completed rule list alongside the window capacity it requires.
    pub fn finish(mut self) -> Result<(Vec<Rule>, usize), Error> {
        if !self.pattern_lines.is_empty() || self.replacement_seen {
            self.finish_rule()?;
        }

        let window_size = self
            .rules
            .iter()
            .map(|r| r.pattern_lines.len().max(r.replacement_lines.len()))
            .max()
            .unwrap_or(1)
            .max(1);

        Ok((self.rules, window_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<(Vec<Rule>, usize), Error> {
        let mut interner = Interner::new();
        let mut parser = RuleParser::new(&mut interner);
        for line in src.lines() {
            parser.feed_line(line)?;
        }
        parser.finish()
    }

    #[test]
    fn parses_single_rule() {
        let (rules, window) = parse("pattern:\nld a, 0\nreplacement:\nxor a\n").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].pattern_lines, vec!["ld a, 0"]);
        assert_eq!(rules[0].replacement_lines, vec!["xor a"]);
        assert!(rules[0].constraint.is_none());
        assert_eq!(window, 1);
    }

    #[test]
    fn parses_constraint_and_next_rule() {
        let src = "pattern:\nld a, $1\nconstraints:\nisnumeric $1\nreplacement:\nxor a\npattern:\nnop\nreplacement:\n-\n";
        let (rules, _) = parse(src).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules[0].constraint.is_some());
        assert_eq!(rules[1].replacement_lines, vec![""]);
    }

    #[test]
    fn rejects_missing_pattern() {
        let err = parse("pattern:\nreplacement:\nxor a\n").unwrap_err();
        assert!(matches!(err, Error::ExpectedPattern(_)));
    }

    #[test]
    fn rejects_multiline_constraint() {
        let src = "pattern:\nnop\nconstraints:\nisnumeric $0\nstartswith $0 \"a\"\nreplacement:\nnop\n";
        let err = parse(src).unwrap_err();
        assert!(matches!(err, Error::MultilineConstraint(_)));
    }

    #[test]
    fn rejects_garbage_before_pattern() {
        let err = parse("not a header\n").unwrap_err();
        assert!(matches!(err, Error::ExpectedReplacementOrConstraint(_)));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let src = "# a comment\n\npattern:\nnop\n\nreplacement:\nnop\n";
        let (rules, _) = parse(src).unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn fixture_sweep() {
        use std::path::Path;
        use walkdir::WalkDir;

        let fixtures_path = Path::new("fixtures");

        for entry in WalkDir::new(fixtures_path.join("rules-valid")).sort_by_file_name() {
            let entry = entry.unwrap();
            if entry.path().is_dir() {
                continue;
            }
            let src = std::fs::read_to_string(entry.path()).unwrap();
            assert!(
                parse(&src).is_ok(),
                "expected {} to parse",
                entry.path().display()
            );
        }

        for entry in WalkDir::new(fixtures_path.join("rules-invalid")).sort_by_file_name() {
            let entry = entry.unwrap();
            if entry.path().is_dir() {
                continue;
            }
            let src = std::fs::read_to_string(entry.path()).unwrap();
            assert!(
                parse(&src).is_err(),
                "expected {} to be rejected",
                entry.path().display()
            );
        }
    }
}
