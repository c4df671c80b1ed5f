//! window runs the sliding-window rewrite loop: try every rule against the
//! current window in declaration order, restart from the top on a match,
//! otherwise emit the oldest line and slide forward.
//!
//! Ported from `optimize` in the original implementation. The original has
//! no bound on how many times a single window position may be rewritten
//! before it is emitted; this port adds one (`MAX_REWRITES_PER_POSITION`)
//! so a self-regenerating rule set fails loudly instead of looping forever.

use crate::config::MAX_REWRITES_PER_POSITION;
use crate::error::Error;
use crate::expr::Evaluator;
use crate::interner::Interner;
use crate::io::{LineSink, LineSource};
use crate::pattern::{self, Bindings};
use crate::rule::Rule;
use crate::subst;
use std::collections::VecDeque;

/// WindowEngine owns the mutable state shared across rule applications at a
/// single input file: the interner, the reusable expression evaluator, and
/// (while running) the sliding window itself.
pub struct WindowEngine<'a> {
    rules: &'a [Rule],
    max_window_size: usize,
    interner: &'a mut Interner,
    evaluator: Evaluator,
}

impl<'a> WindowEngine<'a> {
    /// new builds an engine that applies `rules` with a window capacity of
    /// `max_window_size` lines.
    pub fn new(rules: &'a [Rule], max_window_size: usize, interner: &'a mut Interner) -> WindowEngine<'a> {
        WindowEngine {
            rules,
            max_window_size,
            interner,
            evaluator: Evaluator::new(),
        }
    }

    /// run drains `source` through the rewrite loop, writing the final
    /// lines to `sink`.
    pub fn run(&mut self, source: &mut dyn LineSource, sink: &mut dyn LineSink) -> Result<(), Error> {
        let mut window: VecDeque<String> = VecDeque::new();
        self.fill(&mut window, source)?;

        while !window.is_empty() {
            self.rewrite_to_fixed_point(&mut window, source)?;

            sink.write_line(&window[0])?;
            window.pop_front();
            if let Some(line) = source.next_line()? {
                window.push_back(line);
            }
        }

        Ok(())
    }

    fn fill(&mut self, window: &mut VecDeque<String>, source: &mut dyn LineSource) -> Result<(), Error> {
        while window.len() < self.max_window_size {
            match source.next_line()? {
                Some(line) => window.push_back(line),
                None => break,
            }
        }
        Ok(())
    }

    fn rewrite_to_fixed_point(
        &mut self,
        window: &mut VecDeque<String>,
        source: &mut dyn LineSource,
    ) -> Result<(), Error> {
        let mut rewrites_here = 0usize;

        loop {
            let mut applied = false;

            for rule in self.rules {
                if rule.pattern_lines.len() > window.len() {
                    continue;
                }

                let mut bindings = Bindings::new();
                if !match_rule(rule, window, &mut bindings, self.interner) {
                    continue;
                }

                let constraints_ok = match &rule.constraint {
                    Some(expr) => self.evaluator.eval(expr, &bindings, Some(rule.lineno))? != 0,
                    None => true,
                };
                if !constraints_ok {
                    continue;
                }

                rewrites_here += 1;
                if rewrites_here > MAX_REWRITES_PER_POSITION {
                    return Err(Error::RewriteLimitExceeded(rule.lineno));
                }

                self.apply_replacement(rule, &bindings, window)?;
                self.fill(window, source)?;
                applied = true;
                break;
            }

            if !applied {
                break;
            }
        }

        Ok(())
    }

    fn apply_replacement(
        &mut self,
        rule: &Rule,
        bindings: &Bindings,
        window: &mut VecDeque<String>,
    ) -> Result<(), Error> {
        let mut replacement = Vec::with_capacity(rule.replacement_lines.len());
        for template in &rule.replacement_lines {
            replacement.push(subst::expand(
                template,
                bindings,
                self.interner,
                &mut self.evaluator,
                rule.lineno,
            )?);
        }

        for _ in 0..rule.pattern_lines.len() {
            window.pop_front();
        }
        for line in replacement.into_iter().rev() {
            window.push_front(line);
        }

        Ok(())
    }
}

/// match_rule matches every pattern line of `rule` against the
/// corresponding window line, threading capture consistency through one
/// shared [`Bindings`] value.
fn match_rule(rule: &Rule, window: &VecDeque<String>, bindings: &mut Bindings, interner: &mut Interner) -> bool {
    for (pattern_line, window_line) in rule.pattern_lines.iter().zip(window.iter()) {
        if !pattern::match_line(pattern_line, window_line, bindings, interner) {
            return false;
        }
    }
    true
}
