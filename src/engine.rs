//! engine ties rule loading and the window loop together behind a single
//! entry point, owning the interner for the lifetime of one run.
//!
//! Ported from `main`'s wiring in the original implementation, restructured
//! as an object: nothing here is global state, so two engines can run
//! concurrently without interfering (`spec.md` §5, Design Note on
//! concurrency).

use crate::error::Error;
use crate::interner::Interner;
use crate::io::{LineSink, LineSource};
use crate::rule::RuleParser;
use crate::window::WindowEngine;

/// Engine owns the string interner used across rule loading and
/// evaluation, and runs the rewrite loop for exactly one input.
pub struct Engine {
    interner: Interner,
}

impl Engine {
    /// new creates an engine with a fresh, empty interner.
    pub fn new() -> Engine {
        Engine {
            interner: Interner::new(),
        }
    }

    /// load_rules reads and compiles every rule from `rule_source`,
    /// returning the compiled rules and the window capacity they require.
    pub fn load_rules(&mut self, rule_source: &mut dyn LineSource) -> Result<(Vec<crate::rule::Rule>, usize), Error> {
        let mut parser = RuleParser::new(&mut self.interner);
        while let Some(line) = rule_source.next_line()? {
            parser.feed_line(&line)?;
        }
        parser.finish()
    }

    /// optimize runs the sliding-window rewrite loop for `rules` over
    /// `source`, writing the optimized output to `sink`.
    pub fn optimize(
        &mut self,
        rules: &[crate::rule::Rule],
        window_size: usize,
        source: &mut dyn LineSource,
        sink: &mut dyn LineSink,
    ) -> Result<(), Error> {
        let mut window_engine = WindowEngine::new(rules, window_size, &mut self.interner);
        window_engine.run(source, sink)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{InMemorySink, InMemorySource};

    #[test]
    fn loads_and_runs_end_to_end() {
        let mut engine = Engine::new();
        let mut rule_source = InMemorySource::new(vec!["pattern:", "ld a, 0", "replacement:", "xor a"]);
        let (rules, window_size) = engine.load_rules(&mut rule_source).unwrap();

        let mut source = InMemorySource::new(vec!["ld a, 0", "ret"]);
        let mut sink = InMemorySink::default();
        engine.optimize(&rules, window_size, &mut source, &mut sink).unwrap();

        assert_eq!(sink.lines, vec!["xor a".to_string(), "ret".to_string()]);
    }
}
