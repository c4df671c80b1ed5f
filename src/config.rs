//! config collects the engine's fixed-capacity constants.
//!
//! These bounds come from the original implementation's fixed-size arrays
//! (`char window[MAX_WINDOW_SIZE][MAX_LINE_LENGTH]`, `char* bindings[10]`,
//! `Value stack[10]`). They are deliberate per Design Note §9 and are kept
//! as named constants rather than re-derived at runtime.

/// MAX_LINE_LENGTH is the byte cap on any single rule, pattern, or program line.
pub const MAX_LINE_LENGTH: usize = 80;

/// MAX_WINDOW_SIZE is the hard ceiling on the sliding window's line count.
pub const MAX_WINDOW_SIZE: usize = 15;

/// BINDING_SLOTS is the number of `$0`..`$9` placeholder slots.
pub const BINDING_SLOTS: usize = 10;

/// EVAL_STACK_DEPTH is the minimum guaranteed depth of the expression
/// evaluator's operand stack.
pub const EVAL_STACK_DEPTH: usize = 16;

/// MAX_REWRITES_PER_POSITION bounds how many times rules may rewrite the
/// same window position before the engine gives up and reports
/// [`crate::error::Error::RewriteLimitExceeded`].
pub const MAX_REWRITES_PER_POSITION: usize = 1000;
