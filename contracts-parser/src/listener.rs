//! Rule-completion listeners

use crate::context::RuleContext;

/// Receives every completed rule in post-order
///
/// A parent rule completes only after all of its sub-rules, so a handler can
/// rely on whatever it stored into the children's contexts.
pub trait ParseListener {
    fn exit_rule(&mut self, ctx: &mut RuleContext<'_>);
}

/// Ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl ParseListener for NoopListener {
    fn exit_rule(&mut self, _ctx: &mut RuleContext<'_>) {}
}
