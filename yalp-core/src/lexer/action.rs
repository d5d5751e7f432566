//! The callback type backing function-rules and the `error` rule.

use crate::error::YalpResult;
use crate::token::Token;

use super::LexerInstance;

/// A lexer rule action: given the running instance (for state
/// switching, `skip`, `newline`) and the token matched at this
/// position, returns the token to emit, or `None` to consume the match
/// silently (state-switch and comment-skipping rules work this way).
pub type LexAction<C> =
    Box<dyn Fn(&mut LexerInstance<'_, C>, Token) -> YalpResult<Option<Token>, C> + Send + Sync>;
