//! Error reporting and recovery
//!
//! The parser delegates every decision about a syntax error to an
//! [`ErrorStrategy`]: whether to report it, how to resynchronize and whether
//! a single missing or extra token can be repaired in place. Strategies see
//! the parser only through the [`Recognizer`] trait so that they can be
//! stacked (see `BuilderErrorStrategy`).

use crate::error::RecognitionError;
use crate::lexer::{Token, TokenKind};
use contracts_core::Position;

/// Tokens at which [`DefaultErrorStrategy::recover`] stops skipping
pub const SYNC_TOKENS: &[TokenKind] = &[
    TokenKind::Semicolon,
    TokenKind::Arrow,
    TokenKind::RParen,
    TokenKind::RBracket,
    TokenKind::Comma,
    TokenKind::Colon,
    TokenKind::Eof,
];

/// The parser as seen by an error strategy
pub trait Recognizer {
    /// Kind of the `k`-th upcoming token, starting at 1
    fn la(&self, k: usize) -> TokenKind;

    fn current_token(&self) -> Token<'_>;

    /// Index of the current token in the stream
    fn index(&self) -> usize;

    /// Advances past the current token unless it is the end of input
    fn consume(&mut self);

    /// Tokens the parser can accept at the current point
    fn expected(&self) -> &[TokenKind];

    fn notify_error(&mut self, position: Position, message: String);

    /// Stops delivering rule events to the parse listener
    fn remove_parse_listener(&mut self);

    fn is_listening(&self) -> bool;
}

pub trait ErrorStrategy {
    /// Called once before parsing starts
    fn reset(&mut self, recognizer: &mut dyn Recognizer);

    /// Repairs a mismatched token in place.
    ///
    /// On success the expected token counts as matched and consumed.
    fn recover_inline(
        &mut self,
        recognizer: &mut dyn Recognizer,
        expected: TokenKind,
    ) -> Result<(), RecognitionError>;

    /// Resynchronizes after `error` was reported
    fn recover(&mut self, recognizer: &mut dyn Recognizer, error: &RecognitionError);

    /// Drops a single extraneous token before a loop or sub-rule decision
    fn sync(&mut self, recognizer: &mut dyn Recognizer);

    fn in_error_recovery_mode(&self) -> bool;

    fn report_error(&mut self, recognizer: &mut dyn Recognizer, error: &RecognitionError);

    /// Called whenever a token was matched successfully
    fn report_match(&mut self, recognizer: &mut dyn Recognizer);
}

/// Reports the first error of a run and resynchronizes on [`SYNC_TOKENS`]
///
/// After an error the strategy stays in recovery mode, suppressing further
/// reports until a token is matched again.
#[derive(Debug, Default, Clone)]
pub struct DefaultErrorStrategy {
    error_recovery_mode: bool,
    last_error_index: Option<usize>,
}

impl DefaultErrorStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin_error_condition(&mut self) {
        self.error_recovery_mode = true;
    }

    fn end_error_condition(&mut self) {
        self.error_recovery_mode = false;
        self.last_error_index = None;
    }

    fn report_unwanted_token(&mut self, recognizer: &mut dyn Recognizer, expecting: &str) {
        if self.error_recovery_mode {
            return;
        }
        self.begin_error_condition();
        let token = recognizer.current_token();
        let position = token.position;
        let message = format!(
            "extraneous input '{}' expecting {}",
            token.display_text(),
            expecting
        );
        recognizer.notify_error(position, message);
    }

    fn report_missing_token(&mut self, recognizer: &mut dyn Recognizer, expected: TokenKind) {
        if self.error_recovery_mode {
            return;
        }
        self.begin_error_condition();
        let token = recognizer.current_token();
        let position = token.position;
        let message = format!("missing {} at '{}'", expected, token.display_text());
        recognizer.notify_error(position, message);
    }
}

impl ErrorStrategy for DefaultErrorStrategy {
    fn reset(&mut self, _recognizer: &mut dyn Recognizer) {
        self.end_error_condition();
    }

    fn recover_inline(
        &mut self,
        recognizer: &mut dyn Recognizer,
        expected: TokenKind,
    ) -> Result<(), RecognitionError> {
        // Single-token deletion
        if recognizer.la(2) == expected {
            self.report_unwanted_token(recognizer, &expected.to_string());
            recognizer.consume();
            self.report_match(recognizer);
            recognizer.consume();
            return Ok(());
        }
        // Single-token insertion
        if expected != TokenKind::Eof && SYNC_TOKENS.contains(&recognizer.la(1)) {
            self.report_missing_token(recognizer, expected);
            return Ok(());
        }
        Err(RecognitionError::mismatched(
            &recognizer.current_token(),
            expected,
        ))
    }

    fn recover(&mut self, recognizer: &mut dyn Recognizer, _error: &RecognitionError) {
        // Failing twice at the same token means nothing was consumed since
        if self.last_error_index == Some(recognizer.index()) && recognizer.la(1) != TokenKind::Eof
        {
            recognizer.consume();
        }
        self.last_error_index = Some(recognizer.index());
        while !SYNC_TOKENS.contains(&recognizer.la(1)) {
            recognizer.consume();
        }
    }

    fn sync(&mut self, recognizer: &mut dyn Recognizer) {
        if self.error_recovery_mode {
            return;
        }
        let current = recognizer.la(1);
        let expected = recognizer.expected();
        if expected.is_empty() || expected.contains(&current) {
            return;
        }
        if expected.contains(&recognizer.la(2)) {
            let expecting = describe_set(expected);
            self.report_unwanted_token(recognizer, &expecting);
            recognizer.consume();
            self.report_match(recognizer);
        }
    }

    fn in_error_recovery_mode(&self) -> bool {
        self.error_recovery_mode
    }

    fn report_error(&mut self, recognizer: &mut dyn Recognizer, error: &RecognitionError) {
        if self.error_recovery_mode {
            return;
        }
        self.begin_error_condition();
        recognizer.notify_error(error.position, error.message.clone());
    }

    fn report_match(&mut self, _recognizer: &mut dyn Recognizer) {
        self.end_error_condition();
    }
}

/// `';'` for one token, `{';', <EOF>}` for several
pub fn describe_set(kinds: &[TokenKind]) -> String {
    match kinds {
        [single] => single.to_string(),
        _ => {
            let items: Vec<&str> = kinds.iter().map(|k| k.describe()).collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    /// Token stream over a fixed source that records errors
    struct Script<'a> {
        tokens: Vec<Token<'a>>,
        index: usize,
        expected: Vec<TokenKind>,
        errors: Vec<String>,
        listening: bool,
    }

    impl<'a> Script<'a> {
        fn new(source: &'a str) -> Self {
            Self {
                tokens: tokenize(source).tokens,
                index: 0,
                expected: Vec::new(),
                errors: Vec::new(),
                listening: true,
            }
        }
    }

    impl Recognizer for Script<'_> {
        fn la(&self, k: usize) -> TokenKind {
            let i = (self.index + k.max(1) - 1).min(self.tokens.len() - 1);
            self.tokens[i].kind
        }

        fn current_token(&self) -> Token<'_> {
            self.tokens[self.index]
        }

        fn index(&self) -> usize {
            self.index
        }

        fn consume(&mut self) {
            if self.index + 1 < self.tokens.len() {
                self.index += 1;
            }
        }

        fn expected(&self) -> &[TokenKind] {
            &self.expected
        }

        fn notify_error(&mut self, _position: Position, message: String) {
            self.errors.push(message);
        }

        fn remove_parse_listener(&mut self) {
            self.listening = false;
        }

        fn is_listening(&self) -> bool {
            self.listening
        }
    }

    #[test]
    fn test_single_token_deletion() {
        let mut script = Script::new("x ) y");
        let mut strategy = DefaultErrorStrategy::new();
        assert!(strategy
            .recover_inline(&mut script, TokenKind::RParen)
            .is_ok());
        assert_eq!(script.errors, vec!["extraneous input 'x' expecting ')'"]);
        assert_eq!(script.la(1), TokenKind::Identifier);
        assert_eq!(script.current_token().text, "y");
        assert!(!strategy.in_error_recovery_mode());
    }

    #[test]
    fn test_single_token_insertion() {
        let mut script = Script::new(";");
        let mut strategy = DefaultErrorStrategy::new();
        assert!(strategy
            .recover_inline(&mut script, TokenKind::RParen)
            .is_ok());
        assert_eq!(script.errors, vec!["missing ')' at ';'"]);
        assert_eq!(script.index(), 0);
    }

    #[test]
    fn test_inline_mismatch_is_returned() {
        let mut script = Script::new("a b c");
        let mut strategy = DefaultErrorStrategy::new();
        let err = strategy
            .recover_inline(&mut script, TokenKind::RParen)
            .unwrap_err();
        assert_eq!(err.message, "mismatched input 'a' expecting ')'");
        assert!(script.errors.is_empty());
    }

    #[test]
    fn test_recovery_mode_suppresses_reports() {
        let mut script = Script::new("a b");
        let mut strategy = DefaultErrorStrategy::new();
        let first = RecognitionError::no_viable_alternative(&script.current_token());
        strategy.report_error(&mut script, &first);
        strategy.report_error(&mut script, &first);
        assert_eq!(script.errors.len(), 1);
        assert!(strategy.in_error_recovery_mode());

        strategy.report_match(&mut script);
        strategy.report_error(&mut script, &first);
        assert_eq!(script.errors.len(), 2);
    }

    #[test]
    fn test_recover_skips_to_sync_token() {
        let mut script = Script::new("a b c ; d )");
        let mut strategy = DefaultErrorStrategy::new();
        let err = RecognitionError::no_viable_alternative(&script.current_token());
        strategy.recover(&mut script, &err);
        assert_eq!(script.la(1), TokenKind::Semicolon);

        // A second failure at the same token must make progress
        strategy.recover(&mut script, &err);
        assert_eq!(script.la(1), TokenKind::Semicolon);
        strategy.recover(&mut script, &err);
        assert_eq!(script.la(1), TokenKind::RParen);
    }

    #[test]
    fn test_sync_deletes_one_extraneous_token() {
        let mut script = Script::new("b ; c");
        script.expected = vec![TokenKind::Semicolon, TokenKind::Eof];
        let mut strategy = DefaultErrorStrategy::new();
        strategy.sync(&mut script);
        assert_eq!(script.la(1), TokenKind::Semicolon);
        assert_eq!(
            script.errors,
            vec!["extraneous input 'b' expecting {';', <EOF>}"]
        );
    }
}
