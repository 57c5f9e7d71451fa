//! Typed token consumers.
//!
//! A grammar can call `p.consume("Identifier")` directly, or declare a consumer
//! once and write `p.tokens::<JsTokens>().identifier()`:
//!
//! ```text
//! token_consumer! {
//!     pub struct JsTokens {
//!         identifier => "Identifier",
//!         semicolon => "Semicolon",
//!         regex => "RegularExpressionLiteral" @ LexicalGoal::RegExp,
//!     }
//! }
//! ```

use crate::Parser;

/// Adapter giving a grammar named methods for its tokens.
pub trait TokenConsumer<'p, 'a: 'p> {
    fn attach(parser: &'p mut Parser<'a>) -> Self;

    fn parser(&mut self) -> &mut Parser<'a>;
}

impl<'a> Parser<'a> {
    /// Borrow this parser through the token consumer `T`.
    pub fn tokens<'p, T: TokenConsumer<'p, 'a>>(&'p mut self) -> T {
        T::attach(self)
    }
}

/// Declare a [`TokenConsumer`] with one method per token. A method may name
/// the lexical goal its token is read under with `@ goal`.
#[macro_export]
macro_rules! token_consumer {
    (@goal) => {
        $crate::LexicalGoal::Div
    };
    (@goal $goal:expr) => {
        $goal
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($method:ident => $token:literal $(@ $goal:expr)?),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name<'p, 'a> {
            parser: &'p mut $crate::Parser<'a>,
        }

        impl<'p, 'a: 'p> $crate::TokenConsumer<'p, 'a> for $name<'p, 'a> {
            fn attach(parser: &'p mut $crate::Parser<'a>) -> Self {
                $name { parser }
            }

            fn parser(&mut self) -> &mut $crate::Parser<'a> {
                &mut *self.parser
            }
        }

        impl<'p, 'a: 'p> $name<'p, 'a> {
            $(
                pub fn $method(&mut self) -> bool {
                    self.parser
                        .consume_with_goal($token, $crate::token_consumer!(@goal $($goal)?))
                }
            )*
        }
    };
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
