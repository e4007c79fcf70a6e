//! Check functions and the combinators that build them.

mod builders;
mod check;

pub use builders::{
    assert_check, identity_check, sequence_check, void_check, SequenceKind,
    DEFAULT_ASSERT_MESSAGE, GENERIC_CHECK_MESSAGE,
};
pub use check::{Check, CheckFailure, CheckFn};
