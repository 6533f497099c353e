//! Recursion built from self-application.
//!
//! None of the functions here refer to themselves by name. A recursive
//! function is written as a two-argument "step" whose first argument is
//! the handle it recurses through, and [`fixpoint`] ties the knot by
//! passing a function its own value.

use std::fmt;
use std::rc::Rc;

/// A two-argument function expecting itself as the first argument.
///
/// The type is recursive through the argument position, so it needs a
/// nominal wrapper; `Rc` keeps it cheap to hand around by value.
pub struct SelfApplicable<'f, W, R>(Rc<dyn Fn(&SelfApplicable<'f, W, R>, W) -> R + 'f>);

impl<'f, W: 'f, R: 'f> SelfApplicable<'f, W, R> {
    pub fn new(function: impl Fn(&SelfApplicable<'f, W, R>, W) -> R + 'f) -> Self {
        Self(Rc::new(function))
    }
}

impl<W, R> Clone for SelfApplicable<'_, W, R> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<W, R> fmt::Debug for SelfApplicable<'_, W, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("SelfApplicable(..)")
    }
}

/// Calls `function` with itself as the recursion handle.
pub fn self_apply<W, R>(function: &SelfApplicable<'_, W, R>, argument: W) -> R {
    (function.0)(function, argument)
}

/// Hides the self argument: the result is an ordinary one-argument function.
pub fn bind<'f, W: 'f, R: 'f>(function: SelfApplicable<'f, W, R>) -> impl Fn(W) -> R + 'f {
    move |argument| self_apply(&function, argument)
}

/// Turns a recursive-style step into the function `r` with `r(w) == step(r, w)`.
///
/// The step never sees a [`SelfApplicable`]. The outer self-application
/// produces a handle `me`; the step is given `|v| self_apply(me, v)`,
/// which is `r` again, so callers need not know about self-encoding.
pub fn fixpoint<'f, W: 'f, R: 'f>(
    step: impl Fn(&dyn Fn(W) -> R, W) -> R + 'f,
) -> impl Fn(W) -> R + 'f {
    bind(SelfApplicable::new(
        move |me: &SelfApplicable<'f, W, R>, argument: W| {
            step(&|inner: W| self_apply(me, inner), argument)
        },
    ))
}

fn times(n: u64, rest: u64) -> u64 {
    n.checked_mul(rest)
        .unwrap_or_else(|| panic!("factorial overflows u64 at {n}"))
}

/// Factorial written against an explicit self parameter.
///
/// # Panics
///
/// Panics if `n!` does not fit in a `u64`, i.e. for `n > 20`.
pub fn factorial_with_self(me: &SelfApplicable<'_, u64, u64>, n: u64) -> u64 {
    if n == 0 { 1 } else { times(n, self_apply(me, n - 1)) }
}

/// # Panics
///
/// Panics for `n > 20`, see [`factorial_with_self`].
pub fn factorial(n: u64) -> u64 {
    bind(SelfApplicable::new(factorial_with_self))(n)
}

/// Factorial as a step for [`fixpoint`]: `rec` is the finished function.
///
/// # Panics
///
/// Panics for `n > 20`, see [`factorial_with_self`].
pub fn factorial_step(rec: &dyn Fn(u64) -> u64, n: u64) -> u64 {
    if n == 0 { 1 } else { times(n, rec(n - 1)) }
}
