//! Ordered strategy evaluation
//!
//! Both the https-then-http negotiation and the structural-then-pattern
//! conversion tiers are ordered lists of strategies tried until one
//! succeeds. [`StrategyList`] makes the two contracts explicit:
//!
//! - evaluation stops at the first success
//! - every strategy is tried at most once, so a list of `n` strategies
//!   makes at most `n` attempts
//!
//! The list is never empty, so an evaluation always has a result.

use std::future::Future;

/// Non-empty ordered list of strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyList<S> {
    first: S,
    rest: Vec<S>,
}

/// Outcome of evaluating a [`StrategyList`]
#[derive(Debug)]
pub struct Evaluation<T, E> {
    /// Result of the last strategy tried
    pub result: Result<T, E>,
    /// Number of strategies tried
    pub attempts: usize,
}

impl<S> StrategyList<S> {
    /// Create a list with a single strategy
    pub fn new(first: S) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    /// Append a fallback strategy
    pub fn then(mut self, next: S) -> Self {
        self.rest.push(next);
        self
    }

    /// The preferred strategy
    pub fn first(&self) -> &S {
        &self.first
    }

    /// Strategies in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    /// Try each strategy in order until one succeeds
    pub fn evaluate<T, E, F>(self, mut attempt: F) -> Evaluation<T, E>
    where
        F: FnMut(S) -> Result<T, E>,
    {
        let mut attempts = 1;
        let mut result = attempt(self.first);
        for strategy in self.rest {
            if result.is_ok() {
                break;
            }
            attempts += 1;
            result = attempt(strategy);
        }
        Evaluation { result, attempts }
    }

    /// Async variant of [`evaluate`](Self::evaluate)
    pub async fn evaluate_async<T, E, F, Fut>(self, mut attempt: F) -> Evaluation<T, E>
    where
        F: FnMut(S) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts = 1;
        let mut result = attempt(self.first).await;
        for strategy in self.rest {
            if result.is_ok() {
                break;
            }
            attempts += 1;
            result = attempt(strategy).await;
        }
        Evaluation { result, attempts }
    }
}
