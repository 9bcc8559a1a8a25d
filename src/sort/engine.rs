//! Top-down merge sort driven by an asynchronous comparator.
//!
//! Call order is part of the contract: the left half is sorted completely,
//! then the right half, then the two are merged. Callers rely on that order
//! to replay a deterministic decision sequence.

use std::collections::VecDeque;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::info;

use super::progress::estimate_decisions;
use super::types::{Decision, SortSession};

/// Source of pairwise decisions for the engine.
///
/// Implementations may suspend for as long as they like; the engine never
/// has more than one `compare` in flight.
#[async_trait::async_trait]
pub trait Comparator<T: Sync>: Send {
    type Error: Send;

    async fn compare(
        &mut self,
        session: &mut SortSession,
        a: &T,
        b: &T,
    ) -> Result<Decision, Self::Error>;
}

/// Result of one complete sort.
#[derive(Debug, Clone)]
pub struct SortOutcome<T> {
    pub items: Vec<T>,
    pub decisions_made: u64,
    pub decisions_estimated: f64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SortEngine;

impl SortEngine {
    /// Sort `items` with a fresh session.
    ///
    /// A comparator error aborts the sort and is returned as-is.
    pub async fn sort<T, C>(items: Vec<T>, comparator: &mut C) -> Result<SortOutcome<T>, C::Error>
    where
        T: Send + Sync,
        C: Comparator<T>,
    {
        let n = items.len();
        let mut session = SortSession::new(estimate_decisions(n));
        info!(
            records = n,
            decisions_estimated = session.decisions_estimated(),
            "starting sort"
        );

        let items = merge_sort(items, comparator, &mut session).await?;

        info!(
            records = n,
            decisions_made = session.decisions_made(),
            "sort complete"
        );
        Ok(SortOutcome {
            items,
            decisions_made: session.decisions_made(),
            decisions_estimated: session.decisions_estimated(),
        })
    }
}

/// Recursive merge sort against an existing session.
pub fn merge_sort<'a, T, C>(
    mut items: Vec<T>,
    comparator: &'a mut C,
    session: &'a mut SortSession,
) -> BoxFuture<'a, Result<Vec<T>, C::Error>>
where
    T: Send + Sync + 'a,
    C: Comparator<T>,
{
    async move {
        if items.len() <= 1 {
            return Ok(items);
        }

        let right = items.split_off(items.len() / 2);
        let left = merge_sort(items, comparator, session).await?;
        let right = merge_sort(right, comparator, session).await?;

        merge(left, right, comparator, session).await
    }
    .boxed()
}

async fn merge<T, C>(
    left: Vec<T>,
    right: Vec<T>,
    comparator: &mut C,
    session: &mut SortSession,
) -> Result<Vec<T>, C::Error>
where
    T: Send + Sync,
    C: Comparator<T>,
{
    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut left: VecDeque<T> = left.into();
    let mut right: VecDeque<T> = right.into();

    loop {
        let keep_left = match (left.front(), right.front()) {
            (Some(a), Some(b)) => comparator.compare(session, a, b).await?.keeps_left(),
            _ => break,
        };
        let next = if keep_left {
            left.pop_front()
        } else {
            right.pop_front()
        };
        out.extend(next);
    }

    out.extend(left);
    out.extend(right);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingCmp {
        calls: Vec<(i32, i32)>,
    }

    #[async_trait::async_trait]
    impl Comparator<i32> for CountingCmp {
        type Error = std::convert::Infallible;

        async fn compare(
            &mut self,
            session: &mut SortSession,
            a: &i32,
            b: &i32,
        ) -> Result<Decision, Self::Error> {
            self.calls.push((*a, *b));
            session.record_decision();
            Ok(a.cmp(b).into())
        }
    }

    #[tokio::test]
    async fn sorts_and_counts() {
        let mut cmp = CountingCmp { calls: Vec::new() };
        let outcome = SortEngine::sort(vec![4, 2, 1, 3], &mut cmp).await.unwrap();
        assert_eq!(outcome.items, vec![1, 2, 3, 4]);
        assert_eq!(outcome.decisions_made, 5);
        assert_eq!(cmp.calls, vec![(4, 2), (1, 3), (2, 1), (2, 3), (4, 3)]);
    }

    #[tokio::test]
    async fn trivial_inputs_request_nothing() {
        let mut cmp = CountingCmp { calls: Vec::new() };
        let empty = SortEngine::sort(Vec::<i32>::new(), &mut cmp).await.unwrap();
        assert!(empty.items.is_empty());
        let single = SortEngine::sort(vec![7], &mut cmp).await.unwrap();
        assert_eq!(single.items, vec![7]);
        assert!(cmp.calls.is_empty());
    }

    #[tokio::test]
    async fn split_puts_smaller_half_left() {
        let mut cmp = CountingCmp { calls: Vec::new() };
        SortEngine::sort(vec![1, 2, 3], &mut cmp).await.unwrap();
        // [1] | [2, 3]: the right half is sorted before any merge with 1.
        assert_eq!(cmp.calls[0], (2, 3));
    }
}
