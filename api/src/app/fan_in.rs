//! Ranked fan-in of concurrent fetches
//!
//! Fetches of one stage run concurrently, but when more than one fails the
//! reported error must not depend on arrival order. Each helper ranks its
//! inputs: an error is returned as soon as every higher ranked input has
//! succeeded, and whatever is still in flight is dropped.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};

/// Run both futures concurrently; `first` outranks `second`
///
/// An error from `first` is returned immediately and `second` is dropped.
/// An error from `second` is held until `first` resolves, since a failure of
/// `first` takes precedence.
pub async fn join_ranked<A, B, E, FA, FB>(first: FA, second: FB) -> Result<(A, B), E>
where
    FA: Future<Output = Result<A, E>>,
    FB: Future<Output = Result<B, E>>,
{
    tokio::pin!(first);
    tokio::pin!(second);

    let mut second_out: Option<Result<B, E>> = None;

    let a = loop {
        tokio::select! {
            biased;
            res = &mut first => break res?,
            res = &mut second, if second_out.is_none() => second_out = Some(res),
        }
    };

    let b = match second_out {
        Some(res) => res?,
        None => second.await?,
    };

    Ok((a, b))
}

/// Run all futures concurrently; earlier items outrank later ones
///
/// Results keep input order. The returned error belongs to the lowest
/// indexed failure, reported once every item before it has succeeded.
pub async fn join_all_ranked<T, E, F, I>(futures: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    let mut pending: FuturesUnordered<_> = futures
        .into_iter()
        .enumerate()
        .map(|(index, fut)| async move { (index, fut.await) })
        .collect();

    let mut slots: Vec<Option<Result<T, E>>> = (0..pending.len()).map(|_| None).collect();
    let mut resolved = Vec::with_capacity(slots.len());

    while let Some((index, res)) = pending.next().await {
        slots[index] = Some(res);

        while let Some(slot) = slots.get_mut(resolved.len()) {
            match slot.take() {
                Some(Ok(value)) => resolved.push(value),
                Some(Err(e)) => return Err(e),
                None => break,
            }
        }
    }

    Ok(resolved)
}
