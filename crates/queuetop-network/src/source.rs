use std::future::Future;

use futures::future::try_join_all;
use queuetop_protocol::StatusRow;

use crate::SourceError;

/// A daemon that can report its queue table.
///
/// `fetch` is called once per poll tick. Implementations may keep a
/// connection open between calls; any error ends the session.
pub trait StatusSource: Send {
    /// Label used in logs and error messages.
    fn host(&self) -> &str;

    /// Fetch the current status rows.
    fn fetch(&mut self) -> impl Future<Output = Result<Vec<StatusRow>, SourceError>> + Send;
}

/// Fetch from every source concurrently.
///
/// Results come back in source order. The first failure wins and the
/// remaining in-flight fetches are dropped.
pub async fn fetch_all<S: StatusSource>(
    sources: &mut [S],
) -> Result<Vec<Vec<StatusRow>>, SourceError> {
    try_join_all(sources.iter_mut().map(|source| source.fetch())).await
}
