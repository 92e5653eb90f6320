use std::future::Future;
use std::pin::Pin;

use cloudhub_protocol::CloudAccount;

use crate::EngineError;

/// Boxed future returned by [`ListingRefresher::refresh`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'a>>;

/// Re-fetches an account's file listing after a transfer lands in it.
///
/// The engine only calls this for the account whose listing is currently
/// shown (see [`TransferEngine::set_active_destination`](crate::TransferEngine::set_active_destination)).
pub trait ListingRefresher: Send + Sync {
    fn refresh<'a>(&'a self, account: &'a CloudAccount) -> RefreshFuture<'a>;
}
