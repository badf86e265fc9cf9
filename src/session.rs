//! Scoped client lifecycle.

use std::ops::AsyncFnOnce;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use log::{debug, warn};

use crate::{LdsClient, LdsClientBuilder, LdsResult};

/// Builds a client from `builder`, passes it to `f`, and signs out when `f`
/// finishes, whether it succeeded or failed.
///
/// If `builder` carries no credentials, `f` is expected to call
/// [`LdsClient::sign_in`] itself. A client that is not signed in when `f`
/// returns is dropped without a sign-out request.
///
/// When `f` fails, its error is returned even if signing out fails too; the
/// sign-out error is logged. When `f` succeeds, a sign-out failure is
/// returned instead of the value.
///
/// If `f` panics, the client is signed out before the panic resumes.
/// Dropping the returned future before it completes skips the sign-out,
/// since async cleanup cannot run from `Drop`.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> ldsorg_client::LdsResult<()> {
/// use ldsorg_client::{EndpointArgs, LdsClient};
///
/// let households = ldsorg_client::session(
///     LdsClient::builder().username("member").password("secret"),
///     async |client: &mut LdsClient| {
///         client
///             .get_json::<serde_json::Value>("unit-membership", EndpointArgs::new())
///             .await
///     },
/// )
/// .await?;
/// println!("{households}");
/// # Ok(())
/// # }
/// ```
pub async fn session<F, T>(builder: LdsClientBuilder, f: F) -> LdsResult<T>
where
    F: AsyncFnOnce(&mut LdsClient) -> LdsResult<T>,
{
    let mut client = builder.build().await?;
    let outcome = match AssertUnwindSafe(f(&mut client)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => {
            if client.is_signed_in() {
                if let Err(sign_out_error) = client.sign_out().await {
                    warn!("sign-out after panicked session failed: {sign_out_error}");
                }
            }
            panic::resume_unwind(payload);
        }
    };

    if !client.is_signed_in() {
        debug!("session ended without a signed-in client; skipping sign-out");
        return outcome;
    }

    match (outcome, client.sign_out().await) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(sign_out_error)) => Err(sign_out_error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(sign_out_error)) => {
            warn!("sign-out after failed session also failed: {sign_out_error}");
            Err(error)
        }
    }
}
