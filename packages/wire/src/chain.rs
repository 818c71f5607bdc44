use crate::error::Error;
use crate::transport::Transport;
use crate::types::Timestamp;

/// Write each `(url, body)` pair through `driver`, one after another.
///
/// Stops at the first failure and hands its error to `callback`. Otherwise
/// `callback` receives the timestamp of the last write, or `None` when there
/// was nothing to write. Writes happen in the order `entries` yields them.
pub fn set_chain<T, I>(
    driver: &T,
    entries: I,
    content_type: &str,
    token: Option<&str>,
    callback: impl FnOnce(Result<Option<Timestamp>, Error>),
) where
    T: Transport + ?Sized,
    I: IntoIterator<Item = (String, String)>,
{
    let mut last = None;
    for (url, body) in entries {
        match driver.set(&url, &body, content_type, token) {
            Ok(timestamp) => last = Some(timestamp),
            Err(error) => return callback(Err(error.into())),
        }
    }
    callback(Ok(last))
}
