use std::io;

use tracing::{debug, info, warn};

use crate::http::connection::Dispatcher;
use crate::http::response::StatusCode;
use crate::http::router::HandlerFuture;
use crate::storage::Volume;

/// Creates `path`, making its parent directory once if the first attempt
/// fails.
async fn create_file<V: Volume>(volume: &V, path: &str) -> io::Result<V::File> {
    let first = match volume.create(path).await {
        Ok(file) => return Ok(file),
        Err(e) => e,
    };

    match path.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => {
            volume.create_dir(parent).await?;
            debug!(dir = parent, "created parent directory");
            volume.create(path).await
        }
        _ => Err(first),
    }
}

/// Stores the request body (exactly Content-Length bytes) at the request
/// path.
pub fn put_handler<V: Volume>(web: &mut Dispatcher<V>) -> HandlerFuture<'_> {
    Box::pin(put(web))
}

async fn put<V: Volume>(web: &mut Dispatcher<V>) -> anyhow::Result<()> {
    let path = web.path().to_string();
    let expected = web.content_length();

    let mut file = match create_file(web.volume(), &path).await {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path, error = %e, "cannot create file");
            web.send_http_result(StatusCode::UnprocessableEntity, None, None)
                .await?;
            return Ok(());
        }
    };

    let received = web.receive_into(&mut file, expected).await;
    drop(file);

    match received {
        Ok(bytes) => {
            if let Some(now) = web.clock().and_then(|c| c.synchronized_time()) {
                if let Err(e) = web.volume().set_modified(&path, now).await {
                    debug!(path = %path, error = %e, "cannot stamp file");
                }
            }
            info!(path = %path, bytes, "file stored");
            web.send_http_result(StatusCode::Ok, None, None).await?;
        }
        Err(e) => {
            warn!(path = %path, error = %e, "upload incomplete");
            web.send_http_result(StatusCode::NotFound, None, None).await?;
        }
    }
    Ok(())
}
