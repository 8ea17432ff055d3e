use tracing::{info, warn};

use crate::http::connection::Dispatcher;
use crate::http::response::StatusCode;
use crate::http::router::HandlerFuture;
use crate::storage::Volume;

/// Where `source` ends up when renamed to `name` in its own directory.
pub(crate) fn destination(source: &str, name: &str) -> String {
    match source.rfind('/') {
        Some(slash) => format!("{}{}", &source[..=slash], name),
        None => name.to_string(),
    }
}

/// Renames the request path. The body (Content-Length bytes) is the new
/// name; a 200 echoes the new path.
pub fn move_handler<V: Volume>(web: &mut Dispatcher<V>) -> HandlerFuture<'_> {
    Box::pin(rename(web))
}

async fn rename<V: Volume>(web: &mut Dispatcher<V>) -> anyhow::Result<()> {
    let path = web.path().to_string();
    let declared = web.content_length();

    let name = match web.receive_text(declared).await {
        Ok(name) => name,
        Err(e) => {
            warn!(path = %path, error = %e, "new name not received");
            web.send_http_result(StatusCode::NotFound, None, None).await?;
            return Ok(());
        }
    };

    let target = destination(&path, &name);
    match web.volume().rename(&path, &target).await {
        Ok(()) => {
            info!(from = %path, to = %target, "renamed");
            web.send_http_result(StatusCode::Ok, None, None).await?;
            web.write_all(target.as_bytes()).await?;
        }
        Err(e) => {
            warn!(from = %path, to = %target, error = %e, "rename failed");
            web.send_http_result(StatusCode::UnprocessableEntity, None, None)
                .await?;
        }
    }
    Ok(())
}
