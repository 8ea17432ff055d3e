use tracing::{debug, info};

use crate::http::connection::Dispatcher;
use crate::http::response::StatusCode;
use crate::http::router::HandlerFuture;
use crate::storage::Volume;

/// Removes a file, or an empty directory. The body of a 200 echoes the
/// removed path.
pub fn delete_handler<V: Volume>(web: &mut Dispatcher<V>) -> HandlerFuture<'_> {
    Box::pin(delete(web))
}

async fn delete<V: Volume>(web: &mut Dispatcher<V>) -> anyhow::Result<()> {
    let mut path = web.path().to_string();
    if path.ends_with('/') {
        path.pop();
    }

    let removed = match web.volume().remove_file(&path).await {
        Ok(()) => true,
        Err(_) => web.volume().remove_dir(&path).await.is_ok(),
    };

    if removed {
        info!(path = %path, "deleted");
        web.send_http_result(StatusCode::Ok, None, None).await?;
        web.write_all(path.as_bytes()).await?;
    } else {
        debug!(path = %path, "not found or not removable");
        web.send_http_result(StatusCode::NotFound, None, None).await?;
    }
    Ok(())
}
