use tracing::debug;

use crate::handlers::listing::list_directory;
use crate::http::connection::Dispatcher;
use crate::http::mime::mime_type_from_filename;
use crate::http::response::StatusCode;
use crate::http::router::HandlerFuture;
use crate::storage::{EntryKind, Volume};

/// Serves a file with its guessed MIME type, or a listing for a directory.
pub fn get_handler<V: Volume>(web: &mut Dispatcher<V>) -> HandlerFuture<'_> {
    Box::pin(get(web))
}

async fn get<V: Volume>(web: &mut Dispatcher<V>) -> anyhow::Result<()> {
    let path = web.path().to_string();
    if path == "/" {
        return list_directory(web).await;
    }

    let kind = match web.volume().entry(&path).await {
        Ok(kind) => kind,
        Err(e) => {
            debug!(path = %path, error = %e, "cannot open");
            web.send_http_result(StatusCode::NotFound, None, None).await?;
            return Ok(());
        }
    };

    if kind == EntryKind::Dir {
        return list_directory(web).await;
    }

    let mut file = match web.volume().open(&path).await {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %path, error = %e, "cannot open");
            web.send_http_result(StatusCode::NotFound, None, None).await?;
            return Ok(());
        }
    };

    let mime = mime_type_from_filename(&path);
    web.send_http_result(StatusCode::Ok, Some(mime), None).await?;
    let sent = web.send_file(&mut file).await?;
    debug!(path = %path, bytes = sent, "file sent");
    Ok(())
}
