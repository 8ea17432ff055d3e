use std::fmt::Write as _;
use std::net::Ipv4Addr;

use tracing::debug;
use url::Url;

use crate::http::connection::Dispatcher;
use crate::http::mime::TEXT_HTML;
use crate::http::response::StatusCode;
use crate::storage::{DirEntry, EntryKind, Volume};
use crate::time::DateTime;

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// `http://<ip>/<segments...>`, each segment percent-encoded.
fn link<'a>(ip: Ipv4Addr, parts: impl Iterator<Item = &'a str>) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("http://{ip}/"))?;
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(parts);
    }
    Ok(url)
}

/// HTML page for the entries of directory `path`.
///
/// Hidden entries (leading `.`) are left out. Links are absolute, built from
/// `ip` so they work when the page is saved elsewhere.
pub fn render_listing(path: &str, ip: Ipv4Addr, entries: &[DirEntry]) -> Result<String, url::ParseError> {
    let title = escape_html(path);
    let mut html = String::new();
    let _ = write!(
        html,
        "<html><head><title>{title}</title></head><body><h1>{title}</h1><hr><pre>"
    );

    let dir: Vec<&str> = segments(path).collect();
    if !dir.is_empty() {
        let parent = link(ip, dir[..dir.len() - 1].iter().copied())?;
        let _ = writeln!(html, "<a href=\"{parent}\">[To Parent Directory]</a>\n");
    }

    for entry in entries.iter().filter(|e| !e.name.starts_with('.')) {
        if let Some(modified) = entry.modified {
            let _ = write!(html, "{}", DateTime::from_fat(modified));
        }
        match entry.kind {
            EntryKind::File { size } => {
                let _ = write!(html, " {size}");
            }
            EntryKind::Dir => html.push_str(" &lt;dir&gt;"),
        }

        let href = link(ip, dir.iter().copied().chain([entry.name.as_str()]))?;
        let name = escape_html(&entry.name);
        let _ = writeln!(html, " <a href=\"{href}\">{name}</a>");
    }

    html.push_str("</pre><hr></body></html>\n");
    Ok(html)
}

/// Answers the current request with a listing of its path.
pub async fn list_directory<V: Volume>(web: &mut Dispatcher<V>) -> anyhow::Result<()> {
    let path = web.path().to_string();
    let entries = match web.volume().read_dir(&path).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %path, error = %e, "cannot list directory");
            web.send_http_result(StatusCode::NotFound, None, None).await?;
            return Ok(());
        }
    };

    let html = render_listing(&path, web.local_ip(), &entries)?;
    web.send_http_result(StatusCode::Ok, Some(TEXT_HTML), None).await?;
    web.write_all(html.as_bytes()).await?;
    Ok(())
}
