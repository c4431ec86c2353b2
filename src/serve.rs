use crate::{
    document::Document,
    page::{
        header::{self, HEADER},
        menu::{self, FAMILY_PORTAL},
    },
};
use log::{debug, error};
use mime_guess::{Mime, mime};
use percent_encoding::percent_decode_str;
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};
use tiny_http::{Header, Response, ResponseBox};

/// Runs the menu (and optionally header) renderers over one HTML page.
pub fn render_page(source: String, location: &str, with_header: bool) -> String {
    let mut document = Document::load(source, location);
    let startup = menu::init(&mut document, &FAMILY_PORTAL);
    document.complete();
    debug!(
        "{location}: menu {:?}, document {:?}",
        startup.phase(),
        document.ready_state()
    );
    if with_header {
        header::render_header(&mut document, &HEADER);
    }
    document.into_html()
}

fn guess(path: &Path) -> Mime {
    mime_guess::from_path(path).first_or_octet_stream()
}

fn content_type(path: &Path) -> String {
    let mime = guess(path);
    if mime.type_() == mime::TEXT && mime.get_param(mime::CHARSET).is_none() {
        format!("{mime}; charset=utf-8")
    } else {
        mime.to_string()
    }
}

fn is_html(path: &Path) -> bool {
    guess(path) == mime::TEXT_HTML
}

fn with_header<R: Read>(response: Response<R>, name: &str, value: &str) -> Response<R> {
    match Header::from_bytes(name, value) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

#[derive(Debug, Clone)]
pub struct StaticRoot {
    root:   PathBuf,
    header: bool,
}

impl StaticRoot {
    pub fn new(root: impl Into<PathBuf>, header: bool) -> Self {
        Self {
            root: root.into(),
            header,
        }
    }

    /// Maps a percent-encoded request path onto a file under the root.
    /// Directories resolve to their `index.html`; `..` is refused.
    fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for segment in url_path.split('/') {
            let segment = percent_decode_str(segment).decode_utf8().ok()?;
            match &*segment {
                "" | "." => {}
                ".." => return None,
                s if s.contains(['/', '\\', '\0']) => return None,
                s => path.push(s),
            }
        }
        if url_path.is_empty() || url_path.ends_with('/') || path.is_dir() {
            path.push("index.html");
        }
        Some(path)
    }

    pub fn respond(&self, url_path: &str) -> ResponseBox {
        let Some(path) = self.resolve(url_path) else {
            debug!("Refusing {url_path:?}");
            return Response::empty(404).boxed();
        };
        if !path.is_file() {
            debug!("Not found: {path:?}");
            return Response::empty(404).boxed();
        }
        let content_type = content_type(&path);
        let content_type = content_type.as_str();

        if is_html(&path) {
            let source = match fs::read_to_string(&path) {
                Ok(source) => source,
                Err(e) => {
                    error!("Failed to read the entirety of {path:?} into a string: {e}");
                    return Response::empty(500).boxed();
                }
            };
            let html = render_page(source, url_path, self.header);
            with_header(Response::from_string(html), "Content-Type", content_type).boxed()
        } else {
            let data = match fs::read(&path) {
                Ok(data) => data,
                Err(e) => {
                    error!("Failed to read {path:?}: {e}");
                    return Response::empty(500).boxed();
                }
            };
            let response = with_header(Response::from_data(data), "Content-Type", content_type);
            with_header(response, "Cache-Control", "public, max-age=900").boxed()
        }
    }
}
