use eyre::{OptionExt, WrapErr, eyre};
use log::{debug, error, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use crate::serve::StaticRoot;
use tiny_http::{Method, Response, ResponseBox};
use uri_rs::Uri;

mod document;
mod host;
mod macros;
mod page {
    pub mod header;
    pub mod menu;
}
mod serve;

pub const NAME: &str = "family-portal";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Config {
    bind:   String,
    /// Directory holding the site's pages and assets.
    root:   PathBuf,
    /// Replace the `header` container as well as the menu.
    header: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind:   "0.0.0.0:8000".to_string(),
            root:   PathBuf::from("."),
            header: true,
        }
    }
}

fn load_config(path: impl AsRef<Path>) -> eyre::Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config at {path:?}, using defaults");
        return Ok(Config::default());
    }
    let contents =
        std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {path:?} to string"))?;
    let config = toml::from_str(&contents).wrap_err_with(|| format!("Failed to parse {path:?}"))?;
    Ok(config)
}

/// The path part of a request target, without query or fragment.
fn request_path(url: &str) -> Option<String> {
    let url = Uri::new(url).ok()?;
    let path = url.path?;
    let path = path.split(['?', '#']).next().unwrap_or(path);
    Some(path.to_owned())
}

fn handle(site: &StaticRoot, method: &Method, url: &str) -> ResponseBox {
    if !matches!(method, Method::Get | Method::Head) {
        debug!("{method} {url}: method not allowed");
        return Response::empty(405).boxed();
    }
    let Some(path) = request_path(url) else {
        debug!("{method} {url}: unparseable target");
        return Response::empty(404).boxed();
    };
    debug!("{method} {path}");
    site.respond(&path)
}

fn main() -> eyre::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => dirs::config_dir()
            .ok_or_eyre("System should have a config directory")?
            .join(NAME)
            .join("config.toml"),
    };
    let config = load_config(&config_path)?;
    debug!("{config:?}");

    let site = StaticRoot::new(&config.root, config.header);
    let server = tiny_http::Server::http(&config.bind)
        .map_err(|e| eyre!("Failed to listen on {}: {e}", config.bind))?;
    info!("Serving {:?} on http://{}", config.root, config.bind);

    loop {
        // blocks until the next request is received
        let request = match server.recv() {
            Ok(rq) => rq,
            Err(e) => {
                error!("{e}");
                break;
            }
        };
        let response = handle(&site, request.method(), request.url());
        if let Err(e) = request.respond(response) {
            error!("Failed to respond: {e}");
        }
    }

    Ok(())
}
