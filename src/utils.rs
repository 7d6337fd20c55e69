// src/utils.rs
use gloo_utils::window;

/// Path prefix the reader is served under when deployed to a sub-path.
const DEPLOY_PREFIX: &str = "/manga-bubbles";

/// Get the base URL for the application
/// This handles both local development and sub-path deployment
pub fn get_base_url() -> String {
    match window().location().pathname() {
        Ok(path) if path.starts_with(&format!("{}/", DEPLOY_PREFIX)) => DEPLOY_PREFIX.to_string(),
        _ => String::new(),
    }
}

/// Build a resource URL with the correct base path. Absolute `http(s)` URLs
/// are returned untouched.
pub fn resource_url(path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    join_url(&get_base_url(), path)
}

pub fn join_url(base: &str, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    let clean_path = path.trim_start_matches('/');
    let base = base.trim_end_matches('/');

    if base.is_empty() {
        format!("/{}", clean_path)
    } else {
        format!("{}/{}", base, clean_path)
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
