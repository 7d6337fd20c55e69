// src/main.rs
mod api;
mod bubble;
mod comment;
mod components;
mod coords;
mod dual_page;
mod error;
mod layout;
mod overlay_config;
mod utils;
mod view_state;
mod zoom;

use components::reader::Reader;
use error::OverlayError;
use gloo_net::http::Request;
use overlay_config::OverlayConfig;
use utils::resource_url;
use yew::prelude::*;

const MANIFEST_PATH: &str = "public/overlay.json";

pub enum AppMsg {
    ConfigLoaded(OverlayConfig),
    ConfigLoadFailed(String),
}

pub struct App {
    config: Option<OverlayConfig>,
    error: Option<String>,
    loading: bool,
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        // Start loading the reader manifest
        ctx.link().send_future(async {
            match load_config().await {
                Ok(config) => AppMsg::ConfigLoaded(config),
                Err(e) => AppMsg::ConfigLoadFailed(e.to_string()),
            }
        });

        Self {
            config: None,
            error: None,
            loading: true,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::ConfigLoaded(config) => {
                log::info!(
                    "Loaded manifest: {} page(s) in {} block(s)",
                    config.get_page_count(),
                    config.blocks.len()
                );
                self.config = Some(config);
                self.loading = false;
                true
            }
            AppMsg::ConfigLoadFailed(error) => {
                log::error!("Failed to load manifest: {}", error);
                self.error = Some(error);
                self.loading = false;
                true
            }
        }
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        let title = self
            .config
            .as_ref()
            .map(|c| c.title.clone())
            .unwrap_or_else(|| OverlayConfig::default().title);

        let body = if self.loading {
            html! { <div class="loading">{"Loading pages..."}</div> }
        } else if let Some(config) = self.config.as_ref().filter(|c| c.get_page_count() > 0) {
            html! { <Reader config={config.clone()} /> }
        } else {
            let message = self.error.clone().unwrap_or_else(|| {
                format!("No pages found. Make sure {} lists at least one page.", MANIFEST_PATH)
            });
            html! { <div class="error">{ message }</div> }
        };

        html! {
            <div class="app-container">
                <header class="app-header">
                    <h1>{ title }</h1>
                </header>
                <main class="app-main">
                    { body }
                </main>
            </div>
        }
    }
}

async fn load_config() -> Result<OverlayConfig, OverlayError> {
    let url = resource_url(MANIFEST_PATH);
    let resp = Request::get(&url).send().await?;
    if !resp.ok() {
        return Err(OverlayError::Status {
            url,
            status: resp.status(),
        });
    }
    let text = resp.text().await?;
    OverlayConfig::from_json(&text)
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}
