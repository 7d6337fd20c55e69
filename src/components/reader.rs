// src/components/reader.rs
use crate::api;
use crate::bubble::{reveal_schedule, BubbleId};
use crate::comment::{CommentRecord, RecordDefaults};
use crate::components::page_view::PageView;
use crate::coords::BoundingBox;
use crate::dual_page::{ColumnNode, LayoutPhase, PageColumn, PageSlot};
use crate::layout::{next_frame, sleep_ms, sync_panel_height, DomHeightSource, ImageWait, Settle};
use crate::overlay_config::OverlayConfig;
use crate::view_state::{build_pages, PageState, ViewState};
use chrono::Utc;
use gloo_events::EventListener;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlElement, HtmlImageElement, MouseEvent};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ReaderProps {
    pub config: OverlayConfig,
}

pub enum ReaderMsg {
    ImageSettled(usize),
    ImageWaitExpired,
    CommentsLoaded(usize, Vec<CommentRecord>),
    ActivateBubble(usize, BubbleId),
    BubbleClicked(usize, BubbleId),
    BubbleClosed(usize, BubbleId),
    OverlayClicked(usize, MouseEvent),
    CommentSaved(usize, BubbleId, Option<CommentRecord>),
    ToggleCommentMode,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ZoomChanged(u32),
    HideBubblesChanged(bool),
    ToggleDualPage,
    LayoutFadedOut,
    LayoutSettled,
    SyncPanels,
}

/// Wires the page states to the view flags, the comment service and the DOM.
pub struct Reader {
    view: ViewState,
    pages: Vec<PageState>,
    columns: Vec<PageColumn>,
    // page index -> column index
    page_column: Vec<usize>,
    image_refs: Vec<NodeRef>,
    column_refs: Vec<NodeRef>,
    image_wait: ImageWait,
    defaults: RecordDefaults,
    _resize_listener: EventListener,
}

impl Component for Reader {
    type Message = ReaderMsg;
    type Properties = ReaderProps;

    fn create(ctx: &Context<Self>) -> Self {
        let config = &ctx.props().config;
        let (pages, columns) = build_pages(config);

        let mut page_column = vec![0; pages.len()];
        for (col, column) in columns.iter().enumerate() {
            for page in column.page_order() {
                page_column[page] = col;
            }
        }

        let mut view = ViewState::new(config);
        view.dual_page
            .on_layout_change(ctx.link().callback(|_: ()| ReaderMsg::SyncPanels));
        view.comment_mode.on_change(Callback::from(|enabled: bool| {
            log::info!("Comment mode {}", if enabled { "on" } else { "off" });
        }));
        view.zoom
            .on_zoom_change(ctx.link().callback(ReaderMsg::ZoomChanged));
        view.zoom
            .on_hide_bubbles_change(ctx.link().callback(ReaderMsg::HideBubblesChanged));

        // Safety net for images that never report load or error.
        let link = ctx.link().clone();
        let wait_ms = config.timings.image_wait_ms;
        spawn_local(async move {
            sleep_ms(wait_ms).await;
            link.send_message(ReaderMsg::ImageWaitExpired);
        });

        let link = ctx.link().clone();
        let resize_listener = EventListener::new(&gloo_utils::window(), "resize", move |_| {
            link.send_message(ReaderMsg::SyncPanels);
        });

        log::info!(
            "Reader ready: {} page(s) in {} block(s)",
            pages.len(),
            columns.len()
        );

        Self {
            view,
            image_wait: ImageWait::new(0..pages.len()),
            image_refs: (0..pages.len()).map(|_| NodeRef::default()).collect(),
            column_refs: (0..columns.len()).map(|_| NodeRef::default()).collect(),
            pages,
            columns,
            page_column,
            defaults: RecordDefaults {
                author: config.default_author.clone(),
                chapter: config.default_chapter.clone(),
            },
            _resize_listener: resize_listener,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ReaderMsg::ImageSettled(page) => match self.image_wait.settle(page) {
                Settle::Complete => {
                    self.start(ctx);
                    true
                }
                Settle::Late => self.sync_all_panels(ctx),
                Settle::Pending => false,
            },
            ReaderMsg::ImageWaitExpired => {
                if self.image_wait.expire() {
                    self.start(ctx);
                    return true;
                }
                false
            }
            ReaderMsg::CommentsLoaded(page, comments) => {
                let timings = &ctx.props().config.timings;
                let schedule = reveal_schedule(comments, timings.reveal_base_ms, timings.reveal_step_ms);
                for (record, delay) in schedule {
                    let id = self.pages[page].panel.append(record);
                    self.schedule_entrance(ctx, page, id, delay);
                }
                true
            }
            ReaderMsg::ActivateBubble(page, id) => {
                self.pages[page].panel.activate(id);
                true
            }
            ReaderMsg::BubbleClicked(page, id) => {
                let outcome = self.pages[page].panel.click(id);
                let fade_ms = ctx.props().config.timings.close_fade_ms;
                for closing in outcome.closing {
                    let link = ctx.link().clone();
                    spawn_local(async move {
                        sleep_ms(fade_ms).await;
                        link.send_message(ReaderMsg::BubbleClosed(page, closing));
                    });
                }
                true
            }
            ReaderMsg::BubbleClosed(page, id) => {
                self.pages[page].panel.finish_close(id);
                true
            }
            ReaderMsg::OverlayClicked(page, event) => self.author_comment(ctx, page, &event),
            ReaderMsg::CommentSaved(page, id, saved) => {
                match saved {
                    Some(record) => {
                        log::info!("Comment saved for {}", record.image_id);
                        self.pages[page].panel.attach_saved(id, record);
                    }
                    None => log::warn!("Comment on {} was not persisted", self.pages[page].image_id),
                }
                false
            }
            ReaderMsg::ToggleCommentMode => {
                self.view.comment_mode.toggle();
                true
            }
            ReaderMsg::ZoomIn => self.view.zoom.zoom_in(),
            ReaderMsg::ZoomOut => self.view.zoom.zoom_out(),
            ReaderMsg::ZoomReset => {
                self.view.zoom.reset();
                true
            }
            ReaderMsg::ZoomChanged(actual) => {
                // The scale change is a CSS transition; measure once it is over.
                log::debug!("Zoom {} renders at {}%", self.view.zoom.display_label(), actual);
                let link = ctx.link().clone();
                let settle_ms = ctx.props().config.timings.zoom_settle_ms;
                spawn_local(async move {
                    next_frame().await;
                    sleep_ms(settle_ms).await;
                    link.send_message(ReaderMsg::SyncPanels);
                });
                false
            }
            ReaderMsg::HideBubblesChanged(hidden) => {
                if self.view.handle_hide_bubbles(hidden) {
                    log::info!("Comment mode turned off while zoomed in on dual pages");
                }
                true
            }
            ReaderMsg::ToggleDualPage => {
                self.view.dual_page.toggle();
                if self.view.dual_page.begin() {
                    let link = ctx.link().clone();
                    let fade_ms = ctx.props().config.timings.layout_fade_ms;
                    spawn_local(async move {
                        sleep_ms(fade_ms).await;
                        link.send_message(ReaderMsg::LayoutFadedOut);
                    });
                }
                true
            }
            ReaderMsg::LayoutFadedOut => {
                self.view.dual_page.regroup(&mut self.columns);
                true
            }
            ReaderMsg::LayoutSettled => {
                self.view.dual_page.finish();
                true
            }
            ReaderMsg::SyncPanels => self.sync_all_panels(ctx),
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        if self.view.dual_page.phase() != LayoutPhase::Regrouped {
            return;
        }
        // Read geometry back so the regrouped layout is computed now.
        for column in &self.column_refs {
            if let Some(el) = column.cast::<HtmlElement>() {
                let _ = el.offset_height();
            }
        }
        if self.view.dual_page.settle() {
            let link = ctx.link().clone();
            spawn_local(async move {
                next_frame().await;
                next_frame().await;
                link.send_message(ReaderMsg::LayoutSettled);
            });
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let zoom = &self.view.zoom;
        let container_class = classes!(
            "pages_container",
            zoom.is_bubbles_hidden().then_some("zoom-hide-bubbles")
        );

        html! {
            <div class="reader">
                { self.render_controls(ctx) }
                <div class={container_class} style={format!("--zoom-level: {};", zoom.scale_factor())}>
                    { for ctx.props().config.blocks.iter().enumerate().map(|(col, block)| {
                        html! {
                            <div class={classes!("comment-block", block.class.clone())}>
                                { self.render_column(ctx, col) }
                            </div>
                        }
                    }) }
                </div>
            </div>
        }
    }
}

impl Reader {
    /// Images are settled: size the panels, then load comments page by page.
    fn start(&mut self, ctx: &Context<Self>) {
        self.sync_all_panels(ctx);

        let link = ctx.link().clone();
        let comments_url = ctx.props().config.comments_url();
        let defaults = self.defaults.clone();
        let targets: Vec<(usize, String)> = self
            .pages
            .iter()
            .map(|p| (p.index, p.image_id.clone()))
            .collect();
        spawn_local(async move {
            for (page, image_id) in targets {
                let comments = api::fetch_comments(&comments_url, &image_id, &defaults).await;
                link.send_message(ReaderMsg::CommentsLoaded(page, comments));
            }
        });
    }

    fn sync_all_panels(&mut self, ctx: &Context<Self>) -> bool {
        let anchor = ctx.props().config.panel_anchor;
        let mut changed = false;
        for page in self.pages.iter_mut() {
            let source = DomHeightSource {
                anchor,
                image: &self.image_refs[page.index],
                column: &self.column_refs[self.page_column[page.index]],
            };
            changed |= sync_panel_height(&source, &mut page.panel_height);
        }
        changed
    }

    fn schedule_entrance(&self, ctx: &Context<Self>, page: usize, id: BubbleId, delay_ms: u32) {
        let link = ctx.link().clone();
        spawn_local(async move {
            sleep_ms(delay_ms).await;
            next_frame().await;
            link.send_message(ReaderMsg::ActivateBubble(page, id));
        });
    }

    /// Click on a page overlay while comment mode is on.
    fn author_comment(&mut self, ctx: &Context<Self>, page: usize, event: &MouseEvent) -> bool {
        if !self.view.accepts_authoring() {
            return false;
        }
        if !self.image_wait.is_done() {
            log::debug!("Ignoring click while page images are still loading");
            return false;
        }
        let Some(image) = self.image_refs[page].cast::<HtmlImageElement>() else {
            log::error!("Page {} has no rendered image", page + 1);
            return false;
        };

        let bbox = BoundingBox::from_rect(&image.get_bounding_client_rect());
        let fraction = match bbox.fraction_at(event.client_x() as f64, event.client_y() as f64) {
            Ok(fraction) => fraction,
            Err(e) => {
                log::warn!("Cannot place comment: {}", e);
                return false;
            }
        };

        let author = match gloo::dialogs::prompt("Your name:", None) {
            Some(author) if !author.trim().is_empty() => author,
            _ => return false,
        };
        let Some(text) = gloo::dialogs::prompt("Type your comment:", None) else {
            return false;
        };

        let state = &mut self.pages[page];
        let Some(record) = CommentRecord::authored(
            &state.image_id,
            fraction,
            &author,
            &text,
            &state.chapter,
            Utc::now(),
        ) else {
            return false;
        };
        let id = state.panel.append(record.clone());
        self.schedule_entrance(ctx, page, id, 0);

        let link = ctx.link().clone();
        let comments_url = ctx.props().config.comments_url();
        let defaults = self.defaults.clone();
        spawn_local(async move {
            let saved = api::save_comment(&comments_url, &record, &defaults).await;
            link.send_message(ReaderMsg::CommentSaved(page, id, saved));
        });
        true
    }

    fn render_controls(&self, ctx: &Context<Self>) -> Html {
        let mode = &self.view.comment_mode;
        let dual = self.view.dual_page.is_dual_page();

        let toggle_mode = ctx.link().callback(|_| ReaderMsg::ToggleCommentMode);
        let toggle_dual = ctx.link().callback(|_| ReaderMsg::ToggleDualPage);
        let zoom_in = ctx.link().callback(|_| ReaderMsg::ZoomIn);
        let zoom_out = ctx.link().callback(|_| ReaderMsg::ZoomOut);
        let zoom_reset = ctx.link().callback(|_| ReaderMsg::ZoomReset);

        html! {
            <div class="controls-panel">
                <button
                    id="toggleOverlayBtn"
                    class={classes!("overlay-toggle", mode.is_enabled().then_some("on"))}
                    onclick={toggle_mode}
                >
                    { mode.button_label() }
                </button>
                <button class={classes!("dual_page_toggler", dual.then_some("active"))} onclick={toggle_dual}>
                    {"Dual page"}
                </button>
                <div class="zoom-controls">
                    <button class="zoom_out_btn" onclick={zoom_out}>{"🔍 -"}</button>
                    <span class="zoom_percent" ondblclick={zoom_reset} title="Double-click to reset">
                        { self.view.zoom.display_label() }
                    </span>
                    <button class="zoom_in_btn" onclick={zoom_in}>{"🔍 +"}</button>
                </div>
            </div>
        }
    }

    fn render_column(&self, ctx: &Context<Self>, col: usize) -> Html {
        let Some(column) = self.columns.get(col) else {
            return html! {};
        };
        let class = classes!(
            "pages-column",
            self.view.dual_page.is_transitioning().then_some("layout-transitioning")
        );

        html! {
            <div class={class} ref={self.column_refs[col].clone()}>
                { for column.nodes.iter().map(|node| match node {
                    ColumnNode::Page(slot) => self.render_page(ctx, *slot),
                    ColumnNode::Pair(slots) => html! {
                        <div class="page-pair">
                            { for slots.iter().map(|slot| self.render_page(ctx, *slot)) }
                        </div>
                    },
                }) }
            </div>
        }
    }

    fn render_page(&self, ctx: &Context<Self>, slot: PageSlot) -> Html {
        let page = &self.pages[slot.page];
        html! {
            <PageView
                page={page.clone()}
                side={slot.side}
                image_ref={self.image_refs[slot.page].clone()}
                overlay_class={self.view.comment_mode.overlay_class()}
                on_image_settled={ctx.link().callback(ReaderMsg::ImageSettled)}
                on_overlay_click={ctx.link().callback(|(page, e): (usize, MouseEvent)| ReaderMsg::OverlayClicked(page, e))}
                on_bubble_click={ctx.link().callback(|(page, id): (usize, BubbleId)| ReaderMsg::BubbleClicked(page, id))}
            />
        }
    }
}
