// src/components/page_view.rs
use crate::bubble::BubbleId;
use crate::components::bubble_view::BubbleView;
use crate::dual_page::Side;
use crate::utils::resource_url;
use crate::view_state::PageState;
use web_sys::Event;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct PageViewProps {
    pub page: PageState,
    pub side: Option<Side>,
    pub image_ref: NodeRef,
    pub overlay_class: &'static str,
    pub on_image_settled: Callback<usize>,
    pub on_overlay_click: Callback<(usize, MouseEvent)>,
    pub on_bubble_click: Callback<(usize, BubbleId)>,
}

/// One page: image, click-capturing overlay and the comment panel beside it.
#[function_component(PageView)]
pub fn page_view(props: &PageViewProps) -> Html {
    let index = props.page.index;

    let onload = {
        let settled = props.on_image_settled.clone();
        Callback::from(move |_: Event| settled.emit(index))
    };
    let onerror = {
        let settled = props.on_image_settled.clone();
        let image_id = props.page.image_id.clone();
        Callback::from(move |_: Event| {
            log::warn!("Page image failed to load: {}", image_id);
            settled.emit(index);
        })
    };
    let onclick = {
        let on_overlay_click = props.on_overlay_click.clone();
        Callback::from(move |e: MouseEvent| on_overlay_click.emit((index, e)))
    };

    let panel_style = props.page.panel_height.map(|h| format!("height: {}px;", h));
    let wrapper_class = classes!(
        "page-wrapper",
        props.side.map(|s| s.class()),
        props.page.panel.has_open_comment().then_some("has-open-comment"),
    );

    html! {
        <div class={wrapper_class}>
            <div class="page-container">
                <img
                    class="page"
                    ref={props.image_ref.clone()}
                    src={resource_url(&props.page.image_id)}
                    {onload}
                    {onerror}
                />
                <div class={props.overlay_class} {onclick}></div>
            </div>
            <div class="comment-panel" style={panel_style}>
                { for props.page.panel.bubbles().iter().map(|bubble| {
                    let on_bubble_click = props.on_bubble_click.clone();
                    let id = bubble.id;
                    html! {
                        <BubbleView
                            bubble={bubble.clone()}
                            onclick={Callback::from(move |_: ()| on_bubble_click.emit((index, id)))}
                        />
                    }
                }) }
            </div>
        </div>
    }
}
