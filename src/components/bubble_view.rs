// src/components/bubble_view.rs
use crate::bubble::Bubble;
use crate::coords::bubble_top;
use chrono::Utc;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct BubbleViewProps {
    pub bubble: Bubble,
    pub onclick: Callback<()>,
}

#[function_component(BubbleView)]
pub fn bubble_view(props: &BubbleViewProps) -> Html {
    let record = &props.bubble.record;

    let onclick = {
        let onclick = props.onclick.clone();
        Callback::from(move |e: MouseEvent| {
            // Keep the click away from the authoring overlay.
            e.stop_propagation();
            onclick.emit(());
        })
    };

    let style = if props.bubble.accepts_pointer() {
        format!("top: {};", bubble_top(record.y_pct))
    } else {
        format!("top: {}; pointer-events: none;", bubble_top(record.y_pct))
    };

    html! {
        <div class={props.bubble.class()} {style} {onclick}>
            <div class={classes!("bubble-underline", record.chapter.clone())}></div>
            <div class="comment-meta">
                <div class="comment-author">{ &record.author }</div>
                <div class={classes!("author-underline", record.chapter.clone())}></div>
            </div>
            <div class="comment-text">{ &record.text }</div>
            <div class="comment-elapsed-time">{ record.elapsed_label(Utc::now()) }</div>
        </div>
    }
}
