use leptos::prelude::*;
use leptos::task::spawn_local;

use findmeroom::chat::{ChatState, ConversationEntry};
use findmeroom::models::image_src;

use crate::state::ChatCtl;

/// Conversation list for the chat view.
#[component]
pub fn Sidebar(chat: RwSignal<ChatState>, ctl: ChatCtl) -> impl IntoView {
    let rows = move || chat.with(|c| c.conversations.entries().to_vec());

    view! {
        <aside class="sidebar">
            <div class="sidebar-header">
                <h2>"Messages"</h2>
            </div>
            <div class="conversation-list">
                {move || {
                    let (empty, loading) = chat.with(|c| (c.conversations.is_empty(), c.conversations.loading));
                    if empty && loading {
                        view! { <div class="empty-state">"Loading conversations..."</div> }.into_any()
                    } else if empty {
                        view! { <div class="empty-state">"No conversations yet"</div> }.into_any()
                    } else {
                        let ctl = ctl.clone();
                        view! {
                            <For
                                each=rows
                                key=|e| {
                                    let c = e.conversation();
                                    (e.key(), e.is_pending(), c.last_message.clone(), c.unread_count)
                                }
                                let:entry
                            >
                                <ConversationRow entry=entry chat=chat ctl=ctl.clone() />
                            </For>
                        }
                        .into_any()
                    }
                }}
            </div>
        </aside>
    }
}

#[component]
fn ConversationRow(entry: ConversationEntry, chat: RwSignal<ChatState>, ctl: ChatCtl) -> impl IntoView {
    let key = entry.key();
    let conv = entry.conversation().clone();
    let active_key = key.clone();

    let on_click = move |_: leptos::ev::MouseEvent| {
        let ctl = ctl.clone();
        let key = key.clone();
        spawn_local(async move {
            if let Err(e) = ctl.select(key).await {
                log::warn!("Cannot open conversation: {e}");
            }
        });
    };

    view! {
        <div
            class="conversation-item"
            class:active=move || chat.with(|c| c.is_selected(&active_key))
            class:pending=entry.is_pending()
            on:click=on_click
        >
            {conv.property_image.as_deref().map(|img| view! { <img class="thumb" src=image_src(img) /> })}
            <div class="summary">
                <div class="title">{conv.property_title.clone()}</div>
                <div class="counterpart">{conv.other_user_name.clone()}</div>
                <div class="last-message">
                    {conv.is_sender.then_some("You: ")}
                    {conv.last_message.clone()}
                </div>
            </div>
            {(conv.unread_count > 0).then(|| view! { <span class="badge">{conv.unread_count}</span> })}
        </div>
    }
}
