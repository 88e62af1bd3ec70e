use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;

use findmeroom::chat::ChatState;
use findmeroom::models::Message;
use findmeroom::poll::Poller;

use crate::components::sidebar::Sidebar;
use crate::state::{AppState, ChatCtl, GlooScheduler};

/// Chat view: conversation list, open thread and compose box. Owns the thread
/// poller, so leaving the view stops polling.
#[component]
pub fn ChatPage() -> impl IntoView {
    let state = expect_context::<AppState>();
    let chat = RwSignal::new(ChatState::default());
    let Some(ctl) = state.chat_controller(chat) else {
        return view! { <div class="empty-state">"Please log in to view your messages"</div> }.into_any();
    };

    let target = state.router.try_update(|r| r.take_chat_target()).flatten();
    {
        let ctl = ctl.clone();
        spawn_local(async move { ctl.activate().await });
    }
    if let Some(target) = target {
        let ctl = ctl.clone();
        spawn_local(async move {
            if let Err(e) = ctl.open(&target).await {
                log::warn!("Cannot open conversation for {}: {e}", target.property_id);
            }
        });
    }

    let poller = StoredValue::new_local(Poller::new(GlooScheduler, state.api.config()));
    {
        let ctl = ctl.clone();
        Effect::new(move |_| {
            let selected = chat.with(|c| c.thread.selected().cloned());
            poller.update_value(|p| match selected {
                Some(key) => {
                    let ctl = ctl.clone();
                    p.watch_thread(key, move || {
                        let ctl = ctl.clone();
                        spawn_local(async move { ctl.refresh_thread().await });
                    });
                }
                None => p.stop_thread(),
            });
        });
    }

    view! {
        <div class="chat-layout">
            <Sidebar chat=chat ctl=ctl.clone() />
            <ChatArea chat=chat ctl=ctl />
        </div>
    }
    .into_any()
}

/// Open thread with its header, messages and input.
#[component]
fn ChatArea(chat: RwSignal<ChatState>, ctl: ChatCtl) -> impl IntoView {
    let viewer_id = ctl.viewer().id.clone();
    let list_ref = NodeRef::<html::Div>::new();

    // Keep the newest message in view
    Effect::new(move |_| {
        chat.with(|c| c.thread.scroll_revision);
        if let Some(el) = list_ref.get() {
            el.set_scroll_top(el.scroll_height());
        }
    });

    let header = Memo::new(move |_| {
        chat.with(|c| {
            c.selected_conversation().map(|e| {
                let conv = e.conversation();
                (conv.property_title.clone(), conv.other_user_name.clone())
            })
        })
    });

    view! {
        <main class="chat-area">
            {move || match header.get() {
                None => view! {
                    <div class="empty-state">"Select a conversation to start chatting"</div>
                }
                .into_any(),
                Some((title, other)) => {
                    let viewer_id = viewer_id.clone();
                    let ctl = ctl.clone();
                    view! {
                        <div class="chat-header">
                            <div class="title">{title}</div>
                            <div class="counterpart">{other}</div>
                        </div>
                        <div class="messages-container" node_ref=list_ref>
                            {move || {
                                chat.with(|c| c.thread.messages().is_empty()).then(|| view! {
                                    <div class="empty-state">"No messages yet. Say hello!"</div>
                                })
                            }}
                            <For
                                each=move || chat.with(|c| c.thread.messages().to_vec())
                                key=|m| (m.id.clone(), m.is_read)
                                let:msg
                            >
                                {
                                    let outgoing = msg.sender_id == viewer_id;
                                    view! { <MessageBubble msg=msg outgoing=outgoing /> }
                                }
                            </For>
                        </div>
                        <ChatInput chat=chat ctl=ctl />
                    }
                    .into_any()
                }
            }}
        </main>
    }
}

/// A single chat message bubble.
#[component]
fn MessageBubble(msg: Message, outgoing: bool) -> impl IntoView {
    let css_class = if outgoing { "message sent" } else { "message received" };
    let time = msg.created_at.format("%d %b, %H:%M").to_string();
    let ticks = outgoing.then(|| if msg.is_read { "✓✓" } else { "✓" });

    view! {
        <div class=css_class>
            <div>{msg.message}</div>
            <div class="meta">
                <span class="time">{time}</span>
                {ticks.map(|t| view! { <span class="ticks">{t}</span> })}
            </div>
        </div>
    }
}

/// Chat input form with textarea and send button.
#[component]
fn ChatInput(chat: RwSignal<ChatState>, ctl: ChatCtl) -> impl IntoView {
    let is_sending = move || chat.with(|c| c.thread.sending);
    let is_blank = move || chat.with(|c| c.thread.compose.trim().is_empty());

    let send = move || {
        if is_sending() {
            return;
        }
        let ctl = ctl.clone();
        spawn_local(async move {
            if let Err(e) = ctl.send().await {
                log::debug!("Message not sent: {e}");
            }
        });
    };

    let send_clone = send.clone();
    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send_clone();
        }
    };

    let on_submit = move |_: ev::MouseEvent| {
        send();
    };

    view! {
        <div class="input-area">
            {move || {
                chat.with(|c| c.thread.send_error.clone())
                    .map(|err| view! { <div class="error-banner">{err}</div> })
            }}
            <div class="input-row">
                <textarea
                    rows="1"
                    placeholder="Type your message... (Enter to send, Shift+Enter for newline)"
                    prop:value=move || chat.with(|c| c.thread.compose.clone())
                    on:input=move |ev| {
                        let text = event_target_value(&ev);
                        chat.update(|c| c.thread.compose = text);
                    }
                    on:keydown=on_keydown
                    disabled=is_sending
                />
                <button
                    class="send-btn"
                    on:click=on_submit
                    disabled=move || is_sending() || is_blank()
                >
                    {move || if is_sending() { "Sending..." } else { "Send" }}
                </button>
            </div>
        </div>
    }
}
