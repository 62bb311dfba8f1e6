use anyhow::{bail, Context};
use lead_chat::{
    composer::{fetch_candidates, Key, KeyOutcome, KeyPress, MentionComposer, PickerTrigger},
    config::ClientConfig,
    logging,
    models::ChatMessage,
    services::{tagged_leads, HttpChatApi, StaticCredentials},
    websocket::{ChatSession, NoticeLevel, SessionConfig, SessionEvent, TungsteniteConnector},
};
use mention_protocol::render_display;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let cfg = ClientConfig::from_env().context("failed to load configuration")?;
    let Some(key) = cfg.conversation_key() else {
        bail!("LEAD_CHAT_COUNTERPART_ID must be set to open a conversation");
    };

    let credentials = Arc::new(StaticCredentials::new(cfg.token.clone()));
    let api = Arc::new(HttpChatApi::new(
        cfg.endpoints(),
        credentials.clone(),
        cfg.http_timeout(),
    )?);

    let session = ChatSession::start(SessionConfig {
        key: key.clone(),
        endpoints: cfg.endpoints(),
        credentials,
        history: api.clone(),
        connector: Arc::new(TungsteniteConnector),
        reconnect: cfg.reconnect_policy(),
        history_page_size: cfg.history_limit,
        connect_timeout: cfg.connect_timeout(),
    });
    let mut events = session.subscribe();

    // Lines ending in `@query` pick the best matching shared lead
    let mut composer = MentionComposer::new(PickerTrigger::FilterAsYouType);
    let ticket = composer.picker_mut().begin_load();
    let candidates = fetch_candidates(api.as_ref(), &key).await;
    composer.picker_mut().finish_load(ticket, candidates);

    info!("Chatting as {} with {}", key.role, key.counterpart_id);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(SessionEvent::MessageAppended(message)) => print_message(&message),
                Ok(SessionEvent::HistoryLoaded { count }) => {
                    session.snapshot().messages.iter().for_each(print_message);
                    println!("-- {} messages loaded --", count);
                }
                Ok(SessionEvent::StateChanged(state)) => println!("-- {:?} --", state),
                Ok(SessionEvent::Notice(notice)) => match notice.level {
                    NoticeLevel::Info => println!("-- {} --", notice.message),
                    NoticeLevel::Warning | NoticeLevel::Error => eprintln!("!! {}", notice.message),
                },
                Err(RecvError::Lagged(skipped)) => warn!("Dropped {} session events", skipped),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "/quit" => break,
                    "/reload" => session.reload_history()?,
                    "/leads" => {
                        for lead in composer.picker().candidates() {
                            println!("  {:>6}  {}  {:?}", lead.id, lead.display_label(), lead.status);
                        }
                    }
                    "/tagged" => {
                        let snapshot = session.snapshot();
                        for tagged in tagged_leads(&snapshot.messages) {
                            println!("  @{} (#{}) x{}", tagged.lead_name, tagged.lead_id, tagged.mention_count);
                        }
                    }
                    _ => {
                        composer.on_change(line.as_str(), line.len());
                        if composer.picker().is_open() {
                            composer.handle_key(KeyPress::new(Key::Enter));
                        }
                        if let KeyOutcome::Submit(text) = composer.handle_key(KeyPress::new(Key::Enter)) {
                            match session.send(&text) {
                                Ok(()) => composer.clear(),
                                Err(e) => eprintln!("!! {}", e.user_message()),
                            }
                        }
                    }
                }
            }
        }
    }

    session.shutdown();
    Ok(())
}

fn print_message(message: &ChatMessage) {
    println!(
        "[{}] {:?}: {}",
        message.created_at.format("%H:%M"),
        message.sender_type,
        render_display(&message.body)
    );
}
