//! Line-oriented bridge loop.
//!
//! Reads one JSON host message per line, answers immediately where a reply is
//! due, and offers the document text back through a debounced `updateText`.

use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, sleep_until};

use super::protocol::{CoreMessage, HostMessage};
use super::session::BridgeSession;

async fn send<W>(writer: &mut W, msg: &CoreMessage) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(msg).context("encode bridge message")?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Drive `session` until `reader` hits EOF.
///
/// Each change restarts the debounce timer; only the latest text is sent
/// once the input has been quiet for `debounce`. A pending update is flushed
/// at EOF.
pub async fn run<R, W>(
    session: &mut BridgeSession,
    reader: R,
    mut writer: W,
    debounce: Duration,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    send(&mut writer, &CoreMessage::Ready).await?;
    tracing::info!("bridge ready (debounce={}ms)", debounce.as_millis());

    let mut deadline: Option<Instant> = None;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read bridge input")? else {
                    if deadline.take().is_some() {
                        send(&mut writer, &session.update_text()).await?;
                    }
                    tracing::info!("bridge input closed");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let msg = match serde_json::from_str::<HostMessage>(line) {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::warn!("skipping unreadable host message: {}", e);
                        continue;
                    }
                };
                let outcome = session.handle(msg);
                for reply in &outcome.replies {
                    send(&mut writer, reply).await?;
                }
                if outcome.changed && session.is_initialised() {
                    deadline = Some(Instant::now() + debounce);
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                send(&mut writer, &session.update_text()).await?;
                tracing::debug!("sent debounced document text");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::protocol::LogLevel;
    use crate::document::{starter_document, to_json_text};
    use crate::editor::RoutingEditor;
    use crate::mutate;
    use crate::uiconfig::MemoryUiConfigStore;
    use serde_json::json;

    fn session() -> BridgeSession {
        BridgeSession::new(RoutingEditor::new(Box::new(MemoryUiConfigStore::new())))
    }

    fn output(buf: &[u8]) -> Vec<CoreMessage> {
        String::from_utf8_lossy(buf)
            .lines()
            .map(|l| serde_json::from_str(l).expect("core message"))
            .collect()
    }

    fn line(v: serde_json::Value) -> String {
        format!("{v}\n")
    }

    #[tokio::test]
    async fn ready_then_coalesced_update() {
        let mut doc = starter_document();
        mutate::add_provider(&mut doc, "anthropic");
        let latest = to_json_text(&doc);

        let input = [
            line(json!({"type": "init", "text": to_json_text(&starter_document()), "fileName": "a.routing.json"})),
            "not json\n".to_string(),
            "\n".to_string(),
            line(json!({"type": "setText", "text": latest.clone()})),
        ]
        .concat();

        let mut s = session();
        let mut out = Vec::new();
        run(&mut s, input.as_bytes(), &mut out, Duration::from_secs(60))
            .await
            .expect("run");

        assert_eq!(
            output(&out),
            vec![CoreMessage::Ready, CoreMessage::UpdateText { text: latest }]
        );
    }

    #[tokio::test]
    async fn set_text_alone_initialises_and_updates() {
        let mut doc = starter_document();
        mutate::add_class(&mut doc, "long");
        let text = to_json_text(&doc);
        let input = [
            line(json!({"type": "setFileInfo", "fileName": "team.routing.json"})),
            line(json!({"type": "setText", "text": text.clone()})),
        ]
        .concat();
        let mut s = session();
        let mut out = Vec::new();
        run(&mut s, input.as_bytes(), &mut out, Duration::from_secs(60))
            .await
            .expect("run");
        assert_eq!(
            output(&out),
            vec![CoreMessage::Ready, CoreMessage::UpdateText { text }]
        );
        assert_eq!(s.editor().file_name(), "team.routing.json");
    }

    #[tokio::test]
    async fn nothing_sent_without_document_messages() {
        let input = line(json!({"type": "validateResult", "issues": []}));
        let mut s = session();
        let mut out = Vec::new();
        run(&mut s, input.as_bytes(), &mut out, Duration::from_millis(5))
            .await
            .expect("run");
        assert_eq!(output(&out), vec![CoreMessage::Ready]);
    }

    #[tokio::test]
    async fn invalid_text_is_reported_not_fatal() {
        let input = [
            line(json!({"type": "init", "text": "{", "fileName": "bad.json"})),
            line(json!({"type": "validateResult", "issues": []})),
        ]
        .concat();
        let mut s = session();
        let mut out = Vec::new();
        run(&mut s, input.as_bytes(), &mut out, Duration::from_millis(5))
            .await
            .expect("run");

        let msgs = output(&out);
        assert_eq!(msgs.len(), 3);
        assert!(matches!(
            &msgs[1],
            CoreMessage::Log { level: LogLevel::Error, message, .. } if message.contains("Invalid JSON")
        ));
        assert_eq!(s.editor().document(), &starter_document());
        assert_eq!(
            msgs[2],
            CoreMessage::UpdateText {
                text: to_json_text(&starter_document())
            }
        );
    }
}
