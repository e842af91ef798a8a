use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::Context;
use chrono::Local;
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use timeline_core::{clipboard_text, CollectedItem, Effect, Msg};
use timeline_engine::{write_csv_export, CollectorEvent, CollectorHandle, EngineEvent};

type Clipboard = fn(&str) -> anyhow::Result<()>;

/// Carries out effects returned by `update` and turns engine events back
/// into messages.
pub(crate) struct EffectRunner<W: Write> {
    collector: CollectorHandle,
    output_dir: PathBuf,
    out: W,
    clipboard: Clipboard,
}

impl<W: Write> EffectRunner<W> {
    pub fn new(collector: CollectorHandle, output_dir: PathBuf, out: W) -> Self {
        Self {
            collector,
            output_dir,
            out,
            clipboard: copy_to_clipboard,
        }
    }

    #[cfg(test)]
    fn with_clipboard(mut self, clipboard: Clipboard) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Returns the messages produced right away, such as export outcomes.
    pub fn run(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut replies = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartCollection(request) => {
                    engine_info!(
                        "StartCollection target={} pacing={:?}",
                        request.target_count(),
                        request.pacing()
                    );
                    self.collector.start(request);
                }
                Effect::CancelCollection => {
                    engine_info!("CancelCollection");
                    self.collector.cancel();
                }
                Effect::WriteCsv { items } => replies.push(self.write_csv(&items)),
                Effect::CopyToClipboard { items } => replies.push(self.copy(&items)),
                Effect::HandOffToSummarizer { prompt } => {
                    replies.push(self.print_block(
                        "Summarizer prompt",
                        &prompt,
                        "Paste the prompt above into your summarizer".to_string(),
                    ));
                }
            }
        }
        replies
    }

    /// Drains pending engine events without blocking.
    pub fn poll_events(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.collector.try_recv() {
            if let Some(msg) = map_event(event) {
                msgs.push(msg);
            }
        }
        msgs
    }

    pub fn cancel(&self) {
        self.collector.cancel();
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    fn write_csv(&self, items: &[CollectedItem]) -> Msg {
        match write_csv_export(&self.output_dir, items, Local::now().date_naive()) {
            Ok(path) => Msg::ExportSucceeded(format!(
                "Saved {} rows to {}",
                items.len(),
                path.display()
            )),
            Err(err) => {
                engine_error!("CSV export to {:?} failed: {}", self.output_dir, err);
                Msg::ExportFailed(format!("CSV export failed: {err}"))
            }
        }
    }

    /// Copies the rows, printing them instead when no clipboard tool works.
    fn copy(&mut self, items: &[CollectedItem]) -> Msg {
        let text = clipboard_text(items, Local::now().date_naive());
        match (self.clipboard)(&text) {
            Ok(()) => Msg::ExportSucceeded(format!("Copied {} rows to the clipboard", items.len())),
            Err(err) => {
                engine_warn!("Clipboard copy failed: {:#}", err);
                let printed = self.print_block("Clipboard text", &text, String::new());
                let fallback = match printed {
                    Msg::ExportSucceeded(_) => "rows printed above",
                    _ => "rows could not be printed either",
                };
                Msg::ExportFailed(format!("Clipboard copy failed ({err:#}); {fallback}"))
            }
        }
    }

    fn print_block(&mut self, title: &str, body: &str, notice: String) -> Msg {
        match writeln!(self.out, "----- {title} -----\n{body}\n-----") {
            Ok(()) => Msg::ExportSucceeded(notice),
            Err(err) => {
                engine_warn!("Printing {} failed: {}", title, err);
                Msg::ExportFailed(format!("{title} could not be printed: {err}"))
            }
        }
    }
}

/// Pipes `text` into the platform clipboard tool.
fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    let mut child = Command::new("pbcopy")
        .stdin(Stdio::piped())
        .spawn()
        .context("Failed to launch pbcopy")?;

    #[cfg(target_os = "linux")]
    let mut child = Command::new("xclip")
        .args(["-selection", "clipboard"])
        .stdin(Stdio::piped())
        .spawn()
        .or_else(|_| {
            Command::new("xsel")
                .arg("--clipboard")
                .stdin(Stdio::piped())
                .spawn()
        })
        .context("Failed to launch xclip or xsel")?;

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    anyhow::bail!("Clipboard not supported on this platform");

    #[cfg(any(target_os = "macos", target_os = "linux"))]
    {
        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(text.as_bytes())?;
        }
        let status = child.wait()?;
        anyhow::ensure!(status.success(), "clipboard tool exited with {status}");
        Ok(())
    }
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Collector(CollectorEvent::Progress(fraction)) => Some(Msg::Progress(fraction)),
        EngineEvent::Collector(CollectorEvent::ItemCollected { item, position }) => {
            engine_info!(
                "Collected post {} from position {}: {} chars",
                item.sequence_index,
                position,
                item.text.chars().count()
            );
            None
        }
        EngineEvent::Collector(CollectorEvent::CandidateSkipped { position }) => {
            engine_debug!("Skipped candidate at position {}", position);
            None
        }
        EngineEvent::Collector(CollectorEvent::Scrolled {
            from,
            to,
            rescan_from_top,
        }) => {
            engine_debug!(
                "Scrolled {} -> {} (rescan from top: {})",
                from,
                to,
                rescan_from_top
            );
            None
        }
        EngineEvent::RunFinished(result) => Some(Msg::CollectionFinished {
            items: result.items,
            reason: result.reason,
        }),
    }
}
