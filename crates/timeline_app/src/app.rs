use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use engine_logging::{engine_info, LogDestination, DEFAULT_LOG_FILE};
use timeline_core::{update, AppState, Msg, SessionState};
use timeline_engine::{Collector, CollectorHandle, PollForElement};

use crate::cli::Cli;
use crate::effects::EffectRunner;
use crate::input::{self, Command, HELP};
use crate::render::render;
use crate::settings_file;
use crate::source;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let destination = if cli.verbose {
        LogDestination::Both(PathBuf::from(DEFAULT_LOG_FILE))
    } else {
        LogDestination::File(PathBuf::from(DEFAULT_LOG_FILE))
    };
    engine_logging::initialize(destination, cli.log_level);

    let settings = settings_file::load_or_default(&cli.settings);
    let opened = source::open(&cli)?;
    let mut collector = Collector::new(settings);
    if cli.poll {
        collector = collector.with_wait_policy(Arc::new(PollForElement::default()));
    }
    let handle = CollectorHandle::new(collector, opened.host.clone())
        .context("starting collector thread")?;
    let mut session = Session::new(EffectRunner::new(handle, cli.output.clone(), io::stdout()));

    session.ask_request_inputs()?;
    session.dispatch(Msg::StartClicked);
    println!("Type `help` for commands.");

    let (tx, rx) = mpsc::channel();
    input::spawn_stdin_reader(tx);
    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Command::Send(msg)) => session.dispatch(msg),
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Unknown(line)) => println!("Unknown command {line:?}. {HELP}"),
            Ok(Command::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
        for msg in session.runner.poll_events() {
            session.dispatch(msg);
        }
    }

    if session.state.session() == SessionState::Collecting {
        session.runner.cancel();
    }
    engine_info!("Leaving with {} collected posts", session.state.items().len());
    Ok(())
}

struct Session<W: Write> {
    state: AppState,
    runner: EffectRunner<W>,
}

impl<W: Write> Session<W> {
    fn new(runner: EffectRunner<W>) -> Self {
        Self {
            state: AppState::new(),
            runner,
        }
    }

    fn ask_request_inputs(&mut self) -> anyhow::Result<()> {
        let view = self.state.view();
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let mut out = io::stdout();
        let count = input::ask(&mut reader, &mut out, "Posts to collect", &view.target_input)?;
        if let Some(count) = count {
            self.dispatch(Msg::TargetCountChanged(count));
        }
        let pacing = input::ask(&mut reader, &mut out, "Pacing (ms)", &view.pacing_input)?;
        if let Some(pacing) = pacing {
            self.dispatch(Msg::PacingChanged(pacing));
        }
        Ok(())
    }

    /// Applies `msg` and every message its effects answer with, rendering
    /// after each change.
    fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            let was_dirty = state.consume_dirty();
            let view = state.view();
            self.state = state;

            if was_dirty {
                let _ = writeln!(self.runner.out(), "{}", render(&view));
            }
            queue.extend(self.runner.run(effects));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use timeline_engine::StaticPage;

    fn session(output_dir: PathBuf) -> Session<Vec<u8>> {
        let host = Arc::new(StaticPage::new("https://x.test/", "<html></html>"));
        let handle = CollectorHandle::new(Collector::default(), host).unwrap();
        Session::new(EffectRunner::new(handle, output_dir, Vec::new()))
    }

    fn printed(session: &mut Session<Vec<u8>>) -> String {
        String::from_utf8(std::mem::take(session.runner.out())).unwrap()
    }

    #[test]
    fn invalid_input_is_shown_and_nothing_starts() {
        let temp = TempDir::new().unwrap();
        let mut session = session(temp.path().to_path_buf());

        session.dispatch(Msg::TargetCountChanged("zero".into()));
        session.dispatch(Msg::StartClicked);

        assert_eq!(session.state.session(), SessionState::Idle);
        assert!(printed(&mut session).contains("! "));
    }

    #[test]
    fn empty_page_run_finishes_and_renders() {
        let temp = TempDir::new().unwrap();
        let mut session = session(temp.path().to_path_buf());
        session.dispatch(Msg::TargetCountChanged("1".into()));
        session.dispatch(Msg::PacingChanged("1".into()));
        session.dispatch(Msg::StartClicked);
        assert_eq!(session.state.session(), SessionState::Collecting);

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while session.state.session() == SessionState::Collecting {
            assert!(std::time::Instant::now() < deadline, "run did not finish");
            for msg in session.runner.poll_events() {
                session.dispatch(msg);
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(session.state.session(), SessionState::Finished);
        assert!(session.state.items().is_empty());
        assert!(printed(&mut session).contains("Finished (timeline exhausted): 0 posts"));
    }
}
