use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

use timeline_core::Msg;

/// What one line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Send(Msg),
    Help,
    Quit,
    Unknown(String),
}

pub(crate) const HELP: &str = "\
Commands:
  start | s          start collecting
  stop | x           stop and keep what was gathered
  count N            set the number of posts to collect
  pacing MS          set the pause between steps, in milliseconds
  csv | e            export the results as CSV
  copy | c           print the results as clipboard text
  summary | r        print a prompt for an external summarizer
  help | h           show this list
  quit | q           leave";

pub(crate) fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word.to_lowercase().as_str() {
        "" => Command::Send(Msg::NoOp),
        "start" | "s" => Command::Send(Msg::StartClicked),
        "stop" | "x" => Command::Send(Msg::StopClicked),
        "count" | "n" => Command::Send(Msg::TargetCountChanged(rest.to_string())),
        "pacing" | "p" => Command::Send(Msg::PacingChanged(rest.to_string())),
        "csv" | "e" => Command::Send(Msg::ExportCsvClicked),
        "copy" | "c" => Command::Send(Msg::CopyClicked),
        "summary" | "r" => Command::Send(Msg::SummarizeClicked),
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// Asks one question and returns the trimmed answer, or `None` when the user
/// just pressed Enter.
pub(crate) fn ask(
    reader: &mut impl BufRead,
    out: &mut impl std::io::Write,
    question: &str,
    default: &str,
) -> std::io::Result<Option<String>> {
    write!(out, "{question} [{default}]: ")?;
    out.flush()?;
    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Forwards each stdin line as a command until stdin closes or the receiver
/// goes away. A closed stdin counts as `quit`.
pub(crate) fn spawn_stdin_reader(tx: mpsc::Sender<Command>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(parse_command(&line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Command::Quit);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn words_and_shortcuts_map_to_messages() {
        assert_eq!(parse_command("start"), Command::Send(Msg::StartClicked));
        assert_eq!(parse_command("  X "), Command::Send(Msg::StopClicked));
        assert_eq!(parse_command("e"), Command::Send(Msg::ExportCsvClicked));
        assert_eq!(parse_command("copy"), Command::Send(Msg::CopyClicked));
        assert_eq!(parse_command("r"), Command::Send(Msg::SummarizeClicked));
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("?"), Command::Help);
    }

    #[test]
    fn settings_commands_carry_their_argument() {
        assert_eq!(
            parse_command("count  12"),
            Command::Send(Msg::TargetCountChanged("12".into()))
        );
        assert_eq!(
            parse_command("pacing"),
            Command::Send(Msg::PacingChanged(String::new()))
        );
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command("   "), Command::Send(Msg::NoOp));
        assert_eq!(
            parse_command("dance now"),
            Command::Unknown("dance now".into())
        );
    }

    #[test]
    fn ask_returns_none_on_enter() {
        let mut out = Vec::new();
        let answer = ask(&mut Cursor::new("\n"), &mut out, "Posts", "5").unwrap();
        assert_eq!(answer, None);
        assert_eq!(String::from_utf8(out).unwrap(), "Posts [5]: ");

        let answer = ask(&mut Cursor::new(" 8 \n"), &mut Vec::new(), "Posts", "5").unwrap();
        assert_eq!(answer.as_deref(), Some("8"));
    }
}
