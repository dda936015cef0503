use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::config::Settings;
use crate::error::NoteError;
use crate::notes::directory::note_path;
use crate::notes::format::{append_entry, Sequence};
use crate::notes::record::{minutes_seconds, EntryBody, SessionEntry};
use crate::session::flow::{Effect, Event, Flow, Stage};
use crate::session::stopwatch::{format_clock, Stopwatch};

const TICK: Duration = Duration::from_secs(1);
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

const BACK_COMMAND: &str = ":back";
const QUIT_COMMAND: &str = ":q";

/// Everything the main loop reacts to.
enum Message {
    Line(String),
    InputClosed,
    Saved(Result<Sequence, NoteError>),
}

pub fn run(settings: &Settings, quick: bool) -> anyhow::Result<()> {
    let notes_dir = settings.notes_dir()?.to_path_buf();

    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx.clone());

    println!("Deep work timer started. Press Enter to end the current session...");
    let mut stopwatch = Stopwatch::start();
    if !wait_for_stop(&rx, &stopwatch) {
        println!("\nInput closed, session discarded.");
        return Ok(());
    }

    let elapsed = stopwatch.stop();
    let stopped_at = Local::now();
    let (minutes, seconds) = minutes_seconds(elapsed);
    println!("\nTimer stopped. Duration: {} minutes {} seconds", minutes, seconds);

    let path = note_path(&notes_dir, &settings.date_format, stopped_at.date_naive())?;
    let session = Timed {
        start: stopwatch.start_time(),
        end: stopped_at,
        duration: elapsed,
    };

    if quick {
        run_quick(&rx, &path, &session)
    } else {
        run_reflective(&rx, tx, path, &session)
    }
}

/// Wall-clock bounds of the timed session.
struct Timed {
    start: DateTime<Local>,
    end: DateTime<Local>,
    duration: Duration,
}

impl Timed {
    fn entry(&self, body: EntryBody) -> SessionEntry {
        SessionEntry {
            start: self.start.time(),
            end: self.end.time(),
            duration: self.duration,
            body,
        }
    }
}

/// Forward stdin lines to the main loop until EOF.
fn spawn_stdin_reader(tx: Sender<Message>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(Message::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Message::InputClosed);
    });
}

/// Redraw the timer every tick until a line arrives. False if input closed.
fn wait_for_stop(rx: &Receiver<Message>, stopwatch: &Stopwatch) -> bool {
    let mut frame = 0usize;
    loop {
        match rx.recv_timeout(TICK) {
            Ok(Message::Line(_)) => return true,
            Ok(Message::InputClosed) | Err(RecvTimeoutError::Disconnected) => return false,
            Ok(Message::Saved(_)) => {}
            Err(RecvTimeoutError::Timeout) => {
                frame = (frame + 1) % SPINNER.len();
                print!("\r{} Timer: {}", SPINNER[frame], format_clock(stopwatch.elapsed()));
                let _ = std::io::stdout().flush();
            }
        }
    }
}

fn run_reflective(
    rx: &Receiver<Message>,
    tx: Sender<Message>,
    path: PathBuf,
    session: &Timed,
) -> anyhow::Result<()> {
    let mut flow = Flow::new();
    let mut save_error: Option<NoteError> = None;

    let mut effect = flow.handle(Event::Stop {
        elapsed: session.duration,
    });
    println!(
        "Type {} to revisit the previous question, {} to discard the session.",
        BACK_COMMAND, QUIT_COMMAND
    );

    loop {
        match effect {
            Effect::None => {}
            Effect::Prompt(stage) => prompt(stage),
            Effect::Reprompt(reason) => {
                println!("{}", reason);
                prompt(flow.stage());
            }
            Effect::BeginSave(answers) => {
                println!("Saving session...");
                let entry = session.entry(answers.into_body());
                let (tx, path) = (tx.clone(), path.clone());
                thread::spawn(move || {
                    let _ = tx.send(Message::Saved(append_entry(&path, &entry)));
                });
            }
            Effect::Finished => break,
            Effect::Aborted => {
                println!("Session discarded.");
                return Ok(());
            }
        }

        let event = match rx.recv() {
            Ok(Message::Line(line)) => command_event(line),
            Ok(Message::InputClosed) | Err(_) => Event::Quit,
            Ok(Message::Saved(Ok(_))) => Event::SaveSucceeded(path.clone()),
            Ok(Message::Saved(Err(e))) => {
                let reason = e.to_string();
                save_error = Some(e);
                Event::SaveFailed(reason)
            }
        };
        effect = flow.handle(event);
    }

    if let Some(e) = save_error {
        return Err(e.into());
    }
    if let Some(Ok(saved)) = flow.outcome() {
        print_saved(saved, flow.answers().duration);
    }
    Ok(())
}

fn run_quick(rx: &Receiver<Message>, path: &Path, session: &Timed) -> anyhow::Result<()> {
    let rating = loop {
        ask("Rate this session (1-10): ");
        let Some(line) = next_line(rx) else {
            println!("\nSession discarded.");
            return Ok(());
        };
        match line.trim().parse::<u8>() {
            Ok(r) if (1..=10).contains(&r) => break r,
            _ => println!("Enter a number from 1 to 10."),
        }
    };

    ask("Notes (press Enter when done): ");
    let notes = next_line(rx).unwrap_or_default();

    let entry = session.entry(EntryBody::Legacy {
        rating,
        notes: notes.trim().to_string(),
    });
    append_entry(path, &entry)?;

    print_saved(path, session.duration);
    Ok(())
}

fn next_line(rx: &Receiver<Message>) -> Option<String> {
    loop {
        match rx.recv() {
            Ok(Message::Line(line)) => return Some(line),
            Ok(Message::Saved(_)) => {}
            Ok(Message::InputClosed) | Err(_) => return None,
        }
    }
}

fn command_event(line: String) -> Event {
    match line.trim() {
        BACK_COMMAND => Event::Back,
        QUIT_COMMAND => Event::Quit,
        _ => Event::Submit(line),
    }
}

fn prompt(stage: Stage) {
    let question = match stage {
        Stage::Milestone => "What concrete outcome or milestone did you achieve?",
        Stage::FocusQuality => "How would you rate your focus quality? (1-5, Enter for 3)",
        Stage::Interruptions => "Any interruptions or distractions worth noting? (optional)",
        Stage::Reflection => "Quick reflection / what went well or to improve? (optional)",
        Stage::Timing | Stage::Saving | Stage::Done => return,
    };
    println!("\n{}", question);
    ask("> ");
}

fn ask(text: &str) {
    print!("{}", text);
    let _ = std::io::stdout().flush();
}

fn print_saved(path: &Path, duration: Duration) {
    let (minutes, seconds) = minutes_seconds(duration);
    println!("\nSession logged to: {}", path.display());
    println!("Duration: {} minutes {} seconds", minutes, seconds);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_event() {
        assert_eq!(command_event(" :back ".to_string()), Event::Back);
        assert_eq!(command_event(":q".to_string()), Event::Quit);
        assert_eq!(
            command_event("fixed the build".to_string()),
            Event::Submit("fixed the build".to_string())
        );
    }

    #[test]
    fn test_next_line_skips_save_results_and_stops_at_eof() {
        let (tx, rx) = mpsc::channel();
        tx.send(Message::Saved(Ok(Sequence {
            number: 1,
            needs_header: true,
        })))
        .unwrap();
        tx.send(Message::Line("7".to_string())).unwrap();
        tx.send(Message::InputClosed).unwrap();

        assert_eq!(next_line(&rx), Some("7".to_string()));
        assert_eq!(next_line(&rx), None);
    }

    #[test]
    fn test_quick_flow_writes_legacy_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2025-01-10.md");
        let (tx, rx) = mpsc::channel();
        for line in ["11", "8", "  good run "] {
            tx.send(Message::Line(line.to_string())).unwrap();
        }

        let now = Local::now();
        let session = Timed {
            start: now,
            end: now,
            duration: Duration::from_secs(90),
        };
        run_quick(&rx, &path, &session).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("#### Session 1\n"));
        assert!(content.contains("- Duration: 1 minutes 30 seconds\n- Rate: 8/10\n- Notes: good run\n"));
    }

    #[test]
    fn test_reflective_flow_saves_through_worker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2025-01-10.md");
        let (tx, rx) = mpsc::channel();
        for line in ["", "Refactored parser", "9", "4", "Phone", ":back", "Slack", "Ship it"] {
            tx.send(Message::Line(line.to_string())).unwrap();
        }

        let now = Local::now();
        let session = Timed {
            start: now,
            end: now,
            duration: Duration::from_secs(25 * 60),
        };
        run_reflective(&rx, tx, path.clone(), &session).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(
            "- Milestone: Refactored parser\n- Focus Quality: 4/5\n- Interruptions: Slack\n- Reflection: Ship it\n"
        ));
    }

    #[test]
    fn test_reflective_flow_surfaces_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("2025-01-10.md");
        let (tx, rx) = mpsc::channel();
        for line in ["m", "", "", ""] {
            tx.send(Message::Line(line.to_string())).unwrap();
        }

        let now = Local::now();
        let session = Timed {
            start: now,
            end: now,
            duration: Duration::from_secs(60),
        };
        let err = run_reflective(&rx, tx, path, &session).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NoteError>(),
            Some(NoteError::FileWriteFailed { .. })
        ));
    }
}
