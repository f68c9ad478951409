//! Key chords to page commands.
//!
//! While the filter is being edited almost every key is text; only `esc`,
//! `enter` and `ctrl+c` keep their meaning.

use ratatui::crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui_input::backend::crossterm::to_input_request;

use logpane_core::{Event, Navigation};

/// Which page has the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Logs,
    SingleLog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Handled by the active page's filterable viewport.
    View(Event),
    ToggleContext,
    ReverseOrder,
    CycleTimestamps,
    CycleSources,
    TogglePause,
    ClearLogs,
    NudgeUp,
    NudgeDown,
    /// Open the selected log on its own page.
    OpenLog,
    /// Show the log after or before the open one.
    NextLog,
    PrevLog,
    Quit,
}

pub fn map_key(key: KeyEvent, screen: Screen, capturing_input: bool) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    match key.code {
        KeyCode::Esc => return Some(Command::View(Event::Clear)),
        KeyCode::Enter if capturing_input => return Some(Command::View(Event::Accept)),
        _ => {}
    }

    if capturing_input {
        return to_input_request(&TermEvent::Key(key))
            .map(|request| Command::View(Event::FilterInput(request)));
    }

    if ctrl {
        return match key.code {
            KeyCode::Char('u') => Some(nav(Navigation::HalfPageUp)),
            KeyCode::Char('d') => Some(nav(Navigation::HalfPageDown)),
            KeyCode::Char('b') => Some(nav(Navigation::PageUp)),
            KeyCode::Char('f') => Some(nav(Navigation::PageDown)),
            _ => None,
        };
    }

    match screen {
        Screen::Logs => logs_key(key),
        Screen::SingleLog => single_log_key(key),
    }
}

fn logs_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        match key.code {
            KeyCode::Up => return Some(Command::NudgeUp),
            KeyCode::Down => return Some(Command::NudgeDown),
            _ => {}
        }
    }

    let command = match key.code {
        KeyCode::Enter => Command::OpenLog,
        KeyCode::Char('x') => Command::ToggleContext,
        KeyCode::Char('o') => Command::ReverseOrder,
        KeyCode::Char('t') => Command::CycleTimestamps,
        KeyCode::Char('s') => Command::CycleSources,
        KeyCode::Char('p') => Command::TogglePause,
        KeyCode::Char('c') => Command::ClearLogs,
        KeyCode::Up | KeyCode::Char('k') => nav(Navigation::Up),
        KeyCode::Down | KeyCode::Char('j') => nav(Navigation::Down),
        code => return shared_key(code),
    };
    Some(command)
}

/// Plain up/down step through logs; shifted they scroll inside the log.
fn single_log_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        match key.code {
            KeyCode::Up => return Some(nav(Navigation::Up)),
            KeyCode::Down => return Some(nav(Navigation::Down)),
            _ => {}
        }
    }

    let command = match key.code {
        KeyCode::Char('K') => nav(Navigation::Up),
        KeyCode::Char('J') => nav(Navigation::Down),
        KeyCode::Up | KeyCode::Char('k') => Command::PrevLog,
        KeyCode::Down | KeyCode::Char('j') => Command::NextLog,
        code => return shared_key(code),
    };
    Some(command)
}

fn shared_key(code: KeyCode) -> Option<Command> {
    let command = match code {
        KeyCode::Char('/') => Command::View(Event::StartFilter),
        KeyCode::Char('r') => Command::View(Event::StartRegexFilter),
        KeyCode::Char('n') => Command::View(Event::NextMatch),
        KeyCode::Char('N') => Command::View(Event::PrevMatch),
        KeyCode::Char('w') => Command::View(Event::ToggleWrap),
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Left | KeyCode::Char('h') => nav(Navigation::Left),
        KeyCode::Right | KeyCode::Char('l') => nav(Navigation::Right),
        KeyCode::PageUp => nav(Navigation::PageUp),
        KeyCode::PageDown | KeyCode::Char(' ') => nav(Navigation::PageDown),
        KeyCode::Home | KeyCode::Char('g') => nav(Navigation::Top),
        KeyCode::End | KeyCode::Char('G') => nav(Navigation::Bottom),
        _ => return None,
    };
    Some(command)
}

fn nav(n: Navigation) -> Command {
    Command::View(Event::Navigate(n))
}

/// One-line key summary for the status bar.
pub fn hints(screen: Screen, capturing_input: bool) -> &'static str {
    if capturing_input {
        return " type to filter  enter apply  esc discard";
    }
    match screen {
        Screen::Logs => {
            " ↑↓/jk move  enter open  / filter  r regex  n/N match  x context  w wrap  o order  t time  s source  p pause  c clear  q quit"
        }
        Screen::SingleLog => {
            " ↑↓/jk prev/next log  shift+↑↓/JK scroll  / filter  r regex  n/N match  w wrap  esc back  q quit"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_input::InputRequest;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn logs(key: KeyEvent) -> Option<Command> {
        map_key(key, Screen::Logs, false)
    }

    fn single(key: KeyEvent) -> Option<Command> {
        map_key(key, Screen::SingleLog, false)
    }

    #[test]
    fn test_browse_keys() {
        assert_eq!(logs(key(KeyCode::Char('/'))), Some(Command::View(Event::StartFilter)));
        assert_eq!(
            logs(KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT)),
            Some(Command::View(Event::PrevMatch))
        );
        assert_eq!(logs(key(KeyCode::Char('o'))), Some(Command::ReverseOrder));
        assert_eq!(logs(key(KeyCode::Char('G'))), Some(nav(Navigation::Bottom)));
        assert_eq!(
            logs(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Some(nav(Navigation::HalfPageDown))
        );
        assert_eq!(
            logs(KeyEvent::new(KeyCode::Up, KeyModifiers::SHIFT)),
            Some(Command::NudgeUp)
        );
        assert_eq!(logs(key(KeyCode::Enter)), Some(Command::OpenLog));
        assert_eq!(logs(key(KeyCode::F(5))), None);
    }

    #[test]
    fn test_single_log_keys() {
        assert_eq!(single(key(KeyCode::Down)), Some(Command::NextLog));
        assert_eq!(single(key(KeyCode::Char('k'))), Some(Command::PrevLog));
        assert_eq!(
            single(KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT)),
            Some(nav(Navigation::Down))
        );
        assert_eq!(
            single(KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT)),
            Some(nav(Navigation::Up))
        );
        assert_eq!(single(key(KeyCode::Char('/'))), Some(Command::View(Event::StartFilter)));
        assert_eq!(single(key(KeyCode::Esc)), Some(Command::View(Event::Clear)));
        // log stream commands belong to the logs page
        assert_eq!(single(key(KeyCode::Char('o'))), None);
        assert_eq!(single(key(KeyCode::Enter)), None);
    }

    #[test]
    fn test_editing_keys_become_text() {
        for screen in [Screen::Logs, Screen::SingleLog] {
            assert_eq!(
                map_key(key(KeyCode::Char('q')), screen, true),
                Some(Command::View(Event::FilterInput(InputRequest::InsertChar('q'))))
            );
            assert_eq!(
                map_key(key(KeyCode::Backspace), screen, true),
                Some(Command::View(Event::FilterInput(InputRequest::DeletePrevChar)))
            );
            assert_eq!(
                map_key(key(KeyCode::Enter), screen, true),
                Some(Command::View(Event::Accept))
            );
            assert_eq!(
                map_key(key(KeyCode::Esc), screen, true),
                Some(Command::View(Event::Clear))
            );
        }
    }

    #[test]
    fn test_quit_always_available() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c, Screen::Logs, true), Some(Command::Quit));
        assert_eq!(map_key(ctrl_c, Screen::SingleLog, false), Some(Command::Quit));
        assert_eq!(logs(key(KeyCode::Char('c'))), Some(Command::ClearLogs));
    }
}
