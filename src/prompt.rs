//! Interactive prompts
//!
//! Raw-mode keyboard prompts over crossterm, plus the step spinner used
//! while subprocesses run. Raw mode is scoped to a guard so the terminal
//! is restored on every exit path, including panics. While raw mode is
//! active Ctrl-C arrives as a key event instead of a signal, so the
//! prompts treat it as a cancel answer. Raw-mode and rendering failures
//! surface as terminal errors rather than plain IO.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveToColumn, MoveUp, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{self, Clear, ClearType};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{RechainError, Result};
use crate::manager::PackageManager;

/// Keeps raw mode on for its lifetime and always turns it back off.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), Hide)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show);
        let _ = terminal::disable_raw_mode();
    }
}

fn terminal_error(action: &str, e: io::Error) -> RechainError {
    RechainError::terminal(format!("{}: {}", action, e))
}

/// Arrow-key menu over the supported package managers.
///
/// Uninstalled managers are shown dimmed and cannot be selected. The cursor
/// starts on `detected` when it is installed, otherwise on the first
/// installed entry. Returns `Ok(None)` when the user cancels.
pub fn select_manager(
    detected: PackageManager,
    options: &[(PackageManager, bool)],
) -> Result<Option<PackageManager>> {
    let enabled: Vec<bool> = options.iter().map(|&(_, installed)| installed).collect();
    if !enabled.contains(&true) {
        return Err(RechainError::precondition(
            "No supported package manager is installed. Install npm, pnpm, yarn or bun and retry.",
        ));
    }
    run_select(detected, options, &enabled)
        .map_err(|e| terminal_error("Selection prompt failed", e))
}

fn run_select(
    detected: PackageManager,
    options: &[(PackageManager, bool)],
    enabled: &[bool],
) -> io::Result<Option<PackageManager>> {
    let mut cursor = initial_cursor(detected, options);
    let mut out = io::stdout();
    writeln!(out, "Select the package manager to reinstall with:")?;
    let guard = RawModeGuard::enable()?;
    render_menu(&mut out, detected, options, cursor)?;

    let picked = loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                cursor = step_cursor(enabled, cursor, -1);
                redraw_menu(&mut out, detected, options, cursor)?;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                cursor = step_cursor(enabled, cursor, 1);
                redraw_menu(&mut out, detected, options, cursor)?;
            }
            KeyCode::Enter => break Some(options[cursor].0),
            KeyCode::Esc | KeyCode::Char('q') => break None,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break None,
            _ => {}
        }
    };

    erase_lines(&mut out, options.len())?;
    drop(guard);
    match picked {
        Some(pm) => println!("{} {}", "✓".green(), pm),
        None => println!("{}", "cancelled".dim()),
    }
    Ok(picked)
}

/// Yes/no question defaulting to yes. Returns `Ok(None)` on cancel.
pub fn confirm(question: &str) -> Result<Option<bool>> {
    read_confirm(question).map_err(|e| terminal_error("Confirmation prompt failed", e))
}

fn read_confirm(question: &str) -> io::Result<Option<bool>> {
    let mut out = io::stdout();
    write!(out, "{} {} ", question, "[Y/n]".dim())?;
    out.flush()?;
    let guard = RawModeGuard::enable()?;

    let answer = loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        match code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => break Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') => break Some(false),
            KeyCode::Esc | KeyCode::Char('q') => break None,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break None,
            _ => {}
        }
    };

    drop(guard);
    match answer {
        Some(true) => println!("yes"),
        Some(false) => println!("no"),
        None => println!("{}", "cancelled".dim()),
    }
    Ok(answer)
}

/// Spinner shown while a single step runs. Callers clear it themselves.
pub fn step_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn initial_cursor(detected: PackageManager, options: &[(PackageManager, bool)]) -> usize {
    options
        .iter()
        .position(|&(pm, installed)| pm == detected && installed)
        .or_else(|| options.iter().position(|&(_, installed)| installed))
        .unwrap_or(0)
}

/// Move the cursor by `delta`, skipping disabled entries and staying put
/// when there is nothing selectable in that direction.
fn step_cursor(enabled: &[bool], current: usize, delta: isize) -> usize {
    let mut index = current as isize;
    loop {
        index += delta;
        if index < 0 || index as usize >= enabled.len() {
            return current;
        }
        if enabled[index as usize] {
            return index as usize;
        }
    }
}

fn render_menu(
    out: &mut impl Write,
    detected: PackageManager,
    options: &[(PackageManager, bool)],
    cursor: usize,
) -> io::Result<()> {
    for (i, &(pm, installed)) in options.iter().enumerate() {
        let mut label = pm.to_string();
        if pm == detected {
            label.push_str(" (detected)");
        }
        let line = if !installed {
            format!("  {} (not installed)", label).dim().to_string()
        } else if i == cursor {
            format!("> {}", label).cyan().to_string()
        } else {
            format!("  {}", label)
        };
        // Raw mode needs an explicit carriage return
        write!(out, "{}\r\n", line)?;
    }
    out.flush()?;
    Ok(())
}

fn redraw_menu(
    out: &mut impl Write,
    detected: PackageManager,
    options: &[(PackageManager, bool)],
    cursor: usize,
) -> io::Result<()> {
    erase_lines(out, options.len())?;
    render_menu(out, detected, options, cursor)
}

fn erase_lines(out: &mut impl Write, lines: usize) -> io::Result<()> {
    execute!(
        out,
        MoveUp(lines as u16),
        MoveToColumn(0),
        Clear(ClearType::FromCursorDown)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [bool; 4] = [true, true, true, true];

    #[test]
    fn test_step_cursor_moves_one_entry() {
        assert_eq!(step_cursor(&ALL, 1, 1), 2);
        assert_eq!(step_cursor(&ALL, 1, -1), 0);
    }

    #[test]
    fn test_step_cursor_clamps_at_the_edges() {
        assert_eq!(step_cursor(&ALL, 0, -1), 0);
        assert_eq!(step_cursor(&ALL, 3, 1), 3);
    }

    #[test]
    fn test_step_cursor_skips_disabled_entries() {
        let enabled = [true, false, false, true];
        assert_eq!(step_cursor(&enabled, 0, 1), 3);
        assert_eq!(step_cursor(&enabled, 3, -1), 0);
    }

    #[test]
    fn test_step_cursor_stays_when_direction_is_all_disabled() {
        let enabled = [false, true, false, false];
        assert_eq!(step_cursor(&enabled, 1, 1), 1);
        assert_eq!(step_cursor(&enabled, 1, -1), 1);
    }

    #[test]
    fn test_initial_cursor_prefers_the_detected_manager() {
        let options = [
            (PackageManager::Pnpm, true),
            (PackageManager::Yarn, true),
            (PackageManager::Npm, true),
            (PackageManager::Bun, true),
        ];
        assert_eq!(initial_cursor(PackageManager::Yarn, &options), 1);
    }

    #[test]
    fn test_initial_cursor_falls_back_to_the_first_installed() {
        let options = [
            (PackageManager::Pnpm, false),
            (PackageManager::Yarn, false),
            (PackageManager::Npm, true),
            (PackageManager::Bun, true),
        ];
        assert_eq!(initial_cursor(PackageManager::Pnpm, &options), 2);
    }

    #[test]
    fn test_prompt_failures_surface_as_terminal_errors() {
        let cause = io::Error::new(io::ErrorKind::Unsupported, "inappropriate ioctl for device");
        let err = terminal_error("Selection prompt failed", cause);
        assert!(matches!(err, RechainError::Terminal(_)));
        assert_eq!(
            err.to_string(),
            "Terminal error: Selection prompt failed: inappropriate ioctl for device"
        );
    }

    #[test]
    fn test_select_requires_an_installed_manager() {
        let options = [
            (PackageManager::Pnpm, false),
            (PackageManager::Yarn, false),
            (PackageManager::Npm, false),
            (PackageManager::Bun, false),
        ];
        let result = select_manager(PackageManager::Npm, &options);
        assert!(matches!(result, Err(RechainError::Precondition(_))));
    }
}
