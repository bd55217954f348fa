//! Input source: crossterm key events → engine messages.

use std::{
    io::{stdout, Write},
    time::Duration,
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};

use fire_keys::{
    input::{Action, InputTranslator, Key, KeyboardLayout, SustainMode},
    synth::{monitor::ReportReceiver, SynthHandle},
};

/// How long to wait for a key before checking render reports again.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Read keys until ESC (or Ctrl+C), forwarding them to the engine.
///
/// Puts the terminal in raw mode for the duration. When the terminal can
/// report key releases the space bar works as a held pedal, otherwise each
/// press toggles it.
pub fn run(handle: &SynthHandle, mut reports: ReportReceiver) -> EyreResult<()> {
    terminal::enable_raw_mode()?;

    let releases = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if releases {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let mode = if releases {
        SustainMode::Hold
    } else {
        SustainMode::Toggle
    };
    let mut input = InputTranslator::new(KeyboardLayout::piano(), mode);

    let result = event_loop(handle, &mut input, &mut reports);

    if releases {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    }
    terminal::disable_raw_mode()?;
    result
}

fn event_loop(
    handle: &SynthHandle,
    input: &mut InputTranslator,
    reports: &mut ReportReceiver,
) -> EyreResult<()> {
    loop {
        for report in reports.drain() {
            if report.overran() {
                log::warn!(
                    "render overran: {:.2} ms for {:.2} ms of audio ({} voices)",
                    report.elapsed.as_secs_f64() * 1000.0,
                    report.deadline.as_secs_f64() * 1000.0,
                    report.voices
                );
            }
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        let Some(key) = map_key(&key_event) else {
            continue;
        };

        let action = match key_event.kind {
            KeyEventKind::Press => input.press(key),
            KeyEventKind::Release => input.release(key),
            // Auto-repeat would restart the note every few milliseconds
            KeyEventKind::Repeat => None,
        };

        match action {
            Some(Action::Quit) => break,
            Some(Action::OctaveChanged(octave)) => status(&format!("Octave shift {octave:+}"))?,
            Some(Action::Sustain(active)) => {
                handle.set_sustain(active);
                status(if active {
                    "Sustain pedal ON"
                } else {
                    "Sustain pedal OFF"
                })?;
            }
            Some(other) => {
                if let Some(msg) = other.message() {
                    handle.send(msg);
                }
            }
            None => {}
        }
    }

    Ok(())
}

fn map_key(event: &KeyEvent) -> Option<Key> {
    // Raw mode swallows SIGINT, so treat Ctrl+C as ESC
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(event.code, KeyCode::Char('c')).then_some(Key::Escape);
    }

    match event.code {
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        _ => None,
    }
}

/// Print one line while the terminal is in raw mode.
fn status(message: &str) -> EyreResult<()> {
    let mut out = stdout();
    write!(out, "{message}\r\n")?;
    out.flush()?;
    Ok(())
}
