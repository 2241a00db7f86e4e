// Copyright (c) 2026 rezky_nightky

//! Terminal host for a [`RainField`]: owns the frame chain and maps input events
//! onto toggle, resize, theme switching and quit.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::frame::Frame;
use crate::palette::{RainStyle, Theme};
use crate::rain::{RainField, StepOutcome};
use crate::scheduler::FrameClock;
use crate::surface::Surface;
use crate::terminal::Terminal;

/// Input poll interval while the frame chain is stopped.
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Toggle,
    Resize(u16, u16),
    Theme(Theme),
    Quit,
    None,
}

fn key_command(k: KeyEvent, screensaver: bool) -> Command {
    if k.kind != KeyEventKind::Press {
        return Command::None;
    }
    if screensaver {
        return Command::Quit;
    }
    match (k.code, k.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => Command::Quit,
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => Command::Quit,
        (KeyCode::Char(' '), _) => Command::Toggle,
        (KeyCode::Char(d), _) => Theme::from_digit(d).map_or(Command::None, Command::Theme),
        _ => Command::None,
    }
}

fn event_command(ev: Event, screensaver: bool) -> Command {
    match ev {
        Event::Resize(w, h) => Command::Resize(w, h),
        Event::Mouse(m) if matches!(m.kind, MouseEventKind::Down(_)) => {
            if screensaver {
                Command::Quit
            } else {
                Command::Toggle
            }
        }
        Event::Key(k) => key_command(k, screensaver),
        _ => Command::None,
    }
}

/// Flips the field on or off. Coming back on restarts the frame chain.
fn toggle_chain<R: Rng>(field: &mut RainField<R>, clock: &mut FrameClock, now: Instant) {
    if field.toggle() {
        clock.arm_now(now);
    }
}

/// Steps the field if a frame is due. The clock is left disarmed; the caller re-arms
/// it only after presenting a drawn frame, so a skipped or failed step ends the chain.
fn run_due_frame<R: Rng, S: Surface + ?Sized>(
    field: &mut RainField<R>,
    surface: &mut S,
    clock: &mut FrameClock,
    now: Instant,
) -> Option<StepOutcome> {
    if !clock.take_due(now) {
        return None;
    }
    match field.step(surface) {
        Ok(StepOutcome::Skipped) => {
            debug!(state = ?field.state(), "frame skipped, chain not re-armed");
            Some(StepOutcome::Skipped)
        }
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!(error = %e, "rain step failed, animation halted");
            None
        }
    }
}

pub fn run(cfg: RunConfig) -> io::Result<()> {
    let rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    info!(
        rows = cfg.rows,
        drops = cfg.drops,
        fps = cfg.fps,
        theme = cfg.theme.name(),
        glyphs = cfg.alphabet.len(),
        color_mode = cfg.color_mode.label(),
        seed = ?cfg.seed,
        "starting rain"
    );

    let mut term = Terminal::new(cfg.color_mode, cfg.color_bg)?;
    let (w, h) = term.size()?;

    let style = RainStyle::from_theme(cfg.theme);
    let mut frame = Frame::new(w, h, style.bg);
    let mut field = RainField::new(&mut frame, cfg.rows, cfg.drops, cfg.alphabet, style, rng)
        .map_err(io::Error::other)?;
    term.draw(&mut frame)?;

    let start_time = Instant::now();
    let end_time = cfg.end_after.map(|d| start_time + d);

    let mut clock = FrameClock::new(cfg.fps);
    clock.arm_now(start_time);

    'frames: loop {
        let mut pending_resize: Option<(u16, u16)> = None;

        // Wait for the next due frame, a resize or the end of the run.
        loop {
            while Terminal::poll_event(Duration::ZERO)? {
                match event_command(Terminal::read_event()?, cfg.screensaver) {
                    Command::Quit => break 'frames,
                    Command::Toggle => toggle_chain(&mut field, &mut clock, Instant::now()),
                    Command::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Command::Theme(t) => {
                        debug!(theme = t.name(), "theme switched");
                        field.set_style(RainStyle::from_theme(t));
                    }
                    Command::None => {}
                }
            }

            if pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if end_time.is_some_and(|end| now >= end) {
                break 'frames;
            }
            let mut timeout = match clock.timeout(now) {
                Some(t) if t.is_zero() => break,
                Some(t) => t,
                None => IDLE_POLL,
            };
            if let Some(end) = end_time {
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if let Some((nw, nh)) = pending_resize {
            frame = Frame::new(nw, nh, field.style().bg);
            if let Err(e) = field.resize(&mut frame) {
                warn!(error = %e, "repaint after resize failed");
            }
            let g = field.geometry();
            debug!(
                cols = g.cols,
                cell_size = g.cell_size,
                drops = field.columns().len(),
                "resized"
            );
            term.draw(&mut frame)?;
        }

        let due = run_due_frame(&mut field, &mut frame, &mut clock, Instant::now());
        if due == Some(StepOutcome::Drawn) {
            term.draw(&mut frame)?;
            clock.arm_after(Instant::now());
        }
    }

    info!(elapsed_s = start_time.elapsed().as_secs_f64(), "rain finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseButton, MouseEvent};

    use crate::charset::Alphabet;
    use crate::geometry::SurfaceSize;
    use crate::palette::Rgba;
    use crate::surface::{Font, Rect, SurfaceError};

    /// Fails every background paint while `broken` is set.
    struct FlakySurface {
        broken: bool,
    }

    impl Surface for FlakySurface {
        fn size(&self) -> SurfaceSize {
            SurfaceSize::new(40, 20)
        }

        fn fill_rect(&mut self, _rect: Rect, _color: Rgba) -> Result<(), SurfaceError> {
            if self.broken {
                return Err(SurfaceError::Detached);
            }
            Ok(())
        }

        fn fill_text(
            &mut self,
            _glyph: char,
            _x: f32,
            _y: f32,
            _font: &Font,
            _color: Rgba,
        ) -> Result<(), SurfaceError> {
            Ok(())
        }
    }

    fn field(surface: &mut FlakySurface) -> RainField<StdRng> {
        RainField::new(
            surface,
            20,
            1,
            Alphabet::default(),
            RainStyle::default(),
            StdRng::seed_from_u64(6),
        )
        .unwrap()
    }

    #[test]
    fn drawn_frame_waits_for_the_caller_to_rearm() {
        let mut s = FlakySurface { broken: false };
        let mut f = field(&mut s);
        let mut clock = FrameClock::new(20.0);
        let t0 = Instant::now();
        clock.arm_now(t0);

        assert_eq!(run_due_frame(&mut f, &mut s, &mut clock, t0), Some(StepOutcome::Drawn));
        assert_eq!(clock.timeout(t0), None);
        clock.arm_after(t0);
        assert_eq!(run_due_frame(&mut f, &mut s, &mut clock, t0), None);
        let later = t0 + Duration::from_millis(50);
        assert_eq!(run_due_frame(&mut f, &mut s, &mut clock, later), Some(StepOutcome::Drawn));
    }

    #[test]
    fn failed_step_halts_chain_until_toggled_twice() {
        let mut s = FlakySurface { broken: false };
        let mut f = field(&mut s);
        let mut clock = FrameClock::new(20.0);
        let t0 = Instant::now();
        clock.arm_now(t0);

        s.broken = true;
        assert_eq!(run_due_frame(&mut f, &mut s, &mut clock, t0), None);
        assert_eq!(clock.timeout(t0), None);

        s.broken = false;
        let t1 = t0 + Duration::from_secs(1);
        assert_eq!(run_due_frame(&mut f, &mut s, &mut clock, t1), None);

        toggle_chain(&mut f, &mut clock, t1);
        assert_eq!(clock.timeout(t1), None);
        toggle_chain(&mut f, &mut clock, t1);
        assert_eq!(clock.timeout(t1), Some(Duration::ZERO));
        assert_eq!(run_due_frame(&mut f, &mut s, &mut clock, t1), Some(StepOutcome::Drawn));
    }

    #[test]
    fn stopped_field_skips_once_and_stays_disarmed() {
        let mut s = FlakySurface { broken: false };
        let mut f = field(&mut s);
        let mut clock = FrameClock::new(20.0);
        let t0 = Instant::now();
        clock.arm_now(t0);

        toggle_chain(&mut f, &mut clock, t0);
        assert_eq!(run_due_frame(&mut f, &mut s, &mut clock, t0), Some(StepOutcome::Skipped));
        assert_eq!(clock.timeout(t0), None);
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click() -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn space_and_click_toggle() {
        let space = key(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(event_command(space, false), Command::Toggle);
        assert_eq!(event_command(click(), false), Command::Toggle);
    }

    #[test]
    fn quit_keys() {
        for ev in [
            key(KeyCode::Char('q'), KeyModifiers::NONE),
            key(KeyCode::Esc, KeyModifiers::NONE),
            key(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            assert_eq!(event_command(ev, false), Command::Quit);
        }
    }

    #[test]
    fn digits_pick_themes() {
        let ev = key(KeyCode::Char('3'), KeyModifiers::NONE);
        assert_eq!(event_command(ev, false), Command::Theme(Theme::Cyan));
        let ev = key(KeyCode::Char('0'), KeyModifiers::NONE);
        assert_eq!(event_command(ev, false), Command::None);
    }

    #[test]
    fn screensaver_quits_on_any_input() {
        let space = key(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(event_command(space, true), Command::Quit);
        assert_eq!(event_command(click(), true), Command::Quit);
        assert_eq!(event_command(Event::Resize(80, 24), true), Command::Resize(80, 24));
    }

    #[test]
    fn key_release_is_ignored() {
        let ev = Event::Key(KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(event_command(ev, false), Command::None);
    }
}
