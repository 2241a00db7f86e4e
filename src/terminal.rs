// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};
use tracing::{debug, info};

use crate::cell::{Cell, CellKind};
use crate::config::ColorBg;
use crate::frame::Frame;
use crate::palette::quantize;
use crate::runtime::ColorMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
}

struct LastFrame {
    width: u16,
    height: u16,
    cells: Vec<Option<Cell>>,
}

impl LastFrame {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }
}

pub struct Terminal {
    stdout: Stdout,
    color_mode: ColorMode,
    color_bg: ColorBg,
    last: Option<LastFrame>,
    run_buf: String,
    row_dirty: Vec<Vec<usize>>,
    touched_rows: Vec<u16>,
}

impl Terminal {
    pub fn new(color_mode: ColorMode, color_bg: ColorBg) -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            out.execute(event::EnableMouseCapture)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore(&mut out);
            return Err(e);
        }
        info!(?color_mode, ?color_bg, "terminal ready");
        Ok(Self {
            stdout: out,
            color_mode,
            color_bg,
            last: None,
            run_buf: String::with_capacity(64),
            row_dirty: Vec::new(),
            touched_rows: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    fn pen(&self, cell: &Cell) -> Pen {
        let fg = quantize(cell.fg, self.color_mode);
        let bg = match self.color_bg {
            ColorBg::Theme => quantize(cell.bg, self.color_mode),
            ColorBg::Black => Some(Color::Black),
            ColorBg::Transparent => None,
        };
        Pen {
            fg,
            bg,
            bold: cell.bold,
        }
    }

    fn apply_pen(&mut self, cur: &mut Option<Pen>, pen: Pen) -> Result<()> {
        let prev = *cur;
        if prev.map(|p| p.fg) != Some(pen.fg) {
            self.stdout
                .queue(SetForegroundColor(pen.fg.unwrap_or(Color::Reset)))?;
        }
        if prev.map(|p| p.bg) != Some(pen.bg) {
            self.stdout
                .queue(SetBackgroundColor(pen.bg.unwrap_or(Color::Reset)))?;
        }
        if prev.map(|p| p.bold) != Some(pen.bold) {
            self.stdout.queue(SetAttribute(if pen.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
        }
        *cur = Some(pen);
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let mut cur_pen: Option<Pen> = None;
        let mut cur_pos: Option<(u16, u16)> = None;

        let size_changed = self
            .last
            .as_ref()
            .map(|l| l.width != frame.width || l.height != frame.height)
            .unwrap_or(true);

        let total_cells = frame.width as usize * frame.height as usize;
        let dirty_count = frame.dirty_indices().len();
        let dirty_is_large = total_cells > 0 && dirty_count >= (total_cells / 3);

        if size_changed || frame.is_dirty_all() || dirty_is_large {
            if size_changed {
                debug!(width = frame.width, height = frame.height, "full redraw");
                self.stdout
                    .queue(terminal::Clear(terminal::ClearType::All))?;
                self.last = Some(LastFrame::new(frame.width, frame.height));
            }
            let mut last = self.last.take().unwrap_or_else(|| LastFrame::new(0, 0));

            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    let cell = frame.cell_at_index(idx);
                    if let Some(slot) = last.cells.get_mut(idx) {
                        *slot = Some(cell);
                    }
                    if cell.kind == CellKind::WideTrail {
                        continue;
                    }
                    let pen = self.pen(&cell);
                    self.apply_pen(&mut cur_pen, pen)?;
                    self.stdout.queue(Print(cell.ch))?;
                }
            }
            self.last = Some(last);

            self.stdout.queue(SetAttribute(Attribute::Reset))?;
            self.stdout.queue(ResetColor)?;
            self.stdout.flush()?;

            frame.clear_dirty();
            return Ok(());
        }

        let Some(mut last) = self.last.take() else {
            frame.clear_dirty();
            return Ok(());
        };
        let width_usize = frame.width as usize;

        if self.row_dirty.len() != frame.height as usize {
            self.row_dirty = vec![Vec::new(); frame.height as usize];
        }
        for r in &mut self.row_dirty {
            r.clear();
        }
        self.touched_rows.clear();

        for &idx in frame.dirty_indices() {
            let y = (idx / width_usize) as u16;
            if y >= frame.height {
                continue;
            }
            let b = &mut self.row_dirty[y as usize];
            if b.is_empty() {
                self.touched_rows.push(y);
            }
            b.push(idx);
        }

        self.touched_rows.sort_unstable();

        let mut row_dirty = std::mem::take(&mut self.row_dirty);
        let touched_rows = std::mem::take(&mut self.touched_rows);
        for &y0 in &touched_rows {
            let b = &mut row_dirty[y0 as usize];
            if b.len() > 1 {
                b.sort_unstable();
            }
            let mut i = 0usize;
            while i < b.len() {
                let idx0 = b[i];
                let cell0 = frame.cell_at_index(idx0);
                if last.cells.get(idx0).copied().flatten() == Some(cell0) {
                    i += 1;
                    continue;
                }
                last.cells[idx0] = Some(cell0);
                if cell0.kind == CellKind::WideTrail {
                    i += 1;
                    continue;
                }

                let x0 = (idx0 % width_usize) as u16;
                let pen0 = self.pen(&cell0);

                self.run_buf.clear();
                self.run_buf.push(cell0.ch);
                let mut run_cols: u16 = columns_of(&cell0);
                let mut last_idx_in_run = idx0;
                let mut j = i + 1;

                while j < b.len() {
                    let idx1 = b[j];
                    if idx1 != last_idx_in_run + 1 {
                        break;
                    }

                    let cell1 = frame.cell_at_index(idx1);
                    if cell1.kind == CellKind::WideTrail {
                        // Already covered by the lead glyph printed just before it.
                        last.cells[idx1] = Some(cell1);
                        last_idx_in_run = idx1;
                        j += 1;
                        continue;
                    }
                    if last.cells.get(idx1).copied().flatten() == Some(cell1) {
                        break;
                    }
                    if self.pen(&cell1) != pen0 {
                        break;
                    }

                    self.run_buf.push(cell1.ch);
                    last.cells[idx1] = Some(cell1);
                    run_cols = run_cols.saturating_add(columns_of(&cell1));
                    last_idx_in_run = idx1;
                    j += 1;
                }

                if cur_pos != Some((x0, y0)) {
                    self.stdout.queue(cursor::MoveTo(x0, y0))?;
                }
                self.apply_pen(&mut cur_pen, pen0)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;

                let next_x = x0.saturating_add(run_cols);
                cur_pos = if next_x < frame.width {
                    Some((next_x, y0))
                } else {
                    None
                };

                i = j;
            }
            b.clear();
        }
        self.row_dirty = row_dirty;
        self.touched_rows = touched_rows;
        self.last = Some(last);

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }
}

fn columns_of(cell: &Cell) -> u16 {
    match cell.kind {
        CellKind::WideLead => 2,
        CellKind::Narrow => 1,
        CellKind::WideTrail => 0,
    }
}

fn restore(out: &mut Stdout) {
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore(&mut self.stdout);
        debug!("terminal restored");
    }
}

pub fn restore_terminal_best_effort() {
    restore(&mut stdout());
}
