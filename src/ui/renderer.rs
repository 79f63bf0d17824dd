/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// Each frame is composed into `front`, compared cell by cell with `back`
/// (the previous frame), and only changed cells are written. Commands are
/// batched with `queue!` and flushed once, then the buffers swap.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::team::Team;
use crate::sim::session::SessionPhase;
use super::board::{format_clock, winner_banner, Board};
use super::input::{ConfigForm, FIELD_LABELS};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 14, g: 18, b: 28 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never produced by composition, so a back buffer filled with it
    /// forces every cell to repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell { ch, fg, bg: Cell::BASE_BG });
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg);
    }

    /// Draw `text` in the 3x5 block font. Unknown glyphs render blank.
    fn put_big(&mut self, x: usize, y: usize, text: &str, fg: Color) {
        for (i, ch) in text.chars().enumerate() {
            let rows = big_glyph(ch);
            for (dy, row) in rows.iter().enumerate() {
                for (dx, bit) in row.chars().enumerate() {
                    if bit == '#' {
                        self.set(x + i * 4 + dx, y + dy, Cell { ch: '█', fg, bg: Cell::BASE_BG });
                    }
                }
            }
        }
    }
}

/// Width in columns of `text` drawn with `put_big`.
fn big_width(text: &str) -> usize {
    (text.chars().count() * 4).saturating_sub(1)
}

fn big_glyph(ch: char) -> [&'static str; 5] {
    match ch {
        '0' => ["###", "# #", "# #", "# #", "###"],
        '1' => ["  #", "  #", "  #", "  #", "  #"],
        '2' => ["###", "  #", "###", "#  ", "###"],
        '3' => ["###", "  #", "###", "  #", "###"],
        '4' => ["# #", "# #", "###", "  #", "  #"],
        '5' => ["###", "#  ", "###", "  #", "###"],
        '6' => ["###", "#  ", "###", "# #", "###"],
        '7' => ["###", "  #", "  #", "  #", "  #"],
        '8' => ["###", "# #", "###", "# #", "###"],
        '9' => ["###", "# #", "###", "  #", "###"],
        ':' => ["   ", " # ", "   ", " # ", "   "],
        '-' => ["   ", "   ", "###", "   ", "   "],
        _ => ["   "; 5],
    }
}

// ── Layout ──

const TITLE_ROW: usize = 0;
const CLOCK_ROW: usize = 2;
const PERIOD_ROW: usize = 8;
const TEAM_ROW: usize = 10;
const STATUS_ROW: usize = 18;
const FORM_ROW: usize = 20;
const HELP_ROW: usize = 22;

const HOME_COLOR: Color = Color::Rgb { r: 90, g: 170, b: 255 };
const GUEST_COLOR: Color = Color::Rgb { r: 255, g: 120, b: 80 };
const CLOCK_COLOR: Color = Color::Rgb { r: 255, g: 220, b: 60 };
const DIM: Color = Color::Rgb { r: 110, g: 110, b: 130 };
const ERROR_COLOR: Color = Color::Rgb { r: 255, g: 70, b: 70 };
const PAUSE_COLOR: Color = Color::Rgb { r: 120, g: 230, b: 140 };

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.fit_terminal()
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, board: &Board, form: &ConfigForm, phase: SessionPhase) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.fit_terminal()?;
        }

        self.front.clear();
        self.compose(board, form, phase);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn fit_terminal(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, board: &Board, form: &ConfigForm, phase: SessionPhase) {
        self.front.put_centered(TITLE_ROW, "C O U R T S I D E", DIM);

        let clock = format_clock(board.clock);
        let x = self.front.width.saturating_sub(big_width(&clock)) / 2;
        self.front.put_big(x, CLOCK_ROW, &clock, CLOCK_COLOR);

        let period = format!("QUARTER {}", board.quarter);
        self.front.put_centered(PERIOD_ROW, &period, Color::White);

        self.compose_team(Team::Home, board);
        self.compose_team(Team::Guest, board);
        self.compose_status(board, phase);
        self.compose_form(form);

        self.front.put_str(
            2, HELP_ROW,
            "Q/W/E home +1/2/3   I/O/P guest +1/2/3   TAB field   ENTER new game   ESC quit",
            DIM,
        );
    }

    fn compose_team(&mut self, team: Team, board: &Board) {
        let half = self.front.width / 2;
        let (label, color, center) = match team {
            Team::Home => ("HOME", HOME_COLOR, half / 2),
            Team::Guest => ("GUEST", GUEST_COLOR, half + half / 2),
        };

        self.front.put_str(center.saturating_sub(label.len() / 2), TEAM_ROW, label, color);

        let score = board.score(team).to_string();
        let x = center.saturating_sub(big_width(&score) / 2);
        self.front.put_big(x, TEAM_ROW + 1, &score, color);

        let fouls = format!("fouls {}", board.fouls(team));
        self.front.put_str(center.saturating_sub(fouls.len() / 2), TEAM_ROW + 7, &fouls, DIM);
    }

    fn compose_status(&mut self, board: &Board, phase: SessionPhase) {
        if let Some(winner) = board.winner {
            self.front.put_centered(STATUS_ROW, &format!("*** {} ***", winner_banner(winner)), CLOCK_COLOR);
        } else if board.pause_visible {
            let text = format!("TIMEOUT  {}", format_clock(board.pause_remaining));
            self.front.put_centered(STATUS_ROW, &text, PAUSE_COLOR);
        } else if phase == SessionPhase::Idle {
            self.front.put_centered(STATUS_ROW, "Press ENTER to start a game", DIM);
        }

        if let Some(err) = &board.error {
            self.front.put_centered(STATUS_ROW + 1, err, ERROR_COLOR);
        }
    }

    fn compose_form(&mut self, form: &ConfigForm) {
        let mut x = 2;
        for (i, (label, value)) in FIELD_LABELS.iter().zip(form.fields.iter()).enumerate() {
            let focused = i == form.focus;
            let text = if focused {
                format!("{label}: [{value}_]")
            } else {
                format!("{label}: [{value}]")
            };
            let fg = if focused { Color::White } else { DIM };
            self.front.put_str(x, FORM_ROW, &text, fg);
            x += text.chars().count() + 3;
        }
    }
}
