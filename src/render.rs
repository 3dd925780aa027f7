//! Software rendering of a [`GameSnapshot`] into an RGBA frame buffer.

use crate::game::{GameSnapshot, GameStatus, StopReason};
use crate::geom::{Pos2D, Size2D, Vector2D};

pub type Rgba = (u8, u8, u8, u8);

const BACKGROUND: Rgba = (20, 20, 30, 255);
const CHECKER: Rgba = (25, 25, 35, 255);
const WALL: Rgba = (90, 90, 110, 255);
const APPLE: Rgba = (220, 50, 50, 255);
const HEAD: Rgba = (100, 255, 100, 255);
const EYE: Rgba = (0, 0, 0, 255);
const HUD_TEXT: Rgba = (230, 230, 230, 255);

pub const HUD_HEIGHT: u32 = 24;
const TEXT_SCALE: u32 = 2;

/// Borrowed RGBA frame with clipped drawing primitives.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self { frame, width, height }
    }

    pub fn clear(&mut self, col: Rgba) {
        for px in self.frame.chunks_exact_mut(4) {
            px.copy_from_slice(&[col.0, col.1, col.2, col.3]);
        }
    }

    pub fn blend_pixel(&mut self, x: u32, y: u32, col: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        if idx + 3 >= self.frame.len() {
            return;
        }
        let a = col.3 as u16;
        let ia = 255 - a;
        let mix = |src: u8, dst: u8| ((src as u16 * a + dst as u16 * ia) / 255) as u8;
        self.frame[idx] = mix(col.0, self.frame[idx]);
        self.frame[idx + 1] = mix(col.1, self.frame[idx + 1]);
        self.frame[idx + 2] = mix(col.2, self.frame[idx + 2]);
        self.frame[idx + 3] = 255;
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, col: Rgba) {
        let x2 = (x + w).min(self.width);
        let y2 = (y + h).min(self.height);
        for py in y..y2 {
            for px in x..x2 {
                self.blend_pixel(px, py, col);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: u32, y: u32, w: u32, h: u32, col: Rgba) {
        if w == 0 || h == 0 || self.width == 0 || self.height == 0 {
            return;
        }
        let x2 = (x + w - 1).min(self.width - 1);
        let y2 = (y + h - 1).min(self.height - 1);
        for px in x..=x2 {
            self.blend_pixel(px, y, col);
            self.blend_pixel(px, y2, col);
        }
        for py in y..=y2 {
            self.blend_pixel(x, py, col);
            self.blend_pixel(x2, py, col);
        }
    }

    /// Draw one glyph and return the horizontal advance.
    pub fn draw_char(&mut self, ch: char, x: u32, y: u32, scale: u32, col: Rgba) -> u32 {
        if let Some(rows) = glyph_5x7(ch) {
            for (ry, row) in rows.iter().enumerate() {
                for rx in 0..5u32 {
                    if (row >> (4 - rx)) & 1 == 1 {
                        self.fill_rect(x + rx * scale, y + ry as u32 * scale, scale, scale, col);
                    }
                }
            }
        }
        char_advance(scale)
    }

    pub fn draw_text(&mut self, text: &str, x: u32, y: u32, scale: u32, col: Rgba) {
        let mut cx = x;
        for ch in text.chars() {
            cx += self.draw_char(ch, cx, y, scale, col);
        }
    }

    /// Text centred horizontally on the canvas.
    pub fn draw_text_centered(&mut self, text: &str, y: u32, scale: u32, col: Rgba) {
        let w = text_width(text, scale);
        self.draw_text(text, self.width.saturating_sub(w) / 2, y, scale, col);
    }
}

fn char_advance(scale: u32) -> u32 {
    6 * scale
}

pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * char_advance(scale)
}

fn glyph_5x7(ch: char) -> Option<[u8; 7]> {
    Some(match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001, 0b10001],
        'I' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b10010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ' ' => [0; 7],
        _ => return None,
    })
}

/// One status line drawn above the board.
pub fn hud_text(snap: &GameSnapshot) -> String {
    let state = match snap.status {
        GameStatus::Running => snap.status.as_str(),
        GameStatus::Stopped => snap.stop_reason.as_str(),
    };
    format!(
        "LVL {}  LEN {}  STEP {}  {}",
        snap.level_id,
        snap.snake.len(),
        snap.num_of_step,
        state.to_uppercase()
    )
}

/// Banner lines shown over the board while the game is stopped.
pub fn overlay_lines(snap: &GameSnapshot) -> &'static [&'static str] {
    match (snap.status, snap.stop_reason) {
        (GameStatus::Running, _) => &[],
        (GameStatus::Stopped, StopReason::Paused) => &["PAUSED", "SPACE TO RESUME"],
        (GameStatus::Stopped, StopReason::Won) => &["YOU WON", "PRESS R TO RESTART"],
        (GameStatus::Stopped, StopReason::Lost) => &["GAME OVER", "PRESS R TO RESTART"],
        (GameStatus::Stopped, StopReason::Preparing | StopReason::NotStopping) => {
            &["PRESS SPACE TO START"]
        }
    }
}

/// Lays the board out under a one-line HUD at a fixed cell size.
#[derive(Clone, Copy, Debug)]
pub struct Renderer {
    cell_size: u32,
    width: u32,
    height: u32,
}

impl Renderer {
    /// A renderer whose frame fits any board up to `max_board`.
    pub fn new(cell_size: u32, max_board: Size2D) -> Self {
        Self {
            cell_size,
            width: (max_board.width as u32 * cell_size).max(1),
            height: max_board.height as u32 * cell_size + HUD_HEIGHT,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn cell_origin(&self, pos: Pos2D) -> (u32, u32) {
        (
            pos.x as u32 * self.cell_size,
            pos.y as u32 * self.cell_size + HUD_HEIGHT,
        )
    }

    fn fill_cell(&self, canvas: &mut Canvas<'_>, pos: Pos2D, col: Rgba) {
        let (x, y) = self.cell_origin(pos);
        canvas.fill_rect(x, y, self.cell_size, self.cell_size, col);
    }

    fn draw_eyes(&self, canvas: &mut Canvas<'_>, pos: Pos2D, direction: Vector2D) {
        let (bx, by) = self.cell_origin(pos);
        let c = self.cell_size;
        let (near, far, eye) = (c / 4, c * 3 / 5, (c / 8).max(1));
        let (e1, e2) = match (direction.x.signum(), direction.y.signum()) {
            (1, _) => ((far, near), (far, far)),
            (-1, _) => ((near, near), (near, far)),
            (_, 1) => ((near, far), (far, far)),
            _ => ((near, near), (far, near)),
        };
        canvas.fill_rect(bx + e1.0, by + e1.1, eye, eye, EYE);
        canvas.fill_rect(bx + e2.0, by + e2.1, eye, eye, EYE);
    }

    pub fn draw(&self, frame: &mut [u8], snap: &GameSnapshot) {
        let mut canvas = Canvas::new(frame, self.width, self.height);
        canvas.clear(BACKGROUND);

        let size = snap.board_size;
        for y in 0..size.height as i32 {
            for x in 0..size.width as i32 {
                if (x + y) % 2 == 0 {
                    self.fill_cell(&mut canvas, Pos2D::new(x, y), CHECKER);
                }
            }
        }
        for wall in &snap.walls {
            self.fill_cell(&mut canvas, *wall, WALL);
        }
        for apple in &snap.apples {
            self.fill_cell(&mut canvas, *apple, APPLE);
        }
        // tail first so the head stays on top when segments overlap
        for (i, seg) in snap.snake.iter().enumerate().skip(1).rev() {
            let brightness = 200 - (i * 10).min(100) as u8;
            self.fill_cell(&mut canvas, seg.pos, (50, brightness, 50, 255));
        }
        if let Some(head) = snap.snake.first() {
            self.fill_cell(&mut canvas, head.pos, HEAD);
            self.draw_eyes(&mut canvas, head.pos, head.direction);
        }
        let board_w = size.width as u32 * self.cell_size;
        let board_h = size.height as u32 * self.cell_size;
        canvas.stroke_rect(0, HUD_HEIGHT, board_w, board_h, (255, 255, 255, 60));

        let hud_y = (HUD_HEIGHT - 7 * TEXT_SCALE) / 2;
        canvas.draw_text(&hud_text(snap), 4, hud_y, TEXT_SCALE, HUD_TEXT);

        let lines = overlay_lines(snap);
        if !lines.is_empty() {
            canvas.fill_rect(0, HUD_HEIGHT, self.width, board_h, (0, 0, 0, 140));
            let line_h = 10 * TEXT_SCALE;
            let top = (HUD_HEIGHT + board_h / 2).saturating_sub(line_h * lines.len() as u32 / 2);
            for (i, line) in lines.iter().enumerate() {
                let col = if i == 0 { (255, 255, 100, 255) } else { (200, 200, 200, 255) };
                canvas.draw_text_centered(line, top + i as u32 * line_h, TEXT_SCALE, col);
            }
        }
    }

    /// Shown in place of the board after a fatal error.
    pub fn draw_error(&self, frame: &mut [u8]) {
        let mut canvas = Canvas::new(frame, self.width, self.height);
        canvas.clear(BACKGROUND);
        let color = (255, 100, 100, 255);
        canvas.draw_text_centered("ERROR - PRESS R", self.height / 2, TEXT_SCALE, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::SnakeSeg;

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]
    }

    fn snapshot() -> GameSnapshot {
        GameSnapshot {
            level_id: "T001".to_owned(),
            board_size: Size2D::new(4, 3),
            snake: vec![
                SnakeSeg::new(Pos2D::new(2, 1), Vector2D::RIGHT),
                SnakeSeg::new(Pos2D::new(1, 1), Vector2D::RIGHT),
            ],
            apples: vec![Pos2D::new(3, 1)],
            walls: vec![Pos2D::new(0, 0)],
            empty_poses: vec![],
            num_of_step: 7,
            status: GameStatus::Running,
            stop_reason: StopReason::NotStopping,
        }
    }

    #[test]
    fn blending_respects_alpha_and_bounds() {
        let mut frame = vec![0u8; 2 * 2 * 4];
        let mut canvas = Canvas::new(&mut frame, 2, 2);
        canvas.clear((100, 100, 100, 255));
        canvas.blend_pixel(0, 0, (200, 0, 0, 255));
        canvas.blend_pixel(1, 0, (200, 0, 0, 0));
        canvas.blend_pixel(5, 5, (0, 0, 0, 255));
        canvas.fill_rect(1, 1, 10, 10, (0, 0, 0, 255));

        assert_eq!(pixel(&frame, 2, 0, 0), [200, 0, 0, 255]);
        assert_eq!(pixel(&frame, 2, 1, 0), [100, 100, 100, 255]);
        assert_eq!(pixel(&frame, 2, 1, 1), [0, 0, 0, 255]);
        assert_eq!(pixel(&frame, 2, 0, 1), [100, 100, 100, 255]);
    }

    #[test]
    fn text_advances_per_glyph() {
        assert_eq!(text_width("GAME", 2), 48);
        let mut frame = vec![0u8; 20 * 10 * 4];
        let mut canvas = Canvas::new(&mut frame, 20, 10);
        assert_eq!(canvas.draw_char('?', 0, 0, 1, HUD_TEXT), 6);
        assert!(frame.iter().all(|b| *b == 0));
    }

    #[test]
    fn hud_and_overlays_follow_status() {
        let mut snap = snapshot();
        assert_eq!(hud_text(&snap), "LVL T001  LEN 2  STEP 7  RUNNING");
        assert!(overlay_lines(&snap).is_empty());
        snap.status = GameStatus::Stopped;
        snap.stop_reason = StopReason::Paused;
        assert!(hud_text(&snap).ends_with("PAUSED"));

        snap.status = GameStatus::Stopped;
        snap.stop_reason = StopReason::Won;
        assert_eq!(overlay_lines(&snap)[0], "YOU WON");
        snap.stop_reason = StopReason::Lost;
        assert_eq!(overlay_lines(&snap)[0], "GAME OVER");
        snap.stop_reason = StopReason::Preparing;
        assert_eq!(overlay_lines(&snap), &["PRESS SPACE TO START"]);
    }

    #[test]
    fn board_cells_land_under_the_hud() {
        let renderer = Renderer::new(8, Size2D::new(4, 3));
        assert_eq!((renderer.width(), renderer.height()), (32, 24 + HUD_HEIGHT));

        let mut frame = vec![0u8; (renderer.width() * renderer.height() * 4) as usize];
        renderer.draw(&mut frame, &snapshot());

        let w = renderer.width();
        let centre = |pos: Pos2D| (pos.x as u32 * 8 + 4, pos.y as u32 * 8 + HUD_HEIGHT + 4);
        let (x, y) = centre(Pos2D::new(3, 1));
        assert_eq!(pixel(&frame, w, x, y), [220, 50, 50, 255]);
        let (x, y) = centre(Pos2D::new(0, 0));
        assert_eq!(pixel(&frame, w, x, y), [90, 90, 110, 255]);
        // head corner, clear of the eyes
        let (x, y) = (2 * 8, HUD_HEIGHT + 8);
        assert_eq!(pixel(&frame, w, x, y), [100, 255, 100, 255]);
    }
}
