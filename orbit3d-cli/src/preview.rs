/// True-color terminal preview of a rendered framebuffer
use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal, QueueableCommand,
};
use orbit3d_core::Framebuffer;
use std::io::{self, Write};

/// Upper half block: foreground paints the top pixel, background the bottom
const HALF_BLOCK: char = '▀';

/// Downsamples a framebuffer into terminal cells, two pixel rows per cell
pub struct TerminalPreview {
    columns: usize,
    rows: usize,
}

impl TerminalPreview {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    /// Size the preview to the current terminal, leaving a line for the prompt
    pub fn fit_terminal() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::new(width as usize, height.saturating_sub(1) as usize))
    }

    /// Grid size that keeps the framebuffer's aspect ratio inside the terminal
    pub fn cell_grid(&self, framebuffer: &Framebuffer) -> (usize, usize) {
        let (fw, fh) = (framebuffer.width().max(1), framebuffer.height().max(1));
        // Each cell is one pixel wide and two pixels tall in preview space
        let scale = (self.columns as f32 / fw as f32).min((self.rows * 2) as f32 / fh as f32);
        let columns = ((fw as f32 * scale).round() as usize).clamp(1, self.columns);
        let rows = ((fh as f32 * scale / 2.0).round() as usize).clamp(1, self.rows);
        (columns, rows)
    }

    pub fn draw<W: Write>(&self, framebuffer: &Framebuffer, writer: &mut W) -> io::Result<()> {
        let (columns, rows) = self.cell_grid(framebuffer);

        for row in 0..rows {
            for column in 0..columns {
                let top = sample(framebuffer, column, row * 2, columns, rows * 2);
                let bottom = sample(framebuffer, column, row * 2 + 1, columns, rows * 2);

                writer.queue(SetForegroundColor(to_color(top)))?;
                writer.queue(SetBackgroundColor(to_color(bottom)))?;
                writer.queue(Print(HALF_BLOCK))?;
            }
            writer.queue(ResetColor)?;
            writer.queue(Print('\n'))?;
        }
        writer.flush()
    }
}

/// Nearest framebuffer pixel for a preview-space coordinate
fn sample(
    framebuffer: &Framebuffer,
    x: usize,
    y: usize,
    columns: usize,
    pixel_rows: usize,
) -> [u8; 4] {
    let fx = x * framebuffer.width() / columns;
    let fy = y * framebuffer.height() / pixel_rows;
    framebuffer.get(fx, fy).unwrap_or([0; 4])
}

fn to_color([r, g, b, a]: [u8; 4]) -> Color {
    if a == 0 {
        Color::Reset
    } else {
        Color::Rgb { r, g, b }
    }
}
