//! Horizontal legend band drawn under the plot.

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, truncate_to_width};

const SWATCH: i32 = 10;
const SWATCH_TO_TEXT: i32 = 6;
const ITEM_GAP: i32 = 18;
/// Longest label shown before truncation, in pixels.
const MAX_LABEL_PX: u32 = 220;

/// Lay items out left to right starting at `start_x`, vertically centered in `area`.
/// Items that no longer fit are dropped; returns how many were drawn.
pub fn draw_legend_row<DB>(
    area: &DrawingArea<DB, Shift>,
    items: &[(String, RGBAColor)],
    start_x: i32,
    font_px: u32,
) -> Result<usize>
where
    DB: DrawingBackend,
{
    let (w, h) = area.dim_in_pixel();
    let (w, cy) = (w as i32, h as i32 / 2);
    let style = TextStyle::from((FontFamily::SansSerif, font_px).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));

    let mut x = start_x;
    let mut drawn = 0;
    for (label, color) in items {
        let label = truncate_to_width(label, font_px, MAX_LABEL_PX);
        let block = SWATCH + SWATCH_TO_TEXT + estimate_text_width_px(&label, font_px) as i32;
        if x + block > w {
            break;
        }
        area.draw(&Rectangle::new(
            [(x, cy - SWATCH / 2), (x + SWATCH, cy + SWATCH / 2)],
            color.filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        area.draw(&Text::new(label, (x + SWATCH + SWATCH_TO_TEXT, cy), style.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;
        x += block + ITEM_GAP;
        drawn += 1;
    }
    Ok(drawn)
}
