use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Paragraph, Widget, Wrap,
    },
};

use scrawl::decision::Verdict;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Splits the frame into status line, drawing canvas, and key legend
pub fn layout_chunks(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// The live capture region: the canvas interior, one cell inside the border
pub fn capture_rect(area: Rect) -> Rect {
    let (_, canvas, _) = layout_chunks(area);
    Rect {
        x: canvas.x.saturating_add(1),
        y: canvas.y.saturating_add(1),
        width: canvas.width.saturating_sub(2),
        height: canvas.height.saturating_sub(2),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let magenta_style = Style::default().fg(Color::Magenta);

        let (status_rect, canvas_rect, legend_rect) = layout_chunks(area);

        let status = match self.state {
            AppState::LabelEntry => Span::styled(
                format!("save capture as: {}_", self.input_buf),
                magenta_style,
            ),
            AppState::ExpectedEntry => Span::styled(
                format!("expected symbol: {}_", self.input_buf),
                magenta_style,
            ),
            _ => {
                if !self.status.is_empty() {
                    Span::styled(self.status.clone(), dim_style)
                } else {
                    match &self.sketch.last_verdict {
                        Some(Verdict::Matched { label, score }) => {
                            Span::styled(format!("{} ({:.3})", label, score), green_bold_style)
                        }
                        Some(Verdict::Unmatched { score }) => Span::styled(
                            format!("no match (best {:.3})", score),
                            red_bold_style,
                        ),
                        None => Span::styled(
                            format!(
                                "min confidence {:.2} | delay {}ms | expecting {} | {} templates",
                                self.sketch.minimum_confidence,
                                self.sketch.commit_delay().as_millis(),
                                self.sketch.expected.as_deref().unwrap_or("anything"),
                                self.sketch.training.len(),
                            ),
                            dim_style,
                        ),
                    }
                }
            }
        };

        Paragraph::new(status)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(status_rect, buf);

        let inner = capture_rect(area);
        let width = f64::from(inner.width);
        let height = f64::from(inner.height);
        let trails = self.sketch.trails();
        let dragging = self.sketch.is_dragging();

        let canvas = Canvas::default()
            .block(Block::bordered().title("draw"))
            .marker(Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for (idx, trail) in trails.iter().enumerate() {
                    let color = if dragging && idx + 1 == trails.len() {
                        Color::Yellow
                    } else {
                        Color::Cyan
                    };

                    if trail.len() == 1 {
                        // a tap leaves a single dot
                        let coords = [(trail[0].0, height - trail[0].1)];
                        ctx.draw(&Points {
                            coords: &coords,
                            color,
                        });
                        continue;
                    }

                    // trails are stored y-down; the canvas paints y-up
                    for pair in trail.windows(2) {
                        ctx.draw(&CanvasLine {
                            x1: pair[0].0,
                            y1: height - pair[0].1,
                            x2: pair[1].0,
                            y2: height - pair[1].1,
                            color,
                        });
                    }
                }
            });

        canvas.render(canvas_rect, buf);

        let legend = match self.state {
            AppState::LabelEntry | AppState::ExpectedEntry => {
                Span::styled("(enter) accept / (esc) cancel", italic_style)
            }
            _ => Span::styled(
                "(mouse) draw / (r)eset / (s)ave / (e)xpect / (h)istory / (+/-) confidence / (esc)ape",
                italic_style,
            ),
        };

        Paragraph::new(legend)
            .alignment(Alignment::Center)
            .render(legend_rect, buf);
    }
}
