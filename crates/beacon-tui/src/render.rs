//! Pure view functions.
//!
//! Take a [`Screen`] snapshot by reference and draw it; never mutate state.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::host::Region;
use crate::screen::Screen;

/// Height of the bottom line (status, options, information).
const BOTTOM_LINE_HEIGHT: u16 = 1;

pub fn render(screen: &Screen, frame: &mut Frame) {
    let [main_area, bottom_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(BOTTOM_LINE_HEIGHT),
    ])
    .areas(frame.area());

    render_main(screen, frame, main_area);
    render_bottom_line(screen, frame, bottom_area);
}

fn render_main(screen: &Screen, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = screen
        .region(Region::Main)
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect();

    if let Some(error) = screen.error() {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(error.to_string(), Style::default().fg(Color::Red)),
            Span::styled("  (esc to dismiss)", Style::default().fg(Color::DarkGray)),
        ]));
    }

    let block = Block::default().borders(Borders::ALL).title(" beacon ");
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_bottom_line(screen: &Screen, frame: &mut Frame, area: Rect) {
    let status = Span::styled(
        screen.region(Region::AppStatus).to_string(),
        Style::default().fg(Color::Cyan),
    );
    let information = Span::styled(
        screen.region(Region::Information).to_string(),
        Style::default().fg(Color::DarkGray),
    );
    let options = Span::styled(
        format!(" {}", screen.region(Region::Options)),
        Style::default().fg(Color::Blue),
    );

    let [status_area, options_area, info_area] = Layout::horizontal([
        Constraint::Length(status.width() as u16),
        Constraint::Min(0),
        Constraint::Length(information.width() as u16),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(Line::from(status)), status_area);
    frame.render_widget(Paragraph::new(Line::from(options)), options_area);
    frame.render_widget(Paragraph::new(Line::from(information)), info_area);
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    #[test]
    fn test_bottom_line_order() {
        let mut screen = Screen::default();
        screen.set_region(Region::AppStatus, " Fetching…");
        screen.set_region(Region::Options, "q: quit");
        screen.set_region(Region::Information, "up 1s");

        let mut terminal = Terminal::new(TestBackend::new(40, 4)).unwrap();
        terminal.draw(|frame| render(&screen, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let last_row: String = (0..buffer.area.width)
            .map(|x| buffer[(x, buffer.area.height - 1)].symbol().to_string())
            .collect();

        let status = last_row.find("Fetching").unwrap();
        let options = last_row.find("q: quit").unwrap();
        let info = last_row.find("up 1s").unwrap();
        assert!(status < options && options < info);
    }
}
