use crossterm::event::Event as CrossTermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;

use crate::events::Event;
use crate::events::PointerEvent;
use crate::simulation::Command;

/// Steps per second added or removed by `+` and `-`
pub const RATE_STEP: f64 = 5.0;

/// Converts a crossterm event into a lifeloop event
pub fn convert_event(event: CrossTermEvent) -> Option<Event> {
    match event {
        CrossTermEvent::Key(key_event) => convert_key(key_event),
        CrossTermEvent::Mouse(mouse_event) => convert_mouse(mouse_event).map(Event::Pointer),
        CrossTermEvent::Resize(cols, rows) => Some(Event::Viewport { cols, rows }),
        _ => None,
    }
}

fn convert_key(key_event: KeyEvent) -> Option<Event> {
    if key_event.kind == KeyEventKind::Release {
        return None;
    }

    let command = match key_event {
        KeyEvent {
            code: KeyCode::Char('q'),
            ..
        }
        | KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => return Some(Event::Exit),
        KeyEvent {
            code: KeyCode::Char(' '),
            ..
        } => Command::TogglePause,
        KeyEvent {
            code: KeyCode::Char('p'),
            ..
        } => Command::TogglePaintMode,
        KeyEvent {
            code: KeyCode::Char('r'),
            ..
        } => Command::Randomize,
        KeyEvent {
            code: KeyCode::Char('c'),
            ..
        } => Command::Clear,
        KeyEvent {
            code: KeyCode::Char('n'),
            ..
        } => Command::Step,
        KeyEvent {
            code: KeyCode::Char('g'),
            ..
        } => Command::ToggleMesh,
        KeyEvent {
            code: KeyCode::Char('+' | '='),
            ..
        } => Command::AdjustRate(RATE_STEP),
        KeyEvent {
            code: KeyCode::Char('-'),
            ..
        } => Command::AdjustRate(-RATE_STEP),
        _ => return None,
    };

    Some(Event::Command(command))
}

fn convert_mouse(mouse_event: MouseEvent) -> Option<PointerEvent> {
    let MouseEvent {
        kind, column, row, ..
    } = mouse_event;

    match kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Press { column, row }),
        MouseEventKind::Drag(MouseButton::Left) => Some(PointerEvent::Drag { column, row }),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Release { column, row }),
        MouseEventKind::Down(MouseButton::Right) => Some(PointerEvent::Click { column, row }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CrossTermEvent {
        CrossTermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> CrossTermEvent {
        CrossTermEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn command(event: CrossTermEvent) -> Option<Command> {
        match convert_event(event) {
            Some(Event::Command(command)) => Some(command),
            _ => None,
        }
    }

    #[test]
    fn ctrl_c_exits_but_c_clears() {
        assert!(matches!(
            convert_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Event::Exit)
        ));
        assert_eq!(
            command(key(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(Command::Clear)
        );
    }

    #[test]
    fn rate_keys() {
        assert_eq!(
            command(key(KeyCode::Char('+'), KeyModifiers::SHIFT)),
            Some(Command::AdjustRate(RATE_STEP))
        );
        assert_eq!(
            command(key(KeyCode::Char('-'), KeyModifiers::NONE)),
            Some(Command::AdjustRate(-RATE_STEP))
        );
    }

    #[test]
    fn left_button_strokes() {
        let press = convert_event(mouse(MouseEventKind::Down(MouseButton::Left), 3, 4));
        assert!(matches!(
            press,
            Some(Event::Pointer(PointerEvent::Press { column: 3, row: 4 }))
        ));

        let click = convert_event(mouse(MouseEventKind::Down(MouseButton::Right), 1, 2));
        assert!(matches!(
            click,
            Some(Event::Pointer(PointerEvent::Click { column: 1, row: 2 }))
        ));

        assert!(convert_event(mouse(MouseEventKind::Moved, 1, 2)).is_none());
    }

    #[test]
    fn resize_is_a_viewport_change() {
        assert!(matches!(
            convert_event(CrossTermEvent::Resize(120, 40)),
            Some(Event::Viewport {
                cols: 120,
                rows: 40
            })
        ));
    }
}
