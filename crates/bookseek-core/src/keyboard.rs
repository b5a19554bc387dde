//! Keyboard focus over the search bar and the result list.
//!
//! [`KeyboardMachine`] only tracks which element has focus and decides what a
//! key press means. It never touches the page: [`KeyboardMachine::handle`]
//! returns a [`KeyCommand`] and the session carries it out.

/// Where keyboard focus is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    /// Neither the search bar nor a result has focus.
    #[default]
    Unfocused,
    /// The search bar has focus.
    SearchbarFocused,
    /// The result at this index has focus.
    ResultFocused(usize),
}

/// Keys the machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Escape.
    Escape,
    /// Down arrow.
    Down,
    /// Up arrow.
    Up,
    /// Enter.
    Enter,
    /// Any printable character, including the search hotkey.
    Char(char),
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Modifiers {
    /// Alt / Option.
    pub alt: bool,
    /// Control.
    pub ctrl: bool,
    /// Meta / Command.
    pub meta: bool,
    /// Shift.
    pub shift: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        alt: false,
        ctrl: false,
        meta: false,
        shift: false,
    };

    /// Whether any modifier is held.
    pub const fn any(self) -> bool {
        self.alt || self.ctrl || self.meta || self.shift
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Held modifiers.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key pressed without modifiers.
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }
}

/// What the session should do in response to a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Clear the search, blur, hide results, remove highlighting.
    ClearSearch {
        /// Result that had focus and must lose it.
        unfocus_result: Option<usize>,
    },
    /// Reveal the search box and focus it.
    OpenSearchbar {
        /// Result that had focus and must lose it.
        unfocus_result: Option<usize>,
    },
    /// Move focus from the search bar to the first result.
    FocusFirstResult,
    /// Move focus between results.
    MoveResultFocus {
        /// Result losing focus.
        from: usize,
        /// Result gaining focus.
        to: usize,
    },
    /// Move focus from the first result back to the search bar.
    ReturnToSearchbar,
    /// Follow the link of the focused result.
    OpenResult(usize),
}

/// Focus state machine for one page.
#[derive(Debug, Clone)]
pub struct KeyboardMachine {
    state: FocusState,
    hotkey: char,
}

impl KeyboardMachine {
    /// Start unfocused, opening search on `hotkey`.
    pub const fn new(hotkey: char) -> Self {
        Self {
            state: FocusState::Unfocused,
            hotkey,
        }
    }

    /// Current focus.
    pub const fn state(&self) -> FocusState {
        self.state
    }

    /// Apply a key press given the number of rendered results.
    ///
    /// Returns `None` when the key means nothing in the current state; the
    /// state is then unchanged.
    pub fn handle(&mut self, event: KeyEvent, result_count: usize) -> Option<KeyCommand> {
        if event.modifiers.any() {
            return None;
        }

        let focused_result = match self.state {
            FocusState::ResultFocused(i) => Some(i),
            _ => None,
        };

        let (next, command) = match (event.key, self.state) {
            (Key::Escape, _) => (
                FocusState::Unfocused,
                KeyCommand::ClearSearch {
                    unfocus_result: focused_result,
                },
            ),
            (Key::Char(c), state) if self.is_hotkey(c) && state != FocusState::SearchbarFocused => (
                FocusState::SearchbarFocused,
                KeyCommand::OpenSearchbar {
                    unfocus_result: focused_result,
                },
            ),
            (Key::Down, FocusState::SearchbarFocused) if result_count > 0 => {
                (FocusState::ResultFocused(0), KeyCommand::FocusFirstResult)
            },
            (Key::Down, FocusState::ResultFocused(i)) if i + 1 < result_count => (
                FocusState::ResultFocused(i + 1),
                KeyCommand::MoveResultFocus { from: i, to: i + 1 },
            ),
            (Key::Up, FocusState::ResultFocused(0)) => {
                (FocusState::SearchbarFocused, KeyCommand::ReturnToSearchbar)
            },
            (Key::Up, FocusState::ResultFocused(i)) => (
                FocusState::ResultFocused(i - 1),
                KeyCommand::MoveResultFocus { from: i, to: i - 1 },
            ),
            (Key::Enter, FocusState::ResultFocused(i)) if i < result_count => {
                (self.state, KeyCommand::OpenResult(i))
            },
            _ => return None,
        };

        self.state = next;
        Some(command)
    }

    /// The search bar received focus by other means (click, toggle, URL load).
    pub fn focus_searchbar(&mut self) {
        self.state = FocusState::SearchbarFocused;
    }

    /// Focus left the search UI by other means. Returns the result that had focus.
    pub fn unfocus(&mut self) -> Option<usize> {
        let previous = match self.state {
            FocusState::ResultFocused(i) => Some(i),
            _ => None,
        };
        self.state = FocusState::Unfocused;
        previous
    }

    /// The result list was replaced. Drops focus from a result, leaving the
    /// search bar alone, and returns the result that had focus.
    pub fn results_replaced(&mut self) -> Option<usize> {
        match self.state {
            FocusState::ResultFocused(i) => {
                self.state = FocusState::Unfocused;
                Some(i)
            },
            _ => None,
        }
    }

    fn is_hotkey(&self, c: char) -> bool {
        c.eq_ignore_ascii_case(&self.hotkey)
    }
}

impl Default for KeyboardMachine {
    fn default() -> Self {
        Self::new('S')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(machine: &mut KeyboardMachine, key: Key, results: usize) -> Option<KeyCommand> {
        machine.handle(KeyEvent::plain(key), results)
    }

    #[test]
    fn test_hotkey_down_down_up_ends_on_first_result() {
        let mut machine = KeyboardMachine::default();
        press(&mut machine, Key::Char('S'), 2);
        press(&mut machine, Key::Down, 2);
        press(&mut machine, Key::Down, 2);
        press(&mut machine, Key::Up, 2);
        assert_eq!(machine.state(), FocusState::ResultFocused(0));
    }

    #[test]
    fn test_down_without_results_is_noop() {
        let mut machine = KeyboardMachine::default();
        press(&mut machine, Key::Char('s'), 0);
        assert_eq!(press(&mut machine, Key::Down, 0), None);
        assert_eq!(machine.state(), FocusState::SearchbarFocused);

        press(&mut machine, Key::Down, 0);
        press(&mut machine, Key::Up, 0);
        assert_eq!(machine.state(), FocusState::SearchbarFocused);
    }

    #[test]
    fn test_hotkey_opens_searchbar() {
        let mut machine = KeyboardMachine::new('/');
        assert_eq!(
            press(&mut machine, Key::Char('/'), 0),
            Some(KeyCommand::OpenSearchbar {
                unfocus_result: None
            })
        );
        assert_eq!(machine.state(), FocusState::SearchbarFocused);
    }

    #[test]
    fn test_hotkey_while_typing_is_ignored() {
        let mut machine = KeyboardMachine::default();
        machine.focus_searchbar();
        assert_eq!(press(&mut machine, Key::Char('S'), 3), None);
        assert_eq!(machine.state(), FocusState::SearchbarFocused);
    }

    #[test]
    fn test_hotkey_from_result_returns_to_searchbar() {
        let mut machine = KeyboardMachine::default();
        machine.focus_searchbar();
        press(&mut machine, Key::Down, 3);
        press(&mut machine, Key::Down, 3);
        assert_eq!(
            press(&mut machine, Key::Char('S'), 3),
            Some(KeyCommand::OpenSearchbar {
                unfocus_result: Some(1)
            })
        );
        assert_eq!(machine.state(), FocusState::SearchbarFocused);
    }

    #[test]
    fn test_down_stops_at_last_result() {
        let mut machine = KeyboardMachine::default();
        machine.focus_searchbar();
        press(&mut machine, Key::Down, 2);
        assert_eq!(
            press(&mut machine, Key::Down, 2),
            Some(KeyCommand::MoveResultFocus { from: 0, to: 1 })
        );
        assert_eq!(press(&mut machine, Key::Down, 2), None);
        assert_eq!(machine.state(), FocusState::ResultFocused(1));
    }

    #[test]
    fn test_up_from_first_result_returns_to_searchbar() {
        let mut machine = KeyboardMachine::default();
        machine.focus_searchbar();
        press(&mut machine, Key::Down, 1);
        assert_eq!(
            press(&mut machine, Key::Up, 1),
            Some(KeyCommand::ReturnToSearchbar)
        );
        assert_eq!(machine.state(), FocusState::SearchbarFocused);
    }

    #[test]
    fn test_up_from_searchbar_is_noop() {
        let mut machine = KeyboardMachine::default();
        machine.focus_searchbar();
        assert_eq!(press(&mut machine, Key::Up, 4), None);
    }

    #[test]
    fn test_enter_opens_focused_result() {
        let mut machine = KeyboardMachine::default();
        machine.focus_searchbar();
        press(&mut machine, Key::Down, 3);
        press(&mut machine, Key::Down, 3);
        assert_eq!(
            press(&mut machine, Key::Enter, 3),
            Some(KeyCommand::OpenResult(1))
        );
        assert_eq!(machine.state(), FocusState::ResultFocused(1));
    }

    #[test]
    fn test_enter_outside_results_is_noop() {
        let mut machine = KeyboardMachine::default();
        assert_eq!(press(&mut machine, Key::Enter, 3), None);
        machine.focus_searchbar();
        assert_eq!(press(&mut machine, Key::Enter, 3), None);
    }

    #[test]
    fn test_escape_resets_from_anywhere() {
        let mut machine = KeyboardMachine::default();
        machine.focus_searchbar();
        press(&mut machine, Key::Down, 3);
        assert_eq!(
            press(&mut machine, Key::Escape, 3),
            Some(KeyCommand::ClearSearch {
                unfocus_result: Some(0)
            })
        );
        assert_eq!(machine.state(), FocusState::Unfocused);

        assert_eq!(
            press(&mut machine, Key::Escape, 0),
            Some(KeyCommand::ClearSearch {
                unfocus_result: None
            })
        );
    }

    #[test]
    fn test_modifiers_suppress_everything() {
        let mut machine = KeyboardMachine::default();
        let event = KeyEvent {
            key: Key::Char('S'),
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        };
        assert_eq!(machine.handle(event, 0), None);
        assert_eq!(machine.state(), FocusState::Unfocused);

        machine.focus_searchbar();
        let event = KeyEvent {
            key: Key::Escape,
            modifiers: Modifiers {
                shift: true,
                ..Modifiers::NONE
            },
        };
        assert_eq!(machine.handle(event, 0), None);
        assert_eq!(machine.state(), FocusState::SearchbarFocused);
    }

    #[test]
    fn test_unfocus_reports_focused_result() {
        let mut machine = KeyboardMachine::default();
        machine.focus_searchbar();
        press(&mut machine, Key::Down, 2);
        assert_eq!(machine.unfocus(), Some(0));
        assert_eq!(machine.unfocus(), None);
        assert_eq!(machine.state(), FocusState::Unfocused);
    }

    #[test]
    fn test_results_replaced_drops_result_focus_only() {
        let mut machine = KeyboardMachine::default();
        machine.focus_searchbar();
        assert_eq!(machine.results_replaced(), None);
        assert_eq!(machine.state(), FocusState::SearchbarFocused);

        press(&mut machine, Key::Down, 3);
        press(&mut machine, Key::Down, 3);
        assert_eq!(machine.state(), FocusState::ResultFocused(1));
        assert_eq!(machine.results_replaced(), Some(1));
        assert_eq!(machine.state(), FocusState::Unfocused);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let mut machine = KeyboardMachine::default();
        assert_eq!(press(&mut machine, Key::Char('x'), 2), None);
        assert_eq!(press(&mut machine, Key::Down, 2), None);
        assert_eq!(machine.state(), FocusState::Unfocused);
    }
}
