use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Line editing for the filter prompts. Filter terms are short, so the
/// editor only supports append and backspace.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => self.finished = true,
            (KeyCode::Esc, KeyModifiers::NONE) => {
                self.current_input.clear();
                self.canceled = true;
                self.finished = true;
            }
            (KeyCode::Backspace, KeyModifiers::NONE) => {
                self.current_input.pop();
            }
            (code, _) => {
                if let Some(chr) = code.as_char() {
                    self.current_input.push(chr);
                }
            }
        }
        self.get()
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            finished: self.finished,
            canceled: self.canceled,
        }
    }

    pub fn clear(&mut self) {
        self.current_input.clear();
        self.finished = false;
        self.canceled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn collects_characters_until_enter() {
        let mut input = Inputter::default();
        input.read(press(KeyCode::Char('e')));
        input.read(press(KeyCode::Char('u')));
        input.read(press(KeyCode::Char('x')));
        input.read(press(KeyCode::Backspace));
        input.read(press(KeyCode::Char('r')));
        let result = input.read(press(KeyCode::Enter));
        assert!(result.finished);
        assert!(!result.canceled);
        assert_eq!(result.input, "eur");
    }

    #[test]
    fn escape_cancels_and_discards() {
        let mut input = Inputter::default();
        input.read(press(KeyCode::Char('x')));
        let result = input.read(press(KeyCode::Esc));
        assert!(result.finished);
        assert!(result.canceled);
        assert_eq!(result.input, "");
    }
}
