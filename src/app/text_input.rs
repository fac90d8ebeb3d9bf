/// Single-line input with a character-indexed cursor
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    content: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the cursor
    pub fn add_char(&mut self, character: char) {
        let at = byte_offset(&self.content, self.cursor);
        self.content.insert(at, character);
        self.cursor += 1;
    }

    /// Removes the character before the cursor (backspace)
    pub fn remove_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = byte_offset(&self.content, self.cursor);
        if at < self.content.len() {
            self.content.remove(at);
        }
    }

    /// Removes the character under the cursor (delete)
    pub fn delete_char(&mut self) {
        let at = byte_offset(&self.content, self.cursor);
        if at < self.content.len() {
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.content.chars().count());
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.content.chars().count();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters
    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Replaces the content and parks the cursor at the end
    pub fn set_content(&mut self, content: String) {
        self.cursor = content.chars().count();
        self.content = content;
    }
}

fn byte_offset(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map_or(value.len(), |(offset, _)| offset)
}

impl From<&str> for TextInput {
    fn from(content: &str) -> Self {
        let mut input = Self::new();
        input.set_content(content.to_string());
        input
    }
}
