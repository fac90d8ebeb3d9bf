impl crate::app::App {
    pub fn scroll_chat_up_lines(&mut self, lines: usize) {
        // manual scroll pins the view until the user returns to the bottom
        self.chat_auto_scroll = false;
        self.chat_scroll_offset = self.chat_scroll_offset.saturating_add(lines);
    }

    pub fn scroll_chat_down_lines(&mut self, lines: usize) {
        self.chat_scroll_offset = self.chat_scroll_offset.saturating_sub(lines);
        if self.chat_scroll_offset == 0 {
            self.chat_auto_scroll = true;
        }
    }

    pub fn scroll_chat_up_page(&mut self) {
        self.scroll_chat_up_lines(20);
    }

    pub fn scroll_chat_down_page(&mut self) {
        self.scroll_chat_down_lines(20);
    }

    pub fn reset_chat_scroll(&mut self) {
        self.chat_scroll_offset = 0;
        self.chat_auto_scroll = true;
    }
}
