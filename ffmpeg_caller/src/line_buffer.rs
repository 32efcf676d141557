/// Accumulates the characters of the line ffmpeg is currently writing.
#[derive(Debug, Default)]
pub struct LineBuffer {
    value: String,
}

impl LineBuffer {
    pub fn new() -> LineBuffer {
        LineBuffer::default()
    }

    pub fn write(&mut self, text: &str) {
        self.value.push_str(text);
    }

    pub fn write_char(&mut self, c: char) {
        self.value.push(c);
    }

    /// Current content, left in place.
    pub fn peek(&self) -> &str {
        &self.value
    }

    /// Current content; the buffer is empty afterwards.
    pub fn pop(&mut self) -> String {
        std::mem::take(&mut self.value)
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
