//! The single outbound text buffer.

/// Outbound composition buffer. Context-awareness (room vs. DM routing)
/// lives in the session; this only owns the text.
#[derive(Debug, Default)]
pub struct Composer {
    buffer: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffer with the current input text.
    pub fn set(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// The buffer with surrounding whitespace removed; None when nothing
    /// submittable remains.
    pub fn submittable(&self) -> Option<&str> {
        let trimmed = self.buffer.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Clear the buffer without sending.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_only_is_not_submittable() {
        // テスト項目: 空白のみのバッファは送信対象にならない
        let mut composer = Composer::new();
        composer.set("   \t ");
        assert!(composer.submittable().is_none());
        // バッファ自体は変更されない
        assert_eq!(composer.buffer(), "   \t ");
    }

    #[test]
    fn test_submittable_trims() {
        // テスト項目: 送信テキストは前後の空白が除去される
        let mut composer = Composer::new();
        composer.set("  hello ");
        assert_eq!(composer.submittable(), Some("hello"));
    }

    #[test]
    fn test_clear() {
        // テスト項目: cancel でバッファがクリアされる
        let mut composer = Composer::new();
        composer.set("draft");
        composer.clear();
        assert_eq!(composer.buffer(), "");
    }
}
