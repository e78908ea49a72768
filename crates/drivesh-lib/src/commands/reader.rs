//! Line reader and whitespace tokenizer for the interactive shell.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::errors::Result;

pub struct CommandReader<R> {
    input: R,
    line: String,
    offset: usize,
}

impl<R: AsyncBufRead + Unpin> CommandReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: String::new(),
            offset: 0,
        }
    }

    /// Read the next line.
    ///
    /// Returns `false` at end of input or on an empty line, which ends the
    /// session.
    pub async fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        self.offset = 0;
        let read = self.input.read_line(&mut self.line).await?;
        let trimmed_len = self.line.trim_end_matches(['\r', '\n']).len();
        self.line.truncate(trimmed_len);
        Ok(read > 0 && !self.line.is_empty())
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// Next space-separated word of the current line.
    pub fn next_parameter(&mut self) -> Option<String> {
        let rest = &self.line[self.offset..];
        let start = rest.len() - rest.trim_start_matches(' ').len();
        let rest = &rest[start..];
        if rest.is_empty() {
            self.offset = self.line.len();
            return None;
        }
        let end = rest.find(' ').unwrap_or(rest.len());
        let word = rest[..end].to_string();
        self.offset += start + end;
        Some(word)
    }

    /// Every remaining word of the current line.
    pub fn parameters(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.next_parameter()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_reads_lines_until_empty() {
        let mut reader = CommandReader::new(&b"drive list\nlocal chdir Saves\n\ndrive list\n"[..]);
        assert!(reader.read_line().await.unwrap());
        assert_eq!(reader.line(), "drive list");
        assert!(reader.read_line().await.unwrap());
        assert_eq!(reader.line(), "local chdir Saves");
        assert!(!reader.read_line().await.unwrap());
    }

    #[tokio::test]
    async fn test_eof_ends_session() {
        let mut reader = CommandReader::new(&b"drive list"[..]);
        assert!(reader.read_line().await.unwrap());
        assert!(!reader.read_line().await.unwrap());
    }

    #[tokio::test]
    async fn test_crlf_is_stripped() {
        let mut reader = CommandReader::new(&b"drive mkdir Saves\r\n"[..]);
        assert!(reader.read_line().await.unwrap());
        assert_eq!(reader.parameters(), vec!["drive", "mkdir", "Saves"]);
    }

    #[tokio::test]
    async fn test_next_parameter_walks_words() {
        let mut reader = CommandReader::new(&b"drive  delete file a.txt \n"[..]);
        reader.read_line().await.unwrap();
        assert_eq!(reader.next_parameter().as_deref(), Some("drive"));
        assert_eq!(reader.next_parameter().as_deref(), Some("delete"));
        assert_eq!(reader.next_parameter().as_deref(), Some("file"));
        assert_eq!(reader.next_parameter().as_deref(), Some("a.txt"));
        assert_eq!(reader.next_parameter(), None);
        assert_eq!(reader.next_parameter(), None);
    }

    proptest! {
        #[test]
        fn words_survive_tokenizing(words in prop::collection::vec("[a-zA-Z0-9._-]{1,12}", 0..8)) {
            let line = format!("{}\n", words.join(" "));
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let parsed = rt.block_on(async {
                let mut reader = CommandReader::new(line.as_bytes());
                reader.read_line().await.unwrap();
                reader.parameters()
            });
            prop_assert_eq!(parsed, words);
        }
    }
}
