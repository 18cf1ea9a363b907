// Key events read as text lines (one key name per line), e.g. from a terminal
use super::error::ListenError;
use super::types::{EventSource, KeySymbol};
use std::io::{BufRead, BufReader};

pub struct LineEventSource<R> {
    reader: R,
    quit_word: Option<KeySymbol>,
}

impl LineEventSource<BufReader<std::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead + Send> LineEventSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            quit_word: None,
        }
    }

    /// Stop listening when this word is read instead of forwarding it.
    pub fn with_quit_word(mut self, word: &str) -> Self {
        self.quit_word = Some(KeySymbol::new(word));
        self
    }
}

impl<R: BufRead + Send> EventSource for LineEventSource<R> {
    fn listen(&mut self, handler: &mut dyn FnMut(KeySymbol)) -> Result<(), ListenError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                log::debug!("⌨️ Key event stream closed");
                return Ok(());
            }
            let key = KeySymbol::new(&line);
            if key.is_empty() {
                continue;
            }
            if self.quit_word.as_ref() == Some(&key) {
                log::debug!("⌨️ Quit word received, listener exiting");
                return Ok(());
            }
            handler(key);
        }
    }
}
