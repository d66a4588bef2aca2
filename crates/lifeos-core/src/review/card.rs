//! Question/answer extraction from content documents.
//!
//! A card starts at a line beginning with `Q:`. The question may continue
//! on following lines until a line beginning with `A:`; the answer then
//! runs until a blank line, the next `Q:` line, or the end of the document.
//! A question that never reaches an `A:` line is dropped. Headings only
//! count as context when they appear outside a card, so a `#` line inside
//! an answer is kept as answer text.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::scanner::{title_from_stem, Document};

const QUESTION_MARKER: &str = "Q:";
const ANSWER_MARKER: &str = "A:";

/// A reviewable question/answer pair. Recomputed on every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub question: String,
    pub answer: String,
    /// Relative path of the originating document.
    pub source: String,
    /// Nearest heading above the card, or the humanized file name.
    pub context: String,
}

/// Stable identity from source location and question text.
///
/// Position in the file plays no part, so edits elsewhere in the document
/// keep the card's history attached.
pub fn card_id(source: &str, question: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b":");
    hasher.update(question.as_bytes());
    format!("{:x}", hasher.finalize())[..16].to_string()
}

enum Block {
    Idle,
    Question(Vec<String>),
    Answer { question: String, lines: Vec<String> },
}

struct Extractor<'a> {
    source: &'a str,
    fallback_context: String,
    heading: Option<String>,
    block: Block,
    block_context: String,
    cards: Vec<Card>,
}

impl<'a> Extractor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            fallback_context: title_from_stem(source),
            heading: None,
            block: Block::Idle,
            block_context: String::new(),
            cards: Vec::new(),
        }
    }

    fn context(&self) -> String {
        self.heading
            .clone()
            .unwrap_or_else(|| self.fallback_context.clone())
    }

    fn finish_block(&mut self) {
        if let Block::Answer { question, lines } = std::mem::replace(&mut self.block, Block::Idle) {
            let answer = lines.join("\n").trim().to_string();
            if !question.is_empty() && !answer.is_empty() {
                self.cards.push(Card {
                    id: card_id(self.source, &question),
                    question,
                    answer,
                    source: self.source.to_string(),
                    context: std::mem::take(&mut self.block_context),
                });
            }
        }
    }

    fn feed(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix(QUESTION_MARKER) {
            self.finish_block();
            self.block_context = self.context();
            self.block = Block::Question(vec![rest.trim().to_string()]);
            return;
        }

        if line.trim().is_empty() {
            self.finish_block();
            self.block = Block::Idle;
            return;
        }

        match &mut self.block {
            Block::Idle => {
                if let Some(heading) = parse_heading(line) {
                    self.heading = Some(heading);
                }
            }
            Block::Question(lines) => {
                if let Some(rest) = line.strip_prefix(ANSWER_MARKER) {
                    let question = lines.join("\n").trim().to_string();
                    self.block = Block::Answer {
                        question,
                        lines: vec![rest.trim().to_string()],
                    };
                } else {
                    lines.push(line.trim_end().to_string());
                }
            }
            Block::Answer { lines, .. } => lines.push(line.trim_end().to_string()),
        }
    }
}

/// Markdown ATX heading text, if `line` is one.
fn parse_heading(line: &str) -> Option<String> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Extract every card from raw text attributed to `source`.
pub fn extract_from_text(source: &str, text: &str) -> Vec<Card> {
    let mut extractor = Extractor::new(source);
    for line in text.lines() {
        extractor.feed(line);
    }
    extractor.finish_block();
    extractor.cards
}

/// Extract every card from a scanned document.
pub fn extract_cards(doc: &Document) -> Vec<Card> {
    extract_from_text(&doc.relative, &doc.text)
}
