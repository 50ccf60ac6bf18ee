use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::Citation;

const ELLIPSIS: char = '…';

/// One source card as the view draws it.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationCard {
    pub filename: String,
    pub page_label: String,
    pub snippet_preview: String,
    /// Carried for forward compatibility; no view reads it today.
    #[allow(dead_code)]
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CitationGroup {
    pub cards: Vec<CitationCard>,
}

/// Maps a message's citations to display cards. `None` means no source
/// block at all. Order is the backend's relevance order and is kept as is.
pub fn present(citations: &[Citation], snippet_width: usize) -> Option<CitationGroup> {
    if citations.is_empty() {
        return None;
    }

    let cards = citations
        .iter()
        .map(|c| CitationCard {
            filename: c.filename.clone(),
            page_label: format!("p. {}", c.page),
            snippet_preview: truncate(&c.text_snippet, snippet_width),
            score: c.score,
        })
        .collect();

    Some(CitationGroup { cards })
}

/// Cuts `text` to at most `max_width` terminal columns, ending with `…` when
/// anything was dropped.
pub fn truncate(text: &str, max_width: usize) -> String {
    let text = text.trim();
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }

    let mut out = out.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}
