//! Bill text with a stable line view.

use std::ops::Range;

/// Text of one bill plus a zero-indexed line view.
///
/// Lines follow `str::lines` semantics: `\n` and `\r\n` both end a line and
/// a trailing newline does not start an empty one. The text itself is kept
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillText {
    text: String,
    spans: Vec<Range<usize>>,
}

impl BillText {
    pub fn new(raw: impl Into<String>) -> Self {
        let text = raw.into();
        let mut spans = Vec::new();
        let mut offset = 0;

        for chunk in text.split_inclusive('\n') {
            let line = chunk.strip_suffix('\n').unwrap_or(chunk);
            let line = line.strip_suffix('\r').unwrap_or(line);
            spans.push(offset..offset + line.len());
            offset += chunk.len();
        }

        Self { text, spans }
    }

    /// Join per-page texts into one document.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = pages
            .into_iter()
            .map(|p| p.as_ref().trim_end_matches('\n').to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True when the text has no visible characters.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.spans.len()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.spans.get(index).map(|span| &self.text[span.clone()])
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.spans.iter().map(|span| &self.text[span.clone()])
    }

    /// Index of the first line containing `anchor`.
    pub fn find_line(&self, anchor: &str) -> Option<usize> {
        self.lines().position(|line| line.contains(anchor))
    }

    /// Lines within `radius` of `center`, in document order.
    pub fn window(&self, center: usize, radius: usize) -> Vec<&str> {
        let start = center.saturating_sub(radius);
        let end = center.saturating_add(radius + 1).min(self.line_count());
        (start..end).filter_map(|i| self.line(i)).collect()
    }

    /// Lines within `radius` of `center`, nearest first; at equal distance
    /// the line below the center comes first.
    pub fn neighborhood(&self, center: usize, radius: usize) -> Vec<(usize, &str)> {
        let mut lines = Vec::new();

        for distance in 0..=radius {
            let below = center.checked_add(distance);
            let above = if distance > 0 { center.checked_sub(distance) } else { None };

            for index in [below, above].into_iter().flatten() {
                if let Some(line) = self.line(index) {
                    lines.push((index, line));
                }
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_no_lines() {
        let text = BillText::new("");
        assert_eq!(text.line_count(), 0);
        assert!(text.is_blank());
        assert_eq!(text.line(0), None);
        assert!(text.window(0, 3).is_empty());
    }

    #[test]
    fn test_line_view() {
        let text = BillText::new("first\r\nsecond\n\nfourth\n");
        assert_eq!(text.line_count(), 4);
        assert_eq!(text.line(1), Some("second"));
        assert_eq!(text.line(2), Some(""));
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["first", "second", "", "fourth"]);
        assert_eq!(text.as_str(), "first\r\nsecond\n\nfourth\n");
    }

    #[test]
    fn test_anchor_window() {
        let text = BillText::new("a\nb\nANCHOR\nd\ne\nf");
        let center = text.find_line("ANCHOR").unwrap();
        assert_eq!(center, 2);
        assert_eq!(text.window(center, 1), vec!["b", "ANCHOR", "d"]);
        assert_eq!(text.window(center, 10).len(), 6);
    }

    #[test]
    fn test_neighborhood_order() {
        let text = BillText::new("a\nb\nANCHOR\nd\ne");
        let order: Vec<usize> = text.neighborhood(2, 2).into_iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![2, 3, 1, 4, 0]);
    }

    #[test]
    fn test_from_pages() {
        let text = BillText::from_pages(["page one\n", "page two"]);
        assert_eq!(text.line_count(), 2);
        assert_eq!(text.line(1), Some("page two"));
    }
}
