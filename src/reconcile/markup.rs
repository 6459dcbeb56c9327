//! Tag markers in Markdown text
//!
//! A marker is `#name` at line start or after whitespace. Markers inside
//! fenced code blocks or YAML frontmatter are not tags. All edits here work
//! on byte ranges of the original text and keep everything else intact.

use crate::analysis::patterns::CommonPatterns;
use std::collections::BTreeSet;
use std::ops::Range;

/// One tag marker; `start` is the byte offset of `#`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMarker {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Strip surrounding whitespace and one leading `#`
pub fn normalize_tag(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed).to_string()
}

pub fn is_valid_tag(tag: &str) -> bool {
    CommonPatterns::tag_name().is_match(tag)
}

/// Lines of `text` with their byte offsets, newline included
fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_inclusive('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line))
    })
}

/// YAML frontmatter: a first line `---` closed by a later `---` line
pub fn frontmatter_range(text: &str) -> Option<Range<usize>> {
    let mut lines = lines_with_offsets(text);
    let (_, first) = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }
    lines
        .find(|(_, line)| line.trim_end() == "---")
        .map(|(start, line)| 0..start + line.len())
}

/// Closed fences after the frontmatter, plus the start of an unclosed one
fn scan_fences(text: &str) -> (Vec<Range<usize>>, Option<usize>) {
    let body_start = frontmatter_range(text).map_or(0, |r| r.end);
    let mut ranges = Vec::new();
    let mut open: Option<usize> = None;

    for (start, line) in lines_with_offsets(text) {
        if start < body_start || !line.trim_start().starts_with("```") {
            continue;
        }
        match open.take() {
            Some(fence_start) => ranges.push(fence_start..start + line.len()),
            None => open = Some(start),
        }
    }

    (ranges, open)
}

/// Fenced code blocks after the frontmatter; an unclosed fence runs to the end
pub fn code_ranges(text: &str) -> Vec<Range<usize>> {
    let (mut ranges, open) = scan_fences(text);
    if let Some(fence_start) = open {
        ranges.push(fence_start..text.len());
    }
    ranges
}

fn excluded_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = code_ranges(text);
    if let Some(frontmatter) = frontmatter_range(text) {
        ranges.insert(0, frontmatter);
    }
    ranges
}

/// Markers outside code blocks and frontmatter, in document order
pub fn find_markers(text: &str) -> Vec<TagMarker> {
    let excluded = excluded_ranges(text);

    CommonPatterns::tag_marker()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|name| TagMarker {
            name: name.as_str().to_string(),
            start: name.start() - 1,
            end: name.end(),
        })
        .filter(|marker| !excluded.iter().any(|r| r.contains(&marker.start)))
        .collect()
}

/// Distinct tag names present in the document
pub fn extract_tags(text: &str) -> BTreeSet<String> {
    find_markers(text).into_iter().map(|m| m.name).collect()
}

/// Replace each marker with spaces of the same byte length
pub fn mask_tags(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    let mut cursor = 0;
    for marker in find_markers(text) {
        masked.push_str(&text[cursor..marker.start]);
        masked.extend(std::iter::repeat(' ').take(marker.end - marker.start));
        cursor = marker.end;
    }
    masked.push_str(&text[cursor..]);
    masked
}

/// The document with every marker removed the way [`remove_tags`] removes them
///
/// Trailing whitespace is normalised to a single newline, so a document and
/// its reconciled rewrite strip to the same text.
pub fn strip_tags(text: &str) -> String {
    let stripped = remove_tags(text, &extract_tags(text));
    let body = stripped.trim_end();
    if body.is_empty() {
        String::new()
    } else {
        format!("{}\n", body)
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Delete every marker of the given tags with its separating whitespace
///
/// Lines emptied by the removal are dropped, blank runs left behind collapse
/// to one blank line, and trailing blank lines are trimmed.
pub fn remove_tags(text: &str, tags: &BTreeSet<String>) -> String {
    let targets: Vec<TagMarker> = find_markers(text)
        .into_iter()
        .filter(|m| tags.contains(&m.name))
        .collect();
    if targets.is_empty() {
        return text.to_string();
    }

    let bytes = text.as_bytes();
    let is_space = |b: u8| b == b' ' || b == b'\t';
    let mut lines: Vec<String> = Vec::new();
    let mut collapsing = false;
    let mut targets = targets.into_iter().peekable();

    for (line_start, line) in lines_with_offsets(text) {
        let line_end = line_start + line.len();
        let content_end = line_start + line.trim_end_matches(['\n', '\r']).len();
        let mut rebuilt = String::with_capacity(line.len());
        let mut cursor = line_start;
        let mut touched = false;

        while let Some(marker) = targets.next_if(|m| m.start < line_end) {
            let mut cut_start = marker.start;
            while cut_start > cursor && is_space(bytes[cut_start - 1]) {
                cut_start -= 1;
            }
            let mut cut_end = marker.end;
            if cut_start == cursor {
                while cut_end < content_end && is_space(bytes[cut_end]) {
                    cut_end += 1;
                }
            }
            rebuilt.push_str(&text[cursor..cut_start]);
            cursor = cut_end;
            touched = true;
        }
        rebuilt.push_str(&text[cursor..line_end]);

        if touched && is_blank(&rebuilt) {
            collapsing = true;
            continue;
        }
        if collapsing && is_blank(&rebuilt) && lines.last().map_or(true, |l| is_blank(l)) {
            continue;
        }
        collapsing = false;
        lines.push(rebuilt);
    }

    while lines.last().is_some_and(|l| is_blank(l)) {
        lines.pop();
    }

    let mut result = lines.concat();
    if !result.is_empty() && !result.ends_with('\n') && text.ends_with('\n') {
        result.push('\n');
    }
    result
}

/// A non-empty line whose every word is a tag marker
fn is_tag_line(line: &str) -> bool {
    let mut words = line.split_whitespace().peekable();
    words.peek().is_some()
        && words.all(|w| w.len() > 1 && w.starts_with('#') && is_valid_tag(&w[1..]))
}

/// Append tags to the last tag-only line, or to a new trailing line
pub fn insert_tags(text: &str, tags: &[String]) -> String {
    if tags.is_empty() {
        return text.to_string();
    }
    let rendered = tags
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ");

    let body_start = frontmatter_range(text).map_or(0, |r| r.end);
    let code = code_ranges(text);

    let tag_line = lines_with_offsets(text)
        .filter(|(start, line)| {
            *start >= body_start && !code.iter().any(|r| r.contains(start)) && is_tag_line(line)
        })
        .last();

    if let Some((start, line)) = tag_line {
        let content = line.trim_end();
        let insert_at = start + content.len();
        return format!("{} {}{}", &text[..insert_at], rendered, &text[insert_at..]);
    }

    // Anything appended after an unclosed fence would be code. The tag line
    // goes directly above the fence so stripping it restores the original.
    if let (_, Some(fence_start)) = scan_fences(text) {
        return format!("{}{}\n{}", &text[..fence_start], rendered, &text[fence_start..]);
    }

    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        format!("{}\n", rendered)
    } else {
        format!("{}\n\n{}\n", trimmed, rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  #devops "), "devops");
        assert_eq!(normalize_tag("##x"), "#x");
        assert!(is_valid_tag("work/q1"));
        assert!(!is_valid_tag("#x"));
    }

    #[test]
    fn test_extract_skips_code_and_frontmatter() {
        let text = "---\ntags: #draft\n---\nNotes #real\n```bash\necho #fake\n```\n#also\n";
        assert_eq!(extract_tags(text), set(&["also", "real"]));
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let text = "#kept\n```\n#hidden\n";
        assert_eq!(extract_tags(text), set(&["kept"]));
        assert_eq!(code_ranges(text), vec![6..text.len()]);
    }

    #[test]
    fn test_insert_before_unclosed_fence() {
        let text = "Intro\n```\ncode #x\n";
        let inserted = insert_tags(text, &["new".to_string()]);
        assert_eq!(inserted, "Intro\n#new\n```\ncode #x\n");
        assert_eq!(extract_tags(&inserted), set(&["new"]));
        assert_eq!(strip_tags(&inserted), strip_tags(text));
    }

    #[test]
    fn test_strip_tags_matches_removal() {
        let text = "Some text #old here\nalpha notes\n#old #keep\n\nops@example.com #keep\n\n";
        assert_eq!(strip_tags(text), "Some text here\nalpha notes\n\nops@example.com\n");

        // Removing a subset first leads to the same stripped form
        let partial = remove_tags(text, &set(&["old"]));
        assert_eq!(strip_tags(&partial), strip_tags(text));
        assert_eq!(strip_tags(&insert_tags(&partial, &["new".to_string()])), strip_tags(text));
    }

    #[test]
    fn test_frontmatter_requires_closing() {
        assert_eq!(frontmatter_range("---\ntitle: x\n---\nbody"), Some(0..17));
        assert_eq!(frontmatter_range("---\nno close\n"), None);
        assert_eq!(frontmatter_range("body\n---\n"), None);
    }

    #[test]
    fn test_mask_preserves_length() {
        let text = "Uses #docker daily";
        let masked = mask_tags(text);
        assert_eq!(masked.len(), text.len());
        assert_eq!(masked, "Uses         daily");
    }

    #[test]
    fn test_remove_inline_and_line() {
        let text = "Some text #old here\n\n#old #keep\n";
        assert_eq!(remove_tags(text, &set(&["old"])), "Some text here\n\n#keep\n");

        let text = "Body\n\n#old\n";
        assert_eq!(remove_tags(text, &set(&["old"])), "Body\n");
    }

    #[test]
    fn test_remove_collapses_blank_run() {
        let text = "A\n\n#old\n\nB\n";
        assert_eq!(remove_tags(text, &set(&["old"])), "A\n\nB\n");
    }

    #[test]
    fn test_remove_leaves_code_blocks() {
        let text = "```\n#old\n```\n#old\n";
        assert_eq!(remove_tags(text, &set(&["old"])), "```\n#old\n```\n");
    }

    #[test]
    fn test_remove_exact_names_only() {
        let text = "#old/sub #older #old\n";
        assert_eq!(remove_tags(text, &set(&["old"])), "#old/sub #older\n");
    }

    #[test]
    fn test_insert_new_line() {
        let tags = vec!["devops".to_string(), "meetings".to_string()];
        assert_eq!(
            insert_tags("Docker deployment meeting", &tags),
            "Docker deployment meeting\n\n#devops #meetings\n"
        );
        assert_eq!(insert_tags("\n\n", &tags), "#devops #meetings\n");
    }

    #[test]
    fn test_insert_appends_to_tag_line() {
        let text = "Title\n\n#existing\n\nMore prose\n";
        assert_eq!(
            insert_tags(text, &["new".to_string()]),
            "Title\n\n#existing #new\n\nMore prose\n"
        );
    }

    #[test]
    fn test_insert_ignores_tag_lines_in_code() {
        let text = "Prose\n```\n#code\n```\n";
        assert_eq!(insert_tags(text, &["t".to_string()]), "Prose\n```\n#code\n```\n\n#t\n");
    }
}
