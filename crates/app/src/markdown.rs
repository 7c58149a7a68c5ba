//! Lightweight markdown renderer for chat bubbles.
//!
//! Covers the subset the tutoring model is instructed to produce: headings,
//! `**bold**`, `` `inline code` ``, fenced code blocks, bullet and numbered
//! lists, `[text](url)` links, paragraphs. Classification is pure so it can
//! be tested without a UI.

use eframe::egui;

#[derive(Debug, PartialEq, Eq)]
enum Block {
    Heading { level: u8, text: String },
    Bullet(String),
    Numbered { marker: String, text: String },
    Code { lines: Vec<String> },
    Paragraph(String),
    Blank,
}

#[derive(Debug, PartialEq, Eq)]
enum Span {
    Plain(String),
    Bold(String),
    Code(String),
    Link { label: String, url: String },
}

/// Render markdown text into an egui UI region. `base_color` is the default
/// text color of the surrounding bubble.
pub fn render(ui: &mut egui::Ui, text: &str, base_color: egui::Color32) {
    let link_color = egui::Color32::from_rgb(100, 170, 240);
    let code_bg = if base_color.r() > 128 {
        // dark mode — lighter code bg
        egui::Color32::from_rgb(60, 60, 70)
    } else {
        egui::Color32::from_rgb(230, 232, 236)
    };

    for block in classify_blocks(text) {
        match block {
            Block::Blank => ui.add_space(6.0),
            Block::Heading { level, text } => {
                let size = match level {
                    1 => 18.0,
                    2 => 16.0,
                    3 => 15.0,
                    _ => 14.0,
                };
                ui.add_space(size - 10.0);
                ui.label(egui::RichText::new(text).strong().size(size).color(base_color));
                ui.add_space(3.0);
            }
            Block::Bullet(text) => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new("  •  ").size(14.0).color(base_color));
                    render_spans(ui, &text, base_color, link_color, code_bg);
                });
            }
            Block::Numbered { marker, text } => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        egui::RichText::new(format!("  {}  ", marker))
                            .size(14.0)
                            .color(base_color),
                    );
                    render_spans(ui, &text, base_color, link_color, code_bg);
                });
            }
            Block::Code { lines } => {
                ui.add_space(4.0);
                egui::Frame::none()
                    .fill(code_bg)
                    .rounding(egui::Rounding::same(6.0))
                    .inner_margin(egui::Margin::same(8.0))
                    .show(ui, |ui| {
                        for line in &lines {
                            ui.label(
                                egui::RichText::new(line)
                                    .size(13.0)
                                    .monospace()
                                    .color(base_color),
                            );
                        }
                    });
                ui.add_space(4.0);
            }
            Block::Paragraph(text) => {
                ui.horizontal_wrapped(|ui| {
                    render_spans(ui, &text, base_color, link_color, code_bg);
                });
            }
        }
    }
}

/// Split text into line-level blocks. Fenced code swallows everything up to
/// the closing fence (or the end of the text if it never closes).
fn classify_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut code_lines: Option<Vec<String>> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(mut lines) = code_lines.take() {
            if trimmed.starts_with("```") {
                blocks.push(Block::Code { lines });
            } else {
                lines.push(line.trim_end().to_string());
                code_lines = Some(lines);
            }
            continue;
        }

        if trimmed.starts_with("```") {
            // Language tag after the fence is dropped.
            code_lines = Some(Vec::new());
            continue;
        }

        if trimmed.is_empty() {
            blocks.push(Block::Blank);
            continue;
        }

        if let Some((level, rest)) = heading_of(trimmed) {
            blocks.push(Block::Heading {
                level,
                text: rest.to_string(),
            });
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            blocks.push(Block::Bullet(rest.to_string()));
            continue;
        }

        if let Some((marker, rest)) = numbered_of(trimmed) {
            blocks.push(Block::Numbered {
                marker,
                text: rest.to_string(),
            });
            continue;
        }

        blocks.push(Block::Paragraph(trimmed.to_string()));
    }

    if let Some(lines) = code_lines {
        blocks.push(Block::Code { lines });
    }

    blocks
}

fn heading_of(line: &str) -> Option<(u8, &str)> {
    for (prefix, level) in [("#### ", 4u8), ("### ", 3), ("## ", 2), ("# ", 1)] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Some((level, rest));
        }
    }
    None
}

/// `1. step` style list items. Returns the marker ("1.") and the item text.
fn numbered_of(line: &str) -> Option<(String, &str)> {
    let dot = line.find(". ")?;
    let (number, rest) = line.split_at(dot);
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((format!("{}.", number), &rest[2..]))
}

/// Tokenize one line into inline spans. Unclosed markers fall back to plain
/// text rather than eating the rest of the line.
fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let Some((pos, kind)) = next_marker(remaining) else {
            spans.push(Span::Plain(remaining.to_string()));
            break;
        };

        if pos > 0 {
            spans.push(Span::Plain(remaining[..pos].to_string()));
        }
        remaining = &remaining[pos..];

        match kind {
            Marker::Bold => {
                let inner = &remaining[2..];
                match inner.find("**") {
                    Some(end) => {
                        spans.push(Span::Bold(inner[..end].to_string()));
                        remaining = &inner[end + 2..];
                    }
                    None => {
                        spans.push(Span::Plain(remaining.to_string()));
                        break;
                    }
                }
            }
            Marker::Code => {
                let inner = &remaining[1..];
                match inner.find('`') {
                    Some(end) => {
                        spans.push(Span::Code(inner[..end].to_string()));
                        remaining = &inner[end + 1..];
                    }
                    None => {
                        spans.push(Span::Plain(remaining.to_string()));
                        break;
                    }
                }
            }
            Marker::Link => {
                let inner = &remaining[1..];
                let Some(mid) = inner.find("](") else {
                    spans.push(Span::Plain(remaining.to_string()));
                    break;
                };
                let label = &inner[..mid];
                let after = &inner[mid + 2..];
                match after.find(')') {
                    Some(end) => {
                        spans.push(Span::Link {
                            label: label.to_string(),
                            url: after[..end].to_string(),
                        });
                        remaining = &after[end + 1..];
                    }
                    None => {
                        spans.push(Span::Plain(remaining.to_string()));
                        break;
                    }
                }
            }
        }
    }

    spans
}

#[derive(Debug, Clone, Copy)]
enum Marker {
    Bold,
    Code,
    Link,
}

fn next_marker(text: &str) -> Option<(usize, Marker)> {
    let mut best: Option<(usize, Marker)> = None;
    let mut consider = |found: Option<usize>, kind: Marker| {
        if let Some(pos) = found {
            if best.map_or(true, |(b, _)| pos < b) {
                best = Some((pos, kind));
            }
        }
    };
    consider(text.find("**"), Marker::Bold);
    consider(text.find('`'), Marker::Code);
    // Only treat [ as a link opener when a ]( follows somewhere.
    consider(
        text.find('[').filter(|&p| text[p..].contains("](")),
        Marker::Link,
    );
    best
}

fn render_spans(
    ui: &mut egui::Ui,
    text: &str,
    base_color: egui::Color32,
    link_color: egui::Color32,
    code_bg: egui::Color32,
) {
    let base_size = 14.0;
    for span in parse_spans(text) {
        match span {
            Span::Plain(t) => {
                ui.label(egui::RichText::new(t).size(base_size).color(base_color));
            }
            Span::Bold(t) => {
                ui.label(
                    egui::RichText::new(t)
                        .size(base_size)
                        .strong()
                        .color(base_color),
                );
            }
            Span::Code(t) => {
                egui::Frame::none()
                    .fill(code_bg)
                    .rounding(egui::Rounding::same(3.0))
                    .inner_margin(egui::Margin::symmetric(4.0, 1.0))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(t)
                                .size(base_size)
                                .monospace()
                                .color(base_color),
                        );
                    });
            }
            Span::Link { label, url } => {
                ui.add(egui::Hyperlink::from_label_and_url(
                    egui::RichText::new(label)
                        .size(base_size)
                        .color(link_color)
                        .underline(),
                    &url,
                ))
                .on_hover_text(&url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_heading_levels() {
        let blocks = classify_blocks("# Big\n### Small");
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    text: "Big".to_string()
                },
                Block::Heading {
                    level: 3,
                    text: "Small".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_classify_lists() {
        let blocks = classify_blocks("- one\n* two\n1. three\n12. twelve");
        assert_eq!(
            blocks,
            vec![
                Block::Bullet("one".to_string()),
                Block::Bullet("two".to_string()),
                Block::Numbered {
                    marker: "1.".to_string(),
                    text: "three".to_string()
                },
                Block::Numbered {
                    marker: "12.".to_string(),
                    text: "twelve".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_classify_fenced_code() {
        let blocks = classify_blocks("before\n```python\nprint(1)\n\nprint(2)\n```\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("before".to_string()),
                Block::Code {
                    lines: vec![
                        "print(1)".to_string(),
                        String::new(),
                        "print(2)".to_string()
                    ]
                },
                Block::Paragraph("after".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_fence_becomes_code() {
        let blocks = classify_blocks("```\nlet x = 1;");
        assert_eq!(
            blocks,
            vec![Block::Code {
                lines: vec!["let x = 1;".to_string()]
            }]
        );
    }

    #[test]
    fn test_dotted_word_is_not_a_numbered_item() {
        let blocks = classify_blocks("e.g. not a list");
        assert_eq!(blocks, vec![Block::Paragraph("e.g. not a list".to_string())]);
    }

    #[test]
    fn test_spans_bold_code_link() {
        let spans = parse_spans("see **this** and `that` in [docs](https://example.com).");
        assert_eq!(
            spans,
            vec![
                Span::Plain("see ".to_string()),
                Span::Bold("this".to_string()),
                Span::Plain(" and ".to_string()),
                Span::Code("that".to_string()),
                Span::Plain(" in ".to_string()),
                Span::Link {
                    label: "docs".to_string(),
                    url: "https://example.com".to_string()
                },
                Span::Plain(".".to_string()),
            ]
        );
    }

    #[test]
    fn test_unclosed_markers_stay_plain() {
        assert_eq!(
            parse_spans("a **dangling bold"),
            vec![
                Span::Plain("a ".to_string()),
                Span::Plain("**dangling bold".to_string()),
            ]
        );
        assert_eq!(
            parse_spans("[not a link"),
            vec![Span::Plain("[not a link".to_string())]
        );
    }
}
