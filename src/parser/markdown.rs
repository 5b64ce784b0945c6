use crate::parser::LoadedDocument;
use crate::speller::document::ElementInfo;
use anyhow::Result;
use pulldown_cmark::{Event, Parser, Tag};

enum Opened {
    Element,
    Skipped,
    Nothing,
}

/// Markdown: blocks become paragraph elements, inline styling and links become
/// formatting elements, code and images become embedded objects.
pub fn load(content: &str, language: &str) -> Result<LoadedDocument> {
    let mut loaded = LoadedDocument::new(content, language);
    let mut opened: Vec<Opened> = Vec::new();
    let mut skip_depth = 0usize;

    for (event, range) in Parser::new(content).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                    opened.push(Opened::Nothing);
                    continue;
                }
                match tag {
                    Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } => {
                        loaded.document.open(ElementInfo::formatting());
                        opened.push(Opened::Element);
                    }
                    Tag::Image { .. } | Tag::CodeBlock(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {
                        loaded.document.push_embedded();
                        skip_depth = 1;
                        opened.push(Opened::Skipped);
                    }
                    _ => {
                        loaded.document.open(ElementInfo::block());
                        opened.push(Opened::Element);
                    }
                }
            }
            Event::End(_) => match opened.pop() {
                Some(Opened::Element) => {
                    loaded.document.close();
                }
                Some(Opened::Skipped) | Some(Opened::Nothing) => {
                    skip_depth = skip_depth.saturating_sub(1);
                }
                None => {}
            },
            _ if skip_depth > 0 => {}
            Event::Text(text) => {
                // Escapes and entities make the source longer than the text; anchor at the end then.
                let byte = if range.len() == text.len() {
                    range.start
                } else {
                    range.end.saturating_sub(text.len())
                };
                loaded.push_source_text(&text, byte);
            }
            Event::Code(_) | Event::InlineHtml(_) | Event::Html(_) => {
                loaded.document.push_embedded();
            }
            Event::SoftBreak | Event::HardBreak => {
                loaded.document.push_text(" ");
            }
            _ => {}
        }
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speller::document::{PointerContext, TextTree};

    #[test]
    fn test_markdown_loading() {
        let content = r#"
# Title

This is a test paragraph with some words.

```rust
fn main() {
    println!("This should be ignored");
}
```

More text with `inline_code` here.
"#;

        let loaded = load(content, "en-US").unwrap();
        let text = loaded.document.text_between(0, loaded.document.symbol_count());
        assert!(text.contains("This is a test paragraph"));
        assert!(!text.contains("println"));
        assert!(!text.contains("inline_code"));
    }

    #[test]
    fn test_inline_markup_is_formatting() {
        let loaded = load("Hello *big* world", "en-US").unwrap();
        let doc = &loaded.document;
        assert_eq!(doc.symbol_at(0), PointerContext::ElementStart { formatting: false });
        assert_eq!(doc.symbol_at(7), PointerContext::ElementStart { formatting: true });
        assert_eq!(doc.text_between(0, doc.symbol_count()), "Hello big world");
        // "world" sits after the closing emphasis edge.
        assert_eq!(loaded.locate(13), (1, 13));
    }

    #[test]
    fn test_images_are_embedded() {
        let loaded = load("See ![alt text](a.png) here", "en-US").unwrap();
        let doc = &loaded.document;
        assert_eq!(doc.text_between(0, doc.symbol_count()), "See  here");
        assert_eq!(doc.symbol_at(5), PointerContext::Embedded);
    }
}
