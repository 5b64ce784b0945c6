use crate::parser::LoadedDocument;
use crate::speller::document::ElementInfo;
use anyhow::Result;

/// Plain text: every line becomes a paragraph.
pub fn load(content: &str, language: &str) -> Result<LoadedDocument> {
    let mut loaded = LoadedDocument::new(content, language);
    let mut line_start = 0;

    for raw in content.split_inclusive('\n') {
        let line = raw.trim_end_matches('\n').trim_end_matches('\r');
        loaded.document.open(ElementInfo::block());
        loaded.push_source_text(line, line_start);
        loaded.document.close();
        line_start += raw.len();
    }

    Ok(loaded)
}
