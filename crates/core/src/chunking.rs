use crate::error::IngestError;
use crate::models::{ChunkingOptions, DocumentSection, SectionChunk};
use sha2::{Digest, Sha256};

fn validate(options: &ChunkingOptions) -> Result<(), IngestError> {
    if options.max_chars == 0 {
        return Err(IngestError::InvalidChunkConfig(
            "max_chars must be greater than zero".to_string(),
        ));
    }
    if options.overlap_chars >= options.max_chars {
        return Err(IngestError::InvalidChunkConfig(format!(
            "overlap {} must be smaller than max chunk size {}",
            options.overlap_chars, options.max_chars
        )));
    }
    Ok(())
}

/// Split one section's raw text into character windows of at most
/// `max_chars`, each overlapping the previous by `overlap_chars`. The split
/// is a hard character cut, so concatenating the windows with overlaps
/// removed reproduces the input exactly. Blank input yields no windows.
pub fn split_text(text: &str, options: &ChunkingOptions) -> Result<Vec<String>, IngestError> {
    validate(options)?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = text.chars().collect();
    let stride = options.max_chars - options.overlap_chars;

    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + options.max_chars).min(chars.len());
        windows.push(chars[start..end].iter().collect::<String>());
        if end == chars.len() {
            break;
        }
        start += stride;
    }

    Ok(windows)
}

/// Chunk every section of a document in order. Chunks never span sections;
/// `chunk_index` runs across the whole document.
pub fn build_chunks(
    sections: &[DocumentSection],
    options: &ChunkingOptions,
) -> Result<Vec<SectionChunk>, IngestError> {
    let mut chunks = Vec::new();

    for (section_index, section) in sections.iter().enumerate() {
        for text in split_text(&section.text, options)? {
            let chunk_index = chunks.len();
            let chunk_id = make_chunk_id(&section.source_path, section_index, chunk_index, &text);
            chunks.push(SectionChunk {
                chunk_id,
                source_path: section.source_path.clone(),
                page: section.page,
                section_index,
                chunk_index,
                text,
            });
        }
    }

    Ok(chunks)
}

fn make_chunk_id(source_path: &str, section_index: usize, chunk_index: usize, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_path.as_bytes());
    hasher.update((section_index as u64).to_le_bytes());
    hasher.update((chunk_index as u64).to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
