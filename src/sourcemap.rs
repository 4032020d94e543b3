//! Source Map v3 construction.
//!
//! Mappings are collected as absolute positions during generation and
//! encoded into the delta-compressed base64 VLQ `mappings` string when the
//! map is serialized. Only line-level fidelity is recorded; every segment
//! maps a generated position to an original position in the single source.

use serde::Serialize;

const BASE64_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: i64 = 0b11111;
const VLQ_CONTINUATION_BIT: i64 = 0b100000;

fn encode_vlq(value: i64, out: &mut String) {
    // Sign goes in the low bit of the first digit.
    let mut vlq = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };
    loop {
        let mut digit = vlq & VLQ_BASE_MASK;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq > 0 {
            digit |= VLQ_CONTINUATION_BIT;
        }
        out.push(BASE64_CHARS[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAP DOCUMENT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    pub file: String,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<String>>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn to_json(&self) -> String {
        // Serialization of this struct cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
struct Mapping {
    generated_line: u32,
    generated_column: u32,
    original_line: u32,
    original_column: u32,
}

/// Accumulates mappings for one generated file against one original source.
#[derive(Debug)]
pub struct SourceMapBuilder {
    file: String,
    source: String,
    source_content: Option<String>,
    mappings: Vec<Mapping>,
}

impl SourceMapBuilder {
    pub fn new(file: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            source: source.into(),
            source_content: None,
            mappings: Vec::new(),
        }
    }

    pub fn with_source_content(mut self, content: impl Into<String>) -> Self {
        self.source_content = Some(content.into());
        self
    }

    /// Record one mapping. Generated positions are 0-based; `original_line`
    /// is 1-based as carried on AST nodes and converted here.
    pub fn add_mapping(
        &mut self,
        generated_line: u32,
        generated_column: u32,
        original_line: u32,
        original_column: u32,
    ) {
        self.mappings.push(Mapping {
            generated_line,
            generated_column,
            original_line: original_line.saturating_sub(1),
            original_column,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn build(mut self) -> SourceMap {
        self.mappings.sort_by_key(|m| (m.generated_line, m.generated_column));

        let mut encoded = String::new();
        let mut current_line = 0u32;
        let mut prev_gen_col = 0i64;
        let mut prev_orig_line = 0i64;
        let mut prev_orig_col = 0i64;
        let mut first_in_line = true;

        for m in &self.mappings {
            while current_line < m.generated_line {
                encoded.push(';');
                current_line += 1;
                prev_gen_col = 0;
                first_in_line = true;
            }
            if !first_in_line {
                encoded.push(',');
            }
            encode_vlq(m.generated_column as i64 - prev_gen_col, &mut encoded);
            encode_vlq(0, &mut encoded); // single source
            encode_vlq(m.original_line as i64 - prev_orig_line, &mut encoded);
            encode_vlq(m.original_column as i64 - prev_orig_col, &mut encoded);
            prev_gen_col = m.generated_column as i64;
            prev_orig_line = m.original_line as i64;
            prev_orig_col = m.original_column as i64;
            first_in_line = false;
        }

        SourceMap {
            version: 3,
            file: self.file,
            sources: vec![self.source],
            sources_content: self.source_content.map(|c| vec![c]),
            names: Vec::new(),
            mappings: encoded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlq_single_values() {
        let mut s = String::new();
        encode_vlq(0, &mut s);
        assert_eq!(s, "A");
        s.clear();
        encode_vlq(1, &mut s);
        assert_eq!(s, "C");
        s.clear();
        encode_vlq(-1, &mut s);
        assert_eq!(s, "D");
        s.clear();
        encode_vlq(16, &mut s);
        assert_eq!(s, "gB");
    }

    #[test]
    fn test_first_mapping_is_absolute() {
        let mut b = SourceMapBuilder::new("app.js", "app.ets");
        b.add_mapping(0, 0, 1, 0);
        let map = b.build();
        assert_eq!(map.version, 3);
        assert_eq!(map.sources, vec!["app.ets".to_string()]);
        assert_eq!(map.mappings, "AAAA");
    }

    #[test]
    fn test_deltas_and_line_separators() {
        let mut b = SourceMapBuilder::new("app.js", "app.ets");
        b.add_mapping(0, 0, 1, 0);
        b.add_mapping(2, 4, 3, 0);
        let map = b.build();
        // Two skipped generated lines, then col +4, line +2, col 0.
        assert_eq!(map.mappings, "AAAA;;IAEA");
    }

    #[test]
    fn test_json_shape() {
        let mut b = SourceMapBuilder::new("a.js", "a.ets");
        b.add_mapping(0, 0, 1, 0);
        let json = b.build().to_json();
        assert!(json.contains("\"version\":3"));
        assert!(json.contains("\"mappings\":\"AAAA\""));
        assert!(!json.contains("sourcesContent"));
    }
}
