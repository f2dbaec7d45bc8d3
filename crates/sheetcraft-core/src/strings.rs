//! Workbook-wide shared string table
//!
//! Every text value written through the normal string path is interned here.
//! The first occurrence of a string gets the next dense index and that index
//! never changes for the lifetime of the workbook; cells store only the index.

use std::io::Write;
use std::sync::Arc;

use ahash::AHashMap;

use crate::error::Result;
use crate::xml::XmlEmitter;
use crate::SPREADSHEETML_NS;

/// Deduplicated strings in first-seen order
#[derive(Debug, Default)]
pub struct StringTable {
    /// Unique strings; position is the reference
    strings: Vec<Arc<str>>,
    /// Fast lookup for deduplication
    index: AHashMap<Arc<str>, u32>,
    /// Number of intern calls, duplicates included
    total: u64,
}

impl StringTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning its stable reference
    pub fn intern(&mut self, text: &str) -> u32 {
        self.total += 1;
        if let Some(&idx) = self.index.get(text) {
            return idx;
        }

        let idx = self.strings.len() as u32;
        let shared: Arc<str> = Arc::from(text);
        self.strings.push(Arc::clone(&shared));
        self.index.insert(shared, idx);
        idx
    }

    /// Reference for `text` if it has been interned
    pub fn lookup(&self, text: &str) -> Option<u32> {
        self.index.get(text).copied()
    }

    /// String for a reference
    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(|s| s.as_ref())
    }

    /// Number of distinct strings
    pub fn unique_count(&self) -> usize {
        self.strings.len()
    }

    /// Number of intern calls, duplicates included
    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Whether no string has been interned yet
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate strings in reference order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| s.as_ref())
    }

    /// Write the `sharedStrings.xml` part
    pub fn emit<W: Write>(&self, xml: &mut XmlEmitter<W>) -> Result<()> {
        xml.declaration()?;
        xml.open_element("sst")?;
        xml.attribute("xmlns", SPREADSHEETML_NS)?;
        xml.attribute_num("count", self.total)?;
        xml.attribute_num("uniqueCount", self.strings.len())?;

        for text in &self.strings {
            xml.open_element("si")?;
            write_text_element(xml, text)?;
            xml.close_element("si")?;
        }

        xml.close_element("sst")
    }
}

/// `<t>` with `xml:space="preserve"` when edge whitespace must survive
pub(crate) fn write_text_element<W: Write>(xml: &mut XmlEmitter<W>, text: &str) -> Result<()> {
    xml.open_element("t")?;
    if needs_preserve(text) {
        xml.attribute("xml:space", "preserve")?;
    }
    xml.text(text)?;
    xml.close_element("t")
}

fn needs_preserve(text: &str) -> bool {
    let edge = |c: Option<char>| matches!(c, Some(' ' | '\t' | '\n' | '\r'));
    edge(text.chars().next()) || edge(text.chars().next_back())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_intern_dedup() {
        let mut table = StringTable::new();
        assert_eq!(table.intern("Total"), 0);
        assert_eq!(table.intern("Net"), 1);
        assert_eq!(table.intern("Total"), 0);
        assert_eq!(table.intern("total"), 2);

        assert_eq!(table.unique_count(), 3);
        assert_eq!(table.total_count(), 4);
        assert_eq!(table.get(1), Some("Net"));
        assert_eq!(table.lookup("total"), Some(2));
        assert_eq!(table.lookup("missing"), None);
    }

    #[test]
    fn test_emit() {
        let mut table = StringTable::new();
        table.intern("Total");
        table.intern(" padded ");
        table.intern("Total");
        table.intern("a<b");

        let mut xml = XmlEmitter::new(Vec::new());
        table.emit(&mut xml).unwrap();
        let out = String::from_utf8(xml.close().unwrap()).unwrap();

        assert_eq!(
            out,
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
                "<sst xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" count=\"4\" uniqueCount=\"3\">",
                "<si><t>Total</t></si>",
                "<si><t xml:space=\"preserve\"> padded </t></si>",
                "<si><t>a&lt;b</t></si>",
                "</sst>"
            )
        );
    }

    #[test]
    fn test_emit_empty_table() {
        let table = StringTable::new();
        let mut xml = XmlEmitter::new(Vec::new());
        table.emit(&mut xml).unwrap();
        let out = String::from_utf8(xml.close().unwrap()).unwrap();
        assert!(out.ends_with("count=\"0\" uniqueCount=\"0\"/>"));
    }

    proptest! {
        #[test]
        fn prop_first_seen_order(words in proptest::collection::vec("[a-c]{0,2}", 0..40)) {
            let mut table = StringTable::new();
            let mut seen: Vec<String> = Vec::new();
            for word in &words {
                let expected = match seen.iter().position(|s| s == word) {
                    Some(pos) => pos,
                    None => {
                        seen.push(word.clone());
                        seen.len() - 1
                    }
                };
                prop_assert_eq!(table.intern(word) as usize, expected);
            }
            prop_assert_eq!(table.unique_count(), seen.len());
            prop_assert_eq!(table.total_count(), words.len() as u64);
        }
    }
}
