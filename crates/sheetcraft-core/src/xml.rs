//! Streaming XML emitter
//!
//! [`XmlEmitter`] writes well-formed XML to any [`Write`] sink through
//! `quick_xml::Writer`. It keeps a stack of open element names and holds the
//! start tag of the innermost element back until its first child, text or
//! close, so attributes can be added one call at a time and childless
//! elements collapse to `<name/>`.
//!
//! Attribute values and text are escaped (`&`, `<`, `>`, `"`, `'`). Characters
//! that XML 1.0 cannot carry are handled by the emitter's
//! [`InvalidCharPolicy`].

use std::borrow::Cow;
use std::fmt::Display;
use std::io::{self, Read, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};

/// What to do with characters outside the XML 1.0 character range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvalidCharPolicy {
    /// Silently remove the character (default)
    #[default]
    Drop,
    /// Replace the character with the OOXML `_xHHHH_` escape
    Replace,
    /// Fail the write with an encoding error
    Reject,
}

impl InvalidCharPolicy {
    /// Apply the policy to `text`, borrowing it when nothing has to change
    pub fn apply(self, text: &str) -> Result<Cow<'_, str>> {
        let first = match text.find(|c| !is_xml_char(c)) {
            Some(pos) => pos,
            None => return Ok(Cow::Borrowed(text)),
        };

        let mut out = String::with_capacity(text.len() + 8);
        out.push_str(&text[..first]);
        let mut touched = 0usize;
        for c in text[first..].chars() {
            if is_xml_char(c) {
                out.push(c);
                continue;
            }
            touched += 1;
            match self {
                InvalidCharPolicy::Drop => {}
                InvalidCharPolicy::Replace => out.push_str(&format!("_x{:04X}_", c as u32)),
                InvalidCharPolicy::Reject => return Err(Error::Encoding { code: c as u32 }),
            }
        }

        log::warn!(
            "{} character(s) outside the XML range were {}",
            touched,
            if self == InvalidCharPolicy::Drop {
                "dropped"
            } else {
                "escaped"
            }
        );
        Ok(Cow::Owned(out))
    }

    /// Fail early if `text` would be rejected by this policy
    pub fn check(self, text: &str) -> Result<()> {
        if self == InvalidCharPolicy::Reject {
            if let Some(c) = text.chars().find(|c| !is_xml_char(*c)) {
                return Err(Error::Encoding { code: c as u32 });
            }
        }
        Ok(())
    }
}

/// Whether `c` is a legal XML 1.0 character
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Streaming XML writer with an open-element stack
pub struct XmlEmitter<W: Write> {
    writer: Writer<W>,
    stack: Vec<String>,
    pending: Option<BytesStart<'static>>,
    policy: InvalidCharPolicy,
}

impl<W: Write> XmlEmitter<W> {
    /// Create an emitter with the default [`InvalidCharPolicy::Drop`]
    pub fn new(inner: W) -> Self {
        Self::with_policy(inner, InvalidCharPolicy::default())
    }

    /// Create an emitter with an explicit invalid-character policy
    pub fn with_policy(inner: W, policy: InvalidCharPolicy) -> Self {
        Self {
            writer: Writer::new(inner),
            stack: Vec::new(),
            pending: None,
            policy,
        }
    }

    /// The invalid-character policy in effect
    pub fn policy(&self) -> InvalidCharPolicy {
        self.policy
    }

    /// Number of currently open elements
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Write the standard `<?xml ...?>` declaration followed by a newline
    pub fn declaration(&mut self) -> Result<()> {
        self.writer.write_event(Event::Decl(BytesDecl::new(
            "1.0",
            Some("UTF-8"),
            Some("yes"),
        )))?;
        self.writer.get_mut().write_all(b"\n")?;
        Ok(())
    }

    /// Open an element; attributes may follow until the next child or text
    pub fn open_element(&mut self, name: &str) -> Result<()> {
        self.flush_pending()?;
        self.pending = Some(BytesStart::new(name.to_owned()));
        self.stack.push(name.to_owned());
        Ok(())
    }

    /// Add an attribute to the element opened last
    pub fn attribute(&mut self, key: &str, value: &str) -> Result<()> {
        let value = self.policy.apply(value)?;
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((key, value.as_ref()));
                Ok(())
            }
            None => {
                debug_assert!(false, "attribute `{key}` written outside a start tag");
                Err(Error::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("attribute `{key}` written outside a start tag"),
                )))
            }
        }
    }

    /// Add an attribute whose value is formatted with [`Display`]
    pub fn attribute_num<T: Display>(&mut self, key: &str, value: T) -> Result<()> {
        self.attribute(key, &value.to_string())
    }

    /// Write escaped character data inside the current element
    pub fn text(&mut self, value: &str) -> Result<()> {
        self.flush_pending()?;
        let value = self.policy.apply(value)?;
        if !value.is_empty() {
            self.writer
                .write_event(Event::Text(BytesText::new(value.as_ref())))?;
        }
        Ok(())
    }

    /// Close the innermost open element, which must be `name`
    pub fn close_element(&mut self, name: &str) -> Result<()> {
        let open = self.stack.pop();
        debug_assert_eq!(open.as_deref(), Some(name), "mismatched close element");
        let open = open.ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("close of `{name}` with no open element"),
            ))
        })?;

        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self.writer.write_event(Event::End(BytesEnd::new(open)))?,
        }
        Ok(())
    }

    /// `<name k="v" .../>` in one call
    pub fn empty_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.open_element(name)?;
        for (key, value) in attrs {
            self.attribute(key, value)?;
        }
        self.close_element(name)
    }

    /// `<name>text</name>` in one call
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.open_element(name)?;
        self.text(text)?;
        self.close_element(name)
    }

    /// Copy pre-serialized XML from `reader` into the output verbatim
    pub fn copy_raw<R: Read>(&mut self, reader: &mut R) -> Result<u64> {
        self.flush_pending()?;
        Ok(io::copy(reader, self.writer.get_mut())?)
    }

    /// Access the underlying sink. Any held-back start tag is written first.
    pub fn get_mut(&mut self) -> Result<&mut W> {
        self.flush_pending()?;
        Ok(self.writer.get_mut())
    }

    /// Close every open element, flush and return the sink
    pub fn close(mut self) -> Result<W> {
        while let Some(name) = self.stack.last().cloned() {
            self.close_element(&name)?;
        }
        let mut inner = self.writer.into_inner();
        inner.flush()?;
        Ok(inner)
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for XmlEmitter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlEmitter")
            .field("stack", &self.stack)
            .field("policy", &self.policy)
            .finish()
    }
}
