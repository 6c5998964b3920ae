//! Raw element extraction
//!
//! Signatures cover the exact bytes of the `<data>` element content, so the
//! content has to be cut out of the serialized buffer rather than re-encoded.

use crate::{Error, Result};

/// Returns the bytes between the first `<tag ...>` and its matching `</tag>`.
///
/// Nested elements with the same name are skipped, so
/// `<data><data>x</data></data>` yields `<data>x</data>`. A self-closing
/// `<tag/>` yields an empty slice.
pub fn tag_content<'a>(buf: &'a [u8], tag: &str) -> Result<&'a [u8]> {
    let tag = tag.as_bytes();

    let (_, open) = next_tag(buf, 0, tag).ok_or(Error::NotFound)?;
    let start = match open {
        Tag::Open(end) => end,
        Tag::SelfClosing(end) => return Ok(&buf[end..end]),
        Tag::Close(_) => return Err(Error::NotFound),
    };

    let mut depth = 1usize;
    let mut pos = start;
    while let Some((at, found)) = next_tag(buf, pos, tag) {
        match found {
            Tag::Open(end) => {
                depth += 1;
                pos = end;
            }
            Tag::SelfClosing(end) => pos = end,
            Tag::Close(end) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&buf[start..at]);
                }
                pos = end;
            }
        }
    }

    Err(Error::NotFound)
}

/// A `tag` occurrence; the payload is the offset just past its `>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Open(usize),
    SelfClosing(usize),
    Close(usize),
}

/// Finds the next complete `<tag…>`, `<tag…/>` or `</tag>` at or after `from`
fn next_tag(buf: &[u8], from: usize, tag: &[u8]) -> Option<(usize, Tag)> {
    let mut pos = from;
    while pos < buf.len() {
        let lt = pos + buf[pos..].iter().position(|&b| b == b'<')?;
        let (closing, name_at) = match buf.get(lt + 1) {
            Some(b'/') => (true, lt + 2),
            Some(_) => (false, lt + 1),
            None => return None,
        };

        let name_end = name_at + tag.len();
        if buf[name_at..].starts_with(tag) && is_name_end(buf.get(name_end)) {
            let gt = name_end + buf[name_end..].iter().position(|&b| b == b'>')?;
            let end = gt + 1;
            let found = if closing {
                Tag::Close(end)
            } else if buf[gt - 1] == b'/' {
                Tag::SelfClosing(end)
            } else {
                Tag::Open(end)
            };
            return Some((lt, found));
        }
        pos = lt + 1;
    }
    None
}

fn is_name_end(b: Option<&u8>) -> bool {
    matches!(b, Some(b'>' | b'/' | b' ' | b'\t' | b'\r' | b'\n'))
}
