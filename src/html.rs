use std::collections::HashMap;

use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

pub(crate) fn parse_html(html: &str) -> Result<Dom> {
    let mut dom = Dom::new();

    let mut stack = vec![dom.root];
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            if let Some(end) = find_subslice(bytes, i + 4, b"-->") {
                i = end + 3;
            } else {
                return Err(Error::HtmlParse("unclosed HTML comment".into()));
            }
            continue;
        }

        if starts_with_at(bytes, i, b"<!") {
            let end = find_subslice(bytes, i, b">")
                .ok_or_else(|| Error::HtmlParse("unclosed declaration".into()))?;
            i = end + 1;
            continue;
        }

        if bytes[i] == b'<' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'/') {
            if starts_with_at(bytes, i, b"</") {
                let (tag, next) = parse_end_tag(html, i)?;
                i = next;

                let open = stack
                    .iter()
                    .skip(1)
                    .rposition(|node| dom.is_tag(*node, &tag));
                if let Some(index) = open {
                    stack.truncate(index + 1);
                }
                continue;
            }

            let (tag, attrs, self_closing, next) = parse_start_tag(html, i)?;
            i = next;

            close_implied_table_parts(&dom, &mut stack, &tag);
            let mut parent = *stack
                .last()
                .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
            if tag == "tr" && dom.is_tag(parent, "table") {
                // rows written straight under <table> get the implied body
                parent = dom.create_element(parent, "tbody".into(), HashMap::new());
                stack.push(parent);
            }
            let node = dom.create_element(parent, tag.clone(), attrs);

            if is_raw_text_tag(&tag) {
                let close = find_case_insensitive_end_tag(bytes, i, tag.as_bytes())
                    .ok_or_else(|| Error::HtmlParse(format!("unclosed <{tag}>")))?;
                if let Some(body) = html.get(i..close) {
                    if !body.is_empty() {
                        dom.create_text(node, body.to_string());
                    }
                }
                let (_, after_end) = parse_end_tag(html, close)?;
                i = after_end;
                continue;
            }

            if !self_closing && !is_void_tag(&tag) {
                stack.push(node);
            }
            continue;
        }

        let text_start = i;
        i += 1;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }

        if let Some(text) = html.get(text_start..i) {
            if !text.is_empty() {
                let parent = *stack
                    .last()
                    .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
                dom.create_text(parent, unescape_entities(text));
            }
        }
    }

    dom.initialize_form_control_values();
    Ok(dom)
}

/// Pops the cells, rows and row groups that a new `tag` ends without an
/// explicit end tag, never past the enclosing table.
fn close_implied_table_parts(dom: &Dom, stack: &mut Vec<NodeId>, tag: &str) {
    let closes: &[&str] = match tag {
        "td" | "th" => &["td", "th"],
        "tr" => &["td", "th", "tr"],
        "tbody" | "thead" | "tfoot" => &["td", "th", "tr", "tbody", "thead", "tfoot"],
        _ => return,
    };
    let Some(table) = stack.iter().skip(1).rposition(|node| dom.is_tag(*node, "table")) else {
        return;
    };
    while stack.len() > table + 2 {
        let Some(top) = stack.last() else {
            break;
        };
        if !closes.iter().any(|name| dom.is_tag(*top, name)) {
            break;
        }
        stack.pop();
    }
}

fn parse_start_tag(
    html: &str,
    at: usize,
) -> Result<(String, HashMap<String, String>, bool, usize)> {
    let bytes = html.as_bytes();
    let mut i = at;
    if bytes.get(i) != Some(&b'<') {
        return Err(Error::HtmlParse("expected '<'".into()));
    }
    i += 1;

    skip_ws(bytes, &mut i);
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }

    let tag = html
        .get(tag_start..i)
        .ok_or_else(|| Error::HtmlParse("invalid tag name".into()))?
        .to_ascii_lowercase();

    if tag.is_empty() {
        return Err(Error::HtmlParse("empty tag name".into()));
    }

    let mut attrs = HashMap::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(Error::HtmlParse(format!("unclosed start tag <{tag}>")));
        }

        if bytes[i] == b'>' {
            i += 1;
            break;
        }

        if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'>' {
            self_closing = true;
            i += 2;
            break;
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }

        let name = html
            .get(name_start..i)
            .ok_or_else(|| Error::HtmlParse("invalid attribute name".into()))?
            .to_ascii_lowercase();

        if name.is_empty() {
            return Err(Error::HtmlParse(format!("invalid attribute name in <{tag}>")));
        }

        skip_ws(bytes, &mut i);

        let value = if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            skip_ws(bytes, &mut i);
            unescape_entities(&parse_attr_value(html, bytes, &mut i)?)
        } else {
            String::new()
        };

        attrs.entry(name).or_insert(value);
    }

    Ok((tag, attrs, self_closing, i))
}

fn parse_end_tag(html: &str, at: usize) -> Result<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = at;

    if !(bytes.get(i) == Some(&b'<') && bytes.get(i + 1) == Some(&b'/')) {
        return Err(Error::HtmlParse("expected end tag".into()));
    }
    i += 2;
    skip_ws(bytes, &mut i);

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }

    let tag = html
        .get(tag_start..i)
        .ok_or_else(|| Error::HtmlParse("invalid end tag".into()))?
        .to_ascii_lowercase();

    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return Err(Error::HtmlParse("unclosed end tag".into()));
    }

    Ok((tag, i + 1))
}

fn parse_attr_value(html: &str, bytes: &[u8], i: &mut usize) -> Result<String> {
    if *i >= bytes.len() {
        return Err(Error::HtmlParse("missing attribute value".into()));
    }

    if bytes[*i] == b'\'' || bytes[*i] == b'"' {
        let quote = bytes[*i];
        *i += 1;
        let start = *i;
        while *i < bytes.len() && bytes[*i] != quote {
            *i += 1;
        }
        if *i >= bytes.len() {
            return Err(Error::HtmlParse("unclosed quoted attribute value".into()));
        }
        let value = html
            .get(start..*i)
            .ok_or_else(|| Error::HtmlParse("invalid attribute value".into()))?
            .to_string();
        *i += 1;
        return Ok(value);
    }

    let start = *i;
    while *i < bytes.len()
        && !bytes[*i].is_ascii_whitespace()
        && bytes[*i] != b'>'
        && !(bytes[*i] == b'/' && *i + 1 < bytes.len() && bytes[*i + 1] == b'>')
    {
        *i += 1;
    }

    let value = html
        .get(start..*i)
        .ok_or_else(|| Error::HtmlParse("invalid attribute value".into()))?
        .to_string();
    Ok(value)
}

pub(crate) fn unescape_entities(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest.find(';').filter(|end| *end <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| {
                    entity
                        .strip_prefix('#')
                        .and_then(|dec| dec.parse::<u32>().ok())
                })
                .and_then(char::from_u32),
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn is_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':' || b == b'@' || b == b'.'
}

fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    if at + needle.len() > bytes.len() {
        return false;
    }
    &bytes[at..at + needle.len()] == needle
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || from > bytes.len() {
        return None;
    }

    let mut i = from;
    while i + needle.len() <= bytes.len() {
        if &bytes[i..i + needle.len()] == needle {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn find_case_insensitive_end_tag(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut needle = Vec::new();
    needle.extend_from_slice(b"</");
    needle.extend(tag.iter().map(|b| b.to_ascii_lowercase()));

    let mut i = from;
    while i + needle.len() <= bytes.len() {
        if bytes[i] == b'<' && bytes.get(i + 1) == Some(&b'/') {
            let matched = needle
                .iter()
                .enumerate()
                .all(|(j, expected)| bytes[i + j].to_ascii_lowercase() == *expected);
            if matched {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_table_structure_and_attributes() -> Result<()> {
        let dom = parse_html(
            r#"<table id="t" class="table striped"><thead><tr><th class=sortable>Name</th></tr></thead>
               <tbody><tr><td>Ann</td></tr></tbody></table>"#,
        )?;
        let table = dom.by_id("t").ok_or_else(|| Error::Runtime("t".into()))?;
        assert_eq!(dom.attr(table, "class").as_deref(), Some("table striped"));
        assert_eq!(dom.query_selector_all("th.sortable")?.len(), 1);
        assert_eq!(dom.query_selector_all("tbody tr")?.len(), 1);
        Ok(())
    }

    #[test]
    fn rows_get_an_implied_body_and_cells_close_implicitly() -> Result<()> {
        let dom = parse_html(
            "<table id='t'><tr><th>Name<th>Qty\
             <tr><td>bolt<td>9\
             <tr><td><table id='inner'><tr><td>x</table><td>7</table>",
        )?;
        let table = dom.by_id("t").ok_or_else(|| Error::Runtime("t".into()))?;
        let bodies = dom.element_children(table);
        assert_eq!(bodies.len(), 1);
        assert!(dom.is_tag(bodies[0], "tbody"));
        let rows = dom.element_children(bodies[0]);
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(dom.element_children(*row).len(), 2);
        }
        let inner = dom.by_id("inner").ok_or_else(|| Error::Runtime("inner".into()))?;
        assert_eq!(dom.query_selector_all_from(inner, "tbody > tr > td")?.len(), 1);
        Ok(())
    }

    #[test]
    fn void_and_self_closing_tags_do_not_swallow_siblings() -> Result<()> {
        let dom = parse_html("<div id='d'><img src='a.png'><br/><span>x</span></div>")?;
        let div = dom.by_id("d").ok_or_else(|| Error::Runtime("d".into()))?;
        assert_eq!(dom.element_children(div).len(), 3);
        Ok(())
    }

    #[test]
    fn stray_end_tag_is_ignored() -> Result<()> {
        let dom = parse_html("<div id='d'><p>a</span>b</p></div><p id='after'></p>")?;
        let div = dom.by_id("d").ok_or_else(|| Error::Runtime("d".into()))?;
        assert_eq!(dom.text_content(div), "ab");
        assert!(dom.by_id("after").is_some());
        Ok(())
    }

    #[test]
    fn entities_are_decoded_in_text_and_attributes() -> Result<()> {
        let dom = parse_html("<p id='p' title='a &amp; b'>1 &lt; 2 &#x41;&#66; &unknown;</p>")?;
        let p = dom.by_id("p").ok_or_else(|| Error::Runtime("p".into()))?;
        assert_eq!(dom.attr(p, "title").as_deref(), Some("a & b"));
        assert_eq!(dom.text_content(p), "1 < 2 AB &unknown;");
        Ok(())
    }

    #[test]
    fn script_body_is_raw_text() -> Result<()> {
        let dom = parse_html("<script>if (a < b) { x('</div>'); }</script><p id='p'>ok</p>")?;
        assert!(dom.by_id("p").is_some());
        Ok(())
    }

    #[test]
    fn doctype_and_comments_are_skipped() -> Result<()> {
        let dom = parse_html("<!DOCTYPE html><!-- note --><body><p id='p'>x</p></body>")?;
        assert!(dom.body().is_some());
        assert!(dom.by_id("p").is_some());
        Ok(())
    }

    #[test]
    fn unclosed_comment_is_an_error() {
        assert!(matches!(parse_html("<!-- nope"), Err(Error::HtmlParse(_))));
    }

    #[test]
    fn textarea_and_select_values_are_initialized() -> Result<()> {
        let dom = parse_html(
            "<textarea id='t'>hello</textarea>\
             <select id='s'><option value='a'>A</option><option selected>B</option></select>",
        )?;
        let t = dom.by_id("t").ok_or_else(|| Error::Runtime("t".into()))?;
        let s = dom.by_id("s").ok_or_else(|| Error::Runtime("s".into()))?;
        assert_eq!(dom.value(t)?, "hello");
        assert_eq!(dom.value(s)?, "B");
        Ok(())
    }
}
