//! Conversion between an ordered file list and its persisted form.
//! 檔案清單與持久化字串之間的轉換。
//!
//! The list is stored as `{item,item,...}` where each item follows comma-text
//! rules: items containing a delimiter, a quote, whitespace or a control
//! character are wrapped in double quotes with embedded quotes doubled.

const OPEN_MARKER: char = '{';
const CLOSE_MARKER: char = '}';
const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Persisted representation of a workspace snapshot.
/// 工作區快照的持久化表示。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSnapshot {
    pub open_files: String,
    pub selected: String,
}

impl EncodedSnapshot {
    /// Decodes both fields; an empty `selected` becomes `None`.
    /// 解碼兩個欄位；空白的 `selected` 轉為 `None`。
    pub fn decode(&self) -> (Vec<String>, Option<String>) {
        let (files, _) = decode(&self.open_files);
        (files, decode_selected(&self.selected))
    }
}

/// Encodes the ordered file list and the selected file.
/// 將有序檔案清單與選取中的檔案編碼。
pub fn encode<I, S>(open_files: I, selected: Option<&str>) -> EncodedSnapshot
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut body = String::new();
    for (index, item) in open_files.into_iter().enumerate() {
        if index > 0 {
            body.push(DELIMITER);
        }
        push_item(&mut body, item.as_ref());
    }

    EncodedSnapshot {
        open_files: format!("{OPEN_MARKER}{body}{CLOSE_MARKER}"),
        selected: selected.unwrap_or_default().to_string(),
    }
}

/// Decodes a persisted list. Returns the items and whether a non-empty
/// bracketed list was present.
/// 解碼持久化清單；回傳項目以及是否存在非空的括號清單。
pub fn decode(raw: &str) -> (Vec<String>, bool) {
    let body = match raw
        .trim()
        .strip_prefix(OPEN_MARKER)
        .and_then(|rest| rest.strip_suffix(CLOSE_MARKER))
    {
        Some(body) if !body.is_empty() => body,
        _ => return (Vec::new(), false),
    };
    (parse_items(body), true)
}

pub fn decode_selected(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

fn needs_quoting(item: &str) -> bool {
    item.is_empty()
        || item
            .chars()
            .any(|ch| ch == DELIMITER || ch == QUOTE || ch.is_whitespace() || ch.is_control())
}

fn push_item(buf: &mut String, item: &str) {
    if !needs_quoting(item) {
        buf.push_str(item);
        return;
    }
    buf.push(QUOTE);
    for ch in item.chars() {
        if ch == QUOTE {
            buf.push(QUOTE);
        }
        buf.push(ch);
    }
    buf.push(QUOTE);
}

fn parse_items(body: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut chars = body.chars().peekable();

    loop {
        while chars.peek().is_some_and(|ch| ch.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else {
            break;
        };

        if first == QUOTE {
            chars.next();
            let mut item = String::new();
            while let Some(ch) = chars.next() {
                if ch == QUOTE {
                    if chars.peek() == Some(&QUOTE) {
                        chars.next();
                        item.push(QUOTE);
                    } else {
                        break;
                    }
                } else {
                    item.push(ch);
                }
            }
            // Anything between the closing quote and the next delimiter is noise.
            for ch in chars.by_ref() {
                if ch == DELIMITER {
                    break;
                }
            }
            if !item.is_empty() {
                items.push(item);
            }
        } else {
            let mut item = String::new();
            for ch in chars.by_ref() {
                if ch == DELIMITER {
                    break;
                }
                item.push(ch);
            }
            let trimmed = item.trim();
            if !trimmed.is_empty() {
                items.push(trimmed.to_string());
            }
        }
    }

    items
}
