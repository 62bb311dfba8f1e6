use crate::token::{MentionToken, TOKEN_PREFIX, TOKEN_SUFFIX};

/// One piece of a chat body.
///
/// `raw` on a mention is the exact encoded span, so joining
/// [`Segment::as_str`] over every segment reproduces the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Mention {
        lead_id: u64,
        lead_name: &'a str,
        raw: &'a str,
    },
}

impl<'a> Segment<'a> {
    /// Source text covered by this segment
    pub fn as_str(&self) -> &'a str {
        match *self {
            Segment::Text(text) => text,
            Segment::Mention { raw, .. } => raw,
        }
    }

    pub fn is_mention(&self) -> bool {
        matches!(self, Segment::Mention { .. })
    }

    /// Owned token for a mention segment
    pub fn to_token(&self) -> Option<MentionToken> {
        match *self {
            Segment::Mention {
                lead_id, lead_name, ..
            } => MentionToken::new(lead_id, lead_name).ok(),
            Segment::Text(_) => None,
        }
    }
}

/// Lazy iterator over the segments of a body.
///
/// Cloning restarts from the clone point; [`Segments::restart`] rewinds to
/// the beginning of the input.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Segments<'a> {
    pub fn restart(&self) -> Segments<'a> {
        parse(self.input)
    }
}

/// Split `body` into text runs and mention references.
pub fn parse(body: &str) -> Segments<'_> {
    Segments {
        input: body,
        pos: 0,
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.input.get(self.pos..)?;
        if rest.is_empty() {
            return None;
        }

        if let Some((lead_id, lead_name, raw)) = match_token(rest) {
            self.pos += raw.len();
            return Some(Segment::Mention {
                lead_id,
                lead_name,
                raw,
            });
        }

        // Plain text runs until the next '@' that opens a complete token.
        let text_end = rest
            .match_indices('@')
            .map(|(idx, _)| idx)
            .filter(|idx| *idx > 0)
            .find(|idx| match_token(&rest[*idx..]).is_some())
            .unwrap_or(rest.len());

        self.pos += text_end;
        Some(Segment::Text(&rest[..text_end]))
    }
}

/// Match a token at the very start of `s`.
///
/// Returns `(lead_id, lead_name, raw_span)`.
pub(crate) fn match_token(s: &str) -> Option<(u64, &str, &str)> {
    let after_prefix = s.strip_prefix(TOKEN_PREFIX)?;

    let digits = after_prefix
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    let lead_id: u64 = after_prefix[..digits].parse().ok()?;

    let after_colon = after_prefix[digits..].strip_prefix(':')?;
    let name_len = after_colon.find(|c: char| c == TOKEN_SUFFIX || c == '\n')?;
    if name_len == 0 || !after_colon[name_len..].starts_with(TOKEN_SUFFIX) {
        return None;
    }

    let raw_len = TOKEN_PREFIX.len() + digits + 1 + name_len + TOKEN_SUFFIX.len_utf8();
    Some((lead_id, &after_colon[..name_len], &s[..raw_len]))
}

/// Every mention in `body`, in order of appearance
pub fn mentions(body: &str) -> Vec<MentionToken> {
    parse(body).filter_map(|segment| segment.to_token()).collect()
}

/// Render mentions as `@leadName` for previews and notifications
pub fn render_display(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    for segment in parse(body) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Mention { lead_name, .. } => {
                out.push('@');
                out.push_str(lead_name);
            }
        }
    }
    out
}
