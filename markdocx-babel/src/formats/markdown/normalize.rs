//! Math notation normalizer.
//!
//! Chat assistants and copy-pasted notes write formulas with ad-hoc delimiters: a bare `[`
//! line around a display formula, `[ \alpha ]` on its own line, `(\frac{a}{b})` in running
//! prose, or a bare `\alpha`. The Markdown parser only understands `$...$` and `$$...$$`, so
//! this pass rewrites those spellings into canonical delimiters before parsing.
//!
//! # The Algorithm
//!
//! The input is first split by a single-pass scanner into segments: fenced code lines,
//! inline code spans, already-delimited math (`$`, `$$`, `\(`, `\[`) and plain text. Every
//! rewrite only ever touches plain text, and the scanner is re-run after each step so later
//! steps see the delimiters earlier steps introduced.
//!
//! 1. **Bracket blocks:** a line holding only `[` starts a capture that ends at the first
//!    line starting with `]`. A captured block containing a backslash becomes a `$$` block;
//!    anything else, including a capture still open at end of input, is restored verbatim.
//!
//! 2. **Standalone bracket lines:** `[ ... ]` alone on a line (trailing punctuation allowed)
//!    becomes `\( ... \)` when its content looks like LaTeX.
//!
//! 3. **Delimiter canonicalisation:** `\( ... \)` becomes `$...$` and a `\[ ... \]` span
//!    holding a LaTeX command becomes `$$...$$`.
//!
//! 4. **Parenthetical math:** `( ... )` delimited by whitespace or punctuation whose content
//!    holds a LaTeX command becomes `$...$`. Parentheses are depth-matched. Doubled parens
//!    around integer tuples (`((1, 2))`) are then collapsed to one pair.
//!
//! 5. **Bare commands:** a command token with its `{...}` groups and `_`/`^` scripts, not
//!    touching a letter, digit or `$`, is wrapped in `$...$`.
//!
//! Steps 3 to 5 never add a delimiter after a `$` the scanner left unmatched on the same
//! line, and never place one directly against another `$`. Either would re-pair the
//! delimiters on the next scan.
//!
//! The pass is best-effort and never fails. Running it on its own output is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

static LATEX_COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[a-zA-Z]+").expect("valid command regex"));

static BRACKET_OPEN_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[\s*$").expect("valid bracket regex"));

static PUNCTUATION_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[.,;:!?]+$").expect("valid punctuation regex"));

static COMMAND_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\[a-zA-Z]+(?:\{[^{}$`\n]*\})*(?:[_^](?:\{[^{}$`\n]*\}|[A-Za-z0-9]))*")
        .expect("valid token regex")
});

static DOUBLED_TUPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\(\s*(-?\d+(?:\s*,\s*-?\d+)+)\s*\)\)").expect("valid tuple regex")
});

/// Rewrite ambiguous math notation into `$...$` / `$$...$$` delimiters.
pub fn normalize_math(markdown: &str) -> String {
    let text = markdown.replace("\r\n", "\n");
    let text = convert_bracket_blocks(&text);
    let text = convert_standalone_bracket_lines(&text);
    let text = canonicalize_delimiters(&text);
    let text = replace_parenthetical_math(&text);
    wrap_bare_commands(&text)
}

// ---------------------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Span {
    Text,
    Code,
    DollarMath,
    DisplayMath,
    ParenMath,
    BracketMath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    span: Span,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: u8,
    len: usize,
}

impl Fence {
    fn opening(line: &str) -> Option<Fence> {
        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() > 3 {
            return None;
        }
        let marker = *trimmed.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }
        let len = trimmed.bytes().take_while(|b| *b == marker).count();
        if len < 3 {
            return None;
        }
        // Backtick fences cannot carry backticks in their info string.
        if marker == b'`' && trimmed[len..].contains('`') {
            return None;
        }
        Some(Fence { marker, len })
    }

    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() > 3 {
            return false;
        }
        let len = trimmed.bytes().take_while(|b| *b == self.marker).count();
        len >= self.len && trimmed[len..].trim().is_empty()
    }
}

struct Scanner<'a> {
    text: &'a str,
    segments: Vec<Segment>,
    text_start: usize,
}

impl<'a> Scanner<'a> {
    fn protect(&mut self, span: Span, start: usize, end: usize) {
        if self.text_start < start {
            self.segments.push(Segment {
                span: Span::Text,
                start: self.text_start,
                end: start,
            });
        }
        self.segments.push(Segment { span, start, end });
        self.text_start = end;
    }

    fn finish(mut self) -> Vec<Segment> {
        if self.text_start < self.text.len() {
            self.segments.push(Segment {
                span: Span::Text,
                start: self.text_start,
                end: self.text.len(),
            });
        }
        self.segments
    }
}

fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map_or(text.len(), |offset| pos + offset)
}

/// End of the closing backtick run matching an opening run of `len`, within the paragraph.
fn closing_backticks(text: &str, from: usize, len: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut pos = from;
    while pos < bytes.len() {
        match bytes[pos] {
            b'`' => {
                let run = bytes[pos..].iter().take_while(|b| **b == b'`').count();
                if run == len {
                    return Some(pos + run);
                }
                pos += run;
            }
            b'\n' if bytes.get(pos + 1) == Some(&b'\n') => return None,
            _ => pos += 1,
        }
    }
    None
}

fn scan(text: &str) -> Vec<Segment> {
    let bytes = text.as_bytes();
    let mut scanner = Scanner {
        text,
        segments: Vec::new(),
        text_start: 0,
    };
    let mut fence: Option<Fence> = None;
    let mut pos = 0;

    while pos < bytes.len() {
        if pos == 0 || bytes[pos - 1] == b'\n' {
            let end = line_end(text, pos);
            let next = (end + 1).min(text.len());
            let line = &text[pos..end];
            if let Some(open) = fence {
                if open.closes(line) {
                    fence = None;
                }
                scanner.protect(Span::Code, pos, next);
                pos = next;
                continue;
            }
            if let Some(open) = Fence::opening(line) {
                fence = Some(open);
                scanner.protect(Span::Code, pos, next);
                pos = next;
                continue;
            }
        }

        let rest = &text[pos..];
        if rest.starts_with('`') {
            let run = rest.bytes().take_while(|b| *b == b'`').count();
            match closing_backticks(text, pos + run, run) {
                Some(end) => {
                    scanner.protect(Span::Code, pos, end);
                    pos = end;
                }
                None => pos += run,
            }
        } else if rest.starts_with("$$") {
            match text[pos + 2..].find("$$") {
                Some(offset) => {
                    let end = pos + 2 + offset + 2;
                    scanner.protect(Span::DisplayMath, pos, end);
                    pos = end;
                }
                None => pos += 2,
            }
        } else if rest.starts_with('$') {
            let end_of_line = line_end(text, pos);
            match text[pos + 1..end_of_line].find('$') {
                Some(offset) => {
                    let end = pos + 1 + offset + 1;
                    scanner.protect(Span::DollarMath, pos, end);
                    pos = end;
                }
                None => pos += 1,
            }
        } else if rest.starts_with("\\(") {
            let end_of_line = line_end(text, pos);
            match text[pos + 2..end_of_line].find("\\)") {
                Some(offset) => {
                    let end = pos + 2 + offset + 2;
                    scanner.protect(Span::ParenMath, pos, end);
                    pos = end;
                }
                None => pos += 2,
            }
        } else if rest.starts_with("\\[") {
            match text[pos + 2..].find("\\]") {
                Some(offset) => {
                    let end = pos + 2 + offset + 2;
                    scanner.protect(Span::BracketMath, pos, end);
                    pos = end;
                }
                None => pos += 2,
            }
        } else if rest.starts_with('\\')
            && rest
                .as_bytes()
                .get(1)
                .is_some_and(|b| b.is_ascii_punctuation())
        {
            pos += 2;
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    scanner.finish()
}

/// Whether each line of `text` (split on `\n`) starts in plain text.
fn prose_lines(text: &str) -> Vec<bool> {
    let segments = scan(text);
    let mut offset = 0;
    text.split('\n')
        .map(|line| {
            let start = offset;
            offset += line.len() + 1;
            segments
                .iter()
                .find(|segment| segment.start <= start && start < segment.end)
                .map_or(true, |segment| segment.span == Span::Text)
        })
        .collect()
}

/// Dollar signs the scanner left unmatched in plain text before some position.
#[derive(Debug, Clone, Copy, Default)]
struct StrayDollars {
    /// One sits earlier on the current line.
    line: bool,
    /// A `$$` sits anywhere earlier.
    display: bool,
}

impl StrayDollars {
    fn after(mut self, segment: &Segment, slice: &str) -> Self {
        if segment.span != Span::Text {
            if slice.contains('\n') {
                self.line = false;
            }
            return self;
        }
        let bytes = slice.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() {
            match bytes[pos] {
                b'\\' if bytes.get(pos + 1).is_some_and(|b| b.is_ascii_punctuation()) => {
                    pos += 2;
                    continue;
                }
                b'$' => {
                    self.line = true;
                    self.display |= bytes.get(pos + 1) == Some(&b'$');
                }
                b'\n' => self.line = false,
                _ => {}
            }
            pos += 1;
        }
        self
    }
}

/// What surrounds a plain-text segment
#[derive(Debug, Clone, Copy)]
struct Context {
    before: Option<char>,
    after: Option<char>,
    /// An unmatched `$` precedes the segment on its first line.
    stray_dollar: bool,
}

/// Rebuild `text`, passing every plain-text segment through `rewrite` along with its
/// surroundings.
fn rewrite_text_segments(text: &str, rewrite: impl Fn(&str, Context) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut stray = StrayDollars::default();
    for segment in scan(text) {
        let slice = &text[segment.start..segment.end];
        if segment.span == Span::Text {
            let context = Context {
                before: text[..segment.start].chars().next_back(),
                after: text[segment.end..].chars().next(),
                stray_dollar: stray.line,
            };
            out.push_str(&rewrite(slice, context));
        } else {
            out.push_str(slice);
        }
        stray = stray.after(&segment, slice);
    }
    out
}

/// Whether `text` holds a `\command`, ignoring escaped backslashes.
fn has_command(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos + 1 < bytes.len() {
        if bytes[pos] == b'\\' {
            if bytes[pos + 1].is_ascii_alphabetic() {
                return true;
            }
            if bytes[pos + 1].is_ascii_punctuation() {
                pos += 2;
                continue;
            }
        }
        pos += 1;
    }
    false
}

// ---------------------------------------------------------------------------------------
// Step 1: bracket blocks
// ---------------------------------------------------------------------------------------

fn is_block_latex_candidate(content: &str) -> bool {
    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed.contains("$$") || trimmed.starts_with("\\[") {
        return false;
    }
    trimmed.contains('\\')
}

fn convert_bracket_blocks(text: &str) -> String {
    let prose = prose_lines(text);
    let mut output: Vec<String> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut indent = "";
    let mut capturing = false;

    for (line, is_prose) in text.split('\n').zip(prose) {
        if !capturing {
            if is_prose && BRACKET_OPEN_LINE.is_match(line) {
                capturing = true;
                indent = line.find('[').map_or("", |index| &line[..index]);
                buffer.clear();
            } else {
                output.push(line.to_string());
            }
            continue;
        }

        let closing = line.find(']').filter(|_| line.trim().starts_with(']'));
        let Some(closing) = closing else {
            buffer.push(line);
            continue;
        };

        let suffix = &line[closing + 1..];
        let (open, close) = if is_block_latex_candidate(&buffer.join("\n")) {
            ("$$", "$$")
        } else {
            ("[", "]")
        };
        output.push(format!("{indent}{open}"));
        output.extend(buffer.drain(..).map(str::to_string));
        output.push(format!("{indent}{close}{suffix}"));
        capturing = false;
        indent = "";
    }

    if capturing {
        output.push(format!("{indent}["));
        output.extend(buffer.drain(..).map(str::to_string));
    }

    output.join("\n")
}

// ---------------------------------------------------------------------------------------
// Step 2: standalone bracket lines
// ---------------------------------------------------------------------------------------

fn is_inline_latex_candidate(content: &str) -> bool {
    let trimmed = content.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('$')
        || trimmed.starts_with("\\(")
        || trimmed.starts_with("\\[")
    {
        return false;
    }
    if !trimmed.chars().any(char::is_whitespace) {
        return LATEX_COMMAND.is_match(trimmed) || trimmed.contains('\\');
    }
    LATEX_COMMAND.is_match(trimmed)
}

fn convert_bracket_line(line: &str) -> Option<String> {
    if !line.trim().starts_with('[') {
        return None;
    }
    let open = line.find('[')?;
    let close = line.rfind(']')?;
    if close <= open {
        return None;
    }

    let prefix = &line[..open];
    let inner = &line[open + 1..close];
    let suffix = &line[close + 1..];
    let suffix_trimmed = suffix.trim();
    if !suffix_trimmed.is_empty() && !PUNCTUATION_ONLY.is_match(suffix_trimmed) {
        return None;
    }
    if !is_inline_latex_candidate(inner) {
        return None;
    }
    Some(format!("{prefix}\\({}\\){suffix}", inner.trim()))
}

fn convert_standalone_bracket_lines(text: &str) -> String {
    let prose = prose_lines(text);
    text.split('\n')
        .zip(prose)
        .map(|(line, is_prose)| match is_prose {
            true => convert_bracket_line(line).unwrap_or_else(|| line.to_string()),
            false => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------------------
// Step 3: delimiter canonicalisation
// ---------------------------------------------------------------------------------------

fn canonicalize_delimiters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut stray = StrayDollars::default();
    for segment in scan(text) {
        let slice = &text[segment.start..segment.end];
        let blocked = stray.line
            || out.ends_with('$')
            || text[segment.end..].starts_with('$');
        let rewritten = match segment.span {
            _ if blocked => None,
            Span::ParenMath => {
                let inner = slice[2..slice.len() - 2].trim();
                (!inner.is_empty() && !inner.contains('$')).then(|| format!("${inner}$"))
            }
            Span::BracketMath => {
                let inner = slice[2..slice.len() - 2].trim();
                (!stray.display && has_command(inner) && !inner.contains('$'))
                    .then(|| format!("$${inner}$$"))
            }
            _ => None,
        };
        out.push_str(rewritten.as_deref().unwrap_or(slice));
        stray = stray.after(&segment, slice);
    }
    out
}

// ---------------------------------------------------------------------------------------
// Step 4: parenthetical math
// ---------------------------------------------------------------------------------------

fn is_boundary(ch: Option<char>) -> bool {
    match ch {
        None => true,
        Some(c) => c.is_whitespace() || (c.is_ascii_punctuation() && !matches!(c, ']' | '\\' | '$')),
    }
}

/// Byte index of the `)` closing the `(` at `open`, skipping escaped characters.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut pos = open;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if bytes.get(pos + 1).is_some_and(|b| b.is_ascii_punctuation()) => {
                pos += 2;
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

fn replace_parentheticals(text: &str, context: Context) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut stray_dollar = context.stray_dollar;
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if bytes.get(pos + 1).is_some_and(|b| b.is_ascii_punctuation()) => {
                pos += 2;
                continue;
            }
            b'$' => stray_dollar = true,
            b'\n' => stray_dollar = false,
            b'(' if !stray_dollar => {
                // Right after a rewrite the output ends in `$`.
                let previous = match pos {
                    0 => context.before,
                    _ if pos == copied => Some('$'),
                    _ => text[..pos].chars().next_back(),
                };
                if is_boundary(previous) {
                    if let Some(close) = matching_paren(text, pos) {
                        let next = text[close + 1..].chars().next().or(context.after);
                        let inner = &text[pos + 1..close];
                        if is_boundary(next)
                            && has_command(inner)
                            && !inner.contains(['$', '`', '\n'])
                        {
                            out.push_str(&text[copied..pos]);
                            out.push('$');
                            out.push_str(inner.trim());
                            out.push('$');
                            copied = close + 1;
                            pos = close + 1;
                            continue;
                        }
                    }
                }
            }
            _ => {}
        }
        pos += 1;
    }

    out.push_str(&text[copied..]);
    collapse_doubled_tuples(&out)
}

fn collapse_doubled_tuples(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = DOUBLED_TUPLE.replace_all(&current, "($1)").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn replace_parenthetical_math(text: &str) -> String {
    rewrite_text_segments(text, replace_parentheticals)
}

// ---------------------------------------------------------------------------------------
// Step 5: bare commands
// ---------------------------------------------------------------------------------------

fn blocks_wrapping(ch: Option<char>) -> bool {
    ch.is_some_and(|c| c.is_alphanumeric() || c == '$')
}

fn wrap_commands(text: &str, context: Context) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut stray_dollar = context.stray_dollar;
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {}
            b'$' => {
                stray_dollar = true;
                pos += 1;
                continue;
            }
            b'\n' => {
                stray_dollar = false;
                pos += 1;
                continue;
            }
            _ => {
                pos += 1;
                continue;
            }
        }
        match bytes.get(pos + 1) {
            Some(b) if b.is_ascii_alphabetic() => {}
            Some(b) if b.is_ascii_punctuation() => {
                pos += 2;
                continue;
            }
            _ => {
                pos += 1;
                continue;
            }
        }

        // Adjacent commands (`\alpha\beta`) form one formula.
        let mut end = pos;
        while let Some(token) = COMMAND_TOKEN.find(&text[end..]) {
            end += token.end();
            if !(text[end..].starts_with('\\')
                && text
                    .as_bytes()
                    .get(end + 1)
                    .is_some_and(|b| b.is_ascii_alphabetic()))
            {
                break;
            }
        }

        let previous = if pos == 0 {
            context.before
        } else {
            text[..pos].chars().next_back()
        };
        let next = text[end..].chars().next().or(context.after);
        if !stray_dollar && !blocks_wrapping(previous) && !blocks_wrapping(next) {
            out.push_str(&text[copied..pos]);
            out.push('$');
            out.push_str(&text[pos..end]);
            out.push('$');
            copied = end;
        }
        pos = end;
    }

    out.push_str(&text[copied..]);
    out
}

fn wrap_bare_commands(text: &str) -> String {
    rewrite_text_segments(text, wrap_commands)
}
