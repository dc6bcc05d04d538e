//! Source bookkeeping and plain-text rendering of semantic errors

use spp_ast::Span;

use crate::error::SemanticError;

/// One analysed file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
}

/// Every file the analysis lexes, indexed by `Span::file_id`
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file and returns its id.
    pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.push(SourceFile { name: name.into(), source: source.into() });
        self.files.len() - 1
    }

    pub fn get(&self, file_id: usize) -> Option<&SourceFile> {
        self.files.get(file_id)
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, file_id: usize, offset: usize) -> Option<(usize, usize)> {
        let file = self.get(file_id)?;
        let offset = offset.min(file.source.len());
        let before = &file.source[..floor_char_boundary(&file.source, offset)];
        let line = before.matches('\n').count() + 1;
        let col = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        Some((line, col))
    }
}

fn floor_char_boundary(s: &str, mut offset: usize) -> usize {
    while offset > 0 && !s.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Renders `error` as:
///
/// ```text
/// error[E2100]: Unresolved symbol
///  --> main.spp:3:9 (offset 31)
/// unknown identifier 'y'
///   |
/// 3 |     ret y;
///   |         ^
/// help: did you mean 'x'?
/// ```
pub fn render_plain(error: &SemanticError, sources: &SourceMap) -> String {
    let category = error.category();
    let mut out = format!("error[{}]: {}\n", category.code(), category.title());

    match sources.get(error.span.file_id) {
        Some(file) => {
            let (line, col) = sources.line_col(error.span.file_id, error.span.start).unwrap_or((1, 1));
            out.push_str(&format!(" --> {}:{}:{} (offset {})\n", file.name, line, col, error.span.start));
            out.push_str(&format!("{}\n", error.kind));
            out.push_str(&snippet(&file.source, error.span, line));
        }
        None => {
            out.push_str(&format!(" --> <unknown>:{}\n", error.span.start));
            out.push_str(&format!("{}\n", error.kind));
        }
    }

    if let Some((message, span)) = &error.note {
        let location = sources
            .get(span.file_id)
            .zip(sources.line_col(span.file_id, span.start))
            .map(|(file, (line, col))| format!("{}:{}:{}", file.name, line, col))
            .unwrap_or_else(|| format!("offset {}", span.start));
        out.push_str(&format!("note: {} ({})\n", message, location));
    }
    if let Some(help) = &error.help {
        out.push_str(&format!("help: {}\n", help));
    }
    out
}

/// Source line containing `span.start` with a caret underline.
fn snippet(source: &str, span: Span, line: usize) -> String {
    let start = floor_char_boundary(source, span.start.min(source.len()));
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[start..].find('\n').map_or(source.len(), |i| start + i);
    let text = &source[line_start..line_end];

    let indent = source[line_start..start].chars().count();
    let end = span.end.clamp(start, line_end);
    let width = source[start..floor_char_boundary(source, end)].chars().count().max(1);

    let gutter = line.to_string();
    let pad = " ".repeat(gutter.len());
    format!(
        "{pad} |\n{gutter} | {text}\n{pad} | {}{}\n",
        " ".repeat(indent),
        "^".repeat(width),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SemanticErrorKind;

    #[test]
    fn test_line_col() {
        let mut sources = SourceMap::new();
        let id = sources.add("main.spp", "fn f() {\n    ret y;\n}\n");
        assert_eq!(sources.line_col(id, 0), Some((1, 1)));
        assert_eq!(sources.line_col(id, 17), Some((2, 9)));
    }

    #[test]
    fn test_render_plain_underlines_span() {
        let mut sources = SourceMap::new();
        let source = "fn f() -> Num {\n    ret count;\n}\n";
        let id = sources.add("main.spp", source);
        let start = source.find("count").unwrap();
        let error = SemanticError::new(
            SemanticErrorKind::UnknownIdentifier("count".into()),
            Span::new(start, start + 5, id),
        )
        .with_help("did you mean 'counter'?");

        let rendered = render_plain(&error, &sources);
        let expected = "error[E2100]: Unresolved symbol\n \
             --> main.spp:2:9 (offset 24)\n\
             unknown identifier 'count'\n  \
             |\n\
             2 |     ret count;\n  \
             |         ^^^^^\n\
             help: did you mean 'counter'?\n";
        assert_eq!(rendered, expected);
    }
}
