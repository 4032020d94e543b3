//! Parse boundary.
//!
//! The front-end contract is `parse(fileName, sourceText)` returning a
//! kind-tagged JSON tree: every node carries a `kind` discriminator plus
//! kind-specific fields. A production front-end lives outside this crate;
//! `SimpleParser` is the built-in fallback covering the ETS subset the
//! pipeline exercises (imports, decorated structs/classes, decorated
//! properties, methods with brace-balanced bodies). It records 1-based line
//! numbers so source maps get original positions.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use crate::error::{CompileError, CompileResult};

/// Node kind discriminators of the parse boundary.
pub mod kind {
    pub const SOURCE_FILE: &str = "SourceFile";
    pub const IMPORT: &str = "ImportDeclaration";
    pub const EXPORT: &str = "ExportDeclaration";
    pub const CLASS: &str = "ClassDeclaration";
    pub const PROPERTY: &str = "PropertyDeclaration";
    pub const METHOD: &str = "MethodDeclaration";
    pub const FUNCTION: &str = "FunctionDeclaration";
    pub const BLOCK: &str = "Block";
    pub const IF: &str = "IfStatement";
    pub const FOR: &str = "ForStatement";
    pub const WHILE: &str = "WhileStatement";
    pub const SWITCH: &str = "SwitchStatement";
    pub const TRY: &str = "TryStatement";
    pub const RETURN: &str = "ReturnStatement";
    pub const THROW: &str = "ThrowStatement";
    pub const EXPRESSION: &str = "ExpressionStatement";
    pub const EMPTY: &str = "EmptyStatement";
    pub const INTERFACE: &str = "InterfaceDeclaration";
    pub const TYPE_ALIAS: &str = "TypeAliasDeclaration";
    pub const ENUM: &str = "EnumDeclaration";
    pub const MODULE: &str = "ModuleDeclaration";
}

/// The front-end seam. Implementations turn source text into the
/// kind-tagged tree or fail the file.
pub trait ScriptParser: Send + Sync {
    fn parse(&self, file_name: &str, source: &str) -> CompileResult<Value>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIMPLE PARSER
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    static ref CLASS_HEADER: Regex = Regex::new(
        r"^(?:export\s+)?(?:default\s+)?(struct|class)\s+(\w+)(?:\s+extends\s+([\w.]+))?\s*\{"
    )
    .unwrap();
    static ref DECORATOR_LINE: Regex = Regex::new(r"^@(\w+)(?:\s*\([^)]*\))?$").unwrap();
    static ref LEADING_DECORATOR: Regex = Regex::new(r"^@(\w+)(?:\s*\([^)]*\))?\s+").unwrap();
    static ref IMPORT_MODULE: Regex = Regex::new(r#"from\s+['"]([^'"]+)['"]"#).unwrap();
    static ref METHOD_HEAD: Regex = Regex::new(r"^(get|set)\s+(\w+)\s*\(|^(\w+)\s*\(").unwrap();
}

#[derive(Debug, Default)]
pub struct SimpleParser;

impl SimpleParser {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptParser for SimpleParser {
    fn parse(&self, file_name: &str, source: &str) -> CompileResult<Value> {
        let clean = strip_comments(source);
        let statements = parse_statement_list(&clean, 1).map_err(|message| {
            CompileError::Parse {
                file: file_name.to_string(),
                message,
            }
        })?;
        Ok(json!({
            "kind": kind::SOURCE_FILE,
            "fileName": file_name,
            "statements": statements,
        }))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEXICAL SCANNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Blank out `//` and `/* */` comments, preserving newlines so the line
/// numbers of everything after a comment stay correct.
fn strip_comments(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    let mut in_string: Option<char> = None;
    while i < chars.len() {
        let c = chars[i];
        if let Some(quote) = in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                in_string = Some(c);
                out.push(c);
                i += 1;
            }
            '/' if i + 1 < chars.len() && chars[i + 1] == '/' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if i + 1 < chars.len() && chars[i + 1] == '*' => {
                i += 2;
                while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                    if chars[i] == '\n' {
                        out.push('\n');
                    }
                    i += 1;
                }
                i = (i + 2).min(chars.len());
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// One brace/paren-balanced statement chunk with its 1-based start line.
#[derive(Debug)]
struct Chunk {
    text: String,
    line: u32,
}

/// Split text into statement chunks. A chunk ends at a `;` at nesting depth
/// zero, or at a newline when the buffer is balanced and the following text
/// does not continue it (attribute chain, `else`, `catch`, `finally`,
/// dangling operator).
fn split_statements(text: &str, start_line: u32) -> Result<Vec<Chunk>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut buf = String::new();
    let mut buf_line = start_line;
    let mut line = start_line;
    let mut depth = 0i32;
    let mut braces = 0i32;
    let mut in_string: Option<char> = None;
    let mut i = 0;

    let flush = |buf: &mut String, buf_line: u32, chunks: &mut Vec<Chunk>| {
        let trimmed = buf.trim();
        if !trimmed.is_empty() {
            chunks.push(Chunk {
                text: trimmed.trim_end_matches(';').trim_end().to_string(),
                line: buf_line,
            });
        }
        buf.clear();
    };

    while i < chars.len() {
        let c = chars[i];
        if let Some(quote) = in_string {
            buf.push(c);
            if c == '\\' && i + 1 < chars.len() {
                buf.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == quote {
                in_string = None;
            }
            if c == '\n' {
                line += 1;
            }
            i += 1;
            continue;
        }
        if buf.trim().is_empty() && !c.is_whitespace() && c != ';' {
            buf_line = line;
        }
        match c {
            '\'' | '"' | '`' => {
                in_string = Some(c);
                buf.push(c);
            }
            '(' | '[' => {
                depth += 1;
                buf.push(c);
            }
            ')' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(format!("unbalanced '{}' at line {}", c, line));
                }
                buf.push(c);
            }
            '{' => {
                braces += 1;
                buf.push(c);
            }
            '}' => {
                braces -= 1;
                if braces < 0 {
                    return Err(format!("unbalanced '}}' at line {}", line));
                }
                buf.push(c);
                if depth == 0 && braces == 0 && !continues_after_block(&chars[i + 1..]) {
                    flush(&mut buf, buf_line, &mut chunks);
                }
            }
            ';' if depth == 0 && braces == 0 => {
                flush(&mut buf, buf_line, &mut chunks);
            }
            '\n' => {
                line += 1;
                if depth == 0
                    && braces == 0
                    && !buf.trim().is_empty()
                    && !continues_after_line(&buf, &chars[i + 1..])
                {
                    flush(&mut buf, buf_line, &mut chunks);
                } else {
                    buf.push(c);
                }
            }
            _ => buf.push(c),
        }
        i += 1;
    }
    if in_string.is_some() {
        return Err(format!("unterminated string literal near line {}", line));
    }
    if depth != 0 || braces != 0 {
        return Err(format!("unbalanced brackets near line {}", line));
    }
    flush(&mut buf, buf_line, &mut chunks);
    Ok(chunks)
}

fn next_word(rest: &[char]) -> String {
    rest.iter()
        .skip_while(|c| c.is_whitespace())
        .take_while(|c| c.is_alphanumeric() || **c == '_' || **c == '.')
        .collect()
}

fn continues_after_block(rest: &[char]) -> bool {
    let next = rest.iter().find(|c| !c.is_whitespace()).copied();
    next == Some('.') || matches!(next_word(rest).as_str(), "else" | "catch" | "finally")
}

fn continues_after_line(buf: &str, rest: &[char]) -> bool {
    if let Some(last) = buf.trim_end().chars().last() {
        if matches!(last, '=' | ',' | '+' | '-' | '*' | '/' | '&' | '|' | '?' | ':' | '(' | '<' | '>') {
            return true;
        }
    }
    let next = rest.iter().find(|c| !c.is_whitespace()).copied();
    matches!(next, Some('.') | Some('{') | Some('?') | Some(':')) || next_word(rest) == "else"
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATEMENT CLASSIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Strip `@Tag` / `@Tag(...)` prefixes that share a line with the
/// declaration they annotate.
fn take_leading_decorators<'a>(mut text: &'a str, decorators: &mut Vec<Value>) -> &'a str {
    while let Some(caps) = LEADING_DECORATOR.captures(text) {
        decorators.push(json!({ "name": &caps[1] }));
        text = &text[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
    }
    text
}

fn parse_statement_list(text: &str, start_line: u32) -> Result<Vec<Value>, String> {
    let chunks = split_statements(text, start_line)?;
    let mut statements = Vec::new();
    let mut decorators: Vec<Value> = Vec::new();
    for chunk in chunks {
        if let Some(caps) = DECORATOR_LINE.captures(chunk.text.trim()) {
            decorators.push(json!({ "name": &caps[1] }));
            continue;
        }
        let pending = std::mem::take(&mut decorators);
        statements.push(parse_statement(&chunk, pending)?);
    }
    Ok(statements)
}

fn parse_statement(chunk: &Chunk, mut decorators: Vec<Value>) -> Result<Value, String> {
    let text = take_leading_decorators(chunk.text.trim(), &mut decorators);
    let line = chunk.line;

    if text.starts_with("import ") || text == "import" {
        let module = IMPORT_MODULE.captures(text).map(|c| c[1].to_string());
        return Ok(json!({
            "kind": kind::IMPORT, "text": text, "module": module, "line": line,
        }));
    }
    if CLASS_HEADER.is_match(text) {
        return parse_class(text, line, decorators);
    }
    if text.starts_with("export ") {
        return Ok(json!({ "kind": kind::EXPORT, "text": text, "line": line }));
    }
    if let Some(word) = first_word(text) {
        match word {
            "function" => {
                let name = text["function".len()..]
                    .trim_start()
                    .chars()
                    .take_while(|c| c.is_alphanumeric() || *c == '_')
                    .collect::<String>();
                return Ok(json!({
                    "kind": kind::FUNCTION, "name": name, "text": text, "line": line,
                }));
            }
            "interface" => return Ok(json!({ "kind": kind::INTERFACE, "text": text, "line": line })),
            "type" => return Ok(json!({ "kind": kind::TYPE_ALIAS, "text": text, "line": line })),
            "enum" => return Ok(json!({ "kind": kind::ENUM, "text": text, "line": line })),
            "declare" | "namespace" | "module" => {
                return Ok(json!({ "kind": kind::MODULE, "text": text, "line": line }))
            }
            "if" => return parse_if(text, line),
            "for" => return Ok(json!({ "kind": kind::FOR, "text": text, "line": line })),
            "while" => return Ok(json!({ "kind": kind::WHILE, "text": text, "line": line })),
            "switch" => return Ok(json!({ "kind": kind::SWITCH, "text": text, "line": line })),
            "try" => return Ok(json!({ "kind": kind::TRY, "text": text, "line": line })),
            "return" => {
                let expr = text["return".len()..].trim();
                return Ok(json!({
                    "kind": kind::RETURN,
                    "expression": if expr.is_empty() { Value::Null } else { json!(expr) },
                    "line": line,
                }));
            }
            "throw" => {
                return Ok(json!({
                    "kind": kind::THROW,
                    "expression": text["throw".len()..].trim(),
                    "line": line,
                }))
            }
            _ => {}
        }
    }
    Ok(json!({ "kind": kind::EXPRESSION, "text": text, "line": line }))
}

fn first_word(text: &str) -> Option<&str> {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    if end == 0 {
        None
    } else {
        Some(&text[..end])
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTROL FLOW
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_if(text: &str, line: u32) -> Result<Value, String> {
    let open = text
        .find('(')
        .ok_or_else(|| format!("malformed if at line {}", line))?;
    let close = matching_paren(text, open)
        .ok_or_else(|| format!("unbalanced if condition at line {}", line))?;
    let condition = text[open + 1..close].trim().to_string();

    let rest = &text[close + 1..];
    let brace = rest
        .find('{')
        .ok_or_else(|| format!("if body must be a block at line {}", line))?;
    let body_close = matching_brace(rest, brace)
        .ok_or_else(|| format!("unbalanced if body at line {}", line))?;
    let body_line = line + count_lines(&text[..close + 1 + brace]);
    let then_block = parse_block(&rest[brace + 1..body_close], body_line)?;

    let tail = rest[body_close + 1..].trim_start();
    let else_block = if let Some(stripped) = tail.strip_prefix("else") {
        let stripped = stripped.trim_start();
        if stripped.starts_with("if") {
            let nested_line = line + count_lines(&text[..text.len() - stripped.len()]);
            let nested = parse_if(stripped, nested_line)?;
            json!({ "kind": kind::BLOCK, "statements": [nested] })
        } else {
            let open = stripped
                .find('{')
                .ok_or_else(|| format!("else body must be a block at line {}", line))?;
            let close = matching_brace(stripped, open)
                .ok_or_else(|| format!("unbalanced else body at line {}", line))?;
            let else_line = line + count_lines(&text[..text.len() - stripped.len() + open]);
            parse_block(&stripped[open + 1..close], else_line)?
        }
    } else {
        Value::Null
    };

    Ok(json!({
        "kind": kind::IF,
        "condition": condition,
        "thenStatement": then_block,
        "elseStatement": else_block,
        "line": line,
    }))
}

fn parse_block(body: &str, start_line: u32) -> Result<Value, String> {
    Ok(json!({
        "kind": kind::BLOCK,
        "statements": parse_statement_list(body, start_line)?,
    }))
}

fn count_lines(text: &str) -> u32 {
    text.chars().filter(|c| *c == '\n').count() as u32
}

fn matching_delim(text: &str, open_at: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string: Option<char> = None;
    let mut skip = false;
    for (i, c) in text.char_indices().skip_while(|(i, _)| *i < open_at) {
        if skip {
            skip = false;
            continue;
        }
        if let Some(quote) = in_string {
            if c == '\\' {
                skip = true;
            } else if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => in_string = Some(c),
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

pub(crate) fn matching_paren(text: &str, open_at: usize) -> Option<usize> {
    matching_delim(text, open_at, '(', ')')
}

pub(crate) fn matching_brace(text: &str, open_at: usize) -> Option<usize> {
    matching_delim(text, open_at, '{', '}')
}

/// Parse a source fragment (a child block carved out of a larger
/// construct) into kind-tagged statement nodes.
pub(crate) fn parse_fragment(text: &str, start_line: u32) -> Result<Vec<Value>, String> {
    parse_statement_list(text, start_line)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSES AND MEMBERS
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_class(text: &str, line: u32, decorators: Vec<Value>) -> Result<Value, String> {
    let caps = CLASS_HEADER
        .captures(text)
        .ok_or_else(|| format!("malformed class header at line {}", line))?;
    let is_struct = &caps[1] == "struct";
    let name = caps[2].to_string();
    let super_class = caps.get(3).map(|m| m.as_str().to_string());
    let is_export = text.trim_start().starts_with("export");

    let open = text
        .find('{')
        .ok_or_else(|| format!("class body missing at line {}", line))?;
    let close = matching_brace(text, open)
        .ok_or_else(|| format!("unbalanced class body at line {}", line))?;
    let body_line = line + count_lines(&text[..open]);
    let members = parse_member_list(&text[open + 1..close], body_line)?;

    Ok(json!({
        "kind": kind::CLASS,
        "name": name,
        "isStruct": is_struct,
        "isExport": is_export,
        "superClass": super_class,
        "decorators": decorators,
        "members": members,
        "line": line,
    }))
}

fn parse_member_list(body: &str, start_line: u32) -> Result<Vec<Value>, String> {
    let chunks = split_statements(body, start_line)?;
    let mut members = Vec::new();
    let mut decorators: Vec<Value> = Vec::new();
    for chunk in chunks {
        if let Some(caps) = DECORATOR_LINE.captures(chunk.text.trim()) {
            decorators.push(json!({ "name": &caps[1] }));
            continue;
        }
        let pending = std::mem::take(&mut decorators);
        members.push(parse_member(&chunk, pending)?);
    }
    Ok(members)
}

fn parse_member(chunk: &Chunk, mut decorators: Vec<Value>) -> Result<Value, String> {
    let mut text = take_leading_decorators(chunk.text.trim(), &mut decorators);
    let line = chunk.line;
    let mut is_static = false;
    let mut is_async = false;
    let mut visibility = "public";

    loop {
        let Some(word) = first_word(text) else { break };
        match word {
            "static" => is_static = true,
            "async" => is_async = true,
            "private" => visibility = "private",
            "public" | "protected" | "readonly" => {}
            _ => break,
        }
        text = text[word.len()..].trim_start();
    }

    // Accessor or ordinary method: an identifier directly followed by `(`.
    if let Some(caps) = METHOD_HEAD.captures(text) {
        if text.contains('{') {
            let name = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(kw), Some(n), _) => format!("{} {}", kw.as_str(), n.as_str()),
                (_, _, Some(n)) => n.as_str().to_string(),
                _ => return Err(format!("malformed member at line {}", line)),
            };
            return parse_method(text, line, name, is_static, is_async, visibility, decorators);
        }
    }
    parse_property(text, line, is_static, visibility, decorators)
}

#[allow(clippy::too_many_arguments)]
fn parse_method(
    text: &str,
    line: u32,
    name: String,
    is_static: bool,
    is_async: bool,
    visibility: &str,
    decorators: Vec<Value>,
) -> Result<Value, String> {
    let open = text
        .find('(')
        .ok_or_else(|| format!("malformed method at line {}", line))?;
    let close = matching_paren(text, open)
        .ok_or_else(|| format!("unbalanced parameter list at line {}", line))?;
    let parameters = parse_parameters(&text[open + 1..close]);

    let after = &text[close + 1..];
    let brace = after
        .find('{')
        .ok_or_else(|| format!("method body missing at line {}", line))?;
    let return_type = {
        let between = after[..brace].trim();
        between
            .strip_prefix(':')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    };
    let body_close = matching_brace(after, brace)
        .ok_or_else(|| format!("unbalanced method body at line {}", line))?;
    let body_line = line + count_lines(&text[..close + 1 + brace]);
    let body = parse_block(&after[brace + 1..body_close], body_line)?;

    Ok(json!({
        "kind": kind::METHOD,
        "name": name,
        "parameters": parameters,
        "returnType": return_type,
        "isStatic": is_static,
        "isAsync": is_async,
        "visibility": visibility,
        "decorators": decorators,
        "body": body,
        "line": line,
    }))
}

fn parse_property(
    text: &str,
    line: u32,
    is_static: bool,
    visibility: &str,
    decorators: Vec<Value>,
) -> Result<Value, String> {
    let (head, initializer) = match top_level_find(text, '=') {
        Some(eq) => (
            text[..eq].trim(),
            Some(text[eq + 1..].trim().to_string()),
        ),
        None => (text, None),
    };
    let (name, type_annotation) = match top_level_find(head, ':') {
        Some(colon) => (
            head[..colon].trim(),
            Some(head[colon + 1..].trim().to_string()),
        ),
        None => (head.trim(), None),
    };
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(format!("malformed property '{}' at line {}", text, line));
    }
    Ok(json!({
        "kind": kind::PROPERTY,
        "name": name,
        "type": type_annotation,
        "initializer": initializer,
        "isStatic": is_static,
        "visibility": visibility,
        "decorators": decorators,
        "line": line,
    }))
}

/// Index of the first `needle` outside strings and brackets, skipping
/// two-character operators that embed it (`=>`, `==`, `!=`, `<=`, `>=`).
fn top_level_find(text: &str, needle: char) -> Option<usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut depth = 0i32;
    let mut in_string: Option<char> = None;
    let mut byte = 0usize;
    for (i, &c) in chars.iter().enumerate() {
        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            byte += c.len_utf8();
            continue;
        }
        match c {
            '\'' | '"' | '`' => in_string = Some(c),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            c if c == needle && depth == 0 => {
                let next = chars.get(i + 1).copied();
                let prev = if i > 0 { chars.get(i - 1).copied() } else { None };
                let two_char = needle == '='
                    && (next == Some('=')
                        || next == Some('>')
                        || matches!(prev, Some('=') | Some('!') | Some('<') | Some('>')));
                if !two_char {
                    return Some(byte);
                }
            }
            _ => {}
        }
        byte += c.len_utf8();
    }
    None
}

fn parse_parameters(text: &str) -> Vec<Value> {
    split_top_level_commas(text)
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            let p = p.trim();
            let (head, default) = match top_level_find(p, '=') {
                Some(eq) => (p[..eq].trim(), Some(p[eq + 1..].trim().to_string())),
                None => (p, None),
            };
            let (name, ty) = match top_level_find(head, ':') {
                Some(colon) => (
                    head[..colon].trim(),
                    Some(head[colon + 1..].trim().to_string()),
                ),
                None => (head, None),
            };
            json!({ "name": name, "type": ty, "default": default })
        })
        .collect()
}

pub fn split_top_level_commas(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    let mut depth = 0i32;
    let mut braces = 0i32;
    let mut in_string: Option<char> = None;
    for c in text.chars() {
        if let Some(quote) = in_string {
            buf.push(c);
            if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                in_string = Some(c);
                buf.push(c);
            }
            '(' | '[' => {
                depth += 1;
                buf.push(c);
            }
            ')' | ']' => {
                depth -= 1;
                buf.push(c);
            }
            '{' => {
                braces += 1;
                buf.push(c);
            }
            '}' => {
                braces -= 1;
                buf.push(c);
            }
            ',' if depth == 0 && braces == 0 => {
                parts.push(buf.trim().to_string());
                buf.clear();
            }
            _ => buf.push(c),
        }
    }
    if !buf.trim().is_empty() {
        parts.push(buf.trim().to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Value {
        SimpleParser::new().parse("test.ets", source).unwrap()
    }

    #[test]
    fn test_import_and_module() {
        let tree = parse("import { router } from '@ohos.router';\n");
        let stmt = &tree["statements"][0];
        assert_eq!(stmt["kind"], kind::IMPORT);
        assert_eq!(stmt["module"], "@ohos.router");
    }

    #[test]
    fn test_decorated_struct_with_state_property() {
        let tree = parse(
            "@Entry\n@Component\nstruct App {\n  @State count: number = 0\n  build() {\n    Text(this.count)\n  }\n}\n",
        );
        let class = &tree["statements"][0];
        assert_eq!(class["kind"], kind::CLASS);
        assert_eq!(class["name"], "App");
        assert_eq!(class["isStruct"], true);
        assert_eq!(class["decorators"][0]["name"], "Entry");
        assert_eq!(class["decorators"][1]["name"], "Component");

        let prop = &class["members"][0];
        assert_eq!(prop["kind"], kind::PROPERTY);
        assert_eq!(prop["name"], "count");
        assert_eq!(prop["type"], "number");
        assert_eq!(prop["initializer"], "0");
        assert_eq!(prop["decorators"][0]["name"], "State");

        let build = &class["members"][1];
        assert_eq!(build["kind"], kind::METHOD);
        assert_eq!(build["name"], "build");
        assert_eq!(build["body"]["statements"][0]["text"], "Text(this.count)");
    }

    #[test]
    fn test_nested_container_stays_one_chunk() {
        let tree = parse(
            "struct S {\n  build() {\n    Column() {\n      Text('a')\n      Text('b')\n    }\n  }\n}\n",
        );
        let body = &tree["statements"][0]["members"][0]["body"]["statements"];
        assert_eq!(body.as_array().unwrap().len(), 1);
        let text = body[0]["text"].as_str().unwrap();
        assert!(text.starts_with("Column()"));
        assert!(text.contains("Text('b')"));
    }

    #[test]
    fn test_attribute_chain_on_next_line_continues() {
        let tree = parse("struct S {\n  build() {\n    Text('x')\n      .fontSize(16)\n  }\n}\n");
        let body = &tree["statements"][0]["members"][0]["body"]["statements"];
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert!(body[0]["text"].as_str().unwrap().contains(".fontSize(16)"));
    }

    #[test]
    fn test_if_else_statement() {
        let tree = parse("struct S {\n  build() {\n    if (this.on) {\n      Text('y')\n    } else {\n      Text('n')\n    }\n  }\n}\n");
        let stmt = &tree["statements"][0]["members"][0]["body"]["statements"][0];
        assert_eq!(stmt["kind"], kind::IF);
        assert_eq!(stmt["condition"], "this.on");
        assert_eq!(stmt["thenStatement"]["statements"][0]["text"], "Text('y')");
        assert_eq!(stmt["elseStatement"]["statements"][0]["text"], "Text('n')");
    }

    #[test]
    fn test_method_parameters_and_return_type() {
        let tree = parse("class C {\n  add(a: number, b: number = 1): number {\n    return a + b\n  }\n}\n");
        let method = &tree["statements"][0]["members"][0];
        assert_eq!(method["parameters"][0]["name"], "a");
        assert_eq!(method["parameters"][1]["default"], "1");
        assert_eq!(method["returnType"], "number");
        assert_eq!(method["body"]["statements"][0]["kind"], kind::RETURN);
    }

    #[test]
    fn test_getter_setter_names() {
        let tree = parse("class C {\n  get total() {\n    return 1\n  }\n}\n");
        assert_eq!(tree["statements"][0]["members"][0]["name"], "get total");
    }

    #[test]
    fn test_compile_time_only_constructs() {
        let tree = parse("interface Shape {\n  area: number\n}\nenum Color { Red }\ntype Id = string\n");
        let kinds: Vec<&str> = tree["statements"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec![kind::INTERFACE, kind::ENUM, kind::TYPE_ALIAS]);
    }

    #[test]
    fn test_comments_stripped_lines_preserved() {
        let tree = parse("// header\n/* block\n comment */\nclass C {\n}\n");
        assert_eq!(tree["statements"][0]["line"], 4);
    }

    #[test]
    fn test_unbalanced_source_is_a_parse_error() {
        let err = SimpleParser::new().parse("bad.ets", "struct S {\n");
        assert!(err.is_err());
    }
}
