//! The TOI text interface descriptor (`spec.md` §4.7): a line-based,
//! human-readable summary of a contract's public surface, independent of
//! its bytecode.

use crate::error::ArtifactError;

const HEADER: &str = "TOI 1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToiFunction {
    pub name: String,
    pub param_types: Vec<String>,
    pub return_types: Vec<String>,
    pub visibility: String,
    pub mutability: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToiEvent {
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToiArtifact {
    pub interface_name: String,
    pub functions: Vec<ToiFunction>,
    pub events: Vec<ToiEvent>,
}

/// `inspect(toi)`'s structured summary (`spec.md` §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToiSummary {
    pub version: u32,
    pub interface_name: String,
    pub function_count: usize,
    pub event_count: usize,
}

impl ToiArtifact {
    pub fn summary(&self) -> ToiSummary {
        ToiSummary { version: 1, interface_name: self.interface_name.clone(), function_count: self.functions.len(), event_count: self.events.len() }
    }
}

/// Encodes a TOI artifact to its canonical text form: `fn`/`event`
/// entries in source order, one per line, inside `interface <Name> { }`.
pub fn encode_toi(toi: &ToiArtifact) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(&format!("interface {} {{\n", toi.interface_name));
    for f in &toi.functions {
        out.push_str(&format!(
            "    fn {}({}) -> ({}) {} {};\n",
            f.name,
            f.param_types.join(", "),
            f.return_types.join(", "),
            f.visibility,
            f.mutability
        ));
    }
    for e in &toi.events {
        out.push_str(&format!("    event {}({});\n", e.name, e.params.join(", ")));
    }
    out.push_str("}\n");
    out
}

/// Parses and validates TOI text (`spec.md` §4.7 "validation parses the
/// text and confirms well-formedness").
#[tracing::instrument(skip(text))]
pub fn decode_toi(text: &str) -> Result<ToiArtifact, ArtifactError> {
    let mut lines = text.lines().enumerate();

    let (_, header_line) = lines.next().ok_or(ArtifactError::MalformedToi { line: 1, detail: "empty TOI text".to_string() })?;
    if header_line.trim() != HEADER {
        return Err(ArtifactError::MalformedToi { line: 1, detail: format!("expected header '{HEADER}', found '{header_line}'") });
    }

    let (line_no, decl_line) = lines.next().ok_or(ArtifactError::MalformedToi { line: 2, detail: "missing interface declaration".to_string() })?;
    let decl = decl_line.trim();
    let interface_name = decl
        .strip_prefix("interface ")
        .and_then(|rest| rest.strip_suffix('{'))
        .map(|name| name.trim().to_string())
        .ok_or(ArtifactError::MalformedToi { line: line_no + 1, detail: format!("expected 'interface <Name> {{', found '{decl_line}'") })?;
    if interface_name.is_empty() {
        return Err(ArtifactError::MalformedToi { line: line_no + 1, detail: "empty interface name".to_string() });
    }

    let mut functions = Vec::new();
    let mut events = Vec::new();
    for (idx, raw) in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line == "}" {
            return Ok(ToiArtifact { interface_name, functions, events });
        }
        let line = line.strip_suffix(';').unwrap_or(line);
        if let Some(rest) = line.strip_prefix("fn ") {
            functions.push(parse_function_entry(rest, idx + 1)?);
        } else if let Some(rest) = line.strip_prefix("event ") {
            events.push(parse_event_entry(rest, idx + 1)?);
        } else {
            return Err(ArtifactError::MalformedToi { line: idx + 1, detail: format!("unrecognized entry '{raw}'") });
        }
    }
    Err(ArtifactError::MalformedToi { line: text.lines().count() + 1, detail: "missing closing '}'".to_string() })
}

fn parse_function_entry(rest: &str, line: usize) -> Result<ToiFunction, ArtifactError> {
    let (name, rest) = rest
        .split_once('(')
        .ok_or(ArtifactError::MalformedToi { line, detail: format!("expected '(' after function name in '{rest}'") })?;
    let (params, rest) = rest
        .split_once(')')
        .ok_or(ArtifactError::MalformedToi { line, detail: format!("expected ')' in '{rest}'") })?;
    let rest = rest
        .trim()
        .strip_prefix("->")
        .ok_or(ArtifactError::MalformedToi { line, detail: format!("expected '->' in '{rest}'") })?
        .trim();
    let (returns, tail) = rest
        .strip_prefix('(')
        .and_then(|r| r.split_once(')'))
        .ok_or(ArtifactError::MalformedToi { line, detail: format!("expected '(<returns>)' in '{rest}'") })?;
    let mut words = tail.split_whitespace();
    let visibility = words.next().ok_or(ArtifactError::MalformedToi { line, detail: "missing visibility".to_string() })?.to_string();
    let mutability = words.next().ok_or(ArtifactError::MalformedToi { line, detail: "missing mutability".to_string() })?.to_string();

    Ok(ToiFunction {
        name: name.trim().to_string(),
        param_types: split_list(params),
        return_types: split_list(returns),
        visibility,
        mutability,
    })
}

fn parse_event_entry(rest: &str, line: usize) -> Result<ToiEvent, ArtifactError> {
    let (name, rest) = rest
        .split_once('(')
        .ok_or(ArtifactError::MalformedToi { line, detail: format!("expected '(' after event name in '{rest}'") })?;
    let params = rest
        .strip_suffix(')')
        .ok_or(ArtifactError::MalformedToi { line, detail: format!("expected ')' in '{rest}'") })?;
    Ok(ToiEvent { name: name.trim().to_string(), params: split_list(params) })
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|p| !p.is_empty()).map(str::to_string).collect()
}
