//! The lowered program: validated, name-resolved, order-preserving
//! intermediate form between the AST and bytecode (`spec.md` GLOSSARY
//! "Lowered program").

use tol_hash::Hash32;
use tol_syntax::ast::Statement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredParam {
    pub name: String,
    pub type_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredSlot {
    pub name: String,
    pub type_text: String,
    pub canonical_hash: Hash32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredEventParam {
    pub name: String,
    pub type_text: String,
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredEvent {
    pub name: String,
    pub params: Vec<LoweredEventParam>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredFunction {
    pub name: String,
    pub params: Vec<LoweredParam>,
    pub returns: Vec<LoweredParam>,
    pub modifiers: Vec<String>,
    /// `Some` for `public`/`external` functions (the only ABI-visible
    /// kind); resolved once here per `spec.md` §4.4.
    pub selector: Option<String>,
    pub body: Vec<Statement>,
}

impl LoweredFunction {
    pub fn is_public_or_external(&self) -> bool {
        self.modifiers.iter().any(|m| m == "public" || m == "external")
    }

    pub fn is_void(&self) -> bool {
        self.returns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredConstructor {
    pub params: Vec<LoweredParam>,
    pub modifiers: Vec<String>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredFallback {
    pub modifiers: Vec<String>,
    pub body: Vec<Statement>,
}

/// The full lowered contract: every member in source declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredProgram {
    pub contract_name: String,
    pub storage: Vec<LoweredSlot>,
    pub events: Vec<LoweredEvent>,
    pub functions: Vec<LoweredFunction>,
    pub constructor: Option<LoweredConstructor>,
    pub fallback: Option<LoweredFallback>,
}
