//! AST model for the ETS subset the compiler transforms.
//!
//! Pure data: the only behavior is structural accessors and decorator
//! predicates. The node set is closed; constructs the pipeline never
//! restructures are carried as opaque source-text spans. Trees are
//! exclusively owned top-down — no cycles, no sharing between siblings.

use serde::{Deserialize, Serialize};

use crate::builtins::decorators;

// ═══════════════════════════════════════════════════════════════════════════════
// POSITIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Original source position. Lines are 1-based, columns 0-based (the
/// source-map convention for original positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decorator {
    pub name: String,
}

impl Decorator {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_component_decorator(&self) -> bool {
        crate::builtins::COMPONENT_DECORATORS.contains(self.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDeclaration {
    pub name: String,
    pub type_annotation: Option<String>,
    /// Initializer expression as source text.
    pub initializer: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub decorators: Vec<Decorator>,
    pub pos: Option<SourcePos>,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_annotation: None,
            initializer: None,
            visibility: Visibility::Public,
            is_static: false,
            decorators: Vec::new(),
            pos: None,
        }
    }

    pub fn has_decorator(&self, tag: &str) -> bool {
        self.decorators.iter().any(|d| d.name == tag)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub type_annotation: Option<String>,
    pub default_value: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_annotation: None,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDeclaration {
    /// Plain name, or the accessor spellings `get <name>` / `set <name>`.
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub is_static: bool,
    pub is_async: bool,
    pub decorators: Vec<Decorator>,
    pub body: Option<Box<AstNode>>,
    pub pos: Option<SourcePos>,
}

impl MethodDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            is_static: false,
            is_async: false,
            decorators: Vec::new(),
            body: None,
            pos: None,
        }
    }

    pub fn has_decorator(&self, tag: &str) -> bool {
        self.decorators.iter().any(|d| d.name == tag)
    }

    pub fn is_build_method(&self) -> bool {
        self.name == "build"
    }

    pub fn is_builder_method(&self) -> bool {
        self.has_decorator(decorators::BUILDER) || self.has_decorator(decorators::LOCAL_BUILDER)
    }

    pub fn is_getter(&self) -> bool {
        self.name.starts_with("get ")
    }

    pub fn is_setter(&self) -> bool {
        self.name.starts_with("set ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassMember {
    Property(PropertyDeclaration),
    Method(MethodDeclaration),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDeclaration {
    pub name: String,
    pub is_export: bool,
    /// Declared with the `struct` keyword; the component transform turns
    /// structs into classes.
    pub is_struct: bool,
    pub super_class: Option<String>,
    pub decorators: Vec<Decorator>,
    /// Member order is emission order and is mutated in place by the
    /// pipeline (replace-in-position semantics).
    pub members: Vec<ClassMember>,
    pub pos: Option<SourcePos>,
}

impl ClassDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_export: false,
            is_struct: false,
            super_class: None,
            decorators: Vec::new(),
            members: Vec::new(),
            pos: None,
        }
    }

    pub fn has_decorator(&self, tag: &str) -> bool {
        self.decorators.iter().any(|d| d.name == tag)
    }

    pub fn is_component(&self) -> bool {
        self.decorators.iter().any(|d| d.is_component_decorator())
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDeclaration> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Property(p) => Some(p),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDeclaration> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Method(m) => Some(m),
            _ => None,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<AstNode>,
}

impl Block {
    pub fn new(statements: Vec<AstNode>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfStatement {
    /// Condition expression as source text.
    pub condition: String,
    pub then_block: Block,
    pub else_block: Option<Block>,
}

/// A `ForEach(...)` / `LazyForEach(...)` construct inside a build body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForEachStatement {
    /// `ForEach` or `LazyForEach`.
    pub kind: String,
    pub array_expression: String,
    pub item_generator: String,
    pub key_generator: Option<String>,
}

/// A component invocation in a build body after structural parsing:
/// `Text('hi').fontSize(16) { ...children }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatement {
    pub component_name: String,
    /// Raw argument text of the constructor call.
    pub create_args: String,
    /// Chained attribute calls as `name(args)` text, in source order.
    pub attributes: Vec<String>,
    pub children: Option<Block>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "node")]
pub enum AstNode {
    Import {
        text: String,
        module: Option<String>,
        pos: Option<SourcePos>,
    },
    Export {
        text: String,
        pos: Option<SourcePos>,
    },
    Class(ClassDeclaration),
    /// Top-level function declaration, carried verbatim.
    Function {
        name: String,
        text: String,
        pos: Option<SourcePos>,
    },
    Block(Block),
    If(IfStatement),
    ForEach(ForEachStatement),
    Component(ComponentStatement),
    /// `for` / `for..in` / `for..of`, opaque.
    For {
        text: String,
        pos: Option<SourcePos>,
    },
    While {
        text: String,
        pos: Option<SourcePos>,
    },
    Switch {
        text: String,
        pos: Option<SourcePos>,
    },
    Try {
        text: String,
        pos: Option<SourcePos>,
    },
    Return {
        expression: Option<String>,
    },
    Throw {
        expression: String,
    },
    Expression {
        text: String,
        pos: Option<SourcePos>,
    },
    Empty,
    /// Erased compile-time-only construct; generates nothing.
    Placeholder {
        kind: String,
    },
}

impl AstNode {
    /// Short kind name for logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AstNode::Import { .. } => "Import",
            AstNode::Export { .. } => "Export",
            AstNode::Class(_) => "Class",
            AstNode::Function { .. } => "Function",
            AstNode::Block(_) => "Block",
            AstNode::If(_) => "If",
            AstNode::ForEach(_) => "ForEach",
            AstNode::Component(_) => "Component",
            AstNode::For { .. } => "For",
            AstNode::While { .. } => "While",
            AstNode::Switch { .. } => "Switch",
            AstNode::Try { .. } => "Try",
            AstNode::Return { .. } => "Return",
            AstNode::Throw { .. } => "Throw",
            AstNode::Expression { .. } => "Expression",
            AstNode::Empty => "Empty",
            AstNode::Placeholder { .. } => "Placeholder",
        }
    }

    pub fn pos(&self) -> Option<SourcePos> {
        match self {
            AstNode::Import { pos, .. }
            | AstNode::Export { pos, .. }
            | AstNode::Function { pos, .. }
            | AstNode::For { pos, .. }
            | AstNode::While { pos, .. }
            | AstNode::Switch { pos, .. }
            | AstNode::Try { pos, .. }
            | AstNode::Expression { pos, .. } => *pos,
            AstNode::Class(c) => c.pos,
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE FILE
// ═══════════════════════════════════════════════════════════════════════════════

/// One compilation unit: exclusively owns its top-level statements. Created
/// by the conversion step, mutated by the pipeline, read by the generator,
/// then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub file_name: String,
    pub statements: Vec<AstNode>,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            statements: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_decorator() {
        let mut prop = PropertyDeclaration::new("count");
        prop.decorators.push(Decorator::new("State"));
        assert!(prop.has_decorator("State"));
        assert!(!prop.has_decorator("Prop"));
    }

    #[test]
    fn test_component_class_detection() {
        let mut class = ClassDeclaration::new("App");
        assert!(!class.is_component());
        class.decorators.push(Decorator::new("Entry"));
        assert!(!class.is_component());
        class.decorators.push(Decorator::new("Component"));
        assert!(class.is_component());
    }

    #[test]
    fn test_builder_method_detection() {
        let mut method = MethodDeclaration::new("itemCard");
        assert!(!method.is_builder_method());
        method.decorators.push(Decorator::new("Builder"));
        assert!(method.is_builder_method());
        assert!(MethodDeclaration::new("build").is_build_method());
    }
}
