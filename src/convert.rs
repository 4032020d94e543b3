//! Conversion of the kind-tagged parse tree into the AST model.
//!
//! A priority-ordered registry of per-kind converters; dispatch walks the
//! registry in descending priority and the first converter whose
//! `can_convert` accepts the kind wins. Kinds nobody claims, and
//! compile-time-only constructs, erase to `AstNode::Placeholder` rather than
//! failing: type-level TypeScript never reaches the generator.

use serde_json::Value;
use tracing::debug;

use crate::ast::{
    AstNode, Block, ClassDeclaration, ClassMember, Decorator, IfStatement, MethodDeclaration,
    Parameter, PropertyDeclaration, SourceFile, SourcePos, Visibility,
};
use crate::error::{CompileError, CompileResult};
use crate::parse::kind;

/// Per-file conversion state.
#[derive(Debug, Default)]
pub struct ConversionContext {
    pub file_name: String,
}

pub trait NodeConverter: Send + Sync {
    fn can_convert(&self, kind_name: &str) -> bool;
    fn priority(&self) -> i32 {
        0
    }
    fn convert(
        &self,
        node: &Value,
        registry: &ConverterRegistry,
        ctx: &mut ConversionContext,
    ) -> CompileResult<AstNode>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIELD ACCESS
// ═══════════════════════════════════════════════════════════════════════════════

fn node_kind(node: &Value) -> CompileResult<&str> {
    node.get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| CompileError::malformed("node is missing its kind discriminator"))
}

fn require_str<'a>(node: &'a Value, field: &str) -> CompileResult<&'a str> {
    node.get(field).and_then(Value::as_str).ok_or_else(|| {
        CompileError::malformed(format!("missing string field '{}'", field))
    })
}

fn opt_str(node: &Value, field: &str) -> Option<String> {
    node.get(field).and_then(Value::as_str).map(str::to_string)
}

fn opt_bool(node: &Value, field: &str) -> bool {
    node.get(field).and_then(Value::as_bool).unwrap_or(false)
}

fn node_pos(node: &Value) -> Option<SourcePos> {
    node.get("line")
        .and_then(Value::as_u64)
        .map(|l| SourcePos::new(l as u32, 0))
}

fn decorator_list(node: &Value) -> Vec<Decorator> {
    node.get("decorators")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|d| d.get("name").and_then(Value::as_str))
                .map(Decorator::new)
                .collect()
        })
        .unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVERTERS
// ═══════════════════════════════════════════════════════════════════════════════

struct ImportConverter;

impl NodeConverter for ImportConverter {
    fn can_convert(&self, kind_name: &str) -> bool {
        kind_name == kind::IMPORT
    }

    fn priority(&self) -> i32 {
        100
    }

    fn convert(
        &self,
        node: &Value,
        _registry: &ConverterRegistry,
        _ctx: &mut ConversionContext,
    ) -> CompileResult<AstNode> {
        Ok(AstNode::Import {
            text: require_str(node, "text")?.to_string(),
            module: opt_str(node, "module"),
            pos: node_pos(node),
        })
    }
}

struct ExportConverter;

impl NodeConverter for ExportConverter {
    fn can_convert(&self, kind_name: &str) -> bool {
        kind_name == kind::EXPORT
    }

    fn priority(&self) -> i32 {
        100
    }

    fn convert(
        &self,
        node: &Value,
        _registry: &ConverterRegistry,
        _ctx: &mut ConversionContext,
    ) -> CompileResult<AstNode> {
        Ok(AstNode::Export {
            text: require_str(node, "text")?.to_string(),
            pos: node_pos(node),
        })
    }
}

struct ClassConverter;

impl ClassConverter {
    fn convert_property(node: &Value) -> CompileResult<PropertyDeclaration> {
        Ok(PropertyDeclaration {
            name: require_str(node, "name")?.to_string(),
            type_annotation: opt_str(node, "type"),
            initializer: opt_str(node, "initializer"),
            visibility: if opt_str(node, "visibility").as_deref() == Some("private") {
                Visibility::Private
            } else {
                Visibility::Public
            },
            is_static: opt_bool(node, "isStatic"),
            decorators: decorator_list(node),
            pos: node_pos(node),
        })
    }

    fn convert_method(
        node: &Value,
        registry: &ConverterRegistry,
        ctx: &mut ConversionContext,
    ) -> CompileResult<MethodDeclaration> {
        let parameters = node
            .get("parameters")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .map(|p| {
                        Ok(Parameter {
                            name: require_str(p, "name")?.to_string(),
                            type_annotation: opt_str(p, "type"),
                            default_value: opt_str(p, "default"),
                        })
                    })
                    .collect::<CompileResult<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let body = match node.get("body") {
            Some(body) if !body.is_null() => {
                Some(Box::new(registry.convert_node(body, ctx)?))
            }
            _ => None,
        };

        Ok(MethodDeclaration {
            name: require_str(node, "name")?.to_string(),
            parameters,
            return_type: opt_str(node, "returnType"),
            is_static: opt_bool(node, "isStatic"),
            is_async: opt_bool(node, "isAsync"),
            decorators: decorator_list(node),
            body,
            pos: node_pos(node),
        })
    }
}

impl NodeConverter for ClassConverter {
    fn can_convert(&self, kind_name: &str) -> bool {
        kind_name == kind::CLASS
    }

    fn priority(&self) -> i32 {
        90
    }

    fn convert(
        &self,
        node: &Value,
        registry: &ConverterRegistry,
        ctx: &mut ConversionContext,
    ) -> CompileResult<AstNode> {
        let mut class = ClassDeclaration::new(require_str(node, "name")?);
        class.is_export = opt_bool(node, "isExport");
        class.is_struct = opt_bool(node, "isStruct");
        class.super_class = opt_str(node, "superClass");
        class.decorators = decorator_list(node);
        class.pos = node_pos(node);

        if let Some(members) = node.get("members").and_then(Value::as_array) {
            for member in members {
                match node_kind(member)? {
                    kind::PROPERTY => {
                        class
                            .members
                            .push(ClassMember::Property(Self::convert_property(member)?));
                    }
                    kind::METHOD => {
                        class.members.push(ClassMember::Method(Self::convert_method(
                            member, registry, ctx,
                        )?));
                    }
                    other => {
                        debug!(kind = other, class = %class.name, "skipping unsupported class member");
                    }
                }
            }
        }
        Ok(AstNode::Class(class))
    }
}

struct StatementConverter;

impl NodeConverter for StatementConverter {
    fn can_convert(&self, kind_name: &str) -> bool {
        matches!(
            kind_name,
            kind::BLOCK
                | kind::IF
                | kind::FOR
                | kind::WHILE
                | kind::SWITCH
                | kind::TRY
                | kind::RETURN
                | kind::THROW
                | kind::EXPRESSION
                | kind::EMPTY
                | kind::FUNCTION
        )
    }

    fn priority(&self) -> i32 {
        50
    }

    fn convert(
        &self,
        node: &Value,
        registry: &ConverterRegistry,
        ctx: &mut ConversionContext,
    ) -> CompileResult<AstNode> {
        match node_kind(node)? {
            kind::BLOCK => {
                let statements = node
                    .get("statements")
                    .and_then(Value::as_array)
                    .map(|list| {
                        list.iter()
                            .map(|s| registry.convert_node(s, ctx))
                            .collect::<CompileResult<Vec<_>>>()
                    })
                    .transpose()?
                    .unwrap_or_default();
                Ok(AstNode::Block(Block::new(statements)))
            }
            kind::IF => {
                let then_block = match registry.convert_node(node.get("thenStatement").ok_or_else(
                    || CompileError::malformed("if statement without then branch"),
                )?, ctx)? {
                    AstNode::Block(b) => b,
                    other => Block::new(vec![other]),
                };
                let else_block = match node.get("elseStatement") {
                    Some(e) if !e.is_null() => Some(match registry.convert_node(e, ctx)? {
                        AstNode::Block(b) => b,
                        other => Block::new(vec![other]),
                    }),
                    _ => None,
                };
                Ok(AstNode::If(IfStatement {
                    condition: require_str(node, "condition")?.to_string(),
                    then_block,
                    else_block,
                }))
            }
            kind::FOR => Ok(AstNode::For {
                text: require_str(node, "text")?.to_string(),
                pos: node_pos(node),
            }),
            kind::WHILE => Ok(AstNode::While {
                text: require_str(node, "text")?.to_string(),
                pos: node_pos(node),
            }),
            kind::SWITCH => Ok(AstNode::Switch {
                text: require_str(node, "text")?.to_string(),
                pos: node_pos(node),
            }),
            kind::TRY => Ok(AstNode::Try {
                text: require_str(node, "text")?.to_string(),
                pos: node_pos(node),
            }),
            kind::RETURN => Ok(AstNode::Return {
                expression: opt_str(node, "expression"),
            }),
            kind::THROW => Ok(AstNode::Throw {
                expression: require_str(node, "expression")?.to_string(),
            }),
            kind::EXPRESSION => Ok(AstNode::Expression {
                text: require_str(node, "text")?.to_string(),
                pos: node_pos(node),
            }),
            kind::EMPTY => Ok(AstNode::Empty),
            kind::FUNCTION => Ok(AstNode::Function {
                name: require_str(node, "name")?.to_string(),
                text: require_str(node, "text")?.to_string(),
                pos: node_pos(node),
            }),
            other => Err(CompileError::malformed(format!(
                "statement converter dispatched on foreign kind '{}'",
                other
            ))),
        }
    }
}

/// Compile-time-only constructs: erased on purpose, never an error.
struct EraseConverter;

impl NodeConverter for EraseConverter {
    fn can_convert(&self, kind_name: &str) -> bool {
        matches!(
            kind_name,
            kind::INTERFACE
                | kind::TYPE_ALIAS
                | kind::ENUM
                | kind::MODULE
                | "VoidExpression"
                | "YieldExpression"
        )
    }

    fn priority(&self) -> i32 {
        10
    }

    fn convert(
        &self,
        node: &Value,
        _registry: &ConverterRegistry,
        _ctx: &mut ConversionContext,
    ) -> CompileResult<AstNode> {
        Ok(AstNode::Placeholder {
            kind: node_kind(node)?.to_string(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

pub struct ConverterRegistry {
    converters: Vec<Box<dyn NodeConverter>>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut converters: Vec<Box<dyn NodeConverter>> = vec![
            Box::new(ImportConverter),
            Box::new(ExportConverter),
            Box::new(ClassConverter),
            Box::new(StatementConverter),
            Box::new(EraseConverter),
        ];
        converters.sort_by_key(|c| std::cmp::Reverse(c.priority()));
        Self { converters }
    }
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert one tree node. Unclaimed kinds erase to a placeholder.
    pub fn convert_node(
        &self,
        node: &Value,
        ctx: &mut ConversionContext,
    ) -> CompileResult<AstNode> {
        let kind_name = node_kind(node)?;
        for converter in &self.converters {
            if converter.can_convert(kind_name) {
                return converter.convert(node, self, ctx);
            }
        }
        debug!(kind = kind_name, file = %ctx.file_name, "no converter; erasing node");
        Ok(AstNode::Placeholder {
            kind: kind_name.to_string(),
        })
    }
}

/// Convert a list of already-parsed statement nodes, outside the context of
/// a whole source file. Used for child blocks carved out of build bodies.
pub(crate) fn convert_fragment(nodes: &[Value]) -> CompileResult<Vec<AstNode>> {
    let registry = ConverterRegistry::new();
    let mut ctx = ConversionContext::default();
    nodes
        .iter()
        .map(|n| registry.convert_node(n, &mut ctx))
        .collect()
}

/// The conversion boundary: kind-tagged tree in, `SourceFile` out.
pub fn build_ast(tree: &Value) -> CompileResult<SourceFile> {
    if node_kind(tree)? != kind::SOURCE_FILE {
        return Err(CompileError::malformed("root node must be a source file"));
    }
    let file_name = opt_str(tree, "fileName").unwrap_or_default();
    let registry = ConverterRegistry::new();
    let mut ctx = ConversionContext {
        file_name: file_name.clone(),
    };

    let mut file = SourceFile::new(file_name);
    if let Some(statements) = tree.get("statements").and_then(Value::as_array) {
        for stmt in statements {
            file.statements.push(registry.convert_node(stmt, &mut ctx)?);
        }
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{ScriptParser, SimpleParser};

    fn ast_of(source: &str) -> SourceFile {
        let tree = SimpleParser::new().parse("test.ets", source).unwrap();
        build_ast(&tree).unwrap()
    }

    #[test]
    fn test_build_ast_struct_round_trip() {
        let file = ast_of(
            "@Component\nstruct App {\n  @State count: number = 0\n  build() {\n    Text(this.count)\n  }\n}\n",
        );
        assert_eq!(file.statements.len(), 1);
        let AstNode::Class(class) = &file.statements[0] else {
            panic!("expected a class");
        };
        assert!(class.is_struct);
        assert!(class.has_decorator("Component"));
        assert_eq!(class.members.len(), 2);
        let prop = class.properties().next().unwrap();
        assert_eq!(prop.initializer.as_deref(), Some("0"));
        let build = class.methods().next().unwrap();
        assert!(build.is_build_method());
        assert!(matches!(build.body.as_deref(), Some(AstNode::Block(_))));
    }

    #[test]
    fn test_compile_time_only_kinds_erase() {
        let file = ast_of("interface Shape {\n  area: number\n}\ntype Id = string\nenum E { A }\n");
        assert_eq!(file.statements.len(), 3);
        for stmt in &file.statements {
            assert!(matches!(stmt, AstNode::Placeholder { .. }));
        }
    }

    #[test]
    fn test_unknown_kind_erases_instead_of_failing() {
        let registry = ConverterRegistry::new();
        let mut ctx = ConversionContext::default();
        let node = serde_json::json!({ "kind": "DebuggerStatement" });
        let converted = registry.convert_node(&node, &mut ctx).unwrap();
        assert!(matches!(converted, AstNode::Placeholder { .. }));
    }

    #[test]
    fn test_missing_discriminator_is_malformed() {
        let err = build_ast(&serde_json::json!({ "statements": [] }));
        assert!(matches!(err, Err(CompileError::MalformedTree { .. })));
    }

    #[test]
    fn test_if_conversion() {
        let file = ast_of("if (x > 0) {\n  y()\n} else {\n  z()\n}\n");
        let AstNode::If(stmt) = &file.statements[0] else {
            panic!("expected an if");
        };
        assert_eq!(stmt.condition, "x > 0");
        assert_eq!(stmt.then_block.statements.len(), 1);
        assert!(stmt.else_block.is_some());
    }
}
