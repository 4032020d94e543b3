//! Build-method and component transformation stages.
//!
//! The build-method stage restructures a declarative build body — nested
//! component-constructor calls with chained attributes and child blocks —
//! into `Component` / `If` / `ForEach` nodes the generator can emit against
//! either rendering protocol. The component stage rewrites the struct itself
//! into a class against the UI runtime.

use lazy_static::lazy_static;
use regex::Regex;

use crate::ast::{
    AstNode, Block, ComponentStatement, ForEachStatement, MethodDeclaration, Parameter,
    SourcePos,
};
use crate::builtins::{self, decorators, runtime};
use crate::config::CompilerConfig;
use crate::convert::convert_fragment;
use crate::error::{CompileError, CompileResult};
use crate::parse::{matching_brace, matching_paren, parse_fragment, split_top_level_commas};
use crate::transform::{TransformationContext, Transformer};

lazy_static! {
    static ref COMPONENT_HEAD: Regex = Regex::new(r"^([A-Z]\w*)\s*\(").unwrap();
    static ref ATTRIBUTE_HEAD: Regex = Regex::new(r"^\.\s*(\w+)\s*\(").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILD BODY STRUCTURAL PARSING
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_build_block(block: Block) -> CompileResult<Block> {
    let mut statements = Vec::with_capacity(block.statements.len());
    for stmt in block.statements {
        statements.push(parse_build_statement(stmt)?);
    }
    Ok(Block::new(statements))
}

fn parse_build_statement(stmt: AstNode) -> CompileResult<AstNode> {
    match stmt {
        AstNode::Expression { text, pos } => parse_build_expression(text, pos),
        AstNode::If(mut node) => {
            node.then_block = parse_build_block(node.then_block)?;
            if let Some(else_block) = node.else_block.take() {
                node.else_block = Some(parse_build_block(else_block)?);
            }
            Ok(AstNode::If(node))
        }
        AstNode::Block(inner) => Ok(AstNode::Block(parse_build_block(inner)?)),
        other => Ok(other),
    }
}

/// Turn one build-body expression into a `Component` or `ForEach` node.
/// Anything that is not a built-in component invocation (plain expressions,
/// custom component calls) passes through as-is.
fn parse_build_expression(text: String, pos: Option<SourcePos>) -> CompileResult<AstNode> {
    let trimmed = text.trim();
    let Some(caps) = COMPONENT_HEAD.captures(trimmed) else {
        return Ok(AstNode::Expression { text, pos });
    };
    let name = caps[1].to_string();

    if builtins::is_loop_component(&name) {
        return parse_loop_expression(&name, trimmed, pos);
    }
    if !builtins::is_builtin_component(&name) {
        return Ok(AstNode::Expression { text, pos });
    }

    let open = trimmed.find('(').ok_or_else(|| {
        CompileError::transform("Component", format!("malformed invocation of {}", name))
    })?;
    let close = matching_paren(trimmed, open).ok_or_else(|| {
        CompileError::transform("Component", format!("unbalanced arguments of {}", name))
    })?;
    let create_args = trimmed[open + 1..close].trim().to_string();

    let mut attributes = Vec::new();
    let mut rest = trimmed[close + 1..].trim_start();
    while let Some(attr) = ATTRIBUTE_HEAD.captures(rest) {
        let attr_name = attr[1].to_string();
        let open = rest.find('(').ok_or_else(|| {
            CompileError::transform("Component", format!("malformed attribute on {}", name))
        })?;
        let close = matching_paren(rest, open).ok_or_else(|| {
            CompileError::transform(
                "Component",
                format!("unbalanced attribute arguments on {}", name),
            )
        })?;
        attributes.push(format!("{}({})", attr_name, rest[open + 1..close].trim()));
        rest = rest[close + 1..].trim_start();
    }

    let children = if let Some(brace) = rest.find('{') {
        let close = matching_brace(rest, brace).ok_or_else(|| {
            CompileError::transform("Component", format!("unbalanced child block of {}", name))
        })?;
        let body = &rest[brace + 1..close];
        let line = pos.map(|p| p.line).unwrap_or(1);
        let parsed = parse_fragment(body, line).map_err(|message| {
            CompileError::transform("Component", message)
        })?;
        let converted = convert_fragment(&parsed)?;
        Some(parse_build_block(Block::new(converted))?)
    } else {
        None
    };

    Ok(AstNode::Component(ComponentStatement {
        component_name: name,
        create_args,
        attributes,
        children,
    }))
}

/// `ForEach(array, itemGenerator[, keyGenerator])`. Generator lambdas are
/// carried verbatim; their bodies are emitted as written.
fn parse_loop_expression(
    name: &str,
    text: &str,
    _pos: Option<SourcePos>,
) -> CompileResult<AstNode> {
    let open = text.find('(').ok_or_else(|| {
        CompileError::transform("ForEach", format!("malformed invocation of {}", name))
    })?;
    let close = matching_paren(text, open).ok_or_else(|| {
        CompileError::transform("ForEach", format!("unbalanced arguments of {}", name))
    })?;
    let args = split_top_level_commas(&text[open + 1..close]);
    if args.len() < 2 {
        return Err(CompileError::transform(
            "ForEach",
            format!("{} requires an array expression and an item generator", name),
        ));
    }
    Ok(AstNode::ForEach(ForEachStatement {
        kind: name.to_string(),
        array_expression: args[0].clone(),
        item_generator: args[1].clone(),
        key_generator: args.get(2).cloned().filter(|k| !k.is_empty()),
    }))
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILD-METHOD TRANSFORMER
// ═══════════════════════════════════════════════════════════════════════════════

/// Renames `build` per the rendering strategy and restructures its body.
/// `@Builder` methods get the leading `__builder__ = undefined` parameter
/// and the same body treatment; their names are recorded for the generator.
pub struct BuildMethodTransformer {
    partial_update: bool,
    pure_javascript: bool,
}

impl BuildMethodTransformer {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            partial_update: config.partial_update_mode,
            pure_javascript: config.pure_javascript,
        }
    }

    fn render_method_name(&self) -> &'static str {
        if self.partial_update {
            runtime::INITIAL_RENDER
        } else {
            runtime::RENDER
        }
    }

    fn transform_method(
        &self,
        method: &mut MethodDeclaration,
        ctx: &mut TransformationContext,
    ) -> CompileResult<()> {
        if method.is_builder_method() {
            ctx.builder_methods.insert(method.name.clone());
            let builder_param =
                Parameter::new(runtime::BUILDER_PARAM_NAME).with_default("undefined");
            method.parameters.insert(0, builder_param);
        } else if method.is_build_method() {
            if !self.pure_javascript {
                method.name = self.render_method_name().to_string();
            }
        } else {
            return Ok(());
        }

        ctx.current_method = Some(method.name.clone());
        if let Some(body) = method.body.take() {
            let restructured = match *body {
                AstNode::Block(block) => AstNode::Block(parse_build_block(block)?),
                other => parse_build_statement(other)?,
            };
            method.body = Some(Box::new(restructured));
        }
        ctx.current_method = None;
        Ok(())
    }
}

impl Transformer for BuildMethodTransformer {
    fn can_transform(&self, node: &AstNode) -> bool {
        match node {
            AstNode::Class(class) => {
                class.is_component()
                    || class
                        .methods()
                        .any(|m| m.is_build_method() || m.is_builder_method())
            }
            _ => false,
        }
    }

    fn transform(
        &self,
        node: AstNode,
        ctx: &mut TransformationContext,
    ) -> CompileResult<AstNode> {
        let mut class = match node {
            AstNode::Class(c) => c,
            other => return Ok(other),
        };
        ctx.component_depth += 1;
        for member in class.members.iter_mut() {
            if let crate::ast::ClassMember::Method(method) = member {
                self.transform_method(method, ctx)?;
            }
        }
        ctx.component_depth -= 1;
        Ok(AstNode::Class(class))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT TRANSFORMER
// ═══════════════════════════════════════════════════════════════════════════════

/// Struct-to-class rewrite. In runtime mode a `@Component`-family struct
/// becomes a class extending `View`; in pure JavaScript mode it becomes a
/// plain class. `@Entry` forces the export flag either way.
pub struct ComponentTransformer {
    pure_javascript: bool,
}

impl ComponentTransformer {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            pure_javascript: config.pure_javascript,
        }
    }
}

impl Transformer for ComponentTransformer {
    fn can_transform(&self, node: &AstNode) -> bool {
        match node {
            AstNode::Class(class) => class.is_struct || class.is_component(),
            _ => false,
        }
    }

    fn transform(
        &self,
        node: AstNode,
        _ctx: &mut TransformationContext,
    ) -> CompileResult<AstNode> {
        let mut class = match node {
            AstNode::Class(c) => c,
            other => return Ok(other),
        };
        class.is_struct = false;
        if class.is_component() && !self.pure_javascript {
            class.super_class = Some(runtime::VIEW.to_string());
        }
        if class.has_decorator(decorators::ENTRY) {
            class.is_export = true;
        }
        Ok(AstNode::Class(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassDeclaration, ClassMember, Decorator};

    fn build_expr(text: &str) -> AstNode {
        parse_build_expression(text.to_string(), None).unwrap()
    }

    #[test]
    fn test_leaf_component_with_attributes() {
        let AstNode::Component(c) = build_expr("Text('hi').fontSize(16).fontColor('#222')") else {
            panic!("expected a component");
        };
        assert_eq!(c.component_name, "Text");
        assert_eq!(c.create_args, "'hi'");
        assert_eq!(c.attributes, vec!["fontSize(16)", "fontColor('#222')"]);
        assert!(c.children.is_none());
    }

    #[test]
    fn test_container_with_children() {
        let AstNode::Component(c) =
            build_expr("Column() {\n  Text('a')\n  Text('b').fontSize(12)\n}")
        else {
            panic!("expected a component");
        };
        assert_eq!(c.component_name, "Column");
        let children = c.children.expect("children");
        assert_eq!(children.statements.len(), 2);
        assert!(matches!(&children.statements[0], AstNode::Component(t) if t.component_name == "Text"));
    }

    #[test]
    fn test_foreach_with_key_generator() {
        let AstNode::ForEach(f) =
            build_expr("ForEach(this.items, (item) => { Text(item) }, (item) => item.id)")
        else {
            panic!("expected a ForEach");
        };
        assert_eq!(f.kind, "ForEach");
        assert_eq!(f.array_expression, "this.items");
        assert_eq!(f.item_generator, "(item) => { Text(item) }");
        assert_eq!(f.key_generator.as_deref(), Some("(item) => item.id"));
    }

    #[test]
    fn test_custom_component_passes_through() {
        let node = build_expr("MyCard({ title: this.title })");
        assert!(matches!(node, AstNode::Expression { .. }));
    }

    #[test]
    fn test_plain_expression_passes_through() {
        let node = build_expr("this.refresh()");
        assert!(matches!(node, AstNode::Expression { .. }));
    }

    #[test]
    fn test_build_rename_per_strategy() {
        for (partial, expected) in [(true, "initialRender"), (false, "render")] {
            let config = CompilerConfig::default().with_partial_update(partial);
            let stage = BuildMethodTransformer::new(&config);
            let mut class = ClassDeclaration::new("App");
            class.decorators.push(Decorator::new(decorators::COMPONENT));
            class.members.push(ClassMember::Method(MethodDeclaration::new("build")));
            let mut ctx = TransformationContext::new();
            let node = stage.transform(AstNode::Class(class), &mut ctx).unwrap();
            let AstNode::Class(class) = node else { panic!() };
            assert_eq!(class.methods().next().unwrap().name, expected);
        }
    }

    #[test]
    fn test_pure_mode_keeps_build_name() {
        let config = CompilerConfig::default().with_pure_javascript(true);
        let stage = BuildMethodTransformer::new(&config);
        let mut class = ClassDeclaration::new("App");
        class.decorators.push(Decorator::new(decorators::COMPONENT));
        class.members.push(ClassMember::Method(MethodDeclaration::new("build")));
        let mut ctx = TransformationContext::new();
        let AstNode::Class(class) = stage.transform(AstNode::Class(class), &mut ctx).unwrap()
        else {
            panic!()
        };
        assert_eq!(class.methods().next().unwrap().name, "build");
    }

    #[test]
    fn test_builder_method_gains_leading_parameter() {
        let config = CompilerConfig::default();
        let stage = BuildMethodTransformer::new(&config);
        let mut method = MethodDeclaration::new("itemCard");
        method.decorators.push(Decorator::new(decorators::BUILDER));
        method.parameters.push(Parameter::new("item"));
        let mut class = ClassDeclaration::new("App");
        class.decorators.push(Decorator::new(decorators::COMPONENT));
        class.members.push(ClassMember::Method(method));
        let mut ctx = TransformationContext::new();
        let AstNode::Class(class) = stage.transform(AstNode::Class(class), &mut ctx).unwrap()
        else {
            panic!()
        };
        let method = class.methods().next().unwrap();
        assert_eq!(method.parameters[0].name, "__builder__");
        assert_eq!(method.parameters[0].default_value.as_deref(), Some("undefined"));
        assert_eq!(method.parameters[1].name, "item");
        assert!(ctx.builder_methods.contains("itemCard"));
    }

    #[test]
    fn test_component_transformer_runtime_vs_pure() {
        let mut class = ClassDeclaration::new("App");
        class.is_struct = true;
        class.decorators.push(Decorator::new(decorators::ENTRY));
        class.decorators.push(Decorator::new(decorators::COMPONENT));

        let runtime_cfg = CompilerConfig::default();
        let stage = ComponentTransformer::new(&runtime_cfg);
        let mut ctx = TransformationContext::new();
        let AstNode::Class(transformed) = stage
            .transform(AstNode::Class(class.clone()), &mut ctx)
            .unwrap()
        else {
            panic!()
        };
        assert!(!transformed.is_struct);
        assert!(transformed.is_export);
        assert_eq!(transformed.super_class.as_deref(), Some("View"));

        let pure_cfg = CompilerConfig::default().with_pure_javascript(true);
        let stage = ComponentTransformer::new(&pure_cfg);
        let AstNode::Class(transformed) =
            stage.transform(AstNode::Class(class), &mut ctx).unwrap()
        else {
            panic!()
        };
        assert!(!transformed.is_struct);
        assert!(transformed.super_class.is_none());
    }
}
