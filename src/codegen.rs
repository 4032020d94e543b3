//! Strategy-based code generation.
//!
//! A registry of emission strategies sorted by descending priority; the
//! first strategy whose `can_handle` accepts a node emits it. Nodes nobody
//! claims produce no output and a warning, never an error: generation stays
//! total over the best-effort AST, placeholders included.
//!
//! The component protocol depends on two config axes. Pure JavaScript emits
//! nested calls with no runtime scaffolding. Runtime mode brackets every
//! component with create/pop; within it, partial update wraps creation in
//! the element-id bookkeeping closure while full render emits the plain
//! unconditional body.

use std::collections::HashSet;
use tracing::warn;

use crate::ast::{
    AstNode, Block, ClassDeclaration, ClassMember, ComponentStatement, ForEachStatement,
    IfStatement, MethodDeclaration, PropertyDeclaration, SourceFile, SourcePos, Visibility,
};
use crate::builtins::runtime;
use crate::config::CompilerConfig;
use crate::error::CompileResult;
use crate::sourcemap::{SourceMap, SourceMapBuilder};
use crate::writer::CodeWriter;

/// Map a source file name onto its generated-output name.
pub fn output_file_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, "ets" | "ts")) => format!("{}.js", stem),
        _ => format!("{}.js", file_name),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATION CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-file emission state. Never shared across files.
pub struct GenerationContext<'a> {
    pub writer: CodeWriter,
    pub config: &'a CompilerConfig,
    pub builder_methods: HashSet<String>,
    pub imported_modules: HashSet<String>,
    map: Option<SourceMapBuilder>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(config: &'a CompilerConfig, file_name: &str) -> Self {
        let map = config
            .generate_source_map
            .then(|| SourceMapBuilder::new(output_file_name(file_name), file_name));
        Self {
            writer: CodeWriter::new(),
            config,
            builder_methods: HashSet::new(),
            imported_modules: HashSet::new(),
            map,
        }
    }

    /// Record a mapping for the next line the writer emits. A pure side
    /// channel: never touches the writer.
    fn record(&mut self, pos: Option<SourcePos>) {
        if let (Some(map), Some(pos)) = (self.map.as_mut(), pos) {
            map.add_mapping(
                self.writer.next_line() as u32,
                self.writer.next_column() as u32,
                pos.line,
                pos.column,
            );
        }
    }
}

/// Finished generation artifacts.
pub struct GeneratedOutput {
    pub code: String,
    pub source_map: Option<SourceMap>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATEMENT EMISSION
// ═══════════════════════════════════════════════════════════════════════════════

fn emit_statement(node: &AstNode, ctx: &mut GenerationContext) -> CompileResult<()> {
    match node {
        AstNode::Component(c) => emit_component(c, ctx),
        AstNode::If(stmt) => emit_if(stmt, ctx),
        AstNode::ForEach(stmt) => emit_foreach(stmt, ctx),
        AstNode::Block(block) => emit_block_statements(block, ctx),
        AstNode::Expression { text, pos } => {
            ctx.record(*pos);
            match builder_call(text, ctx) {
                Some(call) => ctx.writer.write_line(&format!("{};", call)),
                None => emit_expression_text(text, ctx),
            }
            Ok(())
        }
        AstNode::Return { expression } => {
            match expression {
                Some(e) => ctx.writer.write_line(&format!("return {};", e)),
                None => ctx.writer.write_line("return;"),
            }
            Ok(())
        }
        AstNode::Throw { expression } => {
            ctx.writer.write_line(&format!("throw {};", expression));
            Ok(())
        }
        AstNode::For { text, pos }
        | AstNode::While { text, pos }
        | AstNode::Switch { text, pos }
        | AstNode::Try { text, pos } => {
            ctx.record(*pos);
            ctx.writer.write_text(text);
            Ok(())
        }
        AstNode::Function { text, pos, .. } => {
            ctx.record(*pos);
            ctx.writer.write_text(text);
            Ok(())
        }
        AstNode::Export { text, pos } => {
            ctx.record(*pos);
            emit_expression_text(text, ctx);
            Ok(())
        }
        AstNode::Empty | AstNode::Placeholder { .. } => Ok(()),
        AstNode::Class(_) | AstNode::Import { .. } => {
            // Dispatched at the top level, not inside bodies.
            Ok(())
        }
    }
}

/// Rewrite `this.<name>(args)` when `<name>` is a builder method. Builder
/// signatures carry the leading builder-slot parameter, so every call site
/// must fill that slot before the written arguments.
fn builder_call(text: &str, ctx: &GenerationContext) -> Option<String> {
    let rest = text.trim().strip_prefix("this.")?;
    let open = rest.find('(')?;
    let name = &rest[..open];
    if name.is_empty()
        || !name.chars().all(|c| c.is_alphanumeric() || c == '_')
        || !ctx.builder_methods.contains(name)
    {
        return None;
    }
    // The whole expression must be that one call.
    if crate::parse::matching_paren(rest, open) != Some(rest.len() - 1) {
        return None;
    }
    let args = rest[open + 1..rest.len() - 1].trim();
    if args.is_empty() {
        Some(format!("this.{}(undefined)", name))
    } else {
        Some(format!("this.{}(undefined, {})", name, args))
    }
}

fn emit_expression_text(text: &str, ctx: &mut GenerationContext) {
    if text.contains('\n') {
        ctx.writer.write_text(text);
    } else {
        ctx.writer.write_line(&format!("{};", text));
    }
}

fn emit_block_statements(block: &Block, ctx: &mut GenerationContext) -> CompileResult<()> {
    for stmt in &block.statements {
        emit_statement(stmt, ctx)?;
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT PROTOCOL
// ═══════════════════════════════════════════════════════════════════════════════

fn emit_component(c: &ComponentStatement, ctx: &mut GenerationContext) -> CompileResult<()> {
    if ctx.config.pure_javascript {
        return emit_component_pure(c, ctx);
    }
    if ctx.config.partial_update_mode {
        emit_component_partial(c, ctx)?;
    } else {
        emit_component_full(c, ctx)?;
    }
    if let Some(children) = &c.children {
        emit_children_indented(children, ctx)?;
    }
    ctx.writer
        .write_line(&format!("{}.{}();", c.component_name, runtime::POP));
    Ok(())
}

fn attribute_chain(c: &ComponentStatement) -> String {
    c.attributes
        .iter()
        .map(|a| format!(".{}", a))
        .collect::<String>()
}

fn emit_component_pure(c: &ComponentStatement, ctx: &mut GenerationContext) -> CompileResult<()> {
    match &c.children {
        Some(children) => {
            let lead = if c.create_args.is_empty() {
                format!("{}(() => {{", c.component_name)
            } else {
                format!("{}({}, () => {{", c.component_name, c.create_args)
            };
            ctx.writer.write_line(&lead);
            emit_children_indented(children, ctx)?;
            ctx.writer.write_line(&format!("}}){};", attribute_chain(c)));
        }
        None => {
            ctx.writer.write_line(&format!(
                "{}({}){};",
                c.component_name,
                c.create_args,
                attribute_chain(c)
            ));
        }
    }
    Ok(())
}

fn emit_component_full(c: &ComponentStatement, ctx: &mut GenerationContext) -> CompileResult<()> {
    ctx.writer.write_line(&format!(
        "{}.{}({});",
        c.component_name,
        runtime::CREATE,
        c.create_args
    ));
    for attr in &c.attributes {
        ctx.writer
            .write_line(&format!("{}.{};", c.component_name, attr));
    }
    Ok(())
}

fn emit_component_partial(
    c: &ComponentStatement,
    ctx: &mut GenerationContext,
) -> CompileResult<()> {
    ctx.writer.write_line(&format!(
        "this.{}((elmtId, isInitialRender) => {{",
        runtime::OBSERVE_COMPONENT_CREATION
    ));
    let create = format!(
        "{}.{}({});",
        c.component_name,
        runtime::CREATE,
        c.create_args
    );
    let attrs: Vec<String> = c
        .attributes
        .iter()
        .map(|attr| format!("{}.{};", c.component_name, attr))
        .collect();
    ctx.writer.indented(|w| {
        w.write_line(&format!(
            "{}.{}(elmtId);",
            runtime::VIEW_STACK_PROCESSOR,
            runtime::START_ACCESS_RECORDING
        ));
        w.write_line(&create);
        for attr in &attrs {
            w.write_line(attr);
        }
        w.write_line(&format!(
            "{}.{}();",
            runtime::VIEW_STACK_PROCESSOR,
            runtime::STOP_ACCESS_RECORDING
        ));
        Ok(())
    })?;
    ctx.writer.write_line("});");
    Ok(())
}

fn emit_children_indented(children: &Block, ctx: &mut GenerationContext) -> CompileResult<()> {
    // Manual increase/decrease: the scoped writer helper cannot borrow the
    // writer and the rest of the context at once. The level is restored on
    // the error path before propagating.
    ctx.writer.indent_increase();
    let result = emit_block_statements(children, ctx);
    ctx.writer.indent_decrease();
    result
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTROL FLOW PROTOCOL
// ═══════════════════════════════════════════════════════════════════════════════

fn emit_if(stmt: &IfStatement, ctx: &mut GenerationContext) -> CompileResult<()> {
    if ctx.config.pure_javascript {
        return emit_if_pure(stmt, ctx);
    }
    ctx.writer.write_line("If.create();");
    ctx.writer
        .write_line(&format!("if ({}) {{", stmt.condition));
    ctx.writer.indent_increase();
    ctx.writer.write_line("If.branchId(0);");
    let result = emit_block_statements(&stmt.then_block, ctx);
    ctx.writer.indent_decrease();
    result?;
    ctx.writer.write_line("}");
    if let Some(else_block) = &stmt.else_block {
        ctx.writer.write_line("else {");
        ctx.writer.indent_increase();
        ctx.writer.write_line("If.branchId(1);");
        let result = emit_block_statements(else_block, ctx);
        ctx.writer.indent_decrease();
        result?;
        ctx.writer.write_line("}");
    }
    ctx.writer.write_line("If.pop();");
    Ok(())
}

fn emit_if_pure(stmt: &IfStatement, ctx: &mut GenerationContext) -> CompileResult<()> {
    ctx.writer
        .write_line(&format!("if ({}) {{", stmt.condition));
    ctx.writer.indent_increase();
    let result = emit_block_statements(&stmt.then_block, ctx);
    ctx.writer.indent_decrease();
    result?;
    match &stmt.else_block {
        Some(else_block) => {
            ctx.writer.write_line("} else {");
            ctx.writer.indent_increase();
            let result = emit_block_statements(else_block, ctx);
            ctx.writer.indent_decrease();
            result?;
            ctx.writer.write_line("}");
        }
        None => ctx.writer.write_line("}"),
    }
    Ok(())
}

fn emit_foreach(stmt: &ForEachStatement, ctx: &mut GenerationContext) -> CompileResult<()> {
    if ctx.config.pure_javascript {
        ctx.writer.write_line(&format!(
            "{}.forEach({});",
            stmt.array_expression, stmt.item_generator
        ));
        return Ok(());
    }
    let name = &stmt.kind;
    ctx.writer.write_line(&format!("{}.{}();", name, runtime::CREATE));
    ctx.writer.write_line(&format!(
        "const __itemGenFunction__ = {};",
        stmt.item_generator
    ));
    if let Some(key_gen) = &stmt.key_generator {
        ctx.writer
            .write_line(&format!("const __keyGenFunction__ = {};", key_gen));
        ctx.writer
            .write_line(&format!("{}.keyGenerator(__keyGenFunction__);", name));
    }
    ctx.writer
        .write_line(&format!("{}.itemGenerator(__itemGenFunction__);", name));
    ctx.writer.write_line(&format!("{}.{}();", name, runtime::POP));
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASS EMISSION
// ═══════════════════════════════════════════════════════════════════════════════

fn emit_class(class: &ClassDeclaration, ctx: &mut GenerationContext) -> CompileResult<()> {
    ctx.record(class.pos);
    let mut header = String::new();
    if class.is_export {
        header.push_str("export ");
    }
    header.push_str("class ");
    header.push_str(&class.name);
    if let Some(super_class) = &class.super_class {
        header.push_str(" extends ");
        header.push_str(super_class);
    }
    header.push_str(" {");
    ctx.writer.write_line(&header);

    ctx.writer.indent_increase();
    let result = emit_members(class, ctx);
    ctx.writer.indent_decrease();
    result?;
    ctx.writer.write_line("}");
    Ok(())
}

fn emit_members(class: &ClassDeclaration, ctx: &mut GenerationContext) -> CompileResult<()> {
    for (i, member) in class.members.iter().enumerate() {
        if i > 0 {
            ctx.writer.blank_line();
        }
        match member {
            ClassMember::Property(p) => emit_property(p, ctx),
            ClassMember::Method(m) => emit_method(m, ctx)?,
        }
    }
    Ok(())
}

fn emit_property(prop: &PropertyDeclaration, ctx: &mut GenerationContext) {
    ctx.record(prop.pos);
    let mut line = String::new();
    if prop.visibility == Visibility::Private {
        line.push_str("private ");
    }
    if prop.is_static {
        line.push_str("static ");
    }
    line.push_str(&prop.name);
    if let Some(ty) = &prop.type_annotation {
        line.push_str(": ");
        line.push_str(ty);
    }
    if let Some(init) = &prop.initializer {
        line.push_str(" = ");
        line.push_str(init);
    }
    line.push(';');
    ctx.writer.write_line(&line);
}

fn emit_method(method: &MethodDeclaration, ctx: &mut GenerationContext) -> CompileResult<()> {
    ctx.record(method.pos);
    let mut header = String::new();
    if method.is_static {
        header.push_str("static ");
    }
    if method.is_async {
        header.push_str("async ");
    }
    header.push_str(&method.name);
    header.push('(');
    let params: Vec<String> = method
        .parameters
        .iter()
        .map(|p| match &p.default_value {
            Some(d) => format!("{} = {}", p.name, d),
            None => p.name.clone(),
        })
        .collect();
    header.push_str(&params.join(", "));
    header.push_str(") {");
    ctx.writer.write_line(&header);

    ctx.writer.indent_increase();
    let result = match method.body.as_deref() {
        Some(body) => emit_statement(body, ctx),
        None => Ok(()),
    };
    ctx.writer.indent_decrease();
    result?;
    ctx.writer.write_line("}");
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// STRATEGIES AND REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

pub trait CodeGenStrategy: Send + Sync {
    fn can_handle(&self, node: &AstNode) -> bool;
    fn priority(&self) -> i32 {
        0
    }
    fn generate(&self, node: &AstNode, ctx: &mut GenerationContext) -> CompileResult<()>;
}

struct ImportStrategy;

impl CodeGenStrategy for ImportStrategy {
    fn can_handle(&self, node: &AstNode) -> bool {
        matches!(node, AstNode::Import { .. })
    }

    fn priority(&self) -> i32 {
        100
    }

    fn generate(&self, node: &AstNode, ctx: &mut GenerationContext) -> CompileResult<()> {
        let AstNode::Import { text, module, pos } = node else {
            return Ok(());
        };
        if let Some(module) = module {
            // One import per module; repeats are dropped.
            if !ctx.imported_modules.insert(module.clone()) {
                return Ok(());
            }
        }
        ctx.record(*pos);
        ctx.writer.write_line(&format!("{};", text));
        Ok(())
    }
}

struct ClassStrategy;

impl CodeGenStrategy for ClassStrategy {
    fn can_handle(&self, node: &AstNode) -> bool {
        matches!(node, AstNode::Class(_))
    }

    fn priority(&self) -> i32 {
        90
    }

    fn generate(&self, node: &AstNode, ctx: &mut GenerationContext) -> CompileResult<()> {
        match node {
            AstNode::Class(class) => emit_class(class, ctx),
            _ => Ok(()),
        }
    }
}

struct StatementStrategy;

impl CodeGenStrategy for StatementStrategy {
    fn can_handle(&self, node: &AstNode) -> bool {
        !matches!(
            node,
            AstNode::Import { .. } | AstNode::Class(_) | AstNode::Placeholder { .. }
        )
    }

    fn priority(&self) -> i32 {
        50
    }

    fn generate(&self, node: &AstNode, ctx: &mut GenerationContext) -> CompileResult<()> {
        emit_statement(node, ctx)
    }
}

/// Erased constructs emit nothing, deliberately.
struct PlaceholderStrategy;

impl CodeGenStrategy for PlaceholderStrategy {
    fn can_handle(&self, node: &AstNode) -> bool {
        matches!(node, AstNode::Placeholder { .. } | AstNode::Empty)
    }

    fn priority(&self) -> i32 {
        10
    }

    fn generate(&self, _node: &AstNode, _ctx: &mut GenerationContext) -> CompileResult<()> {
        Ok(())
    }
}

pub struct CodeGenerator {
    strategies: Vec<Box<dyn CodeGenStrategy>>,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        let mut strategies: Vec<Box<dyn CodeGenStrategy>> = vec![
            Box::new(ImportStrategy),
            Box::new(ClassStrategy),
            Box::new(StatementStrategy),
            Box::new(PlaceholderStrategy),
        ];
        strategies.sort_by_key(|s| std::cmp::Reverse(s.priority()));
        Self { strategies }
    }
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn dispatch(&self, node: &AstNode, ctx: &mut GenerationContext) -> CompileResult<()> {
        for strategy in &self.strategies {
            if strategy.can_handle(node) {
                return strategy.generate(node, ctx);
            }
        }
        warn!(kind = node.kind_name(), "no generation strategy; emitting nothing");
        Ok(())
    }

    /// Generate the whole file: imports first, a separating blank line,
    /// then the remaining statements in declared order.
    pub fn generate(
        &self,
        file: &SourceFile,
        mut ctx: GenerationContext,
    ) -> CompileResult<GeneratedOutput> {
        let (imports, rest): (Vec<&AstNode>, Vec<&AstNode>) = file
            .statements
            .iter()
            .partition(|s| matches!(s, AstNode::Import { .. }));

        for import in &imports {
            self.dispatch(import, &mut ctx)?;
        }
        if !imports.is_empty() && !rest.is_empty() {
            ctx.writer.blank_line();
        }
        for (i, stmt) in rest.iter().enumerate() {
            if i > 0 && !matches!(stmt, AstNode::Placeholder { .. } | AstNode::Empty) {
                ctx.writer.blank_line();
            }
            self.dispatch(stmt, &mut ctx)?;
        }

        Ok(GeneratedOutput {
            code: ctx.writer.finish(),
            source_map: ctx.map.map(SourceMapBuilder::build),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Decorator;

    fn leaf(name: &str, args: &str, attrs: &[&str]) -> AstNode {
        AstNode::Component(ComponentStatement {
            component_name: name.to_string(),
            create_args: args.to_string(),
            attributes: attrs.iter().map(|a| a.to_string()).collect(),
            children: None,
        })
    }

    fn generate_one(node: AstNode, config: &CompilerConfig) -> String {
        let mut file = SourceFile::new("test.ets");
        file.statements.push(node);
        let ctx = GenerationContext::new(config, &file.file_name);
        CodeGenerator::new().generate(&file, ctx).unwrap().code
    }

    #[test]
    fn test_builder_method_calls_fill_the_builder_slot() {
        let config = CompilerConfig::default();
        let mut file = SourceFile::new("test.ets");
        file.statements.push(AstNode::Expression {
            text: "this.header()".to_string(),
            pos: None,
        });
        file.statements.push(AstNode::Expression {
            text: "this.header(this.title)".to_string(),
            pos: None,
        });
        file.statements.push(AstNode::Expression {
            text: "this.refresh()".to_string(),
            pos: None,
        });
        let mut ctx = GenerationContext::new(&config, &file.file_name);
        ctx.builder_methods.insert("header".to_string());
        let code = CodeGenerator::new().generate(&file, ctx).unwrap().code;

        assert!(code.contains("this.header(undefined);"));
        assert!(code.contains("this.header(undefined, this.title);"));
        // Non-builder calls pass through untouched.
        assert!(code.contains("this.refresh();"));
    }

    #[test]
    fn test_full_render_component_protocol() {
        let config = CompilerConfig::default()
            .with_partial_update(false)
            .with_source_map(false);
        let node = AstNode::Component(ComponentStatement {
            component_name: "Column".to_string(),
            create_args: String::new(),
            attributes: vec!["width('100%')".to_string()],
            children: Some(Block::new(vec![leaf("Text", "'hi'", &["fontSize(16)"])])),
        });
        let code = generate_one(node, &config);
        assert_eq!(
            code,
            "Column.create();\n\
             Column.width('100%');\n\
             \x20\x20Text.create('hi');\n\
             \x20\x20Text.fontSize(16);\n\
             \x20\x20Text.pop();\n\
             Column.pop();\n"
        );
    }

    #[test]
    fn test_partial_update_wraps_creation() {
        let config = CompilerConfig::default().with_source_map(false);
        let code = generate_one(leaf("Text", "this.count", &[]), &config);
        assert!(code.contains("this.observeComponentCreation((elmtId, isInitialRender) => {"));
        assert!(code.contains("ViewStackProcessor.startGetAccessRecordingFor(elmtId);"));
        assert!(code.contains("Text.create(this.count);"));
        assert!(code.contains("ViewStackProcessor.stopGetAccessRecording();"));
        assert!(code.contains("Text.pop();"));
    }

    #[test]
    fn test_pure_component_is_nested_calls() {
        let config = CompilerConfig::default()
            .with_pure_javascript(true)
            .with_source_map(false);
        let node = AstNode::Component(ComponentStatement {
            component_name: "Column".to_string(),
            create_args: String::new(),
            attributes: vec![],
            children: Some(Block::new(vec![leaf("Text", "'hi'", &["fontSize(16)"])])),
        });
        let code = generate_one(node, &config);
        assert_eq!(code, "Column(() => {\n  Text('hi').fontSize(16);\n});\n");
        assert!(!code.contains(".create("));
        assert!(!code.contains(".pop()"));
    }

    #[test]
    fn test_if_protocol_runtime_vs_pure() {
        let stmt = AstNode::If(IfStatement {
            condition: "this.on".to_string(),
            then_block: Block::new(vec![leaf("Text", "'y'", &[])]),
            else_block: Some(Block::new(vec![leaf("Text", "'n'", &[])])),
        });

        let runtime_cfg = CompilerConfig::default()
            .with_partial_update(false)
            .with_source_map(false);
        let code = generate_one(stmt.clone(), &runtime_cfg);
        assert!(code.contains("If.create();"));
        assert!(code.contains("If.branchId(0);"));
        assert!(code.contains("If.branchId(1);"));
        assert!(code.contains("If.pop();"));

        let pure_cfg = CompilerConfig::default()
            .with_pure_javascript(true)
            .with_source_map(false);
        let code = generate_one(stmt, &pure_cfg);
        assert!(code.starts_with("if (this.on) {"));
        assert!(code.contains("} else {"));
        assert!(!code.contains("If.create"));
    }

    #[test]
    fn test_foreach_protocol_runtime_vs_pure() {
        let stmt = AstNode::ForEach(ForEachStatement {
            kind: "ForEach".to_string(),
            array_expression: "this.items".to_string(),
            item_generator: "(item) => { Text(item) }".to_string(),
            key_generator: Some("(item) => item.id".to_string()),
        });

        let runtime_cfg = CompilerConfig::default().with_source_map(false);
        let code = generate_one(stmt.clone(), &runtime_cfg);
        assert!(code.contains("ForEach.create();"));
        assert!(code.contains("const __itemGenFunction__ = (item) => { Text(item) };"));
        assert!(code.contains("const __keyGenFunction__ = (item) => item.id;"));
        assert!(code.contains("ForEach.keyGenerator(__keyGenFunction__);"));
        assert!(code.contains("ForEach.itemGenerator(__itemGenFunction__);"));
        assert!(code.contains("ForEach.pop();"));

        let pure_cfg = CompilerConfig::default()
            .with_pure_javascript(true)
            .with_source_map(false);
        let code = generate_one(stmt, &pure_cfg);
        assert_eq!(code, "this.items.forEach((item) => { Text(item) });\n");
    }

    #[test]
    fn test_class_header_and_members() {
        let mut class = ClassDeclaration::new("App");
        class.is_export = true;
        class.super_class = Some("View".to_string());
        class.decorators.push(Decorator::new("Component"));
        let mut backing = PropertyDeclaration::new("count__");
        backing.visibility = Visibility::Private;
        backing.type_annotation = Some("ObservedPropertySimple<number>".to_string());
        backing.initializer = Some("0".to_string());
        class.members.push(ClassMember::Property(backing));
        let mut getter = MethodDeclaration::new("get count");
        getter.body = Some(Box::new(AstNode::Block(Block::new(vec![AstNode::Return {
            expression: Some("this.count__.get()".to_string()),
        }]))));
        class.members.push(ClassMember::Method(getter));

        let config = CompilerConfig::default().with_source_map(false);
        let code = generate_one(AstNode::Class(class), &config);
        assert_eq!(
            code,
            "export class App extends View {\n\
             \x20\x20private count__: ObservedPropertySimple<number> = 0;\n\
             \n\
             \x20\x20get count() {\n\
             \x20\x20\x20\x20return this.count__.get();\n\
             \x20\x20}\n\
             }\n"
        );
    }

    #[test]
    fn test_source_map_toggle_never_changes_code() {
        let mut class = ClassDeclaration::new("App");
        class.pos = Some(SourcePos::new(3, 0));
        class.members.push(ClassMember::Method(MethodDeclaration::new("build")));
        let node = AstNode::Class(class);

        let with_map = CompilerConfig::default().with_source_map(true);
        let without_map = CompilerConfig::default().with_source_map(false);
        let mut file = SourceFile::new("test.ets");
        file.statements.push(node);

        let generator = CodeGenerator::new();
        let on = generator
            .generate(&file, GenerationContext::new(&with_map, &file.file_name))
            .unwrap();
        let off = generator
            .generate(&file, GenerationContext::new(&without_map, &file.file_name))
            .unwrap();
        assert_eq!(on.code, off.code);
        assert!(on.source_map.is_some());
        assert!(off.source_map.is_none());
        let map = on.source_map.unwrap();
        assert_eq!(map.sources, vec!["test.ets".to_string()]);
        assert_eq!(map.file, "test.js");
        assert!(!map.mappings.is_empty());
    }

    #[test]
    fn test_duplicate_imports_collapse() {
        let mut file = SourceFile::new("test.ets");
        for _ in 0..2 {
            file.statements.push(AstNode::Import {
                text: "import { router } from '@ohos.router'".to_string(),
                module: Some("@ohos.router".to_string()),
                pos: None,
            });
        }
        file.statements.push(AstNode::Expression {
            text: "router.back()".to_string(),
            pos: None,
        });
        let config = CompilerConfig::default().with_source_map(false);
        let ctx = GenerationContext::new(&config, &file.file_name);
        let code = CodeGenerator::new().generate(&file, ctx).unwrap().code;
        assert_eq!(
            code,
            "import { router } from '@ohos.router';\n\nrouter.back();\n"
        );
    }

    #[test]
    fn test_placeholders_emit_nothing() {
        let config = CompilerConfig::default().with_source_map(false);
        let code = generate_one(
            AstNode::Placeholder {
                kind: "InterfaceDeclaration".to_string(),
            },
            &config,
        );
        assert_eq!(code, "");
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("pages/App.ets"), "pages/App.js");
        assert_eq!(output_file_name("util.ts"), "util.js");
        assert_eq!(output_file_name("noext"), "noext.js");
    }
}
