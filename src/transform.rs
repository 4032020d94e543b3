//! Transformation pipeline.
//!
//! An ordered list of stages applied to every top-level node: the decorator
//! property transformer (this module), then the build-method and component
//! transformers (`component` module). Each stage is gated by
//! `can_transform`; nodes it does not claim pass through unchanged. Every
//! file gets its own pipeline context, so parallel compilation shares no
//! mutable transformation state.

use std::collections::{HashMap, HashSet};

use crate::ast::{
    AstNode, Block, ClassMember, MethodDeclaration, Parameter, PropertyDeclaration, SourceFile,
    Visibility,
};
use crate::builtins::{decorators, runtime};
use crate::component::{BuildMethodTransformer, ComponentTransformer};
use crate::config::CompilerConfig;
use crate::error::CompileResult;

// ═══════════════════════════════════════════════════════════════════════════════
// CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-compilation-unit mutable state shared by the stages.
#[derive(Debug, Default)]
pub struct TransformationContext {
    pub current_class: Option<String>,
    pub current_method: Option<String>,
    pub component_depth: u32,
    /// Names of `@Builder` methods seen, for the generator.
    pub builder_methods: HashSet<String>,
    counters: HashMap<String, u32>,
}

impl TransformationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthesize a unique identifier with the given prefix. Counters are
    /// per prefix and monotonic within one compilation unit.
    pub fn next_id(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("__{}_{}__", prefix, counter)
    }
}

pub trait Transformer: Send + Sync {
    fn can_transform(&self, node: &AstNode) -> bool;
    fn transform(&self, node: AstNode, ctx: &mut TransformationContext)
        -> CompileResult<AstNode>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECORATOR PROPERTY TRANSFORMER
// ═══════════════════════════════════════════════════════════════════════════════

/// The per-tag contract: wrapper type, initializer policy, and whether the
/// property must be registered in the synthesized constructor.
struct DecoratorRule {
    tag: &'static str,
    wrapper: &'static str,
    carry_initializer: bool,
    needs_registration: bool,
    registration: &'static str,
}

const DECORATOR_RULES: &[DecoratorRule] = &[
    DecoratorRule {
        tag: decorators::STATE,
        wrapper: runtime::OBSERVED_SIMPLE,
        carry_initializer: true,
        needs_registration: true,
        registration: runtime::CREATE_STATE,
    },
    DecoratorRule {
        tag: decorators::PROP,
        wrapper: runtime::OBSERVED_ONE_WAY,
        carry_initializer: false,
        needs_registration: false,
        registration: runtime::CREATE_PROP,
    },
    DecoratorRule {
        tag: decorators::LINK,
        wrapper: runtime::OBSERVED_TWO_WAY,
        carry_initializer: false,
        needs_registration: false,
        registration: runtime::CREATE_LINK,
    },
    DecoratorRule {
        tag: decorators::PROVIDE,
        wrapper: runtime::OBSERVED_SIMPLE,
        carry_initializer: true,
        needs_registration: false,
        registration: runtime::INITIALIZE_PROVIDE,
    },
    DecoratorRule {
        tag: decorators::CONSUME,
        wrapper: runtime::OBSERVED_SIMPLE,
        carry_initializer: false,
        needs_registration: false,
        registration: runtime::INITIALIZE_CONSUME,
    },
];

fn rule_for(prop: &PropertyDeclaration) -> Option<&'static DecoratorRule> {
    DECORATOR_RULES.iter().find(|s| prop.has_decorator(s.tag))
}

/// Rewrites each state-decorated property into the private backing property
/// plus accessor pair, and synthesizes the registering constructor when any
/// property is local self-owned state.
pub struct DecoratorPropertyTransformer;

impl DecoratorPropertyTransformer {
    fn backing_name(name: &str) -> String {
        format!("{}{}", name, runtime::PRIVATE_SUFFIX)
    }

    fn expand_property(prop: PropertyDeclaration, rule: &DecoratorRule) -> [ClassMember; 3] {
        let backing_name = Self::backing_name(&prop.name);
        let value_type = prop.type_annotation.clone().unwrap_or_else(|| "any".to_string());

        let mut backing = PropertyDeclaration::new(backing_name.clone());
        backing.type_annotation = Some(format!("{}<{}>", rule.wrapper, value_type));
        backing.visibility = Visibility::Private;
        backing.pos = prop.pos;
        if rule.carry_initializer {
            backing.initializer = prop.initializer.clone();
        }

        let mut getter = MethodDeclaration::new(format!("get {}", prop.name));
        getter.return_type = prop.type_annotation.clone();
        getter.body = Some(Box::new(AstNode::Block(Block::new(vec![AstNode::Return {
            expression: Some(format!("this.{}.get()", backing_name)),
        }]))));

        let mut setter = MethodDeclaration::new(format!("set {}", prop.name));
        let mut value_param = Parameter::new("newValue");
        value_param.type_annotation = prop.type_annotation.clone();
        setter.parameters.push(value_param);
        setter.body = Some(Box::new(AstNode::Block(Block::new(vec![AstNode::Expression {
            text: format!("this.{}.set(newValue)", backing_name),
            pos: None,
        }]))));

        [
            ClassMember::Property(backing),
            ClassMember::Method(getter),
            ClassMember::Method(setter),
        ]
    }

    fn registration_constructor(registrations: &[(String, &'static str)]) -> MethodDeclaration {
        let mut statements = vec![AstNode::Expression {
            text: "super()".to_string(),
            pos: None,
        }];
        for (name, method) in registrations {
            statements.push(AstNode::Expression {
                text: format!(
                    "this.{}{} = this.{}('{}', () => this.{})",
                    name,
                    runtime::PRIVATE_SUFFIX,
                    method,
                    name,
                    name
                ),
                pos: None,
            });
        }
        let mut ctor = MethodDeclaration::new("constructor");
        ctor.body = Some(Box::new(AstNode::Block(Block::new(statements))));
        ctor
    }
}

impl Transformer for DecoratorPropertyTransformer {
    fn can_transform(&self, node: &AstNode) -> bool {
        match node {
            AstNode::Class(class) => class.is_component(),
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
        ctx.current_class = Some(class.name.clone());

        // Replace-in-position: the original property is removed where it
        // stood and the three replacement members are appended.
        let mut kept = Vec::with_capacity(class.members.len());
        let mut appended = Vec::new();
        let mut registrations: Vec<(String, &'static str)> = Vec::new();

        for member in class.members.drain(..) {
            match member {
                ClassMember::Property(prop) => match rule_for(&prop) {
                    Some(rule) => {
                        if rule.needs_registration {
                            registrations.push((prop.name.clone(), rule.registration));
                        }
                        appended.extend(Self::expand_property(prop, rule));
                    }
                    None => kept.push(ClassMember::Property(prop)),
                },
                other => kept.push(other),
            }
        }

        class.members = kept;
        class.members.extend(appended);
        if !registrations.is_empty() {
            class
                .members
                .insert(0, ClassMember::Method(Self::registration_constructor(&registrations)));
        }
        ctx.current_class = None;
        Ok(AstNode::Class(class))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PIPELINE
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TransformPipeline {
    stages: Vec<Box<dyn Transformer>>,
}

impl TransformPipeline {
    /// Stage order is fixed: property rewrites first, build-method body
    /// restructuring second, the component class rewrite last. Pure
    /// JavaScript output skips the decorator stage entirely since no
    /// wrapper scaffolding may appear.
    pub fn new(config: &CompilerConfig) -> Self {
        let mut stages: Vec<Box<dyn Transformer>> = Vec::new();
        if !config.pure_javascript {
            stages.push(Box::new(DecoratorPropertyTransformer));
        }
        stages.push(Box::new(BuildMethodTransformer::new(config)));
        stages.push(Box::new(ComponentTransformer::new(config)));
        Self { stages }
    }

    /// Fold every top-level node through the stage list. Returns the
    /// context so the generator can see builder-method names.
    pub fn run(&self, file: &mut SourceFile) -> CompileResult<TransformationContext> {
        let mut ctx = TransformationContext::new();
        for slot in file.statements.iter_mut() {
            let mut node = std::mem::replace(slot, AstNode::Empty);
            for stage in &self.stages {
                if stage.can_transform(&node) {
                    node = stage.transform(node, &mut ctx)?;
                }
            }
            *slot = node;
        }
        Ok(ctx)
    }
}
