//! Kotlin source renderer for generated units
//!
//! Produces one `.kt` file per unit. Names are imported when that is
//! unambiguous and written fully qualified otherwise, so output stays
//! stable no matter which other types a unit happens to mention.

use crate::ir::{Combinator, GeneratedUnit, ParameterDecl, TypeParameter, TypeRef, WrapperDecl};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Packages Kotlin imports implicitly
const DEFAULT_PACKAGES: &[&str] = &[
    "kotlin",
    "kotlin.annotation",
    "kotlin.collections",
    "kotlin.comparisons",
    "kotlin.io",
    "kotlin.ranges",
    "kotlin.sequences",
    "kotlin.text",
];

/// Hard keywords that must be escaped when used as identifiers
const KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

const INDENT: &str = "  ";

/// Generator for Kotlin extension files
pub struct KotlinRenderer<'a> {
    unit: &'a GeneratedUnit,
    imports: ImportTable,
}

impl<'a> KotlinRenderer<'a> {
    /// Create a renderer for a unit
    pub fn new(unit: &'a GeneratedUnit) -> Self {
        let referenced = unit.wrappers.iter().flat_map(referenced_names).collect::<Vec<_>>();
        let imports = ImportTable::build(&unit.namespace, referenced);
        Self { unit, imports }
    }

    /// Generate the complete file
    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str("// Code generated by forge-catch. DO NOT EDIT.\n");
        for source in &self.unit.sources {
            output.push_str(&format!("// Source: {}\n", source));
        }
        output.push('\n');

        if !self.unit.namespace.is_empty() {
            output.push_str(&format!("package {}\n\n", self.unit.namespace));
        }

        if !self.imports.imports.is_empty() {
            for import in &self.imports.imports {
                output.push_str(&format!("import {}\n", import));
            }
            output.push('\n');
        }

        let functions: Vec<String> = self
            .unit
            .wrappers
            .iter()
            .map(|w| self.render_wrapper(w))
            .collect();
        output.push_str(&functions.join("\n"));

        output
    }

    /// Render one wrapper function
    fn render_wrapper(&self, w: &WrapperDecl) -> String {
        let mut output = String::new();

        let inline_bounds = w.type_params.iter().all(|tp| tp.bounds.len() <= 1);
        let type_params = if w.type_params.is_empty() {
            String::new()
        } else {
            let list: Vec<String> = w
                .type_params
                .iter()
                .map(|tp| self.type_param(tp, inline_bounds))
                .collect();
            format!("<{}> ", list.join(", "))
        };

        let receiver = w
            .receiver
            .as_ref()
            .map(|r| format!("{}.", self.receiver_type(r)))
            .unwrap_or_default();

        let params: Vec<String> = w.params.iter().map(|p| self.param(p)).collect();

        let where_clause = if inline_bounds {
            String::new()
        } else {
            let constraints: Vec<String> = w
                .type_params
                .iter()
                .flat_map(|tp| {
                    tp.bounds
                        .iter()
                        .map(move |b| format!("{} : {}", escape(&tp.name), self.ty(b)))
                })
                .collect();
            format!(" where {}", constraints.join(", "))
        };

        output.push_str(&format!(
            "public fun {}{}{}({}): {}{} {{\n",
            type_params,
            receiver,
            escape(&w.name),
            params.join(", "),
            self.ty(&w.return_type),
            where_clause
        ));

        match &w.body.combinator {
            Combinator::Lambda => output.push_str(&format!("{}return {{\n", INDENT)),
            Combinator::Builder(builder) => output.push_str(&format!(
                "{}return {} {{\n",
                INDENT,
                self.imports.name(builder)
            )),
        }

        let call = &w.body.invocation;
        // Members go through the labeled receiver so Raise members cannot capture the call
        let callee = if call.member {
            format!("this@{}.{}", escape(&w.name), escape(call.callee.simple_name()))
        } else {
            self.imports.name(call.callee.as_str()).to_string()
        };
        let args: Vec<String> = call
            .args
            .iter()
            .map(|a| {
                let spread = if a.spread { "*" } else { "" };
                format!("{}{}", spread, escape(&a.name))
            })
            .collect();

        let pad = INDENT.repeat(2);
        let inner = INDENT.repeat(3);
        output.push_str(&format!("{}{}(\n", pad, self.imports.name(&w.body.catch_fn)));
        output.push_str(&format!(
            "{}block = {{ {}({}) }},\n",
            inner,
            callee,
            args.join(", ")
        ));
        output.push_str(&format!(
            "{}catch = {{ e: {} -> raise(e) }},\n",
            inner,
            self.ty(&w.body.cause)
        ));
        output.push_str(&format!("{})\n", pad));
        output.push_str(&format!("{}}}\n", INDENT));
        output.push_str("}\n");

        output
    }

    fn type_param(&self, tp: &TypeParameter, inline_bounds: bool) -> String {
        match tp.bounds.first() {
            Some(bound) if inline_bounds => format!("{} : {}", escape(&tp.name), self.ty(bound)),
            _ => escape(&tp.name),
        }
    }

    fn param(&self, p: &ParameterDecl) -> String {
        let vararg = if p.vararg { "vararg " } else { "" };
        format!("{}{}: {}", vararg, escape(&p.name), self.ty(&p.ty))
    }

    fn receiver_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Function { .. } | TypeRef::Nullable(_) => format!("({})", self.ty(ty)),
            _ => self.ty(ty),
        }
    }

    /// Render a type reference using this file's imports
    pub fn ty(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Named { name, args } => {
                let base = self.imports.name(name);
                if args.is_empty() {
                    base.to_string()
                } else {
                    let args: Vec<String> = args.iter().map(|a| self.ty(a)).collect();
                    format!("{}<{}>", base, args.join(", "))
                }
            }
            TypeRef::Variable(name) => escape(name),
            TypeRef::Star => "*".to_string(),
            TypeRef::Nullable(inner) if inner.is_function() => format!("({})?", self.ty(inner)),
            TypeRef::Nullable(inner) => format!("{}?", self.ty(inner)),
            TypeRef::Function {
                receiver,
                params,
                ret,
            } => {
                let receiver = receiver
                    .as_deref()
                    .map(|r| format!("{}.", self.receiver_type(r)))
                    .unwrap_or_default();
                let params: Vec<String> = params.iter().map(|p| self.ty(p)).collect();
                format!("{}({}) -> {}", receiver, params.join(", "), self.ty(ret))
            }
        }
    }
}

/// Every qualified name a wrapper needs in scope
fn referenced_names(w: &WrapperDecl) -> Vec<String> {
    let mut types: Vec<&TypeRef> = Vec::new();
    types.extend(w.receiver.iter());
    types.extend(w.type_params.iter().flat_map(|tp| tp.bounds.iter()));
    types.extend(w.params.iter().map(|p| &p.ty));
    types.push(&w.return_type);
    types.push(&w.body.cause);

    let mut names: Vec<String> = types
        .into_iter()
        .flat_map(|t| t.class_names())
        .map(str::to_string)
        .collect();

    names.push(w.body.catch_fn.clone());
    if let Combinator::Builder(builder) = &w.body.combinator {
        names.push(builder.clone());
    }
    if !w.body.invocation.member {
        names.push(w.body.invocation.callee.as_str().to_string());
    }
    names
}

/// Import statements and the name each qualified reference renders as
#[derive(Debug, Default)]
struct ImportTable {
    imports: BTreeSet<String>,
    names: BTreeMap<String, String>,
}

impl ImportTable {
    fn build(namespace: &str, referenced: Vec<String>) -> Self {
        let referenced: BTreeSet<String> = referenced.into_iter().collect();
        let mut table = ImportTable::default();
        let mut taken: HashSet<String> = HashSet::new();

        // Implicitly visible names claim their simple name first
        let (implicit, explicit): (Vec<&String>, Vec<&String>) =
            referenced.iter().partition(|q| {
                let package = package_of(q);
                package.is_empty() || package == namespace || DEFAULT_PACKAGES.contains(&package)
            });

        for qualified in implicit {
            let simple = simple_of(qualified);
            if taken.insert(simple.to_string()) {
                table.names.insert(qualified.clone(), escape(simple));
            } else {
                table.names.insert(qualified.clone(), escape_path(qualified));
            }
        }

        for qualified in explicit {
            let simple = simple_of(qualified);
            if taken.insert(simple.to_string()) {
                table.imports.insert(escape_path(qualified));
                table.names.insert(qualified.clone(), escape(simple));
            } else {
                table.names.insert(qualified.clone(), escape_path(qualified));
            }
        }

        table
    }

    fn name<'s>(&'s self, qualified: &'s str) -> &'s str {
        self.names.get(qualified).map_or(qualified, String::as_str)
    }
}

fn package_of(qualified: &str) -> &str {
    qualified.rsplit_once('.').map_or("", |(package, _)| package)
}

fn simple_of(qualified: &str) -> &str {
    qualified.rsplit_once('.').map_or(qualified, |(_, simple)| simple)
}

/// Backtick-escape an identifier that collides with a hard keyword
fn escape(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("`{}`", name)
    } else {
        name.to_string()
    }
}

fn escape_path(qualified: &str) -> String {
    qualified.split('.').map(escape).collect::<Vec<_>>().join(".")
}
