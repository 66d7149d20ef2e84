//! Declaration parser for Python source files.
//!
//! Parses each file with `rustpython-parser` and lowers the syntax tree into
//! raw declarations: classes with their base expressions, class-body
//! assignments (right-hand-side call expressions preserved structurally),
//! functions with decorators, module-level assignments and calls, and import
//! aliases. Nothing is imported or executed; expressions that are not
//! literals are retained as opaque source text rather than evaluated.

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use rustpython_parser::ast::{self, Ranged};
use rustpython_parser::text_size::TextRange;
use rustpython_parser::Parse;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Parser facade for Python source files.
pub struct PyParser;

/// A successfully parsed Python file, lowered to raw declarations.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Module docstring, if any
    pub docstring: Option<String>,
    /// Import aliases: local name -> full dotted origin
    pub imports: BTreeMap<String, String>,
    /// Top-level class declarations, in source order
    pub classes: Vec<ClassDecl>,
    /// Top-level function declarations, in source order
    pub functions: Vec<FunctionDecl>,
    /// Module-level assignments (e.g. `urlpatterns = [...]`, `router = ...`)
    pub assigns: Vec<Assign>,
    /// Module-level expression statements that are calls
    /// (e.g. `router.register(...)`)
    pub calls: Vec<CallExpr>,
}

/// A raw class declaration.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    /// Base-class expressions as text; dynamically computed bases stay opaque
    pub bases: Vec<String>,
    pub docstring: Option<String>,
    /// Class-body assignments in declaration order
    pub assigns: Vec<Assign>,
    /// Methods in declaration order
    pub methods: Vec<FunctionDecl>,
    /// Decorators applied to the class
    pub decorators: Vec<PyExpr>,
    /// Nested classes (a serializer's `Meta`, typically)
    pub classes: Vec<ClassDecl>,
}

/// A raw function or method declaration.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    /// Positional parameter names, `self` included
    pub params: Vec<String>,
    pub decorators: Vec<PyExpr>,
    pub docstring: Option<String>,
}

/// A single-target assignment.
#[derive(Debug, Clone)]
pub struct Assign {
    pub target: String,
    pub value: PyExpr,
}

/// A parsed Python expression, kept as literal-or-opaque.
///
/// Interpretation is deliberately not done here; the type normalizer and the
/// view/url extractors decide what the structure means.
#[derive(Debug, Clone, PartialEq)]
pub enum PyExpr {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<PyExpr>),
    Tuple(Vec<PyExpr>),
    Dict(Vec<(PyExpr, PyExpr)>),
    /// A bare or dotted name, e.g. `ProductSerializer` or `Product.objects.all`
    Name(String),
    Call(Box<CallExpr>),
    /// Anything else, preserved as source text and never evaluated
    Opaque(String),
}

/// A call expression: callee name plus positional and keyword arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Dotted callee name (e.g. `serializers.CharField`, `router.register`)
    pub callee: String,
    pub args: Vec<PyExpr>,
    /// Keyword arguments in declaration order
    pub kwargs: Vec<(String, PyExpr)>,
}

impl CallExpr {
    /// Look up a keyword argument by name.
    pub fn kwarg(&self, name: &str) -> Option<&PyExpr> {
        self.kwargs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Last segment of the callee path (`serializers.CharField` -> `CharField`).
    pub fn callee_token(&self) -> &str {
        self.callee.rsplit('.').next().unwrap_or(&self.callee)
    }
}

impl PyExpr {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PyExpr::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PyExpr::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PyExpr::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert a literal expression to a JSON value. Non-literal expressions
    /// (names, calls, opaque text) yield `None` rather than a guess.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            PyExpr::Str(s) => Some(serde_json::Value::String(s.clone())),
            PyExpr::Int(i) => Some(serde_json::Value::from(*i)),
            PyExpr::Float(f) => serde_json::Number::from_f64(*f).map(serde_json::Value::Number),
            PyExpr::Bool(b) => Some(serde_json::Value::Bool(*b)),
            PyExpr::None => Some(serde_json::Value::Null),
            PyExpr::List(items) | PyExpr::Tuple(items) => {
                let values: Option<Vec<_>> = items.iter().map(|i| i.to_json()).collect();
                values.map(serde_json::Value::Array)
            }
            _ => None,
        }
    }
}

impl PyParser {
    /// Parses a single Python source file into raw declarations.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid
    /// Python syntax. Callers downgrade such failures to per-file
    /// diagnostics and continue with the remaining files.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Self::parse_source(&source, path)
    }

    /// Parses Python source text that notionally lives at `path`.
    pub fn parse_source(source: &str, path: &Path) -> Result<ParsedFile> {
        let suite = ast::Suite::parse(source, &path.to_string_lossy())
            .map_err(|e| anyhow!("Failed to parse Python syntax in {}: {}", path.display(), e))?;

        let mut parsed = ParsedFile {
            path: path.to_path_buf(),
            docstring: docstring_of(&suite),
            imports: BTreeMap::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            assigns: Vec::new(),
            calls: Vec::new(),
        };

        for stmt in &suite {
            match stmt {
                ast::Stmt::ClassDef(class_def) => {
                    parsed.classes.push(lower_class(class_def, source));
                }
                ast::Stmt::FunctionDef(func) => {
                    parsed.functions.push(lower_function(
                        func.name.as_str(),
                        &func.args,
                        &func.decorator_list,
                        &func.body,
                        source,
                    ));
                }
                ast::Stmt::AsyncFunctionDef(func) => {
                    parsed.functions.push(lower_function(
                        func.name.as_str(),
                        &func.args,
                        &func.decorator_list,
                        &func.body,
                        source,
                    ));
                }
                ast::Stmt::Assign(assign) => {
                    if let Some(a) = lower_assign(&assign.targets, &assign.value, source) {
                        parsed.assigns.push(a);
                    }
                }
                // `urlpatterns += [...]` extends an earlier declaration;
                // lowered as another assign to the same target
                ast::Stmt::AugAssign(assign) => {
                    if let Some(a) =
                        lower_assign(std::slice::from_ref(&*assign.target), &assign.value, source)
                    {
                        parsed.assigns.push(a);
                    }
                }
                ast::Stmt::Expr(expr_stmt) => {
                    if let PyExpr::Call(call) = lower_expr(&expr_stmt.value, source) {
                        parsed.calls.push(*call);
                    }
                }
                ast::Stmt::Import(import) => {
                    for alias in &import.names {
                        let local = alias
                            .asname
                            .as_ref()
                            .map(|a| a.to_string())
                            .unwrap_or_else(|| alias.name.to_string());
                        parsed.imports.insert(local, alias.name.to_string());
                    }
                }
                ast::Stmt::ImportFrom(import) => {
                    let module = import
                        .module
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_default();
                    // One leading dot per relative-import level, so
                    // `from .models import X` records `.models.X`.
                    let dots = ".".repeat(
                        import.level.as_ref().map_or(0, |l| l.to_u32()) as usize,
                    );
                    for alias in &import.names {
                        let local = alias
                            .asname
                            .as_ref()
                            .map(|a| a.to_string())
                            .unwrap_or_else(|| alias.name.to_string());
                        let full = if module.is_empty() {
                            format!("{}{}", dots, alias.name)
                        } else {
                            format!("{}{}.{}", dots, module, alias.name)
                        };
                        parsed.imports.insert(local, full);
                    }
                }
                _ => {}
            }
        }

        debug!(
            "Parsed {}: {} classes, {} functions",
            path.display(),
            parsed.classes.len(),
            parsed.functions.len()
        );

        Ok(parsed)
    }

    /// Parses multiple files, continuing past individual failures.
    ///
    /// Returns one `Result` per input path so the caller can record a
    /// diagnostic for each failed file while keeping the successes.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| match Self::parse_file(path) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let failures = results.iter().filter(|r| r.is_err()).count();
        if failures > 0 {
            debug!("{} of {} files failed to parse", failures, results.len());
        }

        results
    }
}

/// Docstring of a statement body: a leading string-constant expression.
fn docstring_of(body: &[ast::Stmt]) -> Option<String> {
    if let Some(ast::Stmt::Expr(expr_stmt)) = body.first() {
        if let ast::Expr::Constant(c) = expr_stmt.value.as_ref() {
            if let ast::Constant::Str(s) = &c.value {
                let trimmed = s.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

fn lower_class(class_def: &ast::StmtClassDef, source: &str) -> ClassDecl {
    let mut decl = ClassDecl {
        name: class_def.name.to_string(),
        bases: class_def
            .bases
            .iter()
            .map(|b| dotted_name(b).unwrap_or_else(|| snippet(source, b.range())))
            .collect(),
        docstring: docstring_of(&class_def.body),
        assigns: Vec::new(),
        methods: Vec::new(),
        decorators: class_def
            .decorator_list
            .iter()
            .map(|d| lower_expr(d, source))
            .collect(),
        classes: Vec::new(),
    };

    for stmt in &class_def.body {
        match stmt {
            ast::Stmt::Assign(assign) => {
                if let Some(a) = lower_assign(&assign.targets, &assign.value, source) {
                    decl.assigns.push(a);
                }
            }
            ast::Stmt::AnnAssign(assign) => {
                // `name: SomeType = value` declarations carry a value too
                if let (ast::Expr::Name(name), Some(value)) =
                    (assign.target.as_ref(), assign.value.as_ref())
                {
                    decl.assigns.push(Assign {
                        target: name.id.to_string(),
                        value: lower_expr(value, source),
                    });
                }
            }
            ast::Stmt::FunctionDef(func) => {
                decl.methods.push(lower_function(
                    func.name.as_str(),
                    &func.args,
                    &func.decorator_list,
                    &func.body,
                    source,
                ));
            }
            ast::Stmt::AsyncFunctionDef(func) => {
                decl.methods.push(lower_function(
                    func.name.as_str(),
                    &func.args,
                    &func.decorator_list,
                    &func.body,
                    source,
                ));
            }
            ast::Stmt::ClassDef(inner) => {
                decl.classes.push(lower_class(inner, source));
            }
            _ => {}
        }
    }

    decl
}

fn lower_function(
    name: &str,
    args: &ast::Arguments,
    decorators: &[ast::Expr],
    body: &[ast::Stmt],
    source: &str,
) -> FunctionDecl {
    // Only required positional parameters are recorded; defaulted ones
    // (`pk=None` and friends) are call-site detail.
    let mut params: Vec<String> = Vec::new();
    for arg in args.posonlyargs.iter().chain(args.args.iter()) {
        if arg.default.is_none() {
            params.push(arg.def.arg.to_string());
        }
    }

    FunctionDecl {
        name: name.to_string(),
        params,
        decorators: decorators.iter().map(|d| lower_expr(d, source)).collect(),
        docstring: docstring_of(body),
    }
}

fn lower_assign(targets: &[ast::Expr], value: &ast::Expr, source: &str) -> Option<Assign> {
    // Only single-name targets are declarations we care about;
    // tuple unpacking and attribute targets are skipped.
    if targets.len() != 1 {
        return None;
    }
    let ast::Expr::Name(name) = &targets[0] else {
        return None;
    };
    Some(Assign {
        target: name.id.to_string(),
        value: lower_expr(value, source),
    })
}

fn lower_expr(expr: &ast::Expr, source: &str) -> PyExpr {
    match expr {
        ast::Expr::Constant(c) => lower_constant(&c.value, source, c.range()),
        ast::Expr::Name(_) | ast::Expr::Attribute(_) => match dotted_name(expr) {
            Some(name) => PyExpr::Name(name),
            None => PyExpr::Opaque(snippet(source, expr.range())),
        },
        ast::Expr::List(list) => {
            PyExpr::List(list.elts.iter().map(|e| lower_expr(e, source)).collect())
        }
        ast::Expr::Tuple(tuple) => {
            PyExpr::Tuple(tuple.elts.iter().map(|e| lower_expr(e, source)).collect())
        }
        ast::Expr::Dict(dict) => {
            let mut pairs = Vec::new();
            for (key, value) in dict.keys.iter().zip(dict.values.iter()) {
                if let Some(key) = key {
                    pairs.push((lower_expr(key, source), lower_expr(value, source)));
                }
            }
            PyExpr::Dict(pairs)
        }
        ast::Expr::Call(call) => {
            let callee = dotted_name(&call.func)
                .unwrap_or_else(|| snippet(source, call.func.range()));
            let args = call.args.iter().map(|a| lower_expr(a, source)).collect();
            let mut kwargs = Vec::new();
            for keyword in &call.keywords {
                if let Some(arg) = &keyword.arg {
                    kwargs.push((arg.to_string(), lower_expr(&keyword.value, source)));
                }
            }
            PyExpr::Call(Box::new(CallExpr {
                callee,
                args,
                kwargs,
            }))
        }
        _ => PyExpr::Opaque(snippet(source, expr.range())),
    }
}

fn lower_constant(constant: &ast::Constant, source: &str, range: TextRange) -> PyExpr {
    match constant {
        ast::Constant::Str(s) => PyExpr::Str(s.clone()),
        ast::Constant::Int(i) => match i.to_string().parse::<i64>() {
            Ok(v) => PyExpr::Int(v),
            Err(_) => PyExpr::Opaque(snippet(source, range)),
        },
        ast::Constant::Float(f) => PyExpr::Float(*f),
        ast::Constant::Bool(b) => PyExpr::Bool(*b),
        ast::Constant::None => PyExpr::None,
        ast::Constant::Tuple(items) => PyExpr::Tuple(
            items
                .iter()
                .map(|c| lower_constant(c, source, range))
                .collect(),
        ),
        _ => PyExpr::Opaque(snippet(source, range)),
    }
}

/// Dotted name of a `Name` or `Attribute` chain, or `None` when the
/// expression is computed (a subscript, a call result, ...).
fn dotted_name(expr: &ast::Expr) -> Option<String> {
    match expr {
        ast::Expr::Name(name) => Some(name.id.to_string()),
        ast::Expr::Attribute(attr) => {
            let base = dotted_name(&attr.value)?;
            Some(format!("{}.{}", base, attr.attr.as_str()))
        }
        _ => None,
    }
}

/// Source text covered by a range, for opaque expressions.
fn snippet(source: &str, range: TextRange) -> String {
    let start = u32::from(range.start()) as usize;
    let end = u32::from(range.end()) as usize;
    source.get(start..end).unwrap_or("").to_string()
}
