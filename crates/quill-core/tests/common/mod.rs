#![allow(dead_code)]

//! Shared helpers: a small reference evaluator for the constructor calls the
//! handlers emit, and a stub `ExprReader` that knows only atoms and parens.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use quill_core::delimited::read_delimited;
use quill_core::{CharStream, Expr, ExprKind, ExprReader, Literal, ReadError, ReadResult, Reader};

pub fn read_one(source: &str) -> Expr {
    Reader::extended()
        .read_one(source)
        .unwrap_or_else(|e| panic!("failed to read {:?}: {}", source, e))
}

pub fn eval_str(source: &str) -> Value {
    let forms = quill_core::read_all(source)
        .unwrap_or_else(|e| panic!("failed to read {:?}: {}", source, e));
    let env = Env::root();
    let mut last = Value::Nil;
    for form in &forms {
        last = eval(form, &env).unwrap_or_else(|e| panic!("failed to eval {}: {}", form, e));
    }
    last
}

pub fn eval_expr(expr: &Expr) -> Result<Value, String> {
    eval(expr, &Env::root())
}

#[derive(Clone, Debug)]
pub struct Vector {
    pub items: Vec<Value>,
    pub adjustable: bool,
    pub fill_pointer: bool,
}

#[derive(Clone, Debug)]
pub struct Table {
    pub test: String,
    pub size_hint: Option<usize>,
    pub entries: Vec<(Value, Value)>,
}

impl Table {
    fn insert(&mut self, key: Value, value: Value) {
        let test = self.test.clone();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| keys_match(&test, existing, &key))
        {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| keys_match(&self.test, existing, key))
            .map(|(_, value)| value)
    }
}

pub struct Lambda {
    required: Vec<String>,
    optional: Vec<String>,
    body: Vec<Expr>,
    env: Env,
}

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Keyword(String),
    Symbol(String),
    List(Vec<Value>),
    Vector(Rc<RefCell<Vector>>),
    Table(Rc<RefCell<Table>>),
    Record(Rc<HashMap<String, Value>>),
    Func(Rc<Lambda>),
    Builtin(String),
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Keyword(k) => write!(f, ":{}", k),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Vector(v) => write!(f, "#v{:?}", v.borrow().items),
            Value::Table(t) => {
                let t = t.borrow();
                write!(f, "#h[{} {:?}]{:?}", t.test, t.size_hint, t.entries)
            }
            Value::Record(r) => write!(f, "{:?}", r),
            Value::Func(_) => write!(f, "#<lambda>"),
            Value::Builtin(name) => write!(f, "#<builtin {}>", name),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a.borrow().items == b.borrow().items,
            (Value::Table(a), Value::Table(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.test == b.test && a.entries == b.entries
            }
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn vector(&self) -> Vector {
        match self {
            Value::Vector(v) => v.borrow().clone(),
            other => panic!("expected vector, got {:?}", other),
        }
    }

    pub fn table(&self) -> Table {
        match self {
            Value::Table(t) => t.borrow().clone(),
            other => panic!("expected table, got {:?}", other),
        }
    }
}

fn keys_match(test: &str, a: &Value, b: &Value) -> bool {
    match test {
        "equal" => a == b,
        "equalp" => match (a, b) {
            (Value::Str(x), Value::Str(y)) => x.eq_ignore_ascii_case(y),
            _ => a == b,
        },
        // Strings are distinct objects under eql.
        _ => match (a, b) {
            (Value::Str(_), Value::Str(_)) => false,
            _ => a == b,
        },
    }
}

#[derive(Clone)]
pub struct Env(Rc<Scope>);

struct Scope {
    vars: RefCell<HashMap<String, Value>>,
    parent: Option<Env>,
}

impl Env {
    pub fn root() -> Self {
        Env(Rc::new(Scope {
            vars: RefCell::new(HashMap::new()),
            parent: None,
        }))
    }

    fn child(&self) -> Self {
        Env(Rc::new(Scope {
            vars: RefCell::new(HashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    fn define(&self, name: &str, value: Value) {
        self.0.vars.borrow_mut().insert(name.to_string(), value);
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.0.vars.borrow().get(name) {
            return Some(value.clone());
        }
        self.0.parent.as_ref().and_then(|p| p.lookup(name))
    }
}

const BUILTINS: &[&str] = &[
    "+",
    "-",
    "*",
    "list",
    "make-array",
    "make-hash-table",
    "set-hash",
    "get-hash",
    "make-record",
    "access-field",
    "access-index",
];

pub fn eval(expr: &Expr, env: &Env) -> Result<Value, String> {
    match &expr.kind {
        ExprKind::Literal(lit) => Ok(match lit {
            Literal::Nil => Value::Nil,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(n) => Value::Float(*n),
            Literal::Str(s) => Value::Str(s.clone()),
        }),
        ExprKind::Keyword(k) => Ok(Value::Keyword(k.clone())),
        ExprKind::Symbol(name) => env
            .lookup(name)
            .or_else(|| {
                BUILTINS
                    .contains(&name.as_str())
                    .then(|| Value::Builtin(name.clone()))
            })
            .ok_or_else(|| format!("unbound symbol {}", name)),
        ExprKind::List(items) => eval_list(items, env),
    }
}

fn eval_list(items: &[Expr], env: &Env) -> Result<Value, String> {
    let Some(head) = items.first() else {
        return Ok(Value::Nil);
    };
    match head.as_symbol() {
        Some("quote") => return Ok(quote_value(&items[1])),
        Some("declare") => return Ok(Value::Nil),
        Some("progn") => return eval_body(&items[1..], env),
        Some("let") => {
            let scope = env.child();
            let bindings = items[1].as_list().ok_or("let bindings must be a list")?;
            for binding in bindings {
                let pair = binding.as_list().ok_or("let binding must be a list")?;
                let name = pair[0].as_symbol().ok_or("let binding needs a name")?;
                let value = eval(&pair[1], env)?;
                scope.define(name, value);
            }
            return eval_body(&items[2..], &scope);
        }
        Some("lambda") => {
            let params = items[1].as_list().ok_or("lambda list must be a list")?;
            let mut required = Vec::new();
            let mut optional = Vec::new();
            let mut in_optional = false;
            for param in params {
                match param.as_symbol() {
                    Some("&optional") => in_optional = true,
                    Some(name) if in_optional => optional.push(name.to_string()),
                    Some(name) => required.push(name.to_string()),
                    None => return Err(format!("bad parameter {}", param)),
                }
            }
            return Ok(Value::Func(Rc::new(Lambda {
                required,
                optional,
                body: items[2..].to_vec(),
                env: env.clone(),
            })));
        }
        _ => {}
    }
    let callee = eval(head, env)?;
    let args = items[1..]
        .iter()
        .map(|arg| eval(arg, env))
        .collect::<Result<Vec<_>, _>>()?;
    apply(&callee, args)
}

fn eval_body(body: &[Expr], env: &Env) -> Result<Value, String> {
    let mut last = Value::Nil;
    for form in body {
        last = eval(form, env)?;
    }
    Ok(last)
}

fn quote_value(expr: &Expr) -> Value {
    match &expr.kind {
        ExprKind::Symbol(name) => Value::Symbol(name.clone()),
        ExprKind::List(items) => Value::List(items.iter().map(quote_value).collect()),
        ExprKind::Keyword(k) => Value::Keyword(k.clone()),
        ExprKind::Literal(_) => eval(expr, &Env::root()).unwrap_or(Value::Nil),
    }
}

pub fn apply(callee: &Value, args: Vec<Value>) -> Result<Value, String> {
    match callee {
        Value::Func(lambda) => {
            let max = lambda.required.len() + lambda.optional.len();
            if args.len() < lambda.required.len() || args.len() > max {
                return Err(format!("wrong number of arguments: {}", args.len()));
            }
            let scope = lambda.env.child();
            let mut args = args.into_iter();
            for name in lambda.required.iter().chain(&lambda.optional) {
                scope.define(name, args.next().unwrap_or(Value::Nil));
            }
            eval_body(&lambda.body, &scope)
        }
        Value::Builtin(name) => call_builtin(name, args),
        other => Err(format!("not callable: {:?}", other)),
    }
}

fn int_arg(value: &Value) -> Result<i64, String> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(format!("expected integer, got {:?}", other)),
    }
}

fn keyword_args(args: &[Value]) -> Result<HashMap<String, Value>, String> {
    let mut out = HashMap::new();
    for pair in args.chunks(2) {
        match pair {
            [Value::Keyword(k), v] => {
                out.insert(k.clone(), v.clone());
            }
            _ => return Err(format!("bad keyword arguments {:?}", args)),
        }
    }
    Ok(out)
}

fn call_builtin(name: &str, args: Vec<Value>) -> Result<Value, String> {
    match name {
        "+" => Ok(Value::Int(args.iter().map(int_arg).sum::<Result<i64, _>>()?)),
        "*" => Ok(Value::Int(args.iter().map(int_arg).product::<Result<i64, _>>()?)),
        "-" => {
            let nums = args.iter().map(int_arg).collect::<Result<Vec<_>, _>>()?;
            match nums.split_first() {
                Some((first, [])) => Ok(Value::Int(-first)),
                Some((first, rest)) => Ok(Value::Int(first - rest.iter().sum::<i64>())),
                None => Err("- needs arguments".into()),
            }
        }
        "list" => Ok(Value::List(args)),
        "make-array" => {
            let len = int_arg(args.first().ok_or("make-array needs a length")?)?;
            let opts = keyword_args(&args[1..])?;
            let items = match opts.get("initial-contents") {
                Some(Value::List(items)) => items.clone(),
                None => vec![Value::Nil; len as usize],
                Some(other) => return Err(format!("bad initial contents {:?}", other)),
            };
            if items.len() as i64 != len {
                return Err(format!("length {} does not match contents", len));
            }
            Ok(Value::Vector(Rc::new(RefCell::new(Vector {
                items,
                adjustable: opts.get("adjustable") == Some(&Value::Bool(true)),
                fill_pointer: opts.get("fill-pointer") == Some(&Value::Bool(true)),
            }))))
        }
        "make-hash-table" => {
            let opts = keyword_args(&args)?;
            let test = match opts.get("test") {
                Some(Value::Symbol(test)) => test.clone(),
                None => "eql".to_string(),
                Some(other) => return Err(format!("bad test {:?}", other)),
            };
            if !matches!(test.as_str(), "eql" | "equal" | "equalp") {
                return Err(format!("unknown hash table test {}", test));
            }
            let size_hint = opts.get("size").map(int_arg).transpose()?.map(|n| n as usize);
            Ok(Value::Table(Rc::new(RefCell::new(Table {
                test,
                size_hint,
                entries: Vec::new(),
            }))))
        }
        "set-hash" => match args.as_slice() {
            [Value::Table(table), key, value] => {
                table.borrow_mut().insert(key.clone(), value.clone());
                Ok(value.clone())
            }
            _ => Err("set-hash expects table, key, value".into()),
        },
        "get-hash" => match args.as_slice() {
            [Value::Table(table), key] => Ok(table.borrow().get(key).cloned().unwrap_or(Value::Nil)),
            _ => Err("get-hash expects table, key".into()),
        },
        "make-record" => {
            let fields = keyword_args(&args)?;
            Ok(Value::Record(Rc::new(fields)))
        }
        "access-field" => match args.as_slice() {
            [Value::Record(fields), Value::Symbol(name)] => fields
                .get(name)
                .cloned()
                .ok_or_else(|| format!("no field {}", name)),
            _ => Err(format!("access-field expects record, symbol: {:?}", args)),
        },
        "access-index" => match args.as_slice() {
            [Value::List(items), Value::Int(i)] => index(items, *i),
            [Value::Vector(v), Value::Int(i)] => index(&v.borrow().items, *i),
            _ => Err(format!("access-index expects sequence, integer: {:?}", args)),
        },
        other => Err(format!("unknown builtin {}", other)),
    }
}

fn index(items: &[Value], i: i64) -> Result<Value, String> {
    usize::try_from(i)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| format!("index {} out of range", i))
}

/// Understands integers, symbols and `( ... )` only; enough to drive the
/// handlers without the crate's own reader.
#[derive(Default)]
pub struct StubReader {
    pub reads: usize,
}

impl ExprReader for StubReader {
    fn read_expr(&mut self, stream: &mut CharStream) -> ReadResult<Expr> {
        self.reads += 1;
        stream.skip_ws_and_comments();
        match stream.peek() {
            None => Err(ReadError::UnexpectedEof {
                span: stream.here(),
            }),
            Some('(') => {
                stream.next_char();
                Ok(Expr::list(read_delimited(self, stream, ')')?))
            }
            Some(ch) => {
                let token = stream.read_token();
                if token.is_empty() {
                    return Err(ReadError::UnexpectedChar {
                        ch,
                        span: stream.here(),
                    });
                }
                Ok(token
                    .parse::<i64>()
                    .map(Expr::int)
                    .unwrap_or_else(|_| Expr::symbol(token)))
            }
        }
    }

    fn read_list_item(
        &mut self,
        stream: &mut CharStream,
        closer: char,
    ) -> ReadResult<Option<Expr>> {
        stream.skip_ws_and_comments();
        match stream.peek() {
            None => Err(ReadError::UnterminatedList {
                closer,
                span: stream.here(),
            }),
            Some(ch) if ch == closer => {
                stream.next_char();
                Ok(None)
            }
            Some(_) => self.read_expr(stream).map(Some),
        }
    }
}
