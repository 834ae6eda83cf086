//! Tree-walking evaluator (§4.3).
//!
//! One dispatcher per AST variant, matched exhaustively rather than
//! dispatched by method-name string (§9). Non-local control transfer
//! (return/break/continue/throw) is modelled as [`Flow`], carried back
//! through `Result` instead of Rust panics, per the same design note.

mod methods;

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{BinaryOp, ClassDecl, Expr, Param, Program, Stmt, UnaryOp};
use crate::environment::{EnvRef, Environment};
use crate::error::{Position, RuntimeError};
use crate::modules;
use crate::value::{stringify, ClassValue, DictKey, FunctionValue, InstanceValue, Value};

/// The single non-local-transfer sum type mentioned in §9: a statement or
/// expression dispatcher either produces a plain value/unit, or one of
/// these four transfers, which unwind dispatcher frames until a matching
/// construct (loop, function call, try/catch) catches it.
pub enum Flow {
    Return(Value),
    Break,
    Continue,
    Error(RuntimeError),
}

impl From<RuntimeError> for Flow {
    fn from(err: RuntimeError) -> Self {
        Flow::Error(err)
    }
}

pub type EvalResult<T> = Result<T, Flow>;

#[derive(Debug)]
pub struct Interpreter {
    pub globals: EnvRef,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::root();
        install_prelude(&globals);
        Self { globals }
    }

    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let env = self.globals.clone();
        for stmt in &program.statements {
            if let Err(flow) = self.eval_stmt(stmt, &env) {
                return Err(self.flow_into_error(flow, stmt_position_of(stmt)));
            }
        }
        Ok(())
    }

    /// Runs `stmts` as a standalone translation unit (used by the module
    /// loader, §4.5) in `env`.
    pub fn run_in_env(&mut self, stmts: &[Stmt], env: &EnvRef) -> Result<(), RuntimeError> {
        for stmt in stmts {
            if let Err(flow) = self.eval_stmt(stmt, env) {
                return Err(self.flow_into_error(flow, stmt_position_of(stmt)));
            }
        }
        Ok(())
    }

    fn flow_into_error(&self, flow: Flow, position: Position) -> RuntimeError {
        match flow {
            Flow::Error(err) => err,
            Flow::Return(_) => RuntimeError::new("'return' outside of a function", position),
            Flow::Break => RuntimeError::new("'break' outside of a loop", position),
            Flow::Continue => RuntimeError::new("'continue' outside of a loop", position),
        }
    }

    // ---- statements --------------------------------------------------

    fn eval_block(&mut self, stmts: &[Stmt], env: &EnvRef) -> EvalResult<()> {
        for stmt in stmts {
            self.eval_stmt(stmt, env)?;
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: &EnvRef) -> EvalResult<()> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval_expr(expr, env)?;
                Ok(())
            }
            Stmt::Assign(target, value_expr, position) => {
                let value = self.eval_expr(value_expr, env)?;
                self.assign_target(target, value, env, *position)
            }
            Stmt::DestructureList(names, value_expr, position) => {
                let value = self.eval_expr(value_expr, env)?;
                let Value::List(list) = value else {
                    return Err(RuntimeError::new(
                        format!("cannot destructure a {} as a list", value.type_name()),
                        *position,
                    )
                    .into());
                };
                let items = list.borrow();
                if items.len() < names.len() {
                    return Err(RuntimeError::new(
                        format!(
                            "list destructuring expects at least {} elements, found {}",
                            names.len(),
                            items.len()
                        ),
                        *position,
                    )
                    .into());
                }
                for (name, value) in names.iter().zip(items.iter()) {
                    define_or_assign(env, name, value.clone());
                }
                Ok(())
            }
            Stmt::DestructureDict(names, value_expr, position) => {
                let value = self.eval_expr(value_expr, env)?;
                let Value::Dict(dict) = value else {
                    return Err(RuntimeError::new(
                        format!("cannot destructure a {} as a dictionary", value.type_name()),
                        *position,
                    )
                    .into());
                };
                let dict = dict.borrow();
                for name in names {
                    let key = DictKey::from_value(&Value::str(name.clone()), *position)?;
                    let value = dict.get(&key).cloned().ok_or_else(|| {
                        RuntimeError::new(
                            format!("missing key '{name}' in dictionary destructuring"),
                            *position,
                        )
                    })?;
                    define_or_assign(env, name, value);
                }
                Ok(())
            }
            Stmt::Show(expr, position) => {
                let value = self.eval_expr(expr, env)?;
                let text = self.stringify(&value, *position)?;
                println!("{text}");
                Ok(())
            }
            Stmt::Ask(prompt, name, position) => self.eval_ask(prompt.as_ref(), name, env, *position),
            Stmt::If(arms, else_body, _) => {
                for arm in arms {
                    let condition = self.eval_expr(&arm.condition, env)?;
                    if condition.is_truthy() {
                        return self.eval_block(&arm.body, env);
                    }
                }
                if let Some(body) = else_body {
                    self.eval_block(body, env)?;
                }
                Ok(())
            }
            Stmt::While(condition, body, _) => {
                while self.eval_expr(condition, env)?.is_truthy() {
                    match self.eval_block(body, env) {
                        Ok(()) => {}
                        Err(Flow::Break) => break,
                        Err(Flow::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Stmt::RepeatNTimes(count_expr, body, position) => {
                let count = self.eval_integer(count_expr, env, *position)?;
                for _ in 0..count.max(0) {
                    match self.eval_block(body, env) {
                        Ok(()) => {}
                        Err(Flow::Break) => break,
                        Err(Flow::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Stmt::RangeFor(name, start_expr, end_expr, body, position) => {
                let start = self.eval_integer(start_expr, env, *position)?;
                let end = self.eval_integer(end_expr, env, *position)?;
                let values: Vec<i64> = if start <= end {
                    (start..=end).collect()
                } else {
                    (end..=start).rev().collect()
                };
                for i in values {
                    env.define(name.clone(), Value::Int(i));
                    match self.eval_block(body, env) {
                        Ok(()) => {}
                        Err(Flow::Break) => break,
                        Err(Flow::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Stmt::IterateFor(first, second, source_expr, body, position) => {
                self.eval_iterate_for(first, second.as_deref(), source_expr, body, env, *position)
            }
            Stmt::FuncDecl(name, params, body, _) => {
                let function = Rc::new(FunctionValue {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    closure: env.clone(),
                });
                env.define(name.clone(), Value::Function(function));
                Ok(())
            }
            Stmt::Return(value_expr, position) => {
                let value = match value_expr {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Null,
                };
                let _ = position;
                Err(Flow::Return(value))
            }
            Stmt::Break(_) => Err(Flow::Break),
            Stmt::Continue(_) => Err(Flow::Continue),
            Stmt::Push(target_expr, value_expr, position) => {
                let target = self.eval_expr(target_expr, env)?;
                let value = self.eval_expr(value_expr, env)?;
                match target {
                    Value::List(list) => {
                        list.borrow_mut().push(value);
                        Ok(())
                    }
                    other => Err(RuntimeError::new(
                        format!("cannot push onto a {}", other.type_name()),
                        *position,
                    )
                    .into()),
                }
            }
            Stmt::Pop(target_expr, index_expr, position) => {
                let target = self.eval_expr(target_expr, env)?;
                let Value::List(list) = target else {
                    return Err(RuntimeError::new(
                        format!("cannot pop from a {}", target.type_name()),
                        *position,
                    )
                    .into());
                };
                let index = match index_expr {
                    Some(expr) => self.eval_integer(expr, env, *position)? as usize,
                    None => {
                        let len = list.borrow().len();
                        if len == 0 {
                            return Err(RuntimeError::new("pop from an empty list", *position).into());
                        }
                        len - 1
                    }
                };
                let mut items = list.borrow_mut();
                if index >= items.len() {
                    return Err(RuntimeError::new(
                        format!("pop index {index} out of range"),
                        *position,
                    )
                    .into());
                }
                items.remove(index);
                Ok(())
            }
            Stmt::Throw(value_expr, position) => {
                let value = self.eval_expr(value_expr, env)?;
                Err(Flow::Error(RuntimeError::thrown(value, *position)))
            }
            Stmt::TryCatchFinally {
                body,
                catch,
                finally,
                position,
            } => self.eval_try(body, catch.as_ref(), finally.as_deref(), env, *position),
            Stmt::Match(subject_expr, arms, _) => {
                let subject = self.eval_expr(subject_expr, env)?;
                for arm in arms {
                    let matches = match &arm.pattern {
                        Some(pattern_expr) => {
                            let pattern = self.eval_expr(pattern_expr, env)?;
                            pattern.structural_eq(&subject)
                        }
                        None => true,
                    };
                    if matches {
                        return self.eval_block(&arm.body, env);
                    }
                }
                Ok(())
            }
            Stmt::ClassDecl(decl, position) => self.eval_class_decl(decl, env, *position),
            Stmt::UseModule { path, alias, position } => {
                let (default_name, module) = modules::resolve(self, path, *position)?;
                env.define(alias.clone().unwrap_or(default_name), module);
                Ok(())
            }
        }
    }

    fn eval_ask(
        &mut self,
        prompt: Option<&Expr>,
        name: &str,
        env: &EnvRef,
        position: Position,
    ) -> EvalResult<()> {
        use std::io::Write;

        if let Some(prompt_expr) = prompt {
            let value = self.eval_expr(prompt_expr, env)?;
            let text = self.stringify(&value, position)?;
            print!("{text}");
            std::io::stdout()
                .flush()
                .map_err(|err| RuntimeError::new(format!("failed to flush stdout: {err}"), position))?;
        }

        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .map_err(|err| RuntimeError::new(format!("failed to read input: {err}"), position))?;
        let trimmed = line.trim_end_matches(['\n', '\r']);
        define_or_assign(env, name, coerce_input(trimmed));
        Ok(())
    }

    fn eval_iterate_for(
        &mut self,
        first: &str,
        second: Option<&str>,
        source_expr: &Expr,
        body: &[Stmt],
        env: &EnvRef,
        position: Position,
    ) -> EvalResult<()> {
        let source = self.eval_expr(source_expr, env)?;
        match source {
            Value::List(list) => {
                let items = list.borrow().clone();
                for (index, value) in items.into_iter().enumerate() {
                    bind_iteration(env, first, second, Value::Int(index as i64), value);
                    match self.eval_block(body, env) {
                        Ok(()) => {}
                        Err(Flow::Break) => break,
                        Err(Flow::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Value::Dict(dict) => {
                let entries: Vec<(DictKey, Value)> = dict.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                for (key, value) in entries {
                    bind_iteration(env, first, second, key.into_value(), value);
                    match self.eval_block(body, env) {
                        Ok(()) => {}
                        Err(Flow::Break) => break,
                        Err(Flow::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                for (index, ch) in chars.into_iter().enumerate() {
                    bind_iteration(env, first, second, Value::Int(index as i64), Value::str(ch.to_string()));
                    match self.eval_block(body, env) {
                        Ok(()) => {}
                        Err(Flow::Break) => break,
                        Err(Flow::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            other => Err(RuntimeError::new(
                format!("cannot iterate over a {}", other.type_name()),
                position,
            )
            .into()),
        }
    }

    fn eval_try(
        &mut self,
        body: &[Stmt],
        catch: Option<&(String, Vec<Stmt>)>,
        finally: Option<&[Stmt]>,
        env: &EnvRef,
        _position: Position,
    ) -> EvalResult<()> {
        let mut result = match self.eval_block(body, env) {
            Err(Flow::Error(err)) => {
                if let Some((name, catch_body)) = catch {
                    // Only try/catch introduces a fresh child frame (§3), to
                    // hold the caught value's binding.
                    let catch_env = Environment::child(env);
                    catch_env.define(name.clone(), err.catch_value());
                    self.eval_block(catch_body, &catch_env)
                } else {
                    Err(Flow::Error(err))
                }
            }
            other => other,
        };

        if let Some(finally_body) = finally {
            if let Err(finally_flow) = self.eval_block(finally_body, env) {
                result = Err(finally_flow);
            }
        }

        result
    }

    fn eval_class_decl(&mut self, decl: &ClassDecl, env: &EnvRef, position: Position) -> EvalResult<()> {
        let parent = match &decl.parent {
            Some(parent_name) => match env.get(parent_name) {
                Some(Value::Class(class)) => Some(class),
                Some(other) => {
                    return Err(RuntimeError::new(
                        format!("'{}' is a {}, not a class", parent_name, other.type_name()),
                        position,
                    )
                    .into())
                }
                None => {
                    return Err(RuntimeError::new(format!("undefined class '{parent_name}'"), position).into())
                }
            },
            None => None,
        };

        let mut methods = IndexMap::new();
        for (method_name, params, body) in &decl.methods {
            methods.insert(
                method_name.clone(),
                Rc::new(FunctionValue {
                    name: method_name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    closure: env.clone(),
                }),
            );
        }

        let class = Rc::new(ClassValue {
            name: decl.name.clone(),
            parent,
            methods: RefCell::new(methods),
            env: env.clone(),
        });
        env.define(decl.name.clone(), Value::Class(class));
        Ok(())
    }

    // ---- assignment targets -------------------------------------------

    fn assign_target(&mut self, target: &Expr, value: Value, env: &EnvRef, position: Position) -> EvalResult<()> {
        match target {
            Expr::Identifier(name, _) => {
                define_or_assign(env, name, value);
                Ok(())
            }
            Expr::This(_) => Err(RuntimeError::new("cannot assign to 'this'", position).into()),
            Expr::Member(receiver_expr, name, _) => {
                let receiver = self.eval_expr(receiver_expr, env)?;
                match receiver {
                    Value::Instance(instance) => {
                        instance.borrow_mut().properties.insert(name.clone(), value);
                        Ok(())
                    }
                    other => Err(RuntimeError::new(
                        format!("cannot assign a property on a {}", other.type_name()),
                        position,
                    )
                    .into()),
                }
            }
            Expr::Index(receiver_expr, index_expr, _) => {
                let receiver = self.eval_expr(receiver_expr, env)?;
                let index = self.eval_expr(index_expr, env)?;
                match receiver {
                    Value::List(list) => {
                        let len = list.borrow().len();
                        let i = expect_index(&index, len, position)?;
                        let mut items = list.borrow_mut();
                        if i >= items.len() {
                            return Err(RuntimeError::new(format!("index {i} out of range"), position).into());
                        }
                        items[i] = value;
                        Ok(())
                    }
                    Value::Dict(dict) => {
                        let key = DictKey::from_value(&index, position)?;
                        dict.borrow_mut().insert(key, value);
                        Ok(())
                    }
                    other => Err(RuntimeError::new(
                        format!("cannot index-assign into a {}", other.type_name()),
                        position,
                    )
                    .into()),
                }
            }
            other => Err(RuntimeError::new(format!("invalid assignment target {other:?}"), position).into()),
        }
    }

    // ---- expressions ----------------------------------------------------

    fn eval_expr(&mut self, expr: &Expr, env: &EnvRef) -> EvalResult<Value> {
        match expr {
            Expr::Integer(value, _) => Ok(Value::Int(*value)),
            Expr::Float(value, _) => Ok(Value::Float(*value)),
            Expr::Str(value, _) => Ok(Value::str(value.clone())),
            Expr::InterpolatedStr(parts, position) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        crate::ast::InterpPart::Literal(text) => out.push_str(text),
                        crate::ast::InterpPart::Expr(expr) => {
                            let value = self.eval_expr(expr, env)?;
                            out.push_str(&self.stringify(&value, *position)?);
                        }
                    }
                }
                Ok(Value::str(out))
            }
            Expr::Boolean(value, _) => Ok(Value::Bool(*value)),
            Expr::Null(_) => Ok(Value::Null),
            Expr::List(items, _) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, env)?);
                }
                Ok(Value::list(values))
            }
            Expr::Dict(entries, position) => {
                let mut map = IndexMap::new();
                for (key_expr, value_expr) in entries {
                    let key_value = self.eval_expr(key_expr, env)?;
                    let key = DictKey::from_value(&key_value, *position)?;
                    let value = self.eval_expr(value_expr, env)?;
                    map.insert(key, value);
                }
                Ok(Value::dict(map))
            }
            Expr::Identifier(name, position) => env
                .get(name)
                .ok_or_else(|| RuntimeError::new(format!("undefined variable '{name}'"), *position).into()),
            Expr::This(position) => env
                .get("this")
                .ok_or_else(|| RuntimeError::new("'this' used outside of a method", *position).into()),
            Expr::Index(receiver_expr, index_expr, position) => {
                let receiver = self.eval_expr(receiver_expr, env)?;
                let index = self.eval_expr(index_expr, env)?;
                self.index_value(receiver, index, *position)
            }
            Expr::Member(receiver_expr, name, position) => {
                let receiver = self.eval_expr(receiver_expr, env)?;
                self.eval_member(receiver, name, env, *position)
            }
            Expr::SuperCall(method_name, arg_exprs, position) => {
                self.eval_super_call(method_name, arg_exprs, env, *position)
            }
            Expr::Binary(op, lhs_expr, rhs_expr, position) => self.eval_binary(*op, lhs_expr, rhs_expr, env, *position),
            Expr::Unary(op, operand_expr, position) => {
                let operand = self.eval_expr(operand_expr, env)?;
                self.eval_unary(*op, operand, *position)
            }
            Expr::Call(callee_expr, arg_exprs, position) => {
                let callee = self.eval_expr(callee_expr, env)?;
                let args = self.eval_args(arg_exprs, env)?;
                self.call_value(callee, args, env, *position)
            }
            Expr::MethodCall(receiver_expr, name, arg_exprs, position) => {
                let receiver = self.eval_expr(receiver_expr, env)?;
                let args = self.eval_args(arg_exprs, env)?;
                self.dispatch_method(receiver, name, args, env, *position)
            }
            Expr::New(name, arg_exprs, position) => {
                let class = match env.get(name) {
                    Some(Value::Class(class)) => class,
                    Some(other) => {
                        return Err(RuntimeError::new(format!("'{name}' is a {}, not a class", other.type_name()), *position).into())
                    }
                    None => return Err(RuntimeError::new(format!("undefined class '{name}'"), *position).into()),
                };
                let args = self.eval_args(arg_exprs, env)?;
                self.construct(&class, args, env, *position)
            }
            Expr::Lambda(params, body_expr, _) => {
                let function = Rc::new(FunctionValue {
                    name: "<lambda>".to_owned(),
                    params: params.clone(),
                    body: vec![Stmt::Return(Some((**body_expr).clone()), body_expr.position())],
                    closure: env.clone(),
                });
                Ok(Value::Function(function))
            }
        }
    }

    fn eval_args(&mut self, arg_exprs: &[Expr], env: &EnvRef) -> EvalResult<Vec<Value>> {
        let mut args = Vec::with_capacity(arg_exprs.len());
        for expr in arg_exprs {
            args.push(self.eval_expr(expr, env)?);
        }
        Ok(args)
    }

    fn eval_integer(&mut self, expr: &Expr, env: &EnvRef, position: Position) -> EvalResult<i64> {
        match self.eval_expr(expr, env)? {
            Value::Int(i) => Ok(i),
            Value::Float(f) => Ok(f as i64),
            other => Err(RuntimeError::new(format!("expected a number, found {}", other.type_name()), position).into()),
        }
    }

    fn eval_member(&mut self, receiver: Value, name: &str, env: &EnvRef, position: Position) -> EvalResult<Value> {
        match &receiver {
            Value::Instance(instance) => {
                if let Some(value) = instance.borrow().properties.get(name).cloned() {
                    return Ok(value);
                }
                let class = instance.borrow().class.clone();
                if let Some(method) = class.find_method(name) {
                    return Ok(Value::Function(method));
                }
                Err(RuntimeError::new(format!("instance of '{}' has no property '{name}'", class.name), position).into())
            }
            Value::Class(class) => {
                if name == "name" {
                    return Ok(Value::str(class.name.clone()));
                }
                Err(RuntimeError::new(format!("class '{}' has no property '{name}'", class.name), position).into())
            }
            Value::Module(module) => {
                if let Some(native) = module.natives.get(name) {
                    return Ok(Value::Native(Rc::new(crate::value::NativeFunction {
                        name: name.to_owned(),
                        func: native.clone(),
                    })));
                }
                if let Some(value) = module.exports.get(name) {
                    return Ok(value.clone());
                }
                Err(RuntimeError::new(format!("module '{}' has no member '{name}'", module.name), position).into())
            }
            Value::Dict(dict) => {
                let key = DictKey::Str(Rc::new(name.to_owned()));
                if let Some(value) = dict.borrow().get(&key).cloned() {
                    return Ok(value);
                }
                self.dispatch_method(receiver, name, Vec::new(), env, position)
            }
            Value::Str(_) | Value::List(_) | Value::Int(_) | Value::Float(_) => {
                self.dispatch_method(receiver, name, Vec::new(), env, position)
            }
            other => Err(RuntimeError::new(format!("type '{}' has no property '{name}'", other.type_name()), position).into()),
        }
    }

    fn eval_super_call(&mut self, method_name: &str, arg_exprs: &[Expr], env: &EnvRef, position: Position) -> EvalResult<Value> {
        let this = env
            .get("this")
            .ok_or_else(|| RuntimeError::new("'super' used outside of a method", position))?;
        let current_class = match env.get("__class__") {
            Some(Value::Class(class)) => class,
            _ => return Err(RuntimeError::new("'super' used outside of a method", position).into()),
        };
        let parent = current_class
            .parent
            .clone()
            .ok_or_else(|| RuntimeError::new(format!("class '{}' has no parent", current_class.name), position))?;
        let (method, owner) = parent
            .find_method_with_owner(method_name)
            .ok_or_else(|| RuntimeError::new(format!("undefined method '{method_name}' on '{}'", parent.name), position))?;
        let args = self.eval_args(arg_exprs, env)?;
        self.call_method(&method, this, owner, args, env, position)
    }

    fn eval_binary(&mut self, op: BinaryOp, lhs_expr: &Expr, rhs_expr: &Expr, env: &EnvRef, position: Position) -> EvalResult<Value> {
        match op {
            BinaryOp::And => {
                let lhs = self.eval_expr(lhs_expr, env)?;
                if lhs.is_truthy() {
                    self.eval_expr(rhs_expr, env)
                } else {
                    Ok(lhs)
                }
            }
            BinaryOp::Or => {
                let lhs = self.eval_expr(lhs_expr, env)?;
                if lhs.is_truthy() {
                    Ok(lhs)
                } else {
                    self.eval_expr(rhs_expr, env)
                }
            }
            _ => {
                let lhs = self.eval_expr(lhs_expr, env)?;
                let rhs = self.eval_expr(rhs_expr, env)?;
                self.apply_binary(op, lhs, rhs, position)
            }
        }
    }

    fn apply_binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value, position: Position) -> EvalResult<Value> {
        match op {
            BinaryOp::Add => self.apply_add(lhs, rhs, position),
            BinaryOp::Sub => apply_numeric(lhs, rhs, position, "subtract", |a, b| a - b, |a, b| a - b),
            BinaryOp::Mul => self.apply_mul(lhs, rhs, position),
            BinaryOp::Div => apply_division(lhs, rhs, position),
            BinaryOp::Mod => apply_modulo(lhs, rhs, position),
            BinaryOp::Eq => Ok(Value::Bool(lhs.structural_eq(&rhs))),
            BinaryOp::NotEq => Ok(Value::Bool(!lhs.structural_eq(&rhs))),
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => apply_compare(op, lhs, rhs, position),
            BinaryOp::And | BinaryOp::Or => unreachable!("short-circuit operators handled in eval_binary"),
        }
    }

    fn apply_add(&mut self, lhs: Value, rhs: Value, position: Position) -> EvalResult<Value> {
        match (&lhs, &rhs) {
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                let left = self.stringify(&lhs, position)?;
                let right = self.stringify(&rhs, position)?;
                Ok(Value::str(format!("{left}{right}")))
            }
            (Value::List(a), Value::List(b)) => {
                let mut items = a.borrow().clone();
                items.extend(b.borrow().iter().cloned());
                Ok(Value::list(items))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                let mut merged = a.borrow().clone();
                for (k, v) in b.borrow().iter() {
                    merged.insert(k.clone(), v.clone());
                }
                Ok(Value::dict(merged))
            }
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
            _ => numeric_pair(&lhs, &rhs)
                .map(|(a, b)| Value::Float(a + b))
                .ok_or_else(|| RuntimeError::new(format!("cannot add {} and {}", lhs.type_name(), rhs.type_name()), position).into()),
        }
    }

    fn apply_mul(&mut self, lhs: Value, rhs: Value, position: Position) -> EvalResult<Value> {
        match (&lhs, &rhs) {
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                if *n < 0 {
                    return Err(RuntimeError::new("cannot repeat a string a negative number of times", position).into());
                }
                Ok(Value::str(s.repeat(*n as usize)))
            }
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a * b)),
            _ => numeric_pair(&lhs, &rhs)
                .map(|(a, b)| Value::Float(a * b))
                .ok_or_else(|| RuntimeError::new(format!("cannot multiply {} and {}", lhs.type_name(), rhs.type_name()), position).into()),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: Value, position: Position) -> EvalResult<Value> {
        match op {
            UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
            UnaryOp::Neg => match operand {
                Value::Int(i) => Ok(Value::Int(-i)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(RuntimeError::new(format!("cannot negate a {}", other.type_name()), position).into()),
            },
        }
    }

    fn index_value(&mut self, receiver: Value, index: Value, position: Position) -> EvalResult<Value> {
        match receiver {
            Value::List(list) => {
                let len = list.borrow().len();
                let i = expect_index(&index, len, position)?;
                list.borrow()
                    .get(i)
                    .cloned()
                    .ok_or_else(|| RuntimeError::new(format!("index {i} out of range"), position).into())
            }
            Value::Dict(dict) => {
                let key = DictKey::from_value(&index, position)?;
                dict.borrow()
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| RuntimeError::new("missing dictionary key".to_owned(), position).into())
            }
            Value::Str(s) => {
                let len = s.chars().count();
                let i = expect_index(&index, len, position)?;
                s.chars()
                    .nth(i)
                    .map(|c| Value::str(c.to_string()))
                    .ok_or_else(|| RuntimeError::new(format!("index {i} out of range"), position).into())
            }
            other => Err(RuntimeError::new(format!("cannot index a {}", other.type_name()), position).into()),
        }
    }

    // ---- calls ------------------------------------------------------------

    pub(crate) fn call_value(&mut self, callee: Value, args: Vec<Value>, caller_env: &EnvRef, position: Position) -> EvalResult<Value> {
        match callee {
            Value::Function(function) => self.call_function(&function, args, caller_env, position),
            Value::Native(native) => (native.func)(self, &args, position).map_err(Flow::from),
            Value::Class(class) => self.construct(&class, args, caller_env, position),
            other => Err(RuntimeError::new(format!("value of type '{}' is not callable", other.type_name()), position).into()),
        }
    }

    pub(crate) fn call_function(&mut self, function: &Rc<FunctionValue>, args: Vec<Value>, caller_env: &EnvRef, position: Position) -> EvalResult<Value> {
        let frame = Environment::child(&function.closure);
        self.bind_params(&function.params, args, &frame, caller_env, &function.name, position)?;
        match self.eval_block(&function.body, &frame) {
            Ok(()) => Ok(Value::Null),
            Err(Flow::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }

    fn call_method(
        &mut self,
        method: &Rc<FunctionValue>,
        this: Value,
        defining_class: Rc<ClassValue>,
        args: Vec<Value>,
        caller_env: &EnvRef,
        position: Position,
    ) -> EvalResult<Value> {
        let frame = Environment::child(&method.closure);
        frame.define("this", this);
        frame.define("__class__", Value::Class(defining_class));
        self.bind_params(&method.params, args, &frame, caller_env, &method.name, position)?;
        match self.eval_block(&method.body, &frame) {
            Ok(()) => Ok(Value::Null),
            Err(Flow::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }

    /// Binds positional arguments into `frame`; missing trailing arguments
    /// fall back to their default expression evaluated in the **caller's**
    /// environment, a deliberate, documented deviation preserved from the
    /// source language (§9 Open Questions).
    fn bind_params(
        &mut self,
        params: &[Param],
        args: Vec<Value>,
        frame: &EnvRef,
        caller_env: &EnvRef,
        name: &str,
        position: Position,
    ) -> EvalResult<()> {
        if args.len() > params.len() {
            return Err(RuntimeError::new(
                format!("function '{name}' takes {} argument(s), got {}", params.len(), args.len()),
                position,
            )
            .into());
        }
        let mut args = args.into_iter();
        for param in params {
            let value = match args.next() {
                Some(value) => value,
                None => match &param.default {
                    Some(default_expr) => self.eval_expr(default_expr, caller_env)?,
                    None => {
                        return Err(RuntimeError::new(
                            format!("missing argument '{}' to function '{name}'", param.name),
                            position,
                        )
                        .into())
                    }
                },
            };
            frame.define(param.name.clone(), value);
        }
        Ok(())
    }

    fn construct(&mut self, class: &Rc<ClassValue>, args: Vec<Value>, caller_env: &EnvRef, position: Position) -> EvalResult<Value> {
        let instance = Rc::new(RefCell::new(InstanceValue {
            class: class.clone(),
            properties: IndexMap::new(),
        }));
        match class.find_method_with_owner("init") {
            Some((init, owner)) => {
                self.call_method(&init, Value::Instance(instance.clone()), owner, args, caller_env, position)?;
            }
            None if !args.is_empty() => {
                return Err(RuntimeError::new(format!("class '{}' has no 'init' but was given arguments", class.name), position).into());
            }
            None => {}
        }
        Ok(Value::Instance(instance))
    }

    pub(crate) fn dispatch_method(&mut self, receiver: Value, name: &str, args: Vec<Value>, caller_env: &EnvRef, position: Position) -> EvalResult<Value> {
        match receiver {
            Value::Instance(ref instance) => {
                let property = instance.borrow().properties.get(name).cloned();
                match property {
                    Some(Value::Function(function)) => self.call_function(&function, args, caller_env, position),
                    Some(other_callable @ (Value::Native(_) | Value::Class(_))) => self.call_value(other_callable, args, caller_env, position),
                    Some(other) => Err(RuntimeError::new(format!("property '{name}' is not callable (found {})", other.type_name()), position).into()),
                    None => {
                        let class = instance.borrow().class.clone();
                        let (method, owner) = class
                            .find_method_with_owner(name)
                            .ok_or_else(|| RuntimeError::new(format!("undefined method '{name}' on instance of '{}'", class.name), position))?;
                        self.call_method(&method, receiver.clone(), owner, args, caller_env, position)
                    }
                }
            }
            Value::Str(_) => methods::string::call(self, &receiver, name, &args, position),
            Value::List(_) => methods::list::call(self, &receiver, name, &args, caller_env, position),
            Value::Dict(_) => methods::dict::call(self, &receiver, name, &args, caller_env, position),
            Value::Int(_) | Value::Float(_) => methods::number::call(self, &receiver, name, &args, position),
            Value::Module(ref module) => {
                if let Some(native) = module.natives.get(name).cloned() {
                    return (native)(self, &args, position).map_err(Flow::from);
                }
                if let Some(value) = module.exports.get(name).cloned() {
                    return self.call_value(value, args, caller_env, position);
                }
                Err(RuntimeError::new(format!("module '{}' has no member '{name}'", module.name), position).into())
            }
            other => Err(RuntimeError::new(format!("type '{}' has no methods", other.type_name()), position).into()),
        }
    }

    // ---- stringification --------------------------------------------------

    /// The canonical stringifier (§4.4), extended (vs. [`crate::value::stringify`])
    /// with instance `toString` dispatch, which needs a live evaluator.
    pub fn stringify(&mut self, value: &Value, position: Position) -> EvalResult<String> {
        match value {
            Value::List(list) => {
                let items = list.borrow().clone();
                let mut parts = Vec::with_capacity(items.len());
                for item in &items {
                    parts.push(self.stringify(item, position)?);
                }
                Ok(format!("[{}]", parts.join(", ")))
            }
            Value::Dict(dict) => {
                let entries: Vec<(DictKey, Value)> = dict.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                let mut parts = Vec::with_capacity(entries.len());
                for (key, value) in &entries {
                    parts.push(format!("{}: {}", stringify(&key.into_value()), self.stringify(value, position)?));
                }
                Ok(format!("{{{}}}", parts.join(", ")))
            }
            Value::Instance(instance) => {
                let class = instance.borrow().class.clone();
                match class.find_method_with_owner("toString") {
                    Some((method, owner)) => {
                        let globals = self.globals.clone();
                        let result = self.call_method(&method, value.clone(), owner, Vec::new(), &globals, position)?;
                        self.stringify(&result, position)
                    }
                    None => Ok(format!("<{} instance>", class.name)),
                }
            }
            other => Ok(stringify(other)),
        }
    }
}

/// Global, module-independent builtins (§8: "Classes" invariant).
fn install_prelude(globals: &EnvRef) {
    let isinstance = crate::value::NativeFunction {
        name: "isinstance".to_owned(),
        func: Rc::new(|_interp: &mut Interpreter, args: &[Value], position: Position| match (args.first(), args.get(1)) {
            (Some(Value::Instance(instance)), Some(Value::Class(class))) => {
                Ok(Value::Bool(instance.borrow().class.is_or_inherits(class)))
            }
            (Some(_), Some(Value::Class(_))) => Ok(Value::Bool(false)),
            _ => Err(RuntimeError::new("isinstance expects (instance, class)", position)),
        }),
    };
    globals.define("isinstance", Value::Native(Rc::new(isinstance)));
}

fn define_or_assign(env: &EnvRef, name: &str, value: Value) {
    if !env.assign_if_exists(name, value.clone()) {
        env.define(name, value);
    }
}

fn bind_iteration(env: &EnvRef, first: &str, second: Option<&str>, primary: Value, secondary: Value) {
    match second {
        Some(second_name) => {
            env.define(first, primary);
            env.define(second_name, secondary);
        }
        None => env.define(first, secondary),
    }
}

/// A negative index counts back from the end (`obj[-1]` is the last
/// element), matching `examples/original_source/interpreter.py:716-725`.
fn expect_index(value: &Value, len: usize, position: Position) -> EvalResult<usize> {
    match value {
        Value::Int(i) if *i >= 0 => Ok(*i as usize),
        Value::Int(i) => {
            let wrapped = *i + len as i64;
            if wrapped >= 0 {
                Ok(wrapped as usize)
            } else {
                Err(RuntimeError::new(format!("index {i} out of range"), position).into())
            }
        }
        other => Err(RuntimeError::new(format!("index must be an integer, found {}", other.type_name()), position).into()),
    }
}

fn numeric_pair(lhs: &Value, rhs: &Value) -> Option<(f64, f64)> {
    let a = match lhs {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        _ => return None,
    };
    let b = match rhs {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        _ => return None,
    };
    Some((a, b))
}

fn apply_numeric(
    lhs: Value,
    rhs: Value,
    position: Position,
    verb: &str,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(*a, *b))),
        _ => numeric_pair(&lhs, &rhs)
            .map(|(a, b)| Value::Float(float_op(a, b)))
            .ok_or_else(|| RuntimeError::new(format!("cannot {verb} {} and {}", lhs.type_name(), rhs.type_name()), position).into()),
    }
}

fn apply_division(lhs: Value, rhs: Value, position: Position) -> EvalResult<Value> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => {
            if *b == 0 {
                return Err(RuntimeError::new("division by zero", position).into());
            }
            Ok(Value::Float(*a as f64 / *b as f64))
        }
        _ => {
            let (a, b) = numeric_pair(&lhs, &rhs)
                .ok_or_else(|| RuntimeError::new(format!("cannot divide {} and {}", lhs.type_name(), rhs.type_name()), position))?;
            if b == 0.0 {
                return Err(RuntimeError::new("division by zero", position).into());
            }
            Ok(Value::Float(a / b))
        }
    }
}

fn apply_modulo(lhs: Value, rhs: Value, position: Position) -> EvalResult<Value> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => {
            if *b == 0 {
                return Err(RuntimeError::new("modulo by zero", position).into());
            }
            Ok(Value::Int(a.rem_euclid(*b)))
        }
        _ => {
            let (a, b) = numeric_pair(&lhs, &rhs)
                .ok_or_else(|| RuntimeError::new(format!("cannot take the modulo of {} and {}", lhs.type_name(), rhs.type_name()), position))?;
            if b == 0.0 {
                return Err(RuntimeError::new("modulo by zero", position).into());
            }
            Ok(Value::Float(a.rem_euclid(b)))
        }
    }
}

fn apply_compare(op: BinaryOp, lhs: Value, rhs: Value, position: Position) -> EvalResult<Value> {
    let ordering = match (&lhs, &rhs) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => numeric_pair(&lhs, &rhs).and_then(|(a, b)| a.partial_cmp(&b)),
    };
    let ordering = ordering.ok_or_else(|| RuntimeError::new(format!("cannot compare {} and {}", lhs.type_name(), rhs.type_name()), position))?;
    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::GtEq => ordering.is_ge(),
        _ => unreachable!(),
    };
    Ok(Value::Bool(result))
}

fn coerce_input(s: &str) -> Value {
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    match s.to_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::str(s.to_owned()),
    }
}

/// Best-effort position extraction used only for reporting uncaught
/// control-flow transfers that escape a translation unit entirely; every
/// concrete evaluator error already carries its own precise position.
fn stmt_position_of(stmt: &Stmt) -> Position {
    match stmt {
        Stmt::Expr(e) => e.position(),
        Stmt::Assign(_, _, p)
        | Stmt::DestructureList(_, _, p)
        | Stmt::DestructureDict(_, _, p)
        | Stmt::Show(_, p)
        | Stmt::Ask(_, _, p)
        | Stmt::If(_, _, p)
        | Stmt::While(_, _, p)
        | Stmt::RepeatNTimes(_, _, p)
        | Stmt::RangeFor(_, _, _, _, p)
        | Stmt::IterateFor(_, _, _, _, p)
        | Stmt::FuncDecl(_, _, _, p)
        | Stmt::Return(_, p)
        | Stmt::Break(p)
        | Stmt::Continue(p)
        | Stmt::Push(_, _, p)
        | Stmt::Pop(_, _, p)
        | Stmt::Throw(_, p)
        | Stmt::Match(_, _, p)
        | Stmt::ClassDecl(_, p)
        | Stmt::UseModule { position: p, .. } => *p,
        Stmt::TryCatchFinally { position, .. } => *position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_source;

    fn run(source: &str) -> Interpreter {
        run_source("test", source).expect("program should evaluate")
    }

    #[test]
    fn arithmetic_and_show() {
        run("show 1 + 2");
    }

    #[test]
    fn closures_capture_later_assignments() {
        let interpreter = run(
            r#"
            set x = 1
            func get() { return x }
            set x = 2
            set result = get()
            "#,
        );
        match interpreter.globals.get("result") {
            Some(Value::Int(2)) => {}
            other => panic!("expected Int(2), got {other:?}"),
        }
    }

    #[test]
    fn list_shared_by_reference() {
        let interpreter = run(
            r#"
            set a = [1,2,3]
            set b = a
            push b 4
            set n = a.length
            "#,
        );
        match interpreter.globals.get("n") {
            Some(Value::Int(4)) => {}
            other => panic!("expected Int(4), got {other:?}"),
        }
    }

    #[test]
    fn classes_inherit_and_call_super() {
        let interpreter = run(
            r#"
            class A { func init(x) { set this.x = x } }
            class B extends A { func init(x) { super.init(x); set this.y = x*2 } }
            set b = new B(3)
            set x = b.x
            set y = b.y
            "#,
        );
        assert!(matches!(interpreter.globals.get("x"), Some(Value::Int(3))));
        assert!(matches!(interpreter.globals.get("y"), Some(Value::Int(6))));
    }

    #[test]
    fn try_catch_receives_thrown_value() {
        let interpreter = run(
            r#"
            set caught = null
            try { throw {code: 42} } catch e { set caught = e.code }
            "#,
        );
        assert!(matches!(interpreter.globals.get("caught"), Some(Value::Int(42))));
    }

    #[test]
    fn default_arguments_use_caller_scope() {
        let interpreter = run(
            r#"
            func f(x=10) { return x+1 }
            set result = f() + f(4)
            "#,
        );
        assert!(matches!(interpreter.globals.get("result"), Some(Value::Int(16))));
    }

    #[test]
    fn try_finally_runs_once_on_return() {
        let interpreter = run(
            r#"
            set count = 0
            func f() {
                try {
                    return 1
                } finally {
                    set count = count + 1
                }
            }
            set result = f()
            "#,
        );
        assert!(matches!(interpreter.globals.get("count"), Some(Value::Int(1))));
        assert!(matches!(interpreter.globals.get("result"), Some(Value::Int(1))));
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        let err = run_source("test", "show missing").unwrap_err();
        match err {
            crate::VoltError::Runtime(_) => {}
            other => panic!("expected a runtime error, got {other:?}"),
        }
    }

    #[test]
    fn division_by_zero_is_catchable() {
        let interpreter = run(
            r#"
            set message = ""
            try { set x = 1 / 0 } catch e { set message = e }
            "#,
        );
        assert!(matches!(interpreter.globals.get("message"), Some(Value::Str(_))));
    }
}
