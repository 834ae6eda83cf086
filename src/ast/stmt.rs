use super::{ClassDecl, Expr, Param, Position};

/// One `case pattern { ... }` or `default { ... }` arm of a `match`
/// statement; `pattern` is `None` for the default arm.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfArm {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),

    /// `set <target> = <value>`. `target` is restricted at parse time to an
    /// identifier or a chain of `.`/`[]` accesses rooted at an identifier or
    /// `this` (§4.2).
    Assign(Expr, Expr, Position),
    DestructureList(Vec<String>, Expr, Position),
    DestructureDict(Vec<String>, Expr, Position),

    Show(Expr, Position),
    /// `ask <prompt> into <name>`-shaped statement: an optional prompt
    /// expression and the variable name receiving the coerced input (§4.3).
    Ask(Option<Expr>, String, Position),

    If(Vec<IfArm>, Option<Vec<Stmt>>, Position),
    While(Expr, Vec<Stmt>, Position),
    RepeatNTimes(Expr, Vec<Stmt>, Position),
    /// `for ident in start to end` — inclusive both ends.
    RangeFor(String, Expr, Expr, Vec<Stmt>, Position),
    /// `for ident[, ident2] in expr` over a list/dict/string.
    IterateFor(String, Option<String>, Expr, Vec<Stmt>, Position),

    FuncDecl(String, Vec<Param>, Vec<Stmt>, Position),
    Return(Option<Expr>, Position),
    Break(Position),
    Continue(Position),

    Push(Expr, Expr, Position),
    Pop(Expr, Option<Expr>, Position),

    Throw(Expr, Position),
    TryCatchFinally {
        body: Vec<Stmt>,
        catch: Option<(String, Vec<Stmt>)>,
        finally: Option<Vec<Stmt>>,
        position: Position,
    },
    Match(Expr, Vec<MatchArm>, Position),

    ClassDecl(ClassDecl, Position),
    UseModule {
        path: String,
        alias: Option<String>,
        position: Position,
    },
}
