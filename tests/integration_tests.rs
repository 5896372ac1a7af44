use std::collections::HashMap;

use rstest::rstest;

use tacc::analyzer::{Ty, TypeChecker};
use tacc::codegen::{render, NameContext, Statement, TacGenerator};
use tacc::error::CompileError;
use tacc::lexer::{Lexer, TokenKind};
use tacc::parser::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn typed_program(input: &str) -> Result<Program, CompileError> {
    init_logger();
    let mut program = Parser::new(Lexer::new("input.txt", input))?.parse()?;
    TypeChecker::check(&mut program)?;
    Ok(program)
}

fn tac(input: &str) -> Vec<String> {
    init_logger();
    tacc::compile("input.txt", input)
        .unwrap()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn push_exprs<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    expr.walk(&mut |e| out.push(e));
}

fn collect_exprs<'a>(stmt: &'a Stmt, out: &mut Vec<&'a Expr>) {
    match stmt {
        Stmt::Assign(a) => {
            push_exprs(&a.target, out);
            push_exprs(&a.value, out);
        }
        Stmt::If(c, t, e) => {
            push_exprs(c, out);
            collect_exprs(t, out);
            if let Some(e) = e {
                collect_exprs(e, out);
            }
        }
        Stmt::While(c, b) | Stmt::DoWhile(b, c) => {
            push_exprs(c, out);
            collect_exprs(b, out);
        }
        Stmt::Break => {}
        Stmt::Block(block) => block.stmts.iter().for_each(|s| collect_exprs(s, out)),
    }
}

#[test]
fn every_expression_is_typed() {
    let input = "
{
    int i; int j; float v; bool done; char c;
    int[10][10] m;
    i = 0;
    done = false;
    while (!done) {
        j = 0;
        do {
            m[i][j] = i * 10 + j;
            v = v + m[i][j] / 2.0;
            j = j + 1;
        } while (j < 10 && !done);
        if (i >= 9 || v > 1000.0) done = true; else i = i + 1;
        { char i; i = c; }
    }
}
";
    let program = typed_program(input).unwrap();
    let mut exprs = vec![];
    for stmt in &program.block.stmts {
        collect_exprs(stmt, &mut exprs);
    }
    assert!(!exprs.is_empty());
    for expr in exprs {
        assert!(expr.ty.is_some(), "untyped: {}", expr);
    }
}

#[test]
fn real_literal_and_malformed_decimal() {
    let mut lexer = Lexer::new("input.txt", "1.5");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Real(1.5));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);

    let err = Lexer::new("input.txt", "1.a").next_token().unwrap_err();
    assert!(matches!(err, CompileError::Lexical { .. }));
    assert_eq!(err.message(), "invalid decimal literal");
}

#[test]
fn declared_and_undeclared_variables() {
    assert!(typed_program("{ int x; x = 5; }").is_ok());

    let err = typed_program("{ x = 5; }").unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
    assert!(err.message().contains("not declared"));
}

#[test]
fn array_store_offset() {
    let statements = tacc::compile("input.txt", "{ int a[3][4]; a[1][2] = 5; }").unwrap();
    assert_eq!(
        statements.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        vec!["t1 = 1 * 4", "t2 = t1 + 2", "t3 = t2 * 4", "a[t3] = 5"]
    );

    let mut temps = HashMap::new();
    let value = |e: &Expr, temps: &HashMap<Temp, i32>| match &e.kind {
        ExprKind::Num(n) => *n,
        ExprKind::Temp(t) => temps[t],
        other => panic!("unexpected operand {:?}", other),
    };
    for statement in &statements {
        let Statement::Assign { target, value: rhs } = statement else {
            panic!();
        };
        match (&target.kind, &rhs.kind) {
            (ExprKind::Temp(t), ExprKind::Binary(op, l, r)) => {
                let (l, r) = (value(l, &temps), value(r, &temps));
                let result = match op {
                    BinOpKind::Add => l + r,
                    BinOpKind::Mul => l * r,
                    other => panic!("unexpected operator {:?}", other),
                };
                temps.insert(*t, result);
            }
            (ExprKind::Loc(loc), _) => {
                assert_eq!(loc.indices.len(), 1);
                assert_eq!(value(&loc.indices[0], &temps), 24);
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }
}

#[test]
fn break_at_top_level_is_rejected() {
    let err = tacc::compile("input.txt", "{ break; }").unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
    assert_eq!(err.message(), "'break' outside of loop");
}

#[test]
fn break_in_while_jumps_to_end() {
    let statements = tacc::compile("input.txt", "{ while (true) { break; } }").unwrap();
    let gotos: Vec<_> = statements
        .iter()
        .filter(|s| matches!(s, Statement::Goto(_)))
        .collect();
    assert_eq!(gotos.len(), 2);
    let Statement::Goto(exit) = gotos[0] else {
        unreachable!();
    };
    assert_eq!(statements.last(), Some(&Statement::Label(*exit)));
}

#[rstest]
#[case("{ int x; float y; y = x; }", None)]
#[case("{ float y; int x; x = y; }", Some("type mismatch"))]
#[case("{ int a[2]; float f; f = a[1]; }", None)]
#[case("{ float a[2]; int i; a[i] = i * 2; }", None)]
#[case("{ int a[2]; float f; a[0] = f; }", Some("type mismatch"))]
fn implicit_widening(#[case] input: &str, #[case] error: Option<&str>) {
    let result = typed_program(input);
    match error {
        None => assert!(result.is_ok(), "{:?}", result.err()),
        Some(expected) => {
            let err = result.unwrap_err();
            assert!(matches!(err, CompileError::Type { .. }));
            assert!(err.message().starts_with(expected), "{}", err);
        }
    }
}

#[test]
fn multiplication_is_the_deeper_node() {
    let program = typed_program("{ int x; x = 2 + 3 * 4; }").unwrap();
    let Stmt::Assign(assign) = &program.block.stmts[0] else {
        panic!();
    };
    let ExprKind::Binary(root, _, right) = &assign.value.kind else {
        panic!();
    };
    assert_eq!(*root, BinOpKind::Add);
    let ExprKind::Binary(inner, _, _) = &right.kind else {
        panic!();
    };
    assert_eq!(*inner, BinOpKind::Mul);
    assert_eq!(assign.value.ty, Some(Ty::INT));
}

#[rstest]
#[case("{ int x; if (x > 5) x = 0; }", 1)]
#[case("{ int x; if (x > 5) x = 0; else x = 1; }", 2)]
fn labels_per_if(#[case] input: &str, #[case] expected: usize) {
    let statements = tacc::compile("input.txt", input).unwrap();
    let labels = statements
        .iter()
        .filter(|s| matches!(s, Statement::Label(_)))
        .count();
    assert_eq!(labels, expected);
}

#[test]
fn no_dangling_jumps() {
    let input = "
{
    int i; bool b;
    while (i < 10) {
        if (b) { do { i = i + 1; if (i == 3) break; } while (b); }
        else { if (i > 4) break; }
        i = i + 2;
    }
    do { if (b) break; else b = !b; } while (true);
}
";
    let statements = tacc::compile("input.txt", input).unwrap();
    for target in statements.iter().filter_map(Statement::jump_target) {
        let defined = statements
            .iter()
            .filter(|s| **s == Statement::Label(target))
            .count();
        assert_eq!(defined, 1, "label {} defined {} times", target, defined);
    }
}

#[test]
fn stages_can_be_driven_individually() {
    init_logger();
    let mut program = Parser::new(Lexer::new("input.txt", "{ int x; x = -x; }"))
        .unwrap()
        .parse()
        .unwrap();
    TypeChecker::check(&mut program).unwrap();
    let mut names = NameContext::new();
    let statements = TacGenerator::generate(program, &mut names).unwrap();
    assert_eq!(render(&statements), "        x = -x\n");
}

#[test]
fn rendered_program() {
    let input = "{
    int x;
    x = 10;
    while (x > 5) x = x - 1;
}";
    let statements = tacc::compile("input.txt", input).unwrap();
    assert_eq!(
        render(&statements),
        "        x = 10\nL1:     iffalse x > 5 goto L2\n        x = x - 1\n        goto L1\nL2:\n"
    );
}

#[test]
fn syntax_error_report() {
    let input = "{\n    int x;\n    x = 1\n    x = 2;\n}\n";
    let err = tacc::compile("input.txt", input).unwrap_err();
    assert_eq!(
        err.render("input.txt", input),
        "  File \"input.txt\", line 3 position 9\n        x = 1\n             ^\nSyntaxError: expected ';' at end of statement"
    );
}

#[test]
fn type_error_report() {
    let input = "{\n    int x;\n    bool b;\n    x = b;\n}\n";
    let err = tacc::compile("input.txt", input).unwrap_err();
    assert_eq!(err.line(), Some(4));
    let report = err.render("input.txt", input);
    assert!(report.starts_with("  File \"input.txt\", line 4\n"));
    assert!(report.contains("----> 4     x = b;"));
    assert!(report.ends_with("TypeError: type mismatch: cannot assign 'bool' to 'int'"));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = tacc::compile_file("does/not/exist.txt").unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }));
}

#[rstest]
#[case("{ int a[2000000000][2000000000][2000000000][2000000000]; a[0][0][0][0] = 1; }")]
#[case("{ int a[3][100000][100000]; a[1][0][0] = 1; }")]
fn oversized_arrays_are_rejected(#[case] input: &str) {
    let err = tacc::compile("input.txt", input).unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }), "{:?}", err);
    assert_eq!(err.message(), "array 'a' is too large");
    assert_eq!(err.line(), Some(1));
}

#[test]
fn largest_int_array_still_lowers() {
    assert_eq!(
        tac("{ int a[2][268435455]; a[1][0] = 1; }"),
        vec!["t1 = 1 * 268435455", "t2 = t1 + 0", "t3 = t2 * 4", "a[t3] = 1"]
    );
}

#[test]
fn tac_helper_matches_display() {
    assert_eq!(tac("{ bool b; b = true; }"), vec!["b = true"]);
}
