use bvgen::{
    Target, TranslateConfig, feasibility_arguments, notation::expr_term, to_notation, to_sygus,
    translate, write_notation,
};
use bvlang::parser::{parse_expr, parse_program};

const DOUBLE: &str = "(spec (1) (4) x (add x x)) (lib add)";

const MIXED: &str = r#"
(spec 2 8 x y (sub x (and x y)))
(lib and sub (const 8) (const 8 0xff) (fun twice a (add a a)))
"#;

#[test]
fn double_notation() {
    let program = parse_program(DOUBLE).unwrap();
    assert_eq!(
        to_notation(&program).unwrap(),
        "bitwidth 4\n\
         spec 1 x -> (add x x)\n\
         lib add\n\
         algo list\n\
         timing\n\
         synth\n\
         quit\n"
    );
}

#[test]
fn double_sygus() {
    let program = parse_program(DOUBLE).unwrap();
    let expected = "\
(set-logic BV)
(define-fun op_add ((i0 (_ BitVec 8)) (i1 (_ BitVec 8))) (_ BitVec 8) (concat (bvadd #b0001 ((_ extract 7 4) i0) ((_ extract 7 4) i1)) (bvadd ((_ extract 3 0) i0) ((_ extract 3 0) i1))))
(define-fun spec ((x (_ BitVec 4))) (_ BitVec 4) (bvadd x x))
(declare-var x (_ BitVec 4))
(synth-fun res ((x (_ BitVec 4))) (_ BitVec 8) (
  (Start_0 (_ BitVec 8) ((concat #b0000 Var) (op_add Start_1 Start_1)))
  (Start_1 (_ BitVec 8) ((concat #b0000 Var)))
  (Var (_ BitVec 4) ((Variable (_ BitVec 4))))
))
(constraint (= (concat #b0001 (spec x)) (res x)))
(check-synth)
";
    assert_eq!(
        to_sygus(&program, &TranslateConfig::default()).unwrap(),
        expected
    );
}

#[test]
fn mixed_notation() {
    let program = parse_program(MIXED).unwrap();
    assert_eq!(
        to_notation(&program).unwrap(),
        "bitwidth 8\n\
         spec 2 x y -> (sub x (and x y))\n\
         lib and, sub, const 8, const 8 255, (twice, 1, a -> (add a a))\n\
         algo list\n\
         timing\n\
         synth\n\
         quit\n"
    );

    let mut sink = Vec::new();
    write_notation(&program, &mut sink).unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), to_notation(&program).unwrap());
}

#[test]
fn mixed_feasibility_arguments() {
    let program = parse_program(MIXED).unwrap();
    assert_eq!(
        feasibility_arguments(&program).unwrap(),
        vec![
            "8",
            "2",
            "x y -> (sub x (and x y))",
            "and",
            "sub",
            "const 8",
            "const 8 255",
            "(twice, 1, a -> (add a a))",
        ]
    );
    assert_eq!(
        translate(&program, Target::Feasibility, &TranslateConfig::default())
            .unwrap()
            .lines()
            .count(),
        8
    );
}

#[test]
fn mixed_sygus_definitions() {
    let program = parse_program(MIXED).unwrap();
    let text = to_sygus(&program, &TranslateConfig::default()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "(set-logic BV)");
    assert_eq!(
        lines[1],
        "(define-fun cust_twice ((a (_ BitVec 8))) (_ BitVec 8) (bvadd a a))"
    );
    assert!(lines[2].starts_with("(define-fun op_and ((i0 (_ BitVec 24)) (i1 (_ BitVec 24)))"));
    assert!(lines[3].starts_with("(define-fun op_sub "));
    assert!(lines[4].starts_with("(define-fun op_cust_twice ((i0 (_ BitVec 24))) (_ BitVec 24)"));
    assert!(lines[4].contains("(bvadd #b0001000000000000 ((_ extract 23 8) i0))"));
    assert_eq!(
        lines[5],
        "(define-fun spec ((x (_ BitVec 8)) (y (_ BitVec 8))) (_ BitVec 8) (bvsub x (bvand x y)))"
    );
    assert_eq!(lines[6], "(declare-var x (_ BitVec 8))");
    assert_eq!(lines[7], "(declare-var y (_ BitVec 8))");
    assert_eq!(
        lines[8],
        "(synth-fun res ((x (_ BitVec 8)) (y (_ BitVec 8))) (_ BitVec 24) ("
    );
    assert_eq!(
        lines[9],
        "  (Start_0_0_0_0 (_ BitVec 24) ((concat #b0000000000000000 Var) \
         (concat #b0000000000000000 Const) (concat #b0000000000000000 #b11111111) \
         (op_and Start_1_0_0_0 Start_1_0_0_0) (op_sub Start_0_1_0_0 Start_0_1_0_0) \
         (op_cust_twice Start_0_0_0_1)))"
    );
    assert!(text.contains("  (Const (_ BitVec 8) ((Constant (_ BitVec 8))))\n"));
    assert!(text.ends_with(
        "(constraint (= (concat #b0001000000010001 (spec x y)) (res x y)))\n(check-synth)\n"
    ));
}

#[test]
fn notation_expressions_reparse() {
    for src in [
        "(add x (mul y 3:8))",
        "(ite (ult x y) -1:8 (neg x))",
        "(concat 0:32 (xor a b))",
        "x",
        "0xff",
    ] {
        let expr = parse_expr(src).unwrap();
        let rendered = expr_term(&expr).unwrap().to_string();
        assert_eq!(parse_expr(&rendered).unwrap(), expr, "{}", rendered);
    }
}

#[test]
fn structural_errors_stop_emission() {
    assert!(parse_program("(lib add)").is_err());
    assert!(parse_program("(spec 1 4 x x) (lib add) (lib sub)").is_err());
}

#[test]
fn emitters_share_a_program_across_threads() {
    let program = parse_program(MIXED).unwrap();
    let config = TranslateConfig::default();
    let notation = to_notation(&program).unwrap();
    let sygus = to_sygus(&program, &config).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let program = &program;
                let config = &config;
                scope.spawn(move || {
                    if i % 2 == 0 {
                        to_notation(program).unwrap()
                    } else {
                        to_sygus(program, config).unwrap()
                    }
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let expected = if i % 2 == 0 { &notation } else { &sygus };
            assert_eq!(&handle.join().unwrap(), expected);
        }
    });
}
