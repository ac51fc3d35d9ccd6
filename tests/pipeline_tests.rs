//! End-to-end tests: source text through every stage to assembly
//! Demonstrates: Lexer → Parser → IR Generator → x86 Codegen working together

use minic::compiler::ir::{BlockId, IrInstruction, IrOp, IrReg};
use minic::compiler::x86_codegen::slot_offset;
use minic::compiler::{format_ast, format_ir, format_nodes, format_tokens};
use minic::{CompileOptions, Compiler, Error, ErrorCategory, IrGenerator, Parser, Scanner, X86Codegen};

fn compile(source: &str) -> minic::Result<minic::CompileOutput> {
    Compiler::new(CompileOptions::default()).compile(source)
}

#[test]
fn test_e2e_straight_line_ir() {
    let output = compile("int main(){ int x = 2; int y = 3; return x+y; }").unwrap();
    let main = &output.ir.functions[0];

    let ops: Vec<IrOp> = main.instructions().map(IrInstruction::op).collect();
    assert_eq!(
        ops,
        vec![
            IrOp::Load,
            IrOp::Store,
            IrOp::Load,
            IrOp::Store,
            IrOp::Add,
            IrOp::Return
        ]
    );

    let add = main
        .instructions()
        .find(|instr| instr.op() == IrOp::Add)
        .copied()
        .unwrap();
    assert_eq!(add, IrInstruction::Add(IrReg(4), IrReg(0), IrReg(2)));
}

#[test]
fn test_e2e_add_operands_match_slots() {
    let output = compile("int main(){ int x = 2; int y = 3; return x+y; }").unwrap();
    let asm = &output.assembly;

    let expected = format!(
        "    movl {}(%rbp), %eax\n    addl {}(%rbp), %eax\n    movl %eax, {}(%rbp)\n",
        slot_offset(IrReg(0)),
        slot_offset(IrReg(2)),
        slot_offset(IrReg(4))
    );
    assert!(asm.contains(&expected), "assembly was:\n{}", asm);
    assert!(asm.contains("    movl -8(%rbp), %eax\n    addl -24(%rbp), %eax\n"));
    // Five registers, 40 bytes, rounded up to 48
    assert!(asm.contains("    subq $48, %rsp\n"));
}

#[test]
fn test_e2e_manual_stages_match_driver() {
    let source = "int main() { int i = 10; int acc = 0; while (i) { acc = acc + i; i = i - 1; } return acc; }";

    let tokens = Scanner::new(source).scan_tokens().unwrap();
    let ast = Parser::new(tokens).parse().unwrap();
    let ir = IrGenerator::new(&ast).generate().unwrap();
    let asm = X86Codegen::new().generate(&ir).unwrap();

    assert_eq!(asm, compile(source).unwrap().assembly);
}

#[test]
fn test_e2e_shadowing() {
    let output = compile("int main() { int x = 1; { int x = 2; } return x; }").unwrap();
    let main = &output.ir.functions[0];
    assert_eq!(
        main.instructions().last(),
        Some(&IrInstruction::Return(IrReg(0)))
    );
}

#[test]
fn test_e2e_if_else_wiring() {
    let output =
        compile("int main() { int c = 0; int a; int b; if (c) { a = 1; } else { b = 2; } return c; }")
            .unwrap();
    let main = &output.ir.functions[0];
    assert_eq!(main.blocks.len(), 4);
    assert_eq!(
        main.blocks[0].instructions.last(),
        Some(&IrInstruction::BranchIfZero(IrReg(0), BlockId(2)))
    );
    assert_eq!(
        main.blocks[1].instructions.last(),
        Some(&IrInstruction::Branch(BlockId(3)))
    );

    let asm = &output.assembly;
    for block in 0..4 {
        assert!(asm.contains(&format!(".Lmain_bb{}:\n", block)));
    }
    assert!(asm.contains("    je .Lmain_bb2\n"));
    assert!(asm.contains("    jmp .Lmain_bb3\n"));
}

#[test]
fn test_e2e_while_loop_assembly() {
    let output = compile("int main() { int i = 3; while (i) { i = i - 1; } return i; }").unwrap();
    let asm = &output.assembly;
    assert!(asm.contains("    je .Lmain_bb3\n"));
    assert!(asm.contains("    jmp .Lmain_bb1\n"));
    assert!(asm.contains("subl"));
}

#[test]
fn test_e2e_multiple_functions() {
    let output = compile(
        "int one() { return 1; }\n\
         int two() { return 2; }\n\
         int main() { return 3; }",
    )
    .unwrap();
    let asm = &output.assembly;
    assert_eq!(output.ir.functions.len(), 3);
    for name in ["one", "two", "main"] {
        assert!(asm.contains(&format!("    .globl {}\n{}:\n", name, name)));
        assert_eq!(asm.matches(&format!(".L{}_epilogue:", name)).count(), 1);
    }
    assert!(asm.starts_with("    .text\n"));
    assert!(asm.trim_end().ends_with(".section .note.GNU-stack,\"\",@progbits"));
}

#[test]
fn test_e2e_comments_and_whitespace() {
    let source = "/* header */\nint main() {\n\t// answer\n\treturn 6 * 7; /* done */\n}\n";
    let output = compile(source).unwrap();
    assert!(output.assembly.contains("imull"));
}

#[test]
fn test_dumps_are_deterministic() {
    let source = "int main() { int a = 1; if (a) { a = 2; } else { a = 3; } return a; }";
    let first = compile(source).unwrap();
    let second = compile(source).unwrap();

    assert_eq!(format_tokens(&first.tokens), format_tokens(&second.tokens));
    assert_eq!(format_ast(&first.ast), format_ast(&second.ast));
    assert_eq!(format_nodes(&first.ast), format_nodes(&second.ast));
    assert_eq!(format_ir(&first.ir), format_ir(&second.ir));
    assert_eq!(first.assembly, second.assembly);
}

#[test]
fn test_error_categories_per_stage() {
    let cases = [
        ("int main() { return 1 % 2; }", ErrorCategory::Lexical),
        ("int main() { return 1 }", ErrorCategory::Syntax),
        ("int main() { return x; }", ErrorCategory::Semantic),
        ("int g; int main() { return 0; }", ErrorCategory::Semantic),
        ("", ErrorCategory::Syntax),
    ];
    for (source, category) in cases {
        let err = compile(source).unwrap_err();
        assert_eq!(err.category(), category, "source: {:?} error: {}", source, err);
    }
}

#[test]
fn test_deep_nesting_is_a_typed_error() {
    let depth = 200_000;
    let blocks = format!(
        "int main() {} return 1; {} }}",
        "{ ".repeat(depth),
        "} ".repeat(depth)
    );
    let parens = format!(
        "int main() {{ return {}1{}; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    );

    for source in [blocks, parens] {
        let err = compile(&source).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { .. }));
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}

#[test]
fn test_float_rejected_downstream() {
    let err = compile("int main() { float f = 1.5; return 0; }").unwrap_err();
    assert!(matches!(err, Error::UnsupportedFloat { .. }));

    // Floats still lex and parse
    let tokens = Scanner::new("float f = 1.5;").scan_tokens().unwrap();
    assert!(Parser::new(tokens).parse().is_ok());
}

#[test]
fn test_independent_compilations_in_parallel() {
    let handles: Vec<_> = (0..4)
        .map(|n| {
            std::thread::spawn(move || {
                let source = format!("int main() {{ return {}; }}", n);
                compile(&source).map(|output| output.assembly)
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let asm = handle.join().unwrap().unwrap();
        assert!(asm.contains(&format!("movl ${}, -8(%rbp)", n)));
    }
}
