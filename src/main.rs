use anyhow::Context;
use clap::Parser;
use minic::compiler::{default_output_path, read_source, to_json};
use minic::parser::DEFAULT_MAX_DEPTH;
use minic::{CompileOptions, CompileOutput, Compiler, DumpFlags};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, clap::Parser)]
#[clap(name = "minic", version, about = "Compile a small C-like language to x86-64 assembly")]
struct Args {
    /// Source file
    input: PathBuf,

    /// Assembly output path [default: input with extension `s`]
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Debug mode, prints a per-stage summary
    #[clap(short = 'd')]
    debug: bool,

    /// Print the parse tree
    #[clap(short = 't')]
    tree: bool,

    /// Print the token stream (also accepted as -tk)
    #[clap(long = "tk")]
    tokens: bool,

    /// Print every AST node in allocation order
    #[clap(short = 'n')]
    nodes: bool,

    /// Print the IR (also accepted as -ir)
    #[clap(long = "ir")]
    ir: bool,

    /// Write the assembly file
    #[clap(short = 'a')]
    asm: bool,

    /// Print the requested dumps as JSON
    #[clap(long)]
    json: bool,

    /// Abort when the AST grows past this many nodes
    #[clap(long, value_name = "N")]
    node_limit: Option<usize>,

    /// Deepest nesting of blocks and expressions
    #[clap(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl Args {
    fn dump_flags(&self) -> DumpFlags {
        DumpFlags {
            debug: self.debug,
            ast: self.tree,
            tokens: self.tokens,
            nodes: self.nodes,
            ir: self.ir,
            asm: self.asm,
        }
    }
}

/// Rewrite the two-letter single-dash flags into long options clap understands
fn normalize_legacy_flags(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-tk") => OsString::from("--tk"),
            Some("-ir") => OsString::from("--ir"),
            _ => arg,
        })
        .collect()
}

fn print_json_dumps(output: &CompileOutput, flags: &DumpFlags) -> anyhow::Result<()> {
    if flags.tokens {
        println!("{}", to_json(&output.tokens)?);
    }
    if flags.ast || flags.nodes {
        println!("{}", to_json(&output.ast)?);
    }
    if flags.ir {
        println!("{}", to_json(&output.ir)?);
    }
    Ok(())
}

fn run(args: &Args) -> anyhow::Result<()> {
    let flags = args.dump_flags();
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));

    if flags.is_empty() {
        println!(
            "Compiling {} to {}",
            args.input.display(),
            output_path.display()
        );
    } else {
        println!(
            "Compiling {} to {} with flags: {}",
            args.input.display(),
            output_path.display(),
            flags.names().join(" ")
        );
    }

    let source = read_source(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let compiler = Compiler::new(CompileOptions {
        flags,
        node_limit: args.node_limit,
        max_depth: args.max_depth,
    });
    let output = compiler.compile(&source)?;

    if args.json {
        print_json_dumps(&output, &flags)?;
    } else {
        print!("{}", output.render_dumps(&flags));
    }

    if flags.asm {
        std::fs::write(&output_path, &output.assembly)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::try_parse_from(normalize_legacy_flags(std::env::args_os())) {
        Ok(args) => args,
        Err(err) => {
            // Help and version requests are not failures
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            println!("{}", err);
            return code;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
