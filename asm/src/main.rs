use arch::Catalog;
use color_print::{cformat, cprintln};
use sicasm::{
    dump,
    error::Error,
    map::SymbolMap,
    msg::Msg,
    pass1::{Line, LineResolver, Pass1, Policy},
    symbol::{Declared, SymbolTable},
};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input files
    #[clap(default_value = "main.asm")]
    input: Vec<String>,

    /// Opcode table [MNEMONIC OPCODE FORMAT] (built-in SIC/XE table if omitted)
    #[clap(short = 'p', long)]
    opcodes: Option<String>,

    /// Symbols to preload [VALUE LABEL RFLAG]
    #[clap(short, long)]
    symtab: Option<String>,

    /// Labels to look up after pass 1
    #[clap(short, long)]
    lookup: Option<String>,

    /// Output symbol map (yaml)
    #[clap(short, long)]
    map: Option<String>,

    /// Dump listing, symbol table and literal table
    #[clap(short, long)]
    dump: bool,

    /// Step over faulty lines when their size is known
    #[clap(short, long)]
    keep_going: bool,

    /// Print each line as it is resolved
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("SIC/XE Assembler (pass 1)");

    let errors = match run(&args) {
        Ok(errors) => errors,
        Err(e) => {
            Msg::Error(e.to_string()).head();
            1
        }
    };
    if errors > 0 {
        cprintln!("<r,s>{} error(s)</>", errors);
        std::process::exit(1);
    }
}

/// Returns the number of reported faults.
fn run(args: &Args) -> Result<usize, Error> {
    println!("1. Load Instruction Catalog");
    let catalog = match &args.opcodes {
        Some(path) => {
            println!("  < {}", path);
            Catalog::load(&read(path)?)?
        }
        None => Catalog::sicxe(),
    };
    println!("  {} instructions", catalog.len());

    println!("2. Load Symbols");
    let mut errors = 0;
    let mut seeded = SymbolTable::new();
    if let Some(path) = &args.symtab {
        println!("  < {}", path);
        for (idx, raw) in read(path)?.lines().enumerate() {
            if raw.trim().is_empty() {
                continue;
            }
            match seeded.seed(raw) {
                Ok(Declared::Inserted(_)) => {}
                Ok(Declared::Existing(sym)) => {
                    Msg::Warn(format!("Re-defined symbol: `{}`", sym.label))
                        .diag(path, idx + 1, raw);
                }
                Err(e) => {
                    Msg::Error(e.to_string()).diag(path, idx + 1, raw);
                    errors += 1;
                }
            }
        }
    }
    println!("  {} symbols", seeded.len());

    println!("3. Resolve Lines");
    let policy = if args.keep_going {
        Policy::Recover
    } else {
        Policy::Abort
    };
    let mut map = SymbolMap::new();
    let mut passes = vec![];
    for path in &args.input {
        println!("  < {}", path);
        let source = read(path)?;
        let pass1 = resolve(&catalog, seeded.clone(), policy, &source, args.verbose);
        errors += report(path, &pass1);
        cprintln!(
            "  start <c>{:06X}</> length <c>{:06X}</>",
            pass1.start,
            pass1.program_length()
        );
        map.add(path, &pass1);
        passes.push((path, pass1));
    }

    if args.dump {
        for (path, pass1) in &passes {
            dump::print_listing(path, pass1);
            dump::print_symbols(&pass1.symbols);
            dump::print_literals(&pass1.literals);
        }
    }

    if let Some(path) = &args.lookup {
        println!("4. Look Up Symbols");
        println!("  < {}", path);
        let labels = read(path)?;
        for (file, pass1) in &passes {
            println!("  [{}]", file);
            for label in labels.split_whitespace() {
                match pass1.symbols.lookup(label) {
                    Some(sym) => cprintln!(
                        "  <g>{:<8}</> {:06X} {}",
                        sym.label,
                        sym.value & 0xFF_FFFF,
                        if sym.relocatable { "R" } else { "A" }
                    ),
                    None => cprintln!("  <y>{:<8}</> not found", label),
                }
            }
        }
    }

    if let Some(path) = &args.map {
        println!("5. Write Symbol Map");
        println!("  > {}", path);
        map.write(path)?;
    }

    Ok(errors)
}

fn read(path: &str) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|e| Error::FileOpen(path.to_string(), e))
}

fn resolve(
    catalog: &Catalog,
    symbols: SymbolTable,
    policy: Policy,
    source: &str,
    verbose: bool,
) -> Pass1 {
    let mut resolver = LineResolver::new(catalog)
        .with_symbols(symbols)
        .policy(policy);
    for (idx, text) in source.lines().enumerate() {
        let outcome = match resolver.step(idx + 1, text) {
            Ok(Line::Resolved(line)) if verbose => {
                println!("  {}", dump::listing_line(line));
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(fault) => Err(fault),
        };
        if let Err(fault) = outcome {
            return resolver.finish(Some(fault));
        }
    }
    resolver.finish(None)
}

/// Print redefinitions and faults. Returns the number of faults.
fn report(path: &str, pass1: &Pass1) -> usize {
    for line in pass1.redeclarations() {
        let Some(sym) = &line.label else { continue };
        Msg::Warn(format!("Re-defined label: `{}`", sym.label)).diag(path, line.line, &line.text);
        let first = pass1.resolved().find(|prev| {
            !prev.redeclared && prev.label.as_ref().map(|l| &l.label) == Some(&sym.label)
        });
        let note = Msg::Note(cformat!(
            "Already defined with value <c>{:06X}</>. The first definition is kept.",
            sym.value & 0xFF_FFFF
        ));
        match first {
            Some(prev) => note.diag(path, prev.line, &prev.text),
            None => note.head(),
        }
    }

    let mut faults = 0;
    for fault in pass1.faults() {
        fault.print_diag(path);
        faults += 1;
    }
    if let Some(fault) = &pass1.halted {
        cprintln!("  <r>stopped at line {}</>", fault.line);
    }
    faults
}
