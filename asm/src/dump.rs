use color_print::cformat;

use crate::{
    error::Fault,
    literal::LiteralTable,
    pass1::{Line, Pass1, ResolvedLine},
    symbol::SymbolTable,
};

const RULE: &str = "-------------------+-----------------------------------------------------";

pub fn print_listing(path: &str, pass1: &Pass1) {
    println!(
        "{}+------[{}]{}",
        "-".repeat(19),
        path,
        "-".repeat(45usize.saturating_sub(path.len()))
    );
    for line in &pass1.lines {
        match line {
            Line::Skip => {}
            Line::Resolved(resolved) => println!("{}", listing_line(resolved)),
            Line::Fault(fault) => println!("{}", fault_line(fault)),
        }
    }
    if let Some(fault) = &pass1.halted {
        println!(
            "{}| {:>4}: {}",
            cformat!("<r,s>{:16}</>", "halted"),
            fault.line,
            fault.text.trim()
        );
    }
    println!("{}", RULE);
}

pub fn fault_line(fault: &Fault) -> String {
    format!(
        "{}| {:>4}: {} {}",
        cformat!("<r,s>{:16}</>", "[??????] !!"),
        fault.line,
        fault.text.trim(),
        cformat!("<r>; {}</>", fault.error)
    )
}

pub fn listing_line(line: &ResolvedLine) -> String {
    let label = line
        .label
        .as_ref()
        .map(|sym| cformat!("<g>{:<6}</>", sym.short_label()))
        .unwrap_or_else(|| format!("{:6}", ""));
    let operand = line
        .operand
        .as_ref()
        .map(|op| {
            let text = format!("{:<12}", op.expression);
            let relocatable = if op.relocatable { "R" } else { "A" };
            cformat!("{} <c>{:<20}</> {:06X} {}", text, op.kind, op.value & 0xFF_FFFF, relocatable)
        })
        .or_else(|| {
            line.deferred
                .as_ref()
                .map(|expression| cformat!("{:<12} <y>unresolved</>", expression))
        })
        .unwrap_or_default();
    format!(
        "[{:06X}] +{:<5} | {:>4}: {} {:<8} {}",
        line.address,
        line.length,
        line.line,
        label,
        line.inst.display_mnemonic(),
        operand
    )
}

pub fn print_symbols(symbols: &SymbolTable) {
    println!("{:19}| {:<8} {:<6} {:<5} {:<5}", "", "LABEL", "VALUE", "RFLAG", "MFLAG");
    for sym in symbols.iter() {
        let mflag = if sym.multiply_defined {
            cformat!("<y>true</>")
        } else {
            "false".to_string()
        };
        println!(
            "{:19}| {} {:06X} {:<5} {}",
            "",
            cformat!("<g>{:<8}</>", sym.short_label()),
            sym.value & 0xFF_FFFF,
            sym.relocatable,
            mflag
        );
    }
    println!("{}", RULE);
}

pub fn print_literals(literals: &LiteralTable) {
    println!("{:19}| {:<12} {:<16} {:<6} {:<7}", "", "NAME", "VALUE", "LENGTH", "ADDRESS");
    for literal in literals.iter() {
        println!(
            "{:19}| {} {:<16} {:<6} {:<7}",
            "",
            cformat!("<c>{:<12}</>", literal.expression),
            literal.hex(),
            literal.bytes.len(),
            literal.address.unwrap_or_default()
        );
    }
    println!("{}", RULE);
}
