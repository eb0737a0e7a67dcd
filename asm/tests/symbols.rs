use sicasm::{
    error::Error,
    symbol::{normalize_label, Declared, Symbol, SymbolTable},
};

fn invalid_label(label: &str) {
    let mut table = SymbolTable::new();
    match table.declare(label, 0, true) {
        Err(Error::InvalidLabel { .. }) => {}
        other => panic!("`{}`: {:?}", label, other),
    }
    assert!(table.is_empty());
}

macro_rules! case {
    ($name:ident, $label:expr) => {
        #[test]
        fn $name() {
            invalid_label($label);
        }
    };
}

case!(empty_label, "");
case!(blank_label, "   ");
case!(digit_first, "1ABC");
case!(underscore_first, "_ABC");
case!(hyphen, "A-B");
case!(too_long, "ABCDEFGHIJKLMNOPQRSTUV");

#[test]
fn declare_then_lookup() {
    let mut table = SymbolTable::new();
    let declared = table.declare("  alpha ", 5, true).unwrap();
    assert!(matches!(declared, Declared::Inserted(_)));

    let sym = table.lookup("ALPHA").unwrap();
    assert_eq!(sym.label, "ALPHA");
    assert_eq!(sym.value, 5);
    assert!(sym.relocatable);
    assert!(!sym.multiply_defined);
    assert!(table.contains("Alpha"));
    assert!(!table.contains("BETA"));
    assert_eq!(table.lookup("1BAD"), None);
}

#[test]
fn first_declaration_wins() {
    let mut table = SymbolTable::new();
    let _ = table.declare("BUFFER", 100, true).unwrap();
    match table.declare("buffer", 7, false).unwrap() {
        Declared::Existing(sym) => {
            assert_eq!(sym.value, 100);
            assert!(sym.multiply_defined);
        }
        other => panic!("{:?}", other),
    }
    let sym = table.lookup("BUFFER").unwrap();
    assert_eq!(sym.value, 100);
    assert!(sym.relocatable);
    assert!(sym.multiply_defined);
    assert_eq!(table.len(), 1);
}

#[test]
fn long_labels() {
    let mut table = SymbolTable::new();
    let _ = table.declare("ABCDEFGHIJKLMNOPQRSTU", 1, true).unwrap();
    let _ = table.declare("ABCDEFX", 2, true).unwrap();
    let _ = table.declare("ABCDEFY", 3, true).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.lookup("abcdefx").unwrap().value, 2);
    assert_eq!(table.lookup("ABCDEFY").unwrap().short_label(), "ABCDEF");
    assert_eq!(table.lookup("ABCDEFY").unwrap().label, "ABCDEFY");
}

#[test]
fn label_order() {
    let mut table = SymbolTable::new();
    for label in ["ZETA", "alpha", "Mid", "BETA"] {
        let _ = table.declare(label, 0, false).unwrap();
    }
    let labels: Vec<&str> = table.iter().map(|sym| sym.label.as_str()).collect();
    assert_eq!(labels, vec!["ALPHA", "BETA", "MID", "ZETA"]);
}

#[test]
fn assign() {
    let mut table = SymbolTable::new();
    let _ = table.declare("LEN", 30, true).unwrap();
    let sym = table.assign("len", 12, false).unwrap();
    assert_eq!(sym.value, 12);
    assert!(!sym.relocatable);
    assert_eq!(table.assign("NOPE", 1, false), None);
}

#[test]
fn normalize() {
    assert_eq!(normalize_label(" loop_1 ").unwrap(), "LOOP_1");
    assert!(normalize_label("A B").is_err());
}

#[test]
fn parse_entry() {
    let sym = Symbol::parse_entry("  100   buffer   t ").unwrap();
    assert_eq!(sym.label, "BUFFER");
    assert_eq!(sym.value, 100);
    assert!(sym.relocatable);

    let sym = Symbol::parse_entry("-7 LIMIT FALSE").unwrap();
    assert_eq!(sym.value, -7);
    assert!(!sym.relocatable);

    let sym = Symbol::parse_entry("+12 K 0").unwrap();
    assert_eq!(sym.value, 12);
}

#[test]
fn parse_entry_errors() {
    let field = |line: &str| match Symbol::parse_entry(line) {
        Err(Error::InvalidSymbolEntry { field, .. }) => field,
        other => panic!("`{}`: {:?}", line, other),
    };
    assert_eq!(field("100 BUFFER"), "entry");
    assert_eq!(field("100 BUFFER t extra"), "entry");
    assert_eq!(field("1O0 BUFFER t"), "value");
    assert_eq!(field("100 BUFFER maybe"), "rflag");
    assert_eq!(field("100 9BUFFER t"), "label");
}

#[test]
fn seed() {
    let mut table = SymbolTable::new();
    assert!(matches!(table.seed("100 BUFFER t"), Ok(Declared::Inserted(_))));
    assert!(matches!(table.seed("5 buffer f"), Ok(Declared::Existing(_))));
    assert!(table.seed("x BUFFER f").is_err());

    let sym = table.lookup("BUFFER").unwrap();
    assert_eq!(sym.value, 100);
    assert!(sym.multiply_defined);
}

#[test]
fn restore() {
    let mut table = SymbolTable::new();
    let _ = table.declare("FIRST", 3, true).unwrap();

    let before = table.lookup("first").cloned();
    let _ = table.declare("FIRST", 9, false).unwrap();
    assert!(table.lookup("FIRST").unwrap().multiply_defined);
    table.restore("first", before);
    assert!(!table.lookup("FIRST").unwrap().multiply_defined);

    let _ = table.declare("LEN", 10, false).unwrap();
    table.restore("LEN", None);
    assert!(!table.contains("LEN"));
    assert_eq!(table.len(), 1);
}
