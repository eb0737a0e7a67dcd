use arch::Catalog;
use sicasm::{map::SymbolMap, pass1::LineResolver};

#[test]
fn map() {
    let catalog = Catalog::sicxe();
    let pass1 = LineResolver::new(&catalog).run([
        "COPY  START 100",
        "FIRST LDA   =C'EOF'",
        "FIVE  EQU   5",
        "      END   FIRST",
    ]);
    assert!(pass1.is_complete());

    let mut map = SymbolMap::new();
    map.add("copy.asm", &pass1);

    let program = &map.programs["copy.asm"];
    assert_eq!(program.start, 100);
    assert_eq!(program.length, 3);
    assert_eq!(program.symbols["FIRST"].value, 100);
    assert!(program.symbols["FIRST"].relocatable);
    assert!(!program.symbols["FIVE"].relocatable);
    assert_eq!(program.literals[0].hex, "454F46");
    assert_eq!(program.literals[0].address, 1);

    let yaml = map.to_yaml().unwrap();
    println!("{}", yaml);
    let parsed: SymbolMap = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed.programs["copy.asm"].symbols.len(), 3);
}
