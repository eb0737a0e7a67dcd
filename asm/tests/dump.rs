use arch::Catalog;
use sicasm::{
    dump::{fault_line, listing_line},
    pass1::{LineResolver, Policy},
};

fn plain(text: &str) -> String {
    let mut out = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[test]
fn columns_line_up() {
    let catalog = Catalog::sicxe();
    let pass1 = LineResolver::new(&catalog)
        .policy(Policy::Recover)
        .run(["FIRST LDA #0", "      LDA A+B+C", "      STL LATER"]);
    assert!(pass1.is_complete());

    let rows: Vec<String> = pass1
        .resolved()
        .map(listing_line)
        .chain(pass1.faults().map(fault_line))
        .map(|row| plain(&row))
        .collect();
    for row in &rows {
        println!("{}", row);
        assert_eq!(row.find('|'), Some(16), "{}", row);
    }
    assert!(rows.iter().any(|row| row.contains("unresolved")));
}
