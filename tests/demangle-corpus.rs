use std::fmt::Write;
use swift_ast_demangle::swift::{Demangler, Node};
use test_utilities::BoundedWriter;

const TEST_DATA: &str = include_str!("demangle-corpus-data.txt");

fn render_both<'a>(symbol: Node<'_>, buffer: &'a mut String) -> Option<(&'a str, &'a str)> {
    let mut writer = BoundedWriter::new(buffer, 65536);

    write!(writer, "{symbol}").ok()?;

    let split = writer.inner().len();

    write!(writer, "{symbol:#}").ok()?;

    Some(writer.into_inner().split_at(split))
}

#[test]
fn test_corpus() {
    let demangler = Demangler::new();
    let mut buffer = String::new();

    for entry in test_utilities::corpus_entries(TEST_DATA) {
        let symbol = demangler
            .parse(entry.symbol)
            .unwrap_or_else(|error| panic!("line {}: {error}", entry.line));

        buffer.clear();

        assert_eq!(
            render_both(symbol, &mut buffer),
            Some((entry.full, entry.simplified)),
            "line {}",
            entry.line,
        );
    }
}

#[test]
fn test_corpus_is_cached() {
    let demangler = Demangler::new();
    let entries = test_utilities::corpus_entries(TEST_DATA).collect::<Vec<_>>();

    for entry in &entries {
        demangler.parse(entry.symbol).unwrap();
    }

    let passes = demangler.grammar_passes();

    for entry in &entries {
        assert_eq!(demangler.demangle_simplified(entry.symbol).as_deref(), Ok(entry.simplified));
    }

    assert_eq!(demangler.grammar_passes(), passes);
}

#[test]
fn test_truncated_symbols_fail() {
    // Dropping the last three bytes of these symbols leaves another complete symbol.
    const COMPLETE_PREFIXES: &[&str] = &["$sSi", "$sSiD.", "$s4main6FooBarV03BazC", "$s4main3fooyyFyyc"];

    let demangler = Demangler::new();
    let entries = test_utilities::corpus_entries(TEST_DATA).collect::<Vec<_>>();

    for entry in &entries {
        for end in 0..entry.symbol.len() {
            let Some(prefix) = entry.symbol.get(..end) else {
                continue;
            };

            // Some prefixes of a symbol are complete symbols themselves.
            if let Err(error) = demangler.parse(prefix) {
                assert!(error.offset() <= prefix.len(), "{prefix}: {error}");
            }
        }

        let Some(prefix) = entry.symbol.len().checked_sub(3).and_then(|end| entry.symbol.get(..end)) else {
            continue;
        };

        if COMPLETE_PREFIXES.contains(&prefix) || entries.iter().any(|other| other.symbol == prefix) {
            continue;
        }

        assert!(demangler.parse(prefix).is_err(), "{prefix}");
    }
}

#[test]
fn test_bounded_output() {
    let demangler = Demangler::new();
    let symbol = demangler.parse("$s4main3FooV3BarVySi_SSGD").unwrap();
    let mut writer = BoundedWriter::new(String::new(), 8);

    assert!(write!(writer, "{symbol}").is_err());
    assert!(writer.into_inner().len() <= 8);
}
