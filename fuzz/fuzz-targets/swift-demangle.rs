#![no_main]

use std::io::{self, Sink, Write};
use swift_ast_demangle::swift::{Config, Demangler};
use test_utilities::BoundedWriter;

fn bounded_writer() -> BoundedWriter<Sink> {
    BoundedWriter::new(io::sink(), 65536)
}

fn fuzz_with(data: &str) {
    let demangler = Demangler::with_config(Config {
        max_depth: 128,
        ..Config::default()
    });

    if let Ok(symbol) = demangler.parse(data) {
        let mut sink = bounded_writer();

        let _ = write!(sink, "{symbol}");
        let _ = write!(sink, "{symbol:#}");
        let _ = symbol.dump();
        let _ = symbol.module_name();

        // A cache hit must return the same tree.
        assert_eq!(demangler.parse(data).ok(), Some(symbol));
    }

    let _ = demangler.parse_type(data);
}

libfuzzer_sys::fuzz_target!(|data: &str| {
    fuzz_with(data);
});
