use super::{
    Config, DemangleError, Demangler, DisplayOptions, GeneralCategory, MAX_SUPPORTED_DEPTH, NodeKind, Payload,
    UnicodeProperties,
};

const JET_UI_SYMBOL: &str = "$s5JetUI14LayoutTextViewPAAE22estimatedNumberOfLines4fromSiSo14JUMeasurementsV_tFTf4xn_n";

#[test]
fn test_demangle_to_string() {
    let demangler = Demangler::new();

    assert_eq!(
        demangler.demangle_to_string(JET_UI_SYMBOL).as_deref(),
        Ok(concat!(
            "function signature specialization <Arg[0] = Exploded> of ",
            "(extension in JetUI):JetUI.LayoutTextView.estimatedNumberOfLines(from: __C.JUMeasurements) -> Swift.Int",
        )),
    );

    assert_eq!(
        demangler.demangle_simplified(JET_UI_SYMBOL).as_deref(),
        Ok("specialized LayoutTextView.estimatedNumberOfLines(from:)"),
    );

    // Standard library types are sugared, unlike `DisplayOptions::full`.
    assert_eq!(demangler.demangle_to_string("$sSaySiGD").as_deref(), Ok("[Swift.Int]"));
    assert_eq!(demangler.demangle_to_string("$sSiSgD").as_deref(), Ok("Swift.Int?"));
    assert_eq!(demangler.parse("$sSaySiGD").unwrap().to_string(), "Swift.Array<Swift.Int>");
}

#[test]
fn test_cache() {
    let demangler = Demangler::new();
    let first = demangler.parse("$s4main3fooyyF").unwrap();
    let second = demangler.parse("$s4main3fooyyF").unwrap();

    assert_eq!(first, second);
    assert_eq!(demangler.grammar_passes(), 1);

    // Symbols and bare types are cached separately.
    demangler.parse_type("Si").unwrap();
    demangler.parse_type("Si").unwrap();

    assert_eq!(demangler.grammar_passes(), 2);
}

#[test]
fn test_failures_are_not_cached() {
    let demangler = Demangler::new();

    assert_eq!(
        demangler.parse("").unwrap_err(),
        DemangleError::ParseFailure {
            offset: 0,
            expected: "Swift mangling prefix"
        }
    );

    assert_eq!(demangler.parse("$s4main3fooQ").unwrap_err().offset(), 11);
    assert_eq!(demangler.parse("$s4main3fooQ").unwrap_err().offset(), 11);
    assert_eq!(demangler.grammar_passes(), 3);

    // The session stays usable.
    assert_eq!(demangler.demangle_to_string("$sSiD").as_deref(), Ok("Swift.Int"));
}

#[test]
fn test_recursion_limit() {
    let demangler = Demangler::with_config(Config {
        max_depth: 4,
        ..Config::default()
    });

    assert!(matches!(
        demangler.parse("$sSaySaySiGGD"),
        Err(DemangleError::RecursionLimitExceeded { limit: 4, .. })
    ));
}

#[test]
fn test_max_depth_is_bounded() {
    let demangler = Demangler::with_config(Config {
        max_depth: 200_000,
        ..Config::default()
    });

    assert_eq!(demangler.config().max_depth, MAX_SUPPORTED_DEPTH);

    let too_deep = format!("$sSi{}D", "Sg".repeat(20_000));

    assert!(matches!(
        demangler.parse(&too_deep),
        Err(DemangleError::RecursionLimitExceeded {
            limit: MAX_SUPPORTED_DEPTH,
            ..
        })
    ));

    let nested = format!("$sSi{}D", "Sg".repeat(100));

    assert!(
        demangler
            .parse(&nested)
            .is_ok_and(|symbol| symbol.to_string().starts_with("Swift.Optional<Swift.Optional<"))
    );
}

#[test]
fn test_failures_release_storage() {
    let demangler = Demangler::new();

    demangler.parse("$sSiD").unwrap();

    let mark = demangler.session.borrow().store.mark();

    for i in 0..100 {
        let name = format!("name{i}");

        assert!(demangler.parse(&format!("$s4main{}{name}Q", name.len())).is_err());
    }

    assert_eq!(demangler.session.borrow().store.mark(), mark);
    assert_eq!(demangler.demangle_to_string("$s4main3fooyyF").as_deref(), Ok("main.foo() -> ()"));
}

#[test]
fn test_parse_type() {
    let demangler = Demangler::new();
    let ty = demangler.parse_type("SaySiG").unwrap();

    assert_eq!(ty.kind(), NodeKind::Type);
    assert_eq!(ty.to_string(), "Swift.Array<Swift.Int>");
    assert_eq!(format!("{ty:#}"), "[Int]");
    assert!(demangler.parse_type("SiSi").is_err());
    assert!(demangler.parse_type("$sSiD").is_err());
}

#[test]
fn test_payload() {
    let demangler = Demangler::new();
    let global = demangler.parse("$s4main3fooyyF").unwrap();
    let function = global.children().get(0).unwrap();
    let children = function.children();

    assert_eq!(function.kind(), NodeKind::Function);
    assert_eq!(children.len(), 3);
    assert_eq!(
        children.iter().map(|child| child.kind()).collect::<Vec<_>>(),
        [NodeKind::Module, NodeKind::Identifier, NodeKind::Type],
    );

    let module = children.get(0).unwrap();

    assert!(matches!(module.payload(), Payload::Text(text) if &*text == "main"));
    assert_eq!(module.text().as_deref(), Some("main"));
    assert_eq!(module.index(), None);
    assert!(module.children().is_empty());
    assert_eq!(function.payload(), Payload::Children(function.children()));
    assert!(children.get(3).is_none());

    let closure = demangler.parse("$s4main3fooyyFyycfU_").unwrap().children().get(0).unwrap();
    let number = closure.children().get(1).unwrap();

    assert_eq!(number.kind(), NodeKind::Number);
    assert_eq!(number.index(), Some(0));
    assert_eq!(number.payload(), Payload::Index(0));
}

#[test]
fn test_mangled() {
    let demangler = Demangler::new();
    let global = demangler.parse(JET_UI_SYMBOL).unwrap();
    let specialization = global.children().get(0).unwrap();
    let function = global.children().get(1).unwrap();

    assert_eq!(&*global.mangled(), JET_UI_SYMBOL);
    assert_eq!(&*function.mangled(), &JET_UI_SYMBOL[2..81]);
    assert_eq!(&*function.children().get(0).unwrap().mangled(), "5JetUI14LayoutTextViewPAAE");

    let param_kind = specialization.children().get(1).unwrap().children().get(0).unwrap();

    assert_eq!(param_kind.kind(), NodeKind::FunctionSignatureSpecializationParamKind);
    assert_eq!(&*param_kind.mangled(), "");
}

#[test]
fn test_dump() {
    let demangler = Demangler::new();

    assert_eq!(
        demangler.parse("$sSiD").unwrap().dump(),
        concat!(
            "kind=Global\n",
            "  kind=TypeMangling\n",
            "    kind=Type\n",
            "      kind=Structure\n",
            "        kind=Module, text=\"Swift\"\n",
            "        kind=Identifier, text=\"Int\"\n",
        ),
    );
}

#[test]
fn test_module_name() {
    #[track_caller]
    fn check(symbol: &str, expected: Option<&str>) {
        let demangler = Demangler::new();

        assert_eq!(demangler.parse(symbol).unwrap().module_name().as_deref(), expected);
    }

    check(JET_UI_SYMBOL, Some("JetUI"));
    check("$s4main3fooyyxlFSi_Tg5", Some("main"));
    check("$sSaySiGD", Some("Swift"));
    check("$s4main3fooyyFyycfU_", Some("main"));
    check("$sSiN", None);
}

#[test]
fn test_has_swift_calling_convention() {
    #[track_caller]
    fn check(symbol: &str, expected: bool) {
        let demangler = Demangler::new();

        assert_eq!(demangler.parse(symbol).unwrap().has_swift_calling_convention(), expected);
    }

    check("$s4main3fooyyF", true);
    check(JET_UI_SYMBOL, true);
    check("$s4main3FooC3baryyFTo", false);
    check("$sSiMa", false);

    assert!(!Demangler::new().parse_type("Si").unwrap().has_swift_calling_convention());
}

#[test]
fn test_display_options_from_config() {
    let demangler = Demangler::with_config(Config {
        display: DisplayOptions::simplified(),
        ..Config::default()
    });

    let symbol = demangler.parse("$s4main3fooyySiF").unwrap();

    assert_eq!(symbol.to_string(), "foo(_:)");
    assert_eq!(
        demangler.render(symbol, DisplayOptions::full()),
        "main.foo(Swift.Int) -> ()"
    );
    assert_eq!(symbol.display(DisplayOptions::full()).to_string(), "main.foo(Swift.Int) -> ()");
}

#[test]
fn test_unicode_properties() {
    struct EscapeEverything;

    impl UnicodeProperties for EscapeEverything {
        fn general_category(&self, _: char) -> GeneralCategory {
            GeneralCategory::Format
        }

        fn is_alphabetic(&self, _: char) -> bool {
            false
        }

        fn lowercase_mapping(&self, c: char) -> String {
            c.into()
        }
    }

    let demangler = Demangler::new().with_unicode_properties(EscapeEverything);

    assert_eq!(
        demangler.demangle_to_string("$sSiD.a").as_deref(),
        Ok(r#"Swift.Int with unmangled suffix "\u{2e}\u{61}""#),
    );
}

#[test]
fn test_handles() {
    let demangler = Demangler::new();
    let symbol = demangler.parse("$sSiD").unwrap();

    assert_eq!(demangler.node(symbol.handle()), symbol);
}

#[test]
#[should_panic(expected = "invalid node handle")]
fn test_foreign_handle() {
    let handle = Demangler::new().parse("$sSiD").unwrap().handle();
    let demangler = Demangler::new();

    demangler.parse("$sSiD").unwrap();

    let _ = demangler.node(handle);
}

#[test]
fn test_send() {
    fn assert_send<T: Send>() {}

    assert_send::<Demangler>();
}
