//! # swift-ast-demangle
//!
//! Parses mangled Swift symbols into node trees that can be inspected and printed.
//!
//! Example:
//!
//! ```rust
//! use swift_ast_demangle::swift::{Demangler, DisplayOptions, NodeKind};
//!
//! let demangler = Demangler::new();
//!
//! let symbol = demangler
//!     .parse("$s5JetUI14LayoutTextViewPAAE22estimatedNumberOfLines4fromSiSo14JUMeasurementsV_tFTf4xn_n")
//!     .unwrap();
//!
//! // The default display format prints everything.
//! assert_eq!(
//!     symbol.to_string(),
//!     "function signature specialization <Arg[0] = Exploded> of (extension in JetUI):\
//!      JetUI.LayoutTextView.estimatedNumberOfLines(from: __C.JUMeasurements) -> Swift.Int"
//! );
//!
//! // The alternate format prints a short name.
//! assert_eq!(
//!     format!("{symbol:#}"),
//!     "specialized LayoutTextView.estimatedNumberOfLines(from:)"
//! );
//!
//! // Use `Node::display` and `DisplayOptions` to pick the printed details explicitly.
//!
//! let options = DisplayOptions {
//!     display_module_names: false,
//!     display_extension_contexts: false,
//!     ..DisplayOptions::full()
//! };
//!
//! assert_eq!(
//!     symbol.display(options).to_string(),
//!     "function signature specialization <Arg[0] = Exploded> of \
//!      LayoutTextView.estimatedNumberOfLines(from: JUMeasurements) -> Int"
//! );
//!
//! // You can walk the structure of the demangled symbol.
//!
//! let function = symbol.children().get(1).unwrap();
//!
//! assert_eq!(function.kind(), NodeKind::Function);
//! assert_eq!(function.children().get(1).unwrap().text().as_deref(), Some("estimatedNumberOfLines"));
//! assert_eq!(function.module_name().as_deref(), Some("JetUI"));
//! ```

pub mod swift;
