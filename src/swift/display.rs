//! Pretty printing demangled Swift symbols.

use crate::swift::node_kind::NodeKind;
use crate::swift::param_kind;
use crate::swift::store::{NodeId, NodeStore};
use crate::swift::unicode::UnicodeProperties;
use crate::swift::{CLANG_IMPORTER_MODULE, OBJC_MODULE, STDLIB_MODULE};
use std::fmt::{self, Display, Formatter, Write};

const MAX_PRINTED_GENERIC_PARAMS: u64 = 128;
const GENERIC_PARAM_LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Switches selecting which details of a symbol are printed.
#[expect(clippy::struct_excessive_bools, reason = "every field is an independent switch")]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DisplayOptions {
    /// Print `T?`, `[T]` and `[K : V]` instead of the standard library type names.
    pub synthesize_sugar_on_types: bool,
    /// Prefix entities with their declaration contexts.
    pub qualify_entities: bool,
    /// Print `(extension in M):` before members of extensions.
    pub display_extension_contexts: bool,
    /// Print the unmangled suffix of a symbol.
    pub display_unmangled_suffix: bool,
    /// Print module names.
    pub display_module_names: bool,
    /// Print the parameters of specializations instead of a `specialized` prefix.
    pub display_generic_specializations: bool,
    /// Print the requirements of generic signatures.
    pub display_where_clauses: bool,
    /// Print the types of variables and subscripts.
    pub display_entity_types: bool,
    /// Print the parameter and result types of functions.
    pub display_argument_types: bool,
    /// Print the file discriminators of private declarations.
    pub display_private_discriminators: bool,
    /// Print the contexts of local declarations after their names.
    pub display_local_name_contexts: bool,
    /// Qualify declarations of the standard library with `Swift`.
    pub display_stdlib_module: bool,
    /// Qualify imported Objective-C declarations with `__C`.
    pub display_objc_module: bool,
    /// Print `partial apply` instead of `partial apply forwarder`.
    pub shorten_partial_apply: bool,
    /// Omit the description of thunks such as merged functions.
    pub shorten_thunk: bool,
}

impl DisplayOptions {
    /// Prints everything, without type sugar.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            synthesize_sugar_on_types: false,
            qualify_entities: true,
            display_extension_contexts: true,
            display_unmangled_suffix: true,
            display_module_names: true,
            display_generic_specializations: true,
            display_where_clauses: true,
            display_entity_types: true,
            display_argument_types: true,
            display_private_discriminators: true,
            display_local_name_contexts: true,
            display_stdlib_module: true,
            display_objc_module: true,
            shorten_partial_apply: false,
            shorten_thunk: false,
        }
    }

    /// Short names for user interfaces: no modules, no types and a `specialized` prefix for specializations.
    #[must_use]
    pub const fn simplified() -> Self {
        Self {
            synthesize_sugar_on_types: true,
            qualify_entities: true,
            display_extension_contexts: false,
            display_unmangled_suffix: false,
            display_module_names: false,
            display_generic_specializations: false,
            display_where_clauses: false,
            display_entity_types: false,
            display_argument_types: false,
            display_private_discriminators: false,
            display_local_name_contexts: true,
            display_stdlib_module: true,
            display_objc_module: true,
            shorten_partial_apply: true,
            shorten_thunk: true,
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self::full()
    }
}

pub(crate) fn display_fn(f: impl Fn(&mut Formatter) -> fmt::Result) -> impl Display {
    struct Wrapper<F>(F);

    impl<F: Fn(&mut Formatter) -> fmt::Result> Display for Wrapper<F> {
        fn fmt(&self, f: &mut Formatter) -> fmt::Result {
            self.0(f)
        }
    }

    Wrapper(f)
}

fn display_generic_param_name(depth: u64, index: u64) -> impl Display {
    display_fn(move |f| {
        let mut index = index;

        loop {
            let letter = usize::try_from(index % 26).unwrap_or_default();

            f.write_str(&GENERIC_PARAM_LETTERS[letter..=letter])?;

            index /= 26;

            if index == 0 {
                break;
            }
        }

        if depth == 0 { Ok(()) } else { write!(f, "{depth}") }
    })
}

/// Renders the tree rooted at `node`.
pub(crate) fn write_node(
    output: impl Write,
    store: &NodeStore,
    node: NodeId,
    options: DisplayOptions,
    unicode: &dyn UnicodeProperties,
) -> fmt::Result {
    Printer {
        output,
        written: 0,
        store,
        options,
        unicode,
        specialization_prefix_printed: false,
    }
    .print(node)
}

#[derive(Clone, Copy, Eq, PartialEq)]
enum TypePrinting {
    NoType,
    WithColon,
    FunctionStyle,
}

/// How an entity is named and typed.
#[derive(Clone, Copy)]
struct EntityStyle {
    type_printing: TypePrinting,
    has_name: bool,
    extra_name: &'static str,
    extra_index: Option<u64>,
    overwrite_name: Option<&'static str>,
}

impl EntityStyle {
    const fn new(type_printing: TypePrinting, has_name: bool) -> Self {
        Self {
            type_printing,
            has_name,
            extra_name: "",
            extra_index: None,
            overwrite_name: None,
        }
    }

    const fn extra_name(self, extra_name: &'static str) -> Self {
        Self { extra_name, ..self }
    }

    const fn extra_index(self, extra_index: u64) -> Self {
        Self {
            extra_index: Some(extra_index),
            ..self
        }
    }

    const fn overwrite_name(self, overwrite_name: &'static str) -> Self {
        Self {
            overwrite_name: Some(overwrite_name),
            ..self
        }
    }
}

enum Sugar {
    None,
    Optional,
    Array,
    Dictionary,
}

fn is_simple_type(store: &NodeStore, node: NodeId) -> bool {
    match store.kind(node) {
        NodeKind::Type => store.first_child(node).is_some_and(|child| is_simple_type(store, child)),
        NodeKind::BoundGenericClass
        | NodeKind::BoundGenericEnum
        | NodeKind::BoundGenericProtocol
        | NodeKind::BoundGenericStructure
        | NodeKind::BoundGenericTypeAlias
        | NodeKind::BuiltinTypeName
        | NodeKind::Class
        | NodeKind::DependentGenericParamType
        | NodeKind::Enum
        | NodeKind::Identifier
        | NodeKind::Metatype
        | NodeKind::Module
        | NodeKind::Protocol
        | NodeKind::Structure
        | NodeKind::Tuple
        | NodeKind::TypeAlias => true,
        _ => false,
    }
}

fn needs_space_before_type(store: &NodeStore, node: NodeId) -> bool {
    match store.kind(node) {
        NodeKind::Type => store
            .first_child(node)
            .is_none_or(|child| needs_space_before_type(store, child)),
        NodeKind::FunctionType | NodeKind::DependentGenericType => false,
        _ => true,
    }
}

fn find_sugar(store: &NodeStore, node: NodeId) -> Sugar {
    let (Some(nominal), Some(arguments)) = (
        store.first_child(node).and_then(|ty| store.first_child(ty)),
        store.child(node, 1),
    ) else {
        return Sugar::None;
    };

    let is_swift_type = |name: &str| {
        store
            .first_child(nominal)
            .is_some_and(|module| store.kind(module) == NodeKind::Module && store.text(module) == Some(STDLIB_MODULE))
            && store
                .child(nominal, 1)
                .is_some_and(|identifier| store.text(identifier) == Some(name))
    };

    match (store.kind(node), store.children(arguments).len()) {
        (NodeKind::BoundGenericEnum, 1) if is_swift_type("Optional") => Sugar::Optional,
        (NodeKind::BoundGenericStructure, 1) if is_swift_type("Array") => Sugar::Array,
        (NodeKind::BoundGenericStructure, 2) if is_swift_type("Dictionary") => Sugar::Dictionary,
        _ => Sugar::None,
    }
}

struct Printer<'a, W> {
    output: W,
    written: usize,
    store: &'a NodeStore,
    options: DisplayOptions,
    unicode: &'a dyn UnicodeProperties,
    specialization_prefix_printed: bool,
}

impl<W: Write> Write for Printer<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.written += s.len();

        self.output.write_str(s)
    }
}

/// Printing a node may defer its context, which is then printed after the entity that contains it.
type PrintResult = Result<Option<NodeId>, fmt::Error>;

impl<'a, W: Write> Printer<'a, W> {
    fn text(&self, node: NodeId) -> &'a str {
        self.store.text(node).unwrap_or_default()
    }

    fn index(&self, node: NodeId) -> u64 {
        self.store.index(node).unwrap_or_default()
    }

    fn children(&self, node: NodeId) -> &'a [NodeId] {
        self.store.children(node)
    }

    fn print(&mut self, node: NodeId) -> fmt::Result {
        self.print_node(node, false).map(drop)
    }

    fn print_children(&mut self, node: NodeId, separator: &str) -> fmt::Result {
        for (i, &child) in self.children(node).iter().enumerate() {
            if i != 0 {
                self.write_str(separator)?;
            }

            self.print(child)?;
        }

        Ok(())
    }

    fn print_first_child(&mut self, node: NodeId) -> fmt::Result {
        match self.store.first_child(node) {
            Some(child) => self.print(child),
            None => Ok(()),
        }
    }

    fn print_with_prefix(&mut self, prefix: &str, node: NodeId) -> fmt::Result {
        self.write_str(prefix)?;
        self.print_first_child(node)
    }

    fn print_with_parens(&mut self, node: NodeId) -> fmt::Result {
        if is_simple_type(self.store, node) {
            self.print(node)
        } else {
            self.write_char('(')?;
            self.print(node)?;
            self.write_char(')')
        }
    }

    fn print_quoted(&mut self, text: &str) -> fmt::Result {
        self.write_char('"')?;

        for c in text.chars() {
            match c {
                '\\' => self.write_str("\\\\")?,
                '\t' => self.write_str("\\t")?,
                '\n' => self.write_str("\\n")?,
                '\r' => self.write_str("\\r")?,
                '"' => self.write_str("\\\"")?,
                '\0' => self.write_str("\\0")?,
                _ if self.unicode.general_category(c).is_invisible() => write!(self, "\\u{{{:x}}}", u32::from(c))?,
                _ => self.write_char(c)?,
            }
        }

        self.write_char('"')
    }

    #[expect(clippy::too_many_lines, reason = "one arm per node kind")]
    fn print_node(&mut self, node: NodeId, as_prefix_context: bool) -> PrintResult {
        let store = self.store;

        match store.kind(node) {
            NodeKind::Global => self.print_children(node, "")?,
            NodeKind::Suffix => {
                if self.options.display_unmangled_suffix {
                    self.write_str(" with unmangled suffix ")?;
                    self.print_quoted(self.text(node))?;
                }
            }

            // Names.
            NodeKind::Module => {
                if self.options.display_module_names {
                    self.write_str(self.text(node))?;
                }
            }
            NodeKind::Identifier | NodeKind::BuiltinTypeName | NodeKind::FunctionSignatureSpecializationParamPayload => {
                self.write_str(self.text(node))?;
            }
            NodeKind::LocalDeclName => {
                if let Some(name) = store.child(node, 1) {
                    self.print(name)?;
                }

                if self.options.display_local_name_contexts {
                    let discriminator = store.first_child(node).map_or(0, |number| self.index(number));

                    write!(self, " #{}", discriminator.saturating_add(1))?;
                }
            }
            NodeKind::PrivateDeclName => {
                let discriminator = store.first_child(node).map_or("", |identifier| self.text(identifier));
                let show_discriminator = self.options.display_private_discriminators;

                if let Some(name) = store.child(node, 1) {
                    if show_discriminator {
                        self.write_char('(')?;
                    }

                    self.print(name)?;

                    if show_discriminator {
                        write!(self, " in {discriminator})")?;
                    }
                } else if show_discriminator {
                    write!(self, "(in {discriminator})")?;
                }
            }
            NodeKind::RelatedEntityDeclName => {
                let related_kind = store.first_child(node).map_or("", |identifier| self.text(identifier));

                write!(self, "related decl '{related_kind}' for ")?;

                if let Some(name) = store.child(node, 1) {
                    self.print(name)?;
                }
            }
            NodeKind::PrefixOperator => write!(self, "{} prefix", self.text(node))?,
            NodeKind::PostfixOperator => write!(self, "{} postfix", self.text(node))?,
            NodeKind::InfixOperator => write!(self, "{} infix", self.text(node))?,
            NodeKind::Number
            | NodeKind::Index
            | NodeKind::DependentGenericParamCount
            | NodeKind::SpecializationPassID => write!(self, "{}", self.index(node))?,

            // Types.
            NodeKind::Type | NodeKind::TypeMangling | NodeKind::GenericSpecializationParam => {
                self.print_first_child(node)?;
            }
            NodeKind::Structure | NodeKind::Class | NodeKind::Enum | NodeKind::Protocol | NodeKind::TypeAlias => {
                return self.print_entity(node, as_prefix_context, EntityStyle::new(TypePrinting::NoType, true));
            }
            NodeKind::Extension => {
                if self.options.qualify_entities && self.options.display_extension_contexts {
                    self.write_str("(extension in ")?;

                    if let Some(module) = store.first_child(node) {
                        self.print_node(module, true)?;
                    }

                    self.write_str("):")?;
                }

                if let Some(extended) = store.child(node, 1) {
                    self.print(extended)?;
                }

                if let Some(signature) = store.child(node, 2) {
                    self.print(signature)?;
                }
            }
            NodeKind::BoundGenericStructure
            | NodeKind::BoundGenericClass
            | NodeKind::BoundGenericEnum
            | NodeKind::BoundGenericProtocol
            | NodeKind::BoundGenericTypeAlias => self.print_bound_generic(node)?,
            NodeKind::TypeList => self.print_children(node, ", ")?,
            NodeKind::Tuple => {
                self.write_char('(')?;
                self.print_children(node, ", ")?;
                self.write_char(')')?;
            }
            NodeKind::TupleElement => {
                if let Some(label) = store.child_of_kind(node, NodeKind::TupleElementName) {
                    self.print(label)?;
                }

                if let Some(ty) = store.child_of_kind(node, NodeKind::Type) {
                    self.print(ty)?;
                }

                if store.child_of_kind(node, NodeKind::VariadicMarker).is_some() {
                    self.write_str("...")?;
                }
            }
            NodeKind::TupleElementName => write!(self, "{}: ", self.text(node))?,
            NodeKind::FunctionType => self.print_function_type(None, node)?,
            NodeKind::ArgumentTuple => {
                self.print_function_parameters(None, node, self.options.display_argument_types)?;
            }
            NodeKind::ReturnType => {
                self.write_str(" -> ")?;
                self.print_children(node, "")?;
            }
            NodeKind::ThrowsAnnotation => self.write_str(" throws")?,
            NodeKind::AsyncAnnotation => self.write_str(" async")?,
            NodeKind::ConcurrentFunctionType => self.write_str("@Sendable ")?,
            NodeKind::LabelList | NodeKind::MetatypeParamsRemoved => {}
            NodeKind::EmptyList => self.write_str(" empty-list ")?,
            NodeKind::FirstElementMarker => self.write_str(" first-element-marker ")?,
            NodeKind::VariadicMarker => self.write_str(" variadic-marker ")?,
            NodeKind::Metatype => {
                if let Some(instance) = store.first_child(node).and_then(|ty| store.first_child(ty)) {
                    self.print_with_parens(instance)?;

                    if store.kind(instance) == NodeKind::Protocol {
                        self.write_str(".Protocol")?;
                    } else {
                        self.write_str(".Type")?;
                    }
                }
            }
            NodeKind::InOut => self.print_with_prefix("inout ", node)?,
            NodeKind::Shared => self.print_with_prefix("__shared ", node)?,
            NodeKind::Owned => self.print_with_prefix("__owned ", node)?,
            NodeKind::DependentGenericParamType => {
                let depth = store.first_child(node).map_or(0, |depth| self.index(depth));
                let index = store.child(node, 1).map_or(0, |index| self.index(index));

                write!(self, "{}", display_generic_param_name(depth, index))?;
            }
            NodeKind::DependentGenericType => {
                if let Some(signature) = store.first_child(node) {
                    self.print(signature)?;
                }

                if let Some(ty) = store.child(node, 1) {
                    if needs_space_before_type(store, ty) {
                        self.write_char(' ')?;
                    }

                    self.print(ty)?;
                }
            }
            NodeKind::DependentGenericSignature => self.print_generic_signature(node)?,
            NodeKind::DependentGenericConformanceRequirement => self.print_requirement(node, ": ")?,
            NodeKind::DependentGenericSameTypeRequirement => self.print_requirement(node, " == ")?,

            // Entities.
            NodeKind::Function | NodeKind::BoundGenericFunction => {
                return self.print_entity(node, as_prefix_context, EntityStyle::new(TypePrinting::FunctionStyle, true));
            }
            NodeKind::Variable => {
                return self.print_entity(node, as_prefix_context, EntityStyle::new(TypePrinting::WithColon, true));
            }
            NodeKind::Subscript => {
                let style = EntityStyle::new(TypePrinting::FunctionStyle, false).overwrite_name("subscript");

                return self.print_entity(node, as_prefix_context, style);
            }
            NodeKind::Allocator => {
                let name = if self.has_class_context(node) {
                    "__allocating_init"
                } else {
                    "init"
                };

                let style = EntityStyle::new(TypePrinting::FunctionStyle, false).extra_name(name);

                return self.print_entity(node, as_prefix_context, style);
            }
            NodeKind::Constructor => {
                let has_name = store.children(node).len() > 2;
                let style = EntityStyle::new(TypePrinting::FunctionStyle, has_name).extra_name("init");

                return self.print_entity(node, as_prefix_context, style);
            }
            NodeKind::Deallocator => {
                let name = if self.has_class_context(node) {
                    "__deallocating_deinit"
                } else {
                    "deinit"
                };

                let style = EntityStyle::new(TypePrinting::NoType, false).extra_name(name);

                return self.print_entity(node, as_prefix_context, style);
            }
            NodeKind::Destructor => {
                let style = EntityStyle::new(TypePrinting::NoType, false).extra_name("deinit");

                return self.print_entity(node, as_prefix_context, style);
            }
            NodeKind::Initializer => {
                let style = EntityStyle::new(TypePrinting::NoType, false).extra_name("variable initialization expression");

                return self.print_entity(node, as_prefix_context, style);
            }
            NodeKind::DefaultArgumentInitializer => {
                let index = store.child(node, 1).map_or(0, |number| self.index(number));
                let style = EntityStyle::new(TypePrinting::NoType, false)
                    .extra_name("default argument ")
                    .extra_index(index);

                return self.print_entity(node, as_prefix_context, style);
            }
            NodeKind::ExplicitClosure | NodeKind::ImplicitClosure => {
                let index = store.child(node, 1).map_or(0, |number| self.index(number));

                let type_printing = if self.options.display_argument_types {
                    TypePrinting::FunctionStyle
                } else {
                    TypePrinting::NoType
                };

                let name = if store.kind(node) == NodeKind::ExplicitClosure {
                    "closure #"
                } else {
                    "implicit closure #"
                };

                let style = EntityStyle::new(type_printing, false)
                    .extra_name(name)
                    .extra_index(index.saturating_add(1));

                return self.print_entity(node, as_prefix_context, style);
            }
            NodeKind::Getter => return self.print_accessor(node, as_prefix_context, "getter"),
            NodeKind::Setter => return self.print_accessor(node, as_prefix_context, "setter"),
            NodeKind::ModifyAccessor => return self.print_accessor(node, as_prefix_context, "modify"),
            NodeKind::ReadAccessor => return self.print_accessor(node, as_prefix_context, "read"),
            NodeKind::WillSet => return self.print_accessor(node, as_prefix_context, "willset"),
            NodeKind::DidSet => return self.print_accessor(node, as_prefix_context, "didset"),
            NodeKind::GlobalGetter => return self.print_accessor(node, as_prefix_context, "getter"),
            NodeKind::MaterializeForSet => return self.print_accessor(node, as_prefix_context, "materializeForSet"),
            NodeKind::UnsafeAddressor => return self.print_accessor(node, as_prefix_context, "unsafeAddressor"),
            NodeKind::UnsafeMutableAddressor => {
                return self.print_accessor(node, as_prefix_context, "unsafeMutableAddressor");
            }
            NodeKind::Static => self.print_with_prefix("static ", node)?,

            // Metadata.
            NodeKind::TypeMetadata => self.print_with_prefix("type metadata for ", node)?,
            NodeKind::TypeMetadataAccessFunction => self.print_with_prefix("type metadata accessor for ", node)?,
            NodeKind::FullTypeMetadata => self.print_with_prefix("full type metadata for ", node)?,
            NodeKind::NominalTypeDescriptor => self.print_with_prefix("nominal type descriptor for ", node)?,
            NodeKind::ProtocolDescriptor => self.print_with_prefix("protocol descriptor for ", node)?,
            NodeKind::Metaclass => self.print_with_prefix("metaclass for ", node)?,
            NodeKind::ValueWitnessTable => self.print_with_prefix("value witness table for ", node)?,
            NodeKind::MethodDescriptor => self.print_with_prefix("method descriptor for ", node)?,
            NodeKind::DispatchThunk => self.print_with_prefix("dispatch thunk of ", node)?,

            // Thunks and specializations.
            NodeKind::ObjCAttribute => self.write_str("@objc ")?,
            NodeKind::NonObjCAttribute => self.write_str("@nonobjc ")?,
            NodeKind::DynamicAttribute => self.write_str("dynamic ")?,
            NodeKind::DirectMethodReferenceAttribute => self.write_str("super ")?,
            NodeKind::MergedFunction => {
                if !self.options.shorten_thunk {
                    self.write_str("merged ")?;
                }
            }
            NodeKind::PartialApplyForwarder | NodeKind::PartialApplyObjCForwarder => {
                if self.options.shorten_partial_apply {
                    self.write_str("partial apply")?;
                } else if store.kind(node) == NodeKind::PartialApplyForwarder {
                    self.write_str("partial apply forwarder")?;
                } else {
                    self.write_str("partial apply ObjC forwarder")?;
                }

                if !store.children(node).is_empty() {
                    self.write_str(" for ")?;
                    self.print_children(node, "")?;
                }
            }
            NodeKind::GenericSpecialization => self.print_specialization_prefix(node, "generic specialization")?,
            NodeKind::GenericSpecializationNotReAbstracted => {
                self.print_specialization_prefix(node, "generic not re-abstracted specialization")?;
            }
            NodeKind::FunctionSignatureSpecialization => {
                self.print_specialization_prefix(node, "function signature specialization")?;
            }
            NodeKind::FunctionSignatureSpecializationParam | NodeKind::FunctionSignatureSpecializationReturn => {
                self.print_specialization_param(node)?;
            }
            NodeKind::FunctionSignatureSpecializationParamKind => self.print_param_kind(node)?,
            NodeKind::IsSerialized => self.write_str("serialized")?,
        }

        Ok(None)
    }

    fn should_print_context(&self, context: NodeId) -> bool {
        if !self.options.qualify_entities {
            return false;
        }

        if self.store.kind(context) == NodeKind::Module {
            match self.text(context) {
                STDLIB_MODULE => return self.options.display_stdlib_module,
                OBJC_MODULE | CLANG_IMPORTER_MODULE => return self.options.display_objc_module,
                _ => {}
            }
        }

        true
    }

    fn has_class_context(&self, entity: NodeId) -> bool {
        self.store
            .first_child(entity)
            .is_some_and(|context| self.store.kind(context) == NodeKind::Class)
    }

    fn print_entity(&mut self, entity: NodeId, as_prefix_context: bool, style: EntityStyle) -> PrintResult {
        let store = self.store;

        let (entity, generic_arguments) = if store.kind(entity) == NodeKind::BoundGenericFunction {
            match store.first_child(entity) {
                Some(function) => (function, store.child(entity, 1)),
                None => return Ok(None),
            }
        } else {
            (entity, None)
        };

        let mut extra_name = style.extra_name;
        let mut extra_index = style.extra_index;

        let is_local_name = style.has_name
            && store
                .child(entity, 1)
                .is_some_and(|name| store.kind(name) == NodeKind::LocalDeclName);

        // A name with spaces reads badly after a dotted context, so the context goes after the name instead.
        let is_multi_word_name =
            extra_name.contains(' ') || (is_local_name && self.options.display_local_name_contexts);

        let mut type_printing = style.type_printing;

        if as_prefix_context && (type_printing != TypePrinting::NoType || is_multi_word_name) {
            return Ok(Some(entity));
        }

        let mut postfix_context = None;

        if let Some(context) = store.first_child(entity) {
            if self.should_print_context(context) {
                if is_multi_word_name {
                    postfix_context = Some(context);
                } else {
                    let position = self.written;

                    postfix_context = self.print_node(context, true)?;

                    if self.written != position {
                        self.write_char('.')?;
                    }
                }
            }
        }

        if style.has_name || style.overwrite_name.is_some() {
            if !extra_name.is_empty() && is_multi_word_name {
                self.write_str(extra_name)?;

                if let Some(index) = extra_index {
                    write!(self, "{index}")?;
                }

                self.write_str(" of ")?;

                extra_name = "";
                extra_index = None;
            }

            let position = self.written;

            if let Some(name) = style.overwrite_name {
                self.write_str(name)?;
            } else {
                if let Some(name) = store.child(entity, 1) {
                    if store.kind(name) != NodeKind::PrivateDeclName {
                        self.print(name)?;
                    }
                }

                if let Some(private_name) = store.child_of_kind(entity, NodeKind::PrivateDeclName) {
                    self.print(private_name)?;
                }
            }

            if self.written != position && !extra_name.is_empty() {
                self.write_char('.')?;
            }
        }

        if !extra_name.is_empty() {
            self.write_str(extra_name)?;

            if let Some(index) = extra_index {
                write!(self, "{index}")?;
            }
        }

        if type_printing != TypePrinting::NoType {
            let Some(ty) = store
                .child_of_kind(entity, NodeKind::Type)
                .and_then(|ty| store.first_child(ty))
            else {
                return Ok(postfix_context);
            };

            if type_printing == TypePrinting::FunctionStyle {
                let mut function = Some(ty);

                while let Some(generic) = function.filter(|&node| store.kind(node) == NodeKind::DependentGenericType) {
                    function = store.child(generic, 1).and_then(|ty| store.first_child(ty));
                }

                if function.is_none_or(|function| store.kind(function) != NodeKind::FunctionType) {
                    type_printing = TypePrinting::WithColon;
                }
            }

            if type_printing == TypePrinting::WithColon {
                if self.options.display_entity_types {
                    self.write_str(" : ")?;
                    self.print_entity_type(entity, ty, generic_arguments)?;
                }
            } else {
                if is_multi_word_name || needs_space_before_type(store, ty) {
                    self.write_char(' ')?;
                }

                self.print_entity_type(entity, ty, generic_arguments)?;
            }
        }

        if !as_prefix_context && (!is_local_name || self.options.display_local_name_contexts) {
            if let Some(context) = postfix_context.take() {
                if matches!(
                    store.kind(entity),
                    NodeKind::DefaultArgumentInitializer | NodeKind::Initializer
                ) {
                    self.write_str(" of ")?;
                } else {
                    self.write_str(" in ")?;
                }

                self.print(context)?;
            }
        }

        Ok(postfix_context)
    }

    fn print_accessor(&mut self, accessor: NodeId, as_prefix_context: bool, name: &'static str) -> PrintResult {
        let Some(storage) = self.store.first_child(accessor) else {
            return Ok(None);
        };

        let style = match self.store.kind(storage) {
            NodeKind::Variable => EntityStyle::new(TypePrinting::WithColon, true).extra_name(name),
            NodeKind::Subscript => EntityStyle::new(TypePrinting::WithColon, false)
                .extra_name(name)
                .overwrite_name("subscript"),
            _ => return self.print_node(storage, as_prefix_context),
        };

        self.print_entity(storage, as_prefix_context, style)
    }

    fn print_entity_type(&mut self, entity: NodeId, ty: NodeId, generic_arguments: Option<NodeId>) -> fmt::Result {
        let store = self.store;
        let labels = store.child_of_kind(entity, NodeKind::LabelList);

        if labels.is_none() && generic_arguments.is_none() {
            return self.print(ty);
        }

        if let Some(arguments) = generic_arguments {
            self.write_char('<')?;
            self.print_children(arguments, ", ")?;
            self.write_char('>')?;
        }

        let mut ty = ty;

        if store.kind(ty) == NodeKind::DependentGenericType {
            if generic_arguments.is_none() {
                if let Some(signature) = store.first_child(ty) {
                    self.print(signature)?;
                }
            }

            if let Some(dependent) = store.child(ty, 1) {
                if needs_space_before_type(store, dependent) {
                    self.write_char(' ')?;
                }

                if let Some(inner) = store.first_child(dependent) {
                    ty = inner;
                }
            }
        }

        if store.kind(ty) == NodeKind::FunctionType {
            self.print_function_type(labels, ty)
        } else {
            self.print(ty)
        }
    }

    fn print_function_type(&mut self, labels: Option<NodeId>, function: NodeId) -> fmt::Result {
        let store = self.store;
        let mut children = self.children(function);
        let mut take_annotation = |kind| match children.split_first() {
            Some((&first, rest)) if store.kind(first) == kind => {
                children = rest;

                true
            }
            _ => false,
        };

        let is_throwing = take_annotation(NodeKind::ThrowsAnnotation);
        let is_sendable = take_annotation(NodeKind::ConcurrentFunctionType);
        let is_async = take_annotation(NodeKind::AsyncAnnotation);

        if is_sendable {
            self.write_str("@Sendable ")?;
        }

        let &[arguments, return_type] = children else {
            return Ok(());
        };

        let show_types = self.options.display_argument_types;

        self.print_function_parameters(labels, arguments, show_types)?;

        if !show_types {
            return Ok(());
        }

        if is_async {
            self.write_str(" async")?;
        }

        if is_throwing {
            self.write_str(" throws")?;
        }

        self.print(return_type)
    }

    fn print_function_parameters(&mut self, labels: Option<NodeId>, arguments: NodeId, show_types: bool) -> fmt::Result {
        let store = self.store;

        let Some(params) = store.first_child(arguments).and_then(|ty| store.first_child(ty)) else {
            return Ok(());
        };

        if store.kind(params) != NodeKind::Tuple {
            return if show_types {
                self.write_char('(')?;
                self.print(params)?;
                self.write_char(')')
            } else {
                self.write_str("(_:)")
            };
        }

        let labels = labels.map_or(&[][..], |labels| store.children(labels));

        self.write_char('(')?;

        for (i, &param) in store.children(params).iter().enumerate() {
            if i != 0 && show_types {
                self.write_str(", ")?;
            }

            if labels.is_empty() {
                if !show_types {
                    match store.child_of_kind(param, NodeKind::TupleElementName) {
                        Some(name) => write!(self, "{}:", self.text(name))?,
                        None => self.write_str("_:")?,
                    }
                }
            } else {
                let label = labels
                    .get(i)
                    .filter(|&&label| store.kind(label) == NodeKind::Identifier)
                    .map_or("_", |&label| self.text(label));

                write!(self, "{label}:")?;

                if show_types {
                    self.write_char(' ')?;
                }
            }

            if show_types {
                self.print(param)?;
            }
        }

        self.write_char(')')
    }

    fn print_bound_generic(&mut self, node: NodeId) -> fmt::Result {
        let store = self.store;

        let &[base, arguments] = self.children(node) else {
            return Ok(());
        };

        let sugar = if self.options.synthesize_sugar_on_types {
            match store.kind(node) {
                NodeKind::BoundGenericClass => Sugar::None,
                NodeKind::BoundGenericProtocol => {
                    self.print_children(arguments, ", ")?;
                    self.write_str(" as ")?;

                    return self.print(base);
                }
                _ => find_sugar(store, node),
            }
        } else {
            Sugar::None
        };

        match sugar {
            Sugar::None => {
                self.print(base)?;
                self.write_char('<')?;
                self.print_children(arguments, ", ")?;
                self.write_char('>')
            }
            Sugar::Optional => {
                if let Some(wrapped) = store.first_child(arguments) {
                    self.print_with_parens(wrapped)?;
                }

                self.write_char('?')
            }
            Sugar::Array => {
                self.write_char('[')?;
                self.print_first_child(arguments)?;
                self.write_char(']')
            }
            Sugar::Dictionary => {
                self.write_char('[')?;
                self.print_children(arguments, " : ")?;
                self.write_char(']')
            }
        }
    }

    fn print_generic_signature(&mut self, node: NodeId) -> fmt::Result {
        let store = self.store;
        let children = self.children(node);

        let param_counts = children
            .iter()
            .take_while(|&&child| store.kind(child) == NodeKind::DependentGenericParamCount)
            .count();

        let (counts, requirements) = children.split_at(param_counts);

        self.write_char('<')?;

        for (depth, &count) in (0_u64..).zip(counts) {
            if depth != 0 {
                self.write_str("><")?;
            }

            for index in 0..self.index(count) {
                if index != 0 {
                    self.write_str(", ")?;
                }

                if index >= MAX_PRINTED_GENERIC_PARAMS {
                    self.write_str("...")?;

                    break;
                }

                write!(self, "{}", display_generic_param_name(depth, index))?;
            }
        }

        if !requirements.is_empty() && self.options.display_where_clauses {
            self.write_str(" where ")?;

            for (i, &requirement) in requirements.iter().enumerate() {
                if i != 0 {
                    self.write_str(", ")?;
                }

                self.print(requirement)?;
            }
        }

        self.write_char('>')
    }

    fn print_requirement(&mut self, node: NodeId, relation: &str) -> fmt::Result {
        let &[subject, constraint] = self.children(node) else {
            return Ok(());
        };

        self.print(subject)?;
        self.write_str(relation)?;
        self.print(constraint)
    }

    fn print_specialization_prefix(&mut self, node: NodeId, description: &str) -> fmt::Result {
        if !self.options.display_generic_specializations {
            if !self.specialization_prefix_printed {
                self.specialization_prefix_printed = true;
                self.write_str("specialized ")?;
            }

            return Ok(());
        }

        let store = self.store;
        let mut separator = "";
        let mut arg_number = 0_u64;

        write!(self, "{description} <")?;

        for &child in self.children(node) {
            match store.kind(child) {
                NodeKind::SpecializationPassID | NodeKind::MetatypeParamsRemoved => {}
                NodeKind::IsSerialized => {
                    self.write_str(separator)?;
                    separator = ", ";
                    self.print(child)?;
                }
                kind => {
                    // Parameters without changes are skipped but still counted.
                    if !store.children(child).is_empty() {
                        self.write_str(separator)?;
                        separator = ", ";

                        match kind {
                            NodeKind::FunctionSignatureSpecializationParam => write!(self, "Arg[{arg_number}] = ")?,
                            NodeKind::FunctionSignatureSpecializationReturn => self.write_str("Return = ")?,
                            _ => {}
                        }

                        self.print(child)?;
                    }

                    arg_number += 1;
                }
            }
        }

        self.write_str("> of ")
    }

    fn print_specialization_param(&mut self, node: NodeId) -> fmt::Result {
        let store = self.store;
        let mut children = self.children(node).iter().copied().peekable();

        while let Some(kind) = children.next() {
            let raw_kind = self.index(kind);

            match raw_kind {
                param_kind::CONSTANT_PROP_FUNCTION
                | param_kind::CONSTANT_PROP_GLOBAL
                | param_kind::CONSTANT_PROP_INTEGER
                | param_kind::CONSTANT_PROP_FLOAT => {
                    self.write_char('[')?;
                    self.print(kind)?;
                    self.write_str(" : ")?;

                    if let Some(payload) = children.next() {
                        self.print(payload)?;
                    }

                    self.write_char(']')?;
                }
                param_kind::CONSTANT_PROP_STRING => {
                    self.write_char('[')?;
                    self.print(kind)?;
                    self.write_str(" : ")?;

                    if let Some(encoding) = children.next() {
                        self.print(encoding)?;
                    }

                    self.write_char('\'')?;

                    if let Some(text) = children.next() {
                        self.print(text)?;
                    }

                    self.write_str("']")?;
                }
                param_kind::CONSTANT_PROP_KEY_PATH | param_kind::CLOSURE_PROP => {
                    self.write_char('[')?;
                    self.print(kind)?;
                    self.write_str(" : ")?;

                    if let Some(payload) = children.next() {
                        self.print(payload)?;
                    }

                    let (open, separator, close) = if raw_kind == param_kind::CLOSURE_PROP {
                        (", Argument Types : [", ", ", "]]")
                    } else {
                        ("<", ",", ">]")
                    };

                    self.write_str(open)?;

                    let mut is_first = true;

                    while let Some(ty) = children.next_if(|&child| store.kind(child) == NodeKind::Type) {
                        if !is_first {
                            self.write_str(separator)?;
                        }

                        is_first = false;
                        self.print(ty)?;
                    }

                    self.write_str(close)?;
                }
                _ => self.print(kind)?,
            }
        }

        Ok(())
    }

    fn print_param_kind(&mut self, node: NodeId) -> fmt::Result {
        let raw_kind = self.index(node);
        let mut separator = "";

        for (flag, name) in param_kind::OPTION_NAMES {
            if raw_kind & flag != 0 {
                self.write_str(separator)?;
                self.write_str(name)?;

                separator = " and ";
            }
        }

        if separator.is_empty() {
            if let Some(name) = param_kind::kind_name(raw_kind) {
                self.write_str(name)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DisplayOptions;
    use crate::swift::parsers::Parser;
    use crate::swift::store::NodeStore;
    use crate::swift::unicode::StdUnicodeProperties;

    fn render(symbol: &str, options: DisplayOptions) -> String {
        let mut store = NodeStore::default();
        let node = Parser::new(symbol, &mut store, 768).parse_symbol().unwrap();
        let mut output = String::new();

        super::write_node(&mut output, &store, node, options, &StdUnicodeProperties).unwrap();

        output
    }

    #[track_caller]
    fn check(symbol: &str, full: &str, simplified: &str) {
        assert_eq!(render(symbol, DisplayOptions::full()), full);
        assert_eq!(render(symbol, DisplayOptions::simplified()), simplified);
    }

    #[test]
    fn test_display_generic_param_name() {
        #[track_caller]
        fn check(depth: u64, index: u64, expected: &str) {
            assert_eq!(super::display_generic_param_name(depth, index).to_string(), expected);
        }

        check(0, 0, "A");
        check(0, 25, "Z");
        check(0, 27, "BB");
        check(2, 1, "B2");
    }

    #[test]
    fn test_types() {
        check("$sSiD", "Swift.Int", "Int");
        check("$sBi64_D", "Builtin.Int64", "Builtin.Int64");
        check("$sSaySiGD", "Swift.Array<Swift.Int>", "[Int]");
        check("$sSiSgD", "Swift.Optional<Swift.Int>", "Int?");
        check("$sSDySSSiGD", "Swift.Dictionary<Swift.String, Swift.Int>", "[String : Int]");
        check("$sSimD", "Swift.Int.Type", "Int.Type");
        check("$sSi_S2itD", "(Swift.Int, Swift.Int, Swift.Int)", "(Int, Int, Int)");
        check(
            "$s4main3FooV3BarVySi_SSGD",
            "main.Foo<Swift.Int>.Bar<Swift.String>",
            "Foo<Int>.Bar<String>",
        );
        check("$s4main6FooBarV03BazC0VD", "main.FooBar.BazBar", "FooBar.BazBar");
        check("$s4main0010mnchen_DyaVD", "main.münchen", "münchen");
    }

    #[test]
    fn test_declaration_names() {
        check(
            "$s4main3Foo33_0123456789ABCDEF0123456789ABCDEFLLVD",
            "main.(Foo in _0123456789ABCDEF0123456789ABCDEF)",
            "Foo",
        );

        check("$s4main3fooyyF3BarL_VD", "Bar #1 in main.foo() -> ()", "Bar #1 in foo()");

        check(
            "$s4main2ppoiyS2i_SitF",
            "main.++ infix(Swift.Int, Swift.Int) -> Swift.Int",
            "++ infix(_:_:)",
        );
    }

    #[test]
    fn test_entities() {
        check("$s4main3FooVACycfC", "main.Foo.init() -> main.Foo", "Foo.init()");
        check("$s4main3fooSivg", "main.foo.getter : Swift.Int", "foo.getter");
        check("$s4main3fooyyF", "main.foo() -> ()", "foo()");
        check("$s4main3fooyySiF", "main.foo(Swift.Int) -> ()", "foo(_:)");
        check(
            "$s4main3fooyyxSQRzlF",
            "main.foo<A where A: Swift.Equatable>(A) -> ()",
            "foo<A>(_:)",
        );
        check(
            "$s4main3fooyyFyycfU_",
            "closure #1 () -> () in main.foo() -> ()",
            "closure #1 in foo()",
        );
        check(
            "$s4main3FooV3barSivgZ",
            "static main.Foo.bar.getter : Swift.Int",
            "static Foo.bar.getter",
        );
        check(
            "$s4main3FooVySSSicig",
            "main.Foo.subscript.getter : (Swift.Int) -> Swift.String",
            "Foo.subscript.getter",
        );
    }

    #[test]
    fn test_metadata_and_thunks() {
        check("$sSiN", "type metadata for Swift.Int", "type metadata for Int");
        check("$s4main3FooVMn", "nominal type descriptor for main.Foo", "nominal type descriptor for Foo");
        check("$sSQMp", "protocol descriptor for Swift.Equatable", "protocol descriptor for Equatable");
        check(
            "$s4main3fooyyFTA",
            "partial apply forwarder for main.foo() -> ()",
            "partial apply for foo()",
        );
        check("$s4main3FooC3baryyFTo", "@objc main.Foo.bar() -> ()", "@objc Foo.bar()");
        check(
            "$s4main3FooC3baryyFTj",
            "dispatch thunk of main.Foo.bar() -> ()",
            "dispatch thunk of Foo.bar()",
        );
        check("$s4main3fooyyFTM", "merged main.foo() -> ()", "foo()");
    }

    #[test]
    fn test_specializations() {
        check(
            "$s4main3fooyyxlFSi_Tg5",
            "generic specialization <Swift.Int> of main.foo<A>(A) -> ()",
            "specialized foo<A>(_:)",
        );

        check(
            "$s4main3fooyyxlFSi_Tgq5",
            "generic specialization <serialized, Swift.Int> of main.foo<A>(A) -> ()",
            "specialized foo<A>(_:)",
        );

        check(
            "$s5JetUI14LayoutTextViewPAAE22estimatedNumberOfLines4fromSiSo14JUMeasurementsV_tFTf4xn_n",
            concat!(
                "function signature specialization <Arg[0] = Exploded> of ",
                "(extension in JetUI):JetUI.LayoutTextView.estimatedNumberOfLines(from: __C.JUMeasurements) -> Swift.Int",
            ),
            "specialized LayoutTextView.estimatedNumberOfLines(from:)",
        );

        check(
            "$s4main3fooyySSF6_helloTf4psb_n",
            "function signature specialization <Arg[0] = [Constant Propagated String : u8'hello']> of main.foo(Swift.String) -> ()",
            "specialized foo(_:)",
        );

        check(
            "$s4main3fooyySiFTf4pi42_n",
            "function signature specialization <Arg[0] = [Constant Propagated Integer : 42]> of main.foo(Swift.Int) -> ()",
            "specialized foo(_:)",
        );

        check(
            "$s4main3fooyyF7closureSiTf4c_n",
            concat!(
                "function signature specialization <Arg[0] = [Closure Propagated : closure, Argument Types : [Swift.Int]]>",
                " of main.foo() -> ()",
            ),
            "specialized foo()",
        );

        check(
            "$s4main3fooSiyFTf4_x",
            "function signature specialization <Return = Exploded> of main.foo() -> Swift.Int",
            "specialized foo()",
        );

        check(
            "$s4main3fooyySiFTf4neDX_n",
            concat!(
                "function signature specialization <Arg[1] = Existential To Protocol Constrained Generic and Dead and ",
                "Exploded> of main.foo(Swift.Int) -> ()",
            ),
            "specialized foo(_:)",
        );
    }

    #[test]
    fn test_unmangled_suffix() {
        check("$sSiD.foo", r#"Swift.Int with unmangled suffix ".foo""#, "Int");
        check(
            "$sSiD.a\u{200b}\"\n",
            r#"Swift.Int with unmangled suffix ".a\u{200b}\"\n""#,
            "Int",
        );
    }

    #[test]
    fn test_options() {
        let options = DisplayOptions {
            display_module_names: false,
            display_argument_types: false,
            ..DisplayOptions::full()
        };

        assert_eq!(DisplayOptions::default(), DisplayOptions::full());
        assert_eq!(render("$s4main3fooyySiF", options), "foo(_:)");
    }
}
