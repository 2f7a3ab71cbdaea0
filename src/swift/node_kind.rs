use std::fmt::{self, Display, Formatter};

const NONE: u8 = 0;
const CONTEXT: u8 = 1 << 0;
const DECL_NAME: u8 = 1 << 1;
const FUNCTION_ATTR: u8 = 1 << 2;
const REQUIREMENT: u8 = 1 << 3;
const TOP_LEVEL: u8 = 1 << 4;
const ANY_GENERIC: u8 = 1 << 5;
const NO_MANGLED_FORM: u8 = 1 << 6;

// Every kind carries a set of classification flags. The grammar uses them to decide which stack entries an operator
// may pop, and the facade uses them to decide whether a node has a textual mangled form.

macro_rules! node_kinds {
    ($($kind:ident => $flags:expr,)+) => {
        /// The grammar production that built a node.
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub enum NodeKind {
            $(
                #[expect(missing_docs, reason = "named after the production")]
                $kind,
            )+
        }

        impl NodeKind {
            /// All node kinds, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$kind,)+];

            /// The name of the kind, as printed by [`Node::dump`](crate::swift::Node::dump).
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$kind => stringify!($kind),)+
                }
            }

            const fn flags(self) -> u8 {
                match self {
                    $(Self::$kind => $flags,)+
                }
            }
        }
    };
}

node_kinds! {
    Global => NONE,
    Suffix => TOP_LEVEL,

    // Names.
    Module => CONTEXT,
    Identifier => DECL_NAME,
    LocalDeclName => DECL_NAME,
    PrivateDeclName => DECL_NAME,
    RelatedEntityDeclName => DECL_NAME,
    PrefixOperator => DECL_NAME,
    PostfixOperator => DECL_NAME,
    InfixOperator => DECL_NAME,
    Number => NONE,
    Index => NO_MANGLED_FORM,

    // Types.
    Type => NONE,
    TypeMangling => TOP_LEVEL,
    Structure => CONTEXT | ANY_GENERIC,
    Class => CONTEXT | ANY_GENERIC,
    Enum => CONTEXT | ANY_GENERIC,
    Protocol => CONTEXT | ANY_GENERIC,
    TypeAlias => CONTEXT | ANY_GENERIC,
    Extension => CONTEXT,
    BoundGenericStructure => TOP_LEVEL,
    BoundGenericClass => TOP_LEVEL,
    BoundGenericEnum => TOP_LEVEL,
    BoundGenericProtocol => TOP_LEVEL,
    BoundGenericTypeAlias => TOP_LEVEL,
    BoundGenericFunction => TOP_LEVEL,
    TypeList => NONE,
    Tuple => TOP_LEVEL,
    TupleElement => NONE,
    TupleElementName => NONE,
    FunctionType => TOP_LEVEL,
    ArgumentTuple => NONE,
    ReturnType => NONE,
    ThrowsAnnotation => NONE,
    AsyncAnnotation => NONE,
    ConcurrentFunctionType => NONE,
    LabelList => NONE,
    EmptyList => NONE,
    FirstElementMarker => NONE,
    VariadicMarker => NONE,
    Metatype => TOP_LEVEL,
    InOut => TOP_LEVEL,
    Shared => TOP_LEVEL,
    Owned => TOP_LEVEL,
    BuiltinTypeName => TOP_LEVEL,
    DependentGenericParamType => TOP_LEVEL,
    DependentGenericType => TOP_LEVEL,
    DependentGenericSignature => NONE,
    DependentGenericParamCount => NONE,
    DependentGenericConformanceRequirement => REQUIREMENT,
    DependentGenericSameTypeRequirement => REQUIREMENT,

    // Entities.
    Function => CONTEXT,
    Variable => CONTEXT,
    Subscript => CONTEXT,
    Allocator => CONTEXT,
    Constructor => CONTEXT,
    Deallocator => CONTEXT,
    Destructor => CONTEXT,
    ExplicitClosure => CONTEXT,
    ImplicitClosure => CONTEXT,
    DefaultArgumentInitializer => CONTEXT,
    Initializer => CONTEXT,
    Getter => CONTEXT,
    Setter => CONTEXT,
    ModifyAccessor => CONTEXT,
    ReadAccessor => CONTEXT,
    WillSet => CONTEXT,
    DidSet => CONTEXT,
    GlobalGetter => CONTEXT,
    MaterializeForSet => CONTEXT,
    UnsafeAddressor => CONTEXT,
    UnsafeMutableAddressor => CONTEXT,
    Static => CONTEXT,

    // Metadata and other global symbols.
    TypeMetadata => TOP_LEVEL,
    TypeMetadataAccessFunction => TOP_LEVEL,
    FullTypeMetadata => TOP_LEVEL,
    NominalTypeDescriptor => TOP_LEVEL,
    ProtocolDescriptor => TOP_LEVEL,
    Metaclass => TOP_LEVEL,
    ValueWitnessTable => TOP_LEVEL,
    MethodDescriptor => TOP_LEVEL,
    DispatchThunk => TOP_LEVEL,

    // Function attributes, thunks and specializations.
    ObjCAttribute => FUNCTION_ATTR,
    NonObjCAttribute => FUNCTION_ATTR,
    DynamicAttribute => FUNCTION_ATTR,
    DirectMethodReferenceAttribute => FUNCTION_ATTR,
    PartialApplyForwarder => FUNCTION_ATTR,
    PartialApplyObjCForwarder => FUNCTION_ATTR,
    MergedFunction => FUNCTION_ATTR,
    GenericSpecialization => FUNCTION_ATTR,
    GenericSpecializationNotReAbstracted => FUNCTION_ATTR,
    GenericSpecializationParam => NO_MANGLED_FORM,
    FunctionSignatureSpecialization => FUNCTION_ATTR,
    FunctionSignatureSpecializationParam => NONE,
    FunctionSignatureSpecializationReturn => NONE,
    FunctionSignatureSpecializationParamKind => NO_MANGLED_FORM,
    FunctionSignatureSpecializationParamPayload => NO_MANGLED_FORM,
    SpecializationPassID => NONE,
    IsSerialized => NONE,
    MetatypeParamsRemoved => NONE,
}

impl NodeKind {
    const fn has(self, flag: u8) -> bool {
        self.flags() & flag != 0
    }

    /// Whether nodes of this kind can act as the declaration context of another entity.
    #[must_use]
    pub const fn is_context(self) -> bool {
        self.has(CONTEXT)
    }

    /// Whether nodes of this kind name a declaration.
    #[must_use]
    pub const fn is_decl_name(self) -> bool {
        self.has(DECL_NAME)
    }

    /// Whether nodes of this kind are thunks, attributes or specializations wrapping the symbol's entity.
    #[must_use]
    pub const fn is_function_attr(self) -> bool {
        self.has(FUNCTION_ATTR)
    }

    /// Whether nodes of this kind are nominal type declarations.
    #[must_use]
    pub const fn is_any_generic(self) -> bool {
        self.has(ANY_GENERIC)
    }

    pub(crate) const fn is_requirement(self) -> bool {
        self.has(REQUIREMENT)
    }

    pub(crate) const fn is_entity(self) -> bool {
        matches!(self, Self::Type) || self.is_context()
    }

    /// Nodes that may appear as direct children of the `Global` root.
    pub(crate) const fn is_top_level(self) -> bool {
        self.has(TOP_LEVEL | CONTEXT | FUNCTION_ATTR)
    }

    /// Pure structural markers whose mangled form is defined to be empty.
    #[must_use]
    pub const fn has_mangled_form(self) -> bool {
        !self.has(NO_MANGLED_FORM)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
