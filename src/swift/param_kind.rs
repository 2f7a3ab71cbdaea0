//! Values carried by `FunctionSignatureSpecializationParamKind` nodes. The low values are exclusive kinds, the high
//! bits form an option set.

pub(crate) const CONSTANT_PROP_FUNCTION: u64 = 0;
pub(crate) const CONSTANT_PROP_GLOBAL: u64 = 1;
pub(crate) const CONSTANT_PROP_INTEGER: u64 = 2;
pub(crate) const CONSTANT_PROP_FLOAT: u64 = 3;
pub(crate) const CONSTANT_PROP_STRING: u64 = 4;
pub(crate) const CLOSURE_PROP: u64 = 5;
pub(crate) const BOX_TO_VALUE: u64 = 6;
pub(crate) const BOX_TO_STACK: u64 = 7;
pub(crate) const IN_OUT_TO_OUT: u64 = 8;
pub(crate) const CONSTANT_PROP_KEY_PATH: u64 = 9;

pub(crate) const DEAD: u64 = 1 << 6;
pub(crate) const OWNED_TO_GUARANTEED: u64 = 1 << 7;
pub(crate) const SROA: u64 = 1 << 8;
pub(crate) const GUARANTEED_TO_OWNED: u64 = 1 << 9;
pub(crate) const EXISTENTIAL_TO_GENERIC: u64 = 1 << 10;

/// Whether a parameter of this kind is followed by a payload popped from the node stack.
pub(crate) const fn takes_popped_payload(raw: u64) -> bool {
    matches!(
        raw,
        CONSTANT_PROP_FUNCTION | CONSTANT_PROP_GLOBAL | CONSTANT_PROP_STRING | CONSTANT_PROP_KEY_PATH | CLOSURE_PROP
    )
}

/// Option flags in print order.
pub(crate) const OPTION_NAMES: [(u64, &str); 5] = [
    (EXISTENTIAL_TO_GENERIC, "Existential To Protocol Constrained Generic"),
    (DEAD, "Dead"),
    (OWNED_TO_GUARANTEED, "Owned To Guaranteed"),
    (GUARANTEED_TO_OWNED, "Guaranteed To Owned"),
    (SROA, "Exploded"),
];

pub(crate) const fn kind_name(raw: u64) -> Option<&'static str> {
    Some(match raw {
        CONSTANT_PROP_FUNCTION => "Constant Propagated Function",
        CONSTANT_PROP_GLOBAL => "Constant Propagated Global",
        CONSTANT_PROP_INTEGER => "Constant Propagated Integer",
        CONSTANT_PROP_FLOAT => "Constant Propagated Float",
        CONSTANT_PROP_STRING => "Constant Propagated String",
        CLOSURE_PROP => "Closure Propagated",
        BOX_TO_VALUE => "Value Promoted from Box",
        BOX_TO_STACK => "Stack Promoted from Box",
        IN_OUT_TO_OUT => "InOut Converted to Out",
        CONSTANT_PROP_KEY_PATH => "Constant Propagated KeyPath",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_takes_popped_payload() {
        assert!(super::takes_popped_payload(super::CLOSURE_PROP));
        assert!(super::takes_popped_payload(super::CONSTANT_PROP_STRING));
        assert!(!super::takes_popped_payload(super::CONSTANT_PROP_INTEGER));
        assert!(!super::takes_popped_payload(super::SROA));
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(super::kind_name(super::BOX_TO_STACK), Some("Stack Promoted from Box"));
        assert_eq!(super::kind_name(super::DEAD), None);
    }
}
