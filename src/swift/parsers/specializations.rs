use super::{ParseResult, Parser};
use crate::swift::node_kind::NodeKind;
use crate::swift::param_kind;
use crate::swift::store::NodeId;

const MAX_SPECIALIZATION_PASS: u8 = 10;

/// A specialized parameter whose payload may still have to be popped from the node stack.
struct PendingParam {
    kind: NodeKind,
    raw_kind: Option<u64>,
    children: Vec<NodeId>,
}

impl Parser<'_, '_> {
    pub(super) fn demangle_metatype(&mut self) -> ParseResult<NodeId> {
        match self.next_char("metadata kind")? {
            b'a' => self.create_with_popped_type(NodeKind::TypeMetadataAccessFunction),
            b'f' => self.create_with_popped_type(NodeKind::FullTypeMetadata),
            b'm' => self.create_with_popped_type(NodeKind::Metaclass),
            b'n' => self.create_with_popped_type(NodeKind::NominalTypeDescriptor),
            b'p' => {
                let protocol = self.pop_protocol()?;

                self.create(NodeKind::ProtocolDescriptor, &[protocol])
            }
            _ => Err(self.expected("metadata kind")),
        }
    }

    pub(super) fn demangle_witness(&mut self) -> ParseResult<NodeId> {
        match self.next_char("witness kind")? {
            b'V' => self.create_with_popped_type(NodeKind::ValueWitnessTable),
            _ => Err(self.expected("witness kind")),
        }
    }

    pub(super) fn demangle_thunk_or_specialization(&mut self) -> ParseResult<NodeId> {
        let attribute = match self.next_char("thunk or specialization")? {
            b'A' => NodeKind::PartialApplyForwarder,
            b'a' => NodeKind::PartialApplyObjCForwarder,
            b'D' => NodeKind::DynamicAttribute,
            b'd' => NodeKind::DirectMethodReferenceAttribute,
            b'M' => NodeKind::MergedFunction,
            b'O' => NodeKind::NonObjCAttribute,
            b'o' => NodeKind::ObjCAttribute,
            b'j' => return self.create_with_popped_entity(NodeKind::DispatchThunk),
            b'q' => return self.create_with_popped_entity(NodeKind::MethodDescriptor),
            b'f' => return self.demangle_function_specialization(),
            b'g' => return self.demangle_generic_specialization(NodeKind::GenericSpecialization),
            b'G' => return self.demangle_generic_specialization(NodeKind::GenericSpecializationNotReAbstracted),
            _ => return Err(self.expected("thunk or specialization")),
        };

        self.create(attribute, &[])
    }

    fn create_with_popped_entity(&mut self, kind: NodeKind) -> ParseResult<NodeId> {
        let entity = self.require_if(NodeKind::is_entity, "entity")?;

        self.create(kind, &[entity])
    }

    fn demangle_spec_attributes(&mut self) -> ParseResult<Vec<NodeId>> {
        let mut attributes = Vec::new();

        if self.cursor.next_if(b'm') {
            attributes.push(self.create(NodeKind::MetatypeParamsRemoved, &[])?);
        }

        if self.cursor.next_if(b'q') {
            attributes.push(self.create(NodeKind::IsSerialized, &[])?);
        }

        let pass_id = self
            .cursor
            .next_byte()
            .and_then(|c| c.checked_sub(b'0'))
            .filter(|&pass_id| pass_id < MAX_SPECIALIZATION_PASS)
            .ok_or_else(|| self.expected("specialization pass"))?;

        attributes.push(self.create_index(NodeKind::SpecializationPassID, pass_id.into())?);

        Ok(attributes)
    }

    fn demangle_generic_specialization(&mut self, kind: NodeKind) -> ParseResult<NodeId> {
        let mut children = self.demangle_spec_attributes()?;

        for ty in self.pop_type_list()? {
            children.push(self.create(NodeKind::GenericSpecializationParam, &[ty])?);
        }

        self.create(kind, &children)
    }

    fn demangle_function_specialization(&mut self) -> ParseResult<NodeId> {
        let mut children = self.demangle_spec_attributes()?;
        let mut params = Vec::new();

        while !self.cursor.next_if(b'_') {
            params.push(self.demangle_spec_param(NodeKind::FunctionSignatureSpecializationParam)?);
        }

        if !self.cursor.next_if(b'n') {
            params.push(self.demangle_spec_param(NodeKind::FunctionSignatureSpecializationReturn)?);
        }

        // Payloads were pushed in parameter order, so the last parameter's payload is on top.
        for param in params.iter_mut().rev() {
            let Some(raw_kind) = param.raw_kind.filter(|&raw| param_kind::takes_popped_payload(raw)) else {
                continue;
            };

            let fixed_children = param.children.len();

            while let Some(ty) = self.pop_kind(NodeKind::Type) {
                if !matches!(raw_kind, param_kind::CLOSURE_PROP | param_kind::CONSTANT_PROP_KEY_PATH) {
                    return Err(self.expected("specialization payload"));
                }

                param.children.push(ty);
            }

            let name = self.require_kind(NodeKind::Identifier, "specialization payload")?;
            let text = self.store.text(name).unwrap_or_default();

            let text = if raw_kind == param_kind::CONSTANT_PROP_STRING {
                text.strip_prefix('_').unwrap_or(text)
            } else {
                text
            }
            .to_owned();

            param
                .children
                .push(self.create_text(NodeKind::FunctionSignatureSpecializationParamPayload, &text)?);
            param.children[fixed_children..].reverse();
        }

        for param in params {
            children.push(self.create(param.kind, &param.children)?);
        }

        self.create(NodeKind::FunctionSignatureSpecialization, &children)
    }

    fn demangle_spec_param(&mut self, kind: NodeKind) -> ParseResult<PendingParam> {
        let mut param = PendingParam {
            kind,
            raw_kind: None,
            children: Vec::with_capacity(2),
        };

        let raw_kind = match self.next_char("specialization parameter")? {
            b'n' => return Ok(param),
            b'c' => param_kind::CLOSURE_PROP,
            b'p' => match self.next_char("constant propagation kind")? {
                b'f' => param_kind::CONSTANT_PROP_FUNCTION,
                b'g' => param_kind::CONSTANT_PROP_GLOBAL,
                b'k' => param_kind::CONSTANT_PROP_KEY_PATH,
                b'i' => return self.finish_number_param(param, param_kind::CONSTANT_PROP_INTEGER),
                b'd' => return self.finish_number_param(param, param_kind::CONSTANT_PROP_FLOAT),
                b's' => {
                    let encoding = match self.next_char("string encoding")? {
                        b'b' => "u8",
                        b'w' => "u16",
                        b'c' => "objc",
                        _ => return Err(self.expected("string encoding")),
                    };

                    self.push_param_kind(&mut param, param_kind::CONSTANT_PROP_STRING)?;
                    param.children.push(
                        self.create_text(NodeKind::FunctionSignatureSpecializationParamPayload, encoding)?,
                    );

                    return Ok(param);
                }
                _ => return Err(self.expected("constant propagation kind")),
            },
            b'e' => {
                self.demangle_option_flags(param_kind::EXISTENTIAL_TO_GENERIC, &[
                    (b'D', param_kind::DEAD),
                    (b'G', param_kind::OWNED_TO_GUARANTEED),
                    (b'O', param_kind::GUARANTEED_TO_OWNED),
                    (b'X', param_kind::SROA),
                ])
            }
            b'd' => self.demangle_option_flags(param_kind::DEAD, &[
                (b'G', param_kind::OWNED_TO_GUARANTEED),
                (b'O', param_kind::GUARANTEED_TO_OWNED),
                (b'X', param_kind::SROA),
            ]),
            b'g' => self.demangle_option_flags(param_kind::OWNED_TO_GUARANTEED, &[(b'X', param_kind::SROA)]),
            b'o' => self.demangle_option_flags(param_kind::GUARANTEED_TO_OWNED, &[(b'X', param_kind::SROA)]),
            b'x' => param_kind::SROA,
            b'i' => param_kind::BOX_TO_VALUE,
            b's' => param_kind::BOX_TO_STACK,
            b'r' => param_kind::IN_OUT_TO_OUT,
            _ => return Err(self.expected("specialization parameter")),
        };

        self.push_param_kind(&mut param, raw_kind)?;

        Ok(param)
    }

    fn demangle_option_flags(&mut self, mut value: u64, flags: &[(u8, u64)]) -> u64 {
        for &(c, flag) in flags {
            if self.cursor.next_if(c) {
                value |= flag;
            }
        }

        value
    }

    fn push_param_kind(&mut self, param: &mut PendingParam, raw_kind: u64) -> ParseResult<()> {
        param
            .children
            .push(self.create_index(NodeKind::FunctionSignatureSpecializationParamKind, raw_kind)?);
        param.raw_kind = Some(raw_kind);

        Ok(())
    }

    fn finish_number_param(&mut self, mut param: PendingParam, raw_kind: u64) -> ParseResult<PendingParam> {
        self.push_param_kind(&mut param, raw_kind)?;

        let digits = self.cursor.take_digits();

        if digits.is_empty() {
            return Err(self.expected("digits"));
        }

        param
            .children
            .push(self.create_text(NodeKind::FunctionSignatureSpecializationParamPayload, digits)?);

        Ok(param)
    }
}
