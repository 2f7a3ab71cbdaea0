use super::{ParseResult, Parser};
use crate::swift::node_kind::NodeKind;
use crate::swift::store::NodeId;
use std::borrow::Cow;

const MAX_BUILTIN_SIZE: u64 = 4096;

impl Parser<'_, '_> {
    pub(super) fn demangle_builtin_type(&mut self) -> ParseResult<NodeId> {
        let name: Cow<'static, str> = match self.next_char("builtin type")? {
            b'b' => "Builtin.BridgeObject".into(),
            b'B' => "Builtin.UnsafeValueBuffer".into(),
            b'c' => "Builtin.RawUnsafeContinuation".into(),
            b'D' => "Builtin.DefaultActorStorage".into(),
            b'e' => "Builtin.Executor".into(),
            b'f' => format!("Builtin.FPIEEE{}", self.demangle_builtin_size()?).into(),
            b'i' => format!("Builtin.Int{}", self.demangle_builtin_size()?).into(),
            b'I' => "Builtin.IntLiteral".into(),
            b'O' => "Builtin.UnknownObject".into(),
            b'o' => "Builtin.NativeObject".into(),
            b'p' => "Builtin.RawPointer".into(),
            b't' => "Builtin.SILToken".into(),
            b'w' => "Builtin.Word".into(),
            _ => return Err(self.expected("builtin type")),
        };

        let builtin = self.create_text(NodeKind::BuiltinTypeName, &name)?;

        self.create_type(builtin)
    }

    fn demangle_builtin_size(&mut self) -> ParseResult<u64> {
        self.demangle_index()?
            .checked_sub(1)
            .filter(|size| (1..=MAX_BUILTIN_SIZE).contains(size))
            .ok_or_else(|| self.expected("builtin type size"))
    }

    pub(super) fn demangle_any_generic_type(&mut self, kind: NodeKind) -> ParseResult<NodeId> {
        let name = self.require_if(NodeKind::is_decl_name, "type name")?;
        let context = self.pop_context()?;
        let nominal = self.create(kind, &[context, name])?;
        let ty = self.create_type(nominal)?;

        self.add_substitution(ty);

        Ok(ty)
    }

    pub(super) fn pop_type_and_get_child(&mut self) -> ParseResult<NodeId> {
        let ty = self.require_kind(NodeKind::Type, "type")?;

        self.store.first_child(ty).ok_or_else(|| self.expected("type"))
    }

    pub(super) fn pop_type_and_get_any_generic(&mut self) -> ParseResult<NodeId> {
        let child = self.pop_type_and_get_child()?;

        if self.store.kind(child).is_any_generic() {
            Ok(child)
        } else {
            Err(self.expected("nominal type"))
        }
    }

    pub(super) fn demangle_bound_generic_type(&mut self) -> ParseResult<NodeId> {
        // One argument list per generic nesting level, innermost first.
        let mut type_lists = Vec::new();

        loop {
            let mut list = Vec::new();

            while let Some(ty) = self.pop_kind(NodeKind::Type) {
                list.push(ty);
            }

            list.reverse();
            type_lists.push(list);

            if self.pop_kind(NodeKind::EmptyList).is_some() {
                break;
            }

            if self.pop_kind(NodeKind::FirstElementMarker).is_none() {
                return Err(self.expected("generic argument list"));
            }
        }

        let nominal = self.pop_type_and_get_any_generic()?;
        let bound = self.demangle_bound_generic_args(nominal, &type_lists, 0)?;
        let ty = self.create_type(bound)?;

        self.add_substitution(ty);

        Ok(ty)
    }

    fn demangle_bound_generic_args(
        &mut self,
        nominal: NodeId,
        type_lists: &[Vec<NodeId>],
        mut index: usize,
    ) -> ParseResult<NodeId> {
        let arguments = type_lists.get(index).ok_or_else(|| self.expected("generic arguments"))?;
        let kind = self.store.kind(nominal);
        let context = self.store.first_child(nominal).ok_or_else(|| self.expected("generic context"))?;

        let consumes_arguments = !matches!(
            kind,
            NodeKind::Variable | NodeKind::ExplicitClosure | NodeKind::ImplicitClosure | NodeKind::Subscript
        );

        if consumes_arguments {
            index += 1;
        }

        let mut nominal = nominal;

        // Arguments of the enclosing types follow.
        if index < type_lists.len() {
            let bound_parent = if self.store.kind(context) == NodeKind::Extension {
                let module = self.store.child(context, 0);
                let extended = self.store.child(context, 1).ok_or_else(|| self.expected("extension"))?;
                let signature = self.store.child(context, 2);
                let bound = self.nested(|parser| parser.demangle_bound_generic_args(extended, type_lists, index))?;
                let children = module.into_iter().chain([bound]).chain(signature).collect::<Vec<_>>();

                self.create(NodeKind::Extension, &children)?
            } else {
                self.nested(|parser| parser.demangle_bound_generic_args(context, type_lists, index))?
            };

            let mut children = vec![bound_parent];

            children.extend(self.store.children(nominal).iter().skip(1).copied());

            nominal = self.create(kind, &children)?;
        }

        if !consumes_arguments || arguments.is_empty() {
            return Ok(nominal);
        }

        let arguments = self.create(NodeKind::TypeList, arguments)?;

        let bound_kind = match kind {
            NodeKind::Class => NodeKind::BoundGenericClass,
            NodeKind::Structure => NodeKind::BoundGenericStructure,
            NodeKind::Enum => NodeKind::BoundGenericEnum,
            NodeKind::Protocol => NodeKind::BoundGenericProtocol,
            NodeKind::TypeAlias => NodeKind::BoundGenericTypeAlias,
            NodeKind::Function | NodeKind::Constructor => {
                return self.create(NodeKind::BoundGenericFunction, &[nominal, arguments]);
            }
            _ => return Err(self.expected("generic type")),
        };

        let ty = self.create_type(nominal)?;

        self.create(bound_kind, &[ty, arguments])
    }

    pub(super) fn pop_tuple(&mut self) -> ParseResult<NodeId> {
        let mut elements = Vec::new();

        if self.pop_kind(NodeKind::EmptyList).is_none() {
            loop {
                let is_first = self.pop_kind(NodeKind::FirstElementMarker).is_some();
                let mut children = Vec::with_capacity(3);

                children.extend(self.pop_kind(NodeKind::VariadicMarker));

                if let Some(label) = self.pop_kind(NodeKind::Identifier) {
                    children.push(self.change_kind(label, NodeKind::TupleElementName));
                }

                children.push(self.require_kind(NodeKind::Type, "tuple element type")?);
                elements.push(self.create(NodeKind::TupleElement, &children)?);

                if is_first {
                    break;
                }
            }

            elements.reverse();
        }

        let tuple = self.create(NodeKind::Tuple, &elements)?;

        self.create_type(tuple)
    }

    pub(super) fn pop_type_list(&mut self) -> ParseResult<Vec<NodeId>> {
        let mut types = Vec::new();

        if self.pop_kind(NodeKind::EmptyList).is_none() {
            loop {
                let is_first = self.pop_kind(NodeKind::FirstElementMarker).is_some();

                types.push(self.require_kind(NodeKind::Type, "type list element")?);

                if is_first {
                    break;
                }
            }

            types.reverse();
        }

        Ok(types)
    }

    pub(super) fn pop_function_type(&mut self) -> ParseResult<NodeId> {
        let mut children = Vec::with_capacity(5);

        children.extend(self.pop_kind(NodeKind::ThrowsAnnotation));
        children.extend(self.pop_kind(NodeKind::ConcurrentFunctionType));
        children.extend(self.pop_kind(NodeKind::AsyncAnnotation));
        children.push(self.pop_function_params(NodeKind::ArgumentTuple)?);
        children.push(self.pop_function_params(NodeKind::ReturnType)?);

        let function = self.create(NodeKind::FunctionType, &children)?;

        self.create_type(function)
    }

    fn pop_function_params(&mut self, kind: NodeKind) -> ParseResult<NodeId> {
        let params = if self.pop_kind(NodeKind::EmptyList).is_some() {
            let tuple = self.create(NodeKind::Tuple, &[])?;

            self.create_type(tuple)?
        } else {
            self.require_kind(NodeKind::Type, "function parameter type")?
        };

        self.create(kind, &[params])
    }

    /// Number of parameters of a function type, if `ty` is one.
    fn parameter_count(&self, ty: NodeId) -> Option<usize> {
        let store = &*self.store;

        if store.kind(ty) != NodeKind::Type {
            return None;
        }

        let mut function = store.first_child(ty)?;

        if store.kind(function) == NodeKind::DependentGenericType {
            function = store.first_child(store.child(function, 1)?)?;
        }

        if store.kind(function) != NodeKind::FunctionType {
            return None;
        }

        let arguments = store.child_of_kind(function, NodeKind::ArgumentTuple)?;
        let params = store.first_child(store.first_child(arguments)?)?;

        Some(if store.kind(params) == NodeKind::Tuple {
            store.children(params).len()
        } else {
            1
        })
    }

    /// Pops one argument label per parameter of `ty`. Labels are absent when `ty` takes no parameters.
    pub(super) fn pop_function_param_labels(&mut self, ty: NodeId) -> ParseResult<Option<NodeId>> {
        if self.pop_kind(NodeKind::EmptyList).is_some() {
            return self.create(NodeKind::LabelList, &[]).map(Some);
        }

        let count = match self.parameter_count(ty) {
            None | Some(0) => return Ok(None),
            Some(count) => count,
        };

        let mut labels = Vec::with_capacity(count);

        for _ in 0..count {
            labels.push(self.require_if(
                |kind| matches!(kind, NodeKind::Identifier | NodeKind::FirstElementMarker),
                "argument label",
            )?);
        }

        if labels
            .iter()
            .all(|&label| self.store.kind(label) == NodeKind::FirstElementMarker)
        {
            labels.clear();
        }

        labels.reverse();

        self.create(NodeKind::LabelList, &labels).map(Some)
    }

    pub(super) fn demangle_type_annotation(&mut self) -> ParseResult<NodeId> {
        match self.next_char("type annotation")? {
            b'a' => self.create(NodeKind::AsyncAnnotation, &[]),
            b'b' => self.create(NodeKind::ConcurrentFunctionType, &[]),
            _ => Err(self.expected("type annotation")),
        }
    }

    pub(super) fn create_generic_param_type(&mut self, depth: u64, index: u64) -> ParseResult<NodeId> {
        let depth = self.create_index(NodeKind::Index, depth)?;
        let index = self.create_index(NodeKind::Index, index)?;

        self.create(NodeKind::DependentGenericParamType, &[depth, index])
    }

    pub(super) fn demangle_generic_param_index(&mut self) -> ParseResult<NodeId> {
        if self.cursor.next_if(b'd') {
            let depth = self.demangle_index()?;
            let depth = depth.checked_add(1).ok_or_else(|| self.expected("generic parameter depth"))?;
            let index = self.demangle_index()?;

            return self.create_generic_param_type(depth, index);
        }

        if self.cursor.next_if(b'z') {
            return self.create_generic_param_type(0, 0);
        }

        let index = self.demangle_index()?;
        let index = index.checked_add(1).ok_or_else(|| self.expected("generic parameter index"))?;

        self.create_generic_param_type(0, index)
    }

    pub(super) fn demangle_generic_signature(&mut self, has_param_counts: bool) -> ParseResult<NodeId> {
        let mut children = Vec::new();

        if has_param_counts {
            while !self.cursor.next_if(b'l') {
                let count = if self.cursor.next_if(b'z') {
                    0
                } else {
                    let count = self.demangle_index()?;

                    count.checked_add(1).ok_or_else(|| self.expected("generic parameter count"))?
                };

                children.push(self.create_index(NodeKind::DependentGenericParamCount, count)?);
            }
        } else {
            children.push(self.create_index(NodeKind::DependentGenericParamCount, 1)?);
        }

        let param_counts = children.len();

        while let Some(requirement) = self.pop_if(NodeKind::is_requirement) {
            children.push(requirement);
        }

        children[param_counts..].reverse();

        self.create(NodeKind::DependentGenericSignature, &children)
    }

    pub(super) fn demangle_generic_requirement(&mut self) -> ParseResult<NodeId> {
        let requirement = match self.next_char("generic requirement")? {
            b'b' => NodeKind::DependentGenericConformanceRequirement,
            b's' => NodeKind::DependentGenericSameTypeRequirement,
            _ => {
                self.cursor.push_back();

                let param = self.demangle_generic_param_index()?;
                let subject = self.create_type(param)?;
                let protocol = self.pop_protocol()?;

                return self.create(NodeKind::DependentGenericConformanceRequirement, &[subject, protocol]);
            }
        };

        let param = self.demangle_generic_param_index()?;
        let subject = self.create_type(param)?;
        let constraint = self.require_kind(NodeKind::Type, "requirement type")?;

        self.create(requirement, &[subject, constraint])
    }

    pub(super) fn pop_protocol(&mut self) -> ParseResult<NodeId> {
        if let Some(ty) = self.pop_kind(NodeKind::Type) {
            return if self
                .store
                .first_child(ty)
                .is_some_and(|child| self.store.kind(child) == NodeKind::Protocol)
            {
                Ok(ty)
            } else {
                Err(self.expected("protocol"))
            };
        }

        let name = self.require_if(NodeKind::is_decl_name, "protocol name")?;
        let context = self.pop_context()?;
        let protocol = self.create(NodeKind::Protocol, &[context, name])?;

        self.create_type(protocol)
    }
}
