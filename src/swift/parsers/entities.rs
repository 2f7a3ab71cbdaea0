use super::{ParseResult, Parser};
use crate::swift::node_kind::NodeKind;
use crate::swift::store::NodeId;

/// Operands an `f` entity pops besides its context.
enum EntityArgs {
    None,
    Index,
    TypeAndIndex,
    TypeAndMaybePrivateName,
}

impl Parser<'_, '_> {
    fn pop_module(&mut self) -> Option<NodeId> {
        if let Some(identifier) = self.pop_kind(NodeKind::Identifier) {
            return Some(self.change_kind(identifier, NodeKind::Module));
        }

        self.pop_kind(NodeKind::Module)
    }

    pub(super) fn pop_context(&mut self) -> ParseResult<NodeId> {
        if let Some(module) = self.pop_module() {
            return Ok(module);
        }

        if let Some(ty) = self.pop_kind(NodeKind::Type) {
            return match *self.store.children(ty) {
                [child] if self.store.kind(child).is_context() => Ok(child),
                _ => Err(self.expected("context")),
            };
        }

        self.require_if(NodeKind::is_context, "context")
    }

    pub(super) fn demangle_extension_context(&mut self) -> ParseResult<NodeId> {
        let signature = self.pop_kind(NodeKind::DependentGenericSignature);
        let module = self.pop_module().ok_or_else(|| self.expected("module"))?;
        let extended = self.pop_type_and_get_any_generic()?;
        let mut children = vec![module, extended];

        children.extend(signature);

        self.create(NodeKind::Extension, &children)
    }

    pub(super) fn demangle_plain_function(&mut self) -> ParseResult<NodeId> {
        let signature = self.pop_kind(NodeKind::DependentGenericSignature);
        let mut ty = self.pop_function_type()?;
        let labels = self.pop_function_param_labels(ty)?;

        if let Some(signature) = signature {
            let generic = self.create(NodeKind::DependentGenericType, &[signature, ty])?;

            ty = self.create_type(generic)?;
        }

        let name = self.require_if(NodeKind::is_decl_name, "function name")?;
        let context = self.pop_context()?;
        let mut children = vec![context, name];

        children.extend(labels);
        children.push(ty);

        self.create(NodeKind::Function, &children)
    }

    pub(super) fn demangle_variable(&mut self) -> ParseResult<NodeId> {
        let ty = self.require_kind(NodeKind::Type, "variable type")?;
        let labels = self.pop_function_param_labels(ty)?;
        let name = self.require_if(NodeKind::is_decl_name, "variable name")?;
        let context = self.pop_context()?;
        let mut children = vec![context, name];

        children.extend(labels);
        children.push(ty);

        let variable = self.create(NodeKind::Variable, &children)?;

        self.demangle_accessor(variable)
    }

    pub(super) fn demangle_subscript(&mut self) -> ParseResult<NodeId> {
        let private_name = self.pop_kind(NodeKind::PrivateDeclName);
        let ty = self.require_kind(NodeKind::Type, "subscript type")?;
        let labels = self.pop_function_param_labels(ty)?;
        let context = self.pop_context()?;
        let mut children = vec![context];

        children.extend(labels);
        children.push(ty);
        children.extend(private_name);

        let subscript = self.create(NodeKind::Subscript, &children)?;

        self.demangle_accessor(subscript)
    }

    fn demangle_accessor(&mut self, storage: NodeId) -> ParseResult<NodeId> {
        let kind = match self.next_char("accessor")? {
            b'm' => NodeKind::MaterializeForSet,
            b's' => NodeKind::Setter,
            b'g' => NodeKind::Getter,
            b'G' => NodeKind::GlobalGetter,
            b'w' => NodeKind::WillSet,
            b'W' => NodeKind::DidSet,
            b'r' => NodeKind::ReadAccessor,
            b'M' => NodeKind::ModifyAccessor,
            b'a' => {
                self.expect_addressor_kind()?;

                NodeKind::UnsafeMutableAddressor
            }
            b'l' => {
                self.expect_addressor_kind()?;

                NodeKind::UnsafeAddressor
            }
            b'p' => return Ok(storage),
            _ => return Err(self.expected("accessor")),
        };

        self.create(kind, &[storage])
    }

    fn expect_addressor_kind(&mut self) -> ParseResult<()> {
        if self.cursor.next_if(b'u') {
            Ok(())
        } else {
            Err(self.expected("addressor kind"))
        }
    }

    pub(super) fn demangle_function_entity(&mut self) -> ParseResult<NodeId> {
        let (kind, args) = match self.next_char("function entity")? {
            b'D' => (NodeKind::Deallocator, EntityArgs::None),
            b'd' => (NodeKind::Destructor, EntityArgs::None),
            b'i' => (NodeKind::Initializer, EntityArgs::None),
            b'C' => (NodeKind::Allocator, EntityArgs::TypeAndMaybePrivateName),
            b'c' => (NodeKind::Constructor, EntityArgs::TypeAndMaybePrivateName),
            b'U' => (NodeKind::ExplicitClosure, EntityArgs::TypeAndIndex),
            b'u' => (NodeKind::ImplicitClosure, EntityArgs::TypeAndIndex),
            b'A' => (NodeKind::DefaultArgumentInitializer, EntityArgs::Index),
            _ => return Err(self.expected("function entity")),
        };

        let mut operands = Vec::with_capacity(3);

        match args {
            EntityArgs::None => {}
            EntityArgs::Index => operands.push(self.demangle_index_as_node()?),
            EntityArgs::TypeAndIndex => {
                let index = self.demangle_index_as_node()?;
                let ty = self.require_kind(NodeKind::Type, "closure type")?;

                operands.extend([index, ty]);
            }
            EntityArgs::TypeAndMaybePrivateName => {
                let private_name = self.pop_kind(NodeKind::PrivateDeclName);
                let ty = self.require_kind(NodeKind::Type, "initializer type")?;

                operands.extend(self.pop_function_param_labels(ty)?);
                operands.push(ty);
                operands.extend(private_name);
            }
        }

        let context = self.pop_context()?;

        operands.insert(0, context);

        self.create(kind, &operands)
    }
}
