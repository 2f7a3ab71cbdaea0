use super::{ParseResult, Parser};
use crate::swift::node_kind::NodeKind;
use crate::swift::store::NodeId;
use crate::swift::{CLANG_IMPORTER_MODULE, OBJC_MODULE, STDLIB_MODULE};
use std::borrow::Cow;

const MAX_WORDS: usize = 26;
const MAX_REPEAT_COUNT: u64 = 2048;

// Indexed by `letter - 'a'`, a space marks an invalid letter.
const OPERATOR_CHARS: &[u8; 26] = b"& @/= >    <*!|+?%-~   ^ .";

const STANDARD_STRUCTURES: [(u8, &str); 23] = [
    (b'a', "Array"),
    (b'b', "Bool"),
    (b'D', "Dictionary"),
    (b'd', "Double"),
    (b'f', "Float"),
    (b'h', "Set"),
    (b'I', "DefaultIndices"),
    (b'i', "Int"),
    (b'J', "Character"),
    (b'N', "ClosedRange"),
    (b'n', "Range"),
    (b'O', "ObjectIdentifier"),
    (b'P', "UnsafePointer"),
    (b'p', "UnsafeMutablePointer"),
    (b'R', "UnsafeBufferPointer"),
    (b'r', "UnsafeMutableBufferPointer"),
    (b'S', "String"),
    (b's', "Substring"),
    (b'u', "UInt"),
    (b'V', "UnsafeRawPointer"),
    (b'v', "UnsafeMutableRawPointer"),
    (b'W', "UnsafeRawBufferPointer"),
    (b'w', "UnsafeMutableRawBufferPointer"),
];

const STANDARD_PROTOCOLS: [(u8, &str); 23] = [
    (b'Q', "Equatable"),
    (b'H', "Hashable"),
    (b'L', "Comparable"),
    (b'T', "Sequence"),
    (b'l', "Collection"),
    (b'K', "BidirectionalCollection"),
    (b'k', "RandomAccessCollection"),
    (b'M', "MutableCollection"),
    (b'm', "RangeReplaceableCollection"),
    (b'j', "Numeric"),
    (b'Z', "SignedInteger"),
    (b'z', "BinaryInteger"),
    (b'U', "UnsignedInteger"),
    (b'E', "Encodable"),
    (b'e', "Decodable"),
    (b'F', "FloatingPoint"),
    (b'B', "BinaryFloatingPoint"),
    (b't', "IteratorProtocol"),
    (b'y', "StringProtocol"),
    (b'Y', "RawRepresentable"),
    (b'X', "RangeExpression"),
    (b'x', "Strideable"),
    (b'G', "RandomNumberGenerator"),
];

fn lookup(table: &[(u8, &'static str)], c: u8) -> Option<&'static str> {
    table.iter().find(|&&(key, _)| key == c).map(|&(_, name)| name)
}

const fn is_word_start(c: u8) -> bool {
    !c.is_ascii_digit() && c != b'_' && c != 0
}

const fn is_word_end(c: u8, previous: u8) -> bool {
    c == b'_' || c == 0 || (!previous.is_ascii_uppercase() && c.is_ascii_uppercase())
}

/// Swift spells punycode digits 0 to 9 as `A` to `J` and uses `_` as the delimiter.
fn decode_punycode(encoded: &str) -> Option<String> {
    let (basic, extended) = encoded.rsplit_once('_').unwrap_or(("", encoded));
    let mut input = String::with_capacity(encoded.len());

    if !basic.is_empty() {
        input.push_str(basic);
        input.push('-');
    }

    input.extend(extended.bytes().map(|c| {
        char::from(if c.is_ascii_uppercase() && c <= b'J' {
            c - b'A' + b'0'
        } else {
            c
        })
    }));

    punycode::decode(&input).ok()
}

fn operator_char(c: char) -> Option<char> {
    let index = u32::from(c).checked_sub(u32::from('a'))?;
    let &operator = OPERATOR_CHARS.get(usize::try_from(index).ok()?)?;

    (operator != b' ').then_some(char::from(operator))
}

impl<'a> Parser<'a, '_> {
    pub(super) fn demangle_identifier(&mut self) -> ParseResult<NodeId> {
        let start = self.cursor.position();

        if !self.cursor.peek_digit() {
            return Err(self.expected("identifier"));
        }

        let mut has_word_substitutions = false;
        let mut is_punycoded = false;

        if self.cursor.next_if(b'0') {
            if self.cursor.next_if(b'0') {
                is_punycoded = true;
            } else {
                has_word_substitutions = true;
            }
        }

        let mut identifier = String::new();

        loop {
            while has_word_substitutions {
                let Some(c) = self.cursor.peek().filter(u8::is_ascii_alphabetic) else {
                    break;
                };

                self.cursor.next_byte();

                // An uppercase letter is the last word substitution.
                let index = if c.is_ascii_lowercase() {
                    c - b'a'
                } else {
                    has_word_substitutions = false;

                    c - b'A'
                };

                let word = self
                    .words
                    .get(usize::from(index))
                    .copied()
                    .ok_or_else(|| self.expected("word substitution"))?;

                identifier.push_str(word);
            }

            if self.cursor.next_if(b'0') {
                break;
            }

            let length = self.demangle_natural("identifier length")?;
            let length = usize::try_from(length)
                .ok()
                .filter(|&length| length != 0)
                .ok_or_else(|| self.expected("identifier length"))?;

            if is_punycoded {
                self.cursor.next_if(b'_');
            }

            let slice = self
                .cursor
                .take(length)
                .map_err(|error| self.cursor_failure(error, "identifier"))?;

            if is_punycoded {
                identifier.push_str(&decode_punycode(slice).ok_or_else(|| self.expected("punycode identifier"))?);
            } else {
                identifier.push_str(slice);
                self.record_words(slice);
            }

            if !has_word_substitutions {
                break;
            }
        }

        if identifier.is_empty() {
            return Err(self.expected("identifier"));
        }

        let node = self.create_text_at(NodeKind::Identifier, &identifier, start)?;

        self.add_substitution(node);

        Ok(node)
    }

    fn record_words(&mut self, slice: &'a str) {
        let bytes = slice.as_bytes();
        let mut word_start = None;

        for index in 0..=bytes.len() {
            let c = bytes.get(index).copied().unwrap_or(0);

            if let Some(start) = word_start {
                if is_word_end(c, bytes[index - 1]) {
                    if index - start >= 2 && self.words.len() < MAX_WORDS {
                        self.words.extend(slice.get(start..index));
                    }

                    word_start = None;
                }
            }

            if word_start.is_none() && is_word_start(c) {
                word_start = Some(index);
            }
        }
    }

    pub(super) fn demangle_operator_identifier(&mut self) -> ParseResult<NodeId> {
        let identifier = self.require_kind(NodeKind::Identifier, "operator name")?;
        let start = self.store.get(identifier).span.start;
        let name = self.store.text(identifier).unwrap_or_default().to_owned();
        let mut operator = String::with_capacity(name.len());

        for c in name.chars() {
            if c.is_ascii() {
                operator.push(operator_char(c).ok_or_else(|| self.expected("operator character"))?);
            } else {
                operator.push(c);
            }
        }

        let kind = match self.next_char("operator fixity")? {
            b'i' => NodeKind::InfixOperator,
            b'p' => NodeKind::PrefixOperator,
            b'P' => NodeKind::PostfixOperator,
            _ => return Err(self.expected("operator fixity")),
        };

        self.create_text_at(kind, &operator, start)
    }

    pub(super) fn demangle_local_identifier(&mut self) -> ParseResult<NodeId> {
        if self.cursor.next_if(b'L') {
            let discriminator = self.require_kind(NodeKind::Identifier, "private discriminator")?;
            let name = self.require_if(NodeKind::is_decl_name, "declaration name")?;

            return self.create(NodeKind::PrivateDeclName, &[discriminator, name]);
        }

        if self.cursor.next_if(b'l') {
            let discriminator = self.require_kind(NodeKind::Identifier, "private discriminator")?;

            return self.create(NodeKind::PrivateDeclName, &[discriminator]);
        }

        if let Some(c) = self
            .cursor
            .peek()
            .filter(|c| matches!(c, b'a'..=b'j' | b'A'..=b'J'))
        {
            self.cursor.next_byte();

            let related_kind = self.create_text(NodeKind::Identifier, char::from(c).encode_utf8(&mut [0; 4]))?;
            let name = self.require_if(NodeKind::is_decl_name, "declaration name")?;

            return self.create(NodeKind::RelatedEntityDeclName, &[related_kind, name]);
        }

        let discriminator = self.demangle_index_as_node()?;
        let name = self.require_if(NodeKind::is_decl_name, "declaration name")?;

        self.create(NodeKind::LocalDeclName, &[discriminator, name])
    }

    pub(super) fn demangle_multi_substitutions(&mut self) -> ParseResult<NodeId> {
        let mut repeat_count = None;

        loop {
            match self.next_char("substitution")? {
                c @ b'a'..=b'z' => {
                    let node = self.push_multi_substitutions(repeat_count, c - b'a')?;

                    self.push(node);

                    repeat_count = None;
                }
                c @ b'A'..=b'Z' => return self.push_multi_substitutions(repeat_count, c - b'A'),
                b'_' => {
                    // The number was not a repeat count but a large substitution index.
                    let index = repeat_count
                        .map_or(Some(26), |count: u64| count.checked_add(27))
                        .and_then(|index| usize::try_from(index).ok());

                    return index
                        .and_then(|index| self.substitutions.get(index).copied())
                        .ok_or_else(|| self.expected("substitution index"));
                }
                _ => {
                    self.cursor.push_back();

                    repeat_count = Some(self.demangle_natural("substitution")?);
                }
            }
        }
    }

    fn push_multi_substitutions(&mut self, repeat_count: Option<u64>, index: u8) -> ParseResult<NodeId> {
        let node = self
            .substitutions
            .get(usize::from(index))
            .copied()
            .ok_or_else(|| self.expected("substitution index"))?;

        let repeat_count = repeat_count.unwrap_or(1);

        if repeat_count > MAX_REPEAT_COUNT {
            return Err(self.expected("substitution repeat count"));
        }

        for _ in 1..repeat_count {
            self.push(node);
        }

        Ok(node)
    }

    pub(super) fn demangle_standard_substitution(&mut self) -> ParseResult<NodeId> {
        match self.cursor.peek() {
            Some(b'o') => {
                self.cursor.next_byte();
                self.create_text(NodeKind::Module, OBJC_MODULE)
            }
            Some(b'C') => {
                self.cursor.next_byte();
                self.create_text(NodeKind::Module, CLANG_IMPORTER_MODULE)
            }
            Some(b'g') => {
                self.cursor.next_byte();

                let wrapped = self.require_kind(NodeKind::Type, "optional payload type")?;
                let optional = self.create_swift_type(NodeKind::Enum, "Optional")?;
                let arguments = self.create(NodeKind::TypeList, &[wrapped])?;
                let bound = self.create(NodeKind::BoundGenericEnum, &[optional, arguments])?;
                let ty = self.create_type(bound)?;

                self.add_substitution(ty);

                Ok(ty)
            }
            _ => {
                let repeat_count = if self.cursor.peek_digit() {
                    self.demangle_natural("substitution repeat count")?
                } else {
                    1
                };

                if repeat_count > MAX_REPEAT_COUNT {
                    return Err(self.expected("substitution repeat count"));
                }

                let c = self.next_char("standard substitution")?;
                let node = self.create_standard_substitution(c)?;

                for _ in 1..repeat_count {
                    self.push(node);
                }

                Ok(node)
            }
        }
    }

    fn create_standard_substitution(&mut self, c: u8) -> ParseResult<NodeId> {
        let (kind, name): (NodeKind, Cow<'static, str>) = if let Some(name) = lookup(&STANDARD_STRUCTURES, c) {
            (NodeKind::Structure, name.into())
        } else if c == b'q' {
            (NodeKind::Enum, "Optional".into())
        } else if let Some(name) = lookup(&STANDARD_PROTOCOLS, c) {
            (NodeKind::Protocol, name.into())
        } else {
            return Err(self.expected("standard substitution"));
        };

        self.create_swift_type(kind, &name)
    }

    fn create_swift_type(&mut self, kind: NodeKind, name: &str) -> ParseResult<NodeId> {
        let module = self.create_text(NodeKind::Module, STDLIB_MODULE)?;
        let name = self.create_text(NodeKind::Identifier, name)?;
        let nominal = self.create(kind, &[module, name])?;

        self.create_type(nominal)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_decode_punycode() {
        #[track_caller]
        fn check(input: &str, expected: Option<&str>) {
            assert_eq!(super::decode_punycode(input).as_deref(), expected);
        }

        check("mnchen_Dya", Some("münchen"));
        check("Mnchen_Dya", Some("München"));
        check("lsIh", Some("💩"));
    }

    #[test]
    fn test_operator_char() {
        assert_eq!(super::operator_char('e'), Some('='));
        assert_eq!(super::operator_char('p'), Some('+'));
        assert_eq!(super::operator_char('b'), None);
        assert_eq!(super::operator_char('A'), None);
        assert_eq!(super::operator_char('{'), None);
    }

    #[test]
    fn test_word_boundaries() {
        assert!(super::is_word_start(b'a'));
        assert!(!super::is_word_start(b'1'));
        assert!(!super::is_word_start(b'_'));
        assert!(super::is_word_end(b'B', b'o'));
        assert!(!super::is_word_end(b'B', b'A'));
        assert!(super::is_word_end(0, b'x'));
    }
}
