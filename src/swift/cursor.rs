use crate::swift::error::CursorError;
use num_traits::{CheckedAdd, CheckedMul, FromPrimitive, Unsigned};

/// State that can be saved and restored, so that a failed production leaves no trace.
pub(crate) trait Snapshot {
    type Snapshot;

    fn snapshot(&mut self) -> Self::Snapshot;
    fn restore(&mut self, snapshot: Self::Snapshot);
}

pub(crate) trait SnapshotExt: Snapshot {
    fn transaction<F, T, E>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let saved = self.snapshot();
        let result = f(self);

        if result.is_err() {
            self.restore(saved);
        }

        result
    }
}

impl<T> SnapshotExt for T where T: Snapshot + ?Sized {}

/// A read position over an immutable mangled name.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    data: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(data: &'a str) -> Self {
        Self { data, position: 0 }
    }

    pub(crate) const fn data(&self) -> &'a str {
        self.data
    }

    pub(crate) const fn position(&self) -> usize {
        self.position
    }

    pub(crate) const fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) const fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    pub(crate) fn rest(&self) -> &'a [u8] {
        self.data.as_bytes().get(self.position..).unwrap_or_default()
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.rest().first().copied()
    }

    pub(crate) fn next_byte(&mut self) -> Option<u8> {
        let c = self.peek()?;

        self.position += 1;

        Some(c)
    }

    pub(crate) fn next_if(&mut self, c: u8) -> bool {
        self.match_literal(&[c])
    }

    pub(crate) const fn push_back(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    pub(crate) fn advance(&mut self, n: usize) -> Result<(), CursorError> {
        if n <= self.rest().len() {
            self.position += n;

            Ok(())
        } else {
            Err(CursorError::OutOfBounds)
        }
    }

    /// Consumes `n` bytes and returns them, failing if they do not form a valid string slice.
    pub(crate) fn take(&mut self, n: usize) -> Result<&'a str, CursorError> {
        let end = self.position.checked_add(n).ok_or(CursorError::OutOfBounds)?;
        let slice = self.data.get(self.position..end).ok_or(CursorError::OutOfBounds)?;

        self.position = end;

        Ok(slice)
    }

    pub(crate) fn consume_rest(&mut self) -> &'a str {
        let rest = self.data.get(self.position..).unwrap_or_default();

        self.position = self.data.len();

        rest
    }

    pub(crate) fn match_literal(&mut self, token: &[u8]) -> bool {
        if self.rest().starts_with(token) {
            self.position += token.len();

            true
        } else {
            false
        }
    }

    /// Consumes a possibly empty run of ASCII digits.
    pub(crate) fn take_digits(&mut self) -> &'a str {
        let digits = self.rest().iter().take_while(|c| c.is_ascii_digit()).count();
        let start = self.position;

        self.position += digits;

        self.data.get(start..self.position).unwrap_or_default()
    }

    pub(crate) fn peek_digit(&self) -> bool {
        self.peek().is_some_and(|c| c.is_ascii_digit())
    }

    /// Reads a run of ASCII digits. The position is unchanged on failure.
    pub(crate) fn read_decimal<T>(&mut self) -> Result<T, CursorError>
    where
        T: Unsigned + CheckedAdd + CheckedMul + FromPrimitive,
    {
        let digits = self.rest().iter().take_while(|c| c.is_ascii_digit()).count();

        if digits == 0 {
            return Err(CursorError::MalformedNumber);
        }

        let ten = T::from_u8(10).ok_or(CursorError::MalformedNumber)?;

        let value = self.rest()[..digits]
            .iter()
            .try_fold(T::zero(), |value, &c| {
                value.checked_mul(&ten)?.checked_add(&T::from_u8(c - b'0')?)
            })
            .ok_or(CursorError::MalformedNumber)?;

        self.position += digits;

        Ok(value)
    }
}

impl Snapshot for Cursor<'_> {
    type Snapshot = usize;

    fn snapshot(&mut self) -> Self::Snapshot {
        self.position
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        self.position = snapshot;
    }
}
