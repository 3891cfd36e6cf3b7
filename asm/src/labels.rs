use std::collections::HashMap;

use tracing::trace;

use crate::error::{CompileError, CompileErrorKind, Position};

/// A label definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    pub name: String,

    /// ROM offset of the byte following the definition.
    pub offset: u16,

    pub position: Position,
}

/// A pair of placeholder bytes waiting for the address of a label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelReference {
    pub name: String,
    pub offset: usize,
    pub position: Position,
}

/// Label definitions and references collected while tokenizing, resolved once at the end.
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    definitions: HashMap<String, Label>,
    references: Vec<LabelReference>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(
        &mut self,
        name: &str,
        offset: usize,
        position: Position,
    ) -> Result<(), CompileError> {
        if name.is_empty() {
            return Err(CompileError::at(CompileErrorKind::EmptyLabel, position));
        }

        if let Some(previous) = self.definitions.get(name) {
            return Err(CompileError::at(
                CompileErrorKind::DuplicateLabel {
                    name: name.to_owned(),
                    previous: previous.position,
                },
                position,
            ));
        }

        let offset = u16::try_from(offset).map_err(|_| {
            CompileError::at(CompileErrorKind::LabelOutOfRange(name.to_owned()), position)
        })?;

        trace!(name, offset, "label defined");
        self.definitions.try_reserve(1)?;
        self.definitions.insert(
            name.to_owned(),
            Label {
                name: name.to_owned(),
                offset,
                position,
            },
        );
        Ok(())
    }

    pub fn reference(
        &mut self,
        name: &str,
        offset: usize,
        position: Position,
    ) -> Result<(), CompileError> {
        if name.is_empty() {
            return Err(CompileError::at(CompileErrorKind::EmptyLabel, position));
        }

        self.references.try_reserve(1)?;
        self.references.push(LabelReference {
            name: name.to_owned(),
            offset,
            position,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.definitions.get(name)
    }

    pub fn references(&self) -> &[LabelReference] {
        &self.references
    }

    /// Overwrites every reference's placeholder in `rom` with the big-endian offset of its label.
    ///
    /// Fails on the first reference, in source order, whose label was never defined.
    pub fn resolve(&self, rom: &mut [u8]) -> Result<(), CompileError> {
        for reference in &self.references {
            let label = self.get(&reference.name).ok_or_else(|| {
                CompileError::at(
                    CompileErrorKind::UnresolvedLabel(reference.name.clone()),
                    reference.position,
                )
            })?;

            rom[reference.offset..reference.offset + 2].copy_from_slice(&label.offset.to_be_bytes());
        }

        Ok(())
    }
}
