//! Form state: field values plus the touched/dirty flags that decide when
//! validation messages become visible.

use crate::error::{ModelError, ValidationError};
use crate::validation::{FieldError, Validators};

/// One editable field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormField {
    /// Current value.
    pub value: String,
    /// The user has left the field (or a rejected submission forced it).
    pub touched: bool,
    /// The user has changed the value.
    pub dirty: bool,
    /// Failures from the last validation run.
    pub errors: Vec<FieldError>,
}

impl FormField {
    /// Create a pristine field holding `value`.
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            ..Self::default()
        }
    }

    /// User edit: replace the value and mark the field dirty if it changed.
    pub fn set_value(&mut self, value: &str) {
        if self.value != value {
            self.value = value.to_string();
            self.dirty = true;
        }
    }

    /// Programmatic update; leaves the touched/dirty flags alone.
    pub fn patch_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    /// Mark the field as visited.
    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    /// Mark the field as touched and dirty so its errors are displayed.
    pub fn mark_for_attention(&mut self) {
        self.touched = true;
        self.dirty = true;
    }

    /// Run `validators` over the current value and store the failures.
    pub fn validate(&mut self, validators: &Validators) -> bool {
        self.errors = validators.validate(&self.value);
        self.errors.is_empty()
    }

    /// Return `true` if the last validation run found nothing.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors are shown once the field was touched or edited.
    pub fn shows_errors(&self) -> bool {
        (self.touched || self.dirty) && !self.is_valid()
    }
}

/// An ordered set of named fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormGroup {
    fields: Vec<(String, FormField)>,
    /// Failures of cross-field checks (e.g. round trip).
    pub group_errors: Vec<FieldError>,
}

impl FormGroup {
    /// Create a group with one empty field per name, in order.
    pub fn new(names: &[&str]) -> Self {
        Self {
            fields: names
                .iter()
                .map(|name| (name.to_string(), FormField::default()))
                .collect(),
            group_errors: Vec::new(),
        }
    }

    /// Look up a field.
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Look up a field for modification.
    pub fn field_mut(&mut self, name: &str) -> Result<&mut FormField, ModelError> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
            .ok_or_else(|| ModelError::UnknownField {
                field: name.to_string(),
            })
    }

    /// Current value of a field, or `""` if there is no such field.
    pub fn value(&self, name: &str) -> &str {
        self.field(name).map(|f| f.value.as_str()).unwrap_or_default()
    }

    /// User edit of one field.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), ModelError> {
        self.field_mut(name)?.set_value(value);
        Ok(())
    }

    /// Programmatic update of one field.
    pub fn patch_value(&mut self, name: &str, value: &str) -> Result<(), ModelError> {
        self.field_mut(name)?.patch_value(value);
        Ok(())
    }

    /// Snapshot of every `(name, value)` pair, in field order.
    pub fn values(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(n, f)| (n.clone(), f.value.clone()))
            .collect()
    }

    /// Mark every field touched and dirty.
    pub fn mark_all_for_attention(&mut self) {
        for (_, field) in &mut self.fields {
            field.mark_for_attention();
        }
    }

    /// Iterate over the fields mutably, e.g. to validate each one.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut FormField)> {
        self.fields.iter_mut().map(|(n, f)| (n.as_str(), f))
    }

    /// Collect the stored failures of all fields and the group.
    ///
    /// Group failures are reported under the `"form"` key.
    pub fn errors(&self) -> ValidationError {
        let mut err = ValidationError::default();
        for (name, field) in &self.fields {
            for e in &field.errors {
                err.push(name, e.clone());
            }
        }
        for e in &self.group_errors {
            err.push("form", e.clone());
        }
        err
    }

    /// Return `true` if no field or group failure is stored.
    pub fn is_valid(&self) -> bool {
        self.group_errors.is_empty() && self.fields.iter().all(|(_, f)| f.is_valid())
    }
}
