//! Generic form validation engine.
//!
//! A form is described by a [`FormConfig`]: one list of [`Rule`]s per field.
//! [`Form`] holds the live state of every field (value, interaction flags and
//! current errors) and re-runs the field's rules on every value change.
//!
//! Errors exist as soon as a value is invalid, but a field is only
//! "invalid for display" once the user has touched or edited it.
//!
//! # Example
//!
//! ```
//! use payment_form::form::{FieldKey, Form, FormConfig};
//! use payment_form::rules::Rule;
//! use payment_form::ErrorKind;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Field { Name }
//!
//! impl FieldKey for Field {
//!     const ALL: &'static [Self] = &[Field::Name];
//!     fn name(&self) -> &'static str { "name" }
//!     fn index(&self) -> usize { 0 }
//! }
//!
//! let config = FormConfig::new().field(Field::Name, vec![Rule::Required]);
//! let mut form = Form::new(config);
//!
//! assert!(!form.is_valid());
//! assert!(form.has_error(Field::Name, ErrorKind::Required));
//! assert!(!form.is_field_invalid(Field::Name));
//!
//! form.mark_all_as_touched();
//! assert!(form.is_field_invalid(Field::Name));
//!
//! form.input(Field::Name, "Ada");
//! assert!(form.is_valid());
//! ```

use crate::error::{ErrorKind, FieldError};
use crate::mask::{redact, Sensitivity};
use crate::rules::Rule;
use std::fmt;
use tokio::sync::broadcast;
use tracing::debug;
use zeroize::Zeroize;

/// Capacity of the change notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 32;

/// Identifies the fields of a form.
///
/// `ALL` lists every field in display order and `index` must return the
/// position of `self` in `ALL`.
pub trait FieldKey: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Every field, in display order.
    const ALL: &'static [Self];

    /// The field's name as used in templates and translation keys.
    fn name(&self) -> &'static str;

    /// Position of this field in [`FieldKey::ALL`].
    fn index(&self) -> usize;
}

/// Rules and display settings for one field.
#[derive(Debug, Clone, Default)]
pub struct FieldConfig {
    rules: Vec<Rule>,
    sensitivity: Sensitivity,
}

impl FieldConfig {
    /// The field's rules, in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// How the value is masked in `Debug` output.
    pub fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    /// Runs every rule and collects the failures, keeping the first error of
    /// each kind.
    pub fn validate(&self, value: &str) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = Vec::new();
        for rule in &self.rules {
            if let Err(e) = rule.check(value) {
                if !errors.iter().any(|existing| existing.kind() == e.kind()) {
                    errors.push(e);
                }
            }
        }
        errors
    }
}

/// Describes every field of a form.
#[derive(Debug, Clone)]
pub struct FormConfig<F: FieldKey> {
    fields: Vec<FieldConfig>,
    _keys: std::marker::PhantomData<F>,
}

impl<F: FieldKey> FormConfig<F> {
    /// Creates a configuration where no field has rules.
    pub fn new() -> Self {
        Self {
            fields: vec![FieldConfig::default(); F::ALL.len()],
            _keys: std::marker::PhantomData,
        }
    }

    /// Sets the rules of a field.
    pub fn field(mut self, key: F, rules: Vec<Rule>) -> Self {
        self.fields[key.index()].rules = rules;
        self
    }

    /// Sets how a field is masked in `Debug` output.
    pub fn sensitivity(mut self, key: F, sensitivity: Sensitivity) -> Self {
        self.fields[key.index()].sensitivity = sensitivity;
        self
    }

    /// Returns the configuration of a field.
    pub fn get(&self, key: F) -> &FieldConfig {
        &self.fields[key.index()]
    }
}

impl<F: FieldKey> Default for FormConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Live state of one field.
#[derive(Clone, Default)]
pub struct FieldState {
    value: String,
    touched: bool,
    dirty: bool,
    errors: Vec<FieldError>,
}

impl FieldState {
    /// Current value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// True once the field has been blurred or the form was submitted.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// True once the user has edited the value.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current validation errors.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// True if no rule failed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn scrub(&mut self) {
        self.value.zeroize();
        for error in &mut self.errors {
            if let FieldError::Pattern { actual_value, .. } = error {
                actual_value.zeroize();
            }
        }
        self.errors.clear();
    }
}

impl Drop for FieldState {
    fn drop(&mut self) {
        self.scrub();
    }
}

/// Published whenever a field value changes, unless the change was made
/// with [`UpdateOptions::emit_event`] set to false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldChange<F> {
    /// The field that changed.
    pub field: F,
    /// Whether the field is valid after the change.
    pub valid: bool,
}

/// Controls the side effects of a value update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Publish a [`FieldChange`].
    pub emit_event: bool,
    /// Mark the field as edited by the user.
    pub mark_dirty: bool,
}

impl UpdateOptions {
    /// A programmatic update: notifies, does not mark dirty.
    pub const PROGRAMMATIC: Self = Self {
        emit_event: true,
        mark_dirty: false,
    };

    /// A user edit: notifies and marks dirty.
    pub const USER_INPUT: Self = Self {
        emit_event: true,
        mark_dirty: true,
    };
}

/// A form: configuration plus the live state of every field.
pub struct Form<F: FieldKey> {
    config: FormConfig<F>,
    states: Vec<FieldState>,
    changes: broadcast::Sender<FieldChange<F>>,
}

impl<F: FieldKey> Form<F> {
    /// Creates a form with every field empty and validated.
    pub fn new(config: FormConfig<F>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let mut form = Self {
            config,
            states: vec![FieldState::default(); F::ALL.len()],
            changes,
        };
        for &key in F::ALL {
            form.revalidate(key);
        }
        form
    }

    /// Returns the form configuration.
    pub fn config(&self) -> &FormConfig<F> {
        &self.config
    }

    /// Subscribes to value change notifications.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<FieldChange<F>> {
        self.changes.subscribe()
    }

    /// Returns a field's state.
    pub fn field(&self, key: F) -> &FieldState {
        &self.states[key.index()]
    }

    /// Returns a field's value.
    pub fn value(&self, key: F) -> &str {
        self.field(key).value()
    }

    /// Sets a value programmatically.
    pub fn set_value(&mut self, key: F, value: impl Into<String>) {
        self.update(key, value, UpdateOptions::PROGRAMMATIC);
    }

    /// Records a value typed by the user.
    pub fn input(&mut self, key: F, value: impl Into<String>) {
        self.update(key, value, UpdateOptions::USER_INPUT);
    }

    /// Sets several values programmatically. Fields not listed keep their value.
    pub fn patch_values<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (F, &'a str)>,
    {
        for (key, value) in values {
            self.set_value(key, value);
        }
    }

    /// Sets a value and re-runs the field's rules.
    pub fn update(&mut self, key: F, value: impl Into<String>, options: UpdateOptions) {
        let state = &mut self.states[key.index()];
        let mut previous = std::mem::replace(&mut state.value, value.into());
        previous.zeroize();
        if options.mark_dirty {
            state.dirty = true;
        }
        self.revalidate(key);

        if options.emit_event {
            let valid = self.field(key).is_valid();
            // No subscribers is fine.
            let _ = self.changes.send(FieldChange { field: key, valid });
        }
    }

    /// Marks a field as touched, as on blur.
    pub fn mark_touched(&mut self, key: F) {
        self.states[key.index()].touched = true;
    }

    /// Marks every field as touched so pending errors become visible.
    pub fn mark_all_as_touched(&mut self) {
        for state in &mut self.states {
            state.touched = true;
        }
    }

    /// Clears every value and interaction flag, then re-validates.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.scrub();
            state.touched = false;
            state.dirty = false;
        }
        self.revalidate_all();
    }

    /// Re-runs every field's rules against its current value.
    ///
    /// Rules that read outside state, such as the current date, can change
    /// their outcome without any edit.
    pub fn revalidate_all(&mut self) {
        for &key in F::ALL {
            self.revalidate(key);
        }
    }

    /// Current errors of a field.
    pub fn errors(&self, key: F) -> &[FieldError] {
        self.field(key).errors()
    }

    /// True if the field currently has an error of this kind.
    pub fn has_error(&self, key: F, kind: ErrorKind) -> bool {
        self.errors(key).iter().any(|e| e.kind() == kind)
    }

    /// True if the field is invalid and the user has touched or edited it.
    pub fn is_field_invalid(&self, key: F) -> bool {
        let state = self.field(key);
        !state.is_valid() && (state.touched || state.dirty)
    }

    /// True if every field is valid.
    pub fn is_valid(&self) -> bool {
        self.states.iter().all(FieldState::is_valid)
    }

    /// Fields that currently fail validation, in display order.
    pub fn invalid_fields(&self) -> Vec<F> {
        F::ALL
            .iter()
            .copied()
            .filter(|&key| !self.field(key).is_valid())
            .collect()
    }

    fn revalidate(&mut self, key: F) {
        let errors = self.config.get(key).validate(&self.states[key.index()].value);
        let state = &mut self.states[key.index()];
        for error in &mut state.errors {
            if let FieldError::Pattern { actual_value, .. } = error {
                actual_value.zeroize();
            }
        }
        if !errors.is_empty() {
            debug!(
                field = key.name(),
                errors = ?errors.iter().map(|e| e.kind().as_str()).collect::<Vec<_>>(),
                "field failed validation"
            );
        }
        state.errors = errors;
    }
}

impl<F: FieldKey> fmt::Debug for Form<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for &key in F::ALL {
            let state = self.field(key);
            let shown = redact(state.value(), self.config.get(key).sensitivity());
            map.entry(
                &key.name(),
                &format_args!(
                    "{:?} (touched: {}, dirty: {}, errors: {:?})",
                    shown,
                    state.touched,
                    state.dirty,
                    state.errors.iter().map(|e| e.kind()).collect::<Vec<_>>()
                ),
            );
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestField {
        Code,
        Note,
    }

    impl FieldKey for TestField {
        const ALL: &'static [Self] = &[TestField::Code, TestField::Note];

        fn name(&self) -> &'static str {
            match self {
                TestField::Code => "code",
                TestField::Note => "note",
            }
        }

        fn index(&self) -> usize {
            *self as usize
        }
    }

    fn test_form() -> Form<TestField> {
        let config = FormConfig::new()
            .field(
                TestField::Code,
                vec![
                    Rule::Required,
                    Rule::MaxLength(3),
                    Rule::pattern("[0-9]{3,4}").unwrap(),
                ],
            )
            .sensitivity(TestField::Code, Sensitivity::Secret);
        Form::new(config)
    }

    #[test]
    fn test_new_form_is_validated() {
        let form = test_form();
        assert!(!form.is_valid());
        assert_eq!(form.errors(TestField::Code), &[FieldError::Required]);
        assert!(form.field(TestField::Note).is_valid());
        assert_eq!(form.invalid_fields(), vec![TestField::Code]);
    }

    #[test]
    fn test_errors_follow_value() {
        let mut form = test_form();
        form.set_value(TestField::Code, "12a");
        assert!(form.has_error(TestField::Code, ErrorKind::Pattern));
        assert!(!form.has_error(TestField::Code, ErrorKind::Required));

        form.set_value(TestField::Code, "123");
        assert!(form.is_valid());
    }

    #[test]
    fn test_all_failing_rules_are_reported() {
        let mut form = test_form();
        form.set_value(TestField::Code, "12345");
        assert!(form.has_error(TestField::Code, ErrorKind::MaxLength));
        assert!(form.has_error(TestField::Code, ErrorKind::Pattern));
        assert_eq!(form.errors(TestField::Code).len(), 2);
    }

    #[test]
    fn test_errors_deduplicated_by_kind() {
        let config = FormConfig::new().field(
            TestField::Note,
            vec![Rule::pattern("a").unwrap(), Rule::pattern("b").unwrap()],
        );
        let mut form = Form::new(config);
        form.set_value(TestField::Note, "c");
        assert_eq!(form.errors(TestField::Note).len(), 1);
        match &form.errors(TestField::Note)[0] {
            FieldError::Pattern {
                required_pattern, ..
            } => assert_eq!(required_pattern, "^a$"),
            other => panic!("expected pattern error, got {:?}", other),
        }
    }

    #[test]
    fn test_display_gating() {
        let mut form = test_form();
        assert!(!form.is_field_invalid(TestField::Code));

        form.mark_touched(TestField::Code);
        assert!(form.is_field_invalid(TestField::Code));

        let mut form = test_form();
        form.input(TestField::Code, "1");
        assert!(form.field(TestField::Code).is_dirty());
        assert!(form.is_field_invalid(TestField::Code));
    }

    #[test]
    fn test_programmatic_update_is_not_dirty() {
        let mut form = test_form();
        form.set_value(TestField::Code, "1");
        assert!(!form.field(TestField::Code).is_dirty());
        assert!(!form.is_field_invalid(TestField::Code));
    }

    #[test]
    fn test_mark_all_as_touched() {
        let mut form = test_form();
        form.mark_all_as_touched();
        assert!(TestField::ALL.iter().all(|&k| form.field(k).is_touched()));
        assert!(form.is_field_invalid(TestField::Code));
        assert!(!form.is_field_invalid(TestField::Note));
    }

    #[test]
    fn test_reset() {
        let mut form = test_form();
        form.input(TestField::Code, "123");
        form.input(TestField::Note, "hello");
        form.mark_all_as_touched();

        form.reset();
        assert_eq!(form.value(TestField::Code), "");
        assert_eq!(form.value(TestField::Note), "");
        assert!(!form.field(TestField::Code).is_touched());
        assert!(!form.field(TestField::Code).is_dirty());
        assert!(form.has_error(TestField::Code, ErrorKind::Required));
    }

    #[test]
    fn test_patch_values_leaves_other_fields() {
        let mut form = test_form();
        form.set_value(TestField::Note, "keep");
        form.patch_values([(TestField::Code, "123")]);
        assert_eq!(form.value(TestField::Code), "123");
        assert_eq!(form.value(TestField::Note), "keep");
    }

    #[test]
    fn test_change_notifications() {
        let mut form = test_form();
        let mut rx = form.subscribe_changes();

        form.input(TestField::Code, "123");
        assert_eq!(
            rx.try_recv().unwrap(),
            FieldChange {
                field: TestField::Code,
                valid: true
            }
        );

        form.update(
            TestField::Code,
            "1234",
            UpdateOptions {
                emit_event: false,
                mark_dirty: true,
            },
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(form.value(TestField::Code), "1234");
    }

    #[test]
    fn test_debug_masks_sensitive_values() {
        let mut form = test_form();
        form.set_value(TestField::Code, "987");
        form.set_value(TestField::Note, "visible");
        let debug = format!("{:?}", form);
        assert!(!debug.contains("987"));
        assert!(debug.contains("***"));
        assert!(debug.contains("visible"));
    }
}
