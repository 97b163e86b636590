//! Contact form validation.
//!
//! Per field: `Pristine → (blur) → Valid | Invalid → (input) → Pristine`.
//! Rules are checked in order and the first failure wins. An invalid field
//! shows exactly one inline error node; showing a new error removes the old
//! one first.
//!
//! Submission is split in two: [`FormValidator::submit`] validates and
//! collects the data, the caller hands it to a submitter, and
//! [`FormValidator::finish_submission`] applies the outcome.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::dom::{ElementId, ElementLocator};
use crate::error::UiResult;
use crate::render::{DomPatch, NodeSpec, PatchBuffer};
use crate::style::{class, FIELD_ERROR_STYLE};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s\-+()]{10,}$").expect("phone pattern"));

/// Notification text for a submit blocked by invalid fields.
pub const SUBMIT_BLOCKED_MESSAGE: &str = "Please correct the errors in the form";
/// Notification text for a successful submission.
pub const SUBMIT_SUCCESS_MESSAGE: &str = "Your message has been sent successfully!";
/// Notification text for a failed submission.
pub const SUBMIT_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

/// Input type, as far as validation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Free text (also textarea and select).
    #[default]
    Text,
    /// `type="email"`.
    Email,
    /// `type="tel"`.
    Tel,
}

impl FieldKind {
    /// Maps an input `type` attribute.
    #[must_use]
    pub fn from_type(input_type: Option<&str>) -> Self {
        match input_type.map(str::to_ascii_lowercase).as_deref() {
            Some("email") => Self::Email,
            Some("tel") => Self::Tel,
            _ => Self::Text,
        }
    }
}

/// A failed validation rule. The display text is the inline message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field left empty.
    #[error("This field is required")]
    Required,
    /// Email field that does not look like an address.
    #[error("Invalid email")]
    InvalidEmail,
    /// Phone field with fewer than ten phone characters, or other characters.
    #[error("Invalid phone number")]
    InvalidPhone,
}

/// Checks one value against the rules.
///
/// # Errors
///
/// Returns the first rule the value breaks.
pub fn validate_value(kind: FieldKind, required: bool, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return if required {
            Err(ValidationError::Required)
        } else {
            Ok(())
        };
    }

    match kind {
        FieldKind::Email if !EMAIL_RE.is_match(value) => Err(ValidationError::InvalidEmail),
        FieldKind::Tel if !PHONE_RE.is_match(value) => Err(ValidationError::InvalidPhone),
        _ => Ok(()),
    }
}

/// Validation state of one field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValidationState {
    /// Untouched since load, the last input, or a reset.
    #[default]
    Pristine,
    /// Validated and accepted.
    Valid {
        /// The validated value.
        value: String,
    },
    /// Validated and rejected.
    Invalid {
        /// The validated value.
        value: String,
        /// Why.
        error: ValidationError,
    },
}

impl FieldValidationState {
    /// Returns the error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<ValidationError> {
        match self {
            Self::Invalid { error, .. } => Some(*error),
            _ => None,
        }
    }
}

/// Named field values collected at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    /// Returns the value of the first field called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the field count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no named field was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Valid. Send this data.
    Ready(FormData),
    /// At least one field is invalid. Nothing is sent.
    Blocked,
    /// Not this form, or a submission is already in flight.
    Ignored,
}

#[derive(Debug, Clone)]
struct Field {
    element: ElementId,
    container: Option<ElementId>,
    name: Option<String>,
    kind: FieldKind,
    required: bool,
    error_node: Option<ElementId>,
    state: FieldValidationState,
}

/// Validator for the page's contact form.
#[derive(Debug, Clone)]
pub struct FormValidator {
    form: ElementId,
    fields: Vec<Field>,
    in_flight: bool,
}

impl FormValidator {
    /// Finds `.contact-form` and its controls. Returns `None` without a form.
    ///
    /// # Errors
    ///
    /// Propagates selector errors from the locator.
    pub fn mount(locator: &impl ElementLocator) -> UiResult<Option<Self>> {
        let Some(form) = locator.query(".contact-form")? else {
            return Ok(None);
        };

        let fields = locator
            .query_all_within(form, "input, textarea, select")?
            .into_iter()
            .map(|element| Field {
                element,
                container: locator.parent(element),
                name: locator.attribute(element, "name"),
                kind: FieldKind::from_type(locator.attribute(element, "type").as_deref()),
                required: locator.has_attribute(element, "required"),
                error_node: None,
                state: FieldValidationState::Pristine,
            })
            .collect::<Vec<_>>();

        debug!("Contact form mounted: {} fields", fields.len());
        Ok(Some(Self {
            form,
            fields,
            in_flight: false,
        }))
    }

    /// Returns the form element.
    #[must_use]
    pub const fn form(&self) -> ElementId {
        self.form
    }

    /// Returns true while a submission is pending.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// Returns the validation state of a field.
    #[must_use]
    pub fn field_state(&self, field: ElementId) -> Option<&FieldValidationState> {
        self.fields
            .iter()
            .find(|f| f.element == field)
            .map(|f| &f.state)
    }

    fn index_of(&self, field: ElementId) -> Option<usize> {
        self.fields.iter().position(|f| f.element == field)
    }

    /// Validates a field that lost focus. Returns `None` for foreign fields.
    pub fn on_blur(&mut self, field: ElementId, value: &str, patches: &mut PatchBuffer) -> Option<bool> {
        let index = self.index_of(field)?;
        Some(self.validate_field(index, value, patches))
    }

    /// Clears a field's error as the user types. Returns false for foreign
    /// fields.
    pub fn on_input(&mut self, field: ElementId, patches: &mut PatchBuffer) -> bool {
        let Some(index) = self.index_of(field) else {
            return false;
        };
        self.clear_error(index, patches);
        self.fields[index].state = FieldValidationState::Pristine;
        true
    }

    /// Validates every required field with its current value.
    pub fn validate_all(&mut self, locator: &impl ElementLocator, patches: &mut PatchBuffer) -> bool {
        let mut valid = true;
        for index in 0..self.fields.len() {
            if !self.fields[index].required {
                continue;
            }
            let value = locator.value(self.fields[index].element);
            valid &= self.validate_field(index, &value, patches);
        }
        valid
    }

    /// Handles a submit of `form`.
    pub fn submit(
        &mut self,
        locator: &impl ElementLocator,
        form: ElementId,
        patches: &mut PatchBuffer,
    ) -> SubmitDecision {
        if form != self.form {
            return SubmitDecision::Ignored;
        }
        if self.in_flight {
            debug!("Submit ignored: a submission is already pending");
            return SubmitDecision::Ignored;
        }
        if !self.validate_all(locator, patches) {
            return SubmitDecision::Blocked;
        }

        let data = self
            .fields
            .iter()
            .filter_map(|f| Some((f.name.clone()?, locator.value(f.element))))
            .collect();
        self.in_flight = true;
        SubmitDecision::Ready(FormData(data))
    }

    /// Applies a submission outcome. Success resets the form; failure keeps
    /// what the user typed.
    pub fn finish_submission(&mut self, success: bool, patches: &mut PatchBuffer) {
        self.in_flight = false;
        if !success {
            return;
        }

        for index in 0..self.fields.len() {
            self.clear_error(index, patches);
            self.fields[index].state = FieldValidationState::Pristine;
        }
        patches.push(DomPatch::ResetForm { form: self.form });
    }

    fn validate_field(&mut self, index: usize, value: &str, patches: &mut PatchBuffer) -> bool {
        let field = &self.fields[index];
        match validate_value(field.kind, field.required, value) {
            Ok(()) => {
                self.clear_error(index, patches);
                self.fields[index].state = FieldValidationState::Valid {
                    value: value.to_owned(),
                };
                true
            }
            Err(error) => {
                self.show_error(index, error, patches);
                self.fields[index].state = FieldValidationState::Invalid {
                    value: value.to_owned(),
                    error,
                };
                false
            }
        }
    }

    fn show_error(&mut self, index: usize, error: ValidationError, patches: &mut PatchBuffer) {
        self.clear_error(index, patches);

        let field = &mut self.fields[index];
        patches.add_class(field.element, class::ERROR);
        let mut spec = NodeSpec::new("div").class(class::FIELD_ERROR).text(error.to_string());
        for (property, value) in FIELD_ERROR_STYLE {
            spec = spec.style(property, value);
        }
        field.error_node = Some(patches.create(field.container, spec));
    }

    fn clear_error(&mut self, index: usize, patches: &mut PatchBuffer) {
        let field = &mut self.fields[index];
        if let Some(node) = field.error_node.take() {
            patches.remove_class(field.element, class::ERROR);
            patches.push(DomPatch::Remove { element: node });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, MemoryDom};

    struct Page {
        dom: MemoryDom,
        form: ElementId,
        name: ElementId,
        email: ElementId,
        phone: ElementId,
    }

    fn page() -> Page {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let form = dom.element(body, "form").class("contact-form").build();
        let group = |dom: &mut MemoryDom| dom.element(form, "div").class("form-group").build();

        let g = group(&mut dom);
        let name = dom
            .element(g, "input")
            .attr("type", "text")
            .attr("name", "name")
            .attr("required", "")
            .build();
        let g = group(&mut dom);
        let email = dom
            .element(g, "input")
            .attr("type", "email")
            .attr("name", "email")
            .attr("required", "")
            .build();
        let g = group(&mut dom);
        let phone = dom
            .element(g, "input")
            .attr("type", "tel")
            .attr("name", "phone")
            .build();

        Page {
            dom,
            form,
            name,
            email,
            phone,
        }
    }

    fn flush(dom: &mut MemoryDom, patches: &mut PatchBuffer) {
        for patch in patches.drain() {
            dom.apply(patch);
        }
    }

    #[test]
    fn test_rules() {
        assert_eq!(validate_value(FieldKind::Text, true, "   "), Err(ValidationError::Required));
        assert_eq!(validate_value(FieldKind::Email, false, ""), Ok(()));
        assert_eq!(validate_value(FieldKind::Email, true, "a@b.c"), Ok(()));
        assert_eq!(
            validate_value(FieldKind::Email, true, "not-an-email"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(validate_value(FieldKind::Tel, false, "+33 (0)1 23 45 67"), Ok(()));
        assert_eq!(
            validate_value(FieldKind::Tel, false, "12345"),
            Err(ValidationError::InvalidPhone)
        );
        assert_eq!(ValidationError::Required.to_string(), "This field is required");
    }

    #[test]
    fn test_empty_required_field_fails() {
        let Page { mut dom, name, .. } = page();
        let mut form = FormValidator::mount(&dom).unwrap().unwrap();
        let mut patches = PatchBuffer::new();

        assert_eq!(form.on_blur(name, "", &mut patches), Some(false));
        flush(&mut dom, &mut patches);

        let errors = dom.with_class(class::FIELD_ERROR);
        assert_eq!(errors.len(), 1);
        assert_eq!(dom.text(errors[0]), "This field is required");
        assert!(dom.has_class(name, class::ERROR));
    }

    #[test]
    fn test_invalid_email_shows_exactly_one_error() {
        let Page { mut dom, email, .. } = page();
        let mut form = FormValidator::mount(&dom).unwrap().unwrap();
        let mut patches = PatchBuffer::new();

        for _ in 0..3 {
            form.on_blur(email, "not-an-email", &mut patches);
            flush(&mut dom, &mut patches);
        }

        let errors = dom.with_class(class::FIELD_ERROR);
        assert_eq!(errors.len(), 1);
        assert_eq!(dom.text(errors[0]), "Invalid email");
        assert_eq!(
            form.field_state(email).and_then(FieldValidationState::error),
            Some(ValidationError::InvalidEmail)
        );

        // Typing clears it.
        assert!(form.on_input(email, &mut patches));
        flush(&mut dom, &mut patches);
        assert!(dom.with_class(class::FIELD_ERROR).is_empty());
        assert!(!dom.has_class(email, class::ERROR));
        assert_eq!(form.field_state(email), Some(&FieldValidationState::Pristine));
    }

    #[test]
    fn test_submit_blocked_then_ready() {
        let Page {
            mut dom,
            form: form_el,
            name,
            email,
            phone,
        } = page();
        let mut form = FormValidator::mount(&dom).unwrap().unwrap();
        let mut patches = PatchBuffer::new();

        assert_eq!(form.submit(&dom, form_el, &mut patches), SubmitDecision::Blocked);
        flush(&mut dom, &mut patches);
        assert_eq!(dom.with_class(class::FIELD_ERROR).len(), 2);

        dom.set_value(name, "Ada");
        dom.set_value(email, "a@b.c");
        dom.set_value(phone, "bad");
        let SubmitDecision::Ready(data) = form.submit(&dom, form_el, &mut patches) else {
            panic!("expected a ready submission");
        };
        flush(&mut dom, &mut patches);
        assert!(dom.with_class(class::FIELD_ERROR).is_empty());
        assert_eq!(data.get("email"), Some("a@b.c"));
        assert_eq!(data.len(), 3);

        // One submission at a time.
        assert_eq!(form.submit(&dom, form_el, &mut patches), SubmitDecision::Ignored);

        form.finish_submission(true, &mut patches);
        flush(&mut dom, &mut patches);
        assert!(!form.is_submitting());
        assert_eq!(dom.value(email), "");
    }

    #[test]
    fn test_failed_submission_keeps_values() {
        let Page {
            mut dom,
            form: form_el,
            name,
            email,
            ..
        } = page();
        let mut form = FormValidator::mount(&dom).unwrap().unwrap();
        let mut patches = PatchBuffer::new();
        dom.set_value(name, "Ada");
        dom.set_value(email, "a@b.c");

        assert!(matches!(form.submit(&dom, form_el, &mut patches), SubmitDecision::Ready(_)));
        form.finish_submission(false, &mut patches);
        flush(&mut dom, &mut patches);

        assert_eq!(dom.value(name), "Ada");
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_foreign_elements_ignored() {
        let Page { dom, .. } = page();
        let mut form = FormValidator::mount(&dom).unwrap().unwrap();
        let mut patches = PatchBuffer::new();

        assert_eq!(form.on_blur(dom.body(), "", &mut patches), None);
        assert_eq!(form.submit(&dom, dom.body(), &mut patches), SubmitDecision::Ignored);
    }
}
