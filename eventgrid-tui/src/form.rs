//! Add-event form state.

use eventgrid_core::NewEvent;
use eventgrid_sync::WriteStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Date,
    Location,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Date,
        FormField::Location,
        FormField::Description,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Date => "Date",
            FormField::Location => "Location",
            FormField::Description => "Description",
        }
    }

    /// Key of the field in the request payload.
    pub fn key(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Date => "date",
            FormField::Location => "location",
            FormField::Description => "description",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::Date,
            FormField::Date => FormField::Location,
            FormField::Location => FormField::Description,
            FormField::Description => FormField::Title,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Date => FormField::Title,
            FormField::Location => FormField::Date,
            FormField::Description => FormField::Location,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventForm {
    pub title: String,
    pub date: String,
    pub location: String,
    pub description: String,
    pub focus: FormField,
    /// Status of the last submission from this form, if any.
    pub status: Option<WriteStatus>,
    /// Message shown under the fields.
    pub error: Option<String>,
}

impl EventForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Date => &self.date,
            FormField::Location => &self.location,
            FormField::Description => &self.description,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Date => &mut self.date,
            FormField::Location => &mut self.location,
            FormField::Description => &mut self.description,
        }
    }

    pub fn insert(&mut self, c: char) {
        let focus = self.focus;
        self.value_mut(focus).push(c);
    }

    pub fn backspace(&mut self) {
        let focus = self.focus;
        self.value_mut(focus).pop();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    pub fn is_sending(&self) -> bool {
        self.status == Some(WriteStatus::Sending)
    }

    /// Checks that can be made before anything is sent.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        Ok(())
    }

    /// Request payload. Blank optional fields are left out.
    pub fn to_payload(&self) -> NewEvent {
        let mut payload = NewEvent::new(self.title.trim());
        for field in &FormField::ALL[1..] {
            let value = self.value(*field).trim();
            if !value.is_empty() {
                payload = payload.with_field(field.key(), value);
            }
        }
        payload
    }
}
